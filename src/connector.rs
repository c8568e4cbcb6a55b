//! Connector path geometry
//!
//! Builds the path drawn between two node anchors and evaluates points on
//! it. Label and insertion-marker positions come from [`ConnectorPath::midpoint`],
//! which always lies on the rendered shape.

use crate::{Point, Port, Rectangle};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Lower bound for the bezier control-point offset
pub const MIN_CONTROL_OFFSET: f64 = 60.0;

/// Control-point offset as a fraction of the endpoint distance
pub const CONTROL_OFFSET_RATIO: f64 = 0.35;

/// Shape used to draw connectors
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CurveStyle {
    #[default]
    Bezier,
    Straight,
    Orthogonal,
}

/// A concrete connector path in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectorPath {
    Line {
        start: Point,
        end: Point,
    },
    /// Three segments: out along the source axis, across, in to the target
    Orthogonal {
        start: Point,
        bend_a: Point,
        bend_b: Point,
        end: Point,
    },
    Cubic {
        start: Point,
        c1: Point,
        c2: Point,
        end: Point,
    },
}

/// Control-point offset for a span, proportional to the distance
pub fn control_offset(start: Point, end: Point) -> f64 {
    MIN_CONTROL_OFFSET.max(start.distance_to(end) * CONTROL_OFFSET_RATIO)
}

/// Evaluate a cubic bezier at `t` by repeated linear interpolation
pub fn de_casteljau(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let a = p0.lerp(p1, t);
    let b = p1.lerp(p2, t);
    let c = p2.lerp(p3, t);
    let d = a.lerp(b, t);
    let e = b.lerp(c, t);
    d.lerp(e, t)
}

impl ConnectorPath {
    /// Path between two node boxes leaving and entering at the given ports
    pub fn between(
        from: &Rectangle,
        from_port: Port,
        to: &Rectangle,
        to_port: Port,
        style: CurveStyle,
    ) -> Self {
        let start = from_port.anchor(from);
        let end = to_port.anchor(to);

        match style {
            CurveStyle::Straight => ConnectorPath::Line { start, end },
            CurveStyle::Orthogonal => {
                if from_port.is_horizontal() {
                    let mx = (start.x + end.x) / 2.0;
                    ConnectorPath::Orthogonal {
                        start,
                        bend_a: Point::new(mx, start.y),
                        bend_b: Point::new(mx, end.y),
                        end,
                    }
                } else {
                    let my = (start.y + end.y) / 2.0;
                    ConnectorPath::Orthogonal {
                        start,
                        bend_a: Point::new(start.x, my),
                        bend_b: Point::new(end.x, my),
                        end,
                    }
                }
            }
            CurveStyle::Bezier => {
                let offset = control_offset(start, end);
                ConnectorPath::Cubic {
                    start,
                    c1: start.offset(from_port.normal(), offset),
                    c2: end.offset(to_port.normal(), offset),
                    end,
                }
            }
        }
    }

    /// Rubber-band path while a connection is being dragged to the pointer
    pub fn pending(start: Point, from_port: Port, pointer: Point) -> Self {
        let offset = control_offset(start, pointer);
        ConnectorPath::Cubic {
            start,
            c1: start.offset(from_port.normal(), offset),
            c2: pointer,
            end: pointer,
        }
    }

    pub fn start(&self) -> Point {
        match *self {
            ConnectorPath::Line { start, .. }
            | ConnectorPath::Orthogonal { start, .. }
            | ConnectorPath::Cubic { start, .. } => start,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            ConnectorPath::Line { end, .. }
            | ConnectorPath::Orthogonal { end, .. }
            | ConnectorPath::Cubic { end, .. } => end,
        }
    }

    /// Point on the path at parameter `t` in `[0, 1]`.
    ///
    /// Orthogonal paths are parameterised by arc length.
    pub fn point_at(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        match *self {
            ConnectorPath::Line { start, end } => start.lerp(end, t),
            ConnectorPath::Cubic { start, c1, c2, end } => de_casteljau(start, c1, c2, end, t),
            ConnectorPath::Orthogonal {
                start,
                bend_a,
                bend_b,
                end,
            } => {
                let segments = [(start, bend_a), (bend_a, bend_b), (bend_b, end)];
                let total: f64 = segments.iter().map(|(a, b)| a.distance_to(*b)).sum();
                if total == 0.0 {
                    return start;
                }

                let mut remaining = total * t;
                for (a, b) in segments {
                    let len = a.distance_to(b);
                    if remaining <= len {
                        return if len == 0.0 { a } else { a.lerp(b, remaining / len) };
                    }
                    remaining -= len;
                }
                end
            }
        }
    }

    /// Anchor for labels and insertion markers, on the rendered path
    pub fn midpoint(&self) -> Point {
        match *self {
            ConnectorPath::Line { start, end } => start.midpoint(end),
            // The middle segment passes through the arithmetic midpoint
            ConnectorPath::Orthogonal { start, end, .. } => start.midpoint(end),
            ConnectorPath::Cubic { start, c1, c2, end } => de_casteljau(start, c1, c2, end, 0.5),
        }
    }

    /// SVG path data for the renderer
    pub fn to_svg(&self) -> String {
        let mut d = String::new();
        // Writing into a String cannot fail
        let _ = match *self {
            ConnectorPath::Line { start, end } => {
                write!(d, "M {} {} L {} {}", start.x, start.y, end.x, end.y)
            }
            ConnectorPath::Orthogonal {
                start,
                bend_a,
                bend_b,
                end,
            } => write!(
                d,
                "M {} {} L {} {} L {} {} L {} {}",
                start.x, start.y, bend_a.x, bend_a.y, bend_b.x, bend_b.y, end.x, end.y
            ),
            ConnectorPath::Cubic { start, c1, c2, end } => write!(
                d,
                "M {} {} C {} {}, {} {}, {} {}",
                start.x, start.y, c1.x, c1.y, c2.x, c2.y, end.x, end.y
            ),
        };
        d
    }
}
