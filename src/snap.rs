//! Alignment and equal-spacing snapping for drag gestures
//!
//! Thresholds are in canvas pixels and do not scale with zoom.

use crate::{Point, Rectangle};
use serde::{Deserialize, Serialize};

/// Default snap distance
pub const SNAP_THRESHOLD: f64 = 8.0;

/// Equal spacing is only offered for gaps wider than this
pub const MIN_EQUAL_GAP: f64 = 4.0;

const SAME_POSITION_EPSILON: f64 = 1e-6;

/// How an item takes part in alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapRole {
    /// Edges and centers align; the item also counts as a spacing neighbour
    Full,
    /// Only the center aligns (groups)
    CenterOnly,
}

/// A stationary item the moving box can snap against
#[derive(Debug, Clone, PartialEq)]
pub struct SnapItem {
    pub id: String,
    pub bounds: Rectangle,
    pub role: SnapRole,
}

impl SnapItem {
    pub fn new(id: impl Into<String>, bounds: Rectangle, role: SnapRole) -> Self {
        Self {
            id: id.into(),
            bounds,
            role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// One measured gap, drawn perpendicular to `cross`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapSegment {
    pub from: f64,
    pub to: f64,
    pub cross: f64,
}

/// The two equal gaps on either side of the moving item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpacingGuide {
    pub axis: Axis,
    pub before: GapSegment,
    pub after: GapSegment,
    pub gap: f64,
}

/// Outcome of one snap pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapResult {
    pub x: f64,
    pub y: f64,
    /// Vertical guide lines at these x coordinates
    pub guides_x: Vec<f64>,
    /// Horizontal guide lines at these y coordinates
    pub guides_y: Vec<f64>,
    pub spacing: Vec<SpacingGuide>,
}

impl SnapResult {
    fn unsnapped(bounds: &Rectangle) -> Self {
        Self {
            x: bounds.x,
            y: bounds.y,
            ..Self::default()
        }
    }

    pub fn has_guides(&self) -> bool {
        !self.guides_x.is_empty() || !self.guides_y.is_empty() || !self.spacing.is_empty()
    }
}

/// One axis of a box: start, size
#[derive(Clone, Copy)]
struct Span {
    start: f64,
    size: f64,
}

impl Span {
    fn end(self) -> f64 {
        self.start + self.size
    }

    fn center(self) -> f64 {
        self.start + self.size / 2.0
    }
}

fn span(bounds: &Rectangle, axis: Axis) -> Span {
    match axis {
        Axis::X => Span {
            start: bounds.x,
            size: bounds.width,
        },
        Axis::Y => Span {
            start: bounds.y,
            size: bounds.height,
        },
    }
}

/// Candidate correction: new start of the moving span and the guide coordinate
#[derive(Clone, Copy)]
struct Candidate {
    start: f64,
    guide: f64,
    distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapEngine {
    pub threshold: f64,
    pub enabled: bool,
}

impl Default for SnapEngine {
    fn default() -> Self {
        Self::new(SNAP_THRESHOLD)
    }
}

impl SnapEngine {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            threshold: SNAP_THRESHOLD,
            enabled: false,
        }
    }

    /// Snap a proposed box for `moving_id` against the other items.
    ///
    /// Alignment runs first on each axis. Equal spacing only applies to an
    /// axis where no alignment fired.
    pub fn snap(&self, moving_id: &str, proposed: Rectangle, items: &[SnapItem]) -> SnapResult {
        let mut result = SnapResult::unsnapped(&proposed);
        if !self.enabled {
            return result;
        }

        let others: Vec<&SnapItem> = items.iter().filter(|it| it.id != moving_id).collect();

        let aligned_x = self.align_axis(&proposed, &others, Axis::X);
        let aligned_y = self.align_axis(&proposed, &others, Axis::Y);

        if let Some((x, guides)) = aligned_x {
            result.x = x;
            result.guides_x = guides;
        }
        if let Some((y, guides)) = aligned_y {
            result.y = y;
            result.guides_y = guides;
        }

        let current = proposed.moved_to(Point::new(result.x, result.y));
        if result.guides_x.is_empty() {
            if let Some((x, guide)) = self.equal_spacing(&current, &others, Axis::X) {
                result.x = x;
                result.spacing.push(guide);
            }
        }
        if result.guides_y.is_empty() {
            let current = current.moved_to(Point::new(result.x, current.y));
            if let Some((y, guide)) = self.equal_spacing(&current, &others, Axis::Y) {
                result.y = y;
                result.spacing.push(guide);
            }
        }

        result
    }

    /// Best alignment on one axis and every guide coordinate consistent with it
    fn align_axis(&self, moving: &Rectangle, others: &[&SnapItem], axis: Axis) -> Option<(f64, Vec<f64>)> {
        let m = span(moving, axis);
        let mut candidates = Vec::new();

        for item in others {
            let o = span(&item.bounds, axis);
            let candidate = match item.role {
                SnapRole::CenterOnly => self.try_match(m.center(), o.center(), o.center() - m.size / 2.0),
                SnapRole::Full => self
                    .try_match(m.start, o.start, o.start)
                    .or_else(|| self.try_match(m.end(), o.end(), o.end() - m.size))
                    .or_else(|| self.try_match(m.center(), o.center(), o.center() - m.size / 2.0))
                    .or_else(|| self.try_match(m.start, o.end(), o.end()))
                    .or_else(|| self.try_match(m.end(), o.start, o.start - m.size)),
            };
            candidates.extend(candidate);
        }

        let best = candidates
            .iter()
            .copied()
            .fold(None::<Candidate>, |best, c| match best {
                Some(b) if b.distance <= c.distance => Some(b),
                _ => Some(c),
            })?;

        let mut guides: Vec<f64> = Vec::new();
        for c in &candidates {
            if (c.start - best.start).abs() < SAME_POSITION_EPSILON
                && !guides.iter().any(|g| (g - c.guide).abs() < SAME_POSITION_EPSILON)
            {
                guides.push(c.guide);
            }
        }

        Some((best.start, guides))
    }

    fn try_match(&self, moving_coord: f64, target: f64, snapped_start: f64) -> Option<Candidate> {
        let distance = (moving_coord - target).abs();
        (distance < self.threshold).then_some(Candidate {
            start: snapped_start,
            guide: target,
            distance,
        })
    }

    /// Center the moving box between its nearest neighbours on `axis`
    fn equal_spacing(&self, moving: &Rectangle, others: &[&SnapItem], axis: Axis) -> Option<(f64, SpacingGuide)> {
        let cross_axis = match axis {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        };
        let m = span(moving, axis);
        let mc = span(moving, cross_axis);

        // Neighbours must overlap a band widened by half the moving size
        let band: Vec<&SnapItem> = others
            .iter()
            .copied()
            .filter(|it| it.role == SnapRole::Full)
            .filter(|it| {
                let c = span(&it.bounds, cross_axis);
                c.end() > mc.start - mc.size * 0.5 && c.start < mc.end() + mc.size * 0.5
            })
            .collect();

        let before = band
            .iter()
            .map(|it| span(&it.bounds, axis))
            .filter(|o| o.end() <= m.start + self.threshold)
            .max_by(|a, b| a.end().total_cmp(&b.end()))?;
        let after = band
            .iter()
            .map(|it| span(&it.bounds, axis))
            .filter(|o| o.start >= m.end() - self.threshold)
            .min_by(|a, b| a.start.total_cmp(&b.start))?;

        let equal_gap = (after.start - before.end() - m.size) / 2.0;
        let equal_start = before.end() + equal_gap;
        if equal_gap <= MIN_EQUAL_GAP || (m.start - equal_start).abs() >= self.threshold {
            return None;
        }

        let cross = mc.center();
        Some((
            equal_start,
            SpacingGuide {
                axis,
                before: GapSegment {
                    from: before.end(),
                    to: equal_start,
                    cross,
                },
                after: GapSegment {
                    from: equal_start + m.size,
                    to: after.start,
                    cross,
                },
                gap: equal_gap,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NODE_HEIGHT, NODE_WIDTH};

    fn node(id: &str, x: f64, y: f64) -> SnapItem {
        SnapItem::new(id, Rectangle::node_box(Point::new(x, y)), SnapRole::Full)
    }

    #[test]
    fn test_left_edge_snaps_with_single_guide() {
        let items = vec![node("m", 100.0, 0.0), node("n", 0.0, 0.0)];
        let proposed = Rectangle::node_box(Point::new(105.0, 400.0));

        let result = SnapEngine::default().snap("n", proposed, &items);

        assert_eq!(result.x, 100.0);
        assert_eq!(result.guides_x, vec![100.0]);
        assert!(result.guides_y.is_empty());
        assert_eq!(result.y, 400.0);
    }

    #[test]
    fn test_beyond_threshold_no_snap() {
        let items = vec![node("m", 100.0, 0.0)];
        let proposed = Rectangle::node_box(Point::new(108.5, 400.0));

        let result = SnapEngine::default().snap("n", proposed, &items);

        assert_eq!(result.x, 108.5);
        assert!(!result.has_guides());
    }

    #[test]
    fn test_right_to_left_abutting() {
        // Moving box's right edge lands on the other's left edge
        let items = vec![node("m", 500.0, 0.0)];
        let proposed = Rectangle::node_box(Point::new(500.0 - NODE_WIDTH + 3.0, 400.0));

        let result = SnapEngine::default().snap("n", proposed, &items);

        assert_eq!(result.x, 500.0 - NODE_WIDTH);
        assert_eq!(result.guides_x, vec![500.0]);
    }

    #[test]
    fn test_groups_contribute_centers_only() {
        let group = SnapItem::new("g", Rectangle::new(0.0, 0.0, 600.0, 300.0), SnapRole::CenterOnly);

        // Left edges coincide but groups do not offer edge alignment
        let result = SnapEngine::default().snap("n", Rectangle::node_box(Point::new(2.0, 500.0)), &[group.clone()]);
        assert!(result.guides_x.is_empty());

        let near_center = 300.0 - NODE_WIDTH / 2.0 + 5.0;
        let result = SnapEngine::default().snap("n", Rectangle::node_box(Point::new(near_center, 500.0)), &[group]);
        assert_eq!(result.x, 300.0 - NODE_WIDTH / 2.0);
        assert_eq!(result.guides_x, vec![300.0]);
    }

    #[test]
    fn test_equal_spacing_between_neighbours() {
        // Gap of 600 between a's right edge (230) and c's left edge (830)
        let items = vec![node("a", 0.0, 0.0), node("c", 830.0, 0.0)];
        let expected_x = 230.0 + (600.0 - NODE_WIDTH) / 2.0;
        let proposed = Rectangle::node_box(Point::new(expected_x + 5.0, 20.0));

        let result = SnapEngine::default().snap("b", proposed, &items);

        assert_eq!(result.x, expected_x);
        assert_eq!(result.spacing.len(), 1);
        let guide = result.spacing[0];
        assert_eq!(guide.axis, Axis::X);
        assert_eq!(guide.gap, 185.0);
        assert_eq!(guide.before.to - guide.before.from, guide.after.to - guide.after.from);
        assert_eq!(guide.before.cross, 20.0 + NODE_HEIGHT / 2.0);
    }

    #[test]
    fn test_alignment_takes_precedence_over_spacing() {
        // Both a left-edge alignment with d and equal spacing are in range on x
        let expected_spacing_x = 230.0 + (600.0 - NODE_WIDTH) / 2.0;
        let items = vec![
            node("a", 0.0, 0.0),
            node("c", 830.0, 0.0),
            node("d", expected_spacing_x + 6.0, 900.0),
        ];
        let proposed = Rectangle::node_box(Point::new(expected_spacing_x + 3.0, 20.0));

        let result = SnapEngine::default().snap("b", proposed, &items);

        assert_eq!(result.x, expected_spacing_x + 6.0);
        assert!(result.spacing.iter().all(|g| g.axis != Axis::X));
    }

    #[test]
    fn test_disabled_engine_passes_through() {
        let items = vec![node("m", 100.0, 0.0)];
        let proposed = Rectangle::node_box(Point::new(101.0, 1.0));

        let result = SnapEngine::disabled().snap("n", proposed, &items);

        assert_eq!((result.x, result.y), (101.0, 1.0));
        assert!(!result.has_guides());
    }
}
