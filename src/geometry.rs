use serde::{Deserialize, Serialize};

/// Fixed width of a canvas node box (pixels)
pub const NODE_WIDTH: f64 = 230.0;

/// Fixed height of a canvas node box (pixels)
pub const NODE_HEIGHT: f64 = 84.0;

/// A point in canvas coordinates
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation towards `other` at parameter `t`
    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Arithmetic midpoint
    pub fn midpoint(&self, other: Point) -> Point {
        self.lerp(other, 0.5)
    }

    /// Offset by a vector scaled by `amount`
    pub fn offset(&self, (dx, dy): (f64, f64), amount: f64) -> Point {
        Point::new(self.x + dx * amount, self.y + dy * amount)
    }

    /// Approximate equality within `tolerance` on both axes
    pub fn approx_eq(&self, other: Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

/// Rectangle representing position and size on canvas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    /// Create a new rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A node-sized box at the given origin
    pub fn node_box(origin: Point) -> Self {
        Self::new(origin.x, origin.y, NODE_WIDTH, NODE_HEIGHT)
    }

    /// Get the right edge of the rectangle
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge of the rectangle
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same size, moved to a new origin
    pub fn moved_to(&self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }

    /// Check if this rectangle intersects with another
    pub fn intersects(&self, other: &Rectangle) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    /// Check if this rectangle contains a point
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rectangle::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Grow on every side by `pad`
    pub fn inflate(&self, pad: f64) -> Rectangle {
        Rectangle::new(
            self.x - pad,
            self.y - pad,
            self.width + pad * 2.0,
            self.height + pad * 2.0,
        )
    }
}

/// One of the four compass-oriented anchors on a node's boundary
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Port {
    Top,
    #[default]
    Right,
    Bottom,
    Left,
}

impl Port {
    pub const ALL: [Port; 4] = [Port::Top, Port::Right, Port::Bottom, Port::Left];

    /// Unit outward normal of the anchor
    pub fn normal(self) -> (f64, f64) {
        match self {
            Port::Top => (0.0, -1.0),
            Port::Right => (1.0, 0.0),
            Port::Bottom => (0.0, 1.0),
            Port::Left => (-1.0, 0.0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Port::Left | Port::Right)
    }

    /// Anchor position of this port on a box
    pub fn anchor(self, bounds: &Rectangle) -> Point {
        match self {
            Port::Top => Point::new(bounds.center_x(), bounds.y),
            Port::Right => Point::new(bounds.right(), bounds.center_y()),
            Port::Bottom => Point::new(bounds.center_x(), bounds.bottom()),
            Port::Left => Point::new(bounds.x, bounds.center_y()),
        }
    }
}

/// Zoom limits for wheel and button zoom
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Fit-to-content never zooms in further than this
pub const FIT_MAX_ZOOM: f64 = 2.0;
pub const FIT_PADDING: f64 = 40.0;

/// Screen transform of the canvas: `screen = canvas * zoom + pan`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::new(40.0, 40.0),
        }
    }
}

impl Viewport {
    pub fn new(zoom: f64, pan: Point) -> Self {
        Self { zoom, pan }
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.zoom + self.pan.x,
            canvas.y * self.zoom + self.pan.y,
        )
    }

    /// Zoom by `factor` keeping the screen point `anchor` fixed
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        let zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = zoom / self.zoom;
        self.pan = Point::new(
            anchor.x - (anchor.x - self.pan.x) * ratio,
            anchor.y - (anchor.y - self.pan.y) * ratio,
        );
        self.zoom = zoom;
    }

    /// Fit `content` into a screen of the given size.
    ///
    /// No content resets to the default transform.
    pub fn fit(content: Option<Rectangle>, width: f64, height: f64) -> Self {
        let Some(content) = content else {
            return Self::default();
        };
        let padded = content.inflate(FIT_PADDING);
        let zoom = (width / padded.width)
            .min(height / padded.height)
            .min(FIT_MAX_ZOOM);

        Self {
            zoom,
            pan: Point::new(
                (width - padded.width * zoom) / 2.0 - padded.x * zoom,
                (height - padded.height * zoom) / 2.0 - padded.y * zoom,
            ),
        }
    }

    /// Center a canvas point on screen, zooming in to at least `min_zoom`
    pub fn centered_on(&self, target: Point, width: f64, height: f64, min_zoom: f64) -> Self {
        let zoom = self.zoom.max(min_zoom);
        Self {
            zoom,
            pan: Point::new(width / 2.0 - target.x * zoom, height / 2.0 - target.y * zoom),
        }
    }
}
