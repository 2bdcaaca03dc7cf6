//! Plain geometry types used by the floating dock

/// A position in the dock's coordinate space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Measured size of the dock content
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Rectangle the dock may move within
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub start: f64,
    pub top: f64,
    pub end: f64,
    pub bottom: f64,
}

impl Bounds {
    pub const fn new(start: f64, top: f64, end: f64, bottom: f64) -> Self {
        Self {
            start,
            top,
            end,
            bottom,
        }
    }

    /// Bounds covering a full screen of the given size
    pub fn screen(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Horizontal center, used to pick the snap edge
    pub fn center_x(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Distance kept from each edge when placing or snapping
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Margins {
    pub start: f64,
    pub top: f64,
    pub end: f64,
    pub bottom: f64,
}

impl Margins {
    /// Same margin on every edge
    pub const fn uniform(value: f64) -> Self {
        Self {
            start: value,
            top: value,
            end: value,
            bottom: value,
        }
    }
}

/// Where the dock is first placed inside its bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DockAlignment {
    TopStart,
    Top,
    TopEnd,
    Start,
    Center,
    End,
    BottomStart,
    Bottom,
    #[default]
    BottomEnd,
}

/// One axis of an alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Leading,
    Middle,
    Trailing,
}

impl DockAlignment {
    fn anchors(self) -> (Anchor, Anchor) {
        use Anchor::*;
        match self {
            DockAlignment::TopStart => (Leading, Leading),
            DockAlignment::Top => (Middle, Leading),
            DockAlignment::TopEnd => (Trailing, Leading),
            DockAlignment::Start => (Leading, Middle),
            DockAlignment::Center => (Middle, Middle),
            DockAlignment::End => (Trailing, Middle),
            DockAlignment::BottomStart => (Leading, Trailing),
            DockAlignment::Bottom => (Middle, Trailing),
            DockAlignment::BottomEnd => (Trailing, Trailing),
        }
    }

    /// Computes the top-left corner for a view of `size` placed by this
    /// alignment inside `bounds`, keeping `margins` from the anchored edges.
    pub fn place(self, bounds: &Bounds, margins: &Margins, size: Size) -> Point {
        let (horizontal, vertical) = self.anchors();

        let x = match horizontal {
            Anchor::Leading => bounds.start + margins.start,
            Anchor::Middle => bounds.start + (bounds.width() - size.width) / 2.0,
            Anchor::Trailing => bounds.end - size.width - margins.end,
        };
        let y = match vertical {
            Anchor::Leading => bounds.top + margins.top,
            Anchor::Middle => bounds.top + (bounds.height() - size.height) / 2.0,
            Anchor::Trailing => bounds.bottom - size.height - margins.bottom,
        };

        Point::new(x, y)
    }
}

/// Clamps `value` into `[min, max]`.
///
/// Unlike `f64::clamp` this does not panic when `min > max` (a view larger
/// than its bounds); the lower limit wins.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}
