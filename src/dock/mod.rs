//! Drag-and-snap floating view
//!
//! `FloatingDock` holds the state of a view that can be dragged freely inside a
//! bounding rectangle and, when released, glides to rest against the nearer
//! horizontal edge ("magnetic docking"). It is pure geometry; the terminal UI
//! feeds it mouse offsets and reads back the position to draw at.

mod animation;
mod geometry;

pub use animation::{SnapAnimation, DEFAULT_SNAP_DURATION};
pub use geometry::{clamp, Bounds, DockAlignment, Margins, Point, Size};

use std::time::Duration;

/// State of a draggable view that snaps to the left or right edge
#[derive(Debug, Clone)]
pub struct FloatingDock {
    bounds: Bounds,
    margins: Margins,
    alignment: DockAlignment,
    /// Known once the content has been laid out
    size: Option<Size>,
    /// Where the view is drawn right now
    position: Point,
    /// Where the last drag (or the initial placement) left the view
    rest: Point,
    animation: Option<SnapAnimation>,
    snap_duration: Duration,
}

impl FloatingDock {
    /// Creates a dock inside `bounds`. It stays unplaced until [`measure`]
    /// reports the content size.
    ///
    /// [`measure`]: FloatingDock::measure
    pub fn new(bounds: Bounds, alignment: DockAlignment, margins: Margins) -> Self {
        Self {
            bounds,
            margins,
            alignment,
            size: None,
            position: Point::default(),
            rest: Point::default(),
            animation: None,
            snap_duration: DEFAULT_SNAP_DURATION,
        }
    }

    /// Overrides the snap animation length
    pub fn with_snap_duration(mut self, duration: Duration) -> Self {
        self.snap_duration = duration;
        self
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn size(&self) -> Option<Size> {
        self.size
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn rest_position(&self) -> Point {
        self.rest
    }

    pub fn is_placed(&self) -> bool {
        self.size.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Records the laid-out size of the content.
    ///
    /// The first call places the view from its alignment and margins; later
    /// calls only update the size. Returns `true` when the view was placed.
    pub fn measure(&mut self, size: Size) -> bool {
        let first = self.size.is_none();
        self.size = Some(size);

        if first {
            let placed = self.alignment.place(&self.bounds, &self.margins, size);
            self.position = placed;
            self.rest = placed;
        }

        first
    }

    /// Moves the view to its resting position plus the cumulative drag
    /// `offset`, clamped so it stays fully inside the bounds.
    pub fn drag_update(&mut self, offset: Point) -> Point {
        let Some(size) = self.size else {
            return self.position;
        };

        self.animation = None;
        let wanted = self.rest + offset;
        self.position = Point::new(
            clamp(wanted.x, self.bounds.start, self.bounds.end - size.width),
            clamp(wanted.y, self.bounds.top, self.bounds.bottom - size.height),
        );
        self.position
    }

    /// Ends a drag: picks the nearer horizontal edge, clamps the vertical
    /// position inside the margins, starts the snap animation and records the
    /// target as the new resting position.
    ///
    /// A view at or left of the horizontal center goes to the left edge.
    pub fn drag_end(&mut self) -> Point {
        let Some(size) = self.size else {
            return self.position;
        };

        let target = self.snap_target(self.position, size);
        self.animation = Some(SnapAnimation::new(
            self.position,
            target,
            self.snap_duration,
        ));
        self.rest = target;
        target
    }

    /// Steps the snap animation by `dt` and returns the position to draw at
    pub fn advance(&mut self, dt: Duration) -> Point {
        if let Some(animation) = self.animation.as_mut() {
            self.position = animation.advance(dt);
            if animation.is_finished() {
                self.animation = None;
            }
        }
        self.position
    }

    /// Replaces the bounds (e.g. the terminal was resized) and pulls the view
    /// back inside them, keeping the edge margins.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        let Some(size) = self.size else {
            return;
        };

        self.animation = None;
        let fitted = Point::new(
            clamp(
                self.rest.x,
                bounds.start + self.margins.start,
                bounds.end - size.width - self.margins.end,
            ),
            clamp(
                self.rest.y,
                bounds.top + self.margins.top,
                bounds.bottom - size.height - self.margins.bottom,
            ),
        );
        self.rest = fitted;
        self.position = fitted;
    }

    /// Whether `point` falls on the view
    pub fn contains(&self, point: Point) -> bool {
        let Some(size) = self.size else {
            return false;
        };
        point.x >= self.position.x
            && point.x < self.position.x + size.width
            && point.y >= self.position.y
            && point.y < self.position.y + size.height
    }

    fn snap_target(&self, current: Point, size: Size) -> Point {
        let bounds = &self.bounds;
        let margins = &self.margins;

        let x = if current.x <= bounds.center_x() {
            bounds.start + margins.start
        } else {
            bounds.end - size.width - margins.end
        };
        let y = clamp(
            current.y,
            bounds.top + margins.top,
            bounds.bottom - size.height - margins.bottom,
        );

        Point::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Size = Size::new(20.0, 10.0);

    fn placed_dock(alignment: DockAlignment, margins: Margins) -> FloatingDock {
        let mut dock = FloatingDock::new(Bounds::screen(100.0, 50.0), alignment, margins);
        dock.measure(SIZE);
        dock
    }

    #[test]
    fn test_unmeasured_dock_ignores_drags() {
        let mut dock = FloatingDock::new(
            Bounds::screen(100.0, 50.0),
            DockAlignment::Center,
            Margins::default(),
        );

        assert!(!dock.is_placed());
        assert_eq!(dock.drag_update(Point::new(30.0, 30.0)), Point::default());
        assert_eq!(dock.drag_end(), Point::default());
        assert!(!dock.is_animating());
    }

    #[test]
    fn test_measure_places_once() {
        let mut dock = FloatingDock::new(
            Bounds::screen(100.0, 50.0),
            DockAlignment::BottomEnd,
            Margins::uniform(1.0),
        );

        assert!(dock.measure(SIZE));
        assert_eq!(dock.position(), Point::new(79.0, 39.0));
        assert_eq!(dock.rest_position(), Point::new(79.0, 39.0));

        dock.drag_update(Point::new(-40.0, -20.0));
        assert!(!dock.measure(Size::new(22.0, 12.0)));
        assert_eq!(dock.position(), Point::new(39.0, 19.0));
        assert_eq!(dock.size(), Some(Size::new(22.0, 12.0)));
    }

    #[test]
    fn test_drag_moves_from_rest_position() {
        let mut dock = placed_dock(DockAlignment::TopStart, Margins::default());

        assert_eq!(dock.drag_update(Point::new(5.0, 3.0)), Point::new(5.0, 3.0));
        // Offsets are cumulative from drag start, not incremental
        assert_eq!(dock.drag_update(Point::new(7.0, 4.0)), Point::new(7.0, 4.0));
    }

    #[test]
    fn test_drag_clamps_to_far_edge() {
        let mut dock = placed_dock(DockAlignment::TopStart, Margins::default());

        let pos = dock.drag_update(Point::new(500.0, 500.0));

        assert_eq!(pos.x, 100.0 - SIZE.width);
        assert_eq!(pos.y, 50.0 - SIZE.height);
    }

    #[test]
    fn test_drag_clamps_to_near_edge_ignoring_margins() {
        let mut dock = placed_dock(DockAlignment::Center, Margins::uniform(4.0));

        let pos = dock.drag_update(Point::new(-500.0, -500.0));

        assert_eq!(pos, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_release_left_of_center_snaps_left() {
        let mut dock = placed_dock(DockAlignment::TopStart, Margins::uniform(2.0));

        dock.drag_update(Point::new(20.0, 10.0));
        let target = dock.drag_end();

        assert_eq!(target, Point::new(2.0, 12.0));
        assert_eq!(dock.rest_position(), target);
    }

    #[test]
    fn test_release_right_of_center_snaps_right() {
        let mut dock = placed_dock(DockAlignment::TopStart, Margins::uniform(2.0));

        dock.drag_update(Point::new(60.0, 10.0));
        let target = dock.drag_end();

        assert_eq!(target, Point::new(100.0 - SIZE.width - 2.0, 12.0));
    }

    #[test]
    fn test_release_exactly_at_center_snaps_left() {
        let mut dock = placed_dock(DockAlignment::TopStart, Margins::default());

        dock.drag_update(Point::new(50.0, 0.0));
        assert_eq!(dock.position().x, 50.0);

        let target = dock.drag_end();

        assert_eq!(target.x, 0.0);
    }

    #[test]
    fn test_release_clamps_y_inside_margins() {
        let mut dock = placed_dock(DockAlignment::TopStart, Margins::uniform(3.0));

        dock.drag_update(Point::new(0.0, 100.0));
        assert_eq!(dock.position().y, 40.0);

        let target = dock.drag_end();
        assert_eq!(target.y, 50.0 - SIZE.height - 3.0);

        dock.drag_update(Point::new(0.0, -100.0));
        assert_eq!(dock.drag_end().y, 3.0);
    }

    #[test]
    fn test_snap_animates_to_target() {
        let mut dock = placed_dock(DockAlignment::TopStart, Margins::default())
            .with_snap_duration(Duration::from_millis(100));

        dock.drag_update(Point::new(30.0, 5.0));
        let target = dock.drag_end();
        assert!(dock.is_animating());
        assert_eq!(dock.position(), Point::new(30.0, 5.0));

        let mid = dock.advance(Duration::from_millis(50));
        assert!(mid.x < 30.0 && mid.x > target.x);

        let end = dock.advance(Duration::from_millis(60));
        assert_eq!(end, target);
        assert!(!dock.is_animating());
    }

    #[test]
    fn test_new_drag_cancels_animation() {
        let mut dock = placed_dock(DockAlignment::TopStart, Margins::default());

        dock.drag_update(Point::new(70.0, 5.0));
        let target = dock.drag_end();
        dock.advance(Duration::from_millis(10));

        let pos = dock.drag_update(Point::new(-10.0, 0.0));

        assert!(!dock.is_animating());
        assert_eq!(pos, Point::new(target.x - 10.0, target.y));
    }

    #[test]
    fn test_set_bounds_pulls_view_inside() {
        let mut dock = placed_dock(DockAlignment::BottomEnd, Margins::uniform(1.0));
        assert_eq!(dock.rest_position(), Point::new(79.0, 39.0));

        dock.set_bounds(Bounds::screen(60.0, 30.0));

        assert_eq!(dock.position(), Point::new(39.0, 19.0));
        assert_eq!(dock.rest_position(), Point::new(39.0, 19.0));
    }

    #[test]
    fn test_view_larger_than_bounds_pins_to_start() {
        let mut dock = FloatingDock::new(
            Bounds::screen(10.0, 5.0),
            DockAlignment::TopStart,
            Margins::default(),
        );
        dock.measure(SIZE);

        let pos = dock.drag_update(Point::new(3.0, 3.0));

        assert_eq!(pos, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_contains() {
        let dock = placed_dock(DockAlignment::TopStart, Margins::default());

        assert!(dock.contains(Point::new(0.0, 0.0)));
        assert!(dock.contains(Point::new(19.0, 9.0)));
        assert!(!dock.contains(Point::new(20.0, 5.0)));
        assert!(!dock.contains(Point::new(5.0, 10.0)));
    }
}
