use eframe::egui::{Pos2, Vec2, pos2};

const MOBILE_BREAKPOINT: f32 = 640.0;
const TABLET_BREAKPOINT: f32 = 1024.0;
const MOBILE_FLOOR: Dimensions = Dimensions::new(320.0, 360.0);
const TABLET_FLOOR: Dimensions = Dimensions::new(600.0, 480.0);
const DESKTOP_FLOOR: Dimensions = Dimensions::new(800.0, 560.0);

/// Smallest change, in logical pixels, that counts as a resize.
const RESIZE_THRESHOLD: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn from_size(size: Vec2) -> Self {
        Self::new(size.x, size.y)
    }

    pub fn center(self) -> Pos2 {
        pos2(self.width * 0.5, self.height * 0.5)
    }

    /// Applies the per-device minimum drawing size.
    pub fn with_floor(self) -> Self {
        let width = if self.width.is_finite() { self.width } else { 0.0 };
        let height = if self.height.is_finite() { self.height } else { 0.0 };
        let floor = if width < MOBILE_BREAKPOINT {
            MOBILE_FLOOR
        } else if width < TABLET_BREAKPOINT {
            TABLET_FLOOR
        } else {
            DESKTOP_FLOOR
        };
        Self::new(width.max(floor.width), height.max(floor.height))
    }

    fn differs_from(self, other: Self) -> bool {
        (self.width - other.width).abs() > RESIZE_THRESHOLD
            || (self.height - other.height).abs() > RESIZE_THRESHOLD
    }
}

/// Tracks the drawing area and reports only meaningful size changes.
#[derive(Debug, Default)]
pub struct DimensionObserver {
    current: Option<Dimensions>,
}

impl DimensionObserver {
    pub fn current(&self) -> Option<Dimensions> {
        self.current
    }

    /// Feeds the raw observed size; returns the floored dimensions when they
    /// should be published.
    pub fn observe(&mut self, raw: Dimensions) -> Option<Dimensions> {
        let next = raw.with_floor();
        if let Some(current) = self.current
            && !next.differs_from(current)
        {
            return None;
        }
        self.current = Some(next);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_depend_on_the_width_class() {
        assert_eq!(Dimensions::new(300.0, 100.0).with_floor(), MOBILE_FLOOR);
        assert_eq!(
            Dimensions::new(700.0, 300.0).with_floor(),
            Dimensions::new(700.0, 480.0)
        );
        assert_eq!(
            Dimensions::new(1200.0, 900.0).with_floor(),
            Dimensions::new(1200.0, 900.0)
        );
        assert_eq!(
            Dimensions::new(f32::NAN, 10.0).with_floor(),
            MOBILE_FLOOR
        );
    }

    #[test]
    fn small_jitter_is_not_published() {
        let mut observer = DimensionObserver::default();
        let first = observer.observe(Dimensions::new(1200.0, 800.0));
        assert_eq!(first, Some(Dimensions::new(1200.0, 800.0)));

        assert_eq!(observer.observe(Dimensions::new(1200.8, 799.5)), None);
        assert_eq!(
            observer.observe(Dimensions::new(1203.0, 800.0)),
            Some(Dimensions::new(1203.0, 800.0))
        );
        assert_eq!(observer.current(), Some(Dimensions::new(1203.0, 800.0)));
    }
}
