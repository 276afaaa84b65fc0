//! Shared 2D primitives used by the avatar drag model.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerPoint {
    pub x: i32,
    pub y: i32,
}

impl PointerPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset_from(self, other: PointerPoint) -> (i32, i32) {
        (
            self.x.saturating_sub(other.x),
            self.y.saturating_sub(other.y),
        )
    }

    /// True when the point moved more than `threshold` from `origin` along either axis.
    pub fn exceeds_displacement(self, origin: PointerPoint, threshold: i32) -> bool {
        let (dx, dy) = self.offset_from(origin);
        dx.saturating_abs() > threshold || dy.saturating_abs() > threshold
    }
}
