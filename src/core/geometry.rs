//! World/screen coordinate types
//!
//! - WorldPos: 3D scene coordinate (owned by the data layer)
//! - ScreenPos: 2D pixel coordinate (produced by the host projection)
//! - Viewport: visible screen area in pixels

use serde::{Deserialize, Serialize};

// ============================================================================
// WorldPos - 3D world coordinate
// ============================================================================

/// 3D world-space position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPos {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    #[inline]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            self.scale(1.0 / len)
        } else {
            Self::ZERO
        }
    }

    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        self.sub(other).length()
    }
}

// ============================================================================
// ScreenPos - 2D pixel coordinate
// ============================================================================

/// 2D screen-space position in pixels, origin at the top-left corner.
///
/// Projections report points they cannot place (e.g. behind the camera)
/// with non-finite coordinates; those are treated as off-screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPos {
    pub x: f64,
    pub y: f64,
}

impl ScreenPos {
    pub const OFFSCREEN: Self = Self::new(f64::NAN, f64::NAN);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean pixel distance
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

// ============================================================================
// Viewport - visible screen rectangle
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Zero (or negative) area
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Whether `pos` lies inside the viewport grown by `margin` pixels on every side.
    pub fn contains_with_margin(&self, pos: ScreenPos, margin: f64) -> bool {
        pos.is_finite()
            && pos.x >= -margin
            && pos.x <= self.width + margin
            && pos.y >= -margin
            && pos.y <= self.height + margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_vector_ops() {
        let a = WorldPos::new(1.0, 0.0, 0.0);
        let b = WorldPos::new(0.0, 1.0, 0.0);
        assert_eq!(a.cross(b), WorldPos::new(0.0, 0.0, 1.0));
        assert_eq!(a.dot(b), 0.0);
        assert_eq!(WorldPos::new(3.0, 4.0, 0.0).length(), 5.0);
        assert_eq!(WorldPos::ZERO.normalize(), WorldPos::ZERO);
    }

    #[test]
    fn test_viewport_margin() {
        let vp = Viewport::new(100.0, 50.0);
        assert!(vp.contains_with_margin(ScreenPos::new(0.0, 0.0), 0.0));
        assert!(vp.contains_with_margin(ScreenPos::new(-20.0, 60.0), 20.0));
        assert!(!vp.contains_with_margin(ScreenPos::new(-20.1, 10.0), 20.0));
        assert!(!vp.contains_with_margin(ScreenPos::OFFSCREEN, 1e9));
    }

    #[test]
    fn test_empty_viewport() {
        assert!(Viewport::default().is_empty());
        assert!(Viewport::new(100.0, 0.0).is_empty());
        assert!(!Viewport::new(1.0, 1.0).is_empty());
    }
}
