//! Geometric primitives: 2D vectors and fixed-point angles
//!
//! Angles are stored in 1/65536ths of a full turn in a wrapping `i16`,
//! so a half turn is `±32768` and the difference of any two angles is
//! computed modulo a full turn. This keeps angle comparisons branch-free
//! and makes "opposite direction" a single wrapping add.

use std::f32::consts::PI;
use std::ops::{Add, Sub};

/// A half turn in angle units.
pub const ANGLE_PI: i32 = 32768;

/// Direction stored as a wrapping 16-bit fraction of a full turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Angle(pub i16);

impl Angle {
    pub const ZERO: Angle = Angle(0);

    /// Direction of the vector `(dx, dy)`.
    ///
    /// Rounded to the nearest angle unit; a half turn wraps to the
    /// negative representative, so `from_dxdy(-1.0, 0.0)` is `-32768`
    /// which compares equal to `+32768` under [`Angle::diff`].
    pub fn from_dxdy(dx: f32, dy: f32) -> Angle {
        Angle((dy.atan2(dx) * ANGLE_PI as f32 / PI + 0.5) as i32 as i16)
    }

    /// The reverse direction (half a turn away).
    pub fn opposite(self) -> Angle {
        Angle(self.0.wrapping_add(i16::MIN))
    }

    /// Magnitude of the wrapped difference to `other`, in `0..=32768`.
    pub fn diff(self, other: Angle) -> i32 {
        (self.0.wrapping_sub(other.0) as i32).abs()
    }

    /// Raw angle units.
    #[inline]
    pub fn units(self) -> i16 {
        self.0
    }
}

/// 2D vector with single-precision components.
///
/// Used for stroke centers, sample offsets, and intermediate geometry.
/// Grid coordinates themselves are stored as `i8` in [`crate::Point`];
/// `Vec2` carries the fractional results of weighting and projection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Vec2 {
        Vec2 { x, y }
    }

    /// Squared magnitude.
    #[inline]
    pub fn square(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean magnitude.
    #[inline]
    pub fn mag(self) -> f32 {
        self.square().sqrt()
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product; its magnitude is the
    /// perpendicular distance when `other` is a unit vector.
    #[inline]
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn scaled(self, scale: f32) -> Vec2 {
        Vec2::new(self.x * scale, self.y * scale)
    }

    /// Unit vector and original magnitude.
    pub fn normalized(self) -> (Vec2, f32) {
        let mag = self.mag();
        (Vec2::new(self.x / mag, self.y / mag), mag)
    }

    /// Projection of `self` onto `other`.
    pub fn projected_onto(self, other: Vec2) -> Vec2 {
        let dist = self.dot(other);
        other.scaled(dist / other.square())
    }

    /// Direction of this vector as an [`Angle`].
    pub fn angle(self) -> Angle {
        Angle::from_dxdy(self.x, self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_cardinal_directions() {
        assert_eq!(Angle::from_dxdy(1.0, 0.0), Angle(0));
        assert_eq!(Angle::from_dxdy(0.0, 1.0), Angle(16384));
        // Truncation after +0.5 biases negative angles by one unit.
        assert_eq!(Angle::from_dxdy(0.0, -1.0), Angle(-16383));
        // A half turn wraps to the negative representative.
        assert_eq!(Angle::from_dxdy(-1.0, 0.0), Angle(i16::MIN));
    }

    #[test]
    fn angle_diff_wraps_around() {
        let a = Angle(32000);
        let b = Angle(-32000);
        // Going "the short way" across the wrap point.
        assert_eq!(a.diff(b), 1536);
        assert_eq!(b.diff(a), 1536);
        // Opposite directions are a half turn apart.
        assert_eq!(Angle(0).diff(Angle(0).opposite()), ANGLE_PI);
    }

    #[test]
    fn opposite_is_involution() {
        for units in [-30000i16, -1, 0, 1, 12345, 32767] {
            let a = Angle(units);
            assert_eq!(a.opposite().opposite(), a);
        }
    }

    #[test]
    fn projection_onto_axis() {
        let v = Vec2::new(3.0, 4.0);
        let onto = Vec2::new(10.0, 0.0);
        let p = v.projected_onto(onto);
        assert!((p.x - 3.0).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
    }

    #[test]
    fn normalized_returns_magnitude() {
        let (unit, mag) = Vec2::new(3.0, 4.0).normalized();
        assert!((mag - 5.0).abs() < 1e-6);
        assert!((unit.mag() - 1.0).abs() < 1e-6);
    }
}
