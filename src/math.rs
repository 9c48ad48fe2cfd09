//! Deterministic fixed-point vector math.
//!
//! Every query in this crate runs on [`Scalar`], a signed Q32.32 fixed-point number. Identical
//! inputs produce bit-identical outputs on every platform, which is what a lockstep or rollback
//! simulation needs. Floating-point types only appear at the edges, as conversions from and to
//! `glam`.
//!
//! Q32.32 trades range for precision: reduction code multiplies up to four coordinates
//! together, so Minkowski-space coordinates should stay within roughly ±100 units.

use std::{
    fmt,
    ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign},
};

use fixed::types::I32F32;

/// The fixed-point scalar type used throughout the crate.
pub type Scalar = I32F32;

/// One half.
pub const HALF: Scalar = Scalar::from_bits(1 << 31);

/// Computes the square root of a non-negative scalar.
///
/// Negative inputs yield zero. The result is the floor of the exact root at Q32.32 resolution
/// and does not depend on the platform's floating-point unit.
#[inline]
pub fn sqrt(value: Scalar) -> Scalar {
    value.checked_sqrt().unwrap_or(Scalar::ZERO)
}

/// A three-dimensional vector of fixed-point scalars.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3::splat(Scalar::ZERO);
    pub const ONE: Vector3 = Vector3::splat(Scalar::ONE);
    pub const X: Vector3 = Vector3::new(Scalar::ONE, Scalar::ZERO, Scalar::ZERO);
    pub const Y: Vector3 = Vector3::new(Scalar::ZERO, Scalar::ONE, Scalar::ZERO);
    pub const Z: Vector3 = Vector3::new(Scalar::ZERO, Scalar::ZERO, Scalar::ONE);

    #[inline]
    pub const fn new(x: Scalar, y: Scalar, z: Scalar) -> Vector3 {
        Vector3 { x, y, z }
    }

    #[inline]
    pub const fn splat(v: Scalar) -> Vector3 {
        Vector3 { x: v, y: v, z: v }
    }

    /// Constructs a vector from any numeric type `fixed` can convert from.
    ///
    /// Panics if a component does not fit in a [`Scalar`].
    #[inline]
    pub fn from_num<T: fixed::traits::ToFixed>(x: T, y: T, z: T) -> Vector3 {
        Vector3::new(Scalar::from_num(x), Scalar::from_num(y), Scalar::from_num(z))
    }

    #[inline]
    pub fn dot(self, rhs: Vector3) -> Scalar {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn cross(self, rhs: Vector3) -> Vector3 {
        Vector3 {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[inline]
    pub fn length_squared(self) -> Scalar {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> Scalar {
        sqrt(self.length_squared())
    }

    /// Returns `self` scaled to unit length, or `None` if the squared length is at most
    /// `min_length_squared` or too small to divide by.
    pub fn try_normalize(self, min_length_squared: Scalar) -> Option<Vector3> {
        let length_squared = self.length_squared();
        if length_squared <= min_length_squared {
            return None;
        }

        let length = sqrt(length_squared);
        Some(Vector3 {
            x: self.x.checked_div(length)?,
            y: self.y.checked_div(length)?,
            z: self.z.checked_div(length)?,
        })
    }

    /// Returns `self` scaled to unit length, or `fallback` if `self` is (nearly) zero.
    #[inline]
    pub fn normalize_or(self, fallback: Vector3) -> Vector3 {
        self.try_normalize(Scalar::ZERO).unwrap_or(fallback)
    }

    #[inline]
    pub fn normalize_or_zero(self) -> Vector3 {
        self.normalize_or(Vector3::ZERO)
    }

    #[inline]
    pub fn to_array(self) -> [Scalar; 3] {
        [self.x, self.y, self.z]
    }
}

impl fmt::Debug for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    #[inline]
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vector3) {
        *self = *self + rhs;
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    #[inline]
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vector3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vector3) {
        *self = *self - rhs;
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    #[inline]
    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<Scalar> for Vector3 {
    type Output = Vector3;

    #[inline]
    fn mul(self, rhs: Scalar) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul<Vector3> for Scalar {
    type Output = Vector3;

    #[inline]
    fn mul(self, rhs: Vector3) -> Vector3 {
        rhs * self
    }
}

impl MulAssign<Scalar> for Vector3 {
    #[inline]
    fn mul_assign(&mut self, rhs: Scalar) {
        *self = *self * rhs;
    }
}

impl Div<Scalar> for Vector3 {
    type Output = Vector3;

    /// Panics if `rhs` is zero.
    #[inline]
    fn div(self, rhs: Scalar) -> Vector3 {
        Vector3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl From<glam::Vec3> for Vector3 {
    #[inline]
    fn from(v: glam::Vec3) -> Vector3 {
        Vector3::from_num(v.x, v.y, v.z)
    }
}

impl From<Vector3> for glam::Vec3 {
    #[inline]
    fn from(v: Vector3) -> glam::Vec3 {
        glam::Vec3::new(v.x.to_num(), v.y.to_num(), v.z.to_num())
    }
}

impl approx::AbsDiffEq for Vector3 {
    type Epsilon = Scalar;

    fn default_epsilon() -> Scalar {
        // 2^-20, a little under one micrometer.
        Scalar::from_bits(1 << 12)
    }

    fn abs_diff_eq(&self, other: &Vector3, epsilon: Scalar) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

/// A rotation quaternion of fixed-point scalars.
///
/// Quaternions are expected to be normalized; no operation here renormalizes implicitly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
    pub w: Scalar,
}

impl Default for Quaternion {
    #[inline]
    fn default() -> Self {
        Quaternion::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: Scalar::ZERO,
        y: Scalar::ZERO,
        z: Scalar::ZERO,
        w: Scalar::ONE,
    };

    #[inline]
    pub const fn from_xyzw(x: Scalar, y: Scalar, z: Scalar, w: Scalar) -> Quaternion {
        Quaternion { x, y, z, w }
    }

    #[inline]
    fn xyz(self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Returns the conjugate, which is the inverse rotation for a unit quaternion.
    #[inline]
    pub fn conjugate(self) -> Quaternion {
        Quaternion {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Rotates `v` by this quaternion.
    #[inline]
    pub fn rotate(self, v: Vector3) -> Vector3 {
        // v' = v + 2w(q × v) + 2q × (q × v)
        let q = self.xyz();
        let t = q.cross(v);
        let t = t + t;
        v + t * self.w + q.cross(t)
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    /// Hamilton product. `(a * b).rotate(v)` equals `a.rotate(b.rotate(v))`.
    #[inline]
    fn mul(self, rhs: Quaternion) -> Quaternion {
        let a = self;
        let b = rhs;
        Quaternion {
            x: a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            y: a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            z: a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        }
    }
}

impl From<glam::Quat> for Quaternion {
    #[inline]
    fn from(q: glam::Quat) -> Quaternion {
        Quaternion {
            x: Scalar::from_num(q.x),
            y: Scalar::from_num(q.y),
            z: Scalar::from_num(q.z),
            w: Scalar::from_num(q.w),
        }
    }
}

impl From<Quaternion> for glam::Quat {
    #[inline]
    fn from(q: Quaternion) -> glam::Quat {
        glam::Quat::from_xyzw(q.x.to_num(), q.y.to_num(), q.z.to_num(), q.w.to_num())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn s(v: f32) -> Scalar {
        Scalar::from_num(v)
    }

    #[test]
    fn sqrt_exact_squares() {
        for i in 0..100 {
            let v = Scalar::from_num(i);
            assert_eq!(sqrt(v * v), v);
        }

        assert_eq!(sqrt(s(0.25)), HALF);
        assert_eq!(sqrt(-Scalar::ONE), Scalar::ZERO);
    }

    #[test]
    fn sqrt_is_floor() {
        let two = Scalar::from_num(2);
        let root = sqrt(two);
        assert!(root * root <= two);

        let next = root + Scalar::DELTA;
        assert!(next * next > two);
    }

    #[test]
    fn normalize() {
        let v = Vector3::from_num(3, 0, 4);
        assert_abs_diff_eq!(
            v.try_normalize(Scalar::ZERO).unwrap(),
            Vector3::from_num(0.6, 0.0, 0.8)
        );

        assert!(Vector3::ZERO.try_normalize(Scalar::ZERO).is_none());
        assert_eq!(Vector3::ZERO.normalize_or(Vector3::Y), Vector3::Y);
    }

    #[test]
    fn quaternion_rotation_matches_glam() {
        let quat = glam::Quat::from_rotation_y(0.7) * glam::Quat::from_rotation_x(-1.3);
        let point = glam::Vec3::new(1.0, -2.0, 0.5);

        let expected = Vector3::from(quat * point);
        let rotated = Quaternion::from(quat).rotate(Vector3::from(point));

        assert_abs_diff_eq!(rotated, expected, epsilon = s(1.0e-4));
    }

    #[test]
    fn quaternion_product_composes() {
        let a = Quaternion::from(glam::Quat::from_rotation_z(0.4));
        let b = Quaternion::from(glam::Quat::from_rotation_x(1.1));
        let v = Vector3::from_num(0.3, 1.0, -0.2);

        assert_abs_diff_eq!(
            (a * b).rotate(v),
            a.rotate(b.rotate(v)),
            epsilon = s(1.0e-6)
        );
        assert_abs_diff_eq!(
            a.conjugate().rotate(a.rotate(v)),
            v,
            epsilon = s(1.0e-6)
        );
    }

    #[test]
    fn cross_product_axes() {
        assert_eq!(Vector3::X.cross(Vector3::Y), Vector3::Z);
        assert_eq!(Vector3::Y.cross(Vector3::Z), Vector3::X);
        assert_eq!(Vector3::Z.cross(Vector3::X), Vector3::Y);
    }
}
