//! Deterministic narrow-phase convex collision queries.
//!
//! This crate implements the Gilbert-Johnson-Keerthi family of queries on fixed-point
//! arithmetic, for simulations that must replay bit-for-bit across machines:
//!
//! - [`gjk::are_shapes_intersecting`] and [`gjk::are_shapes_intersecting_warm`]
//! - [`gjk::closest_points`], warm-started by a [`CachedSimplex`]
//! - [`gjk::ray_cast`], [`gjk::sphere_cast`] and [`gjk::ccd_sphere_cast`]
//! - [`gjk::convex_cast`]
//!
//! Shapes participate through the [`SupportMapping`] trait. Queries never allocate and never
//! fail; non-convergence degrades to a conservative answer.

use std::ops::Mul;

pub mod collider;
pub mod gjk;
pub mod hull;
pub mod math;
pub mod minkowski;
pub mod settings;
pub mod simplex;
pub mod support;

#[doc(inline)]
pub use crate::{
    collider::ColliderShape,
    hull::ConvexHull,
    math::{Quaternion, Scalar, Vector3},
    settings::GjkSettings,
    simplex::{CachedSimplex, SimplexState},
    support::SupportMapping,
};

/// A rigid transformation: a rotation followed by a translation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RigidTransform {
    pub position: Vector3,
    pub orientation: Quaternion,
}

impl RigidTransform {
    pub const IDENTITY: Self = RigidTransform {
        position: Vector3::ZERO,
        orientation: Quaternion::IDENTITY,
    };

    #[inline]
    pub fn new(position: Vector3, orientation: Quaternion) -> RigidTransform {
        RigidTransform {
            position,
            orientation,
        }
    }

    pub fn from_position(position: Vector3) -> RigidTransform {
        RigidTransform {
            position,
            ..Default::default()
        }
    }

    pub fn from_orientation(orientation: Quaternion) -> RigidTransform {
        RigidTransform {
            orientation,
            ..Default::default()
        }
    }

    #[inline]
    pub fn inverse(self) -> RigidTransform {
        let orientation = self.orientation.conjugate();
        RigidTransform {
            orientation,
            position: -orientation.rotate(self.position),
        }
    }

    #[inline]
    pub fn transform_point(&self, point: Vector3) -> Vector3 {
        self.orientation.rotate(point) + self.position
    }

    #[inline]
    pub fn inverse_transform_point(&self, point: Vector3) -> Vector3 {
        self.orientation.conjugate().rotate(point - self.position)
    }

    #[inline]
    pub fn transform_direction(&self, direction: Vector3) -> Vector3 {
        self.orientation.rotate(direction)
    }

    #[inline]
    pub fn inverse_transform_direction(&self, direction: Vector3) -> Vector3 {
        self.orientation.conjugate().rotate(direction)
    }
}

impl Mul<RigidTransform> for RigidTransform {
    type Output = RigidTransform;

    /// Composes two transforms. `(a * b)` applies `b` first, then `a`.
    fn mul(self, rhs: RigidTransform) -> Self::Output {
        RigidTransform {
            orientation: self.orientation * rhs.orientation,
            position: self.orientation.rotate(rhs.position) + self.position,
        }
    }
}

impl Mul<Vector3> for RigidTransform {
    type Output = Vector3;

    #[inline]
    fn mul(self, rhs: Vector3) -> Self::Output {
        self.transform_point(rhs)
    }
}

/// A ray.
///
/// The direction is not normalized: distances along the ray are measured in multiples of the
/// direction's length.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    #[inline]
    pub fn new(origin: Vector3, direction: Vector3) -> Ray {
        Ray { origin, direction }
    }

    /// Returns the point at parameter `t` along the ray.
    #[inline]
    pub fn at(&self, t: Scalar) -> Vector3 {
        self.origin + self.direction * t
    }
}

/// The first point at which a ray or sweep touches a shape.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RayHit {
    /// Parameter along the ray, in multiples of the ray direction's length.
    pub t: Scalar,
    /// The hit location in world space.
    pub location: Vector3,
    /// The unit surface normal at the hit, or zero if the cast started inside the shape.
    pub normal: Vector3,
}

/// A line segment. Also usable as a zero-margin shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub a: Vector3,
    pub b: Vector3,
}

impl Segment {
    pub fn new(a: Vector3, b: Vector3) -> Segment {
        Segment { a, b }
    }
}

impl SupportMapping for Segment {
    fn extreme_point_without_margin(&self, direction: Vector3) -> Vector3 {
        let ab = self.b - self.a;

        if ab.dot(direction).is_negative() {
            self.a
        } else {
            self.b
        }
    }

    #[inline]
    fn margin(&self) -> Scalar {
        Scalar::ZERO
    }
}

/// A sphere.
///
/// The core shape is the center point; the radius is the collision margin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sphere {
    /// The center of the sphere.
    pub center: Vector3,
    /// The radius of the sphere.
    pub radius: Scalar,
}

impl Sphere {
    pub fn new(center: Vector3, radius: Scalar) -> Sphere {
        Sphere { center, radius }
    }
}

impl SupportMapping for Sphere {
    #[inline]
    fn extreme_point_without_margin(&self, _direction: Vector3) -> Vector3 {
        self.center
    }

    #[inline]
    fn margin(&self) -> Scalar {
        self.radius
    }

    /// Casts a local-space ray against the sphere analytically.
    fn ray_cast(&self, ray: &Ray, maximum_length: Scalar) -> Option<RayHit> {
        let offset = ray.origin - self.center;
        let b = offset.dot(ray.direction);
        let c = offset.length_squared() - self.radius * self.radius;

        // Origin outside and pointing away.
        if c.is_positive() && !b.is_negative() {
            return None;
        }

        if !c.is_positive() {
            // Origin is inside the sphere.
            return Some(RayHit {
                t: Scalar::ZERO,
                location: ray.origin,
                normal: Vector3::ZERO,
            });
        }

        let a = ray.direction.length_squared();
        let discriminant = b * b - a * c;
        if discriminant.is_negative() {
            return None;
        }

        let t = (-b - math::sqrt(discriminant)).checked_div(a)?;
        if t > maximum_length {
            return None;
        }

        let location = ray.at(t);
        Some(RayHit {
            t,
            location,
            normal: (location - self.center).normalize_or_zero(),
        })
    }
}

/// A capsule: a segment dilated by a radius.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Capsule {
    pub segment: Segment,
    pub radius: Scalar,
}

impl Capsule {
    /// Constructs a capsule centered on the origin whose segment spans `±half_length` along Y.
    pub fn new(half_length: Scalar, radius: Scalar) -> Capsule {
        let half = Vector3::new(Scalar::ZERO, half_length, Scalar::ZERO);
        Capsule {
            segment: Segment::new(-half, half),
            radius,
        }
    }
}

impl SupportMapping for Capsule {
    #[inline]
    fn extreme_point_without_margin(&self, direction: Vector3) -> Vector3 {
        self.segment.extreme_point_without_margin(direction)
    }

    #[inline]
    fn margin(&self) -> Scalar {
        self.radius
    }
}

/// A box centered on the origin.
///
/// The collision margin is carved out of the half extents, so margin-inclusive extreme points
/// lie on the box surface (with rounded edges).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cuboid {
    /// The half-extents of the box along each local axis.
    pub half_extents: Vector3,
    pub margin: Scalar,
}

impl Cuboid {
    /// Constructs a sharp-edged box.
    pub fn new(half_extents: Vector3) -> Cuboid {
        Cuboid {
            half_extents,
            margin: Scalar::ZERO,
        }
    }

    /// Constructs a box with rounded edges of radius `margin`.
    ///
    /// The margin is clamped to the smallest half extent.
    pub fn with_margin(half_extents: Vector3, margin: Scalar) -> Cuboid {
        let smallest = half_extents.x.min(half_extents.y).min(half_extents.z);
        Cuboid {
            half_extents,
            margin: margin.min(smallest).max(Scalar::ZERO),
        }
    }
}

impl SupportMapping for Cuboid {
    fn extreme_point_without_margin(&self, direction: Vector3) -> Vector3 {
        let core = self.half_extents - Vector3::splat(self.margin);
        let select = |d: Scalar, h: Scalar| if d.is_negative() { -h } else { h };

        Vector3::new(
            select(direction.x, core.x),
            select(direction.y, core.y),
            select(direction.z, core.z),
        )
    }

    #[inline]
    fn margin(&self) -> Scalar {
        self.margin
    }
}
