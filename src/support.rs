//! The support-mapping contract between convex shapes and the GJK queries.

use crate::{
    gjk,
    math::{Scalar, Vector3},
    Ray, RayHit, RigidTransform,
};

/// Search direction substituted for a (nearly) zero-length direction.
pub const FALLBACK_AXIS: Vector3 = Vector3::X;

/// A trait for convex shapes which can compute extreme points in a given direction.
///
/// Shapes are described as a core convex set dilated by a spherical collision margin. All
/// directions and points are in the shape's local space.
pub trait SupportMapping {
    /// Computes the extreme point of the core shape, without the collision margin, in the
    /// direction given by `direction`.
    ///
    /// `direction` need not be normalized and may be zero.
    fn extreme_point_without_margin(&self, direction: Vector3) -> Vector3;

    /// Returns the radius of the collision margin surrounding the core shape.
    fn margin(&self) -> Scalar;

    /// Computes the extreme point of the shape, including its collision margin, in the direction
    /// given by `direction`.
    ///
    /// If `direction` is too short to normalize, [`FALLBACK_AXIS`] is used instead.
    #[inline]
    fn extreme_point(&self, direction: Vector3) -> Vector3 {
        let (direction, normal) = match direction.try_normalize(Scalar::ZERO) {
            Some(normal) => (direction, normal),
            None => (FALLBACK_AXIS, FALLBACK_AXIS),
        };

        self.extreme_point_without_margin(direction) + normal * self.margin()
    }

    /// Computes the extreme point of this shape, placed by `transform`, in the direction given by
    /// `direction`.
    ///
    /// The default implementation rotates `direction` into local space, calls `extreme_point`,
    /// and then applies `transform` to the local extreme point.
    #[inline]
    fn extreme_point_transformed(&self, transform: &RigidTransform, direction: Vector3) -> Vector3 {
        let local_direction = transform.inverse_transform_direction(direction);
        transform.transform_point(self.extreme_point(local_direction))
    }

    /// Like [`extreme_point_transformed`](Self::extreme_point_transformed), but ignores the
    /// collision margin.
    #[inline]
    fn extreme_point_without_margin_transformed(
        &self,
        transform: &RigidTransform,
        direction: Vector3,
    ) -> Vector3 {
        let local_direction = transform.inverse_transform_direction(direction);
        transform.transform_point(self.extreme_point_without_margin(local_direction))
    }

    /// Casts a local-space ray against the shape.
    ///
    /// The default implementation runs the GJK ray cast.
    fn ray_cast(&self, ray: &Ray, maximum_length: Scalar) -> Option<RayHit> {
        gjk::ray_cast(ray, self, &RigidTransform::IDENTITY, maximum_length)
    }
}

impl SupportMapping for Vector3 {
    #[inline]
    fn extreme_point_without_margin(&self, _direction: Vector3) -> Vector3 {
        *self
    }

    #[inline]
    fn margin(&self) -> Scalar {
        Scalar::ZERO
    }

    #[inline]
    fn extreme_point(&self, _direction: Vector3) -> Vector3 {
        *self
    }
}
