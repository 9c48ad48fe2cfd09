//! Support mapping over the Minkowski difference of two shapes.
//!
//! Every pair query first expresses shape B in shape A's local space with [`local_transform`].
//! From then on shape A sits at the origin in its own orientation, and all simplex arithmetic
//! happens in that frame.

use crate::{
    math::{Scalar, Vector3},
    RigidTransform, SupportMapping,
};

/// Computes the transform of B relative to A.
#[inline]
pub fn local_transform(transform_a: &RigidTransform, transform_b: &RigidTransform) -> RigidTransform {
    transform_a.inverse() * *transform_b
}

/// Computes the extreme point of the Minkowski difference `A - B` in the direction given by
/// `direction`, including both collision margins.
#[inline]
pub fn support<A, B>(
    shape_a: &A,
    shape_b: &B,
    direction: Vector3,
    local_transform_b: &RigidTransform,
) -> Vector3
where
    A: SupportMapping + ?Sized,
    B: SupportMapping + ?Sized,
{
    let on_a = shape_a.extreme_point(direction);
    let on_b = shape_b.extreme_point_transformed(local_transform_b, -direction);
    on_a - on_b
}

/// Like [`support`], but ignores both collision margins.
#[inline]
pub fn support_without_margin<A, B>(
    shape_a: &A,
    shape_b: &B,
    direction: Vector3,
    local_transform_b: &RigidTransform,
) -> Vector3
where
    A: SupportMapping + ?Sized,
    B: SupportMapping + ?Sized,
{
    let on_a = shape_a.extreme_point_without_margin(direction);
    let on_b = shape_b.extreme_point_without_margin_transformed(local_transform_b, -direction);
    on_a - on_b
}

/// The two shape points whose difference is a Minkowski support point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SupportPoints {
    /// The point on A, in A's local space.
    pub on_a: Vector3,
    /// The point on B, in B's own local space.
    pub on_b_local: Vector3,
}

impl SupportPoints {
    /// Computes the margin-inclusive support points of A and B whose difference is extreme along
    /// `direction`.
    #[inline]
    pub fn toward<A, B>(
        shape_a: &A,
        shape_b: &B,
        direction: Vector3,
        local_transform_b: &RigidTransform,
    ) -> SupportPoints
    where
        A: SupportMapping + ?Sized,
        B: SupportMapping + ?Sized,
    {
        let local_direction_b = local_transform_b.inverse_transform_direction(-direction);
        SupportPoints {
            on_a: shape_a.extreme_point(direction),
            on_b_local: shape_b.extreme_point(local_direction_b),
        }
    }

    /// Returns the point on B in A's local space.
    #[inline]
    pub fn on_b(&self, local_transform_b: &RigidTransform) -> Vector3 {
        local_transform_b.transform_point(self.on_b_local)
    }

    /// Returns the Minkowski-difference point `on_a - on_b`.
    #[inline]
    pub fn difference(&self, local_transform_b: &RigidTransform) -> Vector3 {
        self.on_a - self.on_b(local_transform_b)
    }
}

/// Computes the offset contributed by two spherical margins to a support point in the direction
/// given by `direction`.
///
/// Returns zero if `direction` is too short to normalize.
#[inline]
pub fn margin_contribution(margin_a: Scalar, margin_b: Scalar, direction: Vector3) -> Vector3 {
    match direction.try_normalize(Scalar::ZERO) {
        Some(normal) => normal * (margin_a + margin_b),
        None => Vector3::ZERO,
    }
}

/// Pushes `point` outward along `direction` by the sum of two margins.
///
/// This dilates a support point of a margin-free shape into a support point of the same shape
/// swept by a sphere, as used by fat rays and sphere casts.
#[inline]
pub fn expand(margin_a: Scalar, margin_b: Scalar, direction: Vector3, point: Vector3) -> Vector3 {
    point + margin_contribution(margin_a, margin_b, direction)
}
