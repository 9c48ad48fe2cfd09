//! The Gilbert-Johnson-Keerthi family of queries.
//!
//! Every query first expresses shape B (or the ray) in shape A's local space and then iterates
//! on a small simplex, bounded by [`GjkSettings::maximum_iterations`]. Queries never fail:
//! running out of iterations degrades to a conservative answer.
//!
//! Ray and sweep casts use conservative advancement: the ray location only ever moves up to a
//! supporting plane of the target, so it never passes the first point of contact.

use tracing::{debug, trace};

use crate::{
    math::{Scalar, Vector3},
    minkowski,
    settings::{self, GjkSettings},
    simplex::{CachedSimplex, DistanceBound, PairSimplex, RaySimplex, SimpleSimplex, Step},
    support::FALLBACK_AXIS,
    Ray, RayHit, RigidTransform, SupportMapping,
};

/// The result of a warm-started boolean intersection test.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntersectionTest {
    pub intersecting: bool,
    /// A direction in shape A's local space along which the shapes were proven separate, or the
    /// input axis if no separation was found.
    ///
    /// Feed it back into the next frame's test.
    pub separating_axis: Vector3,
}

/// The result of a closest-point query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClosestPoints {
    pub intersecting: bool,
    /// The point on A closest to B, in world space. Zero if the shapes intersect.
    pub on_a: Vector3,
    /// The point on B closest to A, in world space. Zero if the shapes intersect.
    pub on_b: Vector3,
    /// The simplex to warm-start the next query for the same pair.
    pub simplex: CachedSimplex,
    /// The number of support points fetched.
    pub iterations: u32,
}

/// Returns `true` if the two shapes intersect.
///
/// Equivalent to [`are_shapes_intersecting_warm`] with no separating axis to start from.
pub fn are_shapes_intersecting<A, B>(
    shape_a: &A,
    shape_b: &B,
    transform_a: &RigidTransform,
    transform_b: &RigidTransform,
) -> bool
where
    A: SupportMapping + ?Sized,
    B: SupportMapping + ?Sized,
{
    are_shapes_intersecting_warm(shape_a, shape_b, transform_a, transform_b, Vector3::ZERO)
        .intersecting
}

/// Tests whether the two shapes intersect, starting the search from `separating_axis`.
///
/// The test stops as soon as separation can be proven, without refining the simplex further.
/// If the iteration cap is reached first, the shapes are reported as not intersecting.
pub fn are_shapes_intersecting_warm<A, B>(
    shape_a: &A,
    shape_b: &B,
    transform_a: &RigidTransform,
    transform_b: &RigidTransform,
    separating_axis: Vector3,
) -> IntersectionTest
where
    A: SupportMapping + ?Sized,
    B: SupportMapping + ?Sized,
{
    intersection_test(
        shape_a,
        shape_b,
        transform_a,
        transform_b,
        separating_axis,
        settings::settings(),
    )
}

pub(crate) fn intersection_test<A, B>(
    shape_a: &A,
    shape_b: &B,
    transform_a: &RigidTransform,
    transform_b: &RigidTransform,
    separating_axis: Vector3,
    settings: &GjkSettings,
) -> IntersectionTest
where
    A: SupportMapping + ?Sized,
    B: SupportMapping + ?Sized,
{
    let local_b = minkowski::local_transform(transform_a, transform_b);

    let first = minkowski::support(shape_a, shape_b, separating_axis, &local_b);
    let mut simplex = SimpleSimplex::from_point(first, ());

    for iteration in 1..=settings.maximum_iterations {
        let closest = simplex.reduce(settings.epsilon);
        let distance_squared = closest.length_squared();
        trace!(iteration, %distance_squared, "intersection test");

        if simplex.contains_origin()
            || distance_squared <= simplex.error_tolerance() * settings.big_epsilon
        {
            return IntersectionTest {
                intersecting: true,
                separating_axis,
            };
        }

        let direction = -closest;
        let point = minkowski::support(shape_a, shape_b, direction, &local_b);

        // The most extreme point toward the origin stops short of it.
        if point.dot(closest).is_positive() {
            return IntersectionTest {
                intersecting: false,
                separating_axis: direction,
            };
        }

        if let Err(error) = simplex.insert(point, ()) {
            debug!(%error, iteration, "intersection test made no progress");
            break;
        }
    }

    debug!(
        maximum_iterations = settings.maximum_iterations,
        "intersection test did not converge"
    );

    IntersectionTest {
        intersecting: false,
        separating_axis,
    }
}

/// Computes the closest points between two shapes.
///
/// Pass the previous frame's [`ClosestPoints::simplex`] for the same pair to warm-start the
/// search, or [`CachedSimplex::default`] to start cold. Hitting the iteration cap is not an
/// error: the best points found so far are returned, and the returned simplex is never a
/// tetrahedron unless the shapes intersect.
pub fn closest_points<A, B>(
    shape_a: &A,
    shape_b: &B,
    transform_a: &RigidTransform,
    transform_b: &RigidTransform,
    cached: CachedSimplex,
) -> ClosestPoints
where
    A: SupportMapping + ?Sized,
    B: SupportMapping + ?Sized,
{
    closest_points_with(
        shape_a,
        shape_b,
        transform_a,
        transform_b,
        cached,
        settings::settings(),
    )
}

pub(crate) fn closest_points_with<A, B>(
    shape_a: &A,
    shape_b: &B,
    transform_a: &RigidTransform,
    transform_b: &RigidTransform,
    cached: CachedSimplex,
    settings: &GjkSettings,
) -> ClosestPoints
where
    A: SupportMapping + ?Sized,
    B: SupportMapping + ?Sized,
{
    let local_b = minkowski::local_transform(transform_a, transform_b);

    let mut simplex = if cached.is_empty() {
        PairSimplex::seeded(shape_a, shape_b, local_b)
    } else {
        PairSimplex::from_cached(&cached, local_b)
    };

    let mut bound = DistanceBound::new();
    let mut iterations = 0;

    let intersecting = loop {
        let closest = simplex.reduce(settings.epsilon);
        let distance_squared = closest.length_squared();
        trace!(iterations, %distance_squared, state = ?simplex.state(), "closest points");

        if simplex.contains_origin()
            || distance_squared <= settings.epsilon * simplex.error_tolerance()
        {
            break true;
        }

        // Stop before adding a vertex, so a capped query never leaves a tetrahedron behind.
        if iterations >= settings.maximum_iterations {
            debug!(iterations, %distance_squared, "closest points hit the iteration cap");
            break false;
        }

        iterations += 1;
        if iterations == settings.high_iterations + 1 {
            debug!(iterations, %distance_squared, "closest points passed the high-iteration mark");
        }

        match simplex.add_support_point(
            shape_a,
            shape_b,
            closest,
            &mut bound,
            iterations,
            settings,
        ) {
            Step::Added => (),
            Step::Converged => break false,
            Step::Stalled => {
                debug!(iterations, %distance_squared, "closest points stopped improving");
                break false;
            }
        }
    };

    let (on_a, on_b) = if intersecting {
        (Vector3::ZERO, Vector3::ZERO)
    } else {
        let (on_a, on_b) = simplex.closest_points();
        (
            transform_a.transform_point(on_a),
            transform_a.transform_point(on_b),
        )
    };

    ClosestPoints {
        intersecting,
        on_a,
        on_b,
        simplex: simplex.to_cached(),
        iterations,
    }
}

/// How a conservative-advancement loop ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Cast {
    /// The ray reached the surface. The normal is not yet normalized.
    Hit(RayHit),
    /// The ray points away from the target.
    Receding,
    /// The target lies beyond the maximum length.
    OutOfRange,
    /// The iteration cap was reached.
    Stalled,
}

// Advances along `ray` toward the convex set described by `support`, whose interior is
// expected near `ray.origin - initial_offset`.
fn conservative_advancement<F>(
    ray: &Ray,
    maximum_length: Scalar,
    initial_offset: Vector3,
    settings: &GjkSettings,
    mut support: F,
) -> Cast
where
    F: FnMut(Vector3) -> Vector3,
{
    let mut hit = RayHit {
        t: Scalar::ZERO,
        location: ray.origin,
        normal: Vector3::ZERO,
    };

    let mut offset = if initial_offset == Vector3::ZERO {
        FALLBACK_AXIS
    } else {
        initial_offset
    };

    let mut simplex = RaySimplex::new();
    let mut iterations = 0;

    while offset.length_squared() > settings.epsilon * simplex.error_tolerance(ray.origin) {
        iterations += 1;
        if iterations > settings.maximum_iterations {
            debug!(t = %hit.t, "cast hit the iteration cap");
            return Cast::Stalled;
        }

        let point = support(offset);

        // Positive if the location is beyond the supporting plane through `point`.
        let ahead = offset.dot(hit.location - point);
        if ahead.is_positive() {
            let approach = offset.dot(ray.direction);
            if !approach.is_negative() {
                return Cast::Receding;
            }

            let Some(step) = ahead.checked_div(approach) else {
                return Cast::Receding;
            };

            hit.t -= step;
            if hit.t > maximum_length {
                return Cast::OutOfRange;
            }

            hit.location = ray.at(hit.t);
            hit.normal = offset;
        }

        let shifted = simplex.add_point(point, hit.location);
        offset = simplex.closest_offset(shifted, settings.epsilon);
        trace!(iterations, t = %hit.t, offset = %offset.length_squared(), "cast");
    }

    Cast::Hit(hit)
}

fn local_ray(ray: &Ray, transform: &RigidTransform) -> Ray {
    Ray::new(
        transform.inverse_transform_point(ray.origin),
        transform.inverse_transform_direction(ray.direction),
    )
}

fn hit_to_world(hit: RayHit, transform: &RigidTransform) -> RayHit {
    RayHit {
        t: hit.t,
        location: transform.transform_point(hit.location),
        normal: transform.transform_direction(hit.normal.normalize_or_zero()),
    }
}

/// Casts a ray against a shape placed by `transform`.
///
/// `t` is measured in multiples of the ray direction's length and is at most `maximum_length`.
/// A ray starting inside the shape hits at `t = 0` with a zero normal.
pub fn ray_cast<S>(
    ray: &Ray,
    shape: &S,
    transform: &RigidTransform,
    maximum_length: Scalar,
) -> Option<RayHit>
where
    S: SupportMapping + ?Sized,
{
    ray_cast_with(ray, shape, transform, maximum_length, settings::settings())
}

pub(crate) fn ray_cast_with<S>(
    ray: &Ray,
    shape: &S,
    transform: &RigidTransform,
    maximum_length: Scalar,
    settings: &GjkSettings,
) -> Option<RayHit>
where
    S: SupportMapping + ?Sized,
{
    let local = local_ray(ray, transform);

    match conservative_advancement(&local, maximum_length, local.origin, settings, |d| {
        shape.extreme_point(d)
    }) {
        Cast::Hit(hit) => Some(hit_to_world(hit, transform)),
        Cast::Receding | Cast::OutOfRange | Cast::Stalled => None,
    }
}

fn sphere_cast_local<S>(
    ray: &Ray,
    radius: Scalar,
    shape: &S,
    maximum_length: Scalar,
    settings: &GjkSettings,
) -> Cast
where
    S: SupportMapping + ?Sized,
{
    let margin = shape.margin();

    conservative_advancement(ray, maximum_length, ray.origin, settings, |d| {
        minkowski::expand(margin, radius, d, shape.extreme_point_without_margin(d))
    })
}

/// Sweeps a sphere of `radius` along `ray` against a shape placed by `transform`.
///
/// The hit location is the center of the sphere at the time of impact.
pub fn sphere_cast<S>(
    ray: &Ray,
    radius: Scalar,
    shape: &S,
    transform: &RigidTransform,
    maximum_length: Scalar,
) -> Option<RayHit>
where
    S: SupportMapping + ?Sized,
{
    sphere_cast_with(
        ray,
        radius,
        shape,
        transform,
        maximum_length,
        settings::settings(),
    )
}

pub(crate) fn sphere_cast_with<S>(
    ray: &Ray,
    radius: Scalar,
    shape: &S,
    transform: &RigidTransform,
    maximum_length: Scalar,
    settings: &GjkSettings,
) -> Option<RayHit>
where
    S: SupportMapping + ?Sized,
{
    let local = local_ray(ray, transform);

    match sphere_cast_local(&local, radius, shape, maximum_length, settings) {
        Cast::Hit(hit) => Some(hit_to_world(hit, transform)),
        Cast::Receding | Cast::OutOfRange | Cast::Stalled => None,
    }
}

/// A sphere cast for continuous collision detection.
///
/// If the sweep stalls or starts embedded, the radius is scaled by
/// [`GjkSettings::ccd_radius_scale`] and the cast retried, up to
/// [`GjkSettings::ccd_max_attempts`] times in total. After that, a plain ray cast is used.
pub fn ccd_sphere_cast<S>(
    ray: &Ray,
    radius: Scalar,
    shape: &S,
    transform: &RigidTransform,
    maximum_length: Scalar,
) -> Option<RayHit>
where
    S: SupportMapping + ?Sized,
{
    ccd_sphere_cast_with(
        ray,
        radius,
        shape,
        transform,
        maximum_length,
        settings::settings(),
    )
}

pub(crate) fn ccd_sphere_cast_with<S>(
    ray: &Ray,
    radius: Scalar,
    shape: &S,
    transform: &RigidTransform,
    maximum_length: Scalar,
    settings: &GjkSettings,
) -> Option<RayHit>
where
    S: SupportMapping + ?Sized,
{
    let local = local_ray(ray, transform);
    let mut radius = radius;

    for attempt in 1..=settings.ccd_max_attempts {
        match sphere_cast_local(&local, radius, shape, maximum_length, settings) {
            Cast::Hit(hit) if hit.t.is_positive() => return Some(hit_to_world(hit, transform)),
            Cast::Receding | Cast::OutOfRange => return None,
            Cast::Hit(_) | Cast::Stalled => {
                radius *= settings.ccd_radius_scale;
                debug!(attempt, %radius, "shrinking CCD sphere cast radius");
            }
        }
    }

    debug!("CCD sphere cast falling back to a ray cast");
    ray_cast_with(ray, shape, transform, maximum_length, settings)
}

/// Sweeps shape A by `sweep_a` and shape B by `sweep_b` and finds the time of first contact.
///
/// `t` is a fraction of the sweep in `[0, 1]`. The location is the position of A's origin at the
/// time of impact, and the normal points from A toward B.
pub fn convex_cast<A, B>(
    shape_a: &A,
    shape_b: &B,
    sweep_a: Vector3,
    sweep_b: Vector3,
    transform_a: &RigidTransform,
    transform_b: &RigidTransform,
) -> Option<RayHit>
where
    A: SupportMapping + ?Sized,
    B: SupportMapping + ?Sized,
{
    convex_cast_with(
        shape_a,
        shape_b,
        sweep_a,
        sweep_b,
        transform_a,
        transform_b,
        settings::settings(),
    )
}

pub(crate) fn convex_cast_with<A, B>(
    shape_a: &A,
    shape_b: &B,
    sweep_a: Vector3,
    sweep_b: Vector3,
    transform_a: &RigidTransform,
    transform_b: &RigidTransform,
    settings: &GjkSettings,
) -> Option<RayHit>
where
    A: SupportMapping + ?Sized,
    B: SupportMapping + ?Sized,
{
    let local_b = minkowski::local_transform(transform_a, transform_b);

    // The origin enters A - B when B's motion relative to A carries it there.
    let ray = Ray::new(
        Vector3::ZERO,
        transform_a.inverse_transform_direction(sweep_b - sweep_a),
    );

    let cast = conservative_advancement(&ray, Scalar::ONE, local_b.position, settings, |d| {
        minkowski::support(shape_a, shape_b, d, &local_b)
    });

    match cast {
        Cast::Hit(hit) => Some(RayHit {
            t: hit.t,
            location: transform_a.position + sweep_a * hit.t,
            normal: transform_a.transform_direction(hit.normal.normalize_or_zero()),
        }),
        Cast::Receding | Cast::OutOfRange | Cast::Stalled => None,
    }
}
