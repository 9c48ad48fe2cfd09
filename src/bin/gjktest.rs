use glam::{Quat, Vec3};
use lockstep_gjk::{
    gjk, CachedSimplex, Capsule, ConvexHull, Ray, RigidTransform, Scalar, Segment, Sphere, Vector3,
};

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .without_time()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let t1 = Vector3::ZERO;
    let t2 = Segment {
        a: Vec3::new(0.0, 1.0, -1.0).into(),
        b: Vec3::new(0.0, 1.0, 1.0).into(),
    };

    let result = gjk::closest_points(
        &t1,
        &t2,
        &RigidTransform::default(),
        &RigidTransform::default(),
        CachedSimplex::default(),
    );
    tracing::info!(on_a = %result.on_a, on_b = %result.on_b, "point-segment closest points");

    let hull = ConvexHull::cuboid(Vec3::new(1.0, 0.5, 0.75).into());
    let capsule = Capsule::new(Scalar::from_num(0.5), Scalar::from_num(0.25));
    let hull_transform = RigidTransform::from_orientation(Quat::from_rotation_y(0.6).into());
    let capsule_transform = RigidTransform::new(
        Vec3::new(2.0, 0.4, -0.3).into(),
        Quat::from_rotation_z(1.2).into(),
    );

    let mut cached = CachedSimplex::default();
    for frame in 0..3 {
        let result = gjk::closest_points(
            &hull,
            &capsule,
            &hull_transform,
            &capsule_transform,
            cached,
        );
        tracing::info!(
            frame,
            intersecting = result.intersecting,
            iterations = result.iterations,
            on_a = %result.on_a,
            on_b = %result.on_b,
            "hull-capsule closest points"
        );
        cached = result.simplex;
    }

    let sphere = Sphere::new(Vector3::ZERO, Scalar::ONE);
    let ray = Ray::new(Vec3::new(-5.0, 0.2, 0.1).into(), Vector3::X);
    let max = Scalar::from_num(100);

    let hit = gjk::ray_cast(&ray, &sphere, &RigidTransform::IDENTITY, max);
    tracing::info!(hit = ?hit, "ray cast");

    let hit = gjk::ccd_sphere_cast(&ray, Scalar::from_num(0.5), &hull, &hull_transform, max);
    tracing::info!(hit = ?hit, "CCD sphere cast");

    let hit = gjk::convex_cast(
        &sphere,
        &hull,
        Vec3::new(8.0, 0.0, 0.0).into(),
        Vector3::ZERO,
        &RigidTransform::from_position(Vec3::new(-5.0, 0.0, 0.0).into()),
        &hull_transform,
    );
    tracing::info!(hit = ?hit, "convex cast");
}
