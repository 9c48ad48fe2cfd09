use crate::{
    hull::ConvexHull,
    math::{Scalar, Vector3},
    Capsule, Cuboid, Ray, RayHit, Sphere, SupportMapping,
};

/// The closed set of shapes a collider can take.
///
/// Dispatch is a `match`, so queries over `ColliderShape` stay monomorphic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColliderShape {
    Sphere(Sphere),
    Capsule(Capsule),
    Cuboid(Cuboid),
    Hull(ConvexHull),
}

impl SupportMapping for ColliderShape {
    #[inline]
    fn extreme_point_without_margin(&self, direction: Vector3) -> Vector3 {
        match self {
            ColliderShape::Sphere(s) => s.extreme_point_without_margin(direction),
            ColliderShape::Capsule(c) => c.extreme_point_without_margin(direction),
            ColliderShape::Cuboid(c) => c.extreme_point_without_margin(direction),
            ColliderShape::Hull(h) => h.extreme_point_without_margin(direction),
        }
    }

    #[inline]
    fn margin(&self) -> Scalar {
        match self {
            ColliderShape::Sphere(s) => s.margin(),
            ColliderShape::Capsule(c) => c.margin(),
            ColliderShape::Cuboid(c) => c.margin(),
            ColliderShape::Hull(h) => h.margin(),
        }
    }

    fn ray_cast(&self, ray: &Ray, maximum_length: Scalar) -> Option<RayHit> {
        match self {
            ColliderShape::Sphere(s) => s.ray_cast(ray, maximum_length),
            ColliderShape::Capsule(c) => c.ray_cast(ray, maximum_length),
            ColliderShape::Cuboid(c) => c.ray_cast(ray, maximum_length),
            ColliderShape::Hull(h) => h.ray_cast(ray, maximum_length),
        }
    }
}

impl From<Sphere> for ColliderShape {
    fn from(value: Sphere) -> Self {
        ColliderShape::Sphere(value)
    }
}

impl From<Capsule> for ColliderShape {
    fn from(value: Capsule) -> Self {
        ColliderShape::Capsule(value)
    }
}

impl From<Cuboid> for ColliderShape {
    fn from(value: Cuboid) -> Self {
        ColliderShape::Cuboid(value)
    }
}

impl From<ConvexHull> for ColliderShape {
    fn from(value: ConvexHull) -> Self {
        ColliderShape::Hull(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_matches_concrete_shape() {
        let cuboid = Cuboid::new(Vector3::from_num(1, 2, 3));
        let shape = ColliderShape::from(cuboid);
        let dir = Vector3::from_num(-1, 1, -1);

        assert_eq!(shape.extreme_point(dir), cuboid.extreme_point(dir));
        assert_eq!(shape.margin(), Scalar::ZERO);

        let sphere = Sphere::new(Vector3::ZERO, Scalar::from_num(2));
        let shape = ColliderShape::from(sphere);
        assert_eq!(shape.margin(), Scalar::from_num(2));
        assert_eq!(shape.extreme_point(Vector3::Z), Vector3::from_num(0, 0, 2));
    }

    #[test]
    fn ray_cast_uses_shape_override() {
        let shape = ColliderShape::from(Sphere::new(Vector3::ZERO, Scalar::ONE));
        let ray = Ray::new(Vector3::from_num(0, 0, -3), Vector3::Z);

        let hit = shape.ray_cast(&ray, Scalar::from_num(10)).unwrap();
        assert_eq!(hit.t, Scalar::from_num(2));
    }
}
