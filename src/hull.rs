use crate::{
    math::{Scalar, Vector3},
    SupportMapping,
};

/// A convex polyhedron given by its vertices.
///
/// The hull is implied: only the vertices are stored, and interior or coplanar points are
/// harmless. Extreme points are found by a linear scan in which the first vertex with the
/// greatest projection wins, so ties resolve the same way on every machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvexHull {
    vertices: Vec<Vector3>,
    margin: Scalar,
}

impl ConvexHull {
    /// Constructs a hull from a point cloud.
    ///
    /// Returns `None` if `vertices` is empty.
    pub fn new<I>(vertices: I) -> Option<ConvexHull>
    where
        I: IntoIterator<Item = Vector3>,
    {
        ConvexHull::with_margin(vertices, Scalar::ZERO)
    }

    /// Constructs a hull from a point cloud, dilated by `margin`.
    ///
    /// Returns `None` if `vertices` is empty or `margin` is negative.
    pub fn with_margin<I>(vertices: I, margin: Scalar) -> Option<ConvexHull>
    where
        I: IntoIterator<Item = Vector3>,
    {
        let vertices: Vec<Vector3> = vertices.into_iter().collect();

        if vertices.is_empty() || margin.is_negative() {
            return None;
        }

        Some(ConvexHull { vertices, margin })
    }

    /// Constructs an axis-aligned box hull with the given half extents.
    pub fn cuboid(half_extents: Vector3) -> ConvexHull {
        let Vector3 { x, y, z } = half_extents;
        let vertices = (0..8)
            .map(|i| {
                Vector3::new(
                    if i & 1 == 0 { -x } else { x },
                    if i & 2 == 0 { -y } else { y },
                    if i & 4 == 0 { -z } else { z },
                )
            })
            .collect();

        ConvexHull {
            vertices,
            margin: Scalar::ZERO,
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vector3] {
        &self.vertices
    }

    pub(crate) fn compute_supporting_point(&self, direction: Vector3) -> Vector3 {
        let mut best = self.vertices[0];
        let mut best_dot = best.dot(direction);

        for &v in &self.vertices[1..] {
            let d = v.dot(direction);
            if d > best_dot {
                best = v;
                best_dot = d;
            }
        }

        best
    }
}

impl SupportMapping for ConvexHull {
    #[inline]
    fn extreme_point_without_margin(&self, direction: Vector3) -> Vector3 {
        self.compute_supporting_point(direction)
    }

    #[inline]
    fn margin(&self) -> Scalar {
        self.margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hull_rejected() {
        assert!(ConvexHull::new(Vec::<Vector3>::new()).is_none());
        assert!(ConvexHull::with_margin([Vector3::ZERO], -Scalar::ONE).is_none());
    }

    #[test]
    fn cuboid_corners() {
        let hull = ConvexHull::cuboid(Vector3::from_num(1, 2, 3));
        assert_eq!(hull.vertices().len(), 8);
        assert_eq!(
            hull.extreme_point(Vector3::from_num(1, 1, 1)),
            Vector3::from_num(1, 2, 3)
        );
        assert_eq!(
            hull.extreme_point(Vector3::from_num(-1, 1, -1)),
            Vector3::from_num(-1, 2, -3)
        );
    }

    #[test]
    fn ties_pick_first_vertex() {
        let hull = ConvexHull::new([
            Vector3::from_num(1, 1, 0),
            Vector3::from_num(1, -1, 0),
            Vector3::from_num(-1, 0, 0),
        ])
        .unwrap();

        assert_eq!(hull.extreme_point(Vector3::X), Vector3::from_num(1, 1, 0));
    }
}
