use crate::math::{Scalar, Vector3};

use super::{Simplex, SimplexState, Vertex};

/// The simplex of a ray or sweep query.
///
/// Vertices are stored as plain support points. The closest-point search runs on a copy
/// shifted so that the current ray location sits at the origin, and the stored simplex then
/// keeps whichever vertices survived the shifted reduction.
#[derive(Clone, Debug, Default)]
pub struct RaySimplex {
    simplex: Simplex<()>,
}

impl RaySimplex {
    pub fn new() -> RaySimplex {
        RaySimplex::default()
    }

    #[inline]
    pub fn state(&self) -> SimplexState {
        self.simplex.state()
    }

    /// Adds `point` and returns a copy of the simplex expressed relative to `location`.
    ///
    /// A point that is already a vertex, or that would overfill the simplex, is not added.
    pub fn add_point(&mut self, point: Vector3, location: Vector3) -> Simplex<Vector3> {
        if let Err(error) = self.simplex.insert(point, ()) {
            tracing::trace!(%error, ?point, "ray simplex kept previous vertices");
        }

        self.simplex.map(|vertex| Vertex {
            point: location - vertex.point,
            data: vertex.point,
        })
    }

    /// Reduces a shifted copy and adopts its surviving vertices.
    ///
    /// Returns the offset from the nearest point of the shape to the ray location.
    pub fn closest_offset(&mut self, mut shifted: Simplex<Vector3>, epsilon: Scalar) -> Vector3 {
        let offset = shifted.reduce(epsilon);

        self.simplex = shifted.map(|vertex| Vertex {
            point: vertex.data,
            data: (),
        });

        offset
    }

    /// Returns the largest squared distance from `origin` to a stored vertex.
    #[inline]
    pub fn error_tolerance(&self, origin: Vector3) -> Scalar {
        self.simplex.error_tolerance_from(origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GjkSettings;

    const EPSILON: Scalar = GjkSettings::DEFAULT.epsilon;

    #[test]
    fn shifted_copy_is_relative_to_location() {
        let mut simplex = RaySimplex::new();
        let location = Vector3::from_num(0, 0, 5);

        let shifted = simplex.add_point(Vector3::from_num(1, 0, 1), location);
        assert_eq!(shifted.vertices()[0].point, Vector3::from_num(-1, 0, 4));
        assert_eq!(shifted.vertices()[0].data, Vector3::from_num(1, 0, 1));
    }

    #[test]
    fn reduction_keeps_unshifted_points() {
        let mut simplex = RaySimplex::new();
        let location = Vector3::from_num(0, 0, 5);

        let shifted = simplex.add_point(Vector3::from_num(1, 0, 1), location);
        simplex.closest_offset(shifted, EPSILON);

        let shifted = simplex.add_point(Vector3::from_num(-1, 0, 1), location);
        let offset = simplex.closest_offset(shifted, EPSILON);

        // Nearest point of the segment is (0, 0, 1), four units below the location.
        assert_eq!(offset, Vector3::from_num(0, 0, 4));
        assert_eq!(simplex.state(), SimplexState::Segment);
        assert_eq!(simplex.error_tolerance(Vector3::ZERO), Scalar::from_num(2));
    }

    #[test]
    fn duplicate_point_is_ignored() {
        let mut simplex = RaySimplex::new();
        let location = Vector3::ZERO;

        let shifted = simplex.add_point(Vector3::X, location);
        simplex.closest_offset(shifted, EPSILON);

        let shifted = simplex.add_point(Vector3::X, location);
        assert_eq!(shifted.len(), 1);
    }
}
