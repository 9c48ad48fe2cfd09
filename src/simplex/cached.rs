use crate::{
    math::{Scalar, Vector3},
    minkowski::SupportPoints,
};

use super::SimplexState;

/// A plain-data snapshot of a closest-point simplex, carried from one frame to the next.
///
/// The default value is empty, which makes the next query start cold. Vertices are stored in the
/// local spaces of their shapes, so the snapshot stays valid as the shapes move.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CachedSimplex {
    pub state: SimplexState,
    /// Source points on shape A, in A's local space.
    pub local_a: [Vector3; 4],
    /// Source points on shape B, in B's local space.
    pub local_b: [Vector3; 4],
    /// Barycentric weights from the last reduction.
    pub weights: [Scalar; 4],
}

impl CachedSimplex {
    #[inline]
    pub fn len(&self) -> usize {
        self.state.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Iterates over the stored source-point pairs and their weights.
    pub fn support_points(&self) -> impl Iterator<Item = (SupportPoints, Scalar)> + '_ {
        (0..self.len()).map(|i| {
            let points = SupportPoints {
                on_a: self.local_a[i],
                on_b_local: self.local_b[i],
            };
            (points, self.weights[i])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_cold() {
        let cached = CachedSimplex::default();
        assert!(cached.is_empty());
        assert_eq!(cached.support_points().count(), 0);
    }

    #[test]
    fn support_points_follow_state() {
        let cached = CachedSimplex {
            state: SimplexState::Segment,
            local_a: [Vector3::X, Vector3::Y, Vector3::Z, Vector3::ONE],
            local_b: [-Vector3::X, -Vector3::Y, -Vector3::Z, -Vector3::ONE],
            weights: [Scalar::ONE; 4],
        };

        let points: Vec<_> = cached.support_points().collect();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].0.on_a, Vector3::Y);
        assert_eq!(points[1].0.on_b_local, -Vector3::Y);
    }
}
