use crate::{
    math::{Scalar, Vector3},
    minkowski::SupportPoints,
    settings::GjkSettings,
    RigidTransform, SupportMapping,
};

use super::{CachedSimplex, InsertError, Simplex, SimplexState, Vertex};

/// Tracks the smallest squared distance seen so far by a closest-point query.
#[derive(Copy, Clone, Debug)]
pub struct DistanceBound(Scalar);

impl DistanceBound {
    #[inline(always)]
    pub fn new() -> DistanceBound {
        DistanceBound(Scalar::MAX)
    }

    #[inline(always)]
    pub fn get(&self) -> Scalar {
        self.0
    }

    #[inline(always)]
    pub fn update(&mut self, distance_squared: Scalar) {
        self.0 = distance_squared.min(self.0)
    }
}

impl Default for DistanceBound {
    fn default() -> Self {
        DistanceBound::new()
    }
}

/// The outcome of trying to grow a [`PairSimplex`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// A new vertex was added.
    Added,
    /// The new support point brings the simplex no closer to the origin.
    Converged,
    /// The query is past its high-iteration mark and no longer getting closer.
    Stalled,
}

/// A closest-point simplex which remembers the points on both shapes behind each vertex.
///
/// All points are in shape A's local space, except the points on B, which are kept in B's
/// local space so they survive into a [`CachedSimplex`].
#[derive(Clone, Debug)]
pub struct PairSimplex {
    simplex: Simplex<SupportPoints>,
    local_transform_b: RigidTransform,
}

impl PairSimplex {
    /// Rebuilds a simplex from a cached snapshot.
    ///
    /// Vertices are recomputed from the cached source points, so the snapshot may come from a
    /// previous frame with different transforms.
    pub fn from_cached(cached: &CachedSimplex, local_transform_b: RigidTransform) -> PairSimplex {
        let simplex = Simplex::from_weighted(cached.support_points().map(|(points, weight)| {
            let vertex = Vertex {
                point: points.difference(&local_transform_b),
                data: points,
            };
            (vertex, weight)
        }));

        PairSimplex {
            simplex,
            local_transform_b,
        }
    }

    /// Starts a simplex from the Minkowski support point along the offset from A to B.
    pub fn seeded<A, B>(shape_a: &A, shape_b: &B, local_transform_b: RigidTransform) -> PairSimplex
    where
        A: SupportMapping + ?Sized,
        B: SupportMapping + ?Sized,
    {
        let points = SupportPoints::toward(
            shape_a,
            shape_b,
            local_transform_b.position,
            &local_transform_b,
        );

        PairSimplex {
            simplex: Simplex::from_point(points.difference(&local_transform_b), points),
            local_transform_b,
        }
    }

    #[inline]
    pub fn state(&self) -> SimplexState {
        self.simplex.state()
    }

    #[inline]
    pub fn contains_origin(&self) -> bool {
        self.simplex.contains_origin()
    }

    #[inline]
    pub fn error_tolerance(&self) -> Scalar {
        self.simplex.error_tolerance()
    }

    /// Reduces the simplex and returns its point closest to the origin.
    #[inline]
    pub fn reduce(&mut self, epsilon: Scalar) -> Vector3 {
        self.simplex.reduce(epsilon)
    }

    /// Fetches a new support point in the direction opposite `closest` and adds it to the
    /// simplex if it makes progress toward the origin.
    ///
    /// `closest` must be the result of the latest [`reduce`](Self::reduce), and `iteration` the
    /// 1-based iteration count of the calling query.
    pub fn add_support_point<A, B>(
        &mut self,
        shape_a: &A,
        shape_b: &B,
        closest: Vector3,
        bound: &mut DistanceBound,
        iteration: u32,
        settings: &GjkSettings,
    ) -> Step
    where
        A: SupportMapping + ?Sized,
        B: SupportMapping + ?Sized,
    {
        let direction = -closest;
        let points = SupportPoints::toward(shape_a, shape_b, direction, &self.local_transform_b);
        let point = points.difference(&self.local_transform_b);

        // How far past the closest point the new point reaches toward the origin.
        let distance_squared = closest.length_squared();
        let progression = point.dot(direction) + distance_squared;
        let tolerance = self
            .simplex
            .error_tolerance()
            .max(point.length_squared());

        if progression <= settings.epsilon * tolerance {
            return Step::Converged;
        }

        // Past the high-iteration mark, a degenerate simplex tends to cycle between states that
        // are each just outside tolerance. Stop as soon as the distance stops shrinking.
        if iteration > settings.high_iterations && distance_squared >= bound.get() {
            return Step::Stalled;
        }
        bound.update(distance_squared);

        match self.simplex.insert(point, points) {
            Ok(()) => Step::Added,
            Err(InsertError::Duplicate | InsertError::Full) => Step::Converged,
        }
    }

    /// Recovers the witness points on A and B, in A's local space, from the barycentric weights
    /// of the last reduction.
    pub fn closest_points(&self) -> (Vector3, Vector3) {
        let mut on_a = Vector3::ZERO;
        let mut on_b = Vector3::ZERO;

        for (vertex, weight) in self.simplex.weighted() {
            on_a += vertex.data.on_a * weight;
            on_b += vertex.data.on_b(&self.local_transform_b) * weight;
        }

        (on_a, on_b)
    }

    /// Takes a snapshot for warm-starting the next query.
    pub fn to_cached(&self) -> CachedSimplex {
        let mut cached = CachedSimplex {
            state: self.simplex.state(),
            ..Default::default()
        };

        for (i, (vertex, weight)) in self.simplex.weighted().enumerate() {
            cached.local_a[i] = vertex.data.on_a;
            cached.local_b[i] = vertex.data.on_b_local;
            cached.weights[i] = weight;
        }

        cached
    }
}
