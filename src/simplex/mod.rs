//! Simplices over the Minkowski difference, and their reduction toward the origin.
//!
//! Every query shares one [`Simplex`] type. What differs between them is the bookkeeping that
//! rides along with each vertex:
//!
//! - [`SimpleSimplex`] carries nothing and backs the boolean intersection test.
//! - [`PairSimplex`] carries the source points on both shapes, so witness points can be
//!   recovered from the barycentric weights.
//! - [`RaySimplex`] stores support points and produces copies shifted relative to the current
//!   ray location.
//! - [`CachedSimplex`] is the plain-data snapshot of a pair simplex carried between frames.

use std::fmt;

use arrayvec::ArrayVec;

use crate::{
    math::{Scalar, Vector3},
    minkowski::SupportPoints,
};

mod cached;
mod pair;
mod ray;
mod voronoi;

pub use cached::CachedSimplex;
pub use pair::{DistanceBound, PairSimplex, Step};
pub use ray::RaySimplex;

/// The shape of a simplex, determined by its vertex count.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimplexState {
    #[default]
    Empty,
    Point,
    Segment,
    Triangle,
    Tetrahedron,
}

impl SimplexState {
    /// Returns the state of a simplex with `len` vertices.
    ///
    /// Counts above four saturate to `Tetrahedron`.
    pub fn from_len(len: usize) -> SimplexState {
        match len {
            0 => SimplexState::Empty,
            1 => SimplexState::Point,
            2 => SimplexState::Segment,
            3 => SimplexState::Triangle,
            _ => SimplexState::Tetrahedron,
        }
    }

    /// Returns the number of vertices of a simplex in this state.
    pub fn len(self) -> usize {
        self as usize
    }

    pub fn is_empty(self) -> bool {
        self == SimplexState::Empty
    }
}

/// Bookkeeping carried alongside each simplex vertex.
///
/// Reduction copies vertex data unchanged, so it must be cheap to copy.
pub trait VertexData: Copy + fmt::Debug {}

impl VertexData for () {}

/// An unshifted support point, carried by the shifted copies of a [`RaySimplex`].
impl VertexData for Vector3 {}

impl VertexData for SupportPoints {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Vertex<D> {
    pub point: Vector3,
    pub data: D,
}

/// Returned when a point cannot be added to a simplex.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum InsertError {
    /// The point is already a vertex of the simplex.
    #[error("point is already a simplex vertex")]
    Duplicate,
    /// The simplex is already a tetrahedron.
    #[error("simplex already has four vertices")]
    Full,
}

/// A simplex of up to four vertices in the Minkowski difference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Simplex<D> {
    vertices: ArrayVec<Vertex<D>, 4>,
    // Aligned with `vertices`. Only meaningful after `reduce`.
    weights: ArrayVec<Scalar, 4>,
}

/// The simplex used by the boolean intersection test.
pub type SimpleSimplex = Simplex<()>;

impl<D: VertexData> Default for Simplex<D> {
    fn default() -> Self {
        Simplex::new()
    }
}

impl<D: VertexData> Simplex<D> {
    pub fn new() -> Simplex<D> {
        Simplex {
            vertices: ArrayVec::new(),
            weights: ArrayVec::new(),
        }
    }

    /// Constructs a single-point simplex.
    pub fn from_point(point: Vector3, data: D) -> Simplex<D> {
        let mut simplex = Simplex::new();
        simplex.vertices.push(Vertex { point, data });
        simplex.weights.push(Scalar::ONE);
        simplex
    }

    /// Constructs a simplex from up to four weighted vertices.
    ///
    /// Vertices beyond the fourth are ignored.
    pub(crate) fn from_weighted<I>(vertices: I) -> Simplex<D>
    where
        I: IntoIterator<Item = (Vertex<D>, Scalar)>,
    {
        let mut simplex = Simplex::new();
        for (vertex, weight) in vertices.into_iter().take(4) {
            simplex.vertices.push(vertex);
            simplex.weights.push(weight);
        }
        simplex
    }

    #[inline]
    pub fn state(&self) -> SimplexState {
        SimplexState::from_len(self.vertices.len())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex<D>] {
        &self.vertices
    }

    /// Returns the barycentric weight of each vertex, as of the last reduction.
    #[inline]
    pub fn weights(&self) -> &[Scalar] {
        &self.weights
    }

    /// Iterates over each vertex together with its weight.
    pub fn weighted(&self) -> impl Iterator<Item = (&Vertex<D>, Scalar)> + '_ {
        self.vertices.iter().zip(self.weights.iter().copied())
    }

    /// Adds a vertex to the simplex.
    ///
    /// Points are compared exactly; reduction takes care of near-duplicates.
    pub fn insert(&mut self, point: Vector3, data: D) -> Result<(), InsertError> {
        if self.vertices.iter().any(|v| v.point == point) {
            return Err(InsertError::Duplicate);
        }

        self.vertices
            .try_push(Vertex { point, data })
            .map_err(|_| InsertError::Full)?;
        self.weights.push(Scalar::ZERO);

        Ok(())
    }

    /// Returns `true` if the simplex is a tetrahedron enclosing the origin.
    ///
    /// After [`reduce`](Self::reduce), this is the only way a simplex keeps four vertices.
    #[inline]
    pub fn contains_origin(&self) -> bool {
        self.vertices.len() == 4
    }

    /// Finds the point of the simplex closest to the origin and discards every vertex that does
    /// not contribute to it.
    ///
    /// Surviving vertices keep their relative order. Returns zero for an empty simplex.
    pub fn reduce(&mut self, epsilon: Scalar) -> Vector3 {
        let points: ArrayVec<Vector3, 4> = self.vertices.iter().map(|v| v.point).collect();

        let projection = match points.len() {
            0 => return Vector3::ZERO,
            1 => voronoi::Projection::vertex(&points, 0),
            2 => voronoi::segment(&points, 0, 1, epsilon),
            3 => voronoi::triangle(&points, 0, 1, 2, epsilon),
            _ => voronoi::tetrahedron(&points, epsilon),
        };

        self.vertices = projection
            .indices
            .iter()
            .map(|&i| self.vertices[i])
            .collect();
        self.weights = projection.weights;

        projection.closest
    }

    /// Returns the largest squared vertex magnitude.
    ///
    /// Termination tests scale their epsilons by this, so they are relative to the size of the
    /// shapes involved.
    #[inline]
    pub fn error_tolerance(&self) -> Scalar {
        self.error_tolerance_from(Vector3::ZERO)
    }

    /// Returns the largest squared distance from `origin` to a vertex.
    pub fn error_tolerance_from(&self, origin: Vector3) -> Scalar {
        self.vertices
            .iter()
            .map(|v| (v.point - origin).length_squared())
            .fold(Scalar::ZERO, Scalar::max)
    }

    /// Builds a new simplex by transforming every vertex, keeping the weights.
    pub fn map<E, F>(&self, mut f: F) -> Simplex<E>
    where
        E: VertexData,
        F: FnMut(&Vertex<D>) -> Vertex<E>,
    {
        Simplex {
            vertices: self.vertices.iter().map(&mut f).collect(),
            weights: self.weights.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::settings::GjkSettings;

    const EPSILON: Scalar = GjkSettings::DEFAULT.epsilon;

    impl VertexData for u8 {}

    #[test]
    fn simplex_1d() {
        let mut simplex = SimpleSimplex::new();

        let v = Vector3::from_num(1, 2, 3);

        simplex.insert(v, ()).unwrap();

        let closest = simplex.reduce(EPSILON);

        assert_eq!(v, closest);
        assert_eq!(simplex.state(), SimplexState::Point);
        assert_eq!(simplex.weights(), &[Scalar::ONE]);
    }

    #[test]
    fn simplex_2d() {
        // Closest point to origin between two points
        let mut simplex = SimpleSimplex::new();

        let v1 = Vector3::from_num(1, 1, 1);
        let v2 = Vector3::from_num(-1, -1, 1);

        simplex.insert(v1, ()).unwrap();
        simplex.insert(v2, ()).unwrap();

        let closest = simplex.reduce(EPSILON);

        assert_eq!(Vector3::from_num(0, 0, 1), closest);
        assert_eq!(simplex.state(), SimplexState::Segment);

        // Closest point to origin is one of the points
        let mut simplex = SimpleSimplex::new();

        let v1 = Vector3::from_num(3, 3, 1);
        let v2 = Vector3::from_num(1, 1, 1);

        simplex.insert(v1, ()).unwrap();
        simplex.insert(v2, ()).unwrap();

        let closest = simplex.reduce(EPSILON);

        assert_eq!(v2, closest);
        assert_eq!(simplex.state(), SimplexState::Point);
        assert_eq!(simplex.vertices()[0].point, v2);
    }

    #[test]
    fn simplex_3d() {
        let mut simplex = SimpleSimplex::new();

        simplex.insert(Vector3::X, ()).unwrap();
        simplex.insert(Vector3::Y, ()).unwrap();
        simplex.insert(Vector3::Z, ()).unwrap();

        let third = Scalar::ONE / Scalar::from_num(3);
        assert_abs_diff_eq!(
            simplex.reduce(EPSILON),
            Vector3::splat(third),
            epsilon = Scalar::from_num(1.0e-6)
        );

        let mut simplex = SimpleSimplex::new();

        simplex.insert(Vector3::from_num(1, 1, 0), ()).unwrap();
        simplex.insert(Vector3::X, ()).unwrap();
        simplex.insert(Vector3::Y, ()).unwrap();

        assert_eq!(simplex.reduce(EPSILON), Vector3::from_num(0.5, 0.5, 0.0));
        assert_eq!(
            simplex.vertices().iter().map(|v| v.point).collect::<Vec<_>>(),
            vec![Vector3::X, Vector3::Y]
        );
    }

    #[test]
    fn simplex_4d_contains_origin() {
        let mut simplex = SimpleSimplex::new();

        for p in [
            Vector3::from_num(1, 1, 1),
            Vector3::from_num(1, -1, -1),
            Vector3::from_num(-1, 1, -1),
            Vector3::from_num(-1, -1, 1),
        ] {
            simplex.insert(p, ()).unwrap();
        }

        assert_eq!(simplex.reduce(EPSILON), Vector3::ZERO);
        assert!(simplex.contains_origin());
        assert_eq!(simplex.state(), SimplexState::Tetrahedron);
    }

    #[test]
    fn insert_errors() {
        let mut simplex = SimpleSimplex::new();

        simplex.insert(Vector3::X, ()).unwrap();
        assert_eq!(simplex.insert(Vector3::X, ()), Err(InsertError::Duplicate));

        simplex.insert(Vector3::Y, ()).unwrap();
        simplex.insert(Vector3::Z, ()).unwrap();
        simplex.insert(Vector3::ONE, ()).unwrap();
        assert_eq!(simplex.insert(-Vector3::ONE, ()), Err(InsertError::Full));
        assert_eq!(simplex.len(), 4);
    }

    #[test]
    fn insert_error_messages() {
        assert_eq!(
            InsertError::Duplicate.to_string(),
            "point is already a simplex vertex"
        );

        let error: Box<dyn std::error::Error> = Box::new(InsertError::Full);
        assert_eq!(error.to_string(), "simplex already has four vertices");
    }

    #[test]
    fn reduction_carries_data() {
        let mut simplex = Simplex::<u8>::new();

        simplex.insert(Vector3::from_num(3, 3, 1), 7).unwrap();
        simplex.insert(Vector3::from_num(1, 1, 1), 9).unwrap();
        simplex.reduce(EPSILON);

        assert_eq!(simplex.vertices()[0].data, 9);
    }

    #[test]
    fn reduce_is_idempotent() {
        let mut simplex = SimpleSimplex::new();

        for p in [
            Vector3::from_num(2.5, 0.3, -1.0),
            Vector3::from_num(1.5, -2.0, 0.25),
            Vector3::from_num(0.75, 1.0, 1.5),
            Vector3::from_num(3.0, 1.0, 1.0),
        ] {
            simplex.insert(p, ()).unwrap();
        }

        let first = simplex.reduce(EPSILON);
        let reduced = simplex.clone();
        let second = simplex.reduce(EPSILON);

        assert_eq!(first, second);
        assert_eq!(reduced, simplex);
    }

    #[test]
    fn error_tolerance() {
        let mut simplex = SimpleSimplex::from_point(Vector3::from_num(1, 0, 0), ());
        simplex.insert(Vector3::from_num(0, 3, 0), ()).unwrap();

        assert_eq!(simplex.error_tolerance(), Scalar::from_num(9));
        assert_eq!(
            simplex.error_tolerance_from(Vector3::from_num(0, -1, 0)),
            Scalar::from_num(16)
        );
    }
}
