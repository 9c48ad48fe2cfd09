//! Closest points to the origin on simplices of up to four vertices.
//!
//! Each function classifies the origin against the Voronoi regions of its simplex and returns
//! the closest point along with the vertices that contribute to it. Lower-dimensional features
//! are always delegated to the lower-dimensional function with vertices in ascending order, so
//! reducing an already-reduced simplex reproduces the same bits.

use arrayvec::ArrayVec;

use crate::math::{self, Scalar, Vector3};

/// The point of a simplex closest to the origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Projection {
    pub closest: Vector3,
    /// Indices of the contributing vertices, ascending.
    pub indices: ArrayVec<usize, 4>,
    /// Barycentric weights, aligned with `indices`.
    pub weights: ArrayVec<Scalar, 4>,
}

impl Projection {
    fn new(closest: Vector3, contributions: &[(usize, Scalar)]) -> Projection {
        Projection {
            closest,
            indices: contributions.iter().map(|&(i, _)| i).collect(),
            weights: contributions.iter().map(|&(_, w)| w).collect(),
        }
    }

    pub fn vertex(points: &[Vector3], i: usize) -> Projection {
        Projection::new(points[i], &[(i, Scalar::ONE)])
    }

    // Ties keep `self`, so candidates examined first win.
    fn nearer(self, other: Projection) -> Projection {
        if other.closest.length_squared() < self.closest.length_squared() {
            other
        } else {
            self
        }
    }
}

fn nearer_vertex(points: &[Vector3], i: usize, j: usize) -> Projection {
    Projection::vertex(points, i).nearer(Projection::vertex(points, j))
}

#[inline]
fn opposite_signs(a: Scalar, b: Scalar) -> bool {
    (a.is_positive() && b.is_negative()) || (a.is_negative() && b.is_positive())
}

/// Projects the origin onto the segment `points[i]`, `points[j]`.
///
/// Segments whose squared length is at most `epsilon` are treated as a single point.
pub(crate) fn segment(points: &[Vector3], i: usize, j: usize, epsilon: Scalar) -> Projection {
    let a = points[i];
    let b = points[j];
    let ab = b - a;

    let denom = ab.length_squared();
    if denom <= epsilon {
        return nearer_vertex(points, i, j);
    }

    let num = -a.dot(ab);
    if num <= Scalar::ZERO {
        return Projection::vertex(points, i);
    }
    if num >= denom {
        return Projection::vertex(points, j);
    }

    let Some(t) = num.checked_div(denom) else {
        return nearer_vertex(points, i, j);
    };

    Projection::new(a + ab * t, &[(i, Scalar::ONE - t), (j, t)])
}

/// Projects the origin onto the triangle `points[i]`, `points[j]`, `points[k]`.
///
/// Near-collinear triangles are replaced by their nearest edge.
pub(crate) fn triangle(
    points: &[Vector3],
    i: usize,
    j: usize,
    k: usize,
    epsilon: Scalar,
) -> Projection {
    let a = points[i];
    let b = points[j];
    let c = points[k];
    let ab = b - a;
    let ac = c - a;

    let nearest_edge = || {
        segment(points, i, j, epsilon)
            .nearer(segment(points, i, k, epsilon))
            .nearer(segment(points, j, k, epsilon))
    };

    // |ab × ac|² = |ab|²|ac|² sin²θ
    let normal_length_squared = ab.cross(ac).length_squared();
    if normal_length_squared == Scalar::ZERO
        || normal_length_squared <= epsilon * ab.length_squared() * ac.length_squared()
    {
        return nearest_edge();
    }

    // Vertex region A.
    let d1 = -ab.dot(a);
    let d2 = -ac.dot(a);
    if d1 <= Scalar::ZERO && d2 <= Scalar::ZERO {
        return Projection::vertex(points, i);
    }

    // Vertex region B.
    let d3 = -ab.dot(b);
    let d4 = -ac.dot(b);
    if d3 >= Scalar::ZERO && d4 <= d3 {
        return Projection::vertex(points, j);
    }

    // Edge region AB.
    let vc = d1 * d4 - d3 * d2;
    if vc <= Scalar::ZERO && d1 >= Scalar::ZERO && d3 <= Scalar::ZERO {
        return segment(points, i, j, epsilon);
    }

    // Vertex region C.
    let d5 = -ab.dot(c);
    let d6 = -ac.dot(c);
    if d6 >= Scalar::ZERO && d5 <= d6 {
        return Projection::vertex(points, k);
    }

    // Edge region AC.
    let vb = d5 * d2 - d1 * d6;
    if vb <= Scalar::ZERO && d2 >= Scalar::ZERO && d6 <= Scalar::ZERO {
        return segment(points, i, k, epsilon);
    }

    // Edge region BC.
    let va = d3 * d6 - d5 * d4;
    if va <= Scalar::ZERO && d4 - d3 >= Scalar::ZERO && d5 - d6 >= Scalar::ZERO {
        return segment(points, j, k, epsilon);
    }

    // Face region.
    let denom = va + vb + vc;
    if !denom.is_positive() {
        return nearest_edge();
    }
    let (Some(v), Some(w)) = (vb.checked_div(denom), vc.checked_div(denom)) else {
        return nearest_edge();
    };

    Projection::new(
        a + ab * v + ac * w,
        &[(i, Scalar::ONE - v - w), (j, v), (k, w)],
    )
}

// Faces with the vertex opposite each, in ascending order.
const FACES: [([usize; 3], usize); 4] = [
    ([0, 1, 2], 3),
    ([0, 1, 3], 2),
    ([0, 2, 3], 1),
    ([1, 2, 3], 0),
];

/// Projects the origin onto the tetrahedron `points[0..4]`.
///
/// If the origin lies inside, all four vertices are kept and the closest point is the origin
/// itself. Near-flat tetrahedra never contain the origin; their nearest face is used instead.
pub(crate) fn tetrahedron(points: &[Vector3], epsilon: Scalar) -> Projection {
    let a = points[0];
    let ad = points[3] - a;
    let base_normal = (points[1] - a).cross(points[2] - a);
    let volume = base_normal.dot(ad);

    // |n · ad| <= sqrt(ε)|n||ad|, kept at second order to stay in range.
    let degenerate =
        volume.abs() <= math::sqrt(epsilon) * base_normal.length() * ad.length();

    let mut nearest: Option<Projection> = None;
    let mut ratios = [Scalar::ZERO; 4];
    let mut ratios_valid = true;

    for ([i, j, k], opposite) in FACES {
        let p = points[i];
        let normal = (points[j] - p).cross(points[k] - p);
        let origin_side = -normal.dot(p);
        let opposite_side = normal.dot(points[opposite] - p);

        if degenerate || opposite_signs(origin_side, opposite_side) {
            let candidate = triangle(points, i, j, k, epsilon);
            nearest = Some(match nearest {
                Some(best) => best.nearer(candidate),
                None => candidate,
            });
            continue;
        }

        match origin_side.checked_div(opposite_side) {
            Some(ratio) => ratios[opposite] = ratio,
            None => ratios_valid = false,
        }
    }

    if let Some(nearest) = nearest {
        return nearest;
    }

    if !ratios_valid {
        let quarter = Scalar::from_bits(1 << 30);
        ratios = [quarter; 4];
    }

    Projection::new(
        Vector3::ZERO,
        &[(0, ratios[0]), (1, ratios[1]), (2, ratios[2]), (3, ratios[3])],
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::settings::GjkSettings;

    const EPSILON: Scalar = GjkSettings::DEFAULT.epsilon;

    fn v(x: f32, y: f32, z: f32) -> Vector3 {
        Vector3::from_num(x, y, z)
    }

    #[test]
    fn segment_regions() {
        let points = [v(1.0, 1.0, 1.0), v(-1.0, -1.0, 1.0)];
        let p = segment(&points, 0, 1, EPSILON);
        assert_eq!(p.closest, v(0.0, 0.0, 1.0));
        assert_eq!(p.indices.as_slice(), &[0, 1]);
        assert_eq!(p.weights.as_slice(), &[math::HALF, math::HALF]);

        let points = [v(3.0, 3.0, 1.0), v(1.0, 1.0, 1.0)];
        let p = segment(&points, 0, 1, EPSILON);
        assert_eq!(p.closest, points[1]);
        assert_eq!(p.indices.as_slice(), &[1]);
    }

    #[test]
    fn degenerate_segment_keeps_nearer_point() {
        let a = v(1.0, 0.0, 0.0);
        let b = a - Vector3::new(Scalar::DELTA, Scalar::ZERO, Scalar::ZERO);
        let p = segment(&[a, b], 0, 1, EPSILON);

        assert_eq!(p.indices.as_slice(), &[1]);
        assert_eq!(p.closest, b);
    }

    #[test]
    fn triangle_edge_region() {
        let points = [v(1.0, 1.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0)];
        let p = triangle(&points, 0, 1, 2, EPSILON);

        assert_eq!(p.closest, v(0.5, 0.5, 0.0));
        assert_eq!(p.indices.as_slice(), &[1, 2]);
    }

    #[test]
    fn triangle_face_region() {
        let points = [Vector3::X, Vector3::Y, Vector3::Z];
        let p = triangle(&points, 0, 1, 2, EPSILON);

        let third = Scalar::ONE / Scalar::from_num(3);
        assert_abs_diff_eq!(p.closest, Vector3::splat(third), epsilon = Scalar::from_num(1.0e-6));
        assert_eq!(p.indices.as_slice(), &[0, 1, 2]);

        let sum: Scalar = p.weights.iter().copied().sum();
        assert!((sum - Scalar::ONE).abs() < Scalar::from_num(1.0e-6));
    }

    #[test]
    fn collinear_triangle_uses_nearest_edge() {
        let points = [v(-1.0, 1.0, 0.0), v(0.0, 1.0, 0.0), v(1.0, 1.0, 0.0)];
        let p = triangle(&points, 0, 1, 2, EPSILON);

        assert_eq!(p.closest, v(0.0, 1.0, 0.0));
        assert!(p.indices.len() < 3);
    }

    #[test]
    fn tetrahedron_contains_origin() {
        let points = [
            v(1.0, 1.0, 1.0),
            v(1.0, -1.0, -1.0),
            v(-1.0, 1.0, -1.0),
            v(-1.0, -1.0, 1.0),
        ];
        let p = tetrahedron(&points, EPSILON);

        assert_eq!(p.indices.len(), 4);
        assert_eq!(p.closest, Vector3::ZERO);
        assert_eq!(p.weights.as_slice(), &[Scalar::from_num(0.25); 4]);
    }

    #[test]
    fn tetrahedron_outside_reduces_to_edge() {
        let points = [
            v(4.0, 1.0, 1.0),
            v(4.0, -1.0, -1.0),
            v(2.0, 1.0, -1.0),
            v(2.0, -1.0, 1.0),
        ];
        let p = tetrahedron(&points, EPSILON);

        assert!(p.indices.len() < 4);
        assert_eq!(p.closest, v(2.0, 0.0, 0.0));
        assert_eq!(p.indices.as_slice(), &[2, 3]);
    }

    #[test]
    fn flat_tetrahedron_never_contains_origin() {
        let points = [
            v(1.0, 0.0, 1.0),
            v(0.0, 1.0, 1.0),
            v(-1.0, -1.0, 1.0),
            v(1.0, 1.0, 1.0),
        ];
        let p = tetrahedron(&points, EPSILON);

        assert!(p.indices.len() < 4);
        assert_abs_diff_eq!(p.closest, Vector3::Z, epsilon = Scalar::from_num(1.0e-6));
    }
}
