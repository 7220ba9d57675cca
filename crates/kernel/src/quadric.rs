//! Canonical quadric form: every degree-2 (or lower) surface written as
//! `xᵀAx + bᵀx + c = 0` with `A` symmetric.
//!
//! The ten-coefficient layout used throughout the crate is
//! `(a, b, c, d, e, f, g, h, j, k)` for
//! `ax² + by² + cz² + dxy + eyz + fxz + gx + hy + jz + k`.

use nalgebra::{Matrix3, SymmetricEigen, Vector3};

use crate::geometry::point::Point3d;
use crate::geometry::vector::{Axis, Vec3};

/// Symmetric-matrix / vector / scalar form of a quadric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadricForm {
    pub a: Matrix3<f64>,
    pub b: Vector3<f64>,
    pub c: f64,
}

/// Eigen-decomposition of the quadratic part, eigenvalues ascending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagonalization {
    pub eigenvalues: Vector3<f64>,
    /// Column `i` is the unit eigenvector for `eigenvalues[i]`.
    pub eigenvectors: Matrix3<f64>,
}

impl QuadricForm {
    /// Build the matrix form from `(a, b, c, d, e, f, g, h, j, k)`. The cross
    /// terms `d, e, f` are split evenly across the symmetric off-diagonals.
    pub fn from_coefficients(k: &[f64; 10]) -> Self {
        let [a, b, c, d, e, f, g, h, j, k0] = *k;
        #[rustfmt::skip]
        let m = Matrix3::new(
            a,       d / 2.0, f / 2.0,
            d / 2.0, b,       e / 2.0,
            f / 2.0, e / 2.0, c,
        );
        Self {
            a: m,
            b: Vector3::new(g, h, j),
            c: k0,
        }
    }

    /// The plane `ax + by + cz = d` as a (degenerate) quadric.
    pub fn from_plane(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            a: Matrix3::zeros(),
            b: Vector3::new(a, b, c),
            c: -d,
        }
    }

    pub fn to_coefficients(&self) -> [f64; 10] {
        let m = &self.a;
        [
            m[(0, 0)],
            m[(1, 1)],
            m[(2, 2)],
            m[(0, 1)] + m[(1, 0)],
            m[(1, 2)] + m[(2, 1)],
            m[(0, 2)] + m[(2, 0)],
            self.b[0],
            self.b[1],
            self.b[2],
            self.c,
        ]
    }

    pub fn evaluate(&self, p: &Point3d) -> f64 {
        let x = p.to_vector3();
        x.dot(&(self.a * x)) + self.b.dot(&x) + self.c
    }

    /// The surface shifted by `v`: `b' = b − 2Av`, `c' = c + vᵀAv − bᵀv`.
    pub fn translated(&self, v: &Vec3) -> Self {
        let v = v.to_vector3();
        let av = self.a * v;
        Self {
            a: self.a,
            b: self.b - 2.0 * av,
            c: self.c + v.dot(&av) - self.b.dot(&v),
        }
    }

    /// The surface under the active rotation `r` about the origin:
    /// `A' = RARᵀ`, `b' = Rb`, `c` unchanged.
    pub fn rotated(&self, r: &Matrix3<f64>) -> Self {
        let a = r * self.a * r.transpose();
        Self {
            // Re-symmetrise to keep round-off out of the off-diagonal pairs.
            a: (a + a.transpose()) * 0.5,
            b: r * self.b,
            c: self.c,
        }
    }

    /// Orthogonal diagonalisation of `A`.
    pub fn diagonalize(&self) -> Diagonalization {
        let eig = SymmetricEigen::new(self.a);
        let mut order = [0usize, 1, 2];
        order.sort_by(|&i, &j| eig.eigenvalues[i].total_cmp(&eig.eigenvalues[j]));
        Diagonalization {
            eigenvalues: Vector3::from_fn(|i, _| eig.eigenvalues[order[i]]),
            eigenvectors: Matrix3::from_fn(|r, c| eig.eigenvectors[(r, order[c])]),
        }
    }

    /// For a quadric of revolution (exactly two equal eigenvalues), the
    /// coordinate axis carrying the distinct principal direction, if any.
    pub fn symmetry_axis(&self, tol: f64) -> Option<Axis> {
        let diag = self.diagonalize();
        let l = diag.eigenvalues;
        let scale = l.amax().max(1.0);
        let same = |i: usize, j: usize| (l[i] - l[j]).abs() <= tol * scale;
        let distinct = match (same(0, 1), same(1, 2)) {
            (true, false) => 2,
            (false, true) => 0,
            _ => return None,
        };
        let v = diag.eigenvectors.column(distinct);
        (0..3)
            .find(|&i| (v[i].abs() - 1.0).abs() <= tol)
            .and_then(Axis::from_index)
    }
}
