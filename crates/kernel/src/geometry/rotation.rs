use nalgebra::Matrix3;
use std::fmt;
use std::str::FromStr;

use super::vector::Axis;
use crate::error::SurfaceError;
use crate::Tolerance;

/// Order in which the three lab-frame axis rotations are applied.
///
/// `"xyz"` (the default) applies the rotation about x first, then y, then z,
/// i.e. an x-y-z extrinsic rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisOrder([Axis; 3]);

impl AxisOrder {
    pub const XYZ: Self = Self([Axis::X, Axis::Y, Axis::Z]);

    pub fn new(first: Axis, second: Axis, third: Axis) -> Result<Self, SurfaceError> {
        if first == second || second == third || first == third {
            return Err(SurfaceError::UnsupportedTransform(format!(
                "rotation order must use each axis once, got {}{}{}",
                first.letter(),
                second.letter(),
                third.letter()
            )));
        }
        Ok(Self([first, second, third]))
    }

    pub fn axes(&self) -> [Axis; 3] {
        self.0
    }
}

impl Default for AxisOrder {
    fn default() -> Self {
        Self::XYZ
    }
}

impl FromStr for AxisOrder {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let axes: Vec<Axis> = s.chars().filter_map(Axis::from_letter).collect();
        if axes.len() != 3 || s.chars().count() != 3 {
            return Err(SurfaceError::UnsupportedTransform(format!(
                "rotation order '{s}' is not a permutation of 'xyz'"
            )));
        }
        Self::new(axes[0], axes[1], axes[2])
    }
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in self.0 {
            write!(f, "{}", axis.letter())?;
        }
        Ok(())
    }
}

/// A rotation request: Tait-Bryan angles or an explicit matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    /// Angles in degrees about the fixed x, y and z axes (in that slot order),
    /// applied in `order`. The rotations are active.
    Angles { degrees: [f64; 3], order: AxisOrder },
    /// A 3x3 orthonormal matrix applied directly.
    Matrix(Matrix3<f64>),
}

impl Rotation {
    /// Angles about x, y, z applied in the default `xyz` order.
    pub fn angles(phi: f64, theta: f64, psi: f64) -> Self {
        Rotation::Angles {
            degrees: [phi, theta, psi],
            order: AxisOrder::XYZ,
        }
    }

    /// Rotation by `degrees` about a single lab axis.
    pub fn about(axis: Axis, degrees: f64) -> Self {
        let mut angles = [0.0; 3];
        angles[axis.index()] = degrees;
        Rotation::Angles {
            degrees: angles,
            order: AxisOrder::XYZ,
        }
    }

    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Rotation::Matrix(Matrix3::from_fn(|i, j| rows[i][j]))
    }

    /// Resolve to a rotation matrix, checking that supplied matrices are
    /// orthonormal within `tol.orthonormal`.
    pub fn matrix(&self, tol: &Tolerance) -> Result<Matrix3<f64>, SurfaceError> {
        match self {
            Rotation::Angles { degrees, order } => {
                if degrees.iter().any(|d| !d.is_finite()) {
                    return Err(SurfaceError::UnsupportedTransform(format!(
                        "rotation angles must be finite, got {degrees:?}"
                    )));
                }
                Ok(rotation_matrix(*degrees, *order))
            }
            Rotation::Matrix(m) => {
                if m.iter().any(|v| !v.is_finite()) {
                    return Err(SurfaceError::UnsupportedTransform(
                        "rotation matrix has non-finite entries".to_string(),
                    ));
                }
                let deviation = (m.transpose() * m - Matrix3::identity()).amax();
                if deviation > tol.orthonormal {
                    return Err(SurfaceError::UnsupportedTransform(format!(
                        "rotation matrix is not orthonormal (deviation {deviation:e})"
                    )));
                }
                Ok(*m)
            }
        }
    }
}

/// Active rotation about a single lab-frame axis.
pub fn axis_rotation(axis: Axis, radians: f64) -> Matrix3<f64> {
    let (s, c) = radians.sin_cos();
    #[rustfmt::skip]
    let m = match axis {
        Axis::X => Matrix3::new(
            1.0, 0.0, 0.0,
            0.0, c,   -s,
            0.0, s,   c,
        ),
        Axis::Y => Matrix3::new(
            c,   0.0, s,
            0.0, 1.0, 0.0,
            -s,  0.0, c,
        ),
        Axis::Z => Matrix3::new(
            c,   -s,  0.0,
            s,   c,   0.0,
            0.0, 0.0, 1.0,
        ),
    };
    m
}

/// Build `R = R_third * R_second * R_first` from angles in degrees, where
/// `degrees[i]` is the angle about axis `i` and `order` picks which axis
/// rotation is applied first.
pub fn rotation_matrix(degrees: [f64; 3], order: AxisOrder) -> Matrix3<f64> {
    let [first, second, third] = order.axes().map(|axis| {
        axis_rotation(axis, degrees[axis.index()].to_radians())
    });
    third * second * first
}
