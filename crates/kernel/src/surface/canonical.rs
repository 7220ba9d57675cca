//! Scale-invariant coefficient signatures and surface equivalence.

use super::{FamilyGroup, Surface};
use crate::default_tolerance;

/// Divide every coefficient by the magnitude of the first one that is not
/// within `atol` of zero. `None` when all of them are.
pub fn normalize(coefficients: &[f64], atol: f64) -> Option<Vec<f64>> {
    let pivot = coefficients.iter().find(|c| c.abs() > atol)?.abs();
    Some(coefficients.iter().map(|c| c / pivot).collect())
}

impl Surface {
    /// Normalised canonical tuple of this surface.
    pub fn normalized(&self) -> Option<Vec<f64>> {
        normalize(&self.base_coefficients(), default_tolerance().coefficient)
    }

    /// Same implicit locus up to an overall positive scale, compared
    /// coefficient-wise within the default coefficient tolerance.
    pub fn is_equal(&self, other: &Surface) -> bool {
        self.is_equal_within(other, default_tolerance().coefficient)
    }

    /// Like [`Surface::is_equal`] with an explicit absolute tolerance.
    ///
    /// Canonical tuples of different lengths (a plane against a cylinder, say)
    /// are compared through their ten-term quadric forms. Tori only match tori
    /// about the same axis.
    pub fn is_equal_within(&self, other: &Surface, atol: f64) -> bool {
        let torus = |s: &Surface| s.kind().group() == FamilyGroup::Torus;
        if torus(self) || torus(other) {
            if self.kind() != other.kind() {
                return false;
            }
            return coefficients_match(&self.base_coefficients(), &other.base_coefficients(), atol);
        }
        let mine = self.base_coefficients();
        let theirs = other.base_coefficients();
        if mine.len() == theirs.len() {
            return coefficients_match(&mine, &theirs, atol);
        }
        match (self.quadric_coefficients(), other.quadric_coefficients()) {
            (Some(a), Some(b)) => coefficients_match(&a, &b, atol),
            _ => false,
        }
    }
}

fn coefficients_match(lhs: &[f64], rhs: &[f64], atol: f64) -> bool {
    match (normalize(lhs, atol), normalize(rhs, atol)) {
        (Some(a), Some(b)) => a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| (x - y).abs() <= atol),
        _ => false,
    }
}
