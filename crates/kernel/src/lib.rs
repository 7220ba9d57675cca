pub mod error;
pub mod geometry;
pub mod quadric;
pub mod region;
pub mod surface;

// Re-export the working set at crate root for convenience.
pub use error::SurfaceError;
pub use geometry::bounding_box::BoundingBox;
pub use geometry::point::Point3d;
pub use geometry::rotation::{AxisOrder, Rotation};
pub use geometry::vector::{Axis, Vec3};
pub use quadric::{Diagonalization, QuadricForm};
pub use region::{Halfspace, Region, Side, TransformMemo};
pub use surface::{BoundaryType, Placement, Surface, SurfaceId, SurfaceKind, SurfaceStore};

/// Global tolerance configuration for numeric comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Absolute threshold for treating a coefficient or vector component as
    /// zero, and for coefficient-wise equivalence.
    pub coefficient: f64,
    /// Largest accepted entry of `RᵀR − I` for a user-supplied rotation matrix.
    pub orthonormal: f64,
    /// How close a rotation entry must be to −1, 0 or 1 for a torus to follow it.
    pub axis_snap: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coefficient: 1e-12,
            orthonormal: 1e-9,
            axis_snap: 1e-8,
        }
    }
}

impl Tolerance {
    pub fn is_zero(&self, value: f64) -> bool {
        value.abs() <= self.coefficient
    }

    pub fn is_zero_vector(&self, v: &Vec3) -> bool {
        v.is_zero(self.coefficient)
    }

    /// True when `value` lies within `axis_snap` of −1, 0 or 1.
    pub fn is_axis_entry(&self, value: f64) -> bool {
        [-1.0, 0.0, 1.0]
            .iter()
            .any(|target| (value - target).abs() <= self.axis_snap)
    }
}

/// The tolerance used when no store-specific one applies.
pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}
