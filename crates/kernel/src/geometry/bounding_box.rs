use serde::{Deserialize, Serialize};

use super::point::Point3d;

/// Axis-aligned bounding box. Components may be infinite where the enclosed
/// region is unbounded along that axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3d,
    pub max: Point3d,
}

impl BoundingBox {
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self { min, max }
    }

    /// The box enclosing all of space.
    pub fn infinite() -> Self {
        Self {
            min: Point3d::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            max: Point3d::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
        }
    }

    /// Symmetric box of half-widths `half` around `center`.
    pub fn around(center: Point3d, half: [f64; 3]) -> Self {
        Self {
            min: Point3d::new(center.x - half[0], center.y - half[1], center.z - half[2]),
            max: Point3d::new(center.x + half[0], center.y + half[1], center.z + half[2]),
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.min.to_array().iter().all(|v| *v == f64::NEG_INFINITY)
            && self.max.to_array().iter().all(|v| *v == f64::INFINITY)
    }

    /// True when every component is finite.
    pub fn is_bounded(&self) -> bool {
        self.min.to_array().iter().chain(self.max.to_array().iter()).all(|v| v.is_finite())
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point3d::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3d::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            min: Point3d::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            max: Point3d::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        }
    }

    pub fn contains_point(&self, p: &Point3d) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::infinite()
    }
}
