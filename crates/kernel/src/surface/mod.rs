//! Implicit surfaces: a family tag, that family's coefficient tuple, and the
//! boundary condition applied at crossings.

pub mod canonical;
pub mod family;
pub mod store;

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use canonical::normalize;
pub use family::{CoefficientSlot, FamilyGroup, Slot, SurfaceKind};
pub use store::{Placement, SurfaceId, SurfaceStore};

use crate::error::SurfaceError;
use crate::geometry::bounding_box::BoundingBox;
use crate::geometry::point::Point3d;
use crate::geometry::vector::{Axis, Vec3};
use crate::quadric::QuadricForm;
use crate::region::Side;
use crate::{default_tolerance, Tolerance};

const ORIGIN_NAMES: [&str; 3] = ["x0", "y0", "z0"];
const AXIS_NAMES: [&str; 3] = ["dx", "dy", "dz"];

// ─── Boundary Conditions ────────────────────────────────────────────────────

/// What happens to a particle or ray crossing the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryType {
    #[default]
    Transmission,
    Vacuum,
    Reflective,
    Periodic,
    White,
}

impl BoundaryType {
    pub const ALL: [BoundaryType; 5] = [
        BoundaryType::Transmission,
        BoundaryType::Vacuum,
        BoundaryType::Reflective,
        BoundaryType::Periodic,
        BoundaryType::White,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BoundaryType::Transmission => "transmission",
            BoundaryType::Vacuum => "vacuum",
            BoundaryType::Reflective => "reflective",
            BoundaryType::Periodic => "periodic",
            BoundaryType::White => "white",
        }
    }

    /// Whether an albedo applies at crossings of this boundary.
    pub fn carries_albedo(self) -> bool {
        matches!(
            self,
            BoundaryType::Reflective | BoundaryType::Periodic | BoundaryType::White
        )
    }
}

impl FromStr for BoundaryType {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| SurfaceError::InvalidBoundaryType(s.to_string()))
    }
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relative closeness used when deciding whether an albedo is the identity.
pub fn is_unit_albedo(albedo: f64) -> bool {
    (albedo - 1.0).abs() <= 1e-9 * albedo.abs().max(1.0)
}

fn validate_albedo(albedo: f64) -> Result<f64, SurfaceError> {
    if albedo.is_finite() && albedo > 0.0 {
        Ok(albedo)
    } else {
        Err(SurfaceError::InvalidAlbedo(albedo))
    }
}

// ─── Surface ────────────────────────────────────────────────────────────────

/// A surface value. Identity lives in [`SurfaceStore`]; two equal values are
/// still distinct surfaces once inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SurfaceFields")]
pub struct Surface {
    kind: SurfaceKind,
    coefficients: Vec<f64>,
    pub name: String,
    pub boundary: BoundaryType,
    albedo: f64,
}

/// Unchecked mirror of [`Surface`] used to validate deserialized input.
#[derive(Deserialize)]
struct SurfaceFields {
    kind: SurfaceKind,
    coefficients: Vec<f64>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    boundary: BoundaryType,
    #[serde(default = "unit_albedo")]
    albedo: f64,
}

fn unit_albedo() -> f64 {
    1.0
}

impl TryFrom<SurfaceFields> for Surface {
    type Error = SurfaceError;

    fn try_from(fields: SurfaceFields) -> Result<Self, Self::Error> {
        Ok(Surface::from_coefficients(fields.kind, &fields.coefficients)?
            .with_name(fields.name)
            .with_boundary(fields.boundary)
            .with_albedo(fields.albedo)?)
    }
}

impl Surface {
    /// A surface of `kind` with every coefficient at its default.
    pub fn new(kind: SurfaceKind) -> Self {
        Self::with_values(kind, kind.defaults().to_vec())
    }

    fn with_values(kind: SurfaceKind, coefficients: Vec<f64>) -> Self {
        Self {
            kind,
            coefficients,
            name: String::new(),
            boundary: BoundaryType::default(),
            albedo: 1.0,
        }
    }

    /// Build from the family's own coefficients, in family order.
    pub fn from_coefficients(kind: SurfaceKind, values: &[f64]) -> Result<Self, SurfaceError> {
        let expected = kind.coefficient_count();
        if values.len() != expected {
            return Err(SurfaceError::CoefficientCount {
                family: kind.type_tag(),
                expected,
                got: values.len(),
            });
        }
        let surface = Self::with_values(kind, values.to_vec());
        surface.validate()?;
        Ok(surface)
    }

    /// Check that every own coefficient is finite and that general cylinders
    /// and cones have a non-zero axis.
    ///
    /// The typed constructors below take their arguments as given; run this
    /// on surfaces built from untrusted values, or go through
    /// [`Surface::from_coefficients`], which always does.
    pub fn validate(&self) -> Result<(), SurfaceError> {
        for (name, value) in self.kind.coefficient_names().zip(&self.coefficients) {
            check_finite(name, *value)?;
        }
        check_axis(self.kind, &self.coefficients)
    }

    pub fn plane(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self::with_values(SurfaceKind::Plane, vec![a, b, c, d])
    }

    /// The plane `axis = value`.
    pub fn axis_plane(axis: Axis, value: f64) -> Self {
        Self::with_values(SurfaceKind::axis_plane(axis), vec![value])
    }

    pub fn x_plane(x0: f64) -> Self {
        Self::axis_plane(Axis::X, x0)
    }

    pub fn y_plane(y0: f64) -> Self {
        Self::axis_plane(Axis::Y, y0)
    }

    pub fn z_plane(z0: f64) -> Self {
        Self::axis_plane(Axis::Z, z0)
    }

    /// Infinite cylinder of radius `r` through `origin` along `axis`.
    pub fn cylinder(origin: Point3d, r: f64, axis: Vec3) -> Result<Self, SurfaceError> {
        Self::from_coefficients(
            SurfaceKind::Cylinder,
            &[origin.x, origin.y, origin.z, r, axis.x, axis.y, axis.z],
        )
    }

    /// Cylinder of radius `r` along `axis`, crossing the perpendicular plane
    /// at `(u, v)` in the order of [`Axis::others`].
    pub fn axis_cylinder(axis: Axis, u: f64, v: f64, r: f64) -> Self {
        Self::with_values(SurfaceKind::axis_cylinder(axis), vec![u, v, r])
    }

    pub fn x_cylinder(y0: f64, z0: f64, r: f64) -> Self {
        Self::axis_cylinder(Axis::X, y0, z0, r)
    }

    pub fn y_cylinder(x0: f64, z0: f64, r: f64) -> Self {
        Self::axis_cylinder(Axis::Y, x0, z0, r)
    }

    pub fn z_cylinder(x0: f64, y0: f64, r: f64) -> Self {
        Self::axis_cylinder(Axis::Z, x0, y0, r)
    }

    pub fn sphere(center: Point3d, r: f64) -> Self {
        Self::with_values(SurfaceKind::Sphere, vec![center.x, center.y, center.z, r])
    }

    /// Double cone with apex `apex`, axis `axis` and `r2 = tan²θ` of the
    /// half-opening angle.
    pub fn cone(apex: Point3d, r2: f64, axis: Vec3) -> Result<Self, SurfaceError> {
        Self::from_coefficients(
            SurfaceKind::Cone,
            &[apex.x, apex.y, apex.z, r2, axis.x, axis.y, axis.z],
        )
    }

    pub fn axis_cone(axis: Axis, apex: Point3d, r2: f64) -> Self {
        Self::with_values(SurfaceKind::axis_cone(axis), vec![apex.x, apex.y, apex.z, r2])
    }

    /// General quadric from `(a, b, c, d, e, f, g, h, j, k)`.
    pub fn quadric(coefficients: [f64; 10]) -> Self {
        Self::with_values(SurfaceKind::Quadric, coefficients.to_vec())
    }

    /// Torus about `axis` with major radius `a` and minor radii `b` (axial)
    /// and `c` (radial).
    pub fn torus(axis: Axis, center: Point3d, a: f64, b: f64, c: f64) -> Self {
        Self::with_values(SurfaceKind::torus(axis), vec![center.x, center.y, center.z, a, b, c])
    }

    /// Plane through three points, normal `(p2 − p1) × (p3 − p1)`.
    pub fn plane_from_points(p1: Point3d, p2: Point3d, p3: Point3d) -> Result<Self, SurfaceError> {
        let n = (p2 - p1).cross(&(p3 - p1));
        if n.is_zero(default_tolerance().coefficient) {
            return Err(SurfaceError::DegenerateConstruction(
                "plane points are colinear".to_string(),
            ));
        }
        Ok(Self::plane(n.x, n.y, n.z, n.dot(&p1.to_vec3())))
    }

    /// Cylinder of radius `r` whose axis passes through `p1` and `p2`.
    pub fn cylinder_from_points(p1: Point3d, p2: Point3d, r: f64) -> Result<Self, SurfaceError> {
        Self::cylinder(p1, r, p2 - p1)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_boundary(mut self, boundary: BoundaryType) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_albedo(mut self, albedo: f64) -> Result<Self, SurfaceError> {
        self.albedo = validate_albedo(albedo)?;
        Ok(self)
    }

    // ─── Accessors ──────────────────────────────────────────────────────

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn type_tag(&self) -> &'static str {
        self.kind.type_tag()
    }

    /// Own coefficients in family order.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Stored albedo, regardless of boundary.
    pub fn albedo(&self) -> f64 {
        self.albedo
    }

    pub fn set_albedo(&mut self, albedo: f64) -> Result<(), SurfaceError> {
        self.albedo = validate_albedo(albedo)?;
        Ok(())
    }

    /// Albedo seen by a crossing: the stored value on reflective, periodic
    /// and white boundaries, otherwise 1.
    pub fn effective_albedo(&self) -> f64 {
        if self.boundary.carries_albedo() {
            self.albedo
        } else {
            1.0
        }
    }

    /// Read any named slot, including family constants and aliases.
    pub fn coefficient(&self, name: &str) -> Result<f64, SurfaceError> {
        self.kind
            .slot(name)
            .map(|slot| self.resolve(slot))
            .ok_or_else(|| SurfaceError::UnknownCoefficient {
                name: name.to_string(),
                family: self.type_tag(),
            })
    }

    /// Write a named slot. Constants are rejected, and nothing changes unless
    /// the new value passes validation.
    pub fn set_coefficient(&mut self, name: &str, value: f64) -> Result<(), SurfaceError> {
        let index = match self.kind.slot(name) {
            Some(Slot::Free(i) | Slot::Alias(i)) => i,
            Some(Slot::Constant(_)) => {
                return Err(SurfaceError::ReadOnlyCoefficientWrite {
                    name: name.to_string(),
                    family: self.type_tag(),
                });
            }
            None => {
                return Err(SurfaceError::UnknownCoefficient {
                    name: name.to_string(),
                    family: self.type_tag(),
                });
            }
        };
        check_finite(name, value)?;
        let mut candidate = self.coefficients.clone();
        candidate[index] = value;
        check_axis(self.kind, &candidate)?;
        self.coefficients = candidate;
        Ok(())
    }

    fn resolve(&self, slot: Slot) -> f64 {
        match slot {
            Slot::Free(i) | Slot::Alias(i) => self.coefficients[i],
            Slot::Constant(value) => value,
        }
    }

    /// Slot lookup for names the family group guarantees.
    fn named(&self, name: &str) -> f64 {
        let slot = self.kind.slot(name);
        debug_assert!(slot.is_some(), "{} has no coefficient {name}", self.type_tag());
        slot.map_or(0.0, |s| self.resolve(s))
    }

    /// Write-through used by transforms; constant slots are left untouched.
    fn write_through(&mut self, name: &str, value: f64) {
        if let Some(Slot::Free(i) | Slot::Alias(i)) = self.kind.slot(name) {
            self.coefficients[i] = value;
        }
    }

    /// Centre, apex or origin for the families that carry one.
    pub fn origin(&self) -> Option<Point3d> {
        match self.kind.group() {
            FamilyGroup::Cylinder | FamilyGroup::Sphere | FamilyGroup::Cone | FamilyGroup::Torus => {
                let [x, y, z] = ORIGIN_NAMES.map(|n| self.named(n));
                Some(Point3d::new(x, y, z))
            }
            FamilyGroup::Plane | FamilyGroup::Quadric => None,
        }
    }

    /// Axis vector of cylinders and cones, as stored.
    pub fn axis_direction(&self) -> Option<Vec3> {
        match self.kind.group() {
            FamilyGroup::Cylinder | FamilyGroup::Cone => {
                let [x, y, z] = AXIS_NAMES.map(|n| self.named(n));
                Some(Vec3::new(x, y, z))
            }
            _ => None,
        }
    }

    fn unit_axis(&self) -> Vec3 {
        let axis = self.axis_direction().unwrap_or(Vec3::Z);
        axis.normalized().unwrap_or(axis)
    }

    fn plane_coefficients(&self) -> [f64; 4] {
        ["a", "b", "c", "d"].map(|n| self.named(n))
    }

    // ─── Evaluation ─────────────────────────────────────────────────────

    /// Value of the implicit function at `p`; negative inside.
    pub fn evaluate(&self, p: &Point3d) -> f64 {
        let axis = self.kind.axis();
        match (self.kind.group(), axis) {
            (FamilyGroup::Plane, None) => {
                let [a, b, c, d] = self.plane_coefficients();
                a * p.x + b * p.y + c * p.z - d
            }
            (FamilyGroup::Plane, Some(axis)) => p.coordinate(axis) - self.coefficients[0],
            (FamilyGroup::Cylinder, Some(axis)) => {
                let offset = *p - self.origin().unwrap_or(Point3d::ORIGIN);
                let r = self.named("r");
                axis.others()
                    .iter()
                    .map(|o| offset[o.index()].powi(2))
                    .sum::<f64>()
                    - r * r
            }
            (FamilyGroup::Sphere, _) => {
                let offset = *p - self.origin().unwrap_or(Point3d::ORIGIN);
                let r = self.named("r");
                offset.length_squared() - r * r
            }
            (FamilyGroup::Cone, Some(axis)) => {
                let offset = *p - self.origin().unwrap_or(Point3d::ORIGIN);
                let w = offset[axis.index()];
                axis.others()
                    .iter()
                    .map(|o| offset[o.index()].powi(2))
                    .sum::<f64>()
                    - self.named("r2") * w * w
            }
            (FamilyGroup::Torus, Some(axis)) => {
                let offset = *p - self.origin().unwrap_or(Point3d::ORIGIN);
                let [a, b, c] = ["a", "b", "c"].map(|n| self.named(n));
                let w = offset[axis.index()];
                let radial = axis
                    .others()
                    .iter()
                    .map(|o| offset[o.index()].powi(2))
                    .sum::<f64>()
                    .sqrt();
                w * w / (b * b) + (radial - a).powi(2) / (c * c) - 1.0
            }
            _ => self
                .quadric_form()
                .map_or(f64::NAN, |q| q.evaluate(p)),
        }
    }

    /// Axis-aligned box enclosing the given half-space of this surface.
    ///
    /// Only planes report a finite bound on their positive side; every other
    /// family's exterior is unbounded.
    pub fn bounding_box(&self, side: Side) -> BoundingBox {
        if self.kind.is_planar() {
            return self.plane_bounding_box(side);
        }
        if side == Side::Positive {
            return BoundingBox::infinite();
        }
        let center = self.origin().unwrap_or(Point3d::ORIGIN);
        match (self.kind.group(), self.kind.axis()) {
            (FamilyGroup::Cylinder, Some(axis)) => {
                let r = self.named("r");
                let mut half = [r; 3];
                half[axis.index()] = f64::INFINITY;
                BoundingBox::around(center, half)
            }
            (FamilyGroup::Sphere, _) => BoundingBox::around(center, [self.named("r"); 3]),
            (FamilyGroup::Torus, Some(axis)) => {
                let [a, b, c] = ["a", "b", "c"].map(|n| self.named(n));
                let mut half = [a + c; 3];
                half[axis.index()] = b;
                BoundingBox::around(center, half)
            }
            _ => BoundingBox::infinite(),
        }
    }

    /// Half-infinite slab when the normal lies along a coordinate axis,
    /// otherwise all of space.
    fn plane_bounding_box(&self, side: Side) -> BoundingBox {
        let tol = default_tolerance();
        let [a, b, c, d] = self.plane_coefficients();
        let Some(nhat) = Vec3::new(a, b, c).normalized() else {
            return BoundingBox::infinite();
        };
        let aligned = nhat
            .to_array()
            .iter()
            .any(|n| (n.abs() - 1.0).abs() <= tol.coefficient);
        if !aligned {
            return BoundingBox::infinite();
        }
        let sign = nhat.x + nhat.y + nhat.z;
        let bound = |coef: f64, unbounded: f64| {
            if tol.is_zero(coef) {
                unbounded
            } else {
                d / coef
            }
        };
        let mut bb = BoundingBox::infinite();
        if (side == Side::Negative) == (sign > 0.0) {
            let inf = f64::INFINITY;
            bb.max = Point3d::new(bound(a, inf), bound(b, inf), bound(c, inf));
        } else {
            let inf = f64::NEG_INFINITY;
            bb.min = Point3d::new(bound(a, inf), bound(b, inf), bound(c, inf));
        }
        bb
    }

    // ─── Canonical Coefficients ─────────────────────────────────────────

    /// The ten-term quadric tuple `(a, b, c, d, e, f, g, h, j, k)`, or `None`
    /// for tori.
    pub fn quadric_coefficients(&self) -> Option<[f64; 10]> {
        let mut q = [0.0; 10];
        match (self.kind.group(), self.kind.axis()) {
            (FamilyGroup::Plane, _) => {
                let [a, b, c, d] = self.plane_coefficients();
                q = QuadricForm::from_plane(a, b, c, d).to_coefficients();
            }
            (FamilyGroup::Cylinder, Some(axis)) => {
                let o = self.origin()?;
                let r = self.named("r");
                let mut k = -r * r;
                for other in axis.others() {
                    let i = other.index();
                    q[i] = 1.0;
                    q[6 + i] = -2.0 * o[i];
                    k += o[i] * o[i];
                }
                q[9] = k;
            }
            (FamilyGroup::Cylinder, None) => q = self.general_cylinder_coefficients(),
            (FamilyGroup::Sphere, _) => {
                let o = self.origin()?;
                let r = self.named("r");
                q[..3].fill(1.0);
                for i in 0..3 {
                    q[6 + i] = -2.0 * o[i];
                }
                q[9] = o.to_vec3().length_squared() - r * r;
            }
            (FamilyGroup::Cone, Some(axis)) => {
                let o = self.origin()?;
                let r2 = self.named("r2");
                let w = axis.index();
                q[w] = -r2;
                q[6 + w] = 2.0 * o[w] * r2;
                let mut k = -r2 * o[w] * o[w];
                for other in axis.others() {
                    let i = other.index();
                    q[i] = 1.0;
                    q[6 + i] = -2.0 * o[i];
                    k += o[i] * o[i];
                }
                q[9] = k;
            }
            (FamilyGroup::Cone, None) => q = self.general_cone_coefficients(),
            (FamilyGroup::Quadric, _) => {
                for (slot, value) in q.iter_mut().zip(&self.coefficients) {
                    *slot = *value;
                }
            }
            (FamilyGroup::Torus, _) => return None,
        }
        Some(q)
    }

    /// Derived from `r = |(p − p1) × (p − p2)| / |p2 − p1|` with `p1` the
    /// origin and `p2` one unit along the axis.
    fn general_cylinder_coefficients(&self) -> [f64; 10] {
        let p1 = self.origin().unwrap_or(Point3d::ORIGIN);
        let p2 = p1 + self.unit_axis();
        let r = self.named("r");
        let (x1, y1, z1) = (p1.x, p1.y, p1.z);
        let (x2, y2, z2) = (p2.x, p2.y, p2.z);
        let (dx, dy, dz) = (x2 - x1, y2 - y1, z2 - z1);
        let cx = y1 * z2 - y2 * z1;
        let cy = x2 * z1 - x1 * z2;
        let cz = x1 * y2 - x2 * y1;
        [
            dy * dy + dz * dz,
            dx * dx + dz * dz,
            dx * dx + dy * dy,
            -2.0 * dx * dy,
            -2.0 * dy * dz,
            -2.0 * dx * dz,
            2.0 * (cy * dz - cz * dy),
            2.0 * (cz * dx - cx * dz),
            2.0 * (cx * dy - cy * dx),
            cx * cx + cy * cy + cz * cz - (dx * dx + dy * dy + dz * dz) * r * r,
        ]
    }

    /// `|r − p|² cos²θ − (d·(r − p))² = 0` with `cos²θ = 1 / (1 + r2)`.
    fn general_cone_coefficients(&self) -> [f64; 10] {
        let p = self.origin().unwrap_or(Point3d::ORIGIN);
        let (x0, y0, z0) = (p.x, p.y, p.z);
        let d = self.unit_axis();
        let (dx, dy, dz) = (d.x, d.y, d.z);
        let cos2 = 1.0 / (1.0 + self.named("r2"));
        let a = cos2 - dx * dx;
        let b = cos2 - dy * dy;
        let c = cos2 - dz * dz;
        [
            a,
            b,
            c,
            -2.0 * dx * dy,
            -2.0 * dy * dz,
            -2.0 * dx * dz,
            2.0 * (dx * (dy * y0 + dz * z0) - a * x0),
            2.0 * (dy * (dx * x0 + dz * z0) - b * y0),
            2.0 * (dz * (dx * x0 + dy * y0) - c * z0),
            a * x0 * x0 + b * y0 * y0 + c * z0 * z0
                - 2.0 * (dx * dy * x0 * y0 + dy * dz * y0 * z0 + dx * dz * x0 * z0),
        ]
    }

    pub fn quadric_form(&self) -> Option<QuadricForm> {
        self.quadric_coefficients()
            .map(|q| QuadricForm::from_coefficients(&q))
    }

    /// Canonical tuple: `(a, b, c, d)` for planes, the ten-term quadric tuple
    /// for other degree-2 families, and the torus's own six coefficients.
    pub fn base_coefficients(&self) -> Vec<f64> {
        match self.kind.group() {
            FamilyGroup::Plane => self.plane_coefficients().to_vec(),
            FamilyGroup::Torus => self.coefficients.clone(),
            _ => self
                .quadric_coefficients()
                .map_or_else(|| self.coefficients.clone(), |q| q.to_vec()),
        }
    }

    /// Output-only general quadric standing in for a general cylinder or
    /// cone. Boundary, albedo and name are carried over.
    pub fn quadric_substitute(&self) -> Option<Surface> {
        match self.kind {
            SurfaceKind::Cylinder | SurfaceKind::Cone => {
                let q = self.quadric_coefficients()?;
                Some(Surface {
                    kind: SurfaceKind::Quadric,
                    coefficients: q.to_vec(),
                    name: self.name.clone(),
                    boundary: self.boundary,
                    albedo: self.albedo,
                })
            }
            _ => None,
        }
    }

    // ─── Transforms ─────────────────────────────────────────────────────

    /// This surface shifted by `v`.
    pub fn translated(&self, v: &Vec3) -> Surface {
        let mut moved = self.clone();
        match self.kind.group() {
            FamilyGroup::Plane => {
                let [a, b, c, d] = self.plane_coefficients();
                moved.write_through("d", d + a * v.x + b * v.y + c * v.z);
            }
            FamilyGroup::Quadric => {
                if let Some(q) = self.quadric_form() {
                    moved.coefficients = q.translated(v).to_coefficients().to_vec();
                }
            }
            FamilyGroup::Cylinder | FamilyGroup::Sphere | FamilyGroup::Cone | FamilyGroup::Torus => {
                for (i, name) in ORIGIN_NAMES.iter().enumerate() {
                    moved.write_through(name, self.named(name) + v[i]);
                }
            }
        }
        moved
    }

    /// The fully general member of this surface's family carrying the same
    /// locus, boundary, albedo and name.
    pub fn widened(&self) -> Surface {
        let general = self.kind.general();
        if general == self.kind {
            return self.clone();
        }
        Surface {
            kind: general,
            coefficients: general.coefficient_names().map(|n| self.named(n)).collect(),
            name: self.name.clone(),
            boundary: self.boundary,
            albedo: self.albedo,
        }
    }

    /// This surface under the active rotation `r` about the origin. `r` must
    /// already be orthonormal; see
    /// [`Rotation::matrix`](crate::geometry::rotation::Rotation::matrix).
    pub fn rotated(&self, r: &Matrix3<f64>, tol: &Tolerance) -> Result<Surface, SurfaceError> {
        if self.kind.group() == FamilyGroup::Torus {
            return self.rotated_torus(r, tol);
        }
        let turn = |v: Vec3| Vec3::from_vector3(&(r * v.to_vector3()));
        let mut out = self.widened();
        match out.kind.group() {
            FamilyGroup::Plane => {
                let [a, b, c, _] = out.plane_coefficients();
                let n = turn(Vec3::new(a, b, c));
                out.write_through("a", n.x);
                out.write_through("b", n.y);
                out.write_through("c", n.z);
            }
            FamilyGroup::Cylinder | FamilyGroup::Cone | FamilyGroup::Sphere => {
                let origin = turn(out.origin().unwrap_or(Point3d::ORIGIN).to_vec3());
                for (i, name) in ORIGIN_NAMES.iter().enumerate() {
                    out.write_through(name, origin[i]);
                }
                if out.axis_direction().is_some() {
                    let axis = turn(out.unit_axis());
                    for (i, name) in AXIS_NAMES.iter().enumerate() {
                        out.write_through(name, axis[i]);
                    }
                }
            }
            FamilyGroup::Quadric => {
                if let Some(q) = out.quadric_form() {
                    out.coefficients = q.rotated(r).to_coefficients().to_vec();
                }
            }
            FamilyGroup::Torus => {}
        }
        Ok(out)
    }

    /// Tori follow only axis permutations and reflections: the centre is
    /// rotated and the family switches to whichever axis the old one maps to.
    fn rotated_torus(&self, r: &Matrix3<f64>, tol: &Tolerance) -> Result<Surface, SurfaceError> {
        if !r.iter().all(|v| tol.is_axis_entry(*v)) {
            return Err(SurfaceError::UnsupportedTransform(
                "torus surfaces only follow rotations that permute or reflect the coordinate axes"
                    .to_string(),
            ));
        }
        let axis = self.kind.axis().ok_or_else(|| {
            SurfaceError::UnsupportedTransform(format!("{} has no symmetry axis", self.type_tag()))
        })?;
        let turned = r * axis.unit().to_vector3();
        let new_axis = Axis::ALL
            .into_iter()
            .find(|a| (turned[a.index()].abs() - 1.0).abs() <= tol.axis_snap)
            .ok_or_else(|| {
                SurfaceError::UnsupportedTransform("torus axis does not map onto a coordinate axis".to_string())
            })?;
        let center = r * self.origin().unwrap_or(Point3d::ORIGIN).to_vector3();
        let mut out = self.clone();
        out.kind = SurfaceKind::torus(new_axis);
        out.coefficients[..3].copy_from_slice(center.as_slice());
        Ok(out)
    }

    /// Rotate by `r` about `pivot`: shift the pivot to the origin, rotate,
    /// shift back.
    pub fn rotated_about(
        &self,
        r: &Matrix3<f64>,
        pivot: &Point3d,
        tol: &Tolerance,
    ) -> Result<Surface, SurfaceError> {
        let offset = pivot.to_vec3();
        Ok(self.translated(&-offset).rotated(r, tol)?.translated(&offset))
    }
}

fn check_finite(name: &str, value: f64) -> Result<(), SurfaceError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SurfaceError::InvalidCoefficient {
            name: name.to_string(),
            value,
        })
    }
}

/// General cylinders and cones need a non-zero axis.
fn check_axis(kind: SurfaceKind, values: &[f64]) -> Result<(), SurfaceError> {
    if !matches!(kind, SurfaceKind::Cylinder | SurfaceKind::Cone) {
        return Ok(());
    }
    let axis = Vec3::new(values[4], values[5], values[6]);
    if axis.is_zero(default_tolerance().coefficient) {
        return Err(SurfaceError::DegenerateConstruction(format!(
            "{} axis has zero length",
            kind.type_tag()
        )));
    }
    Ok(())
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Surface")?;
        writeln!(f, "{:<20}=\t{}", "\tName", self.name)?;
        writeln!(f, "{:<20}=\t{}", "\tType", self.type_tag())?;
        writeln!(f, "{:<20}=\t{}", "\tBoundary", self.boundary)?;
        if self.boundary.carries_albedo() && !is_unit_albedo(self.albedo) {
            writeln!(f, "{:<20}=\t{}", "\tBoundary Albedo", self.albedo)?;
        }
        writeln!(f, "{:<20}", "\tCoefficients")?;
        for (name, value) in self.kind.coefficient_names().zip(&self.coefficients) {
            writeln!(f, "{name:<20}=\t{value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rotation::{rotation_matrix, Rotation};
    use approx::assert_abs_diff_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3d {
        Point3d::new(x, y, z)
    }

    #[test]
    fn test_boundary_type_parsing() {
        for b in BoundaryType::ALL {
            assert_eq!(b.as_str().parse::<BoundaryType>().unwrap(), b);
        }
        assert_eq!(
            "mirror".parse::<BoundaryType>(),
            Err(SurfaceError::InvalidBoundaryType("mirror".to_string()))
        );
        assert!(BoundaryType::White.carries_albedo());
        assert!(!BoundaryType::Vacuum.carries_albedo());
    }

    #[test]
    fn test_defaults() {
        let s = Surface::new(SurfaceKind::Cylinder);
        assert_eq!(s.coefficients(), &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(s.boundary, BoundaryType::Transmission);
        assert_eq!(s.albedo(), 1.0);
        assert!(s.name.is_empty());
    }

    #[test]
    fn test_albedo_validation() {
        assert_eq!(
            Surface::x_plane(0.0).with_albedo(0.0).unwrap_err(),
            SurfaceError::InvalidAlbedo(0.0)
        );
        assert!(Surface::x_plane(0.0).with_albedo(f64::NAN).is_err());
        let mut s = Surface::x_plane(0.0).with_albedo(0.5).unwrap();
        assert!(s.set_albedo(-1.0).is_err());
        assert_eq!(s.albedo(), 0.5);
    }

    #[test]
    fn test_effective_albedo_depends_on_boundary() {
        let s = Surface::x_plane(0.0).with_albedo(0.7).unwrap();
        assert_eq!(s.effective_albedo(), 1.0);
        let s = s.with_boundary(BoundaryType::Reflective);
        assert_eq!(s.effective_albedo(), 0.7);
    }

    #[test]
    fn test_from_coefficients_validates() {
        assert!(matches!(
            Surface::from_coefficients(SurfaceKind::Sphere, &[0.0, 0.0, 1.0]),
            Err(SurfaceError::CoefficientCount { expected: 4, got: 3, .. })
        ));
        assert!(matches!(
            Surface::from_coefficients(SurfaceKind::Sphere, &[0.0, f64::NAN, 0.0, 1.0]),
            Err(SurfaceError::InvalidCoefficient { .. })
        ));
        assert!(matches!(
            Surface::cylinder(Point3d::ORIGIN, 1.0, Vec3::ZERO),
            Err(SurfaceError::DegenerateConstruction(_))
        ));
        assert!(matches!(
            Surface::cone(Point3d::ORIGIN, 1.0, Vec3::ZERO),
            Err(SurfaceError::DegenerateConstruction(_))
        ));
    }

    #[test]
    fn test_validate_typed_constructors() {
        let nan_sphere = Surface::sphere(Point3d::ORIGIN, f64::NAN);
        assert!(matches!(
            nan_sphere.validate(),
            Err(SurfaceError::InvalidCoefficient { ref name, .. }) if name == "r"
        ));
        assert!(matches!(
            Surface::torus(Axis::Z, p(f64::INFINITY, 0.0, 0.0), 3.0, 1.0, 1.0).validate(),
            Err(SurfaceError::InvalidCoefficient { ref name, .. }) if name == "x0"
        ));
        assert!(Surface::quadric([1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, f64::NEG_INFINITY])
            .validate()
            .is_err());
        assert!(Surface::sphere(Point3d::ORIGIN, 2.0).validate().is_ok());
        assert!(Surface::new(SurfaceKind::Cone).validate().is_ok());
    }

    #[test]
    fn test_axis_cylinder_matches_named_constructors() {
        assert_eq!(Surface::axis_cylinder(Axis::Y, 1.0, 2.0, 3.0), Surface::y_cylinder(1.0, 2.0, 3.0));
        assert_eq!(Surface::axis_cylinder(Axis::Z, 1.0, 2.0, 3.0).kind(), SurfaceKind::ZCylinder);
        assert_eq!(Surface::axis_cylinder(Axis::X, 1.0, 2.0, 3.0).coefficient("z0"), Ok(2.0));
    }

    #[test]
    fn test_named_slots() {
        let mut s = Surface::x_cylinder(1.0, 2.0, 3.0);
        assert_eq!(s.coefficient("y0").unwrap(), 1.0);
        assert_eq!(s.coefficient("x0").unwrap(), 0.0);
        assert_eq!(s.coefficient("dx").unwrap(), 1.0);
        assert!(matches!(
            s.set_coefficient("dx", 0.5),
            Err(SurfaceError::ReadOnlyCoefficientWrite { .. })
        ));
        assert!(matches!(
            s.set_coefficient("r2", 0.5),
            Err(SurfaceError::UnknownCoefficient { .. })
        ));
        assert!(matches!(
            s.set_coefficient("r", f64::NAN),
            Err(SurfaceError::InvalidCoefficient { .. })
        ));
        s.set_coefficient("r", 4.0).unwrap();
        assert_eq!(s.coefficients(), &[1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_axis_plane_alias() {
        let mut s = Surface::z_plane(2.0);
        assert_eq!(s.coefficient("d").unwrap(), 2.0);
        assert_eq!(s.coefficient("c").unwrap(), 1.0);
        s.set_coefficient("d", 5.0).unwrap();
        assert_eq!(s.coefficient("z0").unwrap(), 5.0);
        assert!(s.set_coefficient("a", 1.0).is_err());
    }

    #[test]
    fn test_zero_axis_write_rejected_without_change() {
        let mut s = Surface::cylinder(Point3d::ORIGIN, 1.0, Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(matches!(
            s.set_coefficient("dz", 0.0),
            Err(SurfaceError::DegenerateConstruction(_))
        ));
        assert_eq!(s.coefficient("dz").unwrap(), 1.0);
    }

    #[test]
    fn test_evaluate_families() {
        assert_eq!(Surface::plane(1.0, 2.0, 3.0, 4.0).evaluate(&p(1.0, 1.0, 1.0)), 2.0);
        assert_eq!(Surface::y_plane(2.0).evaluate(&p(0.0, 5.0, 0.0)), 3.0);
        assert_eq!(Surface::z_cylinder(1.0, 1.0, 2.0).evaluate(&p(1.0, 1.0, 9.0)), -4.0);
        assert_eq!(Surface::sphere(p(1.0, 0.0, 0.0), 1.0).evaluate(&p(1.0, 0.0, 1.0)), 0.0);
        // y² + z² − 4x² on the x-cone
        let cone = Surface::axis_cone(Axis::X, Point3d::ORIGIN, 4.0);
        assert_eq!(cone.evaluate(&p(1.0, 2.0, 0.0)), 0.0);
        assert_eq!(cone.evaluate(&p(1.0, 3.0, 0.0)), 5.0);
        let quadric = Surface::quadric([1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0]);
        assert_eq!(quadric.evaluate(&p(0.0, 0.0, 0.0)), -1.0);
    }

    #[test]
    fn test_evaluate_torus() {
        let torus = Surface::torus(Axis::Z, Point3d::ORIGIN, 5.0, 1.0, 1.0);
        assert_abs_diff_eq!(torus.evaluate(&p(5.0, 0.0, 0.0)), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(torus.evaluate(&p(6.0, 0.0, 0.0)), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(torus.evaluate(&p(0.0, 5.0, 1.0)), 0.0, epsilon = 1e-12);
        assert!(torus.evaluate(&Point3d::ORIGIN) > 0.0);
    }

    #[test]
    fn test_general_families_match_axis_families() {
        let zcyl = Surface::z_cylinder(1.0, -2.0, 3.0);
        let cyl = Surface::cylinder(p(1.0, -2.0, 0.0), 3.0, Vec3::new(0.0, 0.0, 2.0)).unwrap();
        let zcone = Surface::axis_cone(Axis::Z, p(1.0, 2.0, 3.0), 0.5);
        let cone = Surface::cone(p(1.0, 2.0, 3.0), 0.5, Vec3::Z).unwrap();
        for q in [p(0.0, 0.0, 0.0), p(4.0, -2.0, 7.0), p(-1.0, 3.5, 2.0)] {
            assert_abs_diff_eq!(cyl.evaluate(&q), zcyl.evaluate(&q), epsilon = 1e-9);
            // the general cone equation is the axis form scaled by cos²θ
            assert_abs_diff_eq!(cone.evaluate(&q) * 1.5, zcone.evaluate(&q), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sphere_bounding_box() {
        let s = Surface::sphere(Point3d::ORIGIN, 5.0);
        let bb = s.bounding_box(Side::Negative);
        assert_eq!(bb.min, p(-5.0, -5.0, -5.0));
        assert_eq!(bb.max, p(5.0, 5.0, 5.0));
        assert!(s.bounding_box(Side::Positive).is_infinite());
    }

    #[test]
    fn test_axis_cylinder_bounding_box() {
        let bb = Surface::x_cylinder(1.0, 2.0, 3.0).bounding_box(Side::Negative);
        assert_eq!(bb.min, p(f64::NEG_INFINITY, -2.0, -1.0));
        assert_eq!(bb.max, p(f64::INFINITY, 4.0, 5.0));
    }

    #[test]
    fn test_torus_bounding_box() {
        let bb = Surface::torus(Axis::Y, p(1.0, 2.0, 3.0), 5.0, 1.0, 2.0).bounding_box(Side::Negative);
        assert_eq!(bb.min, p(-6.0, 1.0, -4.0));
        assert_eq!(bb.max, p(8.0, 3.0, 10.0));
        let outside = Surface::torus(Axis::Y, Point3d::ORIGIN, 5.0, 1.0, 2.0).bounding_box(Side::Positive);
        assert!(outside.is_infinite());
    }

    #[test]
    fn test_unbounded_families() {
        let cyl = Surface::cylinder(Point3d::ORIGIN, 1.0, Vec3::Z).unwrap();
        assert!(cyl.bounding_box(Side::Negative).is_infinite());
        let cone = Surface::axis_cone(Axis::Z, Point3d::ORIGIN, 1.0);
        assert!(cone.bounding_box(Side::Negative).is_infinite());
        let q = Surface::quadric([1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0]);
        assert!(q.bounding_box(Side::Negative).is_infinite());
    }

    #[test]
    fn test_plane_bounding_boxes() {
        let x = Surface::x_plane(3.0);
        let below = x.bounding_box(Side::Negative);
        assert_eq!(below.max, p(3.0, f64::INFINITY, f64::INFINITY));
        assert_eq!(below.min, p(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY));
        let above = x.bounding_box(Side::Positive);
        assert_eq!(above.min, p(3.0, f64::NEG_INFINITY, f64::NEG_INFINITY));

        // −2z = −4 faces down, so its negative side is z > 2
        let flipped = Surface::plane(0.0, 0.0, -2.0, -4.0);
        assert_eq!(flipped.bounding_box(Side::Negative).min.z, 2.0);
        assert_eq!(flipped.bounding_box(Side::Positive).max.z, 2.0);

        let oblique = Surface::plane(1.0, 1.0, 0.0, 1.0);
        assert!(oblique.bounding_box(Side::Negative).is_infinite());
        assert!(oblique.bounding_box(Side::Positive).is_infinite());
    }

    #[test]
    fn test_plane_from_points() {
        let s = Surface::plane_from_points(p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(s.coefficients(), &[1.0, 1.0, 1.0, 1.0]);
        assert!(matches!(
            Surface::plane_from_points(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(2.0, 2.0, 2.0)),
            Err(SurfaceError::DegenerateConstruction(_))
        ));
    }

    #[test]
    fn test_cylinder_from_points() {
        let s = Surface::cylinder_from_points(p(0.0, 0.0, 1.0), p(0.0, 0.0, 4.0), 2.0).unwrap();
        assert_eq!(s.axis_direction(), Some(Vec3::new(0.0, 0.0, 3.0)));
        assert_abs_diff_eq!(s.evaluate(&p(2.0, 0.0, -10.0)), 0.0, epsilon = 1e-12);
        assert!(Surface::cylinder_from_points(p(1.0, 1.0, 1.0), p(1.0, 1.0, 1.0), 2.0).is_err());
    }

    #[test]
    fn test_base_coefficients() {
        assert_eq!(Surface::y_plane(2.0).base_coefficients(), vec![0.0, 1.0, 0.0, 2.0]);
        assert_eq!(
            Surface::x_cylinder(1.0, 2.0, 3.0).base_coefficients(),
            vec![0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, -2.0, -4.0, -4.0]
        );
        assert_eq!(
            Surface::sphere(p(1.0, 2.0, 3.0), 1.0).base_coefficients(),
            vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0, -2.0, -4.0, -6.0, 13.0]
        );
        assert_eq!(
            Surface::axis_cone(Axis::X, p(1.0, 2.0, 3.0), 2.0).base_coefficients(),
            vec![-2.0, 1.0, 1.0, 0.0, 0.0, 0.0, 4.0, -4.0, -6.0, 11.0]
        );
        let torus = Surface::torus(Axis::X, Point3d::ORIGIN, 3.0, 1.0, 1.0);
        assert_eq!(torus.base_coefficients(), vec![0.0, 0.0, 0.0, 3.0, 1.0, 1.0]);
        assert!(torus.quadric_coefficients().is_none());
    }

    #[test]
    fn test_quadric_coefficients_match_evaluate() {
        let surfaces = [
            Surface::plane(1.0, -2.0, 0.5, 3.0),
            Surface::x_plane(2.0),
            Surface::y_cylinder(1.0, -1.0, 2.0),
            Surface::sphere(p(1.0, 2.0, 3.0), 4.0),
            Surface::axis_cone(Axis::Z, p(0.5, 0.0, -1.0), 0.3),
            Surface::cylinder(p(1.0, 2.0, 3.0), 1.5, Vec3::new(1.0, 1.0, 0.0)).unwrap(),
        ];
        let samples = [p(0.0, 0.0, 0.0), p(1.5, -2.0, 3.0), p(-4.0, 0.25, 1.0)];
        for s in &surfaces {
            let q = s.quadric_form().unwrap();
            for point in &samples {
                assert_abs_diff_eq!(q.evaluate(point), s.evaluate(point), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_quadric_substitute() {
        let cyl = Surface::cylinder(p(1.0, 0.0, 0.0), 2.0, Vec3::new(0.0, 1.0, 1.0))
            .unwrap()
            .with_name("shell")
            .with_boundary(BoundaryType::Reflective)
            .with_albedo(0.9)
            .unwrap();
        let sub = cyl.quadric_substitute().unwrap();
        assert_eq!(sub.kind(), SurfaceKind::Quadric);
        assert_eq!(sub.name, "shell");
        assert_eq!(sub.boundary, BoundaryType::Reflective);
        assert_eq!(sub.albedo(), 0.9);
        assert!(Surface::z_cylinder(0.0, 0.0, 1.0).quadric_substitute().is_none());
    }

    #[test]
    fn test_translate_shifts_origin_only() {
        let s = Surface::x_cylinder(1.0, 2.0, 3.0).translated(&Vec3::new(5.0, 1.0, 1.0));
        assert_eq!(s.kind(), SurfaceKind::XCylinder);
        assert_eq!(s.coefficients(), &[2.0, 3.0, 3.0]);
        assert_eq!(s.evaluate(&p(0.0, 2.0, 3.0)), -9.0);
    }

    #[test]
    fn test_translate_planes() {
        let s = Surface::plane(1.0, 2.0, 0.0, 1.0).translated(&Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(s.coefficients(), &[1.0, 2.0, 0.0, 4.0]);
        let s = Surface::z_plane(1.0).translated(&Vec3::new(9.0, 9.0, -3.0));
        assert_eq!(s.coefficients(), &[-2.0]);
    }

    #[test]
    fn test_translate_quadric() {
        let q = Surface::quadric([1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0]);
        let moved = q.translated(&Vec3::new(2.0, 0.0, 0.0));
        assert_abs_diff_eq!(moved.evaluate(&p(2.0, 0.0, 0.0)), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(moved.evaluate(&p(3.0, 0.0, 0.0)), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_widen_keeps_locus_and_attributes() {
        let s = Surface::y_plane(2.0).with_name("wall").with_boundary(BoundaryType::Vacuum);
        let w = s.widened();
        assert_eq!(w.kind(), SurfaceKind::Plane);
        assert_eq!(w.coefficients(), &[0.0, 1.0, 0.0, 2.0]);
        assert_eq!(w.name, "wall");
        assert_eq!(w.boundary, BoundaryType::Vacuum);

        let c = Surface::z_cylinder(1.0, 2.0, 3.0).widened();
        assert_eq!(c.kind(), SurfaceKind::Cylinder);
        assert_eq!(c.coefficients(), &[1.0, 2.0, 0.0, 3.0, 0.0, 0.0, 1.0]);

        let sphere = Surface::sphere(Point3d::ORIGIN, 1.0);
        assert_eq!(sphere.widened(), sphere);
    }

    #[test]
    fn test_rotate_axis_plane_widens() {
        let tol = Tolerance::default();
        let r = rotation_matrix([0.0, 0.0, 90.0], Default::default());
        let s = Surface::x_plane(2.0).rotated(&r, &tol).unwrap();
        assert_eq!(s.kind(), SurfaceKind::Plane);
        // x = 2 turned a quarter about z is y = 2
        assert_abs_diff_eq!(s.evaluate(&p(0.0, 2.0, 0.0)), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.evaluate(&p(0.0, 3.0, 0.0)), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_cylinder_about_pivot() {
        let tol = Tolerance::default();
        let s = Surface::z_cylinder(1.0, 0.0, 0.5);
        let turned = s
            .rotated_about(
                &Rotation::about(Axis::X, 90.0).matrix(&tol).unwrap(),
                &p(1.0, 0.0, 0.0),
                &tol,
            )
            .unwrap();
        assert_eq!(turned.kind(), SurfaceKind::Cylinder);
        let axis = turned.axis_direction().unwrap();
        assert_abs_diff_eq!(axis.y.abs(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(turned.evaluate(&p(1.0, 7.0, 0.5)), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_quadric_matches_rotated_points() {
        let tol = Tolerance::default();
        let q = Surface::quadric([1.0, 2.0, 3.0, 0.1, 0.2, 0.3, -1.0, 0.5, 2.0, -4.0]);
        let r = rotation_matrix([10.0, 20.0, 30.0], Default::default());
        let turned = q.rotated(&r, &tol).unwrap();
        let point = p(0.4, -0.7, 1.1);
        let image = Point3d::from_vector3(&(r * point.to_vector3()));
        assert_abs_diff_eq!(turned.evaluate(&image), q.evaluate(&point), epsilon = 1e-10);
    }

    #[test]
    fn test_rotate_torus_switches_axis() {
        let tol = Tolerance::default();
        let torus = Surface::torus(Axis::Z, p(1.0, 0.0, 0.0), 3.0, 1.0, 0.5);
        let r = rotation_matrix([90.0, 0.0, 0.0], Default::default());
        let turned = torus.rotated(&r, &tol).unwrap();
        assert_eq!(turned.kind(), SurfaceKind::YTorus);
        assert_abs_diff_eq!(turned.coefficients()[0], 1.0, epsilon = 1e-12);
        assert_eq!(&turned.coefficients()[3..], &[3.0, 1.0, 0.5]);
    }

    #[test]
    fn test_rotate_torus_rejects_oblique() {
        let tol = Tolerance::default();
        let torus = Surface::torus(Axis::Z, Point3d::ORIGIN, 3.0, 1.0, 0.5);
        let r = rotation_matrix([45.0, 0.0, 0.0], Default::default());
        assert!(matches!(
            torus.rotated(&r, &tol),
            Err(SurfaceError::UnsupportedTransform(_))
        ));
    }

    #[test]
    fn test_display_summary() {
        let s = Surface::sphere(Point3d::ORIGIN, 2.0)
            .with_name("ball")
            .with_boundary(BoundaryType::White)
            .with_albedo(0.5)
            .unwrap();
        let text = s.to_string();
        assert!(text.starts_with("Surface\n"));
        assert!(text.contains("ball"));
        assert!(text.contains("sphere"));
        assert!(text.contains("Boundary Albedo"));
        assert!(text.lines().any(|line| line.starts_with('r') && line.ends_with("=\t2")));
        let plain = Surface::x_plane(0.0).to_string();
        assert!(!plain.contains("Albedo"));
    }

    #[test]
    fn test_serde_validates_input() {
        let s = Surface::z_cylinder(1.0, 2.0, 3.0).with_name("pin");
        let json = serde_json::to_string(&s).unwrap();
        let back: Surface = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        let short = r#"{"kind":"sphere","coefficients":[1.0]}"#;
        assert!(serde_json::from_str::<Surface>(short).is_err());
    }
}
