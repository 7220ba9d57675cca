//! The fixed registry of surface families and their coefficient descriptors.

use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::geometry::vector::Axis;

/// Every surface family known to the kernel.
///
/// Axis-restricted variants are specialisations of a general family (see
/// [`SurfaceKind::general`]); a surface is never promoted back down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceKind {
    Plane,
    XPlane,
    YPlane,
    ZPlane,
    Cylinder,
    XCylinder,
    YCylinder,
    ZCylinder,
    Sphere,
    Cone,
    XCone,
    YCone,
    ZCone,
    Quadric,
    XTorus,
    YTorus,
    ZTorus,
}

/// Families that share one general representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyGroup {
    Plane,
    Cylinder,
    Sphere,
    Cone,
    Quadric,
    Torus,
}

/// How a named coefficient slot resolves for a given family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot {
    /// Stored value at this index of the family's own coefficients.
    Free(usize),
    /// Fixed by the family; reads return the value, writes are rejected.
    Constant(f64),
    /// Another name for the stored value at this index.
    Alias(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientSlot {
    pub name: &'static str,
    pub slot: Slot,
}

const fn free(name: &'static str, index: usize) -> CoefficientSlot {
    CoefficientSlot {
        name,
        slot: Slot::Free(index),
    }
}

const fn fixed(name: &'static str, value: f64) -> CoefficientSlot {
    CoefficientSlot {
        name,
        slot: Slot::Constant(value),
    }
}

const fn alias(name: &'static str, index: usize) -> CoefficientSlot {
    CoefficientSlot {
        name,
        slot: Slot::Alias(index),
    }
}

// ─── Descriptor Tables ──────────────────────────────────────────────────────
//
// Own coefficients come first, in family order; constants and aliases follow.

const PLANE: &[CoefficientSlot] = &[free("a", 0), free("b", 1), free("c", 2), free("d", 3)];
const X_PLANE: &[CoefficientSlot] = &[
    free("x0", 0),
    fixed("a", 1.0),
    fixed("b", 0.0),
    fixed("c", 0.0),
    alias("d", 0),
];
const Y_PLANE: &[CoefficientSlot] = &[
    free("y0", 0),
    fixed("a", 0.0),
    fixed("b", 1.0),
    fixed("c", 0.0),
    alias("d", 0),
];
const Z_PLANE: &[CoefficientSlot] = &[
    free("z0", 0),
    fixed("a", 0.0),
    fixed("b", 0.0),
    fixed("c", 1.0),
    alias("d", 0),
];

const CYLINDER: &[CoefficientSlot] = &[
    free("x0", 0),
    free("y0", 1),
    free("z0", 2),
    free("r", 3),
    free("dx", 4),
    free("dy", 5),
    free("dz", 6),
];
const X_CYLINDER: &[CoefficientSlot] = &[
    free("y0", 0),
    free("z0", 1),
    free("r", 2),
    fixed("x0", 0.0),
    fixed("dx", 1.0),
    fixed("dy", 0.0),
    fixed("dz", 0.0),
];
const Y_CYLINDER: &[CoefficientSlot] = &[
    free("x0", 0),
    free("z0", 1),
    free("r", 2),
    fixed("y0", 0.0),
    fixed("dx", 0.0),
    fixed("dy", 1.0),
    fixed("dz", 0.0),
];
const Z_CYLINDER: &[CoefficientSlot] = &[
    free("x0", 0),
    free("y0", 1),
    free("r", 2),
    fixed("z0", 0.0),
    fixed("dx", 0.0),
    fixed("dy", 0.0),
    fixed("dz", 1.0),
];

const SPHERE: &[CoefficientSlot] = &[free("x0", 0), free("y0", 1), free("z0", 2), free("r", 3)];

const CONE: &[CoefficientSlot] = &[
    free("x0", 0),
    free("y0", 1),
    free("z0", 2),
    free("r2", 3),
    free("dx", 4),
    free("dy", 5),
    free("dz", 6),
];
const X_CONE: &[CoefficientSlot] = &[
    free("x0", 0),
    free("y0", 1),
    free("z0", 2),
    free("r2", 3),
    fixed("dx", 1.0),
    fixed("dy", 0.0),
    fixed("dz", 0.0),
];
const Y_CONE: &[CoefficientSlot] = &[
    free("x0", 0),
    free("y0", 1),
    free("z0", 2),
    free("r2", 3),
    fixed("dx", 0.0),
    fixed("dy", 1.0),
    fixed("dz", 0.0),
];
const Z_CONE: &[CoefficientSlot] = &[
    free("x0", 0),
    free("y0", 1),
    free("z0", 2),
    free("r2", 3),
    fixed("dx", 0.0),
    fixed("dy", 0.0),
    fixed("dz", 1.0),
];

const QUADRIC: &[CoefficientSlot] = &[
    free("a", 0),
    free("b", 1),
    free("c", 2),
    free("d", 3),
    free("e", 4),
    free("f", 5),
    free("g", 6),
    free("h", 7),
    free("j", 8),
    free("k", 9),
];

const TORUS: &[CoefficientSlot] = &[
    free("x0", 0),
    free("y0", 1),
    free("z0", 2),
    free("a", 3),
    free("b", 4),
    free("c", 5),
];

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 17] = [
        SurfaceKind::Plane,
        SurfaceKind::XPlane,
        SurfaceKind::YPlane,
        SurfaceKind::ZPlane,
        SurfaceKind::Cylinder,
        SurfaceKind::XCylinder,
        SurfaceKind::YCylinder,
        SurfaceKind::ZCylinder,
        SurfaceKind::Sphere,
        SurfaceKind::Cone,
        SurfaceKind::XCone,
        SurfaceKind::YCone,
        SurfaceKind::ZCone,
        SurfaceKind::Quadric,
        SurfaceKind::XTorus,
        SurfaceKind::YTorus,
        SurfaceKind::ZTorus,
    ];

    /// Tag used in documents and archives.
    pub fn type_tag(self) -> &'static str {
        match self {
            SurfaceKind::Plane => "plane",
            SurfaceKind::XPlane => "x-plane",
            SurfaceKind::YPlane => "y-plane",
            SurfaceKind::ZPlane => "z-plane",
            SurfaceKind::Cylinder => "cylinder",
            SurfaceKind::XCylinder => "x-cylinder",
            SurfaceKind::YCylinder => "y-cylinder",
            SurfaceKind::ZCylinder => "z-cylinder",
            SurfaceKind::Sphere => "sphere",
            SurfaceKind::Cone => "cone",
            SurfaceKind::XCone => "x-cone",
            SurfaceKind::YCone => "y-cone",
            SurfaceKind::ZCone => "z-cone",
            SurfaceKind::Quadric => "quadric",
            SurfaceKind::XTorus => "x-torus",
            SurfaceKind::YTorus => "y-torus",
            SurfaceKind::ZTorus => "z-torus",
        }
    }

    pub fn from_type_tag(tag: &str) -> Result<Self, SurfaceError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_tag() == tag)
            .ok_or_else(|| SurfaceError::UnknownSurfaceType(tag.to_string()))
    }

    pub fn group(self) -> FamilyGroup {
        match self {
            SurfaceKind::Plane | SurfaceKind::XPlane | SurfaceKind::YPlane | SurfaceKind::ZPlane => {
                FamilyGroup::Plane
            }
            SurfaceKind::Cylinder
            | SurfaceKind::XCylinder
            | SurfaceKind::YCylinder
            | SurfaceKind::ZCylinder => FamilyGroup::Cylinder,
            SurfaceKind::Sphere => FamilyGroup::Sphere,
            SurfaceKind::Cone | SurfaceKind::XCone | SurfaceKind::YCone | SurfaceKind::ZCone => {
                FamilyGroup::Cone
            }
            SurfaceKind::Quadric => FamilyGroup::Quadric,
            SurfaceKind::XTorus | SurfaceKind::YTorus | SurfaceKind::ZTorus => FamilyGroup::Torus,
        }
    }

    /// Coordinate axis an axis-restricted family is tied to.
    pub fn axis(self) -> Option<Axis> {
        match self {
            SurfaceKind::XPlane | SurfaceKind::XCylinder | SurfaceKind::XCone | SurfaceKind::XTorus => {
                Some(Axis::X)
            }
            SurfaceKind::YPlane | SurfaceKind::YCylinder | SurfaceKind::YCone | SurfaceKind::YTorus => {
                Some(Axis::Y)
            }
            SurfaceKind::ZPlane | SurfaceKind::ZCylinder | SurfaceKind::ZCone | SurfaceKind::ZTorus => {
                Some(Axis::Z)
            }
            _ => None,
        }
    }

    /// The fully general member of this family's group. Tori have no
    /// generalisation and map to themselves.
    pub fn general(self) -> SurfaceKind {
        match self.group() {
            FamilyGroup::Plane => SurfaceKind::Plane,
            FamilyGroup::Cylinder => SurfaceKind::Cylinder,
            FamilyGroup::Sphere => SurfaceKind::Sphere,
            FamilyGroup::Cone => SurfaceKind::Cone,
            FamilyGroup::Quadric => SurfaceKind::Quadric,
            FamilyGroup::Torus => self,
        }
    }

    pub fn is_general(self) -> bool {
        self.general() == self
    }

    pub fn is_planar(self) -> bool {
        self.group() == FamilyGroup::Plane
    }

    pub fn axis_plane(axis: Axis) -> Self {
        match axis {
            Axis::X => SurfaceKind::XPlane,
            Axis::Y => SurfaceKind::YPlane,
            Axis::Z => SurfaceKind::ZPlane,
        }
    }

    pub fn axis_cylinder(axis: Axis) -> Self {
        match axis {
            Axis::X => SurfaceKind::XCylinder,
            Axis::Y => SurfaceKind::YCylinder,
            Axis::Z => SurfaceKind::ZCylinder,
        }
    }

    pub fn axis_cone(axis: Axis) -> Self {
        match axis {
            Axis::X => SurfaceKind::XCone,
            Axis::Y => SurfaceKind::YCone,
            Axis::Z => SurfaceKind::ZCone,
        }
    }

    pub fn torus(axis: Axis) -> Self {
        match axis {
            Axis::X => SurfaceKind::XTorus,
            Axis::Y => SurfaceKind::YTorus,
            Axis::Z => SurfaceKind::ZTorus,
        }
    }

    /// Every named slot the family exposes.
    pub fn slots(self) -> &'static [CoefficientSlot] {
        match self {
            SurfaceKind::Plane => PLANE,
            SurfaceKind::XPlane => X_PLANE,
            SurfaceKind::YPlane => Y_PLANE,
            SurfaceKind::ZPlane => Z_PLANE,
            SurfaceKind::Cylinder => CYLINDER,
            SurfaceKind::XCylinder => X_CYLINDER,
            SurfaceKind::YCylinder => Y_CYLINDER,
            SurfaceKind::ZCylinder => Z_CYLINDER,
            SurfaceKind::Sphere => SPHERE,
            SurfaceKind::Cone => CONE,
            SurfaceKind::XCone => X_CONE,
            SurfaceKind::YCone => Y_CONE,
            SurfaceKind::ZCone => Z_CONE,
            SurfaceKind::Quadric => QUADRIC,
            SurfaceKind::XTorus | SurfaceKind::YTorus | SurfaceKind::ZTorus => TORUS,
        }
    }

    /// Length of the family's own coefficient tuple.
    pub fn coefficient_count(self) -> usize {
        self.slots()
            .iter()
            .take_while(|s| matches!(s.slot, Slot::Free(_)))
            .count()
    }

    /// Own coefficient names, in storage order.
    pub fn coefficient_names(self) -> impl Iterator<Item = &'static str> {
        self.slots()[..self.coefficient_count()].iter().map(|s| s.name)
    }

    pub fn slot(self, name: &str) -> Option<Slot> {
        self.slots().iter().find(|s| s.name == name).map(|s| s.slot)
    }

    /// Values used for coefficients the caller leaves unspecified.
    pub fn defaults(self) -> &'static [f64] {
        match self {
            SurfaceKind::Plane => &[1.0, 0.0, 0.0, 0.0],
            SurfaceKind::XPlane | SurfaceKind::YPlane | SurfaceKind::ZPlane => &[0.0],
            SurfaceKind::Cylinder | SurfaceKind::Cone => &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            SurfaceKind::XCylinder | SurfaceKind::YCylinder | SurfaceKind::ZCylinder => &[0.0, 0.0, 1.0],
            SurfaceKind::Sphere
            | SurfaceKind::XCone
            | SurfaceKind::YCone
            | SurfaceKind::ZCone => &[0.0, 0.0, 0.0, 1.0],
            SurfaceKind::Quadric => &[0.0; 10],
            SurfaceKind::XTorus | SurfaceKind::YTorus | SurfaceKind::ZTorus => &[0.0; 6],
        }
    }
}
