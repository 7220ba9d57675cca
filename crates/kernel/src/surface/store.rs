use nalgebra::Matrix3;
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use std::ops::Index;
use tracing::{debug, instrument};

use super::Surface;
use crate::error::SurfaceError;
use crate::geometry::point::Point3d;
use crate::geometry::rotation::Rotation;
use crate::geometry::vector::Vec3;
use crate::Tolerance;

// ─── Keys ───────────────────────────────────────────────────────────────────

new_key_type! {
    /// Opaque surface identity. Half-spaces refer to surfaces through it.
    pub struct SurfaceId;
}

/// Whether a transform rewrites the surface it is applied to or leaves it
/// alone and inserts a transformed copy under a fresh identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    #[default]
    Cloned,
    InPlace,
}

// ─── Store ──────────────────────────────────────────────────────────────────

/// Arena owning every surface of a model, together with the numeric ids
/// written to documents and the periodic pairing between planes.
#[derive(Debug, Clone, Default)]
pub struct SurfaceStore {
    pub surfaces: SlotMap<SurfaceId, Surface>,
    user_ids: SecondaryMap<SurfaceId, u32>,
    periodic: SecondaryMap<SurfaceId, SurfaceId>,
    substitute_ids: SecondaryMap<SurfaceId, u32>,
    last_user_id: u32,
    pub tolerance: Tolerance,
}

impl SurfaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Next unused numeric id. Ids are never handed out twice.
    pub fn allocate_user_id(&mut self) -> u32 {
        self.last_user_id += 1;
        self.last_user_id
    }

    #[instrument(skip(self, surface), fields(kind = surface.type_tag()))]
    pub fn insert(&mut self, surface: Surface) -> SurfaceId {
        let user_id = self.allocate_user_id();
        let id = self.surfaces.insert(surface);
        self.user_ids.insert(id, user_id);
        debug!(?id, user_id, "surface inserted");
        id
    }

    /// Insert under a numeric id chosen by the caller, e.g. when reading a
    /// document. Later allocations continue above it.
    #[instrument(skip(self, surface), fields(kind = surface.type_tag()))]
    pub fn insert_with_user_id(&mut self, surface: Surface, user_id: u32) -> SurfaceId {
        self.last_user_id = self.last_user_id.max(user_id);
        let id = self.surfaces.insert(surface);
        self.user_ids.insert(id, user_id);
        debug!(?id, user_id, "surface inserted with explicit id");
        id
    }

    pub fn remove(&mut self, id: SurfaceId) -> Option<Surface> {
        self.clear_periodic_pair(id);
        self.user_ids.remove(id);
        self.substitute_ids.remove(id);
        self.surfaces.remove(id)
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.get_mut(id)
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SurfaceId, &Surface)> {
        self.surfaces.iter()
    }

    pub fn user_id(&self, id: SurfaceId) -> Option<u32> {
        self.user_ids.get(id).copied()
    }

    pub fn find_by_user_id(&self, user_id: u32) -> Option<SurfaceId> {
        self.user_ids
            .iter()
            .find(|(_, uid)| **uid == user_id)
            .map(|(id, _)| id)
    }

    // ─── Transforms ─────────────────────────────────────────────────────

    /// Copy of `id` under a fresh identity. Periodic pairing is not copied.
    #[instrument(skip(self))]
    pub fn clone_surface(&mut self, id: SurfaceId) -> SurfaceId {
        let copy = self.surfaces[id].clone();
        let new_id = self.insert(copy);
        debug!(?new_id, "surface cloned");
        new_id
    }

    /// Translate surface `id` by `v`. A zero vector is a no-op returning `id`
    /// itself, whatever the placement. Non-finite components are rejected
    /// before anything changes.
    #[instrument(skip(self))]
    pub fn translate(
        &mut self,
        id: SurfaceId,
        v: &Vec3,
        placement: Placement,
    ) -> Result<SurfaceId, SurfaceError> {
        check_finite_vector("translation", v)?;
        if self.tolerance.is_zero_vector(v) {
            debug!("zero translation, surface unchanged");
            return Ok(id);
        }
        let moved = self.surfaces[id].translated(v);
        Ok(self.place(id, moved, placement))
    }

    /// Rotate surface `id` about `pivot`. Axis-restricted families come back
    /// widened to their general family; with [`Placement::InPlace`] the
    /// widened surface keeps the original identity.
    #[instrument(skip(self))]
    pub fn rotate(
        &mut self,
        id: SurfaceId,
        rotation: &Rotation,
        pivot: &Point3d,
        placement: Placement,
    ) -> Result<SurfaceId, SurfaceError> {
        let r = rotation.matrix(&self.tolerance)?;
        self.rotate_matrix(id, &r, pivot, placement)
    }

    /// [`SurfaceStore::rotate`] with the rotation already resolved.
    pub fn rotate_matrix(
        &mut self,
        id: SurfaceId,
        r: &Matrix3<f64>,
        pivot: &Point3d,
        placement: Placement,
    ) -> Result<SurfaceId, SurfaceError> {
        let turned = self.rotated_preview(id, r, pivot)?;
        Ok(self.place(id, turned, placement))
    }

    /// The surface `id` would become under `r` about `pivot`, leaving the
    /// store untouched.
    pub fn rotated_preview(
        &self,
        id: SurfaceId,
        r: &Matrix3<f64>,
        pivot: &Point3d,
    ) -> Result<Surface, SurfaceError> {
        check_finite_vector("pivot", &pivot.to_vec3())?;
        self.surfaces[id].rotated_about(r, pivot, &self.tolerance)
    }

    fn place(&mut self, id: SurfaceId, surface: Surface, placement: Placement) -> SurfaceId {
        match placement {
            Placement::InPlace => {
                debug!(?id, kind = surface.type_tag(), "surface updated in place");
                self.surfaces[id] = surface;
                id
            }
            Placement::Cloned => self.insert(surface),
        }
    }

    // ─── Periodic Pairing ───────────────────────────────────────────────

    /// Pair two planar surfaces across a periodic boundary. Any earlier
    /// partner of either surface is released.
    #[instrument(skip(self))]
    pub fn set_periodic_pair(&mut self, a: SurfaceId, b: SurfaceId) -> Result<(), SurfaceError> {
        for id in [a, b] {
            let surface = &self.surfaces[id];
            if !surface.kind().is_planar() {
                return Err(SurfaceError::NonPlanarPeriodicPair(surface.type_tag()));
            }
        }
        self.clear_periodic_pair(a);
        self.clear_periodic_pair(b);
        self.periodic.insert(a, b);
        self.periodic.insert(b, a);
        debug!(?a, ?b, "periodic pair linked");
        Ok(())
    }

    pub fn periodic_partner(&self, id: SurfaceId) -> Option<SurfaceId> {
        self.periodic.get(id).copied()
    }

    pub fn clear_periodic_pair(&mut self, id: SurfaceId) {
        if let Some(partner) = self.periodic.remove(id) {
            if self.periodic.get(partner) == Some(&id) {
                self.periodic.remove(partner);
            }
        }
    }

    // ─── Output ─────────────────────────────────────────────────────────

    /// Output-only quadric stand-in for a general cylinder or cone. Its
    /// numeric id is allocated on first export and reused afterwards.
    pub fn export_substitute(&mut self, id: SurfaceId) -> Option<(u32, Surface)> {
        let substitute = self.surfaces[id].quadric_substitute()?;
        if let Some(user_id) = self.substitute_ids.get(id) {
            return Some((*user_id, substitute));
        }
        let user_id = self.allocate_user_id();
        self.substitute_ids.insert(id, user_id);
        debug!(?id, user_id, "quadric substitute allocated");
        Some((user_id, substitute))
    }

    /// Multi-line summary of a surface, led by its numeric id.
    pub fn describe(&self, id: SurfaceId) -> Option<String> {
        let surface = self.surfaces.get(id)?;
        let body = surface.to_string();
        let rest = body.strip_prefix("Surface\n").unwrap_or(&body);
        let user_id = self.user_id(id).unwrap_or_default();
        Some(format!("Surface\n{:<20}=\t{}\n{}", "\tID", user_id, rest))
    }
}

fn check_finite_vector(name: &str, v: &Vec3) -> Result<(), SurfaceError> {
    match v.to_array().into_iter().find(|c| !c.is_finite()) {
        Some(value) => Err(SurfaceError::InvalidCoefficient {
            name: name.to_string(),
            value,
        }),
        None => Ok(()),
    }
}

impl Index<SurfaceId> for SurfaceStore {
    type Output = Surface;

    fn index(&self, id: SurfaceId) -> &Surface {
        &self.surfaces[id]
    }
}
