//! Half-spaces and boolean regions built from them.

pub mod memo;

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use tracing::{debug, instrument};

pub use memo::{TransformKey, TransformMemo};

use crate::error::SurfaceError;
use crate::geometry::bounding_box::BoundingBox;
use crate::geometry::point::Point3d;
use crate::geometry::rotation::Rotation;
use crate::geometry::vector::Vec3;
use crate::surface::{Placement, SurfaceId, SurfaceStore};

// ─── Half-Spaces ────────────────────────────────────────────────────────────

/// Sign token of a half-space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "+")]
    Positive,
    #[serde(rename = "-")]
    Negative,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Positive => Side::Negative,
            Side::Negative => Side::Positive,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Side::Positive => '+',
            Side::Negative => '-',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One side of a surface. The positive side is closed (`f(p) ≥ 0`), the
/// negative side open (`f(p) < 0`), so a point on the surface belongs to the
/// positive half-space only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Halfspace {
    pub surface: SurfaceId,
    pub side: Side,
}

impl SurfaceId {
    pub fn positive(self) -> Halfspace {
        Halfspace::new(self, Side::Positive)
    }

    pub fn negative(self) -> Halfspace {
        Halfspace::new(self, Side::Negative)
    }
}

impl Halfspace {
    pub fn new(surface: SurfaceId, side: Side) -> Self {
        Self { surface, side }
    }

    pub fn contains(&self, store: &SurfaceStore, p: &Point3d) -> bool {
        let value = store[self.surface].evaluate(p);
        match self.side {
            Side::Positive => value >= 0.0,
            Side::Negative => value < 0.0,
        }
    }

    pub fn bounding_box(&self, store: &SurfaceStore) -> BoundingBox {
        store[self.surface].bounding_box(self.side)
    }

    /// Same side of a fresh copy of the surface, shared through `memo`.
    pub fn clone_surfaces(&self, store: &mut SurfaceStore, memo: &mut TransformMemo) -> Halfspace {
        let surface = memo.get_or_insert_with(self.surface, TransformKey::Clone, || {
            store.clone_surface(self.surface)
        });
        Halfspace::new(surface, self.side)
    }

    pub fn translate(
        &self,
        store: &mut SurfaceStore,
        v: &Vec3,
        placement: Placement,
        memo: &mut TransformMemo,
    ) -> Result<Halfspace, SurfaceError> {
        let key = TransformKey::translate(v, placement);
        let surface = memo.try_get_or_insert_with(self.surface, key, || {
            store.translate(self.surface, v, placement)
        })?;
        Ok(Halfspace::new(surface, self.side))
    }

    pub fn rotate(
        &self,
        store: &mut SurfaceStore,
        r: &Matrix3<f64>,
        pivot: &Point3d,
        placement: Placement,
        memo: &mut TransformMemo,
    ) -> Result<Halfspace, SurfaceError> {
        let key = TransformKey::rotate(r, pivot, placement);
        let surface = memo.try_get_or_insert_with(self.surface, key, || {
            store.rotate_matrix(self.surface, r, pivot, placement)
        })?;
        Ok(Halfspace::new(surface, self.side))
    }
}

impl Not for Halfspace {
    type Output = Halfspace;

    fn not(self) -> Halfspace {
        Halfspace::new(self.surface, self.side.opposite())
    }
}

// ─── Regions ────────────────────────────────────────────────────────────────

/// Boolean combination of half-spaces. Intersections and unions are n-ary
/// and kept flat by the combinators.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    Halfspace(Halfspace),
    Intersection(Vec<Region>),
    Union(Vec<Region>),
    Complement(Box<Region>),
}

impl From<Halfspace> for Region {
    fn from(h: Halfspace) -> Self {
        Region::Halfspace(h)
    }
}

impl Region {
    /// Intersection of `members`, splicing in the members of any nested
    /// intersection.
    pub fn intersection(members: impl IntoIterator<Item = Region>) -> Region {
        let mut flat = Vec::new();
        for member in members {
            match member {
                Region::Intersection(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Region::Intersection(flat)
    }

    /// Union of `members`, splicing in the members of any nested union.
    pub fn union(members: impl IntoIterator<Item = Region>) -> Region {
        let mut flat = Vec::new();
        for member in members {
            match member {
                Region::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Region::Union(flat)
    }

    /// A half-space complements to its other side; a complement unwraps.
    pub fn complement(self) -> Region {
        match self {
            Region::Halfspace(h) => Region::Halfspace(!h),
            Region::Complement(inner) => *inner,
            other => Region::Complement(Box::new(other)),
        }
    }

    pub fn contains(&self, store: &SurfaceStore, p: &Point3d) -> bool {
        match self {
            Region::Halfspace(h) => h.contains(store, p),
            Region::Intersection(members) => members.iter().all(|m| m.contains(store, p)),
            Region::Union(members) => members.iter().any(|m| m.contains(store, p)),
            Region::Complement(inner) => !inner.contains(store, p),
        }
    }

    /// Intersection of member boxes for intersections, their union for
    /// unions. Complements are unbounded.
    pub fn bounding_box(&self, store: &SurfaceStore) -> BoundingBox {
        match self {
            Region::Halfspace(h) => h.bounding_box(store),
            Region::Intersection(members) => members
                .iter()
                .fold(BoundingBox::infinite(), |acc, m| acc.intersection(&m.bounding_box(store))),
            Region::Union(members) => {
                let mut boxes = members.iter().map(|m| m.bounding_box(store));
                match boxes.next() {
                    Some(first) => boxes.fold(first, |acc, b| acc.union(&b)),
                    None => BoundingBox::infinite(),
                }
            }
            Region::Complement(_) => BoundingBox::infinite(),
        }
    }

    /// Every referenced surface, once each, in first-seen order.
    pub fn surfaces(&self) -> Vec<SurfaceId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.visit(&mut |h| {
            if seen.insert(h.surface) {
                out.push(h.surface);
            }
        });
        out
    }

    fn visit(&self, f: &mut impl FnMut(&Halfspace)) {
        match self {
            Region::Halfspace(h) => f(h),
            Region::Intersection(members) | Region::Union(members) => {
                for m in members {
                    m.visit(f);
                }
            }
            Region::Complement(inner) => inner.visit(f),
        }
    }

    /// Point half-spaces at replacement surfaces, e.g. after merging
    /// redundant ones. Surfaces missing from `map` are kept.
    pub fn replace_surfaces(&mut self, map: &HashMap<SurfaceId, SurfaceId>) {
        match self {
            Region::Halfspace(h) => {
                if let Some(&replacement) = map.get(&h.surface) {
                    h.surface = replacement;
                }
            }
            Region::Intersection(members) | Region::Union(members) => {
                for m in members {
                    m.replace_surfaces(map);
                }
            }
            Region::Complement(inner) => inner.replace_surfaces(map),
        }
    }

    fn map(&self, f: &mut impl FnMut(&Halfspace) -> Halfspace) -> Region {
        match self {
            Region::Halfspace(h) => Region::Halfspace(f(h)),
            Region::Intersection(members) => Region::Intersection(members.iter().map(|m| m.map(f)).collect()),
            Region::Union(members) => Region::Union(members.iter().map(|m| m.map(f)).collect()),
            Region::Complement(inner) => Region::Complement(Box::new(inner.map(f))),
        }
    }

    fn try_map<E>(&self, f: &mut impl FnMut(&Halfspace) -> Result<Halfspace, E>) -> Result<Region, E> {
        Ok(match self {
            Region::Halfspace(h) => Region::Halfspace(f(h)?),
            Region::Intersection(members) => Region::Intersection(
                members.iter().map(|m| m.try_map(f)).collect::<Result<_, _>>()?,
            ),
            Region::Union(members) => {
                Region::Union(members.iter().map(|m| m.try_map(f)).collect::<Result<_, _>>()?)
            }
            Region::Complement(inner) => Region::Complement(Box::new(inner.try_map(f)?)),
        })
    }

    // ─── Topology-Preserving Transforms ─────────────────────────────────

    /// Same tree over fresh copies of every surface. Half-spaces that shared
    /// a surface share its copy.
    #[instrument(skip(self, store))]
    pub fn clone_surfaces(&self, store: &mut SurfaceStore) -> Region {
        let mut memo = TransformMemo::new();
        let out = self.clone_surfaces_with(store, &mut memo);
        debug!(surfaces = memo.len(), shared = memo.hits(), "region cloned");
        out
    }

    /// [`Region::clone_surfaces`] within a caller-held pass, so several
    /// regions cloned together keep sharing surfaces.
    pub fn clone_surfaces_with(&self, store: &mut SurfaceStore, memo: &mut TransformMemo) -> Region {
        self.map(&mut |h| h.clone_surfaces(store, memo))
    }

    /// Translate every referenced surface by `v`. A non-finite `v` is
    /// rejected before any surface changes.
    #[instrument(skip(self, store))]
    pub fn translate(
        &self,
        store: &mut SurfaceStore,
        v: &Vec3,
        placement: Placement,
    ) -> Result<Region, SurfaceError> {
        let mut memo = TransformMemo::new();
        let out = self.translate_with(store, v, placement, &mut memo)?;
        debug!(surfaces = memo.len(), shared = memo.hits(), "region translated");
        Ok(out)
    }

    pub fn translate_with(
        &self,
        store: &mut SurfaceStore,
        v: &Vec3,
        placement: Placement,
        memo: &mut TransformMemo,
    ) -> Result<Region, SurfaceError> {
        self.try_map(&mut |h| h.translate(store, v, placement, memo))
    }

    /// Rotate every referenced surface about `pivot`. Every surface is
    /// checked first, so a rotation one of them cannot follow leaves the
    /// store as it was.
    #[instrument(skip(self, store))]
    pub fn rotate(
        &self,
        store: &mut SurfaceStore,
        rotation: &Rotation,
        pivot: &Point3d,
        placement: Placement,
    ) -> Result<Region, SurfaceError> {
        let r = rotation.matrix(&store.tolerance)?;
        let mut memo = TransformMemo::new();
        let out = self.rotate_with(store, &r, pivot, placement, &mut memo)?;
        debug!(surfaces = memo.len(), shared = memo.hits(), "region rotated");
        Ok(out)
    }

    pub fn rotate_with(
        &self,
        store: &mut SurfaceStore,
        r: &Matrix3<f64>,
        pivot: &Point3d,
        placement: Placement,
        memo: &mut TransformMemo,
    ) -> Result<Region, SurfaceError> {
        let key = TransformKey::rotate(r, pivot, placement);
        for id in self.surfaces() {
            if memo.get(id, key).is_none() {
                store.rotated_preview(id, r, pivot)?;
            }
        }
        self.try_map(&mut |h| h.rotate(store, r, pivot, placement, memo))
    }
}

// ─── Operators ──────────────────────────────────────────────────────────────

impl<R: Into<Region>> BitAnd<R> for Region {
    type Output = Region;

    fn bitand(self, rhs: R) -> Region {
        Region::intersection([self, rhs.into()])
    }
}

impl<R: Into<Region>> BitAnd<R> for Halfspace {
    type Output = Region;

    fn bitand(self, rhs: R) -> Region {
        Region::from(self) & rhs
    }
}

impl<R: Into<Region>> BitOr<R> for Region {
    type Output = Region;

    fn bitor(self, rhs: R) -> Region {
        Region::union([self, rhs.into()])
    }
}

impl<R: Into<Region>> BitOr<R> for Halfspace {
    type Output = Region;

    fn bitor(self, rhs: R) -> Region {
        Region::from(self) | rhs
    }
}

impl Not for Region {
    type Output = Region;

    fn not(self) -> Region {
        self.complement()
    }
}
