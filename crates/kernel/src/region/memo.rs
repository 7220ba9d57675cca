use nalgebra::Matrix3;
use std::collections::HashMap;

use crate::geometry::point::Point3d;
use crate::geometry::vector::Vec3;
use crate::surface::{Placement, SurfaceId};

/// Transform parameters reduced to exact bit patterns so equal requests hash
/// equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKey {
    Clone,
    Translate {
        vector: [u64; 3],
        placement: Placement,
    },
    Rotate {
        matrix: [u64; 9],
        pivot: [u64; 3],
        placement: Placement,
    },
}

impl TransformKey {
    pub fn translate(v: &Vec3, placement: Placement) -> Self {
        TransformKey::Translate {
            vector: bits(v.to_array()),
            placement,
        }
    }

    pub fn rotate(r: &Matrix3<f64>, pivot: &Point3d, placement: Placement) -> Self {
        let mut entries = [0.0; 9];
        entries.copy_from_slice(r.as_slice());
        TransformKey::Rotate {
            matrix: bits(entries),
            pivot: bits(pivot.to_array()),
            placement,
        }
    }
}

/// `-0.0` folds onto `0.0`.
fn bits<const N: usize>(values: [f64; N]) -> [u64; N] {
    values.map(|v| (v + 0.0).to_bits())
}

/// Results of one clone or transform pass, keyed by the original surface and
/// the transform applied to it. Two half-spaces sharing a surface therefore
/// share its image too.
///
/// A memo belongs to a single pass; start a new one for every transform.
#[derive(Debug, Default)]
pub struct TransformMemo {
    entries: HashMap<(SurfaceId, TransformKey), SurfaceId>,
    hits: usize,
}

impl TransformMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, surface: SurfaceId, key: TransformKey) -> Option<SurfaceId> {
        self.entries.get(&(surface, key)).copied()
    }

    /// The recorded image of `surface` under `key`, or the result of `apply`
    /// which is then recorded.
    pub fn get_or_insert_with(
        &mut self,
        surface: SurfaceId,
        key: TransformKey,
        apply: impl FnOnce() -> SurfaceId,
    ) -> SurfaceId {
        if let Some(image) = self.get(surface, key) {
            self.hits += 1;
            return image;
        }
        let image = apply();
        self.entries.insert((surface, key), image);
        image
    }

    /// Fallible [`TransformMemo::get_or_insert_with`]; nothing is recorded on
    /// error.
    pub fn try_get_or_insert_with<E>(
        &mut self,
        surface: SurfaceId,
        key: TransformKey,
        apply: impl FnOnce() -> Result<SurfaceId, E>,
    ) -> Result<SurfaceId, E> {
        if let Some(image) = self.get(surface, key) {
            self.hits += 1;
            return Ok(image);
        }
        let image = apply()?;
        self.entries.insert((surface, key), image);
        Ok(image)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the memo.
    pub fn hits(&self) -> usize {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_memo_applies_once_per_key() {
        let mut ids: SlotMap<SurfaceId, ()> = SlotMap::with_key();
        let original = ids.insert(());
        let image = ids.insert(());
        let mut memo = TransformMemo::new();
        let key = TransformKey::translate(&Vec3::new(1.0, 0.0, 0.0), Placement::Cloned);
        let mut calls = 0;
        for _ in 0..3 {
            let got = memo.get_or_insert_with(original, key, || {
                calls += 1;
                image
            });
            assert_eq!(got, image);
        }
        assert_eq!(calls, 1);
        assert_eq!(memo.hits(), 2);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_keys_distinguish_parameters() {
        let a = TransformKey::translate(&Vec3::new(1.0, 0.0, 0.0), Placement::Cloned);
        let b = TransformKey::translate(&Vec3::new(1.0, 0.0, 0.0), Placement::InPlace);
        let c = TransformKey::translate(&Vec3::new(2.0, 0.0, 0.0), Placement::Cloned);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(
            TransformKey::translate(&Vec3::new(-0.0, 1.0, 0.0), Placement::Cloned),
            TransformKey::translate(&Vec3::new(0.0, 1.0, 0.0), Placement::Cloned)
        );
        let r = Matrix3::identity();
        assert_ne!(
            TransformKey::rotate(&r, &Point3d::ORIGIN, Placement::Cloned),
            TransformKey::rotate(&r, &Point3d::new(1.0, 0.0, 0.0), Placement::Cloned)
        );
    }

    #[test]
    fn test_failed_apply_is_not_recorded() {
        let mut ids: SlotMap<SurfaceId, ()> = SlotMap::with_key();
        let original = ids.insert(());
        let mut memo = TransformMemo::new();
        let result: Result<SurfaceId, &str> =
            memo.try_get_or_insert_with(original, TransformKey::Clone, || Err("boom"));
        assert!(result.is_err());
        assert!(memo.is_empty());
    }
}
