use csg_kernel::SurfaceStore;

use crate::element::from_element;
use crate::errors::LoadError;
use crate::save::{SurfaceDocument, FORMAT_NAME, FORMAT_VERSION};

/// Deserialize a surface document from a JSON string.
///
/// Validates the format identifier and version, rebuilds every surface under
/// its recorded id and restores periodic pairings.
pub fn load_surfaces(json: &str) -> Result<SurfaceStore, LoadError> {
    let raw: SurfaceDocument =
        serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))?;

    if raw.format != FORMAT_NAME {
        return Err(LoadError::UnknownFormat(raw.format));
    }

    if raw.version > FORMAT_VERSION {
        return Err(LoadError::FutureVersion {
            file_version: raw.version,
            supported_version: FORMAT_VERSION,
        });
    }

    let mut store = SurfaceStore::new();
    for element in &raw.surfaces {
        if store.find_by_user_id(element.id).is_some() {
            return Err(LoadError::DuplicateId(element.id));
        }
        let surface = from_element(element)?;
        store.insert_with_user_id(surface, element.id);
    }

    // Pairs are symmetric, so each is restored from whichever side names it.
    for element in &raw.surfaces {
        let Some(partner) = element.periodic_surface_id else {
            continue;
        };
        let missing = LoadError::MissingPeriodicPartner {
            surface: element.id,
            partner,
        };
        let a = store.find_by_user_id(element.id).ok_or(missing.clone())?;
        let b = store.find_by_user_id(partner).ok_or(missing)?;
        if store.periodic_partner(a) != Some(b) {
            store.set_periodic_pair(a, b)?;
        }
    }

    Ok(store)
}
