use serde::{Deserialize, Serialize};

use csg_kernel::SurfaceStore;

use crate::element::{to_element, SurfaceElement};

/// Format identifier written to every document.
pub const FORMAT_NAME: &str = "csg-surfaces";

/// Current file format version.
pub const FORMAT_VERSION: u32 = 1;

/// The top-level file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceDocument {
    /// Format identifier.
    pub format: String,
    /// Format version number.
    pub version: u32,
    /// One element per surface, ordered by id.
    pub surfaces: Vec<SurfaceElement>,
}

/// Serialize every surface in `store` to a pretty-printed JSON string.
///
/// Takes the store mutably because quadric substitutes for general cylinders
/// and cones are given an id on their first save. Later saves reuse it.
pub fn save_surfaces(store: &mut SurfaceStore) -> serde_json::Result<String> {
    let mut ids: Vec<_> = store
        .iter()
        .map(|(id, _)| (store.user_id(id).unwrap_or_default(), id))
        .collect();
    ids.sort_by_key(|(user_id, _)| *user_id);
    let surfaces = ids
        .into_iter()
        .filter_map(|(_, id)| to_element(store, id))
        .collect();
    let document = SurfaceDocument {
        format: FORMAT_NAME.to_string(),
        version: FORMAT_VERSION,
        surfaces,
    };
    serde_json::to_string_pretty(&document)
}
