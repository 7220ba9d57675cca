pub mod archive;
pub mod element;
pub mod errors;
pub mod load;
pub mod save;

pub use archive::{from_archive, ArchivedSurface};
pub use element::{from_element, to_element, SurfaceElement};
pub use errors::LoadError;
pub use load::load_surfaces;
pub use save::{save_surfaces, FORMAT_VERSION};
