use csg_kernel::SurfaceError;

/// Errors while reading surface documents and records.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("failed to parse file: {0}")]
    ParseError(String),

    #[error("unknown file format: {0}")]
    UnknownFormat(String),

    #[error("file version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },

    #[error("surface id {0} appears more than once")]
    DuplicateId(u32),

    #[error("surface {surface} names periodic partner {partner}, which is not in the file")]
    MissingPeriodicPartner { surface: u32, partner: u32 },

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
