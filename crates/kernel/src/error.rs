use thiserror::Error;

/// Failures raised while constructing, editing or transforming surfaces.
///
/// Every variant is reported before any state is committed, so a surface that
/// failed to update keeps its previous coefficients.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("invalid boundary type '{0}' (expected transmission, vacuum, reflective, periodic or white)")]
    InvalidBoundaryType(String),

    #[error("albedo must be a positive number, got {0}")]
    InvalidAlbedo(f64),

    #[error("invalid value {value} for coefficient '{name}'")]
    InvalidCoefficient { name: String, value: f64 },

    #[error("{family} surfaces take {expected} coefficients, got {got}")]
    CoefficientCount {
        family: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("coefficient '{name}' is not defined for {family} surfaces")]
    UnknownCoefficient { name: String, family: &'static str },

    #[error("coefficient '{name}' is fixed for {family} surfaces and cannot be written")]
    ReadOnlyCoefficientWrite { name: String, family: &'static str },

    #[error("degenerate construction: {0}")]
    DegenerateConstruction(String),

    #[error("unsupported transform: {0}")]
    UnsupportedTransform(String),

    #[error("unknown surface type '{0}'")]
    UnknownSurfaceType(String),

    #[error("periodic pairing requires planar surfaces, got {0}")]
    NonPlanarPeriodicPair(&'static str),
}
