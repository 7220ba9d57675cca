use serde::{Deserialize, Serialize};

use csg_kernel::{BoundaryType, Surface, SurfaceKind};

use crate::element::surface_from_values;
use crate::errors::LoadError;

/// Geometry type marking a surface modelled outside the algebraic kernel.
pub const EXTERNAL_GEOMETRY: &str = "dagmc";

/// One surface as stored in an archived results group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedSurface {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub surface_type: String,
    pub boundary_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub albedo: Option<f64>,
    pub coefficients: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geom_type: Option<String>,
}

/// Surface described by an archived record, paired with its id.
///
/// Externally modelled surfaces yield `Ok(None)` without looking at their
/// coefficients. The stored albedo is kept whatever the boundary.
pub fn from_archive(record: &ArchivedSurface) -> Result<Option<(u32, Surface)>, LoadError> {
    if record.geom_type.as_deref() == Some(EXTERNAL_GEOMETRY) {
        return Ok(None);
    }
    let kind = SurfaceKind::from_type_tag(&record.surface_type)?;
    let boundary: BoundaryType = record.boundary_type.parse()?;
    let surface = surface_from_values(kind, &record.coefficients)?
        .with_name(record.name.clone())
        .with_boundary(boundary)
        .with_albedo(record.albedo.unwrap_or(1.0))?;
    Ok(Some((record.id, surface)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use csg_kernel::SurfaceError;

    fn record(surface_type: &str, coefficients: Vec<f64>) -> ArchivedSurface {
        ArchivedSurface {
            id: 12,
            name: "wall".to_string(),
            surface_type: surface_type.to_string(),
            boundary_type: "white".to_string(),
            albedo: Some(0.75),
            coefficients,
            geom_type: None,
        }
    }

    #[test]
    fn test_archive_record_to_surface() {
        let (id, surface) = from_archive(&record("z-cylinder", vec![1.0, 2.0, 3.0]))
            .unwrap()
            .unwrap();
        assert_eq!(id, 12);
        assert_eq!(surface.kind(), SurfaceKind::ZCylinder);
        assert_eq!(surface.boundary, BoundaryType::White);
        assert_eq!(surface.effective_albedo(), 0.75);
        assert_eq!(surface.name, "wall");
    }

    #[test]
    fn test_external_geometry_is_skipped() {
        let mut rec = record("no-such-type", vec![]);
        rec.geom_type = Some(EXTERNAL_GEOMETRY.to_string());
        assert_eq!(from_archive(&rec).unwrap(), None);
    }

    #[test]
    fn test_unknown_type_and_boundary() {
        let err = from_archive(&record("hyperboloid", vec![])).unwrap_err();
        assert!(matches!(err, LoadError::Surface(SurfaceError::UnknownSurfaceType(_))));
        let mut rec = record("sphere", vec![0.0, 0.0, 0.0, 1.0]);
        rec.boundary_type = "sticky".to_string();
        let err = from_archive(&rec).unwrap_err();
        assert!(matches!(err, LoadError::Surface(SurfaceError::InvalidBoundaryType(_))));
    }
}
