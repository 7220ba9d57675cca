use serde::{Deserialize, Serialize};

use csg_kernel::surface::is_unit_albedo;
use csg_kernel::{BoundaryType, Surface, SurfaceError, SurfaceId, SurfaceKind, SurfaceStore};

use crate::errors::LoadError;

/// One surface as written to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceElement {
    /// Numeric id that regions and periodic partners refer to.
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Family type tag, e.g. `"x-cylinder"`.
    #[serde(rename = "type")]
    pub surface_type: String,
    /// Absent means transmission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub albedo: Option<f64>,
    /// Own coefficients in family order, space separated.
    pub coeffs: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodic_surface_id: Option<u32>,
}

impl SurfaceElement {
    /// Element for `surface` under `id`, without a periodic partner.
    pub fn from_surface(id: u32, surface: &Surface) -> Self {
        let boundary = surface.boundary;
        let (boundary_attr, albedo) = if boundary == BoundaryType::Transmission {
            (None, None)
        } else {
            let albedo = (boundary.carries_albedo() && !is_unit_albedo(surface.albedo()))
                .then(|| surface.albedo());
            (Some(boundary.as_str().to_string()), albedo)
        };
        SurfaceElement {
            id,
            name: (!surface.name.is_empty()).then(|| surface.name.clone()),
            surface_type: surface.type_tag().to_string(),
            boundary: boundary_attr,
            albedo,
            coeffs: format_coefficients(surface.coefficients()),
            periodic_surface_id: None,
        }
    }
}

/// `{:?}` keeps a trailing `.0` on whole numbers and round-trips exactly.
fn format_coefficients(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:?}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Element for the surface `id` in `store`.
///
/// General cylinders and cones have no encoding of their own and are written
/// as their quadric substitute under an id of its own, allocated once per
/// surface. `None` when `id` is not in the store.
pub fn to_element(store: &mut SurfaceStore, id: SurfaceId) -> Option<SurfaceElement> {
    let user_id = store.user_id(id)?;
    if let Some((substitute_id, substitute)) = store.export_substitute(id) {
        return Some(SurfaceElement::from_surface(substitute_id, &substitute));
    }
    let surface = store.get(id)?;
    let mut element = SurfaceElement::from_surface(user_id, surface);
    if surface.boundary == BoundaryType::Periodic {
        element.periodic_surface_id = store
            .periodic_partner(id)
            .and_then(|partner| store.user_id(partner));
    }
    Some(element)
}

/// Rebuild the surface an element describes.
///
/// The albedo attribute is read only for boundaries that carry one. Missing
/// trailing coefficients take the family defaults.
pub fn from_element(element: &SurfaceElement) -> Result<Surface, LoadError> {
    let kind = SurfaceKind::from_type_tag(&element.surface_type)?;
    let boundary = match element.boundary.as_deref() {
        Some(tag) => tag.parse::<BoundaryType>()?,
        None => BoundaryType::Transmission,
    };
    let values = element
        .coeffs
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                LoadError::ParseError(format!(
                    "surface {}: invalid coefficient '{}'",
                    element.id, token
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut surface = surface_from_values(kind, &values)?
        .with_name(element.name.clone().unwrap_or_default())
        .with_boundary(boundary);
    if boundary.carries_albedo() {
        surface.set_albedo(element.albedo.unwrap_or(1.0))?;
    }
    Ok(surface)
}

/// Positional coefficients over the family defaults.
pub(crate) fn surface_from_values(kind: SurfaceKind, values: &[f64]) -> Result<Surface, SurfaceError> {
    let mut full = kind.defaults().to_vec();
    if values.len() > full.len() {
        return Err(SurfaceError::CoefficientCount {
            family: kind.type_tag(),
            expected: full.len(),
            got: values.len(),
        });
    }
    full[..values.len()].copy_from_slice(values);
    Surface::from_coefficients(kind, &full)
}
