// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Validated parameters for the sky-background endpoint.

use indexmap::IndexMap;

use super::body::{as_array, as_bool, as_object, as_string, numeric_map, RequestBody};
use super::ValidationError;

/// Strength of a geocoronal emission line. The simulation library's keyword
/// for the average case is `avg`, which is what `average` normalizes to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeocoronalFlux {
    High,
    Average,
    Low,

    /// A user-supplied flux \[erg/s/cm²/arcsec²\]; must be positive.
    Custom(f64),
}

impl GeocoronalFlux {
    /// Parse a flux field. Keywords are matched case-insensitively; anything
    /// that isn't a keyword must parse as a positive float.
    pub fn parse(raw: &str) -> Result<GeocoronalFlux, ValidationError> {
        match raw.to_lowercase().as_str() {
            "high" => Ok(GeocoronalFlux::High),
            "average" | "avg" => Ok(GeocoronalFlux::Average),
            "low" => Ok(GeocoronalFlux::Low),
            other => match other.parse::<f64>() {
                Ok(flux) if flux > 0.0 => Ok(GeocoronalFlux::Custom(flux)),
                _ => Err(ValidationError::BadGeocoronalFlux(raw.to_string())),
            },
        }
    }

    /// The keyword handed to the simulation library for non-custom fluxes.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            GeocoronalFlux::High => Some("high"),
            GeocoronalFlux::Average => Some("avg"),
            GeocoronalFlux::Low => Some("low"),
            GeocoronalFlux::Custom(_) => None,
        }
    }
}

/// Everything needed to construct a background stage object.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundParams {
    /// When true, sky magnitudes are estimated by the library (using the
    /// telescope's passbands if one is configured); `custom_sky_background`
    /// is ignored.
    pub use_default_sky_background: bool,

    /// Per-passband sky brightness \[AB mag/arcsec²\]. `None` when the
    /// default sky background is requested.
    pub custom_sky_background: Option<IndexMap<String, f64>>,

    /// Geocoronal emission lines to add, in request order.
    pub geocoronal_emission: Vec<GeocoronalFlux>,
}

impl BackgroundParams {
    pub fn from_request(body: &RequestBody) -> Result<BackgroundParams, ValidationError> {
        let use_default_sky_background = as_bool(
            "useDefaultSkyBackground",
            &body.field("useDefaultSkyBackground")?,
        )?;

        let custom_sky_background = if use_default_sky_background {
            None
        } else {
            Some(numeric_map(
                "customSkyBackground",
                &body.field("customSkyBackground")?,
            )?)
        };

        let geo_value = body.field("geocoronalEmission")?;
        let mut geocoronal_emission = vec![];
        for (i, item) in as_array("geocoronalEmission", &geo_value)?.iter().enumerate() {
            let field = format!("geocoronalEmission[{i}].flux");
            let obj = as_object(&field, item)?;
            let flux_value = obj
                .get("flux")
                .ok_or_else(|| ValidationError::MissingField(field.clone()))?;
            geocoronal_emission.push(GeocoronalFlux::parse(&as_string(&field, flux_value)?)?);
        }

        Ok(BackgroundParams {
            use_default_sky_background,
            custom_sky_background,
            geocoronal_emission,
        })
    }
}
