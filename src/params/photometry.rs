// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Validated parameters for the aperture-photometry endpoint.

use serde_json::Value;
use strum_macros::{Display, EnumString};

use super::body::{arcsec_list, as_f64, as_object, as_string, choice, variant_params, RequestBody};
use super::ValidationError;
use crate::units::{Quantity, Unit};

/// The aperture placed over the source. Every length is in arcseconds;
/// `rotation` (degrees) and `factor` stay dimensionless, and a `center` may
/// have been extracted from free text.
#[derive(Debug, Clone, PartialEq)]
pub enum Aperture {
    /// An optimal aperture; only valid for point sources.
    Optimal { factor: f64 },

    Elliptical {
        a: Quantity,
        b: Quantity,
        center: Vec<Quantity>,
        rotation: f64,
    },

    Rectangular {
        width: Quantity,
        length: Quantity,
        center: Vec<Quantity>,
        rotation: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
enum AperShape {
    #[strum(serialize = "optimal")]
    Optimal,
    #[strum(serialize = "elliptical")]
    Elliptical,
    #[strum(serialize = "rectangular")]
    Rectangular,
}

/// The requested target metric: solve for time given a signal-to-noise
/// ratio, or for signal-to-noise given a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhotometryTarget {
    Snr(f64),
    ExposureTime(f64),
}

/// Everything needed to run aperture photometry against the configured
/// telescope, source and background.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotometryParams {
    /// Which passband's source weights to return for display.
    pub source_weights_passband: String,

    /// E(B−V) reddening applied during the S/N calculation.
    pub reddening: f64,

    pub aperture: Aperture,
    pub target: PhotometryTarget,
}

impl PhotometryParams {
    pub fn from_request(body: &RequestBody) -> Result<PhotometryParams, ValidationError> {
        let source_weights_passband =
            as_string("sourceWeightsPassband", &body.field("sourceWeightsPassband")?)?
                .to_lowercase();
        let reddening = as_f64("reddening", &body.field("reddening")?)?;

        let shape_raw = as_string("aperShape", &body.field("aperShape")?)?;
        let shape: AperShape = choice("aperShape", &body.field("aperShape")?, "aperture shape")?;
        let aper_params_value = body.field("aperParams")?;
        let aper_params = variant_params("aperParams", &aper_params_value, &shape_raw)?;
        let aperture = parse_aperture(shape, &shape_raw, aper_params)?;

        let target = parse_target(&body.field("photInput")?)?;

        Ok(PhotometryParams {
            source_weights_passband,
            reddening,
            aperture,
            target,
        })
    }
}

fn parse_aperture(
    shape: AperShape,
    raw_key: &str,
    params: &Value,
) -> Result<Aperture, ValidationError> {
    let field = |key: &str| format!("aperParams.{raw_key}.{key}");
    let obj = as_object(&format!("aperParams.{raw_key}"), params)?;
    let arcsec = |key: &str| -> Result<Quantity, ValidationError> {
        let value = obj
            .get(key)
            .ok_or_else(|| ValidationError::MissingField(field(key)))?;
        Ok(Quantity::new(as_f64(&field(key), value)?, Unit::Arcsec))
    };
    // Dimensionless values with a default when the frontend omits them.
    let plain = |key: &str, default: f64| -> Result<f64, ValidationError> {
        match obj.get(key) {
            Some(value) => as_f64(&field(key), value),
            None => Ok(default),
        }
    };
    // The centre may be a single number or free text like "(0.1, -0.3)".
    let center = || -> Result<Vec<Quantity>, ValidationError> {
        match obj.get("center") {
            Some(value) => arcsec_list(&field("center"), value),
            None => Ok(vec![
                Quantity::new(0.0, Unit::Arcsec),
                Quantity::new(0.0, Unit::Arcsec),
            ]),
        }
    };

    match shape {
        AperShape::Optimal => Ok(Aperture::Optimal {
            factor: plain("factor", 1.4)?,
        }),
        AperShape::Elliptical => Ok(Aperture::Elliptical {
            a: arcsec("a")?,
            b: arcsec("b")?,
            center: center()?,
            rotation: plain("rotation", 0.0)?,
        }),
        AperShape::Rectangular => Ok(Aperture::Rectangular {
            width: arcsec("width")?,
            length: arcsec("length")?,
            center: center()?,
            rotation: plain("rotation", 0.0)?,
        }),
    }
}

fn parse_target(value: &Value) -> Result<PhotometryTarget, ValidationError> {
    let obj = as_object("photInput", value)?;
    let val_type = obj
        .get("val_type")
        .ok_or_else(|| ValidationError::MissingField("photInput.val_type".to_string()))?;
    let val = obj
        .get("val")
        .ok_or_else(|| ValidationError::MissingField("photInput.val".to_string()))?;
    let val = as_f64("photInput.val", val)?;

    match as_string("photInput.val_type", val_type)?.as_str() {
        "snr" => Ok(PhotometryTarget::Snr(val)),
        "t" => Ok(PhotometryTarget::ExposureTime(val)),
        other => Err(ValidationError::UnrecognisedChoice {
            what: "photometry target value type (must be 'snr' or 't')",
            got: other.to_string(),
        }),
    }
}
