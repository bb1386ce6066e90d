// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Validated parameters for the slit/MOS spectroscopy endpoint.

use serde_json::Value;
use strum_macros::{Display, EnumString};

use super::body::{as_f64, as_object, as_string, RequestBody};
use super::ValidationError;
use crate::units::{Quantity, Unit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ExtractionBoxUnits {
    #[strum(serialize = "pixel")]
    Pixel,
    #[strum(serialize = "arcsec")]
    Arcsec,
}

/// The spectral extraction box. Dimensions are either whole pixels or
/// arcseconds to be divided by the telescope's pixel scale; the upper height
/// limit is optional (the wire encodes "no limit" as an empty string).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionBox {
    pub width: f64,
    pub height_lower_lim: f64,
    pub height_upper_lim: Option<f64>,
    pub units: ExtractionBoxUnits,
}

/// An [`ExtractionBox`] resolved to whole detector pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelExtractionBox {
    pub width: i64,
    pub lower_lim: i64,
    pub upper_lim: Option<i64>,
}

impl ExtractionBox {
    /// Resolve to pixels. Arcsecond boxes are divided by the pixel scale
    /// \[arcsec/pixel\] and rounded before truncation, so that e.g.
    /// 0.6/0.1 = 5.999… becomes 6 pixels rather than 5.
    pub fn to_pixels(&self, px_scale: f64) -> PixelExtractionBox {
        let resolve = |value: f64| -> i64 {
            match self.units {
                ExtractionBoxUnits::Pixel => value as i64,
                ExtractionBoxUnits::Arcsec => (value / px_scale).round() as i64,
            }
        };
        PixelExtractionBox {
            width: resolve(self.width),
            lower_lim: resolve(self.height_lower_lim),
            upper_lim: self.height_upper_lim.map(resolve),
        }
    }
}

/// The requested target metric at a single wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UvmosTarget {
    Snr(f64),
    ExposureTime(f64),
}

/// Everything needed to run slit spectroscopy.
#[derive(Debug, Clone, PartialEq)]
pub struct UvmosParams {
    pub min_wavelength: Quantity,
    pub max_wavelength: Quantity,
    pub slit_width: Quantity,
    pub slit_height: Quantity,
    pub extraction_box: ExtractionBox,
    pub target: UvmosTarget,

    /// The wavelength the S/N (or time) is evaluated at.
    pub target_wavelength: Quantity,
}

impl UvmosParams {
    pub fn from_request(body: &RequestBody) -> Result<UvmosParams, ValidationError> {
        let spectral_range = body.field("spectralRange")?;
        let min_wavelength = get_f64("spectralRange", &spectral_range, "minwavelength")?;
        let max_wavelength = get_f64("spectralRange", &spectral_range, "maxwavelength")?;

        let slit = body.field("slit")?;
        let slit_width = get_f64("slit", &slit, "width")?;
        let slit_height = get_f64("slit", &slit, "length")?;

        let extraction_box = parse_extraction_box(&body.field("extractionBox")?)?;
        let (target, target_wavelength) = parse_target(&body.field("snrInput")?)?;

        Ok(UvmosParams {
            min_wavelength: Quantity::new(min_wavelength, Unit::Nanometre),
            max_wavelength: Quantity::new(max_wavelength, Unit::Nanometre),
            slit_width: Quantity::new(slit_width, Unit::Arcsec),
            slit_height: Quantity::new(slit_height, Unit::Arcsec),
            extraction_box,
            target,
            target_wavelength,
        })
    }
}

fn get_f64(parent: &str, value: &Value, key: &str) -> Result<f64, ValidationError> {
    let field = format!("{parent}.{key}");
    let obj = as_object(parent, value)?;
    let entry = obj
        .get(key)
        .ok_or_else(|| ValidationError::MissingField(field.clone()))?;
    as_f64(&field, entry)
}

fn parse_extraction_box(value: &Value) -> Result<ExtractionBox, ValidationError> {
    let obj = as_object("extractionBox", value)?;

    let width = get_f64("extractionBox", value, "width")?;
    let height_lower_lim = get_f64("extractionBox", value, "heightLowerLim")?;

    // An empty string means "no upper limit".
    let height_upper_lim = match obj.get("heightUpperLim") {
        None => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(as_f64("extractionBox.heightUpperLim", v)?),
    };

    let units_value = obj
        .get("units")
        .ok_or_else(|| ValidationError::MissingField("extractionBox.units".to_string()))?;
    let units = as_string("extractionBox.units", units_value)?
        .parse()
        .map_err(|_| ValidationError::UnrecognisedChoice {
            what: "extraction box units (must be 'pixel' or 'arcsec')",
            got: units_value.to_string(),
        })?;

    Ok(ExtractionBox {
        width,
        height_lower_lim,
        height_upper_lim,
        units,
    })
}

fn parse_target(value: &Value) -> Result<(UvmosTarget, Quantity), ValidationError> {
    let obj = as_object("snrInput", value)?;
    let val = get_f64("snrInput", value, "val")?;
    let wavelength = get_f64("snrInput", value, "wavelength")?;
    let val_type = obj
        .get("val_type")
        .ok_or_else(|| ValidationError::MissingField("snrInput.val_type".to_string()))?;

    let target = match as_string("snrInput.val_type", val_type)?.as_str() {
        "snr" => UvmosTarget::Snr(val),
        "t" => UvmosTarget::ExposureTime(val),
        other => {
            return Err(ValidationError::UnrecognisedChoice {
                what: "spectroscopy target value type (must be 'snr' or 't')",
                got: other.to_string(),
            })
        }
    };
    Ok((target, Quantity::new(wavelength, Unit::Nanometre)))
}
