// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Validated parameters for the astronomical-source endpoint.
//!
//! The raw body leans heavily on the "choice field selects a parameter subset
//! from a dict keyed by the choice" pattern: `sourceType`,
//! `predefinedSpectrum` and `normMethod` each discriminate a dict-of-dicts
//! sibling. Each selection becomes a tagged enum variant carrying only its
//! own typed fields.

use std::path::PathBuf;

use serde_json::Value;
use strum_macros::{Display, EnumString};

use super::body::{
    as_array, as_bool, as_f64, as_object, as_string, choice, variant_params, RequestBody,
};
use super::ValidationError;
use crate::constants::ALLOWED_UPLOAD_EXTENSIONS;
use crate::units::{Quantity, Unit};

/// The geometric profile of the source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceProfile {
    Point,

    Extended {
        angle_a: Quantity,
        angle_b: Quantity,
        rotation: f64,
    },

    /// A Sérsic profile.
    Galaxy {
        r_eff: Quantity,
        sersic: f64,
        e: f64,
        angle: f64,
        angle_a: Quantity,
        angle_b: Quantity,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
enum SourceType {
    #[strum(serialize = "point")]
    Point,
    #[strum(serialize = "extended")]
    Extended,
    #[strum(serialize = "galaxy")]
    Galaxy,
}

/// An analytic or template spectrum shipped with the simulation library.
#[derive(Debug, Clone, PartialEq)]
pub enum PredefinedSpectrum {
    Elliptical,
    Spiral,
    Blackbody { temperature: Quantity },
    PowerLaw { index: f64 },
    Uniform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
enum PredefinedSpectrumType {
    #[strum(serialize = "elliptical")]
    Elliptical,
    #[strum(serialize = "spiral")]
    Spiral,
    #[strum(serialize = "blackbody")]
    Blackbody,
    #[strum(serialize = "powerLaw")]
    PowerLaw,
    #[strum(serialize = "uniform")]
    Uniform,
}

/// How (and whether) the spectrum is renormalized.
#[derive(Debug, Clone, PartialEq)]
pub enum NormMethod {
    /// To an AB magnitude within one passband.
    PassbandMag { passband: String, mag: f64 },

    /// To a total (bolometric) AB magnitude.
    TotalMag { mag: f64 },

    /// To a luminosity at a distance.
    LuminosityDist { luminosity: f64, dist: Quantity },

    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
enum NormMethodType {
    #[strum(serialize = "passband")]
    Passband,
    #[strum(serialize = "totalMag")]
    TotalMag,
    #[strum(serialize = "luminosityDist")]
    LuminosityDist,
    #[strum(serialize = "none")]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum LineKind {
    #[strum(serialize = "emission")]
    Emission,
    #[strum(serialize = "absorption")]
    Absorption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum LineShape {
    #[strum(serialize = "gaussian")]
    Gaussian,
    #[strum(serialize = "lorentzian")]
    Lorentzian,
}

/// One emission or absorption line added on top of the spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralLine {
    pub center: Quantity,
    pub fwhm: Quantity,
    pub peak: f64,
    pub kind: LineKind,
    pub shape: LineShape,
}

/// Everything needed to build a source stage object, in the order the
/// operations are applied: profile, spectrum, redshift, spectral lines and
/// normalization (the before/after ordering is controlled by
/// `norm_after_spectral_lines`).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceParams {
    pub profile: SourceProfile,
    pub predefined_spectrum: PredefinedSpectrum,

    /// A previously uploaded spectrum file; overrides `predefined_spectrum`.
    pub custom_spectrum: Option<PathBuf>,

    pub redshift: f64,
    pub spectral_lines: Vec<SpectralLine>,
    pub norm_method: NormMethod,
    pub norm_after_spectral_lines: bool,
}

impl SourceParams {
    pub fn from_request(body: &RequestBody) -> Result<SourceParams, ValidationError> {
        let source_type_raw = as_string("sourceType", &body.field("sourceType")?)?;
        let source_type: SourceType =
            choice("sourceType", &body.field("sourceType")?, "source type")?;
        let physical = body.field("physicalParameters")?;
        let profile = parse_profile(source_type, &source_type_raw, &physical)?;

        let spectrum_raw = as_string("predefinedSpectrum", &body.field("predefinedSpectrum")?)?;
        let spectrum_type: PredefinedSpectrumType = choice(
            "predefinedSpectrum",
            &body.field("predefinedSpectrum")?,
            "predefined spectrum",
        )?;
        let predefined_spectrum = parse_predefined_spectrum(
            spectrum_type,
            &spectrum_raw,
            body.field("predefinedSpectrumParameters").ok().as_ref(),
        )?;

        let custom_spectrum = parse_custom_spectrum(body)?;
        let redshift = as_f64("redshift", &body.field("redshift")?)?;
        let spectral_lines = parse_spectral_lines(&body.field("spectralLines")?)?;

        let norm_raw = as_string("normMethod", &body.field("normMethod")?)?;
        let norm_type: NormMethodType =
            choice("normMethod", &body.field("normMethod")?, "normalization method")?;
        let norm_method =
            parse_norm_method(norm_type, &norm_raw, body.field("normParams").ok().as_ref())?;

        let norm_after_spectral_lines = as_bool(
            "isNormAfterSpectralLines",
            &body.field("isNormAfterSpectralLines")?,
        )?;

        Ok(SourceParams {
            profile,
            predefined_spectrum,
            custom_spectrum,
            redshift,
            spectral_lines,
            norm_method,
            norm_after_spectral_lines,
        })
    }
}

fn parse_profile(
    source_type: SourceType,
    raw_key: &str,
    physical: &Value,
) -> Result<SourceProfile, ValidationError> {
    // Point sources carry no geometry, so don't require a variant entry.
    if source_type == SourceType::Point {
        return Ok(SourceProfile::Point);
    }
    let params = variant_params("physicalParameters", physical, raw_key)?;
    let field = |key: &str| format!("physicalParameters.{raw_key}.{key}");
    let get = |key: &str| -> Result<f64, ValidationError> {
        let obj = as_object(&field(key), params)?;
        let value = obj
            .get(key)
            .ok_or_else(|| ValidationError::MissingField(field(key)))?;
        as_f64(&field(key), value)
    };

    match source_type {
        SourceType::Point => unreachable!("handled above"),
        SourceType::Extended => Ok(SourceProfile::Extended {
            angle_a: Quantity::new(get("angleA")?, Unit::Arcsec),
            angle_b: Quantity::new(get("angleB")?, Unit::Arcsec),
            rotation: get("rotation")?,
        }),
        SourceType::Galaxy => Ok(SourceProfile::Galaxy {
            r_eff: Quantity::new(get("rEff")?, Unit::Arcsec),
            sersic: get("sersic")?,
            e: get("e")?,
            angle: get("angle")?,
            angle_a: Quantity::new(get("angleA")?, Unit::Arcsec),
            angle_b: Quantity::new(get("angleB")?, Unit::Arcsec),
        }),
    }
}

fn parse_predefined_spectrum(
    spectrum_type: PredefinedSpectrumType,
    raw_key: &str,
    params: Option<&Value>,
) -> Result<PredefinedSpectrum, ValidationError> {
    let variant = || -> Result<Value, ValidationError> {
        let dict = params.ok_or_else(|| {
            ValidationError::MissingField("predefinedSpectrumParameters".to_string())
        })?;
        variant_params("predefinedSpectrumParameters", dict, raw_key).map(Value::clone)
    };
    let get = |params: &Value, key: &str| -> Result<f64, ValidationError> {
        let field = format!("predefinedSpectrumParameters.{raw_key}.{key}");
        let obj = as_object(&field, params)?;
        let value = obj
            .get(key)
            .ok_or_else(|| ValidationError::MissingField(field.clone()))?;
        as_f64(&field, value)
    };

    match spectrum_type {
        PredefinedSpectrumType::Elliptical => Ok(PredefinedSpectrum::Elliptical),
        PredefinedSpectrumType::Spiral => Ok(PredefinedSpectrum::Spiral),
        PredefinedSpectrumType::Uniform => Ok(PredefinedSpectrum::Uniform),
        PredefinedSpectrumType::Blackbody => {
            let params = variant()?;
            Ok(PredefinedSpectrum::Blackbody {
                temperature: Quantity::new(get(&params, "temperature")?, Unit::Kelvin),
            })
        }
        PredefinedSpectrumType::PowerLaw => {
            let params = variant()?;
            Ok(PredefinedSpectrum::PowerLaw {
                index: get(&params, "index")?,
            })
        }
    }
}

fn parse_custom_spectrum(body: &RequestBody) -> Result<Option<PathBuf>, ValidationError> {
    // A form submission carries the file itself (already saved); a JSON body
    // carries the saved path from an earlier upload. Empty string means no
    // custom spectrum.
    if let Some(path) = body.file("customSpectrum") {
        return Ok(Some(path));
    }
    let value = match body.field("customSpectrum") {
        Ok(value) => value,
        Err(ValidationError::MissingField(_)) => return Ok(None),
        Err(e) => return Err(e),
    };
    let text = as_string("customSpectrum", &value)?;
    if text.trim().is_empty() || text.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let path = PathBuf::from(text.trim());
    let extension_ok = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false);
    if !extension_ok {
        return Err(ValidationError::DisallowedFileType(
            path.display().to_string(),
        ));
    }
    Ok(Some(path))
}

fn parse_spectral_lines(value: &Value) -> Result<Vec<SpectralLine>, ValidationError> {
    let mut lines = vec![];
    for (i, item) in as_array("spectralLines", value)?.iter().enumerate() {
        let field = |key: &str| format!("spectralLines[{i}].{key}");
        let obj = as_object(&format!("spectralLines[{i}]"), item)?;
        let get = |key: &str| -> Result<Value, ValidationError> {
            obj.get(key)
                .cloned()
                .ok_or_else(|| ValidationError::MissingField(field(key)))
        };

        lines.push(SpectralLine {
            center: Quantity::new(as_f64(&field("center"), &get("center")?)?, Unit::Angstrom),
            fwhm: Quantity::new(as_f64(&field("fwhm"), &get("fwhm")?)?, Unit::Angstrom),
            peak: as_f64(&field("peak"), &get("peak")?)?,
            kind: choice(&field("type"), &get("type")?, "spectral line type")?,
            shape: choice(&field("shape"), &get("shape")?, "spectral line shape")?,
        });
    }
    Ok(lines)
}

fn parse_norm_method(
    norm_type: NormMethodType,
    raw_key: &str,
    params: Option<&Value>,
) -> Result<NormMethod, ValidationError> {
    if norm_type == NormMethodType::None {
        return Ok(NormMethod::None);
    }
    let dict =
        params.ok_or_else(|| ValidationError::MissingField("normParams".to_string()))?;
    let variant = variant_params("normParams", dict, raw_key)?;
    let field = |key: &str| format!("normParams.{raw_key}.{key}");
    let get = |key: &str| -> Result<Value, ValidationError> {
        as_object(&field(key), variant)?
            .get(key)
            .cloned()
            .ok_or_else(|| ValidationError::MissingField(field(key)))
    };

    match norm_type {
        NormMethodType::None => unreachable!("handled above"),
        NormMethodType::Passband => Ok(NormMethod::PassbandMag {
            passband: as_string(&field("passband"), &get("passband")?)?.to_lowercase(),
            mag: as_f64(&field("mag"), &get("mag")?)?,
        }),
        NormMethodType::TotalMag => Ok(NormMethod::TotalMag {
            mag: as_f64(&field("mag"), &get("mag")?)?,
        }),
        NormMethodType::LuminosityDist => Ok(NormMethod::LuminosityDist {
            luminosity: as_f64(&field("luminosity"), &get("luminosity")?)?,
            dist: Quantity::new(as_f64(&field("dist"), &get("dist")?)?, Unit::Kiloparsec),
        }),
    }
}
