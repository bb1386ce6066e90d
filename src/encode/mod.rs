// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Response encoding: stage outcomes projected onto the wire schema.
//!
//! Quantities are stripped to their fixed wire units here (angstroms for
//! wavelengths, arcseconds for angles, centimetres for the mirror) and every
//! float goes through non-finite sanitization, since JSON has no NaN or
//! infinity. Large 2-D arrays use a fixed packed representation: the nested
//! row-major JSON text, zlib-compressed, then base64-encoded. Which fields
//! are packed is part of each stage's schema, never decided by size.
//!
//! Encoding is pure: the same outcome always produces identical bytes.

mod error;


pub use error::EncodingError;

use std::io::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use indexmap::IndexMap;
use ndarray::Array2;
use serde::Serialize;

use crate::dispatch::{
    BackgroundOutcome, GrismOutcome, PhotometryOutcome, SourceOutcome, TelescopeOutcome,
    TransitOutcome, UvmosOutcome,
};
use crate::units::{Quantity, Unit};

/// NaN and ±infinity become JSON null.
fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

fn finite_vec(xs: &[f64]) -> Vec<Option<f64>> {
    xs.iter().copied().map(finite).collect()
}

fn finite_map(map: &IndexMap<String, f64>) -> IndexMap<String, Option<f64>> {
    map.iter().map(|(k, &v)| (k.clone(), finite(v))).collect()
}

/// A 2-D array as row-major nested arrays, sanitized.
fn rows(array: &Array2<f64>) -> Vec<Vec<Option<f64>>> {
    array
        .rows()
        .into_iter()
        .map(|row| row.iter().copied().map(finite).collect())
        .collect()
}

/// The packed 2-D representation: JSON text, zlib, base64.
fn packed(array: &Array2<f64>) -> Result<String, EncodingError> {
    let json = serde_json::to_string(&rows(array))?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes())?;
    Ok(BASE64.encode(encoder.finish()?))
}

fn in_angstrom(q: Quantity) -> Result<Option<f64>, EncodingError> {
    Ok(finite(q.in_unit(Unit::Angstrom)?))
}

fn in_arcsec(q: Quantity) -> Result<Option<f64>, EncodingError> {
    Ok(finite(q.in_unit(Unit::Arcsec)?))
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PassbandCurveResponse {
    pub wavelength: Vec<Option<f64>>,
    pub response: Vec<Option<f64>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TelescopeResponse {
    /// Lower/upper limit per passband \[Å\].
    pub passband_limits: IndexMap<String, [Option<f64>; 2]>,
    pub full_passband_curves: IndexMap<String, PassbandCurveResponse>,

    /// \[cm\]
    pub mirror_diameter: Option<f64>,
    pub phot_zpts: IndexMap<String, Option<f64>>,

    /// \[Å\]
    pub passband_pivots: IndexMap<String, Option<f64>>,

    /// \[arcsec\]
    pub fwhm: Option<f64>,

    /// \[arcsec\]
    pub px_scale: Option<f64>,
    pub dark_current: Option<f64>,
    pub read_noise: Option<f64>,

    /// \[Å\]
    pub redleak_thresholds: IndexMap<String, Option<f64>>,
    pub extinction_coeffs: IndexMap<String, Option<f64>>,
}

pub fn encode_telescope(outcome: &TelescopeOutcome) -> Result<TelescopeResponse, EncodingError> {
    let attrs = &outcome.attrs;
    let mut passband_limits = IndexMap::new();
    for (band, [lo, hi]) in &attrs.passband_limits {
        passband_limits.insert(band.clone(), [in_angstrom(*lo)?, in_angstrom(*hi)?]);
    }
    let mut full_passband_curves = IndexMap::new();
    for (band, curve) in &attrs.full_passband_curves {
        full_passband_curves.insert(
            band.clone(),
            PassbandCurveResponse {
                wavelength: finite_vec(&curve.wavelength.in_unit(Unit::Angstrom)?),
                response: finite_vec(&curve.response),
            },
        );
    }
    let mut passband_pivots = IndexMap::new();
    for (band, pivot) in &attrs.passband_pivots {
        passband_pivots.insert(band.clone(), in_angstrom(*pivot)?);
    }
    let mut redleak_thresholds = IndexMap::new();
    for (band, threshold) in &attrs.redleak_thresholds {
        redleak_thresholds.insert(band.clone(), in_angstrom(*threshold)?);
    }

    Ok(TelescopeResponse {
        passband_limits,
        full_passband_curves,
        mirror_diameter: finite(attrs.mirror_diameter.in_unit(Unit::Centimetre)?),
        phot_zpts: finite_map(&attrs.phot_zpts),
        passband_pivots,
        fwhm: in_arcsec(attrs.fwhm)?,
        px_scale: in_arcsec(attrs.px_scale)?,
        dark_current: finite(attrs.dark_current),
        read_noise: finite(attrs.read_noise),
        redleak_thresholds,
        extinction_coeffs: finite_map(&attrs.extinction_coeffs),
    })
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundResponse {
    /// Absent (null) when no sky magnitudes were supplied or estimated.
    pub mags_per_sq_arcsec: Option<IndexMap<String, Option<f64>>>,

    /// \[erg/s/cm²/arcsec²\], in request order.
    pub geo_flux: Vec<Option<f64>>,

    /// \[Å\]
    pub geo_wavelength: Vec<Option<f64>>,

    /// \[Å\]
    pub geo_linewidth: Vec<Option<f64>>,
}

pub fn encode_background(
    outcome: &BackgroundOutcome,
) -> Result<BackgroundResponse, EncodingError> {
    let attrs = &outcome.attrs;
    Ok(BackgroundResponse {
        mags_per_sq_arcsec: attrs.mags_per_sq_arcsec.as_ref().map(finite_map),
        geo_flux: finite_vec(&attrs.geo_flux),
        geo_wavelength: finite_vec(&attrs.geo_wavelength),
        geo_linewidth: finite_vec(&attrs.geo_linewidth),
    })
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceResponse {
    /// \[Å\]
    pub wavelengths: Vec<Option<f64>>,
    pub spectrum: Vec<Option<f64>>,

    /// Empty when no telescope was configured at source time.
    pub source_mags: IndexMap<String, Option<f64>>,
}

pub fn encode_source(outcome: &SourceOutcome) -> Result<SourceResponse, EncodingError> {
    let attrs = &outcome.attrs;
    Ok(SourceResponse {
        wavelengths: finite_vec(&attrs.wavelengths.in_unit(Unit::Angstrom)?),
        spectrum: finite_vec(&attrs.spectrum),
        source_mags: finite_map(&attrs.source_mags),
    })
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhotometryResponse {
    pub phot_results: IndexMap<String, Option<f64>>,
    pub eff_npix: Option<f64>,
    pub encircled_energies: IndexMap<String, Option<f64>>,
    pub redleak_fracs: IndexMap<String, Option<f64>>,

    /// Packed 2-D.
    pub aper_mask: String,

    /// Packed 2-D, for the requested passband.
    pub source_weights: String,

    /// [xmin, xmax, ymin, ymax] \[arcsec\]
    pub aper_extent: Vec<Option<f64>>,
    pub use_log_source_weights: bool,
}

pub fn encode_photometry(
    outcome: &PhotometryOutcome,
) -> Result<PhotometryResponse, EncodingError> {
    let attrs = &outcome.attrs;
    let encircled_energies = attrs
        .encircled_energies
        .iter()
        .map(|(band, energy)| (band.clone(), energy.and_then(finite)))
        .collect();
    Ok(PhotometryResponse {
        phot_results: finite_map(&outcome.phot_results),
        eff_npix: finite(attrs.eff_npix),
        encircled_energies,
        redleak_fracs: finite_map(&outcome.redleak_fracs),
        aper_mask: packed(&attrs.aper_mask)?,
        source_weights: packed(&attrs.source_weights)?,
        aper_extent: finite_vec(&attrs.aper_extent),
        use_log_source_weights: outcome.use_log_source_weights,
    })
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GrismResponse {
    /// Packed 2-D per-pixel S/N.
    pub grism2d: String,
    pub snr1d: Vec<Option<f64>>,
    pub grism1dx: Vec<Option<f64>>,
}

pub fn encode_grism(outcome: &GrismOutcome) -> Result<GrismResponse, EncodingError> {
    Ok(GrismResponse {
        grism2d: packed(&outcome.grism_2d)?,
        snr1d: finite_vec(&outcome.snr_1d),
        grism1dx: finite_vec(&outcome.grism_1d_x),
    })
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UvmosSpectrumResponse {
    /// \[Å\]
    pub waves: Vec<Option<f64>>,
    pub source_response: Vec<Option<f64>>,
    pub background_response: Vec<Option<f64>>,
    pub extracted_numpixs: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SourcePixelWeightResponse {
    /// Packed 2-D slit image at the target wavelength.
    pub source_detector: String,

    #[serde(rename = "centerPix")]
    pub center_pix: [Option<f64>; 2],
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ShowSlitResponse {
    #[serde(rename = "slitWidth")]
    pub slit_width: Option<f64>,

    #[serde(rename = "slitHeight")]
    pub slit_height: Option<f64>,

    #[serde(rename = "FWHM")]
    pub fwhm: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UvmosResponse {
    /// Exposure time \[s\] or S/N, whichever was solved for.
    #[serde(rename = "snrResults")]
    pub snr_results: Option<f64>,

    pub spectrum: UvmosSpectrumResponse,

    #[serde(rename = "sourcePixelWeight")]
    pub source_pixel_weight: SourcePixelWeightResponse,

    #[serde(rename = "slitWidthPixel")]
    pub slit_width_pixel: Option<f64>,

    #[serde(rename = "slitHeightPixel")]
    pub slit_height_pixel: Option<f64>,

    #[serde(rename = "showSlit")]
    pub show_slit: ShowSlitResponse,
}

pub fn encode_uvmos(outcome: &UvmosOutcome) -> Result<UvmosResponse, EncodingError> {
    let attrs = &outcome.attrs;
    Ok(UvmosResponse {
        snr_results: finite(outcome.snr_result),
        spectrum: UvmosSpectrumResponse {
            waves: finite_vec(&attrs.waves),
            source_response: finite_vec(&attrs.source_spectrum),
            background_response: finite_vec(&attrs.background_spectrum),
            extracted_numpixs: finite(attrs.extracted_numpixs),
        },
        source_pixel_weight: SourcePixelWeightResponse {
            source_detector: packed(&outcome.source_detector)?,
            center_pix: [finite(outcome.center_pix[0]), finite(outcome.center_pix[1])],
        },
        slit_width_pixel: finite(attrs.slit_width_pix),
        slit_height_pixel: finite(attrs.slit_height_pix),
        show_slit: ShowSlitResponse {
            slit_width: in_arcsec(attrs.slit_width)?,
            slit_height: in_arcsec(attrs.slit_height)?,
            fwhm: in_arcsec(attrs.fwhm)?,
        },
    })
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GaiaResponse {
    pub ra: Vec<Option<f64>>,
    pub dec: Vec<Option<f64>>,
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub gs_i: Vec<Option<f64>>,

    /// Packed 2-D scene fluxes, shifted so the minimum is 1.
    #[serde(rename = "_f")]
    pub f: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LightCurveResponse {
    #[serde(rename = "x_sim_castor")]
    pub x_sim: Vec<Option<f64>>,

    #[serde(rename = "y_sim_castor")]
    pub y_sim: Vec<Option<f64>>,
    pub y_error: Vec<Option<f64>>,
    pub xlim: [Option<f64>; 2],
    pub x_transit_model: Vec<Option<f64>>,
    pub y_transit_model: Vec<Option<f64>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TransitResponse {
    pub gaia: GaiaResponse,
    pub ccd_dim: [Option<f64>; 2],
    pub xout: Option<f64>,
    pub yout: Option<f64>,
    pub light_curve: LightCurveResponse,
}

pub fn encode_transit(outcome: &TransitOutcome) -> Result<TransitResponse, EncodingError> {
    let scene = &outcome.scene;
    let lc = &outcome.light_curve;
    Ok(TransitResponse {
        gaia: GaiaResponse {
            ra: finite_vec(&scene.ra),
            dec: finite_vec(&scene.dec),
            x: finite_vec(&scene.x),
            y: finite_vec(&scene.y),
            gs_i: finite_vec(&scene.gs_i),
            f: packed(&outcome.scene_flux)?,
        },
        ccd_dim: [finite(outcome.ccd_dim[0]), finite(outcome.ccd_dim[1])],
        xout: finite(outcome.xout),
        yout: finite(outcome.yout),
        light_curve: LightCurveResponse {
            x_sim: finite_vec(&lc.x_sim),
            y_sim: finite_vec(&lc.y_sim),
            y_error: finite_vec(&lc.y_error),
            xlim: [finite(lc.xlim[0]), finite(lc.xlim[1])],
            x_transit_model: finite_vec(&lc.x_transit_model),
            y_transit_model: finite_vec(&lc.y_transit_model),
        },
    })
}
