// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The boundary to the instrument-simulation library.
//!
//! All physical and numerical modelling lives behind [`Simulator`]; this
//! crate only ever sees the library through the trait's constructors,
//! fixed-order operations and attribute getters. The stage-object handles
//! are associated types, so a session is generic over whichever library
//! implementation the host wires in; tests use a recording mock.
//!
//! The attribute structs returned here are crate-owned projections of the
//! library's documented public attributes. Internal state of the library's
//! objects is never inspected.

mod error;

pub use error::SimulationError;

use indexmap::IndexMap;
use ndarray::Array2;

use crate::params::{
    Aperture, GeocoronalFlux, NormMethod, PhotometryTarget, PixelExtractionBox,
    PredefinedSpectrum, SourceProfile, SpectralLine, TelescopeParams,
};
use crate::params::{ExposureParams, PlanetModelParams};
use crate::units::{Quantity, QuantityArray};
use std::path::Path;

/// One passband response curve.
#[derive(Debug, Clone, PartialEq)]
pub struct PassbandCurve {
    pub wavelength: QuantityArray,
    pub response: Vec<f64>,
}

/// The telescope attributes the API reports.
#[derive(Debug, Clone, PartialEq)]
pub struct TelescopeAttrs {
    /// Lower/upper wavelength limit per passband.
    pub passband_limits: IndexMap<String, [Quantity; 2]>,
    pub full_passband_curves: IndexMap<String, PassbandCurve>,
    pub mirror_diameter: Quantity,
    pub phot_zpts: IndexMap<String, f64>,
    pub passband_pivots: IndexMap<String, Quantity>,
    pub fwhm: Quantity,
    pub px_scale: Quantity,
    pub dark_current: f64,
    pub read_noise: f64,
    pub redleak_thresholds: IndexMap<String, Quantity>,
    pub extinction_coeffs: IndexMap<String, f64>,
}

/// The background attributes the API reports. Geocoronal arrays are indexed
/// by insertion order of the emission lines.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundAttrs {
    /// Per-passband sky brightness \[AB mag/arcsec²\]; absent when neither
    /// supplied nor estimated.
    pub mags_per_sq_arcsec: Option<IndexMap<String, f64>>,

    /// \[erg/s/cm²/arcsec²\]
    pub geo_flux: Vec<f64>,

    /// \[Å\]
    pub geo_wavelength: Vec<f64>,

    /// \[Å\]
    pub geo_linewidth: Vec<f64>,
}

/// The source attributes the API reports.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAttrs {
    pub wavelengths: QuantityArray,
    pub spectrum: Vec<f64>,

    /// AB magnitude per passband; empty when no telescope is configured.
    pub source_mags: IndexMap<String, f64>,
}

/// The photometry attributes the API reports (besides the S/N results).
#[derive(Debug, Clone, PartialEq)]
pub struct PhotometryAttrs {
    pub eff_npix: f64,
    pub encircled_energies: IndexMap<String, Option<f64>>,
    pub aper_mask: Array2<f64>,

    /// Source weights for the passband requested for display.
    pub source_weights: Array2<f64>,

    /// [xmin, xmax, ymin, ymax] of the aperture \[arcsec\].
    pub aper_extent: Vec<f64>,
}

/// Raw grism products; the dispatcher derives the 1-D/2-D S/N views.
#[derive(Debug, Clone, PartialEq)]
pub struct GrismAttrs {
    /// Integrated counts in the grism box, row-major (spatial × spectral).
    pub box_count: Array2<f64>,

    /// Total noise per pixel, same shape as `box_count`.
    pub noise_total: Array2<f64>,

    /// Number of rows in the (square) source image.
    pub source_image_rows: usize,
}

/// The slit-spectroscopy attributes the API reports.
#[derive(Debug, Clone, PartialEq)]
pub struct UvmosAttrs {
    /// \[Å\]
    pub waves: Vec<f64>,
    pub source_spectrum: Vec<f64>,
    pub background_spectrum: Vec<f64>,
    pub extracted_numpixs: f64,
    pub slit_width_pix: f64,
    pub slit_height_pix: f64,
    pub slit_width: Quantity,
    pub slit_height: Quantity,
    pub fwhm: Quantity,
}

/// The star-field scene around the transit target.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneAttrs {
    pub ra: Vec<f64>,
    pub dec: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,

    /// Indices of identified guide stars.
    pub gs_i: Vec<f64>,

    /// Simulated scene fluxes (2-D image).
    pub flux: Array2<f64>,
}

/// Transit products; the dispatcher derives the plotting-ready arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitAttrs {
    pub scene: SceneAttrs,
    pub ccd_dim: [f64; 2],
    pub xout: f64,
    pub yout: f64,

    /// Light-curve sample times \[days\].
    pub lc_t: Vec<f64>,

    /// Relative fluxes of the first planet model, parallel to `lc_t`.
    pub lc_fl: Vec<f64>,

    /// Flux uncertainties, parallel to `lc_t`.
    pub lc_err: Vec<f64>,
}

/// The instrument-simulation library. One method per documented constructor
/// or operation; every fallible call returns a [`SimulationError`] carrying
/// the library's message.
pub trait Simulator {
    type Telescope;
    type Background;
    type Source;
    type Photometry;
    type Grism;
    type Uvmos;
    type Transit;

    // Telescope.
    fn build_telescope(
        &self,
        params: &TelescopeParams,
    ) -> Result<Self::Telescope, SimulationError>;
    fn telescope_attrs(
        &self,
        telescope: &Self::Telescope,
    ) -> Result<TelescopeAttrs, SimulationError>;

    // Background.
    fn build_background(
        &self,
        mags_per_sq_arcsec: Option<&IndexMap<String, f64>>,
    ) -> Result<Self::Background, SimulationError>;
    fn estimate_sky_mags(
        &self,
        background: &mut Self::Background,
        telescope: &Self::Telescope,
    ) -> Result<(), SimulationError>;
    fn add_geocoronal_emission(
        &self,
        background: &mut Self::Background,
        flux: GeocoronalFlux,
    ) -> Result<(), SimulationError>;
    fn background_attrs(
        &self,
        background: &Self::Background,
    ) -> Result<BackgroundAttrs, SimulationError>;

    // Source.
    fn build_source(&self, profile: &SourceProfile) -> Result<Self::Source, SimulationError>;
    fn set_predefined_spectrum(
        &self,
        source: &mut Self::Source,
        spectrum: &PredefinedSpectrum,
    ) -> Result<(), SimulationError>;
    fn set_spectrum_from_file(
        &self,
        source: &mut Self::Source,
        path: &Path,
    ) -> Result<(), SimulationError>;
    fn redshift_wavelengths(
        &self,
        source: &mut Self::Source,
        redshift: f64,
    ) -> Result<(), SimulationError>;
    fn normalize_spectrum(
        &self,
        source: &mut Self::Source,
        method: &NormMethod,
    ) -> Result<(), SimulationError>;
    fn add_spectral_line(
        &self,
        source: &mut Self::Source,
        line: &SpectralLine,
    ) -> Result<(), SimulationError>;
    fn source_is_point(&self, source: &Self::Source) -> bool;
    fn source_attrs(
        &self,
        source: &Self::Source,
        telescope: Option<&Self::Telescope>,
    ) -> Result<SourceAttrs, SimulationError>;
    fn redleak_fracs(
        &self,
        source: &Self::Source,
        telescope: &Self::Telescope,
    ) -> Result<IndexMap<String, f64>, SimulationError>;

    // Photometry.
    fn build_photometry(
        &self,
        telescope: &Self::Telescope,
        source: &Self::Source,
        background: &Self::Background,
    ) -> Result<Self::Photometry, SimulationError>;
    fn use_aperture(
        &self,
        photometry: &mut Self::Photometry,
        aperture: &Aperture,
    ) -> Result<(), SimulationError>;
    fn calc_snr_or_t(
        &self,
        photometry: &mut Self::Photometry,
        target: PhotometryTarget,
        reddening: f64,
    ) -> Result<IndexMap<String, f64>, SimulationError>;
    fn photometry_attrs(
        &self,
        photometry: &Self::Photometry,
        source_weights_passband: &str,
    ) -> Result<PhotometryAttrs, SimulationError>;

    // Grism spectroscopy.
    fn build_grism(
        &self,
        telescope: &Self::Telescope,
        source: &Self::Source,
        background: &Self::Background,
    ) -> Result<Self::Grism, SimulationError>;
    fn disperse(&self, grism: &mut Self::Grism, channel: &str) -> Result<(), SimulationError>;
    fn expose(&self, grism: &mut Self::Grism, exposure_time: Quantity)
        -> Result<(), SimulationError>;
    fn total_noise(
        &self,
        grism: &mut Self::Grism,
        nreads: u32,
        nbin: u32,
    ) -> Result<(), SimulationError>;
    fn grism_attrs(&self, grism: &Self::Grism) -> Result<GrismAttrs, SimulationError>;

    // Slit/MOS spectroscopy.
    fn build_uvmos(
        &self,
        telescope: &Self::Telescope,
        source: &Self::Source,
        background: &Self::Background,
    ) -> Result<Self::Uvmos, SimulationError>;
    fn set_wavelength_range(
        &self,
        uvmos: &mut Self::Uvmos,
        min: Quantity,
        max: Quantity,
    ) -> Result<(), SimulationError>;
    fn specify_slit(
        &self,
        uvmos: &mut Self::Uvmos,
        width: Quantity,
        height: Quantity,
    ) -> Result<(), SimulationError>;
    fn extract_spectra(
        &self,
        uvmos: &mut Self::Uvmos,
        extraction_box: PixelExtractionBox,
    ) -> Result<(), SimulationError>;
    fn calc_t_from_snr(
        &self,
        uvmos: &Self::Uvmos,
        snr: f64,
        wavelength: Quantity,
    ) -> Result<f64, SimulationError>;
    fn calc_snr_from_t(
        &self,
        uvmos: &Self::Uvmos,
        t: f64,
        wavelength: Quantity,
    ) -> Result<f64, SimulationError>;

    /// The slit image at a wavelength, plus the centre pixel coordinates.
    fn slit_image(
        &self,
        uvmos: &Self::Uvmos,
        wavelength: Quantity,
    ) -> Result<(Array2<f64>, [f64; 2]), SimulationError>;
    fn uvmos_attrs(&self, uvmos: &Self::Uvmos) -> Result<UvmosAttrs, SimulationError>;

    // Transit photometry.
    fn build_transit(
        &self,
        telescope: &Self::Telescope,
        source: &Self::Source,
        background: &Self::Background,
    ) -> Result<Self::Transit, SimulationError>;
    fn specify_bandpass(
        &self,
        transit: &mut Self::Transit,
        passband_name: &str,
    ) -> Result<(), SimulationError>;
    fn scene_sim(&self, transit: &mut Self::Transit) -> Result<(), SimulationError>;

    /// Whether the scene already has guide stars tagged.
    fn guide_stars_tagged(&self, transit: &Self::Transit) -> bool;
    fn id_guide_stars(&self, transit: &mut Self::Transit) -> Result<(), SimulationError>;
    fn specify_exposure_parameters(
        &self,
        transit: &mut Self::Transit,
        exposure: &ExposureParams,
    ) -> Result<(), SimulationError>;
    fn specify_planet_model(
        &self,
        transit: &mut Self::Transit,
        planet_model: &PlanetModelParams,
    ) -> Result<(), SimulationError>;
    fn lc_sim(&self, transit: &mut Self::Transit) -> Result<(), SimulationError>;

    /// The model light curve evaluated on `t_grid` \[days\].
    fn calc_planet_model(
        &self,
        transit: &Self::Transit,
        t_grid: &[f64],
        exp_time: f64,
    ) -> Result<Vec<f64>, SimulationError>;
    fn transit_attrs(&self, transit: &Self::Transit) -> Result<TransitAttrs, SimulationError>;
}
