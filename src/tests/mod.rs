// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Test helpers shared across the crate: a recording mock of the
//! instrument-simulation library and some canned request bodies.
//!
//! The mock records every library call in order, so tests can assert the
//! dispatcher's fixed operation sequences (e.g. normalize-before vs
//! normalize-after spectral lines). Attribute getters return deterministic
//! fixtures that deliberately include NaN and infinity so encoder
//! sanitization is exercised end to end.

use std::path::Path;
use std::sync::Mutex;

use indexmap::IndexMap;
use ndarray::{array, Array2};
use serde_json::json;

use crate::params::{
    Aperture, ExposureParams, GeocoronalFlux, NormMethod, PhotometryTarget, PixelExtractionBox,
    PlanetModelParams, PredefinedSpectrum, RequestBody, SourceProfile, SpectralLine,
    TelescopeParams,
};
use crate::sim::{
    BackgroundAttrs, GrismAttrs, PassbandCurve, PhotometryAttrs, SceneAttrs, SimulationError,
    Simulator, SourceAttrs, TelescopeAttrs, TransitAttrs, UvmosAttrs,
};
use crate::units::{Quantity, QuantityArray, Unit};

pub(crate) struct MockTelescope {
    pub params: TelescopeParams,
}

pub(crate) struct MockBackground {
    pub custom_mags: Option<IndexMap<String, f64>>,
    pub estimated: bool,
    pub geo: Vec<GeocoronalFlux>,
}

pub(crate) struct MockSource {
    pub profile: SourceProfile,
}

pub(crate) struct MockPhotometry;

pub(crate) struct MockGrism;

pub(crate) struct MockUvmos;

pub(crate) struct MockTransit {
    pub guide_stars_tagged: bool,
}

/// A recording, deterministic stand-in for the simulation library.
#[derive(Default)]
pub(crate) struct MockSim {
    pub calls: Mutex<Vec<String>>,

    /// When set, the named method fails with a canned error.
    pub fail_on: Mutex<Option<&'static str>>,

    /// Initial guide-star tag state for built transits.
    pub scene_pre_tagged: bool,
}

impl MockSim {
    pub fn new() -> MockSim {
        // Surface the dispatchers' log output when a test fails.
        let _ = env_logger::builder().is_test(true).try_init();
        MockSim::default()
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_on(&self, method: &'static str) {
        *self.fail_on.lock().unwrap() = Some(method);
    }

    fn record(&self, call: impl Into<String>) -> Result<(), SimulationError> {
        let call = call.into();
        let name = call.split('(').next().unwrap_or(&call).to_string();
        self.calls.lock().unwrap().push(call);
        match *self.fail_on.lock().unwrap() {
            Some(failing) if failing == name => {
                Err(SimulationError(format!("mock failure in {name}")))
            }
            _ => Ok(()),
        }
    }
}

/// Wavelength and linewidth of the geocoronal \[OII\] 2471 line \[Å\], as the
/// simulation library defaults them.
const GEOCORONAL_WAVELENGTH: f64 = 2471.0;
const GEOCORONAL_LINEWIDTH: f64 = 0.023;

fn bands() -> [&'static str; 3] {
    ["uv", "u", "g"]
}

fn band_map(values: [f64; 3]) -> IndexMap<String, f64> {
    bands()
        .iter()
        .zip(values)
        .map(|(band, value)| (band.to_string(), value))
        .collect()
}

impl Simulator for MockSim {
    type Telescope = MockTelescope;
    type Background = MockBackground;
    type Source = MockSource;
    type Photometry = MockPhotometry;
    type Grism = MockGrism;
    type Uvmos = MockUvmos;
    type Transit = MockTransit;

    fn build_telescope(&self, params: &TelescopeParams) -> Result<MockTelescope, SimulationError> {
        self.record("build_telescope")?;
        Ok(MockTelescope {
            params: params.clone(),
        })
    }

    fn telescope_attrs(&self, telescope: &MockTelescope) -> Result<TelescopeAttrs, SimulationError> {
        self.record("telescope_attrs")?;
        let p = &telescope.params;
        let limits = [[3000.0, 4000.0], [4000.0, 5500.0], [5500.0, 7000.0]];
        let passband_limits = bands()
            .iter()
            .zip(limits)
            .map(|(band, [lo, hi])| {
                (
                    band.to_string(),
                    [
                        Quantity::new(lo, Unit::Angstrom),
                        Quantity::new(hi, Unit::Angstrom),
                    ],
                )
            })
            .collect();
        let full_passband_curves = bands()
            .iter()
            .map(|band| {
                (
                    band.to_string(),
                    PassbandCurve {
                        wavelength: QuantityArray::new(
                            vec![3000.0, 3500.0, 4000.0],
                            Unit::Angstrom,
                        ),
                        response: vec![0.1, 0.5, 0.2],
                    },
                )
            })
            .collect();
        Ok(TelescopeAttrs {
            passband_limits,
            full_passband_curves,
            mirror_diameter: p.mirror_diameter,
            phot_zpts: band_map([24.2, 24.5, 24.9]),
            passband_pivots: bands()
                .iter()
                .zip([3400.0, 4700.0, 6200.0])
                .map(|(band, pivot)| (band.to_string(), Quantity::new(pivot, Unit::Angstrom)))
                .collect(),
            fwhm: p.fwhm,
            px_scale: p.px_scale,
            dark_current: p.dark_current,
            read_noise: p.read_noise,
            redleak_thresholds: p.redleak_thresholds.clone(),
            extinction_coeffs: p.extinction_coeffs.clone(),
        })
    }

    fn build_background(
        &self,
        mags_per_sq_arcsec: Option<&IndexMap<String, f64>>,
    ) -> Result<MockBackground, SimulationError> {
        self.record("build_background")?;
        Ok(MockBackground {
            custom_mags: mags_per_sq_arcsec.cloned(),
            estimated: false,
            geo: vec![],
        })
    }

    fn estimate_sky_mags(
        &self,
        background: &mut MockBackground,
        _telescope: &MockTelescope,
    ) -> Result<(), SimulationError> {
        self.record("estimate_sky_mags")?;
        background.estimated = true;
        Ok(())
    }

    fn add_geocoronal_emission(
        &self,
        background: &mut MockBackground,
        flux: GeocoronalFlux,
    ) -> Result<(), SimulationError> {
        let label = flux.keyword().unwrap_or("custom");
        self.record(format!("add_geocoronal_emission({label})"))?;
        background.geo.push(flux);
        Ok(())
    }

    fn background_attrs(
        &self,
        background: &MockBackground,
    ) -> Result<BackgroundAttrs, SimulationError> {
        self.record("background_attrs")?;
        let mags_per_sq_arcsec = if background.estimated {
            Some(band_map([26.08, 23.74, 22.60]))
        } else {
            background.custom_mags.clone()
        };
        let geo_flux = background
            .geo
            .iter()
            .map(|flux| match flux {
                GeocoronalFlux::High => 3.0e-15,
                GeocoronalFlux::Average => 1.5e-15,
                GeocoronalFlux::Low => 7.5e-16,
                GeocoronalFlux::Custom(value) => *value,
            })
            .collect::<Vec<_>>();
        Ok(BackgroundAttrs {
            mags_per_sq_arcsec,
            geo_wavelength: vec![GEOCORONAL_WAVELENGTH; geo_flux.len()],
            geo_linewidth: vec![GEOCORONAL_LINEWIDTH; geo_flux.len()],
            geo_flux,
        })
    }

    fn build_source(&self, profile: &SourceProfile) -> Result<MockSource, SimulationError> {
        self.record("build_source")?;
        Ok(MockSource {
            profile: profile.clone(),
        })
    }

    fn set_predefined_spectrum(
        &self,
        _source: &mut MockSource,
        spectrum: &PredefinedSpectrum,
    ) -> Result<(), SimulationError> {
        let label = match spectrum {
            PredefinedSpectrum::Elliptical => "elliptical",
            PredefinedSpectrum::Spiral => "spiral",
            PredefinedSpectrum::Blackbody { .. } => "blackbody",
            PredefinedSpectrum::PowerLaw { .. } => "power_law",
            PredefinedSpectrum::Uniform => "uniform",
        };
        self.record(format!("set_predefined_spectrum({label})"))
    }

    fn set_spectrum_from_file(
        &self,
        _source: &mut MockSource,
        path: &Path,
    ) -> Result<(), SimulationError> {
        self.record(format!("set_spectrum_from_file({})", path.display()))
    }

    fn redshift_wavelengths(
        &self,
        _source: &mut MockSource,
        redshift: f64,
    ) -> Result<(), SimulationError> {
        self.record(format!("redshift_wavelengths({redshift})"))
    }

    fn normalize_spectrum(
        &self,
        _source: &mut MockSource,
        _method: &NormMethod,
    ) -> Result<(), SimulationError> {
        self.record("normalize_spectrum")
    }

    fn add_spectral_line(
        &self,
        _source: &mut MockSource,
        line: &SpectralLine,
    ) -> Result<(), SimulationError> {
        self.record(format!("add_spectral_line({})", line.center.value))
    }

    fn source_is_point(&self, source: &MockSource) -> bool {
        source.profile == SourceProfile::Point
    }

    fn source_attrs(
        &self,
        _source: &MockSource,
        telescope: Option<&MockTelescope>,
    ) -> Result<SourceAttrs, SimulationError> {
        self.record("source_attrs")?;
        Ok(SourceAttrs {
            wavelengths: QuantityArray::new(vec![1000.0, 2000.0, 3000.0], Unit::Angstrom),
            spectrum: vec![1.0, 2.0, 3.0],
            source_mags: if telescope.is_some() {
                band_map([24.1, 23.5, 22.9])
            } else {
                IndexMap::new()
            },
        })
    }

    fn redleak_fracs(
        &self,
        _source: &MockSource,
        _telescope: &MockTelescope,
    ) -> Result<IndexMap<String, f64>, SimulationError> {
        self.record("redleak_fracs")?;
        // One infinite entry to exercise sanitization.
        Ok(band_map([1.0e-12, f64::INFINITY, 1.0e-10]))
    }

    fn build_photometry(
        &self,
        _telescope: &MockTelescope,
        _source: &MockSource,
        _background: &MockBackground,
    ) -> Result<MockPhotometry, SimulationError> {
        self.record("build_photometry")?;
        Ok(MockPhotometry)
    }

    fn use_aperture(
        &self,
        _photometry: &mut MockPhotometry,
        aperture: &Aperture,
    ) -> Result<(), SimulationError> {
        let label = match aperture {
            Aperture::Optimal { .. } => "optimal",
            Aperture::Elliptical { .. } => "elliptical",
            Aperture::Rectangular { .. } => "rectangular",
        };
        self.record(format!("use_aperture({label})"))
    }

    fn calc_snr_or_t(
        &self,
        _photometry: &mut MockPhotometry,
        target: PhotometryTarget,
        _reddening: f64,
    ) -> Result<IndexMap<String, f64>, SimulationError> {
        let label = match target {
            PhotometryTarget::Snr(_) => "snr",
            PhotometryTarget::ExposureTime(_) => "t",
        };
        self.record(format!("calc_snr_or_t({label})"))?;
        // A NaN result happens in practice, e.g. zero-signal passbands.
        Ok(band_map([10.5, f64::NAN, 7.1]))
    }

    fn photometry_attrs(
        &self,
        _photometry: &MockPhotometry,
        _source_weights_passband: &str,
    ) -> Result<PhotometryAttrs, SimulationError> {
        self.record("photometry_attrs")?;
        let mut encircled_energies = IndexMap::new();
        encircled_energies.insert("uv".to_string(), Some(0.8));
        encircled_energies.insert("u".to_string(), None);
        encircled_energies.insert("g".to_string(), Some(0.7));
        Ok(PhotometryAttrs {
            eff_npix: 42.3,
            encircled_energies,
            aper_mask: array![[1.0, 0.0], [f64::NAN, 1.0]],
            source_weights: array![[0.25, 0.5], [0.75, 1.0]],
            aper_extent: vec![-1.0, 1.0, -1.0, 1.0],
        })
    }

    fn build_grism(
        &self,
        _telescope: &MockTelescope,
        _source: &MockSource,
        _background: &MockBackground,
    ) -> Result<MockGrism, SimulationError> {
        self.record("build_grism")?;
        Ok(MockGrism)
    }

    fn disperse(&self, _grism: &mut MockGrism, channel: &str) -> Result<(), SimulationError> {
        self.record(format!("disperse({channel})"))
    }

    fn expose(
        &self,
        _grism: &mut MockGrism,
        exposure_time: Quantity,
    ) -> Result<(), SimulationError> {
        self.record(format!("expose({})", exposure_time.value))
    }

    fn total_noise(
        &self,
        _grism: &mut MockGrism,
        nreads: u32,
        nbin: u32,
    ) -> Result<(), SimulationError> {
        self.record(format!("total_noise({nreads},{nbin})"))
    }

    fn grism_attrs(&self, _grism: &MockGrism) -> Result<GrismAttrs, SimulationError> {
        self.record("grism_attrs")?;
        // 5 spatial rows × 4 spectral columns; row r, column c holds
        // (r+1)·(c+1) so windowed sums are easy to check by hand.
        let box_count = Array2::from_shape_fn((5, 4), |(r, c)| ((r + 1) * (c + 1)) as f64);
        let noise_total = Array2::from_elem((5, 4), 2.0);
        Ok(GrismAttrs {
            box_count,
            noise_total,
            source_image_rows: 3,
        })
    }

    fn build_uvmos(
        &self,
        _telescope: &MockTelescope,
        _source: &MockSource,
        _background: &MockBackground,
    ) -> Result<MockUvmos, SimulationError> {
        self.record("build_uvmos")?;
        Ok(MockUvmos)
    }

    fn set_wavelength_range(
        &self,
        _uvmos: &mut MockUvmos,
        min: Quantity,
        max: Quantity,
    ) -> Result<(), SimulationError> {
        self.record(format!("set_wavelength_range({},{})", min.value, max.value))
    }

    fn specify_slit(
        &self,
        _uvmos: &mut MockUvmos,
        width: Quantity,
        height: Quantity,
    ) -> Result<(), SimulationError> {
        self.record(format!("specify_slit({},{})", width.value, height.value))
    }

    fn extract_spectra(
        &self,
        _uvmos: &mut MockUvmos,
        extraction_box: PixelExtractionBox,
    ) -> Result<(), SimulationError> {
        self.record(format!(
            "extract_spectra({},{},{:?})",
            extraction_box.width, extraction_box.lower_lim, extraction_box.upper_lim
        ))
    }

    fn calc_t_from_snr(
        &self,
        _uvmos: &MockUvmos,
        snr: f64,
        _wavelength: Quantity,
    ) -> Result<f64, SimulationError> {
        self.record(format!("calc_t_from_snr({snr})"))?;
        Ok(1234.5)
    }

    fn calc_snr_from_t(
        &self,
        _uvmos: &MockUvmos,
        t: f64,
        _wavelength: Quantity,
    ) -> Result<f64, SimulationError> {
        self.record(format!("calc_snr_from_t({t})"))?;
        Ok(5.5)
    }

    fn slit_image(
        &self,
        _uvmos: &MockUvmos,
        wavelength: Quantity,
    ) -> Result<(Array2<f64>, [f64; 2]), SimulationError> {
        self.record(format!("slit_image({})", wavelength.value))?;
        Ok((array![[0.1, 0.2], [0.3, 0.4]], [8.0, 50.0]))
    }

    fn uvmos_attrs(&self, _uvmos: &MockUvmos) -> Result<UvmosAttrs, SimulationError> {
        self.record("uvmos_attrs")?;
        Ok(UvmosAttrs {
            waves: vec![1500.0, 2000.0, 2500.0],
            source_spectrum: vec![10.0, 20.0, 30.0],
            background_spectrum: vec![1.0, 1.5, 2.0],
            extracted_numpixs: 36.0,
            slit_width_pix: 7.5,
            slit_height_pix: 100.0,
            slit_width: Quantity::new(0.75, Unit::Arcsec),
            slit_height: Quantity::new(10.0, Unit::Arcsec),
            fwhm: Quantity::new(0.15, Unit::Arcsec),
        })
    }

    fn build_transit(
        &self,
        _telescope: &MockTelescope,
        _source: &MockSource,
        _background: &MockBackground,
    ) -> Result<MockTransit, SimulationError> {
        self.record("build_transit")?;
        Ok(MockTransit {
            guide_stars_tagged: self.scene_pre_tagged,
        })
    }

    fn specify_bandpass(
        &self,
        _transit: &mut MockTransit,
        passband_name: &str,
    ) -> Result<(), SimulationError> {
        self.record(format!("specify_bandpass({passband_name})"))
    }

    fn scene_sim(&self, _transit: &mut MockTransit) -> Result<(), SimulationError> {
        self.record("scene_sim")
    }

    fn guide_stars_tagged(&self, transit: &MockTransit) -> bool {
        transit.guide_stars_tagged
    }

    fn id_guide_stars(&self, transit: &mut MockTransit) -> Result<(), SimulationError> {
        self.record("id_guide_stars")?;
        transit.guide_stars_tagged = true;
        Ok(())
    }

    fn specify_exposure_parameters(
        &self,
        _transit: &mut MockTransit,
        exposure: &ExposureParams,
    ) -> Result<(), SimulationError> {
        self.record(format!(
            "specify_exposure_parameters({},{})",
            exposure.exptime.value, exposure.nstack
        ))
    }

    fn specify_planet_model(
        &self,
        _transit: &mut MockTransit,
        planet_model: &PlanetModelParams,
    ) -> Result<(), SimulationError> {
        self.record(format!("specify_planet_model({})", planet_model.rprs))
    }

    fn lc_sim(&self, _transit: &mut MockTransit) -> Result<(), SimulationError> {
        self.record("lc_sim")
    }

    fn calc_planet_model(
        &self,
        _transit: &MockTransit,
        t_grid: &[f64],
        _exp_time: f64,
    ) -> Result<Vec<f64>, SimulationError> {
        self.record("calc_planet_model")?;
        Ok(vec![-0.002; t_grid.len()])
    }

    fn transit_attrs(&self, _transit: &MockTransit) -> Result<TransitAttrs, SimulationError> {
        self.record("transit_attrs")?;
        Ok(TransitAttrs {
            scene: SceneAttrs {
                ra: vec![150.1, 150.2],
                dec: vec![2.1, 2.2],
                x: vec![1024.0, 1100.0],
                y: vec![1024.0, 980.0],
                gs_i: vec![1.0],
                flux: array![[2.0, 3.0], [4.0, 5.0]],
            },
            ccd_dim: [2048.0, 2048.0],
            xout: 100.0,
            yout: 100.0,
            lc_t: vec![0.0, 0.1, 0.2, 0.3],
            lc_fl: vec![1.0, 0.998, 0.999, 1.001],
            lc_err: vec![1.0e-4, 1.1e-4, 1.2e-4, 1.3e-4],
        })
    }
}

/// A valid telescope request body.
pub(crate) fn telescope_body() -> RequestBody {
    RequestBody::Json(json!({
        "fwhm": 0.15,
        "pxScale": 0.1,
        "mirrorDiameter": 100,
        "darkCurrent": 1.0e-4,
        "readNoise": 3.0,
        "redleakThresholds": {"uv": 3880, "u": 4730, "g": 5660},
        "extinctionCoeffs": {"uv": 7.06, "u": 4.35, "g": 3.31},
    }))
}

/// A valid background request body with one geocoronal line.
pub(crate) fn background_body() -> RequestBody {
    RequestBody::Json(json!({
        "useDefaultSkyBackground": "false",
        "customSkyBackground": {"uv": 26.08, "u": 23.74, "g": 22.60},
        "geocoronalEmission": [{"flux": "Average"}],
    }))
}

/// A valid point-source request body with two spectral lines.
pub(crate) fn point_source_body() -> RequestBody {
    RequestBody::Json(json!({
        "sourceType": "point",
        "physicalParameters": {"point": {}},
        "predefinedSpectrum": "blackbody",
        "predefinedSpectrumParameters": {"blackbody": {"temperature": 5800}},
        "customSpectrum": "",
        "redshift": 0.0,
        "spectralLines": [
            {"center": 6563, "fwhm": 10, "peak": 1.0e-15,
             "type": "emission", "shape": "gaussian"},
            {"center": 4861, "fwhm": 8, "peak": 5.0e-16,
             "type": "emission", "shape": "gaussian"},
        ],
        "normMethod": "totalMag",
        "normParams": {"totalMag": {"mag": 22.0}},
        "isNormAfterSpectralLines": "false",
    }))
}

/// A valid photometry request body asking for exposure time from S/N.
pub(crate) fn photometry_body() -> RequestBody {
    RequestBody::Json(json!({
        "sourceWeightsPassband": "uv",
        "reddening": 0.0,
        "aperShape": "optimal",
        "aperParams": {"optimal": {"factor": 1.4}},
        "photInput": {"val_type": "snr", "val": 10},
    }))
}
