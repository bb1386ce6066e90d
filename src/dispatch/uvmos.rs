// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::debug;
use ndarray::Array2;

use super::{prerequisites, DispatchError};
use crate::params::{UvmosParams, UvmosTarget};
use crate::session::{Session, Slot};
use crate::sim::{Simulator, UvmosAttrs};
use crate::units::{Quantity, Unit};

#[derive(Debug)]
pub struct UvmosOutcome {
    /// Exposure time \[s\] when solving from S/N, or S/N when solving from
    /// time.
    pub snr_result: f64,

    pub attrs: UvmosAttrs,

    /// The slit image at the target wavelength.
    pub source_detector: Array2<f64>,

    /// Centre pixel coordinates of the slit image.
    pub center_pix: [f64; 2],
}

/// Run slit spectroscopy and store the spectroscopy object. Wavelengths
/// arrive in nanometres and are handed to the library in angstroms; the
/// extraction box is resolved to whole pixels using the telescope's pixel
/// scale.
pub fn run_uvmos<S: Simulator>(
    params: &UvmosParams,
    session: &mut Session<S>,
    sim: &S,
) -> Result<UvmosOutcome, DispatchError> {
    debug!("uvmos params: {params:?}");

    let (uvmos, outcome) = {
        let (telescope, source, background) = prerequisites(session, Slot::Uvmos)?;

        let px_scale = sim.telescope_attrs(telescope)?.px_scale.value;
        let angstrom = |q: Quantity| -> Result<Quantity, DispatchError> {
            Ok(Quantity::new(q.in_unit(Unit::Angstrom)?, Unit::Angstrom))
        };

        let mut uvmos = sim.build_uvmos(telescope, source, background)?;
        sim.set_wavelength_range(
            &mut uvmos,
            angstrom(params.min_wavelength)?,
            angstrom(params.max_wavelength)?,
        )?;
        sim.specify_slit(&mut uvmos, params.slit_width, params.slit_height)?;
        sim.extract_spectra(&mut uvmos, params.extraction_box.to_pixels(px_scale))?;

        let wavelength = angstrom(params.target_wavelength)?;
        let snr_result = match params.target {
            UvmosTarget::Snr(snr) => sim.calc_t_from_snr(&uvmos, snr, wavelength)?,
            UvmosTarget::ExposureTime(t) => sim.calc_snr_from_t(&uvmos, t, wavelength)?,
        };

        let (source_detector, center_pix) = sim.slit_image(&uvmos, wavelength)?;
        let attrs = sim.uvmos_attrs(&uvmos)?;

        (
            uvmos,
            UvmosOutcome {
                snr_result,
                attrs,
                source_detector,
                center_pix,
            },
        )
    };

    session.uvmos = Some(uvmos);
    Ok(outcome)
}
