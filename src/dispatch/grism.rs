// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::debug;
use ndarray::{s, Array2, Axis};

use super::{prerequisites, DispatchError};
use crate::constants::{GRISM_NBIN, GRISM_NREADS};
use crate::params::GrismParams;
use crate::session::{Session, Slot};
use crate::sim::Simulator;

#[derive(Debug)]
pub struct GrismOutcome {
    /// Per-pixel S/N over the grism box.
    pub grism_2d: Array2<f64>,

    /// Per-column S/N, summed over the source rows.
    pub snr_1d: Vec<f64>,

    /// Column indices, parallel to `snr_1d`.
    pub grism_1d_x: Vec<f64>,
}

/// Run grism spectroscopy and store the grism object. The 1-D S/N sums the
/// signal over a row window of half the source image either side of the box
/// centre and adds the noise in quadrature over the same window.
pub fn run_grism<S: Simulator>(
    params: &GrismParams,
    session: &mut Session<S>,
    sim: &S,
) -> Result<GrismOutcome, DispatchError> {
    debug!("grism params: {params:?}");

    let (grism, outcome) = {
        let (telescope, source, background) = prerequisites(session, Slot::Grism)?;

        let mut grism = sim.build_grism(telescope, source, background)?;
        sim.disperse(&mut grism, &params.channel)?;
        sim.expose(&mut grism, params.exposure_time)?;
        sim.total_noise(&mut grism, GRISM_NREADS, GRISM_NBIN)?;

        let attrs = sim.grism_attrs(&grism)?;
        let nrows = attrs.box_count.nrows();
        let box_center = (nrows.saturating_sub(1)) / 2;
        let half_source = (attrs.source_image_rows.saturating_sub(1)) / 2;
        let lo = box_center.saturating_sub(half_source);
        let hi = usize::min(box_center + half_source + 1, nrows);

        let signal = attrs.box_count.slice(s![lo..hi, ..]).sum_axis(Axis(0));
        let noise = attrs
            .noise_total
            .slice(s![lo..hi, ..])
            .mapv(|n| n * n)
            .sum_axis(Axis(0))
            .mapv(f64::sqrt);
        let snr_1d = signal
            .iter()
            .zip(noise.iter())
            .map(|(s, n)| s / n)
            .collect::<Vec<_>>();
        let grism_1d_x = (0..snr_1d.len()).map(|i| i as f64).collect();
        let grism_2d = &attrs.box_count / &attrs.noise_total;

        (
            grism,
            GrismOutcome {
                grism_2d,
                snr_1d,
                grism_1d_x,
            },
        )
    };

    session.grism = Some(grism);
    Ok(outcome)
}
