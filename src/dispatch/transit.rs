// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::debug;
use ndarray::Array2;

use super::{prerequisites, DispatchError};
use crate::constants::TRANSIT_MODEL_GRID_LEN;
use crate::params::TransitParams;
use crate::session::{Session, Slot};
use crate::sim::{SceneAttrs, Simulator};

/// The plotting-ready light curve: times are centred on the observation
/// midpoint \[days\] and fluxes are offset to zero and scaled to parts per
/// thousand.
#[derive(Debug)]
pub struct LightCurve {
    pub x_sim: Vec<f64>,
    pub y_sim: Vec<f64>,
    pub y_error: Vec<f64>,

    /// Plot x-limits, padded by half a cadence step on each side.
    pub xlim: [f64; 2],

    pub x_transit_model: Vec<f64>,
    pub y_transit_model: Vec<f64>,
}

#[derive(Debug)]
pub struct TransitOutcome {
    pub scene: SceneAttrs,

    /// Scene fluxes shifted so the minimum is 1 (for log-scale display).
    pub scene_flux: Array2<f64>,

    pub ccd_dim: [f64; 2],
    pub xout: f64,
    pub yout: f64,
    pub light_curve: LightCurve,
}

/// Run the transit simulation and store the observation object. Guide stars
/// are only identified when the scene does not already carry tags.
pub fn run_transit<S: Simulator>(
    params: &TransitParams,
    session: &mut Session<S>,
    sim: &S,
) -> Result<TransitOutcome, DispatchError> {
    debug!("transit params: {params:?}");

    let (transit, outcome) = {
        let (telescope, source, background) = prerequisites(session, Slot::Transit)?;

        let mut transit = sim.build_transit(telescope, source, background)?;
        sim.specify_bandpass(&mut transit, &params.bandpass_id)?;
        sim.scene_sim(&mut transit)?;
        if !sim.guide_stars_tagged(&transit) {
            sim.id_guide_stars(&mut transit)?;
        }
        sim.specify_exposure_parameters(&mut transit, &params.exposure)?;
        sim.specify_planet_model(&mut transit, &params.planet_model)?;
        sim.lc_sim(&mut transit)?;

        let attrs = sim.transit_attrs(&transit)?;
        let light_curve = light_curve(sim, &transit, &attrs.lc_t, &attrs.lc_fl, &attrs.lc_err)?;

        let flux_min = attrs
            .scene
            .flux
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let scene_flux = attrs.scene.flux.mapv(|f| f - flux_min + 1.0);

        (
            transit,
            TransitOutcome {
                scene: attrs.scene,
                scene_flux,
                ccd_dim: attrs.ccd_dim,
                xout: attrs.xout,
                yout: attrs.yout,
                light_curve,
            },
        )
    };

    session.transit = Some(transit);
    Ok(outcome)
}

fn light_curve<S: Simulator>(
    sim: &S,
    transit: &S::Transit,
    lc_t: &[f64],
    lc_fl: &[f64],
    lc_err: &[f64],
) -> Result<LightCurve, DispatchError> {
    let (t_first, t_last) = match (lc_t.first(), lc_t.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => (0.0, 0.0),
    };
    let t_offset = -(t_last - t_first) / 2.0;
    let y_offset = -1.0;
    let y_scale = 1.0e3;

    let x_sim = lc_t.iter().map(|t| t + t_offset).collect();
    let y_sim = lc_fl.iter().map(|f| (f + y_offset) * y_scale).collect();
    let y_error = lc_err.iter().map(|e| e * y_scale).collect();

    // The model curve is evaluated on a dense uniform grid over the same
    // time span, with exp_time = -1 meaning "instantaneous".
    let n = TRANSIT_MODEL_GRID_LEN;
    let t_grid = (0..n)
        .map(|i| t_first + (t_last - t_first) * i as f64 / (n - 1) as f64)
        .collect::<Vec<_>>();
    let model = sim.calc_planet_model(transit, &t_grid, -1.0)?;
    let x_transit_model = t_grid.iter().map(|t| t + t_offset).collect();
    let y_transit_model = model
        .iter()
        .map(|m| (m + 1.0 + y_offset) * y_scale)
        .collect();

    let cadence = if lc_t.len() > 1 { lc_t[1] - lc_t[0] } else { 0.0 };
    let xlim = [
        t_first + t_offset - 0.5 * cadence,
        t_last + t_offset + 0.5 * cadence,
    ];

    Ok(LightCurve {
        x_sim,
        y_sim,
        y_error,
        xlim,
        x_transit_model,
        y_transit_model,
    })
}
