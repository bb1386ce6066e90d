// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::debug;

use super::DispatchError;
use crate::params::BackgroundParams;
use crate::session::Session;
use crate::sim::{BackgroundAttrs, Simulator};

#[derive(Debug)]
pub struct BackgroundOutcome {
    pub attrs: BackgroundAttrs,
}

/// Build a sky background and store it. When default sky magnitudes are
/// requested and a telescope is configured, they are estimated for its
/// passbands; without a telescope they are simply absent. Geocoronal lines
/// are added afterwards, in request order.
pub fn run_background<S: Simulator>(
    params: &BackgroundParams,
    session: &mut Session<S>,
    sim: &S,
) -> Result<BackgroundOutcome, DispatchError> {
    debug!("background params: {params:?}");
    let mut background = sim.build_background(params.custom_sky_background.as_ref())?;
    if params.use_default_sky_background {
        if let Some(telescope) = &session.telescope {
            sim.estimate_sky_mags(&mut background, telescope)?;
        }
    }
    for &flux in &params.geocoronal_emission {
        sim.add_geocoronal_emission(&mut background, flux)?;
    }
    let attrs = sim.background_attrs(&background)?;
    session.background = Some(background);
    Ok(BackgroundOutcome { attrs })
}
