// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::debug;

use super::DispatchError;
use crate::params::TelescopeParams;
use crate::session::Session;
use crate::sim::{Simulator, TelescopeAttrs};

#[derive(Debug)]
pub struct TelescopeOutcome {
    pub attrs: TelescopeAttrs,
}

/// Build a telescope and store it. No prerequisites.
pub fn run_telescope<S: Simulator>(
    params: &TelescopeParams,
    session: &mut Session<S>,
    sim: &S,
) -> Result<TelescopeOutcome, DispatchError> {
    debug!("telescope params: {params:?}");
    let telescope = sim.build_telescope(params)?;
    let attrs = sim.telescope_attrs(&telescope)?;
    session.telescope = Some(telescope);
    Ok(TelescopeOutcome { attrs })
}
