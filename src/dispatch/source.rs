// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::debug;

use super::DispatchError;
use crate::params::{NormMethod, SourceParams};
use crate::session::Session;
use crate::sim::{Simulator, SourceAttrs};

#[derive(Debug)]
pub struct SourceOutcome {
    pub attrs: SourceAttrs,
}

/// Build a source and store it. The operation order is significant: a
/// custom spectrum file beats the predefined spectrum, the redshift is
/// applied before any lines, and normalization runs either before or after
/// the spectral lines depending on `norm_after_spectral_lines` (lines added
/// after normalization are not scaled by it).
pub fn run_source<S: Simulator>(
    params: &SourceParams,
    session: &mut Session<S>,
    sim: &S,
) -> Result<SourceOutcome, DispatchError> {
    debug!("source params: {params:?}");
    let mut source = sim.build_source(&params.profile)?;

    match &params.custom_spectrum {
        Some(path) => sim.set_spectrum_from_file(&mut source, path)?,
        None => sim.set_predefined_spectrum(&mut source, &params.predefined_spectrum)?,
    }

    sim.redshift_wavelengths(&mut source, params.redshift)?;

    let normalize = params.norm_method != NormMethod::None;
    if normalize && !params.norm_after_spectral_lines {
        sim.normalize_spectrum(&mut source, &params.norm_method)?;
    }
    for line in &params.spectral_lines {
        sim.add_spectral_line(&mut source, line)?;
    }
    if normalize && params.norm_after_spectral_lines {
        sim.normalize_spectrum(&mut source, &params.norm_method)?;
    }

    let attrs = sim.source_attrs(&source, session.telescope.as_ref())?;
    session.source = Some(source);
    Ok(SourceOutcome { attrs })
}
