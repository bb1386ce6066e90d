// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Validated parameters for the grism-spectroscopy endpoint.

use super::body::{as_f64, as_string, RequestBody};
use super::ValidationError;
use crate::units::{Quantity, Unit};

/// Everything needed to run slitless grism spectroscopy.
#[derive(Debug, Clone, PartialEq)]
pub struct GrismParams {
    /// Which grism channel to disperse through (e.g. `uv` or `u`).
    pub channel: String,

    pub exposure_time: Quantity,
}

impl GrismParams {
    pub fn from_request(body: &RequestBody) -> Result<GrismParams, ValidationError> {
        let channel = as_string("grismChannel", &body.field("grismChannel")?)?;
        let exposure_time = as_f64("exposureTime", &body.field("exposureTime")?)?;

        Ok(GrismParams {
            channel,
            exposure_time: Quantity::new(exposure_time, Unit::Second),
        })
    }
}
