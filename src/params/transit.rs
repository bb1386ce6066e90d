// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Validated parameters for the transit-photometry endpoint.

use serde_json::Value;

use super::body::{as_f64, as_object, as_string, RequestBody};
use super::ValidationError;
use crate::units::{Quantity, Unit};

/// Exposure cadence for the simulated light curve.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureParams {
    pub exptime: Quantity,

    /// Number of exposures stacked per light-curve sample.
    pub nstack: i64,

    pub tstart: Quantity,
    pub tend: Quantity,
}

/// A single-planet transit model.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetModelParams {
    /// Planet-to-star radius ratio.
    pub rprs: f64,

    /// Orbital period \[days\].
    pub period: f64,

    /// Mid-transit time \[days\].
    pub t0: f64,

    /// Impact parameter.
    pub b: f64,

    /// Scaled semi-major axis a/R*.
    pub ars: f64,
}

/// Everything needed to run the transit simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitParams {
    pub bandpass_id: String,
    pub exposure: ExposureParams,
    pub planet_model: PlanetModelParams,
}

impl TransitParams {
    pub fn from_request(body: &RequestBody) -> Result<TransitParams, ValidationError> {
        let bandpass = body.field("bandpass")?;
        let bandpass_obj = as_object("bandpass", &bandpass)?;
        let bandpass_id = as_string(
            "bandpass.bandpass_id",
            bandpass_obj.get("bandpass_id").ok_or_else(|| {
                ValidationError::MissingField("bandpass.bandpass_id".to_string())
            })?,
        )?;

        let exposure = parse_exposure(&body.field("exposureParameters")?)?;
        let planet_model = parse_planet_model(&body.field("planetModelParameters")?)?;

        Ok(TransitParams {
            bandpass_id,
            exposure,
            planet_model,
        })
    }
}

fn get_f64(parent: &str, value: &Value, key: &str) -> Result<f64, ValidationError> {
    let field = format!("{parent}.{key}");
    let obj = as_object(parent, value)?;
    let entry = obj
        .get(key)
        .ok_or_else(|| ValidationError::MissingField(field.clone()))?;
    as_f64(&field, entry)
}

fn parse_exposure(value: &Value) -> Result<ExposureParams, ValidationError> {
    Ok(ExposureParams {
        exptime: Quantity::new(get_f64("exposureParameters", value, "exptime")?, Unit::Second),
        nstack: get_f64("exposureParameters", value, "nstack")? as i64,
        tstart: Quantity::new(get_f64("exposureParameters", value, "tstart")?, Unit::Day),
        tend: Quantity::new(get_f64("exposureParameters", value, "tend")?, Unit::Day),
    })
}

fn parse_planet_model(value: &Value) -> Result<PlanetModelParams, ValidationError> {
    Ok(PlanetModelParams {
        rprs: get_f64("planetModelParameters", value, "rprs")?,
        period: get_f64("planetModelParameters", value, "p")?,
        t0: get_f64("planetModelParameters", value, "t0")?,
        b: get_f64("planetModelParameters", value, "b")?,
        ars: get_f64("planetModelParameters", value, "ars")?,
    })
}
