// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Validated parameters for the telescope endpoint.

use indexmap::IndexMap;

use super::body::{as_f64, quantity_map, numeric_map, RequestBody};
use super::ValidationError;
use crate::units::{Quantity, Unit};

/// Everything needed to construct a telescope stage object. Angles are in
/// arcseconds, the mirror diameter in centimetres and red-leak thresholds in
/// angstroms; dark current and read noise are detector-native and carried
/// without a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TelescopeParams {
    pub fwhm: Quantity,
    pub px_scale: Quantity,
    pub mirror_diameter: Quantity,
    pub dark_current: f64,
    pub read_noise: f64,
    pub redleak_thresholds: IndexMap<String, Quantity>,
    pub extinction_coeffs: IndexMap<String, f64>,
}

impl TelescopeParams {
    pub fn from_request(body: &RequestBody) -> Result<TelescopeParams, ValidationError> {
        let fwhm = as_f64("fwhm", &body.field("fwhm")?)?;
        let px_scale = as_f64("pxScale", &body.field("pxScale")?)?;
        let mirror_diameter = as_f64("mirrorDiameter", &body.field("mirrorDiameter")?)?;
        let dark_current = as_f64("darkCurrent", &body.field("darkCurrent")?)?;
        let read_noise = as_f64("readNoise", &body.field("readNoise")?)?;
        let redleak_thresholds = quantity_map(
            "redleakThresholds",
            &body.field("redleakThresholds")?,
            Unit::Angstrom,
        )?;
        let extinction_coeffs = numeric_map("extinctionCoeffs", &body.field("extinctionCoeffs")?)?;

        Ok(TelescopeParams {
            fwhm: Quantity::new(fwhm, Unit::Arcsec),
            px_scale: Quantity::new(px_scale, Unit::Arcsec),
            mirror_diameter: Quantity::new(mirror_diameter, Unit::Centimetre),
            dark_current,
            read_noise,
            redleak_thresholds,
            extinction_coeffs,
        })
    }
}
