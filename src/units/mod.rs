// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Physical units for request parameters and simulation outputs.
//!
//! Every number crossing the validator or encoder boundary carries one of
//! these units; the dimensionless case is explicit rather than implied by a
//! bare `f64`.

mod error;

pub use error::UnitError;

use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// The units used by the ETC endpoints. Each unit belongs to a [`UnitKind`];
/// conversions are only defined within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum Unit {
    /// Arcseconds
    #[strum(serialize = "arcsec")]
    Arcsec,

    /// Angstroms
    #[strum(serialize = "AA")]
    Angstrom,

    /// Nanometres
    #[strum(serialize = "nm")]
    Nanometre,

    /// Centimetres
    #[strum(serialize = "cm")]
    Centimetre,

    /// Kiloparsecs
    #[strum(serialize = "kpc")]
    Kiloparsec,

    /// Kelvin
    #[strum(serialize = "K")]
    Kelvin,

    /// Seconds
    #[strum(serialize = "s")]
    Second,

    /// Days
    #[strum(serialize = "d")]
    Day,

    /// No unit attached (e.g. Sérsic indices, scale factors)
    #[strum(serialize = "")]
    Dimensionless,
}

/// The dimension a [`Unit`] measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Angle,
    Wavelength,
    Length,
    Distance,
    Temperature,
    Time,
    Dimensionless,
}

impl Unit {
    pub fn kind(self) -> UnitKind {
        match self {
            Unit::Arcsec => UnitKind::Angle,
            Unit::Angstrom | Unit::Nanometre => UnitKind::Wavelength,
            Unit::Centimetre => UnitKind::Length,
            Unit::Kiloparsec => UnitKind::Distance,
            Unit::Kelvin => UnitKind::Temperature,
            Unit::Second | Unit::Day => UnitKind::Time,
            Unit::Dimensionless => UnitKind::Dimensionless,
        }
    }

    /// The factor that takes a value in `self` to a value in `to`. Both units
    /// must measure the same dimension.
    fn factor_to(self, to: Unit) -> Result<f64, UnitError> {
        if self.kind() != to.kind() {
            return Err(UnitError::Incompatible {
                from: self.into(),
                to: to.into(),
            });
        }
        // Factors to an arbitrary base unit within each kind.
        let base = |unit: Unit| -> f64 {
            match unit {
                Unit::Nanometre => 10.0, // base is angstroms
                Unit::Day => 86400.0,    // base is seconds
                _ => 1.0,
            }
        };
        Ok(base(self) / base(to))
    }
}

/// A scalar tagged with a physical unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quantity {
    pub value: f64,
    #[serde(skip)]
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Quantity {
        Quantity { value, unit }
    }

    /// The value expressed in `unit`.
    pub fn in_unit(self, unit: Unit) -> Result<f64, UnitError> {
        Ok(self.value * self.unit.factor_to(unit)?)
    }
}

/// A numeric array where every element shares one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityArray {
    pub values: Vec<f64>,
    pub unit: Unit,
}

impl QuantityArray {
    pub fn new(values: Vec<f64>, unit: Unit) -> QuantityArray {
        QuantityArray { values, unit }
    }

    /// All values expressed in `unit`.
    pub fn in_unit(&self, unit: Unit) -> Result<Vec<f64>, UnitError> {
        let factor = self.unit.factor_to(unit)?;
        Ok(self.values.iter().map(|v| v * factor).collect())
    }
}
