// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Validated, unit-attached parameter records, one per endpoint.
//!
//! The code here mirrors the raw request bodies handled by the `routes`
//! module: a body is unparsed, loosely-typed wire data, whereas a params
//! struct has been validated and is ready to hand to the simulation library
//! directly. Nothing downstream of this module parses strings.

mod background;
mod body;
mod error;
mod grism;
mod photometry;
mod source;
mod telescope;
mod transit;
mod uvmos;

pub use background::{BackgroundParams, GeocoronalFlux};
pub use body::{FormField, RequestBody};
pub use error::ValidationError;
pub use grism::GrismParams;
pub use photometry::{Aperture, PhotometryParams, PhotometryTarget};
pub use source::{
    LineKind, LineShape, NormMethod, PredefinedSpectrum, SourceParams, SourceProfile, SpectralLine,
};
pub use telescope::TelescopeParams;
pub use transit::{ExposureParams, PlanetModelParams, TransitParams};
pub use uvmos::{ExtractionBox, ExtractionBoxUnits, PixelExtractionBox, UvmosParams, UvmosTarget};
