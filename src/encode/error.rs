// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::units::UnitError;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Couldn't serialize a response field: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Couldn't compress a 2-D array field: {0}")]
    Compress(#[from] std::io::Error),

    #[error(transparent)]
    Unit(#[from] UnitError),
}
