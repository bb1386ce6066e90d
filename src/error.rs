// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all API-related errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] crate::params::ValidationError),

    #[error("{0}")]
    Dispatch(#[from] crate::dispatch::DispatchError),

    #[error("{0}")]
    Encoding(#[from] crate::encode::EncodingError),

    #[error("{0}")]
    Upload(#[from] crate::upload::UploadError),

    #[error("{0}")]
    Unit(#[from] crate::units::UnitError),
}
