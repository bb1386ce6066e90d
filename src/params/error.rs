// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors raised while turning a raw request body into typed parameters.
/// These are always client-input failures; a params struct is all-or-nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("The request body must be a JSON object")]
    NotAnObject,

    #[error("Required field '{0}' is missing from the request")]
    MissingField(String),

    #[error("Field '{field}' could not be parsed as a number (got '{got}')")]
    NotANumber { field: String, got: String },

    #[error("Field '{field}' must be 'true' or 'false' (got '{got}')")]
    NotABoolean { field: String, got: String },

    #[error("Field '{field}' has the wrong shape; expected {expected}")]
    WrongShape {
        field: String,
        expected: &'static str,
    },

    #[error("'{got}' is not a valid {what}")]
    UnrecognisedChoice { what: &'static str, got: String },

    #[error("Field '{field}' has no parameters for the selected '{choice}' variant")]
    MissingVariant { field: String, choice: String },

    #[error("Each flux must be 'high', 'average', 'low', or a number > 0 (got '{0}')")]
    BadGeocoronalFlux(String),

    #[error("No numbers could be extracted from '{got}' for field '{field}'")]
    NoNumbersInText { field: String, got: String },

    #[error("Form field '{field}' is a file upload but a value was expected")]
    UnexpectedFile { field: String },

    #[error("'{0}' is not an allowed file; allowed extensions are: fits, fit, txt, dat")]
    DisallowedFileType(String),

    #[error("The source is not a point source and cannot use an optimal aperture")]
    OptimalApertureNeedsPointSource,
}
