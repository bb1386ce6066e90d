// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fixed values used throughout the API.

/// File extensions accepted for custom-spectrum uploads.
pub const ALLOWED_UPLOAD_EXTENSIONS: [&str; 4] = ["fits", "fit", "txt", "dat"];

/// Number of detector reads assumed for grism noise.
pub const GRISM_NREADS: u32 = 1;

/// On-chip binning assumed for grism noise.
pub const GRISM_NBIN: u32 = 1;

/// Number of samples on the model light-curve grid returned for plotting.
pub const TRANSIT_MODEL_GRID_LEN: usize = 1000;
