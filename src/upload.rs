// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Saving uploaded custom-spectrum files.
//!
//! Only a small allow-list of extensions is accepted, the filename is
//! reduced to a safe basename before it touches the filesystem, and a
//! numeric suffix avoids clobbering an earlier upload with the same name.

use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use thiserror::Error;

use crate::constants::ALLOWED_UPLOAD_EXTENSIONS;
use crate::params::ValidationError;

lazy_static! {
    /// Anything outside this set is dropped from uploaded filenames.
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]+").unwrap();
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Couldn't save the uploaded file: {0}")]
    Io(#[from] std::io::Error),
}

/// Reduce a client-supplied filename to a safe basename: path components
/// are discarded and unsafe characters removed.
fn sanitized(original_name: &str) -> String {
    let basename = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    UNSAFE_CHARS
        .replace_all(basename, "_")
        .trim_matches(['_', '.'])
        .to_string()
}

fn extension_allowed(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        }
        _ => false,
    }
}

/// Save an uploaded file under `upload_dir` and return the saved path. The
/// extension must be on the allow-list; an existing file of the same name is
/// never overwritten.
pub fn save_upload(
    upload_dir: &Path,
    original_name: &str,
    contents: &[u8],
) -> Result<PathBuf, UploadError> {
    if !extension_allowed(original_name) {
        return Err(ValidationError::DisallowedFileType(original_name.to_string()).into());
    }
    let safe_name = sanitized(original_name);
    if !extension_allowed(&safe_name) {
        return Err(ValidationError::DisallowedFileType(original_name.to_string()).into());
    }

    fs::create_dir_all(upload_dir)?;
    let mut path = upload_dir.join(&safe_name);
    let mut counter = 1_u32;
    while path.exists() {
        let renamed = match safe_name.rsplit_once('.') {
            Some((stem, ext)) => format!("{stem}_{counter}.{ext}"),
            None => format!("{safe_name}_{counter}"),
        };
        path = upload_dir.join(renamed);
        counter += 1;
    }

    fs::write(&path, contents)?;
    info!("saved upload {original_name} to {}", path.display());
    Ok(path)
}
