// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The raw, unvalidated request body and the coercion helpers shared by every
//! endpoint's parameter constructor.
//!
//! Two wire encodings reach the API: a JSON object body, and multipart form
//! fields where each complex field is itself a JSON document double-encoded
//! as a string. Both are normalized to [`serde_json::Value`] lookups here so
//! the per-endpoint code never cares which encoding was used.

use std::path::PathBuf;
use std::str::FromStr;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::ValidationError;
use crate::units::{Quantity, Unit};

/// One field of a multipart form submission.
#[derive(Debug, Clone)]
pub enum FormField {
    /// A text value; possibly a double-encoded JSON document.
    Text(String),

    /// A file upload that has already been saved to disk.
    File(PathBuf),
}

/// A raw request body in either of the supported wire encodings.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Form(IndexMap<String, FormField>),
}

impl RequestBody {
    /// Look up a field, decoding form text back into JSON values. Form text
    /// that isn't valid JSON is taken as a plain string (e.g. `high`), so
    /// simple fields don't need to be quoted twice.
    pub fn field(&self, key: &str) -> Result<Value, ValidationError> {
        match self {
            RequestBody::Json(value) => {
                let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;
                obj.get(key)
                    .cloned()
                    .ok_or_else(|| ValidationError::MissingField(key.to_string()))
            }

            RequestBody::Form(fields) => match fields.get(key) {
                Some(FormField::Text(text)) => Ok(serde_json::from_str(text)
                    .unwrap_or_else(|_| Value::String(text.clone()))),
                Some(FormField::File { .. }) => Err(ValidationError::UnexpectedFile {
                    field: key.to_string(),
                }),
                None => Err(ValidationError::MissingField(key.to_string())),
            },
        }
    }

    /// The saved path of an uploaded file field, if the field is present and
    /// is a file.
    pub fn file(&self, key: &str) -> Option<PathBuf> {
        match self {
            RequestBody::Json(_) => None,
            RequestBody::Form(fields) => match fields.get(key) {
                Some(FormField::File(path)) => Some(path.clone()),
                _ => None,
            },
        }
    }
}

/// Coerce a JSON value to `f64`, accepting string-typed numerics.
pub(super) fn as_f64(field: &str, value: &Value) -> Result<f64, ValidationError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| ValidationError::NotANumber {
            field: field.to_string(),
            got: n.to_string(),
        }),
        Value::String(s) => s.trim().parse().map_err(|_| ValidationError::NotANumber {
            field: field.to_string(),
            got: s.clone(),
        }),
        other => Err(ValidationError::NotANumber {
            field: field.to_string(),
            got: other.to_string(),
        }),
    }
}

pub(super) fn as_string(field: &str, value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(ValidationError::WrongShape {
            field: field.to_string(),
            expected: "a string",
        }),
    }
}

/// Normalize a boolean-like value. Real JSON booleans are honoured; strings
/// must be `true` or `false` (case-insensitive) and anything else is invalid.
pub(super) fn as_bool(field: &str, value: &Value) -> Result<bool, ValidationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ValidationError::NotABoolean {
                field: field.to_string(),
                got: s.clone(),
            }),
        },
        other => Err(ValidationError::NotABoolean {
            field: field.to_string(),
            got: other.to_string(),
        }),
    }
}

pub(super) fn as_object<'a>(
    field: &str,
    value: &'a Value,
) -> Result<&'a serde_json::Map<String, Value>, ValidationError> {
    value.as_object().ok_or(ValidationError::WrongShape {
        field: field.to_string(),
        expected: "a JSON object",
    })
}

pub(super) fn as_array<'a>(
    field: &str,
    value: &'a Value,
) -> Result<&'a Vec<Value>, ValidationError> {
    value.as_array().ok_or(ValidationError::WrongShape {
        field: field.to_string(),
        expected: "a JSON array",
    })
}

/// Coerce a `{key: number-or-string}` map, reporting the full field path of
/// any entry that fails.
pub(super) fn numeric_map(
    field: &str,
    value: &Value,
) -> Result<IndexMap<String, f64>, ValidationError> {
    let obj = as_object(field, value)?;
    let mut out = IndexMap::with_capacity(obj.len());
    for (key, val) in obj {
        let number = as_f64(&format!("{field}.{key}"), val)?;
        out.insert(key.clone(), number);
    }
    Ok(out)
}

/// As [`numeric_map`], but attaching `unit` to every value.
pub(super) fn quantity_map(
    field: &str,
    value: &Value,
    unit: Unit,
) -> Result<IndexMap<String, Quantity>, ValidationError> {
    Ok(numeric_map(field, value)?
        .into_iter()
        .map(|(key, val)| (key, Quantity::new(val, unit)))
        .collect())
}

/// Parse a choice field into its strum-derived discriminant,
/// case-insensitively.
pub(super) fn choice<T>(field: &str, value: &Value, what: &'static str) -> Result<T, ValidationError>
where
    T: FromStr,
{
    let s = as_string(field, value)?;
    T::from_str(&s).map_err(|_| ValidationError::UnrecognisedChoice {
        what,
        got: s.clone(),
    })
}

/// Select the active variant's parameter subset from a dict-of-dicts keyed by
/// the choice. All other variants' parameters are ignored even if present.
/// The key is tried as sent and then lowercased, because the frontend is not
/// consistent about casing.
pub(super) fn variant_params<'a>(
    field: &str,
    value: &'a Value,
    discriminant: &str,
) -> Result<&'a Value, ValidationError> {
    let obj = as_object(field, value)?;
    obj.get(discriminant)
        .or_else(|| obj.get(&discriminant.to_lowercase()))
        .ok_or_else(|| ValidationError::MissingVariant {
            field: field.to_string(),
            choice: discriminant.to_string(),
        })
}

lazy_static! {
    static ref NUMBER_RE: Regex = Regex::new(r"-?\d+\.?\d*").unwrap();
}

/// An aperture centre can arrive as a number or as free text like
/// `(0.2, -1.5) arcsec`. Extract every numeric substring and attach arcsec to
/// each.
pub(super) fn arcsec_list(field: &str, value: &Value) -> Result<Vec<Quantity>, ValidationError> {
    if let Ok(number) = as_f64(field, value) {
        return Ok(vec![Quantity::new(number, Unit::Arcsec)]);
    }
    let text = as_string(field, value)?;
    let mut numbers = vec![];
    for m in NUMBER_RE.find_iter(&text) {
        let number = m.as_str().parse().map_err(|_| ValidationError::NotANumber {
            field: field.to_string(),
            got: m.as_str().to_string(),
        })?;
        numbers.push(Quantity::new(number, Unit::Arcsec));
    }
    if numbers.is_empty() {
        return Err(ValidationError::NoNumbersInText {
            field: field.to_string(),
            got: text,
        });
    }
    Ok(numbers)
}
