// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Endpoint adapters: one function per stage, framework-agnostic.
//!
//! Each adapter parses and validates the raw body, locks the session for
//! the whole dispatch, and encodes the outcome. The HTTP status split
//! follows the error taxonomy: anything the client caused (validation,
//! missing prerequisites) is a 400 carrying the message; anything internal
//! is a 500 with a generic body, with the detail only logged.


use std::fmt::Display;
use std::sync::{MutexGuard, PoisonError};

use log::{error, warn};
use serde::Serialize;
use serde_json::{json, Value};

use crate::dispatch::{
    run_background, run_grism, run_photometry, run_source, run_telescope, run_transit,
    run_uvmos, DispatchError,
};
use crate::encode::{
    encode_background, encode_grism, encode_photometry, encode_source, encode_telescope,
    encode_transit, encode_uvmos,
};
use crate::params::{
    BackgroundParams, GrismParams, PhotometryParams, RequestBody, SourceParams, TelescopeParams,
    TransitParams, UvmosParams,
};
use crate::session::{Session, SharedSession};
use crate::sim::Simulator;

/// What the client gets to see when the server itself is at fault.
const INTERNAL_ERROR_BODY: &str =
    "An internal error occurred while running the simulation; see the server log.";

/// A framework-agnostic response: the HTTP status and the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

fn ok<T: Serialize>(response: T) -> ApiResponse {
    match serde_json::to_value(response) {
        Ok(body) => ApiResponse { status: 200, body },
        Err(e) => internal_error(&e),
    }
}

fn bad_request(err: &dyn Display) -> ApiResponse {
    warn!("rejecting request: {err}");
    ApiResponse {
        status: 400,
        body: json!({ "error": err.to_string() }),
    }
}

fn internal_error(err: &dyn Display) -> ApiResponse {
    error!("internal failure: {err}");
    ApiResponse {
        status: 500,
        body: json!({ "error": INTERNAL_ERROR_BODY }),
    }
}

fn dispatch_failure(err: DispatchError) -> ApiResponse {
    match &err {
        DispatchError::Validation(e) => bad_request(e),
        DispatchError::Dependency(e) => bad_request(e),
        DispatchError::Simulation(_) | DispatchError::Unit(_) => internal_error(&err),
    }
}

/// A poisoned mutex only means an earlier request panicked mid-dispatch;
/// the slots themselves are still usable.
fn lock<S: Simulator>(session: &SharedSession<S>) -> MutexGuard<'_, Session<S>> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn put_telescope<S: Simulator>(
    body: &RequestBody,
    session: &SharedSession<S>,
    sim: &S,
) -> ApiResponse {
    let params = match TelescopeParams::from_request(body) {
        Ok(params) => params,
        Err(e) => return bad_request(&e),
    };
    let mut session = lock(session);
    match run_telescope(&params, &mut session, sim) {
        Ok(outcome) => match encode_telescope(&outcome) {
            Ok(response) => ok(response),
            Err(e) => internal_error(&e),
        },
        Err(e) => dispatch_failure(e),
    }
}

pub fn put_background<S: Simulator>(
    body: &RequestBody,
    session: &SharedSession<S>,
    sim: &S,
) -> ApiResponse {
    let params = match BackgroundParams::from_request(body) {
        Ok(params) => params,
        Err(e) => return bad_request(&e),
    };
    let mut session = lock(session);
    match run_background(&params, &mut session, sim) {
        Ok(outcome) => match encode_background(&outcome) {
            Ok(response) => ok(response),
            Err(e) => internal_error(&e),
        },
        Err(e) => dispatch_failure(e),
    }
}

pub fn put_source<S: Simulator>(
    body: &RequestBody,
    session: &SharedSession<S>,
    sim: &S,
) -> ApiResponse {
    let params = match SourceParams::from_request(body) {
        Ok(params) => params,
        Err(e) => return bad_request(&e),
    };
    let mut session = lock(session);
    match run_source(&params, &mut session, sim) {
        Ok(outcome) => match encode_source(&outcome) {
            Ok(response) => ok(response),
            Err(e) => internal_error(&e),
        },
        Err(e) => dispatch_failure(e),
    }
}

pub fn put_photometry<S: Simulator>(
    body: &RequestBody,
    session: &SharedSession<S>,
    sim: &S,
) -> ApiResponse {
    let params = match PhotometryParams::from_request(body) {
        Ok(params) => params,
        Err(e) => return bad_request(&e),
    };
    let mut session = lock(session);
    match run_photometry(&params, &mut session, sim) {
        Ok(outcome) => match encode_photometry(&outcome) {
            Ok(response) => ok(response),
            Err(e) => internal_error(&e),
        },
        Err(e) => dispatch_failure(e),
    }
}

pub fn put_grism<S: Simulator>(
    body: &RequestBody,
    session: &SharedSession<S>,
    sim: &S,
) -> ApiResponse {
    let params = match GrismParams::from_request(body) {
        Ok(params) => params,
        Err(e) => return bad_request(&e),
    };
    let mut session = lock(session);
    match run_grism(&params, &mut session, sim) {
        Ok(outcome) => match encode_grism(&outcome) {
            Ok(response) => ok(response),
            Err(e) => internal_error(&e),
        },
        Err(e) => dispatch_failure(e),
    }
}

pub fn put_uvmos<S: Simulator>(
    body: &RequestBody,
    session: &SharedSession<S>,
    sim: &S,
) -> ApiResponse {
    let params = match UvmosParams::from_request(body) {
        Ok(params) => params,
        Err(e) => return bad_request(&e),
    };
    let mut session = lock(session);
    match run_uvmos(&params, &mut session, sim) {
        Ok(outcome) => match encode_uvmos(&outcome) {
            Ok(response) => ok(response),
            Err(e) => internal_error(&e),
        },
        Err(e) => dispatch_failure(e),
    }
}

pub fn put_transit<S: Simulator>(
    body: &RequestBody,
    session: &SharedSession<S>,
    sim: &S,
) -> ApiResponse {
    let params = match TransitParams::from_request(body) {
        Ok(params) => params,
        Err(e) => return bad_request(&e),
    };
    let mut session = lock(session);
    match run_transit(&params, &mut session, sim) {
        Ok(outcome) => match encode_transit(&outcome) {
            Ok(response) => ok(response),
            Err(e) => internal_error(&e),
        },
        Err(e) => dispatch_failure(e),
    }
}
