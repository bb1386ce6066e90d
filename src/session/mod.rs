// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The per-process session holding at most one instance of each pipeline
//! stage.
//!
//! One process serves exactly one logical user, so the session is a plain
//! struct behind a single [`Mutex`]; the mutex serializes whole dispatch
//! operations so a pair of in-flight requests cannot interleave their
//! read-prerequisites/write-result sequences. This is NOT safe for
//! concurrent multi-user access: a multi-tenant deployment must key
//! sessions by an external session token, one mutex per key. That extension
//! changes nothing in the dispatcher.


use std::sync::Mutex;

use strum_macros::{Display, EnumIter};

use crate::sim::Simulator;

/// Names of the session's stage slots, mostly for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Slot {
    #[strum(serialize = "telescope")]
    Telescope,
    #[strum(serialize = "background")]
    Background,
    #[strum(serialize = "source")]
    Source,
    #[strum(serialize = "photometry")]
    Photometry,
    #[strum(serialize = "grism")]
    Grism,
    #[strum(serialize = "uvmos")]
    Uvmos,
    #[strum(serialize = "transit")]
    Transit,
}

/// The session state. Writing a slot replaces any prior value outright;
/// replacing a slot does NOT clear stages previously derived from the old
/// value (the staleness is a documented limitation, matching the original
/// behaviour).
pub struct Session<S: Simulator> {
    pub telescope: Option<S::Telescope>,
    pub background: Option<S::Background>,
    pub source: Option<S::Source>,
    pub photometry: Option<S::Photometry>,
    pub grism: Option<S::Grism>,
    pub uvmos: Option<S::Uvmos>,
    pub transit: Option<S::Transit>,

    /// Whether the frontend should display source weights on a log scale.
    pub use_log_source_weights: bool,
}

/// A session serialized for use from request handlers.
pub type SharedSession<S> = Mutex<Session<S>>;

impl<S: Simulator> Default for Session<S> {
    fn default() -> Self {
        Session {
            telescope: None,
            background: None,
            source: None,
            photometry: None,
            grism: None,
            uvmos: None,
            transit: None,
            use_log_source_weights: false,
        }
    }
}

impl<S: Simulator> Session<S> {
    pub fn new() -> Session<S> {
        Session::default()
    }

    /// Whether a slot currently holds a stage object.
    pub fn is_set(&self, slot: Slot) -> bool {
        match slot {
            Slot::Telescope => self.telescope.is_some(),
            Slot::Background => self.background.is_some(),
            Slot::Source => self.source.is_some(),
            Slot::Photometry => self.photometry.is_some(),
            Slot::Grism => self.grism.is_some(),
            Slot::Uvmos => self.uvmos.is_some(),
            Slot::Transit => self.transit.is_some(),
        }
    }

    /// The subset of `required` slots that are currently absent, in the
    /// order given.
    pub fn missing(&self, required: &[Slot]) -> Vec<Slot> {
        required
            .iter()
            .copied()
            .filter(|&slot| !self.is_set(slot))
            .collect()
    }

    /// Empty a slot.
    pub fn clear(&mut self, slot: Slot) {
        match slot {
            Slot::Telescope => self.telescope = None,
            Slot::Background => self.background = None,
            Slot::Source => self.source = None,
            Slot::Photometry => self.photometry = None,
            Slot::Grism => self.grism = None,
            Slot::Uvmos => self.uvmos = None,
            Slot::Transit => self.transit = None,
        }
    }
}
