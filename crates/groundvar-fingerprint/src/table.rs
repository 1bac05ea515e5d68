//! Fingerprint table with collision tracking

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use groundvar_ast::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug_span, warn};

use crate::Fingerprint;

/// Printed in place of a name when a fingerprint is ambiguous
pub const SENTINEL: &str = "::NONE::";

/// What the table knows about the variable behind a fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarIdentity {
    Named(String),
    /// Several variables share this fingerprint; location alone cannot
    /// tell them apart. The colliding names are kept so consumers can
    /// filter them out.
    Ambiguous(BTreeSet<String>),
}

impl VarIdentity {
    /// The variable's name, unless the fingerprint is ambiguous
    pub fn name(&self) -> Option<&str> {
        match self {
            VarIdentity::Named(name) => Some(name),
            VarIdentity::Ambiguous(_) => None,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, VarIdentity::Ambiguous(_))
    }
}

impl fmt::Display for VarIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarIdentity::Named(name) => f.write_str(name),
            VarIdentity::Ambiguous(_) => f.write_str(SENTINEL),
        }
    }
}

/// Result of [`FingerprintTable::insert`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Same fingerprint, same name
    Unchanged,
    /// A different name already held this fingerprint; both are now lost
    Collision { previous: String },
    /// The fingerprint was already ambiguous
    AlreadyAmbiguous,
    /// Empty fingerprints never enter the table
    Skipped,
}

/// Mapping from fingerprint to variable identity.
///
/// An ambiguous entry never reverts to a named one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintTable {
    entries: BTreeMap<Fingerprint, VarIdentity>,
    collisions: usize,
}

impl FingerprintTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fingerprint: Fingerprint, name: &str) -> InsertOutcome {
        if fingerprint.is_empty() {
            return InsertOutcome::Skipped;
        }

        let Some(identity) = self.entries.get_mut(&fingerprint) else {
            self.entries
                .insert(fingerprint, VarIdentity::Named(name.to_string()));
            return InsertOutcome::Inserted;
        };

        match identity {
            VarIdentity::Named(current) if current.as_str() == name => InsertOutcome::Unchanged,
            VarIdentity::Named(current) => {
                let previous = std::mem::take(current);
                warn!(
                    "fingerprint collision at {}: current `{}`, new `{}`",
                    fingerprint, previous, name
                );
                *identity =
                    VarIdentity::Ambiguous(BTreeSet::from([previous.clone(), name.to_string()]));
                self.collisions += 1;
                InsertOutcome::Collision { previous }
            }
            VarIdentity::Ambiguous(names) => {
                if names.insert(name.to_string()) {
                    warn!(
                        "fingerprint collision at {}: `{}` joins {} ambiguous names",
                        fingerprint,
                        name,
                        names.len() - 1
                    );
                    self.collisions += 1;
                }
                InsertOutcome::AlreadyAmbiguous
            }
        }
    }

    /// Insert every fingerprint of one function; returns how many collided
    pub fn record_function(
        &mut self,
        function: Address,
        fingerprints: BTreeMap<String, Fingerprint>,
    ) -> usize {
        let _span = debug_span!("function", entry = %function).entered();
        let before = self.collisions;
        for (name, fingerprint) in fingerprints {
            self.insert(fingerprint, &name);
        }
        self.collisions - before
    }

    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<&VarIdentity> {
        self.entries.get(fingerprint)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &VarIdentity)> {
        self.entries.iter()
    }

    /// Entries that resolved to the sentinel
    pub fn ambiguous(&self) -> impl Iterator<Item = (&Fingerprint, &BTreeSet<String>)> {
        self.entries.iter().filter_map(|(fp, identity)| match identity {
            VarIdentity::Ambiguous(names) => Some((fp, names)),
            VarIdentity::Named(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of names lost to collisions so far
    pub fn collision_count(&self) -> usize {
        self.collisions
    }
}
