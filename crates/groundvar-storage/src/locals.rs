//! Per-function lists of human-named variables

use std::collections::BTreeMap;

use groundvar_ast::Address;
use serde::{Deserialize, Serialize};

/// Function entry address to the names of its user-named variables.
///
/// Functions without any user-named variable have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionLocalsTable {
    entries: BTreeMap<Address, Vec<String>>,
}

impl FunctionLocalsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a function's names; returns `false` when the list was empty
    /// and nothing was stored
    pub fn record(&mut self, function: Address, names: Vec<String>) -> bool {
        if names.is_empty() {
            return false;
        }
        self.entries.insert(function, names);
        true
    }

    pub fn get(&self, function: Address) -> Option<&[String]> {
        self.entries.get(&function).map(Vec::as_slice)
    }

    pub fn contains(&self, function: Address) -> bool {
        self.entries.contains_key(&function)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Address, &[String])> {
        self.entries.iter().map(|(a, names)| (*a, names.as_slice()))
    }

    /// Number of functions with at least one user-named variable
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn variable_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
