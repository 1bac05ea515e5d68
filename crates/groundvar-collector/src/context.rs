//! Per-run state

use std::fmt;

use groundvar_fingerprint::FingerprintTable;
use groundvar_storage::FunctionLocalsTable;
use groundvar_types::TypeLibrary;

/// Counters of one collection run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Functions the host reported
    pub functions: usize,
    pub decompiled: usize,
    pub failed: usize,
    /// Functions with at least one user-named variable
    pub functions_with_locals: usize,
    pub user_named_variables: usize,
    /// Type additions, counting repeats
    pub types_added: usize,
    pub type_descriptors: usize,
    pub collisions: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} functions ({} decompiled, {} failed), {} with user-named locals ({} variables), \
             {} type descriptors, {} collisions",
            self.functions,
            self.decompiled,
            self.failed,
            self.functions_with_locals,
            self.user_named_variables,
            self.type_descriptors,
            self.collisions
        )
    }
}

/// Everything a run accumulates before it is persisted
#[derive(Debug, Default)]
pub struct CollectionContext {
    pub type_lib: TypeLibrary,
    pub fun_locals: FunctionLocalsTable,
    /// Present only when fingerprints are being collected
    pub fingerprints: Option<FingerprintTable>,
    pub summary: RunSummary,
}

impl CollectionContext {
    pub fn new(type_lib: TypeLibrary, collect_fingerprints: bool) -> Self {
        Self {
            type_lib,
            fun_locals: FunctionLocalsTable::new(),
            fingerprints: collect_fingerprints.then(FingerprintTable::new),
            summary: RunSummary::default(),
        }
    }

    /// The summary with the totals that live in the tables filled in
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            functions_with_locals: self.fun_locals.len(),
            user_named_variables: self.fun_locals.variable_count(),
            type_descriptors: self.type_lib.len(),
            collisions: self
                .fingerprints
                .as_ref()
                .map_or(0, FingerprintTable::collision_count),
            ..self.summary.clone()
        }
    }
}
