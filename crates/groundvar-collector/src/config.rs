//! Collector configuration
//!
//! Built either from command line flags or from the environment variables
//! a host-embedded run is launched with.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::CollectError;

/// Type library to start from; the result is written back to it
pub const ENV_TYPE_LIB: &str = "TYPE_LIB";
/// Function Locals Table output
pub const ENV_FUN_LOCALS: &str = "FUN_LOCALS";
/// Optional collected variables output
pub const ENV_COLLECTED_VARS: &str = "COLLECTED_VARS";

/// Where a run reads its input library and writes its artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// A missing or unreadable library starts the run with an empty one
    pub type_lib_in: Option<PathBuf>,
    pub type_lib_out: PathBuf,
    pub fun_locals_out: PathBuf,
    /// Fingerprints are only collected when this is set
    pub collected_vars_out: Option<PathBuf>,
}

impl CollectorConfig {
    pub fn new(type_lib_out: impl Into<PathBuf>, fun_locals_out: impl Into<PathBuf>) -> Self {
        Self {
            type_lib_in: None,
            type_lib_out: type_lib_out.into(),
            fun_locals_out: fun_locals_out.into(),
            collected_vars_out: None,
        }
    }

    pub fn with_type_lib_in(mut self, path: impl Into<PathBuf>) -> Self {
        self.type_lib_in = Some(path.into());
        self
    }

    pub fn with_collected_vars_out(mut self, path: impl Into<PathBuf>) -> Self {
        self.collected_vars_out = Some(path.into());
        self
    }

    /// Read `TYPE_LIB`, `FUN_LOCALS` and `COLLECTED_VARS`.
    ///
    /// `TYPE_LIB` names both the input and the output library.
    pub fn from_env() -> Result<Self, CollectError> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source
    pub fn from_lookup(
        mut lookup: impl FnMut(&'static str) -> Option<OsString>,
    ) -> Result<Self, CollectError> {
        let mut path = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };

        let type_lib = path(ENV_TYPE_LIB).ok_or(CollectError::MissingEnv(ENV_TYPE_LIB))?;
        let fun_locals = path(ENV_FUN_LOCALS).ok_or(CollectError::MissingEnv(ENV_FUN_LOCALS))?;
        let collected_vars = path(ENV_COLLECTED_VARS);

        Ok(Self {
            type_lib_in: Some(type_lib.clone()),
            type_lib_out: type_lib,
            fun_locals_out: fun_locals,
            collected_vars_out: collected_vars,
        })
    }

    pub fn collects_fingerprints(&self) -> bool {
        self.collected_vars_out.is_some()
    }
}
