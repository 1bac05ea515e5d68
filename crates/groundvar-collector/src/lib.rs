//! groundvar Collector - Ground truth for decompiled variable names
//!
//! Walks every function of a binary through a [`Decompiler`] and records,
//! for the variables a human named:
//! - their names, per function (the Function Locals Table)
//! - their declared types, in the run's type library
//! - optionally their address fingerprints
//!
//! Functions the decompiler fails on are skipped. Artifacts are written
//! once, by [`Collector::finish`].
//!
//! # Example
//!
//! ```ignore
//! use groundvar_collector::{Collector, CollectorConfig, JsonDumpHost};
//!
//! let mut host = JsonDumpHost::load("binary.dump.json")?;
//! let collector = Collector::new(CollectorConfig::from_env()?);
//! let summary = collector.run(&mut host)?;
//! println!("{}", summary);
//! ```

mod config;
mod context;
mod driver;
mod dump;
mod error;
mod host;

pub use config::{CollectorConfig, ENV_COLLECTED_VARS, ENV_FUN_LOCALS, ENV_TYPE_LIB};
pub use context::{CollectionContext, RunSummary};
pub use driver::Collector;
pub use dump::JsonDumpHost;
pub use error::{CollectError, DecompileError};
pub use host::Decompiler;
