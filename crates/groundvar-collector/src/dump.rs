//! Decompiler output exported to a JSON file
//!
//! A dump lists every function of one binary, either decompiled or with
//! the reason decompilation failed:
//!
//! ```text
//! {
//!   "functions": [
//!     { "entry": 4096, "name": "main", "variables": [...], "nodes": [...] },
//!     { "entry": 8192, "failure": "call analysis failed" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use groundvar_ast::{Address, DecompiledFunction};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{CollectError, DecompileError, Decompiler};

#[derive(Deserialize)]
struct RawDump {
    functions: Vec<Value>,
}

#[derive(Deserialize)]
struct FailedEntry {
    entry: Address,
    failure: String,
}

/// A [`Decompiler`] replaying a dump file
#[derive(Debug, Default)]
pub struct JsonDumpHost {
    order: Vec<Address>,
    functions: HashMap<Address, Result<DecompiledFunction, String>>,
}

impl JsonDumpHost {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CollectError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CollectError::DumpRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| CollectError::DumpParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a dump. Only a malformed top level, or an entry whose address
    /// cannot be read, rejects the dump; a function that fails to parse is
    /// kept as a decompilation failure.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        let raw: RawDump = serde_json::from_str(text)?;
        let mut host = JsonDumpHost::default();
        for value in raw.functions {
            let (entry, outcome) = parse_entry(value)?;
            if host.functions.insert(entry, outcome).is_some() {
                debug!("dump lists {} twice, keeping the later entry", entry);
            } else {
                host.order.push(entry);
            }
        }
        Ok(host)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn parse_entry(value: Value) -> serde_json::Result<(Address, Result<DecompiledFunction, String>)> {
    if value.get("failure").is_some() {
        let failed: FailedEntry = serde_json::from_value(value)?;
        return Ok((failed.entry, Err(failed.failure)));
    }

    let entry = value
        .get("entry")
        .cloned()
        .ok_or_else(|| <serde_json::Error as serde::de::Error>::missing_field("entry"))?;
    let entry: Address = serde_json::from_value(entry)?;
    match serde_json::from_value::<DecompiledFunction>(value) {
        Ok(func) => Ok((entry, Ok(func))),
        Err(e) => {
            warn!("malformed function {} in dump: {}", entry, e);
            Ok((entry, Err(format!("malformed dump entry: {}", e))))
        }
    }
}

impl Decompiler for JsonDumpHost {
    fn function_entries(&self) -> Vec<Address> {
        self.order.clone()
    }

    fn decompile(&mut self, entry: Address) -> Result<DecompiledFunction, DecompileError> {
        match self.functions.get(&entry) {
            Some(Ok(func)) => Ok(func.clone()),
            Some(Err(reason)) => Err(DecompileError::Failed {
                entry,
                reason: reason.clone(),
            }),
            None => Err(DecompileError::UnknownFunction(entry)),
        }
    }
}
