use std::path::{Path, PathBuf};

use groundvar::collector::{Collector, CollectorConfig, JsonDumpHost, RunSummary};
use tempfile::TempDir;

/// Path of a file under tests/fixtures/
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Scratch directory holding the artifacts of one or more runs
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Config writing every artifact into this workspace
    pub fn config(&self) -> CollectorConfig {
        CollectorConfig::new(self.path("type_lib.json"), self.path("fun_locals.bin"))
            .with_type_lib_in(self.path("type_lib.json"))
            .with_collected_vars_out(self.path("collected_vars.bin"))
    }

    /// Run the collector over a fixture dump
    pub fn collect(&self, dump: &str) -> RunSummary {
        let mut host = JsonDumpHost::load(fixture_path(dump)).expect("Failed to load dump");
        Collector::new(self.config())
            .run(&mut host)
            .expect("Collection run failed")
    }
}
