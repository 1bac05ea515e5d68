//! The collection loop

use groundvar_ast::{DecompiledFunction, LocalVar};
use groundvar_fingerprint::fingerprint_function;
use groundvar_storage::{
    load_type_library_or_empty, write_collected_vars, write_function_locals, write_type_library,
};
use groundvar_types::HostType;
use tracing::{debug, debug_span, info, trace};

use crate::{CollectError, CollectionContext, CollectorConfig, Decompiler, RunSummary};

/// Drives a decompiler over a binary and gathers ground truth
pub struct Collector {
    config: CollectorConfig,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Fresh run state, seeded with the configured input library
    pub fn start(&self) -> CollectionContext {
        let type_lib = load_type_library_or_empty(self.config.type_lib_in.as_deref());
        CollectionContext::new(type_lib, self.config.collects_fingerprints())
    }

    /// Decompile and process every function the host reports
    pub fn collect(&self, host: &mut impl Decompiler, ctx: &mut CollectionContext) {
        for entry in host.function_entries() {
            ctx.summary.functions += 1;
            match host.decompile(entry) {
                Ok(func) => {
                    ctx.summary.decompiled += 1;
                    self.process_function(ctx, &func);
                }
                Err(e) => {
                    ctx.summary.failed += 1;
                    debug!("skipping {}: {}", entry, e);
                }
            }
        }
    }

    /// Fold one decompiled function into the run state
    pub fn process_function(&self, ctx: &mut CollectionContext, func: &DecompiledFunction) {
        let _span = debug_span!("process_function", entry = %func.entry, function = %func.name).entered();

        for arg in func.arguments().filter(|v| !v.name.is_empty()) {
            add_type(ctx, arg.ty.as_ref());
        }
        for var in func.user_named() {
            add_type(ctx, var.ty.as_ref());
            log_location(func, var);
        }

        if let Some(table) = ctx.fingerprints.as_mut() {
            table.record_function(func.entry, fingerprint_function(func));
        }

        ctx.fun_locals.record(func.entry, func.user_named_names());
    }

    /// Persist the artifacts of a finished run
    pub fn finish(&self, ctx: &CollectionContext) -> Result<RunSummary, CollectError> {
        write_function_locals(&self.config.fun_locals_out, &ctx.fun_locals)?;
        write_type_library(&self.config.type_lib_out, &ctx.type_lib)?;
        if let (Some(path), Some(table)) = (&self.config.collected_vars_out, &ctx.fingerprints) {
            write_collected_vars(path, table)?;
        }

        let summary = ctx.summary();
        info!("{}", summary);
        Ok(summary)
    }

    /// Collect from `host` and write the artifacts
    pub fn run(&self, host: &mut impl Decompiler) -> Result<RunSummary, CollectError> {
        let mut ctx = self.start();
        self.collect(host, &mut ctx);
        self.finish(&ctx)
    }
}

fn add_type(ctx: &mut CollectionContext, ty: Option<&HostType>) {
    if let Some(ty) = ty {
        ctx.type_lib.add(ty);
        ctx.summary.types_added += 1;
    }
}

fn log_location(func: &DecompiledFunction, var: &LocalVar) {
    match func.frame_location(var) {
        Some(location) => trace!("{}: {}", var.name, location),
        None => trace!("{}: no storage location", var.name),
    }
}
