//! groundvar CLI - Collect decompiler ground truth from the command line

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use groundvar_collector::{Collector, CollectorConfig, JsonDumpHost};
use groundvar_storage::{load_type_library, read_function_locals, write_type_library};
use groundvar_types::TypeLibrary;

mod logging;

#[derive(Parser)]
#[command(name = "groundvar")]
#[command(about = "Variable name and type ground truth for decompiler output", long_about = None)]
struct Cli {
    /// Log at debug level, overriding RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect user-named variables and their types from a decompiler dump
    Collect {
        /// Dump file exported from the decompiler
        #[arg(long)]
        dump: PathBuf,
        /// Take artifact paths from TYPE_LIB, FUN_LOCALS and COLLECTED_VARS
        #[arg(
            long,
            conflicts_with_all = ["type_lib_in", "type_lib_out", "fun_locals_out", "collected_vars_out"]
        )]
        from_env: bool,
        /// Type library to extend
        #[arg(long)]
        type_lib_in: Option<PathBuf>,
        #[arg(long, required_unless_present = "from_env")]
        type_lib_out: Option<PathBuf>,
        #[arg(long, required_unless_present = "from_env")]
        fun_locals_out: Option<PathBuf>,
        /// Also collect address fingerprints and write them here
        #[arg(long)]
        collected_vars_out: Option<PathBuf>,
    },
    /// Summarize a type library
    Types {
        /// Type library file
        lib: PathBuf,
        /// Only print how many descriptors there are of each size
        #[arg(long)]
        sizes: bool,
    },
    /// Print a Function Locals Table
    Locals {
        /// Function locals file
        file: PathBuf,
    },
    /// Merge type libraries, e.g. from several binaries
    Merge {
        /// Output library
        #[arg(short, long)]
        output: PathBuf,
        /// Input libraries
        #[arg(required = true)]
        libs: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Collect {
            dump,
            from_env,
            type_lib_in,
            type_lib_out,
            fun_locals_out,
            collected_vars_out,
        } => {
            let config = if from_env {
                CollectorConfig::from_env().unwrap_or_else(|e| fail(e))
            } else {
                match (type_lib_out, fun_locals_out) {
                    (Some(type_lib_out), Some(fun_locals_out)) => CollectorConfig {
                        type_lib_in,
                        type_lib_out,
                        fun_locals_out,
                        collected_vars_out,
                    },
                    _ => fail("--type-lib-out and --fun-locals-out are required without --from-env"),
                }
            };
            cmd_collect(&dump, config)
        }
        Commands::Types { lib, sizes } => cmd_types(&lib, sizes),
        Commands::Locals { file } => cmd_locals(&file),
        Commands::Merge { output, libs } => cmd_merge(&output, &libs),
    }
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    process::exit(1);
}

fn cmd_collect(dump: &Path, config: CollectorConfig) {
    let mut host = JsonDumpHost::load(dump).unwrap_or_else(|e| fail(e));
    let collector = Collector::new(config);
    match collector.run(&mut host) {
        Ok(summary) => println!("{}", summary),
        Err(e) => fail(e),
    }
}

fn cmd_types(path: &Path, sizes: bool) {
    let lib = load_type_library(path).unwrap_or_else(|e| fail(format!("{}: {}", path.display(), e)));

    if !sizes {
        print!("{}", lib);
        return;
    }

    let mut by_size: BTreeMap<u64, usize> = BTreeMap::new();
    for (id, _) in lib.iter() {
        *by_size.entry(lib.size_of(id)).or_default() += 1;
    }
    println!("{:>10}  descriptors", "bytes");
    for (size, count) in by_size {
        println!("{:>10}  {}", size, count);
    }
}

fn cmd_locals(path: &Path) {
    let table = read_function_locals(path).unwrap_or_else(|e| fail(format!("{}: {}", path.display(), e)));
    for (function, names) in table.iter() {
        println!("{}: {}", function, names.join(", "));
    }
    println!(
        "{} functions, {} user-named variables",
        table.len(),
        table.variable_count()
    );
}

fn cmd_merge(output: &Path, libs: &[PathBuf]) {
    let mut merged = TypeLibrary::new();
    for path in libs {
        let lib = load_type_library(path).unwrap_or_else(|e| fail(format!("{}: {}", path.display(), e)));
        merged.merge(&lib);
    }
    if let Err(e) = write_type_library(output, &merged) {
        fail(e);
    }
    println!("{} descriptors from {} libraries", merged.len(), libs.len());
}
