//! # ovpo CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ovpo_cli::schema::{run_print_schema, PrintSchemaArgs};
use ovpo_cli::validate::{
    run_validate_folder, run_validate_json, ValidateFolderArgs, ValidateJsonArgs,
};
use ovpo_cli::{load_validator, run_version};

/// OVPO CLI
///
/// Validates trace, event and batch documents against the versioned
/// OVPO schemas.
#[derive(Parser, Debug)]
#[command(name = "ovpo", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding the versioned schema directories.
    #[arg(long, global = true, env = "OVPO_SCHEMAS_ROOT", default_value = "schemas")]
    schemas_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the CLI and schema versions.
    Version,

    /// Validate a JSON document against a schema.
    ValidateJson(ValidateJsonArgs),

    /// Validate every JSON document under a directory.
    ValidateFolder(ValidateFolderArgs),

    /// Print a schema document with sorted keys.
    PrintSchema(PrintSchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Version => run_version(),
        Commands::ValidateJson(args) => {
            load_validator(&cli.schemas_root).and_then(|v| run_validate_json(args, &v))
        }
        Commands::ValidateFolder(args) => {
            load_validator(&cli.schemas_root).and_then(|v| run_validate_folder(args, &v))
        }
        Commands::PrintSchema(args) => {
            load_validator(&cli.schemas_root).and_then(|v| run_print_schema(args, &v))
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
