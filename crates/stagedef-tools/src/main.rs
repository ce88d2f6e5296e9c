//! stagedef-extract - convert stage definition files to XML (and OBJ)
//!
//! ```bash
//! # XML next to each input
//! stagedef-extract STAGE001.lz STAGE002.lz
//!
//! # Also write collision meshes, into out/
//! stagedef-extract -m -o out stages/*.lz
//! ```
//!
//! Logging goes through `env_logger`; `RUST_LOG` overrides the default level.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;
use stagedef_tools::{run_batch, DecompressMode, ExtractOptions};

/// Extract Super Monkey Ball stage definitions to XML
#[derive(Parser)]
#[command(name = "stagedef-extract")]
#[command(version)]
struct Cli {
    /// Also write the collision mesh as Wavefront OBJ
    #[arg(short = 'm', long)]
    mesh: bool,

    /// When to LZ-decompress inputs
    #[arg(long, value_enum, default_value = "auto")]
    decompress: DecompressMode,

    /// Output directory (defaults to each input's directory)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Log decoding details
    #[arg(short, long)]
    verbose: bool,

    /// Stage definition files
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let options = ExtractOptions {
        write_mesh: cli.mesh,
        decompress: cli.decompress,
        output_dir: cli.output_dir,
    };
    let summary = run_batch(&cli.files, &options);
    info!(
        "{} extracted, {} skipped, {} failed",
        summary.extracted, summary.skipped, summary.failed
    );

    if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
