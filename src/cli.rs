// Command-line interface for imgpatch.
//
// Two invocation modes, both converging on the same engine entry point:
// extract the inputs from an OTA zip, or read them from named files in
// a directory.

use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use log::LevelFilter;

use crate::engine::ApplyStats;
use crate::error::ApplyError;
use crate::io;

const DEFAULT_OUTPUT: &str = "recovery.img";

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// IMGDIFF2 image patch applier.
#[derive(Parser, Debug)]
#[command(
    name = "imgpatch",
    version,
    about = "Reconstructs a recovery image from a boot image and an IMGDIFF2 patch",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Extract boot.img and the recovery patch from an OTA zip.
    FromOta(FromOtaArgs),
    /// Read boot.img, recovery-from-boot.p and the optional
    /// recovery-resource.dat from a directory.
    FromDir(FromDirArgs),
}

#[derive(Args, Debug)]
struct FromOtaArgs {
    /// OTA zip archive.
    #[arg(value_hint = ValueHint::FilePath)]
    ota_zip: PathBuf,

    /// Output image path.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT, value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct FromDirArgs {
    /// Directory holding the input files.
    #[arg(default_value = ".", value_hint = ValueHint::DirPath)]
    path: PathBuf,

    /// Output image path.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT, value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run the CLI: parse arguments, apply the patch, report, set the exit
/// status.
pub fn run() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = match &cli.command {
        Cmd::FromOta(args) => {
            if !args.ota_zip.is_file() {
                eprintln!("imgpatch: {} is not a file", args.ota_zip.display());
                process::exit(1);
            }
            io::apply_from_ota(&args.ota_zip, &args.output)
        }
        Cmd::FromDir(args) => {
            if !args.path.is_dir() {
                eprintln!("imgpatch: {} is not a directory", args.path.display());
                process::exit(1);
            }
            io::apply_from_dir(&args.path, &args.output)
        }
    };

    match result {
        Ok(stats) => report_stats(&cli, &stats),
        Err(err) => {
            report_error(&err);
            process::exit(1);
        }
    }
}

fn init_logging(quiet: bool, verbose: u8) {
    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn report_stats(cli: &Cli, stats: &ApplyStats) {
    if cli.json_output {
        let json = serde_json::json!({
            "chunks": stats.chunk_count,
            "source_bytes": stats.source_len,
            "bytes_written": stats.bytes_written,
            "output_bytes": stats.output_len,
        });
        eprintln!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "imgpatch: {} chunks applied, {} bytes written, output {} bytes",
            stats.chunk_count, stats.bytes_written, stats.output_len
        );
    }
}

fn report_error(err: &ApplyError) {
    eprintln!("imgpatch: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("imgpatch:   caused by: {cause}");
        source = cause.source();
    }
}
