/// COBS command-line tool: frame, unframe, and inspect byte streams using
/// Consistent Overhead Byte Stuffing.
///
/// # Command overview
///
/// ```text
/// cobs <COMMAND> [OPTIONS]
///
/// Commands:
///   encode     Encode the input as a single COBS frame
///   decode     Decode one COBS frame back into its payload
///   inspect    Print the group layout of every frame in the input
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log frame-level details to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                     |
/// |------|---------------------------------------------|
/// | 0    | Success                                     |
/// | 1    | Error (I/O failure, malformed frame, etc.)  |
///
/// Diagnostics go to stderr so stdout can be piped cleanly.
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cobs_wire::CobsConfig;
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_encode;
mod cmd_inspect;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Consistent Overhead Byte Stuffing encoder / decoder.
#[derive(Parser)]
#[command(name = "cobs", version, about = "COBS framing CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log frame boundaries and malformed input to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Encode the input as a single COBS frame.
    Encode(EncodeArgs),
    /// Decode one COBS frame back into its payload.
    Decode(DecodeArgs),
    /// Print the group layout of every frame in the input.
    Inspect(InspectArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Framing options shared by every sub-command.
///
/// ```text
/// ┌──────────────────┬──────────────────────────────────────────────────┐
/// │ Flag             │ Effect                                           │
/// ├──────────────────┼──────────────────────────────────────────────────┤
/// │ -s, --sentinel N │ frame delimiter, decimal or 0x hex (default 0)   │
/// │ -r, --reduced    │ COBS/R: fold the last byte into the length byte  │
/// │ -i, --input F    │ read from F instead of stdin                     │
/// │ -o, --output F   │ write to F instead of stdout                     │
/// └──────────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct FramingArgs {
    /// Sentinel (frame delimiter) value, decimal or `0x`-prefixed hex.
    #[arg(short, long, default_value = "0", value_parser = parse_sentinel)]
    pub sentinel: u8,

    /// Use the reduced (COBS/R) variant.
    #[arg(short, long)]
    pub reduced: bool,

    /// Input file (defaults to stdin).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file (defaults to stdout).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl FramingArgs {
    pub fn config(&self) -> CobsConfig {
        CobsConfig::new()
            .with_sentinel(self.sentinel)
            .with_reduced(self.reduced)
    }
}

/// Arguments for `cobs encode`.
#[derive(clap::Args)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub framing: FramingArgs,

    /// Append the sentinel after the encoded frame.
    #[arg(short, long)]
    pub del: bool,
}

/// Arguments for `cobs decode`.
///
/// Input after the first sentinel is ignored with a warning; a missing
/// sentinel is fine as long as the frame is complete.
#[derive(clap::Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub framing: FramingArgs,
}

/// Arguments for `cobs inspect`.
#[derive(clap::Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub framing: FramingArgs,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parse a sentinel given as decimal (`10`) or hex (`0x0A`).
fn parse_sentinel(raw: &str) -> Result<u8, String> {
    let value = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => raw.parse::<i64>(),
    }
    .map_err(|e| format!("invalid sentinel {raw:?}: {e}"))?;

    u8::try_from(value).map_err(|_| format!("sentinel value ({value}) must be in [0x00, 0xFF]"))
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Encode(args) => cmd_encode::run(&args),
        Commands::Decode(args) => cmd_decode::run(&args),
        Commands::Inspect(args) => cmd_inspect::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

// ── I/O helpers ───────────────────────────────────────────────────────────────

/// Open the input named by `--input`, or stdin.
pub fn open_input(path: Option<&PathBuf>) -> Result<Box<dyn Read>> {
    let reader: Box<dyn Read> = match path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    Ok(reader)
}

/// Open the output named by `--output`, or stdout.
pub fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_accepts_decimal_and_hex() {
        assert_eq!(parse_sentinel("0"), Ok(0));
        assert_eq!(parse_sentinel("10"), Ok(10));
        assert_eq!(parse_sentinel("0x0A"), Ok(10));
        assert_eq!(parse_sentinel("0Xff"), Ok(255));
    }

    #[test]
    fn sentinel_out_of_range() {
        assert_eq!(
            parse_sentinel("256"),
            Err("sentinel value (256) must be in [0x00, 0xFF]".to_string())
        );
        assert_eq!(
            parse_sentinel("-1"),
            Err("sentinel value (-1) must be in [0x00, 0xFF]".to_string())
        );
        assert!(parse_sentinel("0xZZ").is_err());
    }

    #[test]
    fn cli_parses_encode_flags() {
        let cli = Cli::try_parse_from(["cobs", "encode", "-s", "0x0A", "-r", "-d"]).unwrap();
        let Commands::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert!(args.del);
        assert_eq!(args.framing.config(), CobsConfig::new().with_sentinel(10).with_reduced(true));
    }

    #[test]
    fn cli_rejects_bad_sentinel() {
        assert!(Cli::try_parse_from(["cobs", "decode", "--sentinel", "300"]).is_err());
    }
}
