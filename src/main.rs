//! mcucalc - Microcontroller helper calculations
//!
//! Command-line front end for the calculation kernels in the `mcucalc`
//! library. Every subcommand prints a plain-text report, or pretty JSON with
//! `--format json`.
//!
//! # Usage
//!
//! ```bash
//! mcucalc crc32 "Hello, CRC32!"              # CRC of UTF-8 text
//! mcucalc crc32 --hex "DE AD BE EF"          # CRC of hex bytes
//! mcucalc xor 0x1A 25 0b1010                 # XOR checksum
//! mcucalc base64 encode "héllo"              # Base64 encoding
//! mcucalc base ff --from 16                  # Base conversion
//! mcucalc storage 0x0000-0x4000              # Address range size
//! mcucalc storage 1.5 --unit KB              # Unit conversion
//! mcucalc pwm --clock 24 --target 1000 --duty 50 --code
//! mcucalc clock --clock 72 --divider 7200 --time-unit us
//! echo "123456789" | mcucalc crc32 -         # Read input from stdin
//! ```
//!
//! Defaults for omitted units and the output format come from
//! `~/.local/share/mcucalc/config.json` (see `mcucalc config`).

use clap::{ArgAction, Parser, Subcommand};
use mcucalc::config::{self, AppConfig, OutputFormat};
use mcucalc::core::crc32::{self, InputMode};
use mcucalc::core::radix::{self, Radix};
use mcucalc::core::storage::{self, StorageUnit};
use mcucalc::core::timer::{self, FrequencyUnit, TimeUnit};
use mcucalc::core::{base64, xor_sum};
use mcucalc::report::{self, Report};
use serde::Serialize;
use std::io::Read;
use std::process::ExitCode;

shadow_rs::shadow!(build);

#[derive(Parser)]
#[command(name = "mcucalc")]
#[command(version, long_version = build::CLAP_LONG_VERSION)]
#[command(about = "Checksum, encoding, unit and timer calculators for MCU work", long_about = None)]
struct Cli {
    /// Output format (text or json), overrides the saved default
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the CRC-32 of text or hex bytes
    Crc32 {
        /// Input text, or `-` to read stdin
        input: String,
        /// Treat input as hex byte pairs (whitespace ignored), same as `--mode hex`
        #[arg(long, conflicts_with = "mode")]
        hex: bool,
        /// Input interpretation (text or hex), overrides the saved default
        #[arg(long)]
        mode: Option<InputMode>,
    },
    /// XOR decimal, 0x hex and 0b binary values together
    Xor {
        /// Values, separated by spaces or commas; `-` reads stdin
        #[arg(required = true, num_args = 1..)]
        values: Vec<String>,
    },
    /// Encode or decode Base64
    Base64 {
        #[command(subcommand)]
        action: Base64Action,
    },
    /// Convert an integer between bases 2, 8, 10 and 16
    Base {
        /// Digits to convert, without prefix
        value: String,
        /// Source base (2, 8, 10, 16 or bin/oct/dec/hex)
        #[arg(long)]
        from: Radix,
    },
    /// Convert storage sizes or measure an address range
    Storage {
        /// Amount (e.g. `1.5`, `0x400`) or range (e.g. `0x0000-0x3FFF`)
        input: String,
        /// Input unit: register, b, B, KB, MB, GB
        #[arg(short, long)]
        unit: Option<StorageUnit>,
    },
    /// Find divider, period and duty registers for a PWM output
    Pwm {
        /// Source clock frequency
        #[arg(long)]
        clock: f64,
        /// Unit of --clock (Hz, kHz, MHz, GHz)
        #[arg(long)]
        clock_unit: Option<FrequencyUnit>,
        /// Target PWM frequency
        #[arg(long)]
        target: f64,
        /// Unit of --target (Hz, kHz, MHz, GHz)
        #[arg(long)]
        target_unit: Option<FrequencyUnit>,
        /// Duty cycle in percent
        #[arg(long)]
        duty: Option<f64>,
        /// Also print C initialization code
        #[arg(long)]
        code: bool,
    },
    /// Divide a clock, optionally solving the period for a target frequency
    Clock {
        /// Source clock frequency
        #[arg(long)]
        clock: f64,
        /// Unit of --clock (Hz, kHz, MHz, GHz)
        #[arg(long)]
        clock_unit: Option<FrequencyUnit>,
        /// Clock divider, fractional values allowed
        #[arg(long)]
        divider: f64,
        /// Target frequency for the period register
        #[arg(long)]
        target: Option<f64>,
        /// Unit of --target (Hz, kHz, MHz, GHz)
        #[arg(long)]
        target_unit: Option<FrequencyUnit>,
        /// Unit for period times (s, ms, us, ns)
        #[arg(long)]
        time_unit: Option<TimeUnit>,
    },
    /// Show the effective configuration and where it is stored
    Config {
        /// Persist the effective configuration to disk
        #[arg(long)]
        write: bool,
    },
}

#[derive(Subcommand)]
enum Base64Action {
    /// Encode UTF-8 text
    Encode {
        /// Text to encode, or `-` to read stdin
        text: String,
    },
    /// Decode Base64 into UTF-8 text
    Decode {
        /// Base64 input, or `-` to read stdin
        input: String,
    },
}

/// PWM registers plus the optional generated C code, for JSON output
#[derive(Serialize)]
struct PwmOutput<'a> {
    #[serde(flatten)]
    solution: &'a timer::TimerSolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl Report for PwmOutput<'_> {
    fn to_text(&self) -> String {
        match &self.code {
            Some(code) => format!("{}\n\n{}", self.solution.to_text(), code.trim_end()),
            None => self.solution.to_text(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match handle_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(err) = e.downcast_ref::<mcucalc::Error>() {
                eprintln!("Hint: {}", err.hint());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Returns `arg`, or all of stdin when `arg` is `-`.
///
/// A single trailing newline is dropped so piped `echo` output hashes the
/// same as the typed argument.
fn read_input(arg: String) -> std::io::Result<String> {
    if arg != "-" {
        return Ok(arg);
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(buf)
}

/// `--hex` wins, then `--mode`, then the configured default.
fn crc_input_mode(hex: bool, mode: Option<InputMode>, default: InputMode) -> InputMode {
    if hex {
        InputMode::Hex
    } else {
        mode.unwrap_or(default)
    }
}

fn emit<T: Report + Serialize>(
    value: &T,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", report::render(value, format)?);
    Ok(())
}

fn handle_cli(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config();
    let format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Crc32 { input, hex, mode } => {
            let mode = crc_input_mode(hex, mode, config.crc_input_mode);
            emit(&crc32::checksum(&read_input(input)?, mode)?, format)?;
        }
        Commands::Xor { values } => {
            let values = values
                .into_iter()
                .map(read_input)
                .collect::<std::io::Result<Vec<_>>>()?;
            emit(&xor_sum::xor_fold_str(&values.join(" "))?, format)?;
        }
        Commands::Base64 { action } => {
            let output = match action {
                Base64Action::Encode { text } => base64::encode(&read_input(text)?),
                Base64Action::Decode { input } => base64::decode(read_input(input)?.trim())?,
            };
            emit(&output, format)?;
        }
        Commands::Base { value, from } => {
            emit(&radix::convert(&read_input(value)?, from)?, format)?;
        }
        Commands::Storage { input, unit } => {
            let unit = unit.unwrap_or(config.storage_unit);
            emit(&storage::convert(&read_input(input)?, unit)?, format)?;
        }
        Commands::Pwm {
            clock,
            clock_unit,
            target,
            target_unit,
            duty,
            code,
        } => {
            let source_hz = clock_unit.unwrap_or(config.clock_unit).to_hz(clock);
            let target_hz = target_unit.unwrap_or(config.target_unit).to_hz(target);
            let solution = timer::solve(
                source_hz,
                target_hz,
                duty.unwrap_or(config.duty_percent),
            )?;
            let output = PwmOutput {
                code: code.then(|| timer::pwm_init_snippet(&solution)),
                solution: &solution,
            };
            emit(&output, format)?;
        }
        Commands::Clock {
            clock,
            clock_unit,
            divider,
            target,
            target_unit,
            time_unit,
        } => {
            let source_hz = clock_unit.unwrap_or(config.clock_unit).to_hz(clock);
            let time_unit = time_unit.unwrap_or(config.time_unit);
            if let Some(target) = target {
                let target_hz = target_unit.unwrap_or(config.target_unit).to_hz(target);
                emit(
                    &timer::solve_fixed(source_hz, target_hz, divider, time_unit)?,
                    format,
                )?;
            } else {
                emit(&timer::divide_clock(source_hz, divider, time_unit)?, format)?;
            }
        }
        Commands::Config { write } => show_config(&config, write)?,
    }
    Ok(())
}

fn show_config(config: &AppConfig, write: bool) -> Result<(), Box<dyn std::error::Error>> {
    if write {
        let path = config::save_config(config)?;
        println!("Saved configuration to {}", path.display());
    } else if let Some(path) = config::config_path() {
        println!("Configuration file: {}", path.display());
    } else {
        println!("Configuration file: unavailable (no data directory)");
    }
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_crc(args: &[&str]) -> (bool, Option<InputMode>) {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Crc32 { hex, mode, .. } => (hex, mode),
            _ => panic!("expected crc32 subcommand"),
        }
    }

    #[test]
    fn test_crc_mode_overrides_hex_default() {
        let (hex, mode) = parse_crc(&["mcucalc", "crc32", "--mode", "text", "abc"]);
        assert_eq!(
            crc_input_mode(hex, mode, InputMode::Hex),
            InputMode::Text
        );
    }

    #[test]
    fn test_crc_hex_flag_and_default() {
        let (hex, mode) = parse_crc(&["mcucalc", "crc32", "--hex", "DEAD"]);
        assert_eq!(crc_input_mode(hex, mode, InputMode::Text), InputMode::Hex);

        let (hex, mode) = parse_crc(&["mcucalc", "crc32", "abc"]);
        assert_eq!(crc_input_mode(hex, mode, InputMode::Hex), InputMode::Hex);
        assert_eq!(crc_input_mode(hex, mode, InputMode::Text), InputMode::Text);
    }

    #[test]
    fn test_crc_hex_conflicts_with_mode() {
        assert!(
            Cli::try_parse_from(["mcucalc", "crc32", "--hex", "--mode", "text", "ab"]).is_err()
        );
        assert!(Cli::try_parse_from(["mcucalc", "crc32", "--mode", "octal", "ab"]).is_err());
    }
}
