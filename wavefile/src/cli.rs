use std::path::PathBuf;
use std::time::Duration;

use clap::{builder::ValueParser, value_parser, Arg, ArgAction, Command};

pub const DEFAULT_CHANNELS: &str = "1";
pub const DEFAULT_SAMPLE_RATE: &str = "8000";
pub const DEFAULT_BITS_PER_SAMPLE: &str = "16";
pub const DEFAULT_THRESHOLD: &str = "0";

/// Parse a duration such as `5s`, `1.5s`, `250ms`, `2m` or `1m30s`.
///
/// A bare number is taken as seconds. Components may carry a fractional
/// part and are summed; the total must be greater than zero and is kept to
/// microsecond precision.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let input = value.trim();
    if input.is_empty() {
        return Err("duration cannot be empty".into());
    }

    let invalid = || format!("invalid duration '{value}'");

    if let Ok(seconds) = input.parse::<f64>() {
        return seconds_to_duration(seconds).ok_or_else(invalid);
    }

    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut index = 0;
    let mut total_secs = 0f64;

    while index < len {
        let start = index;
        while index < len && (bytes[index].is_ascii_digit() || bytes[index] == b'.') {
            index += 1;
        }
        if start == index || index >= len {
            return Err(invalid());
        }

        let number = input[start..index].parse::<f64>().map_err(|_| invalid())?;

        let remainder = &input[index..];
        let (unit_len, factor) = if remainder.starts_with("ms") {
            (2, 0.001)
        } else if remainder.starts_with('s') {
            (1, 1.0)
        } else if remainder.starts_with('m') {
            (1, 60.0)
        } else if remainder.starts_with('h') {
            (1, 3_600.0)
        } else {
            return Err(invalid());
        };

        index += unit_len;
        total_secs += number * factor;
    }

    seconds_to_duration(total_secs).ok_or_else(invalid)
}

fn seconds_to_duration(seconds: f64) -> Option<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }
    let micros = (seconds * 1_000_000.0).round();
    if micros < 1.0 || micros > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_micros(micros as u64))
}

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .about("Inspect, create and compare WAVE files")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("info")
                .about("Print the RIFF, fmt and data headers of a WAVE file")
                .arg(file_arg("file_path", "Path to the WAVE file"))
                .arg(
                    Arg::new("data")
                        .long("data")
                        .help("Also read the sample data and report its length")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("create")
                .about("Write a PCM WAVE file filled with alphanumeric noise")
                .arg(file_arg("file_path", "Path of the WAVE file to write"))
                .arg(
                    Arg::new("duration")
                        .short('d')
                        .long("duration")
                        .value_name("DURATION")
                        .help("Length of the audio (e.g. 5s, 1.5s, 250ms)")
                        .required(true)
                        .value_parser(ValueParser::new(parse_duration)),
                )
                .arg(
                    Arg::new("channels")
                        .short('c')
                        .long("channels")
                        .value_name("COUNT")
                        .help("Number of interleaved channels")
                        .default_value(DEFAULT_CHANNELS)
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("sample-rate")
                        .short('r')
                        .long("sample-rate")
                        .value_name("HZ")
                        .help("Sample frames per second")
                        .default_value(DEFAULT_SAMPLE_RATE)
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("bits")
                        .short('b')
                        .long("bits")
                        .value_name("BITS")
                        .help("Bits per sample, a multiple of 8")
                        .default_value(DEFAULT_BITS_PER_SAMPLE)
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("overwrite")
                        .long("overwrite")
                        .help("Replace the file if it already exists")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("compare")
                .about("Score how similar the sample data of two WAVE files is")
                .arg(file_arg("first", "First WAVE file"))
                .arg(file_arg("second", "Second WAVE file"))
                .arg(
                    Arg::new("threshold")
                        .short('t')
                        .long("threshold")
                        .value_name("DELTA")
                        .help("Largest byte difference still counted as a match")
                        .default_value(DEFAULT_THRESHOLD)
                        .value_parser(value_parser!(u8)),
                ),
        )
}

fn file_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .value_name("FILE")
        .help(help)
        .required(true)
        .value_parser(value_parser!(PathBuf))
}
