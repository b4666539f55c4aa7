mod cli;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::ArgMatches;
use log::debug;
use wavefile_core::{compare_files, create_pcm_file, read_file, Comparison, PcmFormat, WaveFile};

use crate::cli::build_cli;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = build_cli().get_matches();
    match matches.subcommand() {
        Some(("info", sub)) => info(sub),
        Some(("create", sub)) => create(sub),
        Some(("compare", sub)) => compare(sub),
        _ => unreachable!("a subcommand is required"),
    }
}

fn info(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = matches
        .get_one::<PathBuf>("file_path")
        .expect("required argument");
    let read_data = matches.get_flag("data");

    let wav = read_file(path, read_data)
        .with_context(|| format!("failed to read '{}'", path.display()))?
        .ok_or_else(|| missing_input(path))?;

    print_summary(path, &wav);
    Ok(())
}

fn create(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = matches
        .get_one::<PathBuf>("file_path")
        .expect("required argument");
    let duration = *matches
        .get_one::<Duration>("duration")
        .expect("required argument");
    let channels = *matches.get_one::<u16>("channels").expect("defaulted argument");
    let sample_rate = *matches
        .get_one::<u32>("sample-rate")
        .expect("defaulted argument");
    let bits = *matches.get_one::<u16>("bits").expect("defaulted argument");

    if path.exists() && !matches.get_flag("overwrite") {
        bail!(
            "output file already exists: {} (pass --overwrite to replace it)",
            path.display()
        );
    }

    let format = PcmFormat::builder()
        .channels(channels)
        .sample_rate(sample_rate)
        .bits_per_sample(bits)
        .build()
        .context("invalid output format")?;
    debug!("creating '{}' with {format:?}", path.display());

    let wav = create_pcm_file(path, duration.as_secs_f64(), format)
        .with_context(|| format!("failed to create '{}'", path.display()))?;

    print_summary(path, &wav);
    Ok(())
}

fn compare(matches: &ArgMatches) -> anyhow::Result<()> {
    let first = matches
        .get_one::<PathBuf>("first")
        .expect("required argument");
    let second = matches
        .get_one::<PathBuf>("second")
        .expect("required argument");
    let threshold = *matches
        .get_one::<u8>("threshold")
        .expect("defaulted argument");

    let comparison = compare_files(first, second, threshold).with_context(|| {
        format!(
            "failed to compare '{}' with '{}'",
            first.display(),
            second.display()
        )
    })?;

    match comparison {
        Comparison::Similarity(percent) => println!("Similarity: {percent:.2}%"),
        Comparison::Incompatible { field } => println!("Not comparable: {field} differs"),
        Comparison::Unavailable(path) => return Err(missing_input(&path)),
    }

    Ok(())
}

fn missing_input(path: &Path) -> anyhow::Error {
    anyhow!("input file does not exist: {}", path.display())
}

fn print_summary(path: &Path, wav: &WaveFile) {
    let fmt = &wav.fmt;
    let format_name = fmt.audio_format_name().unwrap_or("unknown");

    println!("File:            {}", path.display());
    println!("RIFF chunk size: {} bytes", wav.header.chunk_size);
    println!("Audio format:    {format_name} ({})", fmt.audio_format);
    println!("Channels:        {}", fmt.num_channels);
    println!("Sample rate:     {} Hz", fmt.sample_rate);
    println!("Byte rate:       {} bytes/s", fmt.byte_rate);
    println!("Block align:     {} bytes", fmt.block_align);
    println!("Bits per sample: {}", fmt.bits_per_sample);
    if !fmt.is_pcm() {
        println!("Extra params:    {} bytes", fmt.extra_param_size);
    }
    println!("Data size:       {} bytes", wav.data.size);
    if let Some(duration) = wav.duration() {
        println!("Duration:        {:.3} s", duration.as_secs_f64());
    }
    if let Some(payload) = wav.data.payload() {
        println!("Payload read:    {} bytes", payload.len());
    }
}
