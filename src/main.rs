// src/main.rs - Load a profile document, validate it and print sampled kinematics
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use motion_profile::{load_document, validate_segments, MotionProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "profile-tool", version, about = "Sample a motion profile document")]
struct Cli {
    /// Profile document (.toml or .json)
    document: PathBuf,

    /// Sampling period in seconds
    #[arg(long, default_value_t = 0.01)]
    step: f64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// trace, debug, info, warn or error
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

#[derive(Debug, Serialize)]
struct SampleRow {
    t: f64,
    position: f64,
    velocity: f64,
    acceleration: f64,
}

fn summarize(profile: &MotionProfile) {
    tracing::info!(
        "{} profile: {} segments, duration {} s",
        profile.profile_type(),
        profile.count_segments(),
        profile.duration()
    );
    for load_type in motion_profile::LoadType::types_for(profile.profile_type()) {
        if let Ok(loads) = profile.get_all_load_segments(*load_type) {
            if !loads.is_empty() {
                tracing::info!("{} load segments: {}", load_type, loads.len());
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    // logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Loading profile document from: {}", cli.document.display());
    let document = load_document(&cli.document)?;
    let profile = document.build_profile().map_err(|e| {
        tracing::error!("Failed to build profile: {}", e);
        e
    })?;
    summarize(&profile);

    validate_segments(&profile.get_all_basic_segments()).map_err(|e| {
        tracing::error!("Profile is not continuous: {}", e);
        e
    })?;

    let rows = profile.sample(cli.step)?;
    tracing::debug!("Sampled {} rows every {} s", rows.len(), cli.step);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Csv => {
            writeln!(out, "t,position,velocity,acceleration")?;
            for [t, p, v, a] in rows {
                writeln!(out, "{},{},{},{}", t, p, v, a)?;
            }
        }
        OutputFormat::Json => {
            let rows: Vec<SampleRow> = rows
                .into_iter()
                .map(|[t, position, velocity, acceleration]| SampleRow { t, position, velocity, acceleration })
                .collect();
            serde_json::to_writer_pretty(&mut out, &rows)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
