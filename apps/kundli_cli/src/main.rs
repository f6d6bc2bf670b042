use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use kundli::predictions::RuleSet;
use kundli::{ChartPipeline, FrameEphemeris, GeoLocation, HoroscopeReport, StaticGeocoder};
use log::info;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sidereal chart, dashas, transits and predictions from recorded ephemeris frames")]
struct Args {
    /// JSON file of recorded ephemeris frames (`{"frames": [...]}`).
    #[arg(long)]
    frames: PathBuf,

    /// Birth instant, RFC 3339 (e.g. 1990-01-01T05:30:00+05:30).
    #[arg(long)]
    birth: String,

    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Reference instant for dashas and transits (default: current time).
    #[arg(long)]
    now: Option<String>,

    /// Rule file overriding both configs/kundli.toml and the embedded rules.
    #[arg(long)]
    rules: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn parse_instant(label: &str, text: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("--{label} must be RFC 3339, got {text:?}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !(-90.0..=90.0).contains(&args.lat) || !(-180.0..=180.0).contains(&args.lon) {
        anyhow::bail!("Coordinates out of range: ({}, {})", args.lat, args.lon);
    }
    let birth = parse_instant("birth", &args.birth)?;
    let now = match &args.now {
        Some(text) => parse_instant("now", text)?,
        None => Utc::now(),
    };

    let settings = kundli_config::load_settings()?;
    let frames_text = fs::read_to_string(&args.frames)
        .with_context(|| format!("Failed to read {}", args.frames.display()))?;
    let ephemeris = FrameEphemeris::from_json(&frames_text)?;
    info!("Loaded {} ephemeris frames", ephemeris.frames.len());

    let engine = match &args.rules {
        Some(path) => kundli::PredictionEngine::new(RuleSet::load(path)).with_limits(
            settings.prediction.max_per_timeframe,
            settings.prediction.summary_window,
        ),
        None => settings.prediction_engine(),
    };
    info!("Using {} prediction rules", engine.rules().len());

    let geocoder = StaticGeocoder::new();
    let chart = ChartPipeline::new(&ephemeris, &geocoder)
        .with_house_system(settings.house_system)
        .chart_at(birth, GeoLocation { lat: args.lat, lon: args.lon })?;
    let report = HoroscopeReport::compose(&chart, &ephemeris, &engine, now)?;

    let mut output = serde_json::Map::new();
    output.insert("chart".into(), serde_json::to_value(&chart)?);
    output.insert("horoscope".into(), serde_json::to_value(&report)?);
    let text = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");
    Ok(())
}
