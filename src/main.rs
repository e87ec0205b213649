//! Virtual time tagger demo CLI
//!
//! Runs a full simulated acquisition: laser on, aggregate counts, a raw
//! tag stream to disk, and a cross-correlation histogram of the stream.

use clap::Parser;
use photon_tagger::engine::{FileConfig, PumpLaser, SimLaser, TaggerEngine};
use photon_tagger::histogram::{cross_correlation_histogram, HistogramParams};
use photon_tagger::tags::read_tag_file;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "photon-tagger", about = "Virtual time-correlated photon counting demo")]
struct Args {
    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Acquisition duration in seconds.
    #[arg(long, default_value_t = 1.0)]
    duration: f64,

    /// Pump laser power in milliwatts.
    #[arg(long, default_value_t = 1.0)]
    power: f64,

    /// Output path for the raw tag stream.
    #[arg(long, default_value = "tags.txt")]
    tags_out: PathBuf,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Virtual Time Tagger v{}", photon_tagger::VERSION);

    let config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let mut engine = match args.seed {
        Some(seed) => TaggerEngine::with_seed(&config, seed),
        None => TaggerEngine::new(&config),
    };

    let mut laser = SimLaser::new();
    laser.set_power_mw(args.power);
    laser.set_emission(true);
    engine.attach_laser(Box::new(laser));

    // Aggregate acquisition
    engine.read(args.duration);

    for party in engine.parties() {
        let [ch_0, ch_1] = party.channels();
        for ch in [ch_0, ch_1] {
            let data = engine.get_count_data(&[ch]);
            println!(
                "{} channel {:2}: {:8} counts  ({:.0} Hz)",
                party.name(),
                ch,
                data.count,
                data.rate_hz
            );
        }
    }

    let coincidences = engine.get_count_data(&[1, 4]);
    println!(
        "Coincidences 1&4: {:8} counts  ({:.0} Hz)",
        coincidences.count, coincidences.rate_hz
    );

    // Raw tag stream
    let written = match engine.save_tags(&args.tags_out, args.duration) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("Failed to write tag file: {}", e);
            std::process::exit(1);
        }
    };
    info!("{} tags written to {}", written, args.tags_out.display());

    // Round-trip through the file format into the analyzer
    let tags = match read_tag_file(&args.tags_out) {
        Ok(tags) => tags,
        Err(e) => {
            eprintln!("Failed to read tag file back: {}", e);
            std::process::exit(1);
        }
    };

    let params = HistogramParams {
        ch_a: 1,
        ch_b: 4,
        bin_width_ns: 1.0,
        hist_width_ns: 50.0,
    };
    match cross_correlation_histogram(&tags, &params) {
        Ok(hist) => {
            let peak = hist
                .counts
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1));
            if let Some((bin, &count)) = peak {
                println!(
                    "Histogram peak: {} pairs at dt = {:.1} ns",
                    count, hist.bin_centers_ns[bin]
                );
            }
        }
        Err(e) => {
            eprintln!("Histogram failed: {}", e);
            std::process::exit(1);
        }
    }

    info!("Done.");
}
