use anyhow::{ensure, Context, Result};
use cardcount_core::ClassNames;
use cardcount_cv::detection::{
    read_frames, write_frames, AdapterConfig, DetectionAdapter, ReplaySource,
};
use cardcount_cv::{CardTracker, TrackerConfig};
use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};
use std::path::PathBuf;

mod replay;
mod simulate;

use simulate::{SimulationParams, TableSimulator};

#[derive(Parser, Debug)]
#[command(name = "cardcount", about = "Track cards on a blackjack table and keep the Hi-Lo count")]
struct Cli {
    /// Log state transitions (-v) or per-frame tallies (-vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON-lines detection log through the tracker
    Replay {
        log: PathBuf,
        /// Class list (one name per line) for logs that use numeric class ids
        #[arg(long, value_name = "PATH")]
        classes: Option<PathBuf>,
        /// Ignore detections below this confidence
        #[arg(long, default_value_t = 0.0)]
        min_confidence: f64,
        #[command(flatten)]
        tracker: TrackerArgs,
    },
    /// Run the tracker on a seeded synthetic table
    Simulate {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 120)]
        frames: u64,
        /// Chance that a card on the table is missed in a frame
        #[arg(long, default_value_t = 0.1)]
        dropout: f64,
        /// Also write the generated detections as a replayable log
        #[arg(long, value_name = "PATH")]
        emit: Option<PathBuf>,
        #[command(flatten)]
        tracker: TrackerArgs,
    },
}

#[derive(Args, Debug)]
struct TrackerArgs {
    /// Frames per second of the detection stream
    #[arg(long)]
    fps: Option<f64>,
    /// Tracker configuration file (JSON)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print one JSON report per frame instead of a summary
    #[arg(long)]
    json: bool,
}

impl TrackerArgs {
    fn build(&self) -> Result<CardTracker> {
        let mut config = match &self.config {
            Some(path) => TrackerConfig::from_json_file(path)?,
            None => TrackerConfig::default(),
        };
        if let Some(fps) = self.fps {
            config.frame_rate = fps;
        }
        CardTracker::new(config).context("Invalid tracker configuration")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Command::Replay {
            log,
            classes,
            min_confidence,
            tracker,
        } => {
            let classes = match classes {
                Some(path) => ClassNames::load(path)?,
                None => ClassNames::standard(),
            };
            let adapter =
                DetectionAdapter::new(classes, AdapterConfig::with_min_confidence(min_confidence));
            let frames = read_frames(&log)?;
            info!("Replaying {} frames from {:?}", frames.len(), log);

            let mut card_tracker = tracker.build()?;
            let mut source = ReplaySource::new(frames, &adapter);
            let mut out = std::io::stdout().lock();
            let summary = replay::run(&mut source, &mut card_tracker, &mut out, tracker.json)?;
            replay::print_summary(&mut out, &summary, tracker.json)?;
        }
        Command::Simulate {
            seed,
            frames,
            dropout,
            emit,
            tracker,
        } => {
            ensure!(
                (0.0..=1.0).contains(&dropout),
                "dropout must be between 0 and 1, got {}",
                dropout
            );

            let mut card_tracker = tracker.build()?;
            let params = SimulationParams {
                frame_rate: card_tracker.frame_rate(),
                frames,
                dropout,
                ..Default::default()
            };

            if let Some(path) = emit {
                let mut recorder = TableSimulator::new(params.clone(), seed);
                let records: Vec<_> = std::iter::from_fn(|| recorder.next_record()).collect();
                write_frames(&path, &records)?;
                info!("Wrote {} frames to {:?}", records.len(), path);
            }

            let mut simulator = TableSimulator::new(params, seed);
            let mut out = std::io::stdout().lock();
            let summary = replay::run(&mut simulator, &mut card_tracker, &mut out, tracker.json)?;
            replay::print_summary(&mut out, &summary, tracker.json)?;
            info!(
                "Table count {:+} with {} cards still dealt",
                simulator.expected_count(),
                simulator.cards_on_table()
            );
        }
    }

    Ok(())
}
