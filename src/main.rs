use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use lane_sim::io::{FixedAssets, NullSink};
use lane_sim::{config, Error, FileStore, Runner, RunnerConfig, StorageError};
use tracing_subscriber::{fmt, EnvFilter};

/// Trains learning drivers headlessly and saves their tables to the working directory.
#[derive(Debug, Parser)]
#[command(name = "lane-sim", version)]
struct Cli {
    /// Zero the saved tables and exit
    #[arg(long)]
    reset: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON configuration file
    config: Option<PathBuf>,

    /// Number of episodes to train for
    #[arg(default_value_t = 100)]
    episodes: u64,
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    fmt().with_env_filter(filter).with_target(false).init();

    let mut config: RunnerConfig = match &cli.config {
        Some(path) => config::from_json_file(path)?,
        None => RunnerConfig::default(),
    };
    config.manual = false;
    config.frame_pacing = false;
    config.session.render = false;

    let mut store = FileStore::new(".");
    let mut runner = Runner::new(config, Box::new(FixedAssets::reference()))?;
    if cli.reset {
        runner.reset_tables(&mut store)?;
        println!("Reset saved tables");
        return Ok(());
    }
    match runner.load_tables(&store) {
        Ok(()) => println!("Continuing from saved tables"),
        Err(StorageError::Missing(_)) => println!("Starting from empty tables"),
        Err(err) => return Err(err.into()),
    }

    println!("Training...");
    let max_ticks = 60 * 60 * 5;
    for episode in 0..cli.episodes {
        let start = Instant::now();
        let summaries = runner.run_episode(max_ticks, &mut NullSink)?;
        let ticks: u64 = summaries.iter().map(|s| s.ticks).sum();
        let crashes = summaries.iter().filter(|s| s.crashed).count();
        println!(
            "Episode {}: {:.1} ticks survived on average, {}/{} crashed ({:?})",
            episode,
            ticks as f64 / summaries.len() as f64,
            crashes,
            summaries.len(),
            start.elapsed(),
        );
    }

    runner.save_tables(&mut store)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn episodes_default_to_one_hundred() {
        let cli = Cli::try_parse_from(["lane-sim"]).unwrap();
        assert!(!cli.reset);
        assert_eq!(cli.config, None);
        assert_eq!(cli.episodes, 100);

        let cli = Cli::try_parse_from(["lane-sim", "--reset", "run.json", "7"]).unwrap();
        assert!(cli.reset);
        assert_eq!(cli.config, Some(PathBuf::from("run.json")));
        assert_eq!(cli.episodes, 7);
    }

    #[test]
    fn malformed_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["lane-sim", "run.json", "ten"]).is_err());
        assert!(Cli::try_parse_from(["lane-sim", "run.json", "7", "extra"]).is_err());
        assert!(Cli::try_parse_from(["lane-sim", "--bogus"]).is_err());
    }
}
