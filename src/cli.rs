use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML
    #[arg(long, default_value = "reversal.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the task in the terminal and log one CSV row per trial
    Run {
        /// Participant name, used in the log file name
        #[arg(value_name = "PARTICIPANT")]
        participant: String,

        /// Directory for the trial log (overrides config)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Trials per phase (overrides config)
        #[arg(long)]
        trials_per_phase: Option<usize>,

        /// Reward probability for correct choices (overrides config)
        #[arg(long)]
        p_correct: Option<f64>,

        /// Reward probability for incorrect choices (overrides config)
        #[arg(long)]
        p_incorrect: Option<f64>,

        /// Response window in seconds; 0 waits indefinitely (overrides config)
        #[arg(long)]
        response_window: Option<f64>,

        /// Seed for the trial sequence (overrides config)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print accuracy and response-time summaries for a data directory
    Summary {
        /// Directory of per-subject CSV logs (overrides config)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Moving-average window (overrides config)
        #[arg(long)]
        window: Option<usize>,
    },
    /// Rename the logs in a directory to anonymous subject ids
    Anonymize {
        /// Directory to rename in place (overrides config)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        #[arg(long, default_value = "subj_")]
        prefix: String,
    },
}

/// fmt subscriber filtered by `RUST_LOG`, `info` when unset.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_overrides() {
        let args = Args::try_parse_from([
            "reversal",
            "run",
            "anna",
            "--trials-per-phase",
            "4",
            "--p-correct",
            "0.9",
            "--seed",
            "7",
        ])
        .unwrap();
        assert_eq!(args.config, "reversal.toml");
        match args.command {
            Command::Run {
                participant,
                trials_per_phase,
                p_correct,
                seed,
                p_incorrect,
                ..
            } => {
                assert_eq!(participant, "anna");
                assert_eq!(trials_per_phase, Some(4));
                assert_eq!(p_correct, Some(0.9));
                assert_eq!(p_incorrect, None);
                assert_eq!(seed, Some(7));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn anonymize_defaults_prefix() {
        let args = Args::try_parse_from(["reversal", "anonymize"]).unwrap();
        match args.command {
            Command::Anonymize { prefix, data_dir } => {
                assert_eq!(prefix, "subj_");
                assert!(data_dir.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
