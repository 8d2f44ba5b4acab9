// Entry point: runs the task in the terminal or summarizes collected logs.
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{info, warn};

use reversal::analysis;
use reversal::cli::{Args, Command, init_tracing};
use reversal::config::ExperimentConfig;
use reversal::runner::log::{TrialLog, next_log_path};
use reversal::runner::terminal::TerminalPresenter;
use reversal::runner::Experiment;

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = Args::parse();
    let mut cfg = ExperimentConfig::load_or_default(&args.config);

    match args.command {
        Command::Run {
            participant,
            output_dir,
            trials_per_phase,
            p_correct,
            p_incorrect,
            response_window,
            seed,
        } => {
            if let Some(n) = trials_per_phase {
                cfg.task.trials_per_phase = n;
            }
            if let Some(p) = p_correct {
                cfg.task.p_correct = p;
            }
            if let Some(p) = p_incorrect {
                cfg.task.p_incorrect = p;
            }
            if let Some(w) = response_window {
                cfg.timing.response_window_s = w;
            }
            if seed.is_some() {
                cfg.task.seed = seed;
            }
            let dir = output_dir.unwrap_or_else(|| PathBuf::from(&cfg.output.data_dir));
            run(&cfg, &participant, &dir)
        }
        Command::Summary { data_dir, window } => {
            let dir = data_dir.unwrap_or_else(|| PathBuf::from(&cfg.output.data_dir));
            summary(&dir, window.unwrap_or(cfg.output.moving_average_window))
        }
        Command::Anonymize { data_dir, prefix } => {
            let dir = data_dir.unwrap_or_else(|| PathBuf::from(&cfg.output.data_dir));
            for (old, new) in analysis::anonymize(&dir, &prefix)? {
                println!("{} -> {}", old.display(), new.display());
            }
            Ok(())
        }
    }
}

fn run(cfg: &ExperimentConfig, participant: &str, dir: &Path) -> Result<(), Box<dyn Error>> {
    let params = cfg.task.params()?;
    let seed = cfg.task.seed.unwrap_or_else(|| rand::rng().random());
    info!(
        participant,
        seed,
        trials_per_phase = params.trials_per_phase,
        p_correct = params.p_correct,
        p_incorrect = params.p_incorrect,
        "starting run"
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let trials = params.build(&mut rng)?;

    let path = next_log_path(dir, participant)?;
    let mut log = TrialLog::create(&path)?;
    let mut presenter = TerminalPresenter::stdio();
    let result = Experiment::new(trials, cfg.timing.timing()).run(&mut presenter, &mut log)?;
    log.finish()?;

    println!(
        "{} trials, {} correct, {} missed, {} points. Log: {}",
        result.trials,
        result.correct,
        result.missed,
        result.points(),
        path.display()
    );
    Ok(())
}

fn summary(dir: &Path, window: usize) -> Result<(), Box<dyn Error>> {
    let data = analysis::load_dir(dir)?;
    if data.is_empty() {
        warn!(dir = %dir.display(), "no trial logs found");
        return Ok(());
    }

    println!("subjects: {}", data.subjects().len());
    println!("\naccuracy by phase");
    for row in data.accuracy_by_phase() {
        println!("  {:<5} {:.3}  (n={})", row.phase, row.accuracy, row.n);
    }

    println!("\nmean response time [s] by phase and correct");
    for cell in data.response_time_by_phase_and_correct() {
        println!(
            "  {:<5} correct={}  {:.3}  (n={})",
            cell.phase, cell.correct, cell.mean_rt, cell.n
        );
    }

    let curve = data.accuracy_curve(window);
    println!("\nmoving average of accuracy, W={window}");
    for (nr, acc) in &curve.points {
        let marker = if Some(*nr) == curve.reversal_trial {
            "  <- reversal"
        } else {
            ""
        };
        println!("  {nr:>4} {acc:.3}{marker}");
    }
    Ok(())
}
