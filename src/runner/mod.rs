//! Experiment loop. Presentation is delegated to a [`Presenter`]; scoring
//! and logging happen here.

pub mod log;
pub mod scripted;
pub mod terminal;

use std::io::{self, Write};
use std::time::Duration;

use tracing::{debug, info};

use crate::task::outcome::{feedback_text, score};
use crate::task::{Response, Shape, Side, Trial, TrialResult};

use self::log::TrialLog;

pub const INSTRUCTIONS_TASK: &str = "In this experiment, you need to choose between two shapes using the [F] and [J] keys of the keyboard for the left and right options respectively.\n\nYour goal is to maximize your points.\n\nPress any key to continue.";
pub const INSTRUCTIONS_FIXATION: &str =
    "Please fixate the white dot in the middle of the screen in between trials.\n\nPress any key to start.";
pub const CLOSING_TEXT: &str = "Thank you for your participation!";

/// Which shape sits on which side of fixation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusLayout {
    pub left: Shape,
    pub right: Shape,
}

impl StimulusLayout {
    pub fn for_trial(trial: &Trial) -> Self {
        let correct = trial.correct_shape;
        match trial.correct_side() {
            Side::Left => Self {
                left: correct,
                right: correct.complement(),
            },
            Side::Right => Self {
                left: correct.complement(),
                right: correct,
            },
        }
    }
}

/// Display and input surface the experiment loop drives.
pub trait Presenter {
    /// Shows text and blocks until any key.
    fn show_instructions(&mut self, text: &str) -> io::Result<()>;
    fn show_fixation(&mut self, duration: Duration) -> io::Result<()>;
    fn show_stimuli(&mut self, layout: StimulusLayout) -> io::Result<()>;
    /// Waits for a left/right key. `None` window waits indefinitely.
    /// Returns the response and its latency in seconds from stimulus onset.
    fn await_response(&mut self, window: Option<Duration>) -> io::Result<(Response, Option<f64>)>;
    fn show_feedback(&mut self, text: &str, duration: Duration) -> io::Result<()>;
    fn show_closing(&mut self, text: &str, duration: Duration) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub fixation: Duration,
    pub feedback: Duration,
    pub inter_trial: Duration,
    pub closing: Duration,
    pub response_window: Option<Duration>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            fixation: Duration::from_millis(500),
            feedback: Duration::from_millis(500),
            inter_trial: Duration::from_millis(500),
            closing: Duration::from_secs(3),
            response_window: Some(Duration::from_secs(2)),
        }
    }
}

impl Timing {
    /// All pauses zero, unbounded window. For scripted runs.
    pub fn instant() -> Self {
        Self {
            fixation: Duration::ZERO,
            feedback: Duration::ZERO,
            inter_trial: Duration::ZERO,
            closing: Duration::ZERO,
            response_window: None,
        }
    }
}

/// Runs one trial through the presenter and scores it.
pub fn run_trial<P: Presenter + ?Sized>(
    presenter: &mut P,
    trial_nr: usize,
    trial: &Trial,
    timing: &Timing,
) -> io::Result<TrialResult> {
    presenter.show_fixation(timing.fixation)?;
    presenter.show_stimuli(StimulusLayout::for_trial(trial))?;
    let (response, rt) = presenter.await_response(timing.response_window)?;
    let result = score(trial_nr, trial, response, rt);
    presenter.show_feedback(
        &feedback_text(result.rewarded, result.response_time),
        timing.feedback,
    )?;
    presenter.show_fixation(timing.inter_trial)?;
    debug!(
        trial_nr,
        phase = %result.phase,
        response = %result.response,
        correct = result.correct,
        rewarded = result.rewarded,
        "trial done"
    );
    Ok(result)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub trials: usize,
    pub correct: usize,
    pub rewarded: usize,
    pub missed: usize,
}

impl RunSummary {
    pub fn points(&self) -> usize {
        self.rewarded * 100
    }

    fn record(&mut self, result: &TrialResult) {
        self.trials += 1;
        self.correct += usize::from(result.correct);
        self.rewarded += usize::from(result.rewarded);
        if result.response == Response::NoResponse {
            self.missed += 1;
        }
    }
}

pub struct Experiment {
    trials: Vec<Trial>,
    timing: Timing,
}

impl Experiment {
    pub fn new(trials: Vec<Trial>, timing: Timing) -> Self {
        Self { trials, timing }
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    /// Instructions, every trial in order (one flushed log row each), then
    /// the closing screen.
    pub fn run<P, W>(&self, presenter: &mut P, log: &mut TrialLog<W>) -> io::Result<RunSummary>
    where
        P: Presenter + ?Sized,
        W: Write,
    {
        presenter.show_instructions(INSTRUCTIONS_TASK)?;
        presenter.show_instructions(INSTRUCTIONS_FIXATION)?;

        let mut summary = RunSummary::default();
        for (trial_nr, trial) in self.trials.iter().enumerate() {
            let result = run_trial(presenter, trial_nr, trial, &self.timing)?;
            log.append(&result)?;
            summary.record(&result);
        }

        presenter.show_closing(CLOSING_TEXT, self.timing.closing)?;
        info!(
            trials = summary.trials,
            correct = summary.correct,
            missed = summary.missed,
            points = summary.points(),
            "experiment finished"
        );
        Ok(summary)
    }
}
