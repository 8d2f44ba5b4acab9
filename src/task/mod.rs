//! Trial model of the reversal-learning task: phases, shapes, the trial
//! sequence and the rules that turn a response into a scored result.

pub mod outcome;
pub mod reward;
pub mod trials;
pub mod types;

use thiserror::Error;

pub use outcome::{feedback_text, is_correct, is_rewarded};
pub use reward::sample_reward;
pub use trials::{TrialParams, build_trials};
pub use types::{Phase, Response, Shape, Side, Trial, TrialResult};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TaskError {
    #[error("trials_per_phase must be positive")]
    NoTrials,
    #[error("{name} must lie in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },
}

pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<f64, TaskError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(TaskError::ProbabilityOutOfRange { name, value })
    }
}
