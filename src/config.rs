use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::runner::Timing;
use crate::task::{TaskError, TrialParams};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskConfig {
    #[serde(default = "TaskConfig::default_trials_per_phase")]
    pub trials_per_phase: usize,
    #[serde(default = "TaskConfig::default_p_correct")]
    pub p_correct: f64,
    #[serde(default = "TaskConfig::default_p_incorrect")]
    pub p_incorrect: f64,
    /// Fixed seed for reproducible sequences; drawn from entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl TaskConfig {
    fn default_trials_per_phase() -> usize {
        30
    }
    fn default_p_correct() -> f64 {
        0.8
    }
    fn default_p_incorrect() -> f64 {
        0.2
    }

    pub fn params(&self) -> Result<TrialParams, TaskError> {
        let params = TrialParams {
            trials_per_phase: self.trials_per_phase,
            p_correct: self.p_correct,
            p_incorrect: self.p_incorrect,
        };
        params.validate()?;
        Ok(params)
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            trials_per_phase: Self::default_trials_per_phase(),
            p_correct: Self::default_p_correct(),
            p_incorrect: Self::default_p_incorrect(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    /// Seconds; 0 or negative disables the window.
    #[serde(default = "TimingConfig::default_response_window_s")]
    pub response_window_s: f64,
    #[serde(default = "TimingConfig::default_fixation_s")]
    pub fixation_s: f64,
    #[serde(default = "TimingConfig::default_feedback_s")]
    pub feedback_s: f64,
    #[serde(default = "TimingConfig::default_inter_trial_s")]
    pub inter_trial_s: f64,
    #[serde(default = "TimingConfig::default_closing_s")]
    pub closing_s: f64,
}

impl TimingConfig {
    fn default_response_window_s() -> f64 {
        2.0
    }
    fn default_fixation_s() -> f64 {
        0.5
    }
    fn default_feedback_s() -> f64 {
        0.5
    }
    fn default_inter_trial_s() -> f64 {
        0.5
    }
    fn default_closing_s() -> f64 {
        3.0
    }

    fn secs(x: f64) -> Duration {
        Duration::try_from_secs_f64(x.max(0.0)).unwrap_or(Duration::ZERO)
    }

    pub fn timing(&self) -> Timing {
        Timing {
            fixation: Self::secs(self.fixation_s),
            feedback: Self::secs(self.feedback_s),
            inter_trial: Self::secs(self.inter_trial_s),
            closing: Self::secs(self.closing_s),
            response_window: (self.response_window_s > 0.0)
                .then(|| Self::secs(self.response_window_s)),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            response_window_s: Self::default_response_window_s(),
            fixation_s: Self::default_fixation_s(),
            feedback_s: Self::default_feedback_s(),
            inter_trial_s: Self::default_inter_trial_s(),
            closing_s: Self::default_closing_s(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_data_dir")]
    pub data_dir: String,
    #[serde(default = "OutputConfig::default_figures_dir")]
    pub figures_dir: String,
    #[serde(default = "OutputConfig::default_moving_average_window")]
    pub moving_average_window: usize,
}

impl OutputConfig {
    fn default_data_dir() -> String {
        "data".to_string()
    }
    fn default_figures_dir() -> String {
        "figures".to_string()
    }
    fn default_moving_average_window() -> usize {
        10
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            figures_dir: Self::default_figures_dir(),
            moving_average_window: Self::default_moving_average_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExperimentConfig {
    #[serde(default)]
    pub task: TaskConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl ExperimentConfig {
    fn format_f64_compact(x: f64) -> String {
        let mut s = format!("{:.6}", x);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        if s.is_empty() { "0".to_string() } else { s }
    }

    /// Every value line prefixed with `# ` so the file documents defaults
    /// without pinning them.
    fn commented(text: &str) -> String {
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
            } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                commented.push_str(line);
                commented.push('\n');
            } else {
                let mut out_line = line.to_string();
                if let Some((lhs, rhs)) = line.split_once('=') {
                    let rhs_trim = rhs.trim();
                    if rhs_trim.contains('.') && !rhs_trim.contains('"') {
                        if let Ok(val) = rhs_trim.parse::<f64>() {
                            let mut formatted = Self::format_f64_compact(val);
                            if !formatted.contains('.') {
                                formatted.push_str(".0");
                            }
                            out_line = format!("{} = {}", lhs.trim(), formatted);
                        }
                    }
                }
                commented.push_str("# ");
                commented.push_str(&out_line);
                commented.push('\n');
            }
        }
        commented
    }

    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => {
                        info!(path, "loaded config");
                        return cfg;
                    }
                    Err(err) => {
                        warn!("Failed to parse config {path}: {err}. Using defaults.");
                    }
                },
                Err(err) => {
                    warn!("Failed to read config {path}: {err}. Using defaults.");
                }
            }
            return Self::default();
        }

        // File does not exist: write defaults and return them.
        let default_cfg = Self::default();
        match toml::to_string_pretty(&default_cfg) {
            Ok(text) => {
                if let Err(err) = fs::write(path_obj, Self::commented(&text)) {
                    warn!("Failed to write default config to {path}: {err}");
                }
            }
            Err(err) => warn!("Failed to serialize default config: {err}"),
        }
        default_cfg
    }
}
