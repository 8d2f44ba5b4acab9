use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info, warn};

use super::AnalysisError;
use crate::runner::log::LOG_HEADER;
use crate::task::TrialResult;

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRow {
    pub subject: String,
    pub result: TrialResult,
}

/// All subjects' trials concatenated in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub rows: Vec<SubjectRow>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn subjects(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !out.contains(&row.subject.as_str()) {
                out.push(&row.subject);
            }
        }
        out
    }

    pub fn extend(&mut self, subject: &str, results: Vec<TrialResult>) {
        self.rows.extend(results.into_iter().map(|result| SubjectRow {
            subject: subject.to_string(),
            result,
        }));
    }
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
    let io_err = |source| AnalysisError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "data directory does not exist");
            return Ok(Vec::new());
        }
        Err(err) => return Err(io_err(err)),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Loads every `*.csv` directly under `dir`; the file stem becomes the
/// subject id. A missing directory or one without logs yields an empty
/// dataset.
pub fn load_dir(dir: &Path) -> Result<Dataset, AnalysisError> {
    let mut data = Dataset::default();
    for path in csv_files(dir)? {
        let subject = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let text = fs::read_to_string(&path).map_err(|source| AnalysisError::Io {
            path: path.clone(),
            source,
        })?;
        let results = parse_log(&subject, &text)?;
        debug!(subject = %subject, rows = results.len(), "loaded log");
        data.extend(&subject, results);
    }
    info!(
        dir = %dir.display(),
        subjects = data.subjects().len(),
        rows = data.len(),
        "dataset loaded"
    );
    Ok(data)
}

fn field<T: FromStr>(subject: &str, line: usize, name: &str, raw: &str) -> Result<T, AnalysisError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| AnalysisError::Parse {
        subject: subject.to_string(),
        line,
        message: format!("{name}: {e}"),
    })
}

fn response_time(subject: &str, line: usize, raw: &str) -> Result<Option<f64>, AnalysisError> {
    match raw.trim() {
        "" | "None" | "nan" | "NaN" => Ok(None),
        other => field(subject, line, "response_time", other).map(Some),
    }
}

/// Parses one trial log. Blank lines are skipped.
pub fn parse_log(subject: &str, text: &str) -> Result<Vec<TrialResult>, AnalysisError> {
    let mut lines = text.lines().enumerate();
    let header = lines
        .by_ref()
        .find(|(_, l)| !l.trim().is_empty())
        .map(|(_, l)| l.trim())
        .unwrap_or_default();
    if header.is_empty() {
        return Ok(Vec::new());
    }
    if header != LOG_HEADER {
        return Err(AnalysisError::Header {
            subject: subject.to_string(),
            found: header.to_string(),
        });
    }

    let mut out = Vec::new();
    for (idx, raw) in lines {
        if raw.trim().is_empty() {
            continue;
        }
        let line = idx + 1;
        let cols: Vec<&str> = raw.split(',').collect();
        if cols.len() != 10 {
            return Err(AnalysisError::Parse {
                subject: subject.to_string(),
                line,
                message: format!("expected 10 columns, found {}", cols.len()),
            });
        }
        out.push(TrialResult {
            trial_nr: field(subject, line, "trial_nr", cols[0])?,
            phase: field(subject, line, "phase", cols[1])?,
            correct_shape: field(subject, line, "correct_shape", cols[2])?,
            correct_shape_position: binary(subject, line, "correct_shape_position", cols[3])?,
            correct_reward: binary(subject, line, "correct_reward", cols[4])?,
            incorrect_reward: binary(subject, line, "incorrect_reward", cols[5])?,
            response: field(subject, line, "response", cols[6])?,
            correct: binary(subject, line, "correct", cols[7])?,
            rewarded: binary(subject, line, "rewarded", cols[8])?,
            response_time: response_time(subject, line, cols[9])?,
        });
    }
    Ok(out)
}

/// 0/1 column. Accepts the float spelling (`1.0`) older logs carry.
fn binary(subject: &str, line: usize, name: &str, raw: &str) -> Result<u8, AnalysisError> {
    let v: f64 = field(subject, line, name, raw)?;
    if v == 0.0 || v == 1.0 {
        Ok(v as u8)
    } else {
        Err(AnalysisError::Parse {
            subject: subject.to_string(),
            line,
            message: format!("{name}: expected 0 or 1, got {raw}"),
        })
    }
}
