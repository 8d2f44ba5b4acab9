use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::task::TrialResult;

pub const LOG_HEADER: &str = "trial_nr,phase,correct_shape,correct_shape_position,correct_reward,incorrect_reward,response,correct,rewarded,response_time";

pub fn format_row(r: &TrialResult) -> String {
    let rt = r
        .response_time
        .map(|t| format!("{t:.6}"))
        .unwrap_or_default();
    format!(
        "{},{},{},{},{},{},{},{},{},{}",
        r.trial_nr,
        r.phase,
        r.correct_shape,
        r.correct_shape_position,
        r.correct_reward,
        r.incorrect_reward,
        r.response,
        r.correct,
        r.rewarded,
        rt
    )
}

/// Append-only CSV sink. The header goes out on construction; every row
/// is flushed before `append` returns. Dropping flushes whatever is left.
pub struct TrialLog<W: Write> {
    writer: Option<W>,
    rows: usize,
}

impl<W: Write> TrialLog<W> {
    pub fn new(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "{LOG_HEADER}")?;
        writer.flush()?;
        Ok(Self {
            writer: Some(writer),
            rows: 0,
        })
    }

    pub fn append(&mut self, result: &TrialResult) -> io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("trial log already finished"))?;
        writeln!(writer, "{}", format_row(result))?;
        writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> io::Result<W> {
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| io::Error::other("trial log already finished"))?;
        writer.flush()?;
        Ok(writer)
    }
}

impl TrialLog<BufWriter<File>> {
    pub fn create(path: &Path) -> io::Result<Self> {
        debug!(path = %path.display(), "opening trial log");
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> Drop for TrialLog<W> {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}

/// `{dir}/{participant}_run_{n}.csv` with the first unused `n`. Creates
/// `dir` when missing.
pub fn next_log_path(dir: &Path, participant: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let mut run = 0usize;
    loop {
        let candidate = dir.join(format!("{participant}_run_{run}.csv"));
        if !candidate.exists() {
            return Ok(candidate);
        }
        run += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Phase, Response, Shape};

    fn result(rt: Option<f64>) -> TrialResult {
        TrialResult {
            trial_nr: 4,
            phase: Phase::Post,
            correct_shape: Shape::Square,
            correct_shape_position: 0,
            correct_reward: 1,
            incorrect_reward: 0,
            response: if rt.is_some() {
                Response::Right
            } else {
                Response::NoResponse
            },
            correct: u8::from(rt.is_some()),
            rewarded: u8::from(rt.is_some()),
            response_time: rt,
        }
    }

    #[test]
    fn header_written_once() {
        let mut log = TrialLog::new(Vec::new()).unwrap();
        log.append(&result(Some(0.5))).unwrap();
        log.append(&result(None)).unwrap();
        assert_eq!(log.rows(), 2);
        let text = String::from_utf8(log.finish().unwrap()).unwrap();
        assert_eq!(text.matches("trial_nr,").count(), 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], LOG_HEADER);
        assert_eq!(lines[1], "4,post,square,0,1,0,right,1,1,0.500000");
        assert_eq!(lines[2], "4,post,square,0,1,0,no response,0,0,");
    }

    #[test]
    fn rows_reach_disk_before_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.csv");
        let mut log = TrialLog::create(&path).unwrap();
        log.append(&result(Some(1.25))).unwrap();
        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk.lines().count(), 2);
        drop(log);
    }

    #[test]
    fn run_numbers_increase() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("data");
        let first = next_log_path(&out, "anna").unwrap();
        assert!(first.ends_with("anna_run_0.csv"));
        fs::write(&first, "").unwrap();
        let second = next_log_path(&out, "anna").unwrap();
        assert!(second.ends_with("anna_run_1.csv"));
    }
}
