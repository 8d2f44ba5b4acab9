use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::AnalysisError;

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> AnalysisError {
    let path = path.to_path_buf();
    move |source| AnalysisError::Io { path, source }
}

/// Best-effort undo of `(from, to)` renames, newest first.
fn roll_back(moves: &[(PathBuf, PathBuf)]) {
    for (from, to) in moves.iter().rev() {
        if let Err(err) = fs::rename(to, from) {
            warn!(from = %to.display(), to = %from.display(), %err, "rollback rename failed");
        }
    }
}

/// Renames every file in `dir`, in name order, to `{prefix}{i:02}.csv`.
/// Returns `(old, new)` pairs.
///
/// Every source is first moved to a temporary name, so a target may
/// collide with a not-yet-renamed source. Hidden files are left alone.
/// If any rename fails, the moves done so far are undone and the error is
/// returned.
pub fn anonymize(dir: &Path, prefix: &str) -> Result<Vec<(PathBuf, PathBuf)>, AnalysisError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let path = entry.map_err(io_err(dir))?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if path.is_file() && !hidden {
            files.push(path);
        }
    }
    files.sort();

    let mut staged = Vec::with_capacity(files.len());
    for (i, old) in files.iter().enumerate() {
        let tmp = dir.join(format!(".anonymize_{i}.tmp"));
        if let Err(err) = fs::rename(old, &tmp) {
            roll_back(&staged);
            return Err(io_err(old)(err));
        }
        staged.push((old.clone(), tmp));
    }

    let mut placed = Vec::with_capacity(files.len());
    for (i, (_, tmp)) in staged.iter().enumerate() {
        let new = dir.join(format!("{prefix}{i:02}.csv"));
        if let Err(err) = fs::rename(tmp, &new) {
            roll_back(&placed);
            roll_back(&staged);
            return Err(io_err(tmp)(err));
        }
        placed.push((tmp.clone(), new));
    }

    let mapping: Vec<_> = files
        .into_iter()
        .zip(placed)
        .map(|(old, (_, new))| (old, new))
        .collect();
    info!(dir = %dir.display(), files = mapping.len(), "anonymized data files");
    Ok(mapping)
}
