//! Collision-safe placement of files in their terminal directory.
//!
//! A destination is reserved by creating an empty placeholder with
//! `create_new`, so concurrent workers can never pick the same name and an
//! existing file is never overwritten. The source is then renamed over the
//! placeholder, falling back to copy + remove across devices.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::error::{OutputError, Result};

/// Upper bound on `_N` suffixes tried before giving up.
const MAX_SUFFIX: usize = 100_000;

/// Name for the `attempt`-th candidate: `name.ext`, `name_1.ext`, `name_2.ext`, …
pub fn candidate_name(file_name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => {
            let (stem, ext) = file_name.split_at(dot);
            format!("{stem}_{attempt}{ext}")
        }
        _ => format!("{file_name}_{attempt}"),
    }
}

/// `base/YYYY/MM/DD`.
pub fn partition_dir(base: &Path, date: NaiveDate) -> PathBuf {
    base.join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
        .join(format!("{:02}", date.day()))
}

/// A destination path held by an empty placeholder file.
///
/// Dropping an unfinished reservation removes the placeholder.
#[derive(Debug)]
pub struct Reservation {
    path: PathBuf,
    finished: bool,
}

impl Reservation {
    /// Reserve the first free candidate name for `file_name` in `dir`.
    /// Creates `dir` if it does not exist.
    pub fn acquire(dir: &Path, file_name: &str) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| OutputError::io("create directory", dir, e))?;

        for attempt in 0..MAX_SUFFIX {
            let path = dir.join(candidate_name(file_name, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => {
                    return Ok(Self {
                        path,
                        finished: false,
                    });
                }
                Err(error) if error.kind() == ErrorKind::AlreadyExists => continue,
                Err(error) => return Err(OutputError::io("reserve", path, error)),
            }
        }

        Err(OutputError::NameExhausted {
            dir: dir.to_path_buf(),
            file_name: file_name.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move `source` onto the reserved path and return the final location.
    pub fn fill_with(mut self, source: &Path) -> Result<PathBuf> {
        move_over(source, &self.path)?;
        self.finished = true;
        Ok(self.path.clone())
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.finished
            && let Err(error) = fs::remove_file(&self.path)
        {
            debug!(path = %self.path.display(), %error, "placeholder cleanup failed");
        }
    }
}

/// Move `source` into `dir` under its own name, disambiguated on collision.
pub fn move_into(source: &Path, dir: &Path) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Reservation::acquire(dir, &file_name)?.fill_with(source)
}

fn move_over(source: &Path, target: &Path) -> Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == ErrorKind::CrossesDevices => {
            debug!(from = %source.display(), to = %target.display(), "cross-device move, copying");
            fs::copy(source, target).map_err(|e| OutputError::Move {
                from: source.to_path_buf(),
                to: target.to_path_buf(),
                source: e,
            })?;
            fs::remove_file(source).map_err(|e| OutputError::io("remove", source, e))
        }
        Err(error) => Err(OutputError::Move {
            from: source.to_path_buf(),
            to: target.to_path_buf(),
            source: error,
        }),
    }
}
