//! Per-object log files for one run.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use tscop_core::engine::sink::{LogEntry, ObjectLogSink};

/// Writes `<schedule>, Read|Write, <moment>` lines to `<dir>/<object>.txt`.
///
/// A file is truncated the first time any schedule of the run touches its
/// object and appended to afterwards; the open handles live as long as the
/// log. Objects that were not declared are not logged.
#[derive(Debug)]
pub struct FileObjectLog {
    dir: PathBuf,
    declared: Vec<String>,
    known: HashSet<String>,
    open: HashMap<String, BufWriter<File>>,
}

impl FileObjectLog {
    /// Creates `dir` if needed. No file is touched yet.
    ///
    /// # Errors
    ///
    /// Fails if `dir` cannot be created.
    pub fn create(dir: impl Into<PathBuf>, declared: &[String]) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            declared: declared.to_vec(),
            known: declared.iter().cloned().collect(),
            open: HashMap::new(),
        })
    }

    #[must_use]
    pub fn path(&self, object: &str) -> PathBuf {
        self.dir.join(format!("{object}.txt"))
    }

    /// Flushes every open file and creates empty files for declared objects
    /// that were never touched. Returns the log file of every declared
    /// object, in declaration order.
    ///
    /// # Errors
    ///
    /// Fails if a file cannot be flushed or created.
    pub fn finish(mut self) -> io::Result<Vec<PathBuf>> {
        for file in self.open.values_mut() {
            file.flush()?;
        }
        let mut paths = Vec::with_capacity(self.declared.len());
        for object in &self.declared {
            let path = self.path(object);
            if !self.open.contains_key(object) {
                File::create(&path)?;
            }
            paths.push(path);
        }
        Ok(paths)
    }
}

impl ObjectLogSink for FileObjectLog {
    type Error = io::Error;

    fn record(&mut self, entry: &LogEntry<'_>) -> io::Result<()> {
        if !self.known.contains(entry.object) {
            tracing::trace!(object = entry.object, "undeclared object, not logged");
            return Ok(());
        }
        let file = match self.open.entry(entry.object.to_string()) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                let path = self.dir.join(format!("{}.txt", entry.object));
                tracing::debug!(path = %path.display(), "opening object log");
                slot.insert(BufWriter::new(File::create(&path)?))
            }
        };
        writeln!(file, "{entry}")
    }
}

#[cfg(test)]
mod tests {
    use tscop_core::schedule::Access;

    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tscop-logs-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn entry<'a>(schedule: &'a str, object: &'a str, access: Access, moment: u64) -> LogEntry<'a> {
        LogEntry {
            schedule,
            object,
            access,
            moment,
        }
    }

    #[test]
    fn test_truncates_once_then_appends() {
        let dir = scratch("truncate");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("X.txt"), "stale line from an earlier run\n").unwrap();

        let mut log = FileObjectLog::create(&dir, &["X".to_string()]).unwrap();
        log.record(&entry("E_1", "X", Access::Read, 0)).unwrap();
        log.record(&entry("E_2", "X", Access::Write, 1)).unwrap();
        log.finish().unwrap();

        let content = fs::read_to_string(dir.join("X.txt")).unwrap();
        assert_eq!(content, "E_1, Read, 0\nE_2, Write, 1\n");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_undeclared_objects_are_skipped() {
        let dir = scratch("undeclared");
        let mut log = FileObjectLog::create(&dir, &["X".to_string()]).unwrap();
        log.record(&entry("E_1", "Q", Access::Write, 0)).unwrap();
        let paths = log.finish().unwrap();

        assert_eq!(paths, [dir.join("X.txt")]);
        assert!(!dir.join("Q.txt").exists());
        assert_eq!(fs::read_to_string(dir.join("X.txt")).unwrap(), "");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_second_log_truncates_again() {
        let dir = scratch("rerun");
        let declared = ["X".to_string()];
        for schedule in ["E_1", "E_2"] {
            let mut log = FileObjectLog::create(&dir, &declared).unwrap();
            log.record(&entry(schedule, "X", Access::Read, 0)).unwrap();
            log.finish().unwrap();
        }
        let content = fs::read_to_string(dir.join("X.txt")).unwrap();
        assert_eq!(content, "E_2, Read, 0\n");
        fs::remove_dir_all(&dir).unwrap();
    }
}
