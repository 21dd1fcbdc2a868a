use std::{
    collections::{HashMap, hash_map::Entry},
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::error::TranLogError;

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Append-only sink for log lines, addressed by file path.
pub trait LogWriter {
    /// Appends `line` and a line terminator to `path`, creating it if needed.
    fn append(&mut self, path: &Path, line: &str) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;

    /// Drops any resource held for `path`. Later appends reopen it.
    fn release(&mut self, _path: &Path) {}

    /// Drops every resource held for any path.
    fn release_all(&mut self) {}
}

impl<W: LogWriter + ?Sized> LogWriter for Box<W> {
    fn append(&mut self, path: &Path, line: &str) -> io::Result<()> {
        (**self).append(path, line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn release(&mut self, path: &Path) {
        (**self).release(path)
    }

    fn release_all(&mut self) {
        (**self).release_all()
    }
}

/// Appends `line` to every path in order, stopping at the first failure.
pub fn write_line<W: LogWriter + ?Sized>(
    writer: &mut W,
    paths: &[PathBuf],
    line: &str,
) -> Result<(), TranLogError> {
    for path in paths {
        writer
            .append(path, line)
            .map_err(|source| TranLogError::Write {
                path: path.clone(),
                source,
            })?;
    }
    Ok(())
}

/// Log files on disk, with one cached append handle per path.
#[derive(Default)]
pub struct LogFile {
    files: HashMap<PathBuf, BufWriter<File>>,
}

impl LogFile {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self, path: &Path) -> io::Result<&mut BufWriter<File>> {
        match self.files.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let file = File::options().create(true).append(true).open(path)?;
                Ok(entry.insert(BufWriter::new(file)))
            }
        }
    }

    pub fn open_paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }
}

impl LogWriter for LogFile {
    fn append(&mut self, path: &Path, line: &str) -> io::Result<()> {
        let result = self.handle(path).and_then(|file| {
            write!(file, "{line}{LINE_ENDING}")?;
            file.flush()
        });
        if result.is_err() {
            // A failed handle is not reused.
            self.files.remove(path);
        }
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        for file in self.files.values_mut() {
            file.flush()?;
        }
        Ok(())
    }

    // Every append is flushed, so dropping a handle loses nothing.
    fn release(&mut self, path: &Path) {
        self.files.remove(path);
    }

    fn release_all(&mut self) {
        self.files.clear();
    }
}

type MemoryFiles = HashMap<PathBuf, Vec<String>>;

/// In-memory writer. Clones share the same content.
#[derive(Default, Debug, Clone)]
pub struct LogMemory {
    files: Arc<Mutex<MemoryFiles>>,
}

impl LogMemory {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> std::sync::MutexGuard<'_, MemoryFiles> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Lines written to `path` so far.
    pub fn lines<P: AsRef<Path>>(&self, path: P) -> Vec<String> {
        self.files().get(path.as_ref()).cloned().unwrap_or_default()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.files().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl LogWriter for LogMemory {
    fn append(&mut self, path: &Path, line: &str) -> io::Result<()> {
        self.files()
            .entry(path.to_path_buf())
            .or_default()
            .push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tranlog_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_log_file_appends() {
        let dir = test_dir("log_file_appends");
        let path = dir.join("app.log");
        std::fs::write(&path, format!("existing{LINE_ENDING}")).unwrap();
        let mut log_file = LogFile::new();
        log_file.append(&path, "Hello, world!").unwrap();
        log_file.release(&path);
        assert_eq!(log_file.open_paths().count(), 0);
        log_file.append(&path, "rust is awesome !").unwrap();
        log_file.flush().unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!(
                "existing{LINE_ENDING}Hello, world!{LINE_ENDING}rust is awesome !{LINE_ENDING}"
            )
        );
        assert_eq!(log_file.open_paths().count(), 1);
        log_file.release_all();
        assert_eq!(log_file.open_paths().count(), 0);
    }

    #[test]
    fn test_write_line_stops_at_first_failure() {
        let dir = test_dir("write_line_failure");
        let good = dir.join("good.log");
        let bad = dir.join("missing_dir").join("bad.log");
        let after = dir.join("after.log");
        let mut log_file = LogFile::new();
        let err = write_line(&mut log_file, &[good.clone(), bad.clone(), after.clone()], "line")
            .unwrap_err();
        match err {
            TranLogError::Write { path, .. } => assert_eq!(path, bad),
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(
            std::fs::read_to_string(&good).unwrap(),
            format!("line{LINE_ENDING}")
        );
        assert!(!after.exists());
    }

    #[test]
    fn test_log_memory_is_shared() {
        let memory = LogMemory::new();
        let mut writer = memory.clone();
        write_line(&mut writer, &[PathBuf::from("/a"), PathBuf::from("/b")], "x").unwrap();
        assert_eq!(memory.lines("/a"), vec!["x"]);
        assert_eq!(memory.paths(), vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }
}
