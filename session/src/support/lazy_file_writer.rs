use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

/// Log file writer that only creates the file (and its directory) on first write
///
/// A session that logs nothing at the configured level leaves no file behind.
#[derive(Clone)]
pub struct LazyFileWriter {
    path: PathBuf,
    file: Arc<Mutex<Option<File>>>,
}

impl LazyFileWriter {
    /// Writer appending to `path` once something is logged
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: Arc::new(Mutex::new(None)),
        }
    }

    fn open(&self) -> io::Result<File> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        OpenOptions::new().create(true).append(true).open(&self.path)
    }
}

/// Handle given to the fmt layer for one event
pub struct LazyWriter {
    owner: LazyFileWriter,
}

impl Write for LazyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .owner
            .file
            .lock()
            .map_err(|_| io::Error::other("Mutex poisoned"))?;

        // Reopen if the log was deleted while the session runs
        if guard.is_none() || !self.owner.path.exists() {
            *guard = Some(self.owner.open()?);
        }
        match guard.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(0),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .owner
            .file
            .lock()
            .map_err(|_| io::Error::other("Mutex poisoned"))?;
        guard.as_mut().map_or(Ok(()), Write::flush)
    }
}

impl<'a> MakeWriter<'a> for LazyFileWriter {
    type Writer = LazyWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LazyWriter {
            owner: self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "tests")]

    use super::*;

    #[test]
    fn file_appears_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("session.log");
        let writer = LazyFileWriter::new(path.clone());

        let mut handle = writer.make_writer();
        handle.flush().unwrap();
        assert!(!path.exists());

        handle.write_all(b"first\n").unwrap();
        writer.make_writer().write_all(b"second\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
