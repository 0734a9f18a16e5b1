use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::Level;

/// Where log records go. The terminal belongs to the desktop, so records
/// never go to stdout or stderr.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogTarget {
    File(PathBuf),
    #[default]
    Discard,
}

pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    File(Arc<File>),
    Sink(io::Sink),
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::File(f) => (&**f).write(buf),
            DelegatingInner::Sink(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::File(f) => (&**f).flush(),
            DelegatingInner::Sink(s) => s.flush(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SubscriberMakeWriter {
    file: Option<Arc<File>>,
}

impl SubscriberMakeWriter {
    /// Opens (appending) the log file for [`LogTarget::File`].
    pub fn new(target: &LogTarget) -> io::Result<Self> {
        let file = match target {
            LogTarget::File(path) => Some(Arc::new(
                OpenOptions::new().create(true).append(true).open(path)?,
            )),
            LogTarget::Discard => None,
        };
        Ok(Self { file })
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        let inner = match &self.file {
            Some(file) => DelegatingInner::File(Arc::clone(file)),
            None => DelegatingInner::Sink(io::sink()),
        };
        DelegatingWriter { inner }
    }
}

/// Install the global subscriber. Returns `Ok(false)` when one was already
/// installed; later calls are no-ops.
pub fn init(target: &LogTarget, level: Level) -> io::Result<bool> {
    let make_writer = SubscriberMakeWriter::new(target)?;
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(make_writer)
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .try_init()
        .is_ok();
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_target_receives_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wm.log");
        let make_writer = SubscriberMakeWriter::new(&LogTarget::File(path.clone())).unwrap();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(make_writer)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(instance_id = "terminal-2", "opened instance");
            tracing::trace!("filtered out");
        });
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("opened instance"));
        assert!(contents.contains("terminal-2"));
        assert!(!contents.contains("filtered out"));
    }

    #[test]
    fn discard_target_accepts_writes() {
        use tracing_subscriber::fmt::MakeWriter;

        let make_writer = SubscriberMakeWriter::new(&LogTarget::Discard).unwrap();
        let mut writer = make_writer.make_writer();
        assert_eq!(writer.write(b"ignored").unwrap(), 7);
        writer.flush().unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("wm.log");
        assert!(SubscriberMakeWriter::new(&LogTarget::File(path)).is_err());
    }
}
