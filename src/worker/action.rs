//! The periodic action performed on every tick.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Something that produces an audible or visible cue.
pub trait Beeper: Send + Sync {
    fn beep(&self) -> io::Result<()>;
}

/// Rings the terminal bell.
///
/// Writes to stderr by default, keeping stdout free for log records.
pub struct TerminalBell {
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalBell {
    /// A bell on the process's stderr.
    pub fn stderr() -> Self {
        Self::with_writer(io::stderr())
    }

    /// A bell that writes its BEL byte to `out`.
    pub fn with_writer<W: Write + Send + 'static>(out: W) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self::stderr()
    }
}

impl Beeper for TerminalBell {
    fn beep(&self) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        out.write_all(b"\x07")?;
        out.flush()
    }
}

/// Does nothing. The log record is the only trace of a tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBeeper;

impl Beeper for SilentBeeper {
    fn beep(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Beeper selection from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BeeperKind {
    #[default]
    Bell,
    Silent,
}

impl BeeperKind {
    pub fn build(self) -> Arc<dyn Beeper> {
        match self {
            BeeperKind::Bell => Arc::new(TerminalBell::stderr()),
            BeeperKind::Silent => Arc::new(SilentBeeper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::logging::{Level, LogSink, TracingSink};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn bytes(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_bell_stays_out_of_json_log_stream() {
        let bell_out = SharedBuf::default();
        let log_out = SharedBuf::default();
        let writer = log_out.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();
        let bell = TerminalBell::with_writer(bell_out.clone());
        let sink = TracingSink::new(Level::Debug);

        tracing::subscriber::with_default(subscriber, || {
            for tick in 1..=2 {
                bell.beep().unwrap();
                sink.write(Level::Info, &format!("beep (tick {})", tick)).unwrap();
            }
        });

        assert_eq!(bell_out.bytes(), b"\x07\x07".to_vec());
        let logs = String::from_utf8(log_out.bytes()).unwrap();
        assert!(!logs.contains('\x07'));
        assert_eq!(logs.lines().count(), 2);
        assert!(logs.lines().all(|line| line.starts_with('{')));
        assert!(logs.contains("beep (tick 2)"));
    }

    #[test]
    fn test_bell_write_failure_is_reported() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let bell = TerminalBell::with_writer(Broken);
        assert_eq!(bell.beep().unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }
}
