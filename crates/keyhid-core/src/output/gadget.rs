// Keyhid HID Gadget Output
// Press/hold/release emission of key strokes to a HID gadget device

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use super::report::{HidReport, KeyStroke};

/// Errors raised while writing reports
#[derive(Debug, thiserror::Error)]
pub enum HidError {
    #[error("Cannot open HID device {path}: {source}{hint}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
        hint: &'static str,
    },

    #[error("Failed to write HID report: {0}")]
    Write(#[source] io::Error),
}

impl HidError {
    fn open(path: &Path, source: io::Error) -> Self {
        let hint = if source.kind() == io::ErrorKind::PermissionDenied {
            " (try running as root)"
        } else {
            ""
        };
        HidError::Open {
            path: path.display().to_string(),
            source,
            hint,
        }
    }
}

/// Writes key taps to a report sink.
///
/// Each tap is a press report followed by a release report, with `hold`
/// slept after each write. A press whose release never made it out is
/// released again when the emitter is dropped.
pub struct HidEmitter<W: Write> {
    writer: W,
    hold: Duration,
    pending_release: bool,
    reports_written: u64,
}

impl HidEmitter<File> {
    /// Open a gadget node such as `/dev/hidg0` for writing
    pub fn open(path: impl AsRef<Path>, hold: Duration) -> Result<Self, HidError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| HidError::open(path, e))?;
        log::info!("Opened HID device {}", path.display());
        Ok(Self::new(file, hold))
    }
}

impl<W: Write> HidEmitter<W> {
    pub fn new(writer: W, hold: Duration) -> Self {
        Self {
            writer,
            hold,
            pending_release: false,
            reports_written: 0,
        }
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    /// Number of reports written so far
    pub fn reports_written(&self) -> u64 {
        self.reports_written
    }

    /// Strike one key: press, hold, release, hold
    pub fn emit(&mut self, stroke: KeyStroke) -> Result<(), HidError> {
        log::debug!("tap {}", stroke);
        self.write_report(HidReport::from_stroke(stroke))?;
        self.pending_release = true;
        self.pause();
        self.write_report(HidReport::RELEASE)?;
        self.pending_release = false;
        self.pause();
        Ok(())
    }

    /// Strike keys one after another
    pub fn emit_all(&mut self, strokes: &[KeyStroke]) -> Result<(), HidError> {
        for &stroke in strokes {
            self.emit(stroke)?;
        }
        Ok(())
    }

    /// Write an all-keys-up report
    pub fn release_all(&mut self) -> Result<(), HidError> {
        self.write_report(HidReport::RELEASE)?;
        self.pending_release = false;
        Ok(())
    }

    /// The underlying sink
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    fn write_report(&mut self, report: HidReport) -> Result<(), HidError> {
        self.writer
            .write_all(report.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(HidError::Write)?;
        self.reports_written += 1;
        Ok(())
    }

    fn pause(&self) {
        if !self.hold.is_zero() {
            thread::sleep(self.hold);
        }
    }

    fn release_pending(&mut self) {
        if self.pending_release {
            if let Err(e) = self.write_report(HidReport::RELEASE) {
                log::warn!("Failed to release pending key: {}", e);
            }
        }
    }
}

impl<W: Write> Drop for HidEmitter<W> {
    fn drop(&mut self) {
        self.release_pending();
    }
}
