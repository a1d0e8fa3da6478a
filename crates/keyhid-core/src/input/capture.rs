// Keyhid Input Layer - evdev Capture
// Reads key events from one explicitly named keyboard event device

use std::collections::VecDeque;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use evdev::{Device, EventType};

use super::event::{CaptureError, KeyEvent, KeyEventSource};
use super::names::key_name_for_code;
use crate::key::ScanCodeMap;
use crate::layout::LayoutTable;
use crate::Action;

/// Live key events from an evdev device node.
///
/// The device can be grabbed so its keys stop reaching the local session;
/// the grab is released when the source is dropped.
pub struct EvdevSource {
    device: Device,
    path: PathBuf,
    table: Arc<LayoutTable>,
    scan_codes: ScanCodeMap,
    pending: VecDeque<KeyEvent>,
    grabbed: bool,
}

impl EvdevSource {
    /// Open a device such as `/dev/input/event3`
    pub fn open(
        path: impl AsRef<Path>,
        table: Arc<LayoutTable>,
        scan_codes: ScanCodeMap,
    ) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let device = Device::open(path).map_err(|source| CaptureError::Open {
            path: path.display().to_string(),
            source,
        })?;
        log::info!(
            "Capturing from {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed device")
        );
        Ok(Self {
            device,
            path: path.to_path_buf(),
            table,
            scan_codes,
            pending: VecDeque::new(),
            grabbed: false,
        })
    }

    /// Take exclusive access to the device
    pub fn grab(&mut self) -> Result<(), CaptureError> {
        if !self.grabbed {
            // A previous instance may have died holding the grab
            let _ = self.device.ungrab();
            self.device.grab()?;
            self.grabbed = true;
            log::debug!("Grabbed {}", self.path.display());
        }
        Ok(())
    }

    pub fn ungrab(&mut self) {
        if self.grabbed {
            let _ = self.device.ungrab();
            self.grabbed = false;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    /// Wait for the device to become readable; false on timeout or EINTR
    fn poll(&self, timeout: Duration) -> Result<bool, CaptureError> {
        let mut fds = [libc::pollfd {
            fd: self.device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        }];
        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;
        let ret = unsafe { libc::poll(fds.as_mut_ptr(), 1, timeout_ms) };
        if ret < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(err.into());
        }
        if fds[0].revents & (libc::POLLHUP | libc::POLLERR | libc::POLLNVAL) != 0 {
            return Err(CaptureError::Closed);
        }
        Ok(ret > 0)
    }

    fn fetch(&mut self) -> Result<(), CaptureError> {
        let events = match self.device.fetch_events() {
            Ok(events) => events,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(()),
            Err(e) if e.raw_os_error() == Some(libc::ENODEV) => return Err(CaptureError::Closed),
            Err(e) => return Err(e.into()),
        };
        for event in events {
            if event.event_type() != EventType::KEY {
                continue;
            }
            let Some(action) = Action::from_i32(event.value()) else {
                continue;
            };
            let code = event.code();
            let Some(name) = key_name_for_code(code, &self.table, &self.scan_codes) else {
                log::debug!("Ignoring unnamed key code {}", code);
                continue;
            };
            self.pending
                .push_back(KeyEvent::new(code, name, action).with_timestamp(event.timestamp()));
        }
        Ok(())
    }
}

impl KeyEventSource for EvdevSource {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, CaptureError> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }
        if self.poll(timeout)? {
            self.fetch()?;
        }
        Ok(self.pending.pop_front())
    }
}

impl Drop for EvdevSource {
    fn drop(&mut self) {
        self.ungrab();
    }
}
