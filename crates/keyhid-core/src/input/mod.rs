// Keyhid Input Layer
// Key events, key naming and live capture sources

mod event;
mod names;

#[cfg(feature = "capture")]
mod capture;

pub use event::{CaptureError, KeyEvent, KeyEventSource};
pub use names::key_name_for_code;

#[cfg(feature = "capture")]
pub use capture::EvdevSource;
