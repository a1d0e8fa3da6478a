// Keyhid Output Layer
// HID report encoding and gadget device emission

mod gadget;
mod report;

pub use gadget::{HidEmitter, HidError};
pub use report::{HidReport, KeyStroke, REPORT_LEN};
