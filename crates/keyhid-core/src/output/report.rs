// Keyhid HID Report Codec
// 8-byte boot keyboard reports and the key strokes they carry

use std::fmt;

use crate::modifier::Modifier;

/// Boot keyboard report length in bytes
pub const REPORT_LEN: usize = 8;

/// One key plus the modifier bits held while it is struck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    /// HID modifier byte
    pub modifiers: u8,
    /// HID usage ID of the key
    pub usage: u8,
}

impl KeyStroke {
    pub const fn new(modifiers: u8, usage: u8) -> Self {
        Self { modifiers, usage }
    }

    /// Same key with extra modifier bits
    pub const fn with_modifiers(self, bits: u8) -> Self {
        Self {
            modifiers: self.modifiers | bits,
            usage: self.usage,
        }
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in Modifier::from_bits(self.modifiers) {
            write!(f, "{}+", m)?;
        }
        write!(f, "0x{:02X}", self.usage)
    }
}

/// Wire image of a boot keyboard report: `[modifier, 0, usage, 0, 0, 0, 0, 0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidReport([u8; REPORT_LEN]);

impl HidReport {
    /// All keys up
    pub const RELEASE: HidReport = HidReport([0; REPORT_LEN]);

    pub const fn press(modifiers: u8, usage: u8) -> Self {
        HidReport([modifiers, 0, usage, 0, 0, 0, 0, 0])
    }

    pub const fn release() -> Self {
        Self::RELEASE
    }

    pub const fn from_stroke(stroke: KeyStroke) -> Self {
        Self::press(stroke.modifiers, stroke.usage)
    }

    pub const fn from_bytes(bytes: [u8; REPORT_LEN]) -> Self {
        HidReport(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; REPORT_LEN] {
        &self.0
    }

    pub const fn modifiers(&self) -> u8 {
        self.0[0]
    }

    pub const fn usage(&self) -> u8 {
        self.0[2]
    }

    pub fn is_release(&self) -> bool {
        *self == Self::RELEASE
    }
}

impl From<HidReport> for [u8; REPORT_LEN] {
    fn from(report: HidReport) -> Self {
        report.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier;

    #[test]
    fn test_press_layout() {
        let report = HidReport::press(modifier::LEFT_SHIFT, 0x0B);
        assert_eq!(report.as_bytes(), &[0x02, 0, 0x0B, 0, 0, 0, 0, 0]);
        assert_eq!(report.modifiers(), 0x02);
        assert_eq!(report.usage(), 0x0B);
        assert!(!report.is_release());
    }

    #[test]
    fn test_reports_are_always_eight_bytes() {
        for m in [0u8, 0x01, 0x40, 0xFF] {
            for u in [0u8, 0x04, 0x28, 0xFF] {
                assert_eq!(HidReport::press(m, u).as_bytes().len(), REPORT_LEN);
            }
        }
    }

    #[test]
    fn test_release_is_all_zero() {
        let _ = HidReport::press(0xFF, 0xFF);
        assert_eq!(HidReport::release().as_bytes(), &[0u8; 8]);
        assert!(HidReport::release().is_release());
        assert_eq!(HidReport::press(0, 0), HidReport::RELEASE);
    }

    #[test]
    fn test_stroke_display() {
        let stroke = KeyStroke::new(modifier::LEFT_SHIFT | modifier::RIGHT_ALT, 0x1F);
        assert_eq!(stroke.to_string(), "LShift+AltGr+0x1F");
        assert_eq!(KeyStroke::new(0, 0x28).to_string(), "0x28");
    }

    #[test]
    fn test_with_modifiers() {
        let stroke = KeyStroke::new(modifier::LEFT_SHIFT, 0x04).with_modifiers(modifier::LEFT_CTRL);
        assert_eq!(stroke.modifiers, 0x03);
    }
}
