// Keyhid Modifier System
// Modifier keys (Ctrl, Shift, Alt, AltGr, GUI), their HID bits and lock toggles

use std::fmt;

/// HID modifier byte bits (byte 0 of a keyboard report).
pub const LEFT_CTRL: u8 = 0x01;
pub const LEFT_SHIFT: u8 = 0x02;
pub const LEFT_ALT: u8 = 0x04;
pub const LEFT_GUI: u8 = 0x08;
pub const RIGHT_CTRL: u8 = 0x10;
pub const RIGHT_SHIFT: u8 = 0x20;
/// Right Alt, used as AltGr on most non-US layouts.
pub const RIGHT_ALT: u8 = 0x40;
pub const RIGHT_GUI: u8 = 0x80;

pub const SHIFT_BITS: u8 = LEFT_SHIFT | RIGHT_SHIFT;
pub const CTRL_BITS: u8 = LEFT_CTRL | RIGHT_CTRL;
pub const GUI_BITS: u8 = LEFT_GUI | RIGHT_GUI;

/// A keyboard modifier key, left and right variants kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    LeftCtrl,
    LeftShift,
    LeftAlt,
    LeftGui,
    RightCtrl,
    RightShift,
    /// AltGr
    RightAlt,
    RightGui,
}

impl Modifier {
    pub const ALL: [Modifier; 8] = [
        Modifier::LeftCtrl,
        Modifier::LeftShift,
        Modifier::LeftAlt,
        Modifier::LeftGui,
        Modifier::RightCtrl,
        Modifier::RightShift,
        Modifier::RightAlt,
        Modifier::RightGui,
    ];

    /// Bit of this modifier in the HID report modifier byte
    pub const fn bit(self) -> u8 {
        match self {
            Modifier::LeftCtrl => LEFT_CTRL,
            Modifier::LeftShift => LEFT_SHIFT,
            Modifier::LeftAlt => LEFT_ALT,
            Modifier::LeftGui => LEFT_GUI,
            Modifier::RightCtrl => RIGHT_CTRL,
            Modifier::RightShift => RIGHT_SHIFT,
            Modifier::RightAlt => RIGHT_ALT,
            Modifier::RightGui => RIGHT_GUI,
        }
    }

    /// Linux input-event-codes.h code of the physical key
    pub const fn linux_code(self) -> u16 {
        match self {
            Modifier::LeftCtrl => 29,
            Modifier::LeftShift => 42,
            Modifier::LeftAlt => 56,
            Modifier::LeftGui => 125,
            Modifier::RightCtrl => 97,
            Modifier::RightShift => 54,
            Modifier::RightAlt => 100,
            Modifier::RightGui => 126,
        }
    }

    /// Get modifier by Linux key code
    pub fn from_linux_code(code: u16) -> Option<Modifier> {
        Self::ALL.iter().copied().find(|m| m.linux_code() == code)
    }

    /// Get modifier by key name, as reported by capture hooks.
    ///
    /// Unsided names ("shift", "ctrl", "alt") resolve to the left key.
    pub fn from_name(name: &str) -> Option<Modifier> {
        let modifier = match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" | "left ctrl" | "left_ctrl" | "leftctrl" => Modifier::LeftCtrl,
            "right ctrl" | "right_ctrl" | "rightctrl" => Modifier::RightCtrl,
            "shift" | "left shift" | "left_shift" | "leftshift" => Modifier::LeftShift,
            "right shift" | "right_shift" | "rightshift" => Modifier::RightShift,
            "alt" | "left alt" | "left_alt" | "leftalt" => Modifier::LeftAlt,
            "alt gr" | "altgr" | "right alt" | "right_alt" | "rightalt" => Modifier::RightAlt,
            "windows" | "win" | "super" | "meta" | "cmd" | "left windows" | "left_meta"
            | "leftmeta" => Modifier::LeftGui,
            "right windows" | "right_meta" | "rightmeta" => Modifier::RightGui,
            _ => return None,
        };
        Some(modifier)
    }

    /// Collect the modifiers whose bits are set in a HID modifier byte
    pub fn from_bits(bits: u8) -> impl Iterator<Item = Modifier> {
        Self::ALL.into_iter().filter(move |m| bits & m.bit() != 0)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modifier::LeftCtrl => "LCtrl",
            Modifier::LeftShift => "LShift",
            Modifier::LeftAlt => "LAlt",
            Modifier::LeftGui => "LGui",
            Modifier::RightCtrl => "RCtrl",
            Modifier::RightShift => "RShift",
            Modifier::RightAlt => "AltGr",
            Modifier::RightGui => "RGui",
        };
        write!(f, "{}", name)
    }
}

/// Lock keys whose state flips on each press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleKey {
    CapsLock,
    NumLock,
}

impl ToggleKey {
    pub const fn linux_code(self) -> u16 {
        match self {
            ToggleKey::CapsLock => 58,
            ToggleKey::NumLock => 69,
        }
    }

    pub fn from_linux_code(code: u16) -> Option<ToggleKey> {
        match code {
            58 => Some(ToggleKey::CapsLock),
            69 => Some(ToggleKey::NumLock),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<ToggleKey> {
        match name.to_ascii_lowercase().as_str() {
            "caps lock" | "caps_lock" | "capslock" => Some(ToggleKey::CapsLock),
            "num lock" | "num_lock" | "numlock" => Some(ToggleKey::NumLock),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_bits_match_hid_layout() {
        assert_eq!(Modifier::LeftCtrl.bit(), 0x01);
        assert_eq!(Modifier::LeftShift.bit(), 0x02);
        assert_eq!(Modifier::LeftAlt.bit(), 0x04);
        assert_eq!(Modifier::LeftGui.bit(), 0x08);
        assert_eq!(Modifier::RightCtrl.bit(), 0x10);
        assert_eq!(Modifier::RightShift.bit(), 0x20);
        assert_eq!(Modifier::RightAlt.bit(), 0x40);
        assert_eq!(Modifier::RightGui.bit(), 0x80);
    }

    #[test]
    fn test_modifier_from_linux_code() {
        assert_eq!(Modifier::from_linux_code(42), Some(Modifier::LeftShift));
        assert_eq!(Modifier::from_linux_code(100), Some(Modifier::RightAlt));
        assert_eq!(Modifier::from_linux_code(30), None); // A
    }

    #[test]
    fn test_modifier_from_name() {
        assert_eq!(Modifier::from_name("shift"), Some(Modifier::LeftShift));
        assert_eq!(Modifier::from_name("Right Shift"), Some(Modifier::RightShift));
        assert_eq!(Modifier::from_name("alt gr"), Some(Modifier::RightAlt));
        assert_eq!(Modifier::from_name("windows"), Some(Modifier::LeftGui));
        assert_eq!(Modifier::from_name("a"), None);
    }

    #[test]
    fn test_modifier_from_bits() {
        let mods: Vec<_> = Modifier::from_bits(LEFT_SHIFT | RIGHT_ALT).collect();
        assert_eq!(mods, vec![Modifier::LeftShift, Modifier::RightAlt]);
    }

    #[test]
    fn test_toggle_keys() {
        assert_eq!(ToggleKey::from_linux_code(58), Some(ToggleKey::CapsLock));
        assert_eq!(ToggleKey::from_name("num lock"), Some(ToggleKey::NumLock));
        assert_eq!(ToggleKey::from_name("shift"), None);
    }
}
