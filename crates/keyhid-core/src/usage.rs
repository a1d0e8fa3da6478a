// Keyhid HID Usage IDs
// Keyboard/Keypad page (0x07) codes sent in byte 2 of a report

//! HID usage IDs identify physical key positions, not characters. The
//! character a position produces depends on the layout the host has
//! configured, which is why layout tables map characters onto these codes.

pub const A: u8 = 0x04;
pub const Z: u8 = 0x1D;
pub const DIGIT_1: u8 = 0x1E;
pub const DIGIT_0: u8 = 0x27;

pub const ENTER: u8 = 0x28;
pub const ESCAPE: u8 = 0x29;
pub const BACKSPACE: u8 = 0x2A;
pub const TAB: u8 = 0x2B;
pub const SPACE: u8 = 0x2C;
pub const MINUS: u8 = 0x2D;
pub const EQUAL: u8 = 0x2E;
pub const BRACKET_LEFT: u8 = 0x2F;
pub const BRACKET_RIGHT: u8 = 0x30;
pub const BACKSLASH: u8 = 0x31;
pub const NON_US_HASH: u8 = 0x32;
pub const SEMICOLON: u8 = 0x33;
pub const QUOTE: u8 = 0x34;
pub const GRAVE: u8 = 0x35;
pub const COMMA: u8 = 0x36;
pub const PERIOD: u8 = 0x37;
pub const SLASH: u8 = 0x38;
pub const CAPS_LOCK: u8 = 0x39;

pub const F1: u8 = 0x3A;
pub const F12: u8 = 0x45;

pub const PRINT_SCREEN: u8 = 0x46;
pub const SCROLL_LOCK: u8 = 0x47;
pub const PAUSE: u8 = 0x48;
pub const INSERT: u8 = 0x49;
pub const HOME: u8 = 0x4A;
pub const PAGE_UP: u8 = 0x4B;
pub const DELETE: u8 = 0x4C;
pub const END: u8 = 0x4D;
pub const PAGE_DOWN: u8 = 0x4E;
pub const ARROW_RIGHT: u8 = 0x4F;
pub const ARROW_LEFT: u8 = 0x50;
pub const ARROW_DOWN: u8 = 0x51;
pub const ARROW_UP: u8 = 0x52;

pub const NUM_LOCK: u8 = 0x53;
pub const KP_SLASH: u8 = 0x54;
pub const KP_ASTERISK: u8 = 0x55;
pub const KP_MINUS: u8 = 0x56;
pub const KP_PLUS: u8 = 0x57;
pub const KP_ENTER: u8 = 0x58;

pub const NON_US_BACKSLASH: u8 = 0x64;
pub const MENU: u8 = 0x65;
pub const CLEAR: u8 = 0x9C;

/// Usage of a lowercase ASCII letter.
pub const fn letter(c: char) -> Option<u8> {
    if c.is_ascii_lowercase() {
        Some(A + (c as u8 - b'a'))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_usage() {
        assert_eq!(letter('a'), Some(A));
        assert_eq!(letter('h'), Some(0x0B));
        assert_eq!(letter('z'), Some(Z));
        assert_eq!(letter('A'), None);
    }
}
