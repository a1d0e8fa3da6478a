// Keyhid Key Types
// Logical keys, non-printing control keys and Linux key-code classification

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::usage;

/// A non-printing key. Parsed from log tokens (`ENTER`, `PAGEUP`) and from
/// capture key names (`enter`, `page up`), case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum ControlKey {
    #[strum(to_string = "ENTER", serialize = "RETURN")]
    Enter,
    #[strum(to_string = "ESC", serialize = "ESCAPE")]
    Escape,
    #[strum(to_string = "BACKSPACE")]
    Backspace,
    #[strum(to_string = "TAB")]
    Tab,
    #[strum(to_string = "SPACE")]
    Space,
    #[strum(to_string = "DELETE", serialize = "DEL")]
    Delete,
    #[strum(to_string = "INSERT", serialize = "INS")]
    Insert,
    #[strum(to_string = "HOME")]
    Home,
    #[strum(to_string = "END")]
    End,
    #[strum(to_string = "PAGEUP", serialize = "PAGE_UP", serialize = "page up")]
    PageUp,
    #[strum(to_string = "PAGEDOWN", serialize = "PAGE_DOWN", serialize = "page down")]
    PageDown,
    #[strum(to_string = "UP", serialize = "up arrow", serialize = "up_arrow")]
    Up,
    #[strum(to_string = "DOWN", serialize = "down arrow", serialize = "down_arrow")]
    Down,
    #[strum(to_string = "LEFT", serialize = "left arrow", serialize = "left_arrow")]
    Left,
    #[strum(to_string = "RIGHT", serialize = "right arrow", serialize = "right_arrow")]
    Right,
    #[strum(to_string = "F1")]
    F1,
    #[strum(to_string = "F2")]
    F2,
    #[strum(to_string = "F3")]
    F3,
    #[strum(to_string = "F4")]
    F4,
    #[strum(to_string = "F5")]
    F5,
    #[strum(to_string = "F6")]
    F6,
    #[strum(to_string = "F7")]
    F7,
    #[strum(to_string = "F8")]
    F8,
    #[strum(to_string = "F9")]
    F9,
    #[strum(to_string = "F10")]
    F10,
    #[strum(to_string = "F11")]
    F11,
    #[strum(to_string = "F12")]
    F12,
    #[strum(
        to_string = "PRINT",
        serialize = "PRTSCR",
        serialize = "print screen",
        serialize = "SYSRQ"
    )]
    PrintScreen,
    #[strum(to_string = "SCROLLLOCK", serialize = "scroll lock")]
    ScrollLock,
    #[strum(to_string = "PAUSE")]
    Pause,
    #[strum(to_string = "MENU", serialize = "COMPOSE", serialize = "apps")]
    Menu,
    /// Numpad 5 with NumLock off.
    #[strum(to_string = "CLEAR")]
    Clear,
    #[strum(to_string = "KPENTER")]
    KpEnter,
    #[strum(to_string = "KPPLUS")]
    KpPlus,
    #[strum(to_string = "KPMINUS")]
    KpMinus,
    #[strum(to_string = "KPASTERISK")]
    KpAsterisk,
    #[strum(to_string = "KPSLASH")]
    KpSlash,
}

impl ControlKey {
    /// HID usage ID of this key
    pub const fn usage(self) -> u8 {
        match self {
            ControlKey::Enter => usage::ENTER,
            ControlKey::Escape => usage::ESCAPE,
            ControlKey::Backspace => usage::BACKSPACE,
            ControlKey::Tab => usage::TAB,
            ControlKey::Space => usage::SPACE,
            ControlKey::Delete => usage::DELETE,
            ControlKey::Insert => usage::INSERT,
            ControlKey::Home => usage::HOME,
            ControlKey::End => usage::END,
            ControlKey::PageUp => usage::PAGE_UP,
            ControlKey::PageDown => usage::PAGE_DOWN,
            ControlKey::Up => usage::ARROW_UP,
            ControlKey::Down => usage::ARROW_DOWN,
            ControlKey::Left => usage::ARROW_LEFT,
            ControlKey::Right => usage::ARROW_RIGHT,
            ControlKey::F1 => usage::F1,
            ControlKey::F2 => usage::F1 + 1,
            ControlKey::F3 => usage::F1 + 2,
            ControlKey::F4 => usage::F1 + 3,
            ControlKey::F5 => usage::F1 + 4,
            ControlKey::F6 => usage::F1 + 5,
            ControlKey::F7 => usage::F1 + 6,
            ControlKey::F8 => usage::F1 + 7,
            ControlKey::F9 => usage::F1 + 8,
            ControlKey::F10 => usage::F1 + 9,
            ControlKey::F11 => usage::F1 + 10,
            ControlKey::F12 => usage::F12,
            ControlKey::PrintScreen => usage::PRINT_SCREEN,
            ControlKey::ScrollLock => usage::SCROLL_LOCK,
            ControlKey::Pause => usage::PAUSE,
            ControlKey::Menu => usage::MENU,
            ControlKey::Clear => usage::CLEAR,
            ControlKey::KpEnter => usage::KP_ENTER,
            ControlKey::KpPlus => usage::KP_PLUS,
            ControlKey::KpMinus => usage::KP_MINUS,
            ControlKey::KpAsterisk => usage::KP_ASTERISK,
            ControlKey::KpSlash => usage::KP_SLASH,
        }
    }

    /// Control key named by an ASCII control character in a text stream
    pub fn from_control_char(c: char) -> Option<ControlKey> {
        match c {
            '\n' => Some(ControlKey::Enter),
            '\t' => Some(ControlKey::Tab),
            ' ' => Some(ControlKey::Space),
            '\u{8}' => Some(ControlKey::Backspace),
            '\u{1b}' => Some(ControlKey::Escape),
            '\u{7f}' => Some(ControlKey::Delete),
            _ => None,
        }
    }

    /// Canonical token name, as written between brackets in logs
    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A key as the translation engine sees it.
///
/// Printable keys carry the character engraved on them (their base legend)
/// or, when coming from a text stream, the character that was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    Letter(char),
    Digit(u8),
    Symbol(char),
    Control(ControlKey),
    NumpadDigit(u8),
    NumpadDecimal,
}

impl LogicalKey {
    /// Classify a single character
    pub fn from_char(c: char) -> LogicalKey {
        if let Some(control) = ControlKey::from_control_char(c) {
            return LogicalKey::Control(control);
        }
        if let Some(d) = c.to_digit(10) {
            return LogicalKey::Digit(d as u8);
        }
        if c.is_alphabetic() {
            return LogicalKey::Letter(c);
        }
        LogicalKey::Symbol(c)
    }

    /// Classify a captured key by name and raw scan code.
    ///
    /// Key names collide between the number row and the keypad ("1" is
    /// reported for both), so scan codes listed in `scan_codes` win over the
    /// name. Returns `None` for names that denote no known key.
    pub fn classify(name: &str, scan_code: u16, scan_codes: &ScanCodeMap) -> Option<LogicalKey> {
        if let Some(key) = scan_codes.numpad_key(scan_code) {
            return Some(key);
        }

        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(Self::from_char(c));
        }

        ControlKey::from_str(name).ok().map(LogicalKey::Control)
    }

    /// The printable character of this key, if any
    pub fn as_char(&self) -> Option<char> {
        match *self {
            LogicalKey::Letter(c) | LogicalKey::Symbol(c) => Some(c),
            LogicalKey::Digit(d) => char::from_digit(d as u32, 10),
            _ => None,
        }
    }

    pub fn is_letter(&self) -> bool {
        matches!(self, LogicalKey::Letter(_))
    }

    pub fn is_numpad(&self) -> bool {
        matches!(self, LogicalKey::NumpadDigit(_) | LogicalKey::NumpadDecimal)
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalKey::Letter(c) | LogicalKey::Symbol(c) => write!(f, "{:?}", c),
            LogicalKey::Digit(d) => write!(f, "'{}'", d),
            LogicalKey::Control(key) => write!(f, "[{}]", key),
            LogicalKey::NumpadDigit(d) => write!(f, "KP{}", d),
            LogicalKey::NumpadDecimal => write!(f, "KPDOT"),
        }
    }
}

/// Raw scan codes that belong to the numeric keypad.
///
/// The default values are the Linux/PC set-1 codes of a standard 105-key
/// board; other hardware may report different codes, hence the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCodeMap {
    numpad: IndexMap<u16, LogicalKey>,
}

impl ScanCodeMap {
    pub fn empty() -> Self {
        Self {
            numpad: IndexMap::new(),
        }
    }

    /// Standard PC keypad codes
    pub fn pc_default() -> Self {
        let mut map = Self::empty();
        for (code, digit) in [
            (71, 7),
            (72, 8),
            (73, 9),
            (75, 4),
            (76, 5),
            (77, 6),
            (79, 1),
            (80, 2),
            (81, 3),
            (82, 0),
        ] {
            map.insert(code, LogicalKey::NumpadDigit(digit));
        }
        map.insert(83, LogicalKey::NumpadDecimal);
        map
    }

    /// Register a scan code as a keypad key. Non-keypad keys are rejected.
    pub fn insert(&mut self, scan_code: u16, key: LogicalKey) -> bool {
        if !key.is_numpad() {
            return false;
        }
        self.numpad.insert(scan_code, key);
        true
    }

    pub fn numpad_key(&self, scan_code: u16) -> Option<LogicalKey> {
        self.numpad.get(&scan_code).copied()
    }

    pub fn len(&self) -> usize {
        self.numpad.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numpad.is_empty()
    }
}

impl Default for ScanCodeMap {
    fn default() -> Self {
        Self::pc_default()
    }
}

/// Parse a keypad key name as used in configuration ("7", "kp7", ".", "kpdot")
pub fn parse_numpad_name(name: &str) -> Option<LogicalKey> {
    let lower = name.to_ascii_lowercase();
    let bare = lower.strip_prefix("kp").unwrap_or(&lower);
    match bare {
        "." | "dot" | "decimal" => Some(LogicalKey::NumpadDecimal),
        _ => {
            let mut chars = bare.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c.to_digit(10).map(|d| LogicalKey::NumpadDigit(d as u8)),
                _ => None,
            }
        }
    }
}

/// HID usage of the physical printable key with a Linux key code.
///
/// Positions are layout independent; the layout decides which character a
/// position carries.
pub fn usage_for_linux_code(code: u16) -> Option<u8> {
    let usage = match code {
        2..=10 => usage::DIGIT_1 + (code as u8 - 2),
        11 => usage::DIGIT_0,
        12 => usage::MINUS,
        13 => usage::EQUAL,
        16 => 0x14, // Q
        17 => 0x1A, // W
        18 => 0x08, // E
        19 => 0x15, // R
        20 => 0x17, // T
        21 => 0x1C, // Y
        22 => 0x18, // U
        23 => 0x0C, // I
        24 => 0x12, // O
        25 => 0x13, // P
        26 => usage::BRACKET_LEFT,
        27 => usage::BRACKET_RIGHT,
        30 => 0x04, // A
        31 => 0x16, // S
        32 => 0x07, // D
        33 => 0x09, // F
        34 => 0x0A, // G
        35 => 0x0B, // H
        36 => 0x0D, // J
        37 => 0x0E, // K
        38 => 0x0F, // L
        39 => usage::SEMICOLON,
        40 => usage::QUOTE,
        41 => usage::GRAVE,
        43 => usage::BACKSLASH,
        44 => 0x1D, // Z
        45 => 0x1B, // X
        46 => 0x06, // C
        47 => 0x19, // V
        48 => 0x05, // B
        49 => 0x11, // N
        50 => 0x10, // M
        51 => usage::COMMA,
        52 => usage::PERIOD,
        53 => usage::SLASH,
        86 => usage::NON_US_BACKSLASH,
        _ => return None,
    };
    Some(usage)
}

/// Control key with a Linux key code
pub fn control_for_linux_code(code: u16) -> Option<ControlKey> {
    let key = match code {
        1 => ControlKey::Escape,
        14 => ControlKey::Backspace,
        15 => ControlKey::Tab,
        28 => ControlKey::Enter,
        55 => ControlKey::KpAsterisk,
        57 => ControlKey::Space,
        59 => ControlKey::F1,
        60 => ControlKey::F2,
        61 => ControlKey::F3,
        62 => ControlKey::F4,
        63 => ControlKey::F5,
        64 => ControlKey::F6,
        65 => ControlKey::F7,
        66 => ControlKey::F8,
        67 => ControlKey::F9,
        68 => ControlKey::F10,
        70 => ControlKey::ScrollLock,
        74 => ControlKey::KpMinus,
        78 => ControlKey::KpPlus,
        87 => ControlKey::F11,
        88 => ControlKey::F12,
        96 => ControlKey::KpEnter,
        98 => ControlKey::KpSlash,
        99 => ControlKey::PrintScreen,
        102 => ControlKey::Home,
        103 => ControlKey::Up,
        104 => ControlKey::PageUp,
        105 => ControlKey::Left,
        106 => ControlKey::Right,
        107 => ControlKey::End,
        108 => ControlKey::Down,
        109 => ControlKey::PageDown,
        110 => ControlKey::Insert,
        111 => ControlKey::Delete,
        119 => ControlKey::Pause,
        127 => ControlKey::Menu,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_key_from_token_names() {
        assert_eq!(ControlKey::from_str("ENTER"), Ok(ControlKey::Enter));
        assert_eq!(ControlKey::from_str("enter"), Ok(ControlKey::Enter));
        assert_eq!(ControlKey::from_str("ESC"), Ok(ControlKey::Escape));
        assert_eq!(ControlKey::from_str("escape"), Ok(ControlKey::Escape));
        assert_eq!(ControlKey::from_str("PAGEUP"), Ok(ControlKey::PageUp));
        assert_eq!(ControlKey::from_str("page down"), Ok(ControlKey::PageDown));
        assert_eq!(ControlKey::from_str("F12"), Ok(ControlKey::F12));
        assert!(ControlKey::from_str("SHIFT_PRESS").is_err());
    }

    #[test]
    fn test_control_key_usage() {
        assert_eq!(ControlKey::Enter.usage(), 0x28);
        assert_eq!(ControlKey::Delete.usage(), 0x4C);
        assert_eq!(ControlKey::F1.usage(), 0x3A);
        assert_eq!(ControlKey::F10.usage(), 0x43);
        assert_eq!(ControlKey::F12.usage(), 0x45);
        assert_eq!(ControlKey::Up.usage(), 0x52);
    }

    #[test]
    fn test_control_key_display_uses_token_name() {
        assert_eq!(ControlKey::PageUp.to_string(), "PAGEUP");
        assert_eq!(ControlKey::Escape.name(), "ESC");
    }

    #[test]
    fn test_logical_key_from_char() {
        assert_eq!(LogicalKey::from_char('a'), LogicalKey::Letter('a'));
        assert_eq!(LogicalKey::from_char('É'), LogicalKey::Letter('É'));
        assert_eq!(LogicalKey::from_char('7'), LogicalKey::Digit(7));
        assert_eq!(LogicalKey::from_char('!'), LogicalKey::Symbol('!'));
        assert_eq!(LogicalKey::from_char('\n'), LogicalKey::Control(ControlKey::Enter));
        assert_eq!(LogicalKey::from_char(' '), LogicalKey::Control(ControlKey::Space));
        assert_eq!(ControlKey::from_control_char('\r'), None);
    }

    #[test]
    fn test_classify_disambiguates_numpad_by_scan_code() {
        let map = ScanCodeMap::default();
        // Number row "1" (scan code 2) vs keypad "1" (scan code 79)
        assert_eq!(LogicalKey::classify("1", 2, &map), Some(LogicalKey::Digit(1)));
        assert_eq!(LogicalKey::classify("1", 79, &map), Some(LogicalKey::NumpadDigit(1)));
        assert_eq!(LogicalKey::classify(".", 52, &map), Some(LogicalKey::Symbol('.')));
        assert_eq!(LogicalKey::classify(".", 83, &map), Some(LogicalKey::NumpadDecimal));
        assert_eq!(
            LogicalKey::classify("page up", 104, &map),
            Some(LogicalKey::Control(ControlKey::PageUp))
        );
        assert_eq!(LogicalKey::classify("volume up", 115, &map), None);
    }

    #[test]
    fn test_scan_code_map_rejects_non_numpad_keys() {
        let mut map = ScanCodeMap::empty();
        assert!(!map.insert(2, LogicalKey::Digit(1)));
        assert!(map.insert(200, LogicalKey::NumpadDigit(1)));
        assert_eq!(map.numpad_key(200), Some(LogicalKey::NumpadDigit(1)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_parse_numpad_name() {
        assert_eq!(parse_numpad_name("7"), Some(LogicalKey::NumpadDigit(7)));
        assert_eq!(parse_numpad_name("KP0"), Some(LogicalKey::NumpadDigit(0)));
        assert_eq!(parse_numpad_name("kpdot"), Some(LogicalKey::NumpadDecimal));
        assert_eq!(parse_numpad_name("."), Some(LogicalKey::NumpadDecimal));
        assert_eq!(parse_numpad_name("12"), None);
    }

    #[test]
    fn test_linux_code_tables() {
        assert_eq!(usage_for_linux_code(30), Some(0x04)); // A
        assert_eq!(usage_for_linux_code(2), Some(0x1E)); // 1
        assert_eq!(usage_for_linux_code(11), Some(0x27)); // 0
        assert_eq!(usage_for_linux_code(86), Some(0x64)); // 102ND
        assert_eq!(usage_for_linux_code(28), None);
        assert_eq!(control_for_linux_code(28), Some(ControlKey::Enter));
        assert_eq!(control_for_linux_code(111), Some(ControlKey::Delete));
        assert_eq!(control_for_linux_code(30), None);
    }
}
