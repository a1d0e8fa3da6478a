// Keyhid Numpad Table
// Keypad key meaning under NumLock on (characters) and off (navigation)

use crate::key::{ControlKey, LogicalKey};

/// What one keypad key produces in each NumLock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumpadEntry {
    /// Character typed with NumLock on
    pub on: char,
    /// Navigation key with NumLock off
    pub off: ControlKey,
}

/// Keypad digits 0-9 plus the decimal key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumpadTable {
    digits: [NumpadEntry; 10],
    decimal: NumpadEntry,
}

impl NumpadTable {
    /// Standard PC keypad
    pub fn pc() -> Self {
        const fn e(on: char, off: ControlKey) -> NumpadEntry {
            NumpadEntry { on, off }
        }
        Self {
            digits: [
                e('0', ControlKey::Insert),
                e('1', ControlKey::End),
                e('2', ControlKey::Down),
                e('3', ControlKey::PageDown),
                e('4', ControlKey::Left),
                e('5', ControlKey::Clear),
                e('6', ControlKey::Right),
                e('7', ControlKey::Home),
                e('8', ControlKey::Up),
                e('9', ControlKey::PageUp),
            ],
            decimal: e('.', ControlKey::Delete),
        }
    }

    /// Entry for a keypad key; `None` for anything else
    pub fn entry(&self, key: LogicalKey) -> Option<NumpadEntry> {
        match key {
            LogicalKey::NumpadDigit(d) => self.digits.get(d as usize).copied(),
            LogicalKey::NumpadDecimal => Some(self.decimal),
            _ => None,
        }
    }
}

impl Default for NumpadTable {
    fn default() -> Self {
        Self::pc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pc_numpad_entries() {
        let t = NumpadTable::pc();
        let seven = t.entry(LogicalKey::NumpadDigit(7)).unwrap();
        assert_eq!(seven.on, '7');
        assert_eq!(seven.off, ControlKey::Home);
        let dot = t.entry(LogicalKey::NumpadDecimal).unwrap();
        assert_eq!(dot.on, '.');
        assert_eq!(dot.off, ControlKey::Delete);
        assert_eq!(t.entry(LogicalKey::NumpadDigit(5)).unwrap().off, ControlKey::Clear);
    }

    #[test]
    fn test_non_numpad_keys_have_no_entry() {
        let t = NumpadTable::pc();
        assert_eq!(t.entry(LogicalKey::Digit(7)), None);
        assert_eq!(t.entry(LogicalKey::NumpadDigit(12)), None);
    }
}
