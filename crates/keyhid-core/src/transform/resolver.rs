// Keyhid Layout Resolver
// Logical keys and modifier state to layout-correct key strokes

use std::sync::Arc;

use super::deadkeys::{self, Accent, DeadKeySequence};
use crate::key::{ControlKey, LogicalKey, ScanCodeMap};
use crate::layout::LayoutTable;
use crate::modifier::{LEFT_SHIFT, RIGHT_ALT};
use crate::output::KeyStroke;
use crate::state::ModifierState;

/// A key resolved against the host layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSymbol {
    /// Printable key; the layout already chose Shift/AltGr
    Key(KeyStroke),
    /// Non-printing key; held modifiers pass through
    Control(KeyStroke),
    /// Accent dead key followed by the base character
    DeadKey(DeadKeySequence),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedSymbol),
    Unresolved,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn symbol(self) -> Option<ResolvedSymbol> {
        match self {
            Resolution::Resolved(symbol) => Some(symbol),
            Resolution::Unresolved => None,
        }
    }
}

impl From<Option<ResolvedSymbol>> for Resolution {
    fn from(symbol: Option<ResolvedSymbol>) -> Self {
        symbol.map_or(Resolution::Unresolved, Resolution::Resolved)
    }
}

/// Resolves keys against one layout table.
#[derive(Debug, Clone)]
pub struct LayoutResolver {
    table: Arc<LayoutTable>,
    scan_codes: ScanCodeMap,
}

impl LayoutResolver {
    pub fn new(table: Arc<LayoutTable>) -> Self {
        Self::with_scan_codes(table, ScanCodeMap::default())
    }

    pub fn with_scan_codes(table: Arc<LayoutTable>, scan_codes: ScanCodeMap) -> Self {
        Self { table, scan_codes }
    }

    pub fn table(&self) -> &LayoutTable {
        &self.table
    }

    pub fn scan_codes(&self) -> &ScanCodeMap {
        &self.scan_codes
    }

    /// Classify a captured key; keypad scan codes take precedence over the name
    pub fn classify(&self, name: &str, scan_code: u16) -> Option<LogicalKey> {
        LogicalKey::classify(name, scan_code, &self.scan_codes)
    }

    /// Resolve a physical key under the given modifier state.
    ///
    /// A printable key is looked up by its legend: AltGr tier first, then
    /// the Shift tier, then the base tier. Keys that are not a legend of
    /// this layout are resolved as produced characters.
    pub fn resolve(&self, key: &LogicalKey, state: ModifierState) -> Resolution {
        match *key {
            LogicalKey::Control(control) => control_symbol(control).into(),
            LogicalKey::NumpadDigit(_) | LogicalKey::NumpadDecimal => {
                let Some(entry) = self.table.numpad().entry(*key) else {
                    return Resolution::Unresolved;
                };
                if state.num_lock() {
                    self.resolve_char(entry.on)
                } else {
                    control_symbol(entry.off).into()
                }
            }
            LogicalKey::Letter(_) | LogicalKey::Digit(_) | LogicalKey::Symbol(_) => {
                let Some(c) = key.as_char() else {
                    return Resolution::Unresolved;
                };
                let Some(row) = self.table.row_for_legend(c) else {
                    return self.resolve_char(c);
                };

                if state.altgr() && row.altgr.is_some() {
                    return key_symbol(KeyStroke::new(RIGHT_ALT, row.usage)).into();
                }
                let shifted = if key.is_letter() {
                    state.letter_shifted()
                } else {
                    state.shift()
                };
                if shifted && row.shift.is_some() {
                    return key_symbol(KeyStroke::new(LEFT_SHIFT, row.usage)).into();
                }
                key_symbol(KeyStroke::new(0, row.usage)).into()
            }
        }
    }

    /// Resolve a produced character, as read from a text log
    pub fn resolve_char(&self, c: char) -> Resolution {
        if let Some(control) = ControlKey::from_control_char(c) {
            return control_symbol(control).into();
        }
        if let Some(stroke) = self.table.stroke_for_char(c) {
            return key_symbol(stroke).into();
        }
        // A bare combining mark strikes its dead key alone
        if let Some(sequence) = Accent::from_combining(c).and_then(|a| self.table.dead_key(a)) {
            return Resolution::Resolved(ResolvedSymbol::DeadKey(sequence.clone()));
        }
        deadkeys::compose(&self.table, c)
            .map(ResolvedSymbol::DeadKey)
            .into()
    }
}

fn key_symbol(stroke: KeyStroke) -> Option<ResolvedSymbol> {
    Some(ResolvedSymbol::Key(stroke))
}

fn control_symbol(control: ControlKey) -> Option<ResolvedSymbol> {
    Some(ResolvedSymbol::Control(KeyStroke::new(0, control.usage())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutName;
    use crate::modifier;

    fn resolver(name: LayoutName) -> LayoutResolver {
        LayoutResolver::new(Arc::new(LayoutTable::for_name(name)))
    }

    fn key(modifiers: u8, usage: u8) -> Resolution {
        Resolution::Resolved(ResolvedSymbol::Key(KeyStroke::new(modifiers, usage)))
    }

    fn control(usage: u8) -> Resolution {
        Resolution::Resolved(ResolvedSymbol::Control(KeyStroke::new(0, usage)))
    }

    #[test]
    fn test_letter_tiers() {
        let r = resolver(LayoutName::Qwerty);
        let a = LogicalKey::Letter('a');
        let none = ModifierState::new();
        let shift = none.with_held(modifier::LEFT_SHIFT);
        let caps = none.with_caps_lock(true);
        assert_eq!(r.resolve(&a, none), key(0, 0x04));
        assert_eq!(r.resolve(&a, shift), key(LEFT_SHIFT, 0x04));
        assert_eq!(r.resolve(&a, caps), key(LEFT_SHIFT, 0x04));
        assert_eq!(r.resolve(&a, shift.with_caps_lock(true)), key(0, 0x04));
    }

    #[test]
    fn test_caps_lock_does_not_shift_symbols() {
        let r = resolver(LayoutName::Qwerty);
        let one = LogicalKey::Digit(1);
        let caps = ModifierState::new().with_caps_lock(true);
        assert_eq!(r.resolve(&one, caps), key(0, 0x1E));
        let shift = ModifierState::new().with_held(modifier::RIGHT_SHIFT);
        assert_eq!(r.resolve(&one, shift), key(LEFT_SHIFT, 0x1E));
    }

    #[test]
    fn test_altgr_tier_on_azerty() {
        let r = resolver(LayoutName::Azerty);
        let altgr = ModifierState::new().with_held(modifier::RIGHT_ALT);
        // à key with AltGr is @
        assert_eq!(r.resolve(&LogicalKey::Letter('à'), altgr), key(RIGHT_ALT, 0x27));
        // e carries €
        assert_eq!(r.resolve(&LogicalKey::Letter('e'), altgr), key(RIGHT_ALT, 0x08));
        // No AltGr tier on a: fall back to base
        assert_eq!(r.resolve(&LogicalKey::Letter('a'), altgr), key(0, 0x14));
    }

    #[test]
    fn test_non_legend_keys_resolve_as_characters() {
        let r = resolver(LayoutName::Azerty);
        // '1' is not printed on any AZERTY key without Shift
        assert_eq!(
            r.resolve(&LogicalKey::Digit(1), ModifierState::new()),
            key(LEFT_SHIFT, 0x1E)
        );
        assert_eq!(r.resolve_char('@'), key(RIGHT_ALT, 0x27));
    }

    #[test]
    fn test_numpad_follows_num_lock() {
        let r = resolver(LayoutName::Qwerty);
        let on = ModifierState::new().with_num_lock(true);
        let off = ModifierState::new();
        let kp7 = LogicalKey::NumpadDigit(7);
        assert_eq!(r.resolve(&kp7, on), key(0, 0x24));
        assert_eq!(r.resolve(&kp7, off), control(ControlKey::Home.usage()));
        assert_eq!(r.resolve(&LogicalKey::NumpadDecimal, on), key(0, 0x37));
        assert_eq!(
            r.resolve(&LogicalKey::NumpadDecimal, off),
            control(ControlKey::Delete.usage())
        );
    }

    #[test]
    fn test_controls() {
        let r = resolver(LayoutName::Qwerty);
        assert_eq!(
            r.resolve(&LogicalKey::Control(ControlKey::Enter), ModifierState::new()),
            control(0x28)
        );
        assert_eq!(r.resolve_char('\n'), control(0x28));
        assert_eq!(r.resolve_char('\t'), control(0x2B));
    }

    #[test]
    fn test_dead_key_composition() {
        let r = resolver(LayoutName::Qwerty);
        let Resolution::Resolved(ResolvedSymbol::DeadKey(seq)) = r.resolve_char('é') else {
            panic!("expected a dead-key sequence");
        };
        assert_eq!(
            seq.steps(),
            &[KeyStroke::new(0, 0x34), KeyStroke::new(0, 0x08)]
        );

        // Bare combining acute: the dead key alone
        let Resolution::Resolved(ResolvedSymbol::DeadKey(seq)) = r.resolve_char('\u{0301}') else {
            panic!("expected the acute dead key");
        };
        assert_eq!(seq.steps(), &[KeyStroke::new(0, 0x34)]);
    }

    #[test]
    fn test_unresolved() {
        let r = resolver(LayoutName::Qwerty);
        assert_eq!(r.resolve_char('€'), Resolution::Unresolved);
        assert_eq!(r.resolve_char('漢'), Resolution::Unresolved);
        assert!(!r.resolve_char('漢').is_resolved());
    }

    #[test]
    fn test_classify_uses_scan_codes() {
        let r = resolver(LayoutName::Qwerty);
        assert_eq!(r.classify("8", 72), Some(LogicalKey::NumpadDigit(8)));
        assert_eq!(r.classify("8", 9), Some(LogicalKey::Digit(8)));
    }
}
