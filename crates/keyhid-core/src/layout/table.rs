// Keyhid Layout Table
// Immutable per-layout mapping between characters and HID key strokes

use indexmap::IndexMap;
use serde::Deserialize;
use strum_macros::{Display, EnumString};

use super::cross::CrossLayoutTable;
use super::numpad::NumpadTable;
use crate::modifier;
use crate::output::KeyStroke;
use crate::transform::{Accent, DeadKeySequence};

/// Keyboard layouts with a built-in table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LayoutName {
    Qwerty,
    Azerty,
}

/// One physical key: its HID usage and the character on each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRow {
    pub usage: u8,
    /// Character typed without modifiers (the key's legend)
    pub base: char,
    pub shift: Option<char>,
    pub altgr: Option<char>,
}

/// Character tiers of a layout plus its dead keys, keypad and cross-layout
/// data. Built once and shared read-only.
#[derive(Debug, Clone)]
pub struct LayoutTable {
    name: LayoutName,
    rows: Vec<KeyRow>,
    by_legend: IndexMap<char, usize>,
    by_usage: IndexMap<u8, usize>,
    base: IndexMap<char, KeyStroke>,
    shift: IndexMap<char, KeyStroke>,
    altgr: IndexMap<char, KeyStroke>,
    dead_keys: IndexMap<Accent, DeadKeySequence>,
    numpad: NumpadTable,
    cross: Option<CrossLayoutTable>,
}

impl LayoutTable {
    /// Built-in table for a layout
    pub fn for_name(name: LayoutName) -> Self {
        match name {
            LayoutName::Qwerty => super::qwerty::table(),
            LayoutName::Azerty => super::azerty::table(),
        }
    }

    pub fn builder(name: LayoutName) -> LayoutBuilder {
        LayoutBuilder {
            table: LayoutTable {
                name,
                rows: Vec::new(),
                by_legend: IndexMap::new(),
                by_usage: IndexMap::new(),
                base: IndexMap::new(),
                shift: IndexMap::new(),
                altgr: IndexMap::new(),
                dead_keys: IndexMap::new(),
                numpad: NumpadTable::default(),
                cross: None,
            },
        }
    }

    pub fn name(&self) -> LayoutName {
        self.name
    }

    pub fn rows(&self) -> &[KeyRow] {
        &self.rows
    }

    /// Physical key whose base legend is `c`
    pub fn row_for_legend(&self, c: char) -> Option<&KeyRow> {
        self.by_legend.get(&c).map(|&i| &self.rows[i])
    }

    pub fn row_for_usage(&self, usage: u8) -> Option<&KeyRow> {
        self.by_usage.get(&usage).map(|&i| &self.rows[i])
    }

    /// Legend of the key at a HID usage
    pub fn legend(&self, usage: u8) -> Option<char> {
        self.row_for_usage(usage).map(|row| row.base)
    }

    /// Stroke typing `c` without modifiers
    pub fn base(&self, c: char) -> Option<KeyStroke> {
        self.base.get(&c).copied()
    }

    /// Stroke typing `c` with Shift
    pub fn shift(&self, c: char) -> Option<KeyStroke> {
        self.shift.get(&c).copied()
    }

    /// Stroke typing `c` with AltGr
    pub fn altgr(&self, c: char) -> Option<KeyStroke> {
        self.altgr.get(&c).copied()
    }

    /// Any single stroke producing `c`, base tier first
    pub fn stroke_for_char(&self, c: char) -> Option<KeyStroke> {
        self.base(c)
            .or_else(|| self.shift(c))
            .or_else(|| self.altgr(c))
    }

    /// Strokes of the dead key for `accent`
    pub fn dead_key(&self, accent: Accent) -> Option<&DeadKeySequence> {
        self.dead_keys.get(&accent)
    }

    pub fn numpad(&self) -> &NumpadTable {
        &self.numpad
    }

    /// Cross-layout data used by offline log translation
    pub fn cross(&self) -> Option<&CrossLayoutTable> {
        self.cross.as_ref()
    }

    /// Character a stroke produces, read back through the tiers
    pub fn decode(&self, stroke: KeyStroke) -> Option<char> {
        let row = self.row_for_usage(stroke.usage)?;
        match stroke.modifiers {
            0 => Some(row.base),
            m if m & !modifier::SHIFT_BITS == 0 => row.shift,
            modifier::RIGHT_ALT => row.altgr,
            _ => None,
        }
    }

    pub fn base_chars(&self) -> impl Iterator<Item = char> + '_ {
        self.base.keys().copied()
    }

    pub fn shift_chars(&self) -> impl Iterator<Item = char> + '_ {
        self.shift.keys().copied()
    }

    pub fn altgr_chars(&self) -> impl Iterator<Item = char> + '_ {
        self.altgr.keys().copied()
    }
}

/// Incremental construction of a [`LayoutTable`].
///
/// The first row registering a character wins, so rows listed earlier are
/// preferred when a layout offers the same character twice.
#[derive(Debug)]
pub struct LayoutBuilder {
    table: LayoutTable,
}

impl LayoutBuilder {
    /// Add a physical key
    pub fn row(mut self, usage: u8, base: char, shift: Option<char>, altgr: Option<char>) -> Self {
        let t = &mut self.table;
        let index = t.rows.len();
        t.rows.push(KeyRow {
            usage,
            base,
            shift,
            altgr,
        });
        t.by_legend.entry(base).or_insert(index);
        t.by_usage.entry(usage).or_insert(index);
        t.base.entry(base).or_insert(KeyStroke::new(0, usage));
        if let Some(c) = shift {
            t.shift
                .entry(c)
                .or_insert(KeyStroke::new(modifier::LEFT_SHIFT, usage));
        }
        if let Some(c) = altgr {
            t.altgr
                .entry(c)
                .or_insert(KeyStroke::new(modifier::RIGHT_ALT, usage));
        }
        self
    }

    /// Add a key with base and shifted characters
    pub fn key(self, usage: u8, base: char, shift: char) -> Self {
        self.row(usage, base, Some(shift), None)
    }

    /// Add a key with base, shifted and AltGr characters
    pub fn key3(self, usage: u8, base: char, shift: Option<char>, altgr: char) -> Self {
        self.row(usage, base, shift, Some(altgr))
    }

    /// Add letter keys; the shifted tier is the uppercase letter
    pub fn letters(mut self, letters: &[(char, u8)]) -> Self {
        for &(c, usage) in letters {
            let upper = c.to_uppercase().next();
            self = self.row(usage, c, upper, None);
        }
        self
    }

    /// Give an existing key an AltGr character
    pub fn altgr(mut self, usage: u8, c: char) -> Self {
        if let Some(&i) = self.table.by_usage.get(&usage) {
            self.table.rows[i].altgr = Some(c);
            self.table
                .altgr
                .entry(c)
                .or_insert(KeyStroke::new(modifier::RIGHT_ALT, usage));
        }
        self
    }

    /// Register the strokes of the dead key for `accent`
    pub fn dead_key(mut self, accent: Accent, sequence: DeadKeySequence) -> Self {
        self.table.dead_keys.insert(accent, sequence);
        self
    }

    pub fn numpad(mut self, numpad: NumpadTable) -> Self {
        self.table.numpad = numpad;
        self
    }

    pub fn cross(mut self, cross: CrossLayoutTable) -> Self {
        self.table.cross = Some(cross);
        self
    }

    pub fn build(self) -> LayoutTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn tiny() -> LayoutTable {
        LayoutTable::builder(LayoutName::Qwerty)
            .letters(&[('a', 0x04)])
            .key(0x1E, '1', '!')
            .key3(0x1F, '2', Some('@'), '²')
            .key(0x2D, '-', '_')
            .key(0x56, '-', '-')
            .build()
    }

    #[test]
    fn test_layout_name_parsing() {
        assert_eq!(LayoutName::from_str("azerty"), Ok(LayoutName::Azerty));
        assert_eq!(LayoutName::from_str("QWERTY"), Ok(LayoutName::Qwerty));
        assert!(LayoutName::from_str("dvorak").is_err());
        assert_eq!(LayoutName::Azerty.to_string(), "azerty");
    }

    #[test]
    fn test_tiers() {
        let t = tiny();
        assert_eq!(t.base('a'), Some(KeyStroke::new(0, 0x04)));
        assert_eq!(t.shift('A'), Some(KeyStroke::new(modifier::LEFT_SHIFT, 0x04)));
        assert_eq!(t.shift('!'), Some(KeyStroke::new(modifier::LEFT_SHIFT, 0x1E)));
        assert_eq!(t.altgr('²'), Some(KeyStroke::new(modifier::RIGHT_ALT, 0x1F)));
        assert_eq!(t.base('!'), None);
    }

    #[test]
    fn test_first_row_wins_for_duplicate_characters() {
        let t = tiny();
        assert_eq!(t.base('-'), Some(KeyStroke::new(0, 0x2D)));
        assert_eq!(t.row_for_legend('-').map(|r| r.usage), Some(0x2D));
    }

    #[test]
    fn test_decode() {
        let t = tiny();
        assert_eq!(t.decode(KeyStroke::new(0, 0x04)), Some('a'));
        assert_eq!(t.decode(KeyStroke::new(modifier::RIGHT_SHIFT, 0x04)), Some('A'));
        assert_eq!(t.decode(KeyStroke::new(modifier::RIGHT_ALT, 0x1F)), Some('²'));
        assert_eq!(t.decode(KeyStroke::new(modifier::LEFT_CTRL, 0x04)), None);
        assert_eq!(t.decode(KeyStroke::new(0, 0x99)), None);
    }

    #[test]
    fn test_builder_altgr_on_existing_row() {
        let t = LayoutTable::builder(LayoutName::Azerty)
            .letters(&[('e', 0x08)])
            .altgr(0x08, '€')
            .build();
        assert_eq!(t.altgr('€'), Some(KeyStroke::new(modifier::RIGHT_ALT, 0x08)));
        assert_eq!(t.row_for_legend('e').and_then(|r| r.altgr), Some('€'));
    }
}
