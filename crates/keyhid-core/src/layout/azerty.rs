// Keyhid AZERTY Layout
// French AZERTY host layout with its AltGr tier and dead keys

use super::numpad::NumpadTable;
use super::table::{LayoutName, LayoutTable};
use crate::modifier::{LEFT_SHIFT, RIGHT_ALT};
use crate::output::KeyStroke;
use crate::transform::{Accent, DeadKeySequence};
use crate::usage;

/// Letters by the HID usage of the position they occupy
const LETTERS: &[(char, u8)] = &[
    ('a', 0x14),
    ('z', 0x1A),
    ('e', 0x08),
    ('r', 0x15),
    ('t', 0x17),
    ('y', 0x1C),
    ('u', 0x18),
    ('i', 0x0C),
    ('o', 0x12),
    ('p', 0x13),
    ('q', 0x04),
    ('s', 0x16),
    ('d', 0x07),
    ('f', 0x09),
    ('g', 0x0A),
    ('h', 0x0B),
    ('j', 0x0D),
    ('k', 0x0E),
    ('l', 0x0F),
    ('m', 0x33),
    ('w', 0x1D),
    ('x', 0x1B),
    ('c', 0x06),
    ('v', 0x19),
    ('b', 0x05),
    ('n', 0x11),
];

/// Accent and the stroke of the dead key that produces it
const DEAD_KEYS: &[(Accent, u8, u8)] = &[
    (Accent::Circumflex, 0, usage::BRACKET_LEFT),         // ^
    (Accent::Diaeresis, LEFT_SHIFT, usage::BRACKET_LEFT), // Shift+^
    (Accent::Grave, RIGHT_ALT, 0x24),                     // AltGr+7
    (Accent::Tilde, RIGHT_ALT, 0x1F),                     // AltGr+2
];

pub(crate) fn table() -> LayoutTable {
    let mut builder = LayoutTable::builder(LayoutName::Azerty)
        .letters(LETTERS)
        .altgr(0x08, '€')
        // Number row: symbols unshifted, digits with Shift
        .key(0x1E, '&', '1')
        .key3(0x1F, 'é', Some('2'), '~')
        .key3(0x20, '"', Some('3'), '#')
        .key3(0x21, '\'', Some('4'), '{')
        .key3(0x22, '(', Some('5'), '[')
        .key3(0x23, '-', Some('6'), '|')
        .key3(0x24, 'è', Some('7'), '`')
        .key3(0x25, '_', Some('8'), '\\')
        .key3(0x26, 'ç', Some('9'), '^')
        .key3(usage::DIGIT_0, 'à', Some('0'), '@')
        .key3(usage::MINUS, ')', Some('°'), ']')
        .key3(usage::EQUAL, '=', Some('+'), '}')
        .key(usage::BRACKET_LEFT, '^', '¨')
        .key3(usage::BRACKET_RIGHT, '$', Some('£'), '¤')
        .key(usage::BACKSLASH, '*', 'µ')
        .key(usage::QUOTE, 'ù', '%')
        .row(usage::GRAVE, '²', None, None)
        .key(0x10, ',', '?')
        .key(usage::COMMA, ';', '.')
        .key(usage::PERIOD, ':', '/')
        .key(usage::SLASH, '!', '§')
        .key(usage::NON_US_BACKSLASH, '<', '>')
        .numpad(NumpadTable::pc());

    for &(accent, modifiers, usage) in DEAD_KEYS {
        let stroke = KeyStroke::new(modifiers, usage);
        builder = builder.dead_key(accent, DeadKeySequence::single(stroke));
    }

    builder.build()
}
