// Keyhid QWERTY Layout
// US QWERTY host layout, dead keys as on US-International

use super::cross::CrossLayoutTable;
use super::numpad::NumpadTable;
use super::table::{LayoutName, LayoutTable};
use crate::modifier::LEFT_SHIFT;
use crate::output::KeyStroke;
use crate::transform::{Accent, DeadKeySequence};
use crate::usage;

/// Accent and the stroke of the dead key that produces it
const DEAD_KEYS: &[(Accent, u8, u8)] = &[
    (Accent::Acute, 0, usage::QUOTE),              // '
    (Accent::Grave, 0, usage::GRAVE),              // `
    (Accent::Circumflex, LEFT_SHIFT, 0x23),        // Shift+6
    (Accent::Diaeresis, LEFT_SHIFT, usage::QUOTE), // Shift+'
    (Accent::Tilde, LEFT_SHIFT, usage::GRAVE),     // Shift+`
];

pub(crate) fn table() -> LayoutTable {
    let letters: Vec<(char, u8)> = ('a'..='z')
        .filter_map(|c| usage::letter(c).map(|u| (c, u)))
        .collect();

    let mut builder = LayoutTable::builder(LayoutName::Qwerty)
        .letters(&letters)
        .key(0x1E, '1', '!')
        .key(0x1F, '2', '@')
        .key(0x20, '3', '#')
        .key(0x21, '4', '$')
        .key(0x22, '5', '%')
        .key(0x23, '6', '^')
        .key(0x24, '7', '&')
        .key(0x25, '8', '*')
        .key(0x26, '9', '(')
        .key(usage::DIGIT_0, '0', ')')
        .key(usage::MINUS, '-', '_')
        .key(usage::EQUAL, '=', '+')
        .key(usage::BRACKET_LEFT, '[', '{')
        .key(usage::BRACKET_RIGHT, ']', '}')
        .key(usage::BACKSLASH, '\\', '|')
        .key(usage::SEMICOLON, ';', ':')
        .key(usage::QUOTE, '\'', '"')
        .key(usage::GRAVE, '`', '~')
        .key(usage::COMMA, ',', '<')
        .key(usage::PERIOD, '.', '>')
        .key(usage::SLASH, '/', '?')
        .numpad(NumpadTable::pc())
        .cross(CrossLayoutTable::qwerty_to_azerty());

    for &(accent, modifiers, usage) in DEAD_KEYS {
        let stroke = KeyStroke::new(modifiers, usage);
        builder = builder.dead_key(accent, DeadKeySequence::single(stroke));
    }

    builder.build()
}
