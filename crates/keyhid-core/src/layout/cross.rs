// Keyhid Cross-Layout Translation
// Rewrites key logs captured on one layout into the keys of another

use std::io::{self, BufRead, Write};
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use super::table::LayoutName;

/// Modifier key names that are copied through untouched
const MODIFIER_KEY_NAMES: &[&str] = &["shift", "ctrl", "alt", "alt gr", "altgr", "win", "cmd"];

/// Position mapping from a source layout to `target`.
///
/// Keys are looked up by the character the source layout reported; values
/// are the key on the target layout at the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossLayoutTable {
    target: LayoutName,
    /// Letters and digits, lowercase; case is restored on output
    basic: IndexMap<char, char>,
    /// Unshifted symbols
    symbols: IndexMap<char, char>,
    /// Shifted symbols, emitted as `Shift+<key>`
    shifted: IndexMap<char, char>,
    /// Symbols typed with AltGr, emitted as `AltGr+<key>`
    altgr: IndexMap<char, char>,
}

impl CrossLayoutTable {
    /// QWERTY logs rewritten for a French AZERTY host
    pub fn qwerty_to_azerty() -> Self {
        let mut basic: IndexMap<char, char> = IndexMap::new();
        for c in ('a'..='z').chain('0'..='9') {
            basic.insert(c, c);
        }
        for (from, to) in [('q', 'a'), ('w', 'z'), ('a', 'q'), ('z', 'w')] {
            basic.insert(from, to);
        }

        let symbols = [
            (';', 'm'),
            ('\'', 'ù'),
            ('[', '^'),
            (']', '$'),
            ('\\', '*'),
            ('/', '!'),
            ('.', '.'),
            (',', ','),
            ('`', '²'),
            ('-', ')'),
            ('=', '='),
        ]
        .into_iter()
        .collect();

        let shifted = [
            ('!', '1'),
            ('@', '2'),
            ('#', '3'),
            ('$', '4'),
            ('%', '5'),
            ('^', '6'),
            ('&', '7'),
            ('*', '8'),
            ('(', '9'),
            (')', '0'),
            ('_', '°'),
            ('+', '+'),
            ('{', '¨'),
            ('}', '£'),
            ('|', 'µ'),
            (':', 'M'),
            ('"', '%'),
            ('<', '?'),
            ('>', '.'),
            ('?', '§'),
            ('~', '~'),
        ]
        .into_iter()
        .collect();

        let altgr = [
            ('@', '~'),
            ('3', '#'),
            ('$', '{'),
            ('5', '['),
            ('6', '|'),
            ('{', '`'),
            ('[', '\\'),
            (']', '^'),
            ('}', '@'),
            ('\\', ']'),
            ('=', '}'),
            ('~', 'ê'),
        ]
        .into_iter()
        .collect();

        Self {
            target: LayoutName::Azerty,
            basic,
            symbols,
            shifted,
            altgr,
        }
    }

    pub fn target(&self) -> LayoutName {
        self.target
    }

    /// Translate one logged key given the logged modifier list
    pub fn translate_key(&self, key: &str, modifiers: &str) -> String {
        let lower = key.to_lowercase();
        if MODIFIER_KEY_NAMES.contains(&lower.as_str()) {
            return key.to_string();
        }

        let single = single_char(key);

        if modifiers.to_lowercase().contains("altgr") {
            if let Some(mapped) = single.and_then(|c| self.altgr.get(&c)) {
                return format!("AltGr+{}", mapped);
            }
            let base = single_char(&lower)
                .and_then(|c| self.basic.get(&c))
                .map(|c| c.to_string())
                .unwrap_or_else(|| key.to_string());
            return format!("AltGr+{}", base);
        }

        let Some(c) = single else {
            return key.to_string();
        };

        if let Some(mapped) = self.shifted.get(&c) {
            return format!("Shift+{}", mapped);
        }
        if let Some(mapped) = self.symbols.get(&c) {
            return mapped.to_string();
        }

        let lower_c = c.to_lowercase().next().unwrap_or(c);
        match self.basic.get(&lower_c) {
            Some(mapped) if c.is_uppercase() => mapped.to_uppercase().collect(),
            Some(mapped) => mapped.to_string(),
            None => key.to_string(),
        }
    }

    /// Rewrite one log line; lines that do not parse are returned as is
    pub fn translate_line(&self, line: &str) -> String {
        match LogLine::parse(line) {
            Some(parsed) => {
                let key = self.translate_key(parsed.key, parsed.modifiers);
                parsed.with_key(&key)
            }
            None => line.trim_end().to_string(),
        }
    }

    /// Translate a whole log, one output line per input line
    pub fn translate_log<R: BufRead, W: Write>(
        &self,
        reader: R,
        mut writer: W,
    ) -> io::Result<TranslateStats> {
        let mut stats = TranslateStats::default();
        for line in reader.lines() {
            let line = line?;
            stats.lines += 1;
            if line.trim().is_empty() {
                writeln!(writer)?;
                continue;
            }
            if LogLine::parse(&line).is_some() {
                stats.translated += 1;
            }
            writeln!(writer, "{}", self.translate_line(&line))?;
        }
        writer.flush()?;
        Ok(stats)
    }
}

/// Counts reported after translating a log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateStats {
    pub lines: usize,
    /// Lines that matched the key log format
    pub translated: usize,
}

const LOG_LINE_PATTERN: &str =
    r"^\[([^\]]+)\]\s+Key:\s+([^|]+?)(?:\s+\|\s+Modifiers:\s+(.+))?$";

/// A parsed `[timestamp] Key: <key> | Modifiers: <mods>` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLine<'a> {
    pub timestamp: &'a str,
    pub key: &'a str,
    /// Empty when the line has no modifier part
    pub modifiers: &'a str,
}

impl<'a> LogLine<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN
            .get_or_init(|| Regex::new(LOG_LINE_PATTERN).expect("log line pattern is valid"));

        let caps = pattern.captures(line.trim())?;
        Some(Self {
            timestamp: caps.get(1)?.as_str(),
            key: caps.get(2)?.as_str().trim(),
            modifiers: caps.get(3).map(|m| m.as_str().trim()).unwrap_or(""),
        })
    }

    /// Format the line back with a different key
    pub fn with_key(&self, key: &str) -> String {
        if self.modifiers.is_empty() {
            format!("[{}] Key: {}", self.timestamp, key)
        } else {
            format!(
                "[{}] Key: {} | Modifiers: {}",
                self.timestamp, key, self.modifiers
            )
        }
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_swap_and_keep_case() {
        let t = CrossLayoutTable::qwerty_to_azerty();
        assert_eq!(t.translate_key("q", ""), "a");
        assert_eq!(t.translate_key("A", ""), "Q");
        assert_eq!(t.translate_key("w", ""), "z");
        assert_eq!(t.translate_key("e", ""), "e");
        assert_eq!(t.translate_key("7", ""), "7");
    }

    #[test]
    fn test_symbols() {
        let t = CrossLayoutTable::qwerty_to_azerty();
        assert_eq!(t.translate_key(";", ""), "m");
        assert_eq!(t.translate_key("'", ""), "ù");
        assert_eq!(t.translate_key("`", ""), "²");
    }

    #[test]
    fn test_shifted_symbols() {
        let t = CrossLayoutTable::qwerty_to_azerty();
        assert_eq!(t.translate_key("!", "shift"), "Shift+1");
        assert_eq!(t.translate_key("?", ""), "Shift+§");
    }

    #[test]
    fn test_altgr() {
        let t = CrossLayoutTable::qwerty_to_azerty();
        assert_eq!(t.translate_key("@", "altgr"), "AltGr+~");
        assert_eq!(t.translate_key("q", "AltGr"), "AltGr+a");
        assert_eq!(t.translate_key("é", "altgr"), "AltGr+é");
    }

    #[test]
    fn test_modifier_and_named_keys_pass_through() {
        let t = CrossLayoutTable::qwerty_to_azerty();
        assert_eq!(t.translate_key("alt gr", "altgr"), "alt gr");
        assert_eq!(t.translate_key("Shift", ""), "Shift");
        assert_eq!(t.translate_key("enter", ""), "enter");
    }

    #[test]
    fn test_log_line_pattern_compiles() {
        assert!(Regex::new(LOG_LINE_PATTERN).is_ok());
    }

    #[test]
    fn test_parse_log_line() {
        let line =
            LogLine::parse("[2025-07-25 21:03:03.728] Key: alt gr | Modifiers: altgr").unwrap();
        assert_eq!(line.timestamp, "2025-07-25 21:03:03.728");
        assert_eq!(line.key, "alt gr");
        assert_eq!(line.modifiers, "altgr");

        let line = LogLine::parse("[2025-07-25 21:02:38.099] Key: t").unwrap();
        assert_eq!(line.key, "t");
        assert_eq!(line.modifiers, "");

        assert!(LogLine::parse("not a key line").is_none());
    }

    #[test]
    fn test_translate_line() {
        let t = CrossLayoutTable::qwerty_to_azerty();
        assert_eq!(
            t.translate_line("[12:00:00] Key: a"),
            "[12:00:00] Key: q"
        );
        assert_eq!(
            t.translate_line("[12:00:01] Key: 2 | Modifiers: altgr"),
            "[12:00:01] Key: AltGr+2 | Modifiers: altgr"
        );
        assert_eq!(t.translate_line("garbage  "), "garbage");
    }

    #[test]
    fn test_translate_log() {
        let t = CrossLayoutTable::qwerty_to_azerty();
        let input = "[1] Key: w\n\nheader\n[2] Key: ; | Modifiers: shift\n";
        let mut out = Vec::new();
        let stats = t.translate_log(input.as_bytes(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[1] Key: z\n\nheader\n[2] Key: m | Modifiers: shift\n"
        );
        assert_eq!(stats, TranslateStats { lines: 4, translated: 2 });
    }
}
