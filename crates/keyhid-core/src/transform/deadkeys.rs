// Keyhid Dead Keys
// Accent composition through dead-key stroke sequences

use smallvec::SmallVec;
use unicode_normalization::char::{decompose_canonical, is_combining_mark};

use crate::layout::LayoutTable;
use crate::output::KeyStroke;

/// Accents that layouts commonly put on dead keys, named by the
/// combining mark canonical decomposition splits off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accent {
    Acute,
    Grave,
    Circumflex,
    Diaeresis,
    Tilde,
}

impl Accent {
    pub fn from_combining(c: char) -> Option<Self> {
        match c {
            '\u{0301}' => Some(Self::Acute),
            '\u{0300}' => Some(Self::Grave),
            '\u{0302}' => Some(Self::Circumflex),
            '\u{0308}' => Some(Self::Diaeresis),
            '\u{0303}' => Some(Self::Tilde),
            _ => None,
        }
    }
}

/// Strokes struck one after another to produce a single character.
///
/// Each step is a full press/release tap; the host composes the result.
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadKeySequence(SmallVec<[KeyStroke; 2]>);

impl DeadKeySequence {
    /// `None` when `steps` is empty
    pub fn new(steps: impl IntoIterator<Item = KeyStroke>) -> Option<Self> {
        let steps: SmallVec<[KeyStroke; 2]> = steps.into_iter().collect();
        if steps.is_empty() {
            None
        } else {
            Some(Self(steps))
        }
    }

    pub fn single(stroke: KeyStroke) -> Self {
        let mut steps = SmallVec::new();
        steps.push(stroke);
        Self(steps)
    }

    /// Append a step
    pub fn then(mut self, stroke: KeyStroke) -> Self {
        self.0.push(stroke);
        self
    }

    pub fn steps(&self) -> &[KeyStroke] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Split a precomposed character into its base and one combining mark
/// using canonical decomposition. Characters that decompose into anything
/// else yield `None`.
pub fn decompose(c: char) -> Option<(char, char)> {
    let mut parts: SmallVec<[char; 4]> = SmallVec::new();
    decompose_canonical(c, |d| parts.push(d));
    match parts.as_slice() {
        &[base, mark] if !is_combining_mark(base) && is_combining_mark(mark) => Some((base, mark)),
        _ => None,
    }
}

/// Dead-key sequence typing `c` on `table`: the accent's dead key, then
/// the base character
pub fn compose(table: &LayoutTable, c: char) -> Option<DeadKeySequence> {
    let (base, mark) = decompose(c)?;
    let dead = table.dead_key(Accent::from_combining(mark)?)?;
    let base_stroke = table.stroke_for_char(base)?;
    let steps = dead.steps().iter().copied().chain(std::iter::once(base_stroke));
    DeadKeySequence::new(steps)
}
