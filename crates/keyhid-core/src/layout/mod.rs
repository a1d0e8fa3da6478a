// Keyhid Layouts
// Layout tables, keypad semantics and cross-layout log translation

mod azerty;
pub mod cross;
mod numpad;
mod qwerty;
mod table;

pub use cross::{CrossLayoutTable, LogLine, TranslateStats};
pub use numpad::{NumpadEntry, NumpadTable};
pub use table::{KeyRow, LayoutBuilder, LayoutName, LayoutTable};
