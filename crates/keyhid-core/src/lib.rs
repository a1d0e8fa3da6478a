// Keyhid Core Library
// Keystroke to USB HID report translation for keyboard gadgets

pub mod action;
pub mod input;
pub mod key;
pub mod layout;
pub mod modifier;
pub mod output;
pub mod replay;
pub mod settings;
pub mod state;
pub mod transform;
pub mod usage;

pub use action::Action;
pub use input::{key_name_for_code, CaptureError, KeyEvent, KeyEventSource};
pub use key::{ControlKey, LogicalKey, ScanCodeMap};
pub use layout::{CrossLayoutTable, LayoutName, LayoutTable};
pub use modifier::{Modifier, ToggleKey};
pub use output::{HidEmitter, HidError, HidReport, KeyStroke, REPORT_LEN};
pub use replay::{LogTokenizer, ReadMode, StartAt, Token, TokenizeError};
pub use settings::{default_config_content, Config, ConfigError};
pub use state::{KeyTransition, ModifierState, ModifierStateTracker};
pub use transform::{
    encode, DeadKeySequence, EngineConfig, EngineError, EngineStats, EventOutcome,
    LayoutResolver, Resolution, ResolvedSymbol, TranslationEngine,
};

#[cfg(feature = "capture")]
pub use input::EvdevSource;
