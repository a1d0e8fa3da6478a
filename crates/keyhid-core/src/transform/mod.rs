// Keyhid Transform Module
// Resolution, encoding and the translation engine

pub mod deadkeys;
pub mod encoder;
pub mod engine;
pub mod resolver;

pub use deadkeys::{compose, decompose, Accent, DeadKeySequence};
pub use encoder::encode;
pub use engine::{
    EngineConfig, EngineError, EngineStats, EventOutcome, TranslationEngine, LIVE_POLL_TIMEOUT,
};
pub use resolver::{LayoutResolver, Resolution, ResolvedSymbol};
