// Keyhid State
// Modifier and lock state tracking

mod tracker;

pub use tracker::{is_state_key, KeyTransition, ModifierState, ModifierStateTracker};
