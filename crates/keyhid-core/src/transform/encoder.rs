// Keyhid Keycode Encoder
// Resolved symbols to the key strokes written as reports

use smallvec::SmallVec;

use super::resolver::ResolvedSymbol;
use crate::modifier::{CTRL_BITS, GUI_BITS, LEFT_ALT};
use crate::output::KeyStroke;
use crate::state::ModifierState;

/// Held modifiers carried onto printable keys. Shift and AltGr are left
/// out since the layout already decided them.
const PASS_THROUGH_BITS: u8 = CTRL_BITS | LEFT_ALT | GUI_BITS;

/// Turn a resolved symbol into the taps to emit, in order.
///
/// Dead-key steps are struck as given; held modifiers would break the
/// host's composition.
pub fn encode(symbol: &ResolvedSymbol, held: ModifierState) -> SmallVec<[KeyStroke; 2]> {
    let mut out = SmallVec::new();
    match symbol {
        ResolvedSymbol::Key(stroke) => {
            out.push(stroke.with_modifiers(held.bits() & PASS_THROUGH_BITS));
        }
        ResolvedSymbol::Control(stroke) => {
            out.push(stroke.with_modifiers(held.bits()));
        }
        ResolvedSymbol::DeadKey(sequence) => {
            out.extend(sequence.steps().iter().copied());
        }
    }
    out
}
