// Keyhid Modifier State Tracker
// Held modifiers and lock toggles derived from press/release events

use smallvec::SmallVec;

use crate::input::KeyEvent;
use crate::modifier::{self, Modifier, ToggleKey};
use crate::Action;

/// Snapshot of the modifier keys currently held plus the lock toggles.
///
/// `held` uses the HID modifier byte layout, so left and right variants are
/// tracked separately and the value can be OR-ed into a report directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierState {
    held: u8,
    caps_lock: bool,
    num_lock: bool,
}

impl ModifierState {
    pub const fn new() -> Self {
        Self {
            held: 0,
            caps_lock: false,
            num_lock: false,
        }
    }

    pub const fn with_held(mut self, bits: u8) -> Self {
        self.held |= bits;
        self
    }

    pub const fn with_caps_lock(mut self, on: bool) -> Self {
        self.caps_lock = on;
        self
    }

    pub const fn with_num_lock(mut self, on: bool) -> Self {
        self.num_lock = on;
        self
    }

    /// Held modifiers as a HID modifier byte
    pub const fn bits(&self) -> u8 {
        self.held
    }

    pub const fn is_held(&self, modifier: Modifier) -> bool {
        self.held & modifier.bit() != 0
    }

    pub const fn shift(&self) -> bool {
        self.held & modifier::SHIFT_BITS != 0
    }

    pub const fn ctrl(&self) -> bool {
        self.held & modifier::CTRL_BITS != 0
    }

    /// Left Alt only; the right Alt key is AltGr
    pub const fn alt(&self) -> bool {
        self.held & modifier::LEFT_ALT != 0
    }

    pub const fn altgr(&self) -> bool {
        self.held & modifier::RIGHT_ALT != 0
    }

    pub const fn gui(&self) -> bool {
        self.held & modifier::GUI_BITS != 0
    }

    pub const fn caps_lock(&self) -> bool {
        self.caps_lock
    }

    pub const fn num_lock(&self) -> bool {
        self.num_lock
    }

    /// Letter case: Shift and CapsLock cancel each other out
    pub const fn letter_shifted(&self) -> bool {
        self.shift() ^ self.caps_lock
    }
}

/// What an event meant for the physical key it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    /// The key went down
    Pressed,
    /// The key was already down (auto-repeat or a duplicated down event)
    Repeated,
    /// The key went up
    Released,
    /// Release of a key that was not held
    Ignored,
}

/// Maintains [`ModifierState`] from a stream of key events.
///
/// Every key that is down is remembered by scan code, so a second down event
/// for the same key is a repeat and a stray up event is dropped. That keeps
/// the modifier bits from drifting when events are duplicated.
#[derive(Debug, Clone)]
pub struct ModifierStateTracker {
    state: ModifierState,
    held_keys: SmallVec<[u16; 8]>,
}

impl ModifierStateTracker {
    pub fn new(initial_num_lock: bool) -> Self {
        Self {
            state: ModifierState::new().with_num_lock(initial_num_lock),
            held_keys: SmallVec::new(),
        }
    }

    /// Apply one key event
    pub fn update(&mut self, event: &KeyEvent) -> KeyTransition {
        let code = event.scan_code;
        match event.action {
            Action::Press | Action::Repeat => {
                if self.held_keys.contains(&code) {
                    return KeyTransition::Repeated;
                }
                self.held_keys.push(code);
                if let Some(m) = modifier_of(event) {
                    self.state.held |= m.bit();
                }
                // A repeat for a key we never saw go down still marks it held,
                // but only a real press edge flips a lock.
                if event.action.just_pressed() {
                    match toggle_of(event) {
                        Some(ToggleKey::CapsLock) => self.state.caps_lock = !self.state.caps_lock,
                        Some(ToggleKey::NumLock) => self.state.num_lock = !self.state.num_lock,
                        None => {}
                    }
                }
                KeyTransition::Pressed
            }
            Action::Release => {
                let Some(pos) = self.held_keys.iter().position(|&c| c == code) else {
                    return KeyTransition::Ignored;
                };
                self.held_keys.swap_remove(pos);
                if let Some(m) = modifier_of(event) {
                    self.state.held &= !m.bit();
                }
                KeyTransition::Released
            }
        }
    }

    /// Immutable copy of the current state
    pub fn snapshot(&self) -> ModifierState {
        self.state
    }

    /// Number of keys currently down
    pub fn held_count(&self) -> usize {
        self.held_keys.len()
    }

    /// Forget all held keys; lock toggles are kept
    pub fn reset(&mut self) {
        self.held_keys.clear();
        self.state.held = 0;
    }
}

impl Default for ModifierStateTracker {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Whether an event's key is consumed by the tracker rather than typed
pub fn is_state_key(event: &KeyEvent) -> bool {
    modifier_of(event).is_some() || toggle_of(event).is_some()
}

fn modifier_of(event: &KeyEvent) -> Option<Modifier> {
    Modifier::from_linux_code(event.scan_code).or_else(|| Modifier::from_name(&event.key_name))
}

fn toggle_of(event: &KeyEvent) -> Option<ToggleKey> {
    ToggleKey::from_linux_code(event.scan_code).or_else(|| ToggleKey::from_name(&event.key_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: u16, name: &str) -> KeyEvent {
        KeyEvent::new(code, name, Action::Press)
    }

    fn release(code: u16, name: &str) -> KeyEvent {
        KeyEvent::new(code, name, Action::Release)
    }

    #[test]
    fn test_shift_press_and_release() {
        let mut tracker = ModifierStateTracker::new(true);
        assert_eq!(tracker.update(&press(42, "shift")), KeyTransition::Pressed);
        assert!(tracker.snapshot().shift());
        assert!(tracker.snapshot().is_held(Modifier::LeftShift));
        assert_eq!(tracker.update(&release(42, "shift")), KeyTransition::Released);
        assert!(!tracker.snapshot().shift());
    }

    #[test]
    fn test_left_and_right_variants_are_independent() {
        let mut tracker = ModifierStateTracker::default();
        tracker.update(&press(42, "shift"));
        tracker.update(&press(54, "right shift"));
        tracker.update(&release(42, "shift"));
        let state = tracker.snapshot();
        assert!(state.shift());
        assert_eq!(state.bits(), modifier::RIGHT_SHIFT);
    }

    #[test]
    fn test_altgr_is_not_alt() {
        let mut tracker = ModifierStateTracker::default();
        tracker.update(&press(100, "alt gr"));
        let state = tracker.snapshot();
        assert!(state.altgr());
        assert!(!state.alt());
    }

    #[test]
    fn test_caps_lock_flips_on_press_only() {
        let mut tracker = ModifierStateTracker::default();
        tracker.update(&press(58, "caps lock"));
        assert!(tracker.snapshot().caps_lock());
        // Auto-repeat and release leave the toggle alone
        tracker.update(&KeyEvent::new(58, "caps lock", Action::Repeat));
        tracker.update(&release(58, "caps lock"));
        assert!(tracker.snapshot().caps_lock());
        tracker.update(&press(58, "caps lock"));
        tracker.update(&release(58, "caps lock"));
        assert!(!tracker.snapshot().caps_lock());
    }

    #[test]
    fn test_duplicated_press_does_not_double_toggle() {
        let mut tracker = ModifierStateTracker::new(true);
        tracker.update(&press(69, "num lock"));
        assert_eq!(tracker.update(&press(69, "num lock")), KeyTransition::Repeated);
        assert!(!tracker.snapshot().num_lock());
    }

    #[test]
    fn test_num_lock_double_toggle_restores_state() {
        let mut tracker = ModifierStateTracker::new(true);
        for _ in 0..2 {
            tracker.update(&press(69, "num lock"));
            tracker.update(&release(69, "num lock"));
        }
        assert!(tracker.snapshot().num_lock());
    }

    #[test]
    fn test_stray_release_is_ignored() {
        let mut tracker = ModifierStateTracker::default();
        assert_eq!(tracker.update(&release(42, "shift")), KeyTransition::Ignored);
        assert_eq!(tracker.snapshot().bits(), 0);
    }

    #[test]
    fn test_unknown_key_has_no_effect_on_modifiers() {
        let mut tracker = ModifierStateTracker::default();
        let before = tracker.snapshot();
        tracker.update(&press(30, "a"));
        assert_eq!(tracker.snapshot(), before);
        assert_eq!(tracker.held_count(), 1);
    }

    #[test]
    fn test_name_fallback_for_unknown_scan_codes() {
        let mut tracker = ModifierStateTracker::default();
        tracker.update(&press(0x2a0, "right ctrl"));
        assert!(tracker.snapshot().is_held(Modifier::RightCtrl));
    }

    #[test]
    fn test_letter_shifted_is_xor() {
        let none = ModifierState::new();
        let shift = ModifierState::new().with_held(modifier::LEFT_SHIFT);
        let caps = ModifierState::new().with_caps_lock(true);
        let both = shift.with_caps_lock(true);
        assert!(!none.letter_shifted());
        assert!(shift.letter_shifted());
        assert!(caps.letter_shifted());
        assert!(!both.letter_shifted());
    }

    #[test]
    fn test_reset_keeps_toggles() {
        let mut tracker = ModifierStateTracker::new(false);
        tracker.update(&press(58, "caps lock"));
        tracker.update(&press(29, "ctrl"));
        tracker.reset();
        assert_eq!(tracker.held_count(), 0);
        assert!(!tracker.snapshot().ctrl());
        assert!(tracker.snapshot().caps_lock());
    }

    #[test]
    fn test_is_state_key() {
        assert!(is_state_key(&press(42, "shift")));
        assert!(is_state_key(&press(69, "num lock")));
        assert!(!is_state_key(&press(30, "a")));
    }
}
