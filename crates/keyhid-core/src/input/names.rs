// Keyhid Input Layer - Key Names
// Names given to Linux key codes, following the active layout's legends

use crate::key::{control_for_linux_code, usage_for_linux_code, LogicalKey, ScanCodeMap};
use crate::layout::LayoutTable;
use crate::modifier::{Modifier, ToggleKey};

/// Name a captured key the way capture hooks report it.
///
/// Keypad keys are named by their digit (so they collide with the number
/// row and need the scan code to tell apart), printable keys by the legend
/// `table` puts at their position. Unknown codes have no name.
pub fn key_name_for_code(
    code: u16,
    table: &LayoutTable,
    scan_codes: &ScanCodeMap,
) -> Option<String> {
    if let Some(key) = scan_codes.numpad_key(code) {
        return match key {
            LogicalKey::NumpadDigit(d) => Some(d.to_string()),
            _ => Some(".".to_string()),
        };
    }
    if let Some(m) = Modifier::from_linux_code(code) {
        return Some(modifier_name(m).to_string());
    }
    if let Some(toggle) = ToggleKey::from_linux_code(code) {
        let name = match toggle {
            ToggleKey::CapsLock => "caps lock",
            ToggleKey::NumLock => "num lock",
        };
        return Some(name.to_string());
    }
    if let Some(control) = control_for_linux_code(code) {
        return Some(control.name().to_ascii_lowercase());
    }
    usage_for_linux_code(code)
        .and_then(|usage| table.legend(usage))
        .map(|c| c.to_string())
}

fn modifier_name(m: Modifier) -> &'static str {
    match m {
        Modifier::LeftCtrl => "ctrl",
        Modifier::LeftShift => "shift",
        Modifier::LeftAlt => "alt",
        Modifier::LeftGui => "windows",
        Modifier::RightCtrl => "right ctrl",
        Modifier::RightShift => "right shift",
        Modifier::RightAlt => "alt gr",
        Modifier::RightGui => "right windows",
    }
}
