//! The on-screen keyboard that echoes physical key presses.

use crossterm::event::{KeyCode, KeyEvent};

pub const LAYOUT: [&[&str]; 5] = [
    &["Esc", "`", "1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "-", "=", "Back"],
    &["Tab", "Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", "[", "]", "\\"],
    &["Caps", "A", "S", "D", "F", "G", "H", "J", "K", "L", ";", "'", "Enter"],
    &["Shift_L", "Z", "X", "C", "V", "B", "N", "M", ",", ".", "/", "Shift_R", "↑"],
    &["Ctrl_L", "Opt_L", "Cmd_L", "Space", "Cmd_R", "Opt_R", "←", "↓", "→"],
];

/// Label drawn on a key cap; left/right modifier twins share one.
pub fn display_label(key: &str) -> &str {
    for modifier in ["Shift", "Cmd", "Opt", "Ctrl"] {
        if key.strip_prefix(modifier).is_some_and(|rest| rest.starts_with('_')) {
            return modifier;
        }
    }
    key
}

/// Cap width in cells, label included.
pub fn cap_width(key: &str) -> usize {
    match key {
        "Space" => 21,
        "Enter" => 8,
        _ => display_label(key).chars().count() + 2,
    }
}

/// The layout key a terminal key press lights up, if any.
pub fn key_for(event: &KeyEvent) -> Option<&'static str> {
    let wanted = match event.code {
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Backspace => "Back".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::CapsLock => "Caps".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_uppercase().collect(),
        _ => return None,
    };

    LAYOUT
        .iter()
        .flat_map(|row| row.iter())
        .find(|key| **key == wanted)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_letters_map_to_uppercase_caps() {
        assert_eq!(key_for(&press(KeyCode::Char('q'))), Some("Q"));
        assert_eq!(key_for(&press(KeyCode::Char('Q'))), Some("Q"));
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(key_for(&press(KeyCode::Char(' '))), Some("Space"));
        assert_eq!(key_for(&press(KeyCode::Enter)), Some("Enter"));
        assert_eq!(key_for(&press(KeyCode::Backspace)), Some("Back"));
        assert_eq!(key_for(&press(KeyCode::Esc)), Some("Esc"));
        assert_eq!(key_for(&press(KeyCode::Left)), Some("←"));
    }

    #[test]
    fn test_keys_off_the_layout() {
        assert_eq!(key_for(&press(KeyCode::Char('!'))), None);
        assert_eq!(key_for(&press(KeyCode::F(5))), None);
    }

    #[test]
    fn test_modifier_labels() {
        assert_eq!(display_label("Shift_L"), "Shift");
        assert_eq!(display_label("Cmd_R"), "Cmd");
        assert_eq!(display_label("Caps"), "Caps");
        assert_eq!(cap_width("Q"), 3);
    }
}
