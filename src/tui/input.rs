//! Single-line text input used by the search bar and the task form.

/// A text input with a cursor counted in characters, not bytes.
#[derive(Clone, Debug, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
    pub active: bool,
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input field with initial text, cursor at the end.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
            active: false,
        }
    }

    fn byte_offset(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Insert a character at the cursor.
    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_offset(self.cursor - 1);
            self.value.remove(at);
            self.cursor -= 1;
        }
    }

    /// Delete the character under the cursor.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_in_the_middle() {
        let mut input = InputField::with_value("tsk");
        input.move_cursor_left();
        input.move_cursor_left();
        input.handle_char('a');
        assert_eq!(input.value, "task");
        input.handle_backspace();
        assert_eq!(input.value, "tsk");
        input.handle_delete();
        assert_eq!(input.value, "tk");
    }

    #[test]
    fn test_multibyte_characters() {
        let mut input = InputField::with_value("café");
        assert_eq!(input.cursor, 4);
        input.handle_backspace();
        assert_eq!(input.value, "caf");
        input.handle_char('é');
        input.handle_char('!');
        assert_eq!(input.value, "café!");
        input.move_cursor_right();
        assert_eq!(input.cursor, 5);
    }

    #[test]
    fn test_clear_and_bounds() {
        let mut input = InputField::new();
        input.handle_backspace();
        input.move_cursor_left();
        input.handle_delete();
        assert_eq!(input.cursor, 0);
        input.handle_char('x');
        input.clear();
        assert!(input.value.is_empty());
    }
}
