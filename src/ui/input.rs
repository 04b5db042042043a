//! Single-line query input with a blinking cursor.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthChar;

use super::style::Theme;

/// Text shown in front of the query
pub const PROMPT: &str = "> ";

/// Text shown while the input is empty
pub const PLACEHOLDER: &str = "Search...";

/// Ticks between cursor blink toggles
const BLINK_TICKS: u32 = 5;

/// Editable query field
#[derive(Clone, Debug)]
pub struct TextInput {
    value: Vec<char>,
    cursor: usize,
    char_limit: usize,
    width: usize,
    cursor_visible: bool,
    blink_ticks: u32,
}

impl TextInput {
    /// Empty input accepting at most `char_limit` characters, drawn `width` columns wide
    pub fn new(char_limit: usize, width: usize) -> Self {
        Self {
            value: Vec::new(),
            cursor: 0,
            char_limit,
            width: width.max(1),
            cursor_visible: true,
            blink_ticks: 0,
        }
    }

    /// Current text
    pub fn value(&self) -> String {
        self.value.iter().collect()
    }

    /// Replace the text, truncated to the character limit, with the cursor at the end
    pub fn set_value(&mut self, value: &str) {
        self.value = value.chars().take(self.char_limit).collect();
        self.cursor = self.value.len();
        self.wake();
    }

    /// Cursor position in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Columns available for the text itself
    pub fn set_width(&mut self, width: usize) {
        self.width = width.max(1);
    }

    /// Apply an editing key, returning whether it was consumed
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.value.len(),
            KeyCode::Char('u') if ctrl => {
                self.value.drain(..self.cursor);
                self.cursor = 0;
            }
            KeyCode::Char('k') if ctrl => self.value.truncate(self.cursor),
            KeyCode::Char('w') if ctrl => self.delete_word_backward(),
            KeyCode::Char(_) if ctrl => return false,
            KeyCode::Char(c) => {
                if self.value.len() >= self.char_limit {
                    return false;
                }
                self.value.insert(self.cursor, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.value.remove(self.cursor);
            }
            KeyCode::Delete if self.cursor < self.value.len() => {
                self.value.remove(self.cursor);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.value.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.len(),
            _ => return false,
        }
        self.wake();
        true
    }

    /// Advance the blink animation by one frame
    pub fn tick(&mut self) {
        self.blink_ticks += 1;
        if self.blink_ticks >= BLINK_TICKS {
            self.blink_ticks = 0;
            self.cursor_visible = !self.cursor_visible;
        }
    }

    fn wake(&mut self) {
        self.cursor_visible = true;
        self.blink_ticks = 0;
    }

    fn delete_word_backward(&mut self) {
        let mut start = self.cursor;
        while start > 0 && self.value[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !self.value[start - 1].is_whitespace() {
            start -= 1;
        }
        self.value.drain(start..self.cursor);
        self.cursor = start;
    }

    /// First character shown, chosen so the cursor cell stays on screen
    fn offset(&self) -> usize {
        let mut used = 1;
        let mut offset = self.cursor;
        while offset > 0 {
            let w = self.value[offset - 1].width().unwrap_or(0);
            if used + w > self.width {
                break;
            }
            used += w;
            offset -= 1;
        }
        offset
    }

    /// Render the prompt, the visible part of the text and the cursor
    pub fn view(&self, theme: &Theme) -> String {
        let mut out = String::from(PROMPT);

        if self.value.is_empty() {
            let mut chars = PLACEHOLDER.chars();
            let first = chars.next().map(String::from).unwrap_or_default();
            if self.cursor_visible {
                out.push_str(&theme.reverse(&first));
            } else {
                out.push_str(&theme.dim(&first));
            }
            out.push_str(&theme.dim(chars.as_str()));
            return out;
        }

        let offset = self.offset();
        let before: String = self.value[offset..self.cursor].iter().collect();
        out.push_str(&before);

        let mut used: usize = before.chars().map(|c| c.width().unwrap_or(0)).sum();
        let under = self.value.get(self.cursor).copied().unwrap_or(' ');
        let under = under.to_string();
        if self.cursor_visible {
            out.push_str(&theme.reverse(&under));
        } else {
            out.push_str(&under);
        }
        used += under.chars().map(|c| c.width().unwrap_or(0)).sum::<usize>();

        for c in self.value.iter().skip(self.cursor + 1) {
            let w = c.width().unwrap_or(0);
            if used + w > self.width {
                break;
            }
            out.push(*c);
            used += w;
        }
        out
    }
}
