use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// What a key press did to the search input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    Edited,
    Submitted,
    Left,
    Ignored,
}

/// Search text owned by the view. `cursor` counts chars, not bytes.
#[derive(Debug, Default, Clone)]
pub struct SearchBox {
    text: String,
    cursor: usize,
}

impl SearchBox {
    pub fn new(initial: &str) -> Self {
        SearchBox {
            text: initial.to_string(),
            cursor: initial.chars().count(),
        }
    }

    pub fn read(&mut self, key: KeyEvent) -> SearchEvent {
        let event = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => SearchEvent::Submitted,
            (KeyCode::Esc, _) => SearchEvent::Left,
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.home(),
            (KeyCode::End, _) => self.end(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.clear(),
            (KeyCode::Char(chr), KeyModifiers::NONE | KeyModifiers::SHIFT) => self.insert(chr),
            _ => SearchEvent::Ignored,
        };
        trace!("Search input {:?} => {:?} \"{}\"", key.code, event, self.text);
        event
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn clear(&mut self) -> SearchEvent {
        self.text.clear();
        self.cursor = 0;
        SearchEvent::Edited
    }

    fn insert(&mut self, chr: char) -> SearchEvent {
        let pos = self.byte_pos(self.cursor);
        self.text.insert(pos, chr);
        self.cursor += 1;
        SearchEvent::Edited
    }

    fn backspace(&mut self) -> SearchEvent {
        if self.cursor == 0 {
            return SearchEvent::Ignored;
        }
        self.cursor -= 1;
        let pos = self.byte_pos(self.cursor);
        self.text.remove(pos);
        SearchEvent::Edited
    }

    fn delete(&mut self) -> SearchEvent {
        if self.cursor >= self.text.chars().count() {
            return SearchEvent::Ignored;
        }
        let pos = self.byte_pos(self.cursor);
        self.text.remove(pos);
        SearchEvent::Edited
    }

    fn left(&mut self) -> SearchEvent {
        self.cursor = self.cursor.saturating_sub(1);
        SearchEvent::Edited
    }

    fn right(&mut self) -> SearchEvent {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
        SearchEvent::Edited
    }

    fn home(&mut self) -> SearchEvent {
        self.cursor = 0;
        SearchEvent::Edited
    }

    fn end(&mut self) -> SearchEvent {
        self.cursor = self.text.chars().count();
        SearchEvent::Edited
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(search: &mut SearchBox, text: &str) {
        for chr in text.chars() {
            assert_eq!(search.read(key(KeyCode::Char(chr))), SearchEvent::Edited);
        }
    }

    #[test]
    fn typing_updates_text_on_every_key() {
        let mut search = SearchBox::default();
        search.read(key(KeyCode::Char('S')));
        assert_eq!(search.text(), "S");
        type_text(&mut search, "mith");
        assert_eq!(search.text(), "Smith");
        assert_eq!(search.cursor(), 5);
    }

    #[test]
    fn initial_query_places_cursor_at_end() {
        let search = SearchBox::new("Jürgen");
        assert_eq!(search.text(), "Jürgen");
        assert_eq!(search.cursor(), 6);
    }

    #[test]
    fn edits_happen_at_the_cursor() {
        let mut search = SearchBox::new("Smth");
        search.read(key(KeyCode::Left));
        search.read(key(KeyCode::Left));
        type_text(&mut search, "i");
        assert_eq!(search.text(), "Smith");

        search.read(key(KeyCode::Home));
        search.read(key(KeyCode::Delete));
        assert_eq!(search.text(), "mith");

        search.read(key(KeyCode::End));
        search.read(key(KeyCode::Backspace));
        assert_eq!(search.text(), "mit");
    }

    #[test]
    fn multibyte_chars_are_edited_whole() {
        let mut search = SearchBox::new("Mañana");
        search.read(key(KeyCode::Left));
        search.read(key(KeyCode::Left));
        search.read(key(KeyCode::Left));
        search.read(key(KeyCode::Backspace));
        assert_eq!(search.text(), "Maana");
    }

    #[test]
    fn backspace_at_start_is_ignored() {
        let mut search = SearchBox::default();
        assert_eq!(search.read(key(KeyCode::Backspace)), SearchEvent::Ignored);
        assert_eq!(search.text(), "");
    }

    #[test]
    fn enter_submits_and_esc_leaves() {
        let mut search = SearchBox::new("x");
        assert_eq!(search.read(key(KeyCode::Enter)), SearchEvent::Submitted);
        assert_eq!(search.read(key(KeyCode::Esc)), SearchEvent::Left);
        assert_eq!(search.text(), "x");
    }

    #[test]
    fn ctrl_u_clears() {
        let mut search = SearchBox::new("Smith");
        let event = search.read(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(event, SearchEvent::Edited);
        assert_eq!(search.text(), "");
        assert_eq!(search.cursor(), 0);
    }
}
