use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

use crate::domain::{Message, SortColumn, TVConfig, TVError};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &TVConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    /// Waits up to the poll time for a key press. `raw` passes keys through
    /// untranslated while the search input has the focus.
    pub fn handle_event(&self, raw: bool) -> Result<Option<Message>, TVError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(self.handle_key(key, raw));
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent, raw: bool) -> Option<Message> {
        let ctrl_c =
            key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
        let message = if ctrl_c {
            Some(Message::Quit)
        } else if raw {
            Some(Message::RawKey(key))
        } else {
            match key.code {
                KeyCode::Char('q') => Some(Message::Quit),
                KeyCode::Char('/') | KeyCode::Char('s') => Some(Message::EnterSearch),
                KeyCode::Char('1') => Some(Message::Sort(SortColumn::EmpNo)),
                KeyCode::Char('2') => Some(Message::Sort(SortColumn::FirstName)),
                KeyCode::Char('3') => Some(Message::Sort(SortColumn::LastName)),
                KeyCode::Char('4') => Some(Message::Sort(SortColumn::Gender)),
                KeyCode::Left | KeyCode::Char('p') => Some(Message::PreviousPage),
                KeyCode::Right | KeyCode::Char('n') => Some(Message::NextPage),
                KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
                KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
                KeyCode::Char('e') => Some(Message::Edit),
                KeyCode::Char('d') => Some(Message::Delete),
                KeyCode::Char('r') => Some(Message::Refresh),
                KeyCode::Char('?') => Some(Message::Help),
                KeyCode::Esc => Some(Message::Exit),
                _ => None,
            }
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
