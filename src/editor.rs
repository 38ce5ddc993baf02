use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tracing::trace;

use crate::elements::Element;
use crate::inputter::Inputter;

/// Outcome of a closed edit session, consumed exhaustively by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum EditResult {
    Saved(Element),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditField {
    Name,
    Weight,
    Symbol,
}

impl EditField {
    fn next(self) -> Self {
        match self {
            EditField::Name => EditField::Weight,
            EditField::Weight => EditField::Symbol,
            EditField::Symbol => EditField::Name,
        }
    }

    fn previous(self) -> Self {
        match self {
            EditField::Name => EditField::Symbol,
            EditField::Weight => EditField::Name,
            EditField::Symbol => EditField::Weight,
        }
    }
}

/// Rendering snapshot of an open edit session.
#[derive(Debug, Clone)]
pub struct EditView {
    pub position: u32,
    pub name: String,
    pub weight: String,
    pub symbol: String,
    pub selected: EditField,
    pub curser_pos: usize,
    pub hint: Option<String>,
}

/// A modal edit over a private copy of one element.
///
/// The session never touches the canonical list; it resolves to an
/// `EditResult` and the model decides what to do with it. `position` is
/// the merge key and stays read-only.
pub struct EditSession {
    original: Element,
    name: String,
    weight: String,
    symbol: String,
    selected: EditField,
    input: Inputter,
    hint: Option<String>,
}

impl EditSession {
    pub fn open(record: &Element) -> Self {
        let mut input = Inputter::default();
        input.set(&record.name);
        Self {
            original: record.clone(),
            name: record.name.clone(),
            weight: record.weight.to_string(),
            symbol: record.symbol.clone(),
            selected: EditField::Name,
            input,
            hint: None,
        }
    }

    /// Feed one key event into the session. `None` means the dialog stays
    /// open; `Some` means it closed with the given outcome.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<EditResult> {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.select(self.selected.next());
                return None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.select(self.selected.previous());
                return None;
            }
            _ => {}
        }

        let result = self.input.read(key);
        if result.canceled {
            trace!("Edit session canceled");
            return Some(EditResult::Cancelled);
        }
        if result.finished {
            self.store_current();
            return self.resolve();
        }
        self.store_current();
        None
    }

    pub fn view(&self) -> EditView {
        EditView {
            position: self.original.position,
            name: self.name.clone(),
            weight: self.weight.clone(),
            symbol: self.symbol.clone(),
            selected: self.selected,
            curser_pos: self.input.get().curser_pos,
            hint: self.hint.clone(),
        }
    }

    fn select(&mut self, field: EditField) {
        self.store_current();
        self.selected = field;
        let value = match field {
            EditField::Name => &self.name,
            EditField::Weight => &self.weight,
            EditField::Symbol => &self.symbol,
        };
        self.input.set(value);
    }

    fn store_current(&mut self) {
        let value = self.input.get().input;
        match self.selected {
            EditField::Name => self.name = value,
            EditField::Weight => self.weight = value,
            EditField::Symbol => self.symbol = value,
        }
    }

    fn resolve(&mut self) -> Option<EditResult> {
        let weight = match self.weight.trim().parse::<f64>() {
            Ok(w) => w,
            Err(_) => {
                // Keep the dialog open instead of saving a corrupt record.
                self.hint = Some(format!("\"{}\" is not a valid weight", self.weight));
                self.input.set(&self.weight);
                self.selected = EditField::Weight;
                return None;
            }
        };
        trace!("Edit session saved element {}", self.original.position);
        Some(EditResult::Saved(Element {
            position: self.original.position,
            name: self.name.clone(),
            weight,
            symbol: self.symbol.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(session: &mut EditSession, s: &str) {
        for c in s.chars() {
            assert_eq!(session.handle_key(KeyEvent::from(KeyCode::Char(c))), None);
        }
    }

    fn lithium() -> Element {
        Element::new(3, "Lithium", 6.941, "Li")
    }

    #[test]
    fn open_copies_the_record_into_text_fields() {
        let session = EditSession::open(&lithium());
        let view = session.view();
        assert_eq!(view.position, 3);
        assert_eq!(view.name, "Lithium");
        assert_eq!(view.weight, "6.941");
        assert_eq!(view.symbol, "Li");
        assert_eq!(view.selected, EditField::Name);
    }

    #[test]
    fn save_resolves_with_the_edited_copy() {
        let mut session = EditSession::open(&lithium());
        // Trim "Lithium" down to "Lith"
        for _ in 0..3 {
            session.handle_key(KeyEvent::from(KeyCode::Backspace));
        }
        let result = session.handle_key(KeyEvent::from(KeyCode::Enter));
        assert_eq!(
            result,
            Some(EditResult::Saved(Element::new(3, "Lith", 6.941, "Li")))
        );
    }

    #[test]
    fn cancel_resolves_without_a_value() {
        let mut session = EditSession::open(&lithium());
        type_str(&mut session, "xxx");
        let result = session.handle_key(KeyEvent::from(KeyCode::Esc));
        assert_eq!(result, Some(EditResult::Cancelled));
    }

    #[test]
    fn tab_cycles_fields_and_edits_stick() {
        let mut session = EditSession::open(&lithium());
        session.handle_key(KeyEvent::from(KeyCode::Tab));
        assert_eq!(session.view().selected, EditField::Weight);
        session.handle_key(KeyEvent::from(KeyCode::Tab));
        assert_eq!(session.view().selected, EditField::Symbol);
        type_str(&mut session, "!");
        let result = session.handle_key(KeyEvent::from(KeyCode::Enter));
        assert_eq!(
            result,
            Some(EditResult::Saved(Element::new(3, "Lithium", 6.941, "Li!")))
        );
    }

    #[test]
    fn position_is_not_editable() {
        let mut session = EditSession::open(&lithium());
        type_str(&mut session, "42");
        let result = session.handle_key(KeyEvent::from(KeyCode::Enter));
        match result {
            Some(EditResult::Saved(e)) => assert_eq!(e.position, 3),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn invalid_weight_keeps_the_session_open() {
        let mut session = EditSession::open(&lithium());
        session.handle_key(KeyEvent::from(KeyCode::Tab));
        type_str(&mut session, "abc");
        let result = session.handle_key(KeyEvent::from(KeyCode::Enter));
        assert_eq!(result, None);
        let view = session.view();
        assert!(view.hint.is_some());
        assert_eq!(view.selected, EditField::Weight);
        // Fixing the field lets the save go through
        for _ in 0..view.weight.chars().count() {
            session.handle_key(KeyEvent::from(KeyCode::Backspace));
        }
        type_str(&mut session, "7.0");
        let result = session.handle_key(KeyEvent::from(KeyCode::Enter));
        assert_eq!(
            result,
            Some(EditResult::Saved(Element::new(3, "Lithium", 7.0, "Li")))
        );
    }
}
