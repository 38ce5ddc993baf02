use std::time::{Duration, Instant};

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, info, trace};

use crate::debounce::Debouncer;
use crate::domain::{HELP_TEXT, Message, PTConfig, PTError};
use crate::editor::{EditResult, EditSession, EditView};
use crate::elements::Element;
use crate::inputter::{InputResult, Inputter};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    FILTERINPUT,
    EDIT,
    POPUP,
}

/// Canonical list plus the derived filtered view.
///
/// `filtered` is always a pure function of `(elements, filter_value)`;
/// it is rebuilt on every filter commit and on every accepted edit, and
/// never mutated on its own. `elements` changes only by whole-record
/// replacement keyed on `position`.
pub struct TableState {
    elements: Vec<Element>,
    filter_value: String,
    filtered: Vec<Element>,
}

impl TableState {
    pub fn new(seed: Vec<Element>) -> Self {
        let filtered = seed.clone();
        Self {
            elements: seed,
            filter_value: String::new(),
            filtered,
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn filtered(&self) -> &[Element] {
        &self.filtered
    }

    pub fn filter_value(&self) -> &str {
        &self.filter_value
    }

    /// Commit a new filter value and rebuild the derived view.
    pub fn set_filter(&mut self, value: String) {
        trace!("Set filter: {value:?}");
        self.filter_value = value;
        self.recompute_filtered();
    }

    /// Replace the element with the same `position` and rebuild the
    /// derived view. An unknown position is silently ignored; this path
    /// never inserts.
    pub fn commit_edit(&mut self, updated: Element) {
        let Some(slot) = self
            .elements
            .iter_mut()
            .find(|e| e.position == updated.position)
        else {
            debug!("Ignoring edit for unknown position {}", updated.position);
            return;
        };
        *slot = updated;
        self.recompute_filtered();
    }

    fn recompute_filtered(&mut self) {
        self.filtered = self
            .elements
            .iter()
            .filter(|e| e.matches(&self.filter_value))
            .cloned()
            .collect();
        trace!(
            "Recomputed filtered view: {}/{} rows",
            self.filtered.len(),
            self.elements.len()
        );
    }
}

/// Rendering snapshot handed to the UI every frame.
pub struct UIData {
    pub rows: Vec<Element>,
    pub total: usize,
    pub selected_row: usize,
    pub filter_value: String,
    pub filter_input: Option<InputResult>,
    pub edit: Option<EditView>,
    pub show_popup: bool,
    pub popup_message: String,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

pub struct Model {
    pub status: Status,
    modus: Modus,
    table: TableState,
    selected_row: usize,
    debounce: Debouncer,
    input: Inputter,
    editor: Option<EditSession>,
    clipboard: Option<Clipboard>,
    popup_message: String,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(config: &PTConfig, seed: Vec<Element>) -> Result<Self, PTError> {
        info!("Seeding model with {} elements", seed.len());
        let clipboard = match Clipboard::new() {
            Ok(c) => Some(c),
            Err(e) => {
                debug!("No clipboard available: {e:?}");
                None
            }
        };
        Ok(Self {
            status: Status::READY,
            modus: Modus::TABLE,
            table: TableState::new(seed),
            selected_row: 0,
            debounce: Debouncer::new(Duration::from_millis(config.debounce_ms)),
            input: Inputter::default(),
            editor: None,
            clipboard,
            popup_message: String::new(),
            status_message: "Started pte!".to_string(),
            last_status_message_update: Instant::now(),
        })
    }

    /// True while a text surface (filter box, edit dialog) owns the
    /// keyboard and the controller must not map keys to commands.
    pub fn raw_keyevents(&self) -> bool {
        matches!(self.modus, Modus::FILTERINPUT | Modus::EDIT)
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), PTError> {
        // The debounce window is checked on every tick, not only on key
        // events, so a pending filter commits even while the user idles.
        if let Some(value) = self.debounce.poll() {
            self.apply_filter(value);
        }

        let Some(msg) = message else {
            return Ok(());
        };

        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_selection_up(),
                Message::MoveDown => self.move_selection_down(),
                Message::MoveBeginning => self.move_selection_beginning(),
                Message::MoveEnd => self.move_selection_end(),
                Message::Filter => self.enter_filter_mode(),
                Message::Edit => self.open_editor(),
                Message::CopyRow => self.copy_row(),
                Message::Help => self.show_help(),
                Message::Exit => self.clear_filter(),
                Message::RawKey(_) => (),
            },
            Modus::FILTERINPUT => {
                if let Message::RawKey(key) = msg {
                    self.filter_input(key);
                }
            }
            Modus::EDIT => {
                if let Message::RawKey(key) = msg {
                    self.editor_input(key);
                }
            }
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help => self.close_popup(),
                _ => (),
            },
        }
        Ok(())
    }

    pub fn uidata(&self) -> UIData {
        UIData {
            rows: self.table.filtered().to_vec(),
            total: self.table.elements().len(),
            selected_row: self.selected_row,
            filter_value: self.table.filter_value().to_string(),
            filter_input: (self.modus == Modus::FILTERINPUT).then(|| self.input.get()),
            edit: self.editor.as_ref().map(|e| e.view()),
            show_popup: self.modus == Modus::POPUP,
            popup_message: self.popup_message.clone(),
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        }
    }

    // -------------------- Control handling functions ---------------------- //

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    fn enter_filter_mode(&mut self) {
        trace!("Entering filter input ...");
        self.modus = Modus::FILTERINPUT;
        self.input.set(self.table.filter_value());
    }

    fn filter_input(&mut self, key: KeyEvent) {
        let result = self.input.read(key);
        if result.canceled {
            // Keep whatever filter was last committed
            self.debounce.cancel();
            self.modus = Modus::TABLE;
        } else if result.finished {
            self.debounce.cancel();
            self.apply_filter(result.input);
            self.modus = Modus::TABLE;
        } else {
            self.debounce.submit(result.input);
        }
    }

    fn apply_filter(&mut self, value: String) {
        self.table.set_filter(value);
        self.clamp_selection();
        let shown = self.table.filtered().len();
        let total = self.table.elements().len();
        if self.table.filter_value().is_empty() {
            self.set_status_message("Filter cleared");
        } else {
            self.set_status_message(format!("{shown}/{total} elements match"));
        }
    }

    fn clear_filter(&mut self) {
        if !self.table.filter_value().is_empty() {
            self.debounce.cancel();
            self.apply_filter(String::new());
        }
    }

    fn open_editor(&mut self) {
        let Some(record) = self.table.filtered().get(self.selected_row) else {
            self.set_status_message("Nothing to edit");
            return;
        };
        trace!("Opening edit dialog for element {}", record.position);
        self.editor = Some(EditSession::open(record));
        self.modus = Modus::EDIT;
    }

    fn editor_input(&mut self, key: KeyEvent) {
        let Some(editor) = self.editor.as_mut() else {
            self.modus = Modus::TABLE;
            return;
        };
        let Some(result) = editor.handle_key(key) else {
            return;
        };
        match result {
            EditResult::Saved(updated) => {
                let position = updated.position;
                self.table.commit_edit(updated);
                self.clamp_selection();
                self.set_status_message(format!("Updated element {position}"));
            }
            EditResult::Cancelled => self.set_status_message("Edit canceled"),
        }
        self.editor = None;
        self.modus = Modus::TABLE;
    }

    fn show_help(&mut self) {
        self.popup_message = HELP_TEXT.to_string();
        self.modus = Modus::POPUP;
    }

    fn close_popup(&mut self) {
        self.popup_message.clear();
        self.modus = Modus::TABLE;
    }

    fn copy_row(&mut self) {
        let Some(record) = self.table.filtered().get(self.selected_row) else {
            self.set_status_message("Nothing to copy");
            return;
        };
        let position = record.position;
        let content = record
            .cells()
            .iter()
            .map(Self::wrap_cell_content)
            .collect::<Vec<String>>()
            .join(",");
        let Some(clipboard) = self.clipboard.as_mut() else {
            self.set_status_message("No clipboard available");
            return;
        };
        match clipboard.set_text(content) {
            Ok(_) => self.set_status_message(format!("Copied element {position}")),
            Err(e) => {
                trace!("Error copying to clipboard: {e:?}");
                self.set_status_message("Copy failed");
            }
        }
    }

    fn wrap_cell_content(c: &String) -> String {
        let needs_escaping = c.chars().any(|c| c == '"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace("\"", "\"\"");
        }
        if needs_wrapping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn clamp_selection(&mut self) {
        let nrows = self.table.filtered().len();
        if self.selected_row >= nrows {
            self.selected_row = nrows.saturating_sub(1);
        }
    }

    fn move_selection_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    fn move_selection_down(&mut self) {
        let nrows = self.table.filtered().len();
        if self.selected_row + 1 < nrows {
            self.selected_row += 1;
        }
    }

    fn move_selection_beginning(&mut self) {
        self.selected_row = 0;
    }

    fn move_selection_end(&mut self) {
        self.selected_row = self.table.filtered().len().saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::seed_elements;
    use ratatui::crossterm::event::KeyCode;

    fn names(elements: &[Element]) -> Vec<&str> {
        elements.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn empty_filter_shows_the_full_list_in_order() {
        let mut table = TableState::new(seed_elements());
        table.set_filter(String::new());
        assert_eq!(table.filtered(), table.elements());
    }

    #[test]
    fn filter_is_a_substring_match_or_across_all_fields() {
        let mut table = TableState::new(seed_elements());
        // "li" is a substring of Helium, Lithium and Beryllium
        table.set_filter("li".to_string());
        assert_eq!(names(table.filtered()), ["Helium", "Lithium", "Beryllium"]);
        // Unambiguous name match
        table.set_filter("lith".to_string());
        assert_eq!(names(table.filtered()), ["Lithium"]);
        // Numeric fields match in their textual form
        table.set_filter("20.17".to_string());
        assert_eq!(names(table.filtered()), ["Neon"]);
        // Case-insensitive
        table.set_filter("OXY".to_string());
        assert_eq!(names(table.filtered()), ["Oxygen"]);
    }

    #[test]
    fn filter_preserves_canonical_order() {
        let mut table = TableState::new(seed_elements());
        // "o" hits several rows; the canonical order must survive
        table.set_filter("o".to_string());
        let positions: Vec<u32> = table.filtered().iter().map(|e| e.position).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn commit_edit_replaces_exactly_one_record_in_place() {
        let mut table = TableState::new(seed_elements());
        let before = table.elements().to_vec();
        let updated = Element::new(3, "Lith", 6.941, "Li");
        table.commit_edit(updated.clone());

        assert_eq!(table.elements().len(), before.len());
        for (old, new) in before.iter().zip(table.elements()) {
            if old.position == 3 {
                assert_eq!(new, &updated);
            } else {
                assert_eq!(new, old);
            }
        }
    }

    #[test]
    fn commit_edit_for_an_unknown_position_is_a_noop() {
        let mut table = TableState::new(seed_elements());
        table.set_filter("li".to_string());
        let elements_before = table.elements().to_vec();
        let filtered_before = table.filtered().to_vec();

        table.commit_edit(Element::new(42, "Unobtainium", 999.0, "Ub"));

        assert_eq!(table.elements(), elements_before.as_slice());
        assert_eq!(table.filtered(), filtered_before.as_slice());
    }

    #[test]
    fn commit_edit_reapplies_the_current_filter() {
        let mut table = TableState::new(seed_elements());
        table.set_filter("lith".to_string());
        assert_eq!(names(table.filtered()), ["Lithium"]);

        // Rename so the name no longer matches "lith"
        table.commit_edit(Element::new(3, "Li", 6.941, "Li"));
        assert!(table.filtered().is_empty());
    }

    #[test]
    fn edited_record_still_matches_through_its_symbol() {
        // End-to-end walk from the original system: rename Lithium to
        // "Lith"; a "li" filter still matches it via the symbol "Li".
        let mut table = TableState::new(seed_elements());
        table.commit_edit(Element::new(3, "Lith", 6.941, "Li"));
        table.set_filter("li".to_string());
        assert!(
            table
                .filtered()
                .iter()
                .any(|e| e.position == 3 && e.name == "Lith")
        );
    }

    fn test_model() -> Model {
        // A huge debounce window keeps the timer out of these tests;
        // the window itself is covered in debounce.rs
        let cfg = PTConfig::default().with_debounce_ms(600_000);
        Model::init(&cfg, seed_elements()).unwrap()
    }

    fn press(model: &mut Model, code: KeyCode) {
        model
            .update(Some(Message::RawKey(KeyEvent::from(code))))
            .unwrap();
    }

    fn type_str(model: &mut Model, s: &str) {
        for c in s.chars() {
            press(model, KeyCode::Char(c));
        }
    }

    #[test]
    fn filter_box_commits_on_enter() {
        let mut model = test_model();
        model.update(Some(Message::Filter)).unwrap();
        assert!(model.raw_keyevents());

        type_str(&mut model, "lith");
        press(&mut model, KeyCode::Enter);

        assert!(!model.raw_keyevents());
        let uidata = model.uidata();
        assert_eq!(uidata.filter_value, "lith");
        assert_eq!(names(&uidata.rows), ["Lithium"]);
    }

    #[test]
    fn escape_in_the_filter_box_keeps_the_committed_filter() {
        let mut model = test_model();
        model.update(Some(Message::Filter)).unwrap();
        type_str(&mut model, "neon");
        press(&mut model, KeyCode::Esc);

        let uidata = model.uidata();
        assert_eq!(uidata.filter_value, "");
        assert_eq!(uidata.rows.len(), 10);
    }

    #[test]
    fn clearing_the_filter_restores_the_full_view() {
        let mut model = test_model();
        model.update(Some(Message::Filter)).unwrap();
        type_str(&mut model, "lith");
        press(&mut model, KeyCode::Enter);
        assert_eq!(model.uidata().rows.len(), 1);

        model.update(Some(Message::Exit)).unwrap();
        assert_eq!(model.uidata().rows.len(), 10);
        assert_eq!(model.uidata().filter_value, "");
    }

    #[test]
    fn narrowing_the_filter_clamps_the_selection() {
        let mut model = test_model();
        model.update(Some(Message::MoveEnd)).unwrap();
        assert_eq!(model.uidata().selected_row, 9);

        model.update(Some(Message::Filter)).unwrap();
        type_str(&mut model, "lith");
        press(&mut model, KeyCode::Enter);
        assert_eq!(model.uidata().selected_row, 0);
    }

    #[test]
    fn edit_dialog_saves_back_into_the_canonical_list() {
        let mut model = test_model();
        // Select Lithium (row index 2) and open the dialog
        model.update(Some(Message::MoveDown)).unwrap();
        model.update(Some(Message::MoveDown)).unwrap();
        model.update(Some(Message::Edit)).unwrap();
        assert!(model.raw_keyevents());

        for _ in 0..3 {
            press(&mut model, KeyCode::Backspace);
        }
        press(&mut model, KeyCode::Enter);

        assert!(!model.raw_keyevents());
        let uidata = model.uidata();
        assert_eq!(uidata.rows[2].name, "Lith");
        assert_eq!(uidata.rows[2].position, 3);
        assert_eq!(uidata.rows.len(), 10);
    }

    #[test]
    fn cancelled_edit_leaves_the_list_untouched() {
        let mut model = test_model();
        model.update(Some(Message::Edit)).unwrap();
        type_str(&mut model, "xxx");
        press(&mut model, KeyCode::Esc);

        let uidata = model.uidata();
        assert_eq!(uidata.rows[0].name, "Hydrogen");
        assert!(uidata.edit.is_none());
    }

    #[test]
    fn selection_stays_inside_the_filtered_view() {
        let mut model = test_model();
        for _ in 0..20 {
            model.update(Some(Message::MoveDown)).unwrap();
        }
        assert_eq!(model.uidata().selected_row, 9);
        model.update(Some(Message::MoveUp)).unwrap();
        assert_eq!(model.uidata().selected_row, 8);
        model.update(Some(Message::MoveBeginning)).unwrap();
        assert_eq!(model.uidata().selected_row, 0);
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = test_model();
        model.update(Some(Message::Help)).unwrap();
        assert!(model.uidata().show_popup);
        model.update(Some(Message::Exit)).unwrap();
        assert!(!model.uidata().show_popup);
    }

    #[test]
    fn wrap_cell_content_quotes_and_escapes() {
        assert_eq!(Model::wrap_cell_content(&"Neon".to_string()), "Neon");
        assert_eq!(
            Model::wrap_cell_content(&"Noble gas".to_string()),
            "\"Noble gas\""
        );
        assert_eq!(
            Model::wrap_cell_content(&"a\"b,c".to_string()),
            "\"a\"\"b,c\""
        );
    }
}
