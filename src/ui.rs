use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::Line,
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState},
};

use crate::domain::PTConfig;
use crate::editor::{EditField, EditView};
use crate::model::{Model, UIData};

const STATUSLINE_HEIGHT: u16 = 1;
// How long a transient status message stays on screen
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(4);

const EDIT_DIALOG_WIDTH: u16 = 44;
const EDIT_DIALOG_HEIGHT: u16 = 9;

pub struct TableUI {
    table_state: TableState,
}

impl TableUI {
    pub fn new(_cfg: &PTConfig) -> Self {
        Self {
            table_state: TableState::default(),
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.uidata();
        let [table_area, status_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(frame.area());

        self.draw_table(&uidata, frame, table_area);
        self.draw_statusline(&uidata, frame, status_area);

        if let Some(edit) = &uidata.edit {
            self.draw_edit_dialog(edit, frame);
        }
        if uidata.show_popup {
            self.draw_popup(&uidata.popup_message, frame);
        }
    }

    fn draw_table(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let title = Line::from(" Periodic table ".bold());
        let instructions = Line::from(vec![
            " Filter ".into(),
            "</>".blue().bold(),
            " Edit ".into(),
            "<Enter>".blue().bold(),
            " Help ".into(),
            "<?>".blue().bold(),
            " Quit ".into(),
            "<q> ".blue().bold(),
        ]);
        let block = Block::bordered()
            .title(title.centered())
            .title_bottom(instructions.centered())
            .border_set(border::THICK);

        let header = Row::new(["Position", "Name", "Weight", "Symbol"].map(Cell::from))
            .style(Style::new().bold())
            .bottom_margin(1);
        let rows = uidata
            .rows
            .iter()
            .map(|e| Row::new(e.cells().map(Cell::from)));
        let widths = [
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(6),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::new().reversed())
            .highlight_symbol("> ");

        if uidata.rows.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(uidata.selected_row));
        }
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        if let Some(input) = &uidata.filter_input {
            let line = Line::from(vec!["/".bold(), input.input.clone().into()]);
            frame.render_widget(Paragraph::new(line), area);
            // Place the terminal cursor inside the filter box
            let x = area.x + 1 + input.curser_pos as u16;
            frame.set_cursor_position(Position::new(x.min(area.right()), area.y));
            return;
        }

        let line = if uidata.last_status_message_update.elapsed() < STATUS_MESSAGE_TTL {
            Line::from(uidata.status_message.clone())
        } else if uidata.filter_value.is_empty() {
            Line::from(format!("{} elements", uidata.total))
        } else {
            Line::from(format!(
                "filter: \"{}\"  {}/{} elements",
                uidata.filter_value,
                uidata.rows.len(),
                uidata.total
            ))
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_edit_dialog(&self, edit: &EditView, frame: &mut Frame) {
        let area = popup_area(frame.area(), EDIT_DIALOG_WIDTH, EDIT_DIALOG_HEIGHT);
        let title = Line::from(format!(" Edit element {} ", edit.position).bold());
        let instructions = Line::from(vec![
            " Save ".into(),
            "<Enter>".blue().bold(),
            " Cancel ".into(),
            "<Esc>".blue().bold(),
            " Next ".into(),
            "<Tab> ".blue().bold(),
        ]);
        let block = Block::bordered()
            .title(title.centered())
            .title_bottom(instructions.centered())
            .border_set(border::THICK);
        let inner = block.inner(area);

        let fields = [
            (EditField::Name, "Name:   ", &edit.name),
            (EditField::Weight, "Weight: ", &edit.weight),
            (EditField::Symbol, "Symbol: ", &edit.symbol),
        ];
        let mut lines: Vec<Line> = vec![Line::from(format!("Position: {}", edit.position).dim())];
        for (field, label, value) in &fields {
            let value_span = if *field == edit.selected {
                value.to_string().reversed()
            } else {
                value.to_string().into()
            };
            lines.push(Line::from(vec![label.bold(), value_span]));
        }
        if let Some(hint) = &edit.hint {
            lines.push(Line::from(hint.clone().red()));
        }

        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);

        // Cursor inside the selected field
        let row = fields
            .iter()
            .position(|(field, _, _)| *field == edit.selected)
            .unwrap_or(0) as u16;
        let label_width = fields[0].1.len() as u16;
        let x = inner.x + label_width + edit.curser_pos as u16;
        let y = inner.y + 1 + row;
        if inner.contains(Position::new(x, y)) {
            frame.set_cursor_position(Position::new(x, y));
        }
    }

    fn draw_popup(&self, message: &str, frame: &mut Frame) {
        let width = message.lines().map(|l| l.len()).max().unwrap_or(0) as u16 + 4;
        let height = message.lines().count() as u16 + 2;
        let area = popup_area(frame.area(), width, height);
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(message.to_string()).block(block), area);
    }
}

/// Centered rectangle for modal dialogs, clamped to the frame.
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_area_is_centered_and_clamped() {
        let screen = Rect::new(0, 0, 80, 24);
        let popup = popup_area(screen, 40, 10);
        assert_eq!(popup, Rect::new(20, 7, 40, 10));

        let tiny = Rect::new(0, 0, 10, 4);
        let clamped = popup_area(tiny, 40, 10);
        assert!(clamped.width <= tiny.width);
        assert!(clamped.height <= tiny.height);
    }
}
