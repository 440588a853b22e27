use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::model::{RequestState, RowView, TableBody, UIData};

pub const SEARCH_HEIGHT: u16 = 3;
pub const FOOTER_HEIGHT: u16 = 1;
pub const STATUSLINE_HEIGHT: u16 = 1;
const SEARCH_PLACEHOLDER: &str = "Search for stars...";
const ROW_ACTIONS: &str = "[Edit] [Delete]";

const EVEN_ROW: Color = Color::Indexed(237);
const ODD_ROW: Color = Color::Indexed(235);
const ACCENT: Color = Color::Indexed(63);

#[derive(Debug, Default)]
pub struct TableUI {
    state: TableState,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, uidata: &UIData, frame: &mut Frame) {
        let title = Line::from(" Employee Galaxy ".bold().magenta());
        let instructions = Line::from(vec![
            " Search ".into(),
            "</>".blue().bold(),
            " Sort ".into(),
            "<1-4>".blue().bold(),
            " Page ".into(),
            "<←/→>".blue().bold(),
            " Help ".into(),
            "<?>".blue().bold(),
            " Quit ".into(),
            "<Q> ".blue().bold(),
        ]);
        let block = Block::bordered()
            .title(title.centered())
            .title_bottom(instructions.centered())
            .border_set(border::THICK);
        let inner = block.inner(frame.area());
        frame.render_widget(block, frame.area());

        let [search_area, table_area, footer_area, status_area] = Layout::vertical([
            Constraint::Length(SEARCH_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(inner);

        self.draw_search(uidata, frame, search_area);
        self.draw_table(uidata, frame, table_area);
        self.draw_pagination(uidata, frame, footer_area);
        self.draw_statusline(uidata, frame, status_area);

        if uidata.show_popup {
            self.draw_popup(&uidata.popup_message, frame);
        }
    }

    fn draw_search(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let border_style = if uidata.active_search {
            Style::new().fg(ACCENT)
        } else {
            Style::new().dark_gray()
        };
        let block = Block::bordered().title(" Search ").border_style(border_style);

        if uidata.search_text.is_empty() && !uidata.active_search {
            let text = Line::from(SEARCH_PLACEHOLDER.dark_gray());
            frame.render_widget(Paragraph::new(text).block(block), area);
            return;
        }

        let inner_width = area.width.saturating_sub(2);
        let (scroll, column) =
            Self::search_cursor(&uidata.search_text, uidata.search_cursor, inner_width);
        let text = Line::from(uidata.search_text.as_str());
        frame.render_widget(Paragraph::new(text).block(block).scroll((0, scroll)), area);

        if uidata.active_search {
            let x = area.x.saturating_add(1).saturating_add(column);
            frame.set_cursor_position(Position::new(x, area.y.saturating_add(1)));
        }
    }

    /// Horizontal scroll and cursor column for the search text, both in
    /// display cells. The text scrolls so the cursor stays inside the box.
    fn search_cursor(text: &str, cursor: usize, inner_width: u16) -> (u16, u16) {
        let before: String = text.chars().take(cursor).collect();
        let cursor_width = Line::from(before.as_str()).width();
        let visible = usize::from(inner_width.max(1));

        let offset = (cursor_width + 1).saturating_sub(visible);
        let scroll = u16::try_from(offset).unwrap_or(u16::MAX);
        let column = cursor_width
            .saturating_sub(usize::from(scroll))
            .min(visible - 1);
        (scroll, column as u16)
    }

    fn draw_table(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let header = Row::new(uidata.headers.iter().map(|h| Cell::from(h.as_str())))
            .style(Style::new().fg(Color::White).bg(ACCENT).add_modifier(Modifier::BOLD));
        let widths = [
            Constraint::Length(9),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(10),
            Constraint::Length(ROW_ACTIONS.len() as u16 + 2),
        ];
        let block = Block::bordered().border_style(Style::new().dark_gray());
        let inner = block.inner(area);

        match &uidata.body {
            TableBody::Rows(rows) => {
                let rows = rows
                    .iter()
                    .enumerate()
                    .map(|(idx, row)| Self::build_row(idx, row));
                let table = Table::new(rows, widths)
                    .header(header)
                    .block(block)
                    .row_highlight_style(Style::new().bg(Color::Magenta).fg(Color::White));
                self.state.select(uidata.selected_row);
                frame.render_stateful_widget(table, area, &mut self.state);
            }
            TableBody::Empty(message) => {
                let table = Table::new(Vec::<Row>::new(), widths)
                    .header(header)
                    .block(block);
                frame.render_widget(table, area);

                // One line below the header across all columns
                if inner.height > 1 {
                    let row_area = Rect::new(inner.x, inner.y + 1, inner.width, 1);
                    let text = Span::styled(*message, Style::new().dark_gray());
                    frame.render_widget(Paragraph::new(Line::from(text)).centered(), row_area);
                }
            }
        }
    }

    fn build_row(idx: usize, row: &RowView) -> Row<'_> {
        let background = if idx % 2 == 0 { EVEN_ROW } else { ODD_ROW };
        Row::new(vec![
            Cell::from(Line::from(row.emp_no.as_str()).centered()),
            Cell::from(row.first_name.as_str()),
            Cell::from(row.last_name.as_str()),
            Cell::from(Line::from(row.gender.as_str()).centered()),
            Cell::from(Line::from(ROW_ACTIONS.dark_gray()).centered()),
        ])
        .style(Style::new().bg(background))
    }

    fn draw_pagination(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let button = |label: &'static str, enabled: bool| -> Span<'static> {
            if enabled {
                Span::styled(label, Style::new().fg(Color::White).bg(ACCENT).bold())
            } else {
                let disabled = Style::new()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT);
                Span::styled(label, disabled)
            }
        };
        let line = Line::from(vec![
            button(" ◀ Previous ", uidata.previous_enabled),
            "   ".into(),
            uidata.page_label.clone().light_blue(),
            "   ".into(),
            button(" Next ▶ ", uidata.next_enabled),
        ]);
        frame.render_widget(Paragraph::new(line).centered(), area);
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let state = match &uidata.request {
            RequestState::Idle | RequestState::Succeeded => Span::raw(""),
            RequestState::Pending { .. } => " LOADING ".black().on_yellow(),
            RequestState::Failed(_) => " FAILED ".white().on_red(),
        };
        let line = Line::from(vec![state, " ".into(), uidata.status_message.as_str().into()]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_popup(&self, message: &str, frame: &mut Frame) {
        let area = Self::popup_area(frame.area(), 60, 60);
        let block = Block::bordered()
            .title(" Help ".bold())
            .border_set(border::DOUBLE);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(message).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }

    fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
            .flex(Flex::Center)
            .areas(area);
        let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
            .flex(Flex::Center)
            .areas(area);
        area
    }
}
