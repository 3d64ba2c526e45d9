//! Paged table component.
//!
//! Renders one page of [`Record`]s at a time with column-driven formatting and
//! an optional trailing action column. The table never mutates its rows: user
//! intent is reported to the owner as a [`TableAction`], and the owner supplies
//! a new row set through [`PagedTable::set_rows`] once the change is
//! authoritative.
//!
//! Deleting always goes through a confirmation dialog:
//!
//! ```text
//! Idle -> ConfirmingDelete -> Cancel  -> Idle
//!                          -> Confirm -> Deleting -> Idle (finish_delete)
//! ```

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
    },
    Frame,
};
use tracing::debug;

use super::format::{plain_text, Formatter};
use super::modal::{ConfirmAction, ConfirmDialog};
use super::pagination::{PageTarget, Pagination};
use super::record::{Record, RowKey};
use crate::ui::theme::theme;

/// Text of the placeholder row shown when the visible page is empty.
pub const NO_DATA: &str = "No data available";

/// A column of the table.
#[derive(Debug, Clone)]
pub struct Column {
    /// Header text.
    pub header: String,
    /// Field of each record rendered in this column.
    pub key: String,
    /// Optional formatter; raw values render as text without one.
    pub format: Option<Formatter>,
    /// Width constraint for layout.
    pub width: Constraint,
}

impl Column {
    /// Create a column rendering the raw value of `key`.
    pub fn new(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            key: key.into(),
            format: None,
            width: Constraint::Fill(1),
        }
    }

    /// Attach a formatter.
    pub fn with_format(mut self, format: Formatter) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the width constraint.
    pub fn with_width(mut self, width: Constraint) -> Self {
        self.width = width;
        self
    }

    /// Render a record's cell for this column.
    pub fn render_cell(&self, record: &Record) -> Line<'static> {
        let value = record.get(&self.key);
        match &self.format {
            Some(format) => format.apply(value),
            None => Line::from(plain_text(value)),
        }
    }
}

/// A row action the owner wants offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    /// Offer "Edit" in the action menu.
    Edit,
    /// Offer "Delete" in the action menu, behind a confirmation step.
    Delete,
    /// Render a binary switch over `field`, which is "on" when it equals `on`.
    Toggle {
        field: String,
        on: String,
        off: String,
    },
}

impl RowAction {
    /// Toggle over `field` with the given on/off values.
    pub fn toggle(field: impl Into<String>, on: impl Into<String>, off: impl Into<String>) -> Self {
        RowAction::Toggle {
            field: field.into(),
            on: on.into(),
            off: off.into(),
        }
    }
}

/// An intent reported to the table's owner.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    /// The user chose to edit this row.
    Edit(Record),
    /// The user confirmed deletion of this row.
    Delete(RowKey),
    /// The user flipped the row's switch; `new_value` is the requested value.
    Toggle { key: RowKey, new_value: String },
}

/// Delete-confirmation state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeleteState {
    /// No delete in progress.
    #[default]
    Idle,
    /// Waiting for the user to confirm deleting this row.
    ConfirmingDelete(RowKey),
    /// Confirmed; the owner is performing the delete.
    Deleting(RowKey),
}

/// Entries of the per-row action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuEntry {
    Edit,
    Delete,
}

impl MenuEntry {
    fn label(self) -> &'static str {
        match self {
            MenuEntry::Edit => "Edit",
            MenuEntry::Delete => "Delete",
        }
    }
}

/// A table of records with client-side pagination and row actions.
#[derive(Debug)]
pub struct PagedTable {
    title: String,
    columns: Vec<Column>,
    rows: Vec<Record>,
    actions: Vec<RowAction>,
    pagination: Pagination,
    /// Selected row index within the visible page.
    selected: usize,
    delete_state: DeleteState,
    confirm: ConfirmDialog,
    /// Highlighted entry when the action menu is open.
    menu: Option<usize>,
    /// Clickable pager targets from the last render.
    page_targets: Vec<(Rect, PageTarget)>,
}

impl PagedTable {
    /// Create a table with the given columns and default pagination.
    pub fn new(title: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            title: title.into(),
            columns,
            rows: Vec::new(),
            actions: Vec::new(),
            pagination: Pagination::default(),
            selected: 0,
            delete_state: DeleteState::Idle,
            confirm: ConfirmDialog::new(),
            menu: None,
            page_targets: Vec::new(),
        }
    }

    /// Set page size and sibling count, returning to page 1.
    pub fn with_pagination(mut self, page_size: usize, sibling_count: usize) -> Self {
        self.pagination = Pagination::new(page_size, sibling_count);
        self
    }

    /// Set the offered row actions.
    pub fn with_actions(mut self, actions: Vec<RowAction>) -> Self {
        self.actions = actions;
        self
    }

    /// Replace the rows.
    ///
    /// The current page is kept as is, even if it now lies past the end; the
    /// owner decides when to reset it.
    pub fn set_rows(&mut self, rows: Vec<Record>) {
        debug!(table = %self.title, rows = rows.len(), page = self.pagination.current_page(), "Rows updated");
        self.rows = rows;
        let visible = self.visible_row_count();
        if self.selected >= visible {
            self.selected = visible.saturating_sub(1);
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// All rows.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// The table columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Pagination state.
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// The current 1-indexed page.
    pub fn current_page(&self) -> usize {
        self.pagination.current_page()
    }

    /// Number of pages for the current rows.
    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.rows.len())
    }

    /// Jump to a page, clamped to `[1, total_pages]`.
    pub fn go_to_page(&mut self, page: usize) {
        self.pagination.go_to_page(page, self.rows.len());
        self.selected = 0;
    }

    /// Return to the first page. Owners call this after filtering.
    pub fn reset_page(&mut self) {
        self.pagination.first_page();
        self.selected = 0;
    }

    /// The rows of the current page. Empty when the page lies past the end.
    pub fn visible_rows(&self) -> &[Record] {
        &self.rows[self.pagination.slice_range(self.rows.len())]
    }

    /// Number of rows on the current page.
    pub fn visible_row_count(&self) -> usize {
        self.pagination.visible_rows(self.rows.len())
    }

    /// Whether the placeholder row is shown instead of data.
    pub fn shows_placeholder(&self) -> bool {
        self.visible_row_count() == 0
    }

    /// The selected row, if the page has any rows.
    pub fn selected_row(&self) -> Option<&Record> {
        self.visible_rows().get(self.selected)
    }

    /// Current delete-confirmation state.
    pub fn delete_state(&self) -> &DeleteState {
        &self.delete_state
    }

    /// Whether the confirmation dialog is showing.
    pub fn is_confirming(&self) -> bool {
        matches!(self.delete_state, DeleteState::ConfirmingDelete(_))
    }

    /// Whether the action menu is open.
    pub fn is_menu_open(&self) -> bool {
        self.menu.is_some()
    }

    /// Whether the table has an open overlay (menu or dialog) capturing keys.
    pub fn has_overlay(&self) -> bool {
        self.is_menu_open() || self.is_confirming()
    }

    /// Mark the in-flight delete as finished, whatever its outcome.
    pub fn finish_delete(&mut self) {
        if matches!(self.delete_state, DeleteState::Deleting(_)) {
            self.delete_state = DeleteState::Idle;
        }
    }

    fn has_action(&self, wanted: &RowAction) -> bool {
        self.actions
            .iter()
            .any(|a| std::mem::discriminant(a) == std::mem::discriminant(wanted))
    }

    fn toggle_action(&self) -> Option<(&str, &str, &str)> {
        self.actions.iter().find_map(|a| match a {
            RowAction::Toggle { field, on, off } => Some((field.as_str(), on.as_str(), off.as_str())),
            _ => None,
        })
    }

    fn menu_entries(&self) -> Vec<MenuEntry> {
        let mut entries = Vec::new();
        if self.has_action(&RowAction::Edit) {
            entries.push(MenuEntry::Edit);
        }
        if self.has_action(&RowAction::Delete) {
            entries.push(MenuEntry::Delete);
        }
        entries
    }

    fn has_action_column(&self) -> bool {
        !self.actions.is_empty()
    }

    fn request_edit(&mut self) -> Option<TableAction> {
        if !self.has_action(&RowAction::Edit) {
            return None;
        }
        self.selected_row().cloned().map(TableAction::Edit)
    }

    fn request_delete(&mut self) -> Option<TableAction> {
        if !self.has_action(&RowAction::Delete) || self.delete_state != DeleteState::Idle {
            return None;
        }
        let key = self.selected_row()?.key().clone();
        debug!(table = %self.title, key = %key, "Delete requested, awaiting confirmation");
        self.confirm.show(
            "Confirm Delete",
            "Are you sure you want to delete this item? This action cannot be undone.",
            "Delete",
        );
        self.delete_state = DeleteState::ConfirmingDelete(key);
        None
    }

    fn request_toggle(&mut self) -> Option<TableAction> {
        let (field, on, off) = self.toggle_action()?;
        let row = self.selected_row()?;
        let new_value = (if row.get_str(field) == on { off } else { on }).to_string();
        Some(TableAction::Toggle {
            key: row.key().clone(),
            new_value,
        })
    }

    fn resolve_confirmation(&mut self, action: ConfirmAction) -> Option<TableAction> {
        let DeleteState::ConfirmingDelete(key) = std::mem::take(&mut self.delete_state) else {
            return None;
        };
        match action {
            ConfirmAction::Cancel => {
                debug!(table = %self.title, key = %key, "Delete cancelled");
                None
            }
            ConfirmAction::Confirm => {
                debug!(table = %self.title, key = %key, "Delete confirmed");
                self.delete_state = DeleteState::Deleting(key.clone());
                Some(TableAction::Delete(key))
            }
        }
    }

    /// Handle keyboard input.
    ///
    /// Returns an action for the owner to carry out, if any.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<TableAction> {
        if self.is_confirming() {
            let action = self.confirm.handle_input(key)?;
            return self.resolve_confirmation(action);
        }

        if let Some(highlighted) = self.menu {
            return self.handle_menu_input(key, highlighted);
        }

        let total = self.rows.len();
        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                if self.selected + 1 < self.visible_row_count() {
                    self.selected += 1;
                }
                None
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            (KeyCode::Char('l'), KeyModifiers::NONE) | (KeyCode::Right, _) | (KeyCode::PageDown, _) => {
                self.pagination.next_page(total);
                self.selected = 0;
                None
            }
            (KeyCode::Char('h'), KeyModifiers::NONE) | (KeyCode::Left, _) | (KeyCode::PageUp, _) => {
                self.pagination.prev_page(total);
                self.selected = 0;
                None
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
                self.reset_page();
                None
            }
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
                self.pagination.last_page(total);
                self.selected = 0;
                None
            }
            (KeyCode::Enter, _) => {
                if !self.menu_entries().is_empty() && self.selected_row().is_some() {
                    self.menu = Some(0);
                }
                None
            }
            (KeyCode::Char('e'), KeyModifiers::NONE) => self.request_edit(),
            (KeyCode::Char('d'), KeyModifiers::NONE) | (KeyCode::Delete, _) => self.request_delete(),
            (KeyCode::Char(' '), _) | (KeyCode::Char('t'), KeyModifiers::NONE) => self.request_toggle(),
            _ => None,
        }
    }

    fn handle_menu_input(&mut self, key: KeyEvent, highlighted: usize) -> Option<TableAction> {
        let entries = self.menu_entries();
        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                self.menu = Some((highlighted + 1).min(entries.len().saturating_sub(1)));
                None
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.menu = Some(highlighted.saturating_sub(1));
                None
            }
            (KeyCode::Enter, _) => {
                self.menu = None;
                match entries.get(highlighted) {
                    Some(MenuEntry::Edit) => self.request_edit(),
                    Some(MenuEntry::Delete) => self.request_delete(),
                    None => None,
                }
            }
            (KeyCode::Esc, _) | (KeyCode::Char('q'), KeyModifiers::NONE) => {
                self.menu = None;
                None
            }
            _ => None,
        }
    }

    /// Handle a left click.
    ///
    /// The confirmation dialog takes every click while it is showing.
    /// Otherwise a click on the pager changes page.
    pub fn handle_click(&mut self, column: u16, row: u16) -> Option<TableAction> {
        if self.is_confirming() {
            let action = self.confirm.handle_click(column, row)?;
            return self.resolve_confirmation(action);
        }
        let position = Position::new(column, row);
        let target = self
            .page_targets
            .iter()
            .find(|(area, _)| area.contains(position))
            .map(|(_, target)| *target)?;
        self.menu = None;
        let current = self.pagination.current_page();
        match target {
            PageTarget::Previous => self.go_to_page(current.saturating_sub(1)),
            PageTarget::Next => self.go_to_page(current.saturating_add(1)),
            PageTarget::Page(page) => self.go_to_page(page),
        }
        debug!(table = %self.title, page = self.pagination.current_page(), "Page clicked");
        None
    }

    fn action_cell(&self, record: &Record, is_selected: bool) -> Line<'static> {
        let t = theme();
        let mut spans = Vec::new();

        if let Some((field, on, _)) = self.toggle_action() {
            let (label, color) = if record.get_str(field) == on {
                ("[ ON]", t.success)
            } else {
                ("[OFF]", t.muted)
            };
            spans.push(Span::styled(label, Style::default().fg(color)));
            spans.push(Span::raw(" "));
        }

        let deleting = matches!(&self.delete_state, DeleteState::Deleting(k) if k == record.key());
        if deleting {
            spans.push(Span::styled("deleting…", Style::default().fg(t.warning)));
        } else if !self.menu_entries().is_empty() {
            let style = if is_selected {
                Style::default().fg(t.accent)
            } else {
                Style::default().fg(t.muted)
            };
            spans.push(Span::styled("⋯", style));
        }

        Line::from(spans)
    }

    /// Render the table, its pagination control, and any open overlay.
    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let t = theme();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let header_style = Style::default()
            .fg(t.fg)
            .bg(t.header_bg)
            .add_modifier(Modifier::BOLD);
        let mut header_cells: Vec<Cell> = self
            .columns
            .iter()
            .map(|c| Cell::from(c.header.to_uppercase()))
            .collect();
        let mut widths: Vec<Constraint> = self.columns.iter().map(|c| c.width).collect();
        if self.has_action_column() {
            header_cells.push(Cell::from("ACTIONS"));
            widths.push(Constraint::Length(16));
        }
        let header = Row::new(header_cells).style(header_style);

        let rows: Vec<Row> = self
            .visible_rows()
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let mut cells: Vec<Cell> = self
                    .columns
                    .iter()
                    .map(|c| Cell::from(c.render_cell(record)))
                    .collect();
                if self.has_action_column() {
                    cells.push(Cell::from(self.action_cell(record, i == self.selected)));
                }
                Row::new(cells)
            })
            .collect();

        let border_style = if focused {
            Style::default().fg(t.border_focused)
        } else {
            Style::default().fg(t.border)
        };

        let title = format!(" {} ({}) ", self.title, self.rows.len());
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title(title).borders(Borders::ALL).border_style(border_style))
            .highlight_style(Style::default().bg(t.selection_bg).add_modifier(Modifier::BOLD));

        let mut state = TableState::default();
        if !self.shows_placeholder() {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(table, chunks[0], &mut state);

        if self.shows_placeholder() {
            // First body line, inside the border and below the header
            let body = Rect::new(
                chunks[0].x + 1,
                chunks[0].y + 2,
                chunks[0].width.saturating_sub(2),
                1,
            )
            .intersection(chunks[0]);
            let placeholder = Paragraph::new(Span::styled(
                NO_DATA,
                Style::default().fg(t.muted).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center);
            frame.render_widget(placeholder, body);
        }

        self.page_targets = self.pagination.render(frame, chunks[1], self.rows.len());

        if let Some(highlighted) = self.menu {
            // The table scrolls to keep the selection visible
            let on_screen = self.selected.saturating_sub(state.offset()) as u16;
            let row_y = chunks[0].y + 2 + on_screen;
            self.render_menu(frame, row_y, chunks[0], highlighted);
        }
        if self.is_confirming() {
            self.confirm.render(frame, frame.area());
        }
    }

    fn render_menu(&self, frame: &mut Frame, row_y: u16, table_area: Rect, highlighted: usize) {
        let t = theme();
        let entries = self.menu_entries();
        let width = 14u16;
        let height = entries.len() as u16 + 2;
        let x = table_area.right().saturating_sub(width + 1);
        let area = Rect::new(x, row_y, width, height).intersection(frame.area());

        frame.render_widget(Clear, area);
        let items: Vec<ListItem> = entries
            .iter()
            .map(|e| {
                let style = match e {
                    MenuEntry::Delete => Style::default().fg(t.danger),
                    MenuEntry::Edit => Style::default().fg(t.fg),
                };
                ListItem::new(e.label()).style(style)
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(t.border_focused)))
            .highlight_style(Style::default().bg(t.selection_bg).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(highlighted));
        frame.render_stateful_widget(list, area, &mut state);
    }
}
