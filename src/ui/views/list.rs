//! Searchable table panel shared by the list tabs.
//!
//! Owns a [`PagedTable`], its [`SearchBar`] and a [`DetailView`] for the
//! edit action. Tabs feed it records and translate the table actions it
//! returns into API calls.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};
use tracing::debug;

use super::detail::DetailView;
use crate::config::Settings;
use crate::events::KeyContext;
use crate::ui::components::{Column, PagedTable, Record, RowAction, SearchAction, SearchBar, TableAction};

/// A paged, searchable table with a detail panel.
#[derive(Debug)]
pub struct ListPanel {
    table: PagedTable,
    search: SearchBar,
    detail: DetailView,
    /// Every record before the search filter.
    records: Vec<Record>,
}

impl ListPanel {
    /// Build a panel.
    ///
    /// `item` names a single row in the detail panel title; `search_fields`
    /// are the record fields the search bar matches against.
    pub fn new(
        title: &str,
        item: &str,
        columns: Vec<Column>,
        actions: Vec<RowAction>,
        search_fields: &[&str],
        settings: &Settings,
    ) -> Self {
        let table = PagedTable::new(title, columns.clone())
            .with_pagination(settings.page_size, settings.sibling_count)
            .with_actions(actions);
        Self {
            table,
            search: SearchBar::new(format!("Search {}...", title.to_lowercase()), search_fields),
            detail: DetailView::new(item, columns),
            records: Vec::new(),
        }
    }

    pub fn table(&self) -> &PagedTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut PagedTable {
        &mut self.table
    }

    pub fn search(&self) -> &SearchBar {
        &self.search
    }

    pub fn detail(&self) -> &DetailView {
        &self.detail
    }

    /// Replace the source records, keeping the page and the query.
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.apply_search();
    }

    /// Return to the first page.
    pub fn reset_page(&mut self) {
        self.table.reset_page();
    }

    pub fn finish_delete(&mut self) {
        self.table.finish_delete();
    }

    /// Set the query and re-filter from page 1.
    pub fn set_query(&mut self, query: &str) {
        self.search.set_query(query);
        self.apply_search();
        self.table.reset_page();
    }

    fn apply_search(&mut self) {
        self.table.set_rows(self.search.filter(&self.records));
    }

    /// Whether keys are currently owned by the search bar, the detail panel
    /// or a table overlay.
    pub fn is_capturing(&self) -> bool {
        self.detail.is_open() || self.search.is_active() || self.table.has_overlay()
    }

    /// Help bar context for the current focus.
    pub fn key_context(&self) -> KeyContext {
        if self.detail.is_open() {
            KeyContext::Detail
        } else if self.search.is_active() {
            KeyContext::Search
        } else if self.table.is_confirming() {
            KeyContext::Confirm
        } else if self.table.is_menu_open() {
            KeyContext::RowMenu
        } else {
            KeyContext::Table
        }
    }

    /// Route a key to the focused part.
    ///
    /// Edit actions are handled here by opening the detail panel; other
    /// table actions are returned to the owning tab.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<TableAction> {
        if self.detail.is_open() {
            self.detail.handle_input(key);
            return None;
        }

        if self.search.is_active() {
            match self.search.handle_input(key) {
                Some(SearchAction::QueryChanged) | Some(SearchAction::Clear) => {
                    debug!(query = %self.search.query(), "Search changed");
                    self.apply_search();
                    self.table.reset_page();
                }
                Some(SearchAction::Submit) | None => {}
            }
            return None;
        }

        if !self.table.has_overlay()
            && key.code == KeyCode::Char('/')
            && key.modifiers == KeyModifiers::NONE
        {
            self.search.activate();
            return None;
        }

        let action = self.table.handle_input(key);
        self.route(action)
    }

    /// Route a left click to the table. Ignored while the detail panel is open.
    pub fn handle_click(&mut self, column: u16, row: u16) -> Option<TableAction> {
        if self.detail.is_open() {
            return None;
        }
        let action = self.table.handle_click(column, row);
        self.route(action)
    }

    fn route(&mut self, action: Option<TableAction>) -> Option<TableAction> {
        match action? {
            TableAction::Edit(record) => {
                self.detail.open(record);
                None
            }
            other => Some(other),
        }
    }

    /// Render the search line, the table and the detail panel.
    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3)])
            .split(area);

        self.search.render(frame, chunks[0]);
        self.table.render(frame, chunks[1], focused);
        self.detail.render(frame, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn panel() -> ListPanel {
        let mut panel = ListPanel::new(
            "Categories",
            "Category",
            vec![Column::new("Name", "category_name")],
            vec![RowAction::Edit, RowAction::Delete],
            &["category_name"],
            &Settings {
                page_size: 2,
                ..Settings::default()
            },
        );
        panel.set_records(
            ["Food", "Home", "Fashion", "Books", "Fragrance"]
                .iter()
                .enumerate()
                .map(|(i, name)| Record::new(i as u64 + 1).with("category_name", *name))
                .collect(),
        );
        panel
    }

    #[test]
    fn test_search_filters_and_resets_page() {
        let mut panel = panel();
        panel.handle_input(key(KeyCode::Char('l')));
        panel.handle_input(key(KeyCode::Char('l')));
        assert_eq!(panel.table().current_page(), 3);

        panel.handle_input(key(KeyCode::Char('/')));
        assert_eq!(panel.key_context(), KeyContext::Search);
        panel.handle_input(key(KeyCode::Char('f')));
        assert_eq!(panel.table().current_page(), 1);
        assert_eq!(panel.table().rows().len(), 3);

        panel.handle_input(key(KeyCode::Esc));
        assert_eq!(panel.table().rows().len(), 5);
        assert!(!panel.is_capturing());
    }

    #[test]
    fn test_set_records_keeps_query() {
        let mut panel = panel();
        panel.set_query("home");
        panel.set_records(vec![
            Record::new(9u64).with("category_name", "Home"),
            Record::new(10u64).with("category_name", "Garden"),
        ]);
        assert_eq!(panel.table().rows().len(), 1);
        assert_eq!(panel.table().rows()[0].key().as_str(), "9");
    }

    #[test]
    fn test_edit_opens_detail_instead_of_returning() {
        let mut panel = panel();
        assert_eq!(panel.handle_input(key(KeyCode::Char('e'))), None);
        assert!(panel.detail().is_open());
        assert_eq!(panel.key_context(), KeyContext::Detail);

        // Keys go to the panel until it closes
        assert_eq!(panel.handle_input(key(KeyCode::Char('d'))), None);
        assert!(!panel.table().is_confirming());
        panel.handle_input(key(KeyCode::Esc));
        assert!(!panel.detail().is_open());
    }

    #[test]
    fn test_delete_flows_through() {
        let mut panel = panel();
        assert_eq!(panel.handle_input(key(KeyCode::Char('d'))), None);
        assert_eq!(panel.key_context(), KeyContext::Confirm);

        // '/' belongs to the dialog while it is open
        assert_eq!(panel.handle_input(key(KeyCode::Char('/'))), None);
        assert!(!panel.search().is_active());

        let action = panel.handle_input(key(KeyCode::Char('y')));
        assert!(matches!(action, Some(TableAction::Delete(ref k)) if k.as_str() == "1"));
    }
}
