//! Categories tab.
//!
//! `o` opens the selected category's subcategories in a second panel below
//! the list; `Esc` returns to the categories.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};
use tracing::{debug, warn};

use super::list::ListPanel;
use crate::api::types::{Category, Subcategory};
use crate::config::Settings;
use crate::events::KeyContext;
use crate::ui::components::format::date;
use crate::ui::components::{Column, Record, RowAction, TableAction};

/// Requests the categories tab makes of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoriesAction {
    Delete { category_id: u64 },
    /// Fetch the subcategories of a category.
    OpenSubcategories { category_id: u64 },
    DeleteSubcategory { subcategory_id: u64 },
    Rejected(String),
}

#[derive(Debug)]
pub struct CategoriesView {
    panel: ListPanel,
    subcategories: ListPanel,
    /// Category whose subcategories are showing.
    open: Option<u64>,
}

impl CategoriesView {
    pub fn new(settings: &Settings) -> Self {
        let columns = vec![
            Column::new("ID", "category_id").with_width(Constraint::Length(6)),
            Column::new("Name", "category_name").with_width(Constraint::Fill(2)),
            Column::new("Description", "description").with_width(Constraint::Fill(4)),
            Column::new("Created", "created_at")
                .with_format(date(settings.date_format.clone()))
                .with_width(Constraint::Fill(2)),
        ];
        let sub_columns = vec![
            Column::new("ID", "subcategory_id").with_width(Constraint::Length(6)),
            Column::new("Name", "subcategory_name").with_width(Constraint::Fill(2)),
            Column::new("Description", "description").with_width(Constraint::Fill(4)),
        ];
        Self {
            panel: ListPanel::new(
                "Categories",
                "Category",
                columns,
                vec![RowAction::Edit, RowAction::Delete],
                &["category_name", "description"],
                settings,
            ),
            subcategories: ListPanel::new(
                "Subcategories",
                "Subcategory",
                sub_columns,
                vec![RowAction::Edit, RowAction::Delete],
                &["subcategory_name", "description"],
                settings,
            ),
            open: None,
        }
    }

    pub fn set_categories(&mut self, categories: &[Category]) {
        let records = categories
            .iter()
            .filter_map(|c| {
                Record::from_serialize(c, "category_id")
                    .map_err(|e| warn!(error = %e, "Skipping category that failed to serialize"))
                    .ok()
            })
            .collect();
        self.panel.set_records(records);
    }

    pub fn panel(&self) -> &ListPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ListPanel {
        &mut self.panel
    }

    pub fn subcategories(&self) -> &ListPanel {
        &self.subcategories
    }

    pub fn subcategories_mut(&mut self) -> &mut ListPanel {
        &mut self.subcategories
    }

    /// Id of the category whose subcategories are showing.
    pub fn open_category(&self) -> Option<u64> {
        self.open
    }

    /// Fill the subcategory panel, ignoring lists for a category no longer open.
    pub fn set_subcategories(&mut self, category_id: u64, subcategories: &[Subcategory]) -> bool {
        if self.open_category() != Some(category_id) {
            debug!(category_id, "Dropping subcategories for a closed category");
            return false;
        }
        let records = subcategories
            .iter()
            .filter_map(|s| {
                Record::from_serialize(s, "subcategory_id")
                    .map_err(|e| warn!(error = %e, "Skipping subcategory that failed to serialize"))
                    .ok()
            })
            .collect();
        self.subcategories.set_records(records);
        true
    }

    fn close_subcategories(&mut self) {
        self.open = None;
        self.subcategories.set_records(Vec::new());
    }

    /// Forget the open category if it was just deleted.
    pub fn category_removed(&mut self, category_id: u64) {
        if self.open_category() == Some(category_id) {
            self.close_subcategories();
        }
    }

    pub fn key_context(&self) -> KeyContext {
        if self.open.is_some() {
            return match self.subcategories.key_context() {
                KeyContext::Table => KeyContext::Subcategories,
                other => other,
            };
        }
        match self.panel.key_context() {
            KeyContext::Table => KeyContext::Categories,
            other => other,
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<CategoriesAction> {
        if self.open.is_some() {
            if key.code == KeyCode::Esc && !self.subcategories.is_capturing() {
                self.close_subcategories();
                return None;
            }
            let action = self.subcategories.handle_input(key);
            return self.map_subcategory_action(action);
        }
        if key.code == KeyCode::Char('o')
            && key.modifiers == KeyModifiers::NONE
            && !self.panel.is_capturing()
        {
            return self.open_selected();
        }
        let action = self.panel.handle_input(key);
        self.map_action(action)
    }

    pub fn handle_click(&mut self, column: u16, row: u16) -> Option<CategoriesAction> {
        if self.open.is_some() {
            let action = self.subcategories.handle_click(column, row);
            return self.map_subcategory_action(action);
        }
        let action = self.panel.handle_click(column, row);
        self.map_action(action)
    }

    fn open_selected(&mut self) -> Option<CategoriesAction> {
        let record = self.panel.table().selected_row()?;
        let Some(id) = record.key().as_id() else {
            return Some(CategoriesAction::Rejected(format!(
                "Category '{}' has no valid id",
                record.key()
            )));
        };
        let name = record.get_str("category_name");
        debug!(category_id = id, "Opening subcategories");
        self.subcategories
            .table_mut()
            .set_title(format!("Subcategories of {}", name));
        self.subcategories.set_records(Vec::new());
        self.subcategories.reset_page();
        self.open = Some(id);
        Some(CategoriesAction::OpenSubcategories { category_id: id })
    }

    fn map_subcategory_action(&mut self, action: Option<TableAction>) -> Option<CategoriesAction> {
        match action? {
            TableAction::Delete(key) => match key.as_id() {
                Some(subcategory_id) => Some(CategoriesAction::DeleteSubcategory { subcategory_id }),
                None => {
                    warn!(key = %key, "Subcategory row has no numeric id");
                    self.subcategories.finish_delete();
                    Some(CategoriesAction::Rejected(format!(
                        "Subcategory '{}' has no valid id",
                        key
                    )))
                }
            },
            TableAction::Toggle { .. } | TableAction::Edit(_) => None,
        }
    }

    fn map_action(&mut self, action: Option<TableAction>) -> Option<CategoriesAction> {
        match action? {
            TableAction::Delete(key) => match key.as_id() {
                Some(category_id) => Some(CategoriesAction::Delete { category_id }),
                None => {
                    warn!(key = %key, "Category row has no numeric id");
                    self.panel.finish_delete();
                    Some(CategoriesAction::Rejected(format!(
                        "Category '{}' has no valid id",
                        key
                    )))
                }
            },
            TableAction::Toggle { .. } | TableAction::Edit(_) => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        if self.open.is_none() {
            self.panel.render(frame, area, focused);
            return;
        }
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        self.panel.render(frame, chunks[0], false);
        self.subcategories.render(frame, chunks[1], focused);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::DeleteState;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn subcategory(id: &str, name: &str) -> Subcategory {
        Subcategory {
            subcategory_id: id.to_string(),
            subcategory_name: name.to_string(),
            category_id: "3".to_string(),
            ..Subcategory::default()
        }
    }

    fn category(id: &str, name: &str) -> Category {
        Category {
            category_id: id.to_string(),
            category_name: name.to_string(),
            description: format!("All things {}", name.to_lowercase()),
            created_at: "2024-03-01T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_delete_via_row_menu() {
        let mut view = CategoriesView::new(&Settings::default());
        view.set_categories(&[category("3", "Food"), category("4", "Fashion")]);

        view.handle_input(key(KeyCode::Char('j')));
        view.handle_input(key(KeyCode::Enter));
        assert_eq!(view.key_context(), KeyContext::RowMenu);
        // Edit, then Delete
        view.handle_input(key(KeyCode::Char('j')));
        assert_eq!(view.handle_input(key(KeyCode::Enter)), None);
        assert_eq!(view.key_context(), KeyContext::Confirm);

        assert_eq!(
            view.handle_input(key(KeyCode::Char('y'))),
            Some(CategoriesAction::Delete { category_id: 4 })
        );
        assert!(matches!(
            view.panel().table().delete_state(),
            DeleteState::Deleting(_)
        ));
    }

    #[test]
    fn test_cancel_leaves_rows_alone() {
        let mut view = CategoriesView::new(&Settings::default());
        view.set_categories(&[category("3", "Food")]);

        view.handle_input(key(KeyCode::Char('d')));
        assert_eq!(view.handle_input(key(KeyCode::Char('n'))), None);
        assert_eq!(view.panel().table().delete_state(), &DeleteState::Idle);
        assert_eq!(view.panel().table().rows().len(), 1);
    }

    #[test]
    fn test_empty_list_shows_placeholder() {
        let mut view = CategoriesView::new(&Settings::default());
        view.set_categories(&[]);
        assert!(view.panel().table().shows_placeholder());
        assert_eq!(view.handle_input(key(KeyCode::Char('d'))), None);
        assert_eq!(view.key_context(), KeyContext::Categories);
    }

    #[test]
    fn test_open_subcategories_and_delete_one() {
        let mut view = CategoriesView::new(&Settings::default());
        view.set_categories(&[category("3", "Food"), category("4", "Fashion")]);

        assert_eq!(
            view.handle_input(key(KeyCode::Char('o'))),
            Some(CategoriesAction::OpenSubcategories { category_id: 3 })
        );
        assert_eq!(view.key_context(), KeyContext::Subcategories);

        // A late list for another category is ignored
        assert!(!view.set_subcategories(4, &[subcategory("9", "Abayas")]));
        assert!(view.set_subcategories(3, &[subcategory("8", "Dried fruit")]));
        assert_eq!(view.subcategories().table().rows().len(), 1);

        view.handle_input(key(KeyCode::Char('d')));
        assert_eq!(view.key_context(), KeyContext::Confirm);
        assert_eq!(
            view.handle_input(key(KeyCode::Char('y'))),
            Some(CategoriesAction::DeleteSubcategory { subcategory_id: 8 })
        );
        // The category list is untouched
        assert_eq!(view.panel().table().delete_state(), &DeleteState::Idle);
    }

    #[test]
    fn test_escape_returns_to_categories() {
        let mut view = CategoriesView::new(&Settings::default());
        view.set_categories(&[category("3", "Food")]);
        view.handle_input(key(KeyCode::Char('o')));
        view.set_subcategories(3, &[]);
        assert!(view.subcategories().table().shows_placeholder());

        view.handle_input(key(KeyCode::Esc));
        assert_eq!(view.open_category(), None);
        assert_eq!(view.key_context(), KeyContext::Categories);
    }

    #[test]
    fn test_deleting_open_category_closes_panel() {
        let mut view = CategoriesView::new(&Settings::default());
        view.set_categories(&[category("3", "Food")]);
        view.handle_input(key(KeyCode::Char('o')));

        view.category_removed(4);
        assert_eq!(view.open_category(), Some(3));
        view.category_removed(3);
        assert_eq!(view.open_category(), None);
    }
}
