//! Products tab.

use crossterm::event::KeyEvent;
use ratatui::{layout::Constraint, layout::Rect, Frame};
use tracing::warn;

use super::list::ListPanel;
use crate::api::types::Product;
use crate::config::Settings;
use crate::events::KeyContext;
use crate::ui::components::format::{currency, date, quantity};
use crate::ui::components::{Column, Record, RowAction, RowKey, TableAction};

/// Status value of a listed product.
pub const STATUS_ACTIVE: &str = "1";
/// Status value of an unlisted product.
pub const STATUS_INACTIVE: &str = "0";

/// Requests the products tab makes of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductsAction {
    ToggleStatus { product_id: u64, status: String },
    Delete { product_id: u64 },
    /// The action could not be carried out; show the message.
    Rejected(String),
}

/// The merchant's product catalogue.
#[derive(Debug)]
pub struct ProductsView {
    panel: ListPanel,
    products: Vec<Product>,
}

impl ProductsView {
    pub fn new(settings: &Settings) -> Self {
        let columns = vec![
            Column::new("Product Info", "product_info").with_width(Constraint::Fill(3)),
            Column::new("Price", "product_price")
                .with_format(currency(settings.currency.clone()))
                .with_width(Constraint::Fill(2)),
            Column::new("Inventory", "product_quantity").with_format(quantity()),
            Column::new("Category", "category_name").with_width(Constraint::Fill(2)),
            Column::new("Expires", "expiry_date")
                .with_format(date(settings.date_format.clone()))
                .with_width(Constraint::Fill(2)),
        ];
        let actions = vec![
            RowAction::Edit,
            RowAction::Delete,
            RowAction::toggle("status", STATUS_ACTIVE, STATUS_INACTIVE),
        ];
        Self {
            panel: ListPanel::new(
                "Products",
                "Product",
                columns,
                actions,
                &["product_name", "short_product_name"],
                settings,
            ),
            products: Vec::new(),
        }
    }

    /// Replace the catalogue with a fresh fetch.
    pub fn set_products(&mut self, products: Vec<Product>) {
        let records = products.iter().filter_map(to_record).collect();
        self.products = products;
        self.panel.set_records(records);
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn panel(&self) -> &ListPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ListPanel {
        &mut self.panel
    }

    pub fn key_context(&self) -> KeyContext {
        self.panel.key_context()
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ProductsAction> {
        let action = self.panel.handle_input(key);
        self.map_action(action)
    }

    pub fn handle_click(&mut self, column: u16, row: u16) -> Option<ProductsAction> {
        let action = self.panel.handle_click(column, row);
        self.map_action(action)
    }

    fn map_action(&mut self, action: Option<TableAction>) -> Option<ProductsAction> {
        match action? {
            TableAction::Delete(key) => match key.as_id() {
                Some(product_id) => Some(ProductsAction::Delete { product_id }),
                None => {
                    self.panel.finish_delete();
                    Some(rejected(&key))
                }
            },
            TableAction::Toggle { key, new_value } => match key.as_id() {
                Some(product_id) => Some(ProductsAction::ToggleStatus {
                    product_id,
                    status: new_value,
                }),
                None => Some(rejected(&key)),
            },
            TableAction::Edit(_) => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        self.panel.render(frame, area, focused);
    }
}

fn rejected(key: &RowKey) -> ProductsAction {
    warn!(key = %key, "Product row has no numeric id");
    ProductsAction::Rejected(format!("Product '{}' has no valid id", key))
}

/// Table record for a product, with a combined info column.
fn to_record(product: &Product) -> Option<Record> {
    let record = match Record::from_serialize(product, "product_id") {
        Ok(record) => record,
        Err(e) => {
            warn!(error = %e, "Skipping product that failed to serialize");
            return None;
        }
    };
    let info = [&product.product_name, &product.product_model, &product.product_color]
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" · ");
    Some(record.with("product_info", info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn product(id: &str, name: &str, status: &str) -> Product {
        Product {
            product_id: id.to_string(),
            product_name: name.to_string(),
            product_price: "1500".to_string(),
            status: status.to_string(),
            ..Product::default()
        }
    }

    #[test]
    fn test_toggle_active_product_deactivates() {
        let mut view = ProductsView::new(&Settings::default());
        view.set_products(vec![product("42", "Medjool Dates", "1")]);

        assert_eq!(
            view.handle_input(key(' ')),
            Some(ProductsAction::ToggleStatus {
                product_id: 42,
                status: "0".to_string()
            })
        );
        // Rows are unchanged until a re-fetch arrives
        assert_eq!(view.panel().table().rows()[0].get_str("status"), "1");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut view = ProductsView::new(&Settings::default());
        view.set_products(vec![product("7", "Prayer Mat", "0")]);

        assert_eq!(view.handle_input(key('d')), None);
        assert_eq!(view.key_context(), KeyContext::Confirm);
        assert_eq!(
            view.handle_input(key('y')),
            Some(ProductsAction::Delete { product_id: 7 })
        );
    }

    #[test]
    fn test_non_numeric_id_is_rejected() {
        let mut view = ProductsView::new(&Settings::default());
        view.set_products(vec![product("abc", "Mystery", "1")]);

        view.handle_input(key('d'));
        assert!(matches!(
            view.handle_input(key('y')),
            Some(ProductsAction::Rejected(_))
        ));
        assert!(!view.panel().table().is_confirming());
        assert_eq!(
            view.panel().table().delete_state(),
            &crate::ui::components::DeleteState::Idle
        );
    }

    #[test]
    fn test_product_info_combines_name_and_model() {
        let mut p = product("1", "Abaya", "1");
        p.product_model = "Classic".to_string();
        let record = to_record(&p).unwrap();
        assert_eq!(record.get_str("product_info"), "Abaya · Classic");
        assert_eq!(record.key().as_str(), "1");
    }

    #[test]
    fn test_search_by_name() {
        let mut view = ProductsView::new(&Settings::default());
        view.set_products(vec![
            product("1", "Medjool Dates", "1"),
            product("2", "Prayer Mat", "1"),
        ]);
        view.panel_mut().set_query("mat");
        assert_eq!(view.panel().table().rows().len(), 1);
        assert_eq!(view.products().len(), 2);
    }
}
