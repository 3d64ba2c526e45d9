//! Orders tab.
//!
//! Lists the order lines placed with the merchant. `f` cycles a status
//! filter, `s` moves the selected order to its next status, `o` opens the
//! order panel and `t` looks an order up by its tracking reference.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::{debug, warn};

use super::list::ListPanel;
use super::order_detail::OrderPanel;
use super::track::{TrackOrderPanel, TrackRequest};
use crate::api::types::{MerchantOrder, OrderDetails, OrderStatus, StatusChange, TrackedOrder};
use crate::config::Settings;
use crate::events::KeyContext;
use crate::ui::components::format::{badge, capitalize, currency, date};
use crate::ui::components::{Column, Record, RowAction};
use crate::ui::theme::theme;

/// Requests the orders tab makes of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrdersAction {
    AdvanceStatus { order_id: u64, status: OrderStatus },
    /// Fetch details and history for the order panel.
    OpenOrder { order_id: u64 },
    Track { reference: String },
    Rejected(String),
}

/// Orders placed with the merchant.
#[derive(Debug)]
pub struct OrdersView {
    panel: ListPanel,
    orders: Vec<MerchantOrder>,
    status_filter: Option<OrderStatus>,
    order_panel: OrderPanel,
    tracker: TrackOrderPanel,
}

impl OrdersView {
    pub fn new(settings: &Settings) -> Self {
        let columns = vec![
            Column::new("Order ID", "order_id"),
            Column::new("Product", "product_name").with_width(Constraint::Fill(2)),
            Column::new("Customer", "customer_id"),
            Column::new("Date of order", "ordered_at")
                .with_format(date(settings.date_format.clone()))
                .with_width(Constraint::Fill(2)),
            Column::new("Amount", "price")
                .with_format(currency(settings.currency.clone()))
                .with_width(Constraint::Fill(2)),
            Column::new("Order status", "status").with_format(badge()),
        ];
        Self {
            panel: ListPanel::new(
                "Orders",
                "Order",
                columns,
                vec![RowAction::Edit],
                &["order_id", "customer_id", "product_name"],
                settings,
            ),
            orders: Vec::new(),
            status_filter: None,
            order_panel: OrderPanel::new(settings),
            tracker: TrackOrderPanel::default(),
        }
    }

    /// Replace the orders with a fresh fetch, keeping the filter.
    pub fn set_orders(&mut self, orders: Vec<MerchantOrder>) {
        self.orders = orders;
        self.apply_filter();
    }

    pub fn orders(&self) -> &[MerchantOrder] {
        &self.orders
    }

    pub fn status_filter(&self) -> Option<OrderStatus> {
        self.status_filter
    }

    pub fn panel(&self) -> &ListPanel {
        &self.panel
    }

    pub fn order_panel(&self) -> &OrderPanel {
        &self.order_panel
    }

    pub fn tracker(&self) -> &TrackOrderPanel {
        &self.tracker
    }

    pub fn set_order_details(&mut self, order_id: u64, details: Option<OrderDetails>) {
        self.order_panel.set_details(order_id, details);
    }

    pub fn set_order_history(&mut self, order_id: u64, history: Option<Vec<StatusChange>>) {
        self.order_panel.set_history(order_id, history);
    }

    pub fn set_tracking_result(&mut self, reference: &str, result: Result<Option<TrackedOrder>, ()>) {
        self.tracker.set_result(reference, result);
    }

    /// Whether an overlay, the search bar or a table dialog holds the keys.
    pub fn is_capturing(&self) -> bool {
        self.tracker.is_open() || self.order_panel.is_open() || self.panel.is_capturing()
    }

    /// Step the filter through all, then each status in order.
    pub fn cycle_filter(&mut self) {
        self.status_filter = match self.status_filter {
            None => Some(OrderStatus::Accepted),
            Some(status) => status.next(),
        };
        debug!(filter = ?self.status_filter, "Order status filter changed");
        self.apply_filter();
        self.panel.reset_page();
    }

    fn apply_filter(&mut self) {
        let records = self
            .orders
            .iter()
            .filter(|o| self.status_filter.map_or(true, |s| o.status == s))
            .filter_map(to_record)
            .collect();
        self.panel.set_records(records);
    }

    pub fn key_context(&self) -> KeyContext {
        if self.tracker.is_open() {
            return KeyContext::TrackOrder;
        }
        if self.order_panel.is_open() {
            return KeyContext::OrderDetail;
        }
        match self.panel.key_context() {
            KeyContext::Table => KeyContext::Orders,
            other => other,
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<OrdersAction> {
        if self.tracker.is_open() {
            return self
                .tracker
                .handle_input(key)
                .map(|TrackRequest(reference)| OrdersAction::Track { reference });
        }
        if self.order_panel.is_open() {
            self.order_panel.handle_input(key);
            return None;
        }
        if !self.panel.is_capturing() && key.modifiers == KeyModifiers::NONE {
            match key.code {
                KeyCode::Char('f') => {
                    self.cycle_filter();
                    return None;
                }
                KeyCode::Char('s') => return self.advance_selected(),
                KeyCode::Char('o') => return self.open_selected(),
                KeyCode::Char('t') => {
                    self.tracker.open();
                    return None;
                }
                _ => {}
            }
        }
        // Orders only offer the edit action, which the panel handles itself
        self.panel.handle_input(key);
        None
    }

    pub fn handle_click(&mut self, column: u16, row: u16) -> Option<OrdersAction> {
        if !self.tracker.is_open() && !self.order_panel.is_open() {
            self.panel.handle_click(column, row);
        }
        None
    }

    /// The selected row's order id, or a rejection when it is not numeric.
    fn selected_order_id(&self) -> Option<Result<u64, OrdersAction>> {
        let record = self.panel.table().selected_row()?;
        let order_id = record.get_str("order_id");
        Some(order_id.parse::<u64>().map_err(|_| {
            warn!(order_id = %order_id, "Order row has no numeric id");
            OrdersAction::Rejected(format!("Order '{}' has no valid id", order_id))
        }))
    }

    fn open_selected(&mut self) -> Option<OrdersAction> {
        match self.selected_order_id()? {
            Ok(order_id) => {
                self.order_panel.open(order_id);
                Some(OrdersAction::OpenOrder { order_id })
            }
            Err(rejected) => Some(rejected),
        }
    }

    fn advance_selected(&self) -> Option<OrdersAction> {
        let order_id = match self.selected_order_id()? {
            Ok(order_id) => order_id,
            Err(rejected) => return Some(rejected),
        };
        let record = self.panel.table().selected_row()?;
        let current: OrderStatus = record.get_str("status").parse().unwrap_or_default();
        match current.next() {
            Some(status) => Some(OrdersAction::AdvanceStatus { order_id, status }),
            None => Some(OrdersAction::Rejected(format!(
                "Order {} is already {}",
                order_id, current
            ))),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let t = theme();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(4)])
            .split(area);

        let label = self
            .status_filter
            .map(|s| capitalize(s.as_str()))
            .unwrap_or_else(|| "All".to_string());
        let filter = Line::from(vec![
            Span::styled("Status: ", Style::default().fg(t.muted)),
            Span::styled(label, Style::default().fg(t.accent)),
            Span::styled(
                "  [f] filter  [s] advance  [o] details  [t] track",
                Style::default().fg(t.muted),
            ),
        ]);
        frame.render_widget(Paragraph::new(filter), chunks[0]);
        self.panel.render(frame, chunks[1], focused);
        self.order_panel.render(frame, area);
        self.tracker.render(frame, area);
    }
}

/// Table record for an order line, keyed by the line item.
fn to_record(order: &MerchantOrder) -> Option<Record> {
    let key_field = if order.order_item_id.is_empty() {
        "order_id"
    } else {
        "order_item_id"
    };
    Record::from_serialize(order, key_field)
        .map_err(|e| warn!(error = %e, "Skipping order that failed to serialize"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn order(item: &str, order_id: &str, status: OrderStatus) -> MerchantOrder {
        MerchantOrder {
            order_item_id: item.to_string(),
            order_id: order_id.to_string(),
            customer_id: "c-9".to_string(),
            price: "2500".to_string(),
            status,
            ..MerchantOrder::default()
        }
    }

    fn view() -> OrdersView {
        let mut view = OrdersView::new(&Settings::default());
        view.set_orders(vec![
            order("1", "100", OrderStatus::Accepted),
            order("2", "101", OrderStatus::Shipped),
            order("3", "102", OrderStatus::Received),
        ]);
        view
    }

    #[test]
    fn test_status_serializes_lowercase_for_badge() {
        let record = to_record(&order("1", "100", OrderStatus::Delivered)).unwrap();
        assert_eq!(record.get_str("status"), "delivered");
        assert_eq!(record.key().as_str(), "1");
    }

    #[test]
    fn test_filter_cycle() {
        let mut view = view();
        assert_eq!(view.panel().table().rows().len(), 3);

        view.handle_input(key('f'));
        assert_eq!(view.status_filter(), Some(OrderStatus::Accepted));
        assert_eq!(view.panel().table().rows().len(), 1);

        view.handle_input(key('f'));
        assert_eq!(view.status_filter(), Some(OrderStatus::Shipped));
        view.handle_input(key('f'));
        view.handle_input(key('f'));
        assert_eq!(view.status_filter(), Some(OrderStatus::Received));
        view.handle_input(key('f'));
        assert_eq!(view.status_filter(), None);
        assert_eq!(view.panel().table().rows().len(), 3);
    }

    #[test]
    fn test_advance_status() {
        let mut view = view();
        assert_eq!(
            view.handle_input(key('s')),
            Some(OrdersAction::AdvanceStatus {
                order_id: 100,
                status: OrderStatus::Shipped
            })
        );

        view.handle_input(key('j'));
        view.handle_input(key('j'));
        assert!(matches!(
            view.handle_input(key('s')),
            Some(OrdersAction::Rejected(ref msg)) if msg.contains("already received")
        ));
    }

    #[test]
    fn test_keys_go_to_search_while_typing() {
        let mut view = view();
        view.handle_input(key('/'));
        view.handle_input(key('f'));
        assert_eq!(view.status_filter(), None);
        assert_eq!(view.panel().search().query(), "f");
    }

    #[test]
    fn test_open_order_panel() {
        let mut view = view();
        view.handle_input(key('j'));
        assert_eq!(
            view.handle_input(key('o')),
            Some(OrdersAction::OpenOrder { order_id: 101 })
        );
        assert_eq!(view.key_context(), KeyContext::OrderDetail);
        assert!(view.order_panel().is_open());

        // Table keys wait until the panel closes
        assert_eq!(view.handle_input(key('s')), None);
        view.handle_input(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(view.key_context(), KeyContext::Orders);
    }

    #[test]
    fn test_track_prompt_captures_keys() {
        let mut view = view();
        view.handle_input(key('t'));
        assert_eq!(view.key_context(), KeyContext::TrackOrder);
        assert!(view.is_capturing());

        for c in "HN-f1".chars() {
            view.handle_input(key(c));
        }
        assert_eq!(view.status_filter(), None);
        assert_eq!(
            view.handle_input(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            Some(OrdersAction::Track {
                reference: "HN-f1".to_string()
            })
        );
        view.set_tracking_result("HN-f1", Ok(None));
        assert!(!view.tracker().is_searching());
    }
}
