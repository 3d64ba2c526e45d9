//! Order panel: totals, line items and status history of one order.
//!
//! Details and history arrive as two separate responses; each is shown as
//! soon as it lands. Responses for an order that is no longer open are
//! dropped.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use serde_json::Value;
use tracing::debug;

use crate::api::types::{OrderDetails, StatusChange};
use crate::config::Settings;
use crate::ui::components::centered_rect;
use crate::ui::components::format::{badge, format_currency, format_date};
use crate::ui::theme::theme;

#[derive(Debug, Clone, PartialEq, Default)]
enum Loadable<T> {
    #[default]
    Loading,
    Loaded(T),
    Failed,
}

#[derive(Debug, Default)]
pub struct OrderPanel {
    order_id: Option<u64>,
    details: Loadable<OrderDetails>,
    history: Loadable<Vec<StatusChange>>,
    scroll: u16,
    currency: String,
    date_format: String,
}

impl OrderPanel {
    pub fn new(settings: &Settings) -> Self {
        Self {
            currency: settings.currency.clone(),
            date_format: settings.date_format.clone(),
            ..Self::default()
        }
    }

    /// Show `order_id`, waiting for its details and history.
    pub fn open(&mut self, order_id: u64) {
        self.order_id = Some(order_id);
        self.details = Loadable::Loading;
        self.history = Loadable::Loading;
        self.scroll = 0;
    }

    pub fn close(&mut self) {
        self.order_id = None;
    }

    pub fn is_open(&self) -> bool {
        self.order_id.is_some()
    }

    fn is_current(&self, order_id: u64) -> bool {
        if self.order_id == Some(order_id) {
            return true;
        }
        debug!(order_id, open = ?self.order_id, "Dropping response for a closed order");
        false
    }

    /// Apply a details response. `None` marks the lookup as failed.
    pub fn set_details(&mut self, order_id: u64, details: Option<OrderDetails>) -> bool {
        if !self.is_current(order_id) {
            return false;
        }
        self.details = details.map_or(Loadable::Failed, Loadable::Loaded);
        true
    }

    /// Apply a history response. `None` marks the lookup as failed.
    pub fn set_history(&mut self, order_id: u64, history: Option<Vec<StatusChange>>) -> bool {
        if !self.is_current(order_id) {
            return false;
        }
        self.history = history.map_or(Loadable::Failed, Loadable::Loaded);
        true
    }

    pub fn details(&self) -> Option<&OrderDetails> {
        match &self.details {
            Loadable::Loaded(details) => Some(details),
            _ => None,
        }
    }

    /// Returns true when the key closed the panel.
    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        if !self.is_open() {
            return false;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('q'), KeyModifiers::NONE) => {
                self.close();
                true
            }
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                self.scroll = self.scroll.saturating_add(1);
                false
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.scroll = self.scroll.saturating_sub(1);
                false
            }
            _ => false,
        }
    }

    fn money(&self, raw: &str) -> String {
        format_currency(&self.currency, &Value::from(raw))
    }

    fn when(&self, raw: &str) -> String {
        format_date(&self.date_format, &Value::from(raw))
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let t = theme();
        let label = Style::default().fg(t.muted).add_modifier(Modifier::BOLD);
        let heading = Style::default().fg(t.accent).add_modifier(Modifier::BOLD);
        let field = |name: &str, value: String| {
            Line::from(vec![Span::styled(format!("{:>12}  ", name), label), Span::raw(value)])
        };
        let mut lines = Vec::new();

        match &self.details {
            Loadable::Loading => lines.push(Line::styled("Loading order…", label)),
            Loadable::Failed => lines.push(Line::styled(
                "Could not load order details",
                Style::default().fg(t.danger),
            )),
            Loadable::Loaded(details) => {
                let mut status = vec![Span::styled(format!("{:>12}  ", "Status"), label)];
                status.extend(badge().apply(&Value::from(details.order_status.as_str())).spans);
                lines.push(status.into());
                lines.push(field("Customer", details.customer_id.clone()));
                lines.push(field("Placed", self.when(&details.created_at)));
                if let Some(updated) = details.updated_at.as_deref() {
                    lines.push(field("Updated", self.when(updated)));
                }
                lines.push(field("VAT", self.money(&details.vat)));
                lines.push(field("Delivery fee", self.money(&details.delivery_fee)));
                lines.push(field("Total", self.money(&details.total_amount)));

                lines.push(Line::default());
                lines.push(Line::styled(format!("Items ({})", details.order_items.len()), heading));
                for item in &details.order_items {
                    let name = if item.product_name.is_empty() {
                        format!("Product {}", item.product_id)
                    } else {
                        item.product_name.clone()
                    };
                    let quantity = item.quantity.as_deref().unwrap_or("1");
                    lines.push(Line::from(format!(
                        "  {} × {}  {}",
                        quantity,
                        name,
                        self.money(&item.price)
                    )));
                }
            }
        }

        lines.push(Line::default());
        lines.push(Line::styled("Status history", heading));
        match &self.history {
            Loadable::Loading => lines.push(Line::styled("  Loading…", label)),
            Loadable::Failed => lines.push(Line::styled(
                "  Could not load status history",
                Style::default().fg(t.danger),
            )),
            Loadable::Loaded(history) if history.is_empty() => {
                lines.push(Line::styled("  No status changes recorded", label))
            }
            Loadable::Loaded(history) => {
                for change in history {
                    let mut spans = vec![Span::styled(
                        format!("  {:<20}", self.when(&change.updated_at)),
                        Style::default().fg(t.muted),
                    )];
                    spans.extend(badge().apply(&Value::from(change.status.as_str())).spans);
                    lines.push(spans.into());
                }
            }
        }
        lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(order_id) = self.order_id else {
            return;
        };
        let t = theme();
        let lines = self.lines();
        let height = (lines.len() as u16 + 2).min(area.height);
        let popup = centered_rect(72.min(area.width), height, area);

        frame.render_widget(Clear, popup);
        let paragraph = Paragraph::new(lines).scroll((self.scroll, 0)).block(
            Block::default()
                .title(format!(" Order #{} ", order_id))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(t.accent)),
        );
        frame.render_widget(paragraph, popup);
    }
}
