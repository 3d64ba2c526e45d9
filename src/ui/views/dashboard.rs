//! Dashboard tab: sales summary cards for a reporting period.

use chrono::{Datelike, Days, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde_json::Value;
use tracing::debug;

use crate::api::types::{DateRange, MerchantStats};
use crate::ui::components::format::format_currency;
use crate::ui::theme::theme;

/// Reporting periods offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePreset {
    #[default]
    AllTime,
    Last7Days,
    Last30Days,
    ThisMonth,
}

impl RangePreset {
    pub fn label(&self) -> &'static str {
        match self {
            RangePreset::AllTime => "All time",
            RangePreset::Last7Days => "Last 7 days",
            RangePreset::Last30Days => "Last 30 days",
            RangePreset::ThisMonth => "This month",
        }
    }

    pub fn next(&self) -> RangePreset {
        match self {
            RangePreset::AllTime => RangePreset::Last7Days,
            RangePreset::Last7Days => RangePreset::Last30Days,
            RangePreset::Last30Days => RangePreset::ThisMonth,
            RangePreset::ThisMonth => RangePreset::AllTime,
        }
    }

    /// The date range this preset covers, ending `today` inclusive.
    pub fn range(&self, today: NaiveDate) -> DateRange {
        let start = match self {
            RangePreset::AllTime => return DateRange::all_time(),
            RangePreset::Last7Days => today.checked_sub_days(Days::new(6)),
            RangePreset::Last30Days => today.checked_sub_days(Days::new(29)),
            RangePreset::ThisMonth => today.with_day(1),
        };
        DateRange::new(start, Some(today)).unwrap_or_default()
    }
}

/// Actions returned by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    /// Stats should be fetched for the new range.
    RangeChanged(DateRange),
}

#[derive(Debug)]
pub struct DashboardView {
    preset: RangePreset,
    range: DateRange,
    stats: Option<MerchantStats>,
    currency: String,
}

impl DashboardView {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            preset: RangePreset::AllTime,
            range: DateRange::all_time(),
            stats: None,
            currency: currency.into(),
        }
    }

    pub fn preset(&self) -> RangePreset {
        self.preset
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn stats(&self) -> Option<&MerchantStats> {
        self.stats.as_ref()
    }

    /// Store stats, ignoring responses for a range no longer selected.
    pub fn set_stats(&mut self, range: DateRange, stats: MerchantStats) -> bool {
        if range != self.range {
            debug!(?range, current = ?self.range, "Dropping stats for a stale range");
            return false;
        }
        self.stats = Some(stats);
        true
    }

    /// Advance to the next period, computing it relative to `today`.
    pub fn cycle_preset(&mut self, today: NaiveDate) -> DashboardAction {
        self.preset = self.preset.next();
        self.range = self.preset.range(today);
        self.stats = None;
        debug!(preset = self.preset.label(), "Dashboard period changed");
        DashboardAction::RangeChanged(self.range)
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<DashboardAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('d'), KeyModifiers::NONE) => {
                Some(self.cycle_preset(Local::now().date_naive()))
            }
            _ => None,
        }
    }

    fn cards(&self) -> [(&'static str, String); 8] {
        let s = self.stats.unwrap_or_default();
        let money = |n: f64| format_currency(&self.currency, &Value::from(n));
        let count = |n: f64| format!("{}", n.trunc() as i64);
        [
            ("Customers", count(s.total_customers)),
            ("Orders", count(s.total_orders)),
            ("Revenue", money(s.total_amount)),
            ("Average order", money(s.average_amount)),
            ("Customers this month", count(s.total_customers_month)),
            ("Orders this month", count(s.total_orders_month)),
            ("Revenue this month", money(s.total_amount_month)),
            ("Average this month", money(s.average_amount_month)),
        ]
    }

    fn period_line(&self) -> Line<'static> {
        let t = theme();
        let bounds = match (self.range.start(), self.range.end()) {
            (Some(start), Some(end)) => format!("  {} to {}", start, end),
            _ => String::new(),
        };
        Line::from(vec![
            Span::styled("Period: ", Style::default().fg(t.muted)),
            Span::styled(self.preset.label(), Style::default().fg(t.accent)),
            Span::styled(bounds, Style::default().fg(t.muted)),
        ])
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(5),
                Constraint::Length(5),
                Constraint::Min(0),
            ])
            .split(area);

        frame.render_widget(Paragraph::new(self.period_line()), rows[0]);

        let cards = self.cards();
        for (row, chunk) in [rows[1], rows[2]].into_iter().zip(cards.chunks(4)) {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 4); 4])
                .split(row);
            for (cell, (title, value)) in cells.iter().zip(chunk) {
                let value_style = if self.stats.is_some() {
                    Style::default().fg(t.fg).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(t.muted)
                };
                let card = Paragraph::new(vec![Line::default(), Line::styled(value.clone(), value_style)])
                    .alignment(Alignment::Center)
                    .block(
                        Block::default()
                            .title(format!(" {} ", title))
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(t.border)),
                    );
                frame.render_widget(card, *cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_preset_ranges() {
        let today = day(2024, 3, 15);
        assert_eq!(RangePreset::AllTime.range(today), DateRange::all_time());

        let week = RangePreset::Last7Days.range(today);
        assert_eq!(week.start(), Some(day(2024, 3, 9)));
        assert_eq!(week.end(), Some(today));

        let month = RangePreset::ThisMonth.range(today);
        assert_eq!(month.start(), Some(day(2024, 3, 1)));
        assert_eq!(
            RangePreset::Last30Days.range(today).start(),
            Some(day(2024, 2, 15))
        );
    }

    #[test]
    fn test_cycle_wraps_to_all_time() {
        let mut view = DashboardView::new("NGN");
        let today = day(2024, 3, 15);
        for _ in 0..3 {
            view.cycle_preset(today);
        }
        assert_eq!(view.preset(), RangePreset::ThisMonth);
        assert_eq!(
            view.cycle_preset(today),
            DashboardAction::RangeChanged(DateRange::all_time())
        );
    }

    #[test]
    fn test_stale_stats_are_dropped() {
        let mut view = DashboardView::new("NGN");
        let all_time = view.range();
        view.cycle_preset(day(2024, 3, 15));

        let stats = MerchantStats {
            total_orders: 4.0,
            ..MerchantStats::default()
        };
        assert!(!view.set_stats(all_time, stats));
        assert!(view.stats().is_none());
        assert!(view.set_stats(view.range(), stats));
        assert_eq!(view.stats().map(|s| s.total_orders), Some(4.0));
    }

    #[test]
    fn test_render_cards() {
        let mut view = DashboardView::new("NGN");
        view.set_stats(
            DateRange::all_time(),
            MerchantStats {
                total_amount: 1_234_567.5,
                total_orders: 12.0,
                ..MerchantStats::default()
            },
        );
        let mut terminal = Terminal::new(TestBackend::new(120, 12)).unwrap();
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("NGN 1,234,567.50"));
        assert!(text.contains("All time"));
        assert!(text.contains("12"));
    }
}
