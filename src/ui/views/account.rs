//! Account tab: the merchant's profile as the backend has it.
//!
//! Read-only. The record is looked up by the wallet number configured on the
//! profile; without one only the local profile is shown.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde_json::Value;

use crate::api::types::MerchantDetails;
use crate::config::Settings;
use crate::session::Session;
use crate::ui::components::format::{badge, capitalize, format_date};
use crate::ui::theme::theme;

#[derive(Debug)]
pub struct AccountView {
    merchant: Option<MerchantDetails>,
    failed: bool,
    date_format: String,
}

impl AccountView {
    pub fn new(settings: &Settings) -> Self {
        Self {
            merchant: None,
            failed: false,
            date_format: settings.date_format.clone(),
        }
    }

    pub fn set_merchant(&mut self, merchant: MerchantDetails) {
        self.merchant = Some(merchant);
        self.failed = false;
    }

    /// Keep whatever was shown before and note that the reload failed.
    pub fn set_failed(&mut self) {
        self.failed = true;
    }

    fn header(&self, session: &Session) -> Vec<Line<'static>> {
        let t = theme();
        let Some(m) = &self.merchant else {
            return vec![Line::styled(
                session.display_name().to_string(),
                Style::default().fg(t.fg).add_modifier(Modifier::BOLD),
            )];
        };
        vec![
            Line::from(vec![
                Span::styled(
                    format!(" {} ", m.initials()),
                    Style::default().fg(Color::Black).bg(t.accent).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(m.names.clone(), Style::default().fg(t.fg).add_modifier(Modifier::BOLD)),
            ]),
            Line::styled(
                format!("{}, {}", m.merchant_business_name, m.phonenumber),
                Style::default().fg(t.muted),
            ),
        ]
    }

    fn fields(&self, session: &Session) -> Vec<Line<'static>> {
        let t = theme();
        let label = Style::default().fg(t.muted).add_modifier(Modifier::BOLD);
        let row = |name: &str, value: String| {
            Line::from(vec![Span::styled(format!("{:>16}  ", name), label), Span::raw(value)])
        };

        let mut lines = vec![
            row("Profile", session.profile_name().to_string()),
            row("Merchant ID", session.merchant_id().to_string()),
        ];
        match &self.merchant {
            Some(m) => {
                lines.push(row("Business name", m.merchant_business_name.clone()));
                lines.push(row("Email", m.email.clone()));
                lines.push(row("Phone number", m.phonenumber.clone()));
                lines.push(row("Address", m.address.clone()));
                lines.push(row("Gender", capitalize(&m.gender)));
                lines.push(row("Account number", m.providus_account_no.clone()));
                lines.push(row(
                    "Registered",
                    format_date(&self.date_format, &Value::from(m.registered_at.as_str())),
                ));
                let mut status = vec![Span::styled(format!("{:>16}  ", "Status"), label)];
                status.extend(badge().apply(&Value::from(m.active_status.as_str())).spans);
                lines.push(status.into());
            }
            None if session.wallet_number().is_none() => {
                lines.push(Line::default());
                lines.push(Line::styled(
                    format!(
                        "Set wallet_number on profile '{}' to load account details",
                        session.profile_name()
                    ),
                    Style::default().fg(t.warning),
                ));
            }
            None if !self.failed => {
                lines.push(Line::default());
                lines.push(Line::styled("Loading account…", Style::default().fg(t.muted)));
            }
            None => {}
        }
        if self.failed {
            lines.push(Line::default());
            lines.push(Line::styled(
                "Could not load account details",
                Style::default().fg(t.danger),
            ));
        }
        lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, session: &Session) {
        let t = theme();
        let header = self.header(session);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(header.len() as u16 + 1), Constraint::Min(0)])
            .split(area);

        frame.render_widget(Paragraph::new(header), chunks[0]);
        frame.render_widget(
            Paragraph::new(self.fields(session)).block(
                Block::default()
                    .title(" Profile info ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(t.border)),
            ),
            chunks[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(view: &AccountView, session: &Session) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| view.render(f, f.area(), session)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn merchant() -> MerchantDetails {
        MerchantDetails {
            merchant_id: "9".to_string(),
            names: "Aisha Bello".to_string(),
            merchant_business_name: "Barakah Foods".to_string(),
            phonenumber: "08030000000".to_string(),
            email: "aisha@barakah.test".to_string(),
            active_status: "active".to_string(),
            ..MerchantDetails::default()
        }
    }

    #[test]
    fn test_without_wallet_number_explains_setup() {
        let view = AccountView::new(&Settings::default());
        let text = screen(&view, &Session::new("shop", 9));
        assert!(text.contains("Set wallet_number on profile 'shop'"));
        assert!(text.contains("Merchant ID"));
    }

    #[test]
    fn test_renders_merchant_details() {
        let profile = Profile::new("shop", "https://api.halalnest.test", 9).with_wallet_number("0123");
        let session = Session::from_profile(&profile);
        let mut view = AccountView::new(&Settings::default());
        assert!(screen(&view, &session).contains("Loading account"));

        view.set_merchant(merchant());
        let text = screen(&view, &session);
        assert!(text.contains(" AB "));
        assert!(text.contains("Barakah Foods, 08030000000"));
        assert!(text.contains("aisha@barakah.test"));
        assert!(text.contains("Active"));
    }

    #[test]
    fn test_failed_reload_keeps_last_details() {
        let mut view = AccountView::new(&Settings::default());
        view.set_merchant(merchant());
        view.set_failed();
        let text = screen(&view, &Session::new("shop", 9));
        assert!(text.contains("Aisha Bello"));
        assert!(text.contains("Could not load account details"));
    }
}
