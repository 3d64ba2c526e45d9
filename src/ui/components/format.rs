//! Cell formatters for the paged table.
//!
//! Every formatter is pure and total: any JSON value, including `null` for a
//! missing field, yields a renderable line. Malformed input falls back to an
//! empty or zero default instead of failing.

use std::fmt::{self, Write};
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use serde_json::Value;

use crate::ui::theme::theme;

/// Default display pattern for dates, e.g. `Feb 23, 2024`.
pub const DEFAULT_DATE_FORMAT: &str = "%b %d, %Y";

/// Text shown for date values that cannot be parsed.
pub const INVALID_DATE: &str = "Invalid date";

/// A column formatter mapping a raw field value to a rendered cell.
#[derive(Clone)]
pub struct Formatter(Arc<dyn Fn(&Value) -> Line<'static> + Send + Sync>);

impl Formatter {
    /// Wrap a formatting function.
    pub fn new(f: impl Fn(&Value) -> Line<'static> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Wrap a function producing plain text.
    pub fn text(f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        Self::new(move |value| Line::from(f(value)))
    }

    /// Format a value.
    pub fn apply(&self, value: &Value) -> Line<'static> {
        (self.0)(value)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Formatter(..)")
    }
}

/// Flatten a rendered line to its text content.
pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}

/// Render a raw value as text, the fallback when a column has no formatter.
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Read a value as a number. Accepts JSON numbers and numeric strings,
/// tolerating thousands separators.
pub fn number_from(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Group an absolute amount with thousands separators and two decimals.
fn group_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}.{}", grouped, cents)
}

/// Format a value as money, e.g. `NGN 1,500.00`.
///
/// Non-numeric values format as zero.
pub fn format_currency(code: &str, value: &Value) -> String {
    let amount = number_from(value).unwrap_or(0.0);
    let sign = if amount < 0.0 && group_amount(amount) != "0.00" {
        "-"
    } else {
        ""
    };
    format!("{}{} {}", sign, code, group_amount(amount))
}

/// Currency column formatter.
pub fn currency(code: impl Into<String>) -> Formatter {
    let code = code.into();
    Formatter::text(move |value| format_currency(&code, value))
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt);
        }
    }
    for pattern in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, pattern) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn is_valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Format a date value with a strftime pattern.
///
/// Accepts RFC 3339 strings, `YYYY-MM-DD[ HH:MM:SS]`, `DD/MM/YYYY` and Unix
/// timestamps in seconds. `null` and empty strings render empty; anything
/// else that does not parse renders as [`INVALID_DATE`].
pub fn format_date(pattern: &str, value: &Value) -> String {
    let pattern = if is_valid_pattern(pattern) {
        pattern
    } else {
        DEFAULT_DATE_FORMAT
    };

    let parsed = match value {
        Value::Null => return String::new(),
        Value::String(s) if s.trim().is_empty() => return String::new(),
        Value::String(s) => parse_datetime(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        _ => None,
    };

    let Some(dt) = parsed else {
        return INVALID_DATE.to_string();
    };

    // Offset specifiers such as %z have nothing to print for a naive value.
    let mut out = String::new();
    if write!(out, "{}", dt.format(pattern)).is_err() {
        return dt.format(DEFAULT_DATE_FORMAT).to_string();
    }
    out
}

/// Date column formatter.
pub fn date(pattern: impl Into<String>) -> Formatter {
    let pattern = pattern.into();
    Formatter::text(move |value| format_date(&pattern, value))
}

/// Capitalize the first letter of every word.
pub fn capitalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            if ch.is_whitespace() || ch == '_' || ch == '-' {
                at_word_start = true;
            }
            out.push(ch);
        }
    }
    out
}

/// Color for a status word.
pub fn status_color(status: &str) -> Color {
    let t = theme();
    match status.to_lowercase().as_str() {
        "delivered" | "received" | "active" | "completed" | "paid" => t.success,
        "accepted" | "shipped" | "pending" | "processing" => t.warning,
        "cancelled" | "canceled" | "failed" | "inactive" | "returned" => t.danger,
        _ => t.fg,
    }
}

/// Capitalized, colored status badge.
pub fn badge() -> Formatter {
    Formatter::new(|value| {
        let text = plain_text(value);
        if text.is_empty() {
            return Line::default();
        }
        Line::from(Span::styled(
            format!(" {} ", capitalize(&text)),
            Style::default()
                .fg(status_color(&text))
                .add_modifier(Modifier::BOLD),
        ))
    })
}

/// Plain text with every word capitalized.
pub fn capitalized() -> Formatter {
    Formatter::text(|value| capitalize(&plain_text(value)))
}

/// Integer count, treating non-numeric input as zero.
pub fn quantity() -> Formatter {
    Formatter::text(|value| {
        let n = number_from(value).unwrap_or(0.0);
        format!("{}", n.trunc() as i64)
    })
}
