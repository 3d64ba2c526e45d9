//! Page arithmetic and the page-number control.
//!
//! Pages are 1-indexed. The button range always contains the first and last
//! pages, `sibling_count` pages on each side of the current one, and ellipses
//! where pages are skipped.

use std::ops::Range;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::theme::theme;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default number of page buttons shown beside the current page.
pub const DEFAULT_SIBLING_COUNT: usize = 1;

/// One entry in the page-number control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    /// A clickable page number.
    Page(usize),
    /// A gap of one or more skipped pages.
    Ellipsis,
}

/// A clickable part of the rendered page control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    Previous,
    Next,
    Page(usize),
}

/// Pagination state owned by a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    page_size: usize,
    sibling_count: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_SIBLING_COUNT)
    }
}

impl Pagination {
    /// Create pagination state on page 1. A zero page size is treated as 1.
    pub fn new(page_size: usize, sibling_count: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            sibling_count,
        }
    }

    /// The current 1-indexed page. May point past the last page.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Page buttons shown on each side of the current page.
    pub fn sibling_count(&self) -> usize {
        self.sibling_count
    }

    /// Number of pages for `total_rows` rows; at least 1.
    pub fn total_pages(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size).max(1)
    }

    /// Index range of the visible slice, clamped to `total_rows`.
    ///
    /// The range is empty when the current page lies past the end.
    pub fn slice_range(&self, total_rows: usize) -> Range<usize> {
        let start = (self.current_page - 1).saturating_mul(self.page_size);
        let end = start.saturating_add(self.page_size).min(total_rows);
        start.min(end)..end
    }

    /// Number of rows visible on the current page.
    pub fn visible_rows(&self, total_rows: usize) -> usize {
        self.slice_range(total_rows).len()
    }

    /// Jump to `page`, clamped to `[1, total_pages]`.
    pub fn go_to_page(&mut self, page: usize, total_rows: usize) {
        self.current_page = page.clamp(1, self.total_pages(total_rows));
    }

    /// Move to the next page, if any.
    pub fn next_page(&mut self, total_rows: usize) {
        self.go_to_page(self.current_page.saturating_add(1), total_rows);
    }

    /// Move to the previous page, if any.
    pub fn prev_page(&mut self, total_rows: usize) {
        self.go_to_page(self.current_page.saturating_sub(1), total_rows);
    }

    /// Jump to the first page.
    pub fn first_page(&mut self) {
        self.current_page = 1;
    }

    /// Jump to the last page.
    pub fn last_page(&mut self, total_rows: usize) {
        self.current_page = self.total_pages(total_rows);
    }

    /// Compute the page-number buttons for `total_rows` rows.
    pub fn page_items(&self, total_rows: usize) -> Vec<PageItem> {
        page_items(
            self.current_page,
            self.total_pages(total_rows),
            self.sibling_count,
        )
    }

    /// Render the page-number control, centered in `area`.
    ///
    /// Returns where each clickable target was drawn so clicks can be mapped
    /// back to pages.
    pub fn render(&self, frame: &mut Frame, area: Rect, total_rows: usize) -> Vec<(Rect, PageTarget)> {
        let t = theme();
        let total_pages = self.total_pages(total_rows);

        let mut spans = vec![(
            Span::styled("‹ ", Style::default().fg(t.muted)),
            Some(PageTarget::Previous),
        )];
        for item in self.page_items(total_rows) {
            let span = match item {
                PageItem::Page(page) if page == self.current_page => Span::styled(
                    format!("[{}]", page),
                    Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
                ),
                PageItem::Page(page) => Span::styled(format!(" {} ", page), Style::default().fg(t.fg)),
                PageItem::Ellipsis => Span::styled(" … ", Style::default().fg(t.muted)),
            };
            let target = match item {
                PageItem::Page(page) => Some(PageTarget::Page(page)),
                PageItem::Ellipsis => None,
            };
            spans.push((span, target));
        }
        spans.push((Span::styled(" ›", Style::default().fg(t.muted)), Some(PageTarget::Next)));
        spans.push((
            Span::styled(
                format!("   page {} of {}", self.current_page, total_pages),
                Style::default().fg(t.muted),
            ),
            None,
        ));

        let width: u16 = spans.iter().map(|(span, _)| span.width() as u16).sum();
        let line_area = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y,
            width.min(area.width),
            area.height.min(1),
        );

        let mut targets = Vec::new();
        let mut x = line_area.x;
        for (span, target) in &spans {
            let span_width = span.width() as u16;
            if let Some(target) = target {
                let hit = Rect::new(x, line_area.y, span_width, 1).intersection(line_area);
                if !hit.is_empty() {
                    targets.push((hit, *target));
                }
            }
            x = x.saturating_add(span_width);
        }

        let line = Line::from(spans.into_iter().map(|(span, _)| span).collect::<Vec<_>>());
        frame.render_widget(Paragraph::new(line), line_area);
        targets
    }
}

/// Compute the page-number buttons.
///
/// When all pages fit (`sibling_count + 5` slots: first, last, current, two
/// ellipses) every page is listed. Otherwise the first and last pages are kept
/// and skipped runs collapse into an ellipsis. A current page past the end is
/// treated as the last page for the purposes of the window.
pub fn page_items(current_page: usize, total_pages: usize, sibling_count: usize) -> Vec<PageItem> {
    let total_pages = total_pages.max(1);
    let slots = sibling_count + 5;

    if slots >= total_pages {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let current = current_page.clamp(1, total_pages);
    let left_sibling = current.saturating_sub(sibling_count).max(1);
    let right_sibling = (current + sibling_count).min(total_pages);

    let show_left_dots = left_sibling > 2;
    let show_right_dots = right_sibling + 2 < total_pages;

    let edge_count = 3 + 2 * sibling_count;
    let mut items = Vec::with_capacity(slots + 2);

    match (show_left_dots, show_right_dots) {
        (false, false) => items.extend((1..=total_pages).map(PageItem::Page)),
        (false, true) if edge_count + 1 >= total_pages => {
            items.extend((1..=total_pages).map(PageItem::Page))
        }
        (true, false) if total_pages <= edge_count + 1 => {
            items.extend((1..=total_pages).map(PageItem::Page))
        }
        (false, true) => {
            items.extend((1..=edge_count).map(PageItem::Page));
            items.push(PageItem::Ellipsis);
            items.push(PageItem::Page(total_pages));
        }
        (true, false) => {
            items.push(PageItem::Page(1));
            items.push(PageItem::Ellipsis);
            items.extend((total_pages - edge_count + 1..=total_pages).map(PageItem::Page));
        }
        (true, true) => {
            items.push(PageItem::Page(1));
            items.push(PageItem::Ellipsis);
            items.extend((left_sibling..=right_sibling).map(PageItem::Page));
            items.push(PageItem::Ellipsis);
            items.push(PageItem::Page(total_pages));
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Ellipsis, Page};

    #[test]
    fn test_total_pages() {
        let p = Pagination::new(10, 1);
        assert_eq!(p.total_pages(0), 1);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
        assert_eq!(p.total_pages(25), 3);
    }

    #[test]
    fn test_zero_page_size_treated_as_one() {
        let p = Pagination::new(0, 1);
        assert_eq!(p.page_size(), 1);
        assert_eq!(p.total_pages(3), 3);
    }

    #[test]
    fn test_visible_rows_on_each_page() {
        let mut p = Pagination::new(10, 1);
        assert_eq!(p.visible_rows(25), 10);
        p.go_to_page(2, 25);
        assert_eq!(p.visible_rows(25), 10);
        p.go_to_page(3, 25);
        assert_eq!(p.slice_range(25), 20..25);
        assert_eq!(p.visible_rows(25), 5);
    }

    #[test]
    fn test_page_past_end_is_empty_slice() {
        let mut p = Pagination::new(10, 1);
        p.go_to_page(3, 25);
        assert!(p.slice_range(5).is_empty());
        assert_eq!(p.visible_rows(5), 0);
        assert!(p.current_page() > p.total_pages(5));
        assert_eq!(p.current_page(), 3);
    }

    #[test]
    fn test_visible_rows_formula_holds() {
        for n in 0..40usize {
            for size in 1..7usize {
                let p0 = Pagination::new(size, 1);
                for page in 1..=p0.total_pages(n) + 2 {
                    let mut p = p0;
                    // Plenty of rows so the jump is not clamped
                    p.go_to_page(page, page * size);
                    let expected = n.saturating_sub((page - 1) * size).min(size);
                    assert_eq!(p.visible_rows(n), expected, "n={} size={} page={}", n, size, page);
                }
            }
        }
    }

    #[test]
    fn test_go_to_page_clamps() {
        let mut p = Pagination::new(10, 1);
        p.go_to_page(99, 25);
        assert_eq!(p.current_page(), 3);
        p.go_to_page(0, 25);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn test_prev_from_past_end_clamps_to_last() {
        let mut p = Pagination::new(10, 1);
        p.go_to_page(3, 25);
        p.prev_page(5);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn test_next_and_last() {
        let mut p = Pagination::new(10, 1);
        p.next_page(25);
        assert_eq!(p.current_page(), 2);
        p.next_page(25);
        p.next_page(25);
        assert_eq!(p.current_page(), 3);
        p.first_page();
        assert_eq!(p.current_page(), 1);
        p.last_page(25);
        assert_eq!(p.current_page(), 3);
    }

    #[test]
    fn test_page_items_all_fit() {
        assert_eq!(page_items(1, 1, 1), vec![Page(1)]);
        assert_eq!(
            page_items(2, 5, 1),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5)]
        );
    }

    #[test]
    fn test_page_items_right_dots() {
        assert_eq!(
            page_items(1, 10, 1),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_page_items_left_dots() {
        assert_eq!(
            page_items(10, 10, 1),
            vec![Page(1), Ellipsis, Page(6), Page(7), Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn test_page_items_both_dots() {
        assert_eq!(
            page_items(5, 10, 1),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_page_items_wider_siblings() {
        assert_eq!(
            page_items(10, 20, 2),
            vec![
                Page(1),
                Ellipsis,
                Page(8),
                Page(9),
                Page(10),
                Page(11),
                Page(12),
                Ellipsis,
                Page(20)
            ]
        );
    }

    #[test]
    fn test_page_items_always_has_first_and_last() {
        for siblings in 0..5 {
            for total in 1..30 {
                for current in 1..=total {
                    let items = page_items(current, total, siblings);
                    assert_eq!(items.first(), Some(&Page(1)));
                    assert_eq!(items.last(), Some(&Page(total)));
                    assert!(items.contains(&Page(current)));
                    assert_ne!(items.get(1), Some(&Page(1)));
                }
            }
        }
    }

    #[test]
    fn test_page_items_no_gap_on_either_side() {
        assert_eq!(
            page_items(4, 8, 2),
            (1..=8).map(Page).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_page_items_past_end_window_uses_last_page() {
        assert_eq!(
            page_items(15, 10, 1),
            vec![Page(1), Ellipsis, Page(6), Page(7), Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn test_render_reports_click_targets() {
        use ratatui::{backend::TestBackend, Terminal};

        let p = Pagination::new(10, 1);
        let mut terminal = Terminal::new(TestBackend::new(60, 1)).unwrap();
        let mut targets = Vec::new();
        terminal
            .draw(|f| targets = p.render(f, f.area(), 25))
            .unwrap();

        let line: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        let (area, _) = targets
            .iter()
            .find(|(_, target)| *target == PageTarget::Page(3))
            .unwrap();
        let drawn: String = line.chars().skip(area.x as usize).take(area.width as usize).collect();
        assert_eq!(drawn, " 3 ");
        assert_eq!(targets.first().map(|(_, t)| *t), Some(PageTarget::Previous));
        assert_eq!(targets.last().map(|(_, t)| *t), Some(PageTarget::Next));
    }
}
