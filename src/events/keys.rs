//! Key binding definitions.
//!
//! The single source for the help bar hints and the full help panel.

/// Where keyboard input is currently routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    Global,
    Dashboard,
    Table,
    Orders,
    Categories,
    Subcategories,
    Account,
    RowMenu,
    Search,
    Confirm,
    Detail,
    OrderDetail,
    TrackOrder,
    Help,
    ErrorDialog,
}

impl KeyContext {
    /// Section title in the help panel.
    pub fn display(&self) -> &'static str {
        match self {
            KeyContext::Global => "Global",
            KeyContext::Dashboard => "Dashboard",
            KeyContext::Table => "Tables",
            KeyContext::Orders => "Orders",
            KeyContext::Categories => "Categories",
            KeyContext::Subcategories => "Subcategories",
            KeyContext::Account => "Account",
            KeyContext::RowMenu => "Row Menu",
            KeyContext::Search => "Search",
            KeyContext::Confirm => "Confirm Dialog",
            KeyContext::Detail => "Detail Panel",
            KeyContext::OrderDetail => "Order Panel",
            KeyContext::TrackOrder => "Track Order",
            KeyContext::Help => "Help",
            KeyContext::ErrorDialog => "Error Dialog",
        }
    }

    /// Whether tab switching, refresh, help and quit keys apply here.
    pub fn allows_global_keys(&self) -> bool {
        matches!(
            self,
            KeyContext::Global
                | KeyContext::Dashboard
                | KeyContext::Table
                | KeyContext::Orders
                | KeyContext::Categories
                | KeyContext::Subcategories
                | KeyContext::Account
        )
    }
}

/// A documented key binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinding {
    pub key: String,
    pub description: String,
    pub context: KeyContext,
}

impl Keybinding {
    fn new(key: &str, description: &str, context: KeyContext) -> Self {
        Self {
            key: key.to_string(),
            description: description.to_string(),
            context,
        }
    }
}

/// Every documented binding.
pub fn get_keybindings() -> Vec<Keybinding> {
    use KeyContext::*;
    vec![
        Keybinding::new("1-5", "Dashboard, Products, Orders, Categories, Account", Global),
        Keybinding::new("Tab", "Next tab", Global),
        Keybinding::new("r", "Refresh the current tab", Global),
        Keybinding::new("?", "Toggle this help", Global),
        Keybinding::new("q / Ctrl+C", "Quit", Global),
        Keybinding::new("d", "Cycle the reporting period", Dashboard),
        Keybinding::new("j / k", "Move selection", Table),
        Keybinding::new("h / l", "Previous / next page", Table),
        Keybinding::new("g / G", "First / last page", Table),
        Keybinding::new("click", "Jump to a page in the pager", Table),
        Keybinding::new("Enter", "Open the row menu", Table),
        Keybinding::new("e", "Show the selected row", Table),
        Keybinding::new("d / Del", "Delete the selected row", Table),
        Keybinding::new("Space / t", "Toggle product status", Table),
        Keybinding::new("/", "Search", Table),
        Keybinding::new("o", "Open order details and history", Orders),
        Keybinding::new("s", "Advance order status", Orders),
        Keybinding::new("f", "Cycle order status filter", Orders),
        Keybinding::new("t", "Track an order by reference", Orders),
        Keybinding::new("o", "Show subcategories", Categories),
        Keybinding::new("d / Del", "Delete the selected subcategory", Subcategories),
        Keybinding::new("Esc", "Back to categories", Subcategories),
        Keybinding::new("r", "Reload account details", Account),
        Keybinding::new("j / k", "Choose an entry", RowMenu),
        Keybinding::new("Enter", "Run the entry", RowMenu),
        Keybinding::new("Esc", "Close the menu", RowMenu),
        Keybinding::new("Enter", "Keep the query", Search),
        Keybinding::new("Esc", "Clear the query", Search),
        Keybinding::new("Tab / ← →", "Switch button", Confirm),
        Keybinding::new("Enter", "Press the focused button", Confirm),
        Keybinding::new("y / n", "Confirm / cancel", Confirm),
        Keybinding::new("Esc", "Close the panel", Detail),
        Keybinding::new("j / k", "Scroll", OrderDetail),
        Keybinding::new("Esc", "Close the panel", OrderDetail),
        Keybinding::new("Enter", "Look up the reference", TrackOrder),
        Keybinding::new("Esc", "Close", TrackOrder),
        Keybinding::new("j / k", "Scroll", Help),
        Keybinding::new("g / G", "Top / bottom", Help),
        Keybinding::new("? / Esc", "Close help", Help),
    ]
}

/// Bindings grouped by context, in first-seen order.
pub fn get_keybindings_grouped() -> Vec<(KeyContext, Vec<Keybinding>)> {
    let mut grouped: Vec<(KeyContext, Vec<Keybinding>)> = Vec::new();
    for binding in get_keybindings() {
        match grouped.iter_mut().find(|(ctx, _)| *ctx == binding.context) {
            Some((_, list)) => list.push(binding),
            None => grouped.push((binding.context, vec![binding])),
        }
    }
    grouped
}

/// The single-line hint text for a context.
pub fn get_context_hints(context: KeyContext) -> &'static str {
    match context {
        KeyContext::Global | KeyContext::Dashboard => {
            "[1-5] tabs  [d] period  [r] refresh  [?] help  [q] quit"
        }
        KeyContext::Table => {
            "[j/k] row  [h/l] page  [Enter] menu  [e] view  [d] delete  [/] search  [?] help"
        }
        KeyContext::Orders => {
            "[j/k] row  [h/l] page  [o] details  [s] advance  [f] filter  [t] track  [/] search"
        }
        KeyContext::Categories => {
            "[j/k] row  [h/l] page  [o] subcategories  [Enter] menu  [d] delete  [/] search"
        }
        KeyContext::Subcategories => "[j/k] row  [Enter] menu  [d] delete  [Esc] categories",
        KeyContext::Account => "[1-5] tabs  [r] reload  [?] help  [q] quit",
        KeyContext::RowMenu => "[j/k] choose  [Enter] select  [Esc] close",
        KeyContext::Search => "[Enter] apply  [Esc] clear",
        KeyContext::Confirm => "[Tab] switch  [Enter] activate  [y] confirm  [n/Esc] cancel",
        KeyContext::Detail => "[Esc] back",
        KeyContext::OrderDetail => "[j/k] scroll  [Esc] close",
        KeyContext::TrackOrder => "[Enter] track  [Esc] close",
        KeyContext::Help => "[j/k] scroll  [g/G] top/bottom  [Esc/q] close",
        KeyContext::ErrorDialog => "[Enter/Esc] dismiss",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [KeyContext; 15] = [
        KeyContext::Global,
        KeyContext::Dashboard,
        KeyContext::Table,
        KeyContext::Orders,
        KeyContext::Categories,
        KeyContext::Subcategories,
        KeyContext::Account,
        KeyContext::RowMenu,
        KeyContext::Search,
        KeyContext::Confirm,
        KeyContext::Detail,
        KeyContext::OrderDetail,
        KeyContext::TrackOrder,
        KeyContext::Help,
        KeyContext::ErrorDialog,
    ];

    #[test]
    fn test_every_context_has_hints() {
        for context in ALL {
            assert!(get_context_hints(context).starts_with('['));
        }
    }

    #[test]
    fn test_table_hints_mention_delete() {
        assert!(get_context_hints(KeyContext::Table).contains("[d] delete"));
    }

    #[test]
    fn test_overlays_block_global_keys() {
        for context in [
            KeyContext::RowMenu,
            KeyContext::Search,
            KeyContext::Confirm,
            KeyContext::Detail,
            KeyContext::OrderDetail,
            KeyContext::TrackOrder,
            KeyContext::Help,
            KeyContext::ErrorDialog,
        ] {
            assert!(!context.allows_global_keys(), "{:?}", context);
        }
        assert!(KeyContext::Orders.allows_global_keys());
        assert!(KeyContext::Subcategories.allows_global_keys());
    }

    #[test]
    fn test_grouping_preserves_order_and_count() {
        let grouped = get_keybindings_grouped();
        assert_eq!(grouped[0].0, KeyContext::Global);
        let total: usize = grouped.iter().map(|(_, b)| b.len()).sum();
        assert_eq!(total, get_keybindings().len());
        assert!(grouped
            .iter()
            .all(|(ctx, bindings)| bindings.iter().all(|b| b.context == *ctx)));
    }
}
