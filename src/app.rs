//! Main application state and event loop.
//!
//! This module implements The Elm Architecture (TEA) pattern: every input
//! flows through [`App::update`] or [`App::handle_api_message`], and
//! [`App::view`] draws the current state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs},
    Frame,
};
use tracing::{debug, info, trace, warn};

use crate::api::types::DateRange;
use crate::api::HalalNestClient;
use crate::config::Settings;
use crate::error::AppError;
use crate::events::{Event, KeyContext};
use crate::session::Session;
use crate::tasks::{ApiMessage, TaskSpawner};
use crate::ui::theme::theme;
use crate::ui::{
    render_context_help, AccountView, CategoriesAction, CategoriesView, DashboardAction, DashboardView,
    ErrorDialog, HelpAction, HelpView, LoadingIndicator, NotificationManager, OrdersAction,
    OrdersView, ProductsAction, ProductsView, STATUS_ACTIVE,
};

/// The dashboard tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Products,
    Orders,
    Categories,
    Account,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Products,
        Tab::Orders,
        Tab::Categories,
        Tab::Account,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Products => "Products",
            Tab::Orders => "Orders",
            Tab::Categories => "Categories",
            Tab::Account => "Account",
        }
    }

    fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    /// Tab for a digit key `1`-`5`.
    fn from_digit(c: char) -> Option<Tab> {
        let n = c.to_digit(10)? as usize;
        Tab::ALL.get(n.checked_sub(1)?).copied()
    }
}

/// The main application struct that holds all state.
///
/// This implements the Model part of The Elm Architecture (TEA).
pub struct App {
    tab: Tab,
    should_quit: bool,
    show_help: bool,
    session: Session,
    /// HTTP client and task spawner; absent when running without a backend.
    client: Option<HalalNestClient>,
    spawner: Option<TaskSpawner>,
    dashboard: DashboardView,
    products: ProductsView,
    orders: OrdersView,
    categories: CategoriesView,
    account: AccountView,
    help: HelpView,
    notifications: NotificationManager,
    error_dialog: ErrorDialog,
    loading: LoadingIndicator,
    /// Requests sent and not yet answered.
    pending: usize,
}

impl App {
    /// Create an application for `session` with no backend attached.
    pub fn new(session: Session, settings: &Settings) -> Self {
        debug!(profile = %session.profile_name(), merchant_id = session.merchant_id(), "Creating application");
        Self {
            tab: Tab::Dashboard,
            should_quit: false,
            show_help: false,
            session,
            client: None,
            spawner: None,
            dashboard: DashboardView::new(settings.currency.clone()),
            products: ProductsView::new(settings),
            orders: OrdersView::new(settings),
            categories: CategoriesView::new(settings),
            account: AccountView::new(settings),
            help: HelpView::new(),
            notifications: NotificationManager::new(),
            error_dialog: ErrorDialog::new(),
            loading: LoadingIndicator::new(),
            pending: 0,
        }
    }

    /// Attach the API client and the spawner its requests run on.
    pub fn with_backend(mut self, client: HalalNestClient, spawner: TaskSpawner) -> Self {
        self.client = Some(client);
        self.spawner = Some(spawner);
        self
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    pub fn is_error_dialog_visible(&self) -> bool {
        self.error_dialog.is_visible()
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_active()
    }

    pub fn products(&self) -> &ProductsView {
        &self.products
    }

    pub fn orders(&self) -> &OrdersView {
        &self.orders
    }

    pub fn categories(&self) -> &CategoriesView {
        &self.categories
    }

    pub fn dashboard(&self) -> &DashboardView {
        &self.dashboard
    }

    /// Fetch the data of every tab.
    pub fn load_all(&mut self) {
        info!(merchant_id = self.session.merchant_id(), "Loading merchant data");
        for tab in Tab::ALL {
            self.refresh(tab);
        }
    }

    /// Re-fetch the data behind `tab`.
    pub fn refresh(&mut self, tab: Tab) {
        let merchant_id = self.session.merchant_id();
        let range = self.dashboard.range();
        let wallet_number = self.session.wallet_number().map(str::to_string);
        if tab == Tab::Account && wallet_number.is_none() {
            debug!("No wallet number configured, account lookup skipped");
            return;
        }
        let started = self.with_backend_do(|client, spawner| match tab {
            Tab::Dashboard => spawner.spawn_fetch_stats(client, merchant_id, range),
            Tab::Products => spawner.spawn_fetch_products(client, merchant_id),
            Tab::Orders => spawner.spawn_fetch_orders(client, merchant_id),
            Tab::Categories => spawner.spawn_fetch_categories(client),
            Tab::Account => {
                if let Some(wallet_number) = wallet_number {
                    spawner.spawn_fetch_merchant_details(client, wallet_number)
                }
            }
        });
        if started {
            self.begin_request(format!("Loading {}...", tab.title().to_lowercase()));
        }
        if tab == Tab::Categories {
            if let Some(category_id) = self.categories.open_category() {
                self.fetch_subcategories(category_id);
            }
        }
    }

    fn fetch_subcategories(&mut self, category_id: u64) {
        if self.with_backend_do(|client, spawner| spawner.spawn_fetch_subcategories(client, category_id)) {
            self.begin_request("Loading subcategories...");
        }
    }

    /// Run `f` with the client and spawner, returning whether it ran.
    fn with_backend_do(&self, f: impl FnOnce(&HalalNestClient, &TaskSpawner)) -> bool {
        match (&self.client, &self.spawner) {
            (Some(client), Some(spawner)) => {
                f(client, spawner);
                true
            }
            _ => {
                debug!("No backend attached, request skipped");
                false
            }
        }
    }

    fn begin_request(&mut self, message: impl Into<String>) {
        self.pending += 1;
        self.loading.start_with_message(message);
    }

    fn end_request(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        if self.pending == 0 {
            self.loading.stop();
        }
    }

    /// Show an error: critical ones in a dialog, others as a toast.
    pub fn handle_error(&mut self, error: &AppError) {
        if error.is_critical() {
            warn!(error = %error, "Critical error occurred");
            self.error_dialog.show(error);
        } else {
            debug!(error = %error, "Recoverable error occurred");
            self.notifications.error(error.user_message());
        }
    }

    /// Where keyboard input is currently routed.
    pub fn key_context(&self) -> KeyContext {
        if self.error_dialog.is_visible() {
            return KeyContext::ErrorDialog;
        }
        if self.show_help {
            return KeyContext::Help;
        }
        match self.tab {
            Tab::Dashboard => KeyContext::Dashboard,
            Tab::Products => self.products.key_context(),
            Tab::Orders => self.orders.key_context(),
            Tab::Categories => self.categories.key_context(),
            Tab::Account => KeyContext::Account,
        }
    }

    /// Whether the active tab is holding keys for an overlay or search.
    fn tab_is_capturing(&self) -> bool {
        !self.key_context().allows_global_keys()
    }

    /// Update the application state based on an event.
    ///
    /// This implements the Update part of The Elm Architecture (TEA).
    pub fn update(&mut self, event: Event) {
        match event {
            Event::Quit => {
                info!("Quit event received");
                self.should_quit = true;
            }
            Event::Key(key_event) => {
                trace!(key = ?key_event.code, modifiers = ?key_event.modifiers, "Key event");
                self.handle_key_event(key_event);
            }
            Event::Click(column, row) => {
                trace!(column, row, "Click event");
                self.handle_click(column, row);
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
            }
            Event::Tick => {
                self.loading.tick();
                self.notifications.tick();
            }
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        if self.error_dialog.is_visible() {
            if matches!(key_event.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_dialog.dismiss();
            }
            return;
        }

        if key_event.code == KeyCode::Char('c') && key_event.modifiers == KeyModifiers::CONTROL {
            self.should_quit = true;
            return;
        }

        if self.show_help {
            if let Some(HelpAction::Close) = self.help.handle_input(key_event) {
                self.show_help = false;
            }
            return;
        }

        if !self.tab_is_capturing() && key_event.modifiers == KeyModifiers::NONE {
            match key_event.code {
                KeyCode::Char('q') => {
                    info!("Quit requested");
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('?') => {
                    self.help.open(self.key_context());
                    self.show_help = true;
                    return;
                }
                KeyCode::Char('r') => {
                    self.refresh(self.tab);
                    return;
                }
                KeyCode::Tab => {
                    self.switch_tab(self.tab.next());
                    return;
                }
                KeyCode::Char(c) => {
                    if let Some(tab) = Tab::from_digit(c) {
                        self.switch_tab(tab);
                        return;
                    }
                }
                _ => {}
            }
        }

        match self.tab {
            Tab::Dashboard => {
                if let Some(action) = self.dashboard.handle_input(key_event) {
                    self.dispatch_dashboard(action);
                }
            }
            Tab::Products => {
                if let Some(action) = self.products.handle_input(key_event) {
                    self.dispatch_products(action);
                }
            }
            Tab::Orders => {
                if let Some(action) = self.orders.handle_input(key_event) {
                    self.dispatch_orders(action);
                }
            }
            Tab::Categories => {
                if let Some(action) = self.categories.handle_input(key_event) {
                    self.dispatch_categories(action);
                }
            }
            Tab::Account => {}
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) {
        if self.error_dialog.is_visible() || self.show_help {
            return;
        }
        match self.tab {
            Tab::Dashboard | Tab::Account => {}
            Tab::Products => {
                if let Some(action) = self.products.handle_click(column, row) {
                    self.dispatch_products(action);
                }
            }
            Tab::Orders => {
                if let Some(action) = self.orders.handle_click(column, row) {
                    self.dispatch_orders(action);
                }
            }
            Tab::Categories => {
                if let Some(action) = self.categories.handle_click(column, row) {
                    self.dispatch_categories(action);
                }
            }
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        if tab != self.tab {
            debug!(from = self.tab.title(), to = tab.title(), "Switching tab");
            self.tab = tab;
        }
    }

    fn dispatch_dashboard(&mut self, action: DashboardAction) {
        match action {
            DashboardAction::RangeChanged(range) => {
                debug!(?range, "Fetching stats for new range");
                self.fetch_stats(range);
            }
        }
    }

    fn fetch_stats(&mut self, range: DateRange) {
        let merchant_id = self.session.merchant_id();
        if self.with_backend_do(|client, spawner| spawner.spawn_fetch_stats(client, merchant_id, range)) {
            self.begin_request("Loading dashboard...");
        }
    }

    fn dispatch_products(&mut self, action: ProductsAction) {
        match action {
            ProductsAction::ToggleStatus { product_id, status } => {
                info!(product_id, status = %status, "Updating product status");
                let sent = self.with_backend_do(|client, spawner| {
                    spawner.spawn_update_product_status(client, product_id, status)
                });
                if sent {
                    self.begin_request("Updating product...");
                } else {
                    self.notifications.warning("Not connected to the HalalNest API");
                }
            }
            ProductsAction::Delete { product_id } => {
                info!(product_id, "Deleting product");
                let sent = self
                    .with_backend_do(|client, spawner| spawner.spawn_delete_product(client, product_id));
                if sent {
                    self.begin_request("Deleting product...");
                } else {
                    self.products.panel_mut().finish_delete();
                    self.notifications.warning("Not connected to the HalalNest API");
                }
            }
            ProductsAction::Rejected(message) => self.notifications.warning(message),
        }
    }

    fn dispatch_orders(&mut self, action: OrdersAction) {
        match action {
            OrdersAction::AdvanceStatus { order_id, status } => {
                info!(order_id, status = %status, "Updating order status");
                let sent = self.with_backend_do(|client, spawner| {
                    spawner.spawn_update_order_status(client, order_id, status)
                });
                if sent {
                    self.begin_request("Updating order...");
                } else {
                    self.notifications.warning("Not connected to the HalalNest API");
                }
            }
            OrdersAction::OpenOrder { order_id } => {
                debug!(order_id, "Loading order panel");
                if self.with_backend_do(|client, spawner| spawner.spawn_fetch_order(client, order_id)) {
                    // Details and history arrive separately
                    self.begin_request("Loading order...");
                    self.begin_request("Loading order...");
                } else {
                    self.orders.set_order_details(order_id, None);
                    self.orders.set_order_history(order_id, None);
                    self.notifications.warning("Not connected to the HalalNest API");
                }
            }
            OrdersAction::Track { reference } => {
                info!(reference = %reference, "Tracking order");
                let sent = self.with_backend_do(|client, spawner| {
                    spawner.spawn_track_order(client, reference.clone())
                });
                if sent {
                    self.begin_request("Tracking order...");
                } else {
                    self.orders.set_tracking_result(&reference, Err(()));
                    self.notifications.warning("Not connected to the HalalNest API");
                }
            }
            OrdersAction::Rejected(message) => self.notifications.warning(message),
        }
    }

    fn dispatch_categories(&mut self, action: CategoriesAction) {
        match action {
            CategoriesAction::Delete { category_id } => {
                info!(category_id, "Deleting category");
                let sent = self.with_backend_do(|client, spawner| {
                    spawner.spawn_delete_category(client, category_id)
                });
                if sent {
                    self.begin_request("Deleting category...");
                } else {
                    self.categories.panel_mut().finish_delete();
                    self.notifications.warning("Not connected to the HalalNest API");
                }
            }
            CategoriesAction::OpenSubcategories { category_id } => {
                self.fetch_subcategories(category_id);
            }
            CategoriesAction::DeleteSubcategory { subcategory_id } => {
                info!(subcategory_id, "Deleting subcategory");
                let sent = self.with_backend_do(|client, spawner| {
                    spawner.spawn_delete_subcategory(client, subcategory_id)
                });
                if sent {
                    self.begin_request("Deleting subcategory...");
                } else {
                    self.categories.subcategories_mut().finish_delete();
                    self.notifications.warning("Not connected to the HalalNest API");
                }
            }
            CategoriesAction::Rejected(message) => self.notifications.warning(message),
        }
    }

    /// Apply the result of a background request.
    ///
    /// Successful mutations re-fetch the affected list so the tables show
    /// server state.
    pub fn handle_api_message(&mut self, message: ApiMessage) {
        self.end_request();
        match message {
            ApiMessage::ProductsFetched(Ok(products)) => {
                debug!(count = products.len(), "Products loaded");
                self.products.set_products(products);
            }
            ApiMessage::OrdersFetched(Ok(orders)) => {
                debug!(count = orders.len(), "Orders loaded");
                self.orders.set_orders(orders);
            }
            ApiMessage::CategoriesFetched(Ok(categories)) => {
                debug!(count = categories.len(), "Categories loaded");
                self.categories.set_categories(&categories);
            }
            ApiMessage::StatsFetched { range, result } => match result {
                Ok(stats) => {
                    self.dashboard.set_stats(range, stats);
                }
                Err(e) => self.handle_error(&e.into()),
            },
            ApiMessage::ProductsFetched(Err(e))
            | ApiMessage::OrdersFetched(Err(e))
            | ApiMessage::CategoriesFetched(Err(e)) => self.handle_error(&e.into()),
            ApiMessage::ProductStatusUpdated {
                product_id,
                status,
                result,
            } => match result {
                Ok(()) => {
                    let verb = if status == STATUS_ACTIVE {
                        "activated"
                    } else {
                        "deactivated"
                    };
                    self.notifications.success(format!("Product {} {}", product_id, verb));
                    self.refresh(Tab::Products);
                }
                Err(e) => self.handle_error(&e.into()),
            },
            ApiMessage::ProductDeleted { product_id, result } => {
                self.products.panel_mut().finish_delete();
                match result {
                    Ok(()) => {
                        self.notifications.success(format!("Product {} deleted", product_id));
                        self.refresh(Tab::Products);
                    }
                    Err(e) => self.handle_error(&e.into()),
                }
            }
            ApiMessage::OrderStatusUpdated {
                order_id,
                status,
                result,
            } => match result {
                Ok(()) => {
                    self.notifications
                        .success(format!("Order {} marked {}", order_id, status));
                    self.refresh(Tab::Orders);
                }
                Err(e) => self.handle_error(&e.into()),
            },
            ApiMessage::CategoryDeleted { category_id, result } => {
                self.categories.panel_mut().finish_delete();
                match result {
                    Ok(()) => {
                        self.notifications
                            .success(format!("Category {} deleted", category_id));
                        self.categories.category_removed(category_id);
                        self.refresh(Tab::Categories);
                    }
                    Err(e) => self.handle_error(&e.into()),
                }
            }
            ApiMessage::SubcategoriesFetched { category_id, result } => match result {
                Ok(subcategories) => {
                    debug!(category_id, count = subcategories.len(), "Subcategories loaded");
                    self.categories.set_subcategories(category_id, &subcategories);
                }
                Err(e) => self.handle_error(&e.into()),
            },
            ApiMessage::SubcategoryDeleted {
                subcategory_id,
                result,
            } => {
                self.categories.subcategories_mut().finish_delete();
                match result {
                    Ok(()) => {
                        self.notifications
                            .success(format!("Subcategory {} deleted", subcategory_id));
                        if let Some(category_id) = self.categories.open_category() {
                            self.fetch_subcategories(category_id);
                        }
                    }
                    Err(e) => self.handle_error(&e.into()),
                }
            }
            ApiMessage::OrderDetailsFetched { order_id, result } => match result {
                Ok(details) => self.orders.set_order_details(order_id, Some(details)),
                Err(e) => {
                    self.orders.set_order_details(order_id, None);
                    self.handle_error(&e.into());
                }
            },
            ApiMessage::OrderHistoryFetched { order_id, result } => match result {
                Ok(history) => self.orders.set_order_history(order_id, Some(history)),
                Err(e) => {
                    self.orders.set_order_history(order_id, None);
                    self.handle_error(&e.into());
                }
            },
            ApiMessage::OrderTracked { reference, result } => match result {
                Ok(found) => {
                    debug!(reference = %reference, found = found.is_some(), "Tracking lookup finished");
                    self.orders.set_tracking_result(&reference, Ok(found));
                }
                Err(e) => {
                    self.orders.set_tracking_result(&reference, Err(()));
                    self.handle_error(&e.into());
                }
            },
            ApiMessage::MerchantDetailsFetched(result) => match result {
                Ok(merchant) => self.account.set_merchant(merchant),
                Err(e) => {
                    self.account.set_failed();
                    self.handle_error(&e.into());
                }
            },
        }
    }

    /// Render the application UI.
    ///
    /// This implements the View part of The Elm Architecture (TEA).
    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Footer
            ])
            .split(area);

        self.render_header(frame, chunks[0]);

        let content = chunks[1];
        match self.tab {
            Tab::Dashboard => self.dashboard.render(frame, content),
            Tab::Products => self.products.render(frame, content, !self.show_help),
            Tab::Orders => self.orders.render(frame, content, !self.show_help),
            Tab::Categories => self.categories.render(frame, content, !self.show_help),
            Tab::Account => self.account.render(frame, content, &self.session),
        }

        self.render_footer(frame, chunks[2]);

        if self.show_help {
            self.help.render(frame, area);
        }
        self.notifications.render(frame, area);
        self.error_dialog.render(frame, area);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let titles = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())));
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .style(Style::default().fg(t.muted))
            .highlight_style(Style::default().fg(t.accent).add_modifier(Modifier::BOLD))
            .block(
                Block::default()
                    .title(Line::from(vec![
                        Span::styled(" HalalNest ", Style::default().fg(t.accent)),
                        Span::styled(
                            format!("{} ", self.session.display_name()),
                            Style::default().fg(t.fg),
                        ),
                    ]))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(t.border)),
            );
        frame.render_widget(tabs, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(28)])
            .split(area);
        render_context_help(frame, chunks[0], self.key_context());
        self.loading.render(frame, chunks[1]);
    }
}
