//! User interface components and views.
//!
//! This module contains all TUI rendering logic, including views for the
//! dashboard tabs and reusable UI components.

pub mod components;
pub mod theme;
mod views;

pub use components::{
    render_context_help, ErrorDialog, LoadingIndicator, Notification, NotificationManager,
};
pub use views::{
    AccountView, CategoriesAction, CategoriesView, DashboardAction, DashboardView, HelpAction, HelpView,
    OrdersAction, OrdersView, ProductsAction, ProductsView, STATUS_ACTIVE,
};
