//! Application views (screens).

mod account;
mod categories;
mod dashboard;
mod detail;
mod help;
mod list;
mod order_detail;
mod orders;
mod products;
mod track;

pub use account::AccountView;
pub use categories::{CategoriesAction, CategoriesView};
pub use dashboard::{DashboardAction, DashboardView, RangePreset};
pub use detail::{DetailAction, DetailView};
pub use help::{HelpAction, HelpView};
pub use list::ListPanel;
pub use orders::{OrdersAction, OrdersView};
pub use products::{ProductsAction, ProductsView, STATUS_ACTIVE, STATUS_INACTIVE};
