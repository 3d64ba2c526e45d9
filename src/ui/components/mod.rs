//! Reusable UI components.

pub mod format;
mod help_bar;
mod loading;
mod modal;
mod notification;
pub mod pagination;
mod record;
mod search_bar;
mod table;

pub use format::Formatter;
pub use help_bar::render_context_help;
pub use loading::LoadingIndicator;
pub use modal::{centered_rect, ConfirmAction, ConfirmDialog, ErrorDialog};
pub use notification::{Notification, NotificationManager, NotificationType};
pub use pagination::{PageItem, PageTarget, Pagination};
pub use record::{Record, RowKey};
pub use search_bar::{SearchAction, SearchBar};
pub use table::{Column, DeleteState, PagedTable, RowAction, TableAction, NO_DATA};
