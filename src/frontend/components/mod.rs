//! Reusable UI components.

pub mod debug_info;
pub mod orders_table;
pub mod sidebar;
pub mod stat_card;
pub mod status;

pub use debug_info::DebugInfo;
pub use orders_table::OrdersTable;
pub use sidebar::Sidebar;
pub use stat_card::StatCard;
pub use status::{ErrorScreen, LoadingScreen};
