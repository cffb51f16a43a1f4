//! Route views.

pub mod dashboard;
pub mod login;

pub use dashboard::DashboardPage;
pub use login::LoginPage;
