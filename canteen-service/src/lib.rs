pub mod app;
pub mod auth_handlers;
pub mod config;
pub mod identity;
pub mod menu_handlers;
pub mod order_handlers;
pub mod pricing;
pub mod status;

pub use app::{build_router, AppState};
pub use identity::{CurrentUser, STAFF_ONLY, STUDENT_ONLY};
