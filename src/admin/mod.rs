//! The admin area: role gate, dashboard, and user management.

mod dashboard;
mod guard;
mod users;

pub use dashboard::get_admin_dashboard_page;
pub use guard::{admin_guard, admin_guard_hx};
pub use users::update_user_endpoint;
