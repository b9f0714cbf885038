//! Session-based authentication delegated to an external identity provider.
//!
//! The identity provider verifies who the user is outside this application
//! and hands the session endpoint a verified identity. From then on the
//! identity travels in an encrypted, signed private cookie; the auth
//! middleware decodes it and makes it available to route handlers as a
//! request extension.

mod cookie;
mod middleware;
mod session;

pub use cookie::{
    COOKIE_EXPIRY, COOKIE_SESSION, DEFAULT_COOKIE_DURATION, get_identity_from_cookies,
    invalidate_session_cookie, set_session_cookie,
};
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use session::{Identity, create_session, get_sign_in_page, sign_out};
