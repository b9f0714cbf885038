//! The authorization gate in front of every admin entry point.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Identity,
    endpoints,
    user::{Role, get_user_role},
};

/// The state needed for the admin gate.
#[derive(Clone)]
pub struct AdminGuardState {
    /// The database connection for resolving roles.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AdminGuardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Middleware function that lets only admins through.
///
/// The auth middleware must run first so the request carries an [Identity].
/// The caller's role is re-resolved from the store on every request, so a
/// role change takes effect immediately; there is no caching layer. Callers
/// without an admin role are sent back to the home page.
#[inline]
async fn admin_guard_internal(
    state: AdminGuardState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let identity = match request.extensions().get::<Identity>() {
        Some(identity) => identity.clone(),
        None => {
            tracing::error!(
                "Admin gate reached without an identity. \
                Check that the auth middleware is layered in front of it."
            );
            return get_redirect(endpoints::SIGN_IN_VIEW);
        }
    };

    let role = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_user_role(&identity.user_id, &connection) {
            Ok(role) => role,
            // A caller without a user row has never recorded anything; they
            // are certainly not an admin.
            Err(Error::NotFound) => Role::User,
            Err(error) => {
                tracing::error!("Could not resolve role for {}: {error}", identity.user_id);
                return error.into_response();
            }
        }
    };

    if role != Role::Admin {
        return get_redirect(endpoints::ROOT);
    }

    next.run(request).await
}

/// Middleware function that lets only admins through, redirecting everyone
/// else to the home page.
pub async fn admin_guard(
    State(state): State<AdminGuardState>,
    request: Request,
    next: Next,
) -> Response {
    admin_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware function that lets only admins through, redirecting everyone
/// else to the home page via the HX-Redirect header.
pub async fn admin_guard_hx(
    State(state): State<AdminGuardState>,
    request: Request,
    next: Next,
) -> Response {
    admin_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}

#[cfg(test)]
mod admin_guard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, middleware, response::Html, routing::get};
    use axum_test::TestServer;

    use crate::{
        endpoints,
        transaction::test_fixtures::{get_test_connection, test_identity},
        user::{Role, ensure_user, update_user},
    };

    use super::{AdminGuardState, admin_guard, admin_guard_hx};

    async fn test_handler() -> Html<&'static str> {
        Html("<h1>Admin only</h1>")
    }

    const TEST_ADMIN_ROUTE: &str = "/admin";

    fn get_guard_state(user_id: &str, role: Option<Role>) -> (AdminGuardState, Extension<crate::auth::Identity>) {
        let connection = get_test_connection();
        let identity = test_identity(user_id);

        if let Some(role) = role {
            ensure_user(&identity, &connection).expect("Could not create test user");
            update_user(
                &identity.user_id,
                &identity.email,
                None,
                None,
                role,
                &connection,
            )
            .expect("Could not set test user role");
        }

        let state = AdminGuardState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, Extension(identity))
    }

    fn get_test_server(user_id: &str, role: Option<Role>) -> TestServer {
        let (state, identity_layer) = get_guard_state(user_id, role);

        let app = Router::new()
            .route(TEST_ADMIN_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard))
            // Stands in for the auth middleware, which inserts the identity.
            .layer(identity_layer)
            .with_state(state);

        TestServer::new(app)
    }

    fn get_test_server_hx(user_id: &str, role: Option<Role>) -> TestServer {
        let (state, identity_layer) = get_guard_state(user_id, role);

        let app = Router::new()
            .route(TEST_ADMIN_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard_hx))
            .layer(identity_layer)
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn admin_gets_through() {
        let server = get_test_server("user_admin", Some(Role::Admin));

        let response = server.get(TEST_ADMIN_ROUTE).await;

        response.assert_status_ok();
        response.assert_text_contains("Admin only");
    }

    #[tokio::test]
    async fn regular_user_is_redirected_home() {
        let server = get_test_server("user_plain", Some(Role::User));

        let response = server.get(TEST_ADMIN_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::ROOT);
    }

    #[tokio::test]
    async fn caller_without_a_user_row_is_redirected_home() {
        let server = get_test_server("user_unknown", None);

        let response = server.get(TEST_ADMIN_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::ROOT);
    }

    #[tokio::test]
    async fn hx_variant_uses_the_redirect_header() {
        let server = get_test_server_hx("user_plain", Some(Role::User));

        let response = server.get(TEST_ADMIN_ROUTE).await;

        response.assert_status_ok();
        assert_eq!(response.header("hx-redirect"), endpoints::ROOT);
    }
}
