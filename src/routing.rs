//! Application router configuration with protected, admin, and unprotected
//! route definitions.

use axum::{
    Router,
    middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    admin::{admin_guard, admin_guard_hx, get_admin_dashboard_page, update_user_endpoint},
    auth::{auth_guard, auth_guard_hx, create_session, get_sign_in_page, sign_out},
    category::{create_category_endpoint, delete_category_endpoint, update_category_endpoint},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{
        admin_update_transaction_endpoint, create_transaction_endpoint,
        delete_transaction_endpoint, get_edit_transaction_page, get_new_transaction_page,
        get_transactions_page, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::SIGN_IN_VIEW, get(get_sign_in_page))
        .route(endpoints::SESSION_API, post(create_session))
        .route(endpoints::SIGN_OUT, get(sign_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-Redirect header for
    // auth redirects to work properly for HTMX requests.
    let protected_api = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(endpoints::PUT_TRANSACTION, put(update_transaction_endpoint))
        .route(
            endpoints::DELETE_TRANSACTION,
            delete(delete_transaction_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

    // The admin gate runs after the auth guard, which puts the identity on
    // the request. Layers run outermost-last, so the auth guard is added
    // last.
    let admin_pages = Router::new()
        .route(endpoints::ADMIN_VIEW, get(get_admin_dashboard_page))
        .layer(middleware::from_fn_with_state(state.clone(), admin_guard))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let admin_api = Router::new()
        .route(endpoints::PUT_ADMIN_USER, put(update_user_endpoint))
        .route(
            endpoints::POST_ADMIN_CATEGORY,
            post(create_category_endpoint),
        )
        .route(endpoints::PUT_ADMIN_CATEGORY, put(update_category_endpoint))
        .route(
            endpoints::DELETE_ADMIN_CATEGORY,
            delete(delete_category_endpoint),
        )
        .route(
            endpoints::PUT_ADMIN_TRANSACTION,
            put(admin_update_transaction_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), admin_guard_hx))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

    protected_pages
        .merge(protected_api)
        .merge(admin_pages)
        .merge(admin_api)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the ledger page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::TRANSACTIONS_VIEW)
}
