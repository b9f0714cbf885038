//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Identity,
    endpoints,
    timezone::local_today,
    transaction::{TransactionForm, create_transaction, validate_transaction},
    user::ensure_user,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for creating a new transaction, redirects to the ledger on
/// success.
///
/// The caller's user row is created or refreshed from the session identity
/// before the insert, so a first-time user can record a transaction without
/// any registration step.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = local_today(&state.local_timezone);

    if let Err(error) = validate_transaction(&form, today) {
        return error.into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = ensure_user(&identity, &connection) {
        tracing::error!("Could not ensure user row: {error}");
        return error.into_alert_response();
    }

    match create_transaction(&form, &identity.user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");

            error.into_alert_response()
        }
    }
}
