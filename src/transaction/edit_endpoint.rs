//! Defines the endpoint for updating a transaction, including moving it
//! between families.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Identity,
    endpoints,
    timezone::local_today,
    transaction::{TransactionForm, TransactionId, update_transaction, validate_transaction},
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for updating a transaction, redirects to the ledger on
/// success.
///
/// When the submitted family differs from the row's current family, the row
/// is relocated to the other table and assigned a new ID, so the client must
/// not rely on the old ID afterwards.
pub async fn update_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(identity): Extension<Identity>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = local_today(&state.local_timezone);

    if let Err(error) = validate_transaction(&form, today) {
        return error.into_alert_response();
    }

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_transaction(transaction_id, &form, &identity.user_id, &mut connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");

            error.into_alert_response()
        }
    }
}
