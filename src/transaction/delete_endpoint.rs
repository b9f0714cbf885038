//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Identity,
    endpoints,
    family::Family,
    transaction::{TransactionId, delete_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, redirects to the ledger.
///
/// The delete is scoped to the caller, so a row that does not exist or
/// belongs to someone else matches nothing. That is reported as success: from
/// the caller's point of view the row is gone either way.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(identity): Extension<Identity>,
    Path((family, transaction_id)): Path<(Family, TransactionId)>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, family, &identity.user_id, &connection) {
        Ok(0) => {
            tracing::debug!(
                "Delete of {family} transaction {transaction_id} matched no rows for {}",
                identity.user_id
            );

            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");

            error.into_alert_response()
        }
    }
}
