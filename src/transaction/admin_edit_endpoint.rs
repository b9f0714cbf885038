//! Defines the admin endpoint for correcting any user's transaction in place.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    category::CategoryId,
    endpoints,
    family::Family,
    timezone::local_today,
    transaction::{
        TransactionForm, TransactionId, db::admin_update_transaction, validate_transaction,
    },
};

/// The state needed to update a transaction as an admin.
#[derive(Debug, Clone)]
pub struct AdminEditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AdminEditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for the admin transaction edit.
///
/// The family comes from the path, not the form: the admin path corrects rows
/// in place and never migrates between families.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminTransactionForm {
    pub amount: f64,
    pub description: String,
    pub category_id: CategoryId,
    pub date: Date,
}

/// A route handler for correcting any user's transaction, redirects to the
/// admin dashboard on success.
pub async fn admin_update_transaction_endpoint(
    State(state): State<AdminEditTransactionState>,
    Path((family, transaction_id)): Path<(Family, TransactionId)>,
    Form(form): Form<AdminTransactionForm>,
) -> Response {
    let today = local_today(&state.local_timezone);

    // Reuse the shared field rules by treating the path family as the form's.
    let validation_form = TransactionForm {
        amount: form.amount,
        description: form.description.clone(),
        category_id: form.category_id,
        date: form.date,
        family,
    };
    if let Err(error) = validate_transaction(&validation_form, today) {
        return error.into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match admin_update_transaction(
        transaction_id,
        family,
        form.category_id,
        form.amount,
        &form.description,
        form.date,
        &connection,
    ) {
        Ok(()) => (
            HxRedirect(endpoints::ADMIN_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(
                "Could not update {family} transaction {transaction_id} as admin: {error}"
            );

            error.into_alert_response()
        }
    }
}
