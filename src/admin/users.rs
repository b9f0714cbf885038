//! The admin endpoint for editing a user's profile and role.

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

use crate::{
    AppState, Error, endpoints,
    user::{Role, UserId, update_user},
};

/// The state needed to edit a user.
#[derive(Debug, Clone)]
pub struct EditUserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for editing a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminUserForm {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub role: Role,
}

/// Handle user edit form submission, redirects to the admin dashboard on
/// success.
pub async fn update_user_endpoint(
    State(state): State<EditUserState>,
    Path(user_id): Path<String>,
    Form(form): Form<AdminUserForm>,
) -> Response {
    let user_id = UserId::new(user_id);
    let first_name = none_if_blank(form.first_name.as_deref());
    let last_name = none_if_blank(form.last_name.as_deref());

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_user(
        &user_id,
        form.email.trim(),
        first_name,
        last_name,
        form.role,
        &connection,
    ) {
        Ok(()) => (
            HxRedirect(endpoints::ADMIN_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update user {user_id}: {error}");

            error.into_alert_response()
        }
    }
}

fn none_if_blank(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|text| !text.is_empty())
}
