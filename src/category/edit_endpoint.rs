//! Category editing endpoint for the admin dashboard.

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
    category::{CategoryId, CategoryName, update_category},
    family::Family,
};

/// The state needed for editing a category.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for editing a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct EditCategoryForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Handle category edit form submission, redirects to the admin dashboard on
/// success.
pub async fn update_category_endpoint(
    State(state): State<EditCategoryState>,
    Path((family, category_id)): Path<(Family, CategoryId)>,
    Form(form): Form<EditCategoryForm>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };
    let description = form
        .description
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty());

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(category_id, name, description, family, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::ADMIN_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update category {category_id}: {error}");

            error.into_alert_response()
        }
    }
}
