//! Category creation endpoint for the admin dashboard.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, endpoints,
    category::{CategoryName, create_category},
    family::Family,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub family: Family,
}

/// Handle category creation form submission, redirects to the admin dashboard
/// on success.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Form(form): Form<CategoryForm>,
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

    match create_category(name, description, form.family, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::ADMIN_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}
