//! Category deletion endpoint for the admin dashboard.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    category::{CategoryId, delete_category},
    family::Family,
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle category deletion, redirects to the admin dashboard on success.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryState>,
    Path((family, category_id)): Path<(Family, CategoryId)>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_category(category_id, family, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::ADMIN_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not delete category {category_id}: {error}");

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        category::{CategoryName, create_category, create_category_tables, get_categories},
        endpoints,
        family::Family,
        test_utils::assert_hx_redirect,
    };

    use super::{DeleteCategoryState, delete_category_endpoint};

    fn get_category_state() -> DeleteCategoryState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_category_tables(&connection).expect("Could not create category tables");

        DeleteCategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn can_delete_category() {
        let state = get_category_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                CategoryName::new_unchecked("ToDelete"),
                None,
                Family::Expense,
                &connection,
            )
            .expect("Could not create test category")
        };

        let response =
            delete_category_endpoint(State(state.clone()), Path((Family::Expense, category.id)))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::ADMIN_VIEW);

        let connection = state.db_connection.lock().unwrap();
        assert!(
            get_categories(Family::Expense, &connection)
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn delete_missing_category_returns_not_found() {
        let state = get_category_state();

        let response = delete_category_endpoint(State(state), Path((Family::Income, 999999))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
