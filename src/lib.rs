//! Tallybook is a web app for tracking personal income and expenses.
//!
//! Signed-in users record transactions against fixed income and expense
//! category lists and browse them as a monthly ledger. Administrators manage
//! users, categories, and every transaction from a dashboard. This library
//! provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod admin;
mod alert;
mod app_state;
mod auth;
mod category;
mod db;
mod endpoints;
mod family;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod shared_templates;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;
mod user;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use family::Family;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use user::{User, UserId};

use crate::{
    alert::AlertTemplate,
    category::CategoryId,
    internal_server_error::{InternalServerErrorPageTemplate, render_internal_server_error},
    not_found::get_404_not_found_response,
    shared_templates::render,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The session cookie is missing from the cookie jar in the request, or
    /// its contents could not be read back into a session identity.
    #[error("User is not authenticated")]
    SessionMissing,

    /// There was an error formatting or parsing a date.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not handle date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// A transaction amount of zero or less was submitted.
    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    /// A transaction description shorter than three characters was submitted.
    #[error("The description must contain at least 3 characters.")]
    DescriptionTooShort,

    /// A transaction description longer than 300 characters was submitted.
    #[error("The description must contain a maximum of 300 characters.")]
    DescriptionTooLong,

    /// The transaction form was submitted without a usable category ID.
    ///
    /// Whether the ID refers to an existing category in the matching family
    /// is left to the store's foreign key constraint, see
    /// [Error::InvalidCategory].
    #[error("Please select a category")]
    CategoryRequired,

    /// A transaction date more than one hundred years in the past was submitted.
    #[error("The transaction date cannot be more than 100 years in the past.")]
    DateTooFarPast,

    /// A transaction date more than one day in the future was submitted.
    ///
    /// Tomorrow is allowed so that entries made from a timezone ahead of the
    /// server are not rejected.
    #[error("The transaction date cannot be more than one day in the future.")]
    DateTooFarAhead,

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The category name already exists within its family.
    #[error("the category \"{0}\" already exists in the database")]
    DuplicateCategoryName(String),

    /// The category ID on a transaction did not match a category in the
    /// transaction's family.
    #[error("the category ID {0:?} does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// A string that is neither "income" nor "expense" was used as a family.
    #[error("\"{0}\" is not a valid transaction family")]
    InvalidFamily(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows, which
    /// includes queries scoped to an owner that does not own the row.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to delete a category that transactions still reference
    #[error("the category is still referenced by transactions")]
    CategoryInUse,

    /// Tried to update a user that does not exist
    #[error("tried to update a user that is not in the database")]
    UpdateMissingUser,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JsonSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Error::InvalidCategory(None)
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => {
                render_internal_server_error(InternalServerErrorPageTemplate {
                    description: "Invalid Timezone Settings",
                    fix: &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                    ),
                })
            }
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            error @ (Error::NonPositiveAmount
            | Error::DescriptionTooShort
            | Error::DescriptionTooLong
            | Error::CategoryRequired
            | Error::DateTooFarPast
            | Error::DateTooFarAhead
            | Error::EmptyCategoryName) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error("Invalid input", &error.to_string()),
            ),
            Error::DuplicateCategoryName(name) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Duplicate Category Name",
                    &format!(
                        "The category {name} already exists in the database. \
                        Choose a different category name, or edit or delete the existing category.",
                    ),
                ),
            ),
            Error::InvalidCategory(category_id) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid category ID",
                    &format!("Could not find a category with the ID {category_id:?}"),
                ),
            ),
            Error::NotFound => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error("Transaction not found", "The record could not be found."),
            ),
            Error::UpdateMissingTransaction => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not update transaction",
                    "The transaction could not be found.",
                ),
            ),
            Error::UpdateMissingCategory => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not update category",
                    "The category could not be found.",
                ),
            ),
            Error::DeleteMissingCategory => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete category",
                    "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted.",
                ),
            ),
            Error::CategoryInUse => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Could not delete category",
                    "Transactions still reference this category. \
                    Reassign or delete those transactions first.",
                ),
            ),
            Error::UpdateMissingUser => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error("Could not update user", "The user could not be found."),
            ),
            _ => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertTemplate::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        }
    }
}
