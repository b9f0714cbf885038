//! The page for editing or deleting an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Identity,
    category::Category,
    endpoints,
    family::Family,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_RADIO_GROUP_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    transaction::{LedgerEntry, TransactionId, get_transaction},
};

use super::{load_category_lists, new_transaction_page::category_options_view};

/// The state needed to render the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The database connection for reading the transaction and categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the edit page for one of the caller's transactions.
///
/// Responds with the 404 page when the ID does not resolve to a row owned by
/// the caller in either family.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Extension(identity): Extension<Identity>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let entry = match get_transaction(transaction_id, &identity.user_id, &connection) {
        Ok(entry) => entry,
        Err(error) => return error.into_response(),
    };

    let (income_categories, expense_categories) = match load_category_lists(&connection) {
        Ok(categories) => categories,
        Err(error) => return error.into_response(),
    };

    edit_transaction_view(&entry, &income_categories, &expense_categories).into_response()
}

fn edit_transaction_view(
    entry: &LedgerEntry,
    income_categories: &[Category],
    expense_categories: &[Category],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_TRANSACTION, entry.id);
    let delete_endpoint =
        endpoints::format_family_endpoint(endpoints::DELETE_TRANSACTION, entry.family, entry.id);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold my-6" { "Edit Transaction" }

            form
                hx-put=(update_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                fieldset class=(FORM_RADIO_GROUP_STYLE)
                {
                    legend class=(FORM_LABEL_STYLE) { "Type" }

                    label class=(FORM_RADIO_LABEL_STYLE)
                    {
                        input
                            type="radio"
                            name="family"
                            value=(Family::Income.as_str())
                            checked[entry.family == Family::Income]
                            required;
                        "Income"
                    }

                    label class=(FORM_RADIO_LABEL_STYLE)
                    {
                        input
                            type="radio"
                            name="family"
                            value=(Family::Expense.as_str())
                            checked[entry.family == Family::Expense]
                            required;
                        "Expense"
                    }
                }

                div
                {
                    label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                    select
                        id="category_id"
                        name="category_id"
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        (category_options_view(
                            income_categories,
                            expense_categories,
                            Some(entry.category_id),
                        ))
                    }
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0.01"
                        value=(entry.amount)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        id="description"
                        type="text"
                        name="description"
                        value=(entry.description)
                        minlength="3"
                        maxlength="300"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        id="date"
                        type="date"
                        name="date"
                        value=(entry.date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Changes" }
            }

            button
                hx-delete=(delete_endpoint)
                hx-confirm="Delete this transaction? This cannot be undone."
                hx-target-error="#alert-container"
                class=(BUTTON_DELETE_STYLE)
            {
                "Delete Transaction"
            }
        }
    };

    base("Edit Transaction", &content)
}
