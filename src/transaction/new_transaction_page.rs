//! The page for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::Category,
    endpoints,
    family::Family,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

use super::load_category_lists;

/// The state needed to render the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    /// The database connection for reading categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the new transaction page with the category lists of both families.
pub async fn get_new_transaction_page(
    State(state): State<NewTransactionPageState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let (income_categories, expense_categories) = match load_category_lists(&connection) {
        Ok(categories) => categories,
        Err(error) => return error.into_response(),
    };

    new_transaction_view(&income_categories, &expense_categories).into_response()
}

fn new_transaction_view(
    income_categories: &[Category],
    expense_categories: &[Category],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold my-6" { "New Transaction" }

            (transaction_form_view(income_categories, expense_categories))
        }
    };

    base("New Transaction", &content)
}

fn transaction_form_view(
    income_categories: &[Category],
    expense_categories: &[Category],
) -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            fieldset class=(FORM_RADIO_GROUP_STYLE)
            {
                legend class=(FORM_LABEL_STYLE) { "Type" }

                label class=(FORM_RADIO_LABEL_STYLE)
                {
                    input type="radio" name="family" value=(Family::Income.as_str()) required;
                    "Income"
                }

                label class=(FORM_RADIO_LABEL_STYLE)
                {
                    input
                        type="radio"
                        name="family"
                        value=(Family::Expense.as_str())
                        checked
                        required;
                    "Expense"
                }
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category_id" name="category_id" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    (category_options_view(income_categories, expense_categories, None))
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
                    placeholder="0.00"
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
                    placeholder="What was this for?"
                    minlength="3"
                    maxlength="300"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input id="date" type="date" name="date" required class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Transaction" }
        }
    }
}

/// Render the category select options, grouped by family.
///
/// Marks `selected_id` as selected when rendering the edit form.
pub(crate) fn category_options_view(
    income_categories: &[Category],
    expense_categories: &[Category],
    selected_id: Option<i64>,
) -> Markup {
    html! {
        optgroup label="Income"
        {
            @for category in income_categories {
                option
                    value=(category.id)
                    selected[selected_id == Some(category.id)]
                {
                    (category.name)
                }
            }
        }

        optgroup label="Expense"
        {
            @for category in expense_categories {
                option
                    value=(category.id)
                    selected[selected_id == Some(category.id)]
                {
                    (category.name)
                }
            }
        }
    }
}

#[cfg(test)]
mod new_transaction_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
        transaction::db::test_fixtures::{get_test_connection, seed_user_and_categories},
    };

    use super::{NewTransactionPageState, get_new_transaction_page};

    #[tokio::test]
    async fn render_page() {
        let connection = get_test_connection();
        seed_user_and_categories("user_1", &connection);
        let state = NewTransactionPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_new_transaction_page(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "date", "date");
        assert_form_submit_button(&form);

        let text = html.html();
        assert!(text.contains("Salary"), "income categories should render");
        assert!(
            text.contains("Groceries"),
            "expense categories should render"
        );
    }
}
