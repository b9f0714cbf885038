//! The admin dashboard: every user, category, and transaction in one place.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, get_categories},
    endpoints,
    family::Family,
    html::{
        BUTTON_DELETE_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    transaction::{Transaction, get_all_transactions},
    user::{Role, User, get_all_users},
};

/// The state needed to render the admin dashboard.
#[derive(Debug, Clone)]
pub struct AdminDashboardState {
    /// The database connection for reading every table.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AdminDashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the admin dashboard with all users, categories, and transactions.
///
/// Reached only through the admin gate, so every query here is unscoped.
pub async fn get_admin_dashboard_page(State(state): State<AdminDashboardState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let users = match get_all_users(&connection) {
        Ok(users) => users,
        Err(error) => return error.into_response(),
    };

    let mut categories = Vec::new();
    let mut transactions = Vec::new();
    for family in Family::ALL {
        match get_categories(family, &connection) {
            Ok(family_categories) => categories.push((family, family_categories)),
            Err(error) => return error.into_response(),
        }
        match get_all_transactions(family, &connection) {
            Ok(family_transactions) => transactions.push((family, family_transactions)),
            Err(error) => return error.into_response(),
        }
    }

    admin_dashboard_view(&users, &categories, &transactions).into_response()
}

fn admin_dashboard_view(
    users: &[User],
    categories: &[(Family, Vec<Category>)],
    transactions: &[(Family, Vec<Transaction>)],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::ADMIN_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-8"
            {
                h1 class="text-2xl font-bold" { "Admin Dashboard" }

                (users_section(users))

                @for (family, family_categories) in categories {
                    (categories_section(*family, family_categories))
                }

                @for (family, family_transactions) in transactions {
                    (transactions_section(*family, family_transactions))
                }
            }
        }
    };

    base("Admin", &content)
}

fn section(title: String, body: Markup) -> Markup {
    html! {
        details class="rounded border border-gray-200 dark:border-gray-700 p-4" open
        {
            summary class="text-lg font-semibold cursor-pointer" { (title) }

            div class="mt-4 overflow-x-auto" { (body) }
        }
    }
}

fn users_section(users: &[User]) -> Markup {
    let body = html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Email" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "First Name" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Last Name" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Role" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "" }
                }
            }

            tbody
            {
                @for user in users {
                    (user_row(user))
                }
            }
        }
    };

    section(format!("Users ({})", users.len()), body)
}

fn user_row(user: &User) -> Markup {
    let update_endpoint =
        endpoints::format_user_endpoint(endpoints::PUT_ADMIN_USER, user.id.as_str());

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (user.id) }

            td colspan="4" class=(TABLE_CELL_STYLE)
            {
                form
                    hx-put=(update_endpoint)
                    hx-target-error="#alert-container"
                    class="flex flex-wrap items-center gap-2"
                {
                    input
                        type="email"
                        name="email"
                        value=(user.email)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    input
                        type="text"
                        name="first_name"
                        value=[user.first_name.as_deref()]
                        placeholder="First name"
                        class=(FORM_TEXT_INPUT_STYLE);

                    input
                        type="text"
                        name="last_name"
                        value=[user.last_name.as_deref()]
                        placeholder="Last name"
                        class=(FORM_TEXT_INPUT_STYLE);

                    select name="role" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value=(Role::User.as_str()) selected[user.role == Role::User]
                        {
                            "user"
                        }
                        option value=(Role::Admin.as_str()) selected[user.role == Role::Admin]
                        {
                            "admin"
                        }
                    }

                    button type="submit" class="px-3 py-1 bg-blue-500 text-white rounded"
                    {
                        "Save"
                    }
                }
            }

            td class=(TABLE_CELL_STYLE) { (user.created_at) }
            td class=(TABLE_CELL_STYLE) {}
        }
    }
}

fn categories_section(family: Family, categories: &[Category]) -> Markup {
    let create_form = html! {
        form
            hx-post=(endpoints::POST_ADMIN_CATEGORY)
            hx-target-error="#alert-container"
            class="flex flex-wrap items-center gap-2 mb-4"
        {
            input type="hidden" name="family" value=(family.as_str());

            input
                type="text"
                name="name"
                placeholder="New category name"
                required
                class=(FORM_TEXT_INPUT_STYLE);

            input
                type="text"
                name="description"
                placeholder="Description (optional)"
                class=(FORM_TEXT_INPUT_STYLE);

            button type="submit" class="px-3 py-1 bg-blue-500 text-white rounded" { "Add" }
        }
    };

    let body = html! {
        (create_form)

        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Active" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "" }
                }
            }

            tbody
            {
                @for category in categories {
                    (category_row(family, category))
                }
            }
        }
    };

    section(
        format!("{} Categories ({})", family_title(family), categories.len()),
        body,
    )
}

fn category_row(family: Family, category: &Category) -> Markup {
    let update_endpoint =
        endpoints::format_family_endpoint(endpoints::PUT_ADMIN_CATEGORY, family, category.id);
    let delete_endpoint =
        endpoints::format_family_endpoint(endpoints::DELETE_ADMIN_CATEGORY, family, category.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (category.id) }

            td class=(TABLE_CELL_STYLE)
            {
                form
                    hx-put=(update_endpoint)
                    hx-target-error="#alert-container"
                    class="flex flex-wrap items-center gap-2"
                {
                    input
                        type="text"
                        name="name"
                        value=(category.name)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    input
                        type="text"
                        name="description"
                        value=[category.description.as_deref()]
                        placeholder="Description"
                        class=(FORM_TEXT_INPUT_STYLE);

                    button type="submit" class="px-3 py-1 bg-blue-500 text-white rounded"
                    {
                        "Save"
                    }
                }
            }

            td class=(TABLE_CELL_STYLE) { @if category.is_active { "Yes" } @else { "No" } }
            td class=(TABLE_CELL_STYLE) { (category.created_at) }

            td class=(TABLE_CELL_STYLE)
            {
                button
                    hx-delete=(delete_endpoint)
                    hx-confirm="Delete this category? Transactions that reference it will keep it from being deleted."
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

fn transactions_section(family: Family, transactions: &[Transaction]) -> Markup {
    let body = html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "User" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Details" }
                }
            }

            tbody
            {
                @for transaction in transactions {
                    (transaction_row(family, transaction))
                }
            }
        }
    };

    section(
        format!(
            "{} Transactions ({})",
            family_title(family),
            transactions.len()
        ),
        body,
    )
}

fn transaction_row(family: Family, transaction: &Transaction) -> Markup {
    let update_endpoint = endpoints::format_family_endpoint(
        endpoints::PUT_ADMIN_TRANSACTION,
        family,
        transaction.id,
    );

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.id) }
            td class=(TABLE_CELL_STYLE) { (transaction.user_id) }
            td class=(TABLE_CELL_STYLE) { (format_currency(transaction.amount)) }

            td class=(TABLE_CELL_STYLE)
            {
                form
                    hx-put=(update_endpoint)
                    hx-target-error="#alert-container"
                    class="flex flex-wrap items-center gap-2"
                {
                    input
                        type="number"
                        name="category_id"
                        value=(transaction.category_id)
                        min="1"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    input
                        type="number"
                        name="amount"
                        value=(transaction.amount)
                        step="0.01"
                        min="0.01"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    input
                        type="text"
                        name="description"
                        value=(transaction.description)
                        minlength="3"
                        maxlength="300"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    input
                        type="date"
                        name="date"
                        value=(transaction.date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    button type="submit" class="px-3 py-1 bg-blue-500 text-white rounded"
                    {
                        "Save"
                    }
                }
            }
        }
    }
}

fn family_title(family: Family) -> &'static str {
    match family {
        Family::Income => "Income",
        Family::Expense => "Expense",
    }
}
