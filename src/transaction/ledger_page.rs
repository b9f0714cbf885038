//! The monthly ledger page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::Identity,
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency,
    },
    navigation::NavBar,
    timezone::local_today,
    transaction::{LedgerEntry, get_transactions_by_month},
};

/// The state needed to render the ledger page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The raw, not yet coerced query parameters for the ledger page.
#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

/// Coerce the year parameter, falling back to the current year.
///
/// Values outside `[current year - 100, current year + 1]` and values that do
/// not parse as an integer both fall back to the default rather than being
/// clamped.
fn coerce_year(raw: Option<&str>, today: Date) -> i32 {
    let current_year = today.year();

    raw.and_then(|text| text.trim().parse::<i32>().ok())
        .filter(|year| (current_year - 100..=current_year + 1).contains(year))
        .unwrap_or(current_year)
}

/// Coerce the month parameter, falling back to month 1.
///
/// January rather than the current month is the fallback, mirroring how the
/// ledger has always behaved on bad input.
fn coerce_month(raw: Option<&str>) -> u8 {
    raw.and_then(|text| text.trim().parse::<u8>().ok())
        .filter(|month| (1..=12).contains(month))
        .unwrap_or(1)
}

/// Render one month of the caller's transactions, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<LedgerQuery>,
) -> Response {
    let today = local_today(&state.local_timezone);
    let year = coerce_year(query.year.as_deref(), today);
    let month = coerce_month(query.month.as_deref());

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let entries = match get_transactions_by_month(month, year, &identity.user_id, &connection) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::error!("Could not load transactions for {year}-{month:02}: {error}");
            return error.into_response();
        }
    };

    crate::shared_templates::render(StatusCode::OK, ledger_view(month, year, &entries))
}

fn ledger_view(month: u8, year: i32, entries: &[LedgerEntry]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let heading = format!("{} {year}", month_abbreviation(month));

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                div class="flex items-center justify-between mb-4"
                {
                    h1 class="text-2xl font-bold" { (heading) }

                    (month_selector_view(month, year))
                }

                a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "New Transaction" }

                @if entries.is_empty() {
                    p class="text-center py-10 text-lg text-gray-500 dark:text-gray-400"
                    {
                        "There is no transaction for this month."
                    }
                } @else {
                    (ledger_table_view(entries))
                }
            }
        }
    };

    base("Transactions", &content)
}

fn month_selector_view(month: u8, year: i32) -> Markup {
    html! {
        form method="get" action=(endpoints::TRANSACTIONS_VIEW) class="flex items-end gap-2"
        {
            div
            {
                label for="month" class="block text-xs" { "Month" }
                input
                    id="month"
                    type="number"
                    name="month"
                    min="1"
                    max="12"
                    value=(month)
                    class="w-20 p-1 rounded border border-gray-300 dark:border-gray-600 dark:bg-gray-700";
            }

            div
            {
                label for="year" class="block text-xs" { "Year" }
                input
                    id="year"
                    type="number"
                    name="year"
                    value=(year)
                    class="w-24 p-1 rounded border border-gray-300 dark:border-gray-600 dark:bg-gray-700";
            }

            button type="submit" class="px-3 py-1 bg-blue-500 text-white rounded" { "Go" }
        }
    }
}

fn ledger_table_view(entries: &[LedgerEntry]) -> Markup {
    html! {
        table class="w-full mt-4 text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "" }
                }
            }

            tbody
            {
                @for entry in entries {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (entry.date) }
                        td class=(TABLE_CELL_STYLE) { (entry.description) }
                        td class=(TABLE_CELL_STYLE) { (entry.family) }
                        td class=(TABLE_CELL_STYLE) { (entry.category) }
                        td class=(TABLE_CELL_STYLE) { (format_currency(entry.amount)) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            a
                                href=(endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, entry.id))
                                aria-label="Edit transaction"
                                class=(LINK_STYLE)
                            {
                                "Edit"
                            }
                        }
                    }
                }
            }
        }
    }
}

fn month_abbreviation(month: u8) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "Jan",
    }
}
