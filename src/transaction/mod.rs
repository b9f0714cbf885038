//! Income and expense transactions: the ledger, the CRUD endpoints, and the
//! family-migration logic that moves records between the two tables.

mod admin_edit_endpoint;
mod create_endpoint;
mod db;
mod delete_endpoint;
mod domain;
mod edit_endpoint;
mod edit_page;
mod ledger_page;
mod new_transaction_page;
mod validate;

pub use admin_edit_endpoint::admin_update_transaction_endpoint;
pub use create_endpoint::create_transaction_endpoint;
pub use db::{
    admin_update_transaction, create_transaction, create_transaction_tables, delete_transaction,
    get_all_transactions, get_transaction, get_transactions_by_month, update_transaction,
};
pub use delete_endpoint::delete_transaction_endpoint;
pub use domain::{LedgerEntry, Transaction, TransactionForm, TransactionId};
pub use edit_endpoint::update_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use ledger_page::get_transactions_page;
pub use new_transaction_page::get_new_transaction_page;
pub use validate::validate_transaction;

#[cfg(test)]
pub(crate) use db::test_fixtures;

use rusqlite::Connection;

use crate::{
    Error,
    category::{Category, get_categories},
    family::Family,
};

/// Load both families' category lists for the transaction forms.
pub(crate) fn load_category_lists(
    connection: &Connection,
) -> Result<(Vec<Category>, Vec<Category>), Error> {
    let income_categories = get_categories(Family::Income, connection)?;
    let expense_categories = get_categories(Family::Expense, connection)?;

    Ok((income_categories, expense_categories))
}
