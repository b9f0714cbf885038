//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, category::create_category_tables, transaction::create_transaction_tables,
    user::create_user_table,
};

/// Create the tables for every domain model.
///
/// Table creation runs inside a single exclusive transaction so that a
/// partially created schema is never left behind. Foreign keys are switched
/// on first because SQLite scopes the pragma to the connection and ignores it
/// inside a transaction.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_tables(&transaction)?;
    create_transaction_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}
