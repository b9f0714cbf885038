//! Database operations for transactions.
//!
//! Transactions live in two parallel tables selected by [Family]. Reads that
//! take only an ID probe the income table first and the expense table second,
//! matching how the ledger resolves records. Changing a transaction's family
//! moves the row between tables inside a single SQL transaction, and the row
//! receives a new ID in the target table.

use rusqlite::{Connection, Row, params};
use time::{Date, Month};

use crate::{
    Error,
    category::CategoryId,
    family::Family,
    transaction::{LedgerEntry, Transaction, TransactionForm, TransactionId},
    user::UserId,
};

/// Create a new transaction in the family table named by the form.
///
/// The caller is responsible for validating the form first, see
/// [crate::transaction::validate_transaction], and for making sure the user
/// row exists, see [crate::user::ensure_user].
///
/// # Errors
/// This function will return an:
/// - [Error::InvalidCategory] if the category ID does not refer to a category
///   in the transaction's family,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    form: &TransactionForm,
    user_id: &UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let family = form.family;
    let query = format!(
        "INSERT INTO {} (user_id, category_id, amount, description, date)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING id, user_id, category_id, amount, description, date",
        family.transaction_table()
    );

    connection
        .prepare(&query)?
        .query_row(
            params![
                user_id.as_str(),
                form.category_id,
                form.amount,
                form.description,
                form.date,
            ],
            |row| map_transaction_row(row, family),
        )
        .map_err(|error| into_transaction_error(error, form.category_id))
}

/// Retrieve a transaction by ID, scoped to its owner.
///
/// The income family is searched first, then the expense family; the first
/// match is returned enriched with its category name. Ownership is part of
/// the query predicate, so another user's transaction reads as missing.
///
/// # Errors
/// This function will return an:
/// - [Error::NotFound] if neither family holds a row with `id` owned by
///   `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: &UserId,
    connection: &Connection,
) -> Result<LedgerEntry, Error> {
    for family in Family::ALL {
        let query = format!(
            "SELECT t.id, t.amount, t.date, t.description, c.name, t.category_id
             FROM {} t
             INNER JOIN {} c ON t.category_id = c.id
             WHERE t.id = ?1 AND t.user_id = ?2",
            family.transaction_table(),
            family.category_table(),
        );

        let result = connection.prepare(&query)?.query_row(
            params![id, user_id.as_str()],
            |row| map_ledger_row(row, family),
        );

        match result {
            Ok(entry) => return Ok(entry),
            Err(rusqlite::Error::QueryReturnedNoRows) => continue,
            Err(error) => return Err(error.into()),
        }
    }

    Err(Error::NotFound)
}

/// Retrieve one month of a user's transactions from both families, sorted by
/// date descending.
///
/// The range covers the whole month, first and last day inclusive. Income
/// rows are queried before expense rows and the sort is stable, so entries
/// with equal dates keep that concatenation order.
///
/// # Errors
/// This function will return an:
/// - [Error::InvalidDateFormat] if `month` is not in 1 to 12 or the range
///   cannot be built,
/// - or [Error::SqlError] if there is some SQL error.
pub fn get_transactions_by_month(
    month: u8,
    year: i32,
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<LedgerEntry>, Error> {
    let (first_day, last_day) = month_range(month, year)?;

    let mut entries = Vec::new();

    for family in Family::ALL {
        let query = format!(
            "SELECT t.id, t.amount, t.date, t.description, c.name, t.category_id
             FROM {} t
             INNER JOIN {} c ON t.category_id = c.id
             WHERE t.user_id = ?1 AND t.date BETWEEN ?2 AND ?3",
            family.transaction_table(),
            family.category_table(),
        );

        let family_entries: Result<Vec<LedgerEntry>, Error> = connection
            .prepare(&query)?
            .query_map(params![user_id.as_str(), first_day, last_day], |row| {
                map_ledger_row(row, family)
            })?
            .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
            .collect();

        entries.extend(family_entries?);
    }

    entries.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(entries)
}

/// Update a transaction, moving it between families when its family changed.
///
/// The row's current family is found by probing both tables scoped by ID and
/// owner. If the submitted family matches, the fields are updated in place
/// and the ID is preserved. Otherwise the row is deleted from the old table
/// and inserted into the new one inside a single SQL transaction; the store
/// assigns a new ID, so callers must treat the identity as changed across a
/// family migration.
///
/// Returns the ID of the affected row, which is `id` for in-place updates and
/// the newly assigned ID after a migration.
///
/// # Errors
/// This function will return an:
/// - [Error::NotFound] if neither family holds a row with `id` owned by
///   `user_id`,
/// - [Error::InvalidCategory] if the category ID does not refer to a category
///   in the target family,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    form: &TransactionForm,
    user_id: &UserId,
    connection: &mut Connection,
) -> Result<TransactionId, Error> {
    let current_family = match find_current_family(id, user_id, connection)? {
        Some(family) => family,
        None => return Err(Error::NotFound),
    };

    if current_family == form.family {
        let query = format!(
            "UPDATE {} SET
                category_id = ?1,
                amount = ?2,
                description = ?3,
                date = ?4,
                updated_at = datetime('now')
             WHERE id = ?5 AND user_id = ?6",
            form.family.transaction_table()
        );

        let rows_affected = connection
            .execute(
                &query,
                params![
                    form.category_id,
                    form.amount,
                    form.description,
                    form.date,
                    id,
                    user_id.as_str(),
                ],
            )
            .map_err(|error| into_transaction_error(error, form.category_id))?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingTransaction);
        }

        return Ok(id);
    }

    // The delete and insert must not be separable: a crash between them would
    // lose the transaction row.
    let sql_transaction = connection.transaction()?;

    sql_transaction.execute(
        &format!(
            "DELETE FROM {} WHERE id = ?1 AND user_id = ?2",
            current_family.transaction_table()
        ),
        params![id, user_id.as_str()],
    )?;

    let new_id: TransactionId = sql_transaction
        .prepare(&format!(
            "INSERT INTO {} (user_id, category_id, amount, description, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
            form.family.transaction_table()
        ))?
        .query_row(
            params![
                user_id.as_str(),
                form.category_id,
                form.amount,
                form.description,
                form.date,
            ],
            |row| row.get(0),
        )
        .map_err(|error| into_transaction_error(error, form.category_id))?;

    sql_transaction.commit()?;

    Ok(new_id)
}

/// Delete a transaction by ID within a family, scoped to its owner.
///
/// Returns the number of rows deleted. Deleting a row that does not exist or
/// belongs to someone else matches zero rows, which is a no-op rather than an
/// error.
pub fn delete_transaction(
    id: TransactionId,
    family: Family,
    user_id: &UserId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            &format!(
                "DELETE FROM {} WHERE id = ?1 AND user_id = ?2",
                family.transaction_table()
            ),
            params![id, user_id.as_str()],
        )
        .map_err(|error| error.into())
}

/// Retrieve every transaction in a family across all users, newest first.
///
/// Only the admin dashboard uses this, behind the admin gate.
pub fn get_all_transactions(
    family: Family,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let query = format!(
        "SELECT id, user_id, category_id, amount, description, date
         FROM {} ORDER BY date DESC, id ASC",
        family.transaction_table()
    );

    connection
        .prepare(&query)?
        .query_map([], |row| map_transaction_row(row, family))?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Update any user's transaction in place within a family.
///
/// The admin path never migrates between families and is not scoped by
/// owner. Returns an error if the family holds no row with `id`.
pub fn admin_update_transaction(
    id: TransactionId,
    family: Family,
    category_id: CategoryId,
    amount: f64,
    description: &str,
    date: Date,
    connection: &Connection,
) -> Result<(), Error> {
    let query = format!(
        "UPDATE {} SET
            category_id = ?1,
            amount = ?2,
            description = ?3,
            date = ?4,
            updated_at = datetime('now')
         WHERE id = ?5",
        family.transaction_table()
    );

    let rows_affected = connection
        .execute(&query, params![category_id, amount, description, date, id])
        .map_err(|error| into_transaction_error(error, category_id))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Initialize both transaction tables and their owner/date indexes.
pub fn create_transaction_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    for family in Family::ALL {
        let table = family.transaction_table();
        let category_table = family.category_table();

        connection.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES {category_table}(id)
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_user_date ON {table}(user_id, date);",
        ))?;
    }

    Ok(())
}

/// The first and last day of a month, both inclusive.
fn month_range(month: u8, year: i32) -> Result<(Date, Date), Error> {
    let into_date_error = |error: &dyn std::fmt::Display| {
        Error::InvalidDateFormat(error.to_string(), format!("{year}-{month:02}"))
    };

    let month = Month::try_from(month).map_err(|error| into_date_error(&error))?;

    let first_day =
        Date::from_calendar_date(year, month, 1).map_err(|error| into_date_error(&error))?;
    let last_day =
        Date::from_calendar_date(year, month, time::util::days_in_year_month(year, month))
            .map_err(|error| into_date_error(&error))?;

    Ok((first_day, last_day))
}

/// Which family, if any, holds a row with `id` owned by `user_id`.
///
/// Probes the income table first, matching the read path, so in the unlikely
/// case both families hold the ID the income row wins.
fn find_current_family(
    id: TransactionId,
    user_id: &UserId,
    connection: &Connection,
) -> Result<Option<Family>, Error> {
    for family in Family::ALL {
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = ?1 AND user_id = ?2)",
            family.transaction_table()
        );

        let exists: bool =
            connection.query_row(&query, params![id, user_id.as_str()], |row| row.get(0))?;

        if exists {
            return Ok(Some(family));
        }
    }

    Ok(None)
}

/// Classify a store error from a transaction write, attaching the offending
/// category ID to foreign key violations.
fn into_transaction_error(error: rusqlite::Error, category_id: CategoryId) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidCategory(Some(category_id)),
        error => error.into(),
    }
}

fn map_transaction_row(row: &Row, family: Family) -> Result<Transaction, rusqlite::Error> {
    let raw_user_id: String = row.get(1)?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserId::new(raw_user_id),
        category_id: row.get(2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
        date: row.get(5)?,
        family,
    })
}

fn map_ledger_row(row: &Row, family: Family) -> Result<LedgerEntry, rusqlite::Error> {
    Ok(LedgerEntry {
        id: row.get(0)?,
        amount: row.get(1)?,
        date: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        category_id: row.get(5)?,
        family,
    })
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use rusqlite::Connection;

    use crate::{
        auth::Identity,
        category::{CategoryId, CategoryName, create_category},
        db::initialize,
        family::Family,
        user::{UserId, ensure_user},
    };

    /// An in-memory database with the full schema.
    pub(crate) fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    pub(crate) fn test_identity(user_id: &str) -> Identity {
        Identity {
            user_id: UserId::new(user_id),
            email: format!("{user_id}@example.com"),
            first_name: None,
            last_name: None,
        }
    }

    /// Insert a user plus one category per family, returning
    /// `(user_id, income_category_id, expense_category_id)`.
    pub(crate) fn seed_user_and_categories(
        user_id: &str,
        connection: &Connection,
    ) -> (UserId, CategoryId, CategoryId) {
        let identity = test_identity(user_id);
        ensure_user(&identity, connection).expect("Could not create test user");

        let income_category = create_category(
            CategoryName::new_unchecked("Salary"),
            None,
            Family::Income,
            connection,
        )
        .expect("Could not create income category");
        let expense_category = create_category(
            CategoryName::new_unchecked("Groceries"),
            None,
            Family::Expense,
            connection,
        )
        .expect("Could not create expense category");

        (identity.user_id, income_category.id, expense_category.id)
    }
}



#[cfg(test)]
mod update_tests {
    use time::macros::date;

    use crate::{Error, family::Family, transaction::TransactionForm, user::UserId};

    use super::{
        create_transaction, get_all_transactions, get_transaction, get_transactions_by_month,
        test_fixtures::{get_test_connection, seed_user_and_categories},
        update_transaction,
    };

    #[test]
    fn same_family_update_preserves_the_id() {
        let mut connection = get_test_connection();
        let (user_id, _, expense_category) = seed_user_and_categories("user_1", &connection);
        let created = create_transaction(
            &TransactionForm {
                amount: 50.0,
                description: "Groceries".to_string(),
                category_id: expense_category,
                date: date!(2024 - 03 - 15),
                family: Family::Expense,
            },
            &user_id,
            &connection,
        )
        .unwrap();

        let updated_form = TransactionForm {
            amount: 62.5,
            description: "Groceries and sundries".to_string(),
            category_id: expense_category,
            date: date!(2024 - 03 - 16),
            family: Family::Expense,
        };
        let updated_id =
            update_transaction(created.id, &updated_form, &user_id, &mut connection)
                .expect("Could not update transaction");

        assert_eq!(updated_id, created.id);

        let entry = get_transaction(created.id, &user_id, &connection).unwrap();
        assert_eq!(entry.amount, 62.5);
        assert_eq!(entry.description, "Groceries and sundries");
        assert_eq!(entry.date, date!(2024 - 03 - 16));
        assert_eq!(entry.family, Family::Expense);
    }

    #[test]
    fn family_change_moves_the_row_between_tables() {
        let mut connection = get_test_connection();
        let (user_id, income_category, expense_category) =
            seed_user_and_categories("user_1", &connection);
        let created = create_transaction(
            &TransactionForm {
                amount: 120.0,
                description: "Refund".to_string(),
                category_id: expense_category,
                date: date!(2024 - 03 - 10),
                family: Family::Expense,
            },
            &user_id,
            &connection,
        )
        .unwrap();

        let migrated_form = TransactionForm {
            amount: 120.0,
            description: "Refund".to_string(),
            category_id: income_category,
            date: date!(2024 - 03 - 10),
            family: Family::Income,
        };
        let new_id = update_transaction(created.id, &migrated_form, &user_id, &mut connection)
            .expect("Could not migrate transaction");

        // The old family no longer holds the row.
        assert!(get_all_transactions(Family::Expense, &connection)
            .unwrap()
            .is_empty());

        // Exactly one row with matching fields exists in the new family.
        let income_rows = get_all_transactions(Family::Income, &connection).unwrap();
        assert_eq!(income_rows.len(), 1);
        assert_eq!(income_rows[0].id, new_id);
        assert_eq!(income_rows[0].amount, 120.0);
        assert_eq!(income_rows[0].description, "Refund");
        assert_eq!(income_rows[0].date, date!(2024 - 03 - 10));

        // The ledger resolves the new ID to the income family.
        let entry = get_transaction(new_id, &user_id, &connection).unwrap();
        assert_eq!(entry.family, Family::Income);
    }

    #[test]
    fn migrated_row_keeps_a_single_ledger_entry() {
        let mut connection = get_test_connection();
        let (user_id, income_category, expense_category) =
            seed_user_and_categories("user_1", &connection);
        let created = create_transaction(
            &TransactionForm {
                amount: 15.0,
                description: "Oops, income".to_string(),
                category_id: expense_category,
                date: date!(2024 - 03 - 05),
                family: Family::Expense,
            },
            &user_id,
            &connection,
        )
        .unwrap();

        update_transaction(
            created.id,
            &TransactionForm {
                amount: 15.0,
                description: "Oops, income".to_string(),
                category_id: income_category,
                date: date!(2024 - 03 - 05),
                family: Family::Income,
            },
            &user_id,
            &mut connection,
        )
        .unwrap();

        let entries = get_transactions_by_month(3, 2024, &user_id, &connection).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].family, Family::Income);
    }

    #[test]
    fn failed_migration_leaves_the_original_row_in_place() {
        let mut connection = get_test_connection();
        let (user_id, income_category, expense_category) =
            seed_user_and_categories("user_1", &connection);
        let created = create_transaction(
            &TransactionForm {
                amount: 75.0,
                description: "Stays put".to_string(),
                category_id: expense_category,
                date: date!(2024 - 03 - 12),
                family: Family::Expense,
            },
            &user_id,
            &connection,
        )
        .unwrap();

        // The target family has no category with this ID, so the insert half
        // of the migration fails and the delete must roll back with it.
        let missing_income_category = income_category + 100;
        let result = update_transaction(
            created.id,
            &TransactionForm {
                amount: 75.0,
                description: "Stays put".to_string(),
                category_id: missing_income_category,
                date: date!(2024 - 03 - 12),
                family: Family::Income,
            },
            &user_id,
            &mut connection,
        );

        assert_eq!(
            result,
            Err(Error::InvalidCategory(Some(missing_income_category)))
        );

        let entry = get_transaction(created.id, &user_id, &connection)
            .expect("original row should still exist");
        assert_eq!(entry.family, Family::Expense);
        assert_eq!(entry.description, "Stays put");
    }

    #[test]
    fn update_fails_when_the_row_is_in_neither_family() {
        let mut connection = get_test_connection();
        let (user_id, _, expense_category) = seed_user_and_categories("user_1", &connection);

        let result = update_transaction(
            1337,
            &TransactionForm {
                amount: 1.0,
                description: "Ghost".to_string(),
                category_id: expense_category,
                date: date!(2024 - 03 - 01),
                family: Family::Expense,
            },
            &user_id,
            &mut connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_cannot_touch_another_users_row() {
        let mut connection = get_test_connection();
        let (user_id, _, expense_category) = seed_user_and_categories("user_1", &connection);
        let created = create_transaction(
            &TransactionForm {
                amount: 50.0,
                description: "Groceries".to_string(),
                category_id: expense_category,
                date: date!(2024 - 03 - 15),
                family: Family::Expense,
            },
            &user_id,
            &connection,
        )
        .unwrap();
        crate::user::ensure_user(
            &super::test_fixtures::test_identity("user_2"),
            &connection,
        )
        .unwrap();

        let result = update_transaction(
            created.id,
            &TransactionForm {
                amount: 999.0,
                description: "Hijacked".to_string(),
                category_id: expense_category,
                date: date!(2024 - 03 - 15),
                family: Family::Expense,
            },
            &UserId::new("user_2"),
            &mut connection,
        );

        assert_eq!(result, Err(Error::NotFound));

        let entry = get_transaction(created.id, &user_id, &connection).unwrap();
        assert_eq!(entry.amount, 50.0);
    }
}


#[cfg(test)]
mod admin_tests {
    use time::macros::date;

    use crate::{Error, family::Family, transaction::TransactionForm, user::UserId};

    use super::{
        admin_update_transaction, create_transaction, get_all_transactions, get_transaction,
        test_fixtures::{get_test_connection, seed_user_and_categories, test_identity},
    };

    #[test]
    fn admin_update_reaches_any_users_row() {
        let connection = get_test_connection();
        let (user_id, _, expense_category) = seed_user_and_categories("user_1", &connection);
        let created = create_transaction(
            &TransactionForm {
                amount: 50.0,
                description: "Groceries".to_string(),
                category_id: expense_category,
                date: date!(2024 - 03 - 15),
                family: Family::Expense,
            },
            &user_id,
            &connection,
        )
        .unwrap();

        admin_update_transaction(
            created.id,
            Family::Expense,
            expense_category,
            45.0,
            "Groceries (corrected)",
            date!(2024 - 03 - 14),
            &connection,
        )
        .expect("Could not update as admin");

        let entry = get_transaction(created.id, &user_id, &connection).unwrap();
        assert_eq!(entry.amount, 45.0);
        assert_eq!(entry.description, "Groceries (corrected)");
        assert_eq!(entry.date, date!(2024 - 03 - 14));
    }

    #[test]
    fn admin_update_fails_on_missing_row() {
        let connection = get_test_connection();
        let (_, _, expense_category) = seed_user_and_categories("user_1", &connection);

        let result = admin_update_transaction(
            1337,
            Family::Expense,
            expense_category,
            1.0,
            "Ghost",
            date!(2024 - 03 - 14),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn get_all_transactions_spans_users() {
        let connection = get_test_connection();
        let (user_1, _, expense_category) = seed_user_and_categories("user_1", &connection);
        crate::user::ensure_user(&test_identity("user_2"), &connection).unwrap();
        let user_2 = UserId::new("user_2");

        for (user_id, amount) in [(&user_1, 10.0), (&user_2, 20.0)] {
            create_transaction(
                &TransactionForm {
                    amount,
                    description: "entry".to_string(),
                    category_id: expense_category,
                    date: date!(2024 - 03 - 15),
                    family: Family::Expense,
                },
                user_id,
                &connection,
            )
            .unwrap();
        }

        let rows = get_all_transactions(Family::Expense, &connection).unwrap();

        assert_eq!(rows.len(), 2);
    }
}
