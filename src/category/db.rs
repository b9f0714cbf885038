//! Database operations for categories.
//!
//! Every function takes a [Family] that selects which of the two physical
//! category tables to operate against. The family picks the table by name,
//! it is never a query filter.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
    family::Family,
};

/// Create a category and return it with its generated ID and server-assigned
/// defaults.
pub fn create_category(
    name: CategoryName,
    description: Option<&str>,
    family: Family,
    connection: &Connection,
) -> Result<Category, Error> {
    let query = format!(
        "INSERT INTO {} (name, description) VALUES (?1, ?2)
         RETURNING id, name, description, is_active, created_at, updated_at",
        family.category_table()
    );

    connection
        .prepare(&query)?
        .query_row(params![name.as_ref(), description], map_category_row)
        .map_err(|error| into_category_error(error, &name))
}

/// Update a category's name and description. Returns the updated row, or an
/// error if the category doesn't exist in the family.
pub fn update_category(
    id: CategoryId,
    name: CategoryName,
    description: Option<&str>,
    family: Family,
    connection: &Connection,
) -> Result<Category, Error> {
    let query = format!(
        "UPDATE {} SET name = ?1, description = ?2, updated_at = datetime('now')
         WHERE id = ?3
         RETURNING id, name, description, is_active, created_at, updated_at",
        family.category_table()
    );

    connection
        .prepare(&query)?
        .query_row(params![name.as_ref(), description, id], map_category_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingCategory,
            error => into_category_error(error, &name),
        })
}

/// Delete a category by ID. Returns an error if the category doesn't exist in
/// the family.
pub fn delete_category(
    id: CategoryId,
    family: Family,
    connection: &Connection,
) -> Result<(), Error> {
    let query = format!("DELETE FROM {} WHERE id = ?1", family.category_table());

    let rows_affected = connection.execute(&query, [id]).map_err(|error| match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::CategoryInUse,
        error => error.into(),
    })?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Retrieve all of a family's categories ordered alphabetically by name.
pub fn get_categories(family: Family, connection: &Connection) -> Result<Vec<Category>, Error> {
    let query = format!(
        "SELECT id, name, description, is_active, created_at, updated_at
         FROM {} ORDER BY name ASC",
        family.category_table()
    );

    connection
        .prepare(&query)?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Initialize both category tables and their name indexes.
pub fn create_category_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    for family in Family::ALL {
        let table = family.category_table();

        connection.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_name ON {table}(name);",
        ))?;
    }

    Ok(())
}

/// Classify a store error from a category write, attaching the offending name
/// to unique constraint violations.
fn into_category_error(error: rusqlite::Error, name: &CategoryName) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateCategoryName(name.to_string()),
        error => error.into(),
    }
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);

    Ok(Category {
        id,
        name,
        description: row.get(2)?,
        is_active: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
