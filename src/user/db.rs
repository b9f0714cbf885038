//! Database operations for users.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    auth::Identity,
    user::{Role, User, UserId},
};

/// Create or refresh the user row for a verified identity.
///
/// Users are created lazily the first time they record a transaction. If the
/// row already exists, the profile fields are refreshed from the identity
/// provider's data so that email and name changes propagate.
pub fn ensure_user(identity: &Identity, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO user (id, email, first_name, last_name) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            email = excluded.email,
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            updated_at = datetime('now')",
        params![
            identity.user_id.as_str(),
            identity.email,
            identity.first_name,
            identity.last_name,
        ],
    )?;

    Ok(())
}

/// Retrieve a single user by ID.
pub fn get_user(user_id: &UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, first_name, last_name, role, created_at, updated_at
             FROM user WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_str())], map_user_row)
        .map_err(|error| error.into())
}

/// Resolve only a user's role.
///
/// The admin gate calls this on every request so that a role change takes
/// effect without waiting for the session to be recreated.
pub fn get_user_role(user_id: &UserId, connection: &Connection) -> Result<Role, Error> {
    connection
        .prepare("SELECT role FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_str())], |row| {
            let raw_role: String = row.get(0)?;
            Ok(Role::from_db(&raw_role))
        })
        .map_err(|error| error.into())
}

/// Retrieve all users ordered by creation time.
pub fn get_all_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare(
            "SELECT id, email, first_name, last_name, role, created_at, updated_at
             FROM user ORDER BY created_at ASC, id ASC",
        )?
        .query_map([], map_user_row)?
        .map(|maybe_user| maybe_user.map_err(|error| error.into()))
        .collect()
}

/// Update a user's profile fields and role. Returns an error if the user
/// doesn't exist.
pub fn update_user(
    user_id: &UserId,
    email: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    role: Role,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET
            email = ?1,
            first_name = ?2,
            last_name = ?3,
            role = ?4,
            updated_at = datetime('now')
         WHERE id = ?5",
        params![email, first_name, last_name, role.as_str(), user_id.as_str()],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingUser);
    }

    Ok(())
}

/// Initialize the user table.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                first_name TEXT,
                last_name TEXT,
                role TEXT NOT NULL DEFAULT 'user',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
        (),
    )?;

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id: String = row.get(0)?;
    let raw_role: String = row.get(4)?;

    Ok(User {
        id: UserId::new(raw_id),
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        role: Role::from_db(&raw_role),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
