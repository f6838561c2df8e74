//! User database operations

use chrono::Utc;
use rusqlite::params;

use super::super::Database;
use crate::error::StoreError;
use crate::models::User;

impl Database {
    /// Insert a new user. The caller hashes the password first so no
    /// plaintext ever reaches this layer.
    pub fn create_user(&self, username: &str, hashed_password: &str) -> Result<User, StoreError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        match conn.execute(
            "INSERT INTO users (username, hashed_password, created_at) VALUES (?1, ?2, ?3)",
            params![username, hashed_password, now.to_rfc3339()],
        ) {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(StoreError::Conflict(format!(
                    "Username '{}' is already taken",
                    username
                )));
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();

        Ok(User {
            id,
            username: username.to_string(),
            hashed_password: hashed_password.to_string(),
            created_at: now,
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, username, hashed_password, created_at FROM users WHERE username = ?1",
        )?;

        match stmt.query_row([username], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let created_at_str: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        hashed_password: row.get(2)?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .unwrap()
            .with_timezone(&Utc),
    })
}
