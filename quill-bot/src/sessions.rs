//! Per-chat session persistence.
//!
//! One row per Telegram chat id, holding the backend access token and the
//! serialized conversation state. Rows carry a TTL: expired sessions read
//! as absent, and every write refreshes the expiry.

use chrono::{Duration, Utc};
use rusqlite::{Connection, Result as SqliteResult, params};
use std::sync::Mutex;

use crate::flow::ChatFlow;

/// One chat's session record.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub chat_id: i64,
    pub access_token: Option<String>,
    pub flow: ChatFlow,
}

impl ChatSession {
    pub fn fresh(chat_id: i64) -> Self {
        Self {
            chat_id,
            access_token: None,
            flow: ChatFlow::Idle,
        }
    }
}

pub struct SessionStore {
    conn: Mutex<Connection>,
    ttl_minutes: i64,
}

impl SessionStore {
    pub fn new(db_path: &str, ttl_minutes: i64) -> SqliteResult<Self> {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS bot_sessions (
                chat_id INTEGER PRIMARY KEY,
                access_token TEXT,
                flow_state TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            ttl_minutes,
        })
    }

    /// Load a chat's session; expired rows read as absent.
    pub fn get(&self, chat_id: i64) -> SqliteResult<Option<ChatSession>> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        let mut stmt = conn.prepare(
            "SELECT chat_id, access_token, flow_state FROM bot_sessions
             WHERE chat_id = ?1 AND expires_at > ?2",
        )?;

        let session = stmt
            .query_row(params![chat_id, now], |row| {
                let flow_json: String = row.get(2)?;
                Ok(ChatSession {
                    chat_id: row.get(0)?,
                    access_token: row.get(1)?,
                    flow: ChatFlow::from_json(&flow_json),
                })
            })
            .ok();

        Ok(session)
    }

    /// Upsert the session and refresh its TTL.
    pub fn put(&self, session: &ChatSession) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.ttl_minutes);

        conn.execute(
            "INSERT INTO bot_sessions (chat_id, access_token, flow_state, updated_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(chat_id) DO UPDATE SET
                access_token = ?2, flow_state = ?3, updated_at = ?4, expires_at = ?5",
            params![
                session.chat_id,
                session.access_token,
                session.flow.to_json(),
                now.to_rfc3339(),
                expires_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Drop a chat's session entirely.
    pub fn clear(&self, chat_id: i64) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM bot_sessions WHERE chat_id = ?1", [chat_id])?;
        Ok(rows > 0)
    }

    /// Purge rows whose TTL has elapsed. Called on startup.
    pub fn sweep_expired(&self) -> SqliteResult<usize> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let rows = conn.execute("DELETE FROM bot_sessions WHERE expires_at <= ?1", [now])?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_store(ttl_minutes: i64) -> (SessionStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("sessions.db");
        let store = SessionStore::new(db_path.to_str().unwrap(), ttl_minutes)
            .expect("Failed to create session store");
        (store, dir)
    }

    #[test]
    fn test_put_and_get_roundtrip() {
        let (store, _dir) = test_store(60);

        let session = ChatSession {
            chat_id: 42,
            access_token: Some("token".to_string()),
            flow: ChatFlow::AwaitingPassword {
                username: "alice".to_string(),
            },
        };
        store.put(&session).unwrap();

        let loaded = store.get(42).unwrap().unwrap();
        assert_eq!(loaded.access_token.as_deref(), Some("token"));
        assert_eq!(
            loaded.flow,
            ChatFlow::AwaitingPassword {
                username: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_chat_is_none() {
        let (store, _dir) = test_store(60);
        assert!(store.get(7).unwrap().is_none());
    }

    #[test]
    fn test_expired_session_reads_as_absent() {
        // Negative TTL: rows are born expired.
        let (store, _dir) = test_store(-1);

        store.put(&ChatSession::fresh(42)).unwrap();
        assert!(store.get(42).unwrap().is_none());

        assert_eq!(store.sweep_expired().unwrap(), 1);
    }

    #[test]
    fn test_clear() {
        let (store, _dir) = test_store(60);

        store.put(&ChatSession::fresh(42)).unwrap();
        assert!(store.clear(42).unwrap());
        assert!(store.get(42).unwrap().is_none());
        assert!(!store.clear(42).unwrap());
    }
}
