//! Note and tag database operations
//!
//! All note operations are scoped to an owner id: a note belonging to
//! another user is indistinguishable from a missing one. Every mutation
//! (create/update/delete plus its tag sync) runs in a single transaction.

use std::collections::HashSet;

use chrono::Utc;
use rusqlite::{Connection, params};

use super::super::Database;
use crate::error::StoreError;
use crate::models::{Note, Tag};

impl Database {
    /// Create a note and attach its tag set in one transaction.
    pub fn create_note(
        &self,
        owner: i64,
        title: &str,
        content: &str,
        tag_names: &[String],
    ) -> Result<Note, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        tx.execute(
            "INSERT INTO notes (title, content, created_at, updated_at, user_id)
             VALUES (?1, ?2, ?3, ?3, ?4)",
            params![title, content, now, owner],
        )?;
        let note_id = tx.last_insert_rowid();

        sync_note_tags(&tx, note_id, tag_names)?;
        tx.commit()?;

        load_note(&conn, owner, note_id)?.ok_or(StoreError::NoteNotFound)
    }

    /// List the owner's notes, newest id last. With a tag filter the tag
    /// must exist; an existing tag with no matches yields an empty list.
    pub fn list_notes(&self, owner: i64, tag: Option<&str>) -> Result<Vec<Note>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let ids: Vec<i64> = match tag {
            None => {
                let mut stmt =
                    conn.prepare("SELECT id FROM notes WHERE user_id = ?1 ORDER BY id")?;
                let rows = stmt.query_map([owner], |row| row.get(0))?;
                rows.collect::<rusqlite::Result<_>>()?
            }
            Some(name) => {
                let tag_id = lookup_tag_id(&conn, name)?.ok_or(StoreError::TagNotFound)?;
                let mut stmt = conn.prepare(
                    "SELECT n.id FROM notes n
                     JOIN note_tags nt ON nt.note_id = n.id
                     WHERE n.user_id = ?1 AND nt.tag_id = ?2
                     ORDER BY n.id",
                )?;
                let rows = stmt.query_map(params![owner, tag_id], |row| row.get(0))?;
                rows.collect::<rusqlite::Result<_>>()?
            }
        };

        let mut notes = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(note) = load_note(&conn, owner, id)? {
                notes.push(note);
            }
        }
        Ok(notes)
    }

    /// Fetch a single owned note.
    pub fn get_note(&self, owner: i64, note_id: i64) -> Result<Option<Note>, StoreError> {
        let conn = self.conn.lock().unwrap();
        load_note(&conn, owner, note_id)
    }

    /// Full replacement of title, content and tag set, in one transaction.
    pub fn update_note(
        &self,
        owner: i64,
        note_id: i64,
        title: &str,
        content: &str,
        tag_names: &[String],
    ) -> Result<Note, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        let updated = tx.execute(
            "UPDATE notes SET title = ?1, content = ?2, updated_at = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![title, content, now, note_id, owner],
        )?;
        if updated == 0 {
            return Err(StoreError::NoteNotFound);
        }

        sync_note_tags(&tx, note_id, tag_names)?;
        tx.commit()?;

        load_note(&conn, owner, note_id)?.ok_or(StoreError::NoteNotFound)
    }

    /// Delete an owned note and its tag associations. Tag rows survive.
    /// Returns the note as it was, so callers can report what went away.
    pub fn delete_note(&self, owner: i64, note_id: i64) -> Result<Note, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let note = load_note(&tx, owner, note_id)?.ok_or(StoreError::NoteNotFound)?;

        tx.execute("DELETE FROM note_tags WHERE note_id = ?1", [note_id])?;
        tx.execute("DELETE FROM notes WHERE id = ?1", [note_id])?;
        tx.commit()?;

        Ok(note)
    }

    /// Tag-filtered listing under its search alias.
    pub fn search_notes_by_tag(&self, owner: i64, tag: &str) -> Result<Vec<Note>, StoreError> {
        self.list_notes(owner, Some(tag))
    }
}

/// Reconcile a note's attached tags against the desired name set:
/// detach what is no longer wanted, attach the rest, creating missing
/// tag rows on the way. Detached tags are never deleted.
fn sync_note_tags(conn: &Connection, note_id: i64, tag_names: &[String]) -> Result<(), StoreError> {
    let desired: HashSet<String> = tag_names
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let existing: HashSet<String> = {
        let mut stmt = conn.prepare(
            "SELECT t.name FROM tags t
             JOIN note_tags nt ON nt.tag_id = t.id
             WHERE nt.note_id = ?1",
        )?;
        let rows = stmt.query_map([note_id], |row| row.get::<_, String>(0))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    for name in existing.difference(&desired) {
        conn.execute(
            "DELETE FROM note_tags
             WHERE note_id = ?1 AND tag_id = (SELECT id FROM tags WHERE name = ?2)",
            params![note_id, name],
        )?;
    }

    for name in desired.difference(&existing) {
        let tag_id = match lookup_tag_id(conn, name)? {
            Some(id) => id,
            None => {
                conn.execute("INSERT INTO tags (name) VALUES (?1)", [name])?;
                conn.last_insert_rowid()
            }
        };
        // OR IGNORE keeps a retried sync idempotent
        conn.execute(
            "INSERT OR IGNORE INTO note_tags (note_id, tag_id) VALUES (?1, ?2)",
            params![note_id, tag_id],
        )?;
    }

    Ok(())
}

fn lookup_tag_id(conn: &Connection, name: &str) -> Result<Option<i64>, StoreError> {
    let mut stmt = conn.prepare("SELECT id FROM tags WHERE name = ?1")?;
    match stmt.query_row([name], |row| row.get(0)) {
        Ok(id) => Ok(Some(id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn load_note(conn: &Connection, owner: i64, note_id: i64) -> Result<Option<Note>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, content, created_at, updated_at, user_id
         FROM notes WHERE id = ?1 AND user_id = ?2",
    )?;

    let note = match stmt.query_row(params![note_id, owner], |row| {
        let created_at_str: String = row.get(3)?;
        let updated_at_str: String = row.get(4)?;
        Ok(Note {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            created_at: chrono::DateTime::parse_from_rfc3339(&created_at_str)
                .unwrap()
                .with_timezone(&Utc),
            updated_at: chrono::DateTime::parse_from_rfc3339(&updated_at_str)
                .unwrap()
                .with_timezone(&Utc),
            user_id: row.get(5)?,
            tags: Vec::new(),
        })
    }) {
        Ok(note) => note,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut note = note;
    note.tags = load_note_tags(conn, note_id)?;
    Ok(Some(note))
}

fn load_note_tags(conn: &Connection, note_id: i64) -> Result<Vec<Tag>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name FROM tags t
         JOIN note_tags nt ON nt.tag_id = t.id
         WHERE nt.note_id = ?1
         ORDER BY t.name",
    )?;

    let tags = stmt
        .query_map([note_id], |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(tags)
}
