use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::Database;
use crate::error::StoreError;
use crate::models::MessageRow;

/// Warbles are short. Matches the 140-character column bound.
pub const MAX_MESSAGE_LEN: usize = 140;

impl Database {
    pub fn create_message(&self, user_id: i64, text: &str) -> Result<MessageRow, StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::validation("message text must not be empty"));
        }
        if text.chars().count() > MAX_MESSAGE_LEN {
            return Err(StoreError::validation(format!(
                "message text exceeds {} characters",
                MAX_MESSAGE_LEN
            )));
        }

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (text, timestamp, user_id) VALUES (?1, ?2, ?3)",
                params![text, Utc::now(), user_id],
            )
            .map_err(map_message_constraint)?;

            let id = conn.last_insert_rowid();
            let row = query_message_by_id(conn, id)?.ok_or(StoreError::NotFound)?;
            debug!("message {} created by user {}", id, user_id);
            Ok(row)
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>, StoreError> {
        self.with_conn(|conn| query_message_by_id(conn, id))
    }

    /// All of a user's messages, most recent first.
    pub fn list_messages_for_user(&self, user_id: i64) -> Result<Vec<MessageRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, text, timestamp, user_id FROM messages
                 WHERE user_id = ?1
                 ORDER BY timestamp DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([user_id], message_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Messages authored by the user and everyone they follow, most recent
    /// first, capped at `limit`.
    pub fn home_timeline(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, text, timestamp, user_id FROM messages
                 WHERE user_id = ?1
                    OR user_id IN (SELECT followed_id FROM follows WHERE follower_id = ?1)
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![user_id, limit], message_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Delete a message on behalf of `requesting_user_id`. Only the owner
    /// may delete.
    pub fn delete_message(
        &self,
        message_id: i64,
        requesting_user_id: i64,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let row = query_message_by_id(conn, message_id)?.ok_or(StoreError::NotFound)?;
            if row.user_id != requesting_user_id {
                return Err(StoreError::Unauthorized);
            }

            conn.execute("DELETE FROM messages WHERE id = ?1", [message_id])?;
            debug!("message {} deleted by user {}", message_id, requesting_user_id);
            Ok(())
        })
    }
}

pub(crate) fn query_message_by_id(
    conn: &Connection,
    id: i64,
) -> Result<Option<MessageRow>, StoreError> {
    let row = conn
        .prepare("SELECT id, text, timestamp, user_id FROM messages WHERE id = ?1")?
        .query_row([id], message_from_row)
        .optional()?;
    Ok(row)
}

pub(crate) fn message_from_row(row: &rusqlite::Row) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: row.get(2)?,
        user_id: row.get(3)?,
    })
}

fn map_message_constraint(e: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(err, Some(msg)) = &e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains("FOREIGN KEY") {
            return StoreError::NotFound;
        }
    }
    StoreError::Storage(e)
}
