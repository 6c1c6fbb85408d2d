use tracing::debug;

use crate::Database;
use crate::error::StoreError;
use crate::messages::message_from_row;
use crate::models::MessageRow;

impl Database {
    /// Record "user liked message". Idempotent: liking a message twice
    /// leaves exactly one row and succeeds as a no-op. Missing user or
    /// message maps the foreign-key failure to `NotFound`.
    pub fn like(&self, user_id: i64, message_id: i64) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            // OR IGNORE dedupes on the (user_id, message_id) primary key;
            // foreign-key violations still surface as errors.
            conn.execute(
                "INSERT OR IGNORE INTO likes (user_id, message_id) VALUES (?1, ?2)",
                [user_id, message_id],
            )
            .map_err(map_like_constraint)?;

            debug!("user {} likes message {}", user_id, message_id);
            Ok(())
        })
    }

    pub fn unlike(&self, user_id: i64, message_id: i64) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND message_id = ?2",
                [user_id, message_id],
            )?;
            if deleted == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    pub fn likes_for_message(&self, message_id: i64) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM likes WHERE message_id = ?1",
                [message_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// The messages a user has liked, most recently authored first.
    pub fn liked_by(&self, user_id: i64) -> Result<Vec<MessageRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.text, m.timestamp, m.user_id FROM messages m
                 JOIN likes l ON l.message_id = m.id
                 WHERE l.user_id = ?1
                 ORDER BY m.timestamp DESC, m.id DESC",
            )?;
            let rows = stmt
                .query_map([user_id], message_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn map_like_constraint(e: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(err, Some(msg)) = &e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains("FOREIGN KEY") {
            return StoreError::NotFound;
        }
    }
    StoreError::Storage(e)
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use crate::error::StoreError;
    use crate::models::UserRow;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn add_user(db: &Database, username: &str, email: &str) -> UserRow {
        db.signup(username, email, "HASHED_PASSWORD", None).unwrap()
    }

    #[test]
    fn liking_twice_leaves_one_record() {
        let db = db();
        let u = add_user(&db, "testuser", "test@test.com");
        let m = db.create_message(u.id, "likeable").unwrap();

        db.like(u.id, m.id).unwrap();
        db.like(u.id, m.id).unwrap();

        assert_eq!(db.likes_for_message(m.id).unwrap(), 1);
    }

    #[test]
    fn users_may_like_their_own_messages() {
        let db = db();
        let u = add_user(&db, "testuser", "test@test.com");
        let m = db.create_message(u.id, "self five").unwrap();

        db.like(u.id, m.id).unwrap();
        assert_eq!(db.likes_for_message(m.id).unwrap(), 1);
    }

    #[test]
    fn like_missing_message_is_not_found() {
        let db = db();
        let u = add_user(&db, "testuser", "test@test.com");

        assert!(matches!(db.like(u.id, 999), Err(StoreError::NotFound)));
    }

    #[test]
    fn unlike_removes_the_record() {
        let db = db();
        let u = add_user(&db, "testuser", "test@test.com");
        let m = db.create_message(u.id, "fleeting").unwrap();

        db.like(u.id, m.id).unwrap();
        db.unlike(u.id, m.id).unwrap();

        assert_eq!(db.likes_for_message(m.id).unwrap(), 0);
        assert!(matches!(db.unlike(u.id, m.id), Err(StoreError::NotFound)));
    }

    #[test]
    fn liked_by_lists_liked_messages() {
        let db = db();
        let author = add_user(&db, "author", "author@test.com");
        let fan = add_user(&db, "fan", "fan@test.com");

        let m1 = db.create_message(author.id, "first").unwrap();
        let m2 = db.create_message(author.id, "second").unwrap();
        db.create_message(author.id, "ignored").unwrap();

        db.like(fan.id, m1.id).unwrap();
        db.like(fan.id, m2.id).unwrap();

        let liked: Vec<i64> = db.liked_by(fan.id).unwrap().iter().map(|m| m.id).collect();
        assert_eq!(liked, vec![m2.id, m1.id]);
    }

    #[test]
    fn deleting_a_message_cascades_to_likes() {
        let db = db();
        let u = add_user(&db, "testuser", "test@test.com");
        let m = db.create_message(u.id, "doomed").unwrap();

        db.like(u.id, m.id).unwrap();
        db.delete_message(m.id, u.id).unwrap();

        assert_eq!(db.likes_for_message(m.id).unwrap(), 0);
        assert!(db.liked_by(u.id).unwrap().is_empty());
    }
}
