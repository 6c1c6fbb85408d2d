use rusqlite::Connection;
use tracing::debug;

use crate::Database;
use crate::error::StoreError;
use crate::models::UserRow;
use crate::users::{USER_COLUMNS, user_from_row};

impl Database {
    /// Create the directed edge follower → followed. An edge that already
    /// exists is rejected with `DuplicateEdge`; a missing endpoint maps the
    /// foreign-key failure to `NotFound`. Self-follows are not rejected
    /// here — semantically meaningless, left to the caller.
    pub fn follow(&self, follower_id: i64, followed_id: i64) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            if edge_exists(conn, follower_id, followed_id)? {
                return Err(StoreError::DuplicateEdge);
            }

            conn.execute(
                "INSERT INTO follows (follower_id, followed_id) VALUES (?1, ?2)",
                [follower_id, followed_id],
            )
            .map_err(map_follow_constraint)?;

            debug!("follow edge created: {} -> {}", follower_id, followed_id);
            Ok(())
        })
    }

    pub fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
                [follower_id, followed_id],
            )?;
            if deleted == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    /// True iff the edge a → b exists.
    pub fn is_following(&self, a: i64, b: i64) -> Result<bool, StoreError> {
        self.with_conn(|conn| edge_exists(conn, a, b))
    }

    /// True iff the edge b → a exists. Independent of `is_following(a, b)`.
    pub fn is_followed_by(&self, a: i64, b: i64) -> Result<bool, StoreError> {
        self.with_conn(|conn| edge_exists(conn, b, a))
    }

    pub fn followers_of(&self, user_id: i64) -> Result<Vec<UserRow>, StoreError> {
        self.with_conn(|conn| {
            query_users_on_edge(
                conn,
                &format!(
                    "SELECT {USER_COLUMNS} FROM users
                     JOIN follows ON follows.follower_id = users.id
                     WHERE follows.followed_id = ?1
                     ORDER BY users.id"
                ),
                user_id,
            )
        })
    }

    pub fn following_of(&self, user_id: i64) -> Result<Vec<UserRow>, StoreError> {
        self.with_conn(|conn| {
            query_users_on_edge(
                conn,
                &format!(
                    "SELECT {USER_COLUMNS} FROM users
                     JOIN follows ON follows.followed_id = users.id
                     WHERE follows.follower_id = ?1
                     ORDER BY users.id"
                ),
                user_id,
            )
        })
    }
}

fn edge_exists(conn: &Connection, follower_id: i64, followed_id: i64) -> Result<bool, StoreError> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ?1 AND followed_id = ?2)",
        [follower_id, followed_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn query_users_on_edge(
    conn: &Connection,
    sql: &str,
    user_id: i64,
) -> Result<Vec<UserRow>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([user_id], user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_follow_constraint(e: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(err, Some(msg)) = &e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            if msg.contains("FOREIGN KEY") {
                return StoreError::NotFound;
            }
            return StoreError::DuplicateEdge;
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
    fn fresh_user_has_no_followers() {
        let db = db();
        let u = add_user(&db, "testuser", "test@test.com");

        assert!(db.followers_of(u.id).unwrap().is_empty());
        assert!(db.following_of(u.id).unwrap().is_empty());
        assert!(db.list_messages_for_user(u.id).unwrap().is_empty());
    }

    #[test]
    fn following_and_followed_by() {
        let db = db();
        let u1 = add_user(&db, "testuser1", "test1@test.com");
        let u2 = add_user(&db, "testuser2", "test2@test.com");

        assert!(!db.is_following(u2.id, u1.id).unwrap());
        assert!(!db.is_followed_by(u1.id, u2.id).unwrap());
        assert!(!db.is_following(u1.id, u2.id).unwrap());
        assert!(!db.is_followed_by(u2.id, u1.id).unwrap());

        // both users follow one another
        db.follow(u2.id, u1.id).unwrap();
        db.follow(u1.id, u2.id).unwrap();

        assert!(db.is_following(u2.id, u1.id).unwrap());
        assert!(db.is_followed_by(u1.id, u2.id).unwrap());
        assert!(db.is_following(u1.id, u2.id).unwrap());
        assert!(db.is_followed_by(u2.id, u1.id).unwrap());
    }

    #[test]
    fn edge_is_directed() {
        let db = db();
        let a = add_user(&db, "a", "a@test.com");
        let b = add_user(&db, "b", "b@test.com");

        db.follow(a.id, b.id).unwrap();

        assert!(db.is_following(a.id, b.id).unwrap());
        assert!(!db.is_following(b.id, a.id).unwrap());

        let followers = db.followers_of(b.id).unwrap();
        assert_eq!(followers.len(), 1);
        assert_eq!(followers[0].username, "a");
        assert!(db.followers_of(a.id).unwrap().is_empty());
    }

    #[test]
    fn duplicate_edge_is_rejected() {
        let db = db();
        let a = add_user(&db, "a", "a@test.com");
        let b = add_user(&db, "b", "b@test.com");

        db.follow(a.id, b.id).unwrap();
        assert!(matches!(
            db.follow(a.id, b.id),
            Err(StoreError::DuplicateEdge)
        ));

        // still exactly one follower
        assert_eq!(db.followers_of(b.id).unwrap().len(), 1);
    }

    #[test]
    fn follow_missing_user_is_not_found() {
        let db = db();
        let a = add_user(&db, "a", "a@test.com");

        assert!(matches!(db.follow(a.id, 999), Err(StoreError::NotFound)));
    }

    #[test]
    fn unfollow_removes_edge() {
        let db = db();
        let a = add_user(&db, "a", "a@test.com");
        let b = add_user(&db, "b", "b@test.com");

        db.follow(a.id, b.id).unwrap();
        db.unfollow(a.id, b.id).unwrap();

        assert!(!db.is_following(a.id, b.id).unwrap());
        assert!(matches!(
            db.unfollow(a.id, b.id),
            Err(StoreError::NotFound)
        ));
    }
}
