use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::Database;
use crate::error::StoreError;
use crate::models::{DEFAULT_IMAGE_URL, UserRow};

pub(crate) const USER_COLUMNS: &str =
    "id, username, email, password, image_url, header_image_url, bio, location, created_at";

impl Database {
    /// Validated creation path for a new user. Hashes the password, then
    /// runs the uniqueness check and insert inside one transaction so a
    /// conflict leaves nothing behind.
    pub fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
        image_url: Option<&str>,
    ) -> Result<UserRow, StoreError> {
        if username.trim().is_empty() {
            return Err(StoreError::validation("username must not be empty"));
        }
        if email.trim().is_empty() {
            return Err(StoreError::validation("email must not be empty"));
        }
        if password.len() < 6 {
            return Err(StoreError::validation(
                "password must be at least 6 characters",
            ));
        }

        let hash = warbler_auth::hash_password(password)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            // Deterministic pre-commit conflict check; the UNIQUE
            // constraints below remain as a backstop.
            if user_exists(&tx, "username", username)? {
                return Err(StoreError::UniqueViolation("username"));
            }
            if user_exists(&tx, "email", email)? {
                return Err(StoreError::UniqueViolation("email"));
            }

            tx.execute(
                "INSERT INTO users (username, email, password, image_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    username,
                    email,
                    hash,
                    image_url.unwrap_or(DEFAULT_IMAGE_URL),
                    Utc::now()
                ],
            )
            .map_err(map_user_constraint)?;

            let id = tx.last_insert_rowid();
            let row = query_user_by_id(&tx, id)?.ok_or(StoreError::NotFound)?;

            tx.commit()?;
            debug!("signed up user {} (id {})", row.username, row.id);
            Ok(row)
        })
    }

    /// Look up by username and verify the password. Wrong username or wrong
    /// password is `Ok(None)` — an expected outcome, never an error.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRow>, StoreError> {
        let Some(row) = self.get_user_by_username(username)? else {
            return Ok(None);
        };

        if warbler_auth::verify_password(password, &row.password)? {
            Ok(Some(row))
        } else {
            Ok(None)
        }
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| {
            let row = conn
                .prepare(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
                ))?
                .query_row([username], user_from_row)
                .optional()?;
            Ok(row)
        })
    }

    /// Explicit removal. Messages, follow edges and likes cascade.
    pub fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(StoreError::NotFound);
            }
            debug!("deleted user {}", id);
            Ok(())
        })
    }
}

pub(crate) fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>, StoreError> {
    let row = conn
        .prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?
        .query_row([id], user_from_row)
        .optional()?;
    Ok(row)
}

pub(crate) fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        image_url: row.get(4)?,
        header_image_url: row.get(5)?,
        bio: row.get(6)?,
        location: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn user_exists(conn: &Connection, column: &str, value: &str) -> Result<bool, StoreError> {
    // column is one of our own identifiers, never user input
    let exists = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM users WHERE {column} = ?1)"),
        [value],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Backstop mapping for the UNIQUE constraints on users.
fn map_user_constraint(e: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(err, Some(msg)) = &e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            if msg.contains("users.username") {
                return StoreError::UniqueViolation("username");
            }
            if msg.contains("users.email") {
                return StoreError::UniqueViolation("email");
            }
        }
    }
    StoreError::Storage(e)
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use crate::error::StoreError;
    use crate::models::DEFAULT_IMAGE_URL;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn signup_then_authenticate_returns_same_user() {
        let db = db();
        let created = db
            .signup("testuser", "test@test.com", "HASHED_PASSWORD", None)
            .unwrap();

        let authed = db
            .authenticate("testuser", "HASHED_PASSWORD")
            .unwrap()
            .expect("correct credentials should authenticate");

        assert_eq!(authed.id, created.id);
        assert_eq!(authed.username, "testuser");
        assert_eq!(authed.email, "test@test.com");
    }

    #[test]
    fn authenticate_wrong_password_is_none() {
        let db = db();
        db.signup("testuser", "test@test.com", "HASHED_PASSWORD", None)
            .unwrap();

        assert!(db.authenticate("testuser", "password").unwrap().is_none());
    }

    #[test]
    fn authenticate_unknown_username_is_none() {
        let db = db();
        assert!(db.authenticate("nobody", "whatever").unwrap().is_none());
    }

    #[test]
    fn password_is_stored_hashed() {
        let db = db();
        let row = db
            .signup("testuser", "test@test.com", "HASHED_PASSWORD", None)
            .unwrap();
        assert_ne!(row.password, "HASHED_PASSWORD");
    }

    #[test]
    fn duplicate_username_conflicts_and_first_remains() {
        let db = db();
        db.signup("NewUser", "TestUser@test.com", "HASH_PASS", Some("jpeg.jpg"))
            .unwrap();

        let err = db
            .signup("NewUser", "TestUser2@test.com", "HASH_PASS", Some("jpeg.jpg"))
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation("username")));

        // first signup is still committed
        let kept = db.get_user_by_username("NewUser").unwrap().unwrap();
        assert_eq!(kept.email, "TestUser@test.com");
    }

    #[test]
    fn duplicate_email_conflicts() {
        let db = db();
        db.signup("user1", "same@test.com", "HASH_PASS", None)
            .unwrap();

        let err = db
            .signup("user2", "same@test.com", "HASH_PASS", None)
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation("email")));
    }

    #[test]
    fn signup_rejects_empty_fields() {
        let db = db();
        assert!(matches!(
            db.signup("", "a@test.com", "secret1", None),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            db.signup("user", "", "secret1", None),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            db.signup("user", "a@test.com", "short", None),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn image_url_defaults_to_placeholder() {
        let db = db();
        let row = db
            .signup("testuser", "test@test.com", "secret1", None)
            .unwrap();
        assert_eq!(row.image_url, DEFAULT_IMAGE_URL);

        let row2 = db
            .signup("other", "other@test.com", "secret1", Some("jpeg.jpg"))
            .unwrap();
        assert_eq!(row2.image_url, "jpeg.jpg");
    }

    #[test]
    fn delete_missing_user_is_not_found() {
        let db = db();
        assert!(matches!(db.delete_user(42), Err(StoreError::NotFound)));
    }
}
