//! Database row types — these map directly to SQLite rows.
//! Distinct from the warbler-types API models so the password hash
//! never leaks past this crate.

use chrono::{DateTime, Utc};
use warbler_types::models::{Message, User};

pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.jpg";

#[derive(Debug)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Public view of this row; drops the password hash.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            image_url: self.image_url,
            header_image_url: self.header_image_url,
            bio: self.bio,
            location: self.location,
            created_at: self.created_at,
        }
    }
}

pub struct MessageRow {
    pub id: i64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
}

impl MessageRow {
    pub fn into_message(self) -> Message {
        Message {
            id: self.id,
            text: self.text,
            timestamp: self.timestamp,
            user_id: self.user_id,
        }
    }
}
