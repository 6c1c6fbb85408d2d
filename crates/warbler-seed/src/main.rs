//! Seed the database with sample data from CSV files.
//!
//! Reads `users.csv`, `messages.csv` and `follows.csv` from the seed
//! directory, replaces all existing rows in one transaction, then sprinkles
//! in a random sampling of likes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::seq::index::sample;
use rusqlite::{Transaction, params};
use serde::Deserialize;
use tracing::info;

use warbler_db::Database;
use warbler_db::error::StoreError;

const LIKE_SAMPLE_SIZE: usize = 75;
const USER_ID_RANGE: usize = 300;
const MESSAGE_ID_RANGE: usize = 1000;

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: i64,
    username: String,
    email: String,
    /// Already hashed in the sample data; inserted verbatim.
    password: String,
    image_url: Option<String>,
    header_image_url: Option<String>,
    bio: Option<String>,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRecord {
    id: i64,
    text: String,
    timestamp: String,
    user_id: i64,
}

#[derive(Debug, Deserialize)]
struct FollowRecord {
    follower_id: i64,
    followed_id: i64,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warbler_seed=info,warbler_db=info".into()),
        )
        .init();

    let db_path = std::env::var("WARBLER_DB_PATH").unwrap_or_else(|_| "warbler.db".into());
    let seed_dir = std::env::var("WARBLER_SEED_DIR").unwrap_or_else(|_| "generator".into());
    let seed_dir = PathBuf::from(seed_dir);

    let users = read_records::<UserRecord>(&seed_dir.join("users.csv"))?;
    let messages = read_records::<MessageRecord>(&seed_dir.join("messages.csv"))?;
    let follows = read_records::<FollowRecord>(&seed_dir.join("follows.csv"))?;
    info!(
        "loaded {} users, {} messages, {} follows from {}",
        users.len(),
        messages.len(),
        follows.len(),
        seed_dir.display()
    );

    let mut rng = rand::rng();
    let like_pairs = sample_like_pairs(&mut rng);

    let db = Database::open(Path::new(&db_path))?;
    db.with_conn_mut(|conn| {
        let tx = conn.transaction()?;

        // Replace any previous seed run; FK order matters.
        tx.execute_batch(
            "DELETE FROM likes;
             DELETE FROM follows;
             DELETE FROM messages;
             DELETE FROM users;",
        )?;

        for u in &users {
            tx.execute(
                "INSERT INTO users (id, username, email, password, image_url, header_image_url, bio, location)
                 VALUES (?1, ?2, ?3, ?4,
                         COALESCE(?5, '/static/images/default-pic.png'),
                         COALESCE(?6, '/static/images/warbler-hero.jpg'),
                         ?7, ?8)",
                params![
                    u.id,
                    u.username,
                    u.email,
                    u.password,
                    u.image_url,
                    u.header_image_url,
                    u.bio,
                    u.location
                ],
            )?;
        }

        for m in &messages {
            tx.execute(
                "INSERT INTO messages (id, text, timestamp, user_id) VALUES (?1, ?2, ?3, ?4)",
                params![m.id, m.text, m.timestamp, m.user_id],
            )?;
        }

        for f in &follows {
            tx.execute(
                "INSERT INTO follows (follower_id, followed_id) VALUES (?1, ?2)",
                [f.follower_id, f.followed_id],
            )?;
        }

        let liked = insert_like_pairs(&tx, &like_pairs)?;

        tx.commit()?;
        info!("seed complete: {} likes inserted", liked);
        Ok(())
    })?;

    Ok(())
}

fn read_records<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| format!("parsing {}", path.display()))
}

/// Draw 75 distinct user ids and 75 distinct message ids from the expected
/// seed id ranges and zip them into like pairs.
fn sample_like_pairs(rng: &mut impl rand::Rng) -> Vec<(i64, i64)> {
    let user_ids = sample(rng, USER_ID_RANGE, LIKE_SAMPLE_SIZE);
    let message_ids = sample(rng, MESSAGE_ID_RANGE, LIKE_SAMPLE_SIZE);

    user_ids
        .into_iter()
        .zip(message_ids)
        .map(|(u, m)| (u as i64, m as i64))
        .collect()
}

/// Insert like pairs, skipping any whose user or message does not exist.
/// Returns the number actually inserted.
fn insert_like_pairs(tx: &Transaction, pairs: &[(i64, i64)]) -> Result<usize, StoreError> {
    let mut inserted = 0;
    for (user_id, message_id) in pairs {
        inserted += tx.execute(
            "INSERT OR IGNORE INTO likes (user_id, message_id)
             SELECT ?1, ?2
             WHERE EXISTS(SELECT 1 FROM users WHERE id = ?1)
               AND EXISTS(SELECT 1 FROM messages WHERE id = ?2)",
            [user_id, message_id],
        )?;
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_records_parse_from_headers() {
        let csv_data = "id,username,email,password,image_url,header_image_url,bio,location\n\
                        1,alice,alice@test.com,$2b$12$fakehash,,,Just a bird,Nest\n";
        let records: Vec<UserRecord> = csv::Reader::from_reader(csv_data.as_bytes())
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username, "alice");
        assert_eq!(records[0].image_url, None);
        assert_eq!(records[0].bio.as_deref(), Some("Just a bird"));
    }

    #[test]
    fn like_pairs_are_distinct_per_side() {
        let mut rng = rand::rng();
        let pairs = sample_like_pairs(&mut rng);
        assert_eq!(pairs.len(), LIKE_SAMPLE_SIZE);

        let mut users: Vec<i64> = pairs.iter().map(|(u, _)| *u).collect();
        users.sort_unstable();
        users.dedup();
        assert_eq!(users.len(), LIKE_SAMPLE_SIZE);

        assert!(pairs.iter().all(|(u, m)| *u < 300 && *m < 1000));
    }

    #[test]
    fn like_insert_skips_missing_rows() {
        let db = Database::open_in_memory().unwrap();
        let u = db.signup("alice", "alice@test.com", "secret1", None).unwrap();
        let m = db.create_message(u.id, "hello").unwrap();

        let inserted = db
            .with_conn_mut(|conn| {
                let tx = conn.transaction()?;
                let n = insert_like_pairs(&tx, &[(u.id, m.id), (u.id, 999), (999, m.id)])?;
                tx.commit()?;
                Ok(n)
            })
            .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(db.likes_for_message(m.id).unwrap(), 1);
    }
}
