use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

use crate::Database;
use crate::models::TweetRow;

fn map_tweet(row: &rusqlite::Row<'_>) -> rusqlite::Result<TweetRow> {
    Ok(TweetRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn query_tweet(conn: &Connection, id: &str) -> Result<Option<TweetRow>> {
    let row = conn
        .prepare("SELECT id, owner_id, content, created_at FROM tweets WHERE id = ?1")?
        .query_row([id], map_tweet)
        .optional()?;
    Ok(row)
}

impl Database {
    pub fn insert_tweet(&self, id: &str, owner_id: &str, content: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tweets (id, owner_id, content) VALUES (?1, ?2, ?3)",
                params![id, owner_id, content],
            )?;
            Ok(())
        })
    }

    pub fn get_tweet(&self, id: &str) -> Result<Option<TweetRow>> {
        self.with_conn(|conn| query_tweet(conn, id))
    }

    pub fn tweets_by_owner(&self, owner_id: &str) -> Result<Vec<TweetRow>> {
        self.with_conn(|conn| {
            let rows = conn
                .prepare(
                    "SELECT id, owner_id, content, created_at FROM tweets
                     WHERE owner_id = ?1 ORDER BY created_at DESC, rowid DESC",
                )?
                .query_map([owner_id], map_tweet)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_tweet(&self, id: &str, owner_id: &str, content: &str) -> Result<Option<TweetRow>> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE tweets SET content = ?3 WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id, content],
            )?;
            if n == 0 {
                return Ok(None);
            }
            query_tweet(conn, id)
        })
    }

    pub fn delete_tweet(&self, id: &str, owner_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM tweets WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )?;
            Ok(n > 0)
        })
    }
}
