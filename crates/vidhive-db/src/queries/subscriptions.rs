use anyhow::Result;
use rusqlite::{OptionalExtension, params};

use crate::Database;

impl Database {
    /// Toggle a channel subscription. Returns true when the subscription was
    /// added, false when an existing one was removed. The
    /// UNIQUE(subscriber_id, channel_id) constraint backstops races.
    pub fn toggle_subscription(
        &self,
        id: &str,
        subscriber_id: &str,
        channel_id: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM subscriptions
                     WHERE subscriber_id = ?1 AND channel_id = ?2",
                    params![subscriber_id, channel_id],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                conn.execute("DELETE FROM subscriptions WHERE id = ?1", [&existing_id])?;
                return Ok(false);
            }

            conn.execute(
                "INSERT INTO subscriptions (id, subscriber_id, channel_id) VALUES (?1, ?2, ?3)",
                params![id, subscriber_id, channel_id],
            )?;
            Ok(true)
        })
    }

    pub fn count_subscribers(&self, channel_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM subscriptions WHERE channel_id = ?1",
                [channel_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    pub fn count_subscriptions(&self, subscriber_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = ?1",
                [subscriber_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    pub fn is_subscribed(&self, subscriber_id: &str, channel_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let subscribed: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM subscriptions
                               WHERE subscriber_id = ?1 AND channel_id = ?2)",
                params![subscriber_id, channel_id],
                |row| row.get(0),
            )?;
            Ok(subscribed)
        })
    }
}
