use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

use crate::Database;
use crate::models::{UserRow, WatchHistoryRow};

const USER_COLUMNS: &str =
    "id, username, email, password, full_name, avatar, cover_image, refresh_token, created_at";

impl Database {
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        full_name: &str,
        avatar: &str,
        cover_image: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, full_name, avatar, cover_image)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id, username, email, password_hash, full_name, avatar, cover_image],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", params![id]))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", params![username]))
    }

    /// Login lookup: match on email or username, whichever was supplied.
    pub fn get_user_by_email_or_username(
        &self,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1 OR username = ?2", params![email, username]))
    }

    pub fn identity_taken(&self, username: &str, email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let taken: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 OR email = ?2)",
                params![username, email],
                |row| row.get(0),
            )?;
            Ok(taken)
        })
    }

    pub fn update_user_details(
        &self,
        id: &str,
        full_name: &str,
        email: &str,
    ) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET full_name = ?2, email = ?3 WHERE id = ?1",
                params![id, full_name, email],
            )?;
            if n == 0 {
                return Ok(None);
            }
            query_user(conn, "id = ?1", params![id])
        })
    }

    pub fn update_user_avatar(&self, id: &str, avatar: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET avatar = ?2 WHERE id = ?1",
                params![id, avatar],
            )?;
            if n == 0 {
                return Ok(None);
            }
            query_user(conn, "id = ?1", params![id])
        })
    }

    pub fn update_user_cover_image(&self, id: &str, cover_image: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET cover_image = ?2 WHERE id = ?1",
                params![id, cover_image],
            )?;
            if n == 0 {
                return Ok(None);
            }
            query_user(conn, "id = ?1", params![id])
        })
    }

    pub fn update_user_password(&self, id: &str, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET password = ?2 WHERE id = ?1",
                params![id, password_hash],
            )?;
            Ok(n > 0)
        })
    }

    /// Overwrites the single active refresh token; `None` clears it (logout).
    pub fn set_refresh_token(&self, id: &str, token: Option<&str>) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET refresh_token = ?2 WHERE id = ?1",
                params![id, token],
            )?;
            Ok(n > 0)
        })
    }

    /// Append a video to the user's watch history. A re-watch moves the
    /// entry to the end instead of duplicating it.
    pub fn record_watch(&self, user_id: &str, video_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM watch_history WHERE user_id = ?1 AND video_id = ?2",
                params![user_id, video_id],
            )?;
            conn.execute(
                "INSERT INTO watch_history (user_id, video_id, position)
                 SELECT ?1, ?2, COALESCE(MAX(position), 0) + 1
                   FROM watch_history WHERE user_id = ?1",
                params![user_id, video_id],
            )?;
            Ok(())
        })
    }

    /// Watch history expanded to video documents plus the owner's public
    /// fields. Credentials never leave the users table here.
    pub fn watch_history(&self, user_id: &str) -> Result<Vec<WatchHistoryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT v.id, v.title, v.description, v.video_file, v.thumbnail, v.views,
                        v.created_at, u.full_name, u.username, u.avatar
                 FROM watch_history wh
                 JOIN videos v ON v.id = wh.video_id
                 JOIN users u ON u.id = v.owner_id
                 WHERE wh.user_id = ?1
                 ORDER BY wh.position",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(WatchHistoryRow {
                        video_id: row.get(0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                        video_file: row.get(3)?,
                        thumbnail: row.get(4)?,
                        views: row.get(5)?,
                        created_at: row.get(6)?,
                        owner_full_name: row.get(7)?,
                        owner_user_name: row.get(8)?,
                        owner_avatar: row.get(9)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(
    conn: &Connection,
    predicate: &str,
    params: impl rusqlite::Params,
) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}");
    let row = conn
        .prepare(&sql)?
        .query_row(params, |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                full_name: row.get(4)?,
                avatar: row.get(5)?,
                cover_image: row.get(6)?,
                refresh_token: row.get(7)?,
                created_at: row.get(8)?,
            })
        })
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use crate::queries::test_support::{seed_user, seed_video};

    #[test]
    fn create_and_fetch_user() {
        let db = Database::open_in_memory().unwrap();
        let id = seed_user(&db, "alice");

        let user = db.get_user_by_id(&id).unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert!(user.refresh_token.is_none());

        let by_email = db
            .get_user_by_email_or_username(Some("alice@example.com"), None)
            .unwrap();
        assert!(by_email.is_some());
        let by_name = db.get_user_by_email_or_username(None, Some("alice")).unwrap();
        assert!(by_name.is_some());
        assert!(db.get_user_by_email_or_username(None, None).unwrap().is_none());
    }

    #[test]
    fn identity_conflicts_are_detected() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "alice");

        assert!(db.identity_taken("alice", "other@example.com").unwrap());
        assert!(db.identity_taken("other", "alice@example.com").unwrap());
        assert!(!db.identity_taken("bob", "bob@example.com").unwrap());
    }

    #[test]
    fn detail_update_on_missing_user_matches_nothing() {
        let db = Database::open_in_memory().unwrap();
        let updated = db
            .update_user_details("aabbccddeeff001122334455", "Ghost", "ghost@example.com")
            .unwrap();
        assert!(updated.is_none());
    }

    #[test]
    fn refresh_token_overwrite_and_clear() {
        let db = Database::open_in_memory().unwrap();
        let id = seed_user(&db, "alice");

        assert!(db.set_refresh_token(&id, Some("token-1")).unwrap());
        assert!(db.set_refresh_token(&id, Some("token-2")).unwrap());
        let user = db.get_user_by_id(&id).unwrap().unwrap();
        assert_eq!(user.refresh_token.as_deref(), Some("token-2"));

        assert!(db.set_refresh_token(&id, None).unwrap());
        let user = db.get_user_by_id(&id).unwrap().unwrap();
        assert!(user.refresh_token.is_none());
    }

    #[test]
    fn watch_history_is_ordered_and_rewatch_moves_to_end() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        let v1 = seed_video(&db, &alice, "first");
        let v2 = seed_video(&db, &alice, "second");

        db.record_watch(&alice, &v1).unwrap();
        db.record_watch(&alice, &v2).unwrap();
        db.record_watch(&alice, &v1).unwrap();

        let history = db.watch_history(&alice).unwrap();
        let titles: Vec<&str> = history.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"]);
        assert_eq!(history[1].owner_user_name, "alice");
    }
}
