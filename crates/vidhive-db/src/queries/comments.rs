use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

use crate::Database;
use crate::models::CommentRow;

fn map_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        video_id: row.get(1)?,
        owner_id: row.get(2)?,
        owner_name: row.get(3)?,
        content: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn query_comment(conn: &Connection, id: &str) -> Result<Option<CommentRow>> {
    let row = conn
        .prepare(
            "SELECT c.id, c.video_id, c.owner_id, u.username, c.content, c.created_at
             FROM comments c JOIN users u ON u.id = c.owner_id
             WHERE c.id = ?1",
        )?
        .query_row([id], map_comment)
        .optional()?;
    Ok(row)
}

impl Database {
    pub fn insert_comment(
        &self,
        id: &str,
        video_id: &str,
        owner_id: &str,
        content: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, video_id, owner_id, content) VALUES (?1, ?2, ?3, ?4)",
                params![id, video_id, owner_id, content],
            )?;
            Ok(())
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| query_comment(conn, id))
    }

    /// Newest-first page of a video's comments, author name joined in.
    pub fn comments_for_video(
        &self,
        video_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CommentRow>, i64)> {
        self.with_conn(|conn| {
            let total: i64 = conn.query_row(
                "SELECT COUNT(*) FROM comments WHERE video_id = ?1",
                [video_id],
                |row| row.get(0),
            )?;

            let rows = conn
                .prepare(
                    "SELECT c.id, c.video_id, c.owner_id, u.username, c.content, c.created_at
                     FROM comments c JOIN users u ON u.id = c.owner_id
                     WHERE c.video_id = ?1
                     ORDER BY c.created_at DESC, c.rowid DESC
                     LIMIT ?2 OFFSET ?3",
                )?
                .query_map(params![video_id, limit, offset], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok((rows, total))
        })
    }

    pub fn update_comment(
        &self,
        id: &str,
        owner_id: &str,
        content: &str,
    ) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE comments SET content = ?3 WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id, content],
            )?;
            if n == 0 {
                return Ok(None);
            }
            query_comment(conn, id)
        })
    }

    pub fn delete_comment(&self, id: &str, owner_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM comments WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )?;
            Ok(n > 0)
        })
    }
}
