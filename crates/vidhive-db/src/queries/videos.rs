use anyhow::Result;
use rusqlite::{OptionalExtension, params};

use crate::Database;
use crate::models::VideoRow;

pub(crate) const VIDEO_COLUMNS: &str =
    "id, owner_id, title, description, video_file, thumbnail, views, is_published, created_at";

pub(crate) fn map_video(row: &rusqlite::Row<'_>) -> rusqlite::Result<VideoRow> {
    Ok(VideoRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        video_file: row.get(4)?,
        thumbnail: row.get(5)?,
        views: row.get(6)?,
        is_published: row.get::<_, i64>(7)? != 0,
        created_at: row.get(8)?,
    })
}

/// Listing filter, already normalized: page >= 1, limit bounded, sort field
/// whitelisted by `sort_column`.
pub struct VideoFilter<'a> {
    pub title_query: Option<&'a str>,
    pub owner_id: Option<&'a str>,
    pub sort_by: Option<&'a str>,
    pub descending: bool,
    pub page: i64,
    pub limit: i64,
}

/// Whitelist of sortable columns; anything unrecognized falls back to
/// creation time.
fn sort_column(sort_by: Option<&str>) -> &'static str {
    match sort_by {
        Some("views") => "views",
        Some("title") => "title",
        _ => "created_at",
    }
}

impl Database {
    pub fn insert_video(
        &self,
        id: &str,
        owner_id: &str,
        title: &str,
        description: &str,
        video_file: &str,
        thumbnail: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO videos (id, owner_id, title, description, video_file, thumbnail)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, owner_id, title, description, video_file, thumbnail],
            )?;
            Ok(())
        })
    }

    pub fn get_video(&self, id: &str) -> Result<Option<VideoRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ?1");
            let row = conn.prepare(&sql)?.query_row([id], map_video).optional()?;
            Ok(row)
        })
    }

    pub fn increment_views(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE videos SET views = views + 1 WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    /// One page of matching videos plus the total match count.
    pub fn list_videos(&self, filter: &VideoFilter<'_>) -> Result<(Vec<VideoRow>, i64)> {
        self.with_conn(|conn| {
            let pattern = filter.title_query.map(|q| format!("%{q}%"));

            let mut clauses: Vec<&str> = Vec::new();
            let mut args: Vec<&dyn rusqlite::types::ToSql> = Vec::new();
            if let Some(p) = pattern.as_ref() {
                clauses.push("title LIKE ?");
                args.push(p);
            }
            if let Some(owner) = filter.owner_id.as_ref() {
                clauses.push("owner_id = ?");
                args.push(owner);
            }
            let where_sql = if clauses.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", clauses.join(" AND "))
            };

            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM videos {where_sql}"),
                args.as_slice(),
                |row| row.get(0),
            )?;

            let dir = if filter.descending { "DESC" } else { "ASC" };
            // rowid tiebreaker keeps pages disjoint when the sort key repeats
            let sql = format!(
                "SELECT {VIDEO_COLUMNS} FROM videos {where_sql}
                 ORDER BY {col} {dir}, rowid {dir} LIMIT ? OFFSET ?",
                col = sort_column(filter.sort_by),
            );

            let offset = (filter.page - 1) * filter.limit;
            let mut page_args = args;
            page_args.push(&filter.limit);
            page_args.push(&offset);

            let rows = conn
                .prepare(&sql)?
                .query_map(page_args.as_slice(), map_video)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok((rows, total))
        })
    }

    /// Owner-scoped update in a single statement; zero matched rows means
    /// missing or not owned, indistinguishably.
    pub fn update_video(
        &self,
        id: &str,
        owner_id: &str,
        title: &str,
        description: &str,
        thumbnail: &str,
    ) -> Result<Option<VideoRow>> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE videos SET title = ?3, description = ?4, thumbnail = ?5
                 WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id, title, description, thumbnail],
            )?;
            if n == 0 {
                return Ok(None);
            }
            let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ?1");
            let row = conn.prepare(&sql)?.query_row([id], map_video).optional()?;
            Ok(row)
        })
    }

    pub fn delete_video(&self, id: &str, owner_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM videos WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )?;
            Ok(n > 0)
        })
    }

    /// Atomic publish flip, owner-scoped.
    pub fn toggle_publish(&self, id: &str, owner_id: &str) -> Result<Option<VideoRow>> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE videos SET is_published = 1 - is_published
                 WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )?;
            if n == 0 {
                return Ok(None);
            }
            let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ?1");
            let row = conn.prepare(&sql)?.query_row([id], map_video).optional()?;
            Ok(row)
        })
    }

    pub fn videos_by_owner(&self, owner_id: &str) -> Result<Vec<VideoRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {VIDEO_COLUMNS} FROM videos WHERE owner_id = ?1 ORDER BY created_at DESC, rowid DESC"
            );
            let rows = conn
                .prepare(&sql)?
                .query_map([owner_id], map_video)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_videos_by_owner(&self, owner_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM videos WHERE owner_id = ?1",
                [owner_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    pub fn total_views_by_owner(&self, owner_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let total = conn.query_row(
                "SELECT COALESCE(SUM(views), 0) FROM videos WHERE owner_id = ?1",
                [owner_id],
                |row| row.get(0),
            )?;
            Ok(total)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::VideoFilter;
    use crate::Database;
    use crate::queries::test_support::{seed_user, seed_video};

    fn filter<'a>(page: i64, limit: i64) -> VideoFilter<'a> {
        VideoFilter {
            title_query: None,
            owner_id: None,
            sort_by: None,
            descending: true,
            page,
            limit,
        }
    }

    #[test]
    fn pagination_slices_without_overlap() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        for i in 0..25 {
            seed_video(&db, &alice, &format!("video {i:02}"));
        }

        let (page1, total) = db.list_videos(&filter(1, 10)).unwrap();
        assert_eq!(total, 25);
        assert_eq!(page1.len(), 10);

        let (page3, _) = db.list_videos(&filter(3, 10)).unwrap();
        assert_eq!(page3.len(), 5);

        let (page2, _) = db.list_videos(&filter(2, 10)).unwrap();
        let mut seen: Vec<String> = page1
            .iter()
            .chain(&page2)
            .chain(&page3)
            .map(|v| v.id.clone())
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 25);
    }

    #[test]
    fn title_filter_is_case_insensitive_substring() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        seed_video(&db, &alice, "Rust Tutorial");
        seed_video(&db, &alice, "cooking show");

        let (rows, total) = db
            .list_videos(&VideoFilter {
                title_query: Some("rust"),
                ..filter(1, 10)
            })
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].title, "Rust Tutorial");
    }

    #[test]
    fn owner_filter_with_no_matches_is_an_empty_page() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        seed_video(&db, &alice, "only video");

        let (rows, total) = db
            .list_videos(&VideoFilter {
                owner_id: Some("aabbccddeeff001122334455"),
                ..filter(1, 10)
            })
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn sort_whitelist_falls_back_to_created_at() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        seed_video(&db, &alice, "a");

        // A hostile sort field must not be interpolated into the query.
        let (rows, _) = db
            .list_videos(&VideoFilter {
                sort_by: Some("views; DROP TABLE videos"),
                ..filter(1, 10)
            })
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn non_owner_mutations_look_like_missing_rows() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let video = seed_video(&db, &alice, "alice's video");

        let by_stranger = db
            .update_video(&video, &bob, "stolen", "nope", "/media/x")
            .unwrap();
        assert!(by_stranger.is_none());

        let missing = db
            .update_video("aabbccddeeff001122334455", &bob, "t", "d", "/media/x")
            .unwrap();
        assert!(missing.is_none());

        assert!(!db.delete_video(&video, &bob).unwrap());
        assert!(db.get_video(&video).unwrap().is_some());

        // the owner still succeeds
        let by_owner = db
            .update_video(&video, &alice, "new title", "new desc", "/media/t")
            .unwrap()
            .unwrap();
        assert_eq!(by_owner.title, "new title");
        assert!(db.delete_video(&video, &alice).unwrap());
    }

    #[test]
    fn toggle_publish_flips_atomically() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        let video = seed_video(&db, &alice, "v");

        let flipped = db.toggle_publish(&video, &alice).unwrap().unwrap();
        assert!(!flipped.is_published);
        let back = db.toggle_publish(&video, &alice).unwrap().unwrap();
        assert!(back.is_published);

        assert!(db.toggle_publish(&video, "aabbccddeeff001122334455").unwrap().is_none());
    }

    #[test]
    fn view_counter_and_owner_totals() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        let v1 = seed_video(&db, &alice, "a");
        let v2 = seed_video(&db, &alice, "b");

        db.increment_views(&v1).unwrap();
        db.increment_views(&v1).unwrap();
        db.increment_views(&v2).unwrap();

        assert_eq!(db.total_views_by_owner(&alice).unwrap(), 3);
        assert_eq!(db.count_videos_by_owner(&alice).unwrap(), 2);

        // zero-video channel sums to 0, not an error
        assert_eq!(db.total_views_by_owner("aabbccddeeff001122334455").unwrap(), 0);
    }
}
