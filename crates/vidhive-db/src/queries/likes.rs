use anyhow::Result;
use rusqlite::{OptionalExtension, params};
use vidhive_types::LikeTarget;

use crate::Database;
use crate::models::{LikeRow, VideoRow};
use crate::queries::videos::map_video;

impl Database {
    /// Toggle a like: removes if present, inserts if not.
    /// Returns (added, Option<LikeRow>) — the row is the inserted like when
    /// added. The UNIQUE(target_kind, target_id, user_id) constraint is the
    /// backstop against concurrent toggles inserting twice.
    pub fn toggle_like(
        &self,
        id: &str,
        target: &LikeTarget,
        user_id: &str,
    ) -> Result<(bool, Option<LikeRow>)> {
        let kind = target.kind();
        let target_id = target.id().as_str();

        self.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM likes
                     WHERE target_kind = ?1 AND target_id = ?2 AND user_id = ?3",
                    params![kind, target_id, user_id],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                conn.execute("DELETE FROM likes WHERE id = ?1", [&existing_id])?;
                return Ok((false, None));
            }

            conn.execute(
                "INSERT INTO likes (id, target_kind, target_id, user_id) VALUES (?1, ?2, ?3, ?4)",
                params![id, kind, target_id, user_id],
            )?;
            let row = conn
                .query_row(
                    "SELECT id, target_kind, target_id, user_id, created_at
                     FROM likes WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(LikeRow {
                            id: row.get(0)?,
                            target_kind: row.get(1)?,
                            target_id: row.get(2)?,
                            user_id: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok((true, row))
        })
    }

    /// Videos the user has liked, joined through the likes table.
    pub fn liked_videos(&self, user_id: &str) -> Result<Vec<VideoRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {cols} FROM videos v
                 JOIN likes l ON l.target_id = v.id AND l.target_kind = 'video'
                 WHERE l.user_id = ?1
                 ORDER BY l.created_at DESC, l.rowid DESC",
                cols = "v.id, v.owner_id, v.title, v.description, v.video_file, v.thumbnail, \
                        v.views, v.is_published, v.created_at",
            );
            let rows = conn
                .prepare(&sql)?
                .query_map([user_id], map_video)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Total likes across every video owned by the channel.
    pub fn count_likes_on_channel_videos(&self, channel_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM likes
                 WHERE target_kind = 'video'
                   AND target_id IN (SELECT id FROM videos WHERE owner_id = ?1)",
                [channel_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}

#[cfg(test)]
mod tests {
    use vidhive_types::{LikeTarget, ObjectId};

    use crate::Database;
    use crate::queries::test_support::{seed_user, seed_video};

    fn oid(s: &str) -> ObjectId {
        s.parse().unwrap()
    }

    #[test]
    fn toggle_twice_restores_original_state() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        let video = seed_video(&db, &alice, "v");
        let target = LikeTarget::Video(oid(&video));

        let (added, row) = db
            .toggle_like(ObjectId::new().as_str(), &target, &alice)
            .unwrap();
        assert!(added);
        let row = row.unwrap();
        assert_eq!(row.target_kind, "video");
        assert_eq!(row.target_id, video);

        let (added, row) = db
            .toggle_like(ObjectId::new().as_str(), &target, &alice)
            .unwrap();
        assert!(!added);
        assert!(row.is_none());
        assert!(db.liked_videos(&alice).unwrap().is_empty());
    }

    #[test]
    fn duplicate_membership_is_rejected_by_the_store() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        let video = seed_video(&db, &alice, "v");

        // Two raw inserts for the same (target, user) simulate the losing
        // side of a toggle race; the constraint must hold the line.
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO likes (id, target_kind, target_id, user_id)
                 VALUES (?1, 'video', ?2, ?3)",
                rusqlite::params![ObjectId::new().as_str(), video, alice],
            )?;
            Ok(())
        })
        .unwrap();

        let second = db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO likes (id, target_kind, target_id, user_id)
                 VALUES (?1, 'video', ?2, ?3)",
                rusqlite::params![ObjectId::new().as_str(), video, alice],
            )?;
            Ok(())
        });
        assert!(second.is_err());
    }

    #[test]
    fn like_targets_do_not_collide_across_kinds() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        let video = seed_video(&db, &alice, "v");

        // Same raw target id under different kinds is two memberships.
        let as_video = LikeTarget::Video(oid(&video));
        let as_comment = LikeTarget::Comment(oid(&video));
        assert!(db.toggle_like(ObjectId::new().as_str(), &as_video, &alice).unwrap().0);
        assert!(db.toggle_like(ObjectId::new().as_str(), &as_comment, &alice).unwrap().0);

        assert_eq!(db.liked_videos(&alice).unwrap().len(), 1);
    }

    #[test]
    fn channel_like_totals_span_all_owned_videos() {
        let db = Database::open_in_memory().unwrap();
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let v1 = seed_video(&db, &alice, "a");
        let v2 = seed_video(&db, &alice, "b");

        db.toggle_like(ObjectId::new().as_str(), &LikeTarget::Video(oid(&v1)), &alice)
            .unwrap();
        db.toggle_like(ObjectId::new().as_str(), &LikeTarget::Video(oid(&v1)), &bob)
            .unwrap();
        db.toggle_like(ObjectId::new().as_str(), &LikeTarget::Video(oid(&v2)), &bob)
            .unwrap();

        assert_eq!(db.count_likes_on_channel_videos(&alice).unwrap(), 3);
        assert_eq!(db.count_likes_on_channel_videos(&bob).unwrap(), 0);
    }
}
