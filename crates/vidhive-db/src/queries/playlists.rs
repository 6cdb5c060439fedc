use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

use crate::Database;
use crate::models::PlaylistRow;

fn query_playlist(conn: &Connection, id: &str) -> Result<Option<PlaylistRow>> {
    let base = conn
        .prepare(
            "SELECT id, owner_id, name, description, created_at
             FROM playlists WHERE id = ?1",
        )?
        .query_row([id], |row| {
            Ok(PlaylistRow {
                id: row.get(0)?,
                owner_id: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
                created_at: row.get(4)?,
                videos: Vec::new(),
            })
        })
        .optional()?;

    let Some(mut playlist) = base else {
        return Ok(None);
    };

    playlist.videos = conn
        .prepare(
            "SELECT video_id FROM playlist_videos
             WHERE playlist_id = ?1 ORDER BY position",
        )?
        .query_map([id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;

    Ok(Some(playlist))
}

impl Database {
    pub fn insert_playlist(&self, id: &str, owner_id: &str, name: &str, description: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO playlists (id, owner_id, name, description) VALUES (?1, ?2, ?3, ?4)",
                params![id, owner_id, name, description],
            )?;
            Ok(())
        })
    }

    pub fn get_playlist(&self, id: &str) -> Result<Option<PlaylistRow>> {
        self.with_conn(|conn| query_playlist(conn, id))
    }

    pub fn playlists_by_owner(&self, owner_id: &str) -> Result<Vec<PlaylistRow>> {
        self.with_conn(|conn| {
            let ids = conn
                .prepare(
                    "SELECT id FROM playlists WHERE owner_id = ?1
                     ORDER BY created_at DESC, rowid DESC",
                )?
                .query_map([owner_id], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut playlists = Vec::with_capacity(ids.len());
            for id in &ids {
                if let Some(playlist) = query_playlist(conn, id)? {
                    playlists.push(playlist);
                }
            }
            Ok(playlists)
        })
    }

    pub fn update_playlist(
        &self,
        id: &str,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Option<PlaylistRow>> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE playlists SET name = ?3, description = ?4
                 WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id, name, description],
            )?;
            if n == 0 {
                return Ok(None);
            }
            query_playlist(conn, id)
        })
    }

    pub fn delete_playlist(&self, id: &str, owner_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM playlists WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )?;
            if n > 0 {
                conn.execute(
                    "DELETE FROM playlist_videos WHERE playlist_id = ?1",
                    [id],
                )?;
            }
            Ok(n > 0)
        })
    }

    /// Append in one owner-checked statement: the membership row is only
    /// inserted when the playlist exists and belongs to the requester.
    pub fn add_video_to_playlist(
        &self,
        playlist_id: &str,
        owner_id: &str,
        video_id: &str,
    ) -> Result<Option<PlaylistRow>> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "INSERT INTO playlist_videos (playlist_id, video_id, position)
                 SELECT p.id, ?3,
                        COALESCE((SELECT MAX(position) FROM playlist_videos
                                  WHERE playlist_id = p.id), 0) + 1
                 FROM playlists p WHERE p.id = ?1 AND p.owner_id = ?2",
                params![playlist_id, owner_id, video_id],
            )?;
            if n == 0 {
                return Ok(None);
            }
            query_playlist(conn, playlist_id)
        })
    }

    /// Removing an absent video from an owned playlist is a no-op success,
    /// matching the add/remove collection semantics of the listing shape.
    pub fn remove_video_from_playlist(
        &self,
        playlist_id: &str,
        owner_id: &str,
        video_id: &str,
    ) -> Result<Option<PlaylistRow>> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM playlist_videos
                 WHERE playlist_id = ?1 AND video_id = ?3
                   AND EXISTS(SELECT 1 FROM playlists
                              WHERE id = ?1 AND owner_id = ?2)",
                params![playlist_id, owner_id, video_id],
            )?;

            let playlist = query_playlist(conn, playlist_id)?;
            Ok(playlist.filter(|p| p.owner_id == owner_id))
        })
    }
}
