use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            username        TEXT NOT NULL UNIQUE,
            email           TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            full_name       TEXT NOT NULL,
            avatar          TEXT NOT NULL,
            cover_image     TEXT,
            refresh_token   TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS videos (
            id              TEXT PRIMARY KEY,
            owner_id        TEXT NOT NULL REFERENCES users(id),
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            video_file      TEXT NOT NULL,
            thumbnail       TEXT NOT NULL,
            views           INTEGER NOT NULL DEFAULT 0,
            is_published    INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_videos_owner
            ON videos(owner_id, created_at);

        CREATE TABLE IF NOT EXISTS comments (
            id          TEXT PRIMARY KEY,
            video_id    TEXT NOT NULL REFERENCES videos(id),
            owner_id    TEXT NOT NULL REFERENCES users(id),
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_video
            ON comments(video_id, created_at);

        CREATE TABLE IF NOT EXISTS tweets (
            id          TEXT PRIMARY KEY,
            owner_id    TEXT NOT NULL REFERENCES users(id),
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_tweets_owner
            ON tweets(owner_id, created_at);

        -- target_kind + target_id form the tagged like target; the UNIQUE
        -- constraint is the backstop against concurrent toggles producing
        -- duplicate memberships.
        CREATE TABLE IF NOT EXISTS likes (
            id          TEXT PRIMARY KEY,
            target_kind TEXT NOT NULL CHECK (target_kind IN ('video', 'comment', 'tweet')),
            target_id   TEXT NOT NULL,
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(target_kind, target_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_likes_target
            ON likes(target_kind, target_id);

        CREATE TABLE IF NOT EXISTS playlists (
            id          TEXT PRIMARY KEY,
            owner_id    TEXT NOT NULL REFERENCES users(id),
            name        TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Ordered membership; duplicates are allowed.
        CREATE TABLE IF NOT EXISTS playlist_videos (
            playlist_id TEXT NOT NULL REFERENCES playlists(id),
            video_id    TEXT NOT NULL,
            position    INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_playlist_videos
            ON playlist_videos(playlist_id, position);

        CREATE TABLE IF NOT EXISTS subscriptions (
            id              TEXT PRIMARY KEY,
            subscriber_id   TEXT NOT NULL REFERENCES users(id),
            channel_id      TEXT NOT NULL REFERENCES users(id),
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(subscriber_id, channel_id)
        );

        CREATE INDEX IF NOT EXISTS idx_subscriptions_channel
            ON subscriptions(channel_id);

        CREATE TABLE IF NOT EXISTS watch_history (
            user_id     TEXT NOT NULL REFERENCES users(id),
            video_id    TEXT NOT NULL REFERENCES videos(id),
            position    INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_watch_history_user
            ON watch_history(user_id, position);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
