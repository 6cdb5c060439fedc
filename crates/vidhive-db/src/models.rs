//! Database row types — these map directly to SQLite rows.
//! Distinct from the vidhive-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: String,
}

pub struct VideoRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub views: i64,
    pub is_published: bool,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: String,
    pub video_id: String,
    pub owner_id: String,
    pub owner_name: String,
    pub content: String,
    pub created_at: String,
}

pub struct TweetRow {
    pub id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: String,
}

pub struct LikeRow {
    pub id: String,
    pub target_kind: String,
    pub target_id: String,
    pub user_id: String,
    pub created_at: String,
}

pub struct PlaylistRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
    /// Ordered video ids from playlist_videos.
    pub videos: Vec<String>,
}

/// Watch-history entry joined to the video and its owner's public fields.
pub struct WatchHistoryRow {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub views: i64,
    pub created_at: String,
    pub owner_full_name: String,
    pub owner_user_name: String,
    pub owner_avatar: String,
}
