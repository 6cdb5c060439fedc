//! Row-to-DTO conversions. Stored ids were validated on the way in, so a
//! parse failure here means a corrupt row: log it and substitute rather
//! than fail the whole response.

use tracing::warn;

use vidhive_db::models::{
    CommentRow, LikeRow, PlaylistRow, TweetRow, UserRow, VideoRow, WatchHistoryRow,
};
use vidhive_types::api::{
    CommentResponse, LikeResponse, PlaylistResponse, PublicUser, TweetResponse, VideoOwner,
    VideoResponse, WatchedVideo,
};
use vidhive_types::{LikeTarget, ObjectId};

fn stored_id(raw: &str) -> ObjectId {
    raw.parse().unwrap_or_else(|_| {
        warn!("Corrupt stored id {raw:?}");
        ObjectId::new()
    })
}

pub(crate) fn public_user(row: UserRow) -> PublicUser {
    PublicUser {
        id: stored_id(&row.id),
        user_name: row.username,
        email: row.email,
        full_name: row.full_name,
        avatar: row.avatar,
        cover_image: row.cover_image,
        created_at: row.created_at,
    }
}

pub(crate) fn video_response(row: VideoRow) -> VideoResponse {
    VideoResponse {
        id: stored_id(&row.id),
        owner: stored_id(&row.owner_id),
        title: row.title,
        description: row.description,
        video_file: row.video_file,
        thumbnail: row.thumbnail,
        views: row.views,
        is_published: row.is_published,
        created_at: row.created_at,
    }
}

pub(crate) fn comment_response(row: CommentRow) -> CommentResponse {
    CommentResponse {
        id: stored_id(&row.id),
        video: stored_id(&row.video_id),
        owner: stored_id(&row.owner_id),
        owner_name: row.owner_name,
        content: row.content,
        created_at: row.created_at,
    }
}

pub(crate) fn tweet_response(row: TweetRow) -> TweetResponse {
    TweetResponse {
        id: stored_id(&row.id),
        owner: stored_id(&row.owner_id),
        content: row.content,
        created_at: row.created_at,
    }
}

pub(crate) fn like_response(row: LikeRow) -> LikeResponse {
    let target_id = stored_id(&row.target_id);
    let target = match row.target_kind.as_str() {
        "comment" => LikeTarget::Comment(target_id),
        "tweet" => LikeTarget::Tweet(target_id),
        "video" => LikeTarget::Video(target_id),
        other => {
            warn!("Corrupt like target kind {other:?}");
            LikeTarget::Video(target_id)
        }
    };
    LikeResponse {
        id: stored_id(&row.id),
        target,
        liked_by: stored_id(&row.user_id),
        created_at: row.created_at,
    }
}

pub(crate) fn playlist_response(row: PlaylistRow) -> PlaylistResponse {
    PlaylistResponse {
        id: stored_id(&row.id),
        owner: stored_id(&row.owner_id),
        name: row.name,
        description: row.description,
        videos: row.videos.iter().map(|id| stored_id(id)).collect(),
        created_at: row.created_at,
    }
}

pub(crate) fn watched_video(row: WatchHistoryRow) -> WatchedVideo {
    WatchedVideo {
        id: stored_id(&row.video_id),
        title: row.title,
        description: row.description,
        video_file: row.video_file,
        thumbnail: row.thumbnail,
        views: row.views,
        created_at: row.created_at,
        owner: VideoOwner {
            full_name: row.owner_full_name,
            user_name: row.owner_user_name,
            avatar: row.owner_avatar,
        },
    }
}
