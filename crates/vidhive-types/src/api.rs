use serde::{Deserialize, Serialize};

use crate::{LikeTarget, ObjectId};

// -- JWT claims --

/// Access-token claims, carried in the `accessToken` cookie or a bearer
/// header. Canonical definition lives here so the API middleware and the
/// token issuance code share one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: ObjectId,
    pub username: String,
    pub exp: usize,
}

/// Refresh-token claims. The issued token is also persisted on the user row;
/// a refresh is only honored when the presented token matches the stored one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: ObjectId,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub user_name: Option<String>,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetailRequest {
    pub full_name: String,
    pub email: String,
}

/// User document as exposed over the wire. Credentials and the stored
/// refresh token are never part of this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: ObjectId,
    pub user_name: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub created_at: String,
}

// -- Videos --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoRequest {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: ObjectId,
    pub owner: ObjectId,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub views: i64,
    pub is_published: bool,
    pub created_at: String,
}

/// Listing filter for `GET /videos`. Unknown sort fields fall back to
/// creation time; direction defaults to descending.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListQuery {
    pub query: Option<String>,
    pub user_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub limit: i64,
}

// -- Comments --

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: ObjectId,
    pub video: ObjectId,
    pub owner: ObjectId,
    pub owner_name: String,
    pub content: String,
    pub created_at: String,
}

// -- Likes --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub id: ObjectId,
    #[serde(flatten)]
    pub target: LikeTarget,
    pub liked_by: ObjectId,
    pub created_at: String,
}

// -- Tweets --

#[derive(Debug, Deserialize)]
pub struct TweetBody {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetResponse {
    pub id: ObjectId,
    pub owner: ObjectId,
    pub content: String,
    pub created_at: String,
}

// -- Playlists --

#[derive(Debug, Deserialize)]
pub struct PlaylistBody {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResponse {
    pub id: ObjectId,
    pub owner: ObjectId,
    pub name: String,
    pub description: String,
    /// Ordered; duplicates are not prevented.
    pub videos: Vec<ObjectId>,
    pub created_at: String,
}

// -- Aggregate views --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: ObjectId,
    pub full_name: String,
    pub user_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub subscriber_count: i64,
    pub channel_subscriptions: i64,
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub channel_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub total_subscribers: i64,
    pub total_likes: i64,
    pub total_videos: i64,
    pub total_views: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoOwner {
    pub full_name: String,
    pub user_name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedVideo {
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub views: i64,
    pub created_at: String,
    pub owner: VideoOwner,
}

// -- Pagination --

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub limit: i64,
}

/// Clamp raw page/limit query values. Page numbers below 1 are treated as
/// page 1 so the offset math cannot underflow; a missing/zero limit gets the
/// default and oversized limits are capped.
pub fn normalize_paging(page: i64, limit: i64) -> (i64, i64) {
    let page = page.max(1);
    let limit = if limit < 1 {
        DEFAULT_PAGE_SIZE
    } else {
        limit.min(MAX_PAGE_SIZE)
    };
    (page, limit)
}

/// One page of results plus total-count metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub docs: Vec<T>,
    pub total_docs: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(docs: Vec<T>, total_docs: i64, page: i64, limit: i64) -> Self {
        Self {
            docs,
            total_docs,
            page,
            limit,
            total_pages: total_docs.div_ceil(limit.max(1)),
        }
    }
}
