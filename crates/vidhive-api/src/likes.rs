use axum::Extension;
use axum::extract::{Path, State};

use vidhive_types::api::{LikeResponse, VideoResponse};
use vidhive_types::{LikeTarget, ObjectId};

use crate::convert::{like_response, video_response};
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::{AppState, run_query};

/// Shared toggle body: one instance per target kind, differing only in the
/// populated target variant and the wording.
async fn toggle(
    state: &AppState,
    user: &CurrentUser,
    target: LikeTarget,
    liked_message: &'static str,
    failed_message: &'static str,
) -> ApiResult<ApiResponse<Option<LikeResponse>>> {
    let like_id = ObjectId::new();
    let user_id = user.profile.id.to_string();
    let (added, row) = run_query(state, move |db| {
        db.toggle_like(like_id.as_str(), &target, &user_id)
    })
    .await?;

    if added {
        let row = row.ok_or_else(|| ApiError::internal(failed_message))?;
        Ok(ApiResponse::created(Some(like_response(row)), liked_message))
    } else {
        Ok(ApiResponse::ok(None, "Like removed"))
    }
}

pub async fn toggle_video_like(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<Option<LikeResponse>>> {
    let video_id: ObjectId = video_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid video ID"))?;
    toggle(
        &state,
        &user,
        LikeTarget::Video(video_id),
        "Video liked",
        "Failed to like video",
    )
    .await
}

pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(comment_id): Path<String>,
) -> ApiResult<ApiResponse<Option<LikeResponse>>> {
    let comment_id: ObjectId = comment_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid comment ID"))?;
    toggle(
        &state,
        &user,
        LikeTarget::Comment(comment_id),
        "Comment liked",
        "Failed to like comment",
    )
    .await
}

pub async fn toggle_tweet_like(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(tweet_id): Path<String>,
) -> ApiResult<ApiResponse<Option<LikeResponse>>> {
    let tweet_id: ObjectId = tweet_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid tweet ID"))?;
    toggle(
        &state,
        &user,
        LikeTarget::Tweet(tweet_id),
        "Tweet liked",
        "Failed to like tweet",
    )
    .await
}

pub async fn liked_videos(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<ApiResponse<Vec<VideoResponse>>> {
    let user_id = user.profile.id.to_string();
    let rows = run_query(&state, move |db| db.liked_videos(&user_id)).await?;

    Ok(ApiResponse::ok(
        rows.into_iter().map(video_response).collect(),
        "Liked videos",
    ))
}
