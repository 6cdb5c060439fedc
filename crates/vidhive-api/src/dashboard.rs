use axum::extract::{Path, State};

use vidhive_types::ObjectId;
use vidhive_types::api::{ChannelStats, VideoResponse};

use crate::convert::video_response;
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::{AppState, run_query};

fn parse_channel_id(raw: &str) -> Result<ObjectId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid channel ID"))
}

/// Channel dashboard aggregate. The channel is resolved before any count is
/// computed; each count is an independent query and the first failure aborts
/// the assembly. A channel with zero videos reports zero views.
pub async fn channel_stats(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<ChannelStats>> {
    let channel_id = parse_channel_id(&channel_id)?;

    let channel = {
        let id = channel_id.to_string();
        run_query(&state, move |db| db.get_user_by_id(&id))
            .await?
            .ok_or_else(|| ApiError::not_found("Channel not found"))?
    };

    let id = channel_id.to_string();
    let total_subscribers = {
        let id = id.clone();
        run_query(&state, move |db| db.count_subscribers(&id)).await?
    };
    let total_likes = {
        let id = id.clone();
        run_query(&state, move |db| db.count_likes_on_channel_videos(&id)).await?
    };
    let total_videos = {
        let id = id.clone();
        run_query(&state, move |db| db.count_videos_by_owner(&id)).await?
    };
    let total_views = run_query(&state, move |db| db.total_views_by_owner(&id)).await?;

    Ok(ApiResponse::ok(
        ChannelStats {
            channel_name: channel.username,
            avatar: channel.avatar,
            cover_image: channel.cover_image,
            total_subscribers,
            total_likes,
            total_videos,
            total_views,
        },
        "Channel stats",
    ))
}

/// Every video the channel has uploaded; an empty channel is reported as
/// 404 here (deliberate asymmetry with the generic listing).
pub async fn channel_videos(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<VideoResponse>>> {
    let channel_id = parse_channel_id(&channel_id)?;

    let id = channel_id.to_string();
    let rows = run_query(&state, move |db| db.videos_by_owner(&id)).await?;
    if rows.is_empty() {
        return Err(ApiError::not_found("No videos found for the channel"));
    }

    Ok(ApiResponse::ok(
        rows.into_iter().map(video_response).collect(),
        "Channel videos",
    ))
}
