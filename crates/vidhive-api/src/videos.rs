use axum::extract::{Multipart, Path, Query, State};
use axum::http::HeaderMap;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use vidhive_db::queries::videos::VideoFilter;
use vidhive_types::ObjectId;
use vidhive_types::api::{
    Page, UpdateVideoRequest, VideoListQuery, VideoResponse, normalize_paging,
};

use crate::convert::video_response;
use crate::error::{ApiError, ApiResult};
use crate::media::{UploadForm, save_media};
use crate::middleware::{CurrentUser, maybe_claims};
use crate::response::ApiResponse;
use crate::state::{AppState, run_query};

fn parse_video_id(raw: &str) -> Result<ObjectId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid video ID"))
}

pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<VideoListQuery>,
) -> ApiResult<ApiResponse<Page<VideoResponse>>> {
    // An owner filter is an identifier and must be validated before the
    // listing query runs.
    let owner_id = match query.user_id.as_deref() {
        Some(raw) => Some(
            raw.parse::<ObjectId>()
                .map_err(|_| ApiError::bad_request("Invalid user ID"))?,
        ),
        None => None,
    };

    let (page, limit) = normalize_paging(query.page, query.limit);
    let descending = !matches!(query.sort_type.as_deref(), Some("asc"));

    let (rows, total) = run_query(&state, move |db| {
        db.list_videos(&VideoFilter {
            title_query: query.query.as_deref(),
            owner_id: owner_id.as_ref().map(|id| id.as_str()),
            sort_by: query.sort_by.as_deref(),
            descending,
            page,
            limit,
        })
    })
    .await?;

    let docs = rows.into_iter().map(video_response).collect();
    Ok(ApiResponse::ok(Page::new(docs, total, page, limit), "All videos"))
}

pub async fn publish_video(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> ApiResult<ApiResponse<VideoResponse>> {
    let form = UploadForm::read(&mut multipart).await?;

    let title = form
        .require_text("title", "Title and description are required")?
        .to_string();
    let description = form
        .require_text("description", "Title and description are required")?
        .to_string();

    let video_bytes = form
        .file("video")
        .ok_or_else(|| ApiError::bad_request("Video and thumbnail are required"))?;
    let thumbnail_bytes = form
        .file("thumbnail")
        .ok_or_else(|| ApiError::bad_request("Video and thumbnail are required"))?;

    let video_file = save_media(&state.media_root, video_bytes).await?;
    let thumbnail = save_media(&state.media_root, thumbnail_bytes).await?;

    let video_id = ObjectId::new();
    {
        let id = video_id.to_string();
        let owner = user.profile.id.to_string();
        run_query(&state, move |db| {
            db.insert_video(&id, &owner, &title, &description, &video_file, &thumbnail)
        })
        .await?;
    }

    let id = video_id.to_string();
    let created = run_query(&state, move |db| db.get_video(&id))
        .await?
        .ok_or_else(|| ApiError::internal("Failed to create video"))?;

    Ok(ApiResponse::created(video_response(created), "Video created"))
}

pub async fn get_video_by_id(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<VideoResponse>> {
    let video_id = parse_video_id(&video_id)?;

    {
        let id = video_id.to_string();
        run_query(&state, move |db| db.increment_views(&id)).await?;
    }

    let id = video_id.to_string();
    let video = run_query(&state, move |db| db.get_video(&id))
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    // Personalization only: a fetch with a usable token lands in the
    // viewer's watch history, anonymous fetches do not.
    if let Some(claims) = maybe_claims(&state, &jar, &headers) {
        let viewer = claims.sub.to_string();
        let watched = video_id.to_string();
        if let Err(err) = run_query(&state, move |db| db.record_watch(&viewer, &watched)).await {
            warn!("Failed to record watch history: {err:?}");
        }
    }

    Ok(ApiResponse::ok(video_response(video), "Video found"))
}

pub async fn update_video(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(video_id): Path<String>,
    Json(req): Json<UpdateVideoRequest>,
) -> ApiResult<ApiResponse<VideoResponse>> {
    if req.title.trim().is_empty() || req.description.trim().is_empty() || req.thumbnail.trim().is_empty() {
        return Err(ApiError::bad_request("Title, description and thumbnail are required"));
    }
    let video_id = parse_video_id(&video_id)?;

    let id = video_id.to_string();
    let owner = user.profile.id.to_string();
    let updated = run_query(&state, move |db| {
        db.update_video(&id, &owner, &req.title, &req.description, &req.thumbnail)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Video not found or not authorized to update"))?;

    Ok(ApiResponse::ok(video_response(updated), "Video updated"))
}

pub async fn delete_video(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let video_id = parse_video_id(&video_id)?;

    let id = video_id.to_string();
    let owner = user.profile.id.to_string();
    let deleted = run_query(&state, move |db| db.delete_video(&id, &owner)).await?;
    if !deleted {
        return Err(ApiError::not_found("Video not found or not authorized to delete"));
    }

    Ok(ApiResponse::ok(serde_json::json!({}), "Video deleted"))
}

pub async fn toggle_publish(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<VideoResponse>> {
    let video_id = parse_video_id(&video_id)?;

    let id = video_id.to_string();
    let owner = user.profile.id.to_string();
    let updated = run_query(&state, move |db| db.toggle_publish(&id, &owner))
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found or not authorized to update"))?;

    Ok(ApiResponse::ok(
        video_response(updated),
        "Video publish status toggled",
    ))
}
