use axum::extract::{Path, State};
use axum::{Extension, Json};

use vidhive_types::ObjectId;
use vidhive_types::api::{PlaylistBody, PlaylistResponse};

use crate::convert::playlist_response;
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::{AppState, run_query};

fn parse_playlist_id(raw: &str) -> Result<ObjectId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid playlist ID"))
}

fn parse_pair(playlist_id: &str, video_id: &str) -> Result<(ObjectId, ObjectId), ApiError> {
    let playlist: Result<ObjectId, _> = playlist_id.parse();
    let video: Result<ObjectId, _> = video_id.parse();
    match (playlist, video) {
        (Ok(playlist), Ok(video)) => Ok((playlist, video)),
        _ => Err(ApiError::bad_request("Invalid playlist or video ID")),
    }
}

pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<PlaylistBody>,
) -> ApiResult<ApiResponse<PlaylistResponse>> {
    if req.name.trim().is_empty() || req.description.trim().is_empty() {
        return Err(ApiError::bad_request("Name and description are required"));
    }

    let playlist_id = ObjectId::new();
    {
        let id = playlist_id.to_string();
        let owner = user.profile.id.to_string();
        run_query(&state, move |db| {
            db.insert_playlist(&id, &owner, &req.name, &req.description)
        })
        .await?;
    }

    let id = playlist_id.to_string();
    let created = run_query(&state, move |db| db.get_playlist(&id))
        .await?
        .ok_or_else(|| ApiError::internal("Failed to create playlist"))?;

    Ok(ApiResponse::created(playlist_response(created), "Playlist created"))
}

pub async fn get_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> ApiResult<ApiResponse<PlaylistResponse>> {
    let playlist_id = parse_playlist_id(&playlist_id)?;

    let id = playlist_id.to_string();
    let playlist = run_query(&state, move |db| db.get_playlist(&id))
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    Ok(ApiResponse::ok(playlist_response(playlist), "Playlist found"))
}

/// A user with zero playlists is reported as 404 here; the generic listings
/// return empty pages instead. The asymmetry is deliberate.
pub async fn user_playlists(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<PlaylistResponse>>> {
    let user_id: ObjectId = user_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid user ID"))?;

    {
        let id = user_id.to_string();
        run_query(&state, move |db| db.get_user_by_id(&id))
            .await?
            .ok_or_else(|| ApiError::bad_request("Invalid user ID"))?;
    }

    let id = user_id.to_string();
    let rows = run_query(&state, move |db| db.playlists_by_owner(&id)).await?;
    if rows.is_empty() {
        return Err(ApiError::not_found("User has no playlists"));
    }

    Ok(ApiResponse::ok(
        rows.into_iter().map(playlist_response).collect(),
        "User playlists",
    ))
}

pub async fn update_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(playlist_id): Path<String>,
    Json(req): Json<PlaylistBody>,
) -> ApiResult<ApiResponse<PlaylistResponse>> {
    let playlist_id = parse_playlist_id(&playlist_id)?;
    if req.name.trim().is_empty() || req.description.trim().is_empty() {
        return Err(ApiError::bad_request("Name and description are required"));
    }

    let id = playlist_id.to_string();
    let owner = user.profile.id.to_string();
    let updated = run_query(&state, move |db| {
        db.update_playlist(&id, &owner, &req.name, &req.description)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    Ok(ApiResponse::ok(playlist_response(updated), "Playlist updated"))
}

pub async fn delete_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(playlist_id): Path<String>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let playlist_id = parse_playlist_id(&playlist_id)?;

    let id = playlist_id.to_string();
    let owner = user.profile.id.to_string();
    let deleted = run_query(&state, move |db| db.delete_playlist(&id, &owner)).await?;
    if !deleted {
        return Err(ApiError::not_found("Playlist not found"));
    }

    Ok(ApiResponse::ok(serde_json::json!({}), "Playlist deleted"))
}

pub async fn add_video(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> ApiResult<ApiResponse<PlaylistResponse>> {
    let (playlist_id, video_id) = parse_pair(&playlist_id, &video_id)?;

    let playlist = playlist_id.to_string();
    let owner = user.profile.id.to_string();
    let video = video_id.to_string();
    let updated = run_query(&state, move |db| {
        db.add_video_to_playlist(&playlist, &owner, &video)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    Ok(ApiResponse::ok(
        playlist_response(updated),
        "Video added to playlist",
    ))
}

pub async fn remove_video(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> ApiResult<ApiResponse<PlaylistResponse>> {
    let (playlist_id, video_id) = parse_pair(&playlist_id, &video_id)?;

    let playlist = playlist_id.to_string();
    let owner = user.profile.id.to_string();
    let video = video_id.to_string();
    let updated = run_query(&state, move |db| {
        db.remove_video_from_playlist(&playlist, &owner, &video)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    Ok(ApiResponse::ok(
        playlist_response(updated),
        "Video removed from playlist",
    ))
}
