use axum::extract::{Path, Query, State};
use axum::{Extension, Json};

use vidhive_types::ObjectId;
use vidhive_types::api::{CommentBody, CommentResponse, Page, PageQuery, normalize_paging};

use crate::convert::comment_response;
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::{AppState, run_query};

fn parse_comment_id(raw: &str) -> Result<ObjectId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid comment ID"))
}

/// Comments for a video, newest first. An empty page is a success.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<ApiResponse<Page<CommentResponse>>> {
    let video_id: ObjectId = video_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid video ID"))?;

    let (page, limit) = normalize_paging(query.page, query.limit);

    let id = video_id.to_string();
    let (rows, total) = run_query(&state, move |db| {
        db.comments_for_video(&id, limit, (page - 1) * limit)
    })
    .await?;

    let docs = rows.into_iter().map(comment_response).collect();
    Ok(ApiResponse::ok(Page::new(docs, total, page, limit), "Video comments"))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(video_id): Path<String>,
    Json(req): Json<CommentBody>,
) -> ApiResult<ApiResponse<CommentResponse>> {
    let video_id: ObjectId = video_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid video ID"))?;
    if req.content.trim().is_empty() {
        return Err(ApiError::bad_request("Content is required"));
    }

    {
        let id = video_id.to_string();
        run_query(&state, move |db| db.get_video(&id))
            .await?
            .ok_or_else(|| ApiError::not_found("Video not found"))?;
    }

    let comment_id = ObjectId::new();
    {
        let id = comment_id.to_string();
        let video = video_id.to_string();
        let owner = user.profile.id.to_string();
        run_query(&state, move |db| db.insert_comment(&id, &video, &owner, &req.content)).await?;
    }

    let id = comment_id.to_string();
    let created = run_query(&state, move |db| db.get_comment(&id))
        .await?
        .ok_or_else(|| ApiError::internal("Comment not added"))?;

    Ok(ApiResponse::created(comment_response(created), "Comment added"))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(comment_id): Path<String>,
    Json(req): Json<CommentBody>,
) -> ApiResult<ApiResponse<CommentResponse>> {
    let comment_id = parse_comment_id(&comment_id)?;
    if req.content.trim().is_empty() {
        return Err(ApiError::bad_request("Content is required"));
    }

    let id = comment_id.to_string();
    let owner = user.profile.id.to_string();
    let updated = run_query(&state, move |db| db.update_comment(&id, &owner, &req.content))
        .await?
        .ok_or_else(|| ApiError::not_found("Unauthorized to update comment or comment not found"))?;

    Ok(ApiResponse::ok(comment_response(updated), "Comment updated"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(comment_id): Path<String>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let comment_id = parse_comment_id(&comment_id)?;

    let id = comment_id.to_string();
    let owner = user.profile.id.to_string();
    let deleted = run_query(&state, move |db| db.delete_comment(&id, &owner)).await?;
    if !deleted {
        return Err(ApiError::not_found("Unauthorized to delete comment or comment not found"));
    }

    Ok(ApiResponse::ok(serde_json::json!({}), "Comment deleted"))
}
