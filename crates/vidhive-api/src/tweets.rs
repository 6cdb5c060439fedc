use axum::extract::{Path, State};
use axum::{Extension, Json};

use vidhive_types::ObjectId;
use vidhive_types::api::{TweetBody, TweetResponse};

use crate::convert::tweet_response;
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::{AppState, run_query};

fn parse_tweet_id(raw: &str) -> Result<ObjectId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid tweet ID"))
}

pub async fn create_tweet(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<TweetBody>,
) -> ApiResult<ApiResponse<TweetResponse>> {
    if req.content.trim().is_empty() {
        return Err(ApiError::bad_request("Content is required"));
    }

    let tweet_id = ObjectId::new();
    {
        let id = tweet_id.to_string();
        let owner = user.profile.id.to_string();
        run_query(&state, move |db| db.insert_tweet(&id, &owner, &req.content)).await?;
    }

    let id = tweet_id.to_string();
    let created = run_query(&state, move |db| db.get_tweet(&id))
        .await?
        .ok_or_else(|| ApiError::internal("Failed to create tweet"))?;

    Ok(ApiResponse::created(tweet_response(created), "Tweet created"))
}

/// A user with no tweets gets an empty list, not an error.
pub async fn user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<TweetResponse>>> {
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
    let rows = run_query(&state, move |db| db.tweets_by_owner(&id)).await?;

    Ok(ApiResponse::ok(
        rows.into_iter().map(tweet_response).collect(),
        "User tweets",
    ))
}

pub async fn update_tweet(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(tweet_id): Path<String>,
    Json(req): Json<TweetBody>,
) -> ApiResult<ApiResponse<TweetResponse>> {
    let tweet_id = parse_tweet_id(&tweet_id)?;
    if req.content.trim().is_empty() {
        return Err(ApiError::bad_request("Content is required"));
    }

    let id = tweet_id.to_string();
    let owner = user.profile.id.to_string();
    let updated = run_query(&state, move |db| db.update_tweet(&id, &owner, &req.content))
        .await?
        .ok_or_else(|| ApiError::not_found("Tweet not found or not authorized to update"))?;

    Ok(ApiResponse::ok(tweet_response(updated), "Tweet updated"))
}

pub async fn delete_tweet(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(tweet_id): Path<String>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let tweet_id = parse_tweet_id(&tweet_id)?;

    let id = tweet_id.to_string();
    let owner = user.profile.id.to_string();
    let deleted = run_query(&state, move |db| db.delete_tweet(&id, &owner)).await?;
    if !deleted {
        return Err(ApiError::not_found("Tweet not found or not authorized to delete"));
    }

    Ok(ApiResponse::ok(serde_json::json!({}), "Tweet deleted"))
}
