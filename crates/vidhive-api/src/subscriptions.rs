use axum::Extension;
use axum::extract::{Path, State};

use vidhive_types::ObjectId;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::{AppState, run_query};

fn parse_channel_id(raw: &str) -> Result<ObjectId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid channel ID"))
}

pub async fn toggle_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let channel_id = parse_channel_id(&channel_id)?;

    {
        let id = channel_id.to_string();
        run_query(&state, move |db| db.get_user_by_id(&id))
            .await?
            .ok_or_else(|| ApiError::not_found("Channel not found"))?;
    }

    let subscription_id = ObjectId::new();
    let subscriber = user.profile.id.to_string();
    let channel = channel_id.to_string();
    run_query(&state, move |db| {
        db.toggle_subscription(subscription_id.as_str(), &subscriber, &channel)
    })
    .await?;

    Ok(ApiResponse::ok(serde_json::json!({}), "Subscription toggled"))
}

/// Subscriber count for a channel (the wire shape is the bare count).
pub async fn channel_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<i64>> {
    let channel_id = parse_channel_id(&channel_id)?;

    {
        let id = channel_id.to_string();
        run_query(&state, move |db| db.get_user_by_id(&id))
            .await?
            .ok_or_else(|| ApiError::not_found("Channel not found"))?;
    }

    let id = channel_id.to_string();
    let count = run_query(&state, move |db| db.count_subscribers(&id)).await?;

    Ok(ApiResponse::ok(count, "Channel subscribers"))
}

/// Number of channels the user is subscribed to.
pub async fn subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
) -> ApiResult<ApiResponse<i64>> {
    let subscriber_id: ObjectId = subscriber_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid subscriber ID"))?;

    {
        let id = subscriber_id.to_string();
        run_query(&state, move |db| db.get_user_by_id(&id))
            .await?
            .ok_or_else(|| ApiError::not_found("Subscriber not found"))?;
    }

    let id = subscriber_id.to_string();
    let count = run_query(&state, move |db| db.count_subscriptions(&id)).await?;

    Ok(ApiResponse::ok(count, "Subscribed channels"))
}
