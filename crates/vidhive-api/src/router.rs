use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use tower_http::services::ServeDir;

use crate::media::MAX_UPLOAD_BYTES;
use crate::middleware::require_auth;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::{comments, dashboard, likes, playlists, subscriptions, tweets, users, videos};

async fn healthcheck() -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(serde_json::json!({}), "Health check passed")
}

/// Full application router: `/api/v1` endpoints plus static media serving.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/refresh-token", post(users::refresh_token))
        .route("/videos", get(videos::list_videos))
        .route("/videos/{video_id}", get(videos::get_video_by_id))
        .route("/comments/{video_id}", get(comments::list_comments))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/users/logout", post(users::logout))
        .route("/users/change-password", post(users::change_password))
        .route("/users/current-user", get(users::current_user))
        .route("/users/update-detail", patch(users::update_detail))
        .route("/users/update-avatar", patch(users::update_avatar))
        .route("/users/update-cover-image", patch(users::update_cover_image))
        .route("/users/channel/{username}", get(users::channel_profile))
        .route("/users/watch-history", get(users::watch_history))
        .route("/videos", post(videos::publish_video))
        .route(
            "/videos/{video_id}",
            patch(videos::update_video).delete(videos::delete_video),
        )
        .route("/videos/{video_id}/toggle-publish", patch(videos::toggle_publish))
        .route("/comments/{video_id}", post(comments::add_comment))
        .route(
            "/comments/c/{comment_id}",
            patch(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/likes/toggle/v/{video_id}", post(likes::toggle_video_like))
        .route("/likes/toggle/c/{comment_id}", post(likes::toggle_comment_like))
        .route("/likes/toggle/t/{tweet_id}", post(likes::toggle_tweet_like))
        .route("/likes/videos", get(likes::liked_videos))
        .route("/tweets", post(tweets::create_tweet))
        .route("/tweets/user/{user_id}", get(tweets::user_tweets))
        .route(
            "/tweets/{tweet_id}",
            patch(tweets::update_tweet).delete(tweets::delete_tweet),
        )
        .route("/playlist", post(playlists::create_playlist))
        .route("/playlist/user/{user_id}", get(playlists::user_playlists))
        .route(
            "/playlist/{playlist_id}",
            get(playlists::get_playlist)
                .patch(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route("/playlist/add/{video_id}/{playlist_id}", patch(playlists::add_video))
        .route("/playlist/remove/{video_id}/{playlist_id}", patch(playlists::remove_video))
        .route(
            "/subscriptions/c/{channel_id}",
            post(subscriptions::toggle_subscription).get(subscriptions::channel_subscribers),
        )
        .route("/subscriptions/u/{subscriber_id}", get(subscriptions::subscribed_channels))
        .route("/dashboard/stats/{channel_id}", get(dashboard::channel_stats))
        .route("/dashboard/videos/{channel_id}", get(dashboard::channel_videos))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .nest_service("/media", ServeDir::new(&state.media_root))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
