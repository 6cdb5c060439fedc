use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::{Multipart, Path, State};
use axum::{Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use vidhive_types::ObjectId;
use vidhive_types::api::{
    ChangePasswordRequest, ChannelProfile, LoginRequest, PublicUser, RefreshRequest,
    UpdateDetailRequest, WatchedVideo,
};

use crate::convert::{public_user, watched_video};
use crate::error::{ApiError, ApiResult};
use crate::media::{UploadForm, save_media};
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::{AppState, run_query};
use crate::tokens::{create_access_token, create_refresh_token, decode_refresh_token};

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .build()
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ApiError::internal("Failed to process credentials"))
}

fn verify_password(stored_hash: &str, password: &str) -> Result<bool, ApiError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|_| ApiError::internal("Corrupt credential record"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Mint both session tokens and persist the refresh token on the user row,
/// overwriting (and thereby invalidating) any previous one.
async fn issue_session(
    state: &AppState,
    user_id: &ObjectId,
    username: &str,
) -> Result<(String, String), ApiError> {
    let access = create_access_token(&state.access_secret, user_id, username)
        .map_err(|_| ApiError::internal("Failed to generate token"))?;
    let refresh = create_refresh_token(&state.refresh_secret, user_id)
        .map_err(|_| ApiError::internal("Failed to generate token"))?;

    let id = user_id.to_string();
    let stored = refresh.clone();
    let updated = run_query(state, move |db| db.set_refresh_token(&id, Some(&stored))).await?;
    if !updated {
        return Err(ApiError::internal("Failed to generate token"));
    }

    Ok((access, refresh))
}

pub async fn register(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<ApiResponse<PublicUser>> {
    let form = UploadForm::read(&mut multipart).await?;

    let full_name = form.require_text("fullName", "All fields are required")?.to_string();
    let email = form.require_text("email", "All fields are required")?.to_string();
    let user_name = form
        .require_text("userName", "All fields are required")?
        .to_ascii_lowercase();
    let password = form.require_text("password", "All fields are required")?.to_string();

    {
        let user_name = user_name.clone();
        let email = email.clone();
        let taken = run_query(&state, move |db| db.identity_taken(&user_name, &email)).await?;
        if taken {
            return Err(ApiError::bad_request("User with email or username already exists"));
        }
    }

    let avatar_bytes = form
        .file("avatar")
        .ok_or_else(|| ApiError::bad_request("Avatar image is required"))?;
    let avatar = save_media(&state.media_root, avatar_bytes).await?;
    let cover_image = match form.file("coverImage") {
        Some(bytes) => Some(save_media(&state.media_root, bytes).await?),
        None => None,
    };

    let password_hash = hash_password(&password)?;
    let user_id = ObjectId::new();

    {
        let id = user_id.to_string();
        let user_name = user_name.clone();
        run_query(&state, move |db| {
            db.create_user(
                &id,
                &user_name,
                &email,
                &password_hash,
                &full_name,
                &avatar,
                cover_image.as_deref(),
            )
        })
        .await?;
    }

    let id = user_id.to_string();
    let created = run_query(&state, move |db| db.get_user_by_id(&id))
        .await?
        .ok_or_else(|| ApiError::internal("Failed to create user"))?;

    Ok(ApiResponse::created(
        public_user(created),
        "User registered successfully",
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, ApiResponse<PublicUser>)> {
    if req.email.is_none() && req.user_name.is_none() {
        return Err(ApiError::bad_request("Email or username is required"));
    }

    let email = req.email.clone();
    let user_name = req.user_name.clone();
    let user = run_query(&state, move |db| {
        db.get_user_by_email_or_username(email.as_deref(), user_name.as_deref())
    })
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !verify_password(&user.password, &req.password)? {
        return Err(ApiError::bad_request("Invalid password"));
    }

    let profile = public_user(user);
    let (access, refresh) = issue_session(&state, &profile.id, &profile.user_name).await?;

    let jar = jar
        .add(session_cookie("accessToken", access))
        .add(session_cookie("refreshToken", refresh));

    Ok((jar, ApiResponse::ok(profile, "User logged in successfully")))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, ApiResponse<()>)> {
    let id = user.profile.id.to_string();
    run_query(&state, move |db| db.set_refresh_token(&id, None)).await?;

    let jar = jar
        .remove(session_cookie("accessToken", String::new()))
        .remove(session_cookie("refreshToken", String::new()));

    Ok((jar, ApiResponse::ok((), "User logged out successfully")))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult<(CookieJar, ApiResponse<()>)> {
    let incoming = jar
        .get("refreshToken")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| body.and_then(|Json(req)| req.refresh_token))
        .ok_or_else(|| ApiError::bad_request("Unauthorized access"))?;

    let claims = decode_refresh_token(&state.refresh_secret, &incoming)
        .ok_or_else(|| ApiError::bad_request("Invalid refresh token"))?;

    let id = claims.sub.to_string();
    let user = run_query(&state, move |db| db.get_user_by_id(&id))
        .await?
        .ok_or_else(|| ApiError::not_found("Invalid refresh token"))?;

    // A refresh token that verifies but no longer matches the stored value
    // has been rotated out from under the caller.
    if user.refresh_token.as_deref() != Some(incoming.as_str()) {
        return Err(ApiError::bad_request("Invalid refresh token"));
    }

    let profile = public_user(user);
    let (access, refresh) = issue_session(&state, &profile.id, &profile.user_name).await?;

    let jar = jar
        .add(session_cookie("accessToken", access))
        .add(session_cookie("refreshToken", refresh));

    Ok((jar, ApiResponse::ok((), "Token refreshed successfully")))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<ApiResponse<()>> {
    if req.old_password.is_empty() || req.new_password.is_empty() {
        return Err(ApiError::bad_request("Old password and new password are required"));
    }

    let id = user.profile.id.to_string();
    let stored = {
        let id = id.clone();
        run_query(&state, move |db| db.get_user_by_id(&id))
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?
    };

    if !verify_password(&stored.password, &req.old_password)? {
        return Err(ApiError::bad_request("Invalid old password"));
    }

    let new_hash = hash_password(&req.new_password)?;
    run_query(&state, move |db| db.update_user_password(&id, &new_hash)).await?;

    Ok(ApiResponse::ok((), "Password changed successfully"))
}

pub async fn current_user(
    Extension(user): Extension<CurrentUser>,
) -> ApiResponse<PublicUser> {
    ApiResponse::ok(user.profile, "User fetched successfully")
}

pub async fn update_detail(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<UpdateDetailRequest>,
) -> ApiResult<ApiResponse<PublicUser>> {
    if req.full_name.trim().is_empty() || req.email.trim().is_empty() {
        return Err(ApiError::bad_request("All fields are required"));
    }

    let id = user.profile.id.to_string();
    let updated = run_query(&state, move |db| {
        db.update_user_details(&id, &req.full_name, &req.email)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::ok(public_user(updated), "User updated successfully"))
}

pub async fn update_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> ApiResult<ApiResponse<PublicUser>> {
    let form = UploadForm::read(&mut multipart).await?;
    let bytes = form
        .file("avatar")
        .ok_or_else(|| ApiError::bad_request("Avatar image is required"))?;

    let avatar = save_media(&state.media_root, bytes).await?;
    let id = user.profile.id.to_string();
    let updated = run_query(&state, move |db| db.update_user_avatar(&id, &avatar))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::ok(
        public_user(updated),
        "User avatar updated successfully",
    ))
}

pub async fn update_cover_image(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> ApiResult<ApiResponse<PublicUser>> {
    let form = UploadForm::read(&mut multipart).await?;
    let bytes = form
        .file("coverImage")
        .ok_or_else(|| ApiError::bad_request("Cover image is required"))?;

    let cover = save_media(&state.media_root, bytes).await?;
    let id = user.profile.id.to_string();
    let updated = run_query(&state, move |db| db.update_user_cover_image(&id, &cover))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::ok(
        public_user(updated),
        "User cover image updated successfully",
    ))
}

/// Channel profile aggregate: resolve the user first, then the counts. Each
/// count is its own query; the first failure aborts the assembly.
pub async fn channel_profile(
    State(state): State<AppState>,
    Extension(requester): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> ApiResult<ApiResponse<ChannelProfile>> {
    if username.trim().is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }

    let lookup = username.to_ascii_lowercase();
    let channel = run_query(&state, move |db| db.get_user_by_username(&lookup))
        .await?
        .ok_or_else(|| ApiError::not_found("Channel not found"))?;
    let channel = public_user(channel);

    let channel_id = channel.id.to_string();
    let subscriber_count = {
        let channel_id = channel_id.clone();
        run_query(&state, move |db| db.count_subscribers(&channel_id)).await?
    };
    let channel_subscriptions = {
        let channel_id = channel_id.clone();
        run_query(&state, move |db| db.count_subscriptions(&channel_id)).await?
    };
    let is_subscribed = {
        let requester_id = requester.profile.id.to_string();
        run_query(&state, move |db| db.is_subscribed(&requester_id, &channel_id)).await?
    };

    Ok(ApiResponse::ok(
        ChannelProfile {
            id: channel.id,
            full_name: channel.full_name,
            user_name: channel.user_name,
            avatar: channel.avatar,
            cover_image: channel.cover_image,
            subscriber_count,
            channel_subscriptions,
            is_subscribed,
        },
        "Channel fetched successfully",
    ))
}

pub async fn watch_history(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<ApiResponse<Vec<WatchedVideo>>> {
    let id = user.profile.id.to_string();
    let rows = run_query(&state, move |db| db.watch_history(&id)).await?;

    Ok(ApiResponse::ok(
        rows.into_iter().map(watched_video).collect(),
        "Watch history fetched successfully",
    ))
}
