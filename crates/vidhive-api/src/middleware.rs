use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use vidhive_types::api::{AccessClaims, PublicUser};

use crate::convert::public_user;
use crate::error::ApiError;
use crate::state::{AppState, run_query};
use crate::tokens::decode_access_token;

/// Authenticated requester, inserted as an extension by `require_auth`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub profile: PublicUser,
}

/// The access token is accepted from the `accessToken` cookie or a bearer
/// header, in that order.
fn access_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get("accessToken") {
        return Some(cookie.value().to_string());
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Validate the session credential and resolve the requesting user before
/// the handler runs. Every failure here is a 401 envelope.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = access_token(&jar, req.headers())
        .ok_or_else(|| ApiError::unauthorized("No login user found"))?;

    let claims = decode_access_token(&state.access_secret, &token)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized access"))?;

    let user_id = claims.sub.to_string();
    let user = run_query(&state, move |db| db.get_user_by_id(&user_id))
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid access token"))?;

    req.extensions_mut().insert(CurrentUser {
        profile: public_user(user),
    });
    Ok(next.run(req).await)
}

/// Best-effort identification for endpoints that serve anonymous traffic
/// but personalize when a valid token happens to be present.
pub fn maybe_claims(state: &AppState, jar: &CookieJar, headers: &HeaderMap) -> Option<AccessClaims> {
    let token = access_token(jar, headers)?;
    decode_access_token(&state.access_secret, &token)
}
