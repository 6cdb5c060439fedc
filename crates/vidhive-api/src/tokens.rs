use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use vidhive_types::ObjectId;
use vidhive_types::api::{AccessClaims, RefreshClaims};

/// Access tokens are short-lived; refresh tokens live longer and are also
/// persisted server-side, so a login invalidates any earlier refresh token.
fn access_token_ttl() -> chrono::Duration {
    chrono::Duration::hours(24)
}

fn refresh_token_ttl() -> chrono::Duration {
    chrono::Duration::days(10)
}

pub fn create_access_token(
    secret: &str,
    user_id: &ObjectId,
    username: &str,
) -> anyhow::Result<String> {
    let claims = AccessClaims {
        sub: user_id.clone(),
        username: username.to_string(),
        exp: (chrono::Utc::now() + access_token_ttl()).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn create_refresh_token(secret: &str, user_id: &ObjectId) -> anyhow::Result<String> {
    let claims = RefreshClaims {
        sub: user_id.clone(),
        exp: (chrono::Utc::now() + refresh_token_ttl()).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_access_token(secret: &str, token: &str) -> Option<AccessClaims> {
    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

pub fn decode_refresh_token(secret: &str, token: &str) -> Option<RefreshClaims> {
    decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}
