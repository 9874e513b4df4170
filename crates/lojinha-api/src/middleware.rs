use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use lojinha_db::db_time;
use lojinha_db::queries::{auth, users};
use lojinha_types::api::Claims;

use crate::error::ApiError;
use crate::{AppState, blocking};

/// Header the bot process sends on every `/bot/*` call.
pub const BOT_TOKEN_HEADER: &str = "x-bot-token";

/// The authenticated caller, inserted as a request extension.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub is_admin: bool,
}

pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Validate the JWT and its session row, and reject banned users.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer(req.headers()).ok_or(ApiError::Unauthorized)?;
    let claims = decode_token(&state.jwt_secret, token).ok_or(ApiError::Unauthorized)?;

    let db = state.clone();
    let session_id = claims.sid.to_string();
    let user_id = claims.sub.to_string();
    let user = blocking(move || {
        let now = db_time(Utc::now());
        Ok(db.db.with_conn(|conn| {
            match auth::live_session(conn, &session_id, &now)? {
                Some(session) if session.user_id == user_id => users::get_by_id(conn, &user_id),
                _ => Ok(None),
            }
        })?)
    })
    .await?
    .ok_or(ApiError::Unauthorized)?;

    if user.is_banned {
        return Err(ApiError::forbidden("this account is banned"));
    }

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        session_id: claims.sid,
        is_admin: user.is_admin,
    });
    Ok(next.run(req).await)
}

/// Must run after `require_auth`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = req
        .extensions()
        .get::<AuthUser>()
        .map(|u| u.is_admin)
        .ok_or(ApiError::Unauthorized)?;
    if !is_admin {
        return Err(ApiError::forbidden("admin access required"));
    }
    Ok(next.run(req).await)
}

/// Shared-secret check for the bot process.
pub async fn require_bot_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = state
        .settings
        .bot_token
        .as_deref()
        .ok_or(ApiError::Unauthorized)?;
    let given = req
        .headers()
        .get(BOT_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    if given != expected {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{EncodingKey, Header, encode};

    #[test]
    fn bearer_requires_prefix() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert_eq!(bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer(&headers), Some("abc"));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            sid: Uuid::new_v4(),
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"right-secret"),
        )
        .unwrap();

        assert_eq!(decode_token("right-secret", &token).unwrap().sid, claims.sid);
        assert!(decode_token("wrong-secret", &token).is_none());
    }
}
