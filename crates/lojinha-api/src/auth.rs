use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use lojinha_db::db_time;
use lojinha_db::queries::{auth as auth_store, users};
use lojinha_economy::{phone, profile};
use lojinha_types::api::{
    Claims, LoginRequest, LoginResponse, RequestCodeRequest, RequestCodeResponse,
};

use crate::convert;
use crate::error::ApiError;
use crate::extract::Json;
use crate::middleware::AuthUser;
use crate::{AppState, blocking};

const CODE_TTL_MINUTES: i64 = 5;
const SESSION_TTL_DAYS: i64 = 7;

pub async fn request_code(
    State(state): State<AppState>,
    Json(req): Json<RequestCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let number = phone::normalize_number(&req.whatsapp_number)?;
    let code = generate_code();
    let now = Utc::now();
    let expires_at = now + Duration::minutes(CODE_TTL_MINUTES);

    let db = state.clone();
    let stored_number = number.clone();
    let code_hash = hash_code(&code);
    blocking(move || {
        db.db.with_conn(|conn| {
            auth_store::insert_code(
                conn,
                &Uuid::new_v4().to_string(),
                &stored_number,
                &code_hash,
                &db_time(expires_at),
                &db_time(now),
            )
        })?;
        Ok(())
    })
    .await?;

    let sent = match state.bot.send_auth_code(&number, &code).await {
        Ok(()) => {
            info!("Auth code sent to {}", number);
            true
        }
        Err(e) => {
            warn!("Auth code delivery to {} failed: {:#}", number, e);
            if state.settings.log_auth_codes {
                info!("Undelivered auth code for {}: {}", number, code);
            }
            false
        }
    };

    Ok(Json(RequestCodeResponse { sent, expires_at }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let number = phone::normalize_number(&req.whatsapp_number)?;
    let code_hash = hash_code(req.code.trim());
    let now = Utc::now();
    let session_expires = now + Duration::days(SESSION_TTL_DAYS);
    let session_id = Uuid::new_v4();

    let db = state.clone();
    let user = blocking(move || {
        let stamp = db_time(now);
        db.db.transaction(|tx| {
            if !auth_store::consume_code(tx, &number, &code_hash, &stamp)? {
                return Err(ApiError::Unauthorized);
            }

            let user = match users::get_by_number(tx, &number)? {
                Some(user) => user,
                None => {
                    let id = Uuid::new_v4().to_string();
                    users::insert(tx, &id, &number, &profile::default_name(&number), &stamp)?;
                    info!("New user {} registered", id);
                    users::get_by_id(tx, &id)?
                        .ok_or_else(|| anyhow::anyhow!("user {id} missing after insert"))?
                }
            };

            if user.is_banned {
                return Err(ApiError::forbidden("this account is banned"));
            }

            if !user.is_admin && db.settings.admin_numbers.contains(&number) {
                users::set_admin(tx, &user.id, true, &stamp)?;
                info!("Promoted {} to admin", user.id);
            }

            auth_store::insert_session(
                tx,
                &session_id.to_string(),
                &user.id,
                &db_time(session_expires),
                &stamp,
            )?;

            Ok(users::get_by_id(tx, &user.id)?
                .ok_or_else(|| anyhow::anyhow!("user {} vanished during login", user.id))?)
        })
    })
    .await?;

    let user = convert::user_profile(user)?;
    let token = create_token(&state.jwt_secret, user.id, session_id, session_expires)?;

    Ok(Json(LoginResponse {
        token,
        expires_at: session_expires,
        user,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = auth.session_id.to_string();
    blocking(move || Ok(state.db.with_conn(|conn| auth_store::delete_session(conn, &session_id))?))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn generate_code() -> String {
    rand::rng().random_range(100_000..=999_999u32).to_string()
}

pub(crate) fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

pub(crate) fn create_token(
    secret: &str,
    user_id: Uuid,
    session_id: Uuid,
    expires_at: DateTime<Utc>,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        sid: session_id,
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
