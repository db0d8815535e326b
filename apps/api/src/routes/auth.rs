//! Admin registration and login handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub role: String,
}

/// `POST /api/auth/register`
///
/// Creates an admin account and returns a token for it.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err(ApiError::validation("username is required"));
    }
    if body.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let user = velora_db::User {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        password_hash: hash_password(&body.password)?,
        role: "admin".to_string(),
        created_at: Utc::now(),
    };

    state.db.users().insert(&user).await?;
    info!(username = %user.username, "Admin account registered");

    let token = state.jwt.generate_token(&user.id, &user.username, &user.role)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserDto {
                id: user.id,
                username: user.username,
                role: user.role,
            },
        }),
    ))
}

/// `POST /api/auth/login`
///
/// Exchanges credentials for a bearer token. Unknown usernames and wrong
/// passwords get the same response.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .db
        .users()
        .get_by_username(body.username.trim())
        .await?;

    let user = match user {
        Some(user) if verify_password(&body.password, &user.password_hash) => user,
        _ => return Err(ApiError::unauthorized("Invalid credentials")),
    };

    let token = state.jwt.generate_token(&user.id, &user.username, &user.role)?;
    info!(username = %user.username, "Admin logged in");

    Ok(Json(AuthResponse {
        token,
        user: UserDto {
            id: user.id,
            username: user.username,
            role: user.role,
        },
    }))
}
