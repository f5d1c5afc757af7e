//! Login, logout and user management.

use anyhow::anyhow;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use resortops_common::auth::Role;
use resortops_common::ApiError;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{
    hash_password, new_session_token, removal_cookie, session_cookie, token_digest, verify_password, CurrentUser,
};
use crate::state::SharedState;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewUserRequest {
    pub username: String,
    pub full_name: Option<String>,
    pub password: String,
    pub role: Role,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("username and password are required".into()));
    }

    let Some((user, hash)) = state.users().find_for_login(&req.username).await? else {
        tracing::info!(username = %req.username.trim(), "Login failed: unknown user");
        return Err(ApiError::Unauthorized);
    };
    if !verify_password(&req.password, &hash) {
        tracing::info!(username = %user.username, "Login failed: wrong password");
        return Err(ApiError::Unauthorized);
    }

    let token = new_session_token();
    let ttl_hours = state.config.session.ttl_hours;
    let expires_at = Duration::try_hours(ttl_hours)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| anyhow!("session.ttl_hours {ttl_hours} is out of range"))?;
    let sessions = state.sessions();
    sessions.create(user.id, &token_digest(&token), expires_at).await?;
    sessions.purge_expired(Utc::now()).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
    let jar = jar.add(session_cookie(&state.config.session, token));
    Ok((jar, Json(user)))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<SharedState>, jar: CookieJar) -> Result<impl IntoResponse, ApiError> {
    let cfg = &state.config.session;
    if let Some(cookie) = jar.get(&cfg.cookie_name) {
        state.sessions().delete(&token_digest(cookie.value())).await?;
    }
    Ok((jar.remove(removal_cookie(cfg)), StatusCode::NO_CONTENT))
}

/// GET /api/auth/me
pub async fn me(user: CurrentUser) -> impl IntoResponse {
    Json(user.0)
}

/// GET /api/users
pub async fn list_users(State(state): State<SharedState>, user: CurrentUser) -> Result<impl IntoResponse, ApiError> {
    user.require_manager()?;
    Ok(Json(state.users().list().await?))
}

/// POST /api/users. Only admins can create other admins.
pub async fn create_user(
    State(state): State<SharedState>,
    user: CurrentUser,
    Json(req): Json<NewUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_manager()?;
    if req.role == Role::Admin && user.0.role != Role::Admin {
        return Err(ApiError::Forbidden("only admins can create admin users".into()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!("password must be at least {MIN_PASSWORD_LEN} characters")));
    }

    let hash = hash_password(&req.password)?;
    let created = state
        .users()
        .insert(&req.username, req.full_name.as_deref(), &hash, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/users/{id}. Deactivating signs the user out everywhere.
pub async fn update_user(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(update): Json<UserUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_manager()?;
    if id == user.0.id && !update.is_active {
        return Err(ApiError::BadRequest("you cannot deactivate your own account".into()));
    }

    let users = state.users();
    let target = users.get(id).await?;
    if target.role == Role::Admin && user.0.role != Role::Admin {
        return Err(ApiError::Forbidden("only admins can change admin users".into()));
    }

    users.set_active(id, update.is_active).await?;
    tracing::info!(user_id = %id, is_active = update.is_active, by = %user.0.username, "User updated");
    Ok(Json(users.get(id).await?))
}
