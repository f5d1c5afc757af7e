//! Password hashing, session tokens and the session guard for `/api`.
//!
//! The cookie carries a random 32-byte token; only its SHA-256 digest is
//! stored, so a leaked sessions table cannot be replayed.

use anyhow::anyhow;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use resortops_common::auth::User;
use resortops_common::ApiError;
use resortops_config::SessionConfig;
use sha2::{Digest, Sha256};

use crate::state::SharedState;

/// Hash a plain password with argon2id.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(anyhow!("password hashing failed: {e}")))
}

/// Verify a password against an argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

pub fn new_session_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn session_cookie(cfg: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(cfg.secure_cookie)
        .same_site(SameSite::Lax)
        .build()
}

pub fn removal_cookie(cfg: &SessionConfig) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), "")).path("/").build()
}

/// Resolve the session cookie, if any, to its user.
pub async fn session_user(state: &SharedState, jar: &CookieJar) -> Result<Option<User>, ApiError> {
    let Some(token) = jar
        .get(&state.config.session.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
    else {
        return Ok(None);
    };
    Ok(state.sessions().find_user(&token_digest(&token), Utc::now()).await?)
}

/// Rejects requests without a live session and makes the user available to
/// handlers through [`CurrentUser`].
pub async fn require_session(
    State(state): State<SharedState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = session_user(&state, &jar).await?.ok_or(ApiError::Unauthorized)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// The user owning the request's session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}

impl CurrentUser {
    /// Salary, staff, leave decisions and user management need a manager.
    pub fn require_manager(&self) -> Result<(), ApiError> {
        if self.0.role.can_manage() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!("{} role cannot perform this action", self.0.role)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resortops_common::auth::Role;
    use uuid::Uuid;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("sunset-deck-42").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("sunset-deck-42", &hash));
        assert!(!verify_password("sunset-deck-43", &hash));
        assert!(!verify_password("sunset-deck-42", "not-a-hash"));
    }

    #[test]
    fn test_session_tokens_are_random_and_digested() {
        let a = new_session_token();
        let b = new_session_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(token_digest(&a).len(), 64);
        assert_eq!(token_digest(&a), token_digest(&a));
        assert_ne!(token_digest(&a), a);
    }

    #[test]
    fn test_manager_check() {
        let user = |role| {
            CurrentUser(User {
                id: Uuid::new_v4(),
                username: "front.desk".into(),
                full_name: None,
                role,
                is_active: true,
                created_at: Utc::now(),
            })
        };
        assert!(user(Role::Manager).require_manager().is_ok());
        assert!(matches!(user(Role::Staff).require_manager(), Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_session_cookie_flags() {
        let cfg = SessionConfig::default();
        let cookie = session_cookie(&cfg, "abc".into());
        assert_eq!(cookie.name(), "resortops_session");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
