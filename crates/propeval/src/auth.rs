//! Identity boundary for the HTTP surface.
//!
//! Token verification is an external concern, so routers resolve callers
//! through the [`Authenticator`] trait and only ever see an [`AuthContext`].
//! Neither the reconciler nor the scoring engine receives identity data.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Caller identity resolved from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: u64,
    pub superuser: bool,
}

/// Trait describing the outbound identity provider boundary.
pub trait Authenticator: Send + Sync {
    fn verify(&self, token: &str) -> Result<AuthContext, AuthError>;
}

/// Error enumeration for identity failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid bearer token")]
    InvalidToken,
    #[error("superuser privilege required")]
    SuperuserRequired,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::SuperuserRequired => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Resolve the caller identity from the `Authorization: Bearer` header.
pub fn authenticate<A>(authenticator: &A, headers: &HeaderMap) -> Result<AuthContext, AuthError>
where
    A: Authenticator + ?Sized,
{
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)?;

    authenticator.verify(token)
}

pub fn require_superuser(context: &AuthContext) -> Result<(), AuthError> {
    if context.superuser {
        Ok(())
    } else {
        Err(AuthError::SuperuserRequired)
    }
}

/// Token-table authenticator backing local development and the test suites.
#[derive(Default, Clone)]
pub struct StaticTokenAuthenticator {
    tokens: Arc<Mutex<HashMap<String, AuthContext>>>,
}

impl StaticTokenAuthenticator {
    pub fn with_token(self, token: impl Into<String>, context: AuthContext) -> Self {
        {
            let mut guard = self.tokens.lock().expect("token table mutex poisoned");
            guard.insert(token.into(), context);
        }
        self
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        let guard = self.tokens.lock().expect("token table mutex poisoned");
        guard.get(token).copied().ok_or(AuthError::InvalidToken)
    }
}
