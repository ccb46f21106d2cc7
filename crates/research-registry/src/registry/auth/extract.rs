//! Bearer-token extractors for axum handlers.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::super::domain::Role;
use super::super::repository::RepositoryError;
use super::service::{AuthError, AuthService};

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::MissingToken | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotApproved | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::DuplicateEmail(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            Self::Hashing(_) | Self::Signing(_) | Self::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let payload = json!({
            "error": self.to_string(),
        });
        (self.status_code(), axum::Json(payload)).into_response()
    }
}

/// Any caller holding a valid token, guests included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub subject: String,
    pub email: String,
    pub role: Role,
}

/// Host or co-host; may change registry content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEditor(pub AuthUser);

/// Host only; may manage user accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostUser(pub AuthUser);

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = Arc::<AuthService>::from_ref(state);
        let claims = auth.verify_token(bearer_token(parts)?)?;

        Ok(AuthUser {
            subject: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ContentEditor
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.can_edit_content() {
            return Err(AuthError::Forbidden("host or co-host"));
        }
        Ok(Self(user))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for HostUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.can_manage_users() {
            return Err(AuthError::Forbidden("host"));
        }
        Ok(Self(user))
    }
}
