//! Authentication extractors over the session.
//!
//! The signed-in user and their platform tokens are stored in the session
//! at sign-in; these extractors read them back in route handlers.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{AuthTokens, CurrentUser, session_keys};

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection when authentication is required but absent.
pub enum AuthRejection {
    /// Redirect to the root page (which renders the sign-up view).
    RedirectHome,
    /// 401 with a JSON error body (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::Unauthorized => {
                AppError::Unauthorized("Not signed in".to_string()).into_response()
            }
        }
    }
}

/// API requests get a 401 JSON error; page requests are sent back to the root.
fn rejection_for(parts: &Parts) -> AuthRejection {
    if parts.uri.path().starts_with("/api/") {
        AuthRejection::Unauthorized
    } else {
        AuthRejection::RedirectHome
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Session is set in extensions by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| rejection_for(parts))?;

        Ok(Self(user))
    }
}

/// Extractor that optionally reads the signed-in user.
///
/// Unlike [`RequireAuth`] this never rejects; the root page uses it to pick
/// between the signed-out and signed-in views.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Extractor that requires the user's platform tokens.
///
/// Handlers that call the platform on the user's behalf need the access
/// token from sign-in; the rejection rules match [`RequireAuth`].
pub struct RequireTokens(pub AuthTokens);

impl<S> FromRequestParts<S> for RequireTokens
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let tokens: AuthTokens = session
            .get(session_keys::AUTH_TOKENS)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| rejection_for(parts))?;

        Ok(Self(tokens))
    }
}

/// Store the signed-in user and their tokens in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_signed_in(
    session: &Session,
    user: &CurrentUser,
    tokens: &AuthTokens,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await?;
    session.insert(session_keys::AUTH_TOKENS, tokens).await
}

/// Remove the signed-in user and tokens from the session (sign-out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_signed_in(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session
        .remove::<AuthTokens>(session_keys::AUTH_TOKENS)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header::LOCATION};

    #[tokio::test]
    async fn test_unauthorized_rejection_carries_json_error() {
        let response = AuthRejection::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Not signed in");
    }

    #[test]
    fn test_redirect_rejection_goes_home() {
        let response = AuthRejection::RedirectHome.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
    }
}
