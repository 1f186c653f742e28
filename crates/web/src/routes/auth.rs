//! OAuth sign-in route handlers.
//!
//! Sign-in is brokered entirely by the managed platform's auth service:
//! - Login: generates a PKCE pair and redirects to the platform's
//!   authorization page (which fronts Google)
//! - Callback: exchanges the authorization code for tokens and stores the
//!   identity in the session
//! - Logout: revokes the platform session (best effort) and clears ours

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use photoload_core::Email;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_signed_in, set_signed_in};
use crate::models::{AuthTokens, CurrentUser, ViewState, session_keys};
use crate::state::AppState;
use crate::supabase::PkcePair;

/// Query parameters from the platform's OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Initiate OAuth sign-in.
///
/// Generates a PKCE pair, stores it in the session, and redirects to the
/// platform's authorization page. Only the S256 challenge leaves the
/// server; the verifier waits in the session for the callback.
///
/// # Route
///
/// `GET /auth/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let pkce = PkcePair::generate();

    if let Err(e) = session.insert(session_keys::OAUTH_PKCE, &pkce).await {
        tracing::error!("Failed to store PKCE pair in session: {}", e);
        return Redirect::to("/?error=session").into_response();
    }

    let redirect_uri = format!("{}/auth/callback", state.config().base_url);
    let auth_url = state.auth().authorize_url(&redirect_uri, &pkce);

    Redirect::to(&auth_url).into_response()
}

/// Handle the OAuth callback.
///
/// Exchanges the authorization code for tokens using the session's PKCE
/// verifier, resolves the identity, and stores both in the session. The
/// view state moves to the gallery.
///
/// # Route
///
/// `GET /auth/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    // Check for errors reported by the platform
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("OAuth error: {} - {}", error, description);
        return Redirect::to("/?error=denied").into_response();
    }

    let Some(code) = query.code else {
        tracing::warn!("OAuth callback missing code");
        return Redirect::to("/?error=missing_code").into_response();
    };

    // The PKCE verifier stored at login is one-time use
    let pkce: Option<PkcePair> = session.get(session_keys::OAUTH_PKCE).await.ok().flatten();
    let _ = session.remove::<PkcePair>(session_keys::OAUTH_PKCE).await;
    let Some(pkce) = pkce else {
        tracing::warn!("OAuth callback without a pending PKCE pair");
        return Redirect::to("/?error=invalid_state").into_response();
    };

    let tokens = match state.auth().exchange_code(&code, &pkce.verifier).await {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!("Failed to exchange OAuth code: {}", e);
            return Redirect::to("/?error=token_exchange").into_response();
        }
    };

    // The token response usually embeds the identity; fall back to a lookup
    let auth_user = match tokens.user {
        Some(user) => user,
        None => match state.auth().get_user(&tokens.access_token).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("Failed to resolve identity after exchange: {}", e);
                return Redirect::to("/?error=identity").into_response();
            }
        },
    };

    let user = CurrentUser {
        id: auth_user.id,
        email: auth_user
            .email
            .as_deref()
            .and_then(|e| Email::parse(e).ok()),
    };
    let auth_tokens = AuthTokens {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };

    if let Err(e) = set_signed_in(&session, &user, &auth_tokens).await {
        tracing::error!("Failed to store signed-in user: {}", e);
        return Redirect::to("/?error=session").into_response();
    }

    // Signing in moves any view state to the gallery
    let mut view_state = ViewState::default();
    view_state.auth_changed(true);
    let _ = session.insert(session_keys::VIEW_STATE, &view_state).await;

    set_sentry_user(&user.id, user.email.as_ref().map(Email::as_str));
    tracing::info!(user = %user.id, "user signed in");

    Redirect::to("/").into_response()
}

/// Sign out.
///
/// Revokes the platform session (best effort - a failure there never
/// blocks the local sign-out), clears the session, and returns to the
/// sign-up view.
///
/// # Route
///
/// `POST /auth/logout`
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    let tokens: Option<AuthTokens> = session.get(session_keys::AUTH_TOKENS).await.ok().flatten();

    if let Some(tokens) = tokens
        && let Err(e) = state.auth().sign_out(&tokens.access_token).await
    {
        tracing::warn!("Platform sign-out failed: {}", e);
    }

    let _ = clear_signed_in(&session).await;

    let mut view_state = ViewState::default();
    view_state.auth_changed(false);
    let _ = session.insert(session_keys::VIEW_STATE, &view_state).await;

    clear_sentry_user();
    Redirect::to("/").into_response()
}
