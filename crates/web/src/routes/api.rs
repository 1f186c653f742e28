//! JSON API route handlers: account deletion and the share-image proxy.

use axum::{
    Json,
    extract::{Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user};
use crate::middleware::{RequireAuth, clear_signed_in};
use crate::models::{ViewState, session_keys};
use crate::services::{DeletionProgress, delete_account, resolve_share_image};
use crate::state::AppState;

/// Caching policy for proxied share images: the signed URL behind them
/// lives exactly as long.
const OG_PHOTO_CACHE_CONTROL: &str = "public, max-age=3600";

/// Delete the signed-in user's account.
///
/// Runs the deletion sequence (storage objects, photo rows, identity
/// record) from the first incomplete step. On failure the progress reached
/// is kept in the session, so pressing the button again resumes rather
/// than restarts. On success the session is cleared.
///
/// # Route
///
/// `POST /api/delete-account`
pub async fn delete_user_account(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let progress: DeletionProgress = session
        .get(session_keys::DELETION_PROGRESS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();

    if let Err(e) = delete_account(state.admin(), user.id, progress).await {
        // Keep the partial progress for the retry
        let _ = session
            .insert(session_keys::DELETION_PROGRESS, &e.progress)
            .await;
        return Err(AppError::Supabase(e.source));
    }

    let _ = session
        .remove::<DeletionProgress>(session_keys::DELETION_PROGRESS)
        .await;
    let _ = clear_signed_in(&session).await;
    let _ = session
        .remove::<ViewState>(session_keys::VIEW_STATE)
        .await;
    clear_sentry_user();

    tracing::info!(user = %user.id, "account deleted");
    Ok(Json(json!({ "ok": true })).into_response())
}

/// Serve a photo's bytes for link-preview scrapers.
///
/// Social scrapers cannot follow an authenticated gallery, so this proxy
/// resolves the photo by id alone, mints a short-lived signed URL
/// server-side, and streams the bytes through. Nothing is cached locally;
/// the response carries a public caching header matching the signed URL
/// lifetime.
///
/// # Route
///
/// `GET /api/og-photo/{id}`
pub async fn og_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let image = resolve_share_image(state.admin(), &id).await?;

    Ok((
        [
            (CONTENT_TYPE, image.content_type),
            (CACHE_CONTROL, OG_PHOTO_CACHE_CONTROL.to_string()),
        ],
        image.bytes,
    )
        .into_response())
}
