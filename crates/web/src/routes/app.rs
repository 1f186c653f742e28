//! The single-page application routes: view rendering, uploads, deletes.
//!
//! `GET /` renders whichever view the session's state machine is in;
//! navigation is a query parameter (`?view=…`) and a share-link landing is
//! another (`?photo=…`). The two POST routes mutate photos and land back
//! on a view.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use photoload_core::PhotoId;

use crate::error::{AppError, Result};
use crate::middleware::{CspNonce, OptionalAuth, RequireAuth, RequireTokens};
use crate::models::{
    AuthTokens, NavTarget, Photo, PhotoView, View, ViewState, session_keys,
};
use crate::services::{UploadFile, UploadOutcome, load_photo_views, upload_batch};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────
// Templates
// ─────────────────────────────────────────────────────────────────────────

/// Sign-up view.
#[derive(Template, WebTemplate)]
#[template(path = "signup.html")]
pub struct SignUpTemplate {
    pub signed_in: bool,
    pub error: Option<String>,
}

/// Sign-in view.
#[derive(Template, WebTemplate)]
#[template(path = "signin.html")]
pub struct SignInTemplate {
    pub signed_in: bool,
    pub error: Option<String>,
}

/// Gallery view: the user's photos, newest first.
#[derive(Template, WebTemplate)]
#[template(path = "gallery.html")]
pub struct GalleryTemplate {
    pub signed_in: bool,
    pub photos: Vec<PhotoView>,
}

/// Upload view, with per-file results after a batch.
#[derive(Template, WebTemplate)]
#[template(path = "upload.html")]
pub struct UploadTemplate {
    pub signed_in: bool,
    pub outcomes: Vec<UploadOutcome>,
}

/// Single-photo view with the public share link.
#[derive(Template, WebTemplate)]
#[template(path = "view_photo.html")]
pub struct ViewPhotoTemplate {
    pub signed_in: bool,
    pub photo: PhotoView,
    pub share_url: String,
}

/// Settings view (account info and the delete-account control).
#[derive(Template, WebTemplate)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub signed_in: bool,
    pub email: Option<String>,
    pub nonce: String,
}

// ─────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────

/// Query parameters on the root page.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Navigation target from the header.
    pub view: Option<String>,
    /// Photo id from a share link (or a gallery tile).
    pub photo: Option<String>,
    /// Error code from an auth redirect.
    pub error: Option<String>,
}

/// Human-readable banner for auth redirect error codes.
fn error_banner(code: &str) -> String {
    match code {
        "denied" => "Sign-in was cancelled.".to_string(),
        "token_exchange" | "invalid_state" | "missing_code" | "identity" => {
            "Sign-in failed, please try again.".to_string()
        }
        "session" => "Could not start a session, please try again.".to_string(),
        other => format!("Something went wrong ({other})."),
    }
}

/// Render the current view.
///
/// Applies any navigation or share-link parameters to the session's view
/// state, loads the photo list for signed-in users, persists the state,
/// and renders the matching template.
///
/// # Route
///
/// `GET /`
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    nonce: CspNonce,
    Query(query): Query<HomeQuery>,
) -> Result<Response> {
    let mut view_state: ViewState = session
        .get(session_keys::VIEW_STATE)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    let signed_in = user.is_some();

    if let Some(target) = query.view.as_deref().and_then(NavTarget::parse) {
        view_state.navigate(target, signed_in);
    }

    let requested: Option<PhotoId> = query.photo.as_deref().and_then(|s| s.parse().ok());

    // Signed-in users always get the photo list; every view state
    // transition below depends on it
    let mut photo_views: Vec<PhotoView> = Vec::new();
    if let Some(user) = &user {
        let tokens: Option<AuthTokens> =
            session.get(session_keys::AUTH_TOKENS).await.ok().flatten();
        if let Some(tokens) = tokens {
            let client = state.user_client(&tokens.access_token);
            match load_photo_views(&client, user.id).await {
                Ok(views) => photo_views = views,
                Err(e) => {
                    // Render an empty gallery rather than failing the page
                    tracing::warn!(user = %user.id, error = %e, "photo listing failed");
                }
            }
        }

        let photos: Vec<Photo> = photo_views.iter().map(|v| v.photo.clone()).collect();
        view_state.photos_loaded(requested, &photos);
    }

    let _ = session.insert(session_keys::VIEW_STATE, &view_state).await;

    let error = query.error.as_deref().map(error_banner);

    let page = match view_state.view() {
        View::SignUp => SignUpTemplate { signed_in, error }.into_response(),
        View::SignIn => SignInTemplate { signed_in, error }.into_response(),
        View::Gallery => GalleryTemplate {
            signed_in,
            photos: photo_views,
        }
        .into_response(),
        View::Upload => UploadTemplate {
            signed_in,
            outcomes: Vec::new(),
        }
        .into_response(),
        View::ViewPhoto => {
            let selected = view_state
                .selected_photo()
                .and_then(|id| photo_views.iter().find(|v| v.photo.id == id).cloned());
            match selected {
                Some(photo) => ViewPhotoTemplate {
                    signed_in,
                    share_url: format!("{}/fit/{}", state.config().base_url, photo.photo.id),
                    photo,
                }
                .into_response(),
                // Stale selection; the state machine already fell back
                None => GalleryTemplate {
                    signed_in,
                    photos: photo_views,
                }
                .into_response(),
            }
        }
        View::Settings => SettingsTemplate {
            signed_in,
            email: user
                .as_ref()
                .and_then(|u| u.email.as_ref())
                .map(|e| e.as_str().to_string()),
            nonce: nonce.0,
        }
        .into_response(),
    };

    Ok(page)
}

/// Upload a batch of photos.
///
/// Files are taken from the `photos` multipart field and processed
/// strictly in order; the response is the upload view with one result per
/// file, so a mid-batch failure shows exactly which files made it.
///
/// # Route
///
/// `POST /photos`
pub async fn upload_photos(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    RequireTokens(tokens): RequireTokens,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("photos") {
            continue;
        }
        let filename = field.file_name().unwrap_or("photo").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?;
        if bytes.is_empty() {
            continue;
        }
        files.push(UploadFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No files selected".to_string()));
    }

    let client = state.user_client(&tokens.access_token);
    let outcomes = upload_batch(&client, user.id, files).await;

    let mut view_state: ViewState = session
        .get(session_keys::VIEW_STATE)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();

    // A clean batch moves on to the gallery; any failure stays on the
    // upload view with the per-file results
    if outcomes.iter().all(UploadOutcome::succeeded) {
        view_state.navigate(NavTarget::Gallery, true);
        let _ = session.insert(session_keys::VIEW_STATE, &view_state).await;
        return Ok(Redirect::to("/").into_response());
    }

    view_state.navigate(NavTarget::Upload, true);
    let _ = session.insert(session_keys::VIEW_STATE, &view_state).await;

    Ok(UploadTemplate {
        signed_in: true,
        outcomes,
    }
    .into_response())
}

/// Delete one of the user's photos.
///
/// The object is removed before the row, mirroring the upload order, so a
/// failure in between can only leave a row whose object is gone - never an
/// unlisted object.
///
/// # Route
///
/// `POST /photos/{id}/delete`
pub async fn delete_photo(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    RequireTokens(tokens): RequireTokens,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id: PhotoId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid photo id".to_string()))?;

    let client = state.user_client(&tokens.access_token);

    // Resolve the path from the user's own rows; row policies make any
    // other id invisible here
    let rows = client.list_photos(user.id).await?;
    let Some(row) = rows.into_iter().find(|r| r.id == id) else {
        return Err(AppError::NotFound("Photo not found".to_string()));
    };

    client.remove_object(&row.path).await?;
    client.delete_photo(id, user.id).await?;
    tracing::info!(user = %user.id, photo = %id, "photo deleted");

    // Back to the gallery, dropping any selection of the deleted photo
    let mut view_state: ViewState = session
        .get(session_keys::VIEW_STATE)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    view_state.navigate(NavTarget::Gallery, true);
    let _ = session.insert(session_keys::VIEW_STATE, &view_state).await;

    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_banner_known_codes() {
        assert_eq!(error_banner("denied"), "Sign-in was cancelled.");
        assert!(error_banner("token_exchange").contains("try again"));
        assert!(error_banner("weird").contains("weird"));
    }
}
