//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Current view (session state machine)
//! GET  /health                 - Health check
//!
//! # Photos
//! POST /photos                 - Upload a batch of photos (multipart)
//! POST /photos/{id}/delete     - Delete one photo (object, then row)
//!
//! # Sharing
//! GET  /fit/{id}               - Public share page (scraper metadata)
//! GET  /api/og-photo/{id}      - Image proxy behind the share metadata
//!
//! # Auth (platform-brokered OAuth, PKCE)
//! GET  /auth/login             - Redirect to the authorization page
//! GET  /auth/callback          - Exchange the code, start the session
//! POST /auth/logout            - Revoke and clear the session
//!
//! # Account
//! POST /api/delete-account     - Delete everything, resumable on retry
//! ```

pub mod api;
pub mod app;
pub mod auth;
pub mod fit;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Upload request body cap (a batch of phone photos fits comfortably).
const UPLOAD_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/delete-account", post(api::delete_user_account))
        .route("/og-photo/{id}", get(api::og_photo))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        // The single page
        .route("/", get(app::home))
        // Photo mutations
        .route(
            "/photos",
            post(app::upload_photos).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/photos/{id}/delete", post(app::delete_photo))
        // Public share page
        .route("/fit/{id}", get(fit::fit_page))
        // Auth routes
        .nest("/auth", auth_routes())
        // JSON API
        .nest("/api", api_routes())
}
