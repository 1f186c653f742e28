//! Clients for the managed backend platform (Supabase-compatible).
//!
//! # Architecture
//!
//! - Plain `reqwest` + `serde` against the platform's REST surfaces:
//!   GoTrue (`/auth/v1`), Storage (`/storage/v1`), PostgREST (`/rest/v1`)
//! - The platform is the source of truth - NO local sync, direct API calls
//! - No response caching: signed display URLs are minted fresh per render
//!
//! # Clients
//!
//! ## [`AdminClient`]
//! Privileged client authenticated with the service-role key. Bypasses
//! row-level policies; used only for the account-deletion orchestrator,
//! the image proxy, and the share-page existence check. Never reaches
//! a template or the browser.
//!
//! ## [`UserClient`]
//! Per-request client authenticated with the signed-in user's access token.
//! Row-level policies apply, so it can only see and mutate the user's own
//! rows and objects.
//!
//! ## [`AuthClient`]
//! Anon-key client for the OAuth (PKCE) sign-in flow and session lookups.
//!
//! # Example
//!
//! ```rust,ignore
//! use photoload_web::supabase::AdminClient;
//!
//! let admin = AdminClient::new(&config.supabase);
//!
//! // Look up a photo's object path regardless of owner
//! let path = admin.find_photo_path(photo_id).await?;
//!
//! // Mint a 1-hour signed URL for the object
//! if let Some(path) = path {
//!     let url = admin.create_signed_url(&path, 3600).await?;
//! }
//! ```

mod admin;
mod auth;
mod client;
pub mod types;
mod user;

pub use admin::AdminClient;
pub use auth::{AuthClient, PkcePair};
pub use types::*;
pub use user::UserClient;

use thiserror::Error;

/// Errors that can occur when interacting with the managed platform.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform returned a non-success status.
    #[error("platform error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the platform.
        status: u16,
        /// Message extracted from the error body (or the raw body).
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// OAuth flow failed (code exchange, user lookup).
    #[error("OAuth error: {0}")]
    OAuth(String),
}

impl SupabaseError {
    /// Whether this error is the platform's way of saying "no such thing".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Error body shapes the platform's services return.
///
/// GoTrue uses `{"msg": …}` or `{"error": …, "error_description": …}`,
/// Storage and PostgREST use `{"message": …}`. Fall through them in order.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Extract a human-readable message from an error response body.
fn error_message(status: u16, body: &str) -> SupabaseError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| body.chars().take(200).collect());

    SupabaseError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_storage_shape() {
        let err = error_message(404, r#"{"statusCode":"404","error":"not_found","message":"Object not found"}"#);
        assert_eq!(err.to_string(), "platform error (404): Object not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_message_gotrue_shape() {
        let err = error_message(401, r#"{"msg":"Invalid token"}"#);
        assert_eq!(err.to_string(), "platform error (401): Invalid token");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_message_oauth_shape() {
        let err = error_message(400, r#"{"error":"invalid_grant","error_description":"Code expired"}"#);
        assert_eq!(err.to_string(), "platform error (400): Code expired");
    }

    #[test]
    fn test_error_message_non_json_body() {
        let err = error_message(502, "upstream exploded");
        assert_eq!(err.to_string(), "platform error (502): upstream exploded");
    }
}
