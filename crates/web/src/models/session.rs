//! Session-related types.
//!
//! Types stored in the session for authentication and view state.

use serde::{Deserialize, Serialize};

use photoload_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The platform's identity record id.
    pub id: UserId,
    /// User's email address, as reported by the identity provider.
    pub email: Option<Email>,
}

/// Platform tokens for the signed-in user.
///
/// The access token backs the per-request [`UserClient`]; the refresh token
/// is held for future use but no refresh path exists yet (sessions simply
/// expire with the access token).
///
/// [`UserClient`]: crate::supabase::UserClient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Session keys for authentication and view-state data.
pub mod session_keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the user's platform tokens.
    pub const AUTH_TOKENS: &str = "auth_tokens";

    /// Key for the per-session view state machine.
    pub const VIEW_STATE: &str = "view_state";

    /// Key for the PKCE pair awaiting the callback. The verifier doubles as
    /// CSRF protection; the platform's authorize endpoint round-trips no
    /// state parameter.
    pub const OAUTH_PKCE: &str = "oauth_pkce";

    /// Key for account-deletion saga progress (kept across a failed
    /// attempt so a retry resumes from the first incomplete step).
    pub const DELETION_PROGRESS: &str = "deletion_progress";
}
