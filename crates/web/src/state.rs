//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PhotoLoadConfig;
use crate::supabase::{AdminClient, AuthClient, UserClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the long-lived platform clients. The per-user client
/// is built per request from session tokens via [`AppState::user_client`].
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PhotoLoadConfig,
    admin: AdminClient,
    auth: AuthClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: PhotoLoadConfig) -> Self {
        let admin = AdminClient::new(&config.supabase);
        let auth = AuthClient::new(&config.supabase);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                admin,
                auth,
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &PhotoLoadConfig {
        &self.inner.config
    }

    /// Get a reference to the privileged platform client.
    #[must_use]
    pub fn admin(&self) -> &AdminClient {
        &self.inner.admin
    }

    /// Get a reference to the auth client.
    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    /// Build a platform client scoped to one user's access token.
    #[must_use]
    pub fn user_client(&self, access_token: &str) -> UserClient {
        UserClient::new(&self.inner.config.supabase, access_token)
    }
}
