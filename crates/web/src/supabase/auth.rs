//! GoTrue auth client (OAuth sign-in brokered by the platform).
//!
//! The platform fronts the actual identity provider (Google): we never talk
//! to the provider directly. Flow:
//!
//! 1. Generate a PKCE pair with [`PkcePair::generate`]
//! 2. Redirect the browser to [`AuthClient::authorize_url`]
//! 3. The platform redirects back with an authorization code
//! 4. Exchange it with [`AuthClient::exchange_code`]
//! 5. Resolve the identity with [`AuthClient::get_user`]

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::SupabaseConfig;
use crate::supabase::types::{AuthUser, TokenResponse};
use crate::supabase::{SupabaseError, error_message};

/// Length of the PKCE code verifier (43-128 chars per RFC 7636).
const VERIFIER_LENGTH: usize = 64;

/// A PKCE verifier/challenge pair.
///
/// The verifier is held in the session until the callback; only the S256
/// challenge leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PkcePair {
    /// Random verifier, sent during code exchange.
    pub verifier: String,
    /// Base64url-encoded SHA-256 of the verifier, sent during authorize.
    pub challenge: String,
}

impl PkcePair {
    /// Generate a fresh verifier and its S256 challenge.
    #[must_use]
    pub fn generate() -> Self {
        let verifier = generate_random_string(VERIFIER_LENGTH);
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }
}

/// Generate a cryptographically secure random string.
pub fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

/// Client for the platform's auth service.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

/// Request body for the PKCE code exchange.
#[derive(Serialize)]
struct ExchangeRequest<'a> {
    auth_code: &'a str,
    code_verifier: &'a str,
}

impl AuthClient {
    /// Create a new auth client using the public API key.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                http: reqwest::Client::new(),
                base_url: config.url.trim_end_matches('/').to_string(),
                anon_key: config.anon_key.clone(),
            }),
        }
    }

    /// Build the authorization URL the browser is redirected to.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - Callback URL on this application
    /// * `pkce` - The PKCE pair whose challenge is embedded
    #[must_use]
    pub fn authorize_url(&self, redirect_uri: &str, pkce: &PkcePair) -> String {
        format!(
            "{}/auth/v1/authorize?provider=google&redirect_to={}&code_challenge={}&code_challenge_method=s256",
            self.inner.base_url,
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&pkce.challenge),
        )
    }

    /// Exchange an authorization code for access and refresh tokens.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::OAuth`] if the exchange is rejected (expired
    /// or replayed code, verifier mismatch).
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
    ) -> Result<TokenResponse, SupabaseError> {
        let url = format!("{}/auth/v1/token?grant_type=pkce", self.inner.base_url);
        let response = self
            .inner
            .http
            .post(url)
            .header("apikey", &self.inner.anon_key)
            .json(&ExchangeRequest {
                auth_code: code,
                code_verifier: verifier,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let err = error_message(status.as_u16(), &body);
            return Err(SupabaseError::OAuth(err.to_string()));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Resolve the identity behind an access token.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the token is invalid or expired.
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let url = format!("{}/auth/v1/user", self.inner.base_url);
        let response = self
            .inner
            .http
            .get(url)
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(error_message(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Revoke the platform session behind an access token. Best effort: the
    /// local session is cleared regardless.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the revocation call fails.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = format!("{}/auth/v1/logout", self.inner.base_url);
        let response = self
            .inner
            .http
            .post(url)
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_message(status.as_u16(), &body));
        }
        Ok(())
    }
}
