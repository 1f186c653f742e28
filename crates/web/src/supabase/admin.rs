//! Privileged platform client (service-role key).

use std::sync::Arc;

use photoload_core::{PhotoId, StoragePath, UserId};

use crate::config::SupabaseConfig;
use crate::supabase::SupabaseError;
use crate::supabase::client::ApiClient;

/// Client authenticated with the service-role key.
///
/// Every call bypasses row-level policies, so this client is handed out only
/// to the server-side orchestration paths: account deletion, the image
/// proxy, and the share-page existence check. Construction is infallible
/// because config loading already fails fast when the endpoint URL or the
/// service-role key is absent.
#[derive(Clone)]
pub struct AdminClient {
    api: Arc<ApiClient>,
}

impl AdminClient {
    /// Create a new privileged client bound to the configured endpoint.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            api: Arc::new(ApiClient::new(
                &config.url,
                &config.anon_key,
                config.service_role_key.clone(),
                &config.storage_bucket,
            )),
        }
    }

    /// List every object under the user's storage namespace.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the listing call fails.
    pub async fn list_user_objects(
        &self,
        user: UserId,
    ) -> Result<Vec<StoragePath>, SupabaseError> {
        let objects = self.api.list_objects(&user.to_string()).await?;
        Ok(objects
            .into_iter()
            .filter_map(|o| match StoragePath::parse(&format!("{user}/{}", o.name)) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(user = %user, object = %o.name, error = %e,
                        "skipping malformed object name in listing");
                    None
                }
            })
            .collect())
    }

    /// Remove a batch of objects in one call.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the removal call fails.
    pub async fn remove_objects(&self, paths: &[StoragePath]) -> Result<(), SupabaseError> {
        self.api.remove_objects(paths).await
    }

    /// Delete every photo row owned by a user.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the delete call fails.
    pub async fn delete_photos_for_user(&self, user: UserId) -> Result<(), SupabaseError> {
        self.api.delete_photos_for_user(user).await
    }

    /// Delete a user's identity record from the auth service.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the auth service rejects the deletion.
    pub async fn delete_user(&self, user: UserId) -> Result<(), SupabaseError> {
        let url = format!("{}/auth/v1/admin/users/{user}", self.api.base_url());
        let response = self.api.request(reqwest::Method::DELETE, url).send().await?;
        ApiClient::check(response).await?;
        Ok(())
    }

    /// Look up a photo's object path by id alone (no ownership filter).
    ///
    /// Deliberate trade-off for public link previews: any party who learns
    /// a photo id can resolve it. See the image proxy route.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the lookup call fails.
    pub async fn find_photo_path(
        &self,
        id: PhotoId,
    ) -> Result<Option<StoragePath>, SupabaseError> {
        self.api.find_photo_path(id).await
    }

    /// Whether a photo row with this id exists (id projection only).
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the lookup call fails.
    pub async fn photo_exists(&self, id: PhotoId) -> Result<bool, SupabaseError> {
        self.api.photo_exists(id).await
    }

    /// Mint a time-limited signed URL for one object.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the signing call fails.
    pub async fn create_signed_url(
        &self,
        path: &StoragePath,
        expires_in_secs: u64,
    ) -> Result<String, SupabaseError> {
        self.api.create_signed_url(path, expires_in_secs).await
    }

    /// Fetch the bytes behind a signed URL with no local caching.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the fetch fails or the upstream status
    /// is non-success.
    pub async fn fetch_signed(
        &self,
        signed_url: &str,
    ) -> Result<(String, axum::body::Bytes), SupabaseError> {
        self.api.fetch_signed(signed_url).await
    }
}
