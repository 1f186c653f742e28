//! User-scoped platform client (access-token bearer).

use std::sync::Arc;

use secrecy::SecretString;

use photoload_core::{PhotoId, StoragePath, UserId};

use crate::config::SupabaseConfig;
use crate::supabase::SupabaseError;
use crate::supabase::client::ApiClient;
use crate::supabase::types::{NewPhotoRow, PhotoRow};

/// Client authenticated with a signed-in user's access token.
///
/// Row-level policies apply on every call, so the client can only see and
/// mutate the user's own rows and objects. Built per request from the
/// session's tokens.
#[derive(Clone)]
pub struct UserClient {
    api: Arc<ApiClient>,
}

impl UserClient {
    /// Create a client carrying the user's access token.
    #[must_use]
    pub fn new(config: &SupabaseConfig, access_token: &str) -> Self {
        Self {
            api: Arc::new(ApiClient::new(
                &config.url,
                &config.anon_key,
                SecretString::from(access_token.to_string()),
                &config.storage_bucket,
            )),
        }
    }

    /// All of the user's photo rows, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the listing call fails.
    pub async fn list_photos(&self, user: UserId) -> Result<Vec<PhotoRow>, SupabaseError> {
        self.api.list_photos(user).await
    }

    /// Upload one object. Overwrite is disallowed.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the upload is rejected (policy, missing
    /// bucket, existing path).
    pub async fn upload_object(
        &self,
        path: &StoragePath,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), SupabaseError> {
        self.api.upload_object(path, content_type, bytes).await
    }

    /// Insert one photo row. Called only after the object upload succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the insert is rejected.
    pub async fn insert_photo(&self, row: &NewPhotoRow) -> Result<(), SupabaseError> {
        self.api.insert_photo(row).await
    }

    /// Mint a signed display URL for one of the user's objects.
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

    /// Remove one object.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the removal call fails.
    pub async fn remove_object(&self, path: &StoragePath) -> Result<(), SupabaseError> {
        self.api.remove_objects(std::slice::from_ref(path)).await
    }

    /// Delete one photo row, scoped to id + owner.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError`] if the delete call fails.
    pub async fn delete_photo(&self, id: PhotoId, owner: UserId) -> Result<(), SupabaseError> {
        self.api.delete_photo(id, owner).await
    }
}
