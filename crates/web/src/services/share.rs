//! Share-image resolution for the link-preview proxy.
//!
//! Scrapers request `/api/og-photo/{id}` with nothing but the id from a
//! share link, so resolution runs on the privileged client: look the row
//! up by id alone, mint a short-lived signed URL, fetch the bytes through
//! it. Anything that does not resolve to a real photo reads as not-found;
//! only a blank id is the caller's fault.

use axum::body::Bytes;
use thiserror::Error;

use photoload_core::{PhotoId, StoragePath};

use crate::error::AppError;
use crate::services::gallery::SIGNED_URL_TTL_SECS;
use crate::supabase::{AdminClient, SupabaseError};

/// The operations the share-image proxy needs.
///
/// [`AdminClient`] is the production implementation; the status ladder is
/// tested over an in-memory fake.
pub trait ShareStore {
    /// A photo's object path, looked up by id with no ownership filter.
    fn find_photo_path(
        &self,
        id: PhotoId,
    ) -> impl Future<Output = Result<Option<StoragePath>, SupabaseError>> + Send;

    /// Mint a signed URL for one object.
    fn create_signed_url(
        &self,
        path: &StoragePath,
        expires_in_secs: u64,
    ) -> impl Future<Output = Result<String, SupabaseError>> + Send;

    /// Fetch the bytes behind a signed URL.
    fn fetch_signed(
        &self,
        signed_url: &str,
    ) -> impl Future<Output = Result<(String, Bytes), SupabaseError>> + Send;
}

impl ShareStore for AdminClient {
    async fn find_photo_path(&self, id: PhotoId) -> Result<Option<StoragePath>, SupabaseError> {
        Self::find_photo_path(self, id).await
    }

    async fn create_signed_url(
        &self,
        path: &StoragePath,
        expires_in_secs: u64,
    ) -> Result<String, SupabaseError> {
        Self::create_signed_url(self, path, expires_in_secs).await
    }

    async fn fetch_signed(&self, signed_url: &str) -> Result<(String, Bytes), SupabaseError> {
        Self::fetch_signed(self, signed_url).await
    }
}

/// Why a share image could not be served.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The id path segment was blank.
    #[error("Missing photo id")]
    MissingId,

    /// No photo answers to this id. Malformed ids land here too: they
    /// cannot name a photo, and the response must not distinguish them.
    #[error("Photo not found")]
    NotFound,

    /// The row lookup itself failed.
    #[error(transparent)]
    Lookup(SupabaseError),

    /// The signing call failed.
    #[error("Could not sign photo URL: {0}")]
    Sign(SupabaseError),

    /// The byte fetch failed.
    #[error("Could not fetch photo: {0}")]
    Fetch(SupabaseError),
}

impl From<ShareError> for AppError {
    fn from(e: ShareError) -> Self {
        match e {
            ShareError::MissingId => Self::BadRequest(e.to_string()),
            ShareError::NotFound => Self::NotFound(e.to_string()),
            ShareError::Lookup(source) => Self::Supabase(source),
            ShareError::Sign(_) | ShareError::Fetch(_) => Self::Upstream(e.to_string()),
        }
    }
}

/// A resolved share image ready to stream back.
#[derive(Debug)]
pub struct ShareImage {
    pub content_type: String,
    pub bytes: Bytes,
}

/// Resolve a raw id path segment to the photo's bytes.
///
/// # Errors
///
/// Returns [`ShareError`] per the ladder above: blank id, unknown or
/// malformed id, lookup failure, signing failure, fetch failure.
pub async fn resolve_share_image(
    store: &impl ShareStore,
    raw_id: &str,
) -> Result<ShareImage, ShareError> {
    if raw_id.trim().is_empty() {
        return Err(ShareError::MissingId);
    }
    let Ok(id) = raw_id.parse::<PhotoId>() else {
        return Err(ShareError::NotFound);
    };

    let path = store
        .find_photo_path(id)
        .await
        .map_err(ShareError::Lookup)?
        .ok_or(ShareError::NotFound)?;

    let signed_url = store
        .create_signed_url(&path, SIGNED_URL_TTL_SECS)
        .await
        .map_err(ShareError::Sign)?;

    let (content_type, bytes) = store
        .fetch_signed(&signed_url)
        .await
        .map_err(ShareError::Fetch)?;

    Ok(ShareImage {
        content_type,
        bytes,
    })
}
