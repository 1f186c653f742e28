//! Gallery loading.
//!
//! Fetches the signed-in user's photo rows and mints a fresh signed
//! display URL for every one of them. URLs are never cached or reused
//! across requests; each page render signs again. A failed signing call
//! does not fail the page - the photo is kept in the list with no URL and
//! its tile renders without a thumbnail.

use photoload_core::{StoragePath, UserId};

use crate::models::{Photo, PhotoView};
use crate::supabase::types::PhotoRow;
use crate::supabase::{SupabaseError, UserClient};

/// Lifetime of every signed display URL, in seconds.
pub const SIGNED_URL_TTL_SECS: u64 = 3600;

/// The read operations a gallery page needs.
///
/// [`UserClient`] is the production implementation; tests cover the
/// per-photo signing behavior with an in-memory fake.
pub trait GalleryStore {
    /// The user's photo rows, newest first.
    fn list_photos(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<PhotoRow>, SupabaseError>> + Send;

    /// Mint a signed display URL for one object.
    fn create_signed_url(
        &self,
        path: &StoragePath,
        expires_in_secs: u64,
    ) -> impl Future<Output = Result<String, SupabaseError>> + Send;
}

impl GalleryStore for UserClient {
    async fn list_photos(&self, user: UserId) -> Result<Vec<PhotoRow>, SupabaseError> {
        Self::list_photos(self, user).await
    }

    async fn create_signed_url(
        &self,
        path: &StoragePath,
        expires_in_secs: u64,
    ) -> Result<String, SupabaseError> {
        Self::create_signed_url(self, path, expires_in_secs).await
    }
}

/// Load the user's photos with a fresh signed URL each.
///
/// Row order (newest first) is preserved. A photo whose signing call fails
/// is kept with `signed_url: None`.
///
/// # Errors
///
/// Returns [`SupabaseError`] only when the row listing itself fails.
pub async fn load_photo_views(
    store: &impl GalleryStore,
    user: UserId,
) -> Result<Vec<PhotoView>, SupabaseError> {
    let rows = store.list_photos(user).await?;
    let mut views = Vec::with_capacity(rows.len());

    for row in rows {
        let photo = Photo::from(row);
        let signed_url = match store.create_signed_url(&photo.path, SIGNED_URL_TTL_SECS).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(user = %user, path = %photo.path.as_str(), error = %e,
                    "signed URL minting failed");
                None
            }
        };
        views.push(PhotoView { photo, signed_url });
    }

    Ok(views)
}
