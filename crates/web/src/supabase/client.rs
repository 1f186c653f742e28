//! Shared low-level HTTP plumbing for the platform clients.
//!
//! [`AdminClient`](super::AdminClient) and [`UserClient`](super::UserClient)
//! differ only in the bearer credential they carry; everything else (URL
//! assembly, header set, error mapping) lives here.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use photoload_core::{PhotoId, StoragePath, UserId};

use crate::supabase::types::{
    NewPhotoRow, PhotoIdRow, PhotoPathRow, PhotoRow, SignedUrlResponse, StorageObject,
};
use crate::supabase::{SupabaseError, error_message};

/// Page size for storage listings. [`ApiClient::list_objects`] keeps
/// requesting pages until the platform returns a short one, so namespaces
/// past this size are still swept completely.
const LIST_PAGE_SIZE: u32 = 1000;

/// Low-level client bound to one bearer credential.
pub(crate) struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    bearer: SecretString,
    bucket: String,
}

impl ApiClient {
    pub(crate) fn new(
        base_url: &str,
        api_key: &str,
        bearer: SecretString,
        bucket: &str,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bearer,
            bucket: bucket.to_string(),
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer.expose_secret())
    }

    /// Map a non-success response to [`SupabaseError::Api`].
    pub(crate) async fn check(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_message(status.as_u16(), &body))
    }

    async fn json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SupabaseError> {
        let response = Self::check(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Storage (/storage/v1)
    // ─────────────────────────────────────────────────────────────────────

    /// List every object under a prefix (one level, non-recursive),
    /// paging until the listing is exhausted.
    pub(crate) async fn list_objects(
        &self,
        prefix: &str,
    ) -> Result<Vec<StorageObject>, SupabaseError> {
        collect_pages(move |offset| self.list_objects_page(prefix, offset)).await
    }

    async fn list_objects_page(
        &self,
        prefix: &str,
        offset: u32,
    ) -> Result<Vec<StorageObject>, SupabaseError> {
        let url = format!("{}/storage/v1/object/list/{}", self.base_url, self.bucket);
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&serde_json::json!({
                "prefix": prefix,
                "limit": LIST_PAGE_SIZE,
                "offset": offset,
                "sortBy": { "column": "name", "order": "asc" },
            }))
            .send()
            .await?;

        Self::json(response).await
    }

    /// Remove a batch of objects in one call.
    pub(crate) async fn remove_objects(
        &self,
        paths: &[StoragePath],
    ) -> Result<(), SupabaseError> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let prefixes: Vec<&str> = paths.iter().map(StoragePath::as_str).collect();
        let response = self
            .request(reqwest::Method::DELETE, url)
            .json(&serde_json::json!({ "prefixes": prefixes }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Upload object bytes. Overwrite is disallowed: the platform rejects
    /// an upload to an existing path.
    pub(crate) async fn upload_object(
        &self,
        path: &StoragePath,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), SupabaseError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, path
        );
        let response = self
            .request(reqwest::Method::POST, url)
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .header("cache-control", "3600")
            .body(bytes)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Mint a time-limited signed URL for one object.
    ///
    /// Returns an absolute URL; the platform responds with one relative to
    /// its storage root.
    pub(crate) async fn create_signed_url(
        &self,
        path: &StoragePath,
        expires_in_secs: u64,
    ) -> Result<String, SupabaseError> {
        let url = format!(
            "{}/storage/v1/object/sign/{}/{}",
            self.base_url, self.bucket, path
        );
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&serde_json::json!({ "expiresIn": expires_in_secs }))
            .send()
            .await?;

        let signed: SignedUrlResponse = Self::json(response).await?;
        Ok(join_signed_url(&self.base_url, &signed.signed_url))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Photo rows (/rest/v1/photos)
    // ─────────────────────────────────────────────────────────────────────

    fn photos_url(&self, query: &str) -> String {
        format!("{}/rest/v1/photos?{query}", self.base_url)
    }

    /// All rows owned by a user, newest first.
    pub(crate) async fn list_photos(&self, user: UserId) -> Result<Vec<PhotoRow>, SupabaseError> {
        let url = self.photos_url(&format!(
            "select=*&user_id=eq.{user}&order=created_at.desc"
        ));
        let response = self.request(reqwest::Method::GET, url).send().await?;
        Self::json(response).await
    }

    /// The object path for one row, looked up by id alone.
    pub(crate) async fn find_photo_path(
        &self,
        id: PhotoId,
    ) -> Result<Option<StoragePath>, SupabaseError> {
        let url = self.photos_url(&format!("select=path&id=eq.{id}&limit=1"));
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let rows: Vec<PhotoPathRow> = Self::json(response).await?;
        Ok(rows.into_iter().next().map(|r| r.path))
    }

    /// Whether a row with this id exists (id projection only, no path read).
    pub(crate) async fn photo_exists(&self, id: PhotoId) -> Result<bool, SupabaseError> {
        let url = self.photos_url(&format!("select=id&id=eq.{id}&limit=1"));
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let rows: Vec<PhotoIdRow> = Self::json(response).await?;
        Ok(!rows.is_empty())
    }

    /// Insert one row.
    pub(crate) async fn insert_photo(&self, row: &NewPhotoRow) -> Result<(), SupabaseError> {
        let url = format!("{}/rest/v1/photos", self.base_url);
        let response = self
            .request(reqwest::Method::POST, url)
            .header("prefer", "return=minimal")
            .json(row)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Delete one row, scoped to id + owner.
    pub(crate) async fn delete_photo(
        &self,
        id: PhotoId,
        owner: UserId,
    ) -> Result<(), SupabaseError> {
        let url = self.photos_url(&format!("id=eq.{id}&user_id=eq.{owner}"));
        let response = self.request(reqwest::Method::DELETE, url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Delete every row owned by a user.
    pub(crate) async fn delete_photos_for_user(&self, user: UserId) -> Result<(), SupabaseError> {
        let url = self.photos_url(&format!("user_id=eq.{user}"));
        let response = self.request(reqwest::Method::DELETE, url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Raw fetch (image proxy)
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch the bytes behind a signed URL with no local caching.
    ///
    /// Returns the upstream content type (fallback `image/jpeg`) and body.
    pub(crate) async fn fetch_signed(
        &self,
        signed_url: &str,
    ) -> Result<(String, axum::body::Bytes), SupabaseError> {
        let response = self.http.get(signed_url).send().await?;
        let response = Self::check(response).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response.bytes().await?;
        Ok((content_type, bytes))
    }
}

/// Drain a paged listing: keep fetching until a short page arrives.
///
/// Folder placeholders (empty names) are dropped from the result but still
/// count toward the page size, so a full page of placeholders does not end
/// the listing early.
async fn collect_pages<F, Fut>(mut fetch: F) -> Result<Vec<StorageObject>, SupabaseError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<StorageObject>, SupabaseError>>,
{
    let mut objects = Vec::new();
    let mut offset = 0;
    loop {
        let page = fetch(offset).await?;
        let page_len = page.len();
        objects.extend(page.into_iter().filter(|o| !o.name.is_empty()));
        if page_len < LIST_PAGE_SIZE as usize {
            return Ok(objects);
        }
        offset += LIST_PAGE_SIZE;
    }
}

/// Join the storage root with the relative signed URL the platform returns.
fn join_signed_url(base_url: &str, signed: &str) -> String {
    let signed = signed.trim_start_matches('/');
    format!("{base_url}/storage/v1/{signed}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page_of(count: usize, prefix: &str) -> Vec<StorageObject> {
        (0..count)
            .map(|i| StorageObject {
                name: format!("{prefix}{i}.jpg"),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_collect_pages_drains_past_the_page_size() {
        let full = LIST_PAGE_SIZE as usize;
        let mut offsets = Vec::new();

        let objects = collect_pages(|offset| {
            offsets.push(offset);
            let page = match offset {
                0 => page_of(full, "a"),
                _ => page_of(2, "b"),
            };
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(objects.len(), full + 2);
        assert_eq!(offsets, vec![0, LIST_PAGE_SIZE]);
    }

    #[tokio::test]
    async fn test_collect_pages_short_first_page_ends_the_listing() {
        let mut calls = 0;

        let objects = collect_pages(|_offset| {
            calls += 1;
            async move { Ok(page_of(3, "a")) }
        })
        .await
        .unwrap();

        assert_eq!(objects.len(), 3);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_collect_pages_drops_folder_placeholders() {
        let objects = collect_pages(|_offset| async move {
            Ok(vec![
                StorageObject {
                    name: String::new(),
                },
                StorageObject {
                    name: "a.jpg".to_string(),
                },
            ])
        })
        .await
        .unwrap();

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, "a.jpg");
    }

    #[test]
    fn test_join_signed_url() {
        let joined = join_signed_url(
            "https://xyz.supabase.co",
            "/object/sign/photos/u/abc.jpg?token=t",
        );
        assert_eq!(
            joined,
            "https://xyz.supabase.co/storage/v1/object/sign/photos/u/abc.jpg?token=t"
        );
    }

    #[test]
    fn test_join_signed_url_without_leading_slash() {
        let joined = join_signed_url("https://xyz.supabase.co", "object/sign/photos/u/a.jpg");
        assert_eq!(
            joined,
            "https://xyz.supabase.co/storage/v1/object/sign/photos/u/a.jpg"
        );
    }
}
