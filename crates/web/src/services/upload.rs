//! Sequential upload batch.
//!
//! Files in a batch are processed strictly one at a time: each file's
//! upload-then-insert pair completes (or records its own error) before the
//! next begins. A row is only inserted after its object upload succeeded,
//! so no row ever references a path that was not written. The loop never
//! aborts early - later files are attempted even when an earlier one
//! failed.

use photoload_core::{StoragePath, UserId};

use crate::supabase::types::NewPhotoRow;
use crate::supabase::{SupabaseError, UserClient};

/// Extension used when the original filename has none.
const DEFAULT_EXTENSION: &str = "jpg";

/// Setup hint appended to storage errors that look like a missing bucket.
const BUCKET_HINT: &str = " Create a private storage bucket named \"photos\" in the platform \
                           dashboard and apply its storage policies, then try again.";

/// One file selected for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original filename, as submitted.
    pub filename: String,
    /// Declared content type (fallback `image/jpeg`).
    pub content_type: String,
    /// File bytes.
    pub bytes: Vec<u8>,
}

/// Per-file result of an upload batch.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Original filename, for the per-file error badge.
    pub filename: String,
    /// Error message when this file failed; `None` on success.
    pub error: Option<String>,
}

impl UploadOutcome {
    /// Whether this file made it into storage and the table.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// The storage/row operations one file needs.
///
/// [`UserClient`] is the production implementation; tests drive the batch
/// sequencing with an in-memory fake.
pub trait PhotoStore {
    /// Upload one object (overwrite disallowed).
    fn store_object(
        &self,
        path: &StoragePath,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<(), SupabaseError>> + Send;

    /// Insert the row for an uploaded object.
    fn insert_row(&self, row: &NewPhotoRow)
    -> impl Future<Output = Result<(), SupabaseError>> + Send;
}

impl PhotoStore for UserClient {
    async fn store_object(
        &self,
        path: &StoragePath,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), SupabaseError> {
        self.upload_object(path, content_type, bytes).await
    }

    async fn insert_row(&self, row: &NewPhotoRow) -> Result<(), SupabaseError> {
        self.insert_photo(row).await
    }
}

/// Upload a batch of files for one user, strictly sequentially.
///
/// Returns one outcome per input file, in input order.
pub async fn upload_batch(
    store: &impl PhotoStore,
    user: UserId,
    files: Vec<UploadFile>,
) -> Vec<UploadOutcome> {
    let mut outcomes = Vec::with_capacity(files.len());

    for file in files {
        let path = StoragePath::for_user(user, extension_of(&file.filename));

        let error = match store
            .store_object(&path, &file.content_type, file.bytes)
            .await
        {
            Err(e) => {
                tracing::warn!(user = %user, filename = %file.filename, error = %e,
                    "storage upload failed");
                Some(with_bucket_hint(&e.to_string()))
            }
            Ok(()) => {
                let row = NewPhotoRow {
                    user_id: user,
                    path,
                    filename: Some(file.filename.clone()),
                };
                match store.insert_row(&row).await {
                    Err(e) => {
                        tracing::warn!(user = %user, filename = %file.filename, error = %e,
                            "photo row insert failed");
                        Some(e.to_string())
                    }
                    Ok(()) => None,
                }
            }
        };

        outcomes.push(UploadOutcome {
            filename: file.filename,
            error,
        });
    }

    outcomes
}

/// File extension from a filename; `jpg` when absent.
#[must_use]
pub fn extension_of(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext,
        _ => DEFAULT_EXTENSION,
    }
}

/// Append the bucket-setup hint when a storage error looks like a missing
/// bucket. Heuristic: the message mentions "bucket" or "not found".
#[must_use]
pub fn with_bucket_hint(message: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("bucket") || lower.contains("not found") {
        format!("{message}{BUCKET_HINT}")
    } else {
        message.to_string()
    }
}
