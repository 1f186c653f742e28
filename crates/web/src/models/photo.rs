//! Photo model and display data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use photoload_core::{PhotoId, StoragePath, UserId};

use crate::supabase::PhotoRow;

/// A photo: one row in the platform's `photos` table, paired 1:1 with an
/// object at `path` in the storage bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub user_id: UserId,
    pub path: StoragePath,
    pub filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<PhotoRow> for Photo {
    fn from(row: PhotoRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            path: row.path,
            filename: row.filename,
            created_at: row.created_at,
        }
    }
}

impl Photo {
    /// Display name: the original filename, or the object name as fallback.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.filename
            .as_deref()
            .unwrap_or_else(|| self.path.object_name())
    }
}

/// Photo display data for templates: the photo plus a freshly minted signed
/// URL (absent when the signing call failed; the gallery then renders the
/// tile without a thumbnail).
#[derive(Debug, Clone)]
pub struct PhotoView {
    pub photo: Photo,
    pub signed_url: Option<String>,
}
