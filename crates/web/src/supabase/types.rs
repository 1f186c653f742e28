//! Wire types for the managed platform's REST surfaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use photoload_core::{PhotoId, StoragePath, UserId};

/// One entry from a storage `list` call.
///
/// The listing endpoint returns names relative to the listed prefix, plus
/// metadata we don't use. Folder placeholders come back with an empty name
/// and are skipped by callers.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageObject {
    /// Object name relative to the listed prefix.
    pub name: String,
}

/// Response from the storage `sign` endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct SignedUrlResponse {
    /// Relative signed URL, e.g. `/object/sign/photos/{path}?token=…`.
    #[serde(rename = "signedURL")]
    pub signed_url: String,
}

/// A photo row from the `photos` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRow {
    pub id: PhotoId,
    pub user_id: UserId,
    pub path: StoragePath,
    pub filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Projection used by the image proxy: only the object path.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoPathRow {
    pub path: StoragePath,
}

/// Projection used by the share page: only the id.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoIdRow {
    pub id: PhotoId,
}

/// Insert body for the `photos` table.
///
/// The row id and `created_at` are generated by the database; a row is only
/// inserted after its object was written, which is what keeps rows from
/// referencing paths that don't exist.
#[derive(Debug, Clone, Serialize)]
pub struct NewPhotoRow {
    pub user_id: UserId,
    pub path: StoragePath,
    pub filename: Option<String>,
}

/// Token response from the GoTrue `token` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// An identity record from GoTrue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_row_deserializes() {
        let json = r#"{
            "id": "7ad60867-6e38-4f1a-9442-60a67ae0a76b",
            "user_id": "b31b9af1-5934-4a14-9a60-dbd8f9ea5b46",
            "path": "b31b9af1-5934-4a14-9a60-dbd8f9ea5b46/abc.jpg",
            "filename": "holiday.jpg",
            "created_at": "2026-01-15T09:30:00Z"
        }"#;
        let row: PhotoRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.filename.as_deref(), Some("holiday.jpg"));
        assert_eq!(row.path.owner(), row.user_id);
    }

    #[test]
    fn test_photo_row_rejects_foreign_path_shape() {
        // A path without the owner-uuid prefix must not deserialize
        let json = r#"{
            "id": "7ad60867-6e38-4f1a-9442-60a67ae0a76b",
            "user_id": "b31b9af1-5934-4a14-9a60-dbd8f9ea5b46",
            "path": "loose-object.jpg",
            "filename": null,
            "created_at": "2026-01-15T09:30:00Z"
        }"#;
        assert!(serde_json::from_str::<PhotoRow>(json).is_err());
    }

    #[test]
    fn test_signed_url_response_field_name() {
        let json = r#"{"signedURL": "/object/sign/photos/u/abc.jpg?token=t"}"#;
        let resp: SignedUrlResponse = serde_json::from_str(json).unwrap();
        assert!(resp.signed_url.starts_with("/object/sign/"));
    }

    #[test]
    fn test_token_response_without_user() {
        let json = r#"{"access_token": "at", "refresh_token": "rt"}"#;
        let resp: TokenResponse = serde_json::from_str(json).unwrap();
        assert!(resp.user.is_none());
        assert!(resp.expires_in.is_none());
    }
}
