//! Orchestration services over the platform clients.
//!
//! Route handlers stay thin; the multi-step flows (account deletion, the
//! sequential upload batch, gallery loading) live here behind small traits
//! so their sequencing rules can be tested without the platform.

pub mod deletion;
pub mod gallery;
pub mod share;
pub mod upload;

pub use deletion::{DeletionBackend, DeletionError, DeletionProgress, DeletionStep, delete_account};
pub use gallery::{GalleryStore, SIGNED_URL_TTL_SECS, load_photo_views};
pub use share::{ShareError, ShareImage, ShareStore, resolve_share_image};
pub use upload::{PhotoStore, UploadFile, UploadOutcome, upload_batch};
