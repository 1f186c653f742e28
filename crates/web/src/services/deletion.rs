//! Account deletion orchestrator.
//!
//! Deletes all of a user's stored objects, all of their photo rows, and
//! their identity record, in that order. The sequence is best-effort, not
//! transactional: there is no compensating rollback. What it does have is
//! an explicit saga shape - each step records completion in
//! [`DeletionProgress`], a failure aborts the remaining steps, and a retry
//! resumes from the first incomplete step (already-deleted items are
//! no-ops upstream).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use photoload_core::{StoragePath, UserId};

use crate::supabase::{AdminClient, SupabaseError};

/// One step of the deletion sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionStep {
    /// List and batch-remove every object under the user's namespace.
    StorageObjects,
    /// Delete every photo row owned by the user.
    PhotoRows,
    /// Delete the identity record from the auth service.
    AuthIdentity,
}

/// Which steps of the sequence have completed.
///
/// Persisted in the session across a failed attempt so a retry resumes
/// instead of restarting (restarting would also be safe, just slower).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionProgress {
    pub storage_cleared: bool,
    pub rows_cleared: bool,
    pub identity_cleared: bool,
}

impl DeletionProgress {
    /// The first incomplete step, or `None` when everything is done.
    #[must_use]
    pub const fn next_step(&self) -> Option<DeletionStep> {
        if !self.storage_cleared {
            Some(DeletionStep::StorageObjects)
        } else if !self.rows_cleared {
            Some(DeletionStep::PhotoRows)
        } else if !self.identity_cleared {
            Some(DeletionStep::AuthIdentity)
        } else {
            None
        }
    }

    /// Whether every step has completed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.next_step().is_none()
    }
}

/// A deletion attempt that stopped partway.
///
/// `progress` reflects the steps that did complete; partial deletion (e.g.
/// files removed, rows intact) is a known possible end state until a retry
/// finishes the sequence.
#[derive(Debug, Error)]
#[error("account deletion failed at {step:?}: {source}")]
pub struct DeletionError {
    /// The step that failed.
    pub step: DeletionStep,
    /// Progress at the time of failure.
    pub progress: DeletionProgress,
    /// The underlying platform error.
    #[source]
    pub source: SupabaseError,
}

/// The privileged operations the orchestrator needs.
///
/// [`AdminClient`] is the production implementation; tests drive the
/// sequencing rules with an in-memory fake.
pub trait DeletionBackend {
    /// List every object under the user's storage namespace.
    fn list_user_objects(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<StoragePath>, SupabaseError>> + Send;

    /// Remove a batch of objects in one call.
    fn remove_objects(
        &self,
        paths: &[StoragePath],
    ) -> impl Future<Output = Result<(), SupabaseError>> + Send;

    /// Delete every photo row owned by the user.
    fn delete_user_rows(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<(), SupabaseError>> + Send;

    /// Delete the user's identity record.
    fn delete_identity(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<(), SupabaseError>> + Send;
}

impl DeletionBackend for AdminClient {
    async fn list_user_objects(&self, user: UserId) -> Result<Vec<StoragePath>, SupabaseError> {
        Self::list_user_objects(self, user).await
    }

    async fn remove_objects(&self, paths: &[StoragePath]) -> Result<(), SupabaseError> {
        Self::remove_objects(self, paths).await
    }

    async fn delete_user_rows(&self, user: UserId) -> Result<(), SupabaseError> {
        self.delete_photos_for_user(user).await
    }

    async fn delete_identity(&self, user: UserId) -> Result<(), SupabaseError> {
        self.delete_user(user).await
    }
}

/// Run the deletion sequence from the first incomplete step.
///
/// # Errors
///
/// Returns [`DeletionError`] carrying the failing step and the progress
/// reached; remaining steps are not attempted.
pub async fn delete_account(
    backend: &impl DeletionBackend,
    user: UserId,
    mut progress: DeletionProgress,
) -> Result<(), DeletionError> {
    while let Some(step) = progress.next_step() {
        let result = match step {
            DeletionStep::StorageObjects => clear_storage(backend, user).await,
            DeletionStep::PhotoRows => backend.delete_user_rows(user).await,
            DeletionStep::AuthIdentity => backend.delete_identity(user).await,
        };

        match result {
            Ok(()) => match step {
                DeletionStep::StorageObjects => progress.storage_cleared = true,
                DeletionStep::PhotoRows => progress.rows_cleared = true,
                DeletionStep::AuthIdentity => progress.identity_cleared = true,
            },
            Err(source) => {
                tracing::error!(user = %user, step = ?step, error = %source,
                    "account deletion aborted");
                return Err(DeletionError {
                    step,
                    progress,
                    source,
                });
            }
        }

        tracing::info!(user = %user, step = ?step, "account deletion step complete");
    }

    Ok(())
}

/// List and batch-remove the user's objects. An empty namespace skips the
/// removal call.
async fn clear_storage(backend: &impl DeletionBackend, user: UserId) -> Result<(), SupabaseError> {
    let paths = backend.list_user_objects(user).await?;
    if paths.is_empty() {
        return Ok(());
    }
    backend.remove_objects(&paths).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory backend with per-step failure injection.
    #[derive(Default)]
    struct FakeBackend {
        files: Mutex<Vec<StoragePath>>,
        rows: Mutex<usize>,
        identity_present: Mutex<bool>,
        fail_remove: Mutex<bool>,
        fail_rows: Mutex<bool>,
        fail_identity: Mutex<bool>,
    }

    impl FakeBackend {
        fn with_data(user: UserId, files: usize, rows: usize) -> Self {
            let backend = Self::default();
            *backend.files.lock().unwrap() = (0..files)
                .map(|_| StoragePath::for_user(user, "jpg"))
                .collect();
            *backend.rows.lock().unwrap() = rows;
            *backend.identity_present.lock().unwrap() = true;
            backend
        }

        fn fail(err: &str) -> SupabaseError {
            SupabaseError::Api {
                status: 500,
                message: err.to_string(),
            }
        }
    }

    impl DeletionBackend for FakeBackend {
        async fn list_user_objects(
            &self,
            _user: UserId,
        ) -> Result<Vec<StoragePath>, SupabaseError> {
            Ok(self.files.lock().unwrap().clone())
        }

        async fn remove_objects(&self, paths: &[StoragePath]) -> Result<(), SupabaseError> {
            if *self.fail_remove.lock().unwrap() {
                return Err(Self::fail("storage unavailable"));
            }
            self.files.lock().unwrap().retain(|p| !paths.contains(p));
            Ok(())
        }

        async fn delete_user_rows(&self, _user: UserId) -> Result<(), SupabaseError> {
            if *self.fail_rows.lock().unwrap() {
                return Err(Self::fail("row delete rejected"));
            }
            *self.rows.lock().unwrap() = 0;
            Ok(())
        }

        async fn delete_identity(&self, _user: UserId) -> Result<(), SupabaseError> {
            if *self.fail_identity.lock().unwrap() {
                return Err(Self::fail("auth service down"));
            }
            *self.identity_present.lock().unwrap() = false;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_full_deletion_clears_everything() {
        let user = UserId::new();
        let backend = FakeBackend::with_data(user, 3, 3);

        delete_account(&backend, user, DeletionProgress::default())
            .await
            .unwrap();

        assert!(backend.files.lock().unwrap().is_empty());
        assert_eq!(*backend.rows.lock().unwrap(), 0);
        assert!(!*backend.identity_present.lock().unwrap());
    }

    #[tokio::test]
    async fn test_empty_namespace_skips_removal() {
        let user = UserId::new();
        let backend = FakeBackend::with_data(user, 0, 2);
        // A removal call would fail; it must not be made for zero files
        *backend.fail_remove.lock().unwrap() = true;

        delete_account(&backend, user, DeletionProgress::default())
            .await
            .unwrap();

        assert_eq!(*backend.rows.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_row_failure_leaves_partial_state() {
        let user = UserId::new();
        let backend = FakeBackend::with_data(user, 2, 2);
        *backend.fail_rows.lock().unwrap() = true;

        let err = delete_account(&backend, user, DeletionProgress::default())
            .await
            .unwrap_err();

        // Allowed intermediate state: files removed, rows intact
        assert_eq!(err.step, DeletionStep::PhotoRows);
        assert!(err.progress.storage_cleared);
        assert!(!err.progress.rows_cleared);
        assert!(backend.files.lock().unwrap().is_empty());
        assert_eq!(*backend.rows.lock().unwrap(), 2);
        // Identity was never attempted
        assert!(*backend.identity_present.lock().unwrap());
    }

    #[tokio::test]
    async fn test_retry_resumes_from_first_incomplete_step() {
        let user = UserId::new();
        let backend = FakeBackend::with_data(user, 2, 2);
        *backend.fail_rows.lock().unwrap() = true;

        let err = delete_account(&backend, user, DeletionProgress::default())
            .await
            .unwrap_err();

        // The transient failure clears; retry with the recorded progress
        *backend.fail_rows.lock().unwrap() = false;
        delete_account(&backend, user, err.progress).await.unwrap();

        assert_eq!(*backend.rows.lock().unwrap(), 0);
        assert!(!*backend.identity_present.lock().unwrap());
    }

    #[tokio::test]
    async fn test_identity_failure_preserves_earlier_progress() {
        let user = UserId::new();
        let backend = FakeBackend::with_data(user, 1, 1);
        *backend.fail_identity.lock().unwrap() = true;

        let err = delete_account(&backend, user, DeletionProgress::default())
            .await
            .unwrap_err();

        assert_eq!(err.step, DeletionStep::AuthIdentity);
        assert!(err.progress.storage_cleared);
        assert!(err.progress.rows_cleared);
        assert!(!err.progress.is_complete());
    }

    #[test]
    fn test_progress_step_order() {
        let mut progress = DeletionProgress::default();
        assert_eq!(progress.next_step(), Some(DeletionStep::StorageObjects));
        progress.storage_cleared = true;
        assert_eq!(progress.next_step(), Some(DeletionStep::PhotoRows));
        progress.rows_cleared = true;
        assert_eq!(progress.next_step(), Some(DeletionStep::AuthIdentity));
        progress.identity_cleared = true;
        assert_eq!(progress.next_step(), None);
        assert!(progress.is_complete());
    }
}
