//! Account deletion sequence against an in-memory platform fake.
//!
//! Covers the full wipe, the allowed partial states, and the
//! resume-from-recorded-progress behavior, including the JSON round trip
//! the progress value makes through the session between attempts.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use photoload_core::{StoragePath, UserId};
use photoload_web::services::{
    DeletionBackend, DeletionProgress, DeletionStep, delete_account,
};
use photoload_web::supabase::SupabaseError;

/// In-memory account: objects, rows, and an identity record, with
/// per-operation failure switches.
#[derive(Default)]
struct FakeAccount {
    objects: Mutex<Vec<StoragePath>>,
    rows: Mutex<usize>,
    identity: Mutex<bool>,
    fail_storage: Mutex<bool>,
    fail_rows: Mutex<bool>,
    fail_identity: Mutex<bool>,
}

impl FakeAccount {
    fn seeded(user: UserId, objects: usize, rows: usize) -> Self {
        let account = Self::default();
        *account.objects.lock().unwrap() = (0..objects)
            .map(|_| StoragePath::for_user(user, "jpg"))
            .collect();
        *account.rows.lock().unwrap() = rows;
        *account.identity.lock().unwrap() = true;
        account
    }

    fn platform_error(message: &str) -> SupabaseError {
        SupabaseError::Api {
            status: 500,
            message: message.to_string(),
        }
    }
}

impl DeletionBackend for FakeAccount {
    async fn list_user_objects(&self, _user: UserId) -> Result<Vec<StoragePath>, SupabaseError> {
        Ok(self.objects.lock().unwrap().clone())
    }

    async fn remove_objects(&self, paths: &[StoragePath]) -> Result<(), SupabaseError> {
        if *self.fail_storage.lock().unwrap() {
            return Err(Self::platform_error("storage unavailable"));
        }
        self.objects.lock().unwrap().retain(|p| !paths.contains(p));
        Ok(())
    }

    async fn delete_user_rows(&self, _user: UserId) -> Result<(), SupabaseError> {
        if *self.fail_rows.lock().unwrap() {
            return Err(Self::platform_error("row delete rejected"));
        }
        *self.rows.lock().unwrap() = 0;
        Ok(())
    }

    async fn delete_identity(&self, _user: UserId) -> Result<(), SupabaseError> {
        if *self.fail_identity.lock().unwrap() {
            return Err(Self::platform_error("auth service down"));
        }
        *self.identity.lock().unwrap() = false;
        Ok(())
    }
}

#[tokio::test]
async fn test_happy_path_wipes_the_account() {
    let user = UserId::new();
    let account = FakeAccount::seeded(user, 5, 5);

    delete_account(&account, user, DeletionProgress::default())
        .await
        .unwrap();

    assert!(account.objects.lock().unwrap().is_empty());
    assert_eq!(*account.rows.lock().unwrap(), 0);
    assert!(!*account.identity.lock().unwrap());
}

#[tokio::test]
async fn test_storage_failure_stops_before_rows() {
    let user = UserId::new();
    let account = FakeAccount::seeded(user, 2, 2);
    *account.fail_storage.lock().unwrap() = true;

    let err = delete_account(&account, user, DeletionProgress::default())
        .await
        .unwrap_err();

    assert_eq!(err.step, DeletionStep::StorageObjects);
    // Nothing after the failing step was touched
    assert_eq!(*account.rows.lock().unwrap(), 2);
    assert!(*account.identity.lock().unwrap());
}

#[tokio::test]
async fn test_retry_resumes_through_session_round_trip() {
    let user = UserId::new();
    let account = FakeAccount::seeded(user, 2, 2);
    *account.fail_rows.lock().unwrap() = true;

    let err = delete_account(&account, user, DeletionProgress::default())
        .await
        .unwrap_err();
    assert_eq!(err.step, DeletionStep::PhotoRows);
    assert!(err.progress.storage_cleared);

    // Between attempts the progress lives in the session as JSON
    let json = serde_json::to_string(&err.progress).unwrap();
    let restored: DeletionProgress = serde_json::from_str(&json).unwrap();

    // Second press of the button, transient failure gone. Storage is
    // already empty, so resuming must not re-run (and re-fail) that step
    *account.fail_rows.lock().unwrap() = false;
    *account.fail_storage.lock().unwrap() = true;
    delete_account(&account, user, restored).await.unwrap();

    assert_eq!(*account.rows.lock().unwrap(), 0);
    assert!(!*account.identity.lock().unwrap());
}

#[tokio::test]
async fn test_identity_failure_leaves_resumable_progress() {
    let user = UserId::new();
    let account = FakeAccount::seeded(user, 1, 1);
    *account.fail_identity.lock().unwrap() = true;

    let err = delete_account(&account, user, DeletionProgress::default())
        .await
        .unwrap_err();

    assert_eq!(err.step, DeletionStep::AuthIdentity);
    assert!(err.progress.storage_cleared);
    assert!(err.progress.rows_cleared);
    assert!(!err.progress.is_complete());

    *account.fail_identity.lock().unwrap() = false;
    delete_account(&account, user, err.progress).await.unwrap();
    assert!(!*account.identity.lock().unwrap());
}

#[tokio::test]
async fn test_empty_account_deletes_cleanly() {
    let user = UserId::new();
    let account = FakeAccount::seeded(user, 0, 0);
    // A removal call would fail, but no objects exist so none is made
    *account.fail_storage.lock().unwrap() = true;

    delete_account(&account, user, DeletionProgress::default())
        .await
        .unwrap();
    assert!(!*account.identity.lock().unwrap());
}
