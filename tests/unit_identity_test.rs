// tests/unit_identity_test.rs

mod common;

use cadenza::core::CadenzaError;
use cadenza::core::identity::{UserDirectory, hash_password, is_strong, verify_password};
use common::MemoryUserStore;
use std::sync::Arc;
use std::sync::atomic::Ordering;

const EMAIL: &str = "test@test.com";
const PASSWORD: &str = "testPassword6";

async fn directory() -> (UserDirectory, Arc<MemoryUserStore>) {
    let store = Arc::new(MemoryUserStore::default());
    let directory = UserDirectory::load(store.clone()).await.unwrap();
    (directory, store)
}

#[test]
fn test_password_policy() {
    assert!(is_strong("testPassword6"));
    assert!(!is_strong("short1A"));
    assert!(!is_strong("alllowercase1"));
    assert!(!is_strong("ALLUPPERCASE1"));
    assert!(!is_strong("NoDigitsHere"));
}

#[test]
fn test_hash_and_verify_round_trip() {
    let credential = hash_password(PASSWORD).unwrap();
    assert!(verify_password(PASSWORD, &credential).unwrap());
    assert!(!verify_password("wrongPassword1", &credential).unwrap());
}

#[test]
fn test_hashing_salts_per_credential() {
    let first = hash_password(PASSWORD).unwrap();
    let second = hash_password(PASSWORD).unwrap();
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_register_and_login() {
    let (directory, store) = directory().await;
    directory.register(EMAIL, PASSWORD).await.unwrap();
    assert!(directory.exists(EMAIL));
    assert_eq!(store.appends.load(Ordering::SeqCst), 1);

    directory.login(EMAIL, PASSWORD).await.unwrap();
}

#[tokio::test]
async fn test_register_duplicate_email_writes_nothing() {
    let (directory, store) = directory().await;
    directory.register(EMAIL, PASSWORD).await.unwrap();

    let result = directory.register(EMAIL, "otherPassword7").await;
    assert!(matches!(result, Err(CadenzaError::UserAlreadyExists(_))));
    assert_eq!(store.appends.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_register_weak_password() {
    let (directory, store) = directory().await;
    let result = directory.register(EMAIL, "weak").await;
    assert!(matches!(result, Err(CadenzaError::WeakPassword)));
    assert!(!directory.exists(EMAIL));
    assert_eq!(store.appends.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_unknown_email() {
    let (directory, _) = directory().await;
    let result = directory.login("nobody@test.com", PASSWORD).await;
    assert!(matches!(result, Err(CadenzaError::UserNotFound(_))));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (directory, _) = directory().await;
    directory.register(EMAIL, PASSWORD).await.unwrap();
    let result = directory.login(EMAIL, "wrongPassword1").await;
    assert!(matches!(result, Err(CadenzaError::WrongPassword)));
}

#[tokio::test]
async fn test_directory_loads_existing_records() {
    let store = Arc::new(MemoryUserStore::default());
    let seeded = UserDirectory::load(store.clone()).await.unwrap();
    seeded.register(EMAIL, PASSWORD).await.unwrap();

    // A fresh directory over the same store sees the registered user.
    let reloaded = UserDirectory::load(store).await.unwrap();
    assert!(reloaded.exists(EMAIL));
    reloaded.login(EMAIL, PASSWORD).await.unwrap();
}
