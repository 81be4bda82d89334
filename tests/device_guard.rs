//! The guard must reject access tokens whose device claim no longer matches
//! the account, no matter how far away their expiry is.

mod common;

use dispensa::session::guard::MSG_STALE_DEVICE;
use dispensa::session::{GuardError, check_device_session};

use common::test_service;

#[tokio::test]
async fn current_device_token_passes_the_guard() {
    let (service, store) = test_service();

    service.register("alice", "correct horse battery").await.unwrap();
    let login = service.login("alice", "correct horse battery").await.unwrap();

    let claims = service.issuer().decode(&login.access_token).unwrap();
    let principal = check_device_session(store.as_ref(), &claims).await.unwrap();

    let account = store.account_by_username("alice").unwrap();
    assert_eq!(principal.account_id, account.id);
    assert_eq!(principal.username, "alice");
    assert_eq!(Some(principal.device_id), account.current_device_id);
}

#[tokio::test]
async fn a_new_login_strands_the_old_device_before_expiry() {
    let (service, store) = test_service();

    service.register("alice", "correct horse battery").await.unwrap();
    let phone = service.login("alice", "correct horse battery").await.unwrap();

    // Still signature-valid and nowhere near expiry.
    let phone_claims = service.issuer().decode(&phone.access_token).unwrap();

    let tablet = service.login("alice", "correct horse battery").await.unwrap();

    let err = check_device_session(store.as_ref(), &phone_claims)
        .await
        .unwrap_err();
    assert!(matches!(err, GuardError::Unauthorized(msg) if msg == MSG_STALE_DEVICE));

    // The tablet's claim matches the stored device id and passes.
    let tablet_claims = service.issuer().decode(&tablet.access_token).unwrap();
    check_device_session(store.as_ref(), &tablet_claims)
        .await
        .unwrap();
}

#[tokio::test]
async fn guard_rejects_a_deleted_account() {
    let (service, store) = test_service();

    service.register("alice", "correct horse battery").await.unwrap();
    let login = service.login("alice", "correct horse battery").await.unwrap();
    let claims = service.issuer().decode(&login.access_token).unwrap();

    let account = store.account_by_username("alice").unwrap();
    store.remove_account(account.id);

    let err = check_device_session(store.as_ref(), &claims)
        .await
        .unwrap_err();
    assert!(matches!(err, GuardError::Unauthorized(msg) if msg == MSG_STALE_DEVICE));
}

#[tokio::test]
async fn guard_rejects_a_cleared_device_session() {
    let (service, store) = test_service();

    service.register("alice", "correct horse battery").await.unwrap();
    let login = service.login("alice", "correct horse battery").await.unwrap();
    let claims = service.issuer().decode(&login.access_token).unwrap();

    let mut account = store.account_by_username("alice").unwrap();
    account.current_device_id = None;
    store.insert_account(account);

    let err = check_device_session(store.as_ref(), &claims)
        .await
        .unwrap_err();
    assert!(matches!(err, GuardError::Unauthorized(msg) if msg == MSG_STALE_DEVICE));
}
