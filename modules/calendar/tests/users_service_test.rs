mod common;

use std::sync::Arc;

use calendar::contract::context::RequestCtx;
use calendar::contract::model::UserPatch;
use calendar::domain::error::{DomainError, ErrorKind};
use calendar::infra::storage::InMemoryUsersRepository;

use common::{ctx, new_user, users_service, users_service_over, StaleLoginCheck};

#[tokio::test]
async fn register_then_login() {
    let svc = users_service();
    let anon = RequestCtx::anonymous();

    let user = svc
        .add_user(&anon, new_user("alice", "wonderland", "Europe/Warsaw"))
        .await
        .unwrap();
    assert_eq!(user.login, "alice");
    assert_eq!(user.timezone, "Europe/Warsaw");

    svc.login_user(&anon, "alice", "wonderland").await.unwrap();

    let ctx = svc.authenticate("alice", "wonderland").await.unwrap();
    assert_eq!(ctx.login(), Some("alice"));
    assert_eq!(ctx.timezone(), Some("Europe/Warsaw"));
}

#[tokio::test]
async fn wrong_password_and_unknown_login_look_the_same() {
    let svc = users_service();
    let anon = RequestCtx::anonymous();
    svc.add_user(&anon, new_user("alice", "wonderland", "UTC"))
        .await
        .unwrap();

    let wrong_password = svc.login_user(&anon, "alice", "looking-glass").await.unwrap_err();
    let unknown_login = svc.login_user(&anon, "mallory", "wonderland").await.unwrap_err();
    assert_eq!(wrong_password, DomainError::incorrect_credentials());
    assert_eq!(wrong_password, unknown_login);
    assert_eq!(wrong_password.to_string(), unknown_login.to_string());

    assert_eq!(
        svc.get_user_by_login(&anon, "mallory").await.unwrap_err().kind(),
        ErrorKind::Unauthenticated
    );
}

#[tokio::test]
async fn registration_validates_input() {
    let svc = users_service();
    let anon = RequestCtx::anonymous();

    let cases = [
        new_user("al", "wonderland", "UTC"),
        new_user(&"x".repeat(31), "wonderland", "UTC"),
        new_user("alice", "abcd", "UTC"),
        new_user("alice", "wonderland", "Nowhere/City"),
    ];
    for case in cases {
        let err = svc.add_user(&anon, case).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest, "{err}");
    }

    // 11 CJK characters are fine even though they take 33 bytes.
    assert!(svc
        .add_user(&anon, new_user(&"漢".repeat(11), "wonderland", "Asia/Tokyo"))
        .await
        .is_ok());
}

#[tokio::test]
async fn duplicate_login_is_rejected() {
    let svc = users_service();
    let anon = RequestCtx::anonymous();
    svc.add_user(&anon, new_user("alice", "wonderland", "UTC"))
        .await
        .unwrap();

    let err = svc
        .add_user(&anon, new_user("alice", "another-pass", "UTC"))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::login_taken());
}

#[tokio::test]
async fn login_claimed_after_the_check_is_still_taken() {
    let store = Arc::new(InMemoryUsersRepository::new());
    let svc = users_service_over(Arc::new(StaleLoginCheck(store)));
    let anon = RequestCtx::anonymous();

    let alice = svc
        .add_user(&anon, new_user("alice", "wonderland", "UTC"))
        .await
        .unwrap();
    svc.add_user(&anon, new_user("bob", "builder1", "UTC"))
        .await
        .unwrap();

    let err = svc
        .add_user(&anon, new_user("alice", "another-pass", "UTC"))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::login_taken());

    let err = svc
        .update_user(
            &ctx("alice", "UTC"),
            alice.id,
            UserPatch {
                login: Some("bob".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::login_taken());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_of_one_login() {
    let svc = Arc::new(users_service());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let svc = svc.clone();
            tokio::spawn(async move {
                svc.add_user(
                    &RequestCtx::anonymous(),
                    new_user("alice", &format!("password-{i}"), "UTC"),
                )
                .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(user) => {
                assert_eq!(user.login, "alice");
                created += 1;
            }
            Err(err) => assert_eq!(err, DomainError::login_taken()),
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test]
async fn owner_can_update_own_account() {
    let svc = users_service();
    let anon = RequestCtx::anonymous();
    let alice = svc
        .add_user(&anon, new_user("alice", "wonderland", "UTC"))
        .await
        .unwrap();

    let updated = svc
        .update_user(
            &ctx("alice", "UTC"),
            alice.id,
            UserPatch {
                password: Some("new-secret".into()),
                timezone: Some("Asia/Tokyo".into()),
                login: Some(String::new()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.login, "alice");
    assert_eq!(updated.timezone, "Asia/Tokyo");

    assert!(svc.login_user(&anon, "alice", "wonderland").await.is_err());
    svc.login_user(&anon, "alice", "new-secret").await.unwrap();
}

#[tokio::test]
async fn foreign_account_cannot_be_modified() {
    let svc = users_service();
    let anon = RequestCtx::anonymous();
    let alice = svc
        .add_user(&anon, new_user("alice", "wonderland", "UTC"))
        .await
        .unwrap();
    svc.add_user(&anon, new_user("bob", "builder1", "UTC"))
        .await
        .unwrap();

    let as_bob = ctx("bob", "UTC");
    let err = svc
        .update_user(
            &as_bob,
            alice.id,
            UserPatch {
                timezone: Some("Europe/Paris".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.to_string(), "cannot modify another user's account");

    // The answer does not depend on the payload, even when it would not validate.
    let invalid_payloads = [
        UserPatch {
            login: Some("x".into()),
            ..Default::default()
        },
        UserPatch {
            password: Some("abc".into()),
            ..Default::default()
        },
        UserPatch {
            timezone: Some("Mars/Base".into()),
            ..Default::default()
        },
        UserPatch {
            login: Some("bob".into()),
            ..Default::default()
        },
    ];
    for patch in invalid_payloads {
        let err = svc.update_user(&as_bob, alice.id, patch).await.unwrap_err();
        assert_eq!(err, DomainError::foreign_account());
    }

    let err = svc.delete_user(&as_bob, alice.id).await.unwrap_err();
    assert_eq!(err, DomainError::foreign_account());

    // Alice is untouched.
    let still = svc.get_user_by_login(&anon, "alice").await.unwrap();
    assert_eq!(still.timezone, "UTC");
}

#[tokio::test]
async fn renaming_to_taken_login_is_rejected() {
    let svc = users_service();
    let anon = RequestCtx::anonymous();
    let alice = svc
        .add_user(&anon, new_user("alice", "wonderland", "UTC"))
        .await
        .unwrap();
    svc.add_user(&anon, new_user("bob", "builder1", "UTC"))
        .await
        .unwrap();

    let err = svc
        .update_user(
            &ctx("alice", "UTC"),
            alice.id,
            UserPatch {
                login: Some("bob".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::login_taken());

    // Re-submitting the current login is not a conflict.
    let same = svc
        .update_user(
            &ctx("alice", "UTC"),
            alice.id,
            UserPatch {
                login: Some("alice".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same.login, "alice");
}

#[tokio::test]
async fn owner_can_delete_own_account() {
    let svc = users_service();
    let anon = RequestCtx::anonymous();
    let alice = svc
        .add_user(&anon, new_user("alice", "wonderland", "UTC"))
        .await
        .unwrap();

    svc.delete_user(&ctx("alice", "UTC"), alice.id).await.unwrap();
    assert_eq!(
        svc.login_user(&anon, "alice", "wonderland").await.unwrap_err(),
        DomainError::incorrect_credentials()
    );
}

#[tokio::test]
async fn ownership_check_needs_identity() {
    let svc = users_service();
    let anon = RequestCtx::anonymous();
    let alice = svc
        .add_user(&anon, new_user("alice", "wonderland", "UTC"))
        .await
        .unwrap();

    let err = svc.delete_user(&anon, alice.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert_eq!(
        err.to_string(),
        "unexpected error: failed to fetch login from context"
    );

    // A context naming an account that no longer exists cannot act.
    let ghost = ctx("ghost", "UTC");
    let err = svc.delete_user(&ghost, alice.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);
}
