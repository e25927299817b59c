//! Integration tests for the before-logout hook chain.

use softphone_auth::config::{AuthConfig, BrandConfig};
use softphone_auth::coordinator::AuthCoordinator;
use softphone_auth::error::AuthError;
use softphone_auth::messages::AuthMessage;
use softphone_auth::mocks::{MockAlertSink, MockChannelHost, MockLocaleSource, MockPlatformClient};
use softphone_auth::state::{AuthState, LoginStatus, ModuleStatus, TokenData};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

type Coordinator =
    AuthCoordinator<MockPlatformClient, MockAlertSink, MockLocaleSource, MockChannelHost>;

struct Harness {
    coordinator: Coordinator,
    client: MockPlatformClient,
    alerts: MockAlertSink,
}

#[allow(clippy::unwrap_used)]
async fn wait_for(coordinator: &Coordinator, predicate: impl FnMut(&AuthState) -> bool) {
    let mut rx = coordinator.subscribe();
    tokio::time::timeout(Duration::from_secs(1), rx.wait_for(predicate))
        .await
        .unwrap()
        .unwrap();
}

/// Coordinator initialized with an established session.
async fn logged_in_harness() -> Harness {
    let client = MockPlatformClient::new().with_session(TokenData {
        access_token: "restored-access-token".into(),
        owner_id: Some("owner-42".into()),
        ..TokenData::default()
    });
    let alerts = MockAlertSink::new();
    let coordinator = AuthCoordinator::new(
        client.clone(),
        alerts.clone(),
        MockLocaleSource::ready("en-US"),
        MockChannelHost::new(),
        AuthConfig::new(BrandConfig::new("1210", "Acme Communications")),
    );
    coordinator.initialize();
    wait_for(&coordinator, |s| s.status == ModuleStatus::Ready).await;
    Harness {
        coordinator,
        client,
        alerts,
    }
}

#[tokio::test]
async fn test_hooks_run_sequentially_in_registration_order() {
    let h = logged_in_harness().await;
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let first = Arc::clone(&order);
    h.coordinator.add_before_logout_handler(move || {
        let first = Arc::clone(&first);
        async move {
            // Yield so an eagerly started second hook would overtake us.
            tokio::time::sleep(Duration::from_millis(10)).await;
            first.lock().unwrap_or_else(PoisonError::into_inner).push("first");
            Ok(None)
        }
    });
    let second = Arc::clone(&order);
    h.coordinator.add_before_logout_handler(move || {
        let second = Arc::clone(&second);
        async move {
            second.lock().unwrap_or_else(PoisonError::into_inner).push("second");
            Ok(None)
        }
    });

    assert!(h.coordinator.logout().await.is_ok());
    assert_eq!(
        *order.lock().unwrap_or_else(PoisonError::into_inner),
        vec!["first", "second"]
    );
    assert_eq!(h.client.logout_calls(), 1);
    wait_for(&h.coordinator, |s| {
        s.login_status == LoginStatus::LoggedOut
    })
    .await;
}

#[tokio::test]
async fn test_veto_cancels_logout_and_skips_later_hooks() {
    let h = logged_in_harness().await;
    let later_ran = Arc::new(Mutex::new(false));

    h.coordinator
        .add_before_logout_handler(|| async { Ok(Some("unsaved draft".to_string())) });
    let flag = Arc::clone(&later_ran);
    h.coordinator.add_before_logout_handler(move || {
        let flag = Arc::clone(&flag);
        async move {
            *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
            Ok(None)
        }
    });

    let result = h.coordinator.logout().await;
    match result {
        Err(AuthError::LogoutCancelled { reason }) => assert_eq!(reason, "unsaved draft"),
        other => assert!(other.is_err(), "expected LogoutCancelled, got {other:?}"),
    }
    assert!(!*later_ran.lock().unwrap_or_else(PoisonError::into_inner));
    assert_eq!(h.client.logout_calls(), 0);

    // The session survives and the transient pending flag is cleared.
    let state = h.coordinator.state();
    assert_eq!(state.login_status, LoginStatus::LoggedIn);
    assert!(!state.pending_logout);
}

#[tokio::test]
async fn test_failing_hook_alerts_skips_rest_and_proceeds() {
    let h = logged_in_harness().await;
    let later_ran = Arc::new(Mutex::new(false));

    h.coordinator
        .add_before_logout_handler(|| async { Err(anyhow::anyhow!("hook exploded")) });
    let flag = Arc::clone(&later_ran);
    h.coordinator.add_before_logout_handler(move || {
        let flag = Arc::clone(&flag);
        async move {
            *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
            Ok(None)
        }
    });

    assert!(h.coordinator.logout().await.is_ok());
    assert!(!*later_ran.lock().unwrap_or_else(PoisonError::into_inner));
    assert_eq!(h.client.logout_calls(), 1);

    let alerts = h.alerts.with_message(AuthMessage::BeforeLogoutError);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].payload.as_deref(), Some("hook exploded"));
}

#[tokio::test]
async fn test_unregistered_hook_no_longer_vetoes() {
    let h = logged_in_harness().await;

    let registration = h
        .coordinator
        .add_before_logout_handler(|| async { Ok(Some("blocked".to_string())) });
    registration.unregister();
    registration.unregister(); // idempotent

    assert!(h.coordinator.logout().await.is_ok());
    assert_eq!(h.client.logout_calls(), 1);
}

#[tokio::test]
async fn test_remove_by_handler_id() {
    let h = logged_in_harness().await;

    let registration = h
        .coordinator
        .add_before_logout_handler(|| async { Ok(Some("blocked".to_string())) });
    h.coordinator.remove_before_logout_handler(registration.id());

    assert!(h.coordinator.logout().await.is_ok());
    assert_eq!(h.client.logout_calls(), 1);
}

#[tokio::test]
async fn test_logout_with_no_hooks() {
    let h = logged_in_harness().await;
    assert!(h.coordinator.logout().await.is_ok());
    wait_for(&h.coordinator, |s| {
        s.login_status == LoginStatus::LoggedOut && s.token.is_none()
    })
    .await;
    assert!(h.alerts.alerts().is_empty());
}

#[tokio::test]
async fn test_platform_logout_failure_propagates() {
    let h = logged_in_harness().await;
    h.client.fail_next_logout();

    let result = h.coordinator.logout().await;
    assert!(matches!(result, Err(AuthError::Platform { .. })));

    // The logout-error event still terminates the session.
    wait_for(&h.coordinator, |s| {
        s.login_status == LoginStatus::LoggedOut
    })
    .await;
    assert_eq!(h.alerts.with_message(AuthMessage::LogoutError).len(), 1);
}
