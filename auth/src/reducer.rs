//! Session reducer.
//!
//! Pure transition table for [`AuthState`]. The coordinator performs all
//! side effects (platform calls, alerts, cache purges); the reducer only
//! maps `(state, event)` to the next snapshot.

use crate::actions::AuthAction;
use crate::state::{AuthState, LoginStatus, ModuleStatus};
use softphone_core::reducer::Reducer;

/// Session reducer.
///
/// Transition laws:
///
/// - `login_status` becomes `LoggedIn` on `LoginSuccess`, `RefreshSuccess`
///   and `InitSuccess { logged_in: true }`; it becomes `LoggedOut` on
///   `LoginError`, `LogoutSuccess`, `LogoutError` and unrecoverable
///   `RefreshError`.
/// - `status` is monotonic: `Pending` → `Initializing` → `Ready`.
/// - A recoverable `RefreshError` (refresh token still valid) records the
///   error and changes nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthReducer;

impl Reducer for AuthReducer {
    type State = AuthState;
    type Action = AuthAction;

    #[allow(clippy::too_many_lines)] // One arm per transition event
    fn reduce(&self, state: &AuthState, action: AuthAction) -> AuthState {
        let mut next = state.clone();
        match action {
            AuthAction::Init => {
                if next.status == ModuleStatus::Pending {
                    next.status = ModuleStatus::Initializing;
                }
            }

            AuthAction::InitSuccess { logged_in, token } => {
                next.status = ModuleStatus::Ready;
                next.login_status = if logged_in {
                    LoginStatus::LoggedIn
                } else {
                    LoginStatus::LoggedOut
                };
                next.owner_id = token.as_ref().and_then(|t| t.owner_id.clone());
                next.token = token;
                // A restored session is not a fresh interactive login.
                next.fresh_login = false;
                next.last_error = None;
            }

            AuthAction::Login => {
                next.fresh_login = true;
                next.last_error = None;
            }

            AuthAction::LoginSuccess { token } => {
                next.login_status = LoginStatus::LoggedIn;
                next.owner_id = token.owner_id.clone();
                next.token = Some(token);
                next.last_error = None;
            }

            AuthAction::LoginError { error } => {
                next.login_status = LoginStatus::LoggedOut;
                next.token = None;
                next.owner_id = None;
                next.fresh_login = false;
                next.last_error = error;
            }

            AuthAction::BeforeLogout => {
                next.pending_logout = true;
            }

            AuthAction::CancelLogout => {
                next.pending_logout = false;
            }

            AuthAction::Logout => {
                next.pending_logout = false;
                next.fresh_login = false;
            }

            AuthAction::LogoutSuccess => {
                next.login_status = LoginStatus::LoggedOut;
                next.token = None;
                next.owner_id = None;
                next.fresh_login = false;
                next.pending_logout = false;
                next.last_error = None;
            }

            AuthAction::LogoutError { error } => {
                // A failed platform logout still terminates the local session.
                next.login_status = LoginStatus::LoggedOut;
                next.token = None;
                next.owner_id = None;
                next.fresh_login = false;
                next.pending_logout = false;
                next.last_error = error;
            }

            AuthAction::RefreshSuccess { token } => {
                next.login_status = LoginStatus::LoggedIn;
                next.owner_id = token.owner_id.clone();
                next.token = Some(token);
                next.fresh_login = false;
                next.last_error = None;
            }

            AuthAction::RefreshError {
                error,
                refresh_token_valid,
            } => {
                next.last_error = Some(error);
                if !refresh_token_valid {
                    next.login_status = LoginStatus::LoggedOut;
                    next.token = None;
                    next.owner_id = None;
                    next.fresh_login = false;
                }
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TokenData;
    use softphone_testing::ReducerTest;

    fn token(owner: &str) -> TokenData {
        TokenData {
            access_token: format!("at-{owner}"),
            refresh_token: Some(format!("rt-{owner}")),
            expires_at: None,
            owner_id: Some(owner.to_string()),
            scope: None,
        }
    }

    #[test]
    fn init_advances_status_monotonically() {
        ReducerTest::new(AuthReducer)
            .given_state(AuthState::default())
            .when_action(AuthAction::Init)
            .then_state(|state| {
                assert_eq!(state.status, ModuleStatus::Initializing);
            })
            .run();

        // Once ready, a stray Init never regresses the status.
        ReducerTest::new(AuthReducer)
            .given_state(AuthState::default())
            .when_actions([
                AuthAction::Init,
                AuthAction::InitSuccess {
                    logged_in: false,
                    token: None,
                },
                AuthAction::Init,
            ])
            .then_state(|state| {
                assert_eq!(state.status, ModuleStatus::Ready);
            })
            .run();
    }

    #[test]
    fn init_success_restores_session() {
        ReducerTest::new(AuthReducer)
            .given_state(AuthState::default())
            .when_actions([
                AuthAction::Init,
                AuthAction::InitSuccess {
                    logged_in: true,
                    token: Some(token("100")),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.status, ModuleStatus::Ready);
                assert_eq!(state.login_status, LoginStatus::LoggedIn);
                assert_eq!(state.owner_id.as_deref(), Some("100"));
                // Restored, not interactive.
                assert!(!state.fresh_login);
            })
            .run();
    }

    #[test]
    fn interactive_login_is_fresh() {
        ReducerTest::new(AuthReducer)
            .given_state(AuthState::default())
            .when_actions([
                AuthAction::Login,
                AuthAction::LoginSuccess { token: token("7") },
            ])
            .then_state(|state| {
                assert_eq!(state.login_status, LoginStatus::LoggedIn);
                assert!(state.fresh_login);
            })
            .run();
    }

    #[test]
    fn login_error_clears_session() {
        ReducerTest::new(AuthReducer)
            .given_state(AuthState::default())
            .when_actions([
                AuthAction::Login,
                AuthAction::LoginError {
                    error: Some("invalid_grant".into()),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.login_status, LoginStatus::LoggedOut);
                assert!(state.token.is_none());
                assert!(!state.fresh_login);
                assert_eq!(state.last_error.as_deref(), Some("invalid_grant"));
            })
            .run();
    }

    #[test]
    fn cancelled_logout_keeps_session() {
        ReducerTest::new(AuthReducer)
            .given_state(AuthState::default())
            .when_actions([
                AuthAction::Login,
                AuthAction::LoginSuccess { token: token("7") },
                AuthAction::BeforeLogout,
                AuthAction::CancelLogout,
            ])
            .then_state(|state| {
                assert_eq!(state.login_status, LoginStatus::LoggedIn);
                assert!(state.token.is_some());
                assert!(!state.pending_logout);
            })
            .run();
    }

    #[test]
    fn logout_outcomes_both_terminate_session() {
        for outcome in [
            AuthAction::LogoutSuccess,
            AuthAction::LogoutError {
                error: Some("http 500".into()),
            },
        ] {
            ReducerTest::new(AuthReducer)
                .given_state(AuthState::default())
                .when_actions([
                    AuthAction::LoginSuccess { token: token("7") },
                    AuthAction::BeforeLogout,
                    AuthAction::Logout,
                    outcome,
                ])
                .then_state(|state| {
                    assert_eq!(state.login_status, LoginStatus::LoggedOut);
                    assert!(state.token.is_none());
                    assert!(state.owner_id.is_none());
                    assert!(!state.pending_logout);
                })
                .run();
        }
    }

    #[test]
    fn recoverable_refresh_error_changes_nothing_but_last_error() {
        ReducerTest::new(AuthReducer)
            .given_state(AuthState::default())
            .when_actions([
                AuthAction::LoginSuccess { token: token("7") },
                AuthAction::RefreshError {
                    error: "timeout".into(),
                    refresh_token_valid: true,
                },
            ])
            .then_state(|state| {
                assert_eq!(state.login_status, LoginStatus::LoggedIn);
                assert!(state.token.is_some());
                assert_eq!(state.last_error.as_deref(), Some("timeout"));
            })
            .run();
    }

    #[test]
    fn unrecoverable_refresh_error_expires_session() {
        ReducerTest::new(AuthReducer)
            .given_state(AuthState::default())
            .when_actions([
                AuthAction::LoginSuccess { token: token("7") },
                AuthAction::RefreshError {
                    error: "invalid_grant".into(),
                    refresh_token_valid: false,
                },
            ])
            .then_state(|state| {
                assert_eq!(state.login_status, LoginStatus::LoggedOut);
                assert!(state.token.is_none());
                assert!(state.owner_id.is_none());
            })
            .run();
    }

    #[test]
    fn refresh_success_is_not_a_fresh_login() {
        ReducerTest::new(AuthReducer)
            .given_state(AuthState::default())
            .when_actions([
                AuthAction::Login,
                AuthAction::LoginSuccess { token: token("7") },
                AuthAction::RefreshSuccess { token: token("7") },
            ])
            .then_state(|state| {
                assert_eq!(state.login_status, LoginStatus::LoggedIn);
                assert!(!state.fresh_login);
            })
            .run();
    }
}
