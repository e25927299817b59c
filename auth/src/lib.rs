//! Session coordination for the softphone engine.
//!
//! This crate owns the authentication lifecycle: a typed session state
//! machine driven through [`softphone_core::store::Store`], a coordinator
//! that binds the vendor platform's auth events to that state, a
//! cancellable before-logout hook chain, and the proxy-channel OAuth
//! redirect flow.
//!
//! # Architecture
//!
//! - [`state`] / [`actions`] / [`reducer`]: the session state machine.
//!   Every transition is an [`actions::AuthAction`] applied atomically.
//! - [`coordinator`]: the [`coordinator::AuthCoordinator`] facade. Owns
//!   the store, subscribes to platform events, and exposes the
//!   login/logout API.
//! - [`providers`]: trait contracts for the injected collaborators
//!   (platform client, alert sink, locale source, proxy channel host).
//! - [`proxy`]: lifecycle of the isolated callback-capture channel.
//!
//! # Example
//!
//! ```
//! use softphone_auth::config::{AuthConfig, BrandConfig};
//! use softphone_auth::coordinator::AuthCoordinator;
//! use softphone_auth::mocks::{
//!     MockAlertSink, MockChannelHost, MockLocaleSource, MockPlatformClient,
//! };
//! use softphone_auth::state::LoginStatus;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = AuthConfig::new(BrandConfig::new("1210", "Acme"));
//! let coordinator = AuthCoordinator::new(
//!     MockPlatformClient::new(),
//!     MockAlertSink::new(),
//!     MockLocaleSource::ready("en-US"),
//!     MockChannelHost::new(),
//!     config,
//! );
//! coordinator.initialize();
//! assert_eq!(coordinator.login_status(), LoginStatus::Unknown);
//! # }
//! ```

pub mod actions;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod messages;
pub mod providers;
pub mod proxy;
pub mod reducer;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use actions::AuthAction;
pub use config::{AuthConfig, BrandConfig, LoginCredentials, LoginUrlOptions};
pub use coordinator::{AuthCoordinator, BeforeLogoutRegistration, HandlerId};
pub use error::{AuthError, Result};
pub use messages::AuthMessage;
pub use reducer::AuthReducer;
pub use state::{AuthState, LoginStatus, ModuleStatus, TokenData};
