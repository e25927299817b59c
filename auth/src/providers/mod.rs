//! Provider traits consumed by the coordinator.
//!
//! All external dependencies are abstracted behind these traits and
//! injected at construction: the platform auth client, the alert sink, the
//! locale source, and the proxy channel host.

pub mod alert;
pub mod channel;
pub mod locale;
pub mod platform;

pub use alert::{Alert, AlertSink, Severity};
pub use channel::{OAuthPageRequest, ProxyChannel, ProxyChannelHost, ProxyMessage};
pub use locale::LocaleSource;
pub use platform::{PlatformAuthClient, PlatformEvent};
