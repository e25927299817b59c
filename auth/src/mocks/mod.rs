//! Mock providers for tests.
//!
//! Every coordinator collaborator has a scriptable in-memory double here.
//! The mocks are cheap to clone (clones share state) so a test can keep a
//! handle for assertions after handing one to the coordinator.

mod alert;
mod channel;
mod locale;
mod platform;

pub use alert::MockAlertSink;
pub use channel::{MockChannelHost, MockProxyChannel};
pub use locale::MockLocaleSource;
pub use platform::MockPlatformClient;
