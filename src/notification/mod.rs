//! Notification sinks.
//!
//! Every sink implements [`NotificationSink`](crate::core::NotificationSink):
//! the service layer broadcasts new alerts and publishes dashboard views
//! without knowing which delivery mechanism is listening.
pub mod slack;
pub mod stub;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use slack::SlackSink;
pub use stub::StubSink;
