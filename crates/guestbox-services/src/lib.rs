//! Guestbox Services Layer
//!
//! Outbound notification delivery: the `Messenger` abstraction the submission
//! pipeline talks to, plus an HTTP gateway backend and a log-only backend for
//! development.

pub mod messaging;

#[cfg(feature = "messaging-http")]
pub use messaging::HttpMessenger;
pub use messaging::{create_messenger, LogMessenger, Messenger, MessagingError, MessagingResult};
