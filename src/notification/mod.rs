//! Notification module
//!
//! Best-effort delivery of user-directed messages. A failing sink never
//! fails the operation that triggered the message.

mod service;

pub use service::Notifier;
