//! Command Handlers module
//!
//! Handlers that orchestrate the course workflow over the store.
//! Each handler checks preconditions, performs the writes and emits the
//! resulting notifications.

mod certificate_handler;
mod comment_handler;
mod commands;
mod completion_handler;
mod content_handler;
mod enrollment_handler;
mod submission_handler;


pub use certificate_handler::{CertificateHandler, DEFAULT_MINT_ATTEMPTS};
pub use comment_handler::CommentHandler;
pub use commands::*;
pub use completion_handler::CompletionHandler;
pub use content_handler::ContentHandler;
pub use enrollment_handler::EnrollmentHandler;
pub use submission_handler::SubmissionHandler;
