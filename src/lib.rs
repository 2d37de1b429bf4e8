//! course_platform Library
//!
//! Re-exports modules for integration testing and external use.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod notification;
pub mod store;

mod error;

pub use config::Config;
pub use domain::{DomainError, OperationContext};
pub use error::{AppError, AppResult};
pub use store::{InMemoryStore, PgStore, SharedStore};

use domain::{CertificateNumberSource, DigestNumberSource};
use handlers::{CertificateHandler, CompletionHandler, DEFAULT_MINT_ATTEMPTS};

/// Shared state of the HTTP layer
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    numbers: Arc<dyn CertificateNumberSource>,
    mint_attempts: u32,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            numbers: Arc::new(DigestNumberSource::default()),
            mint_attempts: DEFAULT_MINT_ATTEMPTS,
        }
    }

    /// State with the certificate settings from configuration
    pub fn from_config(store: SharedStore, config: &Config) -> Self {
        Self {
            store,
            numbers: Arc::new(DigestNumberSource::new(config.certificate_prefix.clone())),
            mint_attempts: config.certificate_mint_attempts,
        }
    }

    pub fn with_number_source(mut self, numbers: Arc<dyn CertificateNumberSource>) -> Self {
        self.numbers = numbers;
        self
    }

    pub fn certificates(&self) -> CertificateHandler {
        CertificateHandler::new(self.store.clone())
            .with_number_source(self.numbers.clone())
            .with_max_attempts(self.mint_attempts)
    }

    pub fn completions(&self) -> CompletionHandler {
        CompletionHandler::new(self.store.clone()).with_certificates(self.certificates())
    }
}
