//! Certificates
//!
//! Certificate records and certificate number generation.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Certificate lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    Pending,
    Issued,
    Revoked,
}

impl From<String> for CertificateStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "issued" => CertificateStatus::Issued,
            "revoked" => CertificateStatus::Revoked,
            _ => CertificateStatus::Pending,
        }
    }
}

impl std::fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CertificateStatus::Pending => write!(f, "pending"),
            CertificateStatus::Issued => write!(f, "issued"),
            CertificateStatus::Revoked => write!(f, "revoked"),
        }
    }
}

/// Certificate of completion. Unique per (user, course).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    /// Globally unique
    pub certificate_number: String,
    pub status: CertificateStatus,
    pub issued_at: DateTime<Utc>,
}

impl Certificate {
    /// New certificate in `issued` status
    pub fn issue(
        user_id: Uuid,
        course_id: Uuid,
        certificate_number: String,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            certificate_number,
            status: CertificateStatus::Issued,
            issued_at,
        }
    }

    /// Counts toward prerequisites
    pub fn is_valid(&self) -> bool {
        self.status != CertificateStatus::Revoked
    }
}

/// Source of candidate certificate numbers.
///
/// Candidates only need to be unique with overwhelming probability; the
/// store's uniqueness constraint is the final check.
pub trait CertificateNumberSource: Send + Sync {
    fn generate(&self, user_id: Uuid, course_id: Uuid, minted_at: DateTime<Utc>) -> String;
}

/// Default number source: `PREFIX-` followed by 20 upper-case hex digits of
/// SHA-256 over user, course, mint time and a random nonce.
#[derive(Debug, Clone)]
pub struct DigestNumberSource {
    prefix: String,
}

impl DigestNumberSource {
    const DIGEST_CHARS: usize = 20;

    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for DigestNumberSource {
    fn default() -> Self {
        Self::new("CERT")
    }
}

impl CertificateNumberSource for DigestNumberSource {
    fn generate(&self, user_id: Uuid, course_id: Uuid, minted_at: DateTime<Utc>) -> String {
        let mut nonce = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce);

        let mut hasher = Sha256::new();
        hasher.update(user_id.as_bytes());
        hasher.update(course_id.as_bytes());
        hasher.update(minted_at.timestamp_micros().to_be_bytes());
        hasher.update(nonce);
        let digest = hex::encode_upper(hasher.finalize());

        format!("{}-{}", self.prefix, &digest[..Self::DIGEST_CHARS])
    }
}
