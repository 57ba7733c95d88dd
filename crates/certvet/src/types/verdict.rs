//! Per-location validation verdict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cert::CipherInfo;

/// Overall health of a validated location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No errors, no warnings
    Ok,
    /// Valid but with at least one warning
    Warning,
    /// At least one error
    Invalid,
}

/// Severity a rule annotates its findings at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Forces the verdict invalid
    Error,
    /// Reported, does not affect validity
    Warning,
    /// Informational note
    Info,
}

/// Revocation state reported by an OCSP responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcspStatus {
    /// Responder vouches for the certificate
    Good,
    /// Certificate has been revoked
    Revoked,
    /// Responder does not know the certificate
    Unknown,
}

/// The structured outcome of validating one location.
///
/// Invariants: `valid == false` iff `errors` is non-empty, and `status`
/// is derived purely from `(valid, warnings)` by [`Verdict::finalize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Echo of the input location string
    pub location: String,
    /// False iff any error finding was recorded
    pub valid: bool,
    /// Derived overall status
    pub status: Status,
    /// Common name from the subject DN, if present
    pub cname: Option<String>,
    /// Issuer common name, if present
    pub issuer: Option<String>,
    /// Whole days until expiry; negative once expired
    pub days_remaining: i64,
    /// Certificate not-before instant
    pub valid_from: Option<DateTime<Utc>>,
    /// Certificate not-after instant
    pub valid_to: Option<DateTime<Utc>>,
    /// Negotiated cipher/protocol (host locations only)
    pub cipher: Option<CipherInfo>,
    /// OCSP responder result, when a query completed
    pub ocsp: Option<OcspStatus>,
    /// Certificate serial number (hex)
    pub serial_number: Option<String>,
    /// Error findings, in evaluation order
    pub errors: Vec<String>,
    /// Warning findings, in evaluation order
    pub warnings: Vec<String>,
    /// Informational findings, in evaluation order
    pub info: Vec<String>,
    /// When this verdict was evaluated
    pub checked: DateTime<Utc>,
}

impl Verdict {
    /// A provisional passing verdict with empty finding lists.
    #[must_use]
    pub fn passing(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            valid: true,
            status: Status::Ok,
            cname: None,
            issuer: None,
            days_remaining: 0,
            valid_from: None,
            valid_to: None,
            cipher: None,
            ocsp: None,
            serial_number: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
            checked: Utc::now(),
        }
    }

    /// A failure verdict carrying `message` as its sole error, with all
    /// other fields at defaults. Used when acquisition fails outright.
    #[must_use]
    pub fn failure(location: impl Into<String>, message: impl Into<String>) -> Self {
        let mut verdict = Self::passing(location);
        verdict.annotate(Severity::Error, message);
        verdict.finalize();
        verdict
    }

    /// Record a finding at the given severity.
    ///
    /// `Error` flips `valid` to false and appends to `errors`; `Warning`
    /// and `Info` append to their lists without touching validity.
    pub fn annotate(&mut self, level: Severity, message: impl Into<String>) {
        match level {
            Severity::Error => {
                self.valid = false;
                self.errors.push(message.into());
            }
            Severity::Warning => self.warnings.push(message.into()),
            Severity::Info => self.info.push(message.into()),
        }
    }

    /// Derive `status` from the current `valid` flag and warning list.
    pub fn finalize(&mut self) {
        self.status = if !self.valid {
            Status::Invalid
        } else if self.warnings.is_empty() {
            Status::Ok
        } else {
            Status::Warning
        };
    }
}
