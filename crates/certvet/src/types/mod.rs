//! Core types for certificate validation.

pub mod cert;
pub mod rules;
pub mod verdict;

pub use cert::{CertificateRecord, CipherInfo, SourceKind};
pub use rules::{ExpirationRule, OcspRule, RuleConfig, TlsRule};
pub use verdict::{OcspStatus, Severity, Status, Verdict};
