//! Validation orchestration.
//!
//! The [`Validator`] ties the pipeline together per location: classify,
//! acquire, extract, query revocation, apply rules. Its external
//! contract is "always returns a [`Verdict`], never fails" — every
//! error from the I/O boundaries is folded into the verdict it belongs
//! to, so one bad location never hides the others.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::extract::{
    extract_dates, extract_identity, ocsp_responder_url, parse_certificate, serial_number,
};
use crate::location::Location;
use crate::ocsp::{HttpOcspChecker, RevocationChecker};
use crate::rules::{apply_rules, OcspOutcome};
use crate::source;
use crate::types::{RuleConfig, Verdict};

/// Default per-connection timeout for network acquisition.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Validates locations under one rule configuration.
pub struct Validator {
    config: RuleConfig,
    timeout: Duration,
    checker: Arc<dyn RevocationChecker>,
}

impl Validator {
    /// Create a validator with the HTTP OCSP checker and default timeout.
    #[must_use]
    pub fn new(config: RuleConfig) -> Self {
        Self {
            config,
            timeout: DEFAULT_TIMEOUT,
            checker: Arc::new(HttpOcspChecker::new()),
        }
    }

    /// Override the per-connection timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Swap the revocation capability (the seam tests mock).
    #[must_use]
    pub fn with_revocation_checker(mut self, checker: Arc<dyn RevocationChecker>) -> Self {
        self.checker = checker;
        self
    }

    /// Validate a single location. Always returns a verdict.
    pub async fn validate(&self, location: &str) -> Verdict {
        let classified = Location::classify(location);
        debug!(location, kind = ?classified, "validating");

        let record = match source::acquire(&classified, self.timeout).await {
            Ok(record) => record,
            Err(e) => return Verdict::failure(location, e.to_string()),
        };

        let cert = match parse_certificate(&record.leaf_der, location) {
            Ok(cert) => cert,
            Err(e) => return Verdict::failure(location, e.to_string()),
        };

        let dates = extract_dates(&cert);
        let identity = extract_identity(&cert);
        let responder_url = ocsp_responder_url(&cert);

        let mut verdict = Verdict::passing(location);
        verdict.cname = identity.cname.clone();
        verdict.issuer = identity.issuer.clone();
        verdict.days_remaining = dates.days_remaining;
        verdict.valid_from = Some(dates.valid_from);
        verdict.valid_to = Some(dates.valid_to);
        verdict.serial_number = Some(serial_number(&cert));
        verdict.cipher = record.cipher.clone();

        // The query only runs when the rule is enabled and the
        // certificate names a responder; its outcome is data either way.
        let ocsp_outcome: OcspOutcome = match responder_url {
            Some(url) if self.config.ocsp.enabled => Some(
                self.checker
                    .check(&record.leaf_der, record.issuer_der.as_deref(), &url)
                    .await,
            ),
            _ => None,
        };

        apply_rules(&mut verdict, &record, &identity, &self.config, ocsp_outcome);
        verdict.checked = Utc::now();
        verdict
    }

    /// Validate every location concurrently.
    ///
    /// One independent task per location; results come back in input
    /// order regardless of completion order. The batch itself cannot
    /// fail because `validate` cannot.
    pub async fn validate_all(&self, locations: &[String]) -> Vec<Verdict> {
        let futures: Vec<_> = locations.iter().map(|l| self.validate(l)).collect();
        futures_util::future::join_all(futures).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::OcspError;
    use crate::types::{OcspStatus, Status};

    /// Counts queries; answers with a fixed outcome.
    struct FixedChecker {
        calls: AtomicUsize,
        status: OcspStatus,
    }

    impl FixedChecker {
        fn new(status: OcspStatus) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                status,
            }
        }
    }

    #[async_trait]
    impl RevocationChecker for FixedChecker {
        async fn check(
            &self,
            _leaf_der: &[u8],
            _issuer_der: Option<&[u8]>,
            _responder_url: &str,
        ) -> Result<OcspStatus, OcspError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.status)
        }
    }

    fn write_cert_file(cn: &str, not_after_days: i64) -> tempfile::NamedTempFile {
        let key = rcgen::KeyPair::generate().unwrap();
        let mut params = rcgen::CertificateParams::new(vec![cn.to_string()]).unwrap();
        params.distinguished_name = rcgen::DistinguishedName::new();
        params
            .distinguished_name
            .push(rcgen::DnType::CommonName, cn);
        params.not_before = time::OffsetDateTime::now_utc() - time::Duration::days(1);
        params.not_after = time::OffsetDateTime::now_utc() + time::Duration::days(not_after_days);
        let pem = params.self_signed(&key).unwrap().pem();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(pem.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn missing_file_becomes_failure_verdict() {
        let verdict = Validator::new(RuleConfig::default())
            .validate("/nonexistent/site.pem")
            .await;
        assert!(!verdict.valid);
        assert_eq!(verdict.status, Status::Invalid);
        assert_eq!(verdict.errors.len(), 1);
        assert!(verdict.errors[0].contains("not found"));
        assert_eq!(verdict.cname, None);
        assert_eq!(verdict.location, "/nonexistent/site.pem");
    }

    #[tokio::test]
    async fn valid_file_cert_produces_ok_verdict() {
        let file = write_cert_file("example.com", 90);
        let location = file.path().display().to_string();

        let verdict = Validator::new(RuleConfig::default()).validate(&location).await;
        assert!(verdict.valid);
        assert_eq!(verdict.status, Status::Ok);
        assert_eq!(verdict.cname.as_deref(), Some("example.com"));
        assert_eq!(verdict.issuer.as_deref(), Some("example.com"));
        assert!(verdict.days_remaining > 14);
        assert!(verdict.valid_from.is_some());
        assert!(verdict.valid_to.is_some());
        assert!(verdict.serial_number.is_some());
        assert!(verdict.cipher.is_none());
        assert!(verdict.ocsp.is_none());
    }

    #[tokio::test]
    async fn expiring_file_cert_warns() {
        let file = write_cert_file("example.com", 5);
        let location = file.path().display().to_string();

        let verdict = Validator::new(RuleConfig::default()).validate(&location).await;
        assert!(verdict.valid);
        assert_eq!(verdict.status, Status::Warning);
        assert!(verdict.warnings[0].contains("expires in"));
    }

    #[tokio::test]
    async fn repeated_validation_is_stable() {
        let file = write_cert_file("example.com", 90);
        let location = file.path().display().to_string();
        let validator = Validator::new(RuleConfig::default());

        let first = validator.validate(&location).await;
        let second = validator.validate(&location).await;
        assert_eq!(first.cname, second.cname);
        assert_eq!(first.issuer, second.issuer);
        assert_eq!(first.valid_from, second.valid_from);
        assert_eq!(first.valid_to, second.valid_to);
        assert_eq!(first.errors, second.errors);
        assert_eq!(first.warnings, second.warnings);
    }

    #[tokio::test]
    async fn checker_not_queried_without_responder_url() {
        let file = write_cert_file("example.com", 90);
        let location = file.path().display().to_string();

        let checker = Arc::new(FixedChecker::new(OcspStatus::Good));
        let verdict = Validator::new(RuleConfig::default())
            .with_revocation_checker(checker.clone())
            .validate(&location)
            .await;

        // Self-signed test cert carries no AIA extension.
        assert_eq!(checker.calls.load(Ordering::SeqCst), 0);
        assert!(verdict.ocsp.is_none());
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let good = write_cert_file("a.example.com", 90);
        let locations = vec![
            "/nonexistent/one.pem".to_string(),
            good.path().display().to_string(),
            "/nonexistent/two.pem".to_string(),
        ];

        let verdicts = Validator::new(RuleConfig::default())
            .validate_all(&locations)
            .await;

        assert_eq!(verdicts.len(), 3);
        assert_eq!(verdicts[0].location, locations[0]);
        assert_eq!(verdicts[1].location, locations[1]);
        assert_eq!(verdicts[2].location, locations[2]);
        assert!(!verdicts[0].valid);
        assert!(verdicts[1].valid);
        assert!(!verdicts[2].valid);
    }

    #[tokio::test]
    async fn batch_of_one_per_input() {
        let locations: Vec<String> = (0..8)
            .map(|i| format!("/nonexistent/{i}.pem"))
            .collect();
        let verdicts = Validator::new(RuleConfig::default())
            .validate_all(&locations)
            .await;
        assert_eq!(verdicts.len(), locations.len());
        for (verdict, location) in verdicts.iter().zip(&locations) {
            assert_eq!(&verdict.location, location);
            assert_eq!(verdict.valid, verdict.errors.is_empty());
        }
    }
}
