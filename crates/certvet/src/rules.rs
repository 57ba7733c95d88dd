//! Policy rule evaluation.
//!
//! Rules run sequentially in a fixed order and annotate the verdict at
//! their configured severity. The OCSP network query happens in the
//! aggregator; this module only interprets its outcome, which keeps
//! every rule a pure function over data.

use crate::error::OcspError;
use crate::extract::Identity;
use crate::types::{
    CertificateRecord, OcspStatus, RuleConfig, Severity, SourceKind, Verdict,
};

/// Protocol floor for the TLS-version rule.
const CURRENT_TLS_VERSION: &str = "TLSv1.3";

/// Outcome of the aggregator's OCSP query, when one was attempted.
pub type OcspOutcome = Option<Result<OcspStatus, OcspError>>;

/// Apply the configured rules to a provisional verdict.
///
/// Order matters: transport trust and identity are unconditional and
/// run first; expiration and TLS-version only run while the verdict is
/// still valid.
pub fn apply_rules(
    verdict: &mut Verdict,
    record: &CertificateRecord,
    identity: &Identity,
    config: &RuleConfig,
    ocsp_outcome: OcspOutcome,
) {
    // 1. Transport trust. Not gated by configuration: an untrusted
    //    chain is a structural failure, not a policy choice.
    if record.kind == SourceKind::Host && record.chain_trusted == Some(false) {
        let message = record
            .chain_error
            .clone()
            .unwrap_or_else(|| "certificate chain is not trusted".to_string());
        verdict.annotate(Severity::Error, message);
    }

    // 2. Identity. Structural errors are always fatal.
    for error in &identity.errors {
        verdict.annotate(Severity::Error, error.clone());
    }

    // 3. OCSP outcome, at the configured severities.
    match ocsp_outcome {
        Some(Ok(status)) => {
            verdict.ocsp = Some(status);
            match status {
                OcspStatus::Good => {}
                OcspStatus::Revoked => {
                    verdict.annotate(config.ocsp.level, "certificate revoked (OCSP)");
                }
                OcspStatus::Unknown => verdict.annotate(
                    config.ocsp.failure_level,
                    "OCSP responder does not know this certificate",
                ),
            }
        }
        Some(Err(e)) => {
            // A failed query is never fatal by itself.
            verdict.annotate(config.ocsp.failure_level, format!("OCSP check failed: {e}"));
        }
        None => {}
    }

    // 4. Expiration threshold, only while still valid. Fires for
    //    negative day counts too: an already-expired certificate stays
    //    at the configured level rather than being forced invalid.
    if config.expiration.enabled
        && verdict.valid
        && verdict.days_remaining <= config.expiration.days
    {
        let message = if verdict.days_remaining < 0 {
            format!(
                "certificate expired {} days ago",
                -verdict.days_remaining
            )
        } else {
            format!("certificate expires in {} days", verdict.days_remaining)
        };
        verdict.annotate(config.expiration.level, message);
    }

    // 5. TLS version floor, host kind only, only while still valid.
    if config.tls.enabled && verdict.valid && record.kind == SourceKind::Host {
        if let Some(cipher) = &record.cipher {
            if cipher.protocol != CURRENT_TLS_VERSION {
                verdict.annotate(
                    config.tls.level,
                    format!(
                        "connection negotiated {}, below {}",
                        cipher.protocol, CURRENT_TLS_VERSION
                    ),
                );
            }
        }
    }

    verdict.finalize();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CipherInfo, Status};

    fn host_record(chain_trusted: bool, protocol: &str) -> CertificateRecord {
        CertificateRecord {
            kind: SourceKind::Host,
            leaf_der: vec![0x30],
            issuer_der: None,
            hostname: Some("example.com".to_string()),
            cipher: Some(CipherInfo {
                protocol: protocol.to_string(),
                name: "TLS13_AES_128_GCM_SHA256".to_string(),
            }),
            chain_trusted: Some(chain_trusted),
            chain_error: if chain_trusted {
                None
            } else {
                Some("invalid peer certificate: UnknownIssuer".to_string())
            },
        }
    }

    fn file_record() -> CertificateRecord {
        CertificateRecord::from_file(vec![0x30])
    }

    fn clean_identity() -> Identity {
        Identity {
            cname: Some("example.com".to_string()),
            issuer: Some("Example CA".to_string()),
            errors: Vec::new(),
        }
    }

    fn fresh_verdict(days_remaining: i64) -> Verdict {
        let mut v = Verdict::passing("example.com");
        v.days_remaining = days_remaining;
        v
    }

    #[test]
    fn untrusted_chain_is_invalid_with_transport_message() {
        let mut v = fresh_verdict(90);
        apply_rules(
            &mut v,
            &host_record(false, "TLSv1.3"),
            &clean_identity(),
            &RuleConfig::default(),
            None,
        );
        assert!(!v.valid);
        assert_eq!(v.status, Status::Invalid);
        assert!(v.errors[0].contains("UnknownIssuer"));
    }

    #[test]
    fn identity_errors_force_invalid() {
        let mut v = fresh_verdict(90);
        let identity = Identity {
            cname: None,
            issuer: None,
            errors: vec!["missing common name".to_string()],
        };
        apply_rules(
            &mut v,
            &file_record(),
            &identity,
            &RuleConfig::default(),
            None,
        );
        assert!(!v.valid);
        assert_eq!(v.errors, vec!["missing common name".to_string()]);
    }

    #[test]
    fn revoked_certificate_is_invalid_with_ocsp_populated() {
        let mut v = fresh_verdict(90);
        apply_rules(
            &mut v,
            &host_record(true, "TLSv1.3"),
            &clean_identity(),
            &RuleConfig::default(),
            Some(Ok(OcspStatus::Revoked)),
        );
        assert!(!v.valid);
        assert_eq!(v.ocsp, Some(OcspStatus::Revoked));
        assert!(v.errors[0].contains("revoked"));
    }

    #[test]
    fn ocsp_query_failure_never_invalidates() {
        let mut v = fresh_verdict(90);
        apply_rules(
            &mut v,
            &host_record(true, "TLSv1.3"),
            &clean_identity(),
            &RuleConfig::default(),
            Some(Err(OcspError::Http("connection refused".to_string()))),
        );
        assert!(v.valid);
        assert_eq!(v.status, Status::Ok);
        assert_eq!(v.info.len(), 1);
        assert!(v.info[0].contains("connection refused"));
    }

    #[test]
    fn ocsp_good_leaves_no_findings() {
        let mut v = fresh_verdict(90);
        apply_rules(
            &mut v,
            &host_record(true, "TLSv1.3"),
            &clean_identity(),
            &RuleConfig::default(),
            Some(Ok(OcspStatus::Good)),
        );
        assert!(v.valid);
        assert_eq!(v.ocsp, Some(OcspStatus::Good));
        assert_eq!(v.status, Status::Ok);
    }

    #[test]
    fn expiring_soon_warns_but_stays_valid() {
        let mut v = fresh_verdict(7);
        apply_rules(
            &mut v,
            &file_record(),
            &clean_identity(),
            &RuleConfig::default(),
            None,
        );
        assert!(v.valid);
        assert_eq!(v.status, Status::Warning);
        assert!(v.warnings[0].contains("expires in 7 days"));
    }

    #[test]
    fn already_expired_warns_without_invalidating() {
        let mut v = fresh_verdict(-3);
        apply_rules(
            &mut v,
            &file_record(),
            &clean_identity(),
            &RuleConfig::default(),
            None,
        );
        assert!(v.valid);
        assert_eq!(v.status, Status::Warning);
        assert!(v.warnings[0].contains("expired 3 days ago"));
    }

    #[test]
    fn expiration_skipped_once_invalid() {
        let mut v = fresh_verdict(-3);
        apply_rules(
            &mut v,
            &host_record(false, "TLSv1.3"),
            &clean_identity(),
            &RuleConfig::default(),
            None,
        );
        assert!(!v.valid);
        assert!(v.warnings.is_empty());
    }

    #[test]
    fn old_protocol_warns_without_invalidating() {
        let mut v = fresh_verdict(90);
        apply_rules(
            &mut v,
            &host_record(true, "TLSv1.2"),
            &clean_identity(),
            &RuleConfig::default(),
            None,
        );
        assert!(v.valid);
        assert_eq!(v.status, Status::Warning);
        assert!(v.warnings[0].contains("TLSv1.2"));
    }

    #[test]
    fn tls_rule_ignores_file_records() {
        let mut v = fresh_verdict(90);
        apply_rules(
            &mut v,
            &file_record(),
            &clean_identity(),
            &RuleConfig::default(),
            None,
        );
        assert!(v.warnings.is_empty());
    }

    #[test]
    fn disabled_rules_do_not_fire() {
        let mut config = RuleConfig::default();
        config.expiration.enabled = false;
        config.tls.enabled = false;

        let mut v = fresh_verdict(-10);
        apply_rules(
            &mut v,
            &host_record(true, "TLSv1.0"),
            &clean_identity(),
            &config,
            None,
        );
        assert!(v.valid);
        assert_eq!(v.status, Status::Ok);
    }

    #[test]
    fn ocsp_level_override_downgrades_revocation() {
        let mut config = RuleConfig::default();
        config.ocsp.level = Severity::Warning;

        let mut v = fresh_verdict(90);
        apply_rules(
            &mut v,
            &host_record(true, "TLSv1.3"),
            &clean_identity(),
            &config,
            Some(Ok(OcspStatus::Revoked)),
        );
        assert!(v.valid);
        assert_eq!(v.status, Status::Warning);
    }
}
