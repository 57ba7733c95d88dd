//! Validation rule configuration.
//!
//! Explicit per-rule structs with defaults fixed at construction time.
//! Callers override individual fields; absent fields keep their
//! documented defaults when deserialized.

use serde::{Deserialize, Serialize};

use super::verdict::Severity;

/// Days-until-expiry threshold below which the expiration rule fires.
pub const DEFAULT_EXPIRY_DAYS: i64 = 14;

/// Expiration-threshold rule.
///
/// Fires when `days_remaining <= days`, including negative values: an
/// already-expired certificate reports at the same level rather than
/// being forced invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpirationRule {
    /// Whether the rule runs at all
    pub enabled: bool,
    /// Severity of the expiry finding
    pub level: Severity,
    /// Threshold in whole days
    pub days: i64,
}

impl Default for ExpirationRule {
    fn default() -> Self {
        Self {
            enabled: true,
            level: Severity::Warning,
            days: DEFAULT_EXPIRY_DAYS,
        }
    }
}

/// OCSP revocation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcspRule {
    /// Whether revocation is queried at all
    pub enabled: bool,
    /// Severity when the responder reports the certificate revoked
    pub level: Severity,
    /// Severity when the query itself fails or returns unknown
    pub failure_level: Severity,
}

impl Default for OcspRule {
    fn default() -> Self {
        Self {
            enabled: true,
            level: Severity::Error,
            failure_level: Severity::Info,
        }
    }
}

/// Minimum TLS protocol version rule. The floor is TLS 1.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsRule {
    /// Whether the rule runs at all
    pub enabled: bool,
    /// Severity of the downgrade finding
    pub level: Severity,
}

impl Default for TlsRule {
    fn default() -> Self {
        Self {
            enabled: true,
            level: Severity::Warning,
        }
    }
}

/// Complete rule set applied to every location in a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Expiration threshold rule
    pub expiration: ExpirationRule,
    /// OCSP revocation rule
    pub ocsp: OcspRule,
    /// Minimum TLS version rule
    pub tls: TlsRule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_defaults() {
        let cfg = RuleConfig::default();
        assert!(cfg.expiration.enabled);
        assert_eq!(cfg.expiration.level, Severity::Warning);
        assert_eq!(cfg.expiration.days, 14);
        assert!(cfg.ocsp.enabled);
        assert_eq!(cfg.ocsp.level, Severity::Error);
        assert_eq!(cfg.ocsp.failure_level, Severity::Info);
        assert!(cfg.tls.enabled);
        assert_eq!(cfg.tls.level, Severity::Warning);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg: RuleConfig =
            serde_json::from_str(r#"{"expiration":{"days":30},"ocsp":{"enabled":false}}"#)
                .unwrap();
        assert_eq!(cfg.expiration.days, 30);
        assert_eq!(cfg.expiration.level, Severity::Warning);
        assert!(!cfg.ocsp.enabled);
        assert_eq!(cfg.ocsp.failure_level, Severity::Info);
        assert!(cfg.tls.enabled);
    }
}
