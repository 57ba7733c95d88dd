//! Field extraction from parsed certificates.
//!
//! Pure functions over an `x509-parser` certificate: validity window
//! metrics, subject/issuer identity, serial number, and the AIA OCSP
//! responder URL. Parse failures are surfaced by [`parse_certificate`];
//! everything downstream is infallible.

use chrono::{DateTime, TimeZone, Utc};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::oid_registry::OID_PKIX_ACCESS_DESCRIPTOR_OCSP;

use crate::error::SourceError;

/// Parse a DER-encoded X.509 certificate.
pub fn parse_certificate<'a>(
    der: &'a [u8],
    source_name: &str,
) -> Result<X509Certificate<'a>, SourceError> {
    let (_, cert) =
        x509_parser::parse_x509_certificate(der).map_err(|e| SourceError::ParseFailure {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })?;
    Ok(cert)
}

/// Remaining-validity metrics computed from the validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertDates {
    /// `floor((not_after - now) / 86400s)`; negative once expired
    pub days_remaining: i64,
    /// Certificate not-before instant
    pub valid_from: DateTime<Utc>,
    /// Certificate not-after instant
    pub valid_to: DateTime<Utc>,
}

/// Compute validity metrics against the current instant.
#[must_use]
pub fn extract_dates(cert: &X509Certificate<'_>) -> CertDates {
    let valid_from = asn1_to_utc(cert.validity().not_before);
    let valid_to = asn1_to_utc(cert.validity().not_after);
    CertDates {
        days_remaining: days_remaining_at(valid_to, Utc::now()),
        valid_from,
        valid_to,
    }
}

/// Whole days between `now` and `not_after`, rounded toward negative
/// infinity so a certificate expired by any amount reports negative.
fn days_remaining_at(not_after: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (not_after - now).num_seconds().div_euclid(86_400)
}

/// Identity fields pulled from the subject and issuer DNs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// Subject common name, when present
    pub cname: Option<String>,
    /// Issuer common name, when present
    pub issuer: Option<String>,
    /// Structural identity errors; any entry makes the verdict invalid
    pub errors: Vec<String>,
}

/// Extract common names from the rendered subject and issuer DNs.
///
/// A missing subject or a subject without a `CN=` component is a
/// structural error. An absent issuer is not an error by itself; only a
/// present-but-unparsable issuer is.
#[must_use]
pub fn extract_identity(cert: &X509Certificate<'_>) -> Identity {
    let mut identity = Identity::default();

    let subject = cert.subject().to_string();
    if subject.is_empty() {
        identity.errors.push("missing subject".to_string());
    } else {
        match cn_from_dn(&subject) {
            Some(cn) => identity.cname = Some(cn.to_string()),
            None => identity.errors.push("missing common name".to_string()),
        }
    }

    let issuer = cert.issuer().to_string();
    if !issuer.is_empty() {
        match cn_from_dn(&issuer) {
            Some(cn) => identity.issuer = Some(cn.to_string()),
            None => identity.errors.push("missing issuer".to_string()),
        }
    }

    identity
}

/// Everything after the last `CN=` token of a rendered DN.
///
/// Distinguished names render with the common name last, so taking the
/// remainder of the string yields the bare name.
#[must_use]
pub fn cn_from_dn(dn: &str) -> Option<&str> {
    dn.rfind("CN=")
        .map(|idx| dn[idx + 3..].trim())
        .filter(|cn| !cn.is_empty())
}

/// Serial number as colon-separated hex.
#[must_use]
pub fn serial_number(cert: &X509Certificate<'_>) -> String {
    cert.raw_serial_as_string()
}

/// OCSP responder URL from the Authority Information Access extension.
///
/// `None` when the certificate carries no AIA extension or no OCSP
/// access method; revocation cannot be queried for such certificates.
#[must_use]
pub fn ocsp_responder_url(cert: &X509Certificate<'_>) -> Option<String> {
    for ext in cert.extensions() {
        if let ParsedExtension::AuthorityInfoAccess(aia) = ext.parsed_extension() {
            for desc in &aia.accessdescs {
                if desc.access_method == OID_PKIX_ACCESS_DESCRIPTOR_OCSP {
                    if let GeneralName::URI(uri) = &desc.access_location {
                        return Some(uri.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Convert an ASN.1 `GeneralizedTime` / `UTCTime` to `DateTime<Utc>`.
fn asn1_to_utc(t: x509_parser::time::ASN1Time) -> DateTime<Utc> {
    let epoch = t.timestamp();
    Utc.timestamp_opt(epoch, 0).single().unwrap_or_else(Utc::now)
}
