//! Acquired certificate material and transport metadata.

use serde::{Deserialize, Serialize};

/// Where a certificate was acquired from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Local certificate file
    File,
    /// Live TLS handshake with a host
    Host,
}

/// Negotiated transport parameters from a TLS handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherInfo {
    /// Protocol version, e.g. `TLSv1.3`
    pub protocol: String,
    /// Negotiated cipher suite name
    pub name: String,
}

/// The result of acquiring a certificate from one location.
///
/// Host-specific fields (`hostname`, `cipher`, `chain_trusted`,
/// `chain_error`, `issuer_der`) are `None` for `kind == File`.
/// `chain_error` is present iff `chain_trusted` is `Some(false)`.
#[derive(Debug, Clone)]
pub struct CertificateRecord {
    /// Which adapter produced this record
    pub kind: SourceKind,
    /// DER encoding of the leaf certificate
    pub leaf_der: Vec<u8>,
    /// DER of the next certificate in the presented chain, when any
    pub issuer_der: Option<Vec<u8>>,
    /// Hostname the handshake was performed against
    pub hostname: Option<String>,
    /// Negotiated protocol and cipher
    pub cipher: Option<CipherInfo>,
    /// Transport-layer trust verdict over the presented chain
    pub chain_trusted: Option<bool>,
    /// Trust failure message, present iff the chain was not trusted
    pub chain_error: Option<String>,
}

impl CertificateRecord {
    /// Build a file-kind record from leaf DER bytes.
    #[must_use]
    pub fn from_file(leaf_der: Vec<u8>) -> Self {
        Self {
            kind: SourceKind::File,
            leaf_der,
            issuer_der: None,
            hostname: None,
            cipher: None,
            chain_trusted: None,
            chain_error: None,
        }
    }
}
