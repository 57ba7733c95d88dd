use thiserror::Error;

/// Errors raised while acquiring a certificate from a location.
///
/// Every variant is recovered by the aggregator into a per-location
/// error message; none of them abort a batch.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Certificate file does not exist or cannot be read
    #[error("certificate file not found: {path}")]
    NotFound {
        /// Path that was requested
        path: String,
    },

    /// Bytes did not decode as a certificate
    #[error("failed to parse certificate from {source_name}: {reason}")]
    ParseFailure {
        /// File path or hostname the bytes came from
        source_name: String,
        /// Decoder error text
        reason: String,
    },

    /// Hostname did not resolve
    #[error("DNS resolution failed for {host}: {reason}")]
    Dns {
        /// Host that failed to resolve
        host: String,
        /// Resolver error text
        reason: String,
    },

    /// TCP connection could not be established
    #[error("connection to {host}:{port} failed: {reason}")]
    ConnectionFailed {
        /// Target host
        host: String,
        /// Target port
        port: u16,
        /// Socket error text
        reason: String,
    },

    /// TLS handshake failed before a certificate was presented
    #[error("TLS handshake with {host} failed: {reason}")]
    Tls {
        /// Target host
        host: String,
        /// Handshake error text
        reason: String,
    },

    /// No response within the adapter's fixed timeout
    #[error("no response from {host}:{port} within {secs} seconds")]
    Timeout {
        /// Target host
        host: String,
        /// Target port
        port: u16,
        /// Timeout that elapsed
        secs: u64,
    },
}

/// Errors raised while querying an OCSP responder.
///
/// A query failure is reported at the configured failure level; it
/// never invalidates a certificate on its own.
#[derive(Error, Debug)]
pub enum OcspError {
    /// The issuer certificate needed to build the request is unavailable
    #[error("issuer certificate unavailable, cannot build OCSP request")]
    MissingIssuer,

    /// OCSP request could not be DER-encoded
    #[error("failed to encode OCSP request: {0}")]
    Encode(String),

    /// HTTP exchange with the responder failed
    #[error("OCSP responder request failed: {0}")]
    Http(String),

    /// Responder returned bytes that did not decode as an OCSP response
    #[error("failed to decode OCSP response: {0}")]
    Decode(String),

    /// Responder answered with a non-successful protocol status
    #[error("OCSP responder refused the request: {0}")]
    Responder(String),
}
