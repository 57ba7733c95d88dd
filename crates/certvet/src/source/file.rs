//! Local certificate file backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::SourceError;
use crate::extract::parse_certificate;
use crate::types::CertificateRecord;

use super::CertificateSource;

/// Reads a certificate from a PEM or DER file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CertificateSource for FileSource {
    async fn acquire(&self) -> Result<CertificateRecord, SourceError> {
        let path_str = self.path.display().to_string();
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound {
                    path: path_str.clone(),
                }
            } else {
                SourceError::ParseFailure {
                    source_name: path_str.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let leaf_der = decode_leaf(&bytes, &self.path);

        // Reject bytes that do not decode as a certificate up front so
        // the aggregator gets a single, precise failure.
        parse_certificate(&leaf_der, &path_str)?;

        debug!(path = %path_str, bytes = leaf_der.len(), "loaded certificate from file");
        Ok(CertificateRecord::from_file(leaf_der))
    }
}

/// PEM decode with DER fallback: the first CERTIFICATE block wins; raw
/// bytes are assumed DER when no block is present.
fn decode_leaf(bytes: &[u8], path: &Path) -> Vec<u8> {
    match pem::parse_many(bytes) {
        Ok(pems) => pems
            .iter()
            .find(|p| p.tag() == "CERTIFICATE")
            .map_or_else(|| bytes.to_vec(), |p| p.contents().to_vec()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no PEM framing, trying DER");
            bytes.to_vec()
        }
    }
}
