//! Certificate acquisition — file and network backends.

pub mod file;
pub mod network;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::location::{Location, DEFAULT_TLS_PORT};
use crate::types::CertificateRecord;

pub use file::FileSource;
pub use network::NetworkSource;

/// A backend that resolves one location into certificate material.
#[async_trait]
pub trait CertificateSource: Send + Sync {
    /// Acquire the certificate plus transport metadata.
    async fn acquire(&self) -> Result<CertificateRecord, SourceError>;
}

/// Dispatch a classified location to the matching backend.
pub async fn acquire(
    location: &Location,
    timeout: Duration,
) -> Result<CertificateRecord, SourceError> {
    match location {
        Location::FilePath(path) => FileSource::new(path.clone()).acquire().await,
        Location::Url { host, port } => {
            NetworkSource::new(host, *port, timeout).acquire().await
        }
        Location::Hostname(host) => {
            NetworkSource::new(host, DEFAULT_TLS_PORT, timeout).acquire().await
        }
    }
}
