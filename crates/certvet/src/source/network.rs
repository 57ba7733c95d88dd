//! Live TLS handshake backend.
//!
//! The transport deliberately accepts any chain so that expired,
//! self-signed, or revoked certificates can still be retrieved and
//! reported. Chain trust is evaluated afterwards against the webpki
//! root set and surfaced as data on the record, not as a connection
//! abort.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, ProtocolVersion, RootCertStore, SignatureScheme};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::types::{CertificateRecord, CipherInfo, SourceKind};

use super::CertificateSource;

/// Connects to a host, completes a TLS handshake, and extracts the peer
/// certificate plus negotiated transport parameters.
#[derive(Debug, Clone)]
pub struct NetworkSource {
    host: String,
    port: u16,
    timeout: Duration,
}

impl NetworkSource {
    /// Create a source for the given endpoint.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    async fn handshake(&self) -> Result<CertificateRecord, SourceError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());

        let addrs: Vec<SocketAddr> =
            tokio::net::lookup_host((self.host.as_str(), self.port))
                .await
                .map_err(|e| SourceError::Dns {
                    host: self.host.clone(),
                    reason: e.to_string(),
                })?
                .collect();
        if addrs.is_empty() {
            return Err(SourceError::Dns {
                host: self.host.clone(),
                reason: "no addresses returned".to_string(),
            });
        }

        let tcp = self.connect_any(&addrs).await?;

        let config = rustls::ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(|e| SourceError::Tls {
                host: self.host.clone(),
                reason: e.to_string(),
            })?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(PermissiveVerifier {
                provider: provider.clone(),
            }))
            .with_no_client_auth();

        let server_name =
            ServerName::try_from(self.host.clone()).map_err(|e| SourceError::Tls {
                host: self.host.clone(),
                reason: e.to_string(),
            })?;

        let mut stream = TlsConnector::from(Arc::new(config))
            .connect(server_name, tcp)
            .await
            .map_err(|e| SourceError::Tls {
                host: self.host.clone(),
                reason: e.to_string(),
            })?;

        // Everything we need is available once the handshake completes.
        let (chain, cipher) = {
            let (_, conn) = stream.get_ref();
            let chain: Vec<CertificateDer<'static>> = conn
                .peer_certificates()
                .map(|certs| certs.iter().map(|c| c.clone().into_owned()).collect())
                .unwrap_or_default();
            let cipher = CipherInfo {
                protocol: conn
                    .protocol_version()
                    .map_or_else(|| "unknown".to_string(), protocol_name),
                name: conn
                    .negotiated_cipher_suite()
                    .map_or_else(|| "unknown".to_string(), |s| format!("{:?}", s.suite())),
            };
            (chain, cipher)
        };

        if chain.is_empty() {
            let _ = stream.shutdown().await;
            return Err(SourceError::Tls {
                host: self.host.clone(),
                reason: "peer presented no certificate".to_string(),
            });
        }

        // Minimal HEAD exchange; the certificate does not depend on it,
        // so failures here are logged and ignored.
        let request = format!(
            "HEAD / HTTP/1.1\r\nHost: {}\r\nUser-Agent: certvet\r\nConnection: close\r\n\r\n",
            self.host
        );
        if let Err(e) = stream.write_all(request.as_bytes()).await {
            debug!(host = %self.host, error = %e, "HEAD request not accepted");
        } else {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
        }
        let _ = stream.shutdown().await;

        let trust = verify_chain(&chain, &self.host, provider);
        if let Err(reason) = &trust {
            warn!(host = %self.host, reason = %reason, "presented chain is not trusted");
        }
        let (chain_trusted, chain_error) = match trust {
            Ok(()) => (Some(true), None),
            Err(reason) => (Some(false), Some(reason)),
        };

        debug!(
            host = %self.host,
            port = self.port,
            protocol = %cipher.protocol,
            chain_len = chain.len(),
            "certificate retrieved"
        );

        Ok(CertificateRecord {
            kind: SourceKind::Host,
            leaf_der: chain[0].as_ref().to_vec(),
            issuer_der: chain.get(1).map(|c| c.as_ref().to_vec()),
            hostname: Some(self.host.clone()),
            cipher: Some(cipher),
            chain_trusted,
            chain_error,
        })
    }

    /// Try each resolved address until one accepts the connection.
    async fn connect_any(&self, addrs: &[SocketAddr]) -> Result<TcpStream, SourceError> {
        let mut last_reason = String::from("no addresses attempted");
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => last_reason = e.to_string(),
            }
        }
        Err(SourceError::ConnectionFailed {
            host: self.host.clone(),
            port: self.port,
            reason: last_reason,
        })
    }
}

#[async_trait]
impl CertificateSource for NetworkSource {
    async fn acquire(&self) -> Result<CertificateRecord, SourceError> {
        match tokio::time::timeout(self.timeout, self.handshake()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout {
                host: self.host.clone(),
                port: self.port,
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

/// Verify the presented chain against the webpki root set.
///
/// Runs after the handshake so an untrusted chain becomes a finding
/// instead of a connection error.
fn verify_chain(
    chain: &[CertificateDer<'static>],
    host: &str,
    provider: Arc<CryptoProvider>,
) -> Result<(), String> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let verifier = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), provider)
        .build()
        .map_err(|e| e.to_string())?;

    let server_name = ServerName::try_from(host.to_string()).map_err(|e| e.to_string())?;
    let (end_entity, intermediates) = chain
        .split_first()
        .ok_or_else(|| "empty certificate chain".to_string())?;

    verifier
        .verify_server_cert(end_entity, intermediates, &server_name, &[], UnixTime::now())
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Render a negotiated protocol version the way operators write it.
fn protocol_name(version: ProtocolVersion) -> String {
    match version {
        ProtocolVersion::TLSv1_2 => "TLSv1.2".to_string(),
        ProtocolVersion::TLSv1_3 => "TLSv1.3".to_string(),
        other => format!("{other:?}"),
    }
}

/// Accepts every chain at the transport layer; signature checks still
/// delegate to the crypto provider so the handshake itself is sound.
#[derive(Debug)]
struct PermissiveVerifier {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for PermissiveVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
