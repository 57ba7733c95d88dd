//! OCSP revocation checking.
//!
//! The responder query is a black-box capability behind
//! [`RevocationChecker`]; the validator only consumes its outcome.
//! [`HttpOcspChecker`] is the production implementation: it builds an
//! `OCSPRequest` for the leaf/issuer pair, POSTs it to the responder
//! named by the certificate's AIA extension, and maps the responder's
//! `CertStatus`. Query failures surface as [`OcspError`] values and are
//! reported at the configured failure level, never as a hard failure.

use std::time::Duration;

use async_trait::async_trait;
use der::{Decode, Encode};
use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};
use tracing::{debug, warn};
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::AlgorithmIdentifierOwned;
use x509_ocsp::{BasicOcspResponse, CertId, CertStatus, OcspRequest, OcspResponse,
    OcspResponseStatus, Request, TbsRequest, Version};

use crate::error::OcspError;
use crate::types::OcspStatus;

/// Per-query deadline, independent of the source adapter's timeout.
const OCSP_TIMEOUT: Duration = Duration::from_secs(10);

/// SHA-1, the only CertID digest public responders are guaranteed to
/// serve (RFC 5019 lightweight profile).
const OID_SHA1: &str = "1.3.14.3.2.26";

/// Black-box revocation capability: given a certificate, return its
/// revocation state or fail.
#[async_trait]
pub trait RevocationChecker: Send + Sync {
    /// Query revocation state for the leaf certificate.
    async fn check(
        &self,
        leaf_der: &[u8],
        issuer_der: Option<&[u8]>,
        responder_url: &str,
    ) -> Result<OcspStatus, OcspError>;
}

/// HTTP POST implementation speaking `application/ocsp-request`.
#[derive(Debug, Clone, Default)]
pub struct HttpOcspChecker {
    http: reqwest::Client,
}

impl HttpOcspChecker {
    /// Create a checker with a fresh HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationChecker for HttpOcspChecker {
    async fn check(
        &self,
        leaf_der: &[u8],
        issuer_der: Option<&[u8]>,
        responder_url: &str,
    ) -> Result<OcspStatus, OcspError> {
        let issuer_der = issuer_der.ok_or(OcspError::MissingIssuer)?;
        let (request_der, leaf_serial) = build_ocsp_request(leaf_der, issuer_der)?;

        debug!(url = responder_url, "querying OCSP responder");
        let response = self
            .http
            .post(responder_url)
            .header("Content-Type", "application/ocsp-request")
            .header("Accept", "application/ocsp-response")
            .body(request_der)
            .timeout(OCSP_TIMEOUT)
            .send()
            .await
            .map_err(|e| OcspError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OcspError::Http(format!(
                "responder returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| OcspError::Http(e.to_string()))?;

        let status = decode_ocsp_response(&body, &leaf_serial)?;
        if status != OcspStatus::Good {
            warn!(url = responder_url, status = ?status, "OCSP responder did not vouch");
        }
        Ok(status)
    }
}

/// Build a DER `OCSPRequest` for the leaf, returning it together with
/// the leaf serial used to match the responder's answer.
fn build_ocsp_request(leaf_der: &[u8], issuer_der: &[u8]) -> Result<(Vec<u8>, Vec<u8>), OcspError> {
    let (_, leaf) = x509_parser::parse_x509_certificate(leaf_der)
        .map_err(|e| OcspError::Encode(format!("leaf certificate: {e}")))?;
    let (_, issuer) = x509_parser::parse_x509_certificate(issuer_der)
        .map_err(|e| OcspError::Encode(format!("issuer certificate: {e}")))?;

    // CertID hashes are over the issuer's subject Name and public key.
    let issuer_name_hash = digest(&SHA1_FOR_LEGACY_USE_ONLY, issuer.subject().as_raw());
    let issuer_key_hash = digest(
        &SHA1_FOR_LEGACY_USE_ONLY,
        issuer.tbs_certificate.subject_pki.subject_public_key.data.as_ref(),
    );

    let serial_raw = leaf.raw_serial().to_vec();
    let serial = SerialNumber::new(&serial_raw)
        .map_err(|e| OcspError::Encode(format!("serial number: {e}")))?;

    let cert_id = CertId {
        hash_algorithm: AlgorithmIdentifierOwned {
            oid: der::asn1::ObjectIdentifier::new_unwrap(OID_SHA1),
            parameters: Some(der::Any::null()),
        },
        issuer_name_hash: der::asn1::OctetString::new(issuer_name_hash.as_ref())
            .map_err(|e| OcspError::Encode(e.to_string()))?,
        issuer_key_hash: der::asn1::OctetString::new(issuer_key_hash.as_ref())
            .map_err(|e| OcspError::Encode(e.to_string()))?,
        serial_number: serial,
    };

    let request = OcspRequest {
        tbs_request: TbsRequest {
            version: Version::V1,
            requestor_name: None,
            request_list: vec![Request {
                req_cert: cert_id,
                single_request_extensions: None,
            }],
            request_extensions: None,
        },
        optional_signature: None,
    };

    let request_der = request
        .to_der()
        .map_err(|e| OcspError::Encode(e.to_string()))?;
    Ok((request_der, serial_raw))
}

/// Decode a responder answer down to the leaf's `CertStatus`.
fn decode_ocsp_response(body: &[u8], leaf_serial: &[u8]) -> Result<OcspStatus, OcspError> {
    let response =
        OcspResponse::from_der(body).map_err(|e| OcspError::Decode(e.to_string()))?;

    if response.response_status != OcspResponseStatus::Successful {
        return Err(OcspError::Responder(format!(
            "{:?}",
            response.response_status
        )));
    }

    let response_bytes = response
        .response_bytes
        .as_ref()
        .ok_or_else(|| OcspError::Decode("response carried no responseBytes".to_string()))?;

    let basic = BasicOcspResponse::from_der(response_bytes.response.as_bytes())
        .map_err(|e| OcspError::Decode(e.to_string()))?;

    let single = basic
        .tbs_response_data
        .responses
        .iter()
        .find(|r| r.cert_id.serial_number.as_bytes() == leaf_serial)
        .or_else(|| basic.tbs_response_data.responses.first())
        .ok_or_else(|| OcspError::Decode("no singleResponse in answer".to_string()))?;

    Ok(match single.cert_status {
        CertStatus::Good(_) => OcspStatus::Good,
        CertStatus::Revoked(_) => OcspStatus::Revoked,
        CertStatus::Unknown(_) => OcspStatus::Unknown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn self_signed_der() -> Vec<u8> {
        let key = rcgen::KeyPair::generate().unwrap();
        let mut params =
            rcgen::CertificateParams::new(vec!["example.com".to_string()]).unwrap();
        params.distinguished_name = rcgen::DistinguishedName::new();
        params
            .distinguished_name
            .push(rcgen::DnType::CommonName, "example.com");
        params.self_signed(&key).unwrap().der().to_vec()
    }

    #[test]
    fn request_roundtrips_through_der() {
        let der = self_signed_der();
        let (request_der, serial) = build_ocsp_request(&der, &der).unwrap();

        let decoded = OcspRequest::from_der(&request_der).unwrap();
        assert_eq!(decoded.tbs_request.request_list.len(), 1);
        let cert_id = &decoded.tbs_request.request_list[0].req_cert;
        assert_eq!(cert_id.issuer_name_hash.as_bytes().len(), 20);
        assert_eq!(cert_id.issuer_key_hash.as_bytes().len(), 20);
        assert!(!serial.is_empty());
    }

    #[tokio::test]
    async fn missing_issuer_is_reported() {
        let der = self_signed_der();
        let err = HttpOcspChecker::new()
            .check(&der, None, "http://ocsp.invalid")
            .await
            .unwrap_err();
        assert!(matches!(err, OcspError::MissingIssuer));
    }

    #[tokio::test]
    async fn http_error_status_is_a_query_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let der = self_signed_der();
        let err = HttpOcspChecker::new()
            .check(&der, Some(&der), &server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, OcspError::Http(_)));
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Content-Type", "application/ocsp-request"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not-der".to_vec()))
            .mount(&server)
            .await;

        let der = self_signed_der();
        let err = HttpOcspChecker::new()
            .check(&der, Some(&der), &server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, OcspError::Decode(_)));
    }
}
