//! # certvet
//!
//! TLS certificate validation for hosts and files.
//!
//! Point it at an `https://` URL, a certificate file, or a bare
//! hostname; it retrieves the certificate, runs a configurable rule
//! set over it, and returns a structured verdict. The pipeline never
//! fails outright: whatever goes wrong along the way is folded into
//! the verdict for that location, so batches always come back whole.
//!
//! ## Data Flow
//!
//! ```text
//! Location::classify(input)
//!   -> source::acquire()        file read or live TLS handshake
//!   -> extract::*               dates, identity, serial, OCSP URL
//!   -> RevocationChecker        OCSP query (when enabled + advertised)
//!   -> rules::apply_rules()     transport trust, identity, OCSP,
//!                               expiration, TLS version
//!   -> Verdict                  JSON-serializable, camelCase
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use certvet::{RuleConfig, Validator};
//!
//! # async fn run() {
//! let validator = Validator::new(RuleConfig::default());
//! let verdict = validator.validate("https://example.com").await;
//! if !verdict.valid {
//!     eprintln!("{}: {:?}", verdict.location, verdict.errors);
//! }
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod location;
pub mod ocsp;
pub mod rules;
pub mod source;
pub mod types;
pub mod validate;

pub use error::{OcspError, SourceError};
pub use location::Location;
pub use ocsp::{HttpOcspChecker, RevocationChecker};
pub use types::*;
pub use validate::{Validator, DEFAULT_TIMEOUT};
