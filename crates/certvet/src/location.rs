//! Input location classification.
//!
//! A location string is classified exactly once, syntactically, into one
//! of three kinds. Validation logic dispatches on the resulting enum and
//! never inspects the raw string again.

use std::path::PathBuf;

/// Default port for network lookups.
pub const DEFAULT_TLS_PORT: u16 = 443;

/// A classified input location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// `https://` URL; port taken from the URL, defaulting to 443
    Url {
        /// Host component of the URL
        host: String,
        /// Port component, or 443
        port: u16,
    },
    /// Absolute path to a local certificate file
    FilePath(PathBuf),
    /// Bare hostname, implying a network lookup on port 443
    Hostname(String),
}

impl Location {
    /// Classify a raw location string.
    ///
    /// `https://` prefixes become [`Location::Url`], leading `/` becomes
    /// [`Location::FilePath`], everything else is a bare hostname.
    /// An unparsable `https://` URL degrades to a hostname lookup of the
    /// remainder so that acquisition reports the failure instead of the
    /// classifier.
    #[must_use]
    pub fn classify(input: &str) -> Self {
        if let Some(rest) = input.strip_prefix("https://") {
            if let Ok(url) = url::Url::parse(input) {
                if let Some(host) = url.host_str() {
                    return Self::Url {
                        host: host.to_string(),
                        port: url.port().unwrap_or(DEFAULT_TLS_PORT),
                    };
                }
            }
            // Keep the host-ish part; connect will surface the real error.
            let host = rest.split('/').next().unwrap_or(rest);
            return Self::Hostname(host.to_string());
        }

        if input.starts_with('/') {
            return Self::FilePath(PathBuf::from(input));
        }

        Self::Hostname(input.to_string())
    }

    /// Host and port for network locations, `None` for files.
    #[must_use]
    pub fn endpoint(&self) -> Option<(&str, u16)> {
        match self {
            Self::Url { host, port } => Some((host, *port)),
            Self::Hostname(host) => Some((host, DEFAULT_TLS_PORT)),
            Self::FilePath(_) => None,
        }
    }
}
