use crate::canon::CanonicalUrl;
use crate::error::FetchErrorKind;
use serde::{Deserialize, Serialize};

/// A single hop in a redirect chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectHop {
    pub url: CanonicalUrl,
    pub status: u16,
}

/// Outcome of fetching a single URL, never carrying a Rust error to the caller;
/// transport and protocol failures are encoded in `error` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    pub final_url: CanonicalUrl,
    pub status_code: Option<u16>,
    pub response_headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub redirect_chain: Vec<RedirectHop>,
    pub elapsed_ms: u64,
    pub body_truncated: bool,
    pub error: Option<FetchErrorKind>,
}

impl FetchResult {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_ok_status(&self) -> bool {
        matches!(self.status_code, Some(code) if (200..300).contains(&code))
    }

    pub fn is_html(&self) -> bool {
        self.header("content-type")
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false)
    }

    /// The value used for status-code-distribution bucketing: the numeric status
    /// when one exists, else the error's pseudo-status label.
    pub fn status_bucket(&self) -> String {
        if let Some(code) = self.status_code {
            code.to_string()
        } else if let Some(err) = self.error {
            match err {
                FetchErrorKind::Timeout => "timeout".to_string(),
                FetchErrorKind::DnsError | FetchErrorKind::TlsError | FetchErrorKind::Refused => {
                    "network_error".to_string()
                }
                other => other.as_pseudo_status().to_string(),
            }
        } else {
            "network_error".to_string()
        }
    }

    /// Whether this result's redirect chain revisits a URL already seen earlier
    /// in the same chain.
    pub fn has_redirect_loop(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        for hop in &self.redirect_chain {
            if !seen.insert(hop.url.as_str()) {
                return true;
            }
        }
        false
    }
}
