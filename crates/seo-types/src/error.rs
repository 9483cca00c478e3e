use thiserror::Error;

/// Coarse classification of a fetch failure, shared between [`crate::FetchResult::error`]
/// and [`AuditError::Fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    RedirectChainEnds4xx,
    RedirectChainEnds5xx,
    Loop,
    TooManyRedirects,
    Timeout,
    DnsError,
    TlsError,
    Refused,
}

impl FetchErrorKind {
    /// Whether a fetch failing with this classification is worth a single retry.
    /// Status-derived classifications never are; only transport-level hiccups are.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::DnsError | Self::TlsError | Self::Refused)
    }

    pub fn as_pseudo_status(&self) -> &'static str {
        match self {
            Self::RedirectChainEnds4xx => "redirect_chain_ends_4xx",
            Self::RedirectChainEnds5xx => "redirect_chain_ends_5xx",
            Self::Loop => "loop",
            Self::TooManyRedirects => "too_many_redirects",
            Self::Timeout => "timeout",
            Self::DnsError => "dns_error",
            Self::TlsError => "tls_error",
            Self::Refused => "refused",
        }
    }
}

/// Crate-wide error type. Most failures inside the audit pipeline are captured as data
/// (a [`FetchErrorKind`] on a record, an absent robots/sitemap result) rather than
/// propagated as an `AuditError`; this type exists for the boundaries that must fail
/// the whole operation: request validation and internal invariant breaches.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid url: {reason}")]
    InvalidUrl { reason: String },

    #[error("invalid max_pages: {value} (must be >= 1)")]
    InvalidMaxPages { value: i64 },

    #[error("fetch failed: {0:?}")]
    Fetch(FetchErrorKind),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuditError {
    pub fn invalid_url(reason: impl Into<String>) -> Self {
        Self::InvalidUrl { reason: reason.into() }
    }

    pub fn invalid_max_pages(value: i64) -> Self {
        Self::InvalidMaxPages { value }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error should be reported to a caller as a 400 rather than a 500.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. } | Self::InvalidMaxPages { .. })
    }
}

pub type AuditResult<T> = Result<T, AuditError>;
