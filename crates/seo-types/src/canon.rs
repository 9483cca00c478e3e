use crate::error::AuditError;
use url::Url;

/// A canonicalized URL: scheme and host lowercased, fragment stripped, trailing
/// slash normalized once at discovery time. Equality and hashing operate on the
/// canonical string form, matching the "two URLs are equal iff their canonical
/// forms are equal" rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Parse and canonicalize a URL string. Only `http`/`https` schemes are accepted;
    /// anything else is an `invalid_url` per the core's input-validation contract.
    pub fn parse(raw: &str) -> Result<Self, AuditError> {
        let url = Url::parse(raw).map_err(|e| AuditError::invalid_url(e.to_string()))?;
        Self::from_url(&url)
    }

    /// Canonicalize an already-parsed `Url`, e.g. one resolved from a relative href.
    pub fn from_url(url: &Url) -> Result<Self, AuditError> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AuditError::invalid_url(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(AuditError::invalid_url("url has no host"));
        }

        let mut canon = url.clone();
        canon.set_fragment(None);
        // host_str() is Some per the check above; lowercase it explicitly since
        // `Url` already lowercases the authority for non-IDN hosts but we don't
        // want to depend on that implementation detail.
        if let Some(host) = canon.host_str() {
            let lowered = host.to_ascii_lowercase();
            let _ = canon.set_host(Some(&lowered));
        }

        let path = canon.path().to_string();
        if path.len() > 1 && path.ends_with('/') {
            canon.set_path(path.trim_end_matches('/'));
        } else if path.is_empty() {
            canon.set_path("/");
        }

        Ok(Self(canon.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn host(&self) -> Option<String> {
        Url::parse(&self.0).ok().and_then(|u| u.host_str().map(|h| h.to_string()))
    }

    pub fn path(&self) -> String {
        Url::parse(&self.0).map(|u| u.path().to_string()).unwrap_or_default()
    }

    pub fn scheme(&self) -> String {
        Url::parse(&self.0).map(|u| u.scheme().to_string()).unwrap_or_default()
    }

    pub fn is_https(&self) -> bool {
        self.scheme() == "https"
    }

    /// Resolve `href` against this URL and canonicalize the result, the way link
    /// and canonical-tag extraction need to.
    pub fn join(&self, href: &str) -> Result<Self, AuditError> {
        let base = Url::parse(&self.0).map_err(|e| AuditError::internal(e.to_string()))?;
        let joined = base
            .join(href)
            .map_err(|e| AuditError::invalid_url(format!("cannot resolve '{href}': {e}")))?;
        Self::from_url(&joined)
    }
}

impl std::fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fragment_and_trailing_slash() {
        let a = CanonicalUrl::parse("https://Example.com/Path/#section").expect("valid");
        assert_eq!(a.as_str(), "https://example.com/Path");
    }

    #[test]
    fn root_path_keeps_single_slash() {
        let a = CanonicalUrl::parse("https://example.com").expect("valid");
        assert_eq!(a.as_str(), "https://example.com/");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let once = CanonicalUrl::parse("https://Example.com/a/b/").expect("valid");
        let twice = CanonicalUrl::parse(once.as_str()).expect("valid");
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(CanonicalUrl::parse("ftp://example.com/file").is_err());
    }

    #[test]
    fn equal_canonical_forms_are_equal() {
        let a = CanonicalUrl::parse("https://example.com/a").expect("valid");
        let b = CanonicalUrl::parse("HTTPS://EXAMPLE.com/a").expect("valid");
        assert_eq!(a, b);
    }

    #[test]
    fn join_resolves_relative_links() {
        let base = CanonicalUrl::parse("https://example.com/blog/post").expect("valid");
        let joined = base.join("../about").expect("valid");
        assert_eq!(joined.as_str(), "https://example.com/about");
    }
}
