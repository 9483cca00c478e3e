//! Single-URL fetching with manual redirect tracing and terminal-state
//! classification. Mirrors this workspace's `ReliableHttpClient` shape (shared
//! client, per-call retry, structured tracing) but narrows retry/redirect
//! handling to the fixed contract the audit engine needs: up to 10 hops, one
//! retry on transient errors, and a closed set of failure classifications
//! instead of a caller-visible `Result`.

use seo_config::AuditConfig;
use seo_types::{CanonicalUrl, FetchErrorKind, FetchResult, RedirectHop};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

const MAX_REDIRECTS: usize = 10;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

pub struct Fetcher {
    client: reqwest::Client,
    max_body_bytes: u64,
}

impl Fetcher {
    pub fn new(config: &AuditConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .gzip(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Perform a GET, following redirects by hand so every hop can be recorded
    /// and classified. Never returns an `Err`; all failures land in
    /// `FetchResult.error`.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &CanonicalUrl) -> FetchResult {
        let start = Instant::now();
        let mut chain: Vec<RedirectHop> = Vec::new();
        let mut current = url.clone();

        loop {
            let attempt = self.get_once(current.as_str()).await;
            let response = match attempt {
                Ok(resp) => resp,
                Err(kind) => {
                    return FetchResult {
                        final_url: current,
                        status_code: None,
                        response_headers: Vec::new(),
                        body: None,
                        redirect_chain: chain,
                        elapsed_ms: start.elapsed().as_millis() as u64,
                        body_truncated: false,
                        error: Some(kind),
                    };
                }
            };

            let status = response.status().as_u16();

            if (300..400).contains(&status) {
                if chain.len() >= MAX_REDIRECTS {
                    return FetchResult {
                        final_url: current,
                        status_code: Some(status),
                        response_headers: Vec::new(),
                        body: None,
                        redirect_chain: chain,
                        elapsed_ms: start.elapsed().as_millis() as u64,
                        body_truncated: false,
                        error: Some(FetchErrorKind::TooManyRedirects),
                    };
                }

                let Some(location) = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                else {
                    // A redirect with no Location header: treat the response as terminal.
                    return self.finish(current, status, response, chain, start, None).await;
                };

                let next = match current.join(location) {
                    Ok(next) => next,
                    Err(_) => {
                        return self.finish(current, status, response, chain, start, None).await;
                    }
                };

                chain.push(RedirectHop { url: current.clone(), status });

                if chain.iter().any(|hop| hop.url == next) {
                    return FetchResult {
                        final_url: next,
                        status_code: Some(status),
                        response_headers: Vec::new(),
                        body: None,
                        redirect_chain: chain,
                        elapsed_ms: start.elapsed().as_millis() as u64,
                        body_truncated: false,
                        error: Some(FetchErrorKind::Loop),
                    };
                }

                current = next;
                continue;
            }

            let terminal_error = if !chain.is_empty() && (400..500).contains(&status) {
                Some(FetchErrorKind::RedirectChainEnds4xx)
            } else if !chain.is_empty() && (500..600).contains(&status) {
                Some(FetchErrorKind::RedirectChainEnds5xx)
            } else {
                None
            };

            return self.finish(current, status, response, chain, start, terminal_error).await;
        }
    }

    async fn finish(
        &self,
        final_url: CanonicalUrl,
        status: u16,
        response: reqwest::Response,
        redirect_chain: Vec<RedirectHop>,
        start: Instant,
        terminal_error: Option<FetchErrorKind>,
    ) -> FetchResult {
        let response_headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();

        let charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(content_type_charset);

        let (body, body_truncated) = self.read_capped_body(response, charset).await;

        FetchResult {
            final_url,
            status_code: Some(status),
            response_headers,
            body,
            redirect_chain,
            elapsed_ms: start.elapsed().as_millis() as u64,
            body_truncated,
            error: terminal_error,
        }
    }

    /// Reads the body up to `max_body_bytes`, then decodes it with the
    /// response's declared charset (falling back to UTF-8). `Encoding::decode`
    /// itself checks for a leading BOM before consulting the declared label,
    /// so callers get BOM-aware decoding for free.
    async fn read_capped_body(
        &self,
        response: reqwest::Response,
        charset: Option<&'static encoding_rs::Encoding>,
    ) -> (Option<String>, bool) {
        use futures::StreamExt;

        let cap = self.max_body_bytes as usize;
        let mut buf: Vec<u8> = Vec::new();
        let mut truncated = false;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let Ok(chunk) = chunk else { break };
            if buf.len() + chunk.len() > cap {
                let remaining = cap.saturating_sub(buf.len());
                buf.extend_from_slice(&chunk[..remaining.min(chunk.len())]);
                truncated = true;
                break;
            }
            buf.extend_from_slice(&chunk);
        }

        let encoding = charset.unwrap_or(encoding_rs::UTF_8);
        let (text, _, _) = encoding.decode(&buf);
        (Some(text.into_owned()), truncated)
    }

    /// One GET with a single retry on transient transport errors. HTTP status
    /// errors are never retried.
    async fn get_once(&self, url: &str) -> Result<reqwest::Response, FetchErrorKind> {
        match self.client.get(url).send().await {
            Ok(resp) => Ok(resp),
            Err(e) => {
                let kind = classify_transport_error(&e);
                if kind.is_retryable() {
                    debug!(url, ?kind, "retrying after transient fetch error");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                    self.client.get(url).send().await.map_err(|e2| {
                        warn!(url, error = %e2, "retry also failed");
                        classify_transport_error(&e2)
                    })
                } else {
                    Err(kind)
                }
            }
        }
    }
}

/// Extracts the `charset` parameter from a `Content-Type` header value, e.g.
/// `text/html; charset=iso-8859-1` -> the `ISO-8859-1` encoding.
fn content_type_charset(content_type: &str) -> Option<&'static encoding_rs::Encoding> {
    let charset = content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.trim().split_once('=')?;
        key.trim().eq_ignore_ascii_case("charset").then(|| value.trim().trim_matches('"'))
    })?;
    encoding_rs::Encoding::for_label(charset.as_bytes())
}

fn classify_transport_error(error: &reqwest::Error) -> FetchErrorKind {
    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_connect() {
        let msg = error.to_string().to_lowercase();
        if msg.contains("dns") || msg.contains("resolve") || msg.contains("lookup") {
            FetchErrorKind::DnsError
        } else if msg.contains("refused") || msg.contains("reset") {
            FetchErrorKind::Refused
        } else {
            FetchErrorKind::Refused
        }
    } else {
        let msg = error.to_string().to_lowercase();
        if msg.contains("tls") || msg.contains("certificate") || msg.contains("ssl") {
            FetchErrorKind::TlsError
        } else {
            FetchErrorKind::Refused
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> AuditConfig {
        AuditConfig {
            connect_timeout: Duration::from_millis(500),
            request_timeout: Duration::from_secs(5),
            ..AuditConfig::default()
        }
    }

    #[tokio::test]
    async fn fetches_a_simple_2xx_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config());
        let url = CanonicalUrl::parse(&server.uri()).expect("valid");
        let result = fetcher.fetch(&url).await;

        assert_eq!(result.status_code, Some(200));
        assert!(result.error.is_none());
        assert!(result.redirect_chain.is_empty());
        assert_eq!(result.body.as_deref(), Some("<html></html>"));
    }

    #[tokio::test]
    async fn records_redirect_chain_and_terminal_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/start"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/end"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/end"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config());
        let url = CanonicalUrl::parse(&format!("{}/start", server.uri())).expect("valid");
        let result = fetcher.fetch(&url).await;

        assert_eq!(result.status_code, Some(200));
        assert_eq!(result.redirect_chain.len(), 1);
        assert_eq!(result.redirect_chain[0].status, 302);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn detects_redirect_loop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/b"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/a"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config());
        let url = CanonicalUrl::parse(&format!("{}/a", server.uri())).expect("valid");
        let result = fetcher.fetch(&url).await;

        assert_eq!(result.error, Some(FetchErrorKind::Loop));
    }

    #[tokio::test]
    async fn redirect_chain_ending_in_404_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/gone"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config());
        let url = CanonicalUrl::parse(&format!("{}/old", server.uri())).expect("valid");
        let result = fetcher.fetch(&url).await;

        assert_eq!(result.error, Some(FetchErrorKind::RedirectChainEnds4xx));
        assert_eq!(result.status_code, Some(404));
    }

    #[tokio::test]
    async fn direct_4xx_without_redirect_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config());
        let url = CanonicalUrl::parse(&format!("{}/missing", server.uri())).expect("valid");
        let result = fetcher.fetch(&url).await;

        assert_eq!(result.status_code, Some(404));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn decodes_body_using_declared_charset() {
        let server = MockServer::start().await;
        // "café" in Latin-1/ISO-8859-1: the trailing byte 0xE9 is "é" in that
        // encoding but would be invalid UTF-8 on its own.
        let latin1_body: Vec<u8> = vec![b'c', b'a', b'f', 0xE9];
        Mock::given(method("GET"))
            .and(path("/latin1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/html; charset=iso-8859-1")
                    .set_body_bytes(latin1_body),
            )
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config());
        let url = CanonicalUrl::parse(&format!("{}/latin1", server.uri())).expect("valid");
        let result = fetcher.fetch(&url).await;

        assert_eq!(result.body.as_deref(), Some("caf\u{e9}"));
    }

    #[tokio::test]
    async fn strips_utf8_bom_from_body() {
        let server = MockServer::start().await;
        let mut bom_body = vec![0xEF, 0xBB, 0xBF];
        bom_body.extend_from_slice(b"<html></html>");
        Mock::given(method("GET"))
            .and(path("/bom"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bom_body))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config());
        let url = CanonicalUrl::parse(&format!("{}/bom", server.uri())).expect("valid");
        let result = fetcher.fetch(&url).await;

        assert_eq!(result.body.as_deref(), Some("<html></html>"));
    }

    #[tokio::test]
    async fn too_many_redirects_is_classified() {
        let server = MockServer::start().await;
        for i in 0..12 {
            Mock::given(method("GET"))
                .and(path(format!("/hop{i}")))
                .respond_with(ResponseTemplate::new(302).insert_header("Location", format!("/hop{}", i + 1)))
                .mount(&server)
                .await;
        }

        let fetcher = Fetcher::new(&test_config());
        let url = CanonicalUrl::parse(&format!("{}/hop0", server.uri())).expect("valid");
        let result = fetcher.fetch(&url).await;

        assert_eq!(result.error, Some(FetchErrorKind::TooManyRedirects));
    }
}
