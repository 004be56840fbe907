// src/fetch/http.rs
// =============================================================================
// This module downloads listing pages over HTTP.
//
// Key functionality:
// - Builds one reqwest Client per run with a browser-like header set
// - GETs a URL and returns the body as text
// - Reports transport failures and non-2xx responses as ScrapeError::Fetch
//
// There is no retry and no backoff. A failed page is the caller's problem,
// and the caller treats it as "zero listings from this page".
//
// Rust concepts:
// - Traits: PageSource is the seam between the paginator and the network
// - async/await: the fetch is awaited before the next page starts
// =============================================================================

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_CHARSET, ACCEPT_ENCODING,
    ACCEPT_LANGUAGE, CONNECTION, USER_AGENT,
};
use reqwest::Client;
use std::time::Duration;

use crate::config::HeaderSet;
use crate::error::{FetchCause, ScrapeError};

/// Anything that can hand back the markup for a URL
///
/// The paginator only talks to this trait, so tests can feed it canned pages
/// (or canned failures) without a network.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

/// The real, network-backed page source
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(headers: &HeaderSet, timeout: Duration) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .default_headers(build_headers(headers)?)
            .timeout(timeout)
            .build()
            .map_err(|e| ScrapeError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        // Every failure below carries the URL, so the log line says which page
        let fail = |source: FetchCause| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        };

        // Step 1: send the GET (connect, TLS, timeout all surface here)
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fail(FetchCause::Transport(e)))?;

        // Step 2: anything outside 2xx is a failed page, body or not
        let status = response.status();
        if !status.is_success() {
            return Err(fail(FetchCause::Status(status.as_u16())));
        }

        // Step 3: read the whole body as text
        response
            .text()
            .await
            .map_err(|e| fail(FetchCause::Transport(e)))
    }
}

// Turns the configured header set into reqwest's HeaderMap
fn build_headers(headers: &HeaderSet) -> Result<HeaderMap, ScrapeError> {
    let pairs: [(HeaderName, &str); 6] = [
        (USER_AGENT, headers.user_agent.as_str()),
        (ACCEPT, headers.accept.as_str()),
        (ACCEPT_CHARSET, headers.accept_charset.as_str()),
        (ACCEPT_ENCODING, headers.accept_encoding.as_str()),
        (ACCEPT_LANGUAGE, headers.accept_language.as_str()),
        (CONNECTION, headers.connection.as_str()),
    ];

    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        let value = HeaderValue::from_str(value).map_err(|_| {
            ScrapeError::Config(format!("header {} has an invalid value: {:?}", name, value))
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why default_headers instead of .header() on each request?
//    - The header set never changes during a run
//    - Setting it once on the Client means no request can forget it
//
// 2. Why one Client for the whole run?
//    - reqwest::Client holds a connection pool
//    - Reusing it lets "Connection: keep-alive" actually keep the connection
//
// 3. Why is a 404/500 an error when there is still a body?
//    - Error pages never contain the offer container anyway
//    - Failing early gives a clearer log line ("HTTP 500") than "container
//      missing"
//
// 4. What is #[allow(async_fn_in_trait)] about?
//    - async fn in a public trait does not promise the future is Send
//    - We only ever await it on the current task, so that is fine here
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(timeout: Duration) -> HttpFetcher {
        HttpFetcher::new(&HeaderSet::default(), timeout).unwrap()
    }

    #[tokio::test]
    async fn test_sends_browser_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/osobowe/bmw/"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/osobowe/bmw/?page=1", server.uri());
        let body = fetcher(Duration::from_secs(5)).fetch(&url).await.unwrap();
        assert_eq!(body, "<html>ok</html>");

        // compare raw values; several of them contain commas
        let requests = server.received_requests().await.unwrap();
        let sent = &requests[0].headers;
        let value = |name: &str| sent.get(name).unwrap().to_str().unwrap().to_string();
        let defaults = HeaderSet::default();
        assert_eq!(value("user-agent"), defaults.user_agent);
        assert_eq!(value("accept"), defaults.accept);
        assert_eq!(value("accept-charset"), defaults.accept_charset);
        assert_eq!(value("accept-encoding"), "none");
        assert_eq!(value("accept-language"), "en-US,en;q=0.8");
        assert_eq!(value("connection"), "keep-alive");
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetcher(Duration::from_secs(5))
            .fetch(&server.uri())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::Fetch { source: FetchCause::Status(503), .. }
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let err = fetcher(Duration::from_millis(200))
            .fetch(&server.uri())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::Fetch { source: FetchCause::Transport(_), .. }
        ));
    }

    #[test]
    fn test_invalid_header_value_rejected() {
        let headers = HeaderSet {
            user_agent: "bad\nagent".to_string(),
            ..HeaderSet::default()
        };
        assert!(HttpFetcher::new(&headers, Duration::from_secs(1)).is_err());
    }
}
