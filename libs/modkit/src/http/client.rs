//! Traced HTTP client.
//!
//! Wraps `reqwest::Client` so that every outgoing request runs inside an
//! `outgoing_http` span carrying the method, URL and response status.

use tracing::{field, Instrument, Level};

#[derive(Clone, Debug)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Execute a built request inside an `outgoing_http` span.
    pub async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let span = tracing::span!(
            Level::INFO,
            "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            http.status_code = field::Empty,
            error = field::Empty,
        );

        let result = self.inner.execute(req).instrument(span.clone()).await;
        match &result {
            Ok(resp) => {
                span.record("http.status_code", resp.status().as_u16());
                if resp.status().is_client_error() || resp.status().is_server_error() {
                    span.record("error", true);
                }
            }
            Err(e) => {
                span.record("error", true);
                tracing::debug!(parent: &span, error = %e, "request failed");
            }
        }
        result
    }

    pub async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        let req = self.inner.get(url).build()?;
        self.execute(req).await
    }

    /// Start a request builder; finish with `.build()` and pass to [`TracedClient::execute`].
    pub fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;

    #[tokio::test]
    async fn get_reaches_server() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/api/health");
            then.status(200).body(r#"{"ok":true}"#);
        });

        let client = TracedClient::default();
        let resp = client
            .get(&format!("{}/api/health", server.base_url()))
            .await
            .unwrap();

        assert!(resp.status().is_success());
        m.assert();
    }

    #[tokio::test]
    async fn execute_passes_through_error_statuses() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(PATCH).path("/api/tasks/missing/complete");
            then.status(404);
        });

        let client = TracedClient::from(reqwest::Client::new());
        let req = client
            .request(
                reqwest::Method::PATCH,
                &format!("{}/api/tasks/missing/complete", server.base_url()),
            )
            .build()
            .unwrap();
        let resp = client.execute(req).await.unwrap();

        assert_eq!(resp.status().as_u16(), 404);
        m.assert();
    }

    #[tokio::test]
    async fn connection_errors_surface() {
        let client = TracedClient::default();
        // Port 9 (discard) is not expected to accept HTTP.
        assert!(client.get("http://127.0.0.1:9/").await.is_err());
    }
}
