//! HTTP client wrapper: authenticated requests and shared response
//! handling for both platform hosts.

use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};

use crate::config::KoboSession;

/// User-Agent sent with every platform request.
const USER_AGENT_VALUE: &str = concat!("kobopush/", env!("CARGO_PKG_VERSION"));

/// Errors from the platform API layer.
#[derive(Debug, thiserror::Error)]
pub enum KoboApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform rejected the credentials.
    #[error("Authentication rejected by the platform (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The platform returned a non-2xx status code.
    #[error("Platform API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for reporting.
        body: String,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Malformed platform response: {0}")]
    Malformed(String),

    /// The platform marked a data export as failed.
    #[error("Export failed on the platform side")]
    ExportFailed,

    /// A data export did not reach a terminal state in time.
    #[error("Export did not complete within {0} seconds")]
    ExportTimeout(u64),
}

impl KoboApiError {
    /// Whether this error means the transport itself is gone (connection
    /// refused / timed out), as opposed to the platform answering with an
    /// error. Transport loss halts a submission batch; answered errors
    /// stay per-row.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_connect() || e.is_timeout())
    }
}

/// Client for one authenticated platform session.
pub struct KoboClient {
    http: reqwest::Client,
    session: KoboSession,
}

impl KoboClient {
    /// Create a client for the given session.
    pub fn new(session: KoboSession) -> Self {
        Self {
            http: reqwest::Client::new(),
            session,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] (shares
    /// the connection pool across sessions).
    pub fn with_client(http: reqwest::Client, session: KoboSession) -> Self {
        Self { http, session }
    }

    /// The session this client authenticates as.
    pub fn session(&self) -> &KoboSession {
        &self.session
    }

    /// Authenticated GET expecting a JSON response.
    pub(crate) fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header(AUTHORIZATION, format!("Token {}", self.session.token))
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, USER_AGENT_VALUE)
    }

    /// Authenticated POST. Callers attach a JSON or multipart body.
    pub(crate) fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .post(url)
            .header(AUTHORIZATION, format!("Token {}", self.session.token))
            .header(USER_AGENT, USER_AGENT_VALUE)
    }

    /// Ensure the response has a success status code. 401/403 map to
    /// [`KoboApiError::Unauthorized`]; other failures carry the status
    /// and (truncated) body.
    pub(crate) async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, KoboApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(KoboApiError::Unauthorized {
                status: status.as_u16(),
            });
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(KoboApiError::Api {
            status: status.as_u16(),
            body: truncate_body(&body),
        })
    }

    /// Parse a successful JSON response body into the expected type.
    pub(crate) async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, KoboApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Cap error bodies so report reasons stay readable.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerChoice;

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");

        let long = "x".repeat(600);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), 501);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn test_client_exposes_session() {
        let session = KoboSession::new(&ServerChoice::Global, "tok");
        let client = KoboClient::new(session.clone());
        assert_eq!(client.session(), &session);
    }
}
