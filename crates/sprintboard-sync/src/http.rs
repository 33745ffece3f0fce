//! `Transport` over HTTP with `reqwest`.

use crate::request::{ApiRequest, Method};
use crate::transport::Transport;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use sprintboard_core::{AppConfig, BoardError, BoardResult};
use std::sync::Arc;
use std::time::Duration;

/// Supplies the bearer credential for each request.
pub trait CredentialProvider: Send + Sync {
    /// `Ok(None)` sends the request without an `Authorization` header.
    fn token(&self) -> BoardResult<Option<String>>;
}

/// A fixed credential, typically read once from the environment.
#[derive(Clone, Default)]
pub struct StaticCredential {
    token: Option<String>,
}

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// Read the token from an environment variable. Unset or blank means
    /// anonymous.
    pub fn from_env(var: &str) -> Self {
        match std::env::var(var) {
            Ok(token) if !token.trim().is_empty() => Self::new(token.trim()),
            _ => Self::anonymous(),
        }
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredential")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl CredentialProvider for StaticCredential {
    fn token(&self) -> BoardResult<Option<String>> {
        Ok(self.token.clone())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> BoardResult<Self> {
        let base_url = parse_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BoardError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn from_config(
        config: &AppConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> BoardResult<Self> {
        Self::new(
            config.effective_api_base_url(),
            credentials,
            Duration::from_secs(config.effective_request_timeout_secs()),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> BoardResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| BoardError::Internal(format!("Invalid request path '{}': {}", path, e)))
    }
}

/// The base must end with `/` or `Url::join` drops its last segment.
fn parse_base_url(raw: &str) -> BoardResult<Url> {
    let mut base = raw.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base).map_err(|e| BoardError::Config(format!("Invalid API base URL '{}': {}", raw, e)))
}

/// Pull a readable message out of an error body.
fn rejection_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
        if value.is_object() || value.is_array() {
            return value.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> BoardResult<Value> {
        let url = self.url(&request.path)?;
        tracing::debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.into(), url);
        if let Some(token) = self.credentials.token()? {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BoardError::Connection(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BoardError::Connection(e.to_string()))?;

        if !status.is_success() {
            return Err(BoardError::RemoteRejection {
                status: status.as_u16(),
                message: rejection_message(status, &text),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("http://localhost:8000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/");
        assert_eq!(
            url.join("tasks/1/status/").unwrap().as_str(),
            "http://localhost:8000/api/tasks/1/status/"
        );
        assert!(matches!(
            parse_base_url("not a url"),
            Err(BoardError::Config(_))
        ));
    }

    #[test]
    fn test_rejection_message_prefers_detail() {
        assert_eq!(
            rejection_message(StatusCode::BAD_REQUEST, r#"{"detail":"Invalid sprint"}"#),
            "Invalid sprint"
        );
        assert_eq!(
            rejection_message(StatusCode::NOT_FOUND, ""),
            "Not Found"
        );
        assert_eq!(
            rejection_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
    }

    #[test]
    fn test_static_credential() {
        assert_eq!(
            StaticCredential::new("abc").token().unwrap(),
            Some("abc".to_string())
        );
        assert_eq!(StaticCredential::anonymous().token().unwrap(), None);
        assert_eq!(
            StaticCredential::from_env("SPRINTBOARD_TEST_UNSET_TOKEN_VAR")
                .token()
                .unwrap(),
            None
        );
        let debug = format!("{:?}", StaticCredential::new("secret"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_transport_from_config() {
        let config = AppConfig::default();
        let transport =
            HttpTransport::from_config(&config, Arc::new(StaticCredential::anonymous())).unwrap();
        assert_eq!(transport.base_url().as_str(), "http://localhost:8000/api/");
    }
}
