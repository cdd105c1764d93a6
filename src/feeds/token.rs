//! OAuth2 client-credentials exchange for app-only Twitter access.

use crate::config::TwitterConfig;
use crate::error::{FeedError, FeedResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use tracing::{debug, warn};

const GRANT_BODY: &str = "grant_type=client_credentials";

/// API key and secret issued to the application.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// `Authorization` header value for the token request.
    pub fn basic_auth_header(&self) -> String {
        let encoded = BASE64.encode(format!("{}:{}", self.api_key, self.api_secret));
        format!("Basic {}", encoded)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Short-lived app-only token. Obtained fresh for every feed build.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    value: String,
}

impl BearerToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token_type: Option<String>,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// Pull a readable message out of a Twitter v1.1 error body, falling back to the raw text.
pub(crate) fn api_error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.errors.into_iter().next());

    match parsed {
        Some(ApiErrorEntry {
            code: Some(code),
            message: Some(message),
        }) => format!("{} (code {})", message, code),
        Some(ApiErrorEntry {
            message: Some(message),
            ..
        }) => message,
        _ if body.trim().is_empty() => "empty response body".to_string(),
        _ => body.trim().to_string(),
    }
}

pub struct TokenProvider {
    token_url: String,
    client: reqwest::Client,
}

impl TokenProvider {
    pub fn new(config: &TwitterConfig, client: reqwest::Client) -> Self {
        Self {
            token_url: format!("{}/oauth2/token", config.api_base()),
            client,
        }
    }

    /// Exchange credentials for a bearer token. One round trip per call.
    pub async fn acquire_token(&self, credentials: &Credentials) -> FeedResult<BearerToken> {
        debug!(url = %self.token_url, api_key = %credentials.api_key(), "Requesting bearer token");

        let response = self
            .client
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, credentials.basic_auth_header())
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded;charset=UTF-8",
            )
            .body(GRANT_BODY)
            .send()
            .await
            .map_err(|e| FeedError::auth(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FeedError::auth(format!("failed to read token response: {e}")))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Token endpoint rejected credentials");
            return Err(FeedError::Auth {
                status: Some(status.as_u16()),
                message: api_error_message(&body),
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| FeedError::auth(format!("malformed token response: {e}")))?;

        if let Some(token_type) = parsed.token_type.as_deref() {
            if !token_type.eq_ignore_ascii_case("bearer") {
                return Err(FeedError::auth(format!(
                    "unexpected token type '{}'",
                    token_type
                )));
            }
        }

        match parsed.access_token {
            Some(token) if !token.is_empty() => Ok(BearerToken::new(token)),
            _ => Err(FeedError::auth("token response has no access_token")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_string, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn provider(mock_server: &MockServer) -> TokenProvider {
        let config = TwitterConfig {
            api_url: mock_server.uri(),
            ..Default::default()
        };
        TokenProvider::new(&config, reqwest::Client::new())
    }

    fn decode_basic(header: &str) -> String {
        let encoded = header.strip_prefix("Basic ").unwrap();
        String::from_utf8(BASE64.decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn test_basic_auth_header_round_trips() {
        let pairs = [
            ("key", "secret"),
            ("", ""),
            ("xvz1evFS4wEEPTGEFPHBog", "L8qq9PZyRg6ieKGEKhZolGC0vJWLw8iEJ88DRdyOg"),
            ("ключ", "pa:ss=word/+"),
        ];
        for (key, secret) in pairs {
            let header = Credentials::new(key, secret).basic_auth_header();
            assert_eq!(decode_basic(&header), format!("{}:{}", key, secret));
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("key", "hunter2");
        assert!(!format!("{:?}", creds).contains("hunter2"));

        let token = BearerToken::new("AAAA%2FAAA");
        assert!(!format!("{:?}", token).contains("AAAA"));
        assert_eq!(token.authorization_header(), "Bearer AAAA%2FAAA");
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"errors":[{"code":99,"message":"Unable to verify your credentials","label":"authenticity_token_error"}]}"#;
        assert_eq!(
            api_error_message(body),
            "Unable to verify your credentials (code 99)"
        );
        assert_eq!(api_error_message("Forbidden"), "Forbidden");
        assert_eq!(api_error_message(""), "empty response body");
    }

    #[tokio::test]
    async fn test_acquire_token_success() {
        let mock_server = MockServer::start().await;
        let creds = Credentials::new("key", "secret");

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(header("authorization", creds.basic_auth_header().as_str()))
            .and(header(
                "content-type",
                "application/x-www-form-urlencoded;charset=UTF-8",
            ))
            .and(body_string("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "bearer",
                "access_token": "AAAAAAAAAAAAAAAAAAAAA%2FAAAAAAAAAA"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let token = provider(&mock_server).acquire_token(&creds).await.unwrap();
        assert_eq!(token.value(), "AAAAAAAAAAAAAAAAAAAAA%2FAAAAAAAAAA");
    }

    #[tokio::test]
    async fn test_acquire_token_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "errors": [{"code": 99, "message": "Unable to verify your credentials"}]
            })))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .acquire_token(&Credentials::new("bad", "creds"))
            .await
            .unwrap_err();

        assert!(matches!(err, FeedError::Auth { status: Some(401), .. }));
        assert!(err.to_string().contains("Unable to verify your credentials"));
    }

    #[tokio::test]
    async fn test_acquire_token_missing_access_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "token_type": "bearer" })),
            )
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .acquire_token(&Credentials::new("key", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Auth { status: None, .. }));
    }

    #[tokio::test]
    async fn test_acquire_token_wrong_token_type() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "mac",
                "access_token": "abc"
            })))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .acquire_token(&Credentials::new("key", "secret"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unexpected token type"));
    }

    #[tokio::test]
    async fn test_acquire_token_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .acquire_token(&Credentials::new("key", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Auth { .. }));
    }

    #[tokio::test]
    async fn test_acquire_token_connection_refused() {
        let mock_server = MockServer::start().await;
        let config = TwitterConfig {
            api_url: mock_server.uri(),
            ..Default::default()
        };
        drop(mock_server);

        let err = TokenProvider::new(&config, reqwest::Client::new())
            .acquire_token(&Credentials::new("key", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Auth { status: None, .. }));
    }
}
