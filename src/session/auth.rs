//! Client for the authentication/permission service.

use std::future::Future;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::session::ApiConfig;
use crate::utils::{SessionError, SessionResult};

/// Permission hash controlling the management tab.
pub const MANAGEMENT_CONTROL_HASH: &str = "918001";

/// The calls the session layer makes against the auth service.
///
/// Bodies are returned as raw JSON because the service answers in several
/// shapes; interpretation happens in the callers.
pub trait AuthService: Send + Sync {
    /// `GET /auth/validate-token`
    fn validate_token(&self) -> impl Future<Output = SessionResult<Value>> + Send;

    /// `GET /auth/user-details`
    fn user_details(&self) -> impl Future<Output = SessionResult<Value>> + Send;

    /// `GET /perm/subpermissao?codUsur=..&hashControle=..`
    fn sub_permission(
        &self,
        registration: &str,
        control_hash: &str,
    ) -> impl Future<Output = SessionResult<Value>> + Send;
}

/// [`AuthService`] over HTTP, carrying session cookies on every request.
#[derive(Debug, Clone)]
pub struct HttpAuthService {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpAuthService {
    /// Builds a client with the configured timeout and a cookie store.
    ///
    /// `session_cookie` (e.g. `SESSION=abc`) is sent with every request, standing
    /// in for the browser's credentials.
    pub fn new(config: ApiConfig, session_cookie: Option<&str>) -> SessionResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| SessionError::Http(format!("invalid session cookie: {e}")))?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> SessionResult<Value> {
        let url = self.config.auth_endpoint(path);
        debug!("GET {}", url);

        let body = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        Ok(body)
    }
}

impl AuthService for HttpAuthService {
    async fn validate_token(&self) -> SessionResult<Value> {
        self.get_json("/auth/validate-token", &[]).await
    }

    async fn user_details(&self) -> SessionResult<Value> {
        self.get_json("/auth/user-details", &[]).await
    }

    async fn sub_permission(&self, registration: &str, control_hash: &str) -> SessionResult<Value> {
        self.get_json(
            "/perm/subpermissao",
            &[("codUsur", registration), ("hashControle", control_hash)],
        )
        .await
    }
}

/// Loose truthiness of a JSON body: `false`, `null`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether a sub-permission body grants access.
///
/// Accepts `true`, an object flagging `permitido`, `autorizado` or `acesso`,
/// a non-empty array, or any non-empty object.
pub fn permission_granted(body: &Value) -> bool {
    match body {
        Value::Bool(b) => *b,
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => {
            ["permitido", "autorizado", "acesso"]
                .iter()
                .any(|key| fields.get(*key) == Some(&Value::Bool(true)))
                || !fields.is_empty()
        }
        _ => false,
    }
}
