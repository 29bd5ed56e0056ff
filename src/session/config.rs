//! Service endpoints, read from the environment.

use std::time::Duration;

use serde::Serialize;

pub const ENV_API_URL: &str = "ABASTECIMENTO_API_URL";
pub const ENV_AUTH_URL: &str = "ABASTECIMENTO_AUTH_URL";
pub const ENV_LOCAL_URL: &str = "ABASTECIMENTO_LOCAL_URL";
pub const ENV_ROUTINE: &str = "ABASTECIMENTO_ROUTINE";
pub const ENV_MODE: &str = "ABASTECIMENTO_ENV";

const DEFAULT_API_URL: &str = "https://api.acobrazil.com.br/abastecimento/api";
const DEFAULT_AUTH_URL: &str = "https://api.acobrazil.com.br/authenticate";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the backend services live and how the guard behaves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Domain API base URL
    pub api_url: String,
    /// Authentication/permission service base URL
    pub auth_url: String,
    /// Host serving the forbidden page
    pub local_url: String,
    /// Routine code a user must hold to enter guarded routes
    pub routine: String,
    /// Development mode skips every remote check
    pub dev_mode: bool,
    #[serde(skip)]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            local_url: String::new(),
            routine: String::new(),
            dev_mode: false,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            api_url: get(ENV_API_URL).unwrap_or(defaults.api_url),
            auth_url: get(ENV_AUTH_URL).unwrap_or(defaults.auth_url),
            local_url: get(ENV_LOCAL_URL).unwrap_or(defaults.local_url),
            routine: get(ENV_ROUTINE).unwrap_or(defaults.routine),
            dev_mode: get(ENV_MODE).is_some_and(|mode| {
                mode.eq_ignore_ascii_case("development") || mode.eq_ignore_ascii_case("dev")
            }),
            timeout: defaults.timeout,
        }
    }

    /// Auth service URL for `path` (which starts with `/`).
    pub fn auth_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.auth_url.trim_end_matches('/'), path)
    }

    /// Redirect target for denied navigation.
    pub fn forbidden_url(&self) -> String {
        format!("{}/forbidden", self.local_url.trim_end_matches('/'))
    }
}
