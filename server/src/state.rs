use std::{fmt, sync::Arc, time::Duration};

use color_eyre::eyre::WrapErr as _;
use tracing::info;

use crate::{
    api::ApiClient,
    cookies::CookieKey,
    oauth::{OAuthError, OAuthToken},
};

pub const DEFAULT_AUTHORIZE_URL: &str = "https://twitter.com/i/oauth2/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://api.twitter.com/2/oauth2/token";
pub const DEFAULT_API_URL: &str = "https://api.twitter.com";
pub const DEFAULT_SCOPES: &[&str] = &["tweet.read", "users.read", "tweet.write", "offline.access"];

/// Timeout for every outbound call to X
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// OAuth client registration plus the provider endpoints it talks to
#[derive(Clone)]
pub struct XOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub api_url: String,
    pub scopes: Vec<String>,
}

impl fmt::Debug for XOAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("api_url", &self.api_url)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl XOAuthConfig {
    /// Config pointing at the real X endpoints with the default scopes
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_env() -> Result<Self, OAuthError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source. Blank values count as missing.
    pub fn from_lookup<F>(source: F) -> Result<Self, OAuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| source(name).filter(|value| !value.trim().is_empty());
        let required = |name: &str| {
            lookup(name).ok_or_else(|| {
                OAuthError::Configuration(format!("{name} environment variable not set"))
            })
        };

        let mut config = Self::new(
            required("CLIENT_ID")?,
            required("CLIENT_SECRET")?,
            required("REDIRECT_URI")?,
        );

        if let Some(url) = lookup("X_AUTHORIZE_URL") {
            config.authorize_url = url;
        }
        if let Some(url) = lookup("X_TOKEN_URL") {
            config.token_url = url;
        }
        if let Some(url) = lookup("X_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(scopes) = lookup("X_SCOPES") {
            config.scopes = scopes.split_whitespace().map(str::to_string).collect();
        }

        Ok(config)
    }

    /// Point every endpoint at one base URL, the way the fixture provider lays them out
    pub fn with_provider_base(mut self, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        self.authorize_url = format!("{base_url}/i/oauth2/authorize");
        self.token_url = format!("{base_url}/2/oauth2/token");
        self.api_url = base_url.to_string();
        self
    }
}

#[derive(Clone)]
pub struct AppState {
    pub x_oauth: Arc<XOAuthConfig>,
    pub cookie_key: CookieKey,
    pub http: reqwest::Client,
    /// Mark cookies `Secure`; on whenever we are served over https
    pub secure_cookies: bool,
}

impl AppState {
    pub fn from_env() -> color_eyre::Result<Self> {
        let x_oauth = XOAuthConfig::from_env()?;
        info!("REDIRECT_URI: {}", x_oauth.redirect_uri);

        let cookie_key = CookieKey::from_env_or_generate()?;
        let secure_cookies = std::env::var("PROTO").ok().as_deref() == Some("https");

        Self::new(x_oauth, cookie_key, secure_cookies)
    }

    pub fn new(
        x_oauth: XOAuthConfig,
        cookie_key: CookieKey,
        secure_cookies: bool,
    ) -> color_eyre::Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .timeout(HTTP_TIMEOUT)
            .use_rustls_tls()
            .build()
            .wrap_err("Failed to build HTTP client")?;

        Ok(Self {
            x_oauth: Arc::new(x_oauth),
            cookie_key,
            http,
            secure_cookies,
        })
    }

    /// API client acting as the holder of `token`
    pub fn api_client(&self, token: &OAuthToken) -> ApiClient {
        ApiClient::new(self.http.clone(), &self.x_oauth.api_url, &token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_required_values() {
        let config = XOAuthConfig::from_lookup(lookup_from(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "secret"),
            ("REDIRECT_URI", "http://localhost:3000/oauth/callback"),
        ]))
        .unwrap();

        assert_eq!(config.client_id, "id");
        assert_eq!(config.authorize_url, DEFAULT_AUTHORIZE_URL);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(
            config.scopes,
            vec!["tweet.read", "users.read", "tweet.write", "offline.access"]
        );
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let err = XOAuthConfig::from_lookup(lookup_from(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "  "),
            ("REDIRECT_URI", "http://localhost:3000/oauth/callback"),
        ]))
        .unwrap_err();

        match err {
            OAuthError::Configuration(message) => assert!(message.contains("CLIENT_SECRET")),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_endpoint_overrides() {
        let config = XOAuthConfig::from_lookup(lookup_from(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "secret"),
            ("REDIRECT_URI", "http://localhost:3000/oauth/callback"),
            ("X_API_URL", "http://localhost:4000/"),
            ("X_SCOPES", "tweet.read users.read"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:4000");
        assert_eq!(config.scopes, vec!["tweet.read", "users.read"]);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = XOAuthConfig::new("id", "super-secret", "http://localhost/cb");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_provider_base() {
        let config =
            XOAuthConfig::new("id", "secret", "http://localhost/cb").with_provider_base("http://127.0.0.1:9000/");
        assert_eq!(config.authorize_url, "http://127.0.0.1:9000/i/oauth2/authorize");
        assert_eq!(config.token_url, "http://127.0.0.1:9000/2/oauth2/token");
        assert_eq!(config.api_url, "http://127.0.0.1:9000");
    }
}
