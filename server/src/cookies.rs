use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse as _, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use color_eyre::eyre::{eyre, WrapErr as _};
use tower_cookies::Key;
use tracing::{error, warn};

pub use tower_cookies::Cookie;

use crate::state::AppState;

/// Environment variable holding the base64-encoded cookie master key
pub const SESSION_KEY_ENV: &str = "SESSION_KEY";

/// Master key for the private (encrypted and authenticated) cookie jar
#[derive(Clone)]
pub struct CookieKey(pub Key);

impl CookieKey {
    pub fn from_env_or_generate() -> color_eyre::Result<Self> {
        match std::env::var(SESSION_KEY_ENV) {
            Ok(encoded) => Self::from_base64(&encoded),
            Err(_) => {
                warn!(
                    "{} not set, generating an ephemeral key. Sessions will not survive a restart",
                    SESSION_KEY_ENV
                );
                Ok(Self::generate())
            }
        }
    }

    pub fn from_base64(encoded: &str) -> color_eyre::Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .wrap_err("SESSION_KEY is not valid base64")?;

        let key = Key::try_from(bytes.as_slice()).map_err(|_| {
            eyre!(
                "SESSION_KEY must decode to at least 64 bytes, got {}",
                bytes.len()
            )
        })?;

        Ok(Self(key))
    }

    pub fn generate() -> Self {
        Self(Key::generate())
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0.master())
    }
}

pub struct CookieJar {
    cookies: tower_cookies::Cookies,
    state: AppState,
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for CookieJar {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = match tower_cookies::Cookies::from_request_parts(parts, state).await {
            Ok(cookies) => cookies,
            Err(_) => {
                error!("Failed to extract cookies from request");
                return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response());
            }
        };

        Ok(CookieJar {
            cookies,
            state: state.clone(),
        })
    }
}

impl CookieJar {
    /// Add a new private cookie
    pub fn add(&self, cookie: Cookie<'static>) {
        let private = self.cookies.private(&self.state.cookie_key.0);
        private.add(cookie);
    }

    /// Get a private cookie by name
    ///
    /// Cookies that fail to decrypt (tampered, or sealed with another key) read as absent.
    pub fn get(&self, name: &str) -> Option<Cookie<'static>> {
        let private = self.cookies.private(&self.state.cookie_key.0);
        private.get(name)
    }

    pub fn secure(&self) -> bool {
        self.state.secure_cookies
    }
}
