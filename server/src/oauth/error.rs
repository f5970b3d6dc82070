use reqwest::StatusCode;

/// Everything that can end an authorization attempt or an authenticated call
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("state parameter does not match the pending authorization")]
    StateMismatch,

    #[error("provider denied authorization: {error}")]
    ProviderDenied {
        error: String,
        description: Option<String>,
    },

    #[error("callback did not include an authorization code")]
    MissingCode,

    #[error("token exchange failed with status {status}: {body}")]
    TokenExchange { status: StatusCode, body: String },

    #[error("X API returned {status}: {body}")]
    UpstreamApi { status: StatusCode, body: String },

    #[error("failed to encode authorization request: {0}")]
    Encoding(#[from] serde_urlencoded::ser::Error),

    #[error("request to X failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl OAuthError {
    /// Short machine-readable code shown on the failure page
    pub fn code(&self) -> &'static str {
        match self {
            OAuthError::Configuration(_) => "configuration_error",
            OAuthError::StateMismatch => "state_mismatch",
            OAuthError::ProviderDenied { .. } => "access_denied",
            OAuthError::MissingCode => "missing_code",
            OAuthError::TokenExchange { .. } => "token_exchange_failed",
            OAuthError::UpstreamApi { .. } => "upstream_api_error",
            OAuthError::Encoding(_) => "encoding_error",
            OAuthError::Http(_) => "network_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            OAuthError::StateMismatch
            | OAuthError::ProviderDenied { .. }
            | OAuthError::MissingCode => StatusCode::BAD_REQUEST,
            OAuthError::TokenExchange { .. }
            | OAuthError::UpstreamApi { .. }
            | OAuthError::Http(_) => StatusCode::BAD_GATEWAY,
            OAuthError::Configuration(_) | OAuthError::Encoding(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// X no longer accepts the access token the call was made with
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            OAuthError::UpstreamApi { status, .. } if *status == StatusCode::UNAUTHORIZED
        )
    }

    /// Whether this failure came out of the login handshake, as opposed to
    /// a later API call, and therefore needs a fresh `/start`.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            OAuthError::StateMismatch
                | OAuthError::ProviderDenied { .. }
                | OAuthError::MissingCode
                | OAuthError::TokenExchange { .. }
        )
    }
}
