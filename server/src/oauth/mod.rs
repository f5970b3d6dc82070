//! OAuth2 authorization code flow with PKCE against X.
//!
//! `authorize` starts an attempt, `callback` finishes it, `pkce` and `token`
//! hold the pieces both sides share.

pub mod authorize;
pub mod callback;
pub mod error;
pub mod pkce;
pub mod token;

pub use authorize::{begin_authorization, AuthorizationStart};
pub use callback::{complete_authorization, exchange_code_for_token, CallbackParams};
pub use error::OAuthError;
pub use pkce::PkcePair;
pub use token::{OAuthToken, TokenResponse};
