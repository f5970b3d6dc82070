use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    oauth::{OAuthError, OAuthToken, TokenResponse},
    session::SessionState,
    state::XOAuthConfig,
};

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Finish the authorization code flow for one session.
///
/// Nothing in the callback, provider errors included, is trusted until
/// `state` matches the pending attempt. A mismatch leaves that attempt in
/// place; a match consumes it whatever the outcome. On success the token is
/// bound to the session and the consumed post-login target is returned.
pub async fn complete_authorization(
    http: &reqwest::Client,
    config: &XOAuthConfig,
    session: &mut SessionState,
    params: CallbackParams,
) -> Result<String, OAuthError> {
    let state_matches = match (&session.pending, params.state.as_deref()) {
        (Some(pending), Some(returned)) => pending.state == returned,
        (None, _) => {
            warn!("Callback received with no authorization in flight");
            return Err(OAuthError::StateMismatch);
        }
        (Some(_), None) => false,
    };
    if !state_matches {
        warn!("Callback state does not match the pending authorization");
        return Err(OAuthError::StateMismatch);
    }

    // Consumed once state matches, so the same callback is never accepted twice
    let pending = session.take_pending().ok_or(OAuthError::StateMismatch)?;

    if let Some(error) = params.error {
        warn!(
            "Provider returned error to callback: {} - {:?}",
            error, params.error_description
        );
        return Err(OAuthError::ProviderDenied {
            error,
            description: params.error_description,
        });
    }

    let code = params.code.ok_or(OAuthError::MissingCode)?;

    let response = exchange_code_for_token(http, config, &code, &pending.code_verifier).await?;
    session.token = Some(OAuthToken::from_token_response(response, Utc::now()));

    let target = session.take_redirect_target();
    info!("X authorization complete, redirecting to {}", target);
    Ok(target)
}

/// Trade an authorization code for an access token.
///
/// Codes are single use, so a rejection is reported and never retried.
#[tracing::instrument(skip_all, fields(token_url = %config.token_url))]
pub async fn exchange_code_for_token(
    http: &reqwest::Client,
    config: &XOAuthConfig,
    code: &str,
    code_verifier: &str,
) -> Result<TokenResponse, OAuthError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("code_verifier", code_verifier),
        ("client_id", config.client_id.as_str()),
    ];

    let response = http
        .post(&config.token_url)
        .basic_auth(&config.client_id, Some(&config.client_secret))
        .form(&params)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("Token exchange failed with status {}: {}", status, body);
        return Err(OAuthError::TokenExchange { status, body });
    }

    Ok(response.json::<TokenResponse>().await?)
}
