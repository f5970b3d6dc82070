use reqwest::{header, Method, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::error;

use crate::oauth::OAuthError;

/// X wraps every v2 payload in `{"data": ...}`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// The authenticated user, as returned by `/2/users/me`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct XUser {
    pub id: String,
    pub name: String,
    pub username: String,
}

/// A tweet created through `/2/tweets`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostedTweet {
    pub id: String,
    pub text: String,
}

/// Outbound client acting on behalf of one access token
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: &str, access_token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// Send one authenticated request and hand back the raw response.
    ///
    /// Non-2xx statuses are not errors here; only transport failures are.
    #[tracing::instrument(skip(self, payload))]
    pub async fn call(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&Value>,
    ) -> Result<Response, OAuthError> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));

        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(&self.access_token)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        Ok(request.send().await?)
    }

    pub async fn me(&self) -> Result<XUser, OAuthError> {
        let response = self.call(Method::GET, "/2/users/me", None).await?;
        read_data(response).await
    }

    pub async fn post_tweet(&self, text: &str) -> Result<PostedTweet, OAuthError> {
        let payload = json!({ "text": text });
        let response = self.call(Method::POST, "/2/tweets", Some(&payload)).await?;
        read_data(response).await
    }
}

/// Unwrap `data` from a successful response, or surface the upstream failure
async fn read_data<T: DeserializeOwned>(response: Response) -> Result<T, OAuthError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("X API request failed with status {}: {}", status, body);
        return Err(OAuthError::UpstreamApi { status, body });
    }

    let envelope: Envelope<T> = response.json().await?;
    Ok(envelope.data)
}
