use maud::html;

use crate::{
    components::{
        layout::{Card, ContentSection, Page},
        ui::{
            badge::{Badge, BadgeColor},
            button::Button,
            heading::Heading,
        },
    },
    oauth::OAuthError,
};

/// User-facing failure page for any [`OAuthError`]
pub fn failure_page(error: &OAuthError) -> Page {
    let (title, message) = describe(error);

    let content = html! {
        (Heading::h1(title))
        p class="text-gray-700 mb-4" { (message) }

        div class="mb-6" {
            (Badge::new(error.code(), BadgeColor::Red).rounded(true))
        }

        @if error.is_authentication_failure() {
            (Button::primary("Try again").href("/start").full_width(true))
        } @else {
            (Button::primary("Return to Home").href("/").full_width(true))
        }
    };

    Page::new(
        format!("{} - birdgate", title),
        Box::new(Card::new(ContentSection::new(content)).with_max_width("max-w-lg")),
    )
}

fn describe(error: &OAuthError) -> (&'static str, String) {
    match error {
        OAuthError::StateMismatch => (
            "Authentication Error",
            "This sign-in attempt has expired or was already used. Please start again.".to_string(),
        ),
        OAuthError::ProviderDenied { description, .. } => (
            "Authentication Error",
            description
                .clone()
                .unwrap_or_else(|| "X did not grant access to your account.".to_string()),
        ),
        OAuthError::MissingCode => (
            "Authentication Error",
            "X sent you back without an authorization code.".to_string(),
        ),
        OAuthError::TokenExchange { .. } => (
            "Authentication Error",
            "X rejected the sign-in. Please start again.".to_string(),
        ),
        OAuthError::UpstreamApi { status, .. } => (
            "X Request Failed",
            format!("X answered with {status}."),
        ),
        OAuthError::Http(_) => (
            "X Request Failed",
            "We could not reach X. Please try again shortly.".to_string(),
        ),
        OAuthError::Configuration(_) | OAuthError::Encoding(_) => (
            "Something Went Wrong",
            "The server is misconfigured.".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maud::Render as _;

    #[test]
    fn test_authentication_failures_link_to_start() {
        let page = failure_page(&OAuthError::StateMismatch).render().into_string();
        assert!(page.contains("state_mismatch"));
        assert!(page.contains("href=\"/start\""));
        assert!(page.contains("Try again"));
    }

    #[test]
    fn test_provider_description_is_escaped() {
        let page = failure_page(&OAuthError::ProviderDenied {
            error: "access_denied".to_string(),
            description: Some("<b>nope</b>".to_string()),
        })
        .render()
        .into_string();

        assert!(page.contains("&lt;b&gt;nope&lt;/b&gt;"));
    }

    #[test]
    fn test_api_failures_link_home() {
        let page = failure_page(&OAuthError::UpstreamApi {
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
        })
        .render()
        .into_string();

        assert!(page.contains("429"));
        assert!(page.contains("Return to Home"));
    }
}
