use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::{oauth::OAuthError, routes::x::failure_page};

fn is_dev_mode() -> bool {
    std::env::var("DEVELOPMENT_MODE")
        .map(|v| v == "1")
        .unwrap_or(false)
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = ?self, "Request Error");
        } else {
            tracing::warn!(error = ?self, "Request Rejected");
        }

        if is_dev_mode() && status == StatusCode::INTERNAL_SERVER_ERROR {
            return (status, Html(dev_error_page(&self))).into_response();
        }

        (status, failure_page(&self)).into_response()
    }
}

/// Full error dump, only ever rendered with `DEVELOPMENT_MODE=1`
fn dev_error_page(error: &OAuthError) -> String {
    // Simple HTML escaping - replace dangerous characters
    let error_text = format!("{:?}", error)
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Development Error - 500</title>
    <style>
        body {{ font-family: monospace; margin: 20px; background: #1a1a1a; color: #fff; }}
        .error-container {{ background: #2d2d2d; padding: 20px; border-radius: 8px; }}
        .error-title {{ color: #ff6b6b; font-size: 24px; margin-bottom: 20px; }}
        .error-details {{ background: #000; padding: 15px; border-radius: 4px; overflow-x: auto; }}
        pre {{ margin: 0; white-space: pre-wrap; word-wrap: break-word; }}
    </style>
</head>
<body>
    <div class="error-container">
        <div class="error-title">Development Mode - Internal Server Error</div>
        <div class="error-details">
            <pre>{}</pre>
        </div>
    </div>
</body>
</html>"#,
        error_text
    )
}
