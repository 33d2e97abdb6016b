//! Google OAuth token endpoint (`refresh_token` grant)

use reqwest::Client;
use serde::Deserialize;

use crate::error::TokenError;

use super::{RefreshRequest, TokenEndpoint, TokenGrant, truncate};

/// Google's token endpoint
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Token endpoint client
pub struct GoogleTokenEndpoint {
    client: Client,
    url: String,
}

impl GoogleTokenEndpoint {
    /// Client for Google's public endpoint
    pub fn new() -> Self {
        Self::with_url(DEFAULT_TOKEN_ENDPOINT)
    }

    /// Client for a custom endpoint
    pub fn with_url(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }
}

impl Default for GoogleTokenEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenEndpoint for GoogleTokenEndpoint {
    async fn refresh(&self, request: &RefreshRequest<'_>) -> Result<TokenGrant, TokenError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", request.refresh_token),
            ("client_id", request.client_id),
            ("client_secret", request.client_secret),
        ];

        let response = self
            .client
            .post(&self.url)
            .form(&params)
            .send()
            .await
            .map_err(|e| TokenError::Other(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TokenError::Other(format!("failed to read response: {}", e.without_url())))?;

        if !status.is_success() {
            return Err(classify_token_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| TokenError::Other(format!("failed to parse token response: {e}")))
    }
}

/// Map a failed token response to [`TokenError`].
///
/// Only an `invalid_grant` error code means the refresh token itself is
/// dead; every other code or an unreadable body is reported as `Other`.
pub fn classify_token_error(status: u16, body: &str) -> TokenError {
    match serde_json::from_str::<TokenErrorBody>(body) {
        Ok(err) if err.error == "invalid_grant" => TokenError::InvalidGrant(
            err.error_description
                .unwrap_or_else(|| "refresh token expired or revoked".to_string()),
        ),
        Ok(err) => TokenError::Other(match err.error_description {
            Some(description) => format!("{status} {}: {description}", err.error),
            None => format!("{status} {}", err.error),
        }),
        Err(_) => TokenError::Other(format!("{status}: {}", truncate(body, 200))),
    }
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_grant() {
        let body = r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#;
        assert_eq!(
            classify_token_error(400, body),
            TokenError::InvalidGrant("Token has been expired or revoked.".to_string())
        );
    }

    #[test]
    fn test_invalid_grant_without_description() {
        assert!(matches!(
            classify_token_error(400, r#"{"error":"invalid_grant"}"#),
            TokenError::InvalidGrant(_)
        ));
    }

    #[test]
    fn test_other_error_codes() {
        let body = r#"{"error":"invalid_client","error_description":"The OAuth client was not found."}"#;
        assert_eq!(
            classify_token_error(401, body),
            TokenError::Other("401 invalid_client: The OAuth client was not found.".to_string())
        );
    }

    #[test]
    fn test_unparseable_body() {
        assert_eq!(
            classify_token_error(502, "<html>Bad Gateway</html>"),
            TokenError::Other("502: <html>Bad Gateway</html>".to_string())
        );
    }

    #[test]
    fn test_grant_parses_google_response() {
        let body = r#"{"access_token":"ya29.a0","expires_in":3599,"scope":"https://www.googleapis.com/auth/blogger","token_type":"Bearer"}"#;
        let grant: TokenGrant = serde_json::from_str(body).unwrap();
        assert_eq!(grant.access_token, "ya29.a0");
        assert_eq!(grant.expires_in, Some(3599));
    }
}
