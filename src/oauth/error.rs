use thiserror::Error;

/// Why an OAuth2 step failed.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Provider is missing settings it needs (shop URL, client id...)
    #[error("OAuth provider not configured: {0}")]
    NotConfigured(String),

    /// The user or the provider refused the authorization
    #[error("OAuth authorization failed: {error} - {description}")]
    Denied { error: String, description: String },

    /// Callback `state` does not match the one stored at redirect time
    #[error("Invalid or expired OAuth state")]
    InvalidState,

    /// Callback carries no authorization code
    #[error("Missing 'code' parameter")]
    MissingCode,

    /// Token endpoint could not be reached
    #[error("Failed to send token exchange request: {0}")]
    Transport(String),

    /// Token endpoint answered with an error status
    #[error("Token exchange failed with status {status}: {body}")]
    Exchange { status: u16, body: String },

    /// Token endpoint answered with an unreadable body
    #[error("Failed to parse token response: {0}")]
    InvalidResponse(String),

    /// The token was obtained but could not be saved
    #[error("Failed to store access token: {0}")]
    Persist(String),
}
