//! Authorization code redemption.
//!
//! The code is posted as a form together with the app credentials; the
//! provider answers with a JSON token document.

use super::{AccessToken, OAuthError};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::debug;

/// Token document returned by the provider. Shopify offline tokens carry
/// only `access_token` and `scope`.
#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

impl From<TokenResponse> for AccessToken {
    fn from(body: TokenResponse) -> Self {
        AccessToken {
            token: body.access_token,
            refresh_token: body.refresh_token,
            expires_at: body
                .expires_in
                .map(|seconds| Utc::now() + Duration::seconds(seconds)),
            scope: body.scope,
        }
    }
}

/// Redeem an authorization code at `token_url`.
///
/// `redirect_uri` is sent only when the provider checks it at redemption.
pub async fn exchange_code_for_token(
    token_url: &str,
    code: &str,
    redirect_uri: Option<&str>,
    client_id: &str,
    client_secret: &str,
) -> Result<AccessToken, OAuthError> {
    let mut form = vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", client_id),
        ("client_secret", client_secret),
    ];
    if let Some(redirect_uri) = redirect_uri {
        form.push(("redirect_uri", redirect_uri));
    }

    debug!(token_url = %token_url, "Redeeming authorization code");

    let response = reqwest::Client::new()
        .post(token_url)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&form)
        .send()
        .await
        .map_err(|e| OAuthError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(OAuthError::Exchange {
            status: status.as_u16(),
            body,
        });
    }

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| OAuthError::InvalidResponse(e.to_string()))?;

    debug!(
        refresh = body.refresh_token.is_some(),
        expires_in = ?body.expires_in,
        "Authorization code redeemed"
    );

    Ok(body.into())
}
