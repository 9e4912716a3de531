//! reqwest-backed [`AuthTransport`] against the portfolio backend.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::AuthError;

use super::{AuthTransport, LoginRequest, LoginResponse, UserProfile, VerifyRequest, VerifyResponse};

/// HTTP client for the `/auth/*` endpoints.
pub struct HttpAuthTransport {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAuthTransport {
    /// Build a transport for the given backend base URL
    /// (e.g. `https://api.folio.dev`). A trailing slash is tolerated.
    pub fn new(base_url: &str, timeout: std::time::Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/{path}", self.base_url)
    }

    /// Read the response body for error messages, best-effort.
    async fn body_text(resp: reqwest::Response) -> String {
        resp.text().await.unwrap_or_default()
    }
}

#[async_trait]
impl AuthTransport for HttpAuthTransport {
    async fn submit_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let resp = self
            .http
            .post(self.endpoint("login"))
            .json(&body)
            .send()
            .await
            .map_err(AuthError::transport)?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            let body = Self::body_text(resp).await;
            return Err(AuthError::Transport(format!("login failed ({status}): {body}")));
        }

        resp.json().await.map_err(AuthError::transport)
    }

    async fn verify_second_factor(
        &self,
        temp_token: &str,
        pin: &str,
    ) -> Result<VerifyResponse, AuthError> {
        let body = VerifyRequest {
            temp_token: temp_token.to_string(),
            pattern: pin.to_string(),
        };

        let resp = self
            .http
            .post(self.endpoint("verify-pattern"))
            .json(&body)
            .send()
            .await
            .map_err(AuthError::transport)?;

        let status = resp.status();
        // Wrong PIN — the challenge survives, caller may retry.
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidSecondFactor);
        }
        // The temporary token is gone (elapsed or already consumed).
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(AuthError::ChallengeExpired);
        }
        if !status.is_success() {
            tracing::warn!(%status, "undifferentiated verify-pattern failure");
            return Err(AuthError::VerificationFailed);
        }

        resp.json().await.map_err(AuthError::transport)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let resp = self
            .http
            .get(self.endpoint("profile"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(AuthError::transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = Self::body_text(resp).await;
            return Err(AuthError::Transport(format!(
                "profile fetch failed ({status}): {body}"
            )));
        }

        resp.json().await.map_err(AuthError::transport)
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn transport(base: &str) -> HttpAuthTransport {
        HttpAuthTransport::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn endpoint_construction() {
        let t = transport("https://api.folio.dev");
        assert_eq!(t.endpoint("login"), "https://api.folio.dev/auth/login");
        assert_eq!(
            t.endpoint("verify-pattern"),
            "https://api.folio.dev/auth/verify-pattern"
        );
        assert_eq!(t.endpoint("profile"), "https://api.folio.dev/auth/profile");
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        let t = transport("https://api.folio.dev/");
        assert_eq!(t.endpoint("login"), "https://api.folio.dev/auth/login");
    }

    #[test]
    fn client_creation_succeeds() {
        assert!(HttpAuthTransport::new("http://localhost:5000", Duration::from_secs(30)).is_ok());
    }
}
