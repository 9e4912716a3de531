//! Backend transport for the two-factor login protocol.
//!
//! Three endpoints, three calls:
//! - `POST /auth/login`          — credentials in, temporary token out
//! - `POST /auth/verify-pattern` — temporary token + PIN in, access token out
//! - `GET  /auth/profile`        — bearer token in, confirmed identity out
//!
//! The legacy backend calls the PIN a "pattern" on the wire; the field
//! names below are the bit-exact contract and must not be renamed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

mod http;

pub use http::HttpAuthTransport;

// ── Wire shapes ─────────────────────────────────────────────────

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/login`.
///
/// `requires_pattern` is always `true` in practice (the protocol has no
/// single-factor success path) but is carried structurally so a backend
/// that ever flips it produces a clean client-side error instead of a
/// decode failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub requires_pattern: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_token: Option<String>,
}

/// Body of `POST /auth/verify-pattern`. The `pattern` field carries the
/// PIN digit string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub temp_token: String,
    pub pattern: String,
}

/// Response of `POST /auth/verify-pattern`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub access_token: String,
}

/// Response of `GET /auth/profile` — the server-confirmed identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
}

// ── Transport trait ─────────────────────────────────────────────

/// Abstract HTTP client for the auth backend.
///
/// Implementations map status codes onto the [`AuthError`] taxonomy:
/// rejected credentials become [`AuthError::InvalidCredentials`], a wrong
/// PIN [`AuthError::InvalidSecondFactor`], a dead challenge
/// [`AuthError::ChallengeExpired`], and connection-level failures
/// [`AuthError::Transport`]. The session manager never inspects status
/// codes itself.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Step 1: submit email + password, receive the second-factor challenge.
    async fn submit_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthError>;

    /// Step 2: exchange the temporary token + PIN for an access token.
    async fn verify_second_factor(
        &self,
        temp_token: &str,
        pin: &str,
    ) -> Result<VerifyResponse, AuthError>;

    /// Confirm the identity behind an access token.
    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, AuthError>;
}

// ── Tests ───────────────────────────────────────────────────────
