//! Error taxonomy for the two-factor session flow.
//!
//! Every failure the manager or transport can surface maps onto one of
//! these variants, so the caller (CLI, route guard, any UI layer) can
//! tell "wrong credentials" from "wrong PIN" from "try again later"
//! without string matching.

use thiserror::Error;

/// Failure of the durable token store (file I/O, permissions).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Authentication protocol errors.
///
/// Recovery guidance per variant:
/// - [`InvalidCredentials`](AuthError::InvalidCredentials) — retry `login`.
/// - [`InvalidSecondFactor`](AuthError::InvalidSecondFactor) — the challenge
///   is still valid; retry `verify_pin_factor` with the same temporary token.
/// - [`ChallengeExpired`](AuthError::ChallengeExpired) and
///   [`VerificationFailed`](AuthError::VerificationFailed) — restart from
///   `login`.
/// - [`ProfileRestoreFailed`](AuthError::ProfileRestoreFailed) — full
///   authentication failure; the stored token has been cleared.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password rejected by the backend at step 1.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The temporary token is no longer valid (elapsed or already consumed).
    #[error("second-factor challenge expired; sign in again")]
    ChallengeExpired,

    /// PIN rejected but the challenge is still valid.
    #[error("incorrect PIN")]
    InvalidSecondFactor,

    /// Undifferentiated step-2 failure; treat as requiring a fresh login.
    #[error("second-factor verification failed")]
    VerificationFailed,

    /// Token exchange succeeded but the identity confirmation did not.
    /// The stored token is cleared before this is returned.
    #[error("could not confirm identity after sign-in")]
    ProfileRestoreFailed,

    /// A login/verify/restore call was rejected because another one is
    /// already in flight.
    #[error("another authentication request is already in progress")]
    OperationInProgress,

    /// Durable token store failure.
    #[error("session store failure: {0}")]
    Store(#[from] StoreError),

    /// Network/DNS/timeout-level failure, or a response the client could
    /// not make sense of. State is left unchanged when this is returned
    /// from `login`/`verify_pin_factor`.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl AuthError {
    /// Wrap a lower-level transport error. Kept as a message rather than a
    /// source chain so tests and mocks can construct the variant without a
    /// live `reqwest` error.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    /// Whether retrying `verify_pin_factor` with the same challenge can
    /// possibly succeed.
    pub fn challenge_still_valid(&self) -> bool {
        matches!(self, Self::InvalidSecondFactor)
    }
}
