//! Two-factor session state.
//!
//! The state machine (owned by [`AuthSessionManager`]):
//!
//! ```text
//! Unauthenticated --login(ok)--> CredentialsSubmitted
//! Unauthenticated --restore(token found)--> Restoring
//! Restoring --profile ok--> Authenticated
//! Restoring --profile fail--> Unauthenticated
//! CredentialsSubmitted --verify_pin_factor(ok)--> Authenticated
//! CredentialsSubmitted --verify_pin_factor(fail)--> CredentialsSubmitted
//! CredentialsSubmitted --cancel--> Unauthenticated
//! (any state) --logout--> Unauthenticated
//! ```
//!
//! `Unauthenticated` and `Authenticated` are the only stable states; the
//! other two are transient and a UI should render them as loading.

use chrono::{DateTime, Utc};

use crate::transport::UserProfile;

mod manager;

pub use manager::AuthSessionManager;

/// An in-progress second factor. Held only in memory: a process restart
/// intentionally forces the flow back to step 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChallenge {
    /// Temporary token returned by the login endpoint; exchanged together
    /// with the PIN for an access token.
    pub temporary_token: String,
    /// When the challenge was issued (client clock).
    pub issued_at: DateTime<Utc>,
}

/// A fully established session. Only `access_token` is ever persisted;
/// `user` is re-derived from the backend on every process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: UserProfile,
}

/// Current position in the two-factor flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No session, no challenge. Fresh process or after logout.
    Unauthenticated,
    /// A stored token was found at startup and is being re-validated.
    Restoring,
    /// Credentials accepted; waiting on the PIN factor.
    CredentialsSubmitted(PendingChallenge),
    /// Identity confirmed server-side.
    Authenticated(Session),
}

impl AuthState {
    /// True only once the backend has confirmed the identity behind the
    /// token — never derived from locally stored data alone.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    /// Whether a UI can render a full screen for this state (as opposed
    /// to a loading indicator).
    pub fn is_stable(&self) -> bool {
        matches!(self, AuthState::Unauthenticated | AuthState::Authenticated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_authenticated_counts_as_authenticated() {
        assert!(!AuthState::Unauthenticated.is_authenticated());
        assert!(!AuthState::Restoring.is_authenticated());
        assert!(!AuthState::CredentialsSubmitted(PendingChallenge {
            temporary_token: "T1".into(),
            issued_at: Utc::now(),
        })
        .is_authenticated());
        assert!(AuthState::Authenticated(Session {
            access_token: "A1".into(),
            user: UserProfile {
                user_id: "u_1".into(),
                email: "a@b.com".into(),
            },
        })
        .is_authenticated());
    }

    #[test]
    fn transient_states_are_not_stable() {
        assert!(AuthState::Unauthenticated.is_stable());
        assert!(!AuthState::Restoring.is_stable());
        assert!(!AuthState::CredentialsSubmitted(PendingChallenge {
            temporary_token: "T1".into(),
            issued_at: Utc::now(),
        })
        .is_stable());
    }
}
