//! The session manager — single source of truth for the two-factor flow.
//!
//! ## Concurrency policy
//! At most one `login` / `verify_pin_factor` / `restore` is in flight at a
//! time; a second call while one is pending is rejected immediately with
//! [`AuthError::OperationInProgress`] (no queueing, no cancel-and-restart).
//!
//! `logout` is synchronous and always wins: it bumps a generation counter
//! under the state lock, so an in-flight verification that already wrote a
//! token discards its write at commit time instead of resurrecting a
//! logged-out session. The losing verification reports
//! [`AuthError::VerificationFailed`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use crate::error::AuthError;
use crate::pin::PinPolicy;
use crate::store::SessionStore;
use crate::transport::AuthTransport;

use super::{AuthState, PendingChallenge, Session};

/// Mediates the two-step login protocol and holds the current
/// [`AuthState`]. Consumers (route guards, the CLI) query [`state`]
/// synchronously to decide what to render.
///
/// [`state`]: AuthSessionManager::state
pub struct AuthSessionManager {
    transport: Arc<dyn AuthTransport>,
    store: Arc<dyn SessionStore>,
    pin_policy: PinPolicy,
    state: Mutex<AuthState>,
    /// Serializes the network-bound operations. `try_lock` failure maps to
    /// `OperationInProgress`.
    op_gate: tokio::sync::Mutex<()>,
    /// Bumped by `logout`; in-flight verifications compare against it
    /// before committing.
    generation: AtomicU64,
}

impl AuthSessionManager {
    pub fn new(
        transport: Arc<dyn AuthTransport>,
        store: Arc<dyn SessionStore>,
        pin_policy: PinPolicy,
    ) -> Self {
        Self {
            transport,
            store,
            pin_policy,
            state: Mutex::new(AuthState::Unauthenticated),
            op_gate: tokio::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state.lock().clone()
    }

    /// Whether the backend has confirmed the current identity.
    pub fn is_authenticated(&self) -> bool {
        self.state.lock().is_authenticated()
    }

    /// The established session, if any.
    pub fn session(&self) -> Option<Session> {
        match &*self.state.lock() {
            AuthState::Authenticated(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// The PIN shape this backend expects; exposed for the UI layer.
    pub fn pin_policy(&self) -> PinPolicy {
        self.pin_policy
    }

    /// Re-validate a stored token at process start.
    ///
    /// No stored token: straight to `Unauthenticated`, no network call.
    /// Stored token: `Restoring` while the profile endpoint confirms it;
    /// any failure clears the token and falls back to `Unauthenticated`
    /// silently — an expired session is the expected outcome here, not a
    /// fault. Calling this again after a session is established is a no-op.
    pub async fn restore(&self) -> Result<(), AuthError> {
        let _gate = self
            .op_gate
            .try_lock()
            .map_err(|_| AuthError::OperationInProgress)?;

        if self.state.lock().is_authenticated() {
            return Ok(());
        }

        let token = match self.store.get()? {
            Some(token) => token,
            None => {
                *self.state.lock() = AuthState::Unauthenticated;
                return Ok(());
            }
        };

        let generation = self.generation.load(Ordering::SeqCst);
        *self.state.lock() = AuthState::Restoring;

        match self.transport.fetch_profile(&token).await {
            Ok(user) => {
                let mut state = self.state.lock();
                if self.generation.load(Ordering::SeqCst) != generation {
                    // Logged out mid-restore; the store is already clear.
                    return Ok(());
                }
                tracing::info!(user_id = %user.user_id, "session restored from stored token");
                *state = AuthState::Authenticated(Session {
                    access_token: token,
                    user,
                });
            }
            Err(err) => {
                tracing::debug!(error = %err, "stored token rejected; clearing");
                self.store.clear()?;
                let mut state = self.state.lock();
                if self.generation.load(Ordering::SeqCst) == generation {
                    *state = AuthState::Unauthenticated;
                }
            }
        }

        Ok(())
    }

    /// Step 1: submit credentials, receive the second-factor challenge.
    ///
    /// On failure the prior state is untouched and the error propagates;
    /// no retry is attempted here.
    pub async fn login(&self, email: &str, password: &str) -> Result<PendingChallenge, AuthError> {
        let _gate = self
            .op_gate
            .try_lock()
            .map_err(|_| AuthError::OperationInProgress)?;

        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let resp = self.transport.submit_credentials(email, password).await?;

        // The protocol has no single-factor success path; a response
        // without a usable challenge is a backend contract violation.
        if !resp.requires_pattern {
            return Err(AuthError::Transport(
                "backend offered a single-factor login, which this client does not support".into(),
            ));
        }
        let temporary_token = resp.temp_token.ok_or_else(|| {
            AuthError::Transport("login response missing tempToken".into())
        })?;

        let challenge = PendingChallenge {
            temporary_token,
            issued_at: Utc::now(),
        };
        tracing::info!("credentials accepted; second factor required");
        *self.state.lock() = AuthState::CredentialsSubmitted(challenge.clone());

        Ok(challenge)
    }

    /// Step 2: exchange the temporary token + PIN for a session.
    ///
    /// On success the access token is persisted first, then the identity is
    /// re-derived from the profile endpoint — a locally assembled user is
    /// never trusted. On any step-2 failure the pending challenge is kept;
    /// whether to retry with the same temporary token or restart from
    /// `login` is the caller's decision (see [`AuthError`]).
    pub async fn verify_pin_factor(&self, temporary_token: &str, pin: &str) -> Result<(), AuthError> {
        let _gate = self
            .op_gate
            .try_lock()
            .map_err(|_| AuthError::OperationInProgress)?;

        self.pin_policy.validate(pin)?;

        let generation = self.generation.load(Ordering::SeqCst);
        let resp = self
            .transport
            .verify_second_factor(temporary_token, pin)
            .await?;

        // Persist the token before confirming identity. The generation
        // check under the state lock keeps a concurrent logout from being
        // overwritten by this write.
        {
            let _state = self.state.lock();
            if self.generation.load(Ordering::SeqCst) != generation {
                return Err(AuthError::VerificationFailed);
            }
            self.store.set(&resp.access_token)?;
        }

        match self.transport.fetch_profile(&resp.access_token).await {
            Ok(user) => {
                let mut state = self.state.lock();
                if self.generation.load(Ordering::SeqCst) != generation {
                    // Logout raced the profile fetch and wins.
                    self.store.clear()?;
                    return Err(AuthError::VerificationFailed);
                }
                tracing::info!(user_id = %user.user_id, "second factor verified; session established");
                *state = AuthState::Authenticated(Session {
                    access_token: resp.access_token,
                    user,
                });
                Ok(())
            }
            Err(err) => {
                // Token write nominally succeeded, but identity was never
                // confirmed: full authentication failure.
                tracing::warn!(error = %err, "profile confirmation failed after token issue");
                self.store.clear()?;
                let mut state = self.state.lock();
                if self.generation.load(Ordering::SeqCst) == generation {
                    *state = AuthState::Unauthenticated;
                }
                Err(AuthError::ProfileRestoreFailed)
            }
        }
    }

    /// Abandon a pending second-factor challenge ("back to login").
    /// No-op outside `CredentialsSubmitted`.
    pub fn cancel_challenge(&self) {
        let mut state = self.state.lock();
        if matches!(*state, AuthState::CredentialsSubmitted(_)) {
            tracing::debug!("second-factor challenge cancelled");
            *state = AuthState::Unauthenticated;
        }
    }

    /// Drop the session unconditionally, from any state.
    ///
    /// Clears the stored token, discards any pending challenge, and lands
    /// in `Unauthenticated`. Purely local; the backend is not notified.
    pub fn logout(&self) {
        let mut state = self.state.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear stored token on logout");
        }
        *state = AuthState::Unauthenticated;
        tracing::info!("logged out");
    }
}

// ── Tests ───────────────────────────────────────────────────────
