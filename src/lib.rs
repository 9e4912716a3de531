//! Two-factor session client for the Folio portfolio backend.
//!
//! The admin dashboard signs in with email + password, then a fixed-length
//! PIN; only then does the backend issue an access token. This crate owns
//! that flow end to end:
//!
//! - [`session::AuthSessionManager`] — the state machine (`login` →
//!   `verify_pin_factor` → `Authenticated`), token persistence, and
//!   startup restore.
//! - [`transport`] — the `/auth/*` wire contract and its reqwest client.
//! - [`store`] — durable token storage (the token is the only artifact
//!   that survives a restart; identity is always re-confirmed server-side).
//! - [`pin`] — the PIN-pad contract shared with any front end.
//!
//! The binary in `main.rs` is a terminal front end over the same API.

pub mod config;
pub mod error;
pub mod pin;
pub mod session;
pub mod store;
pub mod transport;

pub use config::AuthConfig;
pub use error::{AuthError, StoreError};
pub use pin::{PinPad, PinPolicy, DEFAULT_PIN_LENGTH};
pub use session::{AuthSessionManager, AuthState, PendingChallenge, Session};
pub use store::{FileTokenStore, MemoryTokenStore, SessionStore};
pub use transport::{AuthTransport, HttpAuthTransport, UserProfile};
