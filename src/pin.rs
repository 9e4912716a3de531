//! PIN-pad contract shared between the session manager and its host UI.
//!
//! The backend's second factor is a fixed-length digit string. The policy
//! here fixes two things for every front end:
//! - submission happens automatically at exactly `length` digits, and
//! - a rejected PIN clears the visual input but never the pending
//!   challenge (the challenge lives in the session manager).

use crate::error::AuthError;

/// Default second-factor length (digits).
pub const DEFAULT_PIN_LENGTH: usize = 9;

/// Shape of the second factor a UI must collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinPolicy {
    /// Exact number of digits.
    pub length: usize,
    /// Submit as soon as `length` digits are entered (no confirm key).
    pub auto_submit_on_length: bool,
}

impl Default for PinPolicy {
    fn default() -> Self {
        Self {
            length: DEFAULT_PIN_LENGTH,
            auto_submit_on_length: true,
        }
    }
}

impl PinPolicy {
    pub fn with_length(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    /// Check a candidate PIN before it goes anywhere near the network.
    /// A malformed PIN is reported as [`AuthError::InvalidSecondFactor`];
    /// the challenge stays valid, the caller just re-prompts.
    pub fn validate(&self, pin: &str) -> Result<(), AuthError> {
        if pin.len() != self.length || !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthError::InvalidSecondFactor);
        }
        Ok(())
    }
}

// ── Entry-pad state ─────────────────────────────────────────────

/// Digit-entry state for a PIN pad.
///
/// The host UI forwards key events (`push`, `backspace`, `clear`) and
/// submits the value once [`PinPad::completed`] turns true. Non-digit
/// input and overflow past the policy length are ignored.
#[derive(Debug, Clone)]
pub struct PinPad {
    policy: PinPolicy,
    digits: String,
}

impl PinPad {
    pub fn new(policy: PinPolicy) -> Self {
        Self {
            policy,
            digits: String::with_capacity(policy.length),
        }
    }

    /// Append a digit. Returns `true` when the pad just became complete
    /// (the auto-submit trigger).
    pub fn push(&mut self, c: char) -> bool {
        if !c.is_ascii_digit() || self.completed() {
            return false;
        }
        self.digits.push(c);
        self.policy.auto_submit_on_length && self.completed()
    }

    /// Remove the most recent digit, if any.
    pub fn backspace(&mut self) {
        self.digits.pop();
    }

    /// Wipe the entered digits. Called by the UI after a rejected PIN.
    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn completed(&self) -> bool {
        self.digits.len() == self.policy.length
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// The digits entered so far.
    pub fn value(&self) -> &str {
        &self.digits
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_nine_digit_auto_submit() {
        let policy = PinPolicy::default();
        assert_eq!(policy.length, 9);
        assert!(policy.auto_submit_on_length);
    }

    #[test]
    fn validate_accepts_exact_digits() {
        let policy = PinPolicy::default();
        assert!(policy.validate("123456789").is_ok());
    }

    #[test]
    fn validate_rejects_wrong_length_and_non_digits() {
        let policy = PinPolicy::default();
        assert!(matches!(
            policy.validate("12345678"),
            Err(AuthError::InvalidSecondFactor)
        ));
        assert!(matches!(
            policy.validate("1234567890"),
            Err(AuthError::InvalidSecondFactor)
        ));
        assert!(matches!(
            policy.validate("12345678a"),
            Err(AuthError::InvalidSecondFactor)
        ));
        assert!(matches!(
            policy.validate(""),
            Err(AuthError::InvalidSecondFactor)
        ));
    }

    #[test]
    fn custom_length_policy() {
        let policy = PinPolicy::with_length(6);
        assert!(policy.validate("482901").is_ok());
        assert!(policy.validate("123456789").is_err());
    }

    #[test]
    fn pad_completes_at_policy_length() {
        let mut pad = PinPad::new(PinPolicy::with_length(4));

        assert!(!pad.push('1'));
        assert!(!pad.push('2'));
        assert!(!pad.push('3'));
        assert!(pad.push('4')); // auto-submit trigger
        assert!(pad.completed());
        assert_eq!(pad.value(), "1234");
    }

    #[test]
    fn pad_ignores_non_digits_and_overflow() {
        let mut pad = PinPad::new(PinPolicy::with_length(2));

        assert!(!pad.push('a'));
        assert!(!pad.push(' '));
        pad.push('7');
        pad.push('7');
        assert!(!pad.push('7')); // already complete
        assert_eq!(pad.value(), "77");
    }

    #[test]
    fn pad_backspace_and_clear() {
        let mut pad = PinPad::new(PinPolicy::default());

        pad.push('1');
        pad.push('2');
        pad.backspace();
        assert_eq!(pad.value(), "1");

        pad.clear();
        assert!(pad.is_empty());
        assert_eq!(pad.len(), 0);

        // Backspace on an empty pad is a no-op.
        pad.backspace();
        assert!(pad.is_empty());
    }

    #[test]
    fn pad_without_auto_submit_never_triggers() {
        let mut pad = PinPad::new(PinPolicy {
            length: 2,
            auto_submit_on_length: false,
        });

        pad.push('1');
        assert!(!pad.push('2'));
        assert!(pad.completed());
    }
}
