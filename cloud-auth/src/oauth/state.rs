//! CSRF state tokens for OAuth flows.
//!
//! The caller keeps the generated token (in the user's session) and compares it with the
//! `state` query parameter on the callback.

use rand::Rng;

/// Generate a cryptographically random state token, hex encoded.
pub fn generate_state() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(random_bytes)
}

/// Compares a stored state token with the one returned by the provider.
///
/// Runs in time independent of where the tokens first differ.
pub fn state_matches(expected: &str, received: &str) -> bool {
    if expected.is_empty() || expected.len() != received.len() {
        return false;
    }
    expected
        .bytes()
        .zip(received.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_state() {
        let state = generate_state();
        assert_eq!(state.len(), 64); // 32 bytes hex encoded
        assert!(state.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_states_are_unique() {
        assert_ne!(generate_state(), generate_state());
    }

    #[test]
    fn test_state_matches() {
        let state = generate_state();
        assert!(state_matches(&state, &state.clone()));
        assert!(!state_matches(&state, "forged"));
        assert!(!state_matches("", ""));
    }
}
