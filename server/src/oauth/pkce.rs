//! PKCE (RFC 7636) verifier/challenge generation and the random state token.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

/// The only challenge method we ever send.
pub const CODE_CHALLENGE_METHOD: &str = "S256";

/// Verifier length in characters. RFC 7636 allows 43 to 128.
pub const VERIFIER_LEN: usize = 64;

/// Length of the anti-CSRF `state` token.
pub const STATE_LEN: usize = 32;

/// Helper function to create URL-safe base64 encoding without padding
pub fn base64_url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// A PKCE verifier together with the S256 challenge derived from it.
///
/// Fields are private so the two can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    verifier: String,
    challenge: String,
}

impl PkcePair {
    /// Generate a fresh pair for one authorization attempt.
    pub fn generate() -> Self {
        Self::from_verifier(random_alphanumeric(VERIFIER_LEN))
    }

    /// Rebuild the pair for a known verifier.
    pub fn from_verifier(verifier: impl Into<String>) -> Self {
        let verifier = verifier.into();
        let challenge = challenge_for(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    pub fn into_verifier(self) -> String {
        self.verifier
    }
}

/// `BASE64URL-NOPAD(SHA256(verifier))`
pub fn challenge_for(verifier: &str) -> String {
    base64_url_encode(&Sha256::digest(verifier.as_bytes()))
}

/// Opaque per-attempt `state` value round-tripped through the provider.
pub fn generate_state() -> String {
    random_alphanumeric(STATE_LEN)
}

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_verifier_challenge() {
        assert_eq!(
            challenge_for("abcDEF123"),
            "H_yDqQSGAh0KDUJ0z96cxWLsi6WWSL-0sw0qqYcs01k"
        );
        // Stable across calls for the same verifier
        assert_eq!(challenge_for("abcDEF123"), challenge_for("abcDEF123"));
    }

    #[test]
    fn test_rfc7636_appendix_b_vector() {
        assert_eq!(
            challenge_for("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_generated_pair_is_consistent() {
        for _ in 0..32 {
            let pair = PkcePair::generate();
            assert_eq!(pair.challenge(), challenge_for(pair.verifier()));
            assert_eq!(pair.challenge().len(), 43);
            assert!(!pair.challenge().contains('='));
        }
    }

    #[test]
    fn test_verifier_shape() {
        let pair = PkcePair::generate();
        assert_eq!(pair.verifier().len(), VERIFIER_LEN);
        assert!((43..=128).contains(&pair.verifier().len()));
        assert!(pair.verifier().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_pairs_are_fresh() {
        let first = PkcePair::generate();
        let second = PkcePair::generate();
        assert_ne!(first.verifier(), second.verifier());
        assert_ne!(first.challenge(), second.challenge());
    }

    #[test]
    fn test_state_tokens() {
        let state = generate_state();
        assert_eq!(state.len(), STATE_LEN);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(state, generate_state());
    }
}
