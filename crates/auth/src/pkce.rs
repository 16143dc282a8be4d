//! Proof Key for Code Exchange (RFC 7636, S256 method).

use {
    base64::Engine,
    base64::engine::general_purpose::URL_SAFE_NO_PAD,
    rand::{Rng, distr::Alphanumeric},
    sha2::{Digest, Sha256},
};

/// A verifier/challenge pair, generated once per login flow and never
/// persisted. The verifier is used exactly once in the code exchange, the
/// challenge exactly once in the authorization URL.
#[derive(Debug, Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// Generate a fresh pair with an alphanumeric verifier of `len` chars.
    pub fn generate(len: usize) -> Self {
        let verifier: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        let challenge = Self::challenge_for(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    /// `base64url(SHA-256(verifier))` with padding stripped.
    pub fn challenge_for(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc7636_vector() {
        // Appendix B of RFC 7636.
        let challenge = PkcePair::challenge_for("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
        assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn test_challenge_is_deterministic() {
        let pair = PkcePair::generate(64);
        assert_eq!(pair.challenge, PkcePair::challenge_for(&pair.verifier));
        assert_eq!(
            PkcePair::challenge_for(&pair.verifier),
            PkcePair::challenge_for(&pair.verifier)
        );
    }

    #[test]
    fn test_challenge_has_no_padding() {
        let pair = PkcePair::generate(64);
        assert!(!pair.challenge.contains('='));
        // SHA-256 output is 32 bytes -> 43 base64url chars unpadded.
        assert_eq!(pair.challenge.len(), 43);
    }

    #[test]
    fn test_verifier_length_and_charset() {
        let pair = PkcePair::generate(99);
        assert_eq!(pair.verifier.len(), 99);
        assert!(pair.verifier.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_fresh_pairs_differ() {
        let a = PkcePair::generate(64);
        let b = PkcePair::generate(64);
        assert_ne!(a.verifier, b.verifier);
    }
}
