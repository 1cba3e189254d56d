//! PKCE challenge/verifier matching, S256 only (plain is rejected by this spec).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sha2::{Digest, Sha256};

pub const METHOD_S256: &str = "S256";

pub fn challenge_from_verifier(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

pub fn verify(verifier: &str, stored_challenge: &str) -> bool {
    challenge_from_verifier(verifier) == stored_challenge
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_the_spec_literal_example() {
        let verifier = "xyzA1234xyzA1234xyzA1234xyzA1234xyzA1234xyz";
        let expected = "n4bQgYhMfWWaL-qgxVrQFaO_TxsrC4Is0V1sFbDwCgg";
        assert_eq!(challenge_from_verifier(verifier), expected);
        assert!(verify(verifier, expected));
    }

    #[test]
    fn rejects_wrong_verifier() {
        let challenge = challenge_from_verifier("correct-verifier-string-that-is-long-enough");
        assert!(!verify("wrong-verifier-string-long-enough-too", &challenge));
    }
}
