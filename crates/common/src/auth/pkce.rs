//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements the S256 method of RFC 7636. The verifier is 32 bytes from the
//! operating system random source, hex encoded (64 characters, inside the
//! 43-128 range the RFC allows).

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of random bytes behind a verifier, state or session id
pub const RANDOM_BYTES: usize = 32;

/// Challenge method sent with every authorization request
pub const CHALLENGE_METHOD: &str = "S256";

/// PKCE generation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PkceError {
    /// The OS random source could not be read. Fatal for the login attempt.
    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),
}

fn fill_random(buf: &mut [u8]) -> Result<(), PkceError> {
    OsRng.try_fill_bytes(buf).map_err(|e| PkceError::EntropyUnavailable(e.to_string()))
}

/// Compute the S256 challenge for a verifier
///
/// `BASE64URL-NOPAD(SHA256(ASCII(verifier)))`
#[must_use]
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// 32 random bytes, base64url encoded without padding (43 characters)
///
/// # Errors
/// Returns `PkceError::EntropyUnavailable` if the OS random source fails
pub fn random_token() -> Result<String, PkceError> {
    let mut bytes = [0u8; RANDOM_BYTES];
    fill_random(&mut bytes)?;
    let token = URL_SAFE_NO_PAD.encode(bytes);
    bytes.zeroize();
    Ok(token)
}

/// Generate a random state token for CSRF protection
///
/// # Errors
/// Returns `PkceError::EntropyUnavailable` if the OS random source fails
pub fn generate_state() -> Result<String, PkceError> {
    random_token()
}

/// PKCE verifier and its derived challenge
///
/// The verifier is kept secret until the token exchange; only the challenge
/// leaves the client with the authorization request.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PkcePair {
    verifier: String,
    challenge: String,
}

impl PkcePair {
    /// Generate a fresh pair from the OS random source
    ///
    /// # Examples
    /// ```
    /// use eventhorizon_common::auth::pkce::{challenge_for, PkcePair};
    ///
    /// let pair = PkcePair::generate().unwrap();
    /// assert_eq!(pair.verifier().len(), 64);
    /// assert_eq!(pair.challenge(), challenge_for(pair.verifier()));
    /// ```
    ///
    /// # Errors
    /// Returns `PkceError::EntropyUnavailable` if the OS random source fails.
    /// There is no fallback to a weaker generator.
    pub fn generate() -> Result<Self, PkceError> {
        let mut bytes = [0u8; RANDOM_BYTES];
        fill_random(&mut bytes)?;
        let verifier = hex::encode(bytes);
        bytes.zeroize();
        Ok(Self::from_verifier(verifier))
    }

    /// Rebuild a pair around an existing verifier
    #[must_use]
    pub fn from_verifier(verifier: String) -> Self {
        let challenge = challenge_for(&verifier);
        Self { verifier, challenge }
    }

    #[must_use]
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    #[must_use]
    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    /// Always "S256"
    #[must_use]
    pub const fn challenge_method(&self) -> &'static str {
        CHALLENGE_METHOD
    }
}

impl fmt::Debug for PkcePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkcePair")
            .field("verifier", &"<redacted>")
            .field("challenge", &self.challenge)
            .finish()
    }
}
