// Cryptographic utilities for request-state tokens and signed session cookies

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Separator between a signed value and its signature
const SIGNATURE_SEPARATOR: char = '.';

/// Generate a cryptographically secure request-state token
///
/// 24 bytes (192 bits) of entropy, base64url-encoded to 32 characters so the
/// token stays short inside provider redirect URLs.
#[must_use]
pub fn generate_state_token() -> String {
    generate_nonce(24)
}

/// Generate a cryptographically secure nonce of specified byte length
///
/// # Returns
///
/// A base64url-encoded string representing the specified bytes of random data
#[must_use]
pub fn generate_nonce(length: usize) -> String {
    let mut nonce = vec![0u8; length];
    rand::rng().fill_bytes(&mut nonce);
    general_purpose::URL_SAFE_NO_PAD.encode(nonce)
}

/// Generate a random 256-bit secret, standard base64 encoded
#[must_use]
pub fn generate_secret() -> String {
    let mut secret = [0u8; 32];
    rand::rng().fill_bytes(&mut secret);
    general_purpose::STANDARD.encode(secret)
}

/// Sign a value with HMAC-SHA256, producing `value.signature`
///
/// # Errors
///
/// Returns an error if the HMAC key cannot be initialized
pub fn sign_value(value: &str, key: &[u8]) -> Result<String> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).context("Invalid HMAC key length")?;
    mac.update(value.as_bytes());
    let signature = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{value}{SIGNATURE_SEPARATOR}{signature}"))
}

/// Verify a value produced by [`sign_value`] and return the original value
///
/// The signature comparison is constant-time.
///
/// # Errors
///
/// Returns an error if the input is not in `value.signature` form, the
/// signature is not valid base64url, or it does not match
pub fn verify_signed_value(signed: &str, key: &[u8]) -> Result<String> {
    let (value, signature) = signed
        .rsplit_once(SIGNATURE_SEPARATOR)
        .ok_or_else(|| anyhow!("Signed value has no signature"))?;
    let signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature)
        .context("Signature is not valid base64url")?;

    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).context("Invalid HMAC key length")?;
    mac.update(value.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| anyhow!("Signature mismatch"))?;

    Ok(value.to_string())
}
