//! NFC tag UID generation and validation.

use std::collections::HashSet;

use rand::Rng;

use crate::error::CoreError;

/// Length of a generated tag UID, in hex characters.
pub const NFC_UID_LEN: usize = 16;

/// Longest UID accepted from a physical tag.
pub const MAX_NFC_UID_LEN: usize = 32;

/// Attempts at drawing a fresh UID before giving up.
const MAX_GENERATION_ATTEMPTS: usize = 64;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Generate a random 16-character upper-case hex UID.
pub fn generate_nfc_uid() -> String {
    let mut rng = rand::rng();
    (0..NFC_UID_LEN)
        .map(|_| char::from(HEX_DIGITS[rng.random_range(0..HEX_DIGITS.len())]))
        .collect()
}

/// Generate a UID not present in `taken`.
///
/// `taken` must hold upper-cased UIDs.
pub fn unique_nfc_uid(taken: &HashSet<String>) -> Result<String, CoreError> {
    std::iter::repeat_with(generate_nfc_uid)
        .take(MAX_GENERATION_ATTEMPTS)
        .find(|uid| !taken.contains(uid))
        .ok_or_else(|| CoreError::Internal("Could not generate a unique NFC UID".into()))
}

/// Check a UID read from a tag or supplied by a client.
///
/// Generated UIDs are hex, but labels printed by hand may use any
/// alphanumeric characters.
pub fn validate_nfc_uid(uid: &str) -> Result<(), CoreError> {
    let uid = uid.trim();
    if uid.is_empty() || uid.len() > MAX_NFC_UID_LEN {
        return Err(CoreError::Validation(format!(
            "NFC UID must be 1 to {MAX_NFC_UID_LEN} characters"
        )));
    }
    if !uid.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CoreError::Validation(format!(
            "NFC UID '{uid}' must be alphanumeric"
        )));
    }
    Ok(())
}

/// Canonical form used for storage and lookups.
pub fn normalize_nfc_uid(uid: &str) -> String {
    uid.trim().to_ascii_uppercase()
}
