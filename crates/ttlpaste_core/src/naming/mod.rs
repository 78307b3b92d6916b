//! Paste identifier generation.

use crate::constants::PASTE_ID_LEN;
use rand::Rng;

/// URL-safe alphabet (same 64 symbols as nanoid's default).
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generate a fresh paste id.
///
/// Twelve symbols from a 64-symbol alphabet give 72 bits of entropy, so
/// collisions are negligible without a uniqueness check.
///
/// # Returns
/// A URL-safe id of [`PASTE_ID_LEN`] characters.
pub fn generate_paste_id() -> String {
    let mut rng = rand::thread_rng();
    (0..PASTE_ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Cheap shape check used to short-circuit lookups for ids we could never
/// have issued.
pub fn looks_like_paste_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.bytes().all(|byte| ID_ALPHABET.contains(&byte))
}
