//! Session identifier generation.

use estore_core::SessionId;
use rand::Rng;

/// Generate a fresh random session identifier.
///
/// No uniqueness check is made against the backend; with 36^9 possible
/// suffixes, collisions are accepted.
#[must_use]
pub fn generate_session_id() -> SessionId {
    let mut rng = rand::rng();
    SessionId::from_alphabet_indices(
        (0..SessionId::SUFFIX_LEN).map(|_| rng.random_range(0..SessionId::ALPHABET.len())),
    )
}
