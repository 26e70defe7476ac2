//! Deterministic string-to-color mapping.
//!
//! The key is wrapped in a fixed salt, hashed with SHA-512, and the last
//! three digest bytes become the red, green, and blue channels. The salt
//! is embedded in the build so colors are stable across restarts.

use octoscope_types::Color;
use sha2::{Digest, Sha512};

/// Salt placed before and after every key.
const SALT: &str = "137";

/// Map an arbitrary string to a display color.
///
/// Total and pure: equal keys always yield equal colors. Distinct keys
/// usually yield distinct colors but collisions are tolerated.
pub fn colorize(key: &str) -> Color {
    let mut hasher = Sha512::new();
    hasher.update(SALT.as_bytes());
    hasher.update(key.as_bytes());
    hasher.update(SALT.as_bytes());
    let digest = hasher.finalize();

    match digest.as_slice() {
        [.., r, g, b] => Color::rgb(*r, *g, *b),
        // A SHA-512 digest is always 64 bytes.
        _ => Color::BLACK,
    }
}
