//! MIME encoded-word for display names in email headers.

use base64::Engine;

/// Encode a display name as a single RFC 2047 encoded-word (`=?utf-8?b?...?=`,
/// base64, UTF-8 charset). Applied regardless of content, so arbitrary UTF-8
/// names are always safe inside a header.
pub fn encoded_word(name: &str) -> String {
    format!(
        "=?utf-8?b?{}?=",
        base64::engine::general_purpose::STANDARD.encode(name.as_bytes())
    )
}
