//! PEM-style text framing for pasteable key and data blocks.
//!
//! Both block families share one wire shape: a `-----BEGIN {TAG}-----`
//! marker line, a base64 body wrapped at 64 columns, and a matching
//! `-----END {TAG}-----` line. Stripping is marker-agnostic: `unframe`
//! removes whichever known markers appear and does not check that the
//! header matches the type the caller expects.

/// Tag used for public key blocks.
pub const PUBLIC_KEY_TAG: &str = "PUBLIC KEY";

/// Tag used for encrypted payload blocks.
pub const ENCRYPTED_DATA_TAG: &str = "ENCRYPTED DATA";

/// Bodies are wrapped at 64 characters per line, PEM-style.
const WRAP_WIDTH: usize = 64;

/// Wrap a base64 body in BEGIN/END marker lines with 64-column lines.
pub fn frame(tag: &str, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + body.len() / WRAP_WIDTH + tag.len() * 2 + 32);
    out.push_str("-----BEGIN ");
    out.push_str(tag);
    out.push_str("-----\n");
    for chunk in body.as_bytes().chunks(WRAP_WIDTH) {
        // Chunks of an ASCII base64 body are always valid UTF-8.
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push('\n');
    }
    out.push_str("-----END ");
    out.push_str(tag);
    out.push_str("-----");
    out
}

/// Strip marker lines and all line breaks, yielding the raw base64 body.
///
/// Tolerates either marker family and inputs that carry no markers at
/// all; surrounding whitespace is trimmed.
pub fn unframe(text: &str) -> String {
    let mut body = text.to_string();
    for tag in [PUBLIC_KEY_TAG, ENCRYPTED_DATA_TAG] {
        body = body.replace(&format!("-----BEGIN {tag}-----"), "");
        body = body.replace(&format!("-----END {tag}-----"), "");
    }
    body.retain(|c| !c.is_whitespace());
    body
}
