//! Latin-1 to UTF-8 transcoding.

/// Convert Latin-1 bytes to a UTF-8 string.
///
/// ASCII passes through unchanged; every byte ≥ 0x80 becomes the two-byte
/// sequence for the code point of the same value. Pure function of its
/// input.
pub fn latin1_to_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 * bytes.len() + 1);
    for &b in bytes {
        out.push(char::from(b));
    }
    out
}
