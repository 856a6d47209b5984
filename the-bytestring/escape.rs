//! URI-style percent escaping.

use crate::bytestring::ByteString;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Unreserved URI characters (RFC 3986 section 2.3), never escaped.
#[inline]
fn byte_is_unreserved(byte: u8) -> bool {
  byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// Returns `unescaped` rendered with URI-style escape sequences.
pub fn uri_escaped(
  unescaped: impl AsRef<[u8]>,
  reserved_allowed: &str,
  allow_utf8: bool,
) -> ByteString {
  let mut res = ByteString::new();
  append_uri_escaped(&mut res, unescaped, reserved_allowed, allow_utf8);
  res
}

/// Appends `unescaped` to `buf`, escaping everything outside the unreserved
/// set as uppercase `%XX`.
///
/// Bytes listed in `reserved_allowed` pass through verbatim, except `%`,
/// which always escapes. With `allow_utf8`, well-formed multi-byte UTF-8
/// sequences pass through whole; malformed bytes are escaped individually.
pub fn append_uri_escaped(
  buf: &mut ByteString,
  unescaped: impl AsRef<[u8]>,
  reserved_allowed: &str,
  allow_utf8: bool,
) {
  let bytes = unescaped.as_ref();
  let mut i = 0;

  while i < bytes.len() {
    let byte = bytes[i];

    if allow_utf8 && byte >= 0x80 {
      if let Some(seq) = leading_utf8_sequence(&bytes[i..]) {
        buf.append(seq);
        i += seq.len();
        continue;
      }
    }

    if byte_is_unreserved(byte) || (byte != b'%' && reserved_allowed.as_bytes().contains(&byte)) {
      buf.push_byte(byte);
    } else {
      buf.push_byte(b'%');
      buf.push_byte(HEX_DIGITS[usize::from(byte >> 4)]);
      buf.push_byte(HEX_DIGITS[usize::from(byte & 0x0F)]);
    }
    i += 1;
  }
}

/// Well-formed multi-byte UTF-8 sequence at the front of `bytes`, if any.
fn leading_utf8_sequence(bytes: &[u8]) -> Option<&[u8]> {
  let width = match bytes[0] {
    0xC2..=0xDF => 2,
    0xE0..=0xEF => 3,
    0xF0..=0xF4 => 4,
    _ => return None,
  };
  let seq = bytes.get(..width)?;
  std::str::from_utf8(seq).ok()?;
  Some(seq)
}
