//! Permissive scalar encoding.
//!
//! The encoder covers the historical six-byte scheme rather than the modern
//! four-byte ceiling: surrogate values and values past U+10FFFF still encode
//! instead of erroring, which keeps byte-level round-trips with older
//! producers intact. `char`-valued input encodes identically to standard
//! UTF-8.

use crate::bytestring::{
  ByteString,
  ByteStringError,
  Result,
};

/// Number of bytes [`encode_scalar`] emits for `scalar`, from 1 to 6.
#[inline]
pub fn scalar_len(scalar: u32) -> usize {
  if scalar < 0x80 {
    1
  } else if scalar < 0x800 {
    2
  } else if scalar < 0x1_0000 {
    3
  } else if scalar < 0x20_0000 {
    4
  } else if scalar < 0x400_0000 {
    5
  } else {
    6
  }
}

/// Encodes `scalar` into the front of `out`, returning the byte count.
///
/// `out` must hold at least [`scalar_len`] bytes. Continuation bytes take
/// the low six bits each and are filled from the tail backwards; the lead
/// byte carries the remaining high bits under the length marker.
pub fn encode_scalar(scalar: u32, out: &mut [u8]) -> usize {
  let len = scalar_len(scalar);
  let marker: u8 = match len {
    1 => 0x00,
    2 => 0xC0,
    3 => 0xE0,
    4 => 0xF0,
    5 => 0xF8,
    _ => 0xFC,
  };

  let mut rest = scalar;
  for slot in out[1..len].iter_mut().rev() {
    *slot = (rest & 0x3F) as u8 | 0x80;
    rest >>= 6;
  }
  out[0] = rest as u8 | marker;

  len
}

impl ByteString {
  /// Inserts the encoding of `scalar` at content position `pos`.
  ///
  /// Every `u32` value encodes; there is no invalid-scalar error.
  pub fn insert_scalar(&mut self, pos: usize, scalar: u32) -> Result<()> {
    if pos > self.len() {
      return Err(ByteStringError::PositionOutOfBounds {
        pos,
        len: self.len(),
      });
    }
    let n = scalar_len(scalar);
    self.open_gap(pos, n);
    encode_scalar(scalar, &mut self.as_mut_bytes()[pos..pos + n]);
    Ok(())
  }

  /// Appends the encoding of `scalar`.
  pub fn push_scalar(&mut self, scalar: u32) {
    let pos = self.len();
    let n = scalar_len(scalar);
    self.open_gap(pos, n);
    encode_scalar(scalar, &mut self.as_mut_bytes()[pos..pos + n]);
  }

  /// Inserts the encoding of `scalar` at the front of the buffer.
  pub fn prepend_scalar(&mut self, scalar: u32) {
    let n = scalar_len(scalar);
    self.open_gap(0, n);
    encode_scalar(scalar, &mut self.as_mut_bytes()[..n]);
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn widths_at_range_boundaries() {
    assert_eq!(scalar_len(0x00), 1);
    assert_eq!(scalar_len(0x7F), 1);
    assert_eq!(scalar_len(0x80), 2);
    assert_eq!(scalar_len(0x7FF), 2);
    assert_eq!(scalar_len(0x800), 3);
    assert_eq!(scalar_len(0xFFFF), 3);
    assert_eq!(scalar_len(0x1_0000), 4);
    assert_eq!(scalar_len(0x1F_FFFF), 4);
    assert_eq!(scalar_len(0x20_0000), 5);
    assert_eq!(scalar_len(0x3FF_FFFF), 5);
    assert_eq!(scalar_len(0x400_0000), 6);
    assert_eq!(scalar_len(u32::MAX), 6);
  }

  #[test]
  fn encodings_match_utf8_in_char_range() {
    let mut out = [0u8; 6];

    assert_eq!(encode_scalar(0x41, &mut out), 1);
    assert_eq!(&out[..1], b"A");

    assert_eq!(encode_scalar(0xE9, &mut out), 2);
    assert_eq!(&out[..2], "é".as_bytes());

    assert_eq!(encode_scalar(0x20AC, &mut out), 3);
    assert_eq!(&out[..3], "€".as_bytes());

    assert_eq!(encode_scalar(0x1F600, &mut out), 4);
    assert_eq!(&out[..4], "😀".as_bytes());
  }

  #[test]
  fn encodings_past_char_range() {
    let mut out = [0u8; 6];

    // Lone surrogate, rejected by strict UTF-8, still encodes.
    assert_eq!(encode_scalar(0xD800, &mut out), 3);
    assert_eq!(&out[..3], &[0xED, 0xA0, 0x80]);

    assert_eq!(encode_scalar(0x20_0000, &mut out), 5);
    assert_eq!(&out[..5], &[0xF8, 0x88, 0x80, 0x80, 0x80]);

    assert_eq!(encode_scalar(0x400_0000, &mut out), 6);
    assert_eq!(&out[..6], &[0xFC, 0x84, 0x80, 0x80, 0x80, 0x80]);
  }

  #[test]
  fn insert_scalar_into_empty() {
    let mut buf = ByteString::new();
    buf.insert_scalar(0, 0x20AC).unwrap();
    assert_eq!(buf.as_bytes(), &[0xE2, 0x82, 0xAC]);
    assert_eq!(buf.len(), 3);
    assert_eq!(buf.as_bytes_with_nul().last(), Some(&0));
  }

  #[test]
  fn scalar_insertion_positions() {
    let mut buf = ByteString::from("ac");
    buf.insert_scalar(1, u32::from('b')).unwrap();
    assert_eq!(buf.as_bytes(), b"abc");

    buf.push_scalar(0x20AC);
    buf.prepend_scalar(0xE9);
    assert_eq!(buf.as_bytes(), "éabc€".as_bytes());
  }

  #[test]
  fn insert_scalar_rejects_out_of_bounds() {
    let mut buf = ByteString::from("ab");
    assert_eq!(
      buf.insert_scalar(3, 0x41),
      Err(ByteStringError::PositionOutOfBounds { pos: 3, len: 2 })
    );
    assert_eq!(buf.as_bytes(), b"ab");
  }

  quickcheck::quickcheck! {
      fn char_scalars_agree_with_std(c: char) -> bool {
          let mut out = [0u8; 6];
          let n = encode_scalar(u32::from(c), &mut out);
          let mut std_buf = [0u8; 4];
          let std_bytes = c.encode_utf8(&mut std_buf).as_bytes();
          &out[..n] == std_bytes
      }
  }
}
