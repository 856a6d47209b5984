//! Find-and-replace over [`ByteString`] content.
//!
//! Three strategies, picked by how the result's size relates to the input:
//!
//! - Empty needle: the replacement is inserted once per inter-byte gap, so
//!   every original byte ends up preceded by one insertion. Built into a
//!   fresh buffer whose storage then replaces the original's.
//! - Replacement no longer than the needle: one in-place compaction pass.
//!   Untouched spans shift down against a write cursor, no reallocation.
//! - Replacement longer than the needle: a counting pass sizes the result,
//!   then a build pass assembles it in a fresh buffer. Scanning and building
//!   never share an allocation, so no mid-scan reallocation can invalidate
//!   positions.
//!
//! Matches are leftmost and non-overlapping; scanning resumes immediately
//! after each match and never inside a freshly written replacement. The scan
//! is byte-accurate over the whole content, embedded zero bytes included.

use crate::bytestring::ByteString;

impl ByteString {
  /// Replaces up to `limit` occurrences of `find` with `replacement`,
  /// returning the number of replacements performed. `limit == 0` means no
  /// cap.
  ///
  /// An empty `find` matches every inter-byte position (start and end of
  /// content included); `limit` then caps how many positions are filled,
  /// clamped to one past the content length.
  pub fn replace(
    &mut self,
    find: impl AsRef<[u8]>,
    replacement: impl AsRef<[u8]>,
    limit: usize,
  ) -> usize {
    let find = find.as_ref();
    let replacement = replacement.as_ref();

    if find.is_empty() {
      return self.replace_every_gap(replacement, limit);
    }
    let Some(first) = find_from(self.as_bytes(), 0, find) else {
      return 0;
    };
    if replacement.len() <= find.len() {
      self.replace_compact(first, find, replacement, limit)
    } else {
      self.replace_rebuild(first, find, replacement, limit)
    }
  }

  /// Empty-needle path: one insertion per gap, capped at `limit`.
  fn replace_every_gap(&mut self, replacement: &[u8], limit: usize) -> usize {
    let len = self.len();
    // A limit of zero or anything past the content length means every gap,
    // and there is one more gap than there are bytes.
    let limit = if limit == 0 || limit > len {
      match len.checked_add(1) {
        Some(gaps) => gaps,
        None => panic!("inserting in every position in buffer would overflow"),
      }
    } else {
      limit
    };

    let new_len = limit
      .checked_mul(replacement.len())
      .and_then(|grow| len.checked_add(grow));
    let Some(new_len) = new_len else {
      panic!("inserting in every position in buffer would overflow");
    };

    let mut out = Self::with_capacity(new_len);
    for i in 0..limit {
      out.append(replacement);
      if i < len {
        out.push_byte(self.as_bytes()[i]);
      }
    }
    if limit < len {
      out.append(&self.as_bytes()[limit..]);
    }

    *self = out;
    limit
  }

  /// Shrinking or same-size path: single in-place pass.
  fn replace_compact(
    &mut self,
    first: usize,
    find: &[u8],
    replacement: &[u8],
    limit: usize,
  ) -> usize {
    let f_len = find.len();
    let r_len = replacement.len();

    let mut dst = first;
    let mut cur = first;
    let mut n = 0usize;

    while let Some(next) = find_from(self.as_bytes(), cur, find) {
      n += 1;
      // Shift the untouched span down, then lay the replacement after it.
      self.as_mut_bytes().copy_within(cur..next, dst);
      dst += next - cur;
      self.as_mut_bytes()[dst..dst + r_len].copy_from_slice(replacement);
      dst += r_len;
      cur = next + f_len;

      if n == limit {
        break;
      }
    }

    let len = self.len();
    self.as_mut_bytes().copy_within(cur..len, dst);
    self.truncate(dst + (len - cur));
    n
  }

  /// Growing path: count pass sizes the result, build pass assembles it.
  fn replace_rebuild(
    &mut self,
    first: usize,
    find: &[u8],
    replacement: &[u8],
    limit: usize,
  ) -> usize {
    let f_len = find.len();
    let grow = replacement.len() - f_len;

    let mut new_len = self.len();
    let mut cur = first;
    let mut count = 0usize;
    while let Some(next) = find_from(self.as_bytes(), cur, find) {
      count += 1;
      new_len = match new_len.checked_add(grow) {
        Some(total) => total,
        None => panic!("adding {grow} bytes to buffer would overflow"),
      };
      cur = next + f_len;
      if count == limit {
        break;
      }
    }

    let mut out = Self::with_capacity(new_len);
    out.append(&self.as_bytes()[..first]);
    cur = first;
    let mut n = 0usize;
    while let Some(next) = find_from(self.as_bytes(), cur, find) {
      n += 1;
      out.append(&self.as_bytes()[cur..next]);
      out.append(replacement);
      cur = next + f_len;
      if n == limit {
        break;
      }
    }
    debug_assert_eq!(n, count);
    out.append(&self.as_bytes()[cur..]);

    *self = out;
    n
  }
}

/// Leftmost occurrence of `needle` in `haystack` at or after `from`.
fn find_from(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
  debug_assert!(!needle.is_empty());
  haystack[from..]
    .windows(needle.len())
    .position(|window| window == needle)
    .map(|i| from + i)
}

#[cfg(test)]
mod test {
  use crate::bytestring::ByteString;

  #[test]
  fn replaces_all_without_limit() {
    let mut buf = ByteString::from("hello world");
    assert_eq!(buf.replace("o", "0", 0), 2);
    assert_eq!(buf.as_bytes(), b"hell0 w0rld");
  }

  #[test]
  fn limit_caps_replacements() {
    let mut buf = ByteString::from("aaaa");
    assert_eq!(buf.replace("a", "b", 2), 2);
    assert_eq!(buf.as_bytes(), b"bbaa");
  }

  #[test]
  fn missing_needle_is_untouched() {
    let mut buf = ByteString::from("hello");
    assert_eq!(buf.replace("xyz", "!", 0), 0);
    assert_eq!(buf.as_bytes(), b"hello");
  }

  #[test]
  fn shrinking_replacement_compacts_in_place() {
    let mut buf = ByteString::from("one, two, three");
    let cap = buf.capacity();
    assert_eq!(buf.replace(", ", ";", 0), 2);
    assert_eq!(buf.as_bytes(), b"one;two;three");
    assert_eq!(buf.capacity(), cap);
  }

  #[test]
  fn deleting_replacement() {
    let mut buf = ByteString::from("a-b-c-d");
    assert_eq!(buf.replace("-", "", 0), 3);
    assert_eq!(buf.as_bytes(), b"abcd");
  }

  #[test]
  fn growing_replacement_rebuilds() {
    let mut buf = ByteString::from("ab");
    assert_eq!(buf.replace("a", "xyz", 0), 1);
    assert_eq!(buf.as_bytes(), b"xyzb");

    let mut buf = ByteString::from("the cat sat");
    assert_eq!(buf.replace("at", "atter", 0), 2);
    assert_eq!(buf.as_bytes(), b"the catter satter");
  }

  #[test]
  fn matches_never_overlap() {
    // Scanning resumes after each match, so "aaa" holds one "aa" match.
    let mut buf = ByteString::from("aaa");
    assert_eq!(buf.replace("aa", "b", 0), 1);
    assert_eq!(buf.as_bytes(), b"ba");

    // And never rescans into a written replacement.
    let mut buf = ByteString::from("abab");
    assert_eq!(buf.replace("ab", "ba", 0), 2);
    assert_eq!(buf.as_bytes(), b"baba");
  }

  #[test]
  fn empty_needle_fills_every_gap() {
    let mut buf = ByteString::from("ab");
    assert_eq!(buf.replace("", "X", 0), 3);
    assert_eq!(buf.as_bytes(), b"XaXbX");
  }

  #[test]
  fn empty_needle_limit_clamp() {
    // A limit equal to the length covers every gap except the final one;
    // only limits past the length clamp up to length plus one.
    let mut buf = ByteString::from("ab");
    assert_eq!(buf.replace("", "X", 2), 2);
    assert_eq!(buf.as_bytes(), b"XaXb");

    let mut buf = ByteString::from("ab");
    assert_eq!(buf.replace("", "X", 1), 1);
    assert_eq!(buf.as_bytes(), b"Xab");

    let mut buf = ByteString::from("ab");
    assert_eq!(buf.replace("", "X", 3), 3);
    assert_eq!(buf.as_bytes(), b"XaXbX");
  }

  #[test]
  fn empty_needle_empty_replacement_counts_gaps() {
    let mut buf = ByteString::from("ab");
    assert_eq!(buf.replace("", "", 0), 3);
    assert_eq!(buf.as_bytes(), b"ab");

    let mut empty = ByteString::new();
    assert_eq!(empty.replace("", "z", 0), 1);
    assert_eq!(empty.as_bytes(), b"z");
  }

  #[test]
  fn scans_across_embedded_zeros() {
    let mut buf = ByteString::from(&b"a\0a\0a"[..]);
    assert_eq!(buf.replace(b"\0", b"-", 0), 2);
    assert_eq!(buf.as_bytes(), b"a-a-a");

    // The needle itself may contain zeros.
    let mut buf = ByteString::from(&b"x\0\0y\0\0z"[..]);
    assert_eq!(buf.replace(b"\0\0", b"|", 0), 2);
    assert_eq!(buf.as_bytes(), b"x|y|z");
  }

  #[test]
  fn whole_content_replacement() {
    let mut buf = ByteString::from("abc");
    assert_eq!(buf.replace("abc", "", 0), 1);
    assert!(buf.is_empty());
    assert_eq!(buf.as_bytes_with_nul(), b"\0");
  }

  quickcheck::quickcheck! {
      fn count_matches_model(haystack: Vec<u8>, needle: Vec<u8>, replacement: Vec<u8>) -> bool {
          if needle.is_empty() {
              return true;
          }
          let mut buf = ByteString::from(haystack.as_slice());
          let n = buf.replace(&needle, &replacement, 0);

          let (expected, count) = model_replace(&haystack, &needle, &replacement);
          n == count && buf.as_bytes() == expected.as_slice()
      }

      fn limited_count_matches_model(haystack: Vec<u8>, needle: Vec<u8>, replacement: Vec<u8>, limit_seed: usize) -> bool {
          if needle.is_empty() {
              return true;
          }
          let limit = limit_seed % 4 + 1;
          let mut buf = ByteString::from(haystack.as_slice());
          let n = buf.replace(&needle, &replacement, limit);

          let (_, full_count) = model_replace(&haystack, &needle, &replacement);
          n == full_count.min(limit)
      }
  }

  /// Left-to-right, non-overlapping reference substitution.
  fn model_replace(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> (Vec<u8>, usize) {
    let mut out = Vec::new();
    let mut count = 0;
    let mut i = 0;
    while i < haystack.len() {
      if haystack[i..].starts_with(needle) {
        out.extend_from_slice(replacement);
        count += 1;
        i += needle.len();
      } else {
        out.push(haystack[i]);
        i += 1;
      }
    }
    (out, count)
  }
}
