//! Growable byte buffer with a guaranteed trailing NUL terminator.
//!
//! [`ByteString`] behaves like an automatically resizing byte array: the
//! storage always keeps one `0` byte immediately past the content, while the
//! authoritative length is tracked separately, so embedded zero bytes are
//! ordinary data. Legacy NUL-delimited consumers can read
//! [`as_bytes_with_nul`](ByteString::as_bytes_with_nul) directly; everything
//! else treats the buffer as a plain `[u8]` slice via `Deref`.
//!
//! # Growth
//!
//! Capacity moves in powers of two with a 64 byte minimum reservation, and it
//! never shrinks: truncation and erasure only move the length. A size
//! computation that would overflow `usize` panics, since no safe recovery
//! exists at that point.
//!
//! # Basic Usage
//!
//! ```ignore
//! use the_bytestring::ByteString;
//!
//! let mut buf = ByteString::from("hello world");
//! buf.insert(5, b",")?;
//! buf.append(b"!");
//! assert_eq!(buf.as_bytes(), b"hello, world!");
//! ```
//!
//! # Error Handling
//!
//! Operations taking a caller-supplied position or range return
//! [`Result<T, ByteStringError>`]; a rejected call leaves the buffer
//! untouched:
//!
//! - **PositionOutOfBounds** - Position past the current length
//! - **InvalidRange** - Range start after its end
//! - **RangeOutOfBounds** - Range extends past the current length

use std::{
  fmt,
  hash::{
    Hash,
    Hasher,
  },
  ops::{
    Bound,
    Deref,
    DerefMut,
    RangeBounds,
  },
};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ByteStringError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ByteStringError {
  #[error("position {pos} is out of bounds for buffer length {len}")]
  PositionOutOfBounds { pos: usize, len: usize },
  #[error("invalid range: start {from} is after end {to}")]
  InvalidRange { from: usize, to: usize },
  #[error("range {from}..{to} is out of bounds for buffer length {len}")]
  RangeOutOfBounds {
    from: usize,
    to:   usize,
    len:  usize,
  },
}

/// Smallest content reservation a fresh buffer makes.
const MIN_RESERVE: usize = 64;

/// Smallest power of two holding `required` bytes, or `required` itself when
/// the next power would overflow.
#[inline]
fn grown_capacity(required: usize) -> usize {
  required.checked_next_power_of_two().unwrap_or(required)
}

/// Growable byte buffer whose storage always ends in a `0` terminator.
///
/// The terminator lives at `storage[len()]` and is not part of the content;
/// the tracked length is authoritative, so content may contain zero bytes.
pub struct ByteString {
  // Content bytes followed by exactly one terminator byte. Never empty.
  data: Vec<u8>,
}

impl ByteString {
  /// Creates an empty buffer with the default minimum reservation.
  #[must_use]
  pub fn new() -> Self {
    Self::with_capacity(0)
  }

  /// Creates an empty buffer that can hold at least `capacity` content bytes
  /// before growing.
  ///
  /// The reservation is floored at 64 bytes and rounded to the next power of
  /// two, terminator included.
  #[must_use]
  pub fn with_capacity(capacity: usize) -> Self {
    let reserve = capacity.max(MIN_RESERVE);
    let Some(total) = reserve.checked_add(1) else {
      panic!("adding {reserve} bytes to buffer would overflow");
    };
    let mut data = Vec::with_capacity(grown_capacity(total));
    data.push(0);
    Self { data }
  }

  /// Content length in bytes, terminator excluded.
  #[inline]
  pub fn len(&self) -> usize {
    self.data.len() - 1
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Total storage in bytes, terminator slot included.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.data.capacity()
  }

  /// Content bytes, terminator excluded.
  #[inline]
  pub fn as_bytes(&self) -> &[u8] {
    &self.data[..self.data.len() - 1]
  }

  /// Mutable content bytes. The terminator is never handed out mutably.
  #[inline]
  pub fn as_mut_bytes(&mut self) -> &mut [u8] {
    let len = self.len();
    &mut self.data[..len]
  }

  /// Content bytes plus the trailing terminator, for NUL-delimited
  /// consumers.
  #[inline]
  pub fn as_bytes_with_nul(&self) -> &[u8] {
    &self.data
  }

  /// Ensures the buffer can take `additional` more content bytes without
  /// reallocating.
  pub fn reserve(&mut self, additional: usize) {
    self.maybe_expand(additional);
  }

  /// Grows the storage so `additional` more bytes fit, if they do not
  /// already. Panics when the required size overflows `usize`.
  fn maybe_expand(&mut self, additional: usize) {
    // The overflow check runs even when no growth is needed.
    let Some(required) = self.data.len().checked_add(additional) else {
      panic!("adding {additional} bytes to buffer would overflow");
    };
    if required > self.data.capacity() {
      let spare = grown_capacity(required) - self.data.len();
      self.data.reserve_exact(spare);
    }
  }

  /// Opens an `n` byte gap at content position `pos`, shifting the tail and
  /// terminator right. The gap holds stale bytes; the caller fills it.
  pub(crate) fn open_gap(&mut self, pos: usize, n: usize) {
    debug_assert!(pos <= self.len());
    if n == 0 {
      return;
    }
    self.maybe_expand(n);
    let total = self.data.len();
    self.data.resize(total + n, 0);
    self.data.copy_within(pos..total, pos + n);
  }

  /// Unchecked insert of `bytes` at `pos`.
  fn splice(&mut self, pos: usize, bytes: &[u8]) {
    debug_assert!(pos <= self.len());
    if bytes.is_empty() {
      return;
    }
    self.open_gap(pos, bytes.len());
    self.data[pos..pos + bytes.len()].copy_from_slice(bytes);
  }

  /// Inserts `bytes` at content position `pos`, shifting everything from
  /// `pos` on (terminator included) to the right.
  ///
  /// Empty input is accepted unconditionally, before the position check.
  pub fn insert(&mut self, pos: usize, bytes: impl AsRef<[u8]>) -> Result<()> {
    let bytes = bytes.as_ref();
    if bytes.is_empty() {
      return Ok(());
    }
    if pos > self.len() {
      return Err(ByteStringError::PositionOutOfBounds {
        pos,
        len: self.len(),
      });
    }
    self.splice(pos, bytes);
    Ok(())
  }

  /// Inserts a copy of the buffer's own `src` byte range at `pos`.
  ///
  /// This is the self-aliased insert: the source and destination share one
  /// allocation, so the copy is split around the opened gap. The part of the
  /// source in front of `pos` still sits at its original offsets; the part
  /// at or past `pos` has been shifted right by the gap width and is read
  /// from there.
  pub fn insert_from_within(&mut self, pos: usize, src: impl RangeBounds<usize>) -> Result<()> {
    let (start, end) = self.resolve_range(src)?;
    let n = end - start;
    if n == 0 {
      return Ok(());
    }
    if pos > self.len() {
      return Err(ByteStringError::PositionOutOfBounds {
        pos,
        len: self.len(),
      });
    }

    self.open_gap(pos, n);

    let pre = if start < pos { n.min(pos - start) } else { 0 };
    if pre > 0 {
      self.data.copy_within(start..start + pre, pos);
    }
    if n > pre {
      self.data.copy_within(start + pre + n..end + n, pos + pre);
    }
    Ok(())
  }

  /// Appends `bytes` to the end of the buffer.
  pub fn append(&mut self, bytes: impl AsRef<[u8]>) {
    self.splice(self.len(), bytes.as_ref());
  }

  /// Inserts `bytes` at the front of the buffer.
  pub fn prepend(&mut self, bytes: impl AsRef<[u8]>) {
    self.splice(0, bytes.as_ref());
  }

  /// Appends a single byte.
  pub fn push_byte(&mut self, byte: u8) {
    self.maybe_expand(1);
    let end = self.data.len() - 1;
    self.data[end] = byte;
    self.data.push(0);
  }

  /// Inserts a single byte at content position `pos`.
  pub fn insert_byte(&mut self, pos: usize, byte: u8) -> Result<()> {
    if pos > self.len() {
      return Err(ByteStringError::PositionOutOfBounds {
        pos,
        len: self.len(),
      });
    }
    self.open_gap(pos, 1);
    self.data[pos] = byte;
    Ok(())
  }

  /// Removes the `range` of content bytes, shifting the remainder left.
  ///
  /// `erase(pos..)` removes everything from `pos` to the end. Capacity is
  /// unchanged.
  pub fn erase(&mut self, range: impl RangeBounds<usize>) -> Result<()> {
    let (from, to) = self.resolve_range(range)?;
    self.data.drain(from..to);
    Ok(())
  }

  /// Copies `bytes` over the content starting at `pos`, growing the buffer
  /// when the write runs past the end. The buffer never shrinks here.
  ///
  /// Empty input is accepted unconditionally, before the position check.
  pub fn overwrite(&mut self, pos: usize, bytes: impl AsRef<[u8]>) -> Result<()> {
    let bytes = bytes.as_ref();
    if bytes.is_empty() {
      return Ok(());
    }
    if pos > self.len() {
      return Err(ByteStringError::PositionOutOfBounds {
        pos,
        len: self.len(),
      });
    }

    let Some(end) = pos.checked_add(bytes.len()) else {
      panic!("adding {} bytes to buffer would overflow", bytes.len());
    };
    if end > self.len() {
      self.maybe_expand(end - self.len());
      self.data.resize(end + 1, 0);
    }
    self.data[pos..end].copy_from_slice(bytes);
    Ok(())
  }

  /// Shortens the content to `new_len` bytes, clamping to the current
  /// length. Capacity is unchanged.
  pub fn truncate(&mut self, new_len: usize) {
    let new_len = new_len.min(self.len());
    self.data.truncate(new_len + 1);
    self.data[new_len] = 0;
  }

  /// Sets the content length to exactly `new_len`, zero-filling any newly
  /// exposed bytes.
  pub fn set_len(&mut self, new_len: usize) {
    if new_len < self.len() {
      self.truncate(new_len);
      return;
    }
    self.maybe_expand(new_len - self.len());
    self.data.resize(new_len + 1, 0);
  }

  /// Empties the buffer, keeping its storage.
  pub fn clear(&mut self) {
    self.truncate(0);
  }

  /// Replaces the whole content with `bytes`, keeping the storage when it
  /// already fits.
  pub fn assign(&mut self, bytes: impl AsRef<[u8]>) {
    self.truncate(0);
    self.append(bytes);
  }

  /// Converts ASCII uppercase letters to lowercase in place.
  pub fn make_ascii_lowercase(&mut self) {
    self.as_mut_bytes().make_ascii_lowercase();
  }

  /// Converts ASCII lowercase letters to uppercase in place.
  pub fn make_ascii_uppercase(&mut self) {
    self.as_mut_bytes().make_ascii_uppercase();
  }

  /// Lowercases the content byte-at-a-time through the C locale tables.
  #[deprecated(note = "locale dependent and byte-at-a-time, use make_ascii_lowercase instead")]
  pub fn down(&mut self) {
    for byte in self.as_mut_bytes() {
      let c = i32::from(*byte);
      if unsafe { libc::isupper(c) } != 0 {
        *byte = unsafe { libc::tolower(c) } as u8;
      }
    }
  }

  /// Uppercases the content byte-at-a-time through the C locale tables.
  #[deprecated(note = "locale dependent and byte-at-a-time, use make_ascii_uppercase instead")]
  pub fn up(&mut self) {
    for byte in self.as_mut_bytes() {
      let c = i32::from(*byte);
      if unsafe { libc::islower(c) } != 0 {
        *byte = unsafe { libc::toupper(c) } as u8;
      }
    }
  }

  /// Appends formatted text, all or nothing.
  ///
  /// The arguments are rendered into a scratch buffer first; a formatter
  /// error is logged and the buffer stays untouched. Use the
  /// [`fmt::Write`] impl for streaming writes instead.
  pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) {
    use fmt::Write;

    let mut formatted = String::new();
    if let Err(err) = formatted.write_fmt(args) {
      tracing::warn!("formatted append failed: {err}");
      return;
    }
    self.append(formatted.as_bytes());
  }

  /// Replaces the whole content with formatted text.
  ///
  /// A formatter error leaves the buffer empty but valid.
  pub fn set_fmt(&mut self, args: fmt::Arguments<'_>) {
    self.truncate(0);
    self.append_fmt(args);
  }

  /// Deterministic 31-rolling content hash: `h = h * 31 + byte`.
  ///
  /// Stable across runs and platforms; not cryptographic. Distinct from the
  /// [`Hash`] impl, which feeds the content to the caller's hasher.
  #[must_use]
  pub fn hash_code(&self) -> u32 {
    let mut h = 0u32;
    for &byte in self.as_bytes() {
      h = h.wrapping_mul(31).wrapping_add(u32::from(byte));
    }
    h
  }

  /// Consumes the buffer, returning the content bytes without the
  /// terminator.
  #[must_use]
  pub fn into_bytes(mut self) -> Vec<u8> {
    self.data.pop();
    self.data
  }

  /// Consumes the buffer, returning the raw storage segment: content plus
  /// the trailing terminator byte.
  #[must_use]
  pub fn into_bytes_with_nul(self) -> Vec<u8> {
    self.data
  }

  /// Consumes the buffer into an immutable blob of exactly the content
  /// bytes, no terminator and no spare capacity.
  #[must_use]
  pub fn into_boxed_bytes(mut self) -> Box<[u8]> {
    self.data.pop();
    self.data.into_boxed_slice()
  }

  /// Resolves `range` against the content length, rejecting inverted and
  /// out-of-bounds ranges.
  fn resolve_range(&self, range: impl RangeBounds<usize>) -> Result<(usize, usize)> {
    let len = self.len();
    // Bounds saturate at usize::MAX: the length is always below that (the
    // storage holds len + 1 bytes), so a saturated bound fails the checks
    // below instead of wrapping to a small in-range value.
    let from = match range.start_bound() {
      Bound::Included(&n) => n,
      Bound::Excluded(&n) => n.saturating_add(1),
      Bound::Unbounded => 0,
    };
    let to = match range.end_bound() {
      Bound::Included(&n) => n.saturating_add(1),
      Bound::Excluded(&n) => n,
      Bound::Unbounded => len,
    };

    if from > to {
      return Err(ByteStringError::InvalidRange { from, to });
    }
    if to > len {
      return Err(ByteStringError::RangeOutOfBounds { from, to, len });
    }
    Ok((from, to))
  }
}

impl Default for ByteString {
  fn default() -> Self {
    Self::new()
  }
}

impl Clone for ByteString {
  /// Clones content and capacity, so the copy keeps the original's growth
  /// headroom.
  fn clone(&self) -> Self {
    let mut data = Vec::with_capacity(self.data.capacity());
    data.extend_from_slice(&self.data);
    Self { data }
  }
}

impl fmt::Debug for ByteString {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("ByteString")
      .field(&String::from_utf8_lossy(self.as_bytes()))
      .finish()
  }
}

impl Deref for ByteString {
  type Target = [u8];

  #[inline]
  fn deref(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl DerefMut for ByteString {
  #[inline]
  fn deref_mut(&mut self) -> &mut [u8] {
    self.as_mut_bytes()
  }
}

impl AsRef<[u8]> for ByteString {
  #[inline]
  fn as_ref(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl AsMut<[u8]> for ByteString {
  #[inline]
  fn as_mut(&mut self) -> &mut [u8] {
    self.as_mut_bytes()
  }
}

impl From<&[u8]> for ByteString {
  fn from(bytes: &[u8]) -> Self {
    let mut buf = Self::with_capacity(bytes.len().saturating_add(2));
    buf.append(bytes);
    buf
  }
}

impl From<&str> for ByteString {
  fn from(text: &str) -> Self {
    Self::from(text.as_bytes())
  }
}

impl From<Vec<u8>> for ByteString {
  /// Adopts the allocation instead of copying. The terminator is appended,
  /// growing minimally when the vector is full; the whole input is content.
  fn from(bytes: Vec<u8>) -> Self {
    let mut data = bytes;
    data.reserve_exact(1);
    data.push(0);
    Self { data }
  }
}

impl From<String> for ByteString {
  fn from(text: String) -> Self {
    Self::from(text.into_bytes())
  }
}

impl PartialEq for ByteString {
  fn eq(&self, other: &Self) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}

impl Eq for ByteString {}

impl PartialEq<[u8]> for ByteString {
  fn eq(&self, other: &[u8]) -> bool {
    self.as_bytes() == other
  }
}

impl PartialEq<ByteString> for [u8] {
  fn eq(&self, other: &ByteString) -> bool {
    self == other.as_bytes()
  }
}

impl PartialEq<&[u8]> for ByteString {
  fn eq(&self, other: &&[u8]) -> bool {
    self.as_bytes() == *other
  }
}

impl PartialEq<Vec<u8>> for ByteString {
  fn eq(&self, other: &Vec<u8>) -> bool {
    self.as_bytes() == other.as_slice()
  }
}

impl PartialEq<ByteString> for Vec<u8> {
  fn eq(&self, other: &ByteString) -> bool {
    self.as_slice() == other.as_bytes()
  }
}

impl PartialEq<str> for ByteString {
  fn eq(&self, other: &str) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}

impl PartialEq<ByteString> for str {
  fn eq(&self, other: &ByteString) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}

impl PartialEq<&str> for ByteString {
  fn eq(&self, other: &&str) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}

impl Hash for ByteString {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.as_bytes().hash(state);
  }
}

impl fmt::Write for ByteString {
  fn write_str(&mut self, text: &str) -> fmt::Result {
    self.append(text.as_bytes());
    Ok(())
  }
}
