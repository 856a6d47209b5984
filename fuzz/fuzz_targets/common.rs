use the_bytestring::{
  ByteString,
  unicode::encode_scalar,
};

const MAX_CHUNK_BYTES: usize = 64;
const MAX_HAYSTACK_BYTES: usize = 4 * 1024;
const MAX_OPS: usize = 64;
const MAX_REPLACE_LIMIT: usize = 16;

#[derive(Debug)]
pub enum Op {
  Append(Vec<u8>),
  Prepend(Vec<u8>),
  Insert(u16, Vec<u8>),
  InsertWithin(u16, u16, u16),
  PushByte(u8),
  PushScalar(u32),
  Erase(u16, u16),
  Overwrite(u16, Vec<u8>),
  Truncate(u16),
  SetLen(u16),
  Assign(Vec<u8>),
}

pub struct ReplaceScenario {
  pub haystack:    Vec<u8>,
  pub needle:      Vec<u8>,
  pub replacement: Vec<u8>,
  pub limit:       usize,
}

pub fn decode_ops(data: &[u8]) -> Vec<Op> {
  let mut cursor = ByteCursor::new(data);
  let op_count = cursor.next_usize(MAX_OPS);
  let mut ops = Vec::with_capacity(op_count);

  for _ in 0..op_count {
    let op = match cursor.next_u8() % 11 {
      0 => Op::Append(next_chunk(&mut cursor)),
      1 => Op::Prepend(next_chunk(&mut cursor)),
      2 => Op::Insert(cursor.next_u16(), next_chunk(&mut cursor)),
      3 => Op::InsertWithin(cursor.next_u16(), cursor.next_u16(), cursor.next_u16()),
      4 => Op::PushByte(cursor.next_u8()),
      5 => Op::PushScalar(cursor.next_u32()),
      6 => Op::Erase(cursor.next_u16(), cursor.next_u16()),
      7 => Op::Overwrite(cursor.next_u16(), next_chunk(&mut cursor)),
      8 => Op::Truncate(cursor.next_u16()),
      9 => Op::SetLen(cursor.next_u16()),
      _ => Op::Assign(next_chunk(&mut cursor)),
    };
    ops.push(op);
  }

  ops
}

pub fn decode_replace_scenario(data: &[u8]) -> ReplaceScenario {
  let mut cursor = ByteCursor::new(data);
  let haystack_len = cursor.next_usize(MAX_HAYSTACK_BYTES);
  let haystack = cursor.next_bytes(haystack_len).to_vec();
  let needle_len = cursor.next_usize(MAX_CHUNK_BYTES);
  let needle = cursor.next_bytes(needle_len).to_vec();
  let replacement_len = cursor.next_usize(MAX_CHUNK_BYTES);
  let replacement = cursor.next_bytes(replacement_len).to_vec();
  let limit = cursor.next_usize(MAX_REPLACE_LIMIT);

  ReplaceScenario {
    haystack,
    needle,
    replacement,
    limit,
  }
}

/// Applies `op` to the buffer and to the reference model in lockstep.
/// Positions and ranges are clamped into the valid domain first, so every
/// call must succeed.
pub fn apply_op(buf: &mut ByteString, model: &mut Vec<u8>, op: &Op) {
  let len = model.len();
  match op {
    Op::Append(bytes) => {
      buf.append(bytes);
      model.extend_from_slice(bytes);
    }
    Op::Prepend(bytes) => {
      buf.prepend(bytes);
      model.splice(0..0, bytes.iter().copied());
    }
    Op::Insert(pos, bytes) => {
      let pos = clamp_pos(*pos, len);
      buf.insert(pos, bytes).unwrap();
      model.splice(pos..pos, bytes.iter().copied());
    }
    Op::InsertWithin(pos, a, b) => {
      let pos = clamp_pos(*pos, len);
      let (start, end) = clamp_range(*a, *b, len);
      buf.insert_from_within(pos, start..end).unwrap();
      let chunk = model[start..end].to_vec();
      model.splice(pos..pos, chunk);
    }
    Op::PushByte(byte) => {
      buf.push_byte(*byte);
      model.push(*byte);
    }
    Op::PushScalar(scalar) => {
      buf.push_scalar(*scalar);
      let mut out = [0u8; 6];
      let n = encode_scalar(*scalar, &mut out);
      model.extend_from_slice(&out[..n]);
    }
    Op::Erase(a, b) => {
      let (start, end) = clamp_range(*a, *b, len);
      buf.erase(start..end).unwrap();
      model.drain(start..end);
    }
    Op::Overwrite(pos, bytes) => {
      let pos = clamp_pos(*pos, len);
      buf.overwrite(pos, bytes).unwrap();
      for (i, &byte) in bytes.iter().enumerate() {
        if pos + i < model.len() {
          model[pos + i] = byte;
        } else {
          model.push(byte);
        }
      }
    }
    Op::Truncate(n) => {
      buf.truncate(*n as usize);
      model.truncate(*n as usize);
    }
    Op::SetLen(n) => {
      let target = *n as usize % (len + MAX_CHUNK_BYTES + 1);
      buf.set_len(target);
      model.resize(target, 0);
    }
    Op::Assign(bytes) => {
      buf.assign(bytes);
      model.clear();
      model.extend_from_slice(bytes);
    }
  }
}

/// Content must match the model and the terminator invariants must hold.
pub fn check(buf: &ByteString, expected: &[u8]) {
  assert_eq!(buf.as_bytes(), expected);
  assert_eq!(buf.len(), expected.len());
  assert_eq!(buf.as_bytes_with_nul().last(), Some(&0));
  assert_eq!(buf.as_bytes_with_nul().len(), buf.len() + 1);
  assert!(buf.capacity() > buf.len());
}

/// Left-to-right, non-overlapping reference substitution. A `limit` of zero
/// means no cap. The needle must be non-empty.
pub fn model_replace(
  haystack: &[u8],
  needle: &[u8],
  replacement: &[u8],
  limit: usize,
) -> (Vec<u8>, usize) {
  let mut out = Vec::new();
  let mut count = 0;
  let mut i = 0;
  while i < haystack.len() {
    if (limit == 0 || count < limit) && haystack[i..].starts_with(needle) {
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

/// Reference for the empty-needle path: `replacement` lands once per
/// inter-byte gap, capped at `limit` (zero or past the length clamps to one
/// more gap than there are bytes).
pub fn model_gap_fill(haystack: &[u8], replacement: &[u8], limit: usize) -> (Vec<u8>, usize) {
  let len = haystack.len();
  let limit = if limit == 0 || limit > len { len + 1 } else { limit };

  let mut out = Vec::new();
  for (i, &byte) in haystack.iter().enumerate() {
    if i < limit {
      out.extend_from_slice(replacement);
    }
    out.push(byte);
  }
  if limit > len {
    out.extend_from_slice(replacement);
  }
  (out, limit)
}

fn next_chunk(cursor: &mut ByteCursor) -> Vec<u8> {
  let len = cursor.next_usize(MAX_CHUNK_BYTES);
  cursor.next_bytes(len).to_vec()
}

fn clamp_pos(seed: u16, len: usize) -> usize {
  (seed as usize) % (len + 1)
}

fn clamp_range(a: u16, b: u16, len: usize) -> (usize, usize) {
  let a = (a as usize) % (len + 1);
  let b = (b as usize) % (len + 1);
  (a.min(b), a.max(b))
}

struct ByteCursor<'a> {
  data: &'a [u8],
  pos:  usize,
}

impl<'a> ByteCursor<'a> {
  fn new(data: &'a [u8]) -> Self {
    Self { data, pos: 0 }
  }

  fn next_u8(&mut self) -> u8 {
    let value = self.data.get(self.pos).copied().unwrap_or(0);
    self.pos = self.pos.saturating_add(1);
    value
  }

  fn next_u16(&mut self) -> u16 {
    let lo = self.next_u8() as u16;
    let hi = self.next_u8() as u16;
    lo | (hi << 8)
  }

  fn next_u32(&mut self) -> u32 {
    let lo = self.next_u16() as u32;
    let hi = self.next_u16() as u32;
    lo | (hi << 16)
  }

  fn next_usize(&mut self, max: usize) -> usize {
    if max == 0 {
      return 0;
    }
    (self.next_u16() as usize) % (max + 1)
  }

  fn next_bytes(&mut self, len: usize) -> &'a [u8] {
    let start = self.pos.min(self.data.len());
    let end = start.saturating_add(len).min(self.data.len());
    self.pos = end;
    &self.data[start..end]
  }
}
