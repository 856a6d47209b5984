#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;
use the_bytestring::ByteString;

use crate::common::{
  apply_op,
  check,
  decode_ops,
};

fuzz_target!(|data: &[u8]| {
  let ops = decode_ops(data);

  let mut buf = ByteString::new();
  let mut model = Vec::new();

  for op in &ops {
    apply_op(&mut buf, &mut model, op);
    check(&buf, &model);
  }
});
