#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;
use the_bytestring::ByteString;

use crate::common::{
  check,
  decode_replace_scenario,
  model_gap_fill,
  model_replace,
};

fuzz_target!(|data: &[u8]| {
  let scenario = decode_replace_scenario(data);

  let mut buf = ByteString::from(scenario.haystack.as_slice());
  let count = buf.replace(&scenario.needle, &scenario.replacement, scenario.limit);

  let (expected, expected_count) = if scenario.needle.is_empty() {
    model_gap_fill(&scenario.haystack, &scenario.replacement, scenario.limit)
  } else {
    model_replace(
      &scenario.haystack,
      &scenario.needle,
      &scenario.replacement,
      scenario.limit,
    )
  };

  assert_eq!(count, expected_count);
  check(&buf, &expected);
});
