pub mod bytestring;
pub mod escape;
mod replace;
pub mod unicode;

pub use bytestring::{
  ByteString,
  ByteStringError,
  Result,
};
