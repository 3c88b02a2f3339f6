pub mod bvalue;
pub mod decode;
pub mod encode;
pub mod error;

pub use bvalue::{BInteger, BValue};   // re-export
pub use decode::{decode_all, decode_all_with_limit, decode_bencode, decode_bencode_with_limit, DEFAULT_MAX_DEPTH};   // re-export
pub use encode::{bvalue_to_json, encode_bvalue};   // re-export
pub use error::BencodeError;
