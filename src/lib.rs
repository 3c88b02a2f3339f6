// lib.rs - Library interface for the info-hash tool

pub mod bencode;
pub mod config;
pub mod engine;
pub mod torrent;

// Re-export commonly used types for easier testing
pub use bencode::{decode_all, decode_bencode, encode_bvalue, BInteger, BValue, BencodeError};
pub use config::Config;
pub use engine::{hash_bytes, hash_file, EngineError};
pub use torrent::{derive_info_hash, InfoHash, InfoHashError};

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_decode_then_hash() {
		let top = decode_all(b"d4:infod4:name4:test6:lengthi100eee").unwrap();
		let hash = derive_info_hash(&top).unwrap();
		assert_eq!(hash, "5894119219a94140d5274470f2da8bf7a2b06e39");
	}

	#[test]
	fn test_decode_invalid_bencode() {
		// incomplete dictionary
		assert!(decode_all(b"d").is_err());
		// incomplete string
		assert!(decode_all(b"4:ab").is_err());
		// invalid format
		assert!(decode_all(b"invalid").is_err());
	}
}
