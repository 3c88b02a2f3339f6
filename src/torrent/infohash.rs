// infohash.rs
use std::fmt;

use sha1::{Digest, Sha1};
use thiserror::Error;

use crate::bencode::{encode_bvalue, BValue};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InfoHashError {
	#[error("Missing 'info' key in top-level dictionary")]
	MissingInfoKey,

	#[error("Invalid 'info' value: expected a dictionary, found a {found}")]
	InvalidInfoValue { found: &'static str },
}

/// Raw 20-byte SHA-1 digest of a torrent's canonical info dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash(pub [u8; 20]);

impl InfoHash {
	/// Lowercase hex, always 40 characters.
	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}
}

impl fmt::Display for InfoHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

/// Returns the `info` dictionary of a decoded torrent.
pub fn info_dict(top: &BValue) -> Result<&BValue, InfoHashError> {
	let info = top.get(b"info").ok_or(InfoHashError::MissingInfoKey)?;
	match info {
		BValue::Dict(_) => Ok(info),
		other => Err(InfoHashError::InvalidInfoValue {
			found: other.type_name(),
		}),
	}
}

/// Hashes the canonical re-encoding of `top["info"]`.
pub fn info_hash_bytes(top: &BValue) -> Result<InfoHash, InfoHashError> {
	let info = info_dict(top)?;
	let encoded = encode_bvalue(info);

	let mut hasher = Sha1::new();
	hasher.update(&encoded);
	let result = hasher.finalize();

	let mut hash_bytes = [0u8; 20];
	hash_bytes.copy_from_slice(&result);
	Ok(InfoHash(hash_bytes))
}

/// The info-hash of a decoded torrent as a 40-character lowercase hex string.
pub fn derive_info_hash(top: &BValue) -> Result<String, InfoHashError> {
	info_hash_bytes(top).map(|hash| hash.to_hex())
}
