use std::collections::BTreeMap;

use thiserror::Error;

use crate::bencode::BValue;
use crate::torrent::infohash::{info_dict, InfoHashError};

const PIECE_HASH_LEN: usize = 20;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
	#[error("Missing '{0}'")]
	Missing(String),

	#[error("Invalid '{key}': {reason}")]
	Invalid { key: String, reason: String },

	#[error(transparent)]
	InfoHash(#[from] InfoHashError),
}

/// Summary of a .torrent file: the announce URL and the associated info.
#[derive(Debug, Clone)]
pub struct Torrent {
	pub announce: Option<String>,    // The tracker URL
	pub comment: Option<String>,
	pub creation_date: Option<i64>,  // seconds since the epoch
	pub info: TorrentInfo,           // Torrent metadata
}

/// Contains detailed metadata about the torrent's content.
#[derive(Debug, Clone)]
pub struct TorrentInfo {
	pub name: String,                // Name of the file or folder
	pub length: u64,                 // Total size of the file(s)
	pub piece_length: u64,           // Size of each piece
	pub pieces: Vec<[u8; 20]>,       // SHA-1 hashes are 20 bytes each
	pub files: Vec<FileEntry>,       // empty for single-file torrents
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
	pub length: u64,
	pub path: Vec<String>,
}

impl Torrent {
	/// Creates a `Torrent` from a `BValue` (the result of a bencode parse).
	///
	/// The info-hash is not part of the summary; callers that need it hash the
	/// raw info dictionary themselves.
	pub fn from_bvalue(value: &BValue) -> Result<Self, MetadataError> {
		let root_dict = value.as_dict().ok_or(InfoHashError::MissingInfoKey)?;

		let info_map = info_dict(value)?
			.as_dict()
			.ok_or(InfoHashError::MissingInfoKey)?;
		let info = TorrentInfo::from_dict(info_map)?;

		Ok(Torrent {
			announce: optional_string(root_dict, "announce")?,
			comment: optional_string(root_dict, "comment")?,
			creation_date: optional_integer(root_dict, "creation date")?,
			info,
		})
	}
}

impl TorrentInfo {
	pub fn from_dict(info_dict: &BTreeMap<Vec<u8>, BValue>) -> Result<Self, MetadataError> {
		let name = get_string(info_dict, "name")?;

		let piece_length = get_u64(info_dict, "piece length")?;
		if piece_length == 0 {
			return Err(invalid("piece length", "must be positive"));
		}

		let pieces_bytes = lookup_bytestring(info_dict, "pieces")?;
		if pieces_bytes.len() % PIECE_HASH_LEN != 0 {
			return Err(invalid(
				"pieces",
				&format!("length {} is not a multiple of {}", pieces_bytes.len(), PIECE_HASH_LEN),
			));
		}
		// Chunk the pieces bytes into 20-byte pieces.
		let pieces = pieces_bytes
			.chunks_exact(PIECE_HASH_LEN)
			.map(|chunk| {
				let mut hash = [0u8; PIECE_HASH_LEN];
				hash.copy_from_slice(chunk);
				hash
			})
			.collect();

		let (length, files) = match info_dict.get(b"files".as_slice()) {
			None => (get_u64(info_dict, "length")?, Vec::new()),
			Some(files) => {
				let files = parse_files(files)?;
				let total = files
					.iter()
					.try_fold(0u64, |acc, f| acc.checked_add(f.length))
					.ok_or_else(|| invalid("files", "total length overflows"))?;
				(total, files)
			}
		};

		Ok(TorrentInfo {
			name,
			length,
			piece_length,
			pieces,
			files,
		})
	}

	pub fn is_multi_file(&self) -> bool {
		!self.files.is_empty()
	}
}

fn parse_files(value: &BValue) -> Result<Vec<FileEntry>, MetadataError> {
	let list = value
		.as_list()
		.ok_or_else(|| invalid("files", "must be a list"))?;

	list.iter()
		.map(|entry| -> Result<FileEntry, MetadataError> {
			let dict = entry
				.as_dict()
				.ok_or_else(|| invalid("files", "entries must be dictionaries"))?;
			let length = get_u64(dict, "length")?;
			let path = dict
				.get(b"path".as_slice())
				.and_then(BValue::as_list)
				.ok_or_else(|| MetadataError::Missing("path".to_string()))?
				.iter()
				.map(|part| {
					part.as_str()
						.map(str::to_string)
						.ok_or_else(|| invalid("path", "components must be UTF-8 strings"))
				})
				.collect::<Result<Vec<_>, _>>()?;
			Ok(FileEntry { length, path })
		})
		.collect()
}

fn invalid(key: &str, reason: &str) -> MetadataError {
	MetadataError::Invalid {
		key: key.to_string(),
		reason: reason.to_string(),
	}
}

/// Looks up a key in the dictionary and returns a byte slice if the value is a ByteString.
pub fn lookup_bytestring<'a>(
	dict: &'a BTreeMap<Vec<u8>, BValue>,
	key: &str,
) -> Result<&'a [u8], MetadataError> {
	let val = dict
		.get(key.as_bytes())
		.ok_or_else(|| MetadataError::Missing(key.to_string()))?;

	val.as_bytes()
		.ok_or_else(|| invalid(key, "must be a byte string"))
}

/// Gets a ByteString from the dictionary and converts it into a UTF-8 String.
pub fn get_string(dict: &BTreeMap<Vec<u8>, BValue>, key: &str) -> Result<String, MetadataError> {
	let bytes = lookup_bytestring(dict, key)?;
	String::from_utf8(bytes.to_vec()).map_err(|_| invalid(key, "value not valid UTF-8"))
}

/// Retrieves a non-negative integer value from the dictionary.
pub fn get_u64(dict: &BTreeMap<Vec<u8>, BValue>, key: &str) -> Result<u64, MetadataError> {
	let val = dict
		.get(key.as_bytes())
		.ok_or_else(|| MetadataError::Missing(key.to_string()))?;

	let int = val
		.as_integer()
		.ok_or_else(|| invalid(key, "must be an integer"))?;
	int.as_u64()
		.ok_or_else(|| invalid(key, &format!("{} is out of range", int)))
}

fn optional_string(
	dict: &BTreeMap<Vec<u8>, BValue>,
	key: &str,
) -> Result<Option<String>, MetadataError> {
	match dict.get(key.as_bytes()) {
		None => Ok(None),
		Some(_) => get_string(dict, key).map(Some),
	}
}

fn optional_integer(
	dict: &BTreeMap<Vec<u8>, BValue>,
	key: &str,
) -> Result<Option<i64>, MetadataError> {
	match dict.get(key.as_bytes()) {
		None => Ok(None),
		Some(val) => {
			let int = val
				.as_integer()
				.ok_or_else(|| invalid(key, "must be an integer"))?;
			int.as_i64()
				.map(Some)
				.ok_or_else(|| invalid(key, &format!("{} is out of range", int)))
		}
	}
}
