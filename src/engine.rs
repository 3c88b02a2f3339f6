// src/engine.rs
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, info, trace, warn};
use thiserror::Error;

use crate::bencode::{bvalue_to_json, decode_all_with_limit, BValue, BencodeError};
use crate::config::Config;
use crate::torrent::{info_dict, info_hash_bytes, InfoHash, InfoHashError, Torrent};

#[derive(Debug, Error)]
pub enum EngineError {
	#[error("I/O error on {path}: {source}")]
	Io {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("File too large: {size} bytes exceeds the {limit} byte limit")]
	FileTooLarge { size: u64, limit: u64 },

	#[error("Bencode error: {0}")]
	Decode(#[from] BencodeError),

	#[error(transparent)]
	InfoHash(#[from] InfoHashError),
}

/// Reads the whole file, refusing anything larger than `limit` bytes.
pub fn read_torrent_file(path: &Path, limit: u64) -> Result<Vec<u8>, EngineError> {
	let io_err = |source| EngineError::Io {
		path: path.to_path_buf(),
		source,
	};

	let file = File::open(path).map_err(io_err)?;
	let size = file.metadata().map_err(io_err)?.len();
	if size > limit {
		return Err(EngineError::FileTooLarge { size, limit });
	}

	let mut buf = Vec::with_capacity(size as usize);
	// take() guards against the file growing after the size check
	file.take(limit + 1).read_to_end(&mut buf).map_err(io_err)?;
	if buf.len() as u64 > limit {
		return Err(EngineError::FileTooLarge {
			size: buf.len() as u64,
			limit,
		});
	}
	Ok(buf)
}

/// Decodes a whole torrent buffer and derives its info-hash.
pub fn hash_bytes(buf: &[u8], config: &Config) -> Result<InfoHash, EngineError> {
	debug!("Decoding {} bytes", buf.len());
	let top = decode_all_with_limit(buf, config.max_depth)?;

	let hash = info_hash_bytes(&top)?;
	log_metadata(&top, &hash);
	Ok(hash)
}

/// read -> decode -> hash, returning the 40-character hex digest.
pub fn hash_file(path: &Path, config: &Config) -> Result<String, EngineError> {
	info!("Loading torrent file from {}", path.display());
	let buf = read_torrent_file(path, config.max_file_size)?;
	let hash = hash_bytes(&buf, config)?;
	info!("Info hash of {}: {}", path.display(), hash);
	Ok(hash.to_hex())
}

// The summary is informational only; a torrent we can hash but not fully
// describe still gets its hash printed.
fn log_metadata(top: &BValue, hash: &InfoHash) {
	if log::log_enabled!(log::Level::Trace) {
		if let Ok(info) = info_dict(top) {
			trace!("info dictionary: {}", bvalue_to_json(info));
		}
	}

	if !log::log_enabled!(log::Level::Debug) {
		return;
	}
	match Torrent::from_bvalue(top) {
		Ok(torrent) => {
			debug!("Torrent metadata:");
			debug!("  Info Hash: {}", hash);
			debug!("  Announce URL: {}", torrent.announce.as_deref().unwrap_or("-"));
			debug!("  Comment: {}", torrent.comment.as_deref().unwrap_or("-"));
			if let Some(date) = torrent.creation_date {
				debug!("  Creation Date: {}", date);
			}
			debug!("  Name: {}", torrent.info.name);
			debug!("  Length: {}", torrent.info.length);
			debug!("  Piece Length: {}", torrent.info.piece_length);
			debug!("  Number of Pieces: {}", torrent.info.pieces.len());
			if torrent.info.is_multi_file() {
				debug!("  Number of Files: {}", torrent.info.files.len());
			}
		}
		Err(err) => warn!("Could not summarize torrent metadata: {}", err),
	}
}
