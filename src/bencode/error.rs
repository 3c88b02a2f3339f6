use thiserror::Error;

/// Syntax errors raised while decoding. Every variant carries the absolute
/// byte offset in the input at which decoding failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BencodeError {
	#[error("Unexpected end of input at byte {offset}")]
	UnexpectedEnd { offset: usize },

	#[error("Malformed integer at byte {offset}: {reason}")]
	MalformedInteger { offset: usize, reason: String },

	#[error("Malformed string length at byte {offset}: {reason}")]
	MalformedStringLength { offset: usize, reason: String },

	#[error("Truncated string at byte {offset}: declared {declared} bytes, {available} available")]
	TruncatedString {
		offset: usize,
		declared: usize,
		available: usize,
	},

	#[error("Unterminated list starting at byte {offset}")]
	UnterminatedList { offset: usize },

	#[error("Unterminated dictionary starting at byte {offset}")]
	UnterminatedDict { offset: usize },

	#[error("Non-string dictionary key at byte {offset}")]
	NonStringKey { offset: usize },

	#[error("Unknown type prefix {byte:#04x} at byte {offset}")]
	UnknownTypePrefix { offset: usize, byte: u8 },

	#[error("Trailing data at byte {offset}: {remaining} bytes left after the top-level value")]
	TrailingData { offset: usize, remaining: usize },

	#[error("Nesting deeper than {limit} levels at byte {offset}")]
	DepthLimitExceeded { offset: usize, limit: usize },

	#[error("Duplicate dictionary key {key:?} at byte {offset}")]
	DuplicateKey { offset: usize, key: String },
}

impl BencodeError {
	/// Byte offset at which decoding failed.
	pub fn offset(&self) -> usize {
		match self {
			BencodeError::UnexpectedEnd { offset }
			| BencodeError::MalformedInteger { offset, .. }
			| BencodeError::MalformedStringLength { offset, .. }
			| BencodeError::TruncatedString { offset, .. }
			| BencodeError::UnterminatedList { offset }
			| BencodeError::UnterminatedDict { offset }
			| BencodeError::NonStringKey { offset }
			| BencodeError::UnknownTypePrefix { offset, .. }
			| BencodeError::TrailingData { offset, .. }
			| BencodeError::DepthLimitExceeded { offset, .. }
			| BencodeError::DuplicateKey { offset, .. } => *offset,
		}
	}
}
