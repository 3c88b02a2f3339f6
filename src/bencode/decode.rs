use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use super::error::BencodeError;
use crate::bencode::bvalue::{BInteger, BValue};

/// Nesting limit used by [`decode_bencode`] and [`decode_all`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Decodes the single value at the start of `input`.
///
/// Returns the number of bytes consumed together with the value. Bytes after
/// the value are left alone; use [`decode_all`] to reject them.
pub fn decode_bencode(input: &[u8]) -> Result<(usize, BValue), BencodeError> {
	decode_bencode_with_limit(input, DEFAULT_MAX_DEPTH)
}

pub fn decode_bencode_with_limit(
	input: &[u8],
	max_depth: usize,
) -> Result<(usize, BValue), BencodeError> {
	Decoder { input, max_depth }.value(0, 0)
}

/// Decodes `input` as exactly one value, failing with `TrailingData` if
/// anything follows it.
pub fn decode_all(input: &[u8]) -> Result<BValue, BencodeError> {
	decode_all_with_limit(input, DEFAULT_MAX_DEPTH)
}

pub fn decode_all_with_limit(input: &[u8], max_depth: usize) -> Result<BValue, BencodeError> {
	let (consumed, value) = decode_bencode_with_limit(input, max_depth)?;
	if consumed != input.len() {
		return Err(BencodeError::TrailingData {
			offset: consumed,
			remaining: input.len() - consumed,
		});
	}
	Ok(value)
}

// Every method takes the absolute position it starts at and returns the
// absolute position just past what it consumed.
struct Decoder<'a> {
	input: &'a [u8],
	max_depth: usize,
}

impl<'a> Decoder<'a> {
	fn value(&self, pos: usize, depth: usize) -> Result<(usize, BValue), BencodeError> {
		let first = *self
			.input
			.get(pos)
			.ok_or(BencodeError::UnexpectedEnd { offset: pos })?;

		match first {
			b'i' => self.integer(pos),
			b'l' => self.list(pos, depth),
			b'd' => self.dict(pos, depth),
			c if c.is_ascii_digit() => self.string(pos),
			c => Err(BencodeError::UnknownTypePrefix { offset: pos, byte: c }),
		}
	}

	/// `i<digits>e`
	fn integer(&self, pos: usize) -> Result<(usize, BValue), BencodeError> {
		let body_start = pos + 1; // skip 'i'
		let end_pos = self.input[body_start..]
			.iter()
			.position(|&b| b == b'e')
			.map(|rel| body_start + rel)
			.ok_or_else(|| BencodeError::MalformedInteger {
				offset: pos,
				reason: "missing 'e' terminator".to_string(),
			})?;

		let body = &self.input[body_start..end_pos];
		let parsed = std::str::from_utf8(body)
			.ok()
			.and_then(|s| s.parse::<BInteger>().ok())
			.ok_or_else(|| BencodeError::MalformedInteger {
				offset: pos,
				reason: format!("'{}' is not a canonical integer", String::from_utf8_lossy(body)),
			})?;

		// add 1 to account for 'e'
		Ok((end_pos + 1, BValue::Integer(parsed)))
	}

	/// `<length>:<bytes>`
	fn string(&self, pos: usize) -> Result<(usize, BValue), BencodeError> {
		let (data_start, length) = self.string_length(pos)?;
		let available = self.input.len() - data_start;
		if length > available {
			return Err(BencodeError::TruncatedString {
				offset: pos,
				declared: length,
				available,
			});
		}

		let end_data = data_start + length;
		Ok((end_data, BValue::ByteString(self.input[data_start..end_data].to_vec())))
	}

	/// Reads the decimal prefix up to ':' and returns (first data byte, length).
	fn string_length(&self, pos: usize) -> Result<(usize, usize), BencodeError> {
		let digits_len = self.input[pos..]
			.iter()
			.position(|b| !b.is_ascii_digit())
			.unwrap_or(self.input.len() - pos);
		let colon_index = pos + digits_len;

		match self.input.get(colon_index) {
			Some(b':') => {}
			Some(&other) => {
				return Err(BencodeError::MalformedStringLength {
					offset: colon_index,
					reason: format!("expected ':' but found {:#04x}", other),
				})
			}
			None => {
				return Err(BencodeError::MalformedStringLength {
					offset: pos,
					reason: "missing ':' after length".to_string(),
				})
			}
		}

		let digits = &self.input[pos..colon_index];
		if digits.len() > 1 && digits[0] == b'0' {
			return Err(BencodeError::MalformedStringLength {
				offset: pos,
				reason: "leading zeros are not allowed".to_string(),
			});
		}

		let length = std::str::from_utf8(digits)
			.ok()
			.and_then(|s| s.parse::<usize>().ok())
			.ok_or_else(|| BencodeError::MalformedStringLength {
				offset: pos,
				reason: format!("invalid length '{}'", String::from_utf8_lossy(digits)),
			})?;

		Ok((colon_index + 1, length))
	}

	/// `l<items>e`
	fn list(&self, pos: usize, depth: usize) -> Result<(usize, BValue), BencodeError> {
		self.check_depth(pos, depth)?;

		let mut idx = pos + 1; // skip 'l'
		let mut items = Vec::new();

		while idx < self.input.len() && self.input[idx] != b'e' {
			let (next, val) = self.value(idx, depth + 1)?;
			idx = next;
			items.push(val);
		}

		// If we've run out of input, the list is unclosed
		if idx >= self.input.len() {
			return Err(BencodeError::UnterminatedList { offset: pos });
		}

		// add 1 to account for 'e'
		Ok((idx + 1, BValue::List(items)))
	}

	/// `d<key><value>...e`
	fn dict(&self, pos: usize, depth: usize) -> Result<(usize, BValue), BencodeError> {
		self.check_depth(pos, depth)?;

		let mut idx = pos + 1; // skip 'd'
		let mut map = BTreeMap::new();

		while idx < self.input.len() && self.input[idx] != b'e' {
			// Dictionary keys must be byte strings
			if !self.input[idx].is_ascii_digit() {
				return Err(BencodeError::NonStringKey { offset: idx });
			}
			let key_offset = idx;
			let (next, key) = self.string(idx)?;
			idx = next;
			let key = match key {
				BValue::ByteString(bytes) => bytes,
				_ => return Err(BencodeError::NonStringKey { offset: key_offset }),
			};

			if idx >= self.input.len() {
				return Err(BencodeError::UnterminatedDict { offset: pos });
			}
			let (next, value) = self.value(idx, depth + 1)?;
			idx = next;

			match map.entry(key) {
				Entry::Vacant(slot) => {
					slot.insert(value);
				}
				Entry::Occupied(slot) => {
					return Err(BencodeError::DuplicateKey {
						offset: key_offset,
						key: String::from_utf8_lossy(slot.key()).into_owned(),
					});
				}
			}
		}

		// Here, either we ran out of input or we encountered an 'e'
		if idx >= self.input.len() {
			return Err(BencodeError::UnterminatedDict { offset: pos });
		}

		// add 1 to account for 'e'
		Ok((idx + 1, BValue::Dict(map)))
	}

	fn check_depth(&self, pos: usize, depth: usize) -> Result<(), BencodeError> {
		if depth >= self.max_depth {
			return Err(BencodeError::DepthLimitExceeded {
				offset: pos,
				limit: self.max_depth,
			});
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bytes(s: &str) -> BValue {
		BValue::ByteString(s.as_bytes().to_vec())
	}

	#[test]
	fn test_decode_integer() {
		let input = b"i42e";
		let (consumed, value) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, BValue::from(42));
	}

	#[test]
	fn test_decode_negative_integer() {
		let input = b"i-13e";
		let (consumed, value) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, BValue::from(-13));
	}

	#[test]
	fn test_decode_integer_zero() {
		let (consumed, value) = decode_bencode(b"i0e").unwrap();
		assert_eq!(consumed, 3);
		assert_eq!(value, BValue::from(0));
	}

	#[test]
	fn test_decode_integer_beyond_i64() {
		let input = b"i123456789012345678901234567890e";
		let value = decode_all(input).unwrap();
		let int = value.as_integer().unwrap();
		assert_eq!(int.as_str(), "123456789012345678901234567890");
		assert_eq!(int.as_i64(), None);
	}

	#[test]
	fn test_decode_string() {
		let input = b"5:hello";
		let (consumed, value) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, bytes("hello"));
	}

	#[test]
	fn test_decode_empty_string() {
		let (consumed, value) = decode_bencode(b"0:").unwrap();
		assert_eq!(consumed, 2);
		assert_eq!(value, bytes(""));
	}

	#[test]
	fn test_decode_binary_string() {
		let input = b"3:\x00\xff\x10";
		let value = decode_all(input).unwrap();
		assert_eq!(value, BValue::ByteString(vec![0x00, 0xff, 0x10]));
	}

	#[test]
	fn test_decode_list() {
		// l4:spami42ee => ["spam", 42]
		let input = b"l4:spami42ee";
		let (consumed, value) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, BValue::List(vec![bytes("spam"), BValue::from(42)]));
	}

	#[test]
	fn test_decode_nested_list() {
		// l4:spaml3:eggi3eee => ["spam", ["egg", 3]]
		let input = b"l4:spaml3:eggi3eee";
		let (consumed, value) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(
			value,
			BValue::List(vec![
				bytes("spam"),
				BValue::List(vec![bytes("egg"), BValue::from(3)]),
			])
		);
	}

	#[test]
	fn test_decode_dict() {
		// d3:bar4:spam3:fooi42ee => {"bar":"spam", "foo":42}
		let input = b"d3:bar4:spam3:fooi42ee";
		let (consumed, value) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		let mut expected_map = BTreeMap::new();
		expected_map.insert(b"bar".to_vec(), bytes("spam"));
		expected_map.insert(b"foo".to_vec(), BValue::from(42));
		assert_eq!(value, BValue::Dict(expected_map));
	}

	#[test]
	fn test_decode_empty_dict() {
		let (consumed, value) = decode_bencode(b"de").unwrap();
		assert_eq!(consumed, 2);
		assert_eq!(value, BValue::Dict(BTreeMap::new()));
	}

	#[test]
	fn test_decode_dict_with_nested_list() {
		// => {"foo": ["spam", 1], "bar": "eggs"}
		let input = b"d3:fool4:spami1ee3:bar4:eggse";
		let value = decode_all(input).unwrap();
		assert_eq!(
			value.get(b"foo"),
			Some(&BValue::List(vec![bytes("spam"), BValue::from(1)]))
		);
		assert_eq!(value.get(b"bar"), Some(&bytes("eggs")));
	}

	#[test]
	fn test_decode_unsorted_dict_is_accepted() {
		let value = decode_all(b"d1:bi2e1:ai1ee").unwrap();
		let keys: Vec<_> = value.as_dict().unwrap().keys().cloned().collect();
		assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
	}

	#[test]
	fn test_decode_bencode_leaves_trailing_bytes() {
		let (consumed, value) = decode_bencode(b"i1ei2e").unwrap();
		assert_eq!(consumed, 3);
		assert_eq!(value, BValue::from(1));
	}

	//
	// Malformed Inputs: Test expected failures
	//

	#[test]
	fn test_decode_empty_input() {
		assert_eq!(decode_all(b""), Err(BencodeError::UnexpectedEnd { offset: 0 }));
	}

	#[test]
	fn test_decode_integer_missing_e() {
		let err = decode_all(b"i42").unwrap_err();
		assert!(matches!(err, BencodeError::MalformedInteger { offset: 0, .. }));
	}

	#[test]
	fn test_decode_leading_zeros() {
		for input in [&b"i04e"[..], b"i0123e", b"i-04e", b"i00e"] {
			let err = decode_all(input).unwrap_err();
			assert!(matches!(err, BencodeError::MalformedInteger { .. }), "{:?}", err);
		}
	}

	#[test]
	fn test_decode_negative_zero() {
		let err = decode_all(b"i-0e").unwrap_err();
		assert!(matches!(err, BencodeError::MalformedInteger { .. }));
	}

	#[test]
	fn test_decode_integer_garbage() {
		for input in [&b"ie"[..], b"i-e", b"i12a3e", b"i+1e", b"i 1e"] {
			let err = decode_all(input).unwrap_err();
			assert!(matches!(err, BencodeError::MalformedInteger { .. }), "{:?}", err);
		}
	}

	#[test]
	fn test_decode_string_missing_colon() {
		let err = decode_all(b"5hello").unwrap_err();
		assert!(matches!(err, BencodeError::MalformedStringLength { offset: 1, .. }));

		let err = decode_all(b"12").unwrap_err();
		assert!(matches!(err, BencodeError::MalformedStringLength { offset: 0, .. }));
	}

	#[test]
	fn test_decode_string_length_leading_zero() {
		let err = decode_all(b"04:spam").unwrap_err();
		assert!(matches!(err, BencodeError::MalformedStringLength { .. }));
	}

	#[test]
	fn test_decode_truncated_string() {
		assert_eq!(
			decode_all(b"4:ab"),
			Err(BencodeError::TruncatedString {
				offset: 0,
				declared: 4,
				available: 2
			})
		);
	}

	#[test]
	fn test_decode_list_unclosed() {
		assert_eq!(
			decode_all(b"l4:spam"),
			Err(BencodeError::UnterminatedList { offset: 0 })
		);
		assert_eq!(decode_all(b"l"), Err(BencodeError::UnterminatedList { offset: 0 }));
	}

	#[test]
	fn test_decode_nested_list_unclosed_reports_inner() {
		assert_eq!(
			decode_all(b"li1el"),
			Err(BencodeError::UnterminatedList { offset: 4 })
		);
	}

	#[test]
	fn test_decode_dict_unclosed() {
		assert_eq!(
			decode_all(b"d3:foo4:spam"),
			Err(BencodeError::UnterminatedDict { offset: 0 })
		);
		assert_eq!(decode_all(b"d"), Err(BencodeError::UnterminatedDict { offset: 0 }));
		// key without a value
		assert_eq!(
			decode_all(b"d3:foo"),
			Err(BencodeError::UnterminatedDict { offset: 0 })
		);
	}

	#[test]
	fn test_decode_dict_key_not_string() {
		assert_eq!(
			decode_all(b"di42e4:spame"),
			Err(BencodeError::NonStringKey { offset: 1 })
		);
		assert_eq!(
			decode_all(b"dl1:aee"),
			Err(BencodeError::NonStringKey { offset: 1 })
		);
	}

	#[test]
	fn test_decode_duplicate_key() {
		let err = decode_all(b"d1:ai1e1:ai2ee").unwrap_err();
		assert_eq!(
			err,
			BencodeError::DuplicateKey {
				offset: 7,
				key: "a".to_string()
			}
		);
	}

	#[test]
	fn test_decode_unknown_prefix() {
		assert_eq!(
			decode_all(b"x"),
			Err(BencodeError::UnknownTypePrefix { offset: 0, byte: b'x' })
		);
		assert_eq!(
			decode_all(b"l1:ax"),
			Err(BencodeError::UnknownTypePrefix { offset: 4, byte: b'x' })
		);
	}

	#[test]
	fn test_decode_trailing_data() {
		assert_eq!(
			decode_all(b"i1eXYZ"),
			Err(BencodeError::TrailingData {
				offset: 3,
				remaining: 3
			})
		);
	}

	#[test]
	fn test_decode_depth_limit() {
		let deep = [vec![b'l'; 4], vec![b'e'; 4]].concat();
		assert!(decode_all_with_limit(&deep, 4).is_ok());
		assert_eq!(
			decode_all_with_limit(&deep, 3),
			Err(BencodeError::DepthLimitExceeded { offset: 3, limit: 3 })
		);
	}

	#[test]
	fn test_decode_default_limit_stops_pathological_nesting() {
		let deep = vec![b'l'; 100_000];
		let err = decode_all(&deep).unwrap_err();
		assert!(matches!(err, BencodeError::DepthLimitExceeded { .. }));
	}
}
