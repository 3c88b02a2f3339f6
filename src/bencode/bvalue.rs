use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BValue {
	ByteString(Vec<u8>), // raw bytes, not necessarily UTF-8
	Integer(BInteger),
	List(Vec<BValue>),
	Dict(BTreeMap<Vec<u8>, BValue>), // iteration order is the canonical key order
}

/// An integer of unbounded magnitude, kept as its canonical decimal text:
/// optional `-`, no leading zeros, never `-0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BInteger(String);

impl BInteger {
	/// Checks that `digits` is a canonical bencode integer body.
	pub fn is_canonical(digits: &[u8]) -> bool {
		let magnitude = match digits.split_first() {
			None => return false,
			Some((b'-', rest)) => {
				// "-" alone and "-0..." are both invalid
				if rest.first() == Some(&b'0') {
					return false;
				}
				rest
			}
			Some(_) => digits,
		};

		if magnitude.is_empty() || !magnitude.iter().all(u8::is_ascii_digit) {
			return false;
		}
		magnitude[0] != b'0' || magnitude.len() == 1
	}

	pub fn as_i64(&self) -> Option<i64> {
		self.0.parse().ok()
	}

	pub fn as_u64(&self) -> Option<u64> {
		self.0.parse().ok()
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl FromStr for BInteger {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if BInteger::is_canonical(s.as_bytes()) {
			Ok(BInteger(s.to_string()))
		} else {
			Err(format!("'{}' is not a canonical integer", s))
		}
	}
}

impl From<i64> for BInteger {
	fn from(n: i64) -> Self {
		BInteger(n.to_string())
	}
}

impl fmt::Display for BInteger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl BValue {
	/// Short name of the variant, for diagnostics.
	pub fn type_name(&self) -> &'static str {
		match self {
			BValue::ByteString(_) => "byte string",
			BValue::Integer(_) => "integer",
			BValue::List(_) => "list",
			BValue::Dict(_) => "dictionary",
		}
	}

	pub fn as_dict(&self) -> Option<&BTreeMap<Vec<u8>, BValue>> {
		match self {
			BValue::Dict(map) => Some(map),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[BValue]> {
		match self {
			BValue::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			BValue::ByteString(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// The byte string as UTF-8, if it is one.
	pub fn as_str(&self) -> Option<&str> {
		self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
	}

	pub fn as_integer(&self) -> Option<&BInteger> {
		match self {
			BValue::Integer(i) => Some(i),
			_ => None,
		}
	}

	/// Looks up `key` when `self` is a dictionary.
	pub fn get(&self, key: &[u8]) -> Option<&BValue> {
		self.as_dict().and_then(|map| map.get(key))
	}
}

impl From<i64> for BValue {
	fn from(n: i64) -> Self {
		BValue::Integer(n.into())
	}
}

impl From<&str> for BValue {
	fn from(s: &str) -> Self {
		BValue::ByteString(s.as_bytes().to_vec())
	}
}

impl From<Vec<u8>> for BValue {
	fn from(bytes: Vec<u8>) -> Self {
		BValue::ByteString(bytes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_canonical_integers() {
		for ok in ["0", "7", "-7", "100", "-9223372036854775809", "123456789012345678901234567890"] {
			assert!(BInteger::is_canonical(ok.as_bytes()), "{}", ok);
		}
		for bad in ["", "-", "-0", "04", "-04", "00", "1a", "+1", " 1", "--1"] {
			assert!(!BInteger::is_canonical(bad.as_bytes()), "{}", bad);
		}
	}

	#[test]
	fn test_integer_range_accessors() {
		let big: BInteger = "18446744073709551616".parse().unwrap();
		assert_eq!(big.as_i64(), None);
		assert_eq!(big.as_u64(), None);

		let neg = BInteger::from(-42i64);
		assert_eq!(neg.as_i64(), Some(-42));
		assert_eq!(neg.as_u64(), None);
		assert_eq!(neg.to_string(), "-42");
	}

	#[test]
	fn test_from_str_rejects_non_canonical() {
		assert!("-0".parse::<BInteger>().is_err());
		assert!("007".parse::<BInteger>().is_err());
	}

	#[test]
	fn test_dict_lookup() {
		let mut map = BTreeMap::new();
		map.insert(b"name".to_vec(), BValue::from("test"));
		let dict = BValue::Dict(map);

		assert_eq!(dict.get(b"name").and_then(BValue::as_str), Some("test"));
		assert!(dict.get(b"missing").is_none());
		assert!(BValue::from(1).get(b"name").is_none());
		assert_eq!(dict.type_name(), "dictionary");
	}
}
