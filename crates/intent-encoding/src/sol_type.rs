//! Statically defined Solidity types.
//!
//! Segment schemas are `static` tables, so the type description is built from
//! `&'static` parts only. Each variant knows its canonical signature form, how
//! to coerce and validate a JSON value into an ABI value, and how to render an
//! ABI value back to JSON for the wire payload.

use crate::EncodingError;
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, U256};
use serde_json::{Map, Value};

/// A named member of a tuple type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolField {
	pub name: &'static str,
	pub ty: SolType,
}

impl SolField {
	pub const fn new(name: &'static str, ty: SolType) -> Self {
		Self { name, ty }
	}
}

/// One Solidity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolType {
	Address,
	Bool,
	Bytes,
	/// `bytesN`, `1 <= N <= 32`
	FixedBytes(usize),
	/// `uintN`, `N` a multiple of 8 up to 256
	Uint(usize),
	/// `T[]`
	Array(&'static SolType),
	/// Named struct, encoded as a tuple
	Tuple(&'static str, &'static [SolField]),
}

impl SolType {
	/// Canonical form used in function signatures, e.g. `(address,bytes)[]`.
	pub fn canonical(&self) -> String {
		match self {
			SolType::Address => "address".to_string(),
			SolType::Bool => "bool".to_string(),
			SolType::Bytes => "bytes".to_string(),
			SolType::FixedBytes(size) => format!("bytes{}", size),
			SolType::Uint(bits) => format!("uint{}", bits),
			SolType::Array(inner) => format!("{}[]", inner.canonical()),
			SolType::Tuple(_, fields) => {
				let inner: Vec<String> = fields.iter().map(|f| f.ty.canonical()).collect();
				format!("({})", inner.join(","))
			}
		}
	}

	/// Name shown to humans: the struct name for tuples, the canonical form otherwise.
	pub fn display_name(&self) -> String {
		match self {
			SolType::Tuple(name, _) => name.to_string(),
			SolType::Array(inner) => format!("{}[]", inner.display_name()),
			other => other.canonical(),
		}
	}

	/// Equivalent dynamic type used by the ABI encoder.
	pub fn to_dyn(&self) -> DynSolType {
		match self {
			SolType::Address => DynSolType::Address,
			SolType::Bool => DynSolType::Bool,
			SolType::Bytes => DynSolType::Bytes,
			SolType::FixedBytes(size) => DynSolType::FixedBytes(*size),
			SolType::Uint(bits) => DynSolType::Uint(*bits),
			SolType::Array(inner) => DynSolType::Array(Box::new(inner.to_dyn())),
			SolType::Tuple(_, fields) => {
				DynSolType::Tuple(fields.iter().map(|f| f.ty.to_dyn()).collect())
			}
		}
	}

	/// Whether `value` has exactly this type.
	pub fn matches(&self, value: &DynSolValue) -> bool {
		self.to_dyn().matches(value)
	}

	/// Validates a JSON value against this type and converts it.
	///
	/// `param` names the parameter in error messages. Accepted inputs:
	/// addresses and bytes as `0x` hex strings, integers as JSON numbers or
	/// decimal / `0x` hex strings, tuples as objects keyed by member name or
	/// as positional arrays.
	pub fn coerce(&self, param: &str, value: &Value) -> Result<DynSolValue, EncodingError> {
		match self {
			SolType::Address => {
				let text = expect_str(param, value, "address")?;
				parse_address(text)
					.map(DynSolValue::Address)
					.ok_or_else(|| range(param, format!("'{}' is not a 20-byte hex address", text)))
			}
			SolType::Bool => match value {
				Value::Bool(b) => Ok(DynSolValue::Bool(*b)),
				Value::String(s) if s == "true" || s == "false" => {
					Ok(DynSolValue::Bool(s == "true"))
				}
				other => Err(range(param, format!("expected bool, got {}", other))),
			},
			SolType::Bytes => {
				let text = expect_str(param, value, "bytes")?;
				parse_hex(text)
					.map(DynSolValue::Bytes)
					.ok_or_else(|| range(param, format!("'{}' is not 0x-prefixed hex bytes", text)))
			}
			SolType::FixedBytes(size) => {
				let text = expect_str(param, value, "fixed bytes")?;
				let bytes = parse_hex(text).ok_or_else(|| {
					range(param, format!("'{}' is not 0x-prefixed hex bytes", text))
				})?;
				if bytes.len() != *size {
					return Err(range(
						param,
						format!("expected {} bytes, got {}", size, bytes.len()),
					));
				}
				let mut word = [0u8; 32];
				word[..*size].copy_from_slice(&bytes);
				Ok(DynSolValue::FixedBytes(B256::from(word), *size))
			}
			SolType::Uint(bits) => {
				let number = parse_uint(param, value)?;
				if *bits < 256 && number >> *bits != U256::ZERO {
					return Err(range(
						param,
						format!("{} does not fit in uint{}", number, bits),
					));
				}
				Ok(DynSolValue::Uint(number, *bits))
			}
			SolType::Array(inner) => {
				let items = value
					.as_array()
					.ok_or_else(|| range(param, format!("expected array, got {}", value)))?;
				let values = items
					.iter()
					.enumerate()
					.map(|(i, item)| inner.coerce(&format!("{}[{}]", param, i), item))
					.collect::<Result<Vec<_>, _>>()?;
				Ok(DynSolValue::Array(values))
			}
			SolType::Tuple(name, fields) => {
				let members = match value {
					Value::Object(map) => {
						let unknown: Vec<&String> = map
							.keys()
							.filter(|k| !fields.iter().any(|f| f.name == k.as_str()))
							.collect();
						if let Some(key) = unknown.first() {
							return Err(range(
								param,
								format!("unknown member '{}' for {}", key, name),
							));
						}
						fields
							.iter()
							.map(|field| {
								let path = format!("{}.{}", param, field.name);
								let member = map.get(field.name).ok_or_else(|| {
									range(&path, "missing struct member".to_string())
								})?;
								field.ty.coerce(&path, member)
							})
							.collect::<Result<Vec<_>, _>>()?
					}
					Value::Array(items) => {
						if items.len() != fields.len() {
							return Err(range(
								param,
								format!(
									"{} expects {} members, got {}",
									name,
									fields.len(),
									items.len()
								),
							));
						}
						fields
							.iter()
							.zip(items)
							.map(|(field, item)| {
								field.ty.coerce(&format!("{}.{}", param, field.name), item)
							})
							.collect::<Result<Vec<_>, _>>()?
					}
					other => {
						return Err(range(
							param,
							format!("expected {} object, got {}", name, other),
						))
					}
				};
				Ok(DynSolValue::Tuple(members))
			}
		}
	}

	/// Checks an already typed value: exact ABI shape and, for `uintN`, that
	/// the number fits in `N` bits.
	pub fn check(&self, param: &str, value: &DynSolValue) -> Result<(), EncodingError> {
		match (self, value) {
			(SolType::Uint(bits), DynSolValue::Uint(number, size)) if size == bits => {
				if *bits < 256 && *number >> *bits != U256::ZERO {
					return Err(range(
						param,
						format!("{} does not fit in uint{}", number, bits),
					));
				}
				Ok(())
			}
			(SolType::Array(inner), DynSolValue::Array(items)) => items
				.iter()
				.enumerate()
				.try_for_each(|(i, item)| inner.check(&format!("{}[{}]", param, i), item)),
			(SolType::Tuple(_, fields), DynSolValue::Tuple(members))
				if members.len() == fields.len() =>
			{
				fields.iter().zip(members).try_for_each(|(field, member)| {
					field.ty.check(&format!("{}.{}", param, field.name), member)
				})
			}
			(ty, value) if ty.matches(value) => Ok(()),
			(ty, _) => Err(range(param, format!("expected {}", ty.display_name()))),
		}
	}

	/// Renders an ABI value as JSON: addresses checksummed, bytes as hex,
	/// integers as decimal strings, tuples as objects keyed by member name.
	pub fn render(&self, value: &DynSolValue) -> Value {
		match (self, value) {
			(SolType::Address, DynSolValue::Address(addr)) => Value::String(addr.to_checksum(None)),
			(SolType::Bool, DynSolValue::Bool(b)) => Value::Bool(*b),
			(SolType::Bytes, DynSolValue::Bytes(bytes)) => {
				Value::String(format!("0x{}", hex::encode(bytes)))
			}
			(SolType::FixedBytes(size), DynSolValue::FixedBytes(word, _)) => {
				Value::String(format!("0x{}", hex::encode(&word[..*size])))
			}
			(SolType::Uint(_), DynSolValue::Uint(number, _)) => Value::String(number.to_string()),
			(SolType::Array(inner), DynSolValue::Array(items)) => {
				Value::Array(items.iter().map(|item| inner.render(item)).collect())
			}
			(SolType::Tuple(_, fields), DynSolValue::Tuple(members)) => {
				let mut map = Map::new();
				for (field, member) in fields.iter().zip(members) {
					map.insert(field.name.to_string(), field.ty.render(member));
				}
				Value::Object(map)
			}
			_ => Value::Null,
		}
	}
}

fn range(param: &str, message: String) -> EncodingError {
	EncodingError::Range {
		param: param.to_string(),
		message,
	}
}

fn expect_str<'a>(param: &str, value: &'a Value, what: &str) -> Result<&'a str, EncodingError> {
	value
		.as_str()
		.ok_or_else(|| range(param, format!("expected {} as hex string, got {}", what, value)))
}

fn parse_hex(text: &str) -> Option<Vec<u8>> {
	let digits = text.strip_prefix("0x")?;
	hex::decode(digits).ok()
}

fn parse_address(text: &str) -> Option<Address> {
	let bytes = parse_hex(text)?;
	if bytes.len() != 20 {
		return None;
	}
	Some(Address::from_slice(&bytes))
}

fn parse_uint(param: &str, value: &Value) -> Result<U256, EncodingError> {
	match value {
		Value::Number(number) => number
			.as_u64()
			.map(U256::from)
			.ok_or_else(|| range(param, format!("{} is not an unsigned integer", number))),
		Value::String(text) => {
			let parsed = match text.strip_prefix("0x") {
				Some(digits) if !digits.is_empty() => U256::from_str_radix(digits, 16),
				Some(_) => return Err(range(param, "empty hex integer".to_string())),
				None if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
					U256::from_str_radix(text, 10)
				}
				None => {
					return Err(range(
						param,
						format!("'{}' is not an unsigned integer", text),
					))
				}
			};
			parsed.map_err(|_| range(param, format!("'{}' does not fit in uint256", text)))
		}
		other => Err(range(param, format!("expected unsigned integer, got {}", other))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	static CALL_FIELDS: [SolField; 2] = [
		SolField::new("targetContract", SolType::Address),
		SolField::new("data", SolType::Bytes),
	];
	static CALL: SolType = SolType::Tuple("Call", &CALL_FIELDS);

	#[test]
	fn test_canonical_forms() {
		assert_eq!(SolType::Uint(24).canonical(), "uint24");
		assert_eq!(SolType::FixedBytes(32).canonical(), "bytes32");
		assert_eq!(CALL.canonical(), "(address,bytes)");
		assert_eq!(SolType::Array(&CALL).canonical(), "(address,bytes)[]");
		assert_eq!(SolType::Array(&CALL).display_name(), "Call[]");
	}

	#[test]
	fn test_uint_range_checks() {
		let ty = SolType::Uint(24);
		assert!(ty.coerce("feePercent", &json!(16_777_215u64)).is_ok());

		let err = ty.coerce("feePercent", &json!(16_777_216u64)).unwrap_err();
		assert!(err.to_string().contains("feePercent"));
		assert!(err.to_string().contains("uint24"));

		assert!(ty.coerce("feePercent", &json!(-1)).is_err());
		assert!(ty.coerce("feePercent", &json!("12abc")).is_err());
		assert!(ty.coerce("feePercent", &json!("0xff")).is_ok());
	}

	#[test]
	fn test_uint256_accepts_large_decimal_strings() {
		let max = U256::MAX.to_string();
		let value = SolType::Uint(256).coerce("amount", &json!(max)).unwrap();
		assert_eq!(value, DynSolValue::Uint(U256::MAX, 256));

		let overflow = format!("{}0", max);
		assert!(SolType::Uint(256).coerce("amount", &json!(overflow)).is_err());
	}

	#[test]
	fn test_address_validation() {
		let ok = SolType::Address.coerce("owner", &json!("0x1111111111111111111111111111111111111111"));
		assert!(ok.is_ok());

		let short = SolType::Address.coerce("owner", &json!("0x1234"));
		match short {
			Err(EncodingError::Range { param, .. }) => assert_eq!(param, "owner"),
			other => panic!("Expected range error, got {:?}", other),
		}

		assert!(SolType::Address
			.coerce("owner", &json!("1111111111111111111111111111111111111111"))
			.is_err());
	}

	#[test]
	fn test_bytes_validation() {
		assert!(SolType::Bytes.coerce("params", &json!("0x")).is_ok());
		assert!(SolType::Bytes.coerce("params", &json!("0xabc")).is_err());
		assert!(SolType::FixedBytes(32).coerce("root", &json!("0x00")).is_err());
	}

	#[test]
	fn test_tuple_by_name_and_position() {
		let by_name = CALL
			.coerce(
				"call",
				&json!({ "targetContract": "0x2222222222222222222222222222222222222222", "data": "0x01" }),
			)
			.unwrap();
		let by_position = CALL
			.coerce(
				"call",
				&json!(["0x2222222222222222222222222222222222222222", "0x01"]),
			)
			.unwrap();
		assert_eq!(by_name, by_position);
		assert!(CALL.matches(&by_name));

		let missing = CALL.coerce("call", &json!({ "data": "0x01" })).unwrap_err();
		assert!(missing.to_string().contains("call.targetContract"));
	}

	#[test]
	fn test_check_typed_values() {
		let fee = SolType::Uint(24);
		assert!(fee.check("feePercent", &DynSolValue::Uint(U256::from(3000u64), 24)).is_ok());
		assert!(fee
			.check("feePercent", &DynSolValue::Uint(U256::from(1u64) << 24usize, 24))
			.is_err());
		assert!(fee.check("feePercent", &DynSolValue::Uint(U256::from(1u64), 256)).is_err());

		let wrong_member = DynSolValue::Tuple(vec![
			DynSolValue::Bool(true),
			DynSolValue::Bytes(vec![]),
		]);
		let err = CALL.check("call", &wrong_member).unwrap_err();
		assert!(err.to_string().contains("call.targetContract"));
	}

	#[test]
	fn test_render_uses_decimal_and_member_names() {
		let value = DynSolValue::Tuple(vec![
			DynSolValue::Address(Address::repeat_byte(0x33)),
			DynSolValue::Bytes(vec![0xbe, 0xef]),
		]);
		let rendered = CALL.render(&value);
		assert_eq!(rendered["data"], "0xbeef");

		let number = SolType::Uint(256).render(&DynSolValue::Uint(U256::from(1000u64), 256));
		assert_eq!(number, json!("1000"));
	}
}
