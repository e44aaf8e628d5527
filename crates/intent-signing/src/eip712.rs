//! EIP-712 typed data for `MetaDelegateCall`.
//!
//! - Domain hash computation
//! - Struct hash of the signed message
//! - Final digest computation (0x1901 || domainHash || structHash)
//! - Rebuilding the digest from the rendered typed data of a payload

use crate::SigningError;
use alloy_primitives::{keccak256, Address, B256, U256};
use intent_types::{Eip712Data, TypedDataDomain, TypedDataField};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DOMAIN_TYPE: &str =
	"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
pub const PRIMARY_TYPE: &str = "MetaDelegateCall";
pub const MESSAGE_TYPE: &str = "MetaDelegateCall(address to,bytes data)";

/// Minimal ABI encoder for the static words of EIP-712 hashing.
struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Eip712AbiEncoder {
	fn new() -> Self {
		Self { buf: Vec::new() }
	}

	fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	fn push_u256(&mut self, v: U256) {
		self.buf.extend_from_slice(&v.to_be_bytes::<32>());
	}

	fn finish(self) -> Vec<u8> {
		self.buf
	}
}

/// keccak256(abi.encode(typeHash, nameHash, versionHash, chainId, verifyingContract))
pub fn compute_domain_hash(domain: &TypedDataDomain) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(DOMAIN_TYPE.as_bytes()));
	enc.push_b256(&keccak256(domain.name.as_bytes()));
	enc.push_b256(&keccak256(domain.version.as_bytes()));
	enc.push_u256(U256::from(domain.chain_id));
	enc.push_address(&domain.verifying_contract);
	keccak256(enc.finish())
}

/// keccak256(abi.encode(typeHash, to, keccak256(data)))
pub fn compute_struct_hash(to: &Address, data: &[u8]) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(MESSAGE_TYPE.as_bytes()));
	enc.push_address(to);
	enc.push_b256(&keccak256(data));
	keccak256(enc.finish())
}

/// keccak256(0x1901 || domainHash || structHash)
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.push(0x19);
	out.push(0x01);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

fn type_definitions() -> BTreeMap<String, Vec<TypedDataField>> {
	BTreeMap::from([
		(
			"EIP712Domain".to_string(),
			vec![
				TypedDataField::new("name", "string"),
				TypedDataField::new("version", "string"),
				TypedDataField::new("chainId", "uint256"),
				TypedDataField::new("verifyingContract", "address"),
			],
		),
		(
			PRIMARY_TYPE.to_string(),
			vec![
				TypedDataField::new("to", "address"),
				TypedDataField::new("data", "bytes"),
			],
		),
	])
}

/// BUILD and HASH: typed data for `MetaDelegateCall(to, data)` and its digest.
pub fn build_typed_data(domain: TypedDataDomain, to: Address, data: &[u8]) -> Eip712Data {
	let hash = compute_final_digest(&compute_domain_hash(&domain), &compute_struct_hash(&to, data));

	let mut value = Map::new();
	value.insert("to".to_string(), Value::String(to.to_checksum(None)));
	value.insert(
		"data".to_string(),
		Value::String(format!("0x{}", hex::encode(data))),
	);

	Eip712Data {
		domain,
		types: type_definitions(),
		value,
		hash,
	}
}

/// Recomputes the digest from rendered typed data, ignoring its `hash` field.
pub fn hash_typed_data(typed: &Eip712Data) -> Result<B256, SigningError> {
	if typed.types != type_definitions() {
		return Err(SigningError::InvalidTypedData(format!(
			"expected types EIP712Domain and {}",
			PRIMARY_TYPE
		)));
	}

	let (to, data) = message_fields(&typed.value)?;
	Ok(compute_final_digest(
		&compute_domain_hash(&typed.domain),
		&compute_struct_hash(&to, &data),
	))
}

/// `to` and `data` of a rendered `MetaDelegateCall` value.
pub fn message_fields(value: &Map<String, Value>) -> Result<(Address, Vec<u8>), SigningError> {
	let field = |name: &str| {
		value
			.get(name)
			.and_then(Value::as_str)
			.ok_or_else(|| SigningError::InvalidTypedData(format!("missing message field '{}'", name)))
	};

	let to = field("to")?
		.parse::<Address>()
		.map_err(|e| SigningError::InvalidTypedData(format!("invalid 'to': {}", e)))?;
	let data_hex = field("data")?;
	let data = data_hex
		.strip_prefix("0x")
		.and_then(|digits| hex::decode(digits).ok())
		.ok_or_else(|| SigningError::InvalidTypedData("invalid 'data' hex".to_string()))?;

	Ok((to, data))
}
