//! JSON wire payload of a signed declaration.
//!
//! This is the shape handed to relayers. Key names are camelCase and must not
//! change: third-party verifiers parse this payload.

use crate::{Address, Bytes, Call, SignatureType, B256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized segment: the function it calls, its signed params rendered as
/// JSON, and its ABI wire data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentJson {
	pub function_name: String,
	pub params: serde_json::Value,
	pub data: Bytes,
	pub requires_unsigned_call: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentJson {
	pub segments: Vec<SegmentJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationJson {
	pub intents: Vec<IntentJson>,
	pub before_calls: Vec<Call>,
	pub after_calls: Vec<Call>,
	pub segments_contract: Address,
	/// ABI wire data of the whole declaration; this is what gets signed.
	pub data: Bytes,
}

/// EIP-712 domain as rendered in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
	pub name: String,
	pub version: String,
	pub chain_id: u64,
	pub verifying_contract: Address,
}

/// One member of an EIP-712 struct type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataField {
	pub name: String,
	#[serde(rename = "type")]
	pub type_name: String,
}

impl TypedDataField {
	pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			type_name: type_name.into(),
		}
	}
}

/// Typed data that was hashed and signed, together with the digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eip712Data {
	pub domain: TypedDataDomain,
	pub types: BTreeMap<String, Vec<TypedDataField>>,
	/// Message values: addresses and bytes as hex, numbers as decimal strings.
	pub value: serde_json::Map<String, serde_json::Value>,
	pub hash: B256,
}

/// Complete signed declaration payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedDeclarationJson {
	pub declaration: DeclarationJson,
	pub signer: Address,
	pub chain_id: u64,
	pub signature_type: SignatureType,
	pub signature: Bytes,
	pub declaration_contract: Address,
	pub eip712_data: Eip712Data,
}
