//! Common types used throughout the declaration protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used ethereum types
pub use alloy_primitives::{Address, Bytes, B256, I256, U256};

/// Block number
pub type BlockNumber = u64;

/// Chain identifier as used in the EIP-712 domain.
pub type ChainId = u64;

/// An arbitrary call executed by the declaration contract before or after
/// the intents, or supplied by a solver as part of the unsigned data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
	pub target_contract: Address,
	pub data: Bytes,
}

impl Call {
	pub fn new(target_contract: Address, data: impl Into<Bytes>) -> Self {
		Self {
			target_contract,
			data: data.into(),
		}
	}
}

/// Token standard discriminant, encoded on the wire as `uint8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum TokenStandard {
	Erc20 = 0,
	Erc721 = 1,
	Erc1155 = 2,
	Eth = 3,
}

impl TokenStandard {
	pub fn as_u8(self) -> u8 {
		self as u8
	}
}

impl TryFrom<u8> for TokenStandard {
	type Error = u8;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Self::Erc20),
			1 => Ok(Self::Erc721),
			2 => Ok(Self::Erc1155),
			3 => Ok(Self::Eth),
			other => Err(other),
		}
	}
}

/// Token reference used by swap segments.
///
/// Field order matches the on-chain `Token` struct:
/// `(uint8 standard, address addr, bytes32 idsMerkleRoot, uint256 id, bool disallowFlagged)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
	pub standard: TokenStandard,
	pub addr: Address,
	pub ids_merkle_root: B256,
	pub id: U256,
	pub disallow_flagged: bool,
}

impl Token {
	/// Plain ERC-20 token at `addr`.
	pub fn erc20(addr: Address) -> Self {
		Self {
			standard: TokenStandard::Erc20,
			addr,
			ids_merkle_root: B256::ZERO,
			id: U256::ZERO,
			disallow_flagged: false,
		}
	}

	/// Native ether.
	pub fn eth() -> Self {
		Self {
			standard: TokenStandard::Eth,
			addr: Address::ZERO,
			ids_merkle_root: B256::ZERO,
			id: U256::ZERO,
			disallow_flagged: false,
		}
	}
}

/// Resumable partial-fill cursor for limit orders.
///
/// `start_x96` is a Q96 fixed point fraction of the total order size. `sign`
/// selects whether fills accumulate upward (`true`) or downward (`false`) on
/// the shared state slot identified by `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillStateParams {
	pub id: u64,
	pub start_x96: u128,
	pub sign: bool,
}

impl FillStateParams {
	/// Cursor for a fresh order filling upward from zero.
	pub fn fresh(id: u64) -> Self {
		Self {
			id,
			start_x96: 0,
			sign: true,
		}
	}
}

/// Opaque reference to an on-chain pricing function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCurveRef {
	pub address: Address,
	pub params: Bytes,
}

/// How the declaration signature is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureType {
	/// Local ECDSA signature over the EIP-712 digest.
	#[serde(rename = "EIP712")]
	Eip712,
	/// Contract signature checked on-chain through `isValidSignature`.
	#[serde(rename = "EIP1271")]
	Eip1271,
}

impl fmt::Display for SignatureType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SignatureType::Eip712 => write!(f, "EIP712"),
			SignatureType::Eip1271 => write!(f, "EIP1271"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_token_standard_round_trip() {
		for standard in [
			TokenStandard::Erc20,
			TokenStandard::Erc721,
			TokenStandard::Erc1155,
			TokenStandard::Eth,
		] {
			assert_eq!(TokenStandard::try_from(standard.as_u8()), Ok(standard));
		}
		assert_eq!(TokenStandard::try_from(9), Err(9));
	}

	#[test]
	fn test_signature_type_serialization() {
		let json = serde_json::to_string(&SignatureType::Eip712).unwrap();
		assert_eq!(json, "\"EIP712\"");

		let parsed: SignatureType = serde_json::from_str("\"EIP1271\"").unwrap();
		assert_eq!(parsed, SignatureType::Eip1271);
		assert_eq!(parsed.to_string(), "EIP1271");
	}

	#[test]
	fn test_call_serializes_camel_case() {
		let call = Call::new(Address::repeat_byte(0x11), vec![0xde, 0xad]);
		let value = serde_json::to_value(&call).unwrap();
		assert!(value.get("targetContract").is_some());
		assert_eq!(value["data"], "0xdead");
	}
}
