//! EIP-712 signing and verification of declarations.
//!
//! The owner signs `MetaDelegateCall(address to, bytes data)` where `to` is
//! the declaration contract and `data` the declaration's wire bytes, under the
//! domain of their derived wallet. Signing goes through BUILD, HASH and SIGN;
//! [`verify`] holds the independent checks a verifier runs on the result.

use intent_account::AccountError;
use intent_types::{Address, DeclarationError, B256};
use thiserror::Error;

pub mod eip712;
pub mod signer;
pub mod verify;

pub use eip712::{
	build_typed_data, compute_domain_hash, compute_final_digest, compute_struct_hash,
	hash_typed_data, DOMAIN_TYPE, MESSAGE_TYPE, PRIMARY_TYPE,
};
pub use signer::{Eip712Signer, SignedDeclaration};
pub use verify::{normalize_recovery_byte, recover_signer, verify_account, verify_signer};

#[derive(Debug, Error)]
pub enum SigningError {
	#[error(transparent)]
	Account(#[from] AccountError),

	#[error("Malformed signature: {0}")]
	MalformedSignature(String),

	#[error("Invalid signature recovery byte {0}: expected 0, 1, 27 or 28")]
	InvalidRecoveryByte(u8),

	#[error("Signature recovers to {recovered}, expected {expected}")]
	SignerMismatch { expected: String, recovered: String },

	#[error("Account mismatch: {signer} derives {expected}, payload names {actual}")]
	AccountMismatch {
		signer: Address,
		expected: Address,
		actual: Address,
	},

	#[error("Hash mismatch: signed {expected}, payload hashes to {actual}")]
	HashMismatch { expected: B256, actual: B256 },

	#[error("Invalid typed data: {0}")]
	InvalidTypedData(String),
}

impl From<SigningError> for DeclarationError {
	fn from(err: SigningError) -> Self {
		match err {
			SigningError::AccountMismatch {
				expected, actual, ..
			} => DeclarationError::AddressMismatch { expected, actual },
			SigningError::HashMismatch { expected, actual } => {
				DeclarationError::HashMismatch { expected, actual }
			}
			SigningError::InvalidTypedData(message) => DeclarationError::Validation(message),
			other => DeclarationError::Signature(other.to_string()),
		}
	}
}
