//! Re-verification of signed declarations.
//!
//! A relayer admitting many declarations must be able to reject one without
//! aborting the rest, so every check here yields a [`ValidationResult`]
//! instead of an error.
//!
//! # Checks
//!
//! In order, stopping at the first failure:
//! - `ZERO_INTENTS`: the declaration has at least one intent
//! - `WRONG_NUMBER_OF_SWAPS`: every intent has exactly one swap segment
//! - `HASH_MISMATCH`: the payload rebuilds to the bytes and digest that were signed
//! - `SIGNATURE_MISMATCH`: the signature recovers to the claimed signer
//! - `ACCOUNT_MISMATCH`: the signer derives the domain's verifying contract

use async_trait::async_trait;
use intent_types::{Address, Bytes, ChainError, B256};

pub mod validator;

pub use validator::DeclarationValidator;

/// On-chain `isValidSignature` check for contract signers.
#[async_trait]
pub trait Eip1271Verifier: Send + Sync {
	/// Whether `account` accepts `signature` over `hash`.
	async fn is_valid_signature(
		&self,
		account: Address,
		hash: B256,
		signature: &Bytes,
	) -> Result<bool, ChainError>;
}
