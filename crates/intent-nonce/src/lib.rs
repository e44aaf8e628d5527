//! Replay-protection bits.
//!
//! An account keeps a bitmap of 256-bit words on-chain. A [`Bit`] names one
//! slot of it by word index and power-of-two value; once the account marks it
//! used it never reverts. This crate allocates free bits by scanning words
//! read from the chain and converts between bits and linear nonces. It never
//! mutates the bitmap.

use intent_types::{ChainError, U256};
use thiserror::Error;

pub mod bit;
pub mod bitmap;

pub use bit::{bit_offset, bit_to_nonce, bit_used, bit_value, nonce_to_bit, Bit};
pub use bitmap::{bitmap_slot, next_bit, next_bits, NonceBitmap};

/// Errors that can occur while allocating or converting bits.
#[derive(Debug, Error)]
pub enum NonceError {
	/// The bit value is zero or not a power of two.
	#[error("Invalid bit value {0}: must be a nonzero power of two")]
	InvalidBit(U256),
	/// The offset does not address a bit inside a 256-bit word.
	#[error("Invalid bit offset {0}: must be below 256")]
	InvalidOffset(usize),
	/// The bit's linear nonce does not fit in a uint256.
	#[error("Nonce of bitmap index {0} overflows uint256")]
	NonceOverflow(U256),
	/// Reading bitmap state failed.
	#[error(transparent)]
	Chain(#[from] ChainError),
}

impl From<NonceError> for intent_types::DeclarationError {
	fn from(err: NonceError) -> Self {
		match err {
			NonceError::Chain(e) => intent_types::DeclarationError::Chain(e),
			other => intent_types::DeclarationError::Range(other.to_string()),
		}
	}
}
