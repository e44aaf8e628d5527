//! Error types for the declaration protocol.

use crate::{chain::ChainError, Address, B256};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeclarationError>;

/// Top-level error taxonomy.
///
/// Construction-time failures (malformed segments, out-of-range values, fill
/// bounds) surface here. Validation of an already signed declaration never
/// produces this type; it yields a [`crate::ValidationResult`] instead.
#[derive(Error, Debug)]
pub enum DeclarationError {
	#[error("Validation error: {0}")]
	Validation(String),

	#[error("Signature error: {0}")]
	Signature(String),

	#[error("Account mismatch: expected {expected}, got {actual}")]
	AddressMismatch { expected: Address, actual: Address },

	#[error("Hash mismatch: expected {expected}, got {actual}")]
	HashMismatch { expected: B256, actual: B256 },

	#[error("Range error: {0}")]
	Range(String),

	#[error("Fill state error: {0}")]
	FillState(String),

	#[error("Encoding error: {0}")]
	Encoding(String),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error(transparent)]
	Chain(#[from] ChainError),
}
