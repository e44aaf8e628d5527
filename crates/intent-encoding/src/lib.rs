//! ABI encoding for segments and declarations.
//!
//! The [`SegmentEncoder`] capability is the single source of truth for wire
//! bytes: the signed digest covers these bytes and the on-chain decoder reads
//! them, so nothing else in the workspace encodes ABI data by hand.

use thiserror::Error;

pub mod encoder;
pub mod sol_type;

pub use encoder::{function_selector, function_signature, AbiSegmentEncoder, SegmentEncoder};
pub use sol_type::{SolField, SolType};

/// Errors that can occur while validating or encoding ABI values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
	/// A value does not satisfy its declared Solidity type.
	#[error("Invalid value for param '{param}': {message}")]
	Range { param: String, message: String },
	/// More values were supplied than the function declares.
	#[error("{function} takes {expected} params, got {actual} values")]
	ParamCount {
		function: String,
		expected: usize,
		actual: usize,
	},
	/// A value's ABI type differs from the declared parameter type.
	#[error("{function}: value {index} does not match type {expected}")]
	TypeMismatch {
		function: String,
		index: usize,
		expected: String,
	},
	/// The payload could not be decoded.
	#[error("ABI decoding failed: {0}")]
	Decode(String),
}

impl From<EncodingError> for intent_types::DeclarationError {
	fn from(err: EncodingError) -> Self {
		match err {
			EncodingError::Range { .. } => intent_types::DeclarationError::Range(err.to_string()),
			other => intent_types::DeclarationError::Encoding(other.to_string()),
		}
	}
}
