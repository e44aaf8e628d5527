//! Discriminated validation outcomes.
//!
//! Validators admitting many declarations in a batch must be able to reject a
//! single declaration without aborting, so validation failures are values
//! rather than errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason a declaration failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationReason {
	/// The declaration contains no intents.
	ZeroIntents,
	/// An intent does not contain exactly one swap segment.
	WrongNumberOfSwaps,
	/// The recovered signer differs from the claimed signer, or the signature is malformed.
	SignatureMismatch,
	/// The account derived from the signer differs from the domain's verifying contract.
	AccountMismatch,
	/// The digest recomputed from the payload differs from the signed digest.
	HashMismatch,
}

impl ValidationReason {
	pub fn as_str(&self) -> &'static str {
		match self {
			ValidationReason::ZeroIntents => "ZERO_INTENTS",
			ValidationReason::WrongNumberOfSwaps => "WRONG_NUMBER_OF_SWAPS",
			ValidationReason::SignatureMismatch => "SIGNATURE_MISMATCH",
			ValidationReason::AccountMismatch => "ACCOUNT_MISMATCH",
			ValidationReason::HashMismatch => "HASH_MISMATCH",
		}
	}
}

impl fmt::Display for ValidationReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Outcome of validating a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
	pub valid: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<ValidationReason>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl ValidationResult {
	pub fn valid() -> Self {
		Self {
			valid: true,
			reason: None,
			message: None,
		}
	}

	pub fn invalid(reason: ValidationReason, message: impl Into<String>) -> Self {
		Self {
			valid: false,
			reason: Some(reason),
			message: Some(message.into()),
		}
	}

	pub fn is_valid(&self) -> bool {
		self.valid
	}

	/// Returns `self` when invalid, otherwise evaluates `next`.
	pub fn and_then<F>(self, next: F) -> Self
	where
		F: FnOnce() -> ValidationResult,
	{
		if self.valid {
			next()
		} else {
			self
		}
	}
}
