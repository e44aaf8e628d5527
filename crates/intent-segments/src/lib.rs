//! Segment, Intent and Declaration model.
//!
//! A [`Segment`] is one guarded operation calling a function of the segments
//! contract. An [`Intent`] groups segments into one guarded action, and a
//! [`Declaration`] bundles intents with surrounding calls into the unit the
//! owner signs. All three are immutable once built; their wire bytes come
//! from the [`intent_encoding::SegmentEncoder`] capability.

use intent_encoding::EncodingError;
use thiserror::Error;

pub mod builders;
pub mod declaration;
pub mod schema;
pub mod segment;
pub mod unsigned;

pub use builders::{
	limit_swap_exact_input, market_swap_exact_input, require_bit_not_used, require_bit_used,
	require_block_mined, require_block_not_mined, require_uint256_lower_bound,
	require_uint256_upper_bound, use_bit, LimitSwapExactInput, MarketSwapExactInput,
};
pub use declaration::{Declaration, DeclarationBuilder, Intent};
pub use schema::{ParamSchema, SegmentDefinition, SegmentFunction, SegmentKind};
pub use segment::Segment;
pub use unsigned::{UnsignedData, UnsignedSwapData};

/// Errors that can occur while building segments and declarations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
	#[error("Unknown segment function: {0}")]
	UnknownFunction(String),

	#[error("{function}: missing param '{param}'")]
	MissingParam { function: String, param: String },

	#[error("{function}: unexpected param '{param}'")]
	UnexpectedParam { function: String, param: String },

	#[error("{function}: params must be a JSON object")]
	ParamsNotObject { function: String },

	#[error("Intent {intent} needs {expected} unsigned calls, got {actual}")]
	UnsignedCallCount {
		intent: usize,
		expected: usize,
		actual: usize,
	},

	#[error("Intent index {index} out of range for {count} intents")]
	IntentIndex { index: usize, count: usize },

	#[error(transparent)]
	Encoding(#[from] EncodingError),
}

impl From<SegmentError> for intent_types::DeclarationError {
	fn from(err: SegmentError) -> Self {
		match err {
			SegmentError::Encoding(e) => e.into(),
			SegmentError::UnsignedCallCount { .. } | SegmentError::IntentIndex { .. } => {
				intent_types::DeclarationError::Validation(err.to_string())
			}
			other => intent_types::DeclarationError::Range(other.to_string()),
		}
	}
}
