//! Fill-state accounting for partially executable limit orders.
//!
//! Amounts are raw token units. Fractions and prices are Q96 fixed point
//! (96 fractional bits); conversion from human units happens outside this
//! crate.

use intent_types::{Address, U256};
use thiserror::Error;

pub mod curve;
pub mod q96;
pub mod state;

pub use curve::{CurveRegistry, FlatPriceCurve, LinearPriceCurve, PriceCurve};
pub use q96::{mul_div, Q96, RESOLUTION};
pub use state::{
	effective_state, filled_amount, filled_percent_x96, get_unfilled_amount,
	limit_swap_exact_input_get_output,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FillStateError {
	#[error("Filled amount {filled} exceeds total {total}")]
	FilledExceedsTotal { filled: U256, total: U256 },

	#[error("Input {input} exceeds unfilled amount {unfilled}")]
	InputExceedsUnfilled { input: U256, unfilled: U256 },

	#[error("Fill cursor start {0} exceeds Q96")]
	StartAboveOne(u128),

	#[error("Invalid price curve params: {0}")]
	InvalidCurveParams(String),

	#[error("Price curve evaluates to a negative price")]
	NegativePrice,

	#[error("Arithmetic overflow in {0}")]
	Overflow(&'static str),

	#[error("No price curve registered at {0}")]
	UnknownCurve(Address),
}

impl From<FillStateError> for intent_types::DeclarationError {
	fn from(err: FillStateError) -> Self {
		intent_types::DeclarationError::FillState(err.to_string())
	}
}
