//! Fill cursor evaluation and amount bounds.
//!
//! The executing contract stores one signed Q96 value per fill-state id. Zero
//! means untouched, in which case the cursor's `startX96` seeds the state.
//! A cursor with `sign = true` reads the state as its filled fraction; one
//! with `sign = false` reads its negation, so two cursors sharing an id with
//! opposite signs fill against each other.

use crate::curve::PriceCurve;
use crate::q96::{mul_div, Q96};
use crate::FillStateError;
use intent_types::{FillStateParams, I256, U256};
use tracing::debug;

/// State the cursor observes given the stored value.
pub fn effective_state(params: &FillStateParams, stored: I256) -> I256 {
	if !stored.is_zero() {
		return stored;
	}
	let start = I256::from_raw(U256::from(params.start_x96));
	if params.sign {
		start
	} else {
		-start
	}
}

/// Filled fraction in Q96, clamped to `[0, Q96]`.
pub fn filled_percent_x96(params: &FillStateParams, stored: I256) -> Result<U256, FillStateError> {
	if U256::from(params.start_x96) > Q96 {
		return Err(FillStateError::StartAboveOne(params.start_x96));
	}

	let state = effective_state(params, stored);
	let percent = if params.sign {
		state
	} else {
		state.checked_neg().ok_or(FillStateError::Overflow("fill state"))?
	};

	if percent.is_negative() {
		return Ok(U256::ZERO);
	}
	Ok(percent.into_raw().min(Q96))
}

/// Portion of `total` already filled.
pub fn filled_amount(
	total: U256,
	params: &FillStateParams,
	stored: I256,
) -> Result<U256, FillStateError> {
	let percent = filled_percent_x96(params, stored)?;
	mul_div(total, percent, Q96)
}

/// `total - filled`.
pub fn get_unfilled_amount(total: U256, filled: U256) -> Result<U256, FillStateError> {
	total
		.checked_sub(filled)
		.ok_or(FillStateError::FilledExceedsTotal { filled, total })
}

/// Output owed for `input` more units of a limit order, evaluated on
/// `curve` over `[filled_input, filled_input + input]`.
pub fn limit_swap_exact_input_get_output(
	input: U256,
	filled_input: U256,
	total_input: U256,
	curve: &dyn PriceCurve,
	curve_params: &[u8],
) -> Result<U256, FillStateError> {
	let unfilled = get_unfilled_amount(total_input, filled_input)?;
	if input > unfilled {
		return Err(FillStateError::InputExceedsUnfilled { input, unfilled });
	}

	let output = curve.get_output(total_input, filled_input, input, curve_params)?;
	debug!(%input, %filled_input, %total_input, %output, "Evaluated limit swap output");
	Ok(output)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::FlatPriceCurve;

	fn u(v: u64) -> U256 {
		U256::from(v)
	}

	fn cursor(start_x96: U256, sign: bool) -> FillStateParams {
		FillStateParams {
			id: 7,
			start_x96: start_x96.to::<u128>(),
			sign,
		}
	}

	#[test]
	fn test_get_unfilled_amount() {
		assert_eq!(get_unfilled_amount(u(100), u(30)).unwrap(), u(70));
		assert_eq!(get_unfilled_amount(u(100), u(100)).unwrap(), U256::ZERO);
		assert_eq!(
			get_unfilled_amount(u(100), u(150)),
			Err(FillStateError::FilledExceedsTotal {
				filled: u(150),
				total: u(100)
			})
		);
	}

	#[test]
	fn test_fresh_cursor_reports_nothing_filled() {
		let params = cursor(U256::ZERO, true);
		assert_eq!(filled_percent_x96(&params, I256::ZERO).unwrap(), U256::ZERO);
		assert_eq!(filled_amount(u(1000), &params, I256::ZERO).unwrap(), U256::ZERO);
	}

	#[test]
	fn test_untouched_state_seeded_from_cursor() {
		let quarter = Q96 >> 2usize;
		let up = cursor(quarter, true);
		assert_eq!(filled_amount(u(1000), &up, I256::ZERO).unwrap(), u(250));

		// A downward cursor reads the negated start.
		let down = cursor(quarter, false);
		assert_eq!(
			effective_state(&down, I256::ZERO),
			-I256::from_raw(quarter)
		);
		assert_eq!(filled_amount(u(1000), &down, I256::ZERO).unwrap(), u(250));
	}

	#[test]
	fn test_stored_state_wins_over_start() {
		let half = I256::from_raw(Q96 >> 1usize);
		let up = cursor(U256::ZERO, true);
		assert_eq!(filled_amount(u(1000), &up, half).unwrap(), u(500));

		// The opposite side of the same id sees the fill as negative.
		let down = cursor(U256::ZERO, false);
		assert_eq!(filled_percent_x96(&down, half).unwrap(), U256::ZERO);
		assert_eq!(filled_amount(u(1000), &down, -half).unwrap(), u(500));
	}

	#[test]
	fn test_percent_clamped_to_one() {
		let up = cursor(U256::ZERO, true);
		let over = I256::from_raw(Q96 * u(2));
		assert_eq!(filled_percent_x96(&up, over).unwrap(), Q96);
	}

	#[test]
	fn test_start_above_one_rejected() {
		let params = FillStateParams {
			id: 1,
			start_x96: Q96.to::<u128>() + 1,
			sign: true,
		};
		assert!(matches!(
			filled_percent_x96(&params, I256::ZERO),
			Err(FillStateError::StartAboveOne(_))
		));
	}

	#[test]
	fn test_get_output_rejects_input_over_bound() {
		let params = FlatPriceCurve::encode_params(Q96);
		let err = limit_swap_exact_input_get_output(u(80), u(30), u(100), &FlatPriceCurve, &params)
			.unwrap_err();

		assert_eq!(
			err,
			FillStateError::InputExceedsUnfilled {
				input: u(80),
				unfilled: u(70)
			}
		);
		let message = err.to_string();
		assert!(message.contains("80"));
		assert!(message.contains("70"));
	}

	#[test]
	fn test_get_output_within_bound() {
		let params = FlatPriceCurve::encode_params(Q96 * u(2));
		let output =
			limit_swap_exact_input_get_output(u(70), u(30), u(100), &FlatPriceCurve, &params)
				.unwrap();
		assert_eq!(output, u(140));
	}
}
