//! Q96 fixed point helpers.

use crate::FillStateError;
use alloy_primitives::ruint::UintTryFrom;
use alloy_primitives::{U256, U512};

pub const RESOLUTION: u8 = 96;
/// `1.0` in Q96.
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);

/// `floor(a * b / denominator)` with a 512-bit intermediate product.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, FillStateError> {
	if denominator.is_zero() {
		return Err(FillStateError::Overflow("division by zero"));
	}
	let product = U512::from(a) * U512::from(b);
	let quotient = product / U512::from(denominator);
	U256::uint_try_from(quotient).map_err(|_| FillStateError::Overflow("mul_div"))
}

/// Q96 representation of `numerator / denominator`.
pub fn ratio_x96(numerator: U256, denominator: U256) -> Result<U256, FillStateError> {
	mul_div(numerator, Q96, denominator)
}
