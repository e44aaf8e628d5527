//! Price curves.
//!
//! A curve maps the filled fraction of an order to a Q96 price (output units
//! per input unit). The segment only carries the curve's address and opaque
//! ABI-encoded params; [`CurveRegistry`] resolves the address to a local
//! evaluator.

use crate::q96::{mul_div, Q96};
use crate::state::limit_swap_exact_input_get_output;
use crate::FillStateError;
use alloy_dyn_abi::{DynSolType, DynSolValue};
use intent_types::{Address, Bytes, PriceCurveRef, I256, U256};
use std::collections::HashMap;
use std::sync::Arc;

/// Capability evaluating a curve over a sub-range of an order.
pub trait PriceCurve: Send + Sync {
	/// Output for `input` units filled after `filled_input` of `total_input`.
	fn get_output(
		&self,
		total_input: U256,
		filled_input: U256,
		input: U256,
		params: &[u8],
	) -> Result<U256, FillStateError>;
}

fn decode(types: Vec<DynSolType>, params: &[u8]) -> Result<Vec<DynSolValue>, FillStateError> {
	match DynSolType::Tuple(types).abi_decode_params(params) {
		Ok(DynSolValue::Tuple(values)) => Ok(values),
		Ok(_) => Err(FillStateError::InvalidCurveParams("expected a tuple".to_string())),
		Err(e) => Err(FillStateError::InvalidCurveParams(e.to_string())),
	}
}

/// Constant price. Params: `(uint256 priceX96)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatPriceCurve;

impl FlatPriceCurve {
	pub fn encode_params(price_x96: U256) -> Bytes {
		Bytes::from(DynSolValue::Tuple(vec![DynSolValue::Uint(price_x96, 256)]).abi_encode_params())
	}

	fn price(params: &[u8]) -> Result<U256, FillStateError> {
		match decode(vec![DynSolType::Uint(256)], params)?.as_slice() {
			[DynSolValue::Uint(price, _)] => Ok(*price),
			_ => Err(FillStateError::InvalidCurveParams("expected uint256 priceX96".to_string())),
		}
	}
}

impl PriceCurve for FlatPriceCurve {
	fn get_output(
		&self,
		_total_input: U256,
		_filled_input: U256,
		input: U256,
		params: &[u8],
	) -> Result<U256, FillStateError> {
		let price = Self::price(params)?;
		mul_div(input, price, Q96)
	}
}

/// Price moving linearly with the filled fraction:
/// `p(x) = basePriceX96 + slopeX96 * x / total`.
/// Params: `(uint256 basePriceX96, int256 slopeX96)`.
///
/// The output over a sub-range is the exact integral of `p`, i.e. the input
/// times the mean of the endpoint prices.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearPriceCurve;

impl LinearPriceCurve {
	pub fn encode_params(base_price_x96: U256, slope_x96: I256) -> Bytes {
		Bytes::from(
			DynSolValue::Tuple(vec![
				DynSolValue::Uint(base_price_x96, 256),
				DynSolValue::Int(slope_x96, 256),
			])
			.abi_encode_params(),
		)
	}

	fn decode_params(params: &[u8]) -> Result<(U256, I256), FillStateError> {
		match decode(vec![DynSolType::Uint(256), DynSolType::Int(256)], params)?.as_slice() {
			[DynSolValue::Uint(base, _), DynSolValue::Int(slope, _)] => Ok((*base, *slope)),
			_ => Err(FillStateError::InvalidCurveParams(
				"expected (uint256 basePriceX96, int256 slopeX96)".to_string(),
			)),
		}
	}

	fn price_at(base: U256, slope: I256, x: U256, total: U256) -> Result<U256, FillStateError> {
		let delta = mul_div(slope.unsigned_abs(), x, total)?;
		if slope.is_negative() {
			base.checked_sub(delta).ok_or(FillStateError::NegativePrice)
		} else {
			base.checked_add(delta)
				.ok_or(FillStateError::Overflow("linear price"))
		}
	}
}

impl PriceCurve for LinearPriceCurve {
	fn get_output(
		&self,
		total_input: U256,
		filled_input: U256,
		input: U256,
		params: &[u8],
	) -> Result<U256, FillStateError> {
		let (base, slope) = Self::decode_params(params)?;
		if input.is_zero() {
			return Ok(U256::ZERO);
		}

		let end = filled_input
			.checked_add(input)
			.ok_or(FillStateError::Overflow("fill range"))?;
		let start_price = Self::price_at(base, slope, filled_input, total_input)?;
		let end_price = Self::price_at(base, slope, end, total_input)?;
		let price_sum = start_price
			.checked_add(end_price)
			.ok_or(FillStateError::Overflow("linear price"))?;

		mul_div(input, price_sum, Q96 << 1usize)
	}
}

/// Local evaluators keyed by deployed curve address.
#[derive(Clone, Default)]
pub struct CurveRegistry {
	curves: HashMap<Address, Arc<dyn PriceCurve>>,
}

impl CurveRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_curve(mut self, address: Address, curve: Arc<dyn PriceCurve>) -> Self {
		self.curves.insert(address, curve);
		self
	}

	pub fn get(&self, address: &Address) -> Option<&Arc<dyn PriceCurve>> {
		self.curves.get(address)
	}

	/// Output of the referenced curve for `input` more units.
	pub fn get_output(
		&self,
		curve: &PriceCurveRef,
		input: U256,
		filled_input: U256,
		total_input: U256,
	) -> Result<U256, FillStateError> {
		let evaluator = self
			.get(&curve.address)
			.ok_or(FillStateError::UnknownCurve(curve.address))?;
		limit_swap_exact_input_get_output(
			input,
			filled_input,
			total_input,
			evaluator.as_ref(),
			&curve.params,
		)
	}
}
