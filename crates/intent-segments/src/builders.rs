//! Typed constructors for each segment kind.

use crate::schema::SegmentFunction;
use crate::{Segment, SegmentError};
use alloy_dyn_abi::DynSolValue;
use intent_encoding::SegmentEncoder;
use intent_nonce::Bit;
use intent_types::{Address, BlockNumber, Bytes, FillStateParams, PriceCurveRef, Token, U256};

fn uint(value: U256, bits: usize) -> DynSolValue {
	DynSolValue::Uint(value, bits)
}

fn bytes(value: &Bytes) -> DynSolValue {
	DynSolValue::Bytes(value.to_vec())
}

pub(crate) fn token_value(token: &Token) -> DynSolValue {
	DynSolValue::Tuple(vec![
		uint(U256::from(token.standard.as_u8()), 8),
		DynSolValue::Address(token.addr),
		DynSolValue::FixedBytes(token.ids_merkle_root, 32),
		uint(token.id, 256),
		DynSolValue::Bool(token.disallow_flagged),
	])
}

pub(crate) fn fill_state_value(params: &FillStateParams) -> DynSolValue {
	DynSolValue::Tuple(vec![
		uint(U256::from(params.id), 64),
		uint(U256::from(params.start_x96), 128),
		DynSolValue::Bool(params.sign),
	])
}

fn bit_segment(
	function: SegmentFunction,
	bit: &Bit,
	encoder: &dyn SegmentEncoder,
) -> Result<Segment, SegmentError> {
	Segment::from_values(
		function,
		vec![uint(bit.index, 256), uint(bit.value, 256)],
		encoder,
	)
}

/// Consumes `bit`; the declaration can execute only once per bit.
pub fn use_bit(bit: &Bit, encoder: &dyn SegmentEncoder) -> Result<Segment, SegmentError> {
	bit_segment(SegmentFunction::UseBit, bit, encoder)
}

pub fn require_bit_used(bit: &Bit, encoder: &dyn SegmentEncoder) -> Result<Segment, SegmentError> {
	bit_segment(SegmentFunction::RequireBitUsed, bit, encoder)
}

pub fn require_bit_not_used(
	bit: &Bit,
	encoder: &dyn SegmentEncoder,
) -> Result<Segment, SegmentError> {
	bit_segment(SegmentFunction::RequireBitNotUsed, bit, encoder)
}

pub fn require_block_mined(
	block_number: BlockNumber,
	encoder: &dyn SegmentEncoder,
) -> Result<Segment, SegmentError> {
	Segment::from_values(
		SegmentFunction::RequireBlockMined,
		vec![uint(U256::from(block_number), 256)],
		encoder,
	)
}

/// Expires the declaration once `block_number` is mined.
pub fn require_block_not_mined(
	block_number: BlockNumber,
	encoder: &dyn SegmentEncoder,
) -> Result<Segment, SegmentError> {
	Segment::from_values(
		SegmentFunction::RequireBlockNotMined,
		vec![uint(U256::from(block_number), 256)],
		encoder,
	)
}

pub fn require_uint256_lower_bound(
	oracle: Address,
	oracle_params: &Bytes,
	lower_bound: U256,
	encoder: &dyn SegmentEncoder,
) -> Result<Segment, SegmentError> {
	Segment::from_values(
		SegmentFunction::RequireUint256LowerBound,
		vec![
			DynSolValue::Address(oracle),
			bytes(oracle_params),
			uint(lower_bound, 256),
		],
		encoder,
	)
}

pub fn require_uint256_upper_bound(
	oracle: Address,
	oracle_params: &Bytes,
	upper_bound: U256,
	encoder: &dyn SegmentEncoder,
) -> Result<Segment, SegmentError> {
	Segment::from_values(
		SegmentFunction::RequireUint256UpperBound,
		vec![
			DynSolValue::Address(oracle),
			bytes(oracle_params),
			uint(upper_bound, 256),
		],
		encoder,
	)
}

/// Signed terms of a market swap priced by an oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSwapExactInput {
	pub price_oracle: Address,
	pub price_oracle_params: Bytes,
	pub owner: Address,
	pub token_in: Token,
	pub token_out: Token,
	pub token_in_amount: U256,
	/// Fee in millionths, `uint24`.
	pub fee_percent: u32,
	pub fee_min: U256,
}

pub fn market_swap_exact_input(
	swap: &MarketSwapExactInput,
	encoder: &dyn SegmentEncoder,
) -> Result<Segment, SegmentError> {
	Segment::from_values(
		SegmentFunction::MarketSwapExactInput,
		vec![
			DynSolValue::Address(swap.price_oracle),
			bytes(&swap.price_oracle_params),
			DynSolValue::Address(swap.owner),
			token_value(&swap.token_in),
			token_value(&swap.token_out),
			uint(swap.token_in_amount, 256),
			uint(U256::from(swap.fee_percent), 24),
			uint(swap.fee_min, 256),
		],
		encoder,
	)
}

/// Signed terms of a partially fillable limit swap.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitSwapExactInput {
	pub price_curve: PriceCurveRef,
	pub fill_state: FillStateParams,
	pub owner: Address,
	pub token_in: Token,
	pub token_out: Token,
	pub token_in_amount: U256,
}

/// Fails if the fill cursor starts above Q96.
pub fn limit_swap_exact_input(
	swap: &LimitSwapExactInput,
	encoder: &dyn SegmentEncoder,
) -> Result<Segment, SegmentError> {
	Segment::from_values(
		SegmentFunction::LimitSwapExactInput,
		vec![
			DynSolValue::Address(swap.price_curve.address),
			bytes(&swap.price_curve.params),
			fill_state_value(&swap.fill_state),
			DynSolValue::Address(swap.owner),
			token_value(&swap.token_in),
			token_value(&swap.token_out),
			uint(swap.token_in_amount, 256),
		],
		encoder,
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::SegmentKind;
	use alloy_sol_types::{sol, SolCall};
	use intent_encoding::{AbiSegmentEncoder, EncodingError};
	use intent_fill::{FlatPriceCurve, Q96};
	use serde_json::json;

	mod abi {
		alloy_sol_types::sol! {
			struct Token {
				uint8 standard;
				address addr;
				bytes32 idsMerkleRoot;
				uint256 id;
				bool disallowFlagged;
			}

			function requireUint256LowerBound(address uint256Oracle, bytes params, uint256 lowerBound);
		}
	}

	sol! {
		function useBit(uint256 bitmapIndex, uint256 bit);
	}

	fn limit_swap(start_x96: u128) -> LimitSwapExactInput {
		LimitSwapExactInput {
			price_curve: PriceCurveRef {
				address: Address::repeat_byte(0xc0),
				params: FlatPriceCurve::encode_params(Q96),
			},
			fill_state: FillStateParams {
				id: 9,
				start_x96,
				sign: true,
			},
			owner: Address::repeat_byte(0x0a),
			token_in: Token::erc20(Address::repeat_byte(0x01)),
			token_out: Token::eth(),
			token_in_amount: U256::from(500u64),
		}
	}

	#[test]
	fn test_use_bit_matches_sol_call() {
		let bit = Bit::from_offset(U256::from(1u64), 4).unwrap();
		let segment = use_bit(&bit, &AbiSegmentEncoder).unwrap();

		let expected = useBitCall {
			bitmapIndex: U256::from(1u64),
			bit: U256::from(16u64),
		}
		.abi_encode();
		assert_eq!(segment.data().to_vec(), expected);
		assert_eq!(segment.params_json(), json!({ "bitmapIndex": "1", "bit": "16" }));
	}

	#[test]
	fn test_bit_guards_share_schema_but_not_selector() {
		let bit = Bit::from_offset(U256::ZERO, 0).unwrap();
		let used = require_bit_used(&bit, &AbiSegmentEncoder).unwrap();
		let not_used = require_bit_not_used(&bit, &AbiSegmentEncoder).unwrap();

		assert_eq!(used.values(), not_used.values());
		assert_ne!(used.data()[..4], not_used.data()[..4]);
	}

	#[test]
	fn test_block_guards() {
		let mined = require_block_mined(100, &AbiSegmentEncoder).unwrap();
		let not_mined = require_block_not_mined(100, &AbiSegmentEncoder).unwrap();
		assert_eq!(mined.function(), SegmentFunction::RequireBlockMined);
		assert_eq!(not_mined.kind(), SegmentKind::Require);
		assert_eq!(mined.data()[4..], not_mined.data()[4..]);
	}

	#[test]
	fn test_bound_matches_sol_call() {
		let oracle = Address::repeat_byte(0x0e);
		let params = Bytes::from(vec![0x01, 0x02, 0x03]);
		let segment =
			require_uint256_lower_bound(oracle, &params, U256::from(42u64), &AbiSegmentEncoder)
				.unwrap();

		let expected = abi::requireUint256LowerBoundCall {
			uint256Oracle: oracle,
			params: params.clone(),
			lowerBound: U256::from(42u64),
		}
		.abi_encode();
		assert_eq!(segment.data().to_vec(), expected);

		let upper =
			require_uint256_upper_bound(oracle, &params, U256::from(42u64), &AbiSegmentEncoder)
				.unwrap();
		assert_eq!(upper.function(), SegmentFunction::RequireUint256UpperBound);
	}

	#[test]
	fn test_token_value_layout() {
		use alloy_sol_types::SolValue;

		let token = Token::erc20(Address::repeat_byte(0x05));
		let expected = abi::Token {
			standard: 0,
			addr: token.addr,
			idsMerkleRoot: token.ids_merkle_root,
			id: token.id,
			disallowFlagged: false,
		}
		.abi_encode();
		assert_eq!(token_value(&token).abi_encode(), expected);
	}

	#[test]
	fn test_market_swap_fee_is_uint24() {
		let mut swap = MarketSwapExactInput {
			price_oracle: Address::repeat_byte(0x0f),
			price_oracle_params: Bytes::new(),
			owner: Address::repeat_byte(0x0a),
			token_in: Token::erc20(Address::repeat_byte(0x01)),
			token_out: Token::erc20(Address::repeat_byte(0x02)),
			token_in_amount: U256::from(10u64),
			fee_percent: 3000,
			fee_min: U256::ZERO,
		};
		let segment = market_swap_exact_input(&swap, &AbiSegmentEncoder).unwrap();
		assert!(segment.requires_unsigned_call());
		assert_eq!(segment.params_json()["feePercent"], "3000");

		swap.fee_percent = 1 << 24;
		let err = market_swap_exact_input(&swap, &AbiSegmentEncoder).unwrap_err();
		assert!(err.to_string().contains("feePercent"));
	}

	#[test]
	fn test_limit_swap_cursor_bound() {
		let segment = limit_swap_exact_input(&limit_swap(0), &AbiSegmentEncoder).unwrap();
		assert!(segment.is_swap());
		assert_eq!(segment.params_json()["fillStateParams"]["id"], "9");

		let at_one = limit_swap_exact_input(&limit_swap(Q96.to::<u128>()), &AbiSegmentEncoder);
		assert!(at_one.is_ok());

		let err = limit_swap_exact_input(&limit_swap(Q96.to::<u128>() + 1), &AbiSegmentEncoder)
			.unwrap_err();
		assert!(matches!(
			err,
			SegmentError::Encoding(EncodingError::Range { ref param, .. })
				if param == "fillStateParams.startX96"
		));
	}
}
