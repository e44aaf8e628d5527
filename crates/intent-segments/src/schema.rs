//! Segment function table.
//!
//! Every segment kind is one entry of [`SEGMENT_TABLE`]: its on-chain function
//! name, whether it swaps or only guards, the ordered parameter schema and an
//! extra value check. Unsigned parameters always trail the signed ones; their
//! values are supplied by the executor and are not covered by the signature.

use alloy_dyn_abi::DynSolValue;
use intent_encoding::{EncodingError, SolField, SolType};
use intent_fill::Q96;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::SegmentError;

pub const CALL_FIELDS: [SolField; 2] = [
	SolField::new("targetContract", SolType::Address),
	SolField::new("data", SolType::Bytes),
];
pub const CALL: SolType = SolType::Tuple("Call", &CALL_FIELDS);

pub const TOKEN_FIELDS: [SolField; 5] = [
	SolField::new("standard", SolType::Uint(8)),
	SolField::new("addr", SolType::Address),
	SolField::new("idsMerkleRoot", SolType::FixedBytes(32)),
	SolField::new("id", SolType::Uint(256)),
	SolField::new("disallowFlagged", SolType::Bool),
];
pub const TOKEN: SolType = SolType::Tuple("Token", &TOKEN_FIELDS);

pub const FILL_STATE_PARAMS_FIELDS: [SolField; 3] = [
	SolField::new("id", SolType::Uint(64)),
	SolField::new("startX96", SolType::Uint(128)),
	SolField::new("sign", SolType::Bool),
];
pub const FILL_STATE_PARAMS: SolType = SolType::Tuple("FillStateParams", &FILL_STATE_PARAMS_FIELDS);

pub const UNSIGNED_SWAP_DATA_FIELDS: [SolField; 2] = [
	SolField::new("recipient", SolType::Address),
	SolField::new("calls", SolType::Array(&CALL)),
];
pub const UNSIGNED_SWAP_DATA: SolType =
	SolType::Tuple("UnsignedSwapData", &UNSIGNED_SWAP_DATA_FIELDS);

pub const SEGMENT_FIELDS: [SolField; 2] = [
	SolField::new("data", SolType::Bytes),
	SolField::new("requiresUnsignedCall", SolType::Bool),
];
pub const SEGMENT: SolType = SolType::Tuple("Segment", &SEGMENT_FIELDS);

pub const INTENT_FIELDS: [SolField; 1] = [SolField::new("segments", SolType::Array(&SEGMENT))];
pub const INTENT: SolType = SolType::Tuple("Intent", &INTENT_FIELDS);

pub const DECLARATION_FIELDS: [SolField; 4] = [
	SolField::new("intents", SolType::Array(&INTENT)),
	SolField::new("beforeCalls", SolType::Array(&CALL)),
	SolField::new("afterCalls", SolType::Array(&CALL)),
	SolField::new("segmentsContract", SolType::Address),
];
pub const DECLARATION: SolType = SolType::Tuple("Declaration", &DECLARATION_FIELDS);

pub const UNSIGNED_DATA_FIELDS: [SolField; 2] = [
	SolField::new("intentIndex", SolType::Uint(8)),
	SolField::new("unsignedCalls", SolType::Array(&SolType::Bytes)),
];
pub const UNSIGNED_DATA: SolType = SolType::Tuple("UnsignedData", &UNSIGNED_DATA_FIELDS);

/// Function of the declaration contract that receives a declaration.
pub const EXECUTE_FUNCTION: &str = "execute";
pub const EXECUTE_PARAMS: [ParamSchema; 2] = [
	ParamSchema::signed("declaration", DECLARATION),
	ParamSchema::unsigned("unsignedData", UNSIGNED_DATA),
];

/// One declared parameter of a segment function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSchema {
	pub name: &'static str,
	pub ty: SolType,
	pub signed: bool,
}

impl ParamSchema {
	pub const fn signed(name: &'static str, ty: SolType) -> Self {
		Self {
			name,
			ty,
			signed: true,
		}
	}

	pub const fn unsigned(name: &'static str, ty: SolType) -> Self {
		Self {
			name,
			ty,
			signed: false,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
	Swap,
	Require,
}

/// Closed set of segment functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentFunction {
	UseBit,
	RequireBitUsed,
	RequireBitNotUsed,
	RequireBlockMined,
	RequireBlockNotMined,
	RequireUint256LowerBound,
	RequireUint256UpperBound,
	MarketSwapExactInput,
	LimitSwapExactInput,
}

/// Table entry describing a segment function.
#[derive(Debug)]
pub struct SegmentDefinition {
	pub function: SegmentFunction,
	pub name: &'static str,
	pub kind: SegmentKind,
	pub params: &'static [ParamSchema],
	/// Checks across signed values beyond their declared types.
	pub validate: fn(&[DynSolValue]) -> Result<(), EncodingError>,
}

const BIT_PARAMS: [ParamSchema; 2] = [
	ParamSchema::signed("bitmapIndex", SolType::Uint(256)),
	ParamSchema::signed("bit", SolType::Uint(256)),
];

const BLOCK_PARAMS: [ParamSchema; 1] = [ParamSchema::signed("blockNumber", SolType::Uint(256))];

const LOWER_BOUND_PARAMS: [ParamSchema; 3] = [
	ParamSchema::signed("uint256Oracle", SolType::Address),
	ParamSchema::signed("params", SolType::Bytes),
	ParamSchema::signed("lowerBound", SolType::Uint(256)),
];

const UPPER_BOUND_PARAMS: [ParamSchema; 3] = [
	ParamSchema::signed("uint256Oracle", SolType::Address),
	ParamSchema::signed("params", SolType::Bytes),
	ParamSchema::signed("upperBound", SolType::Uint(256)),
];

const MARKET_SWAP_PARAMS: [ParamSchema; 9] = [
	ParamSchema::signed("priceOracle", SolType::Address),
	ParamSchema::signed("priceOracleParams", SolType::Bytes),
	ParamSchema::signed("owner", SolType::Address),
	ParamSchema::signed("tokenIn", TOKEN),
	ParamSchema::signed("tokenOut", TOKEN),
	ParamSchema::signed("tokenInAmount", SolType::Uint(256)),
	ParamSchema::signed("feePercent", SolType::Uint(24)),
	ParamSchema::signed("feeMin", SolType::Uint(256)),
	ParamSchema::unsigned("data", UNSIGNED_SWAP_DATA),
];

const LIMIT_SWAP_PARAMS: [ParamSchema; 8] = [
	ParamSchema::signed("priceCurve", SolType::Address),
	ParamSchema::signed("priceCurveParams", SolType::Bytes),
	ParamSchema::signed("fillStateParams", FILL_STATE_PARAMS),
	ParamSchema::signed("owner", SolType::Address),
	ParamSchema::signed("tokenIn", TOKEN),
	ParamSchema::signed("tokenOut", TOKEN),
	ParamSchema::signed("tokenInAmount", SolType::Uint(256)),
	ParamSchema::unsigned("data", UNSIGNED_SWAP_DATA),
];

fn no_checks(_: &[DynSolValue]) -> Result<(), EncodingError> {
	Ok(())
}

fn check_bit(values: &[DynSolValue]) -> Result<(), EncodingError> {
	if let Some(DynSolValue::Uint(bit, _)) = values.get(1) {
		intent_nonce::bit_offset(*bit).map_err(|e| EncodingError::Range {
			param: "bit".to_string(),
			message: e.to_string(),
		})?;
	}
	Ok(())
}

fn check_fill_state(values: &[DynSolValue]) -> Result<(), EncodingError> {
	if let Some(DynSolValue::Tuple(members)) = values.get(2) {
		if let Some(DynSolValue::Uint(start, _)) = members.get(1) {
			if *start > Q96 {
				return Err(EncodingError::Range {
					param: "fillStateParams.startX96".to_string(),
					message: format!("{} exceeds Q96 ({})", start, Q96),
				});
			}
		}
	}
	Ok(())
}

/// Indexed by `SegmentFunction as usize`.
pub static SEGMENT_TABLE: [SegmentDefinition; 9] = [
	SegmentDefinition {
		function: SegmentFunction::UseBit,
		name: "useBit",
		kind: SegmentKind::Require,
		params: &BIT_PARAMS,
		validate: check_bit,
	},
	SegmentDefinition {
		function: SegmentFunction::RequireBitUsed,
		name: "requireBitUsed",
		kind: SegmentKind::Require,
		params: &BIT_PARAMS,
		validate: check_bit,
	},
	SegmentDefinition {
		function: SegmentFunction::RequireBitNotUsed,
		name: "requireBitNotUsed",
		kind: SegmentKind::Require,
		params: &BIT_PARAMS,
		validate: check_bit,
	},
	SegmentDefinition {
		function: SegmentFunction::RequireBlockMined,
		name: "requireBlockMined",
		kind: SegmentKind::Require,
		params: &BLOCK_PARAMS,
		validate: no_checks,
	},
	SegmentDefinition {
		function: SegmentFunction::RequireBlockNotMined,
		name: "requireBlockNotMined",
		kind: SegmentKind::Require,
		params: &BLOCK_PARAMS,
		validate: no_checks,
	},
	SegmentDefinition {
		function: SegmentFunction::RequireUint256LowerBound,
		name: "requireUint256LowerBound",
		kind: SegmentKind::Require,
		params: &LOWER_BOUND_PARAMS,
		validate: no_checks,
	},
	SegmentDefinition {
		function: SegmentFunction::RequireUint256UpperBound,
		name: "requireUint256UpperBound",
		kind: SegmentKind::Require,
		params: &UPPER_BOUND_PARAMS,
		validate: no_checks,
	},
	SegmentDefinition {
		function: SegmentFunction::MarketSwapExactInput,
		name: "marketSwapExactInput",
		kind: SegmentKind::Swap,
		params: &MARKET_SWAP_PARAMS,
		validate: no_checks,
	},
	SegmentDefinition {
		function: SegmentFunction::LimitSwapExactInput,
		name: "limitSwapExactInput",
		kind: SegmentKind::Swap,
		params: &LIMIT_SWAP_PARAMS,
		validate: check_fill_state,
	},
];

impl SegmentFunction {
	pub const ALL: [SegmentFunction; 9] = [
		SegmentFunction::UseBit,
		SegmentFunction::RequireBitUsed,
		SegmentFunction::RequireBitNotUsed,
		SegmentFunction::RequireBlockMined,
		SegmentFunction::RequireBlockNotMined,
		SegmentFunction::RequireUint256LowerBound,
		SegmentFunction::RequireUint256UpperBound,
		SegmentFunction::MarketSwapExactInput,
		SegmentFunction::LimitSwapExactInput,
	];

	pub fn definition(self) -> &'static SegmentDefinition {
		&SEGMENT_TABLE[self as usize]
	}

	/// Looks a function up by its on-chain name.
	pub fn from_name(name: &str) -> Option<Self> {
		SEGMENT_TABLE
			.iter()
			.find(|def| def.name == name)
			.map(|def| def.function)
	}

	pub fn name(self) -> &'static str {
		self.definition().name
	}

	pub fn kind(self) -> SegmentKind {
		self.definition().kind
	}

	pub fn params(self) -> &'static [ParamSchema] {
		self.definition().params
	}

	/// Types of every parameter, signed and unsigned, in declaration order.
	pub fn param_types(self) -> Vec<SolType> {
		self.params().iter().map(|p| p.ty).collect()
	}

	pub fn signed_params(self) -> impl Iterator<Item = &'static ParamSchema> {
		self.params().iter().filter(|p| p.signed)
	}

	pub fn unsigned_params(self) -> impl Iterator<Item = &'static ParamSchema> {
		self.params().iter().filter(|p| !p.signed)
	}

	/// Whether execution needs an unsigned tail from the executor.
	pub fn requires_unsigned_call(self) -> bool {
		self.params().iter().any(|p| !p.signed)
	}
}

impl fmt::Display for SegmentFunction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name())
	}
}

impl FromStr for SegmentFunction {
	type Err = SegmentError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_name(s).ok_or_else(|| SegmentError::UnknownFunction(s.to_string()))
	}
}
