//! Unsigned execution data.
//!
//! Swap segments leave their routing to whoever executes the declaration. The
//! executor picks one intent and supplies, for each of its segments that
//! requires an unsigned call, the ABI-encoded trailing parameters. None of it
//! is covered by the owner's signature.

use crate::declaration::Declaration;
use crate::schema::{UNSIGNED_DATA, UNSIGNED_SWAP_DATA};
use crate::SegmentError;
use alloy_dyn_abi::DynSolValue;
use intent_encoding::SegmentEncoder;
use intent_types::{Address, Bytes, Call, U256};

pub(crate) fn call_value(call: &Call) -> DynSolValue {
	DynSolValue::Tuple(vec![
		DynSolValue::Address(call.target_contract),
		DynSolValue::Bytes(call.data.to_vec()),
	])
}

pub(crate) fn calls_value(calls: &[Call]) -> DynSolValue {
	DynSolValue::Array(calls.iter().map(call_value).collect())
}

/// Unsigned tail of a swap segment: where the output goes and the calls that
/// source it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedSwapData {
	pub recipient: Address,
	pub calls: Vec<Call>,
}

impl UnsignedSwapData {
	pub fn new(recipient: Address, calls: Vec<Call>) -> Self {
		Self { recipient, calls }
	}

	pub fn abi_value(&self) -> DynSolValue {
		DynSolValue::Tuple(vec![
			DynSolValue::Address(self.recipient),
			calls_value(&self.calls),
		])
	}

	/// Encoded as the trailing parameters of a swap segment call.
	pub fn encode(&self, encoder: &dyn SegmentEncoder) -> Result<Bytes, SegmentError> {
		Ok(encoder.encode_params(&[UNSIGNED_SWAP_DATA], &[self.abi_value()])?)
	}
}

/// `(uint8 intentIndex, bytes[] unsignedCalls)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedData {
	intent_index: u8,
	unsigned_calls: Vec<Bytes>,
}

impl UnsignedData {
	/// Checks that `intent_index` names an intent of `declaration` and that
	/// one unsigned call is given per segment requiring one.
	pub fn new(
		declaration: &Declaration,
		intent_index: usize,
		unsigned_calls: Vec<Bytes>,
	) -> Result<Self, SegmentError> {
		let count = declaration.intents().len();
		let intent = declaration
			.intents()
			.get(intent_index)
			.filter(|_| intent_index <= u8::MAX as usize)
			.ok_or(SegmentError::IntentIndex {
				index: intent_index,
				count,
			})?;

		let expected = intent.unsigned_call_count();
		if unsigned_calls.len() != expected {
			return Err(SegmentError::UnsignedCallCount {
				intent: intent_index,
				expected,
				actual: unsigned_calls.len(),
			});
		}

		Ok(Self {
			intent_index: intent_index as u8,
			unsigned_calls,
		})
	}

	pub fn intent_index(&self) -> u8 {
		self.intent_index
	}

	pub fn unsigned_calls(&self) -> &[Bytes] {
		&self.unsigned_calls
	}

	pub fn abi_value(&self) -> DynSolValue {
		DynSolValue::Tuple(vec![
			DynSolValue::Uint(U256::from(self.intent_index), 8),
			DynSolValue::Array(
				self.unsigned_calls
					.iter()
					.map(|call| DynSolValue::Bytes(call.to_vec()))
					.collect(),
			),
		])
	}

	pub fn encode(&self, encoder: &dyn SegmentEncoder) -> Result<Bytes, SegmentError> {
		Ok(encoder.encode_params(&[UNSIGNED_DATA], &[self.abi_value()])?)
	}
}
