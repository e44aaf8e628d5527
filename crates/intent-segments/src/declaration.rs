//! Intent and Declaration aggregates.

use crate::schema::{DECLARATION, EXECUTE_FUNCTION, UNSIGNED_DATA};
use crate::unsigned::{calls_value, UnsignedData};
use crate::{Segment, SegmentError};
use alloy_dyn_abi::DynSolValue;
use intent_encoding::SegmentEncoder;
use intent_types::{Address, Bytes, Call, DeclarationJson, IntentJson};
use tracing::debug;

/// Ordered segments forming one guarded action.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Intent {
	segments: Vec<Segment>,
}

impl Intent {
	pub fn new(segments: Vec<Segment>) -> Self {
		Self { segments }
	}

	pub fn with_segment(mut self, segment: Segment) -> Self {
		self.segments.push(segment);
		self
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	pub fn swap_count(&self) -> usize {
		self.segments.iter().filter(|s| s.is_swap()).count()
	}

	/// Number of unsigned calls an executor must supply for this intent.
	pub fn unsigned_call_count(&self) -> usize {
		self.segments
			.iter()
			.filter(|s| s.requires_unsigned_call())
			.count()
	}

	pub fn to_json(&self) -> IntentJson {
		IntentJson {
			segments: self.segments.iter().map(Segment::to_json).collect(),
		}
	}

	pub fn from_json(json: &IntentJson, encoder: &dyn SegmentEncoder) -> Result<Self, SegmentError> {
		let segments = json
			.segments
			.iter()
			.map(|segment| Segment::from_json(segment, encoder))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self { segments })
	}

	pub(crate) fn abi_value(&self) -> DynSolValue {
		DynSolValue::Tuple(vec![DynSolValue::Array(
			self.segments.iter().map(Segment::abi_value).collect(),
		)])
	}
}

/// Top-level signable bundle.
///
/// `data` is `execute(declaration, unsignedData)` with only the declaration
/// encoded; it is the payload of the signed message.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
	intents: Vec<Intent>,
	before_calls: Vec<Call>,
	after_calls: Vec<Call>,
	segments_contract: Address,
	data: Bytes,
}

impl Declaration {
	pub fn new(
		intents: Vec<Intent>,
		before_calls: Vec<Call>,
		after_calls: Vec<Call>,
		segments_contract: Address,
		encoder: &dyn SegmentEncoder,
	) -> Result<Self, SegmentError> {
		let mut declaration = Self {
			intents,
			before_calls,
			after_calls,
			segments_contract,
			data: Bytes::new(),
		};
		declaration.data = encoder.encode(
			EXECUTE_FUNCTION,
			&[DECLARATION, UNSIGNED_DATA],
			&[declaration.abi_value()],
		)?;

		debug!(
			intents = declaration.intents.len(),
			before_calls = declaration.before_calls.len(),
			after_calls = declaration.after_calls.len(),
			len = declaration.data.len(),
			"Encoded declaration"
		);
		Ok(declaration)
	}

	pub fn builder(segments_contract: Address) -> DeclarationBuilder {
		DeclarationBuilder::new(segments_contract)
	}

	pub fn intents(&self) -> &[Intent] {
		&self.intents
	}

	pub fn before_calls(&self) -> &[Call] {
		&self.before_calls
	}

	pub fn after_calls(&self) -> &[Call] {
		&self.after_calls
	}

	pub fn segments_contract(&self) -> Address {
		self.segments_contract
	}

	/// Bytes covered by the signature.
	pub fn data(&self) -> &Bytes {
		&self.data
	}

	pub fn abi_value(&self) -> DynSolValue {
		DynSolValue::Tuple(vec![
			DynSolValue::Array(self.intents.iter().map(Intent::abi_value).collect()),
			calls_value(&self.before_calls),
			calls_value(&self.after_calls),
			DynSolValue::Address(self.segments_contract),
		])
	}

	/// Full `execute` calldata including the executor's unsigned data.
	pub fn execution_calldata(
		&self,
		unsigned: &UnsignedData,
		encoder: &dyn SegmentEncoder,
	) -> Result<Bytes, SegmentError> {
		Ok(encoder.encode(
			EXECUTE_FUNCTION,
			&[DECLARATION, UNSIGNED_DATA],
			&[self.abi_value(), unsigned.abi_value()],
		)?)
	}

	pub fn to_json(&self) -> DeclarationJson {
		DeclarationJson {
			intents: self.intents.iter().map(Intent::to_json).collect(),
			before_calls: self.before_calls.clone(),
			after_calls: self.after_calls.clone(),
			segments_contract: self.segments_contract,
			data: self.data.clone(),
		}
	}

	/// Rebuilds a declaration from segment function names and params.
	///
	/// Every wire `data` field is recomputed; callers compare the result with
	/// the payload to detect tampering.
	pub fn from_json(
		json: &DeclarationJson,
		encoder: &dyn SegmentEncoder,
	) -> Result<Self, SegmentError> {
		let intents = json
			.intents
			.iter()
			.map(|intent| Intent::from_json(intent, encoder))
			.collect::<Result<Vec<_>, _>>()?;
		Self::new(
			intents,
			json.before_calls.clone(),
			json.after_calls.clone(),
			json.segments_contract,
			encoder,
		)
	}
}

/// Incremental construction of a [`Declaration`].
#[derive(Debug, Clone)]
pub struct DeclarationBuilder {
	intents: Vec<Intent>,
	before_calls: Vec<Call>,
	after_calls: Vec<Call>,
	segments_contract: Address,
}

impl DeclarationBuilder {
	pub fn new(segments_contract: Address) -> Self {
		Self {
			intents: Vec::new(),
			before_calls: Vec::new(),
			after_calls: Vec::new(),
			segments_contract,
		}
	}

	pub fn intent(mut self, intent: Intent) -> Self {
		self.intents.push(intent);
		self
	}

	pub fn before_call(mut self, call: Call) -> Self {
		self.before_calls.push(call);
		self
	}

	pub fn after_call(mut self, call: Call) -> Self {
		self.after_calls.push(call);
		self
	}

	pub fn build(self, encoder: &dyn SegmentEncoder) -> Result<Declaration, SegmentError> {
		Declaration::new(
			self.intents,
			self.before_calls,
			self.after_calls,
			self.segments_contract,
			encoder,
		)
	}
}
