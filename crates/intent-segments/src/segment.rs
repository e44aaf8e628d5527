//! A single guarded operation.

use crate::schema::{SegmentFunction, SegmentKind};
use crate::SegmentError;
use alloy_dyn_abi::DynSolValue;
use intent_encoding::{EncodingError, SegmentEncoder};
use intent_types::{Bytes, SegmentJson};
use serde_json::{Map, Value};
use tracing::debug;

/// A validated, encoded call to one segment function.
///
/// Only the signed parameter values are held; unsigned trailing parameters are
/// appended by the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
	function: SegmentFunction,
	values: Vec<DynSolValue>,
	data: Bytes,
}

impl Segment {
	/// Builds a segment from JSON params keyed by signed parameter name.
	pub fn new(
		function: SegmentFunction,
		params: &Value,
		encoder: &dyn SegmentEncoder,
	) -> Result<Self, SegmentError> {
		let result = Self::coerce_params(function, params)
			.and_then(|values| Self::from_values(function, values, encoder));
		if let Err(e) = &result {
			debug!(function = %function, error = %e, "Rejected segment params");
		}
		result
	}

	/// Like [`Segment::new`] with the function given by name.
	pub fn from_name(
		function_name: &str,
		params: &Value,
		encoder: &dyn SegmentEncoder,
	) -> Result<Self, SegmentError> {
		Self::new(function_name.parse()?, params, encoder)
	}

	/// Builds a segment from already typed signed values.
	pub fn from_values(
		function: SegmentFunction,
		values: Vec<DynSolValue>,
		encoder: &dyn SegmentEncoder,
	) -> Result<Self, SegmentError> {
		let signed: Vec<_> = function.signed_params().collect();
		if values.len() != signed.len() {
			return Err(EncodingError::ParamCount {
				function: function.name().to_string(),
				expected: signed.len(),
				actual: values.len(),
			}
			.into());
		}

		for (param, value) in signed.iter().zip(&values) {
			param.ty.check(param.name, value)?;
		}
		(function.definition().validate)(&values)?;

		let data = encoder.encode(function.name(), &function.param_types(), &values)?;
		Ok(Self {
			function,
			values,
			data,
		})
	}

	/// Rebuilds a segment from its wire form, re-encoding from `params`.
	pub fn from_json(json: &SegmentJson, encoder: &dyn SegmentEncoder) -> Result<Self, SegmentError> {
		Self::from_name(&json.function_name, &json.params, encoder)
	}

	fn coerce_params(
		function: SegmentFunction,
		params: &Value,
	) -> Result<Vec<DynSolValue>, SegmentError> {
		let map = params.as_object().ok_or_else(|| SegmentError::ParamsNotObject {
			function: function.name().to_string(),
		})?;

		if let Some(key) = map
			.keys()
			.find(|key| !function.signed_params().any(|p| p.name == key.as_str()))
		{
			return Err(SegmentError::UnexpectedParam {
				function: function.name().to_string(),
				param: key.clone(),
			});
		}

		function
			.signed_params()
			.map(|param| -> Result<DynSolValue, SegmentError> {
				let value = map.get(param.name).ok_or_else(|| SegmentError::MissingParam {
					function: function.name().to_string(),
					param: param.name.to_string(),
				})?;
				Ok(param.ty.coerce(param.name, value)?)
			})
			.collect()
	}

	pub fn function(&self) -> SegmentFunction {
		self.function
	}

	pub fn kind(&self) -> SegmentKind {
		self.function.kind()
	}

	pub fn is_swap(&self) -> bool {
		self.kind() == SegmentKind::Swap
	}

	pub fn requires_unsigned_call(&self) -> bool {
		self.function.requires_unsigned_call()
	}

	/// Signed values in schema order.
	pub fn values(&self) -> &[DynSolValue] {
		&self.values
	}

	/// Selector followed by the ABI-encoded signed values.
	pub fn data(&self) -> &Bytes {
		&self.data
	}

	/// Signed params rendered as JSON, keyed by name.
	pub fn params_json(&self) -> Value {
		let map: Map<String, Value> = self
			.function
			.signed_params()
			.zip(&self.values)
			.map(|(param, value)| (param.name.to_string(), param.ty.render(value)))
			.collect();
		Value::Object(map)
	}

	pub fn to_json(&self) -> SegmentJson {
		SegmentJson {
			function_name: self.function.name().to_string(),
			params: self.params_json(),
			data: self.data.clone(),
			requires_unsigned_call: self.requires_unsigned_call(),
		}
	}

	/// `(bytes data, bool requiresUnsignedCall)` as carried in a declaration.
	pub(crate) fn abi_value(&self) -> DynSolValue {
		DynSolValue::Tuple(vec![
			DynSolValue::Bytes(self.data.to_vec()),
			DynSolValue::Bool(self.requires_unsigned_call()),
		])
	}
}
