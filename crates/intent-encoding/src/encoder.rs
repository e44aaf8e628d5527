//! Segment encoder capability and its native ABI implementation.

use crate::{EncodingError, SolType};
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{keccak256, Bytes};
use tracing::trace;

/// Trait defining the ABI encoding capability.
///
/// `param_types` always lists the complete parameter list of the function so
/// the selector matches the on-chain function. `values` may cover a prefix of
/// it: trailing unsigned parameters are supplied at execution time and are
/// not part of the signed bytes.
pub trait SegmentEncoder: Send + Sync {
	/// Encodes `selector(function_name(param_types)) ++ abi_encode_params(values)`.
	fn encode(
		&self,
		function_name: &str,
		param_types: &[SolType],
		values: &[DynSolValue],
	) -> Result<Bytes, EncodingError>;

	/// Encodes values as function parameters, without a selector.
	fn encode_params(
		&self,
		param_types: &[SolType],
		values: &[DynSolValue],
	) -> Result<Bytes, EncodingError>;

	/// Decodes parameter data produced by [`SegmentEncoder::encode_params`].
	fn decode_params(
		&self,
		param_types: &[SolType],
		data: &[u8],
	) -> Result<Vec<DynSolValue>, EncodingError>;
}

/// Canonical signature, e.g. `useBit(uint256,uint256)`.
pub fn function_signature(function_name: &str, param_types: &[SolType]) -> String {
	let params: Vec<String> = param_types.iter().map(SolType::canonical).collect();
	format!("{}({})", function_name, params.join(","))
}

/// First four bytes of the keccak256 of the canonical signature.
pub fn function_selector(function_name: &str, param_types: &[SolType]) -> [u8; 4] {
	let hash = keccak256(function_signature(function_name, param_types).as_bytes());
	let mut selector = [0u8; 4];
	selector.copy_from_slice(&hash[..4]);
	selector
}

/// Native ABI encoder backed by `alloy-dyn-abi`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbiSegmentEncoder;

impl AbiSegmentEncoder {
	pub fn new() -> Self {
		Self
	}

	fn check_values(
		context: &str,
		param_types: &[SolType],
		values: &[DynSolValue],
	) -> Result<(), EncodingError> {
		if values.len() > param_types.len() {
			return Err(EncodingError::ParamCount {
				function: context.to_string(),
				expected: param_types.len(),
				actual: values.len(),
			});
		}

		for (index, (ty, value)) in param_types.iter().zip(values).enumerate() {
			if !ty.matches(value) {
				return Err(EncodingError::TypeMismatch {
					function: context.to_string(),
					index,
					expected: ty.canonical(),
				});
			}
		}

		Ok(())
	}
}

impl SegmentEncoder for AbiSegmentEncoder {
	fn encode(
		&self,
		function_name: &str,
		param_types: &[SolType],
		values: &[DynSolValue],
	) -> Result<Bytes, EncodingError> {
		Self::check_values(function_name, param_types, values)?;

		let selector = function_selector(function_name, param_types);
		let params = DynSolValue::Tuple(values.to_vec()).abi_encode_params();

		let mut data = Vec::with_capacity(4 + params.len());
		data.extend_from_slice(&selector);
		data.extend_from_slice(&params);

		trace!(
			function = %function_signature(function_name, param_types),
			signed_params = values.len(),
			len = data.len(),
			"Encoded function call"
		);
		Ok(Bytes::from(data))
	}

	fn encode_params(
		&self,
		param_types: &[SolType],
		values: &[DynSolValue],
	) -> Result<Bytes, EncodingError> {
		Self::check_values("params", param_types, values)?;
		if values.len() != param_types.len() {
			return Err(EncodingError::ParamCount {
				function: "params".to_string(),
				expected: param_types.len(),
				actual: values.len(),
			});
		}
		Ok(Bytes::from(
			DynSolValue::Tuple(values.to_vec()).abi_encode_params(),
		))
	}

	fn decode_params(
		&self,
		param_types: &[SolType],
		data: &[u8],
	) -> Result<Vec<DynSolValue>, EncodingError> {
		let ty = DynSolType::Tuple(param_types.iter().map(SolType::to_dyn).collect());
		match ty.abi_decode_params(data) {
			Ok(DynSolValue::Tuple(values)) => Ok(values),
			Ok(_) => Err(EncodingError::Decode("expected a tuple".to_string())),
			Err(e) => Err(EncodingError::Decode(e.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::SolField;
	use alloy_primitives::{Address, U256};
	use alloy_sol_types::{sol, SolCall};

	sol! {
		struct Call {
			address targetContract;
			bytes data;
		}

		function useBit(uint256 bitmapIndex, uint256 bit);
		function transfer(address to, uint256 amount);
		function execute(Call[] calls, address segmentsContract);
	}

	static CALL_FIELDS: [SolField; 2] = [
		SolField::new("targetContract", SolType::Address),
		SolField::new("data", SolType::Bytes),
	];
	static CALL: SolType = SolType::Tuple("Call", &CALL_FIELDS);

	#[test]
	fn test_transfer_selector_vector() {
		let selector = function_selector("transfer", &[SolType::Address, SolType::Uint(256)]);
		assert_eq!(selector, [0xa9, 0x05, 0x9c, 0xbb]);
	}

	#[test]
	fn test_matches_sol_types_for_static_params() {
		let encoded = AbiSegmentEncoder
			.encode(
				"useBit",
				&[SolType::Uint(256), SolType::Uint(256)],
				&[
					DynSolValue::Uint(U256::from(3u64), 256),
					DynSolValue::Uint(U256::from(8u64), 256),
				],
			)
			.unwrap();

		let expected = useBitCall {
			bitmapIndex: U256::from(3u64),
			bit: U256::from(8u64),
		}
		.abi_encode();
		assert_eq!(encoded.to_vec(), expected);
		assert_eq!(encoded.len(), 4 + 64);
	}

	#[test]
	fn test_matches_sol_types_for_dynamic_tuples() {
		let target = Address::repeat_byte(0x42);
		let segments = Address::repeat_byte(0x24);
		let calls = DynSolValue::Array(vec![DynSolValue::Tuple(vec![
			DynSolValue::Address(target),
			DynSolValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]),
		])]);

		let encoded = AbiSegmentEncoder
			.encode(
				"execute",
				&[SolType::Array(&CALL), SolType::Address],
				&[calls, DynSolValue::Address(segments)],
			)
			.unwrap();

		let expected = executeCall {
			calls: vec![Call {
				targetContract: target,
				data: vec![0xde, 0xad, 0xbe, 0xef].into(),
			}],
			segmentsContract: segments,
		}
		.abi_encode();
		assert_eq!(encoded.to_vec(), expected);
	}

	#[test]
	fn test_prefix_values_keep_full_selector() {
		let types = [SolType::Address, SolType::Uint(256)];
		let encoded = AbiSegmentEncoder
			.encode(
				"transfer",
				&types,
				&[DynSolValue::Address(Address::repeat_byte(1))],
			)
			.unwrap();

		assert_eq!(&encoded[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
		assert_eq!(encoded.len(), 4 + 32);
	}

	#[test]
	fn test_rejects_extra_and_mistyped_values() {
		let too_many = AbiSegmentEncoder.encode(
			"requireBlockMined",
			&[SolType::Uint(256)],
			&[
				DynSolValue::Uint(U256::from(1u64), 256),
				DynSolValue::Uint(U256::from(2u64), 256),
			],
		);
		assert!(matches!(too_many, Err(EncodingError::ParamCount { .. })));

		let mistyped = AbiSegmentEncoder.encode(
			"requireBlockMined",
			&[SolType::Uint(256)],
			&[DynSolValue::Uint(U256::from(1u64), 128)],
		);
		assert!(matches!(
			mistyped,
			Err(EncodingError::TypeMismatch { index: 0, .. })
		));
	}

	#[test]
	fn test_decode_params_inverts_encode_params() {
		let types = [SolType::Uint(8), SolType::Array(&SolType::Bytes)];
		let values = vec![
			DynSolValue::Uint(U256::from(2u64), 8),
			DynSolValue::Array(vec![DynSolValue::Bytes(vec![1, 2, 3])]),
		];

		let encoded = AbiSegmentEncoder.encode_params(&types, &values).unwrap();
		let decoded = AbiSegmentEncoder.decode_params(&types, &encoded).unwrap();
		assert_eq!(decoded, values);

		assert!(AbiSegmentEncoder.decode_params(&types, &encoded[..16]).is_err());
	}
}
