//! Declaration validator.

use crate::Eip1271Verifier;
use intent_account::AddressDeriver;
use intent_config::{DomainConfig, ProtocolConfig};
use intent_encoding::SegmentEncoder;
use intent_segments::{Declaration, SegmentFunction, SegmentKind};
use intent_signing::eip712::message_fields;
use intent_signing::{
	build_typed_data, hash_typed_data, verify_account, verify_signer, SigningError,
};
use intent_types::{
	DeclarationJson, SignatureType, SignedDeclarationJson, TypedDataDomain, ValidationReason,
	ValidationResult,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct DeclarationValidator {
	domain: DomainConfig,
	deriver: AddressDeriver,
	encoder: Arc<dyn SegmentEncoder>,
	allow_require_only_intents: bool,
}

impl DeclarationValidator {
	pub fn new(
		domain: DomainConfig,
		deriver: AddressDeriver,
		encoder: Arc<dyn SegmentEncoder>,
	) -> Self {
		Self {
			domain,
			deriver,
			encoder,
			allow_require_only_intents: false,
		}
	}

	pub fn from_config(config: &ProtocolConfig, encoder: Arc<dyn SegmentEncoder>) -> Self {
		Self::new(
			config.domain.clone(),
			AddressDeriver::from_config(&config.account),
			encoder,
		)
			.with_require_only_intents(config.validation.allow_require_only_intents)
	}

	/// Accept intents without a swap segment.
	pub fn with_require_only_intents(mut self, allow: bool) -> Self {
		self.allow_require_only_intents = allow;
		self
	}

	pub fn allows_require_only_intents(&self) -> bool {
		self.allow_require_only_intents
	}

	/// Runs every local check. EIP-1271 signatures are not recovered here; see
	/// [`DeclarationValidator::validate_with_eip1271`].
	pub fn validate(&self, signed: &SignedDeclarationJson) -> ValidationResult {
		let result = self
			.check_structure(&signed.declaration)
			.and_then(|| self.check_hash(signed))
			.and_then(|| match signed.signature_type {
				SignatureType::Eip712 => self.check_signature(signed),
				SignatureType::Eip1271 => {
					debug!(signer = %signed.signer, "Skipping local recovery of EIP-1271 signature");
					ValidationResult::valid()
				}
			})
			.and_then(|| self.check_account(signed));

		log_outcome(signed, &result);
		result
	}

	/// Like [`DeclarationValidator::validate`], then asks the wallet contract
	/// to accept EIP-1271 signatures.
	pub async fn validate_with_eip1271(
		&self,
		signed: &SignedDeclarationJson,
		verifier: &dyn Eip1271Verifier,
	) -> ValidationResult {
		let result = self.validate(signed);
		if !result.is_valid() || signed.signature_type != SignatureType::Eip1271 {
			return result;
		}

		let account = signed.eip712_data.domain.verifying_contract;
		let result = match verifier
			.is_valid_signature(account, signed.eip712_data.hash, &signed.signature)
			.await
		{
			Ok(true) => ValidationResult::valid(),
			Ok(false) => ValidationResult::invalid(
				ValidationReason::SignatureMismatch,
				format!("Account {} rejected the EIP-1271 signature", account),
			),
			Err(e) => ValidationResult::invalid(
				ValidationReason::SignatureMismatch,
				format!("EIP-1271 check failed: {}", e),
			),
		};

		log_outcome(signed, &result);
		result
	}

	/// Validates each declaration independently.
	pub fn validate_batch(&self, batch: &[SignedDeclarationJson]) -> Vec<ValidationResult> {
		batch.iter().map(|signed| self.validate(signed)).collect()
	}

	fn check_structure(&self, declaration: &DeclarationJson) -> ValidationResult {
		if declaration.intents.is_empty() {
			return ValidationResult::invalid(
				ValidationReason::ZeroIntents,
				"Declaration contains no intents",
			);
		}

		for (index, intent) in declaration.intents.iter().enumerate() {
			let swaps = intent
				.segments
				.iter()
				.filter(|segment| {
					SegmentFunction::from_name(&segment.function_name)
						.is_some_and(|function| function.kind() == SegmentKind::Swap)
				})
				.count();

			if swaps == 1 || (swaps == 0 && self.allow_require_only_intents) {
				continue;
			}
			return ValidationResult::invalid(
				ValidationReason::WrongNumberOfSwaps,
				format!("Intent {} has {} swap segments, expected 1", index, swaps),
			);
		}

		ValidationResult::valid()
	}

	/// The signed digest must follow from the typed data, the typed data must
	/// carry the configured wallet domain and the declaration bytes, and the
	/// declaration bytes must follow from the segment params.
	fn check_hash(&self, signed: &SignedDeclarationJson) -> ValidationResult {
		let mismatch = |message: String| {
			ValidationResult::invalid(ValidationReason::HashMismatch, message)
		};
		let typed = &signed.eip712_data;

		let digest = match hash_typed_data(typed) {
			Ok(digest) => digest,
			Err(e) => return mismatch(e.to_string()),
		};
		if digest != typed.hash {
			return mismatch(
				SigningError::HashMismatch {
					expected: typed.hash,
					actual: digest,
				}
				.to_string(),
			);
		}

		if typed.domain.chain_id != signed.chain_id {
			return mismatch(format!(
				"Domain chain id {} differs from declaration chain id {}",
				typed.domain.chain_id, signed.chain_id
			));
		}

		if typed.domain.name != self.domain.name || typed.domain.version != self.domain.version {
			return mismatch(format!(
				"Domain {} v{} differs from wallet domain {} v{}",
				typed.domain.name, typed.domain.version, self.domain.name, self.domain.version
			));
		}

		// The account itself is checked against the signer afterwards.
		let expected = build_typed_data(
			TypedDataDomain {
				name: self.domain.name.clone(),
				version: self.domain.version.clone(),
				chain_id: signed.chain_id,
				verifying_contract: typed.domain.verifying_contract,
			},
			signed.declaration_contract,
			&signed.declaration.data,
		);
		if expected.hash != typed.hash {
			return mismatch(
				SigningError::HashMismatch {
					expected: typed.hash,
					actual: expected.hash,
				}
				.to_string(),
			);
		}

		let (to, data) = match message_fields(&typed.value) {
			Ok(fields) => fields,
			Err(e) => return mismatch(e.to_string()),
		};
		if to != signed.declaration_contract {
			return mismatch(format!(
				"Signed message targets {}, declaration contract is {}",
				to, signed.declaration_contract
			));
		}
		if data.as_slice() != signed.declaration.data.as_ref() {
			return mismatch("Signed message data differs from declaration data".to_string());
		}

		let rebuilt = match Declaration::from_json(&signed.declaration, self.encoder.as_ref()) {
			Ok(declaration) => declaration,
			Err(e) => return mismatch(format!("Declaration cannot be rebuilt: {}", e)),
		};
		if rebuilt.data() != &signed.declaration.data {
			return mismatch("Declaration data does not match its intents".to_string());
		}

		for (i, (intent, json)) in rebuilt
			.intents()
			.iter()
			.zip(&signed.declaration.intents)
			.enumerate()
		{
			for (j, (segment, segment_json)) in
				intent.segments().iter().zip(&json.segments).enumerate()
			{
				if segment.data() != &segment_json.data
					|| segment.requires_unsigned_call() != segment_json.requires_unsigned_call
				{
					return mismatch(format!(
						"Segment {} of intent {} ({}) does not match its params",
						j,
						i,
						segment.function()
					));
				}
			}
		}

		ValidationResult::valid()
	}

	fn check_signature(&self, signed: &SignedDeclarationJson) -> ValidationResult {
		match verify_signer(&signed.signature, signed.eip712_data.hash, signed.signer) {
			Ok(()) => ValidationResult::valid(),
			Err(e) => ValidationResult::invalid(ValidationReason::SignatureMismatch, e.to_string()),
		}
	}

	fn check_account(&self, signed: &SignedDeclarationJson) -> ValidationResult {
		match verify_account(
			&self.deriver,
			signed.signer,
			signed.eip712_data.domain.verifying_contract,
		) {
			Ok(()) => ValidationResult::valid(),
			Err(e) => ValidationResult::invalid(ValidationReason::AccountMismatch, e.to_string()),
		}
	}
}

fn log_outcome(signed: &SignedDeclarationJson, result: &ValidationResult) {
	match result.reason {
		Some(reason) => warn!(
			signer = %signed.signer,
			chain_id = signed.chain_id,
			%reason,
			detail = result.message.as_deref().unwrap_or_default(),
			"Rejected declaration"
		),
		None => debug!(
			signer = %signed.signer,
			chain_id = signed.chain_id,
			"Declaration passed validation"
		),
	}
}
