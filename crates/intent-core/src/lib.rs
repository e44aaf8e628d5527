//! Declaration service.
//!
//! Composes the protocol for one owner: allocate a replay-protection bit,
//! build segments into intents and a declaration, derive the owner's wallet,
//! sign the EIP-712 digest and re-verify signed payloads. Chain state is read
//! through the injected [`ChainReader`]; nothing else suspends.

use intent_account::{AccountService, DeclarationSigner};
use intent_config::ProtocolConfig;
use intent_encoding::SegmentEncoder;
use intent_fill::{filled_amount, get_unfilled_amount, CurveRegistry};
use intent_monitoring::declaration_span;
use intent_nonce::{Bit, NonceBitmap};
use intent_segments::{
	use_bit, Declaration, DeclarationBuilder, LimitSwapExactInput, Segment, UnsignedData,
};
use intent_signing::{Eip712Signer, SignedDeclaration};
use intent_types::{
	Address, Bytes, ChainId, ChainReader, DeclarationError, Result, SignedDeclarationJson,
	ValidationResult, I256, U256,
};
use intent_validation::{DeclarationValidator, Eip1271Verifier};
use std::sync::Arc;
use tracing::{info, Instrument};

pub mod builder;

pub use builder::DeclarationServiceBuilder;

pub struct DeclarationService {
	config: ProtocolConfig,
	chain: Arc<dyn ChainReader>,
	encoder: Arc<dyn SegmentEncoder>,
	account: AccountService,
	signer: Eip712Signer,
	validator: DeclarationValidator,
	curves: CurveRegistry,
}

impl DeclarationService {
	pub fn builder(config: ProtocolConfig) -> DeclarationServiceBuilder {
		DeclarationServiceBuilder::new(config)
	}

	pub fn config(&self) -> &ProtocolConfig {
		&self.config
	}

	pub fn encoder(&self) -> &dyn SegmentEncoder {
		self.encoder.as_ref()
	}

	pub fn owner(&self) -> Address {
		self.account.owner()
	}

	/// Wallet address derived from the owner.
	pub fn account_address(&self) -> Address {
		self.account.account_address()
	}

	/// Replay-protection bitmap of the owner's wallet.
	pub fn bitmap(&self) -> NonceBitmap {
		NonceBitmap::new(self.chain.clone(), self.account_address())
	}

	pub async fn next_bit(&self) -> Result<Bit> {
		Ok(self.bitmap().next_bit().await?)
	}

	pub async fn next_bits(&self, count: usize) -> Result<Vec<Bit>> {
		Ok(self.bitmap().next_bits(count).await?)
	}

	pub async fn is_bit_used(&self, bit: &Bit) -> Result<bool> {
		Ok(self.bitmap().is_used(bit).await?)
	}

	/// Allocates the next free bit and the `useBit` segment consuming it.
	pub async fn use_next_bit(&self) -> Result<(Bit, Segment)> {
		let bit = self.next_bit().await?;
		let segment = use_bit(&bit, self.encoder())?;
		Ok((bit, segment))
	}

	pub async fn current_block(&self) -> Result<u64> {
		Ok(self.chain.get_block_number().await?)
	}

	/// Starts a declaration against the configured segments contract.
	pub fn declaration(&self) -> DeclarationBuilder {
		Declaration::builder(self.config.contracts.segments_contract)
	}

	pub fn build(&self, builder: DeclarationBuilder) -> Result<Declaration> {
		Ok(builder.build(self.encoder())?)
	}

	pub async fn sign(
		&self,
		declaration: Declaration,
		chain_id: ChainId,
	) -> Result<SignedDeclaration> {
		async {
			let signed = self
				.signer
				.sign(declaration, chain_id, self.account.signer())
				.await?;
			info!(
				account = %signed.account_address(),
				intents = signed.declaration().intents().len(),
				"Declaration ready"
			);
			Ok::<_, DeclarationError>(signed)
		}
		.instrument(declaration_span("sign", chain_id))
		.await
	}

	/// Attaches a contract signature for an EIP-1271 owner.
	pub fn sign_eip1271(
		&self,
		declaration: Declaration,
		chain_id: ChainId,
		signature: Bytes,
	) -> SignedDeclaration {
		self.signer
			.sign_eip1271(declaration, chain_id, self.owner(), signature)
	}

	pub fn validate(&self, signed: &SignedDeclarationJson) -> ValidationResult {
		let _span = declaration_span("validate", signed.chain_id).entered();
		self.validator.validate(signed)
	}

	pub async fn validate_with_eip1271(
		&self,
		signed: &SignedDeclarationJson,
		verifier: &dyn Eip1271Verifier,
	) -> ValidationResult {
		self.validator
			.validate_with_eip1271(signed, verifier)
			.instrument(declaration_span("validate", signed.chain_id))
			.await
	}

	/// Calldata executing intent `intent_index` with the executor's unsigned calls.
	pub fn execution_calldata(
		&self,
		declaration: &Declaration,
		intent_index: usize,
		unsigned_calls: Vec<Bytes>,
	) -> Result<Bytes> {
		let unsigned = UnsignedData::new(declaration, intent_index, unsigned_calls)?;
		Ok(declaration.execution_calldata(&unsigned, self.encoder())?)
	}

	/// Input still available to a limit swap given its stored fill state.
	pub fn unfilled_input(&self, swap: &LimitSwapExactInput, stored_state: I256) -> Result<U256> {
		let filled = filled_amount(swap.token_in_amount, &swap.fill_state, stored_state)?;
		Ok(get_unfilled_amount(swap.token_in_amount, filled)?)
	}

	/// Output owed for `input` more units of a limit swap.
	pub fn limit_swap_output(
		&self,
		swap: &LimitSwapExactInput,
		stored_state: I256,
		input: U256,
	) -> Result<U256> {
		let filled = filled_amount(swap.token_in_amount, &swap.fill_state, stored_state)?;
		self.curves
			.get_output(&swap.price_curve, input, filled, swap.token_in_amount)
			.map_err(DeclarationError::from)
	}
}

impl std::fmt::Debug for DeclarationService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DeclarationService")
			.field("owner", &self.owner())
			.field("account", &self.account_address())
			.finish_non_exhaustive()
	}
}

pub(crate) fn assemble(
	config: ProtocolConfig,
	chain: Arc<dyn ChainReader>,
	encoder: Arc<dyn SegmentEncoder>,
	signer: Box<dyn DeclarationSigner>,
	curves: CurveRegistry,
) -> DeclarationService {
	let deriver = intent_account::AddressDeriver::from_config(&config.account);
	let eip712 = Eip712Signer::new(
		config.domain.clone(),
		config.contracts.declaration_contract,
		deriver.clone(),
	);
	let validator = DeclarationValidator::from_config(&config, encoder.clone());

	DeclarationService {
		account: AccountService::new(signer, deriver),
		signer: eip712,
		validator,
		config,
		chain,
		encoder,
		curves,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use intent_account::LocalSigner;
	use intent_config::ConfigLoader;
	use intent_fill::{FillStateError, FlatPriceCurve, Q96};
	use intent_nonce::bitmap_slot;
	use intent_segments::{
		limit_swap_exact_input, market_swap_exact_input, require_block_not_mined, Intent,
		MarketSwapExactInput, UnsignedSwapData,
	};
	use intent_types::implementations::memory::MemoryChainReader;
	use intent_types::{FillStateParams, PriceCurveRef, Token, ValidationReason, B256};

	const CONFIG: &str = r#"
[account]
factory = "0x00000000000000000000000000000000000000f1"
init_code_template = "0x3d602d80600a3d3981f3"

[contracts]
declaration_contract = "0x00000000000000000000000000000000000000d1"
segments_contract = "0x00000000000000000000000000000000000000a1"
"#;

	const OWNER_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
	const FLAT_CURVE: Address = Address::repeat_byte(0xcc);

	fn config() -> ProtocolConfig {
		ConfigLoader::new()
			.with_env_prefix("INTENT_CORE_TEST_")
			.load_from_str(CONFIG)
			.unwrap()
	}

	fn service(chain: Arc<MemoryChainReader>) -> DeclarationService {
		DeclarationService::builder(config())
			.with_chain(chain)
			.with_signer(Box::new(LocalSigner::from_hex(OWNER_KEY).unwrap()))
			.with_curve(FLAT_CURVE, Arc::new(FlatPriceCurve))
			.build()
			.unwrap()
	}

	fn swap_segment(service: &DeclarationService) -> Segment {
		let swap = MarketSwapExactInput {
			price_oracle: Address::repeat_byte(0x0f),
			price_oracle_params: Bytes::new(),
			owner: service.account_address(),
			token_in: Token::erc20(Address::repeat_byte(0x01)),
			token_out: Token::erc20(Address::repeat_byte(0x02)),
			token_in_amount: U256::from(1_000u64),
			fee_percent: 3_000,
			fee_min: U256::ZERO,
		};
		market_swap_exact_input(&swap, service.encoder()).unwrap()
	}

	fn limit_swap(start_x96: u128) -> LimitSwapExactInput {
		LimitSwapExactInput {
			price_curve: PriceCurveRef {
				address: FLAT_CURVE,
				params: FlatPriceCurve::encode_params(Q96 * U256::from(2u64)),
			},
			fill_state: FillStateParams {
				id: 1,
				start_x96,
				sign: true,
			},
			owner: Address::repeat_byte(0x0a),
			token_in: Token::erc20(Address::repeat_byte(0x01)),
			token_out: Token::eth(),
			token_in_amount: U256::from(1_000u64),
		}
	}

	#[tokio::test]
	async fn test_undeployed_account_starts_at_first_bit() {
		let service = service(Arc::new(MemoryChainReader::new()));
		let bit = service.next_bit().await.unwrap();
		assert_eq!(bit.index, U256::ZERO);
		assert_eq!(bit.value, U256::from(1u64));
		assert!(!service.is_bit_used(&bit).await.unwrap());
	}

	#[tokio::test]
	async fn test_bits_follow_chain_state() {
		let chain = Arc::new(MemoryChainReader::new());
		let service = service(chain.clone());
		let account = service.account_address();

		chain.set_code(account, vec![0x60, 0x00]).await;
		chain
			.set_storage(
				account,
				bitmap_slot(U256::ZERO),
				B256::from(U256::from(0b111u64).to_be_bytes::<32>()),
			)
			.await;

		let (bit, segment) = service.use_next_bit().await.unwrap();
		assert_eq!(bit.value, U256::from(8u64));
		assert_eq!(segment.function().name(), "useBit");

		let bits = service.next_bits(2).await.unwrap();
		assert_eq!(bits[0].value, U256::from(8u64));
		assert_eq!(bits[1].value, U256::from(16u64));

		let used = Bit::from_offset(U256::ZERO, 1).unwrap();
		assert!(service.is_bit_used(&used).await.unwrap());
	}

	#[tokio::test]
	async fn test_build_sign_validate() {
		let chain = Arc::new(MemoryChainReader::new());
		chain.set_block_number(1_200).await;
		let service = service(chain);

		let (_, guard) = service.use_next_bit().await.unwrap();
		let deadline = service.current_block().await.unwrap() + 100;
		let intent = Intent::new(vec![
			guard,
			require_block_not_mined(deadline, service.encoder()).unwrap(),
			swap_segment(&service),
		]);

		let declaration = service
			.build(service.declaration().intent(intent))
			.unwrap();
		assert_eq!(
			declaration.segments_contract(),
			service.config().contracts.segments_contract
		);

		let signed = service.sign(declaration, 31337).await.unwrap();
		assert_eq!(signed.account_address(), service.account_address());
		assert_eq!(signed.signer(), service.owner());

		let result = service.validate(&signed.to_json());
		assert!(result.is_valid(), "{:?}", result);
	}

	#[tokio::test]
	async fn test_validation_uses_configured_flag() {
		let service = service(Arc::new(MemoryChainReader::new()));
		let (_, guard) = service.use_next_bit().await.unwrap();
		let declaration = service
			.build(service.declaration().intent(Intent::new(vec![guard])))
			.unwrap();
		let signed = service.sign(declaration, 1).await.unwrap().to_json();

		let result = service.validate(&signed);
		assert_eq!(result.reason, Some(ValidationReason::WrongNumberOfSwaps));
	}

	#[tokio::test]
	async fn test_execution_calldata_requires_unsigned_tails() {
		let service = service(Arc::new(MemoryChainReader::new()));
		let declaration = service
			.build(
				service
					.declaration()
					.intent(Intent::new(vec![swap_segment(&service)])),
			)
			.unwrap();

		assert!(service
			.execution_calldata(&declaration, 0, vec![])
			.is_err());

		let tail = UnsignedSwapData::new(Address::repeat_byte(0x0b), vec![])
			.encode(service.encoder())
			.unwrap();
		let calldata = service
			.execution_calldata(&declaration, 0, vec![tail])
			.unwrap();
		assert_eq!(calldata[..4], declaration.data()[..4]);
		assert!(calldata.len() > declaration.data().len());
	}

	#[test]
	fn test_limit_swap_amounts() {
		let service = service(Arc::new(MemoryChainReader::new()));
		let swap = limit_swap(0);
		assert!(limit_swap_exact_input(&swap, service.encoder()).is_ok());

		assert_eq!(
			service.unfilled_input(&swap, I256::ZERO).unwrap(),
			U256::from(1_000u64)
		);
		assert_eq!(
			service
				.limit_swap_output(&swap, I256::ZERO, U256::from(100u64))
				.unwrap(),
			U256::from(200u64)
		);

		// Resumed at 25% filled.
		let resumed = limit_swap((Q96 >> 2usize).to::<u128>());
		assert_eq!(
			service.unfilled_input(&resumed, I256::ZERO).unwrap(),
			U256::from(750u64)
		);
		let err = service
			.limit_swap_output(&resumed, I256::ZERO, U256::from(800u64))
			.unwrap_err();
		assert!(err.to_string().contains(
			&FillStateError::InputExceedsUnfilled {
				input: U256::from(800u64),
				unfilled: U256::from(750u64),
			}
			.to_string()
		));
	}

	#[test]
	fn test_unknown_curve() {
		let service = service(Arc::new(MemoryChainReader::new()));
		let mut swap = limit_swap(0);
		swap.price_curve.address = Address::repeat_byte(0xdd);
		assert!(matches!(
			service.limit_swap_output(&swap, I256::ZERO, U256::from(1u64)),
			Err(DeclarationError::FillState(_))
		));
	}
}
