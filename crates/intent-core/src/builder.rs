use crate::DeclarationService;
use intent_account::DeclarationSigner;
use intent_config::ProtocolConfig;
use intent_encoding::{AbiSegmentEncoder, SegmentEncoder};
use intent_fill::{CurveRegistry, PriceCurve};
use intent_types::{Address, ChainReader, DeclarationError};
use std::sync::Arc;

/// Wires a [`DeclarationService`] from configuration and its capabilities.
pub struct DeclarationServiceBuilder {
	config: ProtocolConfig,
	chain: Option<Arc<dyn ChainReader>>,
	signer: Option<Box<dyn DeclarationSigner>>,
	encoder: Arc<dyn SegmentEncoder>,
	curves: CurveRegistry,
}

impl DeclarationServiceBuilder {
	pub fn new(config: ProtocolConfig) -> Self {
		Self {
			config,
			chain: None,
			signer: None,
			encoder: Arc::new(AbiSegmentEncoder),
			curves: CurveRegistry::new(),
		}
	}

	pub fn with_chain(mut self, chain: Arc<dyn ChainReader>) -> Self {
		self.chain = Some(chain);
		self
	}

	pub fn with_signer(mut self, signer: Box<dyn DeclarationSigner>) -> Self {
		self.signer = Some(signer);
		self
	}

	/// Replaces the native ABI encoder.
	pub fn with_encoder(mut self, encoder: Arc<dyn SegmentEncoder>) -> Self {
		self.encoder = encoder;
		self
	}

	/// Registers a local evaluator for the price curve deployed at `address`.
	pub fn with_curve(mut self, address: Address, curve: Arc<dyn PriceCurve>) -> Self {
		self.curves = self.curves.with_curve(address, curve);
		self
	}

	pub fn build(self) -> Result<DeclarationService, DeclarationError> {
		let chain = self
			.chain
			.ok_or_else(|| DeclarationError::Config("Chain reader not provided".into()))?;
		let signer = self
			.signer
			.ok_or_else(|| DeclarationError::Config("Signer not provided".into()))?;

		Ok(crate::assemble(
			self.config,
			chain,
			self.encoder,
			signer,
			self.curves,
		))
	}
}
