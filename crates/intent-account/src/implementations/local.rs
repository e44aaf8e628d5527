//! Local private key signer.

use crate::{AccountError, DeclarationSigner};
use alloy_primitives::PrimitiveSignature;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use intent_types::{Address, Bytes, B256};
use tracing::debug;

/// Raw signature in `(r, s, v)` order with `v = 27 + y_parity`.
pub fn signature_bytes(sig: &PrimitiveSignature) -> Bytes {
	let mut bytes = Vec::with_capacity(65);
	bytes.extend_from_slice(&sig.r().to_be_bytes::<32>());
	bytes.extend_from_slice(&sig.s().to_be_bytes::<32>());
	bytes.push(if sig.v() { 28 } else { 27 });
	Bytes::from(bytes)
}

/// Signs digests with a key held in memory.
///
/// Intended for development, tests and tooling. Production owners usually
/// sign from a wallet behind their own [`DeclarationSigner`].
pub struct LocalSigner {
	signer: PrivateKeySigner,
}

impl LocalSigner {
	/// Parses a hex private key, with or without `0x` prefix.
	pub fn from_hex(private_key_hex: &str) -> Result<Self, AccountError> {
		let key = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
		if key.len() != 64 {
			return Err(AccountError::InvalidKey(
				"Private key must be 64 hex characters (32 bytes)".to_string(),
			));
		}
		if hex::decode(key).is_err() {
			return Err(AccountError::InvalidKey(
				"Private key must be valid hexadecimal".to_string(),
			));
		}

		let signer = key
			.parse::<PrivateKeySigner>()
			.map_err(|e| AccountError::InvalidKey(format!("Invalid private key: {}", e)))?;
		Ok(Self { signer })
	}

	pub fn random() -> Self {
		Self {
			signer: PrivateKeySigner::random(),
		}
	}
}

#[async_trait]
impl DeclarationSigner for LocalSigner {
	fn address(&self) -> Address {
		self.signer.address()
	}

	async fn sign_hash(&self, hash: B256) -> Result<Bytes, AccountError> {
		let signature = self
			.signer
			.sign_hash(&hash)
			.await
			.map_err(|e| AccountError::SigningFailed(format!("Failed to sign digest: {}", e)))?;

		debug!(signer = %self.signer.address(), %hash, "Signed digest");
		Ok(signature_bytes(&signature))
	}
}
