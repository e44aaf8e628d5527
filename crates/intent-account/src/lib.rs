//! Account-side capabilities: deterministic wallet address derivation and
//! digest signing.

use async_trait::async_trait;
use intent_types::{Address, Bytes, B256};
use thiserror::Error;

pub mod derive;

pub mod implementations {
	pub mod local;
}

pub use derive::{create2_address, AddressDeriver};
pub use implementations::local::LocalSigner;

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

impl From<AccountError> for intent_types::DeclarationError {
	fn from(err: AccountError) -> Self {
		intent_types::DeclarationError::Signature(err.to_string())
	}
}

/// External signer producing raw 65-byte `(r, s, v)` signatures over a
/// 32-byte digest, with `v` in `{27, 28}`.
#[async_trait]
pub trait DeclarationSigner: Send + Sync {
	/// Address of the key owner; the wallet address is derived from it.
	fn address(&self) -> Address;

	async fn sign_hash(&self, hash: B256) -> Result<Bytes, AccountError>;
}

/// Pairs the owner's signer with the derivation of their wallet address.
pub struct AccountService {
	signer: Box<dyn DeclarationSigner>,
	deriver: AddressDeriver,
}

impl AccountService {
	pub fn new(signer: Box<dyn DeclarationSigner>, deriver: AddressDeriver) -> Self {
		Self { signer, deriver }
	}

	pub fn owner(&self) -> Address {
		self.signer.address()
	}

	/// Wallet address of the owner.
	pub fn account_address(&self) -> Address {
		self.deriver.derive(self.signer.address())
	}

	pub fn deriver(&self) -> &AddressDeriver {
		&self.deriver
	}

	pub fn signer(&self) -> &dyn DeclarationSigner {
		self.signer.as_ref()
	}

	pub async fn sign_hash(&self, hash: B256) -> Result<Bytes, AccountError> {
		self.signer.sign_hash(hash).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_account_service_derives_from_signer() {
		let signer = LocalSigner::random();
		let owner = signer.address();
		let deriver = AddressDeriver::new(Address::repeat_byte(0xf1), Bytes::from(vec![0x60, 0x80]));
		let service = AccountService::new(Box::new(signer), deriver.clone());

		assert_eq!(service.owner(), owner);
		assert_eq!(service.account_address(), deriver.derive(owner));

		let signature = service.sign_hash(B256::repeat_byte(7)).await.unwrap();
		assert_eq!(signature.len(), 65);
	}
}
