//! Declaration signing.

use crate::eip712::build_typed_data;
use crate::SigningError;
use intent_account::{AddressDeriver, DeclarationSigner};
use intent_config::DomainConfig;
use intent_segments::Declaration;
use intent_types::{
	Address, Bytes, ChainId, Eip712Data, SignatureType, SignedDeclarationJson, TypedDataDomain,
};
use tracing::{debug, info};

/// A declaration together with the owner's authorization.
///
/// Created once per signing event and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedDeclaration {
	declaration: Declaration,
	signer: Address,
	account: Address,
	chain_id: ChainId,
	signature_type: SignatureType,
	signature: Bytes,
	declaration_contract: Address,
	eip712: Eip712Data,
}

impl SignedDeclaration {
	pub fn declaration(&self) -> &Declaration {
		&self.declaration
	}

	pub fn signer(&self) -> Address {
		self.signer
	}

	/// Wallet address derived from the signer.
	pub fn account_address(&self) -> Address {
		self.account
	}

	pub fn chain_id(&self) -> ChainId {
		self.chain_id
	}

	pub fn signature_type(&self) -> SignatureType {
		self.signature_type
	}

	pub fn signature(&self) -> &Bytes {
		&self.signature
	}

	pub fn declaration_contract(&self) -> Address {
		self.declaration_contract
	}

	pub fn eip712_data(&self) -> &Eip712Data {
		&self.eip712
	}

	pub fn to_json(&self) -> SignedDeclarationJson {
		SignedDeclarationJson {
			declaration: self.declaration.to_json(),
			signer: self.signer,
			chain_id: self.chain_id,
			signature_type: self.signature_type,
			signature: self.signature.clone(),
			declaration_contract: self.declaration_contract,
			eip712_data: self.eip712.clone(),
		}
	}
}

/// Builds, hashes and signs declarations for one wallet deployment.
#[derive(Debug, Clone)]
pub struct Eip712Signer {
	domain: DomainConfig,
	declaration_contract: Address,
	deriver: AddressDeriver,
}

impl Eip712Signer {
	pub fn new(domain: DomainConfig, declaration_contract: Address, deriver: AddressDeriver) -> Self {
		Self {
			domain,
			declaration_contract,
			deriver,
		}
	}

	pub fn deriver(&self) -> &AddressDeriver {
		&self.deriver
	}

	pub fn declaration_contract(&self) -> Address {
		self.declaration_contract
	}

	/// Domain of `owner`'s wallet on `chain_id`.
	pub fn domain(&self, chain_id: ChainId, owner: Address) -> TypedDataDomain {
		TypedDataDomain {
			name: self.domain.name.clone(),
			version: self.domain.version.clone(),
			chain_id,
			verifying_contract: self.deriver.derive(owner),
		}
	}

	/// Typed data and digest `owner` signs for `declaration`.
	pub fn typed_data(
		&self,
		declaration: &Declaration,
		chain_id: ChainId,
		owner: Address,
	) -> Eip712Data {
		let typed = build_typed_data(
			self.domain(chain_id, owner),
			self.declaration_contract,
			declaration.data(),
		);
		debug!(%owner, chain_id, hash = %typed.hash, "Computed declaration digest");
		typed
	}

	/// Signs with an ECDSA key.
	pub async fn sign(
		&self,
		declaration: Declaration,
		chain_id: ChainId,
		signer: &dyn DeclarationSigner,
	) -> Result<SignedDeclaration, SigningError> {
		let owner = signer.address();
		let eip712 = self.typed_data(&declaration, chain_id, owner);
		let signature = signer.sign_hash(eip712.hash).await?;
		if signature.len() != 65 {
			return Err(SigningError::MalformedSignature(format!(
				"signer returned {} bytes, expected 65",
				signature.len()
			)));
		}

		info!(%owner, chain_id, hash = %eip712.hash, "Signed declaration");
		Ok(self.assemble(
			declaration,
			owner,
			chain_id,
			SignatureType::Eip712,
			signature,
			eip712,
		))
	}

	/// Records a contract signature checked on-chain through EIP-1271
	/// instead of local recovery.
	pub fn sign_eip1271(
		&self,
		declaration: Declaration,
		chain_id: ChainId,
		owner: Address,
		signature: Bytes,
	) -> SignedDeclaration {
		let eip712 = self.typed_data(&declaration, chain_id, owner);
		info!(%owner, chain_id, hash = %eip712.hash, "Attached EIP-1271 signature");
		self.assemble(
			declaration,
			owner,
			chain_id,
			SignatureType::Eip1271,
			signature,
			eip712,
		)
	}

	fn assemble(
		&self,
		declaration: Declaration,
		signer: Address,
		chain_id: ChainId,
		signature_type: SignatureType,
		signature: Bytes,
		eip712: Eip712Data,
	) -> SignedDeclaration {
		SignedDeclaration {
			declaration,
			signer,
			account: eip712.domain.verifying_contract,
			chain_id,
			signature_type,
			signature,
			declaration_contract: self.declaration_contract,
			eip712,
		}
	}
}
