//! CREATE2 wallet address derivation.
//!
//! The wallet factory deploys every account with a zero salt and embeds the
//! owner address as trailing immutable data of the init code, so the owner
//! alone determines the address.

use alloy_primitives::keccak256;
use intent_config::AccountConfig;
use intent_types::{Address, Bytes, B256};

/// `keccak256(0xff ++ deployer ++ salt ++ init_code_hash)[12:]`
pub fn create2_address(deployer: Address, salt: B256, init_code_hash: B256) -> Address {
	let mut preimage = [0u8; 85];
	preimage[0] = 0xff;
	preimage[1..21].copy_from_slice(deployer.as_slice());
	preimage[21..53].copy_from_slice(salt.as_slice());
	preimage[53..85].copy_from_slice(init_code_hash.as_slice());
	Address::from_slice(&keccak256(preimage)[12..])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDeriver {
	factory: Address,
	init_code_template: Bytes,
}

impl AddressDeriver {
	pub fn new(factory: Address, init_code_template: Bytes) -> Self {
		Self {
			factory,
			init_code_template,
		}
	}

	pub fn from_config(config: &AccountConfig) -> Self {
		Self::new(config.factory, config.init_code_template.clone())
	}

	pub fn factory(&self) -> Address {
		self.factory
	}

	/// Init code of `owner`'s account.
	pub fn init_code(&self, owner: Address) -> Bytes {
		let mut code = Vec::with_capacity(self.init_code_template.len() + 20);
		code.extend_from_slice(&self.init_code_template);
		code.extend_from_slice(owner.as_slice());
		Bytes::from(code)
	}

	pub fn derive(&self, owner: Address) -> Address {
		create2_address(self.factory, B256::ZERO, keccak256(self.init_code(owner)))
	}

	/// EIP-55 checksummed form of [`AddressDeriver::derive`].
	pub fn derive_checksummed(&self, owner: Address) -> String {
		self.derive(owner).to_checksum(None)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn deriver() -> AddressDeriver {
		AddressDeriver::new(
			Address::repeat_byte(0xf1),
			Bytes::from(hex::decode("3d602d80600a3d3981f3363d3d373d3d3d363d73").unwrap()),
		)
	}

	#[test]
	fn test_matches_create2_from_code() {
		let deriver = deriver();
		let owner = Address::repeat_byte(0x11);

		let expected = deriver
			.factory()
			.create2_from_code(B256::ZERO, deriver.init_code(owner));
		assert_eq!(deriver.derive(owner), expected);
	}

	#[test]
	fn test_distinct_owners_and_stability() {
		let deriver = deriver();
		let a = Address::repeat_byte(0x11);
		let b = Address::repeat_byte(0x12);

		assert_ne!(deriver.derive(a), deriver.derive(b));
		assert_eq!(deriver.derive(a), deriver.derive(a));
	}

	#[test]
	fn test_owner_is_trailing_init_code() {
		let deriver = deriver();
		let owner = Address::repeat_byte(0x33);
		let code = deriver.init_code(owner);

		assert_eq!(code.len(), 20 + 20);
		assert_eq!(&code[20..], owner.as_slice());
	}

	#[test]
	fn test_from_config_and_checksum() {
		let config = AccountConfig {
			factory: Address::repeat_byte(0xf1),
			init_code_template: Bytes::from(vec![0x00]),
		};
		let deriver = AddressDeriver::from_config(&config);
		let owner = Address::repeat_byte(0x44);

		let checksummed = deriver.derive_checksummed(owner);
		assert_eq!(checksummed.parse::<Address>().unwrap(), deriver.derive(owner));
		assert!(checksummed.starts_with("0x"));
		assert_eq!(checksummed.len(), 42);
	}
}
