//! VERIFY: independent checks on a signed declaration.

use crate::SigningError;
use alloy_primitives::{uint, PrimitiveSignature, B256, U256};
use intent_account::AddressDeriver;
use intent_types::Address;

/// Largest `s` accepted by on-chain ECDSA recovery (`secp256k1n / 2`).
pub const SECP256K1N_HALF: U256 =
	uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

/// Maps the recovery byte to y-parity. `0`/`1` are canonicalized to
/// `27`/`28` first; anything else is rejected.
pub fn normalize_recovery_byte(v: u8) -> Result<bool, SigningError> {
	let canonical = match v {
		0 | 1 => v + 27,
		27 | 28 => v,
		other => return Err(SigningError::InvalidRecoveryByte(other)),
	};
	Ok(canonical == 28)
}

/// Recovers the address that produced a raw `(r, s, v)` signature over `hash`.
/// Malleable high-`s` signatures are rejected.
pub fn recover_signer(signature: &[u8], hash: B256) -> Result<Address, SigningError> {
	if signature.len() != 65 {
		return Err(SigningError::MalformedSignature(format!(
			"expected 65 bytes, got {}",
			signature.len()
		)));
	}

	let r = U256::from_be_slice(&signature[..32]);
	let s = U256::from_be_slice(&signature[32..64]);
	if s > SECP256K1N_HALF {
		return Err(SigningError::MalformedSignature(
			"s is in the upper half of the curve order".to_string(),
		));
	}
	let y_parity = normalize_recovery_byte(signature[64])?;

	PrimitiveSignature::new(r, s, y_parity)
		.recover_address_from_prehash(&hash)
		.map_err(|e| SigningError::MalformedSignature(e.to_string()))
}

/// Checks that `signature` over `hash` recovers to `expected`, comparing
/// checksummed forms.
pub fn verify_signer(signature: &[u8], hash: B256, expected: Address) -> Result<(), SigningError> {
	let recovered = recover_signer(signature, hash)?.to_checksum(None);
	let expected = expected.to_checksum(None);
	if recovered != expected {
		return Err(SigningError::SignerMismatch {
			expected,
			recovered,
		});
	}
	Ok(())
}

/// Checks that `account` is the wallet derived from `signer`.
pub fn verify_account(
	deriver: &AddressDeriver,
	signer: Address,
	account: Address,
) -> Result<(), SigningError> {
	let expected = deriver.derive(signer);
	if expected != account {
		return Err(SigningError::AccountMismatch {
			signer,
			expected,
			actual: account,
		});
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use intent_account::{DeclarationSigner, LocalSigner};
	use intent_types::Bytes;

	const FIXTURE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	async fn signed(hash: B256) -> (LocalSigner, Vec<u8>) {
		let signer = LocalSigner::from_hex(FIXTURE_KEY).unwrap();
		let signature = signer.sign_hash(hash).await.unwrap().to_vec();
		(signer, signature)
	}

	#[test]
	fn test_recovery_byte_normalization() {
		assert!(!normalize_recovery_byte(0).unwrap());
		assert!(normalize_recovery_byte(1).unwrap());
		assert!(!normalize_recovery_byte(27).unwrap());
		assert!(normalize_recovery_byte(28).unwrap());
		for v in [2u8, 26, 29, 35, 255] {
			assert!(matches!(
				normalize_recovery_byte(v),
				Err(SigningError::InvalidRecoveryByte(b)) if b == v
			));
		}
	}

	#[tokio::test]
	async fn test_recovers_checksummed_signer() {
		let hash = B256::repeat_byte(0x11);
		let (signer, signature) = signed(hash).await;

		let recovered = recover_signer(&signature, hash).unwrap();
		assert_eq!(
			recovered.to_checksum(None),
			"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
		);
		assert!(verify_signer(&signature, hash, signer.address()).is_ok());
	}

	#[tokio::test]
	async fn test_zero_one_recovery_byte_accepted() {
		let hash = B256::repeat_byte(0x22);
		let (signer, mut signature) = signed(hash).await;
		signature[64] -= 27;
		assert_eq!(recover_signer(&signature, hash).unwrap(), signer.address());
	}

	#[tokio::test]
	async fn test_flipped_bit_does_not_recover_signer() {
		let hash = B256::repeat_byte(0x33);
		let (signer, signature) = signed(hash).await;

		for byte in [0usize, 17, 31, 32, 50, 63] {
			let mut tampered = signature.clone();
			tampered[byte] ^= 0x01;
			match recover_signer(&tampered, hash) {
				Ok(address) => assert_ne!(address, signer.address()),
				Err(e) => assert!(matches!(e, SigningError::MalformedSignature(_))),
			}
			assert!(verify_signer(&tampered, hash, signer.address()).is_err());
		}

		let mut other_parity = signature.clone();
		other_parity[64] = if signature[64] == 27 { 28 } else { 27 };
		assert!(verify_signer(&other_parity, hash, signer.address()).is_err());
	}

	#[tokio::test]
	async fn test_malformed_signatures() {
		let hash = B256::repeat_byte(0x44);
		assert!(matches!(
			recover_signer(&[0u8; 64], hash),
			Err(SigningError::MalformedSignature(_))
		));

		let (_, mut signature) = signed(hash).await;
		signature[64] = 5;
		assert!(matches!(
			recover_signer(&signature, hash),
			Err(SigningError::InvalidRecoveryByte(5))
		));
	}

	#[tokio::test]
	async fn test_high_s_twin_rejected() {
		let hash = B256::repeat_byte(0x55);
		let (_, signature) = signed(hash).await;
		let curve_order =
			uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

		// (r, n - s, !v) recovers the same key on a lenient verifier.
		let s = U256::from_be_slice(&signature[32..64]);
		assert!(s <= SECP256K1N_HALF);
		let mut twin = signature.clone();
		twin[32..64].copy_from_slice(&(curve_order - s).to_be_bytes::<32>());
		twin[64] = if signature[64] == 27 { 28 } else { 27 };

		assert!(matches!(
			recover_signer(&twin, hash),
			Err(SigningError::MalformedSignature(_))
		));
	}

	#[test]
	fn test_verify_account() {
		let deriver = AddressDeriver::new(Address::repeat_byte(0xf1), Bytes::from(vec![0x00]));
		let owner = Address::repeat_byte(0x0a);

		assert!(verify_account(&deriver, owner, deriver.derive(owner)).is_ok());
		assert!(matches!(
			verify_account(&deriver, owner, Address::repeat_byte(0x0b)),
			Err(SigningError::AccountMismatch { .. })
		));
	}
}
