//! Free-bit allocation over an account's on-chain bitmap.
//!
//! Allocation is advisory: two callers scanning the same account can pick the
//! same bit. The account rejects the second use on-chain, so callers rescan and
//! resign instead of locking here.

use crate::{Bit, NonceError};
use alloy_primitives::keccak256;
use intent_types::{Address, ChainReader, B256, U256};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace};

/// Storage slot holding word `index` of an account's bitmap.
pub fn bitmap_slot(index: U256) -> B256 {
	let mut preimage = Vec::with_capacity(3 + 32);
	preimage.extend_from_slice(b"bmp");
	preimage.extend_from_slice(&index.to_be_bytes::<32>());
	keccak256(preimage)
}

/// Index of the lowest zero bit of `word`, if any.
fn first_free_offset(word: U256) -> Option<usize> {
	let free = !word;
	if free.is_zero() {
		None
	} else {
		Some(free.trailing_zeros())
	}
}

/// Returns the first unused bit, scanning words from index 0 and bits
/// least-significant first.
pub async fn next_bit<F, Fut, E>(mut load_word: F) -> Result<Bit, E>
where
	F: FnMut(U256) -> Fut,
	Fut: Future<Output = Result<U256, E>>,
	E: From<NonceError>,
{
	let mut index = U256::ZERO;
	loop {
		let word = load_word(index).await?;
		if let Some(offset) = first_free_offset(word) {
			return Ok(Bit::from_offset(index, offset)?);
		}
		trace!(%index, "Bitmap word full");
		index += U256::from(1u8);
	}
}

/// Returns `count` distinct unused bits in scan order.
pub async fn next_bits<F, Fut, E>(mut load_word: F, count: usize) -> Result<Vec<Bit>, E>
where
	F: FnMut(U256) -> Fut,
	Fut: Future<Output = Result<U256, E>>,
	E: From<NonceError>,
{
	let mut bits = Vec::with_capacity(count);
	let mut index = U256::ZERO;

	while bits.len() < count {
		let mut word = load_word(index).await?;
		trace!(%index, %word, "Loaded bitmap word");

		while bits.len() < count {
			let Some(offset) = first_free_offset(word) else {
				break;
			};
			let bit = Bit::from_offset(index, offset)?;
			word |= bit.value;
			bits.push(bit);
		}

		index += U256::from(1u8);
	}

	Ok(bits)
}

/// Reads an account's bitmap through the chain read port.
#[derive(Clone)]
pub struct NonceBitmap {
	chain: Arc<dyn ChainReader>,
	account: Address,
}

impl NonceBitmap {
	pub fn new(chain: Arc<dyn ChainReader>, account: Address) -> Self {
		Self { chain, account }
	}

	pub fn account(&self) -> Address {
		self.account
	}

	/// Whether the account contract has been deployed.
	pub async fn is_deployed(&self) -> Result<bool, NonceError> {
		let code = self.chain.get_code(self.account).await?;
		Ok(!code.is_empty())
	}

	/// Loads word `index` of the bitmap.
	pub async fn load_word(&self, index: U256) -> Result<U256, NonceError> {
		let value = self
			.chain
			.get_storage_at(self.account, bitmap_slot(index))
			.await?;
		Ok(U256::from_be_bytes(value.0))
	}

	/// Whether `bit` has already been consumed by the account.
	pub async fn is_used(&self, bit: &Bit) -> Result<bool, NonceError> {
		bit.offset()?;
		let word = self.load_word(bit.index).await?;
		Ok(crate::bit_used(word, bit.value))
	}

	/// Allocates the first free bit of the account.
	pub async fn next_bit(&self) -> Result<Bit, NonceError> {
		let bit = if self.is_deployed().await? {
			next_bit(|index| self.load_word(index)).await?
		} else {
			Bit::from_offset(U256::ZERO, 0)?
		};
		debug!(
			account = %self.account,
			index = %bit.index,
			value = %bit.value,
			"Allocated replay-protection bit"
		);
		Ok(bit)
	}

	/// Allocates `count` distinct free bits of the account.
	pub async fn next_bits(&self, count: usize) -> Result<Vec<Bit>, NonceError> {
		let bits = if self.is_deployed().await? {
			next_bits(|index| self.load_word(index), count).await?
		} else {
			// An undeployed account has an empty bitmap.
			next_bits(|_| async { Ok::<_, NonceError>(U256::ZERO) }, count).await?
		};

		debug!(
			account = %self.account,
			count = bits.len(),
			first_index = %bits.first().map(|b| b.index).unwrap_or_default(),
			"Allocated replay-protection bits"
		);
		Ok(bits)
	}
}
