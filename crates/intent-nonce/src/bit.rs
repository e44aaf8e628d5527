//! Bit and nonce arithmetic.

use crate::NonceError;
use intent_types::U256;
use serde::{Deserialize, Serialize};

const WORD_BITS: usize = 256;

/// One replay-protection flag: word `index`, single-bit mask `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bit {
	pub index: U256,
	pub value: U256,
}

impl Bit {
	/// Creates a bit, rejecting values that are not a nonzero power of two.
	pub fn new(index: U256, value: U256) -> Result<Self, NonceError> {
		bit_offset(value)?;
		Ok(Self { index, value })
	}

	/// Creates the bit at `offset` of word `index`.
	pub fn from_offset(index: U256, offset: usize) -> Result<Self, NonceError> {
		Ok(Self {
			index,
			value: bit_value(offset)?,
		})
	}

	/// Position of the bit inside its word, least significant first.
	pub fn offset(&self) -> Result<usize, NonceError> {
		bit_offset(self.value)
	}

	/// Linear nonce of this bit.
	pub fn nonce(&self) -> Result<U256, NonceError> {
		bit_to_nonce(self)
	}
}

/// `log2(value)` for a single-bit mask.
pub fn bit_offset(value: U256) -> Result<usize, NonceError> {
	if value.is_zero() || !value.is_power_of_two() {
		return Err(NonceError::InvalidBit(value));
	}
	Ok(value.trailing_zeros())
}

/// `2^offset` as a single-bit mask.
pub fn bit_value(offset: usize) -> Result<U256, NonceError> {
	if offset >= WORD_BITS {
		return Err(NonceError::InvalidOffset(offset));
	}
	Ok(U256::from(1u8) << offset)
}

/// Whether `bit` is set in `word`.
pub fn bit_used(word: U256, bit: U256) -> bool {
	word & bit != U256::ZERO
}

/// `index * 256 + log2(value)`. Fails for indexes whose nonce exceeds uint256.
pub fn bit_to_nonce(bit: &Bit) -> Result<U256, NonceError> {
	let offset = bit_offset(bit.value)?;
	bit.index
		.checked_mul(U256::from(WORD_BITS))
		.and_then(|base| base.checked_add(U256::from(offset)))
		.ok_or(NonceError::NonceOverflow(bit.index))
}

/// Inverse of [`bit_to_nonce`].
pub fn nonce_to_bit(nonce: U256) -> Bit {
	let word_bits = U256::from(WORD_BITS);
	let offset = (nonce % word_bits).to::<usize>();
	Bit {
		index: nonce / word_bits,
		value: U256::from(1u8) << offset,
	}
}
