//! Chain read port.
//!
//! Reads of external chain state are the only suspension points of the
//! protocol. Everything else is synchronous and stateless.

use crate::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while reading chain state.
#[derive(Debug, Error)]
pub enum ChainError {
	/// Error that occurs when the underlying transport fails.
	#[error("Chain read failed: {0}")]
	Read(String),
	/// Error that occurs when the returned data cannot be interpreted.
	#[error("Malformed response: {0}")]
	Malformed(String),
}

/// Trait defining the read-only view of chain state this protocol needs.
///
/// Implementations wrap an RPC provider, a fork, or an in-memory map.
#[async_trait]
pub trait ChainReader: Send + Sync {
	/// Returns the 32-byte word stored at `slot` of `address`.
	async fn get_storage_at(&self, address: Address, slot: B256) -> Result<B256, ChainError>;

	/// Returns the deployed code of `address`, empty when nothing is deployed.
	async fn get_code(&self, address: Address) -> Result<Bytes, ChainError>;

	/// Returns the native balance of `address`.
	async fn get_balance(&self, address: Address) -> Result<U256, ChainError>;

	/// Returns the latest block number.
	async fn get_block_number(&self) -> Result<u64, ChainError>;
}
