//! In-memory chain reader.
//!
//! Backs tests and offline tooling. Unset storage slots read as zero and
//! unset accounts have no code and no balance, as on a real chain.

use crate::{Address, Bytes, ChainError, ChainReader, B256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Chain state held in process memory.
#[derive(Debug, Default)]
pub struct MemoryChainReader {
	storage: RwLock<HashMap<(Address, B256), B256>>,
	code: RwLock<HashMap<Address, Bytes>>,
	balances: RwLock<HashMap<Address, U256>>,
	block_number: RwLock<u64>,
}

impl MemoryChainReader {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn set_storage(&self, address: Address, slot: B256, value: B256) {
		self.storage.write().await.insert((address, slot), value);
	}

	pub async fn set_code(&self, address: Address, code: impl Into<Bytes>) {
		self.code.write().await.insert(address, code.into());
	}

	pub async fn set_balance(&self, address: Address, balance: U256) {
		self.balances.write().await.insert(address, balance);
	}

	pub async fn set_block_number(&self, number: u64) {
		*self.block_number.write().await = number;
	}
}

#[async_trait]
impl ChainReader for MemoryChainReader {
	async fn get_storage_at(&self, address: Address, slot: B256) -> Result<B256, ChainError> {
		let storage = self.storage.read().await;
		Ok(storage.get(&(address, slot)).copied().unwrap_or(B256::ZERO))
	}

	async fn get_code(&self, address: Address) -> Result<Bytes, ChainError> {
		let code = self.code.read().await;
		Ok(code.get(&address).cloned().unwrap_or_default())
	}

	async fn get_balance(&self, address: Address) -> Result<U256, ChainError> {
		let balances = self.balances.read().await;
		Ok(balances.get(&address).copied().unwrap_or(U256::ZERO))
	}

	async fn get_block_number(&self) -> Result<u64, ChainError> {
		Ok(*self.block_number.read().await)
	}
}
