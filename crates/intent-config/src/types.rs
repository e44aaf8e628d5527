//! Configuration types for the declaration protocol.

use intent_types::{Address, Bytes};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DOMAIN_NAME: &str = "IntentAccount";
pub const DEFAULT_DOMAIN_VERSION: &str = "1";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Complete protocol configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtocolConfig {
	/// EIP-712 domain fixed fields
	#[serde(default)]
	pub domain: DomainConfig,
	/// Account factory used for CREATE2 address derivation
	pub account: AccountConfig,
	/// Contracts referenced by every declaration
	pub contracts: ContractsConfig,
	/// Validator behaviour
	#[serde(default)]
	pub validation: ValidationConfig,
	/// Log output of tools embedding the protocol
	#[serde(default)]
	pub logging: LoggingConfig,
}

/// EIP-712 domain name and version of the wallet contract
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DomainConfig {
	pub name: String,
	pub version: String,
}

impl Default for DomainConfig {
	fn default() -> Self {
		Self {
			name: DEFAULT_DOMAIN_NAME.to_string(),
			version: DEFAULT_DOMAIN_VERSION.to_string(),
		}
	}
}

/// Deterministic account deployment parameters
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AccountConfig {
	/// CREATE2 deployer
	pub factory: Address,
	/// Account init code; the owner address is appended to it
	pub init_code_template: Bytes,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ContractsConfig {
	/// Target of the signed `metaDelegateCall`
	pub declaration_contract: Address,
	/// Contract implementing the segment functions
	pub segments_contract: Address,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ValidationConfig {
	/// Accept intents made only of require segments (no swap).
	#[serde(default)]
	pub allow_require_only_intents: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoggingConfig {
	/// Level name such as `info` or `debug`
	#[serde(default = "default_log_level")]
	pub level: String,
	/// Emit JSON lines instead of human-readable output
	#[serde(default)]
	pub json: bool,
}

fn default_log_level() -> String {
	DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: default_log_level(),
			json: false,
		}
	}
}
