//! Shared types for the intent declaration protocol.
//!
//! This crate holds the value types that flow between the segment builders,
//! the EIP-712 signer and the validator, the JSON wire payload of a signed
//! declaration, the error taxonomy and the chain read port.

pub mod chain;
pub mod common;
pub mod errors;
pub mod validation;
pub mod wire;

pub mod implementations {
	pub mod memory;
}

pub use chain::*;
pub use common::*;
pub use errors::*;
pub use validation::*;
pub use wire::*;
