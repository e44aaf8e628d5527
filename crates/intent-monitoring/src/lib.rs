//! Observability for the intent declaration protocol.
//!
//! - `tracing`: subscriber setup and the spans wrapped around declaration
//!   operations (bit allocation, signing, validation)

pub mod tracing;

pub use crate::tracing::{declaration_span, init_tracing, parse_level, TracingConfig};
