//! Stateful generation context over a [`GenerationEngine`].
//!
//! `GenerationContext` sequences the boundary protocol: bind a rule package,
//! select a rule file and start rule, expose the typed attribute snapshot,
//! run a generation, and copy the result buffers out into owned host records
//! before releasing them.
//!
//! [`GenerationEngine`]: arbor_engine::GenerationEngine

mod context;

pub use context::{BridgeError, GenerationContext, GenerationResult};
