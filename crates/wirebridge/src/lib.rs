//! Typed cross-runtime method calls over named message channels.
//!
//! wirebridge carries method calls between two runtimes that share a
//! message channel: values are encoded with a compact tagged binary
//! codec, calls travel as request/reply envelopes, and each side
//! exposes its APIs through dispatchers and reaches the peer's APIs
//! through proxies.
//!
//! # Crate Structure
//!
//! - [`codec`]: Value model, tagged codec, schema registry, call envelopes
//! - [`channel`]: Channel abstraction, in-memory pairs, framed byte streams
//! - [`rpc`]: Dispatchers, proxies and per-channel sessions
//! - [`integration`]: Generated stubs for the integration-test API surface

/// Re-export codec types.
pub mod codec {
    pub use wirebridge_codec::*;
}

/// Re-export channel types.
pub mod channel {
    pub use wirebridge_channel::*;
}

/// Re-export rpc types.
pub mod rpc {
    pub use wirebridge_rpc::*;
}

pub mod integration;
