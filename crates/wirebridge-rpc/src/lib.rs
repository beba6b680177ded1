//! Method dispatch and call proxies over a wirebridge [`Channel`].
//!
//! A [`Session`] binds one channel. On the callee side it installs a
//! [`Dispatcher`] per API grouping; on the caller side it hands out
//! [`Proxy`] values whose calls resolve exactly once: with the decoded
//! result, with the peer's error, or with `Timeout` / `ChannelClosed`.
//!
//! [`Channel`]: wirebridge_channel::Channel

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod proxy;
pub mod session;
pub mod stub;

pub use config::{SessionConfig, DEFAULT_CHANNEL_PREFIX};
pub use dispatcher::{Completion, Dispatcher};
pub use error::{Result, RpcError};
pub use proxy::{PendingCall, PendingCalls, Proxy};
pub use session::Session;
pub use stub::TypedCompletion;
