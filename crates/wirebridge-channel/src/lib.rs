//! Named request/reply channels.
//!
//! A [`Channel`] carries whole messages addressed by name and keeps each
//! request paired with its reply through a [`CorrelationId`]. Two
//! implementations are provided:
//!
//! - [`MemoryChannel`]: an in-process pair, handlers run inline.
//! - [`StreamChannel`] (feature `stream`): frames over any tokio byte
//!   stream. Every frame carries:
//!   - a 2-byte magic number ("WB") for stream synchronization
//!   - a kind byte (request or reply) and a 64-bit correlation id
//!   - length-prefixed channel name and payload

pub mod error;
pub mod frame;
pub mod memory;
#[cfg(feature = "stream")]
pub mod stream;
pub mod traits;

pub use error::{ChannelError, FrameError, Result};
#[cfg(feature = "stream")]
pub use frame::WireCodec;
pub use frame::{
    decode_frame, encode_frame, Frame, FrameConfig, FrameKind, DEFAULT_MAX_NAME_LEN,
    DEFAULT_MAX_PAYLOAD, HEADER_SIZE,
};
pub use memory::MemoryChannel;
#[cfg(feature = "stream")]
pub use stream::StreamChannel;
pub use traits::{Channel, CorrelationId, MessageHandler, ReplySink, Responder};
