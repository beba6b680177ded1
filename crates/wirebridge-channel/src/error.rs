/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame header contains an invalid magic number.
    #[error("invalid frame magic (expected 0x5742 \"WB\")")]
    InvalidMagic,

    /// The frame kind byte is neither request nor reply.
    #[error("invalid frame kind {0}")]
    InvalidKind(u8),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The channel name exceeds the configured maximum length.
    #[error("channel name too long ({len} bytes, max {max})")]
    NameTooLong { len: usize, max: usize },

    /// The channel name is not valid UTF-8.
    #[error("channel name is not valid UTF-8")]
    InvalidName,

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by a [`Channel`](crate::Channel).
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The channel was closed locally or the peer went away.
    #[error("channel closed")]
    Closed,

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
