use std::time::Duration;

use wirebridge_channel::ChannelError;
use wirebridge_codec::{codes, CodecError, ErrorRecord};

/// Caller-visible outcome of a failed call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RpcError {
    /// The handler rejected the call with an application error.
    #[error("remote error {0}")]
    Remote(ErrorRecord),

    /// The peer has no handler for the method.
    #[error("unimplemented: {}", .0.message)]
    Unimplemented(ErrorRecord),

    /// The handler faulted or never resolved.
    #[error("native error: {}", .0.message)]
    NativeError(ErrorRecord),

    /// Nothing is listening on the channel name.
    #[error("unable to establish connection on channel '{0}'")]
    ChannelUnavailable(String),

    /// No reply arrived in time.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    /// The channel or session shut down before the reply arrived.
    #[error("channel closed")]
    ChannelClosed,

    /// The channel refused the request for a reason other than closure.
    #[error("send failed: {0}")]
    SendFailed(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl RpcError {
    /// Classify an error reply by its code.
    pub fn from_record(record: ErrorRecord) -> Self {
        match record.code.as_str() {
            codes::UNIMPLEMENTED => RpcError::Unimplemented(record),
            codes::NATIVE_ERROR => RpcError::NativeError(record),
            _ => RpcError::Remote(record),
        }
    }

    /// The error record carried by the reply, if the failure came from the peer.
    pub fn record(&self) -> Option<&ErrorRecord> {
        match self {
            RpcError::Remote(record)
            | RpcError::Unimplemented(record)
            | RpcError::NativeError(record) => Some(record),
            _ => None,
        }
    }

    /// Stable short code for logs and CLI output.
    pub fn code(&self) -> &str {
        match self {
            RpcError::Remote(record)
            | RpcError::Unimplemented(record)
            | RpcError::NativeError(record) => &record.code,
            RpcError::ChannelUnavailable(_) => "channel-unavailable",
            RpcError::Timeout(_) => "timeout",
            RpcError::ChannelClosed => "channel-closed",
            RpcError::SendFailed(_) => "send-failed",
            RpcError::Codec(_) => codes::MALFORMED_PAYLOAD,
        }
    }
}

impl From<ChannelError> for RpcError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Closed => RpcError::ChannelClosed,
            other => RpcError::SendFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;
