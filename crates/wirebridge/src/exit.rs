use std::fmt;
use std::io;

use wirebridge::codec::SchemaError;
use wirebridge::rpc::RpcError;

// Process exit codes. Values follow sysexits/coreutils conventions where
// one exists.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const REMOTE_ERROR: i32 = 4;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::AddrInUse => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn rpc_error(context: &str, err: RpcError) -> CliError {
    let code = match &err {
        RpcError::Remote(_) => REMOTE_ERROR,
        RpcError::Unimplemented(_) => USAGE,
        RpcError::NativeError(_) => FAILURE,
        RpcError::ChannelUnavailable(_)
        | RpcError::ChannelClosed
        | RpcError::SendFailed(_) => TRANSPORT_ERROR,
        RpcError::Timeout(_) => TIMEOUT,
        RpcError::Codec(_) => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wirebridge::codec::ErrorRecord;

    use super::*;

    #[test]
    fn rpc_errors_map_to_stable_codes() {
        let remote = RpcError::Remote(ErrorRecord::new("code", "message"));
        assert_eq!(rpc_error("call", remote).code, REMOTE_ERROR);
        assert_eq!(
            rpc_error("call", RpcError::Timeout(Duration::from_secs(1))).code,
            TIMEOUT
        );
        assert_eq!(rpc_error("call", RpcError::ChannelClosed).code, TRANSPORT_ERROR);
        let missing = RpcError::Unimplemented(ErrorRecord::unimplemented("x"));
        assert_eq!(rpc_error("call", missing).code, USAGE);
    }

    #[test]
    fn io_errors_keep_context() {
        let err = io_error(
            "connect failed",
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert_eq!(err.to_string(), "connect failed: refused");
    }
}
