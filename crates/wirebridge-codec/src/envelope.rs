//! Request and reply envelopes.
//!
//! ```text
//! request := List[String(method), List(args)]
//! reply   := List[payload]                          ; success
//!          | List[String(code), String|Null, details] ; error
//! ```
//! The list length alone tells success from error.

use bytes::Bytes;

use crate::codec::Codec;
use crate::error::{CodecError, Result};
use crate::value::Value;

/// Well-known error codes produced by the runtime itself.
pub mod codes {
    /// No handler is registered for the requested method.
    pub const UNIMPLEMENTED: &str = "unimplemented";
    /// A handler faulted or dropped its completion without resolving.
    pub const NATIVE_ERROR: &str = "native-error";
    /// The request could not be decoded.
    pub const MALFORMED_PAYLOAD: &str = "malformed-payload";
}

/// Structured failure carried in an error reply.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ErrorRecord {
    pub code: String,
    pub message: String,
    pub details: Value,
}

impl ErrorRecord {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn with_details(mut self, details: impl Into<Value>) -> Self {
        self.details = details.into();
        self
    }

    pub fn unimplemented(method: &str) -> Self {
        Self::new(
            codes::UNIMPLEMENTED,
            format!("no handler registered for '{method}'"),
        )
    }

    pub fn native_error(message: impl Into<String>) -> Self {
        Self::new(codes::NATIVE_ERROR, message)
    }

    pub fn malformed_payload(err: &CodecError) -> Self {
        Self::new(codes::MALFORMED_PAYLOAD, err.to_string())
    }
}

/// Outcome of one call as carried by a reply envelope.
pub type Reply = std::result::Result<Value, ErrorRecord>;

/// A decoded request envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    pub args: Vec<Value>,
}

impl Codec {
    pub fn encode_request(&self, method: &str, args: Vec<Value>) -> Result<Bytes> {
        self.encode(&Value::List(vec![
            Value::String(method.to_string()),
            Value::List(args),
        ]))
    }

    pub fn decode_request(&self, src: &[u8]) -> Result<Request> {
        let items = self
            .decode(src)?
            .into_list()
            .map_err(|_| malformed("request envelope is not a list"))?;
        let [method, args]: [Value; 2] = items.try_into().map_err(|items: Vec<Value>| {
            malformed(&format!(
                "request envelope has {} elements, expected 2",
                items.len()
            ))
        })?;
        let method = method
            .into_string()
            .map_err(|_| malformed("request method name is not a string"))?;
        let args = args
            .into_list()
            .map_err(|_| malformed("request arguments are not a list"))?;
        Ok(Request { method, args })
    }

    pub fn encode_reply(&self, reply: Reply) -> Result<Bytes> {
        let envelope = match reply {
            Ok(payload) => vec![payload],
            Err(record) => vec![
                Value::String(record.code),
                Value::String(record.message),
                record.details,
            ],
        };
        self.encode(&Value::List(envelope))
    }

    pub fn decode_reply(&self, src: &[u8]) -> Result<Reply> {
        let items = self
            .decode(src)?
            .into_list()
            .map_err(|_| malformed("reply envelope is not a list"))?;
        let len = items.len();
        let mut items = items.into_iter();
        match (len, items.next(), items.next(), items.next()) {
            (1, Some(payload), None, None) => Ok(Ok(payload)),
            (3, Some(code), Some(message), Some(details)) => {
                let code = code
                    .into_string()
                    .map_err(|_| malformed("error reply code is not a string"))?;
                let message = match message.into_string() {
                    Ok(message) => message,
                    Err(Value::Null) => String::new(),
                    Err(_) => return Err(malformed("error reply message is not a string")),
                };
                Ok(Err(ErrorRecord {
                    code,
                    message,
                    details,
                }))
            }
            _ => Err(malformed(&format!(
                "reply envelope has {len} elements, expected 1 or 3"
            ))),
        }
    }
}

fn malformed(message: &str) -> CodecError {
    CodecError::MalformedPayload(message.to_string())
}
