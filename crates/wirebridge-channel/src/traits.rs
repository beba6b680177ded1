use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;

/// Pairs one request with its reply. Allocated by the channel that
/// carries the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(pub u64);

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receives the reply (or the failure) for a request sent with
/// [`Channel::send`].
///
/// Every accepted send gets exactly one `deliver`.
pub trait ReplySink: Send + Sync {
    fn deliver(&self, id: CorrelationId, reply: Result<Bytes>);
}

impl<F> ReplySink for F
where
    F: Fn(CorrelationId, Result<Bytes>) + Send + Sync,
{
    fn deliver(&self, id: CorrelationId, reply: Result<Bytes>) {
        self(id, reply)
    }
}

/// Callee side of a named channel.
pub trait MessageHandler: Send + Sync {
    /// Handle one inbound request. The reply goes through `responder`,
    /// now or later, from any thread.
    fn on_message(&self, message: Bytes, responder: Responder);
}

impl<F> MessageHandler for F
where
    F: Fn(Bytes, Responder) + Send + Sync,
{
    fn on_message(&self, message: Bytes, responder: Responder) {
        self(message, responder)
    }
}

type ReplyFn = Box<dyn FnOnce(Bytes) + Send>;

/// Single-shot reply capability handed to a [`MessageHandler`].
///
/// Dropping it without calling [`Responder::send`] replies with an empty
/// message, so the caller is never left waiting.
pub struct Responder {
    reply: Option<ReplyFn>,
}

impl Responder {
    pub fn new<F>(reply: F) -> Self
    where
        F: FnOnce(Bytes) + Send + 'static,
    {
        Self {
            reply: Some(Box::new(reply)),
        }
    }

    /// Send the reply. Consumes the responder.
    pub fn send(mut self, reply: Bytes) {
        if let Some(send) = self.reply.take() {
            send(reply);
        }
    }
}

impl Drop for Responder {
    fn drop(&mut self) {
        if let Some(send) = self.reply.take() {
            tracing::debug!("responder dropped without reply, sending empty reply");
            send(Bytes::new());
        }
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("pending", &self.reply.is_some())
            .finish()
    }
}

/// A named, ordered, reliable request/reply message channel.
///
/// Names multiplex independent handlers over one channel. The channel
/// keeps per-request correlation; the RPC layer only needs to allocate an
/// id before sending so it can register interest first.
pub trait Channel: Send + Sync {
    /// Allocate a correlation id for the next [`Channel::send`].
    fn next_correlation_id(&self) -> CorrelationId;

    /// Send a request on `name`. On `Ok`, `sink` sees exactly one delivery
    /// for `id`: the reply, or [`ChannelError::Closed`](crate::ChannelError::Closed).
    fn send(&self, name: &str, id: CorrelationId, message: Bytes, sink: Arc<dyn ReplySink>)
        -> Result<()>;

    /// Install or (with `None`) remove the handler for `name`.
    fn set_message_handler(&self, name: &str, handler: Option<Arc<dyn MessageHandler>>);

    /// Close the channel and fail every outstanding request.
    fn close(&self);

    fn is_closed(&self) -> bool;
}
