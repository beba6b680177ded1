use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::oneshot;
use wirebridge_channel::{Channel, ChannelError, CorrelationId, ReplySink};
use wirebridge_codec::{Codec, FromValue, Value};

use crate::error::{Result, RpcError};

type Delivery = std::result::Result<Bytes, ChannelError>;

/// Pending-call table: correlation id to the waiter of one outstanding call.
///
/// An entry is inserted before the request is sent and removed exactly
/// once: by its reply, by cancellation or timeout, or by [`PendingCalls::fail_all`].
#[derive(Default)]
pub struct PendingCalls {
    table: Mutex<Table>,
}

#[derive(Default)]
struct Table {
    entries: HashMap<CorrelationId, oneshot::Sender<Delivery>>,
    closed: bool,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn insert(&self, id: CorrelationId) -> Result<oneshot::Receiver<Delivery>> {
        let mut table = self.table();
        if table.closed {
            return Err(RpcError::ChannelClosed);
        }
        let (tx, rx) = oneshot::channel();
        table.entries.insert(id, tx);
        Ok(rx)
    }

    fn remove(&self, id: CorrelationId) -> bool {
        self.table().entries.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.table().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: CorrelationId) -> bool {
        self.table().entries.contains_key(&id)
    }

    /// Refuse new calls and resolve every waiting call with `ChannelClosed`.
    pub fn fail_all(&self) {
        let drained: Vec<_> = {
            let mut table = self.table();
            table.closed = true;
            table.entries.drain().collect()
        };
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "failing pending calls");
        }
        for (_, waiter) in drained {
            let _ = waiter.send(Err(ChannelError::Closed));
        }
    }

    pub fn is_closed(&self) -> bool {
        self.table().closed
    }
}

impl ReplySink for PendingCalls {
    fn deliver(&self, id: CorrelationId, reply: Delivery) {
        let waiter = self.table().entries.remove(&id);
        match waiter {
            Some(waiter) => {
                if waiter.send(reply).is_err() {
                    tracing::debug!(%id, "caller gone before reply");
                }
            }
            None => tracing::debug!(%id, "late reply dropped"),
        }
    }
}

impl fmt::Debug for PendingCalls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table();
        f.debug_struct("PendingCalls")
            .field("pending", &table.entries.len())
            .field("closed", &table.closed)
            .finish()
    }
}

/// Caller side of one API grouping on one channel name.
///
/// Cheap to clone; clones share the pending-call table.
#[derive(Clone)]
pub struct Proxy {
    channel: Arc<dyn Channel>,
    channel_name: String,
    codec: Codec,
    pending: Arc<PendingCalls>,
    default_timeout: Option<Duration>,
}

impl Proxy {
    /// Create a proxy with its own pending-call table and no default timeout.
    pub fn new(channel: Arc<dyn Channel>, channel_name: impl Into<String>, codec: Codec) -> Self {
        Self::with_pending(
            channel,
            channel_name.into(),
            codec,
            Arc::new(PendingCalls::new()),
            None,
        )
    }

    pub(crate) fn with_pending(
        channel: Arc<dyn Channel>,
        channel_name: String,
        codec: Codec,
        pending: Arc<PendingCalls>,
        default_timeout: Option<Duration>,
    ) -> Self {
        Self {
            channel,
            channel_name,
            codec,
            pending,
            default_timeout,
        }
    }

    /// Set the timeout used by [`PendingCall::wait`].
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Number of calls sent and not yet resolved.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: CorrelationId) -> bool {
        self.pending.contains(id)
    }

    /// Send a call. The request is on its way when this returns; await the
    /// result with [`PendingCall::wait`].
    pub fn call(&self, method: &str, args: Vec<Value>) -> PendingCall {
        let (id, state) = match self.start(method, args) {
            Ok((id, rx)) => (Some(id), CallState::Waiting(rx)),
            Err(err) => (None, CallState::Failed(err)),
        };
        PendingCall {
            id,
            state,
            method: method.to_string(),
            channel_name: self.channel_name.clone(),
            codec: self.codec.clone(),
            pending: Arc::clone(&self.pending),
            timeout: self.default_timeout,
        }
    }

    fn start(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> Result<(CorrelationId, oneshot::Receiver<Delivery>)> {
        let request = self.codec.encode_request(method, args)?;
        let id = self.channel.next_correlation_id();
        let rx = self.pending.insert(id)?;
        tracing::debug!(channel = %self.channel_name, method, %id, "sending call");

        let sink: Arc<dyn ReplySink> = Arc::clone(&self.pending) as Arc<dyn ReplySink>;
        if let Err(err) = self.channel.send(&self.channel_name, id, request, sink) {
            self.pending.remove(id);
            return Err(err.into());
        }
        Ok((id, rx))
    }

    /// Send a call and wait for its result using the default timeout.
    pub async fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        self.call(method, args).wait().await
    }

    /// Send a call and wait at most `timeout` for its result.
    pub async fn call_with_timeout(
        &self,
        method: &str,
        args: Vec<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        self.call(method, args).wait_timeout(timeout).await
    }

    /// Send a call and convert its result to `T`.
    pub async fn invoke_typed<T: FromValue>(&self, method: &str, args: Vec<Value>) -> Result<T> {
        let value = self.invoke(method, args).await?;
        T::from_value(value).map_err(RpcError::Codec)
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("channel_name", &self.channel_name)
            .field("pending", &self.pending.len())
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

enum CallState {
    Waiting(oneshot::Receiver<Delivery>),
    Failed(RpcError),
    Done,
}

/// One outstanding call.
///
/// Dropping it before the reply arrives cancels the call: the pending
/// entry is removed and a late reply is discarded. The request itself is
/// never retracted.
#[must_use = "dropping a PendingCall cancels it"]
pub struct PendingCall {
    id: Option<CorrelationId>,
    state: CallState,
    method: String,
    channel_name: String,
    codec: Codec,
    pending: Arc<PendingCalls>,
    timeout: Option<Duration>,
}

impl PendingCall {
    /// Correlation id, or `None` if the call failed before it was sent.
    pub fn id(&self) -> Option<CorrelationId> {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Wait for the result, honouring the proxy's default timeout.
    pub async fn wait(self) -> Result<Value> {
        let timeout = self.timeout;
        self.finish(timeout).await
    }

    /// Wait for the result for at most `timeout`.
    pub async fn wait_timeout(self, timeout: Duration) -> Result<Value> {
        self.finish(Some(timeout)).await
    }

    /// Stop waiting. A reply that arrives later is discarded.
    pub fn cancel(mut self) {
        self.forget();
    }

    fn forget(&mut self) {
        if let Some(id) = self.id.take() {
            if self.pending.remove(id) {
                tracing::debug!(method = %self.method, %id, "call cancelled");
            }
        }
        self.state = CallState::Done;
    }

    async fn finish(mut self, timeout: Option<Duration>) -> Result<Value> {
        let rx = match std::mem::replace(&mut self.state, CallState::Done) {
            CallState::Waiting(rx) => rx,
            CallState::Failed(err) => return Err(err),
            CallState::Done => return Err(RpcError::ChannelClosed),
        };

        let delivery = match timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(delivery) => delivery,
                Err(_) => {
                    self.forget();
                    tracing::debug!(method = %self.method, ?limit, "call timed out");
                    return Err(RpcError::Timeout(limit));
                }
            },
            None => rx.await,
        };
        // The entry left the table when the delivery was made.
        self.id = None;

        let reply = match delivery {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => return Err(RpcError::ChannelClosed),
        };
        if reply.is_empty() {
            return Err(RpcError::ChannelUnavailable(self.channel_name.clone()));
        }
        match self.codec.decode_reply(&reply)? {
            Ok(value) => Ok(value),
            Err(record) => Err(RpcError::from_record(record)),
        }
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        self.forget();
    }
}

impl fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("id", &self.id)
            .field("method", &self.method)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use wirebridge_channel::{MemoryChannel, Responder};

    use super::*;

    fn parked_server() -> (Proxy, Arc<Mutex<Vec<Responder>>>, MemoryChannel) {
        let (client, server) = MemoryChannel::pair();
        let parked = Arc::new(Mutex::new(Vec::new()));
        let keep = Arc::clone(&parked);
        server.set_message_handler(
            "svc",
            Some(Arc::new(move |_: Bytes, responder: Responder| {
                keep.lock().unwrap().push(responder);
            })),
        );
        let proxy = Proxy::new(Arc::new(client), "svc", Codec::default());
        (proxy, parked, server)
    }

    fn reply_ok(responder: Responder, value: Value) {
        responder.send(Codec::default().encode_reply(Ok(value)).unwrap());
    }

    #[tokio::test]
    async fn cancel_removes_entry_and_drops_late_reply() {
        let (proxy, parked, _server) = parked_server();
        let call = proxy.call("m", vec![]);
        let id = call.id().unwrap();
        assert!(proxy.is_pending(id));

        call.cancel();
        assert!(!proxy.is_pending(id));
        assert_eq!(proxy.pending_count(), 0);

        let responder = parked.lock().unwrap().pop().unwrap();
        reply_ok(responder, Value::Int(1));
        assert_eq!(proxy.pending_count(), 0);
    }

    #[tokio::test]
    async fn timeout_removes_entry() {
        let (proxy, parked, _server) = parked_server();
        let call = proxy.call("m", vec![]);
        let id = call.id().unwrap();
        let err = call.wait_timeout(Duration::from_millis(20)).await.unwrap_err();
        assert_eq!(err, RpcError::Timeout(Duration::from_millis(20)));
        assert!(!proxy.is_pending(id));

        let responder = parked.lock().unwrap().pop().unwrap();
        reply_ok(responder, Value::Int(1));
        assert_eq!(proxy.pending_count(), 0);
    }

    #[tokio::test]
    async fn default_timeout_applies_to_wait() {
        let (proxy, _parked, _server) = parked_server();
        let proxy = proxy.with_timeout(Some(Duration::from_millis(10)));
        assert!(matches!(
            proxy.invoke("m", vec![]).await,
            Err(RpcError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn dropping_pending_call_cancels_it() {
        let (proxy, _parked, _server) = parked_server();
        let call = proxy.call("m", vec![]);
        assert_eq!(proxy.pending_count(), 1);
        drop(call);
        assert_eq!(proxy.pending_count(), 0);
    }

    #[tokio::test]
    async fn channel_close_resolves_with_channel_closed() {
        let (proxy, _parked, server) = parked_server();
        let call = proxy.call("m", vec![]);
        server.close();
        assert_eq!(call.wait().await, Err(RpcError::ChannelClosed));
        assert!(matches!(
            proxy.invoke("m", vec![]).await,
            Err(RpcError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn fail_all_rejects_waiters_and_new_calls() {
        let (proxy, _parked, _server) = parked_server();
        let call = proxy.call("m", vec![]);
        proxy.pending.fail_all();
        assert_eq!(call.wait().await, Err(RpcError::ChannelClosed));
        let refused = proxy.call("m", vec![]);
        assert!(refused.id().is_none());
        assert_eq!(refused.wait().await, Err(RpcError::ChannelClosed));
    }

    #[tokio::test]
    async fn empty_reply_means_channel_unavailable() {
        let (client, _server) = MemoryChannel::pair();
        let proxy = Proxy::new(Arc::new(client), "nobody.Home", Codec::default());
        assert_eq!(
            proxy.invoke("m", vec![]).await,
            Err(RpcError::ChannelUnavailable("nobody.Home".to_string()))
        );
    }

    #[tokio::test]
    async fn garbage_reply_is_codec_error() {
        let (proxy, parked, _server) = parked_server();
        let call = proxy.call("m", vec![]);
        let responder = parked.lock().unwrap().pop().unwrap();
        responder.send(Bytes::from_static(&[200]));
        assert_eq!(
            call.wait().await,
            Err(RpcError::Codec(wirebridge_codec::CodecError::UnknownTypeId(200)))
        );
    }

    #[tokio::test]
    async fn unencodable_arguments_fail_before_sending() {
        let (proxy, parked, _server) = parked_server();
        let bad = Value::Composite(wirebridge_codec::Composite::new(250, vec![]));
        let call = proxy.call("m", vec![bad]);
        assert!(call.id().is_none());
        assert!(matches!(call.wait().await, Err(RpcError::Codec(_))));
        assert!(parked.lock().unwrap().is_empty());
    }
}
