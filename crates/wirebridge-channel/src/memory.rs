use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use bytes::Bytes;

use crate::error::{ChannelError, Result};
use crate::traits::{Channel, CorrelationId, MessageHandler, ReplySink, Responder};

/// One side of an in-process channel pair.
///
/// Requests sent on one side run the peer's handler inline on the sending
/// thread. Handlers that reply later (from a task or another thread) are
/// supported the same way as over a real transport.
pub struct MemoryChannel {
    local: Arc<Endpoint>,
    remote: Arc<Endpoint>,
    closed: Arc<AtomicBool>,
}

#[derive(Default)]
struct Endpoint {
    handlers: Mutex<HashMap<String, Arc<dyn MessageHandler>>>,
    outstanding: Mutex<HashMap<CorrelationId, Arc<dyn ReplySink>>>,
    next_id: AtomicU64,
}

impl Endpoint {
    fn handlers(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn MessageHandler>>> {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn outstanding(&self) -> MutexGuard<'_, HashMap<CorrelationId, Arc<dyn ReplySink>>> {
        self.outstanding.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn complete(&self, id: CorrelationId, reply: Bytes) {
        let sink = self.outstanding().remove(&id);
        match sink {
            Some(sink) => sink.deliver(id, Ok(reply)),
            None => tracing::debug!(%id, "reply for closed request dropped"),
        }
    }

    fn fail_all(&self) {
        let drained: Vec<_> = self.outstanding().drain().collect();
        for (id, sink) in drained {
            sink.deliver(id, Err(ChannelError::Closed));
        }
    }
}

impl MemoryChannel {
    /// Create two connected channel ends.
    pub fn pair() -> (Self, Self) {
        let a = Arc::new(Endpoint::default());
        let b = Arc::new(Endpoint::default());
        let closed = Arc::new(AtomicBool::new(false));
        (
            Self {
                local: Arc::clone(&a),
                remote: Arc::clone(&b),
                closed: Arc::clone(&closed),
            },
            Self {
                local: b,
                remote: a,
                closed,
            },
        )
    }

    /// Number of sent requests still waiting for a reply.
    pub fn outstanding(&self) -> usize {
        self.local.outstanding().len()
    }
}

impl Channel for MemoryChannel {
    fn next_correlation_id(&self) -> CorrelationId {
        CorrelationId(self.local.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn send(
        &self,
        name: &str,
        id: CorrelationId,
        message: Bytes,
        sink: Arc<dyn ReplySink>,
    ) -> Result<()> {
        self.local.outstanding().insert(id, sink);
        if self.closed.load(Ordering::SeqCst) {
            // Either we withdraw the entry, or close already delivered to it.
            return match self.local.outstanding().remove(&id) {
                Some(_) => Err(ChannelError::Closed),
                None => Ok(()),
            };
        }

        let handler = self.remote.handlers().get(name).cloned();
        let origin: Weak<Endpoint> = Arc::downgrade(&self.local);
        let responder = Responder::new(move |reply| {
            if let Some(origin) = origin.upgrade() {
                origin.complete(id, reply);
            }
        });

        match handler {
            Some(handler) => {
                tracing::debug!(channel = name, %id, len = message.len(), "dispatching request");
                handler.on_message(message, responder);
            }
            None => {
                tracing::debug!(channel = name, %id, "no handler for channel");
                drop(responder);
            }
        }
        Ok(())
    }

    fn set_message_handler(&self, name: &str, handler: Option<Arc<dyn MessageHandler>>) {
        let mut handlers = self.local.handlers();
        match handler {
            Some(handler) => {
                handlers.insert(name.to_string(), handler);
            }
            None => {
                handlers.remove(name);
            }
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.local.fail_all();
        self.remote.fail_all();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    type Seen = Arc<Mutex<Vec<(CorrelationId, std::result::Result<Bytes, String>)>>>;

    fn recording_sink() -> (Seen, Arc<dyn ReplySink>) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);
        let sink = move |id: CorrelationId, reply: Result<Bytes>| {
            record
                .lock()
                .unwrap()
                .push((id, reply.map_err(|e| e.to_string())));
        };
        (seen, Arc::new(sink))
    }

    #[test]
    fn request_reaches_peer_handler_and_reply_returns() {
        let (a, b) = MemoryChannel::pair();
        b.set_message_handler(
            "echo",
            Some(Arc::new(|message: Bytes, responder: Responder| {
                responder.send(message)
            })),
        );

        let (seen, sink) = recording_sink();
        let id = a.next_correlation_id();
        a.send("echo", id, Bytes::from_static(b"ping"), sink).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(id, Ok(Bytes::from_static(b"ping")))]
        );
        assert_eq!(a.outstanding(), 0);
    }

    #[test]
    fn missing_handler_replies_empty() {
        let (a, _b) = MemoryChannel::pair();
        let (seen, sink) = recording_sink();
        let id = a.next_correlation_id();
        a.send("nobody", id, Bytes::from_static(b"x"), sink).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(id, Ok(Bytes::new()))]);
    }

    #[test]
    fn handlers_are_per_side() {
        let (a, b) = MemoryChannel::pair();
        a.set_message_handler("svc", Some(Arc::new(|_: Bytes, r: Responder| {
            r.send(Bytes::from_static(b"wrong side"))
        })));
        let (seen, sink) = recording_sink();
        let id = a.next_correlation_id();
        a.send("svc", id, Bytes::new(), sink).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(id, Ok(Bytes::new()))]);
    }

    #[test]
    fn close_fails_outstanding_and_rejects_new_sends() {
        let (a, b) = MemoryChannel::pair();
        let parked = Arc::new(Mutex::new(Vec::new()));
        let keep = Arc::clone(&parked);
        b.set_message_handler(
            "slow",
            Some(Arc::new(move |_: Bytes, responder: Responder| {
                keep.lock().unwrap().push(responder)
            })),
        );

        let (seen, sink) = recording_sink();
        let id = a.next_correlation_id();
        a.send("slow", id, Bytes::new(), Arc::clone(&sink)).unwrap();
        assert_eq!(a.outstanding(), 1);

        b.close();
        assert!(a.is_closed());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(id, Err("channel closed".to_string()))]
        );

        // A reply after close is dropped.
        parked.lock().unwrap().clear();
        assert_eq!(seen.lock().unwrap().len(), 1);

        let next = a.next_correlation_id();
        assert!(matches!(
            a.send("slow", next, Bytes::new(), sink),
            Err(ChannelError::Closed)
        ));
    }

    #[test]
    fn correlation_ids_are_unique_per_side() {
        let (a, _b) = MemoryChannel::pair();
        let first = a.next_correlation_id();
        let second = a.next_correlation_id();
        assert_ne!(first, second);
    }
}
