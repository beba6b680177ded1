use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;

use crate::error::{ChannelError, Result};
use crate::frame::{Frame, FrameConfig, FrameKind, WireCodec};
use crate::traits::{Channel, CorrelationId, MessageHandler, ReplySink, Responder};

/// Channel over any tokio byte stream (Unix socket, TCP, pipe, duplex).
///
/// A reader task routes inbound requests to handlers and inbound replies
/// to their sinks; a writer task drains an unbounded queue of outbound
/// frames. When either side stops (EOF, I/O error, framing error, or
/// [`Channel::close`]) every outstanding request fails with
/// [`ChannelError::Closed`].
///
/// Must be created inside a tokio runtime.
pub struct StreamChannel {
    shared: Arc<Shared>,
}

struct Shared {
    handlers: Mutex<HashMap<String, Arc<dyn MessageHandler>>>,
    outstanding: Mutex<HashMap<CorrelationId, Arc<dyn ReplySink>>>,
    next_id: AtomicU64,
    outbound: mpsc::UnboundedSender<Frame>,
    config: FrameConfig,
    closed: AtomicBool,
    cancel: CancellationToken,
}

impl StreamChannel {
    /// Wrap a connected stream with default framing limits.
    pub fn new<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        Self::with_config(stream, FrameConfig::default())
    }

    /// Wrap a connected stream with explicit framing limits.
    pub fn with_config<S>(stream: S, config: FrameConfig) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (outbound, queue) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            handlers: Mutex::new(HashMap::new()),
            outstanding: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            outbound,
            config: config.clone(),
            closed: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        });

        let (sink, frames) = Framed::new(stream, WireCodec::new(config)).split::<Frame>();
        tokio::spawn(write_loop(Arc::clone(&shared), sink, queue));
        tokio::spawn(read_loop(Arc::clone(&shared), frames));

        Self { shared }
    }

    /// Number of sent requests still waiting for a reply.
    pub fn outstanding(&self) -> usize {
        self.shared.outstanding().len()
    }

    /// Resolves once the channel has shut down for any reason.
    pub async fn closed(&self) {
        self.shared.cancel.cancelled().await
    }
}

impl Shared {
    fn handlers(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn MessageHandler>>> {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn outstanding(&self) -> MutexGuard<'_, HashMap<CorrelationId, Arc<dyn ReplySink>>> {
        self.outstanding.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn route(&self, frame: Frame) {
        match frame.kind {
            FrameKind::Request => {
                let handler = self.handlers().get(&frame.name).cloned();
                let outbound = self.outbound.clone();
                let id = frame.id;
                let responder = Responder::new(move |reply| {
                    // Fails only after shutdown; the peer is gone anyway.
                    let _ = outbound.send(Frame::reply(id, reply));
                });
                match handler {
                    Some(handler) => {
                        tracing::debug!(channel = %frame.name, %id, len = frame.payload.len(), "inbound request");
                        handler.on_message(frame.payload, responder);
                    }
                    None => {
                        tracing::debug!(channel = %frame.name, %id, "no handler for channel");
                        drop(responder);
                    }
                }
            }
            FrameKind::Reply => {
                let sink = self.outstanding().remove(&frame.id);
                match sink {
                    Some(sink) => sink.deliver(frame.id, Ok(frame.payload)),
                    None => tracing::debug!(id = %frame.id, "reply for unknown request dropped"),
                }
            }
        }
    }

    fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();
        let drained: Vec<_> = self.outstanding().drain().collect();
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "failing outstanding requests");
        }
        for (id, sink) in drained {
            sink.deliver(id, Err(ChannelError::Closed));
        }
    }
}

async fn write_loop<W>(shared: Arc<Shared>, mut sink: W, mut queue: mpsc::UnboundedReceiver<Frame>)
where
    W: futures_util::Sink<Frame, Error = crate::error::FrameError> + Unpin,
{
    loop {
        tokio::select! {
            _ = shared.cancel.cancelled() => break,
            next = queue.recv() => match next {
                Some(frame) => {
                    if let Err(err) = sink.send(frame).await {
                        tracing::error!(error = %err, "stream channel write failed");
                        break;
                    }
                }
                None => break,
            },
        }
    }
    let _ = sink.close().await;
    shared.shutdown();
}

async fn read_loop<R>(shared: Arc<Shared>, mut frames: R)
where
    R: futures_util::Stream<Item = std::result::Result<Frame, crate::error::FrameError>> + Unpin,
{
    loop {
        tokio::select! {
            _ = shared.cancel.cancelled() => break,
            next = frames.next() => match next {
                Some(Ok(frame)) => shared.route(frame),
                Some(Err(err)) => {
                    tracing::error!(error = %err, "stream channel read failed");
                    break;
                }
                None => {
                    tracing::debug!("peer closed stream");
                    break;
                }
            },
        }
    }
    shared.shutdown();
}

impl Channel for StreamChannel {
    fn next_correlation_id(&self) -> CorrelationId {
        CorrelationId(self.shared.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn send(
        &self,
        name: &str,
        id: CorrelationId,
        message: Bytes,
        sink: Arc<dyn ReplySink>,
    ) -> Result<()> {
        self.shared.config.check(name.len(), message.len())?;

        self.shared.outstanding().insert(id, sink);
        let queued = !self.shared.closed.load(Ordering::SeqCst)
            && self
                .shared
                .outbound
                .send(Frame::request(id, name, message))
                .is_ok();
        if !queued {
            // Either we withdraw the entry, or shutdown already delivered to it.
            return match self.shared.outstanding().remove(&id) {
                Some(_) => Err(ChannelError::Closed),
                None => Ok(()),
            };
        }
        Ok(())
    }

    fn set_message_handler(&self, name: &str, handler: Option<Arc<dyn MessageHandler>>) {
        let mut handlers = self.shared.handlers();
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
        self.shared.shutdown();
    }

    fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

impl Drop for StreamChannel {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}
