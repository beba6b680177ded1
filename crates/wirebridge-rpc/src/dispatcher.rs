use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, RwLock};

use bytes::Bytes;
use tokio::sync::oneshot;
use wirebridge_channel::{MessageHandler, Responder};
use wirebridge_codec::{Codec, ErrorRecord, Reply, Value};

type SyncHandler = Arc<dyn Fn(Vec<Value>) -> Reply + Send + Sync>;
type AsyncHandler = Arc<dyn Fn(Vec<Value>, Completion) + Send + Sync>;

#[derive(Clone)]
enum Handler {
    Sync(SyncHandler),
    Async(AsyncHandler),
}

/// Callee side of one API grouping: method name to handler.
///
/// Install it as the [`MessageHandler`] of a channel name (normally via
/// [`Session::dispatcher`](crate::Session::dispatcher)). Handlers can be
/// added and removed while calls are in flight; a call uses whichever
/// handler was registered when its request was decoded.
pub struct Dispatcher {
    api: String,
    codec: Codec,
    handlers: RwLock<HashMap<String, Handler>>,
}

impl Dispatcher {
    pub fn new(api: impl Into<String>, codec: Codec) -> Self {
        Self {
            api: api.into(),
            codec,
            handlers: RwLock::new(HashMap::new()),
        }
    }

    pub fn api(&self) -> &str {
        &self.api
    }

    /// Register a handler that returns its result on the calling thread.
    ///
    /// A panic inside the handler becomes a `native-error` reply.
    pub fn register<F>(&self, method: &str, handler: F)
    where
        F: Fn(Vec<Value>) -> Reply + Send + Sync + 'static,
    {
        self.insert(method, Handler::Sync(Arc::new(handler)));
    }

    /// Register a handler that resolves a [`Completion`] later, from any
    /// thread or task.
    pub fn register_async<F>(&self, method: &str, handler: F)
    where
        F: Fn(Vec<Value>, Completion) + Send + Sync + 'static,
    {
        self.insert(method, Handler::Async(Arc::new(handler)));
    }

    /// Register an `async` handler. Each call is spawned on the tokio
    /// runtime current at dispatch time.
    pub fn register_future<F, Fut>(&self, method: &str, handler: F)
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Reply> + Send + 'static,
    {
        self.register_async(method, move |args, completion| {
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    let call = handler(args);
                    runtime.spawn(async move {
                        completion.complete(call.await);
                    });
                }
                Err(_) => {
                    completion.reject(ErrorRecord::native_error(
                        "async handler dispatched outside a tokio runtime",
                    ));
                }
            }
        });
    }

    fn insert(&self, method: &str, handler: Handler) {
        let previous = self
            .handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(method.to_string(), handler);
        if previous.is_some() {
            tracing::debug!(api = %self.api, method, "handler replaced");
        }
    }

    /// Remove a handler. Returns whether one was registered.
    pub fn unregister(&self, method: &str) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(method)
            .is_some()
    }

    pub fn is_registered(&self, method: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        methods.sort();
        methods
    }

    /// Handle one encoded request; the encoded reply goes to `responder`.
    pub fn handle(&self, message: Bytes, responder: Responder) {
        let request = match self.codec.decode_request(&message) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(api = %self.api, error = %err, "undecodable request");
                let completion = Completion::new(self.codec.clone(), String::new(), responder);
                completion.reject(ErrorRecord::malformed_payload(&err));
                return;
            }
        };

        let handler = self
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&request.method)
            .cloned();
        let completion = Completion::new(self.codec.clone(), request.method.clone(), responder);

        let Some(handler) = handler else {
            tracing::debug!(api = %self.api, method = %request.method, "no handler registered");
            completion.reject(ErrorRecord::unimplemented(&request.method));
            return;
        };

        tracing::debug!(api = %self.api, method = %request.method, args = request.args.len(), "dispatching call");
        match handler {
            Handler::Sync(handler) => {
                let reply = dispatch_boundary(|| handler(request.args));
                completion.complete(reply);
            }
            Handler::Async(handler) => {
                let resolver = completion.clone();
                let started = dispatch_boundary(move || {
                    handler(request.args, resolver);
                    Ok(Value::Null)
                });
                if let Err(record) = started {
                    completion.reject(record);
                }
            }
        }
    }

    /// Handle one encoded request and wait for the encoded reply.
    pub async fn dispatch(&self, message: Bytes) -> Bytes {
        let (tx, rx) = oneshot::channel();
        self.handle(
            message,
            Responder::new(move |reply| {
                let _ = tx.send(reply);
            }),
        );
        rx.await.unwrap_or_default()
    }
}

impl MessageHandler for Dispatcher {
    fn on_message(&self, message: Bytes, responder: Responder) {
        self.handle(message, responder);
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("api", &self.api)
            .field("methods", &self.methods())
            .finish()
    }
}

/// Run handler code, turning a panic into a `native-error` record.
fn dispatch_boundary(f: impl FnOnce() -> Reply) -> Reply {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(reply) => reply,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(panic = %message, "handler panicked");
            Err(ErrorRecord::native_error(message))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// Single-resolution reply capability for one call.
///
/// Clones share the same call. The first `resolve`, `reject` or `complete`
/// wins; later ones are logged as protocol violations and discarded. If
/// every clone is dropped without resolving, the caller receives a
/// `native-error`.
#[derive(Clone)]
pub struct Completion {
    inner: Arc<CompletionInner>,
}

struct CompletionInner {
    method: String,
    codec: Codec,
    responder: Mutex<Option<Responder>>,
}

impl Completion {
    pub fn new(codec: Codec, method: String, responder: Responder) -> Self {
        Self {
            inner: Arc::new(CompletionInner {
                method,
                codec,
                responder: Mutex::new(Some(responder)),
            }),
        }
    }

    pub fn method(&self) -> &str {
        &self.inner.method
    }

    pub fn resolve(&self, value: impl Into<Value>) -> bool {
        self.complete(Ok(value.into()))
    }

    pub fn reject(&self, error: ErrorRecord) -> bool {
        self.complete(Err(error))
    }

    /// Deliver `reply`. Returns `false` if the call was already resolved.
    pub fn complete(&self, reply: Reply) -> bool {
        let responder = self
            .inner
            .responder
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        match responder {
            Some(responder) => {
                responder.send(self.inner.encode(reply));
                true
            }
            None => {
                tracing::warn!(
                    method = %self.inner.method,
                    "protocol violation: call resolved more than once, later result discarded"
                );
                false
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.inner
            .responder
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

impl CompletionInner {
    fn encode(&self, reply: Reply) -> Bytes {
        match self.codec.encode_reply(reply) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(method = %self.method, error = %err, "reply encoding failed");
                let record = ErrorRecord::native_error(format!("reply encoding failed: {err}"));
                self.codec.encode_reply(Err(record)).unwrap_or_default()
            }
        }
    }
}

impl Drop for CompletionInner {
    fn drop(&mut self) {
        let responder = self
            .responder
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(responder) = responder {
            tracing::warn!(method = %self.method, "completion dropped without a result");
            let record = ErrorRecord::native_error(format!(
                "handler for '{}' dropped its completion without a result",
                self.method
            ));
            responder.send(self.encode(Err(record)));
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("method", &self.inner.method)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use wirebridge_codec::codes;

    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new("TestApi", Codec::default())
    }

    async fn call(dispatcher: &Dispatcher, method: &str, args: Vec<Value>) -> Reply {
        let codec = Codec::default();
        let request = codec.encode_request(method, args).unwrap();
        let reply = dispatcher.dispatch(request).await;
        codec.decode_reply(&reply).unwrap()
    }

    #[tokio::test]
    async fn sync_handler_result_is_encoded() {
        let dispatcher = dispatcher();
        dispatcher.register("echo", |mut args| Ok(args.pop().unwrap_or_default()));
        assert_eq!(
            call(&dispatcher, "echo", vec![Value::Int(123)]).await,
            Ok(Value::Int(123))
        );
    }

    #[tokio::test]
    async fn unknown_method_is_unimplemented() {
        let dispatcher = dispatcher();
        let reply = call(&dispatcher, "missing", vec![]).await.unwrap_err();
        assert_eq!(reply.code, codes::UNIMPLEMENTED);
        assert!(reply.message.contains("missing"));
    }

    #[tokio::test]
    async fn panicking_handler_becomes_native_error() {
        let dispatcher = dispatcher();
        dispatcher.register("explode", |_| panic!("kaboom"));
        let reply = call(&dispatcher, "explode", vec![]).await.unwrap_err();
        assert_eq!(reply.code, codes::NATIVE_ERROR);
        assert_eq!(reply.message, "kaboom");

        // The dispatcher keeps working afterwards.
        dispatcher.register("ok", |_| Ok(Value::Bool(true)));
        assert_eq!(call(&dispatcher, "ok", vec![]).await, Ok(Value::Bool(true)));
    }

    #[tokio::test]
    async fn garbage_request_is_malformed_payload() {
        let dispatcher = dispatcher();
        let reply = dispatcher.dispatch(Bytes::from_static(&[5])).await;
        let record = Codec::default().decode_reply(&reply).unwrap().unwrap_err();
        assert_eq!(record.code, codes::MALFORMED_PAYLOAD);
    }

    #[tokio::test]
    async fn first_resolution_wins() {
        let dispatcher = dispatcher();
        dispatcher.register_async("twice", |_, completion| {
            assert!(completion.resolve(1i64));
            assert!(!completion.reject(ErrorRecord::new("late", "ignored")));
            assert!(!completion.resolve(2i64));
        });
        assert_eq!(call(&dispatcher, "twice", vec![]).await, Ok(Value::Int(1)));
    }

    #[tokio::test]
    async fn dropped_completion_rejects_with_native_error() {
        let dispatcher = dispatcher();
        dispatcher.register_async("forget", |_, completion| drop(completion));
        let reply = call(&dispatcher, "forget", vec![]).await.unwrap_err();
        assert_eq!(reply.code, codes::NATIVE_ERROR);
    }

    #[tokio::test]
    async fn async_handler_resolves_from_another_task() {
        let dispatcher = dispatcher();
        dispatcher.register_async("later", |args, completion| {
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                completion.resolve(Value::List(args));
            });
        });
        assert_eq!(
            call(&dispatcher, "later", vec![Value::from("a")]).await,
            Ok(Value::List(vec![Value::from("a")]))
        );
    }

    #[tokio::test]
    async fn future_handler_errors_are_returned() {
        let dispatcher = dispatcher();
        dispatcher.register_future("fail", |_| async {
            Err(ErrorRecord::new("app-error", "nope").with_details("extra"))
        });
        let record = call(&dispatcher, "fail", vec![]).await.unwrap_err();
        assert_eq!(record.code, "app-error");
        assert_eq!(record.details, Value::from("extra"));
    }

    #[tokio::test]
    async fn panic_in_future_handler_becomes_native_error() {
        let dispatcher = dispatcher();
        dispatcher.register_future("explode", |_| async { panic!("async kaboom") });
        let record = call(&dispatcher, "explode", vec![]).await.unwrap_err();
        assert_eq!(record.code, codes::NATIVE_ERROR);
    }

    #[test]
    fn registration_bookkeeping() {
        let dispatcher = dispatcher();
        dispatcher.register("b", |_| Ok(Value::Null));
        dispatcher.register("a", |_| Ok(Value::Null));
        assert_eq!(dispatcher.methods(), vec!["a".to_string(), "b".to_string()]);
        assert!(dispatcher.is_registered("a"));
        assert!(dispatcher.unregister("a"));
        assert!(!dispatcher.unregister("a"));
        assert!(!dispatcher.is_registered("a"));
    }

    #[test]
    fn future_handler_outside_runtime_is_rejected() {
        let dispatcher = dispatcher();
        dispatcher.register_future("f", |_| async { Ok(Value::Null) });
        let (tx, rx) = std::sync::mpsc::channel();
        let request = Codec::default().encode_request("f", vec![]).unwrap();
        dispatcher.handle(
            request,
            Responder::new(move |reply| {
                let _ = tx.send(reply);
            }),
        );
        let reply = rx.recv().unwrap();
        let record = Codec::default().decode_reply(&reply).unwrap().unwrap_err();
        assert_eq!(record.code, codes::NATIVE_ERROR);
    }

    #[test]
    fn unregister_during_call_keeps_in_flight_call() {
        let dispatcher = dispatcher();
        let parked: Arc<Mutex<Option<Completion>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&parked);
        dispatcher.register_async("slow", move |_, completion| {
            *slot.lock().unwrap() = Some(completion);
        });

        let codec = Codec::default();
        let (tx, rx) = std::sync::mpsc::channel();
        let responder = |tx: std::sync::mpsc::Sender<Bytes>| {
            Responder::new(move |reply| {
                let _ = tx.send(reply);
            })
        };
        let request = codec.encode_request("slow", vec![]).unwrap();

        dispatcher.handle(request.clone(), responder(tx.clone()));
        assert!(rx.try_recv().is_err());
        assert!(dispatcher.unregister("slow"));

        let completion = parked.lock().unwrap().take().unwrap();
        assert!(completion.resolve("done"));
        let first = codec.decode_reply(&rx.recv().unwrap()).unwrap();
        assert_eq!(first, Ok(Value::from("done")));

        dispatcher.handle(request, responder(tx));
        let second = codec.decode_reply(&rx.recv().unwrap()).unwrap();
        assert_eq!(second.unwrap_err().code, codes::UNIMPLEMENTED);
        assert!(parked.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn deeply_nested_arguments_are_echoed() {
        let dispatcher = dispatcher();
        dispatcher.register("echo", |mut args| Ok(args.pop().unwrap_or_default()));
        let mut deep = Value::Null;
        for _ in 0..500_000 {
            deep = Value::List(vec![deep]);
        }
        let reply = call(&dispatcher, "echo", vec![deep.clone()]).await.unwrap();
        assert_eq!(reply.depth(), 500_000);
        assert_eq!(reply, deep);
    }
}
