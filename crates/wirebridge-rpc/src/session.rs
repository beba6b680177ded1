use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use wirebridge_channel::{Channel, MessageHandler};
use wirebridge_codec::{Codec, TypeRegistry};

use crate::config::SessionConfig;
use crate::dispatcher::Dispatcher;
use crate::proxy::{PendingCalls, Proxy};

/// The dispatchers and proxies of one channel, with explicit teardown.
///
/// Independent sessions (on different channels, or with different
/// prefixes) coexist in one process without sharing any state.
pub struct Session {
    channel: Arc<dyn Channel>,
    codec: Codec,
    config: SessionConfig,
    pending: Arc<PendingCalls>,
    dispatchers: Mutex<HashMap<String, Arc<Dispatcher>>>,
    torn_down: AtomicBool,
}

impl Session {
    /// Create a session with default config.
    pub fn new(channel: Arc<dyn Channel>, registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(channel, registry, SessionConfig::default())
    }

    /// Create a session with explicit config.
    pub fn with_config(
        channel: Arc<dyn Channel>,
        registry: Arc<TypeRegistry>,
        config: SessionConfig,
    ) -> Self {
        Self {
            channel,
            codec: Codec::new(registry),
            config,
            pending: Arc::new(PendingCalls::new()),
            dispatchers: Mutex::new(HashMap::new()),
            torn_down: AtomicBool::new(false),
        }
    }

    fn dispatchers(&self) -> MutexGuard<'_, HashMap<String, Arc<Dispatcher>>> {
        self.dispatchers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The dispatcher serving `api`, installed on the channel on first use.
    pub fn dispatcher(&self, api: &str) -> Arc<Dispatcher> {
        let mut dispatchers = self.dispatchers();
        if let Some(existing) = dispatchers.get(api) {
            return Arc::clone(existing);
        }
        let dispatcher = Arc::new(Dispatcher::new(api, self.codec.clone()));
        let name = self.config.channel_name(api);
        if !self.is_torn_down() {
            let handler: Arc<dyn MessageHandler> = Arc::clone(&dispatcher) as Arc<dyn MessageHandler>;
            self.channel.set_message_handler(&name, Some(handler));
            tracing::debug!(channel = %name, "dispatcher installed");
        }
        dispatchers.insert(api.to_string(), Arc::clone(&dispatcher));
        dispatcher
    }

    /// Stop serving `api`. Returns whether it was being served.
    pub fn remove_dispatcher(&self, api: &str) -> bool {
        let removed = self.dispatchers().remove(api).is_some();
        if removed {
            self.channel
                .set_message_handler(&self.config.channel_name(api), None);
        }
        removed
    }

    /// A proxy for calling `api` on the peer.
    pub fn proxy(&self, api: &str) -> Proxy {
        Proxy::with_pending(
            Arc::clone(&self.channel),
            self.config.channel_name(api),
            self.codec.clone(),
            Arc::clone(&self.pending),
            self.config.default_timeout,
        )
    }

    pub fn channel(&self) -> &Arc<dyn Channel> {
        &self.channel
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Calls sent through this session's proxies and not yet resolved.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Served API names, sorted.
    pub fn apis(&self) -> Vec<String> {
        let mut apis: Vec<String> = self.dispatchers().keys().cloned().collect();
        apis.sort();
        apis
    }

    /// Remove every installed handler and fail pending calls with
    /// `ChannelClosed`. Idempotent. The channel itself stays open.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let apis: Vec<String> = self.dispatchers().drain().map(|(api, _)| api).collect();
        for api in &apis {
            self.channel
                .set_message_handler(&self.config.channel_name(api), None);
        }
        self.pending.fail_all();
        tracing::debug!(apis = apis.len(), "session torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wirebridge_channel::MemoryChannel;
    use wirebridge_codec::Value;

    use super::*;
    use crate::error::RpcError;

    fn pair() -> (Session, Session) {
        let (a, b) = MemoryChannel::pair();
        let registry = Arc::new(TypeRegistry::new());
        (
            Session::new(Arc::new(a), Arc::clone(&registry)),
            Session::new(Arc::new(b), registry),
        )
    }

    #[tokio::test]
    async fn proxy_reaches_dispatcher_on_peer() {
        let (host, guest) = pair();
        host.dispatcher("Api")
            .register("echo", |mut args| Ok(args.pop().unwrap_or_default()));
        let result = guest.proxy("Api").invoke("echo", vec![Value::Int(5)]).await;
        assert_eq!(result, Ok(Value::Int(5)));
    }

    #[tokio::test]
    async fn same_api_returns_same_dispatcher() {
        let (host, _guest) = pair();
        let first = host.dispatcher("Api");
        let second = host.dispatcher("Api");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(host.apis(), vec!["Api".to_string()]);
    }

    #[tokio::test]
    async fn prefixes_isolate_sessions() {
        let (a, b) = MemoryChannel::pair();
        let registry = Arc::new(TypeRegistry::new());
        let host = Session::with_config(
            Arc::new(a),
            Arc::clone(&registry),
            SessionConfig {
                channel_prefix: "one".to_string(),
                ..SessionConfig::default()
            },
        );
        host.dispatcher("Api").register("m", |_| Ok(Value::Null));
        let guest = Session::with_config(
            Arc::new(b),
            registry,
            SessionConfig {
                channel_prefix: "two".to_string(),
                ..SessionConfig::default()
            },
        );
        assert_eq!(
            guest.proxy("Api").invoke("m", vec![]).await,
            Err(RpcError::ChannelUnavailable("two.Api".to_string()))
        );
    }

    #[tokio::test]
    async fn teardown_unsets_handlers_and_fails_pending() {
        let (host, guest) = pair();
        host.dispatcher("Api")
            .register_async("hang", |_, completion| std::mem::forget(completion));
        host.dispatcher("Api").register("m", |_| Ok(Value::Null));

        let call = guest.proxy("Api").call("hang", vec![]);
        assert_eq!(guest.pending_count(), 1);
        guest.teardown();
        assert_eq!(call.wait().await, Err(RpcError::ChannelClosed));
        assert!(matches!(
            guest.proxy("Api").invoke("m", vec![]).await,
            Err(RpcError::ChannelClosed)
        ));

        host.teardown();
        assert!(host.apis().is_empty());
        let fresh = Session::new(Arc::clone(guest.channel()), Arc::new(TypeRegistry::new()));
        assert_eq!(
            fresh.proxy("Api").invoke("m", vec![]).await,
            Err(RpcError::ChannelUnavailable("wirebridge.Api".to_string()))
        );
    }

    #[tokio::test]
    async fn default_timeout_from_config() {
        let (a, b) = MemoryChannel::pair();
        let registry = Arc::new(TypeRegistry::new());
        let host = Session::new(Arc::new(a), Arc::clone(&registry));
        host.dispatcher("Api")
            .register_async("hang", |_, completion| std::mem::forget(completion));
        let guest = Session::with_config(
            Arc::new(b),
            registry,
            SessionConfig {
                default_timeout: Some(Duration::from_millis(20)),
                ..SessionConfig::default()
            },
        );
        assert_eq!(
            guest.proxy("Api").invoke("hang", vec![]).await,
            Err(RpcError::Timeout(Duration::from_millis(20)))
        );
        assert_eq!(guest.pending_count(), 0);
    }
}
