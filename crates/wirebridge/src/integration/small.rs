//! Minimal API groupings: a one-method host API, a two-method async host
//! API and a small peer API.
//!
//! Each can be installed more than once on a session under a suffix, so
//! that independent instances of the same API do not collide.

use std::sync::Arc;

use wirebridge_codec::{ErrorRecord, IntoValue, Value};
use wirebridge_rpc::{Dispatcher, Proxy, Result, Session, TypedCompletion};

use super::glue::{api_name, nullary, nullary_async, unary, unary_async};
use super::types::TestMessage;

pub const HOST_TRIVIAL_API: &str = "HostTrivialApi";
pub const HOST_SMALL_API: &str = "HostSmallApi";
pub const PEER_SMALL_API: &str = "PeerSmallApi";

pub trait HostTrivialApi: Send + Sync {
    fn noop(&self) -> std::result::Result<(), ErrorRecord>;
}

/// Asynchronous host API; both methods complete through a [`TypedCompletion`].
pub trait HostSmallApi: Send + Sync {
    fn echo(&self, a_string: String, completion: TypedCompletion<String>);
    fn void_void(&self, completion: TypedCompletion<()>);
}

pub trait PeerSmallApi: Send + Sync {
    fn echo_wrapped_list(&self, msg: TestMessage) -> std::result::Result<TestMessage, ErrorRecord>;
    fn echo_string(&self, a_string: String) -> std::result::Result<String, ErrorRecord>;
}

pub fn set_up_host_trivial_api<A>(session: &Session, suffix: &str, api: Arc<A>) -> Arc<Dispatcher>
where
    A: HostTrivialApi + 'static,
{
    let d = session.dispatcher(&api_name(HOST_TRIVIAL_API, suffix));
    nullary(&d, &api, "noop", A::noop);
    d
}

pub fn set_up_host_small_api<A>(session: &Session, suffix: &str, api: Arc<A>) -> Arc<Dispatcher>
where
    A: HostSmallApi + 'static,
{
    let d = session.dispatcher(&api_name(HOST_SMALL_API, suffix));
    unary_async(&d, &api, "echo", "aString", A::echo);
    nullary_async(&d, &api, "voidVoid", A::void_void);
    d
}

pub fn set_up_peer_small_api<A>(session: &Session, suffix: &str, api: Arc<A>) -> Arc<Dispatcher>
where
    A: PeerSmallApi + 'static,
{
    let d = session.dispatcher(&api_name(PEER_SMALL_API, suffix));
    unary(&d, &api, "echoWrappedList", "msg", A::echo_wrapped_list);
    unary(&d, &api, "echoString", "aString", A::echo_string);
    d
}

#[derive(Debug, Clone)]
pub struct HostTrivialApiProxy {
    proxy: Proxy,
}

impl HostTrivialApiProxy {
    pub fn new(session: &Session, suffix: &str) -> Self {
        Self {
            proxy: session.proxy(&api_name(HOST_TRIVIAL_API, suffix)),
        }
    }

    pub async fn noop(&self) -> Result<()> {
        self.proxy.invoke_typed("noop", Vec::new()).await
    }
}

#[derive(Debug, Clone)]
pub struct HostSmallApiProxy {
    proxy: Proxy,
}

impl HostSmallApiProxy {
    pub fn new(session: &Session, suffix: &str) -> Self {
        Self {
            proxy: session.proxy(&api_name(HOST_SMALL_API, suffix)),
        }
    }

    pub async fn echo(&self, a_string: &str) -> Result<String> {
        self.proxy
            .invoke_typed("echo", vec![Value::from(a_string)])
            .await
    }

    pub async fn void_void(&self) -> Result<()> {
        self.proxy.invoke_typed("voidVoid", Vec::new()).await
    }
}

#[derive(Debug, Clone)]
pub struct PeerSmallApiProxy {
    proxy: Proxy,
}

impl PeerSmallApiProxy {
    pub fn new(session: &Session, suffix: &str) -> Self {
        Self {
            proxy: session.proxy(&api_name(PEER_SMALL_API, suffix)),
        }
    }

    pub async fn echo_wrapped_list(&self, msg: TestMessage) -> Result<TestMessage> {
        self.proxy
            .invoke_typed("echoWrappedList", vec![msg.into_value()])
            .await
    }

    pub async fn echo_string(&self, a_string: &str) -> Result<String> {
        self.proxy
            .invoke_typed("echoString", vec![Value::from(a_string)])
            .await
    }
}
