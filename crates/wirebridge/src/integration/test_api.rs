//! Reference implementations used by the integration tests, the CLI
//! `serve` command and the demos.

use std::sync::Arc;

use bytes::Bytes;
use wirebridge_codec::{ErrorRecord, Value};
use wirebridge_rpc::{Session, TypedCompletion};

use super::glue::forward;
use super::host::HostIntegrationCoreApi;
use super::peer::{PeerIntegrationCoreApi, PeerIntegrationCoreApiProxy};
use super::small::{HostSmallApi, HostTrivialApi, PeerSmallApi};
use super::types::{
    AllClassesWrapper, AllNullableTypes, AllNullableTypesWithoutRecursion, AllTypes, AnEnum,
    Map, TestMessage,
};

type Reply<T> = std::result::Result<T, ErrorRecord>;

fn sample_error() -> ErrorRecord {
    ErrorRecord::new("code", "message").with_details("details")
}

fn peer_error() -> ErrorRecord {
    ErrorRecord::new("peer-code", "peer error")
}

/// Host API that echoes its arguments and forwards `callPeer*` methods
/// to the peer's `PeerIntegrationCoreApi`.
#[derive(Debug, Clone)]
pub struct TestHostApi {
    peer: PeerIntegrationCoreApiProxy,
}

impl TestHostApi {
    pub fn new(session: &Session) -> Self {
        Self {
            peer: PeerIntegrationCoreApiProxy::new(session),
        }
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl HostIntegrationCoreApi for TestHostApi {
    fn noop(&self) -> Reply<()> {
        Ok(())
    }

    fn echo_all_types(&self, everything: AllTypes) -> Reply<AllTypes> {
        Ok(everything)
    }

    fn echo_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
    ) -> Reply<Option<AllNullableTypes>> {
        Ok(everything)
    }

    fn throw_error(&self) -> Reply<Value> {
        Err(sample_error())
    }

    fn throw_error_from_void(&self) -> Reply<()> {
        Err(sample_error())
    }

    fn throw_structured_error(&self) -> Reply<Value> {
        Err(sample_error())
    }

    fn echo_int(&self, an_int: i64) -> Reply<i64> {
        Ok(an_int)
    }

    fn echo_double(&self, a_double: f64) -> Reply<f64> {
        Ok(a_double)
    }

    fn echo_bool(&self, a_bool: bool) -> Reply<bool> {
        Ok(a_bool)
    }

    fn echo_string(&self, a_string: String) -> Reply<String> {
        Ok(a_string)
    }

    fn echo_uint8_list(&self, a_uint8_list: Bytes) -> Reply<Bytes> {
        Ok(a_uint8_list)
    }

    fn echo_object(&self, an_object: Value) -> Reply<Value> {
        Ok(an_object)
    }

    fn echo_list(&self, list: Vec<Value>) -> Reply<Vec<Value>> {
        Ok(list)
    }

    fn echo_map(&self, a_map: Map) -> Reply<Map> {
        Ok(a_map)
    }

    fn echo_class_wrapper(&self, wrapper: AllClassesWrapper) -> Reply<AllClassesWrapper> {
        Ok(wrapper)
    }

    fn echo_enum(&self, an_enum: AnEnum) -> Reply<AnEnum> {
        Ok(an_enum)
    }

    fn extract_nested_nullable_string(&self, wrapper: AllClassesWrapper) -> Reply<Option<String>> {
        Ok(wrapper.all_nullable_types.a_nullable_string)
    }

    fn create_nested_nullable_string(
        &self,
        nullable_string: Option<String>,
    ) -> Reply<AllClassesWrapper> {
        Ok(AllClassesWrapper {
            all_nullable_types: AllNullableTypes {
                a_nullable_string: nullable_string,
                ..AllNullableTypes::default()
            },
            all_nullable_types_without_recursion: None,
            all_types: None,
        })
    }

    fn send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Reply<AllNullableTypes> {
        Ok(AllNullableTypes {
            a_nullable_bool,
            a_nullable_int,
            a_nullable_string,
            ..AllNullableTypes::default()
        })
    }

    fn echo_nullable_int(&self, a_nullable_int: Option<i64>) -> Reply<Option<i64>> {
        Ok(a_nullable_int)
    }

    fn echo_nullable_double(&self, a_nullable_double: Option<f64>) -> Reply<Option<f64>> {
        Ok(a_nullable_double)
    }

    fn echo_nullable_bool(&self, a_nullable_bool: Option<bool>) -> Reply<Option<bool>> {
        Ok(a_nullable_bool)
    }

    fn echo_nullable_string(&self, a_nullable_string: Option<String>) -> Reply<Option<String>> {
        Ok(a_nullable_string)
    }

    fn echo_nullable_uint8_list(
        &self,
        a_nullable_uint8_list: Option<Bytes>,
    ) -> Reply<Option<Bytes>> {
        Ok(a_nullable_uint8_list)
    }

    fn echo_nullable_object(&self, a_nullable_object: Value) -> Reply<Value> {
        Ok(a_nullable_object)
    }

    fn echo_nullable_list(&self, a_nullable_list: Option<Vec<Value>>) -> Reply<Option<Vec<Value>>> {
        Ok(a_nullable_list)
    }

    fn echo_nullable_map(&self, a_nullable_map: Option<Map>) -> Reply<Option<Map>> {
        Ok(a_nullable_map)
    }

    fn echo_nullable_enum(&self, an_enum: Option<AnEnum>) -> Reply<Option<AnEnum>> {
        Ok(an_enum)
    }

    fn echo_named_default_string(&self, a_string: String) -> Reply<String> {
        Ok(a_string)
    }

    fn echo_optional_default_double(&self, a_double: f64) -> Reply<f64> {
        Ok(a_double)
    }

    fn echo_required_int(&self, an_int: i64) -> Reply<i64> {
        Ok(an_int)
    }

    fn echo_all_nullable_types_without_recursion(
        &self,
        everything: Option<AllNullableTypesWithoutRecursion>,
    ) -> Reply<Option<AllNullableTypesWithoutRecursion>> {
        Ok(everything)
    }

    fn send_multiple_nullable_types_without_recursion(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Reply<AllNullableTypesWithoutRecursion> {
        Ok(AllNullableTypesWithoutRecursion {
            a_nullable_bool,
            a_nullable_int,
            a_nullable_string,
            ..AllNullableTypesWithoutRecursion::default()
        })
    }

    fn echo_optional_nullable_int(&self, a_nullable_int: Option<i64>) -> Reply<Option<i64>> {
        Ok(a_nullable_int)
    }

    fn echo_named_nullable_string(
        &self,
        a_nullable_string: Option<String>,
    ) -> Reply<Option<String>> {
        Ok(a_nullable_string)
    }

    fn noop_async(&self, completion: TypedCompletion<()>) {
        completion.resolve(());
    }

    fn echo_async_int(&self, an_int: i64, completion: TypedCompletion<i64>) {
        completion.resolve(an_int);
    }

    fn echo_async_double(&self, a_double: f64, completion: TypedCompletion<f64>) {
        completion.resolve(a_double);
    }

    fn echo_async_bool(&self, a_bool: bool, completion: TypedCompletion<bool>) {
        completion.resolve(a_bool);
    }

    fn echo_async_string(&self, a_string: String, completion: TypedCompletion<String>) {
        completion.resolve(a_string);
    }

    fn echo_async_uint8_list(&self, a_uint8_list: Bytes, completion: TypedCompletion<Bytes>) {
        completion.resolve(a_uint8_list);
    }

    fn echo_async_object(&self, an_object: Value, completion: TypedCompletion<Value>) {
        completion.resolve(an_object);
    }

    fn echo_async_list(&self, list: Vec<Value>, completion: TypedCompletion<Vec<Value>>) {
        completion.resolve(list);
    }

    fn echo_async_map(&self, a_map: Map, completion: TypedCompletion<Map>) {
        completion.resolve(a_map);
    }

    fn echo_async_enum(&self, an_enum: AnEnum, completion: TypedCompletion<AnEnum>) {
        completion.resolve(an_enum);
    }

    fn echo_async_all_types(&self, everything: AllTypes, completion: TypedCompletion<AllTypes>) {
        completion.resolve(everything);
    }

    fn echo_async_nullable_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
        completion: TypedCompletion<Option<AllNullableTypes>>,
    ) {
        completion.resolve(everything);
    }

    fn echo_async_nullable_int(&self, an_int: Option<i64>, completion: TypedCompletion<Option<i64>>) {
        completion.resolve(an_int);
    }

    fn echo_async_nullable_string(
        &self,
        a_string: Option<String>,
        completion: TypedCompletion<Option<String>>,
    ) {
        completion.resolve(a_string);
    }

    fn echo_async_nullable_double(
        &self,
        a_double: Option<f64>,
        completion: TypedCompletion<Option<f64>>,
    ) {
        completion.resolve(a_double);
    }

    fn echo_async_nullable_bool(&self, a_bool: Option<bool>, completion: TypedCompletion<Option<bool>>) {
        completion.resolve(a_bool);
    }

    fn echo_async_nullable_uint8_list(
        &self,
        a_uint8_list: Option<Bytes>,
        completion: TypedCompletion<Option<Bytes>>,
    ) {
        completion.resolve(a_uint8_list);
    }

    fn echo_async_nullable_object(&self, an_object: Value, completion: TypedCompletion<Value>) {
        completion.resolve(an_object);
    }

    fn echo_async_nullable_list(
        &self,
        list: Option<Vec<Value>>,
        completion: TypedCompletion<Option<Vec<Value>>>,
    ) {
        completion.resolve(list);
    }

    fn echo_async_nullable_map(&self, a_map: Option<Map>, completion: TypedCompletion<Option<Map>>) {
        completion.resolve(a_map);
    }

    fn echo_async_nullable_enum(
        &self,
        an_enum: Option<AnEnum>,
        completion: TypedCompletion<Option<AnEnum>>,
    ) {
        completion.resolve(an_enum);
    }

    fn echo_async_nullable_all_nullable_types_without_recursion(
        &self,
        everything: Option<AllNullableTypesWithoutRecursion>,
        completion: TypedCompletion<Option<AllNullableTypesWithoutRecursion>>,
    ) {
        completion.resolve(everything);
    }

    fn throw_async_error(&self, completion: TypedCompletion<Value>) {
        completion.reject(sample_error());
    }

    fn throw_async_error_from_void(&self, completion: TypedCompletion<()>) {
        completion.reject(sample_error());
    }

    fn throw_async_structured_error(&self, completion: TypedCompletion<Value>) {
        completion.reject(sample_error());
    }

    fn call_peer_noop(&self, completion: TypedCompletion<()>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.noop().await });
    }

    fn call_peer_throw_error(&self, completion: TypedCompletion<Value>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.throw_error().await });
    }

    fn call_peer_throw_error_from_void(&self, completion: TypedCompletion<()>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.throw_error_from_void().await });
    }

    fn call_peer_echo_all_types(&self, everything: AllTypes, completion: TypedCompletion<AllTypes>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_all_types(everything).await });
    }

    fn call_peer_echo_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
        completion: TypedCompletion<Option<AllNullableTypes>>,
    ) {
        let peer = self.peer.clone();
        forward(completion, async move {
            peer.echo_all_nullable_types(everything).await
        });
    }

    fn call_peer_send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
        completion: TypedCompletion<AllNullableTypes>,
    ) {
        let peer = self.peer.clone();
        forward(completion, async move {
            peer.send_multiple_nullable_types(a_nullable_bool, a_nullable_int, a_nullable_string)
                .await
        });
    }

    fn call_peer_echo_all_nullable_types_without_recursion(
        &self,
        everything: Option<AllNullableTypesWithoutRecursion>,
        completion: TypedCompletion<Option<AllNullableTypesWithoutRecursion>>,
    ) {
        let peer = self.peer.clone();
        forward(completion, async move {
            peer.echo_all_nullable_types_without_recursion(everything)
                .await
        });
    }

    fn call_peer_send_multiple_nullable_types_without_recursion(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
        completion: TypedCompletion<AllNullableTypesWithoutRecursion>,
    ) {
        let peer = self.peer.clone();
        forward(completion, async move {
            peer.send_multiple_nullable_types_without_recursion(
                a_nullable_bool,
                a_nullable_int,
                a_nullable_string,
            )
            .await
        });
    }

    fn call_peer_echo_bool(&self, a_bool: bool, completion: TypedCompletion<bool>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_bool(a_bool).await });
    }

    fn call_peer_echo_int(&self, an_int: i64, completion: TypedCompletion<i64>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_int(an_int).await });
    }

    fn call_peer_echo_double(&self, a_double: f64, completion: TypedCompletion<f64>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_double(a_double).await });
    }

    fn call_peer_echo_string(&self, a_string: String, completion: TypedCompletion<String>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_string(a_string).await });
    }

    fn call_peer_echo_uint8_list(&self, list: Bytes, completion: TypedCompletion<Bytes>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_uint8_list(list).await });
    }

    fn call_peer_echo_list(&self, list: Vec<Value>, completion: TypedCompletion<Vec<Value>>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_list(list).await });
    }

    fn call_peer_echo_map(&self, a_map: Map, completion: TypedCompletion<Map>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_map(a_map).await });
    }

    fn call_peer_echo_enum(&self, an_enum: AnEnum, completion: TypedCompletion<AnEnum>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_enum(an_enum).await });
    }

    fn call_peer_echo_nullable_bool(
        &self,
        a_bool: Option<bool>,
        completion: TypedCompletion<Option<bool>>,
    ) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_nullable_bool(a_bool).await });
    }

    fn call_peer_echo_nullable_int(&self, an_int: Option<i64>, completion: TypedCompletion<Option<i64>>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_nullable_int(an_int).await });
    }

    fn call_peer_echo_nullable_double(
        &self,
        a_double: Option<f64>,
        completion: TypedCompletion<Option<f64>>,
    ) {
        let peer = self.peer.clone();
        forward(completion, async move {
            peer.echo_nullable_double(a_double).await
        });
    }

    fn call_peer_echo_nullable_string(
        &self,
        a_string: Option<String>,
        completion: TypedCompletion<Option<String>>,
    ) {
        let peer = self.peer.clone();
        forward(completion, async move {
            peer.echo_nullable_string(a_string).await
        });
    }

    fn call_peer_echo_nullable_uint8_list(
        &self,
        list: Option<Bytes>,
        completion: TypedCompletion<Option<Bytes>>,
    ) {
        let peer = self.peer.clone();
        forward(completion, async move {
            peer.echo_nullable_uint8_list(list).await
        });
    }

    fn call_peer_echo_nullable_list(
        &self,
        list: Option<Vec<Value>>,
        completion: TypedCompletion<Option<Vec<Value>>>,
    ) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_nullable_list(list).await });
    }

    fn call_peer_echo_nullable_map(&self, a_map: Option<Map>, completion: TypedCompletion<Option<Map>>) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_nullable_map(a_map).await });
    }

    fn call_peer_echo_nullable_enum(
        &self,
        an_enum: Option<AnEnum>,
        completion: TypedCompletion<Option<AnEnum>>,
    ) {
        let peer = self.peer.clone();
        forward(completion, async move { peer.echo_nullable_enum(an_enum).await });
    }
}

/// Peer API that echoes its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoPeerApi;

impl PeerIntegrationCoreApi for EchoPeerApi {
    fn noop(&self) -> Reply<()> {
        Ok(())
    }

    fn throw_error(&self) -> Reply<Value> {
        Err(peer_error())
    }

    fn throw_error_from_void(&self) -> Reply<()> {
        Err(peer_error())
    }

    fn echo_all_types(&self, everything: AllTypes) -> Reply<AllTypes> {
        Ok(everything)
    }

    fn echo_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
    ) -> Reply<Option<AllNullableTypes>> {
        Ok(everything)
    }

    fn send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Reply<AllNullableTypes> {
        Ok(AllNullableTypes {
            a_nullable_bool,
            a_nullable_int,
            a_nullable_string,
            ..AllNullableTypes::default()
        })
    }

    fn echo_all_nullable_types_without_recursion(
        &self,
        everything: Option<AllNullableTypesWithoutRecursion>,
    ) -> Reply<Option<AllNullableTypesWithoutRecursion>> {
        Ok(everything)
    }

    fn send_multiple_nullable_types_without_recursion(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Reply<AllNullableTypesWithoutRecursion> {
        Ok(AllNullableTypesWithoutRecursion {
            a_nullable_bool,
            a_nullable_int,
            a_nullable_string,
            ..AllNullableTypesWithoutRecursion::default()
        })
    }

    fn echo_bool(&self, a_bool: bool) -> Reply<bool> {
        Ok(a_bool)
    }

    fn echo_int(&self, an_int: i64) -> Reply<i64> {
        Ok(an_int)
    }

    fn echo_double(&self, a_double: f64) -> Reply<f64> {
        Ok(a_double)
    }

    fn echo_string(&self, a_string: String) -> Reply<String> {
        Ok(a_string)
    }

    fn echo_uint8_list(&self, list: Bytes) -> Reply<Bytes> {
        Ok(list)
    }

    fn echo_list(&self, list: Vec<Value>) -> Reply<Vec<Value>> {
        Ok(list)
    }

    fn echo_map(&self, a_map: Map) -> Reply<Map> {
        Ok(a_map)
    }

    fn echo_enum(&self, an_enum: AnEnum) -> Reply<AnEnum> {
        Ok(an_enum)
    }

    fn echo_nullable_bool(&self, a_bool: Option<bool>) -> Reply<Option<bool>> {
        Ok(a_bool)
    }

    fn echo_nullable_int(&self, an_int: Option<i64>) -> Reply<Option<i64>> {
        Ok(an_int)
    }

    fn echo_nullable_double(&self, a_double: Option<f64>) -> Reply<Option<f64>> {
        Ok(a_double)
    }

    fn echo_nullable_string(&self, a_string: Option<String>) -> Reply<Option<String>> {
        Ok(a_string)
    }

    fn echo_nullable_uint8_list(&self, list: Option<Bytes>) -> Reply<Option<Bytes>> {
        Ok(list)
    }

    fn echo_nullable_list(&self, list: Option<Vec<Value>>) -> Reply<Option<Vec<Value>>> {
        Ok(list)
    }

    fn echo_nullable_map(&self, a_map: Option<Map>) -> Reply<Option<Map>> {
        Ok(a_map)
    }

    fn echo_nullable_enum(&self, an_enum: Option<AnEnum>) -> Reply<Option<AnEnum>> {
        Ok(an_enum)
    }

    fn noop_async(&self, completion: TypedCompletion<()>) {
        completion.resolve(());
    }

    fn echo_async_string(&self, a_string: String, completion: TypedCompletion<String>) {
        completion.resolve(a_string);
    }
}

/// Implements all three small APIs by echoing.
///
/// `HostSmallApi::echo` and `PeerSmallApi::echo_string` append the tag
/// given at construction, so tests can tell suffixed instances apart.
#[derive(Debug, Clone, Default)]
pub struct EchoSmallApi {
    tag: String,
}

impl EchoSmallApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tagged(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    fn tag(&self, a_string: String) -> String {
        if self.tag.is_empty() {
            a_string
        } else {
            format!("{a_string}{}", self.tag)
        }
    }
}

impl HostTrivialApi for EchoSmallApi {
    fn noop(&self) -> Reply<()> {
        Ok(())
    }
}

impl HostSmallApi for EchoSmallApi {
    fn echo(&self, a_string: String, completion: TypedCompletion<String>) {
        completion.resolve(self.tag(a_string));
    }

    fn void_void(&self, completion: TypedCompletion<()>) {
        completion.resolve(());
    }
}

impl PeerSmallApi for EchoSmallApi {
    fn echo_wrapped_list(&self, msg: TestMessage) -> Reply<TestMessage> {
        Ok(msg)
    }

    fn echo_string(&self, a_string: String) -> Reply<String> {
        Ok(self.tag(a_string))
    }
}
