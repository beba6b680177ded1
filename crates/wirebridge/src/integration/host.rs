//! Host side of the integration-test API: the methods a host runtime
//! exposes to its guest.

use std::sync::Arc;

use bytes::Bytes;
use wirebridge_codec::{ErrorRecord, FromValue, IntoValue, Value};
use wirebridge_rpc::{Dispatcher, Proxy, Result, Session, TypedCompletion};

use super::glue::{nullary, nullary_async, ternary, ternary_async, unary, unary_async};
use super::types::{
    AllClassesWrapper, AllNullableTypes, AllNullableTypesWithoutRecursion, AllTypes, AnEnum, Map,
};

/// API grouping name; the channel is `"{prefix}.HostIntegrationCoreApi"`.
pub const HOST_INTEGRATION_CORE_API: &str = "HostIntegrationCoreApi";

/// Sent by [`HostIntegrationCoreApiProxy::echo_named_default_string`] when
/// the caller passes `None`.
pub const DEFAULT_NAMED_STRING: &str = "default";
/// Sent by [`HostIntegrationCoreApiProxy::echo_optional_default_double`]
/// when the caller passes `None`.
#[allow(clippy::approx_constant)]
pub const DEFAULT_OPTIONAL_DOUBLE: f64 = 3.14;

type Reply<T> = std::result::Result<T, ErrorRecord>;

/// Methods the host implements.
///
/// Synchronous methods return their result directly. Asynchronous ones
/// receive a [`TypedCompletion`] and may resolve it from any thread.
pub trait HostIntegrationCoreApi: Send + Sync {
    fn noop(&self) -> Reply<()>;
    fn echo_all_types(&self, everything: AllTypes) -> Reply<AllTypes>;
    fn echo_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
    ) -> Reply<Option<AllNullableTypes>>;
    fn throw_error(&self) -> Reply<Value>;
    fn throw_error_from_void(&self) -> Reply<()>;
    fn throw_structured_error(&self) -> Reply<Value>;
    fn echo_int(&self, an_int: i64) -> Reply<i64>;
    fn echo_double(&self, a_double: f64) -> Reply<f64>;
    fn echo_bool(&self, a_bool: bool) -> Reply<bool>;
    fn echo_string(&self, a_string: String) -> Reply<String>;
    fn echo_uint8_list(&self, a_uint8_list: Bytes) -> Reply<Bytes>;
    fn echo_object(&self, an_object: Value) -> Reply<Value>;
    fn echo_list(&self, list: Vec<Value>) -> Reply<Vec<Value>>;
    fn echo_map(&self, a_map: Map) -> Reply<Map>;
    fn echo_class_wrapper(&self, wrapper: AllClassesWrapper) -> Reply<AllClassesWrapper>;
    fn echo_enum(&self, an_enum: AnEnum) -> Reply<AnEnum>;
    fn extract_nested_nullable_string(&self, wrapper: AllClassesWrapper) -> Reply<Option<String>>;
    fn create_nested_nullable_string(
        &self,
        nullable_string: Option<String>,
    ) -> Reply<AllClassesWrapper>;
    fn send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Reply<AllNullableTypes>;
    fn echo_nullable_int(&self, a_nullable_int: Option<i64>) -> Reply<Option<i64>>;
    fn echo_nullable_double(&self, a_nullable_double: Option<f64>) -> Reply<Option<f64>>;
    fn echo_nullable_bool(&self, a_nullable_bool: Option<bool>) -> Reply<Option<bool>>;
    fn echo_nullable_string(&self, a_nullable_string: Option<String>) -> Reply<Option<String>>;
    fn echo_nullable_uint8_list(&self, a_nullable_uint8_list: Option<Bytes>)
        -> Reply<Option<Bytes>>;
    fn echo_nullable_object(&self, a_nullable_object: Value) -> Reply<Value>;
    fn echo_nullable_list(&self, a_nullable_list: Option<Vec<Value>>) -> Reply<Option<Vec<Value>>>;
    fn echo_nullable_map(&self, a_nullable_map: Option<Map>) -> Reply<Option<Map>>;
    fn echo_nullable_enum(&self, an_enum: Option<AnEnum>) -> Reply<Option<AnEnum>>;
    fn echo_named_default_string(&self, a_string: String) -> Reply<String>;
    fn echo_optional_default_double(&self, a_double: f64) -> Reply<f64>;
    fn echo_required_int(&self, an_int: i64) -> Reply<i64>;
    fn echo_all_nullable_types_without_recursion(
        &self,
        everything: Option<AllNullableTypesWithoutRecursion>,
    ) -> Reply<Option<AllNullableTypesWithoutRecursion>>;
    fn send_multiple_nullable_types_without_recursion(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Reply<AllNullableTypesWithoutRecursion>;
    fn echo_optional_nullable_int(&self, a_nullable_int: Option<i64>) -> Reply<Option<i64>>;
    fn echo_named_nullable_string(
        &self,
        a_nullable_string: Option<String>,
    ) -> Reply<Option<String>>;

    fn noop_async(&self, completion: TypedCompletion<()>);
    fn echo_async_int(&self, an_int: i64, completion: TypedCompletion<i64>);
    fn echo_async_double(&self, a_double: f64, completion: TypedCompletion<f64>);
    fn echo_async_bool(&self, a_bool: bool, completion: TypedCompletion<bool>);
    fn echo_async_string(&self, a_string: String, completion: TypedCompletion<String>);
    fn echo_async_uint8_list(&self, a_uint8_list: Bytes, completion: TypedCompletion<Bytes>);
    fn echo_async_object(&self, an_object: Value, completion: TypedCompletion<Value>);
    fn echo_async_list(&self, list: Vec<Value>, completion: TypedCompletion<Vec<Value>>);
    fn echo_async_map(&self, a_map: Map, completion: TypedCompletion<Map>);
    fn echo_async_enum(&self, an_enum: AnEnum, completion: TypedCompletion<AnEnum>);
    fn echo_async_all_types(&self, everything: AllTypes, completion: TypedCompletion<AllTypes>);
    fn echo_async_nullable_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
        completion: TypedCompletion<Option<AllNullableTypes>>,
    );
    fn echo_async_nullable_int(&self, an_int: Option<i64>, completion: TypedCompletion<Option<i64>>);
    fn echo_async_nullable_string(
        &self,
        a_string: Option<String>,
        completion: TypedCompletion<Option<String>>,
    );
    fn echo_async_nullable_double(
        &self,
        a_double: Option<f64>,
        completion: TypedCompletion<Option<f64>>,
    );
    fn echo_async_nullable_bool(&self, a_bool: Option<bool>, completion: TypedCompletion<Option<bool>>);
    fn echo_async_nullable_uint8_list(
        &self,
        a_uint8_list: Option<Bytes>,
        completion: TypedCompletion<Option<Bytes>>,
    );
    fn echo_async_nullable_object(&self, an_object: Value, completion: TypedCompletion<Value>);
    fn echo_async_nullable_list(
        &self,
        list: Option<Vec<Value>>,
        completion: TypedCompletion<Option<Vec<Value>>>,
    );
    fn echo_async_nullable_map(&self, a_map: Option<Map>, completion: TypedCompletion<Option<Map>>);
    fn echo_async_nullable_enum(
        &self,
        an_enum: Option<AnEnum>,
        completion: TypedCompletion<Option<AnEnum>>,
    );
    fn echo_async_nullable_all_nullable_types_without_recursion(
        &self,
        everything: Option<AllNullableTypesWithoutRecursion>,
        completion: TypedCompletion<Option<AllNullableTypesWithoutRecursion>>,
    );
    fn throw_async_error(&self, completion: TypedCompletion<Value>);
    fn throw_async_error_from_void(&self, completion: TypedCompletion<()>);
    fn throw_async_structured_error(&self, completion: TypedCompletion<Value>);

    /// The `call_peer_*` methods forward to the same-named method of the
    /// peer's `PeerIntegrationCoreApi` and complete with its reply.
    fn call_peer_noop(&self, completion: TypedCompletion<()>);
    fn call_peer_throw_error(&self, completion: TypedCompletion<Value>);
    fn call_peer_throw_error_from_void(&self, completion: TypedCompletion<()>);
    fn call_peer_echo_all_types(&self, everything: AllTypes, completion: TypedCompletion<AllTypes>);
    fn call_peer_echo_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
        completion: TypedCompletion<Option<AllNullableTypes>>,
    );
    fn call_peer_send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
        completion: TypedCompletion<AllNullableTypes>,
    );
    fn call_peer_echo_all_nullable_types_without_recursion(
        &self,
        everything: Option<AllNullableTypesWithoutRecursion>,
        completion: TypedCompletion<Option<AllNullableTypesWithoutRecursion>>,
    );
    fn call_peer_send_multiple_nullable_types_without_recursion(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
        completion: TypedCompletion<AllNullableTypesWithoutRecursion>,
    );
    fn call_peer_echo_bool(&self, a_bool: bool, completion: TypedCompletion<bool>);
    fn call_peer_echo_int(&self, an_int: i64, completion: TypedCompletion<i64>);
    fn call_peer_echo_double(&self, a_double: f64, completion: TypedCompletion<f64>);
    fn call_peer_echo_string(&self, a_string: String, completion: TypedCompletion<String>);
    fn call_peer_echo_uint8_list(&self, list: Bytes, completion: TypedCompletion<Bytes>);
    fn call_peer_echo_list(&self, list: Vec<Value>, completion: TypedCompletion<Vec<Value>>);
    fn call_peer_echo_map(&self, a_map: Map, completion: TypedCompletion<Map>);
    fn call_peer_echo_enum(&self, an_enum: AnEnum, completion: TypedCompletion<AnEnum>);
    fn call_peer_echo_nullable_bool(
        &self,
        a_bool: Option<bool>,
        completion: TypedCompletion<Option<bool>>,
    );
    fn call_peer_echo_nullable_int(&self, an_int: Option<i64>, completion: TypedCompletion<Option<i64>>);
    fn call_peer_echo_nullable_double(
        &self,
        a_double: Option<f64>,
        completion: TypedCompletion<Option<f64>>,
    );
    fn call_peer_echo_nullable_string(
        &self,
        a_string: Option<String>,
        completion: TypedCompletion<Option<String>>,
    );
    fn call_peer_echo_nullable_uint8_list(
        &self,
        list: Option<Bytes>,
        completion: TypedCompletion<Option<Bytes>>,
    );
    fn call_peer_echo_nullable_list(
        &self,
        list: Option<Vec<Value>>,
        completion: TypedCompletion<Option<Vec<Value>>>,
    );
    fn call_peer_echo_nullable_map(&self, a_map: Option<Map>, completion: TypedCompletion<Option<Map>>);
    fn call_peer_echo_nullable_enum(
        &self,
        an_enum: Option<AnEnum>,
        completion: TypedCompletion<Option<AnEnum>>,
    );
}

/// Install `api` as the `HostIntegrationCoreApi` handler of `session`.
pub fn set_up_host_integration_core_api<A>(session: &Session, api: Arc<A>) -> Arc<Dispatcher>
where
    A: HostIntegrationCoreApi + 'static,
{
    let d = session.dispatcher(HOST_INTEGRATION_CORE_API);
    let multiple = ["aNullableBool", "aNullableInt", "aNullableString"];

    nullary(&d, &api, "noop", A::noop);
    unary(&d, &api, "echoAllTypes", "everything", A::echo_all_types);
    unary(&d, &api, "echoAllNullableTypes", "everything", A::echo_all_nullable_types);
    nullary(&d, &api, "throwError", A::throw_error);
    nullary(&d, &api, "throwErrorFromVoid", A::throw_error_from_void);
    nullary(&d, &api, "throwStructuredError", A::throw_structured_error);
    unary(&d, &api, "echoInt", "anInt", A::echo_int);
    unary(&d, &api, "echoDouble", "aDouble", A::echo_double);
    unary(&d, &api, "echoBool", "aBool", A::echo_bool);
    unary(&d, &api, "echoString", "aString", A::echo_string);
    unary(&d, &api, "echoUint8List", "aUint8List", A::echo_uint8_list);
    unary(&d, &api, "echoObject", "anObject", A::echo_object);
    unary(&d, &api, "echoList", "list", A::echo_list);
    unary(&d, &api, "echoMap", "aMap", A::echo_map);
    unary(&d, &api, "echoClassWrapper", "wrapper", A::echo_class_wrapper);
    unary(&d, &api, "echoEnum", "anEnum", A::echo_enum);
    unary(
        &d,
        &api,
        "extractNestedNullableString",
        "wrapper",
        A::extract_nested_nullable_string,
    );
    unary(
        &d,
        &api,
        "createNestedNullableString",
        "nullableString",
        A::create_nested_nullable_string,
    );
    ternary(&d, &api, "sendMultipleNullableTypes", multiple, A::send_multiple_nullable_types);
    unary(&d, &api, "echoNullableInt", "aNullableInt", A::echo_nullable_int);
    unary(&d, &api, "echoNullableDouble", "aNullableDouble", A::echo_nullable_double);
    unary(&d, &api, "echoNullableBool", "aNullableBool", A::echo_nullable_bool);
    unary(&d, &api, "echoNullableString", "aNullableString", A::echo_nullable_string);
    unary(
        &d,
        &api,
        "echoNullableUint8List",
        "aNullableUint8List",
        A::echo_nullable_uint8_list,
    );
    unary(&d, &api, "echoNullableObject", "aNullableObject", A::echo_nullable_object);
    unary(&d, &api, "echoNullableList", "aNullableList", A::echo_nullable_list);
    unary(&d, &api, "echoNullableMap", "aNullableMap", A::echo_nullable_map);
    unary(&d, &api, "echoNullableEnum", "anEnum", A::echo_nullable_enum);
    unary(&d, &api, "echoNamedDefaultString", "aString", A::echo_named_default_string);
    unary(&d, &api, "echoOptionalDefaultDouble", "aDouble", A::echo_optional_default_double);
    unary(&d, &api, "echoRequiredInt", "anInt", A::echo_required_int);
    unary(
        &d,
        &api,
        "echoAllNullableTypesWithoutRecursion",
        "everything",
        A::echo_all_nullable_types_without_recursion,
    );
    ternary(
        &d,
        &api,
        "sendMultipleNullableTypesWithoutRecursion",
        multiple,
        A::send_multiple_nullable_types_without_recursion,
    );
    unary(&d, &api, "echoOptionalNullableInt", "aNullableInt", A::echo_optional_nullable_int);
    unary(
        &d,
        &api,
        "echoNamedNullableString",
        "aNullableString",
        A::echo_named_nullable_string,
    );

    nullary_async(&d, &api, "noopAsync", A::noop_async);
    unary_async(&d, &api, "echoAsyncInt", "anInt", A::echo_async_int);
    unary_async(&d, &api, "echoAsyncDouble", "aDouble", A::echo_async_double);
    unary_async(&d, &api, "echoAsyncBool", "aBool", A::echo_async_bool);
    unary_async(&d, &api, "echoAsyncString", "aString", A::echo_async_string);
    unary_async(&d, &api, "echoAsyncUint8List", "aUint8List", A::echo_async_uint8_list);
    unary_async(&d, &api, "echoAsyncObject", "anObject", A::echo_async_object);
    unary_async(&d, &api, "echoAsyncList", "list", A::echo_async_list);
    unary_async(&d, &api, "echoAsyncMap", "aMap", A::echo_async_map);
    unary_async(&d, &api, "echoAsyncEnum", "anEnum", A::echo_async_enum);
    unary_async(&d, &api, "echoAsyncAllTypes", "everything", A::echo_async_all_types);
    unary_async(
        &d,
        &api,
        "echoAsyncNullableAllNullableTypes",
        "everything",
        A::echo_async_nullable_all_nullable_types,
    );
    unary_async(&d, &api, "echoAsyncNullableInt", "anInt", A::echo_async_nullable_int);
    unary_async(&d, &api, "echoAsyncNullableString", "aString", A::echo_async_nullable_string);
    unary_async(&d, &api, "echoAsyncNullableDouble", "aDouble", A::echo_async_nullable_double);
    unary_async(&d, &api, "echoAsyncNullableBool", "aBool", A::echo_async_nullable_bool);
    unary_async(
        &d,
        &api,
        "echoAsyncNullableUint8List",
        "aUint8List",
        A::echo_async_nullable_uint8_list,
    );
    unary_async(&d, &api, "echoAsyncNullableObject", "anObject", A::echo_async_nullable_object);
    unary_async(&d, &api, "echoAsyncNullableList", "list", A::echo_async_nullable_list);
    unary_async(&d, &api, "echoAsyncNullableMap", "aMap", A::echo_async_nullable_map);
    unary_async(&d, &api, "echoAsyncNullableEnum", "anEnum", A::echo_async_nullable_enum);
    unary_async(
        &d,
        &api,
        "echoAsyncNullableAllNullableTypesWithoutRecursion",
        "everything",
        A::echo_async_nullable_all_nullable_types_without_recursion,
    );
    nullary_async(&d, &api, "throwAsyncError", A::throw_async_error);
    nullary_async(&d, &api, "throwAsyncErrorFromVoid", A::throw_async_error_from_void);
    nullary_async(&d, &api, "throwAsyncStructuredError", A::throw_async_structured_error);

    nullary_async(&d, &api, "callPeerNoop", A::call_peer_noop);
    nullary_async(&d, &api, "callPeerThrowError", A::call_peer_throw_error);
    nullary_async(&d, &api, "callPeerThrowErrorFromVoid", A::call_peer_throw_error_from_void);
    unary_async(&d, &api, "callPeerEchoAllTypes", "everything", A::call_peer_echo_all_types);
    unary_async(
        &d,
        &api,
        "callPeerEchoAllNullableTypes",
        "everything",
        A::call_peer_echo_all_nullable_types,
    );
    ternary_async(
        &d,
        &api,
        "callPeerSendMultipleNullableTypes",
        multiple,
        A::call_peer_send_multiple_nullable_types,
    );
    unary_async(
        &d,
        &api,
        "callPeerEchoAllNullableTypesWithoutRecursion",
        "everything",
        A::call_peer_echo_all_nullable_types_without_recursion,
    );
    ternary_async(
        &d,
        &api,
        "callPeerSendMultipleNullableTypesWithoutRecursion",
        multiple,
        A::call_peer_send_multiple_nullable_types_without_recursion,
    );
    unary_async(&d, &api, "callPeerEchoBool", "aBool", A::call_peer_echo_bool);
    unary_async(&d, &api, "callPeerEchoInt", "anInt", A::call_peer_echo_int);
    unary_async(&d, &api, "callPeerEchoDouble", "aDouble", A::call_peer_echo_double);
    unary_async(&d, &api, "callPeerEchoString", "aString", A::call_peer_echo_string);
    unary_async(&d, &api, "callPeerEchoUint8List", "list", A::call_peer_echo_uint8_list);
    unary_async(&d, &api, "callPeerEchoList", "list", A::call_peer_echo_list);
    unary_async(&d, &api, "callPeerEchoMap", "aMap", A::call_peer_echo_map);
    unary_async(&d, &api, "callPeerEchoEnum", "anEnum", A::call_peer_echo_enum);
    unary_async(&d, &api, "callPeerEchoNullableBool", "aBool", A::call_peer_echo_nullable_bool);
    unary_async(&d, &api, "callPeerEchoNullableInt", "anInt", A::call_peer_echo_nullable_int);
    unary_async(
        &d,
        &api,
        "callPeerEchoNullableDouble",
        "aDouble",
        A::call_peer_echo_nullable_double,
    );
    unary_async(
        &d,
        &api,
        "callPeerEchoNullableString",
        "aString",
        A::call_peer_echo_nullable_string,
    );
    unary_async(
        &d,
        &api,
        "callPeerEchoNullableUint8List",
        "list",
        A::call_peer_echo_nullable_uint8_list,
    );
    unary_async(&d, &api, "callPeerEchoNullableList", "list", A::call_peer_echo_nullable_list);
    unary_async(&d, &api, "callPeerEchoNullableMap", "aMap", A::call_peer_echo_nullable_map);
    unary_async(&d, &api, "callPeerEchoNullableEnum", "anEnum", A::call_peer_echo_nullable_enum);

    tracing::debug!(methods = d.methods().len(), "HostIntegrationCoreApi set up");
    d
}

/// Typed caller for a peer's `HostIntegrationCoreApi`.
#[derive(Debug, Clone)]
pub struct HostIntegrationCoreApiProxy {
    proxy: Proxy,
}

impl HostIntegrationCoreApiProxy {
    pub fn new(session: &Session) -> Self {
        Self {
            proxy: session.proxy(HOST_INTEGRATION_CORE_API),
        }
    }

    /// The untyped proxy underneath.
    pub fn proxy(&self) -> &Proxy {
        &self.proxy
    }

    async fn call0<R: FromValue>(&self, method: &str) -> Result<R> {
        self.proxy.invoke_typed(method, Vec::new()).await
    }

    async fn call1<R: FromValue>(&self, method: &str, value: impl IntoValue) -> Result<R> {
        self.proxy
            .invoke_typed(method, vec![value.into_value()])
            .await
    }

    async fn call3<R: FromValue>(
        &self,
        method: &str,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Result<R> {
        let args = vec![
            a_nullable_bool.into_value(),
            a_nullable_int.into_value(),
            a_nullable_string.into_value(),
        ];
        self.proxy.invoke_typed(method, args).await
    }

    pub async fn noop(&self) -> Result<()> {
        self.call0("noop").await
    }

    pub async fn echo_all_types(&self, everything: AllTypes) -> Result<AllTypes> {
        self.call1("echoAllTypes", everything).await
    }

    pub async fn echo_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
    ) -> Result<Option<AllNullableTypes>> {
        self.call1("echoAllNullableTypes", everything).await
    }

    pub async fn throw_error(&self) -> Result<Value> {
        self.call0("throwError").await
    }

    pub async fn throw_error_from_void(&self) -> Result<()> {
        self.call0("throwErrorFromVoid").await
    }

    pub async fn throw_structured_error(&self) -> Result<Value> {
        self.call0("throwStructuredError").await
    }

    pub async fn echo_int(&self, an_int: i64) -> Result<i64> {
        self.call1("echoInt", an_int).await
    }

    pub async fn echo_double(&self, a_double: f64) -> Result<f64> {
        self.call1("echoDouble", a_double).await
    }

    pub async fn echo_bool(&self, a_bool: bool) -> Result<bool> {
        self.call1("echoBool", a_bool).await
    }

    pub async fn echo_string(&self, a_string: &str) -> Result<String> {
        self.call1("echoString", a_string).await
    }

    pub async fn echo_uint8_list(&self, a_uint8_list: Bytes) -> Result<Bytes> {
        self.call1("echoUint8List", a_uint8_list).await
    }

    pub async fn echo_object(&self, an_object: Value) -> Result<Value> {
        self.call1("echoObject", an_object).await
    }

    pub async fn echo_list(&self, list: Vec<Value>) -> Result<Vec<Value>> {
        self.call1("echoList", list).await
    }

    pub async fn echo_map(&self, a_map: Map) -> Result<Map> {
        self.call1("echoMap", a_map).await
    }

    pub async fn echo_class_wrapper(&self, wrapper: AllClassesWrapper) -> Result<AllClassesWrapper> {
        self.call1("echoClassWrapper", wrapper).await
    }

    pub async fn echo_enum(&self, an_enum: AnEnum) -> Result<AnEnum> {
        self.call1("echoEnum", an_enum).await
    }

    pub async fn extract_nested_nullable_string(
        &self,
        wrapper: AllClassesWrapper,
    ) -> Result<Option<String>> {
        self.call1("extractNestedNullableString", wrapper).await
    }

    pub async fn create_nested_nullable_string(
        &self,
        nullable_string: Option<String>,
    ) -> Result<AllClassesWrapper> {
        self.call1("createNestedNullableString", nullable_string)
            .await
    }

    pub async fn send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Result<AllNullableTypes> {
        self.call3(
            "sendMultipleNullableTypes",
            a_nullable_bool,
            a_nullable_int,
            a_nullable_string,
        )
        .await
    }

    pub async fn echo_nullable_int(&self, a_nullable_int: Option<i64>) -> Result<Option<i64>> {
        self.call1("echoNullableInt", a_nullable_int).await
    }

    pub async fn echo_nullable_double(
        &self,
        a_nullable_double: Option<f64>,
    ) -> Result<Option<f64>> {
        self.call1("echoNullableDouble", a_nullable_double).await
    }

    pub async fn echo_nullable_bool(&self, a_nullable_bool: Option<bool>) -> Result<Option<bool>> {
        self.call1("echoNullableBool", a_nullable_bool).await
    }

    pub async fn echo_nullable_string(
        &self,
        a_nullable_string: Option<String>,
    ) -> Result<Option<String>> {
        self.call1("echoNullableString", a_nullable_string).await
    }

    pub async fn echo_nullable_uint8_list(
        &self,
        a_nullable_uint8_list: Option<Bytes>,
    ) -> Result<Option<Bytes>> {
        self.call1("echoNullableUint8List", a_nullable_uint8_list)
            .await
    }

    pub async fn echo_nullable_object(&self, a_nullable_object: Value) -> Result<Value> {
        self.call1("echoNullableObject", a_nullable_object).await
    }

    pub async fn echo_nullable_list(
        &self,
        a_nullable_list: Option<Vec<Value>>,
    ) -> Result<Option<Vec<Value>>> {
        self.call1("echoNullableList", a_nullable_list).await
    }

    pub async fn echo_nullable_map(&self, a_nullable_map: Option<Map>) -> Result<Option<Map>> {
        self.call1("echoNullableMap", a_nullable_map).await
    }

    pub async fn echo_nullable_enum(&self, an_enum: Option<AnEnum>) -> Result<Option<AnEnum>> {
        self.call1("echoNullableEnum", an_enum).await
    }

    /// Echo `a_string`, or [`DEFAULT_NAMED_STRING`] when it is `None`.
    pub async fn echo_named_default_string(&self, a_string: Option<&str>) -> Result<String> {
        self.call1(
            "echoNamedDefaultString",
            a_string.unwrap_or(DEFAULT_NAMED_STRING),
        )
        .await
    }

    /// Echo `a_double`, or [`DEFAULT_OPTIONAL_DOUBLE`] when it is `None`.
    pub async fn echo_optional_default_double(&self, a_double: Option<f64>) -> Result<f64> {
        self.call1(
            "echoOptionalDefaultDouble",
            a_double.unwrap_or(DEFAULT_OPTIONAL_DOUBLE),
        )
        .await
    }

    pub async fn echo_required_int(&self, an_int: i64) -> Result<i64> {
        self.call1("echoRequiredInt", an_int).await
    }

    pub async fn echo_all_nullable_types_without_recursion(
        &self,
        everything: Option<AllNullableTypesWithoutRecursion>,
    ) -> Result<Option<AllNullableTypesWithoutRecursion>> {
        self.call1("echoAllNullableTypesWithoutRecursion", everything)
            .await
    }

    pub async fn send_multiple_nullable_types_without_recursion(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Result<AllNullableTypesWithoutRecursion> {
        self.call3(
            "sendMultipleNullableTypesWithoutRecursion",
            a_nullable_bool,
            a_nullable_int,
            a_nullable_string,
        )
        .await
    }

    pub async fn echo_optional_nullable_int(
        &self,
        a_nullable_int: Option<i64>,
    ) -> Result<Option<i64>> {
        self.call1("echoOptionalNullableInt", a_nullable_int).await
    }

    pub async fn echo_named_nullable_string(
        &self,
        a_nullable_string: Option<String>,
    ) -> Result<Option<String>> {
        self.call1("echoNamedNullableString", a_nullable_string)
            .await
    }

    pub async fn noop_async(&self) -> Result<()> {
        self.call0("noopAsync").await
    }

    pub async fn echo_async_int(&self, an_int: i64) -> Result<i64> {
        self.call1("echoAsyncInt", an_int).await
    }

    pub async fn echo_async_double(&self, a_double: f64) -> Result<f64> {
        self.call1("echoAsyncDouble", a_double).await
    }

    pub async fn echo_async_bool(&self, a_bool: bool) -> Result<bool> {
        self.call1("echoAsyncBool", a_bool).await
    }

    pub async fn echo_async_string(&self, a_string: &str) -> Result<String> {
        self.call1("echoAsyncString", a_string).await
    }

    pub async fn echo_async_uint8_list(&self, a_uint8_list: Bytes) -> Result<Bytes> {
        self.call1("echoAsyncUint8List", a_uint8_list).await
    }

    pub async fn echo_async_object(&self, an_object: Value) -> Result<Value> {
        self.call1("echoAsyncObject", an_object).await
    }

    pub async fn echo_async_list(&self, list: Vec<Value>) -> Result<Vec<Value>> {
        self.call1("echoAsyncList", list).await
    }

    pub async fn echo_async_map(&self, a_map: Map) -> Result<Map> {
        self.call1("echoAsyncMap", a_map).await
    }

    pub async fn echo_async_enum(&self, an_enum: AnEnum) -> Result<AnEnum> {
        self.call1("echoAsyncEnum", an_enum).await
    }

    pub async fn echo_async_all_types(&self, everything: AllTypes) -> Result<AllTypes> {
        self.call1("echoAsyncAllTypes", everything).await
    }

    pub async fn echo_async_nullable_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
    ) -> Result<Option<AllNullableTypes>> {
        self.call1("echoAsyncNullableAllNullableTypes", everything)
            .await
    }

    pub async fn echo_async_nullable_int(&self, an_int: Option<i64>) -> Result<Option<i64>> {
        self.call1("echoAsyncNullableInt", an_int).await
    }

    pub async fn echo_async_nullable_string(
        &self,
        a_string: Option<String>,
    ) -> Result<Option<String>> {
        self.call1("echoAsyncNullableString", a_string).await
    }

    pub async fn echo_async_nullable_double(&self, a_double: Option<f64>) -> Result<Option<f64>> {
        self.call1("echoAsyncNullableDouble", a_double).await
    }

    pub async fn echo_async_nullable_bool(&self, a_bool: Option<bool>) -> Result<Option<bool>> {
        self.call1("echoAsyncNullableBool", a_bool).await
    }

    pub async fn echo_async_nullable_uint8_list(
        &self,
        a_uint8_list: Option<Bytes>,
    ) -> Result<Option<Bytes>> {
        self.call1("echoAsyncNullableUint8List", a_uint8_list)
            .await
    }

    pub async fn echo_async_nullable_object(&self, an_object: Value) -> Result<Value> {
        self.call1("echoAsyncNullableObject", an_object).await
    }

    pub async fn echo_async_nullable_list(
        &self,
        list: Option<Vec<Value>>,
    ) -> Result<Option<Vec<Value>>> {
        self.call1("echoAsyncNullableList", list).await
    }

    pub async fn echo_async_nullable_map(&self, a_map: Option<Map>) -> Result<Option<Map>> {
        self.call1("echoAsyncNullableMap", a_map).await
    }

    pub async fn echo_async_nullable_enum(
        &self,
        an_enum: Option<AnEnum>,
    ) -> Result<Option<AnEnum>> {
        self.call1("echoAsyncNullableEnum", an_enum).await
    }

    pub async fn echo_async_nullable_all_nullable_types_without_recursion(
        &self,
        everything: Option<AllNullableTypesWithoutRecursion>,
    ) -> Result<Option<AllNullableTypesWithoutRecursion>> {
        self.call1("echoAsyncNullableAllNullableTypesWithoutRecursion", everything)
            .await
    }

    pub async fn throw_async_error(&self) -> Result<Value> {
        self.call0("throwAsyncError").await
    }

    pub async fn throw_async_error_from_void(&self) -> Result<()> {
        self.call0("throwAsyncErrorFromVoid").await
    }

    pub async fn throw_async_structured_error(&self) -> Result<Value> {
        self.call0("throwAsyncStructuredError").await
    }

    pub async fn call_peer_noop(&self) -> Result<()> {
        self.call0("callPeerNoop").await
    }

    pub async fn call_peer_throw_error(&self) -> Result<Value> {
        self.call0("callPeerThrowError").await
    }

    pub async fn call_peer_throw_error_from_void(&self) -> Result<()> {
        self.call0("callPeerThrowErrorFromVoid").await
    }

    pub async fn call_peer_echo_all_types(&self, everything: AllTypes) -> Result<AllTypes> {
        self.call1("callPeerEchoAllTypes", everything).await
    }

    pub async fn call_peer_echo_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
    ) -> Result<Option<AllNullableTypes>> {
        self.call1("callPeerEchoAllNullableTypes", everything)
            .await
    }

    pub async fn call_peer_send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Result<AllNullableTypes> {
        self.call3(
            "callPeerSendMultipleNullableTypes",
            a_nullable_bool,
            a_nullable_int,
            a_nullable_string,
        )
        .await
    }

    pub async fn call_peer_echo_all_nullable_types_without_recursion(
        &self,
        everything: Option<AllNullableTypesWithoutRecursion>,
    ) -> Result<Option<AllNullableTypesWithoutRecursion>> {
        self.call1("callPeerEchoAllNullableTypesWithoutRecursion", everything)
            .await
    }

    pub async fn call_peer_send_multiple_nullable_types_without_recursion(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Result<AllNullableTypesWithoutRecursion> {
        self.call3(
            "callPeerSendMultipleNullableTypesWithoutRecursion",
            a_nullable_bool,
            a_nullable_int,
            a_nullable_string,
        )
        .await
    }

    pub async fn call_peer_echo_bool(&self, a_bool: bool) -> Result<bool> {
        self.call1("callPeerEchoBool", a_bool).await
    }

    pub async fn call_peer_echo_int(&self, an_int: i64) -> Result<i64> {
        self.call1("callPeerEchoInt", an_int).await
    }

    pub async fn call_peer_echo_double(&self, a_double: f64) -> Result<f64> {
        self.call1("callPeerEchoDouble", a_double).await
    }

    pub async fn call_peer_echo_string(&self, a_string: &str) -> Result<String> {
        self.call1("callPeerEchoString", a_string).await
    }

    pub async fn call_peer_echo_uint8_list(&self, list: Bytes) -> Result<Bytes> {
        self.call1("callPeerEchoUint8List", list).await
    }

    pub async fn call_peer_echo_list(&self, list: Vec<Value>) -> Result<Vec<Value>> {
        self.call1("callPeerEchoList", list).await
    }

    pub async fn call_peer_echo_map(&self, a_map: Map) -> Result<Map> {
        self.call1("callPeerEchoMap", a_map).await
    }

    pub async fn call_peer_echo_enum(&self, an_enum: AnEnum) -> Result<AnEnum> {
        self.call1("callPeerEchoEnum", an_enum).await
    }

    pub async fn call_peer_echo_nullable_bool(&self, a_bool: Option<bool>) -> Result<Option<bool>> {
        self.call1("callPeerEchoNullableBool", a_bool).await
    }

    pub async fn call_peer_echo_nullable_int(&self, an_int: Option<i64>) -> Result<Option<i64>> {
        self.call1("callPeerEchoNullableInt", an_int).await
    }

    pub async fn call_peer_echo_nullable_double(
        &self,
        a_double: Option<f64>,
    ) -> Result<Option<f64>> {
        self.call1("callPeerEchoNullableDouble", a_double).await
    }

    pub async fn call_peer_echo_nullable_string(
        &self,
        a_string: Option<String>,
    ) -> Result<Option<String>> {
        self.call1("callPeerEchoNullableString", a_string).await
    }

    pub async fn call_peer_echo_nullable_uint8_list(
        &self,
        list: Option<Bytes>,
    ) -> Result<Option<Bytes>> {
        self.call1("callPeerEchoNullableUint8List", list).await
    }

    pub async fn call_peer_echo_nullable_list(
        &self,
        list: Option<Vec<Value>>,
    ) -> Result<Option<Vec<Value>>> {
        self.call1("callPeerEchoNullableList", list).await
    }

    pub async fn call_peer_echo_nullable_map(&self, a_map: Option<Map>) -> Result<Option<Map>> {
        self.call1("callPeerEchoNullableMap", a_map).await
    }

    pub async fn call_peer_echo_nullable_enum(
        &self,
        an_enum: Option<AnEnum>,
    ) -> Result<Option<AnEnum>> {
        self.call1("callPeerEchoNullableEnum", an_enum).await
    }
}
