//! Peer side of the integration-test API: the methods a guest exposes
//! so that the host can call back into it.

use std::sync::Arc;

use bytes::Bytes;
use wirebridge_codec::{ErrorRecord, FromValue, IntoValue, Value};
use wirebridge_rpc::{Dispatcher, Proxy, Result, Session, TypedCompletion};

use super::glue::{nullary, nullary_async, ternary, unary, unary_async};
use super::types::{AllNullableTypes, AllNullableTypesWithoutRecursion, AllTypes, AnEnum, Map};

pub const PEER_INTEGRATION_CORE_API: &str = "PeerIntegrationCoreApi";

type Reply<T> = std::result::Result<T, ErrorRecord>;

/// Methods the guest implements for the host to call.
pub trait PeerIntegrationCoreApi: Send + Sync {
    fn noop(&self) -> Reply<()>;
    fn throw_error(&self) -> Reply<Value>;
    fn throw_error_from_void(&self) -> Reply<()>;
    fn echo_all_types(&self, everything: AllTypes) -> Reply<AllTypes>;
    fn echo_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
    ) -> Reply<Option<AllNullableTypes>>;
    fn send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Reply<AllNullableTypes>;
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
    fn echo_bool(&self, a_bool: bool) -> Reply<bool>;
    fn echo_int(&self, an_int: i64) -> Reply<i64>;
    fn echo_double(&self, a_double: f64) -> Reply<f64>;
    fn echo_string(&self, a_string: String) -> Reply<String>;
    fn echo_uint8_list(&self, list: Bytes) -> Reply<Bytes>;
    fn echo_list(&self, list: Vec<Value>) -> Reply<Vec<Value>>;
    fn echo_map(&self, a_map: Map) -> Reply<Map>;
    fn echo_enum(&self, an_enum: AnEnum) -> Reply<AnEnum>;
    fn echo_nullable_bool(&self, a_bool: Option<bool>) -> Reply<Option<bool>>;
    fn echo_nullable_int(&self, an_int: Option<i64>) -> Reply<Option<i64>>;
    fn echo_nullable_double(&self, a_double: Option<f64>) -> Reply<Option<f64>>;
    fn echo_nullable_string(&self, a_string: Option<String>) -> Reply<Option<String>>;
    fn echo_nullable_uint8_list(&self, list: Option<Bytes>) -> Reply<Option<Bytes>>;
    fn echo_nullable_list(&self, list: Option<Vec<Value>>) -> Reply<Option<Vec<Value>>>;
    fn echo_nullable_map(&self, a_map: Option<Map>) -> Reply<Option<Map>>;
    fn echo_nullable_enum(&self, an_enum: Option<AnEnum>) -> Reply<Option<AnEnum>>;

    fn noop_async(&self, completion: TypedCompletion<()>);
    fn echo_async_string(&self, a_string: String, completion: TypedCompletion<String>);
}

/// Install `api` as the `PeerIntegrationCoreApi` handler of `session`.
pub fn set_up_peer_integration_core_api<A>(session: &Session, api: Arc<A>) -> Arc<Dispatcher>
where
    A: PeerIntegrationCoreApi + 'static,
{
    let d = session.dispatcher(PEER_INTEGRATION_CORE_API);
    let multiple = ["aNullableBool", "aNullableInt", "aNullableString"];

    nullary(&d, &api, "noop", A::noop);
    nullary(&d, &api, "throwError", A::throw_error);
    nullary(&d, &api, "throwErrorFromVoid", A::throw_error_from_void);
    unary(&d, &api, "echoAllTypes", "everything", A::echo_all_types);
    unary(&d, &api, "echoAllNullableTypes", "everything", A::echo_all_nullable_types);
    ternary(&d, &api, "sendMultipleNullableTypes", multiple, A::send_multiple_nullable_types);
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
    unary(&d, &api, "echoBool", "aBool", A::echo_bool);
    unary(&d, &api, "echoInt", "anInt", A::echo_int);
    unary(&d, &api, "echoDouble", "aDouble", A::echo_double);
    unary(&d, &api, "echoString", "aString", A::echo_string);
    unary(&d, &api, "echoUint8List", "list", A::echo_uint8_list);
    unary(&d, &api, "echoList", "list", A::echo_list);
    unary(&d, &api, "echoMap", "aMap", A::echo_map);
    unary(&d, &api, "echoEnum", "anEnum", A::echo_enum);
    unary(&d, &api, "echoNullableBool", "aBool", A::echo_nullable_bool);
    unary(&d, &api, "echoNullableInt", "anInt", A::echo_nullable_int);
    unary(&d, &api, "echoNullableDouble", "aDouble", A::echo_nullable_double);
    unary(&d, &api, "echoNullableString", "aString", A::echo_nullable_string);
    unary(&d, &api, "echoNullableUint8List", "list", A::echo_nullable_uint8_list);
    unary(&d, &api, "echoNullableList", "list", A::echo_nullable_list);
    unary(&d, &api, "echoNullableMap", "aMap", A::echo_nullable_map);
    unary(&d, &api, "echoNullableEnum", "anEnum", A::echo_nullable_enum);
    nullary_async(&d, &api, "noopAsync", A::noop_async);
    unary_async(&d, &api, "echoAsyncString", "aString", A::echo_async_string);

    tracing::debug!(methods = d.methods().len(), "PeerIntegrationCoreApi set up");
    d
}

/// Typed caller for a peer's `PeerIntegrationCoreApi`.
#[derive(Debug, Clone)]
pub struct PeerIntegrationCoreApiProxy {
    proxy: Proxy,
}

impl PeerIntegrationCoreApiProxy {
    pub fn new(session: &Session) -> Self {
        Self {
            proxy: session.proxy(PEER_INTEGRATION_CORE_API),
        }
    }

    async fn call0<R: FromValue>(&self, method: &str) -> Result<R> {
        self.proxy.invoke_typed(method, Vec::new()).await
    }

    async fn call1<R: FromValue>(&self, method: &str, value: impl IntoValue) -> Result<R> {
        self.proxy
            .invoke_typed(method, vec![value.into_value()])
            .await
    }

    pub async fn noop(&self) -> Result<()> {
        self.call0("noop").await
    }

    pub async fn throw_error(&self) -> Result<Value> {
        self.call0("throwError").await
    }

    pub async fn throw_error_from_void(&self) -> Result<()> {
        self.call0("throwErrorFromVoid").await
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

    pub async fn send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Result<AllNullableTypes> {
        let args = vec![
            a_nullable_bool.into_value(),
            a_nullable_int.into_value(),
            a_nullable_string.into_value(),
        ];
        self.proxy
            .invoke_typed("sendMultipleNullableTypes", args)
            .await
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
        let args = vec![
            a_nullable_bool.into_value(),
            a_nullable_int.into_value(),
            a_nullable_string.into_value(),
        ];
        self.proxy
            .invoke_typed("sendMultipleNullableTypesWithoutRecursion", args)
            .await
    }

    pub async fn echo_bool(&self, a_bool: bool) -> Result<bool> {
        self.call1("echoBool", a_bool).await
    }

    pub async fn echo_int(&self, an_int: i64) -> Result<i64> {
        self.call1("echoInt", an_int).await
    }

    pub async fn echo_double(&self, a_double: f64) -> Result<f64> {
        self.call1("echoDouble", a_double).await
    }

    pub async fn echo_string(&self, a_string: String) -> Result<String> {
        self.call1("echoString", a_string).await
    }

    pub async fn echo_uint8_list(&self, list: Bytes) -> Result<Bytes> {
        self.call1("echoUint8List", list).await
    }

    pub async fn echo_list(&self, list: Vec<Value>) -> Result<Vec<Value>> {
        self.call1("echoList", list).await
    }

    pub async fn echo_map(&self, a_map: Map) -> Result<Map> {
        self.call1("echoMap", a_map).await
    }

    pub async fn echo_enum(&self, an_enum: AnEnum) -> Result<AnEnum> {
        self.call1("echoEnum", an_enum).await
    }

    pub async fn echo_nullable_bool(&self, a_bool: Option<bool>) -> Result<Option<bool>> {
        self.call1("echoNullableBool", a_bool).await
    }

    pub async fn echo_nullable_int(&self, an_int: Option<i64>) -> Result<Option<i64>> {
        self.call1("echoNullableInt", an_int).await
    }

    pub async fn echo_nullable_double(&self, a_double: Option<f64>) -> Result<Option<f64>> {
        self.call1("echoNullableDouble", a_double).await
    }

    pub async fn echo_nullable_string(&self, a_string: Option<String>) -> Result<Option<String>> {
        self.call1("echoNullableString", a_string).await
    }

    pub async fn echo_nullable_uint8_list(&self, list: Option<Bytes>) -> Result<Option<Bytes>> {
        self.call1("echoNullableUint8List", list).await
    }

    pub async fn echo_nullable_list(
        &self,
        list: Option<Vec<Value>>,
    ) -> Result<Option<Vec<Value>>> {
        self.call1("echoNullableList", list).await
    }

    pub async fn echo_nullable_map(&self, a_map: Option<Map>) -> Result<Option<Map>> {
        self.call1("echoNullableMap", a_map).await
    }

    pub async fn echo_nullable_enum(&self, an_enum: Option<AnEnum>) -> Result<Option<AnEnum>> {
        self.call1("echoNullableEnum", an_enum).await
    }

    pub async fn noop_async(&self) -> Result<()> {
        self.call0("noopAsync").await
    }

    pub async fn echo_async_string(&self, a_string: String) -> Result<String> {
        self.call1("echoAsyncString", a_string).await
    }
}
