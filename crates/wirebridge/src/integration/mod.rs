//! Stubs for the integration-test API surface, written the way a stub
//! generator emits them.
//!
//! The host exposes [`HostIntegrationCoreApi`]; the guest may expose
//! [`PeerIntegrationCoreApi`] so the host can call back into it. Both
//! ride on one [`Session`](wirebridge_rpc::Session) and share the type
//! registry returned by [`registry`]. The [`small`] groupings show several
//! APIs, and several instances of one API, sharing a session.

mod glue;
pub mod host;
pub mod peer;
pub mod small;
pub mod test_api;
pub mod types;

pub use glue::{api_name, forward, record_from_rpc};
pub use host::{
    set_up_host_integration_core_api, HostIntegrationCoreApi, HostIntegrationCoreApiProxy,
    DEFAULT_NAMED_STRING, DEFAULT_OPTIONAL_DOUBLE, HOST_INTEGRATION_CORE_API,
};
pub use peer::{
    set_up_peer_integration_core_api, PeerIntegrationCoreApi, PeerIntegrationCoreApiProxy,
    PEER_INTEGRATION_CORE_API,
};
pub use small::{
    set_up_host_small_api, set_up_host_trivial_api, set_up_peer_small_api, HostSmallApi,
    HostSmallApiProxy, HostTrivialApi, HostTrivialApiProxy, PeerSmallApi, PeerSmallApiProxy,
    HOST_SMALL_API, HOST_TRIVIAL_API, PEER_SMALL_API,
};
pub use test_api::{EchoPeerApi, EchoSmallApi, TestHostApi};
pub use types::{
    registry, schema_document, AllClassesWrapper, AllNullableTypes,
    AllNullableTypesWithoutRecursion, AllTypes, AnEnum, Map, TestMessage,
    ALL_CLASSES_WRAPPER_TYPE_ID, ALL_NULLABLE_TYPES_TYPE_ID,
    ALL_NULLABLE_TYPES_WITHOUT_RECURSION_TYPE_ID, ALL_TYPES_TYPE_ID, AN_ENUM_TYPE_ID,
    TEST_MESSAGE_TYPE_ID,
};
