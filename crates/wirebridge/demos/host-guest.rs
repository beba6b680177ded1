//! Host and guest in one process, talking over an in-memory byte pipe.
//!
//! Run with:
//!   cargo run -p wirebridge --example host-guest

use std::sync::Arc;

use wirebridge::channel::StreamChannel;
use wirebridge::codec::Value;
use wirebridge::integration::{
    registry, set_up_host_integration_core_api, set_up_peer_integration_core_api, AnEnum,
    EchoPeerApi, HostIntegrationCoreApiProxy, TestHostApi,
};
use wirebridge::rpc::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(registry()?);
    let (host_io, guest_io) = tokio::io::duplex(64 * 1024);

    let host = Session::new(Arc::new(StreamChannel::new(host_io)), Arc::clone(&registry));
    set_up_host_integration_core_api(&host, TestHostApi::new(&host).into_arc());

    let guest = Session::new(Arc::new(StreamChannel::new(guest_io)), registry);
    set_up_peer_integration_core_api(&guest, Arc::new(EchoPeerApi));

    let api = HostIntegrationCoreApiProxy::new(&guest);
    println!("echoInt(123) = {}", api.echo_int(123).await?);
    println!("echoEnum(fortyTwo) = {:?}", api.echo_enum(AnEnum::FortyTwo).await?);
    println!(
        "echoList = {:?}",
        api.echo_list(vec![Value::Int(1), Value::from("two")]).await?
    );
    println!("callPeerEchoString = {}", api.call_peer_echo_string("round trip").await?);

    match api.throw_error().await {
        Ok(value) => println!("throwError unexpectedly returned {value:?}"),
        Err(err) => println!("throwError -> {err} (code {})", err.code()),
    }

    guest.teardown();
    host.teardown();
    Ok(())
}
