use std::os::unix::fs::FileTypeExt;
use std::path::Path;
use std::sync::Arc;

use tokio::net::UnixListener;
use tokio::task::JoinSet;
use wirebridge::channel::{Channel, StreamChannel};
use wirebridge::codec::TypeRegistry;
use wirebridge::integration::{
    registry, set_up_host_integration_core_api, set_up_host_small_api, set_up_host_trivial_api,
    EchoSmallApi, TestHostApi,
};
use wirebridge::rpc::{Session, SessionConfig};

use crate::cmd::ServeArgs;
use crate::exit::{io_error, schema_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::OutputFormat;

pub async fn run(args: ServeArgs, _format: OutputFormat) -> CliResult<i32> {
    let registry = Arc::new(registry().map_err(|err| schema_error("registry load failed", err))?);
    remove_stale_socket(&args.path)?;
    let listener = UnixListener::bind(&args.path)
        .map_err(|err| io_error(&format!("bind {} failed", args.path.display()), err))?;
    tracing::info!(path = %args.path.display(), prefix = %args.prefix, "serving");

    let mut connections = JoinSet::new();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, _) = accepted.map_err(|err| io_error("accept failed", err))?;
                let config = SessionConfig {
                    channel_prefix: args.prefix.clone(),
                    ..SessionConfig::default()
                };
                let connection = serve_connection(stream, Arc::clone(&registry), config);
                if args.once {
                    connection.await;
                    break;
                }
                connections.spawn(connection);
            }
            _ = &mut shutdown => {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    connections.shutdown().await;
    let _ = std::fs::remove_file(&args.path);
    Ok(SUCCESS)
}

async fn serve_connection(
    stream: tokio::net::UnixStream,
    registry: Arc<TypeRegistry>,
    config: SessionConfig,
) {
    let channel = Arc::new(StreamChannel::new(stream));
    let session = Session::with_config(Arc::clone(&channel) as Arc<dyn Channel>, registry, config);
    set_up_host_integration_core_api(&session, TestHostApi::new(&session).into_arc());
    let small = Arc::new(EchoSmallApi::new());
    set_up_host_trivial_api(&session, "", Arc::clone(&small));
    set_up_host_small_api(&session, "", small);
    tracing::info!("peer connected");

    channel.closed().await;
    session.teardown();
    tracing::info!("peer disconnected");
}

/// Remove a leftover socket file from an earlier run. Anything else at
/// the path is left alone and reported.
fn remove_stale_socket(path: &Path) -> CliResult<()> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => std::fs::remove_file(path)
            .map_err(|err| io_error(&format!("remove stale {} failed", path.display()), err)),
        Ok(_) => Err(CliError::new(
            USAGE,
            format!("{} exists and is not a socket", path.display()),
        )),
        Err(_) => Ok(()),
    }
}
