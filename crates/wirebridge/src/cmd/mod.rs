use clap::{Args, Subcommand};
use std::path::PathBuf;

use wirebridge::integration::HOST_INTEGRATION_CORE_API;
use wirebridge::rpc::DEFAULT_CHANNEL_PREFIX;

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod call;
pub mod schema;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the integration host API on a Unix socket.
    Serve(ServeArgs),
    /// Make one call and print its result.
    Call(CallArgs),
    /// Print the integration type registry.
    Schema(SchemaArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => block_on(serve::run(args, format)),
        Command::Call(args) => block_on(call::run(args, format)),
        Command::Schema(args) => schema::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

fn block_on<F>(future: F) -> CliResult<i32>
where
    F: std::future::Future<Output = CliResult<i32>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("runtime start failed", err))?;
    runtime.block_on(future)
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Channel name prefix.
    #[arg(long, default_value = DEFAULT_CHANNEL_PREFIX)]
    pub prefix: String,
    /// Exit after the first connection closes.
    #[arg(long)]
    pub once: bool,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Socket path to connect to.
    pub path: PathBuf,
    /// Method name, e.g. echoInt.
    pub method: String,
    /// Arguments as a JSON array.
    #[arg(long, default_value = "[]")]
    pub args: String,
    /// API grouping the method belongs to.
    #[arg(long, default_value = HOST_INTEGRATION_CORE_API)]
    pub api: String,
    /// Channel name prefix.
    #[arg(long, default_value = DEFAULT_CHANNEL_PREFIX)]
    pub prefix: String,
    /// Maximum time to wait for the reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Load the registry from a JSON schema document instead of the
    /// built-in integration types.
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
