use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::UnixStream;
use wirebridge::channel::StreamChannel;
use wirebridge::integration::registry;
use wirebridge::rpc::{Session, SessionConfig};

use crate::cmd::CallArgs;
use crate::exit::{
    io_error, rpc_error, schema_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE,
};
use crate::json::{check_render_depth, parse_args, to_json};
use crate::output::{print_call_result, OutputFormat};

pub async fn run(args: CallArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let call_args = parse_args(&args.args).map_err(CliError::usage)?;
    let registry = Arc::new(registry().map_err(|err| schema_error("registry load failed", err))?);

    let stream = tokio::time::timeout(timeout, UnixStream::connect(&args.path))
        .await
        .map_err(|_| {
            CliError::new(
                crate::exit::TIMEOUT,
                format!("connect to {} timed out", args.path.display()),
            )
        })?
        .map_err(|err| io_error(&format!("connect to {} failed", args.path.display()), err))?;

    let config = SessionConfig {
        channel_prefix: args.prefix,
        ..SessionConfig::default()
    };
    let session = Session::with_config(
        Arc::new(StreamChannel::new(stream)),
        Arc::clone(&registry),
        config,
    );
    let proxy = session.proxy(&args.api);
    tracing::debug!(channel = proxy.channel_name(), method = %args.method, "calling");

    let started = Instant::now();
    let value = proxy
        .call_with_timeout(&args.method, call_args, timeout)
        .await
        .map_err(|err| rpc_error(&format!("{} failed", args.method), err))?;
    let elapsed = started.elapsed();
    check_render_depth(&value)
        .map_err(|msg| CliError::new(DATA_INVALID, format!("{} result: {msg}", args.method)))?;

    print_call_result(
        proxy.channel_name(),
        &args.method,
        &to_json(&value, &registry),
        elapsed,
        format,
    );
    session.teardown();
    Ok(SUCCESS)
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, from_unit): (&str, fn(u64) -> Duration) =
        if let Some(num) = input.strip_suffix("ms") {
            (num, Duration::from_millis)
        } else if let Some(num) = input.strip_suffix('s') {
            (num, Duration::from_secs)
        } else {
            (input, Duration::from_secs)
        };

    match number.parse::<u64>() {
        Ok(0) => Err(CliError::new(USAGE, "duration must be greater than zero")),
        Ok(value) => Ok(from_unit(value)),
        Err(_) => Err(CliError::new(
            USAGE,
            format!("invalid duration value: {input}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        for bad in ["0s", "bad", "", "-1s", "5m"] {
            let err = parse_duration(bad).unwrap_err();
            assert_eq!(err.code, USAGE, "{bad}");
        }
    }
}
