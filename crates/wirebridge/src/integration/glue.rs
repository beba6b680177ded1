//! Registration helpers shared by the generated `set_up_*` functions.

use std::future::Future;
use std::sync::Arc;

use wirebridge_codec::{ErrorRecord, FromValue, IntoValue};
use wirebridge_rpc::stub::{arg, take_args};
use wirebridge_rpc::{Dispatcher, RpcError, TypedCompletion};

pub(crate) fn nullary<A, R, F>(dispatcher: &Dispatcher, api: &Arc<A>, method: &'static str, call: F)
where
    A: Send + Sync + 'static,
    R: IntoValue + 'static,
    F: Fn(&A) -> Result<R, ErrorRecord> + Send + Sync + 'static,
{
    let api = Arc::clone(api);
    dispatcher.register(method, move |args| {
        take_args::<0>(method, args)?;
        call(&api).map(IntoValue::into_value)
    });
}

pub(crate) fn unary<A, T, R, F>(
    dispatcher: &Dispatcher,
    api: &Arc<A>,
    method: &'static str,
    param: &'static str,
    call: F,
) where
    A: Send + Sync + 'static,
    T: FromValue + 'static,
    R: IntoValue + 'static,
    F: Fn(&A, T) -> Result<R, ErrorRecord> + Send + Sync + 'static,
{
    let api = Arc::clone(api);
    dispatcher.register(method, move |args| {
        let [value] = take_args::<1>(method, args)?;
        call(&api, arg(value, param)?).map(IntoValue::into_value)
    });
}

pub(crate) fn nullary_async<A, R, F>(
    dispatcher: &Dispatcher,
    api: &Arc<A>,
    method: &'static str,
    call: F,
) where
    A: Send + Sync + 'static,
    R: IntoValue + 'static,
    F: Fn(&A, TypedCompletion<R>) + Send + Sync + 'static,
{
    let api = Arc::clone(api);
    dispatcher.register_async(method, move |args, completion| {
        if let Err(err) = take_args::<0>(method, args) {
            completion.reject(err);
            return;
        }
        call(&api, TypedCompletion::new(completion));
    });
}

pub(crate) fn unary_async<A, T, R, F>(
    dispatcher: &Dispatcher,
    api: &Arc<A>,
    method: &'static str,
    param: &'static str,
    call: F,
) where
    A: Send + Sync + 'static,
    T: FromValue + 'static,
    R: IntoValue + 'static,
    F: Fn(&A, T, TypedCompletion<R>) + Send + Sync + 'static,
{
    let api = Arc::clone(api);
    dispatcher.register_async(method, move |args, completion| {
        let value = match take_args::<1>(method, args).and_then(|[value]| arg(value, param)) {
            Ok(value) => value,
            Err(err) => {
                completion.reject(err);
                return;
            }
        };
        call(&api, value, TypedCompletion::new(completion));
    });
}

pub(crate) fn ternary<A, T, U, V, R, F>(
    dispatcher: &Dispatcher,
    api: &Arc<A>,
    method: &'static str,
    params: [&'static str; 3],
    call: F,
) where
    A: Send + Sync + 'static,
    T: FromValue + 'static,
    U: FromValue + 'static,
    V: FromValue + 'static,
    R: IntoValue + 'static,
    F: Fn(&A, T, U, V) -> Result<R, ErrorRecord> + Send + Sync + 'static,
{
    let api = Arc::clone(api);
    dispatcher.register(method, move |args| {
        let [a, b, c] = take_args::<3>(method, args)?;
        call(&api, arg(a, params[0])?, arg(b, params[1])?, arg(c, params[2])?)
            .map(IntoValue::into_value)
    });
}

pub(crate) fn ternary_async<A, T, U, V, R, F>(
    dispatcher: &Dispatcher,
    api: &Arc<A>,
    method: &'static str,
    params: [&'static str; 3],
    call: F,
) where
    A: Send + Sync + 'static,
    T: FromValue + 'static,
    U: FromValue + 'static,
    V: FromValue + 'static,
    R: IntoValue + 'static,
    F: Fn(&A, T, U, V, TypedCompletion<R>) + Send + Sync + 'static,
{
    let api = Arc::clone(api);
    dispatcher.register_async(method, move |args, completion| {
        let decoded = take_args::<3>(method, args).and_then(|[a, b, c]| {
            Ok((arg(a, params[0])?, arg(b, params[1])?, arg(c, params[2])?))
        });
        match decoded {
            Ok((a, b, c)) => call(&api, a, b, c, TypedCompletion::new(completion)),
            Err(err) => {
                completion.reject(err);
            }
        }
    });
}

/// API grouping name for one of several instances of the same API on a
/// session. An empty suffix names the default instance.
pub fn api_name(api: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        api.to_string()
    } else {
        format!("{api}.{suffix}")
    }
}

/// Error record to hand back when a nested call to the peer fails.
pub fn record_from_rpc(err: RpcError) -> ErrorRecord {
    match err.record() {
        Some(record) => record.clone(),
        None => ErrorRecord::new(err.code(), err.to_string()),
    }
}

/// Complete `completion` with the outcome of a call made to the peer.
///
/// Needs a tokio runtime on the current thread; without one the call is
/// rejected with `native-error`.
pub fn forward<T, Fut>(completion: TypedCompletion<T>, call: Fut)
where
    T: IntoValue + Send + 'static,
    Fut: Future<Output = wirebridge_rpc::Result<T>> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move {
                completion.complete(call.await.map_err(record_from_rpc));
            });
        }
        Err(_) => completion.reject(ErrorRecord::native_error(
            "peer call issued outside a tokio runtime",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::api_name;

    #[test]
    fn suffix_is_appended_after_a_dot() {
        assert_eq!(api_name("HostSmallApi", ""), "HostSmallApi");
        assert_eq!(api_name("HostSmallApi", "suffixOne"), "HostSmallApi.suffixOne");
    }
}
