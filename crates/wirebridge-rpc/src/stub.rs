//! Helpers used by generated API stubs.
//!
//! Generated dispatcher glue unpacks positional arguments with
//! [`take_args`] and [`arg`], and hands asynchronous implementations a
//! [`TypedCompletion`] bound to the method's return type.

use std::marker::PhantomData;

use wirebridge_codec::{codes, ErrorRecord, FromValue, IntoValue, Value};

use crate::dispatcher::Completion;

/// Split an argument list into exactly `N` positional values.
pub fn take_args<const N: usize>(method: &str, args: Vec<Value>) -> Result<[Value; N], ErrorRecord> {
    args.try_into().map_err(|args: Vec<Value>| {
        ErrorRecord::new(
            codes::MALFORMED_PAYLOAD,
            format!("'{method}' expects {N} arguments, got {}", args.len()),
        )
    })
}

/// Convert one positional argument, naming it in the error.
pub fn arg<T: FromValue>(value: Value, name: &str) -> Result<T, ErrorRecord> {
    T::from_value(value).map_err(|err| {
        ErrorRecord::new(
            codes::MALFORMED_PAYLOAD,
            format!("argument '{name}': {err}"),
        )
    })
}

/// Typed view of a [`Completion`] for a method returning `T`.
pub struct TypedCompletion<T> {
    completion: Completion,
    _result: PhantomData<fn(T)>,
}

impl<T: IntoValue> TypedCompletion<T> {
    pub fn new(completion: Completion) -> Self {
        Self {
            completion,
            _result: PhantomData,
        }
    }

    pub fn resolve(self, value: T) {
        self.completion.resolve(value.into_value());
    }

    pub fn reject(self, error: ErrorRecord) {
        self.completion.reject(error);
    }

    pub fn complete(self, result: Result<T, ErrorRecord>) {
        self.completion.complete(result.map(IntoValue::into_value));
    }
}
