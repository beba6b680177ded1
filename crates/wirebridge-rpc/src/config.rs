use std::time::Duration;

/// Default channel name prefix: handlers for API `Foo` listen on `wirebridge.Foo`.
pub const DEFAULT_CHANNEL_PREFIX: &str = "wirebridge";

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Prefix joined to the API name with a `.` to form the channel name.
    pub channel_prefix: String,
    /// Timeout applied by [`PendingCall::wait`](crate::PendingCall::wait).
    /// `None` waits until reply or closure.
    pub default_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel_prefix: DEFAULT_CHANNEL_PREFIX.to_string(),
            default_timeout: None,
        }
    }
}

impl SessionConfig {
    /// Channel name for an API grouping.
    pub fn channel_name(&self, api: &str) -> String {
        if self.channel_prefix.is_empty() {
            api.to_string()
        } else {
            format!("{}.{api}", self.channel_prefix)
        }
    }
}
