/// Event name for `{node id: status code}` notifications
pub const STATUS_CHANNEL: &str = "notify.process.status";
/// Event name for `{node id: error message}` notifications
pub const ERROR_CHANNEL: &str = "notify.process.error";
/// Namespace notifications are broadcast to when the config doesn't name one
pub const DEFAULT_NAMESPACE: &str = "/";
/// Buffered events per broadcast subscriber before the slowest one lags
pub const NOTIFICATION_BUFFER: usize = 1024;
