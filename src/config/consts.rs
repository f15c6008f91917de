/// Work queue depth per service when the config does not set one
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
/// How long the CLI waits for the result of its request (milliseconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
/// Pool size used when neither the service nor the DPE sets one and the
/// core count is unavailable
pub const FALLBACK_POOL_SIZE: usize = 2;
