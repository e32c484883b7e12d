//! HTTP client module with retry logic and error handling.

mod client;
mod retry;

pub use client::{HttpClient, check_status};
pub use retry::{BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, RetryPolicy, with_retry};
