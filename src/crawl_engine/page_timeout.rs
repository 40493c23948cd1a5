//! Timeout utilities for fetch operations
//!
//! Provides an async timeout wrapper so that slow servers, stalled robots.txt
//! requests and hung renders surface as `TransportError::Timeout` instead of
//! blocking a worker indefinitely.

use std::future::Future;
use std::time::Duration;

use super::crawl_types::TransportError;

/// Run a transport operation with an explicit deadline
///
/// # Returns
/// * `Ok(T)` - Operation completed in time
/// * `Err(TransportError::Timeout)` - Deadline reached first
/// * `Err(_)` - The operation's own failure
pub async fn with_timeout<F, T>(operation: F, timeout: Duration) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reported() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, TransportError>(())
        };
        let result = with_timeout(slow, Duration::from_secs(5)).await;
        assert!(matches!(result, Err(TransportError::Timeout(d)) if d == Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_inner_error_passed_through() {
        let failing = async { Err::<(), _>(TransportError::Status(503)) };
        let result = with_timeout(failing, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(TransportError::Status(503))));
    }
}
