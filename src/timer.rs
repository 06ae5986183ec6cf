//! Async delays that work on every target: the tokio timer natively, the
//! browser's `setTimeout` on wasm.

use std::time::Duration;

/// Wait for `duration`. A zero duration returns without yielding.
pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;

    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_sleep_waits_at_least_the_duration() {
        let started = Instant::now();
        sleep(Duration::from_millis(20)).await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_zero_sleep_returns_immediately() {
        let started = Instant::now();
        sleep(Duration::ZERO).await;
        assert!(started.elapsed() < Duration::from_millis(20));
    }
}
