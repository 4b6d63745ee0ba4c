//! Bounded polling used by state verification

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::trace;

/// Observes repeatedly until `accept` holds or `attempts` run out, sleeping
/// `delay` between attempts (never after the last one).
///
/// Returns the last observed value either way, so callers can report what
/// the page actually settled on. Zero attempts is treated as one.
pub async fn poll_until<T, E, F, Fut, P>(
    mut observe: F,
    accept: P,
    attempts: u32,
    delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&T) -> bool,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        let observed = observe().await?;
        if accept(&observed) || attempt >= attempts {
            trace!(attempt, attempts, "poll finished");
            return Ok(observed);
        }
        attempt += 1;
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn stops_as_soon_as_accepted() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let seen = poll_until(
            move || async move { Ok::<_, Infallible>(calls.fetch_add(1, Ordering::SeqCst) + 1) },
            |n| *n == 3,
            10,
            Duration::ZERO,
        )
        .await
        .unwrap();
        assert_eq!(seen, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_last_observation_when_exhausted() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let seen = poll_until(
            move || async move { Ok::<_, Infallible>(calls.fetch_add(1, Ordering::SeqCst)) },
            |_| false,
            0,
            Duration::ZERO,
        )
        .await
        .unwrap();
        assert_eq!(seen, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_only_between_attempts() {
        let start = tokio::time::Instant::now();
        let _ = poll_until(
            || async { Ok::<_, Infallible>(()) },
            |_| false,
            3,
            Duration::from_millis(100),
        )
        .await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(300));
    }

    #[tokio::test]
    async fn observation_errors_propagate() {
        let result: Result<u32, &str> =
            poll_until(|| async { Err("gone") }, |_| true, 3, Duration::ZERO).await;
        assert_eq!(result, Err("gone"));
    }
}
