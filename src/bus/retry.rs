use std::{fmt::Display, future::Future, time::Duration};

///
/// Keep running the operation with a fixed pause between
/// failed attempts until it succeeds
///
pub async fn retry_forever<F, Fut, T, E>(
    interval: Duration,
    operation: &'static str,
    mut op: F,
) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    for attempt in 1u32.. {
        tracing::info!(operation, attempt, "attempting");
        match op().await {
            Ok(value) => return value,
            Err(err) => tracing::warn!(operation, attempt, %err, "attempt failed"),
        }

        tokio::time::sleep(interval).await;
    }

    unreachable!()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn retry_forever_returns_first_ok() {
        let attempts = AtomicU32::new(0);

        let value = retry_forever(Duration::from_secs(1), "test operation", || async {
            match attempts.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err("not yet"),
                _ => Ok(7),
            }
        })
        .await;

        assert_eq!(value, 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
