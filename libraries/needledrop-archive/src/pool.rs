//! Bounded pull-based worker pool.

use futures_util::future::join_all;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Run `f` over `items` with at most `concurrency` calls in flight.
///
/// Each worker repeatedly claims the next unclaimed index until the list is
/// exhausted. Failed items are logged and skipped; they never fail the
/// batch. Results come back grouped by worker, so their order does not
/// follow `items`.
pub async fn run_concurrent<'a, T, R, E, F, Fut>(items: &'a [T], concurrency: usize, f: F) -> Vec<R>
where
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Display,
{
    let next = AtomicUsize::new(0);
    let workers = concurrency.max(1).min(items.len());

    let next = &next;
    let f = &f;
    let batches = join_all((0..workers).map(|worker| async move {
        let mut done = Vec::new();
        loop {
            let index = next.fetch_add(1, Ordering::Relaxed);
            let Some(item) = items.get(index) else {
                break;
            };

            match f(item).await {
                Ok(result) => done.push(result),
                Err(e) => debug!(worker, index, error = %e, "Dropping failed item"),
            }
        }
        done
    }))
    .await;

    batches.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn processes_every_item_and_skips_failures() {
        let items: Vec<u32> = (0..20).collect();
        let mut results = run_concurrent(&items, 5, |n| async move {
            if n % 4 == 0 {
                Err(format!("item {n} failed"))
            } else {
                Ok(n * 10)
            }
        })
        .await;

        results.sort_unstable();
        let expected: Vec<u32> = (0..20).filter(|n| n % 4 != 0).map(|n| n * 10).collect();
        assert_eq!(results, expected);
    }

    #[tokio::test]
    async fn never_exceeds_concurrency() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let items: Vec<u32> = (0..12).collect();

        let results = run_concurrent(&items, 3, |n| {
            let in_flight = &in_flight;
            let peak = &peak;
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, String>(*n)
            }
        })
        .await;

        assert_eq!(results.len(), 12);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn empty_input() {
        let items: Vec<u32> = Vec::new();
        let results = run_concurrent(&items, 5, |n| async move { Ok::<_, String>(*n) }).await;
        assert!(results.is_empty());
    }
}
