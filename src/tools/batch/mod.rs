//! Bounded Concurrency
//!
//! Independent jobs (one per venue) run through a fixed-size window of
//! in-flight futures. Nothing is spawned, so jobs may borrow from the caller.

use std::future::Future;

use futures_util::stream::{self, StreamExt};

/// Run `operation` over `items` with at most `concurrency` futures in flight.
///
/// Results arrive in completion order. A concurrency of zero is treated as one.
pub async fn batch<T, F, Fut, R>(items: Vec<T>, concurrency: usize, operation: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    stream::iter(items)
        .map(operation)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

/// Like [`batch`], but results keep the order of `items`.
pub async fn batch_ordered<T, F, Fut, R>(items: Vec<T>, concurrency: usize, operation: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    let operation = &operation;
    let indexed: Vec<(usize, T)> = items.into_iter().enumerate().collect();
    let mut results = batch(indexed, concurrency, |(index, item)| async move {
        (index, operation(item).await)
    })
    .await;
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}
