use futures::future::join_all;
use std::future::Future;

/// Run every future concurrently and keep each outcome.
/// A failing future never cancels or hides its siblings.
pub async fn gather_settled<I, F, T, E>(futures: I) -> Vec<Result<T, E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    join_all(futures).await
}

/// Split settled results into successes and failures, preserving input order.
pub fn partition_settled<T, E>(results: Vec<Result<T, E>>) -> (Vec<T>, Vec<E>) {
    let mut ok = Vec::with_capacity(results.len());
    let mut failed = Vec::new();
    for result in results {
        match result {
            Ok(value) => ok.push(value),
            Err(e) => failed.push(e),
        }
    }
    (ok, failed)
}
