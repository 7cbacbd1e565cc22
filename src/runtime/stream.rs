//! Lazy wrapping of an asynchronous result sequence
//!
//! [`LazyStream`] attaches optional per-item and whole-sequence stages to any
//! fallible stream: a predicate (skip items), a collector (transform items),
//! an alternative collection shape, and a final reduction. Everything is
//! applied lazily as the wrapper is consumed; with nothing configured the
//! wrapper is a pure pass-through of the underlying sequence.

use futures::{Stream, StreamExt};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use crate::core::Result;

type Predicate<T> = Box<dyn FnMut(&T) -> bool + Send>;
type Collector<T, U> = Box<dyn FnMut(T) -> U + Send>;
type Finish<U, R> = Box<dyn FnOnce(Vec<U>) -> R + Send>;

/// A lazy sequence with optional filter, transform, and reduction stages
///
/// Type parameters: `T` is the raw item produced by the underlying sequence,
/// `U` the item after the collector stage (defaults to `T`), and `R` the
/// aggregate produced when the wrapper is awaited (defaults to `Vec<U>`).
///
/// Two consumption modes stay mutually consistent:
///
/// - as a [`Stream`], one resolved item is pulled at a time, with the
///   predicate and collector applied per pull;
/// - awaited via [`IntoFuture`], the whole sequence is drained (first error
///   wins) and the collection/reduction stages produce one aggregate value.
///
/// # Examples
///
/// ```rust,no_run
/// use cmdstream::{parallel, Command};
///
/// # #[tokio::main]
/// # async fn main() -> cmdstream::Result<()> {
/// let failed: usize = parallel((0..8).map(|_| Command::new("true")))
///     .filter(|outcome| !outcome.success())
///     .reduce(|outcomes| outcomes.len())
///     .await?;
/// assert_eq!(failed, 0);
/// # Ok(())
/// # }
/// ```
pub struct LazyStream<T, U = T, R = Vec<U>> {
    inner: Pin<Box<dyn Stream<Item = Result<T>> + Send>>,
    predicate: Option<Predicate<T>>,
    collector: Collector<T, U>,
    finish: Finish<U, R>,
}

impl<T> LazyStream<T>
where
    T: Send + 'static,
{
    /// Wrap a stream with no stages configured (pure pass-through)
    pub fn new(stream: impl Stream<Item = Result<T>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
            predicate: None,
            collector: Box::new(|item| item),
            finish: Box::new(|items| items),
        }
    }
}

impl<T, U, R> LazyStream<T, U, R> {
    /// Keep only items the predicate accepts
    ///
    /// Rejected items are silently skipped: not yielded, not collected, not
    /// counted.
    pub fn filter(mut self, predicate: impl FnMut(&T) -> bool + Send + 'static) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }
}

impl<T: 'static, U: 'static> LazyStream<T, U, Vec<U>> {
    /// Transform each item before it reaches the consumer
    ///
    /// Configure `map` before `collect_with`/`reduce`; it resets the
    /// whole-sequence stages to operate on the transformed items.
    pub fn map<V>(self, mut collector: impl FnMut(U) -> V + Send + 'static) -> LazyStream<T, V, Vec<V>> {
        let mut previous = self.collector;
        LazyStream {
            inner: self.inner,
            predicate: self.predicate,
            collector: Box::new(move |item| collector(previous(item))),
            finish: Box::new(|items| items),
        }
    }

    /// Choose the collection shape produced when awaited as a whole
    ///
    /// Applied instead of the default `Vec` when the wrapper is consumed as
    /// a single collected value rather than item by item.
    pub fn collect_with<C>(
        self,
        iterator: impl FnOnce(Vec<U>) -> C + Send + 'static,
    ) -> LazyStream<T, U, C> {
        LazyStream {
            inner: self.inner,
            predicate: self.predicate,
            collector: self.collector,
            finish: Box::new(iterator),
        }
    }
}

impl<T, U: 'static, R: 'static> LazyStream<T, U, R> {
    /// Reduce the awaited aggregate to a single value
    ///
    /// Composes with any previously configured collection stage: the
    /// reduction receives whatever that stage produced.
    pub fn reduce<R2>(self, result: impl FnOnce(R) -> R2 + Send + 'static) -> LazyStream<T, U, R2> {
        let previous = self.finish;
        LazyStream {
            inner: self.inner,
            predicate: self.predicate,
            collector: self.collector,
            finish: Box::new(move |items| result(previous(items))),
        }
    }
}

impl<T, U, R> Stream for LazyStream<T, U, R> {
    type Item = Result<U>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match ready!(this.inner.as_mut().poll_next(cx)) {
                None => return Poll::Ready(None),
                Some(Err(error)) => return Poll::Ready(Some(Err(error))),
                Some(Ok(item)) => {
                    if let Some(predicate) = this.predicate.as_mut() {
                        if !predicate(&item) {
                            continue;
                        }
                    }
                    return Poll::Ready(Some(Ok((this.collector)(item))));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // The predicate may skip items, so only the upper bound survives.
        let upper = self.inner.size_hint().1;
        (0, upper)
    }
}

impl<T, U, R> IntoFuture for LazyStream<T, U, R>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Send + 'static,
{
    type Output = Result<R>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    /// Drain the sequence and produce the aggregate value
    ///
    /// The first error encountered during collection is returned and the
    /// collection/reduction stages never run.
    fn into_future(mut self) -> Self::IntoFuture {
        Box::pin(async move {
            let mut items = Vec::new();
            while let Some(item) = self.next().await {
                items.push(item?);
            }
            Ok((self.finish)(items))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use futures::stream;
    use std::collections::HashSet;

    fn source(items: Vec<Result<i32>>) -> LazyStream<i32> {
        LazyStream::new(stream::iter(items))
    }

    fn ok_items(values: &[i32]) -> Vec<Result<i32>> {
        values.iter().copied().map(Ok).collect()
    }

    #[tokio::test]
    async fn test_pass_through_identity() {
        let mut wrapped = source(ok_items(&[3, 1, 2]));
        let mut seen = Vec::new();
        while let Some(item) = wrapped.next().await {
            seen.push(item.unwrap());
        }
        assert_eq!(seen, [3, 1, 2]);
    }

    #[tokio::test]
    async fn test_pass_through_await() {
        let collected = source(ok_items(&[3, 1, 2])).await.unwrap();
        assert_eq!(collected, [3, 1, 2]);
    }

    #[tokio::test]
    async fn test_predicate_skips_items() {
        let collected = source(ok_items(&[0, 1, 0, 2]))
            .filter(|item| *item == 0)
            .await
            .unwrap();
        assert_eq!(collected, [0, 0]);
    }

    #[tokio::test]
    async fn test_collector_transforms_items() {
        let collected = source(ok_items(&[1, 2, 3]))
            .map(|item| item * 10)
            .await
            .unwrap();
        assert_eq!(collected, [10, 20, 30]);
    }

    #[tokio::test]
    async fn test_filter_then_map_per_item() {
        let mut wrapped = source(ok_items(&[1, 2, 3, 4]))
            .filter(|item| item % 2 == 0)
            .map(|item| item + 100);
        let mut seen = Vec::new();
        while let Some(item) = wrapped.next().await {
            seen.push(item.unwrap());
        }
        assert_eq!(seen, [102, 104]);
    }

    #[tokio::test]
    async fn test_collect_with_alternative_shape() {
        let collected: HashSet<i32> = source(ok_items(&[1, 2, 2, 1]))
            .collect_with(|items| items.into_iter().collect())
            .await
            .unwrap();
        assert_eq!(collected, HashSet::from([1, 2]));
    }

    #[tokio::test]
    async fn test_reduce_to_single_value() {
        let total = source(ok_items(&[1, 2, 3]))
            .reduce(|items| items.into_iter().sum::<i32>())
            .await
            .unwrap();
        assert_eq!(total, 6);
    }

    #[tokio::test]
    async fn test_reduce_composes_with_collect_with() {
        let distinct = source(ok_items(&[1, 2, 2, 1]))
            .collect_with(|items| items.into_iter().collect::<HashSet<i32>>())
            .reduce(|set| set.len())
            .await
            .unwrap();
        assert_eq!(distinct, 2);
    }

    #[tokio::test]
    async fn test_first_error_wins_when_awaited() {
        let items = vec![Ok(1), Err(Error::launch("boom")), Ok(2)];
        let result = source(items).await;
        assert!(matches!(result, Err(Error::Launch(_))));
    }

    #[tokio::test]
    async fn test_error_interleaved_in_stream_mode() {
        let items = vec![Ok(1), Err(Error::launch("boom")), Ok(2)];
        let mut wrapped = source(items);

        assert_eq!(wrapped.next().await.unwrap().unwrap(), 1);
        assert!(wrapped.next().await.unwrap().is_err());
        assert_eq!(wrapped.next().await.unwrap().unwrap(), 2);
        assert!(wrapped.next().await.is_none());
    }

    #[tokio::test]
    async fn test_error_bypasses_predicate() {
        let items = vec![Err(Error::launch("boom")), Ok(5)];
        let mut wrapped = source(items).filter(|_| false);

        assert!(wrapped.next().await.unwrap().is_err());
        assert!(wrapped.next().await.is_none());
    }
}
