use std::collections::HashMap;
use std::fmt::Debug;
use std::future::poll_fn;
use std::hash::Hash;
use std::pin::{Pin, pin};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Poll, Waker};

use tracing::trace;

pub trait BatchLoader {
    type K: Hash + Eq + Clone + Send + 'static;
    type V: Clone + Send + 'static;

    /// Resolves a whole batch of keys at once.
    ///
    /// Keys missing from the returned map resolve to `None`.
    fn load_batch(
        &mut self,
        keys: Vec<Self::K>,
    ) -> impl Future<Output = HashMap<Self::K, Self::V>> + Send + 'static;
}

enum Entry<V> {
    Requested(Vec<Waker>),
    Ready(Option<V>),
}

struct LoaderInner<B: BatchLoader> {
    values: HashMap<B::K, Entry<B::V>>,
    pending_keys: HashMap<B::K, Vec<Waker>>,
    load_batch: B,
}

type BatchFuture<B> =
    Pin<Box<dyn Future<Output = HashMap<<B as BatchLoader>::K, <B as BatchLoader>::V>> + Send>>;

/// Per-request cache that coalesces every `load` issued during one poll of the
/// wrapped future into a single `load_batch` call.
pub struct DataLoader<B: BatchLoader> {
    inner: Arc<Mutex<LoaderInner<B>>>,
}
impl<B: BatchLoader> Clone for DataLoader<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B: BatchLoader> DataLoader<B>
where
    B::K: Debug,
{
    pub fn new(load_batch: B) -> Self {
        let inner = LoaderInner {
            load_batch,
            values: Default::default(),
            pending_keys: Default::default(),
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoaderInner<B>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Only makes progress while the executing future is driven through [`DataLoader::wrap`].
    pub fn load(&self, key: B::K) -> impl Future<Output = Option<B::V>> {
        poll_fn(move |cx| {
            let mut inner = self.lock();

            let wakers = match inner.values.get_mut(&key) {
                Some(Entry::Ready(v)) => {
                    return Poll::Ready(v.clone());
                }
                Some(Entry::Requested(wakers)) => wakers,
                None => inner.pending_keys.entry(key.clone()).or_insert_with(|| {
                    trace!(?key, "queueing key for the next batch");
                    vec![]
                }),
            };

            wakers.push(cx.waker().clone());
            Poll::Pending
        })
    }

    /// Forgets every resolved value, so later loads observe writes made since.
    pub fn clear(&self) {
        self.lock()
            .values
            .retain(|_, entry| matches!(entry, Entry::Requested(_)));
    }

    pub async fn wrap<O>(&self, fut: impl Future<Output = O>) -> O {
        let mut currently_loading: Option<(Vec<B::K>, BatchFuture<B>)> = None;

        let mut fut = pin!(fut);
        poll_fn(move |cx| {
            if let Some((keys, loading)) = &mut currently_loading {
                match loading.as_mut().poll(cx) {
                    Poll::Ready(mut loaded) => {
                        let mut inner = self.lock();

                        // Wake all the `load` calls waiting on this batch
                        for k in std::mem::take(keys) {
                            let v = loaded.remove(&k);
                            if let Some(Entry::Requested(wakers)) =
                                inner.values.insert(k, Entry::Ready(v))
                            {
                                for w in wakers {
                                    w.wake();
                                }
                            }
                        }

                        currently_loading = None;
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            let res = fut.as_mut().poll(cx);
            if res.is_pending() {
                // We have polled the inner future once, during which it may have registered more
                // keys to load.
                let mut inner = self.lock();

                if !inner.pending_keys.is_empty() {
                    let mut keys = Vec::with_capacity(inner.pending_keys.len());
                    for (k, v) in std::mem::take(&mut inner.pending_keys) {
                        keys.push(k.clone());
                        inner.values.insert(k, Entry::Requested(v));
                    }

                    let load_future: BatchFuture<B> =
                        Box::pin(inner.load_batch.load_batch(keys.clone()));
                    currently_loading = Some((keys, load_future));

                    // Wake immediately, to instruct the runtime to call `poll` again.
                    cx.waker().wake_by_ref();
                }
            }
            res
        })
        .await
    }
}
