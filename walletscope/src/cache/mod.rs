pub mod key;

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use futures::future::BoxFuture;
use futures::future::FutureExt;
use futures::future::Shared;
use tracing::debug;
use tracing::warn;

pub use key::CacheKey;
pub use key::DataKind;

use crate::error::CacheError;
use crate::error::FetchError;

type CachedValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<CachedValue, FetchError>>>;

struct Entry {
  generation: u64,
  fetch:      SharedFetch,
}

/// Observable state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
  Pending,
  Resolved,
  Failed,
}

/// Per-request fetch deduplication.
///
/// Every distinct [`CacheKey`] is fetched at most once while the cache lives; concurrent
/// callers of the same key await one shared in-flight future and observe the same value or
/// the same [`FetchError`]. A failed key is evicted so the next call fetches again.
///
/// The miss check and the insert of the pending entry happen under one lock acquisition and
/// the lock is never held across an await, so distinct keys proceed in parallel.
///
/// Construct one per page view. Dropping it drops any fetch nobody is awaiting.
#[derive(Default)]
pub struct AggregationCache {
  entries:         Mutex<HashMap<CacheKey, Entry>>,
  next_generation: AtomicU64,
}

impl AggregationCache {
  pub fn new() -> Self { Self::default() }

  /// Returns the value for `key`, running `fetcher` only if no live entry exists.
  ///
  /// `fetcher` is called synchronously while the entry is inserted; the future it returns is
  /// polled by whichever caller awaits first.
  pub async fn get<T, F, Fut>(
    &self,
    key: impl Into<CacheKey>,
    fetcher: F,
  ) -> Result<T, FetchError>
  where
    T: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
  {
    let key = key.into();
    let (generation, fetch) = self.lookup_or_insert(&key, fetcher);

    match fetch.await {
      Ok(value) => value.downcast_ref::<T>().cloned().ok_or_else(|| {
        warn!("cache::get::type_mismatch::{}", key);
        FetchError::from(CacheError::TypeMismatch { key: key.to_string(), expected: std::any::type_name::<T>() })
      }),
      Err(err) => {
        self.evict(&key, generation);
        Err(err)
      },
    }
  }

  fn lookup_or_insert<T, F, Fut>(
    &self,
    key: &CacheKey,
    fetcher: F,
  ) -> (u64, SharedFetch)
  where
    T: Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
  {
    let mut entries = self.lock();

    if let Some(entry) = entries.get(key) {
      // A failure nobody has evicted yet must not be served.
      if !matches!(entry.fetch.peek(), Some(Err(_))) {
        debug!("cache::get::hit::{}", key);
        return (entry.generation, entry.fetch.clone());
      }
    }

    debug!("cache::get::miss::{}", key);
    let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
    let key_text = key.to_string();
    let pending = fetcher();
    let fetch = async move {
      match pending.await {
        Ok(value) => Ok(Arc::new(value) as CachedValue),
        Err(cause) => {
          warn!("cache::fetch::failed::{}::{:#}", key_text, cause);
          Err(FetchError::failed(key_text, cause))
        },
      }
    }
    .boxed()
    .shared();

    entries.insert(key.clone(), Entry { generation, fetch: fetch.clone() });
    (generation, fetch)
  }

  /// Removes `key` only if it still holds the entry created under `generation`.
  fn evict(
    &self,
    key: &CacheKey,
    generation: u64,
  ) {
    let mut entries = self.lock();
    if entries.get(key).is_some_and(|entry| entry.generation == generation) {
      entries.remove(key);
      debug!("cache::evict::{}", key);
    }
  }

  pub fn state(
    &self,
    key: &CacheKey,
  ) -> Option<EntryState> {
    let entries = self.lock();
    entries.get(key).map(|entry| match entry.fetch.peek() {
      None => EntryState::Pending,
      Some(Ok(_)) => EntryState::Resolved,
      Some(Err(_)) => EntryState::Failed,
    })
  }

  pub fn contains(
    &self,
    key: &CacheKey,
  ) -> bool {
    self.lock().contains_key(key)
  }

  pub fn len(&self) -> usize { self.lock().len() }

  pub fn is_empty(&self) -> bool { self.lock().is_empty() }

  fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Entry>> {
    // The map is only mutated by single inserts and removes, so a poisoned guard is still consistent.
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl std::fmt::Debug for AggregationCache {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    let mut keys: Vec<String> = self.lock().keys().map(ToString::to_string).collect();
    keys.sort();
    f.debug_struct("AggregationCache").field("keys", &keys).finish()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::AtomicUsize;
  use std::time::Duration;

  use anyhow::anyhow;
  use pretty_assertions::assert_eq;
  use tokio::sync::oneshot;

  use super::*;
  use crate::error::ProviderError;

  fn counted<T: Send + 'static>(
    calls: &Arc<AtomicUsize>,
    value: T,
  ) -> impl FnOnce() -> BoxFuture<'static, anyhow::Result<T>> + use<T> {
    let calls = Arc::clone(calls);
    move || {
      calls.fetch_add(1, Ordering::SeqCst);
      async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(value)
      }
      .boxed()
    }
  }

  #[test_log::test(tokio::test)]
  async fn concurrent_callers_share_one_fetch() {
    let cache = AggregationCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let (a, b, c) = futures::join!(
      cache.get("overview:eth:0xA", counted(&calls, 7_u64)),
      cache.get("overview:eth:0xA", counted(&calls, 8_u64)),
      cache.get("overview:eth:0xA", counted(&calls, 9_u64)),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (7, 7, 7));
  }

  #[tokio::test]
  async fn resolved_values_are_served_without_fetching() {
    let cache = AggregationCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let first: String = cache.get("k", counted(&calls, "first".to_string())).await.unwrap();
    let second: String = cache.get("k", counted(&calls, "second".to_string())).await.unwrap();

    assert_eq!((first.as_str(), second.as_str()), ("first", "first"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.state(&CacheKey::from("k")), Some(EntryState::Resolved));
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn dedup_holds_across_worker_threads() {
    let cache = Arc::new(AggregationCache::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..16)
      .map(|_| {
        let cache = Arc::clone(&cache);
        let fetcher = counted(&calls, 42_u32);
        tokio::spawn(async move { cache.get("total-transactions:eth:0xA", fetcher).await })
      })
      .collect();

    for handle in handles {
      assert_eq!(handle.await.unwrap().unwrap(), 42);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn distinct_keys_do_not_share_results() {
    let cache = AggregationCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let (a, b) = futures::join!(
      cache.get("transactions:eth:0xA:time:15:0", counted(&calls, 1_u8)),
      cache.get("transactions:eth:0xA:time:15:15", counted(&calls, 2_u8)),
    );

    assert_eq!((a.unwrap(), b.unwrap()), (1, 2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 2);
  }

  #[tokio::test]
  async fn failure_reaches_every_waiter_and_is_evicted() {
    let cache = AggregationCache::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let failing = || {
      let calls = Arc::clone(&calls);
      move || {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
          tokio::time::sleep(Duration::from_millis(5)).await;
          Err::<u64, _>(anyhow!(ProviderError::Status { provider: "bitquery", status: 503, body: "busy".into() }))
        }
      }
    };

    let (a, b) = futures::join!(cache.get("overview:eth:0xA", failing()), cache.get("overview:eth:0xA", failing()));
    let (a, b) = (a.unwrap_err(), b.unwrap_err());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.key(), Some("overview:eth:0xA"));
    assert_eq!(a.to_string(), b.to_string());
    assert!(matches!(a.cause::<ProviderError>(), Some(ProviderError::Status { status: 503, .. })));
    assert!(!cache.contains(&CacheKey::from("overview:eth:0xA")));

    let retried: u64 = cache.get("overview:eth:0xA", counted(&calls, 5_u64)).await.unwrap();
    assert_eq!(retried, 5);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn mismatched_type_is_reported_without_refetching() {
    let cache = AggregationCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let _: u64 = cache.get("k", counted(&calls, 1_u64)).await.unwrap();
    let err = cache.get::<String, _, _>("k", counted(&calls, "x".to_string())).await.unwrap_err();

    assert!(matches!(err, FetchError::Cache(CacheError::TypeMismatch { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn pending_entries_are_visible_before_resolution() {
    let cache = AggregationCache::new();
    let (tx, rx) = oneshot::channel::<u64>();
    let key = CacheKey::from("monthly-counts:eth:0xA");

    let waiter = cache.get(key.clone(), move || async move { rx.await.map_err(anyhow::Error::from) });
    let check = async {
      tokio::task::yield_now().await;
      assert_eq!(cache.state(&key), Some(EntryState::Pending));
      tx.send(11).unwrap();
    };

    let (value, ()) = futures::join!(waiter, check);
    assert_eq!(value.unwrap(), 11);
    assert_eq!(cache.state(&key), Some(EntryState::Resolved));
  }
}
