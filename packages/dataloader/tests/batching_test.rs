//! Integration tests for batch coalescing, caching and lazy entities
//!
//! A recording loader captures every call made to the fetch function so the
//! tests can assert exactly how keys were grouped into batches.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use commerce_bridge_dataloader::{
    BatchLoader, Entity, EntityState, JsonKey, LazyEntity, LoadError, Loader,
};
use rstest::rstest;
use serde::Serialize;

// ============================================================================
// Test loaders
// ============================================================================

/// Records each batch and fails the keys listed in `failing`
#[derive(Clone, Default)]
struct RecordingLoader {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    failing: HashSet<String>,
}

impl RecordingLoader {
    fn failing(keys: &[&str]) -> Self {
        Self {
            failing: keys.iter().map(|key| key.to_string()).collect(),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Loader<String> for RecordingLoader {
    type Value = String;
    type Error = String;

    async fn load(&self, keys: &[String]) -> Result<Vec<Result<String, String>>, String> {
        self.calls.lock().unwrap().push(keys.to_vec());
        Ok(keys
            .iter()
            .map(|key| {
                if self.failing.contains(key) {
                    Err(format!("{} not found", key))
                } else {
                    Ok(format!("value:{}", key))
                }
            })
            .collect())
    }
}

/// Resolves keys concurrently, finishing the last key first
struct ReversedCompletionLoader;

impl Loader<u64> for ReversedCompletionLoader {
    type Value = u64;
    type Error = String;

    async fn load(&self, keys: &[u64]) -> Result<Vec<Result<u64, String>>, String> {
        let count = keys.len() as u64;
        let finished = Arc::new(Mutex::new(Vec::new()));
        let work = keys.iter().enumerate().map(|(index, key)| {
            let finished = Arc::clone(&finished);
            async move {
                tokio::time::sleep(Duration::from_millis((count - index as u64) * 5)).await;
                finished.lock().unwrap().push(*key);
                Ok::<u64, String>(key * 100)
            }
        });
        let results = futures_util::future::join_all(work).await;
        assert_eq!(finished.lock().unwrap().first(), keys.last());
        Ok(results)
    }
}

/// Fails every batch as a whole
struct BrokenLoader;

impl Loader<u32> for BrokenLoader {
    type Value = u32;
    type Error = String;

    async fn load(&self, _keys: &[u32]) -> Result<Vec<Result<u32, String>>, String> {
        Err("backend unavailable".to_string())
    }
}

/// Returns one result too few
struct ShortLoader;

impl Loader<u32> for ShortLoader {
    type Value = u32;
    type Error = String;

    async fn load(&self, keys: &[u32]) -> Result<Vec<Result<u32, String>>, String> {
        Ok(keys.iter().skip(1).map(|key| Ok(*key)).collect())
    }
}

/// Panics inside the flush task
struct PanickingLoader;

impl Loader<u32> for PanickingLoader {
    type Value = u32;
    type Error = String;

    async fn load(&self, _keys: &[u32]) -> Result<Vec<Result<u32, String>>, String> {
        panic!("loader bug");
    }
}

fn key(value: &str) -> String {
    value.to_string()
}

// ============================================================================
// Batching
// ============================================================================

#[tokio::test]
async fn test_same_window_loads_share_one_batch() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone());

    let a = loader.load(key("a"));
    let b = loader.load(key("b"));
    let c = loader.load(key("c"));
    let (a, b, c) = tokio::join!(a, b, c);

    assert_eq!(a.unwrap(), "value:a");
    assert_eq!(b.unwrap(), "value:b");
    assert_eq!(c.unwrap(), "value:c");
    assert_eq!(recorder.calls(), vec![vec![key("a"), key("b"), key("c")]]);
}

#[tokio::test]
async fn test_loads_after_a_yield_form_a_new_batch() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone());

    loader.load(key("a")).await.unwrap();
    loader.load(key("b")).await.unwrap();

    assert_eq!(recorder.calls(), vec![vec![key("a")], vec![key("b")]]);
}

#[tokio::test]
async fn test_duplicate_keys_in_one_window_are_fetched_once() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone());

    let results = loader
        .load_many(vec![key("x"), key("y"), key("x")])
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0], results[2]);
    assert_eq!(recorder.calls(), vec![vec![key("x"), key("y")]]);
}

#[tokio::test]
async fn test_load_many_preserves_input_order() {
    let loader = BatchLoader::new(RecordingLoader::default());

    let results = loader.load_many(vec![key("c"), key("a"), key("b")]).await;
    let values: Vec<_> = results.into_iter().map(Result::unwrap).collect();

    assert_eq!(values, vec!["value:c", "value:a", "value:b"]);
}

#[tokio::test]
async fn test_results_are_matched_by_position() {
    let loader = BatchLoader::new(ReversedCompletionLoader);

    let results = loader.load_many(vec![1, 2, 3]).await;

    assert_eq!(results, vec![Ok(100), Ok(200), Ok(300)]);
}

#[tokio::test]
async fn test_max_batch_size_splits_batches() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone()).with_max_batch_size(2);

    let results = loader
        .load_many(vec![key("a"), key("b"), key("c"), key("d"), key("e")])
        .await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(
        recorder.calls(),
        vec![
            vec![key("a"), key("b")],
            vec![key("c"), key("d")],
            vec![key("e")],
        ]
    );
}

#[tokio::test]
async fn test_delay_widens_the_window() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone()).with_delay(Duration::from_millis(20));

    let first = loader.load(key("a"));
    tokio::task::yield_now().await;
    let second = loader.load(key("b"));
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_ok() && second.is_ok());
    assert_eq!(recorder.calls(), vec![vec![key("a"), key("b")]]);
}

// ============================================================================
// Caching and priming
// ============================================================================

#[tokio::test]
async fn test_cached_key_is_not_fetched_again() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone());

    let first = loader.load(key("cart")).await;
    let second = loader.load(key("cart")).await;

    assert_eq!(first, second);
    assert_eq!(recorder.calls().len(), 1);
}

#[tokio::test]
async fn test_clones_share_the_cache() {
    let recorder = RecordingLoader::default();
    let parent = BatchLoader::new(recorder.clone());
    let child = parent.clone();

    parent.load(key("category")).await.unwrap();
    child.load(key("category")).await.unwrap();

    assert_eq!(recorder.calls().len(), 1);
}

#[tokio::test]
async fn test_primed_key_skips_fetch() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone());

    assert!(loader.prime(key("child"), "embedded".to_string()));
    let value = loader.load(key("child")).await;

    assert_eq!(value, Ok("embedded".to_string()));
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn test_cleared_key_is_fetched_again() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone());

    loader.load(key("cart")).await.unwrap();
    loader.clear(&key("cart"));
    loader.load(key("cart")).await.unwrap();

    assert_eq!(recorder.calls().len(), 2);
}

#[tokio::test]
async fn test_cleared_pending_key_keeps_its_slot() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone());

    let first = loader.load(key("cart"));
    assert!(loader.clear(&key("cart")));
    let second = loader.load(key("cart"));
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first, second);
    assert_eq!(recorder.calls(), vec![vec![key("cart")]]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_delay_coalesces_loads_across_worker_threads() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone()).with_delay(Duration::from_millis(50));

    let tasks: Vec<_> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|id| {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load(key(id)).await })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }

    let calls = recorder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 4);
}

#[derive(Serialize, Clone)]
struct Search {
    text: String,
    page: u32,
}

struct SearchLoader {
    calls: Arc<AtomicUsize>,
}

impl Loader<JsonKey<Search>> for SearchLoader {
    type Value = String;
    type Error = String;

    async fn load(&self, keys: &[JsonKey<Search>]) -> Result<Vec<Result<String, String>>, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(keys
            .iter()
            .map(|key| Ok(format!("{}#{}", key.text, key.page)))
            .collect())
    }
}

#[tokio::test]
async fn test_structurally_equal_keys_share_a_cache_entry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let loader = BatchLoader::new(SearchLoader {
        calls: Arc::clone(&calls),
    });
    let search = || {
        JsonKey::new(Search {
            text: "camera".to_string(),
            page: 1,
        })
        .unwrap()
    };

    let first = loader.load(search()).await;
    let second = loader.load(search()).await;

    assert_eq!(first, Ok("camera#1".to_string()));
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Error handling
// ============================================================================

#[rstest]
#[case(vec!["a", "b"])]
#[case(vec!["b", "a"])]
#[tokio::test]
async fn test_per_key_errors_are_isolated(#[case] order: Vec<&str>) {
    let loader = BatchLoader::new(RecordingLoader::failing(&["b"]));

    let results = loader
        .load_many(order.iter().map(|name| key(name)))
        .await;

    for (name, result) in order.iter().zip(results) {
        match *name {
            "a" => assert_eq!(result, Ok("value:a".to_string())),
            _ => assert_eq!(result, Err(LoadError::Fetch("b not found".to_string()))),
        }
    }
}

#[tokio::test]
async fn test_batch_error_rejects_every_key() {
    let loader = BatchLoader::new(BrokenLoader);

    let results = loader.load_many(vec![1, 2]).await;

    for result in results {
        assert_matches!(result, Err(LoadError::Batch(message)) if message == "backend unavailable");
    }
}

#[tokio::test]
async fn test_failed_key_stays_failed_for_the_request() {
    let recorder = RecordingLoader::failing(&["gone"]);
    let loader = BatchLoader::new(recorder.clone());

    assert!(loader.load(key("gone")).await.is_err());
    assert!(loader.load(key("gone")).await.is_err());
    assert_eq!(recorder.calls().len(), 1);
}

#[tokio::test]
async fn test_length_mismatch_rejects_every_key() {
    let loader = BatchLoader::new(ShortLoader);

    let results = loader.load_many(vec![1, 2, 3]).await;

    for result in results {
        assert_eq!(
            result,
            Err(LoadError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
    }
}

#[tokio::test]
async fn test_panicking_loader_does_not_leave_futures_pending() {
    let loader = BatchLoader::new(PanickingLoader);

    let result = tokio::time::timeout(Duration::from_secs(1), loader.load(7))
        .await
        .expect("load future never completed");

    assert_eq!(result, Err(LoadError::Dropped));
}

// ============================================================================
// Lazy entities
// ============================================================================

struct CartSource {
    id: String,
    loader: BatchLoader<String, RecordingLoader>,
}

#[derive(Debug, PartialEq)]
struct CartView {
    id: String,
    payload: String,
}

impl Entity for CartSource {
    type Raw = String;
    type Output = CartView;
    type Error = LoadError<String>;

    async fn load(&self) -> Result<String, LoadError<String>> {
        self.loader.load(self.id.clone()).await
    }

    fn convert(&self, raw: String) -> Result<CartView, LoadError<String>> {
        Ok(CartView {
            id: self.id.clone(),
            payload: raw,
        })
    }
}

#[tokio::test]
async fn test_unread_entity_never_fetches() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone());

    let entity = LazyEntity::new(CartSource {
        id: key("00000035"),
        loader,
    });
    tokio::time::sleep(Duration::from_millis(5)).await;

    assert_eq!(entity.state(), EntityState::Unresolved);
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn test_concurrent_field_reads_share_one_fetch() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone());
    let entity = LazyEntity::new(CartSource {
        id: key("00000035"),
        loader,
    });

    let (id, payload) = tokio::join!(
        entity.get(|view| view.id.clone()),
        entity.get(|view| view.payload.clone()),
    );

    assert_eq!(id.unwrap(), "00000035");
    assert_eq!(payload.unwrap(), "value:00000035");
    assert_eq!(recorder.calls(), vec![vec![key("00000035")]]);
    assert_eq!(entity.state(), EntityState::Resolved);
}

#[tokio::test]
async fn test_sibling_entities_batch_together() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone());
    let entities: Vec<_> = ["1", "2", "3"]
        .into_iter()
        .map(|id| {
            LazyEntity::new(CartSource {
                id: key(id),
                loader: loader.clone(),
            })
        })
        .collect();

    let reads = entities
        .iter()
        .map(|entity| entity.get(|view| view.payload.clone()));
    let payloads = futures_util::future::join_all(reads).await;

    assert_eq!(payloads.len(), 3);
    assert_eq!(recorder.calls(), vec![vec![key("1"), key("2"), key("3")]]);
}

#[tokio::test]
async fn test_entity_resolves_from_primed_loader() {
    let recorder = RecordingLoader::default();
    let loader = BatchLoader::new(recorder.clone());
    loader.prime(key("child"), "from parent".to_string());

    let entity = LazyEntity::new(CartSource {
        id: key("child"),
        loader,
    });

    assert_eq!(
        entity.resolve().await.unwrap(),
        &CartView {
            id: key("child"),
            payload: "from parent".to_string()
        }
    );
    assert!(recorder.calls().is_empty());
}
