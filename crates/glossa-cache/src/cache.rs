//! Animation cache with request coalescing

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use glossa_core::{AnimationPayload, GlossaError, GlossaResult, Tier};
use glossa_transport::PoseProvider;

/// What every waiter of one fetch receives
pub type FetchOutcome = GlossaResult<Arc<AnimationPayload>>;

type OutcomeSlot = Option<FetchOutcome>;

/// Result of [`AnimationCache::lookup`]
#[derive(Debug)]
pub enum Lookup {
    /// Cached for this session
    Ready(Arc<AnimationPayload>),
    /// Fetch in flight; possibly shared with earlier lookups
    Pending(PendingFetch),
}

impl Lookup {
    pub fn is_ready(&self) -> bool {
        matches!(self, Lookup::Ready(_))
    }

    /// Resolve either way
    pub async fn resolve(self) -> FetchOutcome {
        match self {
            Lookup::Ready(payload) => Ok(payload),
            Lookup::Pending(pending) => pending.wait().await,
        }
    }
}

/// Handle on an in-flight fetch
#[derive(Debug)]
pub struct PendingFetch {
    gloss: String,
    rx: watch::Receiver<OutcomeSlot>,
}

impl PendingFetch {
    pub fn gloss(&self) -> &str {
        &self.gloss
    }

    /// Wait for the fetch to settle
    ///
    /// Every coalesced waiter gets the same `Arc`. A fetch cancelled by
    /// [`AnimationCache::clear`] resolves to a `FetchFailure`.
    pub async fn wait(mut self) -> FetchOutcome {
        let outcome = match self.rx.wait_for(Option::is_some).await {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| Err(GlossaError::fetch(&self.gloss, "fetch cancelled")))
    }
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the map
    pub hits: u64,
    /// Lookups that started a provider request
    pub misses: u64,
    /// Lookups that joined a request already in flight
    pub coalesced: u64,
    /// Fetches that ended in a failure or the `Error` tier
    pub failures: u64,
}

struct InFlight {
    rx: watch::Receiver<OutcomeSlot>,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Arc<AnimationPayload>>,
    pending: HashMap<String, InFlight>,
    /// Bumped by `clear`; resolutions from an older session are dropped
    generation: u64,
    stats: CacheStats,
}

struct CacheInner {
    provider: Arc<dyn PoseProvider>,
    state: Mutex<CacheState>,
}

impl CacheInner {
    /// Record a finished fetch, unless its session is gone
    fn settle(&self, gloss: &str, generation: u64, outcome: &FetchOutcome) {
        let mut state = self.state.lock();
        if state.generation != generation {
            debug!("Dropping stale resolution for {:?}", gloss);
            return;
        }
        state.pending.remove(gloss);

        match outcome {
            Ok(payload) if payload.tier() != Tier::Error => {
                state.entries.insert(gloss.to_string(), Arc::clone(payload));
            }
            _ => state.stats.failures += 1,
        }
    }
}

/// Session-scoped gloss → payload cache
///
/// Cheap to clone; clones share the map.
#[derive(Clone)]
pub struct AnimationCache {
    inner: Arc<CacheInner>,
}

impl AnimationCache {
    pub fn new(provider: Arc<dyn PoseProvider>) -> Self {
        AnimationCache {
            inner: Arc::new(CacheInner {
                provider,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    /// Cached payload, or a handle on the (possibly shared) fetch
    ///
    /// Never blocks on the provider. Needs a tokio runtime to start a fetch;
    /// without one the returned fetch fails immediately.
    pub fn lookup(&self, gloss: &str) -> Lookup {
        let mut state = self.inner.state.lock();

        if let Some(payload) = state.entries.get(gloss) {
            let payload = Arc::clone(payload);
            state.stats.hits += 1;
            return Lookup::Ready(payload);
        }

        if let Some(in_flight) = state.pending.get(gloss) {
            let rx = in_flight.rx.clone();
            state.stats.coalesced += 1;
            return Lookup::Pending(PendingFetch {
                gloss: gloss.to_string(),
                rx,
            });
        }

        state.stats.misses += 1;
        let (tx, rx) = watch::channel(None);
        let pending = PendingFetch {
            gloss: gloss.to_string(),
            rx: rx.clone(),
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime available, cannot fetch {:?}", gloss);
            state.stats.failures += 1;
            tx.send_replace(Some(Err(GlossaError::fetch(gloss, "no async runtime"))));
            return Lookup::Pending(pending);
        };

        debug!("Cache miss for {:?}, fetching", gloss);
        let task = runtime.spawn(resolve(
            Arc::downgrade(&self.inner),
            Arc::clone(&self.inner.provider),
            gloss.to_string(),
            state.generation,
            tx,
        ));
        state.pending.insert(gloss.to_string(), InFlight { rx, task });

        Lookup::Pending(pending)
    }

    /// Look up and wait in one step
    pub async fn fetch(&self, gloss: &str) -> FetchOutcome {
        self.lookup(gloss).resolve().await
    }

    /// Cached payload without fetching or touching the counters
    pub fn get(&self, gloss: &str) -> Option<Arc<AnimationPayload>> {
        self.inner.state.lock().entries.get(gloss).cloned()
    }

    pub fn contains(&self, gloss: &str) -> bool {
        self.inner.state.lock().entries.contains_key(gloss)
    }

    /// Number of cached glosses
    pub fn len(&self) -> usize {
        self.inner.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of fetches in flight
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Start a new session: drop every entry and abort in-flight fetches
    pub fn clear(&self) {
        let aborted: Vec<(String, InFlight)> = {
            let mut state = self.inner.state.lock();
            state.generation = state.generation.wrapping_add(1);
            state.entries.clear();
            state.pending.drain().collect()
        };
        for (gloss, in_flight) in aborted {
            debug!("Aborting fetch for {:?}", gloss);
            in_flight.task.abort();
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.state.lock().stats
    }
}

impl fmt::Debug for AnimationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("AnimationCache")
            .field("entries", &state.entries.len())
            .field("pending", &state.pending.len())
            .field("generation", &state.generation)
            .field("stats", &state.stats)
            .finish()
    }
}

/// Publishes a fetch's outcome exactly once
///
/// Dropped unpublished (provider panic, aborted task) it settles the fetch
/// as failed, so the gloss is fetched again on the next lookup.
struct Settlement {
    cache: Weak<CacheInner>,
    gloss: String,
    generation: u64,
    tx: Option<watch::Sender<OutcomeSlot>>,
}

impl Settlement {
    fn publish(&mut self, outcome: FetchOutcome) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        if let Some(cache) = self.cache.upgrade() {
            cache.settle(&self.gloss, self.generation, &outcome);
        }
        tx.send_replace(Some(outcome));
    }
}

impl Drop for Settlement {
    fn drop(&mut self) {
        if self.tx.is_some() {
            debug!("Fetch for {:?} ended without an outcome", self.gloss);
            let cancelled = Err(GlossaError::fetch(&self.gloss, "fetch cancelled"));
            self.publish(cancelled);
        }
    }
}

/// Run one provider request and publish its outcome
async fn resolve(
    cache: Weak<CacheInner>,
    provider: Arc<dyn PoseProvider>,
    gloss: String,
    generation: u64,
    tx: watch::Sender<OutcomeSlot>,
) {
    let mut settlement = Settlement {
        cache,
        gloss,
        generation,
        tx: Some(tx),
    };
    let gloss = settlement.gloss.clone();

    let outcome = match provider.fetch(&gloss).await {
        Ok(payload) => {
            let (payload, defect) = payload.into_renderable();
            if let Some(defect) = defect {
                warn!("Replacing payload for {:?} with basic fallback: {}", gloss, defect);
            } else if payload.tier() == Tier::Error {
                debug!("Provider has no animation for {:?}", gloss);
            }
            Ok(Arc::new(payload))
        }
        Err(err @ GlossaError::MalformedPayload { .. }) => {
            warn!("Replacing payload for {:?} with basic fallback: {}", gloss, err);
            Ok(Arc::new(AnimationPayload::basic_fallback()))
        }
        Err(err) => {
            warn!("Fetch for {:?} failed: {}", gloss, err);
            Err(err)
        }
    };

    settlement.publish(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use glossa_core::{BasicMovement, Landmark, Location, PoseFrame};
    use glossa_transport::ProviderFuture;

    /// Answers from a script after a fixed delay, counting requests
    struct ScriptProvider {
        requests: AtomicUsize,
        delay: Duration,
        script: parking_lot::Mutex<VecDeque<GlossaResult<AnimationPayload>>>,
    }

    impl ScriptProvider {
        fn new(delay: Duration, script: Vec<GlossaResult<AnimationPayload>>) -> Arc<Self> {
            Arc::new(ScriptProvider {
                requests: AtomicUsize::new(0),
                delay,
                script: parking_lot::Mutex::new(script.into()),
            })
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl PoseProvider for ScriptProvider {
        fn fetch<'a>(&'a self, _gloss: &'a str) -> ProviderFuture<'a> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().pop_front();
            Box::pin(async move {
                tokio::time::sleep(self.delay).await;
                next.unwrap_or_else(|| Ok(wave()))
            })
        }
    }

    fn wave() -> AnimationPayload {
        AnimationPayload::Basic {
            movement: BasicMovement::Wave,
            location: Location::Head,
            frame_count: 30,
            fps: 30.0,
        }
    }

    fn cache_with(provider: &Arc<ScriptProvider>) -> AnimationCache {
        AnimationCache::new(provider.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_lookups_share_one_request() {
        let provider = ScriptProvider::new(Duration::from_millis(100), vec![]);
        let cache = cache_with(&provider);

        let lookups: Vec<Lookup> = (0..5).map(|_| cache.lookup("HELLO")).collect();
        assert!(lookups.iter().all(|l| !l.is_ready()));
        assert_eq!(cache.pending_count(), 1);

        let mut payloads = Vec::new();
        for lookup in lookups {
            payloads.push(lookup.resolve().await.unwrap());
        }

        assert_eq!(provider.requests(), 1);
        assert!(payloads.iter().all(|p| Arc::ptr_eq(p, &payloads[0])));
        assert!(cache.lookup("HELLO").is_ready());
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                coalesced: 4,
                failures: 0,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_not_cached() {
        let provider = ScriptProvider::new(
            Duration::from_millis(10),
            vec![Err(GlossaError::fetch("HELLO", "connection reset"))],
        );
        let cache = cache_with(&provider);

        let err = cache.fetch("HELLO").await.unwrap_err();
        assert!(matches!(err, GlossaError::FetchFailure { .. }));
        assert!(!cache.contains("HELLO"));
        assert_eq!(cache.pending_count(), 0);

        let payload = cache.fetch("HELLO").await.unwrap();
        assert_eq!(*payload, wave());
        assert_eq!(provider.requests(), 2);
        assert_eq!(cache.stats().failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_tier_is_delivered_but_not_cached() {
        let provider = ScriptProvider::new(Duration::ZERO, vec![Ok(AnimationPayload::error("unknown sign"))]);
        let cache = cache_with(&provider);

        let payload = cache.fetch("XYZZY").await.unwrap();

        assert_eq!(payload.tier(), Tier::Error);
        assert!(cache.get("XYZZY").is_none());
        assert!(!cache.lookup("XYZZY").is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_payload_becomes_basic() {
        let broken = AnimationPayload::RealPose {
            frames: vec![PoseFrame::new(vec![Landmark::new(f32::NAN, 0.5)])],
            frame_count: 1,
            fps: 30.0,
            data_source: "test".into(),
        };
        let provider = ScriptProvider::new(
            Duration::ZERO,
            vec![Ok(broken), Err(GlossaError::malformed(Tier::RealPose, "short landmark"))],
        );
        let cache = cache_with(&provider);

        let first = cache.fetch("A").await.unwrap();
        let second = cache.fetch("B").await.unwrap();

        assert_eq!(*first, AnimationPayload::basic_fallback());
        assert_eq!(*second, AnimationPayload::basic_fallback());
        assert!(cache.contains("A"));
        assert!(cache.contains("B"));
        assert_eq!(cache.stats().failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_in_flight_fetch() {
        let provider = ScriptProvider::new(Duration::from_secs(1), vec![]);
        let cache = cache_with(&provider);
        cache.fetch("YES").await.unwrap();

        let Lookup::Pending(pending) = cache.lookup("NO") else {
            panic!("expected pending");
        };
        cache.clear();

        let err = pending.wait().await.unwrap_err();
        assert!(matches!(err, GlossaError::FetchFailure { ref reason, .. } if reason == "fetch cancelled"));
        assert!(cache.is_empty());
        assert_eq!(cache.pending_count(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!cache.contains("NO"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_resolution_is_dropped() {
        let provider = ScriptProvider::new(Duration::ZERO, vec![]);
        let cache = cache_with(&provider);
        let generation = cache.inner.state.lock().generation;

        cache.clear();
        cache
            .inner
            .settle("HELLO", generation, &Ok(Arc::new(AnimationPayload::basic_fallback())));

        assert!(!cache.contains("HELLO"));
    }

    /// Panics on its first request, answers normally afterwards
    struct PanicOnceProvider {
        requests: AtomicUsize,
    }

    impl PoseProvider for PanicOnceProvider {
        fn fetch<'a>(&'a self, _gloss: &'a str) -> ProviderFuture<'a> {
            let call = self.requests.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if call == 0 {
                    panic!("provider crashed");
                }
                Ok(wave())
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicked_fetch_is_retried() {
        let provider = Arc::new(PanicOnceProvider {
            requests: AtomicUsize::new(0),
        });
        let cache = AnimationCache::new(provider.clone());

        let err = cache.fetch("HELLO").await.unwrap_err();
        assert!(matches!(err, GlossaError::FetchFailure { .. }));
        assert_eq!(cache.pending_count(), 0);
        assert_eq!(cache.stats().failures, 1);

        let payload = cache.fetch("HELLO").await.unwrap();
        assert_eq!(*payload, wave());
        assert_eq!(provider.requests.load(Ordering::SeqCst), 2);
        assert!(cache.contains("HELLO"));
    }

    #[test]
    fn test_lookup_without_runtime_fails_fast() {
        let provider = ScriptProvider::new(Duration::ZERO, vec![]);
        let cache = cache_with(&provider);

        let Lookup::Pending(pending) = cache.lookup("HELLO") else {
            panic!("expected pending");
        };
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let err = runtime.block_on(pending.wait()).unwrap_err();

        assert!(matches!(err, GlossaError::FetchFailure { .. }));
        assert_eq!(provider.requests(), 0);
        assert_eq!(cache.pending_count(), 0);
    }
}
