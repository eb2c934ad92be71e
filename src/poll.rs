//! Resource cache and adaptive poll scheduler.
//!
//! Each pollable resource owns a cache entry and a background task that
//! re-polls it forever. The delay until the next poll is recomputed after
//! every completed cycle from the payload just stored: resources that look
//! busy (running tasks, active stages) are polled tightly, idle ones back
//! off. Visibility-gated resources park entirely while the dashboard is
//! hidden and refetch immediately when it is shown again; their cached data
//! is retained throughout so a re-shown view has content before the first
//! fresh fetch lands.
//!
//! Failure handling: one immediate retry, then the entry keeps its previous
//! data, records the error, and the poller backs off to the resource's idle
//! period.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{Notify, watch};
use tracing::{debug, warn};

use crate::api::{ApiError, SparkApi};
use crate::model::{ClusterStatus, ExecutorSummary, MasterSummary, StageStatus, StageSummary};
use crate::visibility::VisibilitySignal;

// Polling periods. Status drives the ambient indicator and is never gated by
// visibility; everything else pauses while the dashboard is hidden.
pub const POLL_STATUS: Duration = Duration::from_millis(30_000);
pub const POLL_CLUSTER_SUMMARY: Duration = Duration::from_millis(30_000);
pub const POLL_EXECUTORS_ACTIVE: Duration = Duration::from_millis(10_000);
pub const POLL_EXECUTORS_IDLE: Duration = Duration::from_millis(30_000);
pub const POLL_STAGES_ACTIVE: Duration = Duration::from_millis(5_000);
pub const POLL_STAGES_IDLE: Duration = Duration::from_millis(30_000);

/// Identifier for one independently polled data feed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ResourceKey {
    Status,
    ClusterSummary,
    Executors,
    Stages,
}

impl ResourceKey {
    pub const ALL: [ResourceKey; 4] = [
        ResourceKey::Status,
        ResourceKey::ClusterSummary,
        ResourceKey::Executors,
        ResourceKey::Stages,
    ];

    /// Whether polling for this resource pauses when the dashboard is hidden.
    pub fn visibility_gated(self) -> bool {
        !matches!(self, ResourceKey::Status)
    }

    /// Slow cadence for this resource; also the backoff after repeated fetch
    /// failures.
    pub fn idle_period(self) -> Duration {
        match self {
            ResourceKey::Status => POLL_STATUS,
            ResourceKey::ClusterSummary => POLL_CLUSTER_SUMMARY,
            ResourceKey::Executors => POLL_EXECUTORS_IDLE,
            ResourceKey::Stages => POLL_STAGES_IDLE,
        }
    }
}

/// Fast cadence when any cached executor is running tasks.
pub fn executors_period(executors: &[ExecutorSummary]) -> Duration {
    if executors.iter().any(|e| e.active_tasks > 0) {
        POLL_EXECUTORS_ACTIVE
    } else {
        POLL_EXECUTORS_IDLE
    }
}

/// Fast cadence while any cached stage is ACTIVE.
pub fn stages_period(stages: &[StageSummary]) -> Duration {
    if stages.iter().any(|s| s.status == StageStatus::Active) {
        POLL_STAGES_ACTIVE
    } else {
        POLL_STAGES_IDLE
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FetchStatus {
    /// First fetch has not completed yet.
    Loading,
    Success,
    Error,
}

/// Cache-storable projection of an `ApiError`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorInfo {
    pub status: Option<u16>,
    pub message: String,
}

impl From<&ApiError> for ErrorInfo {
    fn from(err: &ApiError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Last-good value plus fetch lifecycle state for one resource.
///
/// `data` survives fetch errors: the view degrades to "stale + error flag"
/// rather than going blank.
#[derive(Debug)]
pub struct CacheEntry<T> {
    pub data: Option<T>,
    pub status: FetchStatus,
    pub last_error: Option<ErrorInfo>,
    /// False while the resource is parked on visibility loss.
    pub enabled: bool,
    in_flight: bool,
}

impl<T> CacheEntry<T> {
    fn new() -> Self {
        Self {
            data: None,
            status: FetchStatus::Loading,
            last_error: None,
            enabled: true,
            in_flight: false,
        }
    }

    fn resolve(&mut self, value: T) {
        self.data = Some(value);
        self.status = FetchStatus::Success;
        self.last_error = None;
        self.in_flight = false;
    }

    fn fail(&mut self, err: ErrorInfo) {
        self.status = FetchStatus::Error;
        self.last_error = Some(err);
        self.in_flight = false;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, FetchStatus::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, FetchStatus::Error)
    }
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// What the renderer gets for one resource.
#[derive(Clone, Debug)]
pub struct ResourceView<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<ErrorInfo>,
    pub enabled: bool,
}

impl<T: Clone> ResourceView<T> {
    fn of(entry: &CacheEntry<T>) -> Self {
        Self {
            data: entry.data.clone(),
            is_loading: entry.is_loading(),
            is_error: entry.is_error(),
            error: entry.last_error.clone(),
            enabled: entry.enabled,
        }
    }
}

/// All cache entries, one per `ResourceKey`.
#[derive(Debug, Default)]
pub struct MonitorCache {
    pub status: CacheEntry<ClusterStatus>,
    pub cluster: CacheEntry<MasterSummary>,
    pub executors: CacheEntry<Vec<ExecutorSummary>>,
    pub stages: CacheEntry<Vec<StageSummary>>,
}

pub type SharedCache = Arc<Mutex<MonitorCache>>;

impl MonitorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedCache {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Cloned view for rendering, so no lock is held during terminal I/O.
    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            status: ResourceView::of(&self.status),
            cluster: ResourceView::of(&self.cluster),
            executors: ResourceView::of(&self.executors),
            stages: ResourceView::of(&self.stages),
        }
    }

    /// Claim the in-flight slot for `key`. Returns false when a previous
    /// fetch is still outstanding; the caller must skip its tick.
    fn try_begin(&mut self, key: ResourceKey) -> bool {
        let in_flight = self.in_flight_mut(key);
        if *in_flight {
            false
        } else {
            *in_flight = true;
            true
        }
    }

    fn in_flight_mut(&mut self, key: ResourceKey) -> &mut bool {
        match key {
            ResourceKey::Status => &mut self.status.in_flight,
            ResourceKey::ClusterSummary => &mut self.cluster.in_flight,
            ResourceKey::Executors => &mut self.executors.in_flight,
            ResourceKey::Stages => &mut self.stages.in_flight,
        }
    }

    fn set_enabled(&mut self, key: ResourceKey, enabled: bool) {
        match key {
            ResourceKey::Status => self.status.enabled = enabled,
            ResourceKey::ClusterSummary => self.cluster.enabled = enabled,
            ResourceKey::Executors => self.executors.enabled = enabled,
            ResourceKey::Stages => self.stages.enabled = enabled,
        }
    }

    fn fail(&mut self, key: ResourceKey, err: ErrorInfo) {
        match key {
            ResourceKey::Status => self.status.fail(err),
            ResourceKey::ClusterSummary => self.cluster.fail(err),
            ResourceKey::Executors => self.executors.fail(err),
            ResourceKey::Stages => self.stages.fail(err),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MonitorSnapshot {
    pub status: ResourceView<ClusterStatus>,
    pub cluster: ResourceView<MasterSummary>,
    pub executors: ResourceView<Vec<ExecutorSummary>>,
    pub stages: ResourceView<Vec<StageSummary>>,
}

/// Marks every resource for an immediate refetch. Handed to the mutation
/// coordinator so a successful start/stop is reflected as soon as possible.
///
/// Each mark is a stored notify permit: a poller mid-fetch or mid-sleep picks
/// it up at its next suspension point, so the one-fetch-in-flight invariant
/// is never bypassed.
#[derive(Clone)]
pub struct Invalidator {
    notifies: Arc<[Arc<Notify>; 4]>,
}

impl Invalidator {
    pub(crate) fn new() -> Self {
        Self {
            notifies: Arc::new([
                Arc::new(Notify::new()),
                Arc::new(Notify::new()),
                Arc::new(Notify::new()),
                Arc::new(Notify::new()),
            ]),
        }
    }

    fn index(key: ResourceKey) -> usize {
        match key {
            ResourceKey::Status => 0,
            ResourceKey::ClusterSummary => 1,
            ResourceKey::Executors => 2,
            ResourceKey::Stages => 3,
        }
    }

    pub(crate) fn refresh_handle(&self, key: ResourceKey) -> Arc<Notify> {
        Arc::clone(&self.notifies[Self::index(key)])
    }

    pub fn invalidate(&self, key: ResourceKey) {
        self.notifies[Self::index(key)].notify_one();
    }

    pub fn invalidate_all(&self) {
        for key in ResourceKey::ALL {
            self.invalidate(key);
        }
    }
}

/// One poll cycle executor for a single resource.
pub struct Poller<A> {
    key: ResourceKey,
    api: Arc<A>,
    cache: SharedCache,
}

impl<A: SparkApi> Poller<A> {
    pub fn new(key: ResourceKey, api: Arc<A>, cache: SharedCache) -> Self {
        Self { key, api, cache }
    }

    pub fn key(&self) -> ResourceKey {
        self.key
    }

    fn lock(&self) -> MutexGuard<'_, MonitorCache> {
        // Lock scope is a handful of field writes; never held across an await.
        self.cache.lock().unwrap()
    }

    /// Run one poll cycle and return the delay until the next tick.
    ///
    /// A tick issued while a previous fetch for this key is still outstanding
    /// is a no-op (backs off by the idle period without touching the entry).
    pub async fn tick(&self) -> Duration {
        if !self.lock().try_begin(self.key) {
            debug!(key = ?self.key, "fetch already in flight, skipping tick");
            return self.key.idle_period();
        }
        match self.key {
            ResourceKey::Status => self.cycle_status().await,
            ResourceKey::ClusterSummary => self.cycle_cluster_summary().await,
            ResourceKey::Executors => self.cycle_executors().await,
            ResourceKey::Stages => self.cycle_stages().await,
        }
    }

    async fn cycle_status(&self) -> Duration {
        match fetch_with_retry(|| self.api.fetch_status()).await {
            Ok(value) => {
                self.lock().status.resolve(value);
                POLL_STATUS
            }
            Err(err) => self.record_failure(err),
        }
    }

    async fn cycle_cluster_summary(&self) -> Duration {
        match fetch_with_retry(|| self.api.fetch_cluster_summary()).await {
            Ok(value) => {
                self.lock().cluster.resolve(value);
                POLL_CLUSTER_SUMMARY
            }
            Err(err) => self.record_failure(err),
        }
    }

    async fn cycle_executors(&self) -> Duration {
        match fetch_with_retry(|| self.api.fetch_executors()).await {
            Ok(value) => {
                // Period is chosen from the payload just stored; a cluster
                // that turned busy is only seen at the next cycle.
                let period = executors_period(&value);
                self.lock().executors.resolve(value);
                period
            }
            Err(err) => self.record_failure(err),
        }
    }

    async fn cycle_stages(&self) -> Duration {
        match fetch_with_retry(|| self.api.fetch_stages()).await {
            Ok(value) => {
                let period = stages_period(&value);
                self.lock().stages.resolve(value);
                period
            }
            Err(err) => self.record_failure(err),
        }
    }

    fn record_failure(&self, err: ApiError) -> Duration {
        warn!(key = ?self.key, error = %err, "fetch failed after retry, backing off");
        self.lock().fail(self.key, ErrorInfo::from(&err));
        self.key.idle_period()
    }

    fn set_enabled(&self, enabled: bool) {
        self.lock().set_enabled(self.key, enabled);
    }
}

/// One immediate retry on failure, then give up and let the caller back off.
async fn fetch_with_retry<T, F, Fut>(fetch: F) -> Result<T, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    match fetch().await {
        Ok(value) => Ok(value),
        Err(first) => {
            debug!(error = %first, "fetch failed, retrying once");
            fetch().await
        }
    }
}

/// Spawns one poller task per resource on the shared runtime.
pub struct PollScheduler;

impl PollScheduler {
    pub fn spawn<A>(
        api: Arc<A>,
        cache: SharedCache,
        visibility: &VisibilitySignal,
        handle: &Handle,
    ) -> Invalidator
    where
        A: SparkApi + 'static,
    {
        let invalidator = Invalidator::new();
        for key in ResourceKey::ALL {
            let poller = Poller::new(key, Arc::clone(&api), Arc::clone(&cache));
            let rx = visibility.subscribe();
            let refresh = invalidator.refresh_handle(key);
            handle.spawn(run_poller(poller, rx, refresh));
        }
        invalidator
    }
}

async fn run_poller<A: SparkApi>(
    poller: Poller<A>,
    mut visibility: watch::Receiver<bool>,
    refresh: Arc<Notify>,
) {
    let gated = poller.key().visibility_gated();
    loop {
        if gated && !*visibility.borrow_and_update() {
            // Park until the dashboard is shown again. Cached data is kept;
            // re-enabling falls straight through to an immediate fetch.
            poller.set_enabled(false);
            if visibility.changed().await.is_err() {
                return;
            }
            continue;
        }
        poller.set_enabled(true);

        let delay = poller.tick().await;

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = refresh.notified() => {
                debug!(key = ?poller.key(), "cache invalidated, refetching");
            }
            changed = visibility.changed() => {
                if changed.is_err() {
                    return;
                }
                // Loop top re-evaluates gating; a hide cancels the pending
                // sleep but never aborts a fetch already dispatched.
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, SparkApi};
    use crate::model::{
        ClusterConfig, ClusterCreateResponse, ClusterDeleteResponse, ClusterStatus,
        ExecutorSummary, MasterSummary, StageStatus, StageSummary,
    };
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn executor(id: &str, active_tasks: u32) -> ExecutorSummary {
        ExecutorSummary {
            id: id.to_string(),
            active_tasks,
            ..Default::default()
        }
    }

    fn stage(status: StageStatus, completion_time: Option<&str>) -> StageSummary {
        StageSummary {
            status,
            completion_time: completion_time.map(str::to_string),
            ..Default::default()
        }
    }

    /// Counting mock with switchable failure and an optional artificial
    /// fetch latency (virtual time; tests run with a paused clock).
    #[derive(Default)]
    struct MockApi {
        pub status_calls: AtomicUsize,
        pub cluster_calls: AtomicUsize,
        pub executor_calls: AtomicUsize,
        pub stage_calls: AtomicUsize,
        pub fail_executors: AtomicBool,
        pub executors: std::sync::Mutex<Vec<ExecutorSummary>>,
        pub stages: std::sync::Mutex<Vec<StageSummary>>,
        pub fetch_delay: Option<Duration>,
    }

    impl MockApi {
        async fn simulate_latency(&self) {
            if let Some(delay) = self.fetch_delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    impl SparkApi for MockApi {
        async fn fetch_status(&self) -> Result<ClusterStatus, ApiError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;
            Ok(ClusterStatus::default())
        }

        async fn fetch_cluster_summary(&self) -> Result<MasterSummary, ApiError> {
            self.cluster_calls.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;
            Ok(MasterSummary::default())
        }

        async fn fetch_executors(&self) -> Result<Vec<ExecutorSummary>, ApiError> {
            self.executor_calls.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;
            if self.fail_executors.load(Ordering::SeqCst) {
                return Err(ApiError::Http {
                    status: 503,
                    message: "Service Unavailable".into(),
                });
            }
            Ok(self.executors.lock().unwrap().clone())
        }

        async fn fetch_stages(&self) -> Result<Vec<StageSummary>, ApiError> {
            self.stage_calls.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;
            Ok(self.stages.lock().unwrap().clone())
        }

        async fn create_cluster(
            &self,
            _config: Option<ClusterConfig>,
        ) -> Result<ClusterCreateResponse, ApiError> {
            Ok(ClusterCreateResponse::default())
        }

        async fn delete_cluster(&self) -> Result<ClusterDeleteResponse, ApiError> {
            Ok(ClusterDeleteResponse::default())
        }
    }

    #[test]
    fn executors_period_active_when_tasks_running() {
        let executors = vec![executor("0", 0), executor("1", 3)];
        assert_eq!(executors_period(&executors), POLL_EXECUTORS_ACTIVE);
    }

    #[test]
    fn executors_period_idle_when_no_tasks() {
        let executors = vec![executor("0", 0)];
        assert_eq!(executors_period(&executors), POLL_EXECUTORS_IDLE);
        assert_eq!(executors_period(&[]), POLL_EXECUTORS_IDLE);
    }

    #[test]
    fn stages_period_active_when_any_stage_active() {
        let stages = vec![
            stage(StageStatus::Complete, None),
            stage(StageStatus::Active, None),
        ];
        assert_eq!(stages_period(&stages), POLL_STAGES_ACTIVE);
    }

    #[test]
    fn stages_period_idle_otherwise() {
        let stages = vec![stage(StageStatus::Complete, None)];
        assert_eq!(stages_period(&stages), POLL_STAGES_IDLE);
        assert_eq!(stages_period(&[]), POLL_STAGES_IDLE);
    }

    #[tokio::test]
    async fn failing_fetch_retains_data_and_flags_error() {
        let api = Arc::new(MockApi::default());
        let cache = MonitorCache::shared();
        cache
            .lock()
            .unwrap()
            .executors
            .resolve(vec![executor("7", 1)]);

        api.fail_executors.store(true, Ordering::SeqCst);
        let poller = Poller::new(ResourceKey::Executors, Arc::clone(&api), Arc::clone(&cache));
        let delay = poller.tick().await;

        // One immediate retry, then back off to the idle period.
        assert_eq!(api.executor_calls.load(Ordering::SeqCst), 2);
        assert_eq!(delay, POLL_EXECUTORS_IDLE);

        let cache = cache.lock().unwrap();
        assert!(cache.executors.is_error());
        let err = cache.executors.last_error.as_ref().unwrap();
        assert_eq!(err.status, Some(503));
        // Stale-but-shown: previous data survives the failure.
        let data = cache.executors.data.as_ref().unwrap();
        assert_eq!(data[0].id, "7");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_tick_is_a_noop() {
        let api = Arc::new(MockApi {
            fetch_delay: Some(Duration::from_secs(60)),
            ..Default::default()
        });
        let cache = MonitorCache::shared();
        let poller = Poller::new(ResourceKey::Executors, Arc::clone(&api), cache);

        // Two ticks racing: the second must find the in-flight flag set and
        // skip without touching the API.
        let (_, second_delay) = tokio::join!(poller.tick(), poller.tick());
        assert_eq!(api.executor_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_delay, POLL_EXECUTORS_IDLE);
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_dashboard_polls_only_status() {
        let api = Arc::new(MockApi::default());
        let cache = MonitorCache::shared();
        cache
            .lock()
            .unwrap()
            .executors
            .resolve(vec![executor("9", 0)]);
        let visibility = VisibilitySignal::new();

        let _invalidator = PollScheduler::spawn(
            Arc::clone(&api),
            Arc::clone(&cache),
            &visibility,
            &Handle::current(),
        );

        tokio::time::sleep(Duration::from_secs(95)).await;

        // Status is ungated and keeps its 30s cadence; everything else is
        // parked and makes no network calls at all.
        assert!(api.status_calls.load(Ordering::SeqCst) >= 3);
        assert_eq!(api.cluster_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.executor_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.stage_calls.load(Ordering::SeqCst), 0);

        let cache = cache.lock().unwrap();
        // Parked entries keep their cached data for the next re-show.
        assert_eq!(cache.executors.data.as_ref().unwrap()[0].id, "9");
        assert!(!cache.executors.enabled);
        assert!(cache.status.enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn showing_dashboard_fetches_immediately() {
        let api = Arc::new(MockApi::default());
        let cache = MonitorCache::shared();
        let visibility = VisibilitySignal::new();

        let _invalidator = PollScheduler::spawn(
            Arc::clone(&api),
            Arc::clone(&cache),
            &visibility,
            &Handle::current(),
        );

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(api.executor_calls.load(Ordering::SeqCst), 0);

        visibility.set(true);
        // Well under any poll period: the fetch must happen on the
        // transition itself, not on the next natural tick.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(api.executor_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.stage_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.cluster_calls.load(Ordering::SeqCst), 1);
        assert!(cache.lock().unwrap().executors.enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidation_short_circuits_the_period() {
        let api = Arc::new(MockApi::default());
        let cache = MonitorCache::shared();
        let visibility = VisibilitySignal::new();
        visibility.set(true);

        let invalidator = PollScheduler::spawn(
            Arc::clone(&api),
            Arc::clone(&cache),
            &visibility,
            &Handle::current(),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        let before = api.executor_calls.load(Ordering::SeqCst);
        assert_eq!(before, 1);

        invalidator.invalidate_all();
        // A refetch lands long before the 30s idle period would elapse.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(api.executor_calls.load(Ordering::SeqCst), before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn active_stages_tighten_the_poll_period() {
        let api = Arc::new(MockApi::default());
        *api.stages.lock().unwrap() = vec![stage(StageStatus::Active, None)];
        let cache = MonitorCache::shared();
        let visibility = VisibilitySignal::new();
        visibility.set(true);

        let _invalidator = PollScheduler::spawn(
            Arc::clone(&api),
            Arc::clone(&cache),
            &visibility,
            &Handle::current(),
        );

        // With an ACTIVE stage cached, stages poll at 5s: expect roughly one
        // call per 5s window, far more than the idle 30s cadence would give.
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(api.stage_calls.load(Ordering::SeqCst) >= 6);
        // Executors stay idle (no active tasks): 30s cadence.
        assert!(api.executor_calls.load(Ordering::SeqCst) <= 3);
    }
}
