use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::entities::{
    Actor, Collected, CollectorEndReason, CollectorFilter, CollectorOptions, IdentityKey, Settled,
};
use crate::error::CollectorError;
use crate::use_cases::ports::{
    CollectPolicy, CollectorListener, EventBus, EventSink, HookResult, SinkTarget, Subscription,
};

/// Builder for creating collectors with a fluent API
pub struct CollectorBuilder<T, P> {
    policy: P,
    filter: CollectorFilter<T>,
    options: CollectorOptions,
    listener: Option<Arc<dyn CollectorListener<T>>>,
}

impl<T, P> CollectorBuilder<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: CollectPolicy<T>,
{
    /// Create a builder for a collector driven by `policy`
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            filter: CollectorFilter::all(),
            options: CollectorOptions::default(),
            listener: None,
        }
    }

    /// Set the filter deciding which events are accepted
    pub fn filter(mut self, filter: CollectorFilter<T>) -> Self {
        self.filter = filter;
        self
    }

    /// Set the timing and removal options
    pub fn options(mut self, options: CollectorOptions) -> Self {
        self.options = options;
        self
    }

    /// Install the listener; it is in place before the first event can arrive
    pub fn listener(mut self, listener: Arc<dyn CollectorListener<T>>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Subscribe to the bus and start collecting.
    ///
    /// Fails without leaving any subscription behind when the options are
    /// contradictory, when the bus refuses a subscription, or when a timer is
    /// configured outside a tokio runtime.
    pub fn subscribe(self, bus: &dyn EventBus) -> Result<Collector<T, P>, CollectorError> {
        self.options.validate()?;
        self.policy.validate()?;
        let runtime = if self.options.has_timer() {
            Some(tokio::runtime::Handle::try_current().map_err(|_| {
                CollectorError::ConfigurationError(
                    "time and idle budgets require a tokio runtime".to_string(),
                )
            })?)
        } else {
            None
        };

        let now = Instant::now();
        let idle = self.options.idle.map(|idle| watch::Sender::new(now + idle));
        let shared = Arc::new(Shared {
            policy: self.policy,
            filter: self.filter,
            options: self.options,
            listener: self.listener,
            state: Mutex::new(State::default()),
            settled: watch::Sender::new(None),
            idle,
        });

        let target: Weak<dyn SinkTarget<T>> = Arc::downgrade(&shared) as Weak<dyn SinkTarget<T>>;
        let subscriptions = shared.policy.subscribe(bus, EventSink::new(target))?;

        let timer = runtime.map(|runtime| {
            let deadline = shared.options.time.map(|time| now + time);
            let idle = shared.idle.as_ref().map(|tx| tx.subscribe());
            runtime.spawn(run_timer(Arc::downgrade(&shared), deadline, idle))
        });

        {
            let mut state = shared.lock();
            if state.end_reason.is_some() {
                // Ended while subscribing: release immediately.
                drop(subscriptions);
                if let Some(timer) = timer {
                    timer.abort();
                }
            } else {
                state.subscriptions = subscriptions;
                state.timer = timer;
            }
        }

        debug!(
            time = ?shared.options.time,
            idle = ?shared.options.idle,
            "collector subscribed"
        );
        Ok(Collector { shared })
    }
}

/// A live (or ended) collector.
///
/// Cloning the handle shares the same collector. When every handle of a live
/// collector is dropped, it ends with [`CollectorEndReason::User`]: `on_end`
/// fires with the entries collected so far, then the subscriptions and timer
/// are released.
///
/// Per-event hooks never fire after `on_end`. An end committed while a hook
/// is being delivered on another thread waits for that hook to return.
pub struct Collector<T, P: CollectPolicy<T>> {
    shared: Arc<Shared<T, P>>,
}

impl<T, P> Collector<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: CollectPolicy<T>,
{
    /// Offer an event for collection, as the bus does
    pub fn handle_collect(&self, item: T, actor: Option<Actor>) {
        self.shared.collect_event(item, actor);
    }

    /// Offer a retraction event, as the bus does
    pub fn handle_dispose(&self, item: T, actor: Option<Actor>) {
        self.shared.dispose_event(item, actor);
    }

    /// End the collector. Returns `false` if it had already ended.
    pub fn stop(&self, reason: CollectorEndReason) -> bool {
        self.shared.terminate(reason)
    }

    /// Clear collected entries and running counters, then re-check the end condition
    pub fn reset(&self) {
        let mut state = self.shared.lock();
        if state.end_reason.is_some() {
            return;
        }
        state.entries.clear();
        state.tally = P::Tally::default();
        let finish = self.shared.evaluate(&mut state);
        self.shared.settle(state, finish);
    }

    /// Evaluate the end condition now; returns the end reason if the collector has ended
    pub fn check_end(&self) -> Option<CollectorEndReason> {
        let mut state = self.shared.lock();
        let finish = self.shared.evaluate(&mut state);
        let reason = state.end_reason;
        self.shared.settle(state, finish);
        reason
    }

    /// Snapshot of the collected entries; frozen once ended
    pub fn collected(&self) -> Collected<T> {
        self.shared.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The end reason, `None` while live
    pub fn end_reason(&self) -> Option<CollectorEndReason> {
        self.shared.lock().end_reason
    }

    pub fn is_ended(&self) -> bool {
        self.end_reason().is_some()
    }

    pub fn options(&self) -> &CollectorOptions {
        &self.shared.options
    }

    pub fn policy(&self) -> &P {
        &self.shared.policy
    }

    /// Read the policy's running counters
    pub fn with_tally<R>(&self, read: impl FnOnce(&P::Tally) -> R) -> R {
        read(&self.shared.lock().tally)
    }

    /// Wait for the collector to end
    pub async fn ended(&self) -> Settled<T> {
        let mut rx = self.shared.settled.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(settled) = current {
                return settled;
            }
            if rx.changed().await.is_err() {
                // The sender lives in `shared`, which this handle keeps alive.
                std::future::pending::<()>().await;
            }
        }
    }
}

impl<T, P: CollectPolicy<T>> Clone for Collector<T, P> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

struct Entry<T> {
    seq: u64,
    item: T,
}

struct State<T, A> {
    entries: HashMap<IdentityKey, Entry<T>>,
    next_seq: u64,
    tally: A,
    end_reason: Option<CollectorEndReason>,
    frozen: Option<Collected<T>>,
    subscriptions: Vec<Subscription>,
    timer: Option<JoinHandle<()>>,
    /// Per-event hooks being delivered outside the lock
    in_flight: usize,
    /// Committed end held back until `in_flight` drops to zero
    deferred: Option<Finish<T>>,
}

impl<T, A: Default> Default for State<T, A> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_seq: 0,
            tally: A::default(),
            end_reason: None,
            frozen: None,
            subscriptions: Vec::new(),
            timer: None,
            in_flight: 0,
            deferred: None,
        }
    }
}

impl<T: Clone, A> State<T, A> {
    /// Upsert; a replaced entry keeps its original position
    fn insert(&mut self, key: IdentityKey, item: T) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.item = item;
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(key, Entry { seq, item });
    }

    fn snapshot(&self) -> Collected<T> {
        if let Some(frozen) = &self.frozen {
            return frozen.clone();
        }
        let mut entries: Vec<(u64, IdentityKey, T)> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.seq, key.clone(), entry.item.clone()))
            .collect();
        entries.sort_unstable_by_key(|(seq, _, _)| *seq);
        Collected::from_entries(entries.into_iter().map(|(_, key, item)| (key, item)).collect())
    }
}

/// Everything released after the end reason is committed
struct Finish<T> {
    reason: CollectorEndReason,
    collected: Collected<T>,
    subscriptions: Vec<Subscription>,
    timer: Option<JoinHandle<()>>,
}

struct Shared<T, P: CollectPolicy<T>> {
    policy: P,
    filter: CollectorFilter<T>,
    options: CollectorOptions,
    listener: Option<Arc<dyn CollectorListener<T>>>,
    state: Mutex<State<T, P::Tally>>,
    settled: watch::Sender<Option<Settled<T>>>,
    idle: Option<watch::Sender<Instant>>,
}

impl<T, P> Shared<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: CollectPolicy<T>,
{
    fn lock(&self) -> MutexGuard<'_, State<T, P::Tally>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn collect_event(&self, item: T, actor: Option<Actor>) {
        let Some(key) = self.accept(&item, actor.as_ref()) else {
            return;
        };

        let mut state = self.lock();
        if state.end_reason.is_some() {
            return;
        }
        let removed = if self.options.remove_on_rematch {
            state.entries.remove(&key)
        } else {
            None
        };
        if removed.is_none() {
            self.policy.record(&mut state.tally, &item, actor.as_ref());
            state.insert(key.clone(), item.clone());
        }
        self.touch_idle();
        let finish = self.evaluate(&mut state);
        Self::begin_delivery(&mut state, finish);
        drop(state);

        match removed {
            Some(entry) => {
                debug!(key = %key, "removed on rematch");
                self.fire("on_remove", |l| l.on_remove(&entry.item, actor.as_ref()));
            }
            None => {
                debug!(key = %key, "collected");
                self.fire("on_collect", |l| l.on_collect(&item, actor.as_ref()));
            }
        }
        self.end_delivery();
    }

    fn dispose_event(&self, item: T, actor: Option<Actor>) {
        let Some(key) = self.accept(&item, actor.as_ref()) else {
            return;
        };

        let mut state = self.lock();
        if state.end_reason.is_some() {
            return;
        }
        let removed = state.entries.remove(&key);
        let finish = self.evaluate(&mut state);
        Self::begin_delivery(&mut state, finish);
        drop(state);

        self.fire("on_dispose", |l| l.on_dispose(&item, actor.as_ref()));
        if let Some(entry) = removed {
            debug!(key = %key, "disposed");
            self.fire("on_remove", |l| l.on_remove(&entry.item, actor.as_ref()));
        }
        self.end_delivery();
    }

    /// Mark a per-event hook as in flight; an end committed by this event waits for it
    fn begin_delivery(state: &mut State<T, P::Tally>, finish: Option<Finish<T>>) {
        state.in_flight += 1;
        if finish.is_some() {
            state.deferred = finish;
        }
    }

    /// The last in-flight delivery runs any end committed meanwhile
    fn end_delivery(&self) {
        let mut state = self.lock();
        state.in_flight -= 1;
        let finish = if state.in_flight == 0 {
            state.deferred.take()
        } else {
            None
        };
        drop(state);
        if let Some(finish) = finish {
            self.finish(finish);
        }
    }

    /// Run a freshly committed end now, or hand it to the in-flight deliveries
    fn settle(&self, mut state: MutexGuard<'_, State<T, P::Tally>>, finish: Option<Finish<T>>) {
        let Some(finish) = finish else {
            return;
        };
        if state.in_flight > 0 {
            state.deferred = Some(finish);
            return;
        }
        drop(state);
        self.finish(finish);
    }

    /// Scope guard, then filter, then identity key
    fn accept(&self, item: &T, actor: Option<&Actor>) -> Option<IdentityKey> {
        if self.lock().end_reason.is_some() {
            return None;
        }
        let scoped = self.policy.key(item)?;
        if !self.filter.matches(item, actor) {
            return None;
        }
        Some(self.filter.key(item, actor).unwrap_or(scoped))
    }

    fn touch_idle(&self) {
        if let (Some(tx), Some(idle)) = (&self.idle, self.options.idle) {
            tx.send_replace(Instant::now() + idle);
        }
    }

    fn evaluate(&self, state: &mut State<T, P::Tally>) -> Option<Finish<T>> {
        if state.end_reason.is_some() {
            return None;
        }
        let reason = self.policy.end_reason(&state.tally, state.entries.len())?;
        Self::commit(state, reason)
    }

    /// The single-writer guard: only the first caller commits an end reason
    fn commit(state: &mut State<T, P::Tally>, reason: CollectorEndReason) -> Option<Finish<T>> {
        if state.end_reason.is_some() {
            return None;
        }
        let collected = state.snapshot();
        state.end_reason = Some(reason);
        state.frozen = Some(collected.clone());
        Some(Finish {
            reason,
            collected,
            subscriptions: std::mem::take(&mut state.subscriptions),
            timer: state.timer.take(),
        })
    }

    fn terminate(&self, reason: CollectorEndReason) -> bool {
        let mut state = self.lock();
        let finish = Self::commit(&mut state, reason);
        let won = finish.is_some();
        self.settle(state, finish);
        won
    }

    /// Release resources and fire the terminal hook; never called with the lock held
    fn finish(&self, finish: Finish<T>) {
        let Finish {
            reason,
            collected,
            subscriptions,
            timer,
        } = finish;
        for subscription in subscriptions {
            subscription.cancel();
        }
        if let Some(timer) = timer {
            timer.abort();
        }
        debug!(reason = %reason, collected = collected.len(), "collector ended");

        let hook = match &self.listener {
            Some(listener) => listener.on_end(&collected, reason),
            None => Ok(()),
        };
        if let Err(e) = &hook {
            warn!(reason = %reason, error = %e, "on_end hook failed");
        }
        self.settled.send_replace(Some(Settled {
            reason,
            collected,
            hook,
        }));
    }

    fn fire(&self, hook: &'static str, call: impl FnOnce(&dyn CollectorListener<T>) -> HookResult) {
        if let Some(listener) = &self.listener {
            if let Err(e) = call(listener.as_ref()) {
                warn!(hook, error = %e, "listener hook failed, continuing");
            }
        }
    }
}

impl<T, P> SinkTarget<T> for Shared<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: CollectPolicy<T>,
{
    fn collect(&self, item: T, actor: Option<Actor>) {
        self.collect_event(item, actor);
    }

    fn dispose(&self, item: T, actor: Option<Actor>) {
        self.dispose_event(item, actor);
    }

    fn stop(&self, reason: CollectorEndReason) -> bool {
        self.terminate(reason)
    }
}

impl<T, P: CollectPolicy<T>> Drop for Shared<T, P> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        if state.end_reason.is_some() {
            return;
        }
        debug!("collector dropped while live, ending with USER_CANCEL");
        state.end_reason = Some(CollectorEndReason::User);
        state.subscriptions.clear();

        let mut entries: Vec<(IdentityKey, Entry<T>)> = state.entries.drain().collect();
        entries.sort_unstable_by_key(|(_, entry)| entry.seq);
        let collected = Collected::from_entries(
            entries
                .into_iter()
                .map(|(key, entry)| (key, entry.item))
                .collect(),
        );
        if let Some(listener) = &self.listener {
            if let Err(e) = listener.on_end(&collected, CollectorEndReason::User) {
                warn!(error = %e, "on_end hook failed");
            }
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn idle_changed(idle: &mut Option<watch::Receiver<Instant>>) -> bool {
    match idle {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}

/// Fire `Time` at the deadline, or `Idle` when the idle deadline passes without being pushed back
async fn run_timer<T, P>(
    shared: Weak<Shared<T, P>>,
    deadline: Option<Instant>,
    mut idle: Option<watch::Receiver<Instant>>,
) where
    T: Clone + Send + Sync + 'static,
    P: CollectPolicy<T>,
{
    loop {
        let idle_at = idle.as_mut().map(|rx| *rx.borrow_and_update());
        let reason = tokio::select! {
            biased;
            _ = sleep_until_opt(deadline) => CollectorEndReason::Time,
            _ = sleep_until_opt(idle_at) => CollectorEndReason::Idle,
            changed = idle_changed(&mut idle) => {
                if changed {
                    continue;
                }
                return;
            }
        };
        if let Some(shared) = shared.upgrade() {
            shared.terminate(reason);
        }
        return;
    }
}
