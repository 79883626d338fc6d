//! Shared loading coordinator.
//!
//! [`LoadingAggregator`] is a cheap cloneable handle. Producers call
//! [`register`](LoadingAggregator::register) and
//! [`deregister`](LoadingAggregator::deregister) (or hold a
//! [`LoadingGuard`]); the splash screen consumes a [`ReadySignal`].

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::config::LoadingConfig;
use crate::guard::LoadingGuard;
use crate::signal::ReadySignal;
use crate::spawn::{TimerKind, spawn_timer};
use crate::state::{Phase, Registry};
use crate::task::TaskId;

/// Aggregates independent loading tasks into one readiness signal.
#[derive(Debug, Clone)]
pub struct LoadingAggregator {
	inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
	config: LoadingConfig,
	sentinel: TaskId,
	state: Mutex<Shared>,
	ready_tx: watch::Sender<bool>,
}

#[derive(Debug)]
struct Shared {
	registry: Registry,
	/// The single live settle timer, if any.
	settle_task: Option<AbortHandle>,
	/// Per-id timeout timers keyed by registration epoch.
	timeouts: HashMap<u64, AbortHandle>,
}

impl Default for LoadingAggregator {
	fn default() -> Self {
		Self::new(LoadingConfig::default())
	}
}

impl LoadingAggregator {
	/// Creates an aggregator holding the sentinel and starts the floor timer.
	///
	/// Timers run on the ambient tokio runtime.
	pub fn new(config: LoadingConfig) -> Self {
		let sentinel = TaskId::new(&config.sentinel_id);
		let (ready_tx, _) = watch::channel(false);
		let inner = Arc::new(Inner {
			state: Mutex::new(Shared {
				registry: Registry::new(sentinel.clone()),
				settle_task: None,
				timeouts: HashMap::new(),
			}),
			sentinel,
			ready_tx,
			config,
		});

		let floor = inner.config.initial_floor;
		let weak = Arc::downgrade(&inner);
		spawn_timer(TimerKind::Floor, async move {
			tokio::time::sleep(floor).await;
			let Some(inner) = weak.upgrade() else {
				return;
			};
			debug!(floor_ms = floor.as_millis() as u64, "initial floor elapsed");
			let sentinel = inner.sentinel.clone();
			inner.remove(sentinel.as_str(), None);
		});

		debug!(
			floor_ms = inner.config.initial_floor.as_millis() as u64,
			settle_ms = inner.config.settle_delay.as_millis() as u64,
			"loading aggregator created"
		);
		Self { inner }
	}

	/// Marks `id` as outstanding.
	///
	/// Readiness drops to false immediately and any pending settle is
	/// cancelled. Registering an id that is already outstanding adds no
	/// further completion requirement.
	///
	/// The sentinel id is reserved for the initial floor: registering it is
	/// ignored and leaves readiness untouched, even when the app is ready.
	pub fn register(&self, id: impl Into<TaskId>) {
		let id = id.into();
		if id == self.inner.sentinel {
			debug!(task = %id, "ignoring register of reserved sentinel");
			return;
		}
		self.inner.insert(id);
	}

	/// Clears `id` from the outstanding set. Unknown ids are ignored.
	pub fn deregister(&self, id: impl AsRef<str>) {
		let id = id.as_ref();
		if id == self.inner.sentinel.as_str() {
			debug!(task = id, "ignoring deregister of reserved sentinel");
			return;
		}
		self.inner.remove(id, None);
	}

	/// Registers `id` and returns a guard that deregisters it on drop.
	pub fn track(&self, id: impl Into<TaskId>) -> LoadingGuard {
		let id = id.into();
		self.register(id.clone());
		LoadingGuard::new(self.clone(), id)
	}

	/// Runs `fut` with `id` outstanding for its whole lifetime, including
	/// early drop of the returned future.
	pub async fn track_future<F>(&self, id: impl Into<TaskId>, fut: F) -> F::Output
	where
		F: Future,
	{
		let _guard = self.track(id);
		fut.await
	}

	/// Returns the current readiness.
	pub fn is_ready(&self) -> bool {
		*self.inner.ready_tx.borrow()
	}

	/// Returns the current phase.
	pub fn phase(&self) -> Phase {
		self.inner.state.lock().registry.phase()
	}

	/// Subscribes to readiness changes.
	pub fn subscribe(&self) -> ReadySignal {
		ReadySignal::new(self.inner.ready_tx.subscribe())
	}

	/// Returns the constants this aggregator was created with.
	pub fn config(&self) -> &LoadingConfig {
		&self.inner.config
	}
}

impl Inner {
	fn insert(self: &Arc<Self>, id: TaskId) {
		let mut shared = self.state.lock();
		let registered = shared.registry.register(id.clone());
		if let Some(handle) = shared.settle_task.take() {
			handle.abort();
		}
		self.publish(shared.registry.is_ready());

		if registered.previous != Phase::Loading {
			debug!(task = %id, from = registered.previous.as_str(), "loading resumed");
		}
		debug!(
			task = %id,
			outstanding = shared.registry.outstanding_len(),
			new = registered.inserted.is_some(),
			"task registered"
		);
		if let Some((epoch, timeout)) = registered.inserted.zip(self.config.task_timeout) {
			let handle = self.arm_task_timeout(id, epoch, timeout);
			shared.timeouts.insert(epoch, handle);
		}
	}

	/// Removes `id`, restricted to registration `epoch` when given. Returns
	/// true if the id was outstanding.
	fn remove(self: &Arc<Self>, id: &str, epoch: Option<u64>) -> bool {
		let mut shared = self.state.lock();
		let Some(removed) = shared.registry.deregister(id, epoch) else {
			return false;
		};
		debug!(task = id, outstanding = shared.registry.outstanding_len(), "task deregistered");
		if let Some(handle) = shared.timeouts.remove(&removed.epoch) {
			handle.abort();
		}

		if let Some(generation) = removed.settle {
			if let Some(handle) = shared.settle_task.take() {
				handle.abort();
			}
			let delay = self.config.settle_delay;
			let weak = Arc::downgrade(self);
			let task = spawn_timer(TimerKind::Settle, async move {
				tokio::time::sleep(delay).await;
				if let Some(inner) = weak.upgrade() {
					inner.complete_settle(generation);
				}
			});
			shared.settle_task = Some(task.abort_handle());
			debug!(generation, settle_ms = delay.as_millis() as u64, "all tasks cleared, settling");
		}
		true
	}

	fn complete_settle(&self, generation: u64) {
		let mut shared = self.state.lock();
		if !shared.registry.complete_settle(generation) {
			debug!(generation, "stale settle timer ignored");
			return;
		}
		shared.settle_task = None;
		self.publish(true);
		info!("loading complete, app ready");
	}

	/// Spawns the forced-completion timer for one registration. Called with
	/// the state lock held; the timer only locks after its sleep.
	fn arm_task_timeout(self: &Arc<Self>, id: TaskId, epoch: u64, timeout: Duration) -> AbortHandle {
		let weak: Weak<Self> = Arc::downgrade(self);
		spawn_timer(TimerKind::TaskTimeout, async move {
			tokio::time::sleep(timeout).await;
			let Some(inner) = weak.upgrade() else {
				return;
			};
			if inner.remove(id.as_str(), Some(epoch)) {
				warn!(
					task = %id,
					timeout_ms = timeout.as_millis() as u64,
					"task never deregistered, forcing completion"
				);
			}
		})
		.abort_handle()
	}

	/// Publishes readiness; must be called with the state lock held so the
	/// signal never disagrees with the registry.
	fn publish(&self, ready: bool) {
		self.ready_tx.send_if_modified(|current| {
			if *current == ready {
				return false;
			}
			*current = ready;
			true
		});
	}
}

#[cfg(test)]
mod tests;
