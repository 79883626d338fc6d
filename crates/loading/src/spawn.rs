use std::future::Future;
use std::sync::OnceLock;

use tokio::task::JoinHandle;

/// Timer roles spawned by the aggregator, used as a tracing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerKind {
	/// Removes the sentinel once the minimum splash duration elapses.
	Floor,
	/// Debounce between the last task clearing and readiness.
	Settle,
	/// Force-deregisters a task that outlived its timeout.
	TaskTimeout,
}

impl TimerKind {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Floor => "floor",
			Self::Settle => "settle",
			Self::TaskTimeout => "task_timeout",
		}
	}
}

fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(1)
			.thread_name("folio-loading-timers")
			.build()
			.expect("failed to build folio-loading timer runtime")
	});
	runtime.handle().clone()
}

/// Spawns one aggregator timer on the ambient runtime, or on a private
/// fallback runtime when called outside tokio.
pub(crate) fn spawn_timer<F>(kind: TimerKind, fut: F) -> JoinHandle<()>
where
	F: Future<Output = ()> + Send + 'static,
{
	tracing::trace!(timer = kind.as_str(), "loading.timer.spawn");
	runtime_handle().spawn(fut)
}
