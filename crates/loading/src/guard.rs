use crate::aggregator::LoadingAggregator;
use crate::task::TaskId;

/// Scoped registration of one loading task.
///
/// The task is deregistered when the guard drops, so completion is reported
/// on success, early return, panic unwind, and cancellation of the owning
/// future alike. Two guards sharing an id share one outstanding slot: the
/// first to drop clears it.
#[must_use = "dropping the guard deregisters the task immediately"]
#[derive(Debug)]
pub struct LoadingGuard {
	aggregator: LoadingAggregator,
	id: TaskId,
}

impl LoadingGuard {
	pub(crate) fn new(aggregator: LoadingAggregator, id: TaskId) -> Self {
		Self { aggregator, id }
	}

	pub fn id(&self) -> &TaskId {
		&self.id
	}

	/// Deregisters now. Equivalent to dropping the guard.
	pub fn finish(self) {}
}

impl Drop for LoadingGuard {
	fn drop(&mut self) {
		self.aggregator.deregister(&self.id);
	}
}
