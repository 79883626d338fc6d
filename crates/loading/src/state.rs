//! Timer-free loading state machine.
//!
//! The aggregator owns one [`Registry`] behind its lock and turns the
//! returned decisions into timers and signal updates.

use std::collections::HashMap;

use crate::task::TaskId;

/// Readiness phase derived from the outstanding set and the settle timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
	/// Work is outstanding.
	Loading,
	/// Nothing is outstanding; the settle delay has not elapsed yet.
	Settling,
	/// Nothing is outstanding and the settle delay elapsed undisturbed.
	Ready,
}

impl Phase {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Loading => "loading",
			Self::Settling => "settling",
			Self::Ready => "ready",
		}
	}
}

/// Result of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Registered {
	/// Epoch assigned to a newly inserted id, `None` if it was already present.
	pub inserted: Option<u64>,
	/// Phase before the registration was applied.
	pub previous: Phase,
}

/// Result of a removal that actually removed an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Removed {
	/// Epoch of the registration that was removed.
	pub epoch: u64,
	/// Settle generation to arm when the outstanding set became empty.
	pub settle: Option<u64>,
}

#[derive(Debug)]
pub(crate) struct Registry {
	/// Outstanding ids mapped to the epoch of their current registration.
	outstanding: HashMap<TaskId, u64>,
	next_epoch: u64,
	/// Bumped by every registration and every settle start; a settle timer
	/// completes only while its captured generation is current.
	settle_generation: u64,
	phase: Phase,
}

impl Registry {
	/// Creates a registry holding only the sentinel.
	pub fn new(sentinel: TaskId) -> Self {
		let mut outstanding = HashMap::new();
		outstanding.insert(sentinel, 0);
		Self {
			outstanding,
			next_epoch: 1,
			settle_generation: 0,
			phase: Phase::Loading,
		}
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn is_ready(&self) -> bool {
		self.phase == Phase::Ready
	}

	/// Inserts `id` if absent and defeats any pending or completed settle.
	pub fn register(&mut self, id: TaskId) -> Registered {
		let previous = self.phase;
		self.settle_generation = self.settle_generation.wrapping_add(1);
		self.phase = Phase::Loading;

		let inserted = if self.outstanding.contains_key(&id) {
			None
		} else {
			let epoch = self.next_epoch;
			self.next_epoch = self.next_epoch.wrapping_add(1);
			self.outstanding.insert(id, epoch);
			Some(epoch)
		};

		Registered { inserted, previous }
	}

	/// Removes `id` if present.
	///
	/// With `epoch` set, the id is only removed while its current registration
	/// carries that epoch. Returns `None` when nothing was removed.
	pub fn deregister(&mut self, id: &str, epoch: Option<u64>) -> Option<Removed> {
		match (self.outstanding.get(id), epoch) {
			(None, _) => return None,
			(Some(current), Some(expected)) if *current != expected => return None,
			_ => {}
		}
		let removed = self.outstanding.remove(id)?;

		if !self.outstanding.is_empty() {
			return Some(Removed {
				epoch: removed,
				settle: None,
			});
		}

		self.settle_generation = self.settle_generation.wrapping_add(1);
		self.phase = Phase::Settling;
		Some(Removed {
			epoch: removed,
			settle: Some(self.settle_generation),
		})
	}

	/// Completes a settle started at `generation`. Returns true if the
	/// registry became ready.
	pub fn complete_settle(&mut self, generation: u64) -> bool {
		if self.phase != Phase::Settling || generation != self.settle_generation || !self.outstanding.is_empty() {
			return false;
		}
		self.phase = Phase::Ready;
		true
	}

	pub fn outstanding_len(&self) -> usize {
		self.outstanding.len()
	}

	#[cfg(test)]
	pub fn outstanding_ids(&self) -> Vec<&str> {
		let mut ids: Vec<_> = self.outstanding.keys().map(TaskId::as_str).collect();
		ids.sort_unstable();
		ids
	}
}
