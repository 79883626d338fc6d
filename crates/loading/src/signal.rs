use tokio::sync::watch;

/// Live view of an aggregator's readiness.
///
/// Cloning yields an independent subscriber. Once every
/// [`LoadingAggregator`](crate::LoadingAggregator) handle is dropped the
/// signal freezes at its last value and the waiting methods return.
#[derive(Debug, Clone)]
pub struct ReadySignal {
	rx: watch::Receiver<bool>,
}

impl ReadySignal {
	pub(crate) fn new(rx: watch::Receiver<bool>) -> Self {
		Self { rx }
	}

	/// Returns the current readiness without marking it seen.
	pub fn get(&self) -> bool {
		*self.rx.borrow()
	}

	/// Returns true if readiness changed since this subscriber last looked.
	pub fn has_changed(&self) -> bool {
		self.rx.has_changed().unwrap_or(false)
	}

	/// Waits for the next change and returns the new value.
	///
	/// Returns `None` once the aggregator is gone.
	pub async fn changed(&mut self) -> Option<bool> {
		self.rx.changed().await.ok()?;
		Some(*self.rx.borrow_and_update())
	}

	/// Waits until the app is ready. Returns false if the aggregator went
	/// away first.
	pub async fn wait_ready(&mut self) -> bool {
		self.rx.wait_for(|ready| *ready).await.is_ok()
	}

	/// Waits until the app is loading again. Returns false if the aggregator
	/// went away first.
	pub async fn wait_loading(&mut self) -> bool {
		self.rx.wait_for(|ready| !*ready).await.is_ok()
	}
}
