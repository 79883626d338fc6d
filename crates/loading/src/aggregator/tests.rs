use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;

fn ms(n: u64) -> Duration {
	Duration::from_millis(n)
}

/// Records every readiness value published after subscription.
fn record(aggregator: &LoadingAggregator) -> Arc<Mutex<Vec<bool>>> {
	let history = Arc::new(Mutex::new(Vec::new()));
	let mut signal = aggregator.subscribe();
	let sink = Arc::clone(&history);
	tokio::spawn(async move {
		while let Some(ready) = signal.changed().await {
			sink.lock().push(ready);
		}
	});
	history
}

fn outstanding(aggregator: &LoadingAggregator) -> usize {
	aggregator.inner.state.lock().registry.outstanding_len()
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn starts_not_ready() {
	let aggregator = LoadingAggregator::default();
	assert!(!aggregator.is_ready());
	assert!(!aggregator.subscribe().get());
	assert_eq!(aggregator.phase(), Phase::Loading);
	assert_eq!(outstanding(&aggregator), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn floor_alone_reaches_ready_after_settle() {
	let aggregator = LoadingAggregator::default();

	tokio::time::sleep(ms(1999)).await;
	assert!(!aggregator.is_ready());
	assert_eq!(aggregator.phase(), Phase::Loading);

	tokio::time::sleep(ms(800)).await;
	assert!(!aggregator.is_ready());
	assert_eq!(aggregator.phase(), Phase::Settling);

	tokio::time::sleep(ms(2)).await;
	assert!(aggregator.is_ready());
	assert_eq!(aggregator.phase(), Phase::Ready);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn register_during_settle_restarts_clock() {
	let aggregator = LoadingAggregator::default();
	let history = record(&aggregator);

	tokio::time::sleep(ms(2001)).await;
	assert_eq!(aggregator.phase(), Phase::Settling);

	tokio::time::sleep(ms(400)).await;
	aggregator.register("late");
	assert_eq!(aggregator.phase(), Phase::Loading);
	aggregator.deregister("late");
	assert_eq!(aggregator.phase(), Phase::Settling);

	// The original settle would have elapsed at 2800ms.
	tokio::time::sleep(ms(799)).await;
	assert!(!aggregator.is_ready());
	assert!(history.lock().is_empty());

	tokio::time::sleep(ms(2)).await;
	assert!(aggregator.is_ready());
	assert_eq!(*history.lock(), vec![true]);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn register_after_ready_flips_immediately() {
	let aggregator = LoadingAggregator::default();
	let mut signal = aggregator.subscribe();
	assert!(signal.wait_ready().await);

	aggregator.register("route-asset");
	assert!(!aggregator.is_ready());
	assert!(signal.has_changed());
	assert_eq!(signal.changed().await, Some(false));

	aggregator.deregister("route-asset");
	assert_eq!(aggregator.phase(), Phase::Settling);
	tokio::time::sleep(ms(801)).await;
	assert!(aggregator.is_ready());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn duplicate_register_needs_one_deregister() {
	let aggregator = LoadingAggregator::default();
	aggregator.register("model");
	aggregator.register("model");
	assert_eq!(outstanding(&aggregator), 2);

	aggregator.deregister("model");
	assert_eq!(outstanding(&aggregator), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn absent_deregister_does_not_disturb() {
	let aggregator = LoadingAggregator::default();
	aggregator.deregister("ghost");
	assert_eq!(outstanding(&aggregator), 1);

	tokio::time::sleep(ms(2400)).await;
	assert_eq!(aggregator.phase(), Phase::Settling);
	// An unknown id must not restart the settle clock.
	aggregator.deregister("ghost");
	tokio::time::sleep(ms(401)).await;
	assert!(aggregator.is_ready());

	aggregator.deregister("ghost");
	assert!(aggregator.is_ready());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn sentinel_is_reserved() {
	let aggregator = LoadingAggregator::default();
	aggregator.deregister(crate::DEFAULT_SENTINEL_ID);
	assert_eq!(outstanding(&aggregator), 1);

	tokio::time::sleep(ms(2801)).await;
	assert!(aggregator.is_ready());

	aggregator.register(crate::DEFAULT_SENTINEL_ID);
	assert!(aggregator.is_ready());
	assert_eq!(outstanding(&aggregator), 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn task_timeout_forces_completion() {
	let aggregator = LoadingAggregator::new(LoadingConfig {
		task_timeout: Some(ms(5000)),
		..LoadingConfig::default()
	});
	aggregator.register("stuck");

	tokio::time::sleep(ms(4999)).await;
	assert_eq!(outstanding(&aggregator), 1);
	assert_eq!(aggregator.phase(), Phase::Loading);

	tokio::time::sleep(ms(2)).await;
	assert_eq!(outstanding(&aggregator), 0);
	assert_eq!(aggregator.phase(), Phase::Settling);

	tokio::time::sleep(ms(800)).await;
	assert!(aggregator.is_ready());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn stale_task_timeout_spares_reregistered_id() {
	let aggregator = LoadingAggregator::new(LoadingConfig {
		task_timeout: Some(ms(5000)),
		..LoadingConfig::default()
	});
	aggregator.register("asset");
	tokio::time::sleep(ms(3000)).await;
	aggregator.deregister("asset");
	aggregator.register("asset");

	// First registration's timeout fires at 5000ms and must not touch the second.
	tokio::time::sleep(ms(2500)).await;
	assert_eq!(outstanding(&aggregator), 1);

	// Second registration's timeout fires at 8000ms.
	tokio::time::sleep(ms(2501)).await;
	assert_eq!(outstanding(&aggregator), 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn deregister_cancels_task_timeout() {
	let aggregator = LoadingAggregator::new(LoadingConfig {
		task_timeout: Some(ms(60_000)),
		..LoadingConfig::default()
	});
	aggregator.register("asset");
	let timer = {
		let shared = aggregator.inner.state.lock();
		assert_eq!(shared.timeouts.len(), 1);
		shared.timeouts.values().next().unwrap().clone()
	};

	tokio::time::sleep(ms(100)).await;
	aggregator.deregister("asset");
	assert!(aggregator.inner.state.lock().timeouts.is_empty());

	tokio::time::sleep(ms(1)).await;
	assert!(timer.is_finished());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn fired_task_timeout_is_forgotten() {
	let aggregator = LoadingAggregator::new(LoadingConfig {
		task_timeout: Some(ms(500)),
		..LoadingConfig::default()
	});
	aggregator.register("stuck");

	tokio::time::sleep(ms(501)).await;
	assert_eq!(outstanding(&aggregator), 1);
	assert!(aggregator.inner.state.lock().timeouts.is_empty());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn guard_drop_deregisters() {
	let aggregator = LoadingAggregator::default();
	let guard = aggregator.track("texture");
	assert_eq!(guard.id().as_str(), "texture");
	assert_eq!(outstanding(&aggregator), 2);

	guard.finish();
	assert_eq!(outstanding(&aggregator), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn aborted_producer_releases_its_task() {
	let aggregator = LoadingAggregator::default();
	let producer = {
		let aggregator = aggregator.clone();
		tokio::spawn(async move {
			aggregator
				.track_future("hung-download", std::future::pending::<()>())
				.await;
		})
	};
	tokio::task::yield_now().await;
	assert_eq!(outstanding(&aggregator), 2);

	producer.abort();
	let _ = producer.await;
	assert_eq!(outstanding(&aggregator), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn track_future_returns_output() {
	let aggregator = LoadingAggregator::default();
	let value = aggregator
		.track_future("model", async {
			tokio::time::sleep(ms(100)).await;
			42
		})
		.await;
	assert_eq!(value, 42);
	assert_eq!(outstanding(&aggregator), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn live_signal_observes_reentry_into_loading() {
	let aggregator = LoadingAggregator::default();
	let mut signal = aggregator.subscribe();
	assert!(signal.wait_ready().await);

	let waiter = tokio::spawn(async move { signal.wait_loading().await });
	tokio::task::yield_now().await;
	assert!(!waiter.is_finished());

	aggregator.register("late-texture");
	assert!(waiter.await.unwrap());
	assert_eq!(aggregator.phase(), Phase::Loading);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn config_reports_construction_constants() {
	let config = LoadingConfig {
		initial_floor: ms(500),
		settle_delay: ms(100),
		..LoadingConfig::default()
	};
	let aggregator = LoadingAggregator::new(config.clone());
	assert_eq!(aggregator.config(), &config);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn dropping_all_handles_closes_signal() {
	let aggregator = LoadingAggregator::default();
	let mut signal = aggregator.subscribe();
	drop(aggregator);

	assert_eq!(signal.changed().await, None);
	assert!(!signal.wait_ready().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_producers_do_not_lose_updates() {
	let aggregator = LoadingAggregator::new(LoadingConfig {
		initial_floor: ms(10),
		settle_delay: ms(10),
		..LoadingConfig::default()
	});

	let mut producers = Vec::new();
	for worker in 0..8 {
		let aggregator = aggregator.clone();
		producers.push(tokio::spawn(async move {
			for item in 0..100 {
				let id = format!("w{worker}-{item}");
				aggregator.register(id.as_str());
				tokio::task::yield_now().await;
				aggregator.deregister(&id);
			}
		}));
	}
	for producer in producers {
		producer.await.unwrap();
	}

	let mut signal = aggregator.subscribe();
	tokio::time::timeout(Duration::from_secs(5), signal.wait_ready())
		.await
		.expect("aggregator never settled");
	assert_eq!(outstanding(&aggregator), 0);
}
