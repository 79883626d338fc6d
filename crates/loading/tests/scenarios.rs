//! End-to-end readiness scenarios on virtual time.

use std::time::Duration;

use folio_loading::{LoadingAggregator, LoadingConfig, Phase};

fn ms(n: u64) -> Duration {
	Duration::from_millis(n)
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn early_sentinel_deregister_does_not_shorten_floor() {
	let aggregator = LoadingAggregator::default();
	aggregator.deregister("initial-load");

	tokio::time::sleep(ms(1999)).await;
	assert!(!aggregator.is_ready());

	tokio::time::sleep(ms(802)).await;
	assert!(aggregator.is_ready());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn ready_waits_for_every_model() {
	let aggregator = LoadingAggregator::default();
	tokio::time::sleep(ms(2801)).await;
	assert!(aggregator.is_ready());

	aggregator.register("model-a");
	aggregator.register("model-b");
	aggregator.deregister("model-a");
	assert!(!aggregator.is_ready());

	tokio::time::sleep(ms(5000)).await;
	assert!(!aggregator.is_ready());

	aggregator.deregister("model-b");
	tokio::time::sleep(ms(801)).await;
	assert!(aggregator.is_ready());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn models_finishing_before_floor_wait_for_it() {
	let aggregator = LoadingAggregator::default();
	aggregator.register("model-a");
	aggregator.register("model-b");
	aggregator.deregister("model-a");
	aggregator.deregister("model-b");
	assert_eq!(aggregator.phase(), Phase::Loading);

	tokio::time::sleep(ms(2799)).await;
	assert!(!aggregator.is_ready());
	tokio::time::sleep(ms(2)).await;
	assert!(aggregator.is_ready());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn late_task_reenters_loading() {
	let aggregator = LoadingAggregator::default();
	let mut signal = aggregator.subscribe();
	assert!(signal.wait_ready().await);

	aggregator.register("late-task");
	assert!(!aggregator.is_ready());
	assert!(!signal.get());

	aggregator.deregister("late-task");
	tokio::time::sleep(ms(799)).await;
	assert!(!aggregator.is_ready());
	tokio::time::sleep(ms(2)).await;
	assert!(aggregator.is_ready());
	assert!(signal.get());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn settle_debounces_near_simultaneous_completions() {
	let aggregator = LoadingAggregator::default();
	let mut signal = aggregator.subscribe();
	aggregator.register("a");
	aggregator.register("b");

	tokio::time::sleep(ms(3000)).await;
	aggregator.deregister("a");
	tokio::time::sleep(ms(400)).await;
	aggregator.register("c");
	aggregator.deregister("b");
	aggregator.deregister("c");

	// Settle restarted at 3400ms; nothing may have flipped yet.
	tokio::time::sleep(ms(799)).await;
	assert!(!signal.has_changed());

	assert!(signal.wait_ready().await);
	assert_eq!(aggregator.phase(), Phase::Ready);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn custom_constants_are_honoured() {
	let aggregator = LoadingAggregator::new(LoadingConfig {
		initial_floor: ms(100),
		settle_delay: ms(50),
		sentinel_id: "boot".into(),
		task_timeout: None,
	});

	// The old default sentinel is an ordinary id under a custom config.
	aggregator.register("initial-load");
	tokio::time::sleep(ms(151)).await;
	assert!(!aggregator.is_ready());

	aggregator.deregister("initial-load");
	aggregator.deregister("boot");
	tokio::time::sleep(ms(51)).await;
	assert!(aggregator.is_ready());
}
