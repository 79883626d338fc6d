use clap::CommandFactory;
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn cli_definition_is_consistent() {
	Cli::command().debug_assert();
}

#[test]
fn parses_repeated_assets() {
	let cli = Cli::try_parse_from(["folio", "--asset", "robot=1500", "-a", "sphere=200:fail"]).unwrap();
	assert_eq!(
		cli.assets,
		vec![
			AssetSpec {
				id: "robot".into(),
				load_ms: 1500,
				fail: false,
			},
			AssetSpec {
				id: "sphere".into(),
				load_ms: 200,
				fail: true,
			},
		]
	);
	assert!(!cli.no_splash);
}

#[test]
fn malformed_asset_is_a_usage_error() {
	let err = Cli::try_parse_from(["folio", "--asset", "robot"]).unwrap_err();
	assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn overrides_apply_on_top_of_config() {
	let cli = Cli::try_parse_from([
		"folio",
		"--floor-ms",
		"500",
		"--settle-ms",
		"100",
		"--task-timeout-ms",
		"9000",
		"--asset",
		"late=50",
	])
	.unwrap();

	let mut config = Config::parse("[[assets]]\nid = \"robot\"\nload_ms = 10\n").unwrap();
	cli.apply(&mut config);

	assert_eq!(config.loading.initial_floor, Duration::from_millis(500));
	assert_eq!(config.loading.settle_delay, Duration::from_millis(100));
	assert_eq!(config.loading.task_timeout, Some(Duration::from_secs(9)));
	let ids: Vec<_> = config.assets.iter().map(|a| a.id.as_str()).collect();
	assert_eq!(ids, vec!["robot", "late"]);
}

#[test]
fn no_overrides_leave_config_untouched() {
	let cli = Cli::try_parse_from(["folio"]).unwrap();
	let mut config = Config::default();
	cli.apply(&mut config);
	assert_eq!(config, Config::default());
}
