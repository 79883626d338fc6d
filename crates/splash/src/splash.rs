//! Startup splash screen with live log display.
//!
//! Shows a loading view while the aggregator reports not-ready: a typed status
//! line plus the most recent tracing events captured by [`SplashLogLayer`].
//! Once readiness flips, rendering stops, the exit transition runs and the
//! view is cleared.

mod typewriter;

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use crossterm::cursor::{Hide, RestorePosition, SavePosition, Show};
use crossterm::queue;
use crossterm::style::{Color, Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use folio_loading::ReadySignal;
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
pub use typewriter::Typewriter;

/// Width budget for one rendered log line.
const LINE_WIDTH: usize = 72;

/// Upper bound for [`SplashConfig::log_lines`].
pub const MAX_LOG_LINES: usize = 256;

/// Splash timings and content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplashConfig {
	/// Delay before the first frame, to avoid flashing on fast startups.
	pub reveal_delay_ms: u64,
	/// Time between typed characters.
	pub type_interval_ms: u64,
	/// How long a finished status line stays before clearing.
	pub message_hold_ms: u64,
	/// Exit transition after readiness, before the view is cleared.
	pub exit_ms: u64,
	/// Number of captured log lines shown under the status line, at most
	/// [`MAX_LOG_LINES`].
	pub log_lines: usize,
	/// Status lines typed in a cycle while loading.
	pub messages: Vec<String>,
}

impl Default for SplashConfig {
	fn default() -> Self {
		Self {
			reveal_delay_ms: 0,
			type_interval_ms: 50,
			message_hold_ms: 1000,
			exit_ms: 500,
			log_lines: 8,
			messages: ["Initializing systems...", "Fetching scene assets...", "Warming up renderer..."]
				.into_iter()
				.map(String::from)
				.collect(),
		}
	}
}

impl SplashConfig {
	pub fn type_interval(&self) -> Duration {
		Duration::from_millis(self.type_interval_ms)
	}

	/// Hold time expressed in typing ticks, rounded up.
	pub fn hold_ticks(&self) -> u32 {
		let interval = self.type_interval_ms.max(1);
		self.message_hold_ms.div_ceil(interval).try_into().unwrap_or(u32::MAX)
	}
}

/// Captured log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
	pub level: Level,
	pub target: String,
	pub message: String,
}

/// Bounded buffer of recent log entries shared with the renderer.
#[derive(Debug, Clone)]
pub struct LogBuffer {
	entries: Arc<Mutex<VecDeque<LogEntry>>>,
	capacity: usize,
}

impl LogBuffer {
	pub fn new(capacity: usize) -> Self {
		Self {
			entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(MAX_LOG_LINES)))),
			capacity,
		}
	}

	pub fn push(&self, entry: LogEntry) {
		let mut entries = self.entries.lock();
		entries.push_back(entry);
		while entries.len() > self.capacity {
			entries.pop_front();
		}
	}

	/// Returns the buffered entries, oldest first.
	pub fn snapshot(&self) -> Vec<LogEntry> {
		self.entries.lock().iter().cloned().collect()
	}
}

/// Tracing layer that captures events to a buffer for splash display.
pub struct SplashLogLayer {
	buffer: LogBuffer,
}

impl SplashLogLayer {
	/// Creates a layer writing to the given buffer.
	pub fn new(buffer: LogBuffer) -> Self {
		Self { buffer }
	}
}

impl<S> Layer<S> for SplashLogLayer
where
	S: Subscriber,
{
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let metadata = event.metadata();

		let mut message = String::new();
		let mut visitor = MessageVisitor(&mut message);
		event.record(&mut visitor);

		self.buffer.push(LogEntry {
			level: *metadata.level(),
			target: metadata.target().to_string(),
			message,
		});
	}
}

/// Extracts the `message` field from tracing events.
struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
	fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
		if field.name() == "message" {
			*self.0 = format!("{value:?}");
		}
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			*self.0 = value.to_string();
		}
	}
}

/// Summary of one splash run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplashReport {
	/// Time from start until readiness (or until the aggregator went away).
	pub waited: Duration,
	/// Frames drawn while loading.
	pub frames: u64,
}

/// Renders the splash to `out` until `signal` reports ready.
///
/// Draws nothing if the app is already ready on entry.
pub async fn run_splash<W: Write>(
	mut signal: ReadySignal,
	config: &SplashConfig,
	logs: &LogBuffer,
	out: &mut W,
) -> io::Result<SplashReport> {
	let started = Instant::now();
	if signal.get() {
		return Ok(SplashReport {
			waited: Duration::ZERO,
			frames: 0,
		});
	}

	let reveal_delay = Duration::from_millis(config.reveal_delay_ms);
	let mut typewriter = Typewriter::new(config.messages.clone(), config.hold_ticks());
	let mut ticker = tokio::time::interval(config.type_interval().max(Duration::from_millis(1)));
	ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
	let mut frames = 0u64;

	loop {
		tokio::select! {
			biased;
			ready = signal.wait_ready() => {
				if !ready {
					tracing::debug!("loading aggregator dropped before ready");
				}
				break;
			}
			_ = ticker.tick() => {
				typewriter.tick();
				if started.elapsed() < reveal_delay {
					continue;
				}
				if frames == 0 {
					queue!(out, Hide, SavePosition)?;
				}
				render_frame(out, &typewriter, logs)?;
				frames += 1;
			}
		}
	}

	let waited = started.elapsed();
	if frames > 0 {
		tokio::time::sleep(Duration::from_millis(config.exit_ms)).await;
		queue!(out, RestorePosition, Clear(ClearType::FromCursorDown), Show)?;
		out.flush()?;
	}

	Ok(SplashReport { waited, frames })
}

fn render_frame<W: Write>(out: &mut W, typewriter: &Typewriter, logs: &LogBuffer) -> io::Result<()> {
	queue!(
		out,
		RestorePosition,
		Clear(ClearType::FromCursorDown),
		Print("folio".with(Color::Cyan).bold()),
		Print(" is loading...\r\n\r\n"),
		Print("> ".with(Color::DarkGrey)),
		Print(typewriter.text()),
		Print("_".with(Color::Magenta)),
		Print("\r\n\r\n"),
	)?;

	let max_msg_len = LINE_WIDTH.saturating_sub(20);
	for entry in logs.snapshot() {
		let level_color = match entry.level {
			Level::ERROR => Color::Red,
			Level::WARN => Color::Yellow,
			Level::INFO => Color::Green,
			Level::DEBUG => Color::Blue,
			Level::TRACE => Color::DarkGrey,
		};
		let short_target = entry.target.rsplit("::").next().unwrap_or(&entry.target);
		queue!(
			out,
			Print(format!("{:5}", entry.level).with(level_color)),
			Print(" "),
			Print(format!("{:12}", truncate_str(short_target, 12)).with(Color::DarkGrey)),
			Print(" "),
			Print(truncate_str(&entry.message, max_msg_len)),
			Print("\r\n"),
		)?;
	}

	out.flush()
}

/// Truncates with ellipsis if `s` exceeds `max_len` characters.
fn truncate_str(s: &str, max_len: usize) -> String {
	if s.chars().count() <= max_len {
		s.to_string()
	} else if max_len > 3 {
		let head: String = s.chars().take(max_len - 3).collect();
		format!("{head}...")
	} else {
		s.chars().take(max_len).collect()
	}
}
