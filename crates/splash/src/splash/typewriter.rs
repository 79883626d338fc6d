/// Types status messages one character per tick, holds each finished line,
/// then clears it and moves on to the next, cycling.
#[derive(Debug, Clone)]
pub struct Typewriter {
	messages: Vec<String>,
	index: usize,
	/// Characters of the current message revealed so far.
	shown: usize,
	/// Ticks left before the finished line clears.
	holding: Option<u32>,
	hold_ticks: u32,
}

impl Typewriter {
	pub fn new(messages: Vec<String>, hold_ticks: u32) -> Self {
		Self {
			messages,
			index: 0,
			shown: 0,
			holding: None,
			hold_ticks,
		}
	}

	/// Advances by one tick.
	pub fn tick(&mut self) {
		let Some(message) = self.messages.get(self.index) else {
			return;
		};

		match self.holding {
			Some(0) => {
				self.holding = None;
				self.shown = 0;
				self.index = (self.index + 1) % self.messages.len();
			}
			Some(left) => self.holding = Some(left - 1),
			None => {
				self.shown += 1;
				if self.shown >= message.chars().count() {
					self.holding = Some(self.hold_ticks);
				}
			}
		}
	}

	/// Returns the revealed part of the current message.
	pub fn text(&self) -> &str {
		let Some(message) = self.messages.get(self.index) else {
			return "";
		};
		match message.char_indices().nth(self.shown) {
			Some((end, _)) => &message[..end],
			None => message,
		}
	}

	pub fn message_index(&self) -> usize {
		self.index
	}
}
