use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Opaque identifier for one unit of outstanding loading work.
///
/// Equality is plain string equality; two producers using the same id share
/// one outstanding slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(Arc<str>);

impl TaskId {
	pub fn new(id: impl AsRef<str>) -> Self {
		Self(Arc::from(id.as_ref()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TaskId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for TaskId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for TaskId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl From<&str> for TaskId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for TaskId {
	fn from(id: String) -> Self {
		Self(Arc::from(id))
	}
}

impl From<&String> for TaskId {
	fn from(id: &String) -> Self {
		Self::new(id)
	}
}

impl From<&TaskId> for TaskId {
	fn from(id: &TaskId) -> Self {
		id.clone()
	}
}
