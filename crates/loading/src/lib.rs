//! Loading-state aggregator for the folio splash screen.
//!
//! # Purpose
//!
//! - Track independent asynchronous loads (asset fetches, the minimum splash
//!   duration) and derive one readiness boolean for the presentation layer.
//! - Exclude rendering; the splash screen only reads [`ReadySignal`].
//!
//! # Mental model
//!
//! - Producers mark work outstanding with [`LoadingAggregator::register`] and
//!   clear it with [`LoadingAggregator::deregister`], or hold a
//!   [`LoadingGuard`] that clears on drop.
//! - The outstanding set starts with a reserved sentinel that a floor timer
//!   removes after [`LoadingConfig::initial_floor`]. Producers cannot touch the
//!   sentinel.
//! - When the set empties, a settle timer runs for
//!   [`LoadingConfig::settle_delay`] before readiness flips true. Any
//!   registration in the meantime cancels it.
//! - Readiness flips back to false immediately when new work registers after
//!   the app became ready.
//!
//! # Key types
//!
//! | Type | Meaning | Constraints | Constructed / mutated in |
//! |---|---|---|---|
//! | [`LoadingAggregator`] | Cloneable handle to the shared registry | MUST be the only writer of the outstanding set | `LoadingAggregator::new`, `register`, `deregister` |
//! | [`ReadySignal`] | Subscribable readiness value | MUST agree with the registry phase after each operation | `LoadingAggregator::subscribe` |
//! | [`LoadingGuard`] | Scoped task registration | MUST deregister on every exit path | `LoadingAggregator::track` |
//! | [`Phase`] | `Loading`, `Settling`, or `Ready` | Ready iff nothing outstanding and settle elapsed | `state::Registry` |
//! | [`TaskId`] | Opaque task identifier | Set semantics, equality by string | `TaskId::new` |
//!
//! # Invariants
//!
//! 1. Registering an already outstanding id MUST NOT add a second completion requirement.
//!    - Enforced in: `Registry::register`
//!    - Tested by: `state::tests::duplicate_register_is_idempotent`
//! 2. A settle timer MUST complete only if no registration happened since it was armed.
//!    - Enforced in: `Registry::complete_settle` (generation check), `Inner::insert` (abort)
//!    - Tested by: `aggregator::tests::register_during_settle_restarts_clock`
//! 3. The floor MUST NOT be shortened by producers.
//!    - Enforced in: `LoadingAggregator::deregister` (sentinel filter)
//!    - Tested by: `scenarios::early_sentinel_deregister_does_not_shorten_floor`
//! 4. Readiness MUST be published under the state lock.
//!    - Enforced in: `Inner::publish` call sites
//!
//! # Failure modes
//!
//! A producer that registers and never deregisters stalls the aggregator in
//! [`Phase::Loading`]. Prefer [`LoadingAggregator::track`]; set
//! [`LoadingConfig::task_timeout`] to force completion of stuck tasks.

mod aggregator;
mod config;
mod error;
mod guard;
mod signal;
mod spawn;
mod state;
mod task;

pub use aggregator::LoadingAggregator;
pub use config::{DEFAULT_INITIAL_FLOOR, DEFAULT_SENTINEL_ID, DEFAULT_SETTLE_DELAY, LoadingConfig};
pub use error::{LoadingError, Result};
pub use guard::LoadingGuard;
pub use signal::ReadySignal;
pub use state::Phase;
pub use task::TaskId;
