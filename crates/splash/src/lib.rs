//! Terminal splash frontend for the folio loading aggregator.
//!
//! Wires simulated asset producers and a splash view around one
//! [`folio_loading::LoadingAggregator`]: producers register work, the splash
//! renders until the aggregator reports ready.

pub mod cli;
pub mod config;
pub mod logging;
pub mod producer;
pub mod splash;
