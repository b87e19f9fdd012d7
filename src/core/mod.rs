//! Core business logic - framework-agnostic and fully testable without the
//! chat transport. The ledger and category modules own the durable store, the
//! statistics module is a pure aggregation engine, the period module computes
//! reporting windows, and the tracker stitches store + cache together behind
//! one injected handle.

/// Category upserts, listing, safe deletion, and default seeding
pub mod category;
/// Durable-store operations on users and transactions
pub mod ledger;
/// Reporting-window calculation (monthly/quarterly with start-day offset)
pub mod period;
/// Presentation formatting for the transport layer
pub mod report;
/// Pure aggregation over transaction sets
pub mod statistics;
/// The injected store + cache pair serving all requests
pub mod tracker;

pub use tracker::{FinanceTracker, PeriodReport};
