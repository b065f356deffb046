//! Core library for the BNPL decision service.
//!
//! The `decisions` module holds the pure scoring pipeline (window filter,
//! risk factor computation, score aggregation, credit limit mapping, and
//! repayment plan construction) together with the orchestration service and
//! the trait seams it consumes: a transaction source, a decision repository,
//! and an outbound webhook queue. Everything that talks to the outside world
//! lives behind those traits so the pipeline stays deterministic and
//! independently testable.

pub mod config;
pub mod decisions;
pub mod error;
pub mod telemetry;
