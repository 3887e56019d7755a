//! Extracts one summary row from a shared-memory simulation log.
//!
//! The simulator dumps its counters as labeled `[Summary: ...]`,
//! `[Latency Breakdown ...]`, `[Coherence Messages ...]` and
//! `[State Transitions ...]` lines. This crate picks the values out of
//! those lines and renders them as a single space-separated row, so runs
//! can be collected into a table with a shell loop. Counters whose line
//! never appears stay `n/a`.

mod parse;
mod row;

pub use parse::parse_log;
pub use row::{
    CacheSummary, CoherenceTraffic, LatencyBreakdown, Row, StateTransitions, ThreadSummary,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cannot parse {value:?} as a number")]
    Parse { value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
