//! Trace tooling for the interconnect simulator: text to binary memory
//! trace packing, synthetic traffic event generation, and synthetic
//! memory-access trace generation.

pub mod binify;
pub mod memtrace;
pub mod synthetic;

pub use binify::{binify, RECORD_SIZE};
pub use memtrace::MemtraceConfig;
pub use synthetic::{write_events, Pattern};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: cannot parse {value:?}")]
    Parse { line: usize, value: String },

    #[error("mesh {dims} is not power-of-two in both dimensions")]
    NotPowerOfTwo { dims: mesh::Dim },

    #[error("{name} of {value}% is out of range (0 to {max})")]
    Percentage {
        name: &'static str,
        value: u32,
        max: u32,
    },

    #[error("memory instruction ratio must be positive")]
    ZeroMemRatio,

    #[error("{num_threads} threads cannot share data (need at least 2)")]
    TooFewThreads { num_threads: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
