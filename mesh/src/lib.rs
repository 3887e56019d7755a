//! Static route-table generation for a 2D mesh on-chip network.
//!
//! For every ordered `(source, destination)` node pair the route builder
//! produces the ordered list of route-table entries (one injection
//! "bridge" entry plus one entry per hop) for a fixed routing algorithm,
//! and the serializer renders them into the line-oriented configuration
//! text the external simulator consumes.

pub mod generate;
pub mod route;
pub mod serialize;
pub mod table;
pub mod topology;
pub mod vc;

pub use generate::{RoutesConfig, ShmemConfig};
pub use route::{Algorithm, DimOrder, EntryKind, FlowId, NextHop, RouteBuilder, RouteEntry, StopoverMode};
pub use table::RouteTable;
pub use topology::{Coord, Dim, Direction, NodeId};
pub use vc::VcTable;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unsupported virtual channel count {num_vcs} (supported: 1, 2, 4, 8)")]
    UnsupportedChannelCount { num_vcs: u32 },

    #[error("{total} virtual channels per link (must be between 1 and 31)")]
    TooManyChannels { total: u32 },

    #[error("vc set {set} out of range (direction has {num_sets} sets)")]
    VcSetOutOfRange { set: usize, num_sets: usize },

    #[error("{algorithm} routing requires at least 2 virtual channels, got {num_vcs}")]
    NotEnoughChannels {
        algorithm: route::Algorithm,
        num_vcs: u32,
    },

    #[error("source and destination are the same node {node}")]
    SelfRoute { node: topology::Coord },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
