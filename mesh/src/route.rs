use super::table::RouteTable;
use super::topology::{Coord, Dim, Direction, NodeId};
use super::vc::VcTable;
use super::Error;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Simulator-level tag identifying one logical packet stream.
///
/// Encodes `(source, destination)` as `((src << 8) | dst) << 8`; the
/// two-phase algorithms use `flow + 1` for the post-stopover phase, the
/// shared-memory profile sets a per-VC-set prefix in bits 24 and up.
pub type FlowId = u64;

#[must_use]
pub fn flow_id(src: NodeId, dst: NodeId) -> FlowId {
    ((u64::from(src) << 8) | u64::from(dst)) << 8
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum Algorithm {
    Xy,
    Yx,
    O1Turn,
    Romm2,
    Valiant,
}

impl Algorithm {
    /// Hex digits used to render flow ids of this algorithm family.
    #[must_use]
    pub fn flow_hex_digits(&self) -> usize {
        match self {
            Algorithm::Xy | Algorithm::Yx | Algorithm::O1Turn => 6,
            Algorithm::Romm2 | Algorithm::Valiant => 8,
        }
    }

    #[must_use]
    pub fn is_two_phase(&self) -> bool {
        matches!(self, Algorithm::Romm2 | Algorithm::Valiant)
    }
}

/// Dimension ordering of a single route phase.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum DimOrder {
    Xy,
    Yx,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NextHop {
    pub node: Coord,
    pub weight: f64,
    /// Flow the packet is re-tagged with when it takes this hop
    /// (the phase switch of the two-phase algorithms).
    pub rewrite_flow: Option<FlowId>,
    pub vcs: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    /// Injection point: programs the bridge VC allocator.
    Bridge { vcs: Vec<u32> },
    /// Per-node switch entry with one or more next-hop branches.
    Switch { next_hops: Vec<NextHop> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    pub flow: FlowId,
    pub prev: Option<Coord>,
    pub cur: Coord,
    pub kind: EntryKind,
}

/// Inclusive walk from `from` to `to`, one unit at a time.
fn axis_range(from: u32, to: u32) -> Vec<u32> {
    if from <= to {
        (from..=to).collect()
    } else {
        (to..=from).rev().collect()
    }
}

/// The single dimension-ordered path `src -> dst`, both endpoints included.
fn dor_coords(order: DimOrder, src: Coord, dst: Coord) -> Vec<Coord> {
    match order {
        DimOrder::Xy => {
            let mut coords: Vec<Coord> = axis_range(src.x, dst.x)
                .into_iter()
                .map(|x| Coord::new(x, src.y))
                .collect();
            coords.extend(
                axis_range(src.y, dst.y)
                    .into_iter()
                    .skip(1)
                    .map(|y| Coord::new(dst.x, y)),
            );
            coords
        }
        DimOrder::Yx => {
            let mut coords: Vec<Coord> = axis_range(src.y, dst.y)
                .into_iter()
                .map(|y| Coord::new(src.x, y))
                .collect();
            coords.extend(
                axis_range(src.x, dst.x)
                    .into_iter()
                    .skip(1)
                    .map(|x| Coord::new(x, dst.y)),
            );
            coords
        }
    }
}

/// All coordinates of the axis-aligned bounding box spanned by `a` and `b`,
/// walked from `a` towards `b` (x-major).
fn box_coords(a: Coord, b: Coord) -> Vec<Coord> {
    axis_range(a.x, b.x)
        .into_iter()
        .flat_map(|x| {
            axis_range(a.y, b.y)
                .into_iter()
                .map(move |y| Coord::new(x, y))
        })
        .collect()
}

/// Expands a hop coordinate sequence into route entries: one bridge entry
/// at the first coordinate, one switch entry per hop, and an ejection
/// entry (a hop onto the local CPU port) at the last coordinate.
///
/// `link_set` selects the VC set for the link hops (`None` = all VCs);
/// `endpoint_set` does the same for the injection/ejection ports (only the
/// shared-memory profile partitions those).
fn full_route(
    flow: FlowId,
    coords: &[Coord],
    link_set: Option<usize>,
    endpoint_set: Option<usize>,
    vcs: &VcTable,
) -> Result<Vec<RouteEntry>, Error> {
    assert!(coords.len() > 1, "route needs at least one hop");
    let mut entries = vec![RouteEntry {
        flow,
        prev: None,
        cur: coords[0],
        kind: EntryKind::Bridge {
            vcs: vcs.vcs(Direction::FromCpu, endpoint_set)?,
        },
    }];
    let mut padded = Vec::with_capacity(coords.len() + 2);
    padded.push(coords[0]);
    padded.extend_from_slice(coords);
    padded.push(coords[coords.len() - 1]);
    for window in padded.windows(3) {
        let (prev, cur, next) = (window[0], window[1], window[2]);
        let direction = Direction::between(cur, next);
        let set = if direction == Direction::ToCpu {
            endpoint_set
        } else {
            link_set
        };
        entries.push(RouteEntry {
            flow,
            prev: Some(prev),
            cur,
            kind: EntryKind::Switch {
                next_hops: vec![NextHop {
                    node: next,
                    weight: 1.0,
                    rewrite_flow: None,
                    vcs: vcs.vcs(direction, set)?,
                }],
            },
        });
    }
    Ok(entries)
}

/// Single-path dimension-ordered route (XY or YX).
pub fn dor_route(
    order: DimOrder,
    flow: FlowId,
    src: Coord,
    dst: Coord,
    link_set: Option<usize>,
    endpoint_set: Option<usize>,
    vcs: &VcTable,
) -> Result<Vec<RouteEntry>, Error> {
    if src == dst {
        return Err(Error::SelfRoute { node: src });
    }
    full_route(flow, &dor_coords(order, src, dst), link_set, endpoint_set, vcs)
}

/// O1-turn route: the XY path on VC set 0 spliced with the YX path on VC
/// set 1 at the shared first hop, leaving the turn choice to the router.
///
/// When the two paths coincide (pure row or column move) a single path
/// using all VCs is produced instead.
pub fn o1turn_route(
    flow: FlowId,
    src: Coord,
    dst: Coord,
    vcs: &VcTable,
) -> Result<Vec<RouteEntry>, Error> {
    if vcs.num_vcs() < 2 {
        return Err(Error::NotEnoughChannels {
            algorithm: Algorithm::O1Turn,
            num_vcs: vcs.num_vcs(),
        });
    }
    if src == dst {
        return Err(Error::SelfRoute { node: src });
    }
    let coords_xy = dor_coords(DimOrder::Xy, src, dst);
    let coords_yx = dor_coords(DimOrder::Yx, src, dst);
    if coords_xy == coords_yx {
        return full_route(flow, &coords_xy, None, None, vcs);
    }
    let xys = full_route(flow, &coords_xy, Some(0), None, vcs)?;
    let yxs = full_route(flow, &coords_yx, Some(1), None, vcs)?;
    // Both candidate paths leave the source through the same bridge; the
    // actual turn choice happens at the first switch entry.
    assert_eq!(xys[0], yxs[0], "o1turn bridge entries must be identical");
    let (first_xy, first_yx) = (&xys[1], &yxs[1]);
    assert_eq!(
        (first_xy.flow, first_xy.prev, first_xy.cur),
        (first_yx.flow, first_yx.prev, first_yx.cur),
        "o1turn first hops must share the same switch"
    );
    let (EntryKind::Switch { next_hops: hops_xy }, EntryKind::Switch { next_hops: hops_yx }) =
        (&first_xy.kind, &first_yx.kind)
    else {
        unreachable!("first hop entries are switch entries");
    };
    let merged = RouteEntry {
        flow,
        prev: first_xy.prev,
        cur: first_xy.cur,
        kind: EntryKind::Switch {
            next_hops: [hops_xy.clone(), hops_yx.clone()].concat(),
        },
    };
    let mut entries = vec![xys[0].clone(), merged];
    entries.extend_from_slice(&xys[2..]);
    entries.extend_from_slice(&yxs[2..]);
    Ok(entries)
}

/// Rewrites the entry `after` (programmed at the splice node) so that
/// packets still tagged with the phase-1 flow of `before` are re-tagged
/// with `flow2` and continue on VC set 1.
fn splice(
    before: &RouteEntry,
    after: &RouteEntry,
    flow2: FlowId,
    vcs: &VcTable,
) -> Result<RouteEntry, Error> {
    // Both halves must describe the same physical node; a mismatch is a
    // construction defect, not a recoverable condition.
    match &before.kind {
        EntryKind::Bridge { .. } => {
            assert_eq!(before.cur, after.cur, "splice boundary mismatch");
        }
        EntryKind::Switch { next_hops } => {
            for hop in next_hops {
                assert_eq!(hop.node, after.cur, "splice boundary mismatch");
            }
        }
    }
    let EntryKind::Switch { next_hops } = &after.kind else {
        unreachable!("splice target is a switch entry");
    };
    let next_hops = next_hops
        .iter()
        .map(|hop| {
            let direction = Direction::between(after.cur, hop.node);
            let set = if direction == Direction::ToCpu {
                None
            } else {
                Some(1)
            };
            Ok(NextHop {
                node: hop.node,
                weight: hop.weight,
                rewrite_flow: Some(flow2),
                vcs: vcs.vcs(direction, set)?,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(RouteEntry {
        flow: before.flow,
        prev: Some(before.cur),
        cur: after.cur,
        kind: EntryKind::Switch { next_hops },
    })
}

/// One two-phase route through `stopover`: phase 1 (`flow`, VC set 0) from
/// the source to the stopover, phase 2 (`flow + 1`, VC set 1) from the
/// stopover to the destination, joined by a flow-rewriting splice entry.
///
/// A stopover equal to the source or the destination degenerates to a
/// single splice at that endpoint instead of two full phases.
pub fn two_phase_route(
    order: DimOrder,
    flow: FlowId,
    src: Coord,
    dst: Coord,
    stopover: Coord,
    vcs: &VcTable,
) -> Result<Vec<RouteEntry>, Error> {
    if src == dst {
        return Err(Error::SelfRoute { node: src });
    }
    let flow2 = flow + 1;
    if stopover == src {
        let phase1 = dor_route(order, flow, src, dst, Some(0), None, vcs)?;
        let glue = splice(&phase1[0], &phase1[1], flow2, vcs)?;
        let phase2 = dor_route(order, flow2, src, dst, Some(1), None, vcs)?;
        Ok([&phase1[..1], &[glue][..], &phase2[2..]].concat())
    } else if stopover == dst {
        let phase1 = dor_route(order, flow, src, dst, Some(0), None, vcs)?;
        let phase2 = dor_route(order, flow2, src, dst, Some(1), None, vcs)?;
        let glue = splice(&phase1[phase1.len() - 2], &phase2[phase2.len() - 1], flow2, vcs)?;
        Ok([&phase1[..phase1.len() - 1], &[glue][..]].concat())
    } else {
        let phase1 = dor_route(order, flow, src, stopover, Some(0), None, vcs)?;
        let phase2 = dor_route(order, flow2, stopover, dst, Some(1), None, vcs)?;
        let glue = splice(&phase1[phase1.len() - 2], &phase2[1], flow2, vcs)?;
        Ok([&phase1[..phase1.len() - 1], &[glue][..], &phase2[2..]].concat())
    }
}

/// Stopover selection of the two-phase algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopoverMode {
    /// Enumerate every candidate stopover; the resulting table is the
    /// union over the whole stopover distribution.
    Exhaustive,
    /// Draw `count` stopovers (with replacement) from the candidate set.
    Sample { count: usize },
}

/// Seed of the original generator.
pub const DEFAULT_SEED: u64 = 7;

/// Builds the per-pair route table for one routing algorithm.
#[derive(Debug)]
pub struct RouteBuilder<'a> {
    dims: Dim,
    vcs: &'a VcTable,
    algorithm: Algorithm,
    ordering: DimOrder,
    stopovers: StopoverMode,
    rng: StdRng,
}

impl<'a> RouteBuilder<'a> {
    #[must_use]
    pub fn new(dims: Dim, vcs: &'a VcTable, algorithm: Algorithm) -> Self {
        Self {
            dims,
            vcs,
            algorithm,
            ordering: DimOrder::Xy,
            stopovers: StopoverMode::Exhaustive,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
        }
    }

    /// Phase-1 dimension ordering of the two-phase algorithms.
    #[must_use]
    pub fn with_ordering(mut self, ordering: DimOrder) -> Self {
        self.ordering = ordering;
        self
    }

    #[must_use]
    pub fn with_stopovers(mut self, stopovers: StopoverMode, seed: u64) -> Self {
        self.stopovers = stopovers;
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Route entries for one ordered node pair.
    pub fn entries(&mut self, src: NodeId, dst: NodeId) -> Result<Vec<RouteEntry>, Error> {
        let src_coord = self.dims.coord_of(src);
        let dst_coord = self.dims.coord_of(dst);
        if src == dst {
            return Err(Error::SelfRoute { node: src_coord });
        }
        let flow = flow_id(src, dst);
        match self.algorithm {
            Algorithm::Xy => dor_route(DimOrder::Xy, flow, src_coord, dst_coord, None, None, self.vcs),
            Algorithm::Yx => dor_route(DimOrder::Yx, flow, src_coord, dst_coord, None, None, self.vcs),
            Algorithm::O1Turn => o1turn_route(flow, src_coord, dst_coord, self.vcs),
            Algorithm::Romm2 | Algorithm::Valiant => {
                if self.vcs.num_vcs() < 2 {
                    return Err(Error::NotEnoughChannels {
                        algorithm: self.algorithm,
                        num_vcs: self.vcs.num_vcs(),
                    });
                }
                let pool = if self.algorithm == Algorithm::Romm2 {
                    box_coords(src_coord, dst_coord)
                } else {
                    box_coords(
                        Coord::new(0, 0),
                        Coord::new(self.dims.width - 1, self.dims.height - 1),
                    )
                };
                let chosen: Vec<Coord> = match self.stopovers {
                    StopoverMode::Exhaustive => pool,
                    StopoverMode::Sample { count } => (0..count)
                        .map(|_| pool[self.rng.gen_range(0..pool.len())])
                        .collect(),
                };
                let mut table = RouteTable::default();
                for stopover in chosen {
                    let route =
                        two_phase_route(self.ordering, flow, src_coord, dst_coord, stopover, self.vcs)?;
                    table.add_route(&route);
                }
                Ok(table.into_entries())
            }
        }
    }
}
