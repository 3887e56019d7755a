use super::route::{EntryKind, FlowId, NextHop, RouteEntry};
use super::topology::Coord;
use std::collections::BTreeMap;

type EntryKey = (FlowId, Option<Coord>, Coord);
type HopKey = (Coord, Option<FlowId>, Vec<u32>);

#[derive(Debug)]
enum Slot {
    Bridge(Vec<u32>),
    Switch(BTreeMap<HopKey, f64>),
}

/// Merging accumulator for the route entries of one `(source, destination)`
/// pair, keyed by `(flow, previous hop, current hop)`.
///
/// The two-phase algorithms insert one route per stopover choice; routes
/// sharing a transitional hop land on the same key. Bridge entries must be
/// identical on re-insertion (anything else is a construction defect);
/// switch entries accumulate next-hop weight per `(node, rewrite flow, vcs)`
/// branch. Iteration order is sorted, so the resulting table is
/// deterministic regardless of insertion order.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: BTreeMap<EntryKey, Slot>,
}

impl RouteTable {
    pub fn add_route(&mut self, route: &[RouteEntry]) {
        for entry in route {
            self.add_entry(entry);
        }
    }

    pub fn add_entry(&mut self, entry: &RouteEntry) {
        let key = (entry.flow, entry.prev, entry.cur);
        match &entry.kind {
            EntryKind::Bridge { vcs } => match self.entries.get(&key) {
                None => {
                    self.entries.insert(key, Slot::Bridge(vcs.clone()));
                }
                Some(Slot::Bridge(existing)) => {
                    assert_eq!(existing, vcs, "mismatched bridge entries for {key:?}");
                }
                Some(Slot::Switch(_)) => {
                    panic!("bridge entry collides with switch entry for {key:?}");
                }
            },
            EntryKind::Switch { next_hops } => {
                let slot = self
                    .entries
                    .entry(key)
                    .or_insert_with(|| Slot::Switch(BTreeMap::new()));
                let Slot::Switch(branches) = slot else {
                    panic!("switch entry collides with bridge entry for {key:?}");
                };
                for hop in next_hops {
                    *branches
                        .entry((hop.node, hop.rewrite_flow, hop.vcs.clone()))
                        .or_insert(0.0) += hop.weight;
                }
            }
        }
    }

    /// Finalizes the table: entries sorted by key, each switch entry's
    /// branch weights normalized to sum to 1.0.
    #[must_use]
    pub fn into_entries(self) -> Vec<RouteEntry> {
        self.entries
            .into_iter()
            .map(|((flow, prev, cur), slot)| {
                let kind = match slot {
                    Slot::Bridge(vcs) => EntryKind::Bridge { vcs },
                    Slot::Switch(branches) => {
                        let total: f64 = branches.values().sum();
                        EntryKind::Switch {
                            next_hops: branches
                                .into_iter()
                                .map(|((node, rewrite_flow, vcs), weight)| NextHop {
                                    node,
                                    weight: weight / total,
                                    rewrite_flow,
                                    vcs,
                                })
                                .collect(),
                        }
                    }
                };
                RouteEntry {
                    flow,
                    prev,
                    cur,
                    kind,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::route::{EntryKind, NextHop, RouteEntry};
    use super::super::topology::Coord;
    use super::RouteTable;
    use similar_asserts as diff;

    fn switch(flow: u64, prev: (u32, u32), cur: (u32, u32), hops: Vec<NextHop>) -> RouteEntry {
        RouteEntry {
            flow,
            prev: Some(prev.into()),
            cur: cur.into(),
            kind: EntryKind::Switch { next_hops: hops },
        }
    }

    fn hop(node: (u32, u32), weight: f64, vcs: Vec<u32>) -> NextHop {
        NextHop {
            node: node.into(),
            weight,
            rewrite_flow: None,
            vcs,
        }
    }

    #[test]
    fn test_switch_weights_merge_and_normalize() {
        let mut table = RouteTable::default();
        table.add_entry(&switch(1, (0, 0), (1, 0), vec![hop((2, 0), 1.0, vec![16])]));
        table.add_entry(&switch(1, (0, 0), (1, 0), vec![hop((2, 0), 1.0, vec![16])]));
        table.add_entry(&switch(1, (0, 0), (1, 0), vec![hop((1, 1), 2.0, vec![24])]));
        let entries = table.into_entries();
        diff::assert_eq!(have: entries.len(), want: 1);
        let EntryKind::Switch { next_hops } = &entries[0].kind else {
            panic!("expected switch entry");
        };
        diff::assert_eq!(have: next_hops.len(), want: 2);
        // branches sorted by node; weights 2/4 each
        diff::assert_eq!(have: next_hops[0].node, want: Coord::new(1, 1));
        assert!((next_hops[0].weight - 0.5).abs() < 1e-12);
        assert!((next_hops[1].weight - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_identical_bridges_merge() {
        let bridge = RouteEntry {
            flow: 1,
            prev: None,
            cur: Coord::new(0, 0),
            kind: EntryKind::Bridge { vcs: vec![0, 1] },
        };
        let mut table = RouteTable::default();
        table.add_entry(&bridge);
        table.add_entry(&bridge);
        diff::assert_eq!(have: table.into_entries(), want: vec![bridge]);
    }

    #[test]
    #[should_panic(expected = "mismatched bridge entries")]
    fn test_mismatched_bridges_panic() {
        let mut table = RouteTable::default();
        table.add_entry(&RouteEntry {
            flow: 1,
            prev: None,
            cur: Coord::new(0, 0),
            kind: EntryKind::Bridge { vcs: vec![0, 1] },
        });
        table.add_entry(&RouteEntry {
            flow: 1,
            prev: None,
            cur: Coord::new(0, 0),
            kind: EntryKind::Bridge { vcs: vec![2, 3] },
        });
    }

    #[test]
    fn test_entries_sorted_by_key() {
        let mut table = RouteTable::default();
        table.add_entry(&switch(2, (0, 0), (1, 0), vec![hop((2, 0), 1.0, vec![16])]));
        table.add_entry(&switch(1, (1, 0), (2, 0), vec![hop((3, 0), 1.0, vec![16])]));
        table.add_entry(&switch(1, (0, 0), (1, 0), vec![hop((2, 0), 1.0, vec![16])]));
        let flows: Vec<_> = table
            .into_entries()
            .iter()
            .map(|entry| (entry.flow, entry.prev))
            .collect();
        diff::assert_eq!(
            have: flows,
            want: vec![
                (1, Some(Coord::new(0, 0))),
                (1, Some(Coord::new(1, 0))),
                (2, Some(Coord::new(0, 0))),
            ]
        );
    }
}
