use super::route::{EntryKind, RouteEntry};
use super::topology::{Dim, Direction};
use super::vc::VcTable;
use super::Error;
use serde::{Deserialize, Serialize};

/// Renders `weight` the way the simulator's parser expects: shortest
/// decimal form with 6 significant digits (`1`, `0.5`, `0.166667`).
#[must_use]
pub fn fmt_weight(weight: f64) -> String {
    if weight <= 0.0 {
        return "0".to_string();
    }
    let exp = weight.abs().log10().floor() as i32;
    let precision = (5 - exp).max(0) as usize;
    let mut repr = format!("{weight:.precision$}");
    if repr.contains('.') {
        while repr.ends_with('0') {
            repr.pop();
        }
        if repr.ends_with('.') {
            repr.pop();
        }
    }
    repr
}

fn join_vcs(vcs: &[u32]) -> String {
    vcs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn space_vcs(vcs: &[u32]) -> String {
    vcs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// One route-table line.
///
/// Bridge: `0x<flow>@->0x<node> = <vc,vc,...>`
/// Switch: `0x<flow>@0x<prev>->0x<cur> = 0x<next>[>0x<rewrite>]@<w>:<vc,...> ...`
#[must_use]
pub fn entry_line(dims: Dim, entry: &RouteEntry, flow_digits: usize) -> String {
    match &entry.kind {
        EntryKind::Bridge { vcs } => format!(
            "0x{flow:0width$x}@->0x{node:02x} = {vcs}",
            flow = entry.flow,
            width = flow_digits,
            node = dims.id_of(entry.cur),
            vcs = join_vcs(vcs),
        ),
        EntryKind::Switch { next_hops } => {
            let branches = next_hops
                .iter()
                .map(|hop| {
                    let rewrite = match hop.rewrite_flow {
                        Some(flow) => format!(">0x{flow:08x}"),
                        None => String::new(),
                    };
                    format!(
                        "0x{node:02x}{rewrite}@{weight}:{vcs}",
                        node = dims.id_of(hop.node),
                        weight = fmt_weight(hop.weight),
                        vcs = join_vcs(&hop.vcs),
                    )
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!(
                "0x{flow:0width$x}@0x{prev:02x}->0x{cur:02x} = {branches}",
                flow = entry.flow,
                width = flow_digits,
                prev = dims.id_of(entry.prev.expect("switch entry has a previous hop")),
                cur = dims.id_of(entry.cur),
            )
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
pub enum CoreKind {
    #[strum(serialize = "injector")]
    Injector,
    #[strum(serialize = "memtraceCore")]
    MemtraceCore,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
pub enum MemoryKind {
    #[strum(serialize = "privateSharedMSI")]
    PrivateSharedMsi,
}

impl MemoryKind {
    /// Architecture name used inside the generated config.
    #[must_use]
    pub fn architecture(&self) -> &'static str {
        match self {
            MemoryKind::PrivateSharedMsi => "private-shared MSI",
        }
    }
}

/// Per-flow queueing flags of the `[routing]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowQueueFlags {
    pub one_queue_per_flow: bool,
    pub one_flow_per_queue: bool,
}

/// Configuration preamble written ahead of the `[flows]` section.
#[derive(Debug, Clone)]
pub struct Preamble<'a> {
    pub dims: Dim,
    pub vcs: &'a VcTable,
    pub queue_size: u32,
    pub cpu_bandwidth: u32,
    pub link_bandwidth: u32,
    /// Crossbar mux fan-in; rendered as a `/N` suffix on the muxed ports.
    pub mux: Option<u32>,
    pub bytes_per_flit: Option<u32>,
    pub flow_queue_flags: Option<FlowQueueFlags>,
    pub core: CoreKind,
    pub memory: Option<MemoryKind>,
}

impl Preamble<'_> {
    pub fn write(&self, out: &mut impl std::io::Write) -> Result<(), Error> {
        let mux = match self.mux {
            Some(mux) => format!("/{mux}"),
            None => String::new(),
        };
        writeln!(out, "[geometry]")?;
        writeln!(out, "height = {}", self.dims.height)?;
        writeln!(out, "width = {}", self.dims.width)?;
        writeln!(out)?;
        writeln!(out, "[routing]")?;
        writeln!(out, "node = weighted")?;
        writeln!(out, "queue = set")?;
        if let Some(flags) = self.flow_queue_flags {
            writeln!(out, "one queue per flow = {}", flags.one_queue_per_flow)?;
            writeln!(out, "one flow per queue = {}", flags.one_flow_per_queue)?;
        }
        writeln!(out)?;
        writeln!(out, "[node]")?;
        writeln!(out, "queue size = {}", self.queue_size)?;
        writeln!(out)?;
        writeln!(out, "[bandwidth]")?;
        writeln!(out, "cpu = {}{mux}", self.cpu_bandwidth)?;
        writeln!(out, "net = {}", self.cpu_bandwidth)?;
        for port in ["north", "east", "south", "west"] {
            writeln!(out, "{port} = {}{mux}", self.link_bandwidth)?;
        }
        if let Some(bytes) = self.bytes_per_flit {
            writeln!(out, "bytes per flit = {bytes}")?;
        }
        writeln!(out)?;
        writeln!(out, "[queues]")?;
        writeln!(out, "cpu = {}", space_vcs(&self.vcs.from_cpu()))?;
        writeln!(out, "net = {}", space_vcs(&self.vcs.to_cpu()))?;
        for (port, direction) in [
            ("north", Direction::YPlus),
            ("east", Direction::XMinus),
            ("south", Direction::YMinus),
            ("west", Direction::XPlus),
        ] {
            writeln!(out, "{port} = {}", space_vcs(&self.vcs.vcs(direction, None)?))?;
        }
        writeln!(out)?;
        writeln!(out, "[core]")?;
        writeln!(out, "default = {}", self.core)?;
        if self.core == CoreKind::MemtraceCore {
            writeln!(out)?;
            writeln!(out, "[core::memtraceCore]")?;
            writeln!(out, "execution migration mode = never")?;
            writeln!(out, "message queue size = 4")?;
            writeln!(out, "migration context size in bytes = 128")?;
            writeln!(out, "maximum active threads per core = 2")?;
        }
        if let Some(memory) = self.memory {
            writeln!(out)?;
            writeln!(out, "[memory]")?;
            writeln!(out, "architecture = {}", memory.architecture())?;
            writeln!(out, "dram controller location = top and bottom")?;
            writeln!(out, "core address translation = stripe")?;
            writeln!(out, "core address translation latency = 1")?;
            writeln!(out, "core address translation allocation unit in bytes = 4096")?;
            writeln!(out, "core address synch delay = 0")?;
            writeln!(out, "dram controller latency = 2")?;
            writeln!(out, "one-way offchip latency = 150")?;
            writeln!(out, "dram latency = 50")?;
            writeln!(out, "dram message header size in words = 4")?;
            writeln!(out, "maximum requests in flight per dram controller = 4")?;
            writeln!(out, "bandwidth in words per dram controller = 4")?;
            match memory {
                MemoryKind::PrivateSharedMsi => {
                    writeln!(out)?;
                    writeln!(out, "[memory::private-shared MSI]")?;
                    writeln!(out, "words per cache line = 4")?;
                    writeln!(out, "total lines in L1 = 32")?;
                    writeln!(out, "associativity in L1 = 2")?;
                    writeln!(out, "hit test latency in L1 = 2")?;
                    writeln!(out, "read ports in L1 = 2")?;
                    writeln!(out, "write ports in L1 = 1")?;
                    writeln!(out, "replacement policy in L1 = LRU")?;
                    writeln!(out, "total lines in L2 = 128")?;
                    writeln!(out, "associativity in L2 = 4")?;
                    writeln!(out, "hit test latency in L2 = 4")?;
                    writeln!(out, "read ports in L2 = 2")?;
                    writeln!(out, "write ports in L2 = 1")?;
                    writeln!(out, "replacement policy in L2 = LRU")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::route::{Algorithm, RouteBuilder};
    use super::super::topology::Dim;
    use super::super::vc::VcTable;
    use super::{entry_line, fmt_weight};
    use color_eyre::eyre;
    use similar_asserts as diff;

    #[test]
    fn test_fmt_weight() {
        diff::assert_eq!(have: fmt_weight(1.0), want: "1");
        diff::assert_eq!(have: fmt_weight(0.5), want: "0.5");
        diff::assert_eq!(have: fmt_weight(0.25), want: "0.25");
        diff::assert_eq!(have: fmt_weight(1.0 / 6.0), want: "0.166667");
        diff::assert_eq!(have: fmt_weight(1.0 / 64.0), want: "0.015625");
        diff::assert_eq!(have: fmt_weight(0.1), want: "0.1");
    }

    /// 8x8 mesh, XY routing, 4 VCs, node 0 -> node 9 ((0,0) -> (1,1)):
    /// bridge, one hop per axis step, ejection -- four lines, bit-exact.
    #[test]
    fn test_xy_example_lines() -> eyre::Result<()> {
        let dims = Dim::new(8, 8);
        let vcs = VcTable::new(4)?;
        let mut builder = RouteBuilder::new(dims, &vcs, Algorithm::Xy);
        let lines: Vec<_> = builder
            .entries(0, 9)?
            .iter()
            .map(|entry| entry_line(dims, entry, Algorithm::Xy.flow_hex_digits()))
            .collect();
        diff::assert_eq!(
            have: lines,
            want: vec![
                "0x000900@->0x00 = 0,1,2,3".to_string(),
                "0x000900@0x00->0x00 = 0x01@1:24,25,26,27".to_string(),
                "0x000900@0x00->0x01 = 0x09@1:16,17,18,19".to_string(),
                "0x000900@0x01->0x09 = 0x09@1:8,9,10,11".to_string(),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_rewrite_flow_rendering() -> eyre::Result<()> {
        use super::super::route::{EntryKind, NextHop, RouteEntry};
        use super::super::topology::Coord;
        let dims = Dim::new(8, 8);
        let entry = RouteEntry {
            flow: 0x000102 << 8,
            prev: Some(Coord::new(0, 0)),
            cur: Coord::new(1, 0),
            kind: EntryKind::Switch {
                next_hops: vec![NextHop {
                    node: Coord::new(2, 0),
                    weight: 0.5,
                    rewrite_flow: Some((0x000102 << 8) + 1),
                    vcs: vec![26, 27],
                }],
            },
        };
        diff::assert_eq!(
            have: entry_line(dims, &entry, 8),
            want: "0x00010200@0x00->0x01 = 0x02>0x00010201@0.5:26,27"
        );
        Ok(())
    }
}
