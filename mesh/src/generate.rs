use super::route::{flow_id, Algorithm, DimOrder, RouteBuilder, StopoverMode, DEFAULT_SEED};
use super::route::dor_route;
use super::serialize::{entry_line, CoreKind, FlowQueueFlags, MemoryKind, Preamble};
use super::topology::Dim;
use super::vc::VcTable;
use super::Error;

/// Parameters of one generated routing configuration file.
#[derive(Debug, Clone)]
pub struct RoutesConfig {
    pub dims: Dim,
    pub algorithm: Algorithm,
    pub num_vcs: u32,
    /// Phase-1 dimension ordering of the two-phase algorithms.
    pub ordering: DimOrder,
    pub stopovers: StopoverMode,
    pub seed: u64,
    pub link_bandwidth: u32,
    pub cpu_bandwidth: u32,
    pub mux: Option<u32>,
    pub queue_size: u32,
    pub one_queue_per_flow: bool,
    pub one_flow_per_queue: bool,
}

impl RoutesConfig {
    #[must_use]
    pub fn new(dims: Dim, algorithm: Algorithm, num_vcs: u32) -> Self {
        Self {
            dims,
            algorithm,
            num_vcs,
            ordering: DimOrder::Xy,
            stopovers: StopoverMode::Exhaustive,
            seed: DEFAULT_SEED,
            link_bandwidth: 1,
            cpu_bandwidth: 16,
            mux: None,
            queue_size: 8,
            one_queue_per_flow: false,
            one_flow_per_queue: false,
        }
    }

    /// Writes the preamble and the full all-pairs `[flows]` section.
    ///
    /// All parameters are validated before the first byte is written.
    pub fn write(&self, out: &mut impl std::io::Write) -> Result<(), Error> {
        let vcs = VcTable::new(self.num_vcs)?;
        if self.algorithm != Algorithm::Xy && self.algorithm != Algorithm::Yx && self.num_vcs < 2 {
            return Err(Error::NotEnoughChannels {
                algorithm: self.algorithm,
                num_vcs: self.num_vcs,
            });
        }
        let preamble = Preamble {
            dims: self.dims,
            vcs: &vcs,
            queue_size: self.queue_size,
            cpu_bandwidth: self.cpu_bandwidth,
            link_bandwidth: self.link_bandwidth,
            mux: self.mux,
            bytes_per_flit: None,
            flow_queue_flags: Some(FlowQueueFlags {
                one_queue_per_flow: self.one_queue_per_flow,
                one_flow_per_queue: self.one_flow_per_queue,
            }),
            core: CoreKind::Injector,
            memory: None,
        };
        log::debug!(
            "{} routes for {} node pairs",
            self.algorithm,
            u64::from(self.dims.num_nodes()) * u64::from(self.dims.num_nodes() - 1)
        );
        preamble.write(out)?;
        writeln!(out)?;
        writeln!(out, "[flows]")?;
        let digits = self.algorithm.flow_hex_digits();
        let mut builder = RouteBuilder::new(self.dims, &vcs, self.algorithm)
            .with_ordering(self.ordering)
            .with_stopovers(self.stopovers, self.seed);
        for (src, dst) in self.dims.pairs() {
            if self.algorithm.is_two_phase() {
                writeln!(out)?;
                writeln!(out, "# flow {src:02x} -> {dst:02x} using {}", self.algorithm)?;
            } else {
                writeln!(
                    out,
                    "# flow {src:02x} -> {dst:02x} using {} routing",
                    self.algorithm
                )?;
            }
            for entry in builder.entries(src, dst)? {
                writeln!(out, "{}", entry_line(self.dims, &entry, digits))?;
            }
        }
        Ok(())
    }
}

/// Parameters of a shared-memory (memory-trace) configuration: XY routing
/// replicated once per VC set, with the memory hierarchy preamble.
#[derive(Debug, Clone)]
pub struct ShmemConfig {
    pub dims: Dim,
    pub vc_sets: u32,
    pub vcs_per_set: u32,
    /// Flits per VC.
    pub queue_size: u32,
    pub cpu_bandwidth: u32,
    pub link_bandwidth: u32,
    pub mux: Option<u32>,
    pub core: CoreKind,
    pub memory: MemoryKind,
}

impl ShmemConfig {
    #[must_use]
    pub fn new(dims: Dim) -> Self {
        Self {
            dims,
            vc_sets: 5,
            vcs_per_set: 1,
            queue_size: 4,
            cpu_bandwidth: 16,
            link_bandwidth: 1,
            mux: None,
            core: CoreKind::MemtraceCore,
            memory: MemoryKind::PrivateSharedMsi,
        }
    }

    pub fn write(&self, out: &mut impl std::io::Write) -> Result<(), Error> {
        let vcs = VcTable::shmem(self.vc_sets, self.vcs_per_set)?;
        let preamble = Preamble {
            dims: self.dims,
            vcs: &vcs,
            queue_size: self.queue_size,
            cpu_bandwidth: self.cpu_bandwidth,
            link_bandwidth: self.link_bandwidth,
            mux: self.mux,
            bytes_per_flit: Some(8),
            flow_queue_flags: None,
            core: self.core,
            memory: Some(self.memory),
        };
        preamble.write(out)?;
        writeln!(out)?;
        writeln!(out, "[flows]")?;
        for (src, dst) in self.dims.pairs() {
            writeln!(out, "# flow {src:02x} -> {dst:02x} using xy routing")?;
            let src_coord = self.dims.coord_of(src);
            let dst_coord = self.dims.coord_of(dst);
            for set in 0..self.vc_sets {
                // one logical flow per VC set, confined to that set
                let flow = flow_id(src, dst) | (u64::from(set) << 24);
                let entries = dor_route(
                    DimOrder::Xy,
                    flow,
                    src_coord,
                    dst_coord,
                    Some(set as usize),
                    Some(set as usize),
                    &vcs,
                )?;
                for entry in entries {
                    writeln!(out, "{}", entry_line(self.dims, &entry, 8))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::route::Algorithm;
    use super::super::topology::Dim;
    use super::super::Error;
    use super::{RoutesConfig, ShmemConfig};
    use color_eyre::eyre;
    use similar_asserts as diff;

    fn render(config: &RoutesConfig) -> Result<String, Error> {
        let mut out = Vec::new();
        config.write(&mut out)?;
        Ok(String::from_utf8(out).expect("config output is utf-8"))
    }

    #[test]
    fn test_xy_config_layout() -> eyre::Result<()> {
        let config = RoutesConfig::new(Dim::new(2, 2), Algorithm::Xy, 2);
        let text = render(&config)?;
        let lines: Vec<_> = text.lines().collect();
        diff::assert_eq!(have: lines[0], want: "[geometry]");
        diff::assert_eq!(have: lines[1], want: "height = 2");
        diff::assert_eq!(have: lines[2], want: "width = 2");
        assert!(text.contains("\n[routing]\nnode = weighted\nqueue = set\n"));
        assert!(text.contains("one queue per flow = false"));
        assert!(text.contains("\n[queues]\ncpu = 0 1\nnet = 8 9\n"));
        assert!(text.contains("\n[core]\ndefault = injector\n"));
        assert!(text.contains("\n[flows]\n"));
        // 12 ordered pairs, one comment each
        let comments = text
            .lines()
            .filter(|line| line.starts_with("# flow"))
            .count();
        diff::assert_eq!(have: comments, want: 12);
        assert!(text.contains("# flow 00 -> 01 using xy routing"));
        Ok(())
    }

    #[test]
    fn test_bandwidth_mux_suffix() -> eyre::Result<()> {
        let mut config = RoutesConfig::new(Dim::new(2, 2), Algorithm::Xy, 2);
        config.mux = Some(2);
        config.link_bandwidth = 4;
        let text = render(&config)?;
        assert!(text.contains("cpu = 16/2"));
        assert!(text.contains("north = 4/2"));
        assert!(text.contains("net = 16\n"));
        Ok(())
    }

    #[test]
    fn test_two_phase_comment_style() -> eyre::Result<()> {
        let config = RoutesConfig::new(Dim::new(2, 2), Algorithm::Romm2, 2);
        let text = render(&config)?;
        assert!(text.contains("\n\n# flow 00 -> 01 using romm2\n"));
        Ok(())
    }

    #[test]
    fn test_o1turn_rejects_single_channel() {
        let config = RoutesConfig::new(Dim::new(2, 2), Algorithm::O1Turn, 1);
        assert!(matches!(
            render(&config),
            Err(Error::NotEnoughChannels { .. })
        ));
    }

    #[test]
    fn test_shmem_config_layout() -> eyre::Result<()> {
        let mut config = ShmemConfig::new(Dim::new(2, 2));
        config.vc_sets = 2;
        config.vcs_per_set = 1;
        let mut out = Vec::new();
        config.write(&mut out)?;
        let text = String::from_utf8(out)?;
        assert!(text.contains("bytes per flit = 8"));
        assert!(text.contains("\n[core]\ndefault = memtraceCore\n"));
        assert!(text.contains("[core::memtraceCore]"));
        assert!(text.contains("[memory]\narchitecture = private-shared MSI"));
        assert!(text.contains("[memory::private-shared MSI]"));
        // one route per VC set: flow prefixes 0x00... and 0x01...
        assert!(text.contains("0x00000100@->0x00 = 0"));
        assert!(text.contains("0x01000100@->0x00 = 1"));
        Ok(())
    }
}
