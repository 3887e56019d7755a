use clap::Parser;
use mesh::serialize::{CoreKind, MemoryKind};
use mesh::{Algorithm, Dim, DimOrder};
use std::path::PathBuf;
use trace::Pattern;

#[derive(Parser, Debug, Clone)]
pub struct Routes {
    #[clap(long = "dims", help = "mesh dimensions, e.g. 8x8", default_value = "8x8")]
    pub dims: Dim,

    #[clap(long = "algorithm", help = "routing algorithm", default_value = "xy")]
    pub algorithm: Algorithm,

    #[clap(
        long = "num-vcs",
        help = "virtual channels per set (1, 2, 4 or 8)",
        default_value = "4"
    )]
    pub num_vcs: u32,

    #[clap(
        long = "ordering",
        help = "first-phase dimension order of romm2/valiant",
        default_value = "xy"
    )]
    pub ordering: DimOrder,

    #[clap(
        long = "stopovers",
        help = "sample this many stopovers per pair instead of enumerating all"
    )]
    pub stopovers: Option<usize>,

    #[clap(long = "seed", help = "stopover sampling seed", default_value = "7")]
    pub seed: u64,

    #[clap(long = "link-bandwidth", default_value = "1")]
    pub link_bandwidth: u32,

    #[clap(long = "cpu-bandwidth", default_value = "16")]
    pub cpu_bandwidth: u32,

    #[clap(long = "mux", help = "crossbar mux fan-in")]
    pub mux: Option<u32>,

    #[clap(long = "queue-size", help = "flits per virtual channel", default_value = "8")]
    pub queue_size: u32,

    #[clap(long = "one-queue-per-flow")]
    pub one_queue_per_flow: bool,

    #[clap(long = "one-flow-per-queue")]
    pub one_flow_per_queue: bool,

    #[clap(short = 'o', long = "output", help = "output file (default: derived name)")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ShmemRoutes {
    #[clap(long = "dims", help = "mesh dimensions, e.g. 8x8", default_value = "8x8")]
    pub dims: Dim,

    #[clap(long = "vc-sets", help = "number of virtual channel sets", default_value = "5")]
    pub vc_sets: u32,

    #[clap(long = "vcs-per-set", default_value = "1")]
    pub vcs_per_set: u32,

    #[clap(long = "queue-size", help = "flits per virtual channel", default_value = "4")]
    pub queue_size: u32,

    #[clap(long = "link-bandwidth", default_value = "1")]
    pub link_bandwidth: u32,

    #[clap(long = "cpu-bandwidth", default_value = "16")]
    pub cpu_bandwidth: u32,

    #[clap(long = "mux", help = "crossbar mux fan-in")]
    pub mux: Option<u32>,

    #[clap(long = "core", help = "core model", default_value = "memtraceCore")]
    pub core: CoreKind,

    #[clap(long = "memory", help = "memory architecture", default_value = "privateSharedMSI")]
    pub memory: MemoryKind,

    #[clap(short = 'o', long = "output", help = "output file (default: derived name)")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct Traffic {
    #[clap(long = "pattern", help = "traffic permutation")]
    pub pattern: Pattern,

    #[clap(long = "dims", help = "mesh dimensions (powers of two)", default_value = "8x8")]
    pub dims: Dim,

    #[clap(
        long = "size",
        help = "packet sizes in flits (one event file per size/period combination)",
        num_args = 1..,
        default_values_t = [2_u32]
    )]
    pub sizes: Vec<u32>,

    #[clap(
        long = "period",
        help = "injection periods in cycles",
        num_args = 1..,
        default_values_t = [1_u32]
    )]
    pub periods: Vec<u32>,

    #[clap(
        short = 'o',
        long = "output",
        help = "output file (single size/period combination only)"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct Memtrace {
    #[clap(short = 'n', long = "num-threads", default_value = "64")]
    pub num_threads: u32,

    #[clap(
        short = 'l',
        long = "length",
        help = "instructions per thread",
        default_value = "10000"
    )]
    pub thread_length: u32,

    #[clap(
        short = 'm',
        long = "mem-ratio",
        help = "% of memory instructions",
        default_value = "20"
    )]
    pub mem_ratio: u32,

    #[clap(
        short = 'w',
        long = "write-ratio",
        help = "% of writes among memory instructions",
        default_value = "25"
    )]
    pub write_ratio: u32,

    #[clap(
        short = 'p',
        long = "private-ratio",
        help = "% of private data accesses among memory instructions",
        default_value = "70"
    )]
    pub private_ratio: u32,

    #[clap(
        short = 't',
        long = "temporal-locality",
        help = "temporal locality index (0 to 99)",
        default_value = "40"
    )]
    pub temporal_locality: u32,

    #[clap(long = "seed", default_value = "7")]
    pub seed: u64,

    #[clap(short = 'o', long = "output", default_value = "synthetic.memtrace")]
    pub output: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct Binify {
    #[clap(help = "text trace to pack")]
    pub input: PathBuf,

    #[clap(short = 'o', long = "output", help = "packed binary output")]
    pub output: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct Stats {
    #[clap(help = "simulation log (stdin when omitted)")]
    pub log: Option<PathBuf>,

    #[clap(long = "json", help = "print the row as JSON instead of columns")]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub enum Command {
    /// Generate a mesh routing configuration.
    Routes(Routes),
    /// Generate the shared-memory (memory trace) configuration.
    ShmemRoutes(ShmemRoutes),
    /// Generate synthetic traffic event files.
    Traffic(Traffic),
    /// Generate a synthetic memory-access trace.
    Memtrace(Memtrace),
    /// Pack a text option trace into binary form.
    Binify(Binify),
    /// Extract one result row from a simulation log.
    Stats(Stats),
}

#[derive(Parser, Debug, Clone)]
#[clap(version, about = "mesh interconnect simulation utilities")]
pub struct Options {
    #[clap(subcommand)]
    pub command: Command,
}
