mod options;

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use console::style;
use mesh::{RoutesConfig, ShmemConfig, StopoverMode};
use options::{Command, Options};
use std::io::Write;
use std::path::{Path, PathBuf};

fn open_writable(path: impl AsRef<Path>) -> eyre::Result<std::io::BufWriter<std::fs::File>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        utils::fs::create_dirs(parent)?;
    }
    let writer = utils::fs::open_writable(path)?;
    Ok(writer)
}

fn write_output(
    path: &Path,
    write: impl FnOnce(&mut dyn Write) -> eyre::Result<()>,
) -> eyre::Result<()> {
    eprintln!("writing {}...", style(path.display()).cyan());
    let mut out = open_writable(path)?;
    write(&mut out)?;
    out.flush()?;
    Ok(())
}

fn routes(options: &options::Routes) -> eyre::Result<()> {
    let mut config = RoutesConfig::new(options.dims, options.algorithm, options.num_vcs);
    config.ordering = options.ordering;
    config.stopovers = match options.stopovers {
        Some(count) => StopoverMode::Sample { count },
        None => StopoverMode::Exhaustive,
    };
    config.seed = options.seed;
    config.link_bandwidth = options.link_bandwidth;
    config.cpu_bandwidth = options.cpu_bandwidth;
    config.mux = options.mux;
    config.queue_size = options.queue_size;
    config.one_queue_per_flow = options.one_queue_per_flow;
    config.one_flow_per_queue = options.one_flow_per_queue;

    let default_name = PathBuf::from(format!(
        "{}-{}-vc{}.cfg",
        options.algorithm, options.dims, options.num_vcs
    ));
    let path = options.output.clone().unwrap_or(default_name);
    write_output(&path, |mut out| {
        config
            .write(&mut out)
            .wrap_err_with(|| format!("generating {} routes for {}", options.algorithm, options.dims))
    })
}

fn shmem_routes(options: &options::ShmemRoutes) -> eyre::Result<()> {
    let mut config = ShmemConfig::new(options.dims);
    config.vc_sets = options.vc_sets;
    config.vcs_per_set = options.vcs_per_set;
    config.queue_size = options.queue_size;
    config.link_bandwidth = options.link_bandwidth;
    config.cpu_bandwidth = options.cpu_bandwidth;
    config.mux = options.mux;
    config.core = options.core;
    config.memory = options.memory;

    let default_name = PathBuf::from(format!("xy-shmem-{}.cfg", options.dims));
    let path = options.output.clone().unwrap_or(default_name);
    write_output(&path, |mut out| {
        config
            .write(&mut out)
            .wrap_err_with(|| format!("generating shared-memory routes for {}", options.dims))
    })
}

fn traffic(options: &options::Traffic) -> eyre::Result<()> {
    let combinations = options.sizes.len() * options.periods.len();
    if options.output.is_some() && combinations > 1 {
        eyre::bail!("--output cannot name {combinations} size/period combinations");
    }
    for &size in &options.sizes {
        for &period in &options.periods {
            let default_name =
                PathBuf::from(format!("{}-s{size}-p{period}.evt", options.pattern));
            let path = options.output.clone().unwrap_or(default_name);
            write_output(&path, |mut out| {
                trace::write_events(&mut out, options.pattern, options.dims, size, period)?;
                Ok(())
            })?;
        }
    }
    Ok(())
}

fn memtrace(options: &options::Memtrace) -> eyre::Result<()> {
    let config = trace::MemtraceConfig {
        num_threads: options.num_threads,
        thread_length: options.thread_length,
        mem_ratio: options.mem_ratio,
        write_ratio: options.write_ratio,
        private_ratio: options.private_ratio,
        temporal_locality: options.temporal_locality,
        seed: options.seed,
    };
    write_output(&options.output, |mut out| {
        config
            .write(&mut out)
            .wrap_err_with(|| format!("generating {} access streams", options.num_threads))
    })
}

fn binify(options: &options::Binify) -> eyre::Result<()> {
    let reader = utils::fs::open_readable(&options.input)?;
    let mut records = 0;
    write_output(&options.output, |mut out| {
        records = trace::binify(reader, &mut out)
            .wrap_err_with(|| format!("packing {}", options.input.display()))?;
        Ok(())
    })?;
    log::info!("packed {records} records");
    Ok(())
}

fn stats(options: &options::Stats) -> eyre::Result<()> {
    let row = match &options.log {
        Some(path) => stats::parse_log(utils::fs::open_readable(path)?)
            .wrap_err_with(|| format!("parsing {}", path.display()))?,
        None => {
            let stdin = std::io::stdin();
            stats::parse_log(stdin.lock()).wrap_err("parsing stdin")?
        }
    };
    if options.json {
        println!("{}", serde_json::to_string_pretty(&row)?);
    } else {
        println!("{row}");
    }
    Ok(())
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let options = Options::parse();
    match options.command {
        Command::Routes(ref opts) => routes(opts),
        Command::ShmemRoutes(ref opts) => shmem_routes(opts),
        Command::Traffic(ref opts) => traffic(opts),
        Command::Memtrace(ref opts) => memtrace(opts),
        Command::Binify(ref opts) => binify(opts),
        Command::Stats(ref opts) => stats(opts),
    }
}
