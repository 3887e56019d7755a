//! Synthetic memory-access trace generator.
//!
//! Emits one `Thread <id> <addr> R|W deadbeef <home> <interval>` line per
//! memory access into a `.memtrace` file the memory trace core replays.
//! Each thread walks a two-state Markov chain between its private (local)
//! data and some other thread's (remote) data; the private-access ratio
//! and a temporal locality index shape the transition probabilities.

use super::Error;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;

/// Seed of the original generator.
pub const DEFAULT_SEED: u64 = 7;

/// Stripe mask: each thread's home region spans `stripe + 1` bytes.
const STRIPE_UNIT: u32 = 0x1ff;

#[derive(Debug, Clone)]
pub struct MemtraceConfig {
    pub num_threads: u32,
    /// Instructions per thread (memory and non-memory combined).
    pub thread_length: u32,
    /// Percentage of memory instructions.
    pub mem_ratio: u32,
    /// Percentage of writes among memory instructions.
    pub write_ratio: u32,
    /// Percentage of private data accesses among memory instructions.
    pub private_ratio: u32,
    /// Temporal locality index, 0 to 99.
    pub temporal_locality: u32,
    pub seed: u64,
}

impl Default for MemtraceConfig {
    fn default() -> Self {
        Self {
            num_threads: 64,
            thread_length: 10_000,
            mem_ratio: 20,
            write_ratio: 25,
            private_ratio: 70,
            temporal_locality: 40,
            seed: DEFAULT_SEED,
        }
    }
}

/// Markov transition probabilities `(local -> remote, remote -> local)`
/// in percent, derived from the private-access ratio and the temporal
/// locality index. Higher locality lowers both rates while keeping their
/// ratio (and with it the steady-state private share) fixed.
fn transition_probs(private_ratio: u32, temporal_locality: u32) -> (u32, u32) {
    match private_ratio {
        0 => (100, 0),
        100 => (0, 100),
        p => {
            let max_local_to_remote = (100 * (100 - p) / p).min(100);
            let local_to_remote = (max_local_to_remote * (100 - temporal_locality) / 100).max(1);
            let remote_to_local = (local_to_remote * p / (100 - p)).max(1);
            (local_to_remote, remote_to_local)
        }
    }
}

impl MemtraceConfig {
    fn validate(&self) -> Result<(), Error> {
        if self.num_threads < 2 {
            return Err(Error::TooFewThreads {
                num_threads: self.num_threads,
            });
        }
        if self.mem_ratio == 0 {
            return Err(Error::ZeroMemRatio);
        }
        for (name, value, max) in [
            ("memory instruction ratio", self.mem_ratio, 100),
            ("write ratio", self.write_ratio, 100),
            ("private access ratio", self.private_ratio, 100),
            ("temporal locality index", self.temporal_locality, 99),
        ] {
            if value > max {
                return Err(Error::Percentage { name, value, max });
            }
        }
        Ok(())
    }

    /// Writes the per-thread access streams.
    ///
    /// Output is fully determined by the configuration (including the
    /// seed); the interval column is the number of non-memory
    /// instructions between consecutive accesses.
    pub fn write(&self, out: &mut impl Write) -> Result<(), Error> {
        self.validate()?;
        let interval = 100 / self.mem_ratio;
        let accesses = u64::from(self.thread_length) * u64::from(self.mem_ratio) / 100;
        let (local_to_remote, remote_to_local) =
            transition_probs(self.private_ratio, self.temporal_locality);
        log::debug!(
            "{accesses} accesses per thread, transition probabilities {local_to_remote}%/{remote_to_local}%"
        );
        let mut rng = StdRng::seed_from_u64(self.seed);
        for thread in 0..self.num_threads {
            let mut local = true;
            for _ in 0..accesses {
                let r = rng.gen_range(0..100);
                if local && r < local_to_remote {
                    local = false;
                } else if !local && r < remote_to_local {
                    local = true;
                }
                let home = if local {
                    thread
                } else {
                    // uniform over the other threads
                    let r = rng.gen_range(0..self.num_threads - 1);
                    if r != thread {
                        r
                    } else {
                        self.num_threads - 1
                    }
                };
                // word-aligned offset within the home stripe
                let offset = rng.gen_range(0..STRIPE_UNIT >> 2) << 2;
                let addr = u64::from(home) * u64::from(STRIPE_UNIT + 1) + u64::from(offset);
                let rw = if rng.gen_range(0..100) < self.write_ratio {
                    "W"
                } else {
                    "R"
                };
                writeln!(out, "Thread {thread} {addr:x} {rw} deadbeef {home:x} {interval}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemtraceConfig;
    use crate::Error;
    use color_eyre::eyre;
    use similar_asserts as diff;

    fn render(config: &MemtraceConfig) -> Result<String, Error> {
        let mut out = Vec::new();
        config.write(&mut out)?;
        Ok(String::from_utf8(out).expect("trace output is utf-8"))
    }

    fn small() -> MemtraceConfig {
        MemtraceConfig {
            num_threads: 4,
            thread_length: 100,
            ..MemtraceConfig::default()
        }
    }

    #[test]
    fn test_line_format_and_count() -> eyre::Result<()> {
        let text = render(&small())?;
        let lines: Vec<_> = text.lines().collect();
        // 4 threads x 100 * 20% accesses
        diff::assert_eq!(have: lines.len(), want: 80);
        for line in &lines {
            let words: Vec<_> = line.split_whitespace().collect();
            diff::assert_eq!(have: words.len(), want: 7);
            diff::assert_eq!(have: words[0], want: "Thread");
            assert!(words[3] == "R" || words[3] == "W");
            diff::assert_eq!(have: words[4], want: "deadbeef");
            // memory instruction every 100/20 instructions
            diff::assert_eq!(have: words[6], want: "5");
        }
        assert!(lines[0].starts_with("Thread 0 "));
        assert!(lines[79].starts_with("Thread 3 "));
        Ok(())
    }

    #[test]
    fn test_addresses_stay_in_home_stripe() -> eyre::Result<()> {
        let text = render(&small())?;
        for line in text.lines() {
            let words: Vec<_> = line.split_whitespace().collect();
            let addr = u64::from_str_radix(words[2], 16)?;
            let home = u64::from_str_radix(words[5], 16)?;
            diff::assert_eq!(have: addr >> 9, want: home);
            diff::assert_eq!(have: addr % 4, want: 0_u64);
        }
        Ok(())
    }

    #[test]
    fn test_private_ratio_extremes() -> eyre::Result<()> {
        let all_private = MemtraceConfig {
            private_ratio: 100,
            ..small()
        };
        for line in render(&all_private)?.lines() {
            let words: Vec<_> = line.split_whitespace().collect();
            diff::assert_eq!(have: u32::from_str_radix(words[5], 16)?, want: words[1].parse::<u32>()?);
        }
        let all_remote = MemtraceConfig {
            private_ratio: 0,
            ..small()
        };
        for line in render(&all_remote)?.lines() {
            let words: Vec<_> = line.split_whitespace().collect();
            assert!(u32::from_str_radix(words[5], 16)? != words[1].parse::<u32>()?);
        }
        Ok(())
    }

    #[test]
    fn test_seeded_determinism() -> eyre::Result<()> {
        diff::assert_eq!(have: render(&small())?, want: render(&small())?);
        let reseeded = MemtraceConfig { seed: 8, ..small() };
        assert!(render(&small())? != render(&reseeded)?);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_percentages() {
        let config = MemtraceConfig {
            write_ratio: 150,
            ..small()
        };
        assert!(matches!(
            config.write(&mut Vec::new()),
            Err(Error::Percentage { value: 150, .. })
        ));
        let config = MemtraceConfig {
            temporal_locality: 100,
            ..small()
        };
        assert!(matches!(
            config.write(&mut Vec::new()),
            Err(Error::Percentage { max: 99, .. })
        ));
        let config = MemtraceConfig {
            mem_ratio: 0,
            ..small()
        };
        assert!(matches!(config.write(&mut Vec::new()), Err(Error::ZeroMemRatio)));
        let config = MemtraceConfig {
            num_threads: 1,
            ..small()
        };
        assert!(matches!(
            config.write(&mut Vec::new()),
            Err(Error::TooFewThreads { num_threads: 1 })
        ));
    }
}
