use super::row::{
    CacheSummary, CoherenceTraffic, LatencyBreakdown, Row, StateTransitions, ThreadSummary,
};
use super::Error;
use std::io::BufRead;

fn word(words: &[&str], index: usize) -> Option<String> {
    words.get(index).map(|word| (*word).to_string())
}

/// Picks a value rendered with a trailing delimiter, e.g. `"1234)"`.
fn word_trimmed(words: &[&str], index: usize) -> Option<String> {
    words.get(index).map(|word| {
        let mut word = (*word).to_string();
        word.pop();
        word
    })
}

fn number(value: &Option<String>) -> Result<u64, Error> {
    let value = value.as_deref().unwrap_or("n/a");
    value.parse().map_err(|_| Error::Parse {
        value: value.to_string(),
    })
}

impl ThreadSummary {
    fn parse(words: &[&str]) -> Self {
        let mut summary = Self {
            reads: word(words, 6),
            writes: word(words, 8),
            avg_memory_latency: word(words, 10),
            avg_read_latency: word(words, 12),
            avg_write_latency: word(words, 14),
            migration_rate: word(words, 16),
            migrations: word(words, 19),
            inbound_migrations: word(words, 21),
            thread_evictions: word(words, 23),
            migration_latency: word(words, 27),
            inbound_migration_latency: word(words, 30),
            eviction_latency: word(words, 33),
        };
        // logs from before thread migration end after the write latency
        if summary.eviction_latency.is_none() {
            let zero = Some("0".to_string());
            summary.migration_rate = zero.clone();
            summary.migrations = zero.clone();
            summary.inbound_migrations = zero.clone();
            summary.thread_evictions = zero.clone();
            summary.migration_latency = zero.clone();
            summary.inbound_migration_latency = zero.clone();
            summary.eviction_latency = zero;
        }
        summary
    }
}

impl CacheSummary {
    fn parse_lcc(words: &[&str]) -> Self {
        let zero = Some("0".to_string());
        Self {
            l1_hit_rate: word(words, 8),
            // LCC tracks read hits only
            l1_read_hit_rate: word(words, 8),
            l1_write_hit_rate: zero.clone(),
            l2_hit_rate: word(words, 10),
            l2_read_hit_rate: word(words, 12),
            l2_write_hit_rate: word(words, 14),
            blocks: word(words, 16),
            block_evictions: word_trimmed(words, 18),
            cat_hit_rate: word(words, 20),
            l1_ops: word(words, 22),
            l2_ops: word(words, 24),
            invalidations: zero.clone(),
            invalidation_targets: zero.clone(),
            invalidation_cycles: zero,
        }
    }

    fn parse_msi(words: &[&str]) -> Self {
        let zero = Some("0".to_string());
        Self {
            l1_hit_rate: word(words, 8),
            l1_read_hit_rate: word(words, 10),
            l1_write_hit_rate: word(words, 12),
            l2_hit_rate: word(words, 14),
            l2_read_hit_rate: None,
            l2_write_hit_rate: None,
            invalidations: word(words, 16),
            invalidation_targets: word(words, 18),
            invalidation_cycles: word(words, 20),
            cat_hit_rate: word(words, 22),
            l1_ops: word(words, 24),
            l2_ops: word(words, 26),
            blocks: zero.clone(),
            block_evictions: zero,
        }
    }

    fn parse_emra(words: &[&str]) -> Self {
        let zero = Some("0".to_string());
        Self {
            l1_hit_rate: word(words, 8),
            l1_read_hit_rate: word(words, 10),
            l1_write_hit_rate: word(words, 12),
            l2_hit_rate: word(words, 18),
            l2_read_hit_rate: word(words, 20),
            l2_write_hit_rate: word(words, 22),
            cat_hit_rate: word(words, 24),
            l1_ops: word(words, 26),
            l2_ops: word(words, 28),
            invalidations: zero.clone(),
            invalidation_targets: zero.clone(),
            invalidation_cycles: zero.clone(),
            blocks: zero.clone(),
            block_evictions: zero,
        }
    }
}

impl LatencyBreakdown {
    fn parse(words: &[&str]) -> Self {
        let zero = Some("0".to_string());
        // architectures that evict from L1 report an extra component,
        // shifting everything after it by one label/value pair
        if word(words, 9).as_deref() == Some("L1-evict:") {
            Self {
                memory_serialization: word(words, 4),
                l1_serialization: word(words, 6),
                l1_action: word(words, 8),
                l1_eviction: word(words, 10),
                cat_serialization: word(words, 12),
                cat_action: word(words, 14),
                l2_serialization: word(words, 16),
                l2_invalidation: word(words, 18),
                l2_action: word(words, 20),
                dram_serialization: word(words, 22),
                dram_offchip: word(words, 24),
                l2_block: zero,
            }
        } else {
            Self {
                memory_serialization: word(words, 4),
                l1_serialization: word(words, 6),
                l1_action: word(words, 8),
                l1_eviction: zero.clone(),
                cat_serialization: word(words, 10),
                cat_action: word(words, 12),
                l2_serialization: word(words, 14),
                l2_invalidation: zero,
                l2_action: word(words, 16),
                dram_serialization: word(words, 18),
                dram_offchip: word(words, 20),
                l2_block: None,
            }
        }
    }
}

/// Extracts a [`Row`] from a simulation log.
///
/// Lines are dispatched on their bracketed label; unknown lines are
/// skipped. The log may contain any subset of the labeled lines, with
/// later occurrences overriding earlier ones.
pub fn parse_log(reader: impl BufRead) -> Result<Row, Error> {
    let mut row = Row::default();
    for line in reader.lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        if line.starts_with("[Summary: Thread") {
            row.threads = ThreadSummary::parse(&words);
            let total = number(&row.threads.reads)? + number(&row.threads.writes)?;
            row.total_accesses = Some(total.to_string());
        } else if line.starts_with("[Summary: Private-shared-LCC") {
            row.cache = CacheSummary::parse_lcc(&words);
        } else if line.starts_with("[Summary: Private-shared-MSI") {
            row.cache = CacheSummary::parse_msi(&words);
        } else if line.starts_with("[Summary: Private-shared-EMRA") {
            row.cache = CacheSummary::parse_emra(&words);
        } else if line.starts_with("[Latency Breakdown ") {
            row.latency = LatencyBreakdown::parse(&words);
        } else if line.starts_with("[Coherence Messages 1") {
            row.coherence.share_requests = word(&words, 5);
            row.coherence.exclusive_requests = word(&words, 7);
            row.coherence.invalidate_replies = word(&words, 9);
            row.coherence.invalidate_replies_on_request = word_trimmed(&words, 12);
            row.coherence.flush_replies = word(&words, 14);
            row.coherence.flush_replies_on_request = word_trimmed(&words, 17);
            row.coherence.writeback_replies = word(&words, 19);
            row.coherence.writeback_replies_on_request = word_trimmed(&words, 22);
        } else if line.starts_with("[Coherence Messages 2") {
            row.coherence.share_replies = word(&words, 5);
            row.coherence.exclusive_replies = word(&words, 7);
            row.coherence.invalidate_requests = word(&words, 9);
            row.coherence.writeback_requests = word(&words, 13);
            row.coherence.flush_requests = word(&words, 17);
        } else if line.starts_with("[State Transitions on") {
            row.transitions = StateTransitions {
                i_to_s: word(&words, 6),
                i_to_e: word(&words, 8),
                s_to_s: word(&words, 10),
                s_to_e: word(&words, 12),
                e_to_s: word(&words, 14),
                e_to_e: word(&words, 16),
            };
        } else {
            log::trace!("skipping line: {line}");
        }
    }
    Ok(row)
}
