use serde::Serialize;

/// Values of the `[Summary: Thread ...]` line.
///
/// Logs predating thread migration lack the migration counters; those
/// parse as `"0"` rather than `n/a` so old and new runs stay comparable.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadSummary {
    pub reads: Option<String>,
    pub writes: Option<String>,
    pub avg_memory_latency: Option<String>,
    pub avg_read_latency: Option<String>,
    pub avg_write_latency: Option<String>,
    pub migration_rate: Option<String>,
    pub migrations: Option<String>,
    pub inbound_migrations: Option<String>,
    pub thread_evictions: Option<String>,
    pub migration_latency: Option<String>,
    pub inbound_migration_latency: Option<String>,
    pub eviction_latency: Option<String>,
}

/// Values of the per-architecture `[Summary: Private-shared-...]` line.
///
/// The three cache architectures report different subsets; counters an
/// architecture cannot produce are `"0"` (LCC does not invalidate, MSI
/// does not block) and counters it does not break down are left `n/a`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CacheSummary {
    pub l1_hit_rate: Option<String>,
    pub l1_read_hit_rate: Option<String>,
    pub l1_write_hit_rate: Option<String>,
    pub l2_hit_rate: Option<String>,
    pub l2_read_hit_rate: Option<String>,
    pub l2_write_hit_rate: Option<String>,
    pub cat_hit_rate: Option<String>,
    pub l1_ops: Option<String>,
    pub l2_ops: Option<String>,
    pub invalidations: Option<String>,
    pub invalidation_targets: Option<String>,
    pub invalidation_cycles: Option<String>,
    pub blocks: Option<String>,
    pub block_evictions: Option<String>,
}

/// Values of the `[Latency Breakdown ...]` line.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LatencyBreakdown {
    pub memory_serialization: Option<String>,
    pub cat_serialization: Option<String>,
    pub cat_action: Option<String>,
    pub l1_serialization: Option<String>,
    pub l1_action: Option<String>,
    pub l1_eviction: Option<String>,
    pub l2_serialization: Option<String>,
    pub l2_action: Option<String>,
    pub l2_invalidation: Option<String>,
    pub l2_block: Option<String>,
    pub dram_serialization: Option<String>,
    pub dram_offchip: Option<String>,
}

/// Values of the `[State Transitions on ...]` line.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StateTransitions {
    pub i_to_s: Option<String>,
    pub i_to_e: Option<String>,
    pub s_to_s: Option<String>,
    pub s_to_e: Option<String>,
    pub e_to_s: Option<String>,
    pub e_to_e: Option<String>,
}

/// Values of the `[Coherence Messages 1/2 ...]` lines.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CoherenceTraffic {
    pub share_requests: Option<String>,
    pub exclusive_requests: Option<String>,
    pub invalidate_replies: Option<String>,
    pub invalidate_replies_on_request: Option<String>,
    pub flush_replies: Option<String>,
    pub flush_replies_on_request: Option<String>,
    pub writeback_replies: Option<String>,
    pub writeback_replies_on_request: Option<String>,
    pub share_replies: Option<String>,
    pub exclusive_replies: Option<String>,
    pub invalidate_requests: Option<String>,
    pub writeback_requests: Option<String>,
    pub flush_requests: Option<String>,
}

/// One result row extracted from a simulation log.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Reads plus writes, computed from the thread summary.
    pub total_accesses: Option<String>,
    pub threads: ThreadSummary,
    pub cache: CacheSummary,
    pub latency: LatencyBreakdown,
    pub transitions: StateTransitions,
    pub coherence: CoherenceTraffic,
}

impl Row {
    /// All columns in output order. The inbound migration latency appears
    /// twice, once in the migration group and once after the latency
    /// breakdown, mirroring the established table layout downstream
    /// plotting depends on.
    #[must_use]
    pub fn columns(&self) -> Vec<&Option<String>> {
        vec![
            &self.total_accesses,
            &self.threads.reads,
            &self.threads.writes,
            &self.threads.avg_memory_latency,
            &self.threads.avg_read_latency,
            &self.threads.avg_write_latency,
            &self.cache.l1_hit_rate,
            &self.cache.l1_read_hit_rate,
            &self.cache.l1_write_hit_rate,
            &self.cache.l2_hit_rate,
            &self.cache.l2_read_hit_rate,
            &self.cache.l2_write_hit_rate,
            &self.cache.cat_hit_rate,
            &self.cache.l1_ops,
            &self.cache.l2_ops,
            &self.cache.invalidations,
            &self.cache.invalidation_targets,
            &self.cache.invalidation_cycles,
            &self.cache.blocks,
            &self.cache.block_evictions,
            &self.threads.migration_rate,
            &self.threads.migrations,
            &self.threads.inbound_migrations,
            &self.threads.thread_evictions,
            &self.threads.migration_latency,
            &self.threads.inbound_migration_latency,
            &self.threads.eviction_latency,
            &self.latency.memory_serialization,
            &self.latency.cat_serialization,
            &self.latency.cat_action,
            &self.latency.l1_serialization,
            &self.latency.l1_action,
            &self.latency.l1_eviction,
            &self.latency.l2_serialization,
            &self.latency.l2_action,
            &self.latency.l2_invalidation,
            &self.latency.l2_block,
            &self.latency.dram_serialization,
            &self.latency.dram_offchip,
            &self.threads.inbound_migration_latency,
            &self.transitions.i_to_s,
            &self.transitions.i_to_e,
            &self.transitions.s_to_s,
            &self.transitions.s_to_e,
            &self.transitions.e_to_s,
            &self.transitions.e_to_e,
            &self.coherence.share_requests,
            &self.coherence.exclusive_requests,
            &self.coherence.invalidate_replies,
            &self.coherence.invalidate_replies_on_request,
            &self.coherence.flush_replies,
            &self.coherence.flush_replies_on_request,
            &self.coherence.writeback_replies,
            &self.coherence.writeback_replies_on_request,
            &self.coherence.share_replies,
            &self.coherence.exclusive_replies,
            &self.coherence.invalidate_requests,
            &self.coherence.writeback_requests,
            &self.coherence.flush_requests,
        ]
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let row = self
            .columns()
            .into_iter()
            .map(|column| column.as_deref().unwrap_or("n/a"))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{row}")
    }
}

#[cfg(test)]
mod tests {
    use super::Row;
    use similar_asserts as diff;

    #[test]
    fn test_empty_row_is_all_missing() {
        let row = Row::default();
        diff::assert_eq!(have: row.columns().len(), want: 59);
        let text = row.to_string();
        diff::assert_eq!(have: text.split(' ').count(), want: 59);
        assert!(text.split(' ').all(|column| column == "n/a"));
    }
}
