use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub expanded_nodes: usize,
    pub created_nodes: usize,
    pub relaxed_nodes: usize,
    /// Heap entries popped after their node had already been finalized.
    pub stale_entries: usize,
    pub time_us: u64,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Time(microseconds) {:?} Expanded nodes {:?} Created nodes {:?} Relaxed nodes {:?} Stale entries {:?}",
            self.time_us, self.expanded_nodes, self.created_nodes, self.relaxed_nodes, self.stale_entries
        );
    }
}
