use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use crate::constants::MAX_METRICS_HISTORY;
use crate::types::{AlgorithmKind, AlgorithmMetrics};

/// Aggregate over every retained run of one algorithm.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlgorithmSummary {
    pub algorithm: AlgorithmKind,
    pub runs: usize,
    #[serde(rename = "avgNodesExpanded")]
    pub avg_nodes_expanded: f64,
    #[serde(rename = "avgExecutionTimeMs")]
    pub avg_execution_time_ms: f64,
    #[serde(rename = "avgPathLength")]
    pub avg_path_length: f64,
}

/// Most recent pathfinding metrics, oldest evicted first.
#[derive(Clone, Debug)]
pub struct MetricsLog {
    entries: VecDeque<AlgorithmMetrics>,
    capacity: usize,
}

impl Default for MetricsLog {
    fn default() -> Self {
        Self::with_capacity(MAX_METRICS_HISTORY)
    }
}

impl MetricsLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(MAX_METRICS_HISTORY)),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, metrics: AlgorithmMetrics) {
        self.entries.push_back(metrics);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlgorithmMetrics> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&AlgorithmMetrics> {
        self.entries.back()
    }

    /// One summary per algorithm that has at least one retained run, in
    /// `AlgorithmKind` order.
    pub fn summary(&self) -> Vec<AlgorithmSummary> {
        let mut totals: BTreeMap<AlgorithmKind, (usize, f64, f64, f64)> = BTreeMap::new();
        for entry in &self.entries {
            let slot = totals.entry(entry.algorithm).or_insert((0, 0.0, 0.0, 0.0));
            slot.0 += 1;
            slot.1 += entry.nodes_expanded as f64;
            slot.2 += entry.execution_time_ms;
            slot.3 += entry.path_length as f64;
        }

        totals
            .into_iter()
            .map(|(algorithm, (runs, nodes, time, length))| {
                let n = runs as f64;
                AlgorithmSummary {
                    algorithm,
                    runs,
                    avg_nodes_expanded: nodes / n,
                    avg_execution_time_ms: time / n,
                    avg_path_length: length / n,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample(algorithm: AlgorithmKind, nodes: usize, time: f64, length: usize) -> AlgorithmMetrics {
        AlgorithmMetrics {
            algorithm,
            nodes_expanded: nodes,
            execution_time_ms: time,
            path_length: length,
            timestamp: 0,
        }
    }

    #[test]
    fn log_keeps_only_the_most_recent_entries() {
        let mut log = MetricsLog::with_capacity(3);
        for nodes in 1..=5 {
            log.record(sample(AlgorithmKind::Bfs, nodes, 0.0, 1));
        }
        assert_eq!(log.len(), 3);
        let kept: Vec<usize> = log.iter().map(|m| m.nodes_expanded).collect();
        assert_eq!(kept, vec![3, 4, 5]);
        assert_eq!(log.latest().map(|m| m.nodes_expanded), Some(5));
    }

    #[test]
    fn default_capacity_is_one_hundred() {
        let mut log = MetricsLog::default();
        for _ in 0..150 {
            log.record(sample(AlgorithmKind::AStar, 1, 0.1, 1));
        }
        assert_eq!(log.len(), MAX_METRICS_HISTORY);
    }

    #[test]
    fn summary_averages_per_algorithm() {
        let mut log = MetricsLog::default();
        log.record(sample(AlgorithmKind::Dijkstra, 10, 2.0, 4));
        log.record(sample(AlgorithmKind::AStar, 4, 1.0, 4));
        log.record(sample(AlgorithmKind::Dijkstra, 20, 4.0, 6));

        let summary = log.summary();
        assert_eq!(
            summary,
            vec![
                AlgorithmSummary {
                    algorithm: AlgorithmKind::AStar,
                    runs: 1,
                    avg_nodes_expanded: 4.0,
                    avg_execution_time_ms: 1.0,
                    avg_path_length: 4.0,
                },
                AlgorithmSummary {
                    algorithm: AlgorithmKind::Dijkstra,
                    runs: 2,
                    avg_nodes_expanded: 15.0,
                    avg_execution_time_ms: 3.0,
                    avg_path_length: 5.0,
                },
            ]
        );

        log.clear();
        assert!(log.summary().is_empty());
    }
}
