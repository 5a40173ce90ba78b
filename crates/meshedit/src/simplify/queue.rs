//! Removable minimum-priority queue of edge collapses.
//!
//! Ordered by (cost, edge) so ties break on the stable edge key. Each edge
//! has at most one live entry; re-inserting replaces the old one.

use glam::Vec3;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::half_edge::EdgeId;

/// Collapse candidate for one edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub edge: EdgeId,
    /// Position of the merged vertex
    pub optimal: Vec3,
    /// Quadric error at `optimal`
    pub cost: f32,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: f32,
    edge: EdgeId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.edge.cmp(&other.edge))
    }
}

#[derive(Debug, Default)]
pub(crate) struct CollapseQueue {
    order: BTreeSet<Candidate>,
    records: HashMap<EdgeId, EdgeRecord>,
}

impl CollapseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any earlier record for the same edge
    pub fn insert(&mut self, record: EdgeRecord) {
        self.remove(record.edge);
        self.order.insert(Candidate {
            cost: record.cost,
            edge: record.edge,
        });
        self.records.insert(record.edge, record);
    }

    pub fn remove(&mut self, edge: EdgeId) -> Option<EdgeRecord> {
        let record = self.records.remove(&edge)?;
        self.order.remove(&Candidate {
            cost: record.cost,
            edge,
        });
        Some(record)
    }

    /// Take the cheapest record
    pub fn pop(&mut self) -> Option<EdgeRecord> {
        let candidate = self.order.pop_first()?;
        self.records.remove(&candidate.edge)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn edges(n: usize) -> Vec<EdgeId> {
        let mut arena: SlotMap<EdgeId, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    fn record(edge: EdgeId, cost: f32) -> EdgeRecord {
        EdgeRecord {
            edge,
            optimal: Vec3::ZERO,
            cost,
        }
    }

    #[test]
    fn test_pops_in_cost_order() {
        let e = edges(3);
        let mut queue = CollapseQueue::new();
        queue.insert(record(e[0], 2.0));
        queue.insert(record(e[1], 0.5));
        queue.insert(record(e[2], 1.0));

        let order: Vec<EdgeId> = std::iter::from_fn(|| queue.pop()).map(|r| r.edge).collect();
        assert_eq!(order, vec![e[1], e[2], e[0]]);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_ties_break_on_edge_key() {
        let e = edges(3);
        let mut queue = CollapseQueue::new();
        for &edge in e.iter().rev() {
            queue.insert(record(edge, 1.0));
        }
        assert_eq!(queue.pop().unwrap().edge, e[0]);
    }

    #[test]
    fn test_reinsert_replaces_and_remove_evicts() {
        let e = edges(2);
        let mut queue = CollapseQueue::new();
        queue.insert(record(e[0], 1.0));
        queue.insert(record(e[1], 2.0));
        queue.insert(record(e[0], 3.0));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().edge, e[1]);

        assert_eq!(queue.remove(e[0]).map(|r| r.cost), Some(3.0));
        assert_eq!(queue.remove(e[0]), None);
        assert!(queue.pop().is_none());
    }
}
