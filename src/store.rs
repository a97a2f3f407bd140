use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::common::{Direction, NodeColor, NodeId};
use crate::heap::{Handle, IndexedHeap};

/// One (vertex, incoming direction, corner count) state reached during a
/// search. Several nodes may share a vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchNode<V> {
    pub vertex: V,
    pub id: NodeId,
    pub distance_from_start: f64,
    /// `distance_from_start` plus the heuristic; the heap key.
    pub priority: f64,
    /// `None` only for the source node.
    pub predecessor: Option<NodeId>,
    pub color: NodeColor,
    pub corner_count: u32,
    pub last_move: Direction,
    /// Valid only while the node is gray.
    pub handle: Option<Handle>,
}

// Corner count => last move => node id
#[derive(Debug, Default)]
struct VertexStates {
    by_corners: HashMap<u32, HashMap<Direction, NodeId>>,
}

impl VertexStates {
    fn insert(&mut self, id: NodeId, last_move: Direction, corner_count: u32) -> bool {
        let by_last_move = self.by_corners.entry(corner_count).or_default();
        if by_last_move.contains_key(&last_move) {
            return false;
        }
        by_last_move.insert(last_move, id);
        true
    }

    fn get(&self, last_move: Direction, corner_count: u32) -> Option<NodeId> {
        self.by_corners
            .get(&corner_count)
            .and_then(|by_last_move| by_last_move.get(&last_move))
            .copied()
    }
}

fn by_priority<V>(nodes: &[SearchNode<V>], first: &NodeId, second: &NodeId) -> Ordering {
    // Equal priorities compare equal; their relative order is whatever the
    // heap layout yields.
    nodes[first.0]
        .priority
        .partial_cmp(&nodes[second.0].priority)
        .unwrap_or(Ordering::Equal)
}

/// Owner of every search node created during one search, of the open-set
/// heap (which stores node ids) and of the per-vertex state index.
#[derive(Debug)]
pub struct SearchNodeStore<V> {
    nodes: Vec<SearchNode<V>>,
    heap: IndexedHeap<NodeId>,
    states: HashMap<V, VertexStates>,
}

impl<V> Default for SearchNodeStore<V> {
    fn default() -> Self {
        SearchNodeStore {
            nodes: Vec::new(),
            heap: IndexedHeap::new(),
            states: HashMap::new(),
        }
    }
}

impl<V> SearchNodeStore<V>
where
    V: Clone + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.nodes.clear();
        self.states.clear();
    }

    pub fn is_heap_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn heap_len(&self) -> usize {
        self.heap.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &SearchNode<V> {
        &self.nodes[id.0]
    }

    pub fn node_id(&self, vertex: &V, last_move: Direction, corner_count: u32) -> Option<NodeId> {
        self.states
            .get(vertex)
            .and_then(|states| states.get(last_move, corner_count))
    }

    pub fn has_node(&self, vertex: &V, last_move: Direction, corner_count: u32) -> bool {
        self.node_id(vertex, last_move, corner_count).is_some()
    }

    pub fn get_node(
        &self,
        vertex: &V,
        last_move: Direction,
        corner_count: u32,
    ) -> Option<&SearchNode<V>> {
        self.node_id(vertex, last_move, corner_count)
            .map(|id| self.node(id))
    }

    pub fn create_start_node(&mut self, vertex: V) -> NodeId {
        self.create_node(vertex, 0.0, None, 0.0, 0, Direction::NONE)
    }

    /// Allocates a white node for a state that has no node yet.
    ///
    /// # Panics
    ///
    /// If `(vertex, last_move, corner_count)` already has a node; callers
    /// check [`SearchNodeStore::has_node`] first.
    pub fn create_node(
        &mut self,
        vertex: V,
        distance_from_start: f64,
        predecessor: Option<NodeId>,
        priority: f64,
        corner_count: u32,
        last_move: Direction,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());

        let registered = self
            .states
            .entry(vertex.clone())
            .or_default()
            .insert(id, last_move, corner_count);
        assert!(
            registered,
            "state ({vertex:?}, {last_move:?}, {corner_count}) already has a node"
        );

        self.nodes.push(SearchNode {
            vertex,
            id,
            distance_from_start,
            priority,
            predecessor,
            color: NodeColor::White,
            corner_count,
            last_move,
            handle: None,
        });

        id
    }

    pub fn insert_into_heap(&mut self, id: NodeId) {
        let nodes = &self.nodes;
        let handle = self.heap.insert(id, |a, b| by_priority(nodes, a, b));

        let node = &mut self.nodes[id.0];
        node.handle = Some(handle);
        node.color = NodeColor::Gray;
    }

    /// Lowers the distance of a gray node. The priority can only drop, so
    /// sifting up is enough to restore heap order.
    pub fn relax(&mut self, id: NodeId, predecessor: NodeId, distance_from_start: f64, heuristic: f64) {
        let node = &mut self.nodes[id.0];
        debug_assert!(distance_from_start + heuristic <= node.priority);

        node.distance_from_start = distance_from_start;
        node.predecessor = Some(predecessor);
        node.priority = distance_from_start + heuristic;

        let Some(handle) = node.handle else {
            panic!("relaxing node {id:?} which is not in the heap");
        };

        let nodes = &self.nodes;
        self.heap.sieve_up(handle, |a, b| by_priority(nodes, a, b));
    }

    /// Pops the gray node with the lowest priority. The caller decides its
    /// next color.
    pub fn extract_min(&mut self) -> Option<SearchNode<V>> {
        let nodes = &self.nodes;
        let id = self.heap.extract_min(|a, b| by_priority(nodes, a, b))?;

        let node = &mut self.nodes[id.0];
        node.handle = None;
        Some(node.clone())
    }

    pub fn set_color(&mut self, id: NodeId, color: NodeColor) {
        let node = &mut self.nodes[id.0];
        debug_assert!(
            node.color != NodeColor::Black || color == NodeColor::Black,
            "node {id:?} cannot leave the black state"
        );
        node.color = color;
    }
}
