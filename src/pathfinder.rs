use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;
use tracing::{debug, instrument, trace};

use crate::common::{Direction, NodeColor, NodeId};
use crate::error::SearchError;
use crate::graph::Graph;
use crate::stat::Stats;
use crate::store::{SearchNode, SearchNodeStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of direction changes along the path. `None` disables
    /// direction tracking altogether.
    pub max_corners: Option<u32>,
    /// Number of finalized nodes after which the search gives up. `None` and
    /// `Some(0)` both mean unlimited.
    pub expansion_limit: Option<usize>,
}

impl SearchOptions {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_corners(mut self, max_corners: u32) -> Self {
        self.max_corners = Some(max_corners);
        self
    }

    pub fn with_expansion_limit(mut self, limit: usize) -> Self {
        self.expansion_limit = Some(limit);
        self
    }

    fn limit(&self) -> Option<usize> {
        self.expansion_limit.filter(|&limit| limit > 0)
    }
}

/// Reusable A* search context. Every call to [`Pathfinder::find_path`]
/// starts from an empty store and leaves it empty, so nothing but the
/// statistics of the last call survives between searches.
#[derive(Debug)]
pub struct Pathfinder<V> {
    store: SearchNodeStore<V>,
    stats: Stats,
}

impl<V> Default for Pathfinder<V> {
    fn default() -> Self {
        Pathfinder {
            store: SearchNodeStore::default(),
            stats: Stats::default(),
        }
    }
}

impl<V> Pathfinder<V>
where
    V: Clone + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics of the most recent search.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Searches for the shortest path from `source` to `destination` with at
    /// most `options.max_corners` direction changes.
    ///
    /// Returns `Ok(true)` and fills `out_path` (source first) when a path is
    /// found; returns `Ok(false)` with `out_path` empty when the open set
    /// runs dry or the expansion limit is hit. Errors only when the graph
    /// breaks its contract, in which case `out_path` is empty as well.
    #[instrument(skip_all, name = "find_path", fields(source = ?source, destination = ?destination, max_corners = ?options.max_corners, limit = ?options.expansion_limit), level = "debug")]
    pub fn find_path<G>(
        &mut self,
        graph: &G,
        source: V,
        destination: &V,
        options: &SearchOptions,
        out_path: &mut Vec<V>,
    ) -> Result<bool, SearchError>
    where
        G: Graph<Vertex = V>,
    {
        let search_start_time = Instant::now();
        self.stats = Stats::default();
        out_path.clear();

        let result = self.search(graph, source, destination, options, out_path);

        self.store.clear();
        if !matches!(result, Ok(true)) {
            out_path.clear();
        }
        self.stats.time_us = search_start_time.elapsed().as_micros() as u64;

        result
    }

    fn search<G>(
        &mut self,
        graph: &G,
        source: V,
        destination: &V,
        options: &SearchOptions,
        out_path: &mut Vec<V>,
    ) -> Result<bool, SearchError>
    where
        G: Graph<Vertex = V>,
    {
        self.store.clear();

        let start = self.store.create_start_node(source);
        self.store.insert_into_heap(start);
        self.stats.created_nodes += 1;

        let limit = options.limit();

        while !self.store.is_heap_empty() {
            if limit.is_some_and(|limit| self.stats.expanded_nodes >= limit) {
                debug!(
                    "expansion limit reached after {} nodes",
                    self.stats.expanded_nodes
                );
                return Ok(false);
            }

            let Some(current) = self.store.extract_min() else {
                break;
            };

            if current.color == NodeColor::Black {
                self.stats.stale_entries += 1;
                continue;
            }

            self.store.set_color(current.id, NodeColor::Black);
            self.stats.expanded_nodes += 1;
            trace!(
                "expand node: {:?} distance {} priority {} corners {}",
                current.vertex,
                current.distance_from_start,
                current.priority,
                current.corner_count
            );

            if graph.vertices_equal(&current.vertex, destination) {
                self.make_path(current.id, out_path);
                debug!(
                    "found path of {} vertices, length {}",
                    out_path.len(),
                    current.distance_from_start
                );
                return Ok(true);
            }

            self.expand(graph, &current, destination, options.max_corners)?;
        }

        debug!("cannot find path");
        Ok(false)
    }

    fn expand<G>(
        &mut self,
        graph: &G,
        current: &SearchNode<V>,
        destination: &V,
        max_corners: Option<u32>,
    ) -> Result<(), SearchError>
    where
        G: Graph<Vertex = V>,
    {
        for vertex in graph.neighbors(&current.vertex) {
            if !graph.is_passable(&vertex) {
                continue;
            }

            // Without a corner budget every vertex has a single state.
            let (last_move, corner_count) = match max_corners {
                None => (Direction::NONE, 0),
                Some(max_corners) => {
                    let last_move = graph.last_move(&vertex, &current.vertex)?;
                    let turned = graph.has_corner(&vertex, &current.vertex, current.last_move)?;
                    let corner_count = current.corner_count + u32::from(turned);
                    if corner_count > max_corners {
                        continue;
                    }
                    (last_move, corner_count)
                }
            };

            let distance = current.distance_from_start + graph.edge_length(&current.vertex, &vertex);

            let Some(id) = self.store.node_id(&vertex, last_move, corner_count) else {
                let priority = distance + graph.heuristic(&vertex, destination);
                let id = self.store.create_node(
                    vertex,
                    distance,
                    Some(current.id),
                    priority,
                    corner_count,
                    last_move,
                );
                self.store.insert_into_heap(id);
                self.stats.created_nodes += 1;
                continue;
            };

            let neighbor = self.store.node(id);
            match neighbor.color {
                NodeColor::Black => {}
                NodeColor::Gray => {
                    if distance < neighbor.distance_from_start {
                        let heuristic = graph.heuristic(&vertex, destination);
                        self.store.relax(id, current.id, distance, heuristic);
                        self.stats.relaxed_nodes += 1;
                    }
                }
                NodeColor::White => self.store.insert_into_heap(id),
            }
        }

        Ok(())
    }

    /// Walks the predecessor chain back from a finalized node.
    fn make_path(&self, to: NodeId, out_path: &mut Vec<V>) {
        out_path.clear();

        let mut node = self.store.node(to);
        if node.color != NodeColor::Black {
            return;
        }

        out_path.push(node.vertex.clone());
        while let Some(predecessor) = node.predecessor {
            node = self.store.node(predecessor);
            out_path.push(node.vertex.clone());
        }

        out_path.reverse();
    }
}

/// One-shot search with a fresh context. `Ok(None)` means no path.
pub fn find_path<G>(
    graph: &G,
    source: G::Vertex,
    destination: &G::Vertex,
    options: &SearchOptions,
) -> Result<Option<Vec<G::Vertex>>, SearchError>
where
    G: Graph,
{
    let mut path = Vec::new();
    let found = Pathfinder::new().find_path(graph, source, destination, options, &mut path)?;
    Ok(found.then_some(path))
}
