use std::fmt::Debug;
use std::hash::Hash;

use crate::common::Direction;
use crate::error::SearchError;

/// Edge length reported for pairs of vertices that cannot be traversed.
pub const IMPASSABLE: f64 = f64::MAX;

/// Everything the search engine needs to know about a graph.
///
/// Implementations must keep the neighbor relation symmetric and report
/// finite lengths for every edge they enumerate; the engine gives no
/// guarantees otherwise. The graph is only read during a search.
pub trait Graph {
    type Vertex: Clone + Eq + Hash + Debug;

    /// Adjacent vertices, passable or not.
    fn neighbors(&self, vertex: &Self::Vertex) -> impl Iterator<Item = Self::Vertex> + '_;

    fn vertices_equal(&self, first: &Self::Vertex, second: &Self::Vertex) -> bool {
        first == second
    }

    /// Cost of the step `start -> end`, or [`IMPASSABLE`] if there is no
    /// such step.
    fn edge_length(&self, start: &Self::Vertex, end: &Self::Vertex) -> f64;

    fn is_passable(&self, vertex: &Self::Vertex) -> bool;

    /// Estimate of the remaining cost. Paths are optimal only if it never
    /// overestimates.
    fn heuristic(&self, source: &Self::Vertex, destination: &Self::Vertex) -> f64;

    /// Direction of the step `predecessor -> vertex`. Never
    /// [`Direction::NONE`].
    fn last_move(
        &self,
        vertex: &Self::Vertex,
        predecessor: &Self::Vertex,
    ) -> Result<Direction, SearchError>;

    /// Whether stepping `predecessor -> vertex` turns away from
    /// `predecessor_last_move`. There is no turn before the first move.
    fn has_corner(
        &self,
        vertex: &Self::Vertex,
        predecessor: &Self::Vertex,
        predecessor_last_move: Direction,
    ) -> Result<bool, SearchError> {
        if predecessor_last_move.is_none() {
            return Ok(false);
        }
        Ok(self.last_move(vertex, predecessor)? != predecessor_last_move)
    }
}
