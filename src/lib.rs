//! A* search over caller-supplied graphs, with an optional bound on the
//! number of direction changes ("corners") along the path.
//!
//! The engine ([`Pathfinder`]) works on any [`Graph`]; [`map::Map`] is a
//! grid implementation used by the command-line driver and the tests.

pub mod common;
pub mod config;
pub mod error;
pub mod graph;
pub mod heap;
pub mod map;
pub mod pathfinder;
pub mod stat;
pub mod store;

pub use common::{Direction, NodeColor, NodeId};
pub use error::SearchError;
pub use graph::{Graph, IMPASSABLE};
pub use heap::{Handle, IndexedHeap};
pub use pathfinder::{find_path, Pathfinder, SearchOptions};
pub use store::{SearchNode, SearchNodeStore};
