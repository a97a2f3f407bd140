use thiserror::Error;

/// Failures that abort a search. Not finding a path is not an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The graph was asked for the direction of a step between two vertices
    /// that are not adjacent under its movement model.
    #[error("no move leads from {predecessor} to {vertex}: vertices are not adjacent")]
    NotAdjacent { vertex: String, predecessor: String },
}

impl SearchError {
    pub fn not_adjacent(vertex: &impl std::fmt::Debug, predecessor: &impl std::fmt::Debug) -> Self {
        SearchError::NotAdjacent {
            vertex: format!("{vertex:?}"),
            predecessor: format!("{predecessor:?}"),
        }
    }
}
