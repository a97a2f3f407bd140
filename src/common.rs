/// Identity of a search node, dense and unique within one search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Movement direction code reported by a graph. `Direction::NONE` means no
/// move has been made yet (the search source).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Direction(pub u32);

impl Direction {
    pub const NONE: Direction = Direction(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// Algorithmic status of a search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeColor {
    /// Not yet discovered.
    White,
    /// Discovered and queued in the open set.
    Gray,
    /// Finalized.
    Black,
}
