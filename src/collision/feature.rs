/// Identifies one edge of a box.
///
/// Edges are numbered counter-clockwise from the top face, in the box's
/// local frame:
///
/// ```text
///         ^ y
///         |
///         e1
///    v2 ------ v1
///     |        |
///  e2 |        | e4  --> x
///     |        |
///    v3 ------ v4
///         e3
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum EdgeId {
    #[default]
    None,
    E1,
    E2,
    E3,
    E4,
}

/// Which box edges produced a contact point.
///
/// Only equality matters: two contacts from consecutive frames with the same
/// feature pair are treated as the same physical contact when carrying over
/// accumulated impulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeaturePair {
    pub in_edge1: EdgeId,
    pub out_edge1: EdgeId,
    pub in_edge2: EdgeId,
    pub out_edge2: EdgeId,
}

impl FeaturePair {
    /// Creates a feature pair from its four edge ids
    pub const fn new(in_edge1: EdgeId, out_edge1: EdgeId, in_edge2: EdgeId, out_edge2: EdgeId) -> Self {
        Self { in_edge1, out_edge1, in_edge2, out_edge2 }
    }

    /// Swaps the roles of the two boxes
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.in_edge1, &mut self.in_edge2);
        std::mem::swap(&mut self.out_edge1, &mut self.out_edge2);
    }

    /// Returns a copy with the roles of the two boxes swapped
    pub fn flipped(mut self) -> Self {
        self.flip();
        self
    }
}
