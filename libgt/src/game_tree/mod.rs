/// Defines the main components used to specify a stepped simultaneous-move game.

mod vertex;

pub use vertex::Leaf;
pub use vertex::SimultaneousGameVertex;
pub use vertex::VertexOrLeaf;
