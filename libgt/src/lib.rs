// (LIB)rary for (G)ame (T)rees.
// Stepped simultaneous-move games are described implicitly through `SimultaneousGameVertex`
// and flattened into normal form, where a pure strategy is a fixed sequence of actions,
// one per step.

extern crate nfg_lite;

pub mod game_tree;
pub mod normal_form;

pub use game_tree::{Leaf, SimultaneousGameVertex, VertexOrLeaf};
pub use normal_form::{GameAnnotations, NormalFormGameBuilder};
