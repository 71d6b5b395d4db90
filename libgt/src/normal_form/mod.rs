mod annotations;
mod builder;

pub use annotations::GameAnnotations;
pub use builder::NormalFormGameBuilder;
