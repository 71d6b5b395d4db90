mod mixed_strategy;

pub use mixed_strategy::{MixedStrategy, SUPPORT_THRESHOLD};
