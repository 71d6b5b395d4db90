mod action_space;

pub use self::action_space::{checked_num_sequences, ActionSequence, ActionSpace, Sequences};
