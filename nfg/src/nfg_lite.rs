#[macro_use]
extern crate approx;

pub mod actions;
pub mod error;
pub mod game;
pub mod schema;
pub mod strategy;

pub use self::error::{GameError, GameResult};
