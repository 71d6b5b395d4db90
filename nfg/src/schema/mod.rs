mod game_file;

pub use self::game_file::{ActionNames, GameDescription};
