mod normal_form_game;
mod payoff;
mod player;

pub use self::normal_form_game::NormalFormGame;
pub use self::payoff::{PayoffEntries, PayoffEntry, PayoffMatrix};
pub use self::player::Player;
