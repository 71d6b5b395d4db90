use std::fmt;
use std::ops::Neg;

/// Player 1 picks rows and maximizes, Player 2 picks columns and minimizes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, PartialOrd)]
pub enum Player {
    Player1,
    Player2,
}

impl Player {
    pub fn is_maximizer(self) -> bool {
        self == Player::Player1
    }
}

impl Neg for Player {
    type Output = Player;
    fn neg(self) -> Self::Output {
        match self {
            Player::Player1 => Player::Player2,
            Player::Player2 => Player::Player1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Player1 => write!(f, "Player 1"),
            Player::Player2 => write!(f, "Player 2"),
        }
    }
}
