use crate::game_tree::SimultaneousGameVertex;
use nfg_lite::game::{NormalFormGame, Player};
use nfg_lite::schema::GameDescription;
use nfg_lite::GameResult;

/// Per-step actions of each player, in the order used to number pure strategies.
#[derive(Debug, Clone)]
pub struct GameAnnotations<T: SimultaneousGameVertex> {
    pub actions_pl1: Vec<T::Action>,
    pub actions_pl2: Vec<T::Action>,
}

impl<T> GameAnnotations<T>
where
    T: SimultaneousGameVertex,
{
    pub fn new(actions_pl1: Vec<T::Action>, actions_pl2: Vec<T::Action>) -> GameAnnotations<T> {
        GameAnnotations {
            actions_pl1,
            actions_pl2,
        }
    }

    pub fn actions(&self, player: Player) -> &[T::Action] {
        match player {
            Player::Player1 => &self.actions_pl1,
            Player::Player2 => &self.actions_pl2,
        }
    }

    /// Action names as written to game files (the `Debug` form of each action).
    pub fn action_names(&self, player: Player) -> Vec<String> {
        self.actions(player)
            .iter()
            .map(|action| format!("{:?}", action))
            .collect()
    }

    /// Actions taken at each step by `player`'s pure strategy `index`.
    pub fn pure_strategy_actions(
        &self,
        game: &NormalFormGame,
        player: Player,
        index: usize,
    ) -> Option<Vec<T::Action>> {
        let sequence = game.action_space(player).decode(index)?;
        Some(
            sequence
                .into_iter()
                .map(|action| self.actions(player)[action].clone())
                .collect(),
        )
    }

    pub fn to_description(&self, game: &NormalFormGame) -> GameResult<GameDescription> {
        GameDescription::new(
            game,
            self.action_names(Player::Player1),
            self.action_names(Player::Player2),
        )
    }
}
