use crate::actions::ActionSpace;
use crate::error::{GameError, GameResult};
use crate::game::{NormalFormGame, PayoffEntry, PayoffMatrix, Player};

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Names of the actions available to a player at each step. Either a plain list, or a
/// map from action index to name whose keys must be exactly `0..len`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionNames {
    List(Vec<String>),
    Map(BTreeMap<usize, String>),
}

impl ActionNames {
    pub fn to_vec(&self) -> GameResult<Vec<String>> {
        match self {
            ActionNames::List(names) => Ok(names.clone()),
            ActionNames::Map(names) => {
                if names.keys().enumerate().any(|(expected, &key)| expected != key) {
                    return Err(GameError::InvalidConfiguration(
                        "action name keys must be 0, 1, ..., n-1".to_string(),
                    ));
                }
                Ok(names.values().cloned().collect())
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ActionNames::List(names) => names.len(),
            ActionNames::Map(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// On-disk (YAML) description of a game, as written by the game generators and read by
/// the solver front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDescription {
    pub game_step: usize,
    pub p1_actions: ActionNames,
    pub p2_actions: ActionNames,
    pub payoff_matrix: Vec<Vec<PayoffEntry>>,
}

impl GameDescription {
    pub fn new(
        game: &NormalFormGame,
        p1_actions: Vec<String>,
        p2_actions: Vec<String>,
    ) -> GameResult<GameDescription> {
        for (player, names) in [(Player::Player1, &p1_actions), (Player::Player2, &p2_actions)].iter() {
            if names.len() != game.num_actions(*player) {
                return Err(GameError::InvalidConfiguration(format!(
                    "{} has {} actions but {} names were given",
                    player,
                    game.num_actions(*player),
                    names.len()
                )));
            }
        }
        Ok(GameDescription {
            game_step: game.game_step(),
            p1_actions: ActionNames::List(p1_actions),
            p2_actions: ActionNames::List(p2_actions),
            payoff_matrix: game.payoff_matrix().to_entry_rows(),
        })
    }

    pub fn from_reader<R>(reader: R) -> GameResult<GameDescription>
    where
        R: std::io::Read,
    {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> GameResult<GameDescription> {
        debug!("Loading game from {:?}", path.as_ref());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn persist<W>(&self, writer: &mut W) -> GameResult<()>
    where
        W: std::io::Write,
    {
        Ok(serde_yaml::to_writer(writer, self)?)
    }

    pub fn action_names(&self, player: Player) -> GameResult<Vec<String>> {
        match player {
            Player::Player1 => self.p1_actions.to_vec(),
            Player::Player2 => self.p2_actions.to_vec(),
        }
    }

    /// Validates the description and builds the game. The number of per-step actions of
    /// each player is the number of action names.
    pub fn to_game(&self) -> GameResult<NormalFormGame> {
        let num_actions_pl1 = self.action_names(Player::Player1)?.len();
        let num_actions_pl2 = self.action_names(Player::Player2)?.len();
        let payoff_matrix = PayoffMatrix::from_entry_rows(self.payoff_matrix.clone())?;
        NormalFormGame::new(self.game_step, num_actions_pl1, num_actions_pl2, payoff_matrix)
    }

    /// Human-readable action sequence of `player`'s pure strategy `index`, e.g.,
    /// "up -> up -> left". `None` if the index is out of range.
    pub fn describe_pure_strategy(&self, player: Player, index: usize) -> Option<String> {
        let names = self.action_names(player).ok()?;
        let action_space = ActionSpace::new(names.len(), self.game_step).ok()?;
        let sequence = action_space.decode(index)?;
        Some(
            sequence
                .iter()
                .map(|&action| names[action].as_str())
                .collect::<Vec<_>>()
                .join(" -> "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const MATCHING_PENNIES: &str = "
game_step: 1
p1_actions:
  0: heads
  1: tails
p2_actions: [heads, tails]
payoff_matrix:
  - [1, -1]
  - [-1, 1]
";

    #[test]
    fn parse_real_game() {
        let description = GameDescription::from_reader(MATCHING_PENNIES.as_bytes()).unwrap();
        assert_eq!(
            description.action_names(Player::Player1).unwrap(),
            vec!["heads".to_string(), "tails".to_string()]
        );
        let game = description.to_game().unwrap();
        assert_eq!(game.num_pure_strategies(Player::Player2), 2);
        assert!(!game.payoff_matrix().is_outcome_encoded());
        assert_approx_eq!(game.utility(1, 0), -1.0);
    }

    #[test]
    fn parse_outcome_game() {
        let text = "
game_step: 2
p1_actions: [left, right]
p2_actions: [stay]
payoff_matrix: [[true], [false], [false], [true]]
";
        let description = GameDescription::from_reader(text.as_bytes()).unwrap();
        let game = description.to_game().unwrap();
        assert!(game.payoff_matrix().is_outcome_encoded());
        assert_approx_eq!(game.utility(1, 0), -1.0);
        assert_eq!(
            description.describe_pure_strategy(Player::Player1, 2),
            Some("right -> left".to_string())
        );
        assert_eq!(
            description.describe_pure_strategy(Player::Player2, 0),
            Some("stay -> stay".to_string())
        );
        assert_eq!(description.describe_pure_strategy(Player::Player1, 4), None);
    }

    #[test]
    fn non_finite_payoffs_are_rejected() {
        for payoff in &[".inf", "-.inf", ".nan"] {
            let text = format!(
                "
game_step: 1
p1_actions: [a, b]
p2_actions: [c, d]
payoff_matrix: [[{}, 1], [0, 1]]
",
                payoff
            );
            let description = GameDescription::from_reader(text.as_bytes()).unwrap();
            assert!(matches!(
                description.to_game(),
                Err(GameError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let text = "
game_step: 2
p1_actions: [a, b]
p2_actions: [c, d]
payoff_matrix: [[1, 2], [3, 4]]
";
        let description = GameDescription::from_reader(text.as_bytes()).unwrap();
        assert!(matches!(
            description.to_game(),
            Err(GameError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn non_contiguous_names_are_rejected() {
        let text = "
game_step: 1
p1_actions: {0: a, 2: b}
p2_actions: [c]
payoff_matrix: [[1], [2]]
";
        let description = GameDescription::from_reader(text.as_bytes()).unwrap();
        assert!(matches!(
            description.to_game(),
            Err(GameError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn persist_and_reload() {
        let game = NormalFormGame::from_real_rows(vec![vec![0.5, -2.0]]).unwrap();
        let description =
            GameDescription::new(&game, vec!["only".to_string()], vec!["x".into(), "y".into()])
                .unwrap();

        let mut buffer = Vec::<u8>::new();
        description.persist(&mut buffer).unwrap();
        let reloaded = GameDescription::from_reader(&buffer[..]).unwrap();
        assert_eq!(reloaded, description);
        assert_approx_eq!(reloaded.to_game().unwrap().utility(0, 1), -2.0);
    }

    #[test]
    fn names_must_match_action_counts() {
        let game = NormalFormGame::from_real_rows(vec![vec![0.5, -2.0]]).unwrap();
        assert!(GameDescription::new(&game, vec![], vec!["x".into(), "y".into()]).is_err());
    }
}
