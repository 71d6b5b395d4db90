use crate::actions::{checked_num_sequences, ActionSpace};
use crate::error::{GameError, GameResult};
use crate::game::{PayoffMatrix, Player};
use crate::strategy::MixedStrategy;

/// A two-player zero-sum game in normal form.
///
/// Multi-step games are handled by treating each player's full sequence of per-step
/// actions as one pure strategy, so Player i has `num_actions_pli^game_step` pure
/// strategies. The payoff matrix holds Player 1's utilities with rows indexed by Player
/// 1's pure strategies; Player 2's utilities are their negation.
///
/// The game is immutable once constructed. All shape checks happen in `new`.
#[derive(Debug, Clone)]
pub struct NormalFormGame {
    game_step: usize,
    num_actions_pl1: usize,
    num_actions_pl2: usize,
    num_pure_strategies_pl1: usize,
    num_pure_strategies_pl2: usize,
    payoff_matrix: PayoffMatrix,
}

impl NormalFormGame {
    pub fn new(
        game_step: usize,
        num_actions_pl1: usize,
        num_actions_pl2: usize,
        payoff_matrix: PayoffMatrix,
    ) -> GameResult<NormalFormGame> {
        let num_pure_strategies_pl1 = checked_num_sequences(num_actions_pl1, game_step)?;
        let num_pure_strategies_pl2 = checked_num_sequences(num_actions_pl2, game_step)?;

        let (rows, cols) = payoff_matrix.shape();
        if rows != num_pure_strategies_pl1 || cols != num_pure_strategies_pl2 {
            return Err(GameError::ShapeMismatch {
                rows,
                cols,
                expected_rows: num_pure_strategies_pl1,
                expected_cols: num_pure_strategies_pl2,
            });
        }

        Ok(NormalFormGame {
            game_step,
            num_actions_pl1,
            num_actions_pl2,
            num_pure_strategies_pl1,
            num_pure_strategies_pl2,
            payoff_matrix,
        })
    }

    /// Single-step game directly from a matrix of Player 1's utilities.
    pub fn from_real_rows(rows: Vec<Vec<f64>>) -> GameResult<NormalFormGame> {
        let payoff_matrix = PayoffMatrix::from_real_rows(rows)?;
        let (num_rows, num_cols) = payoff_matrix.shape();
        NormalFormGame::new(1, num_rows, num_cols, payoff_matrix)
    }

    pub fn game_step(&self) -> usize {
        self.game_step
    }

    /// Number of actions available to `player` at each step.
    pub fn num_actions(&self, player: Player) -> usize {
        match player {
            Player::Player1 => self.num_actions_pl1,
            Player::Player2 => self.num_actions_pl2,
        }
    }

    pub fn num_pure_strategies(&self, player: Player) -> usize {
        match player {
            Player::Player1 => self.num_pure_strategies_pl1,
            Player::Player2 => self.num_pure_strategies_pl2,
        }
    }

    pub fn payoff_matrix(&self) -> &PayoffMatrix {
        &self.payoff_matrix
    }

    pub fn action_space(&self, player: Player) -> ActionSpace {
        // Counts were validated in `new`, so this cannot fail.
        ActionSpace::new(self.num_actions(player), self.game_step)
            .unwrap_or_else(|err| panic!("validated action space rejected: {}", err))
    }

    /// Player 1's utility for the pure strategy profile (`pure_pl1`, `pure_pl2`).
    pub fn utility(&self, pure_pl1: usize, pure_pl2: usize) -> f64 {
        self.payoff_matrix.utility(pure_pl1, pure_pl2)
    }

    /// Expected payoff to `player` of each of its pure strategies, when the other
    /// player plays `opponent_strategy`. In matrix form, with A being Player 1's payoff
    /// matrix, this is A y for Player 1 and -A^T x for Player 2.
    pub fn gradient(&self, player: Player, opponent_strategy: &MixedStrategy) -> Vec<f64> {
        assert_eq!(
            opponent_strategy.num_pure_strategies(),
            self.num_pure_strategies(-player)
        );
        match player {
            Player::Player1 => (0..self.num_pure_strategies_pl1)
                .map(|row| {
                    opponent_strategy
                        .iter()
                        .map(|(col, prob)| prob * self.utility(row, col))
                        .sum()
                })
                .collect(),
            Player::Player2 => (0..self.num_pure_strategies_pl2)
                .map(|col| {
                    -opponent_strategy
                        .iter()
                        .map(|(row, prob)| prob * self.utility(row, col))
                        .sum::<f64>()
                })
                .collect(),
        }
    }

    /// Payoff to `player` of its best response against `opponent_strategy`.
    pub fn best_response_value(&self, player: Player, opponent_strategy: &MixedStrategy) -> f64 {
        self.gradient(player, opponent_strategy)
            .into_iter()
            .fold(-std::f64::INFINITY, f64::max)
    }

    /// Expected payoff to `player` under the profile (`strategy_pl1`, `strategy_pl2`).
    pub fn evaluate_payoffs(
        &self,
        strategy_pl1: &MixedStrategy,
        strategy_pl2: &MixedStrategy,
        player: Player,
    ) -> f64 {
        let gradient = self.gradient(Player::Player1, strategy_pl2);
        let payoff_pl1 = strategy_pl1
            .iter()
            .map(|(row, prob)| prob * gradient[row])
            .sum::<f64>();
        match player {
            Player::Player1 => payoff_pl1,
            Player::Player2 => -payoff_pl1,
        }
    }

    /// Sum of what each player could gain by deviating to a best response. Non-negative,
    /// and zero exactly when the profile is a Nash equilibrium.
    pub fn exploitability(
        &self,
        strategy_pl1: &MixedStrategy,
        strategy_pl2: &MixedStrategy,
    ) -> f64 {
        self.best_response_value(Player::Player1, strategy_pl2)
            + self.best_response_value(Player::Player2, strategy_pl1)
    }
}
