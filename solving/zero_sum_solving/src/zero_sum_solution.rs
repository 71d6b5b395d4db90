use crate::formulation::MinimaxProgram;
use nfg_lite::game::Player;
use nfg_lite::strategy::MixedStrategy;
use optimizers::Solution;

use log::error;
use std::fmt;

/// Optimal strategy of one player together with the value of the game.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroSumSolution {
    pub player: Player,
    pub strategy: MixedStrategy,
    /// Value of the game to Player 1.
    pub game_value: f64,
}

impl ZeroSumSolution {
    pub fn new(player: Player, strategy: MixedStrategy, game_value: f64) -> ZeroSumSolution {
        ZeroSumSolution {
            player,
            strategy,
            game_value,
        }
    }

    /// Reads the solving player's strategy out of an optimal assignment of `program`.
    /// Probabilities at or below `support_threshold` are dropped and the rest rescaled.
    pub fn extract(
        program: &MinimaxProgram,
        solution: &Solution,
        support_threshold: f64,
    ) -> Option<ZeroSumSolution> {
        if !solution.is_optimal() {
            error!(
                "No strategy for {}: solver finished with status {:?}",
                program.player(),
                solution.status
            );
            return None;
        }

        let probabilities = &solution.x[program.strategy_vars()];
        let strategy = match MixedStrategy::from_dense(probabilities, support_threshold) {
            Some(strategy) => strategy,
            None => {
                error!(
                    "No strategy for {}: optimal assignment has no probability mass",
                    program.player()
                );
                return None;
            }
        };

        Some(ZeroSumSolution::new(
            program.player(),
            strategy,
            solution.objective_value,
        ))
    }

    /// Value of the game to the solving player.
    pub fn player_value(&self) -> f64 {
        match self.player {
            Player::Player1 => self.game_value,
            Player::Player2 => -self.game_value,
        }
    }
}

impl fmt::Display for ZeroSumSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} value {:.6}, strategy {}",
            self.player,
            self.player_value(),
            self.strategy
        )
    }
}
