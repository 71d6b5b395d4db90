use nfg_lite::game::{NormalFormGame, Player};
use optimizers::{ConstraintSense, LinearProgram, ModelSense, VarId, INFINITY};

use std::ops::Range;

/// ===============================================================================================
/// Minimax linear program of one player, with A the payoff matrix of Player 1.
///
/// Player 1 (rows, maximizer):
///   max_{v,x} v
///   sum_i A[i][j] x_i - v >= 0   for every column j ------(A)
///   sum_i x_i = 1, ---------------------------------------(B)
///   x >= 0, v free.
///
/// Player 2 (columns, minimizer):
///   min_{v,y} v
///   sum_j A[i][j] y_j - v <= 0   for every row i ---------(A)
///   sum_j y_j = 1, ---------------------------------------(B)
///   y >= 0, v free.
///
/// Both programs read the same matrix with the same sign, only the objective and the
/// direction of (A) differ. At the optimum v is the value of the game to Player 1.
/// ===============================================================================================
/// The numbering we use for variables is
///
/// Game value (v): 0
/// Strategy of the solving player (x or y): [1, 1 + n), n = number of pure strategies.
/// ================================================================================================
#[derive(Debug, Clone)]
pub struct MinimaxProgram {
    lp: LinearProgram,
    player: Player,
    game_value: VarId,
    strategy_vars: Range<VarId>,
}

impl MinimaxProgram {
    pub fn new(game: &NormalFormGame, player: Player) -> MinimaxProgram {
        let mut lp = LinearProgram::new();
        let (game_value, strategy_vars) = Self::make_variables(&mut lp, game, player);
        let mut program = MinimaxProgram {
            lp,
            player,
            game_value,
            strategy_vars,
        };
        program.make_constraints_per_opponent_strategy(game);
        program.make_simplex_constraint();
        program.set_model_sense();
        program
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn lp(&self) -> &LinearProgram {
        &self.lp
    }

    pub fn game_value_var(&self) -> VarId {
        self.game_value
    }

    pub fn strategy_vars(&self) -> Range<VarId> {
        self.strategy_vars.clone()
    }

    fn make_variables(
        lp: &mut LinearProgram,
        game: &NormalFormGame,
        player: Player,
    ) -> (VarId, Range<VarId>) {
        // A negative game value must stay representable.
        let game_value = lp.add_var(-INFINITY, INFINITY, 1.0, "game_value");
        let prefix = match player {
            Player::Player1 => "pl1_strategy",
            Player::Player2 => "pl2_strategy",
        };
        let strategy_vars = lp.add_vars(
            game.num_pure_strategies(player),
            0.0,
            INFINITY,
            0.0,
            prefix,
        );
        (game_value, strategy_vars)
    }

    /// Constraints (A), one per pure strategy of the opponent.
    fn make_constraints_per_opponent_strategy(&mut self, game: &NormalFormGame) {
        let opponent = -self.player;
        let sense = match self.player {
            Player::Player1 => ConstraintSense::GreaterEqual,
            Player::Player2 => ConstraintSense::LessEqual,
        };

        for opponent_strategy in 0..game.num_pure_strategies(opponent) {
            let mut col_indices = Vec::<VarId>::with_capacity(self.strategy_vars.len() + 1);
            let mut col_coeffs = Vec::<f64>::with_capacity(self.strategy_vars.len() + 1);
            for (own_strategy, var) in self.strategy_vars.clone().enumerate() {
                let utility = match self.player {
                    Player::Player1 => game.utility(own_strategy, opponent_strategy),
                    Player::Player2 => game.utility(opponent_strategy, own_strategy),
                };
                if utility != 0.0 {
                    col_indices.push(var);
                    col_coeffs.push(utility);
                }
            }
            col_indices.push(self.game_value);
            col_coeffs.push(-1.0);

            self.lp.add_constr(
                col_indices,
                col_coeffs,
                sense,
                0.0,
                &format!("best_response_{}", opponent_strategy),
            );
        }
    }

    /// Constraint (B)
    fn make_simplex_constraint(&mut self) {
        let col_indices = self.strategy_vars.clone().collect::<Vec<VarId>>();
        let col_coeffs = vec![1.0; col_indices.len()];
        self.lp.add_constr(
            col_indices,
            col_coeffs,
            ConstraintSense::Equal,
            1.0,
            "probability_simplex",
        );
    }

    fn set_model_sense(&mut self) {
        let sense = match self.player.is_maximizer() {
            true => ModelSense::Maximize,
            false => ModelSense::Minimize,
        };
        self.lp.set_model_sense(sense);
    }
}
