//! Nash equilibria of two-player zero-sum games in normal form, computed by solving
//! each player's minimax linear program.

#[macro_use]
extern crate approx;

pub mod formulation;
pub mod simplex_solver;
pub mod solver;
pub mod zero_sum_solution;

pub use crate::formulation::MinimaxProgram;
pub use crate::simplex_solver::SimplexSolver;
pub use crate::solver::{Solver, SolverConfig};
pub use crate::zero_sum_solution::ZeroSumSolution;

use log::{info, warn};
use nfg_lite::game::{NormalFormGame, Player};

/// Tolerance when comparing the game values found by the two programs.
const VALUE_AGREEMENT: f64 = 1e-6;

/// Equilibrium strategies of both players. A side is `None` if its program could not be
/// solved to optimality.
#[derive(Debug, Clone)]
pub struct EquilibriumPair {
    pub pl1: Option<ZeroSumSolution>,
    pub pl2: Option<ZeroSumSolution>,
}

impl EquilibriumPair {
    pub fn get(&self, player: Player) -> Option<&ZeroSumSolution> {
        match player {
            Player::Player1 => self.pl1.as_ref(),
            Player::Player2 => self.pl2.as_ref(),
        }
    }

    /// Value of the game to Player 1, if both sides were solved.
    pub fn game_value(&self) -> Option<f64> {
        match (&self.pl1, &self.pl2) {
            (Some(pl1), Some(_)) => Some(pl1.game_value),
            _ => None,
        }
    }
}

fn solve_player(
    game: &NormalFormGame,
    player: Player,
    config: &SolverConfig,
) -> Option<ZeroSumSolution> {
    let mut solver = SimplexSolver::new(game, player, config);
    solver.solve();
    solver.get_solution()
}

/// Solves the minimax programs of both players. The two programs are independent, so with
/// `config.parallel` they are solved concurrently on the rayon pool.
pub fn solve_game(game: &NormalFormGame, config: &SolverConfig) -> EquilibriumPair {
    info!(
        "Solving game with {} x {} pure strategies",
        game.num_pure_strategies(Player::Player1),
        game.num_pure_strategies(Player::Player2)
    );

    let (pl1, pl2) = match config.parallel {
        true => rayon::join(
            || solve_player(game, Player::Player1, config),
            || solve_player(game, Player::Player2, config),
        ),
        false => (
            solve_player(game, Player::Player1, config),
            solve_player(game, Player::Player2, config),
        ),
    };

    if let (Some(pl1), Some(pl2)) = (&pl1, &pl2) {
        if !abs_diff_eq!(pl1.game_value, pl2.game_value, epsilon = VALUE_AGREEMENT) {
            warn!(
                "Game values disagree: {} for Player 1, {} for Player 2",
                pl1.game_value, pl2.game_value
            );
        }
    }

    EquilibriumPair { pl1, pl2 }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::*;
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use nfg_lite::game::PayoffMatrix;
    use nfg_lite::schema::GameDescription;
    use nfg_lite::strategy::MixedStrategy;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;
    use std::path::Path;

    fn solve_both(game: &NormalFormGame) -> (ZeroSumSolution, ZeroSumSolution) {
        let pair = solve_game(game, &SolverConfig::default());
        (pair.pl1.unwrap(), pair.pl2.unwrap())
    }

    fn assert_valid(solved: &ZeroSumSolution) {
        solved.strategy.validate();
        assert!(solved.strategy.iter().all(|(_, prob)| prob >= 0.0));
        assert_approx_eq!(solved.strategy.total_mass(), 1.0);
    }

    #[test]
    fn matching_pennies() {
        for game in &[&*MATCHING_PENNIES, &*MATCHING_PENNIES_OUTCOMES] {
            let (pl1, pl2) = solve_both(game);
            for solved in &[&pl1, &pl2] {
                assert_valid(solved);
                assert_eq!(solved.strategy.support_size(), 2);
                assert_approx_eq!(solved.strategy.probability(0), 0.5);
                assert_approx_eq!(solved.strategy.probability(1), 0.5);
                assert_approx_eq!(solved.game_value, 0.0);
            }
        }
    }

    #[test]
    fn outcome_encoding_agrees_for_both_players() {
        // Player 1 wins unless it plays its second action against Player 2's first.
        let game = NormalFormGame::new(
            1,
            2,
            2,
            PayoffMatrix::from_outcome_rows(vec![vec![true, false], vec![false, false]])
                .unwrap(),
        )
        .unwrap();
        let (pl1, pl2) = solve_both(&game);
        assert_approx_eq!(pl1.game_value, pl2.game_value);
        assert_approx_eq!(pl1.player_value(), -pl2.player_value());
        assert_approx_eq!(game.exploitability(&pl1.strategy, &pl2.strategy), 0.0);
    }

    #[test]
    fn rock_paper_scissors() {
        let (pl1, pl2) = solve_both(&*ROCK_PAPER_SCISSORS);
        let uniform = MixedStrategy::uniform(3);
        assert!(pl1.strategy.max_difference(&uniform) < 1e-6);
        assert!(pl2.strategy.max_difference(&uniform) < 1e-6);
        assert_approx_eq!(pl1.game_value, 0.0);
    }

    #[test]
    fn asymmetric_equilibrium() {
        let (pl1, pl2) = solve_both(&*MASSEY);
        assert_approx_eq!(pl1.game_value, 1.0 / 12.0);
        assert_approx_eq!(pl2.player_value(), -1.0 / 12.0);
        assert_approx_eq!(pl1.strategy.probability(0), 1.0 / 4.0);
        assert_approx_eq!(pl1.strategy.probability(1), 1.0 / 3.0);
        assert_approx_eq!(pl1.strategy.probability(2), 5.0 / 12.0);
        assert_approx_eq!(pl2.strategy.probability(0), 1.0 / 3.0);
        assert_approx_eq!(pl2.strategy.probability(1), 1.0 / 4.0);
        assert_approx_eq!(pl2.strategy.probability(2), 5.0 / 12.0);
    }

    #[test]
    fn negative_game_value() {
        let game = NormalFormGame::from_real_rows(vec![vec![-3.0, -1.0], vec![-2.0, -4.0]])
            .unwrap();
        let (pl1, pl2) = solve_both(&game);
        // Player 1 mixes (1/2, 1/2), Player 2 mixes (3/4, 1/4).
        assert_approx_eq!(pl1.game_value, -2.5);
        assert_approx_eq!(pl2.game_value, -2.5);
        assert_approx_eq!(pl1.strategy.probability(0), 0.5);
        assert_approx_eq!(pl2.strategy.probability(0), 0.75);
    }

    #[test]
    fn dominant_strategy() {
        let game = NormalFormGame::from_real_rows(vec![vec![2.0, 3.0], vec![0.0, 1.0]]).unwrap();
        let (pl1, pl2) = solve_both(&game);
        assert!(pl1.strategy.is_pure());
        assert_approx_eq!(pl1.strategy.probability(0), 1.0);
        assert!(pl2.strategy.is_pure());
        assert_approx_eq!(pl2.strategy.probability(0), 1.0);
        assert_approx_eq!(pl1.game_value, 2.0);
    }

    #[test]
    fn two_step_game() {
        // Player 1 wins iff both of its actions match Player 2's.
        let game = NormalFormGame::new(
            2,
            2,
            2,
            PayoffMatrix::from_outcome_rows(
                (0..4)
                    .map(|row| (0..4).map(|col| row == col).collect())
                    .collect(),
            )
            .unwrap(),
        )
        .unwrap();
        let (pl1, pl2) = solve_both(&game);
        assert_approx_eq!(pl1.game_value, -0.5);
        assert_approx_eq!(pl2.game_value, -0.5);
        let uniform = MixedStrategy::uniform(4);
        assert!(pl2.strategy.max_difference(&uniform) < 1e-6);
        assert_approx_eq!(game.exploitability(&pl1.strategy, &pl2.strategy), 0.0);
    }

    #[test]
    fn random_games_reach_equilibrium() {
        let mut rng = ChaChaRng::seed_from_u64(0);
        for _ in 0..20 {
            let num_rows = rng.gen_range(1, 9);
            let num_cols = rng.gen_range(1, 9);
            let rows = (0..num_rows)
                .map(|_| (0..num_cols).map(|_| rng.gen_range(-5.0, 5.0)).collect())
                .collect();
            let game = NormalFormGame::from_real_rows(rows).unwrap();
            let (pl1, pl2) = solve_both(&game);

            assert_valid(&pl1);
            assert_valid(&pl2);
            assert_approx_eq!(pl1.game_value, pl2.game_value, 1e-6);
            assert_approx_eq!(pl1.player_value(), -pl2.player_value(), 1e-6);
            assert_approx_eq!(
                game.evaluate_payoffs(&pl1.strategy, &pl2.strategy, Player::Player1),
                pl1.game_value,
                1e-6
            );
            assert!(game.exploitability(&pl1.strategy, &pl2.strategy) < 1e-6);
        }
    }

    #[test]
    fn random_outcome_games_reach_equilibrium() {
        let mut rng = ChaChaRng::seed_from_u64(7);
        for _ in 0..10 {
            let rows = (0..6)
                .map(|_| (0..5).map(|_| rng.gen_bool(0.5)).collect())
                .collect();
            let game = NormalFormGame::new(
                1,
                6,
                5,
                PayoffMatrix::from_outcome_rows(rows).unwrap(),
            )
            .unwrap();
            let (pl1, pl2) = solve_both(&game);
            assert_approx_eq!(pl1.game_value, pl2.game_value, 1e-6);
            assert!(game.exploitability(&pl1.strategy, &pl2.strategy) < 1e-6);
        }
    }

    fn random_square_game(size: usize, seed: u64, outcomes: bool) -> NormalFormGame {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        let payoff_matrix = match outcomes {
            true => PayoffMatrix::from_outcome_rows(
                (0..size)
                    .map(|_| (0..size).map(|_| rng.gen_bool(0.5)).collect())
                    .collect(),
            ),
            false => PayoffMatrix::from_real_rows(
                (0..size)
                    .map(|_| (0..size).map(|_| rng.gen_range(-1.0, 1.0)).collect())
                    .collect(),
            ),
        };
        NormalFormGame::new(1, size, size, payoff_matrix.unwrap()).unwrap()
    }

    #[test]
    fn large_games_reach_equilibrium() {
        for &(size, seed, outcomes) in &[
            (128, 1, true),
            (128, 2, true),
            (160, 3, true),
            (160, 3, false),
            (200, 4, true),
            (256, 5, true),
        ] {
            let game = random_square_game(size, seed, outcomes);
            let (pl1, pl2) = solve_both(&game);

            assert_valid(&pl1);
            assert_valid(&pl2);
            assert_approx_eq!(pl1.game_value, pl2.game_value, 1e-6);
            assert!(game.exploitability(&pl1.strategy, &pl2.strategy) < 1e-6);
        }
    }

    #[test]
    fn large_game_needs_few_pivots() {
        let game = random_square_game(160, 3, false);
        let config = SolverConfig::default();
        for &player in &[Player::Player1, Player::Player2] {
            let mut solver = SimplexSolver::new(&game, player, &config);
            assert_eq!(solver.solve(), optimizers::Status::Optimal);
            assert!(solver.get_solution().is_some());
        }

        // A budget of a few pivots per row is enough.
        let tight = SolverConfig {
            max_iterations: 20 * 161,
            ..SolverConfig::default()
        };
        let pair = solve_game(&game, &tight);
        assert!(pair.pl1.is_some());
        assert!(pair.pl2.is_some());
    }

    #[test]
    fn resolving_is_deterministic() {
        let config = SolverConfig::default();
        let first = solve_game(&*MASSEY, &config);
        let second = solve_game(&*MASSEY, &config);
        for &player in &[Player::Player1, Player::Player2] {
            assert_eq!(first.get(player), second.get(player));
        }
    }

    #[test]
    fn sequential_matches_parallel() {
        let parallel = solve_game(&*ROCK_PAPER_SCISSORS, &SolverConfig::default());
        let sequential = solve_game(
            &*ROCK_PAPER_SCISSORS,
            &SolverConfig {
                parallel: false,
                ..SolverConfig::default()
            },
        );
        assert_eq!(parallel.pl1, sequential.pl1);
        assert_eq!(parallel.pl2, sequential.pl2);
        assert_approx_eq!(sequential.game_value().unwrap(), 0.0);
    }

    #[test]
    fn bundled_game_files() {
        let games_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../games");

        let election = GameDescription::load(games_dir.join("presidential_election.yaml"))
            .unwrap()
            .to_game()
            .unwrap();
        let (pl1, _) = solve_both(&election);
        assert_approx_eq!(pl1.game_value, 1.0 / 12.0);

        let description = GameDescription::load(games_dir.join("two_step_coordination.yaml"))
            .unwrap();
        let (pl1, pl2) = solve_both(&description.to_game().unwrap());
        assert_approx_eq!(pl1.game_value, -0.5);
        assert_approx_eq!(pl2.strategy.probability(3), 0.25);
        assert_eq!(
            description.describe_pure_strategy(Player::Player2, 3),
            Some("right -> right".to_string())
        );
    }

    #[test]
    fn unsolved_side_is_absent() {
        let config = SolverConfig {
            max_iterations: 0,
            ..SolverConfig::default()
        };
        let pair = solve_game(&*MASSEY, &config);
        assert!(pair.pl1.is_none());
        assert!(pair.pl2.is_none());
        assert!(pair.game_value().is_none());
    }
}
