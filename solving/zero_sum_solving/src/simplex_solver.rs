use crate::formulation::MinimaxProgram;
use crate::solver::{Solver, SolverConfig};
use crate::zero_sum_solution::ZeroSumSolution;
use nfg_lite::game::{NormalFormGame, Player};
use optimizers::{DenseSimplex, LpSolver, SimplexConfig, Solution, Status};

use log::{debug, error, log, Level};
use std::time::{Duration, Instant};

/// Solves one player's minimax program with the dense simplex method.
pub struct SimplexSolver<'a> {
    game: &'a NormalFormGame,
    solver_config: &'a SolverConfig,
    program: MinimaxProgram,
    simplex: DenseSimplex,
    solution: Option<Solution>,
}

impl<'a> SimplexSolver<'a> {
    fn simplex_config(solver_config: &SolverConfig, time_limit: Option<Duration>) -> SimplexConfig {
        SimplexConfig {
            time_limit,
            max_iterations: solver_config.max_iterations,
            ..SimplexConfig::default()
        }
    }

    fn report_level(&self) -> Level {
        match self.solver_config.verbose {
            true => Level::Info,
            false => Level::Debug,
        }
    }

    pub fn game(&self) -> &'a NormalFormGame {
        self.game
    }

    pub fn program(&self) -> &MinimaxProgram {
        &self.program
    }
}

impl<'a> Solver<'a> for SimplexSolver<'a> {
    fn new(
        game: &'a NormalFormGame,
        player: Player,
        solver_config: &'a SolverConfig,
    ) -> SimplexSolver<'a> {
        let time_limit = match solver_config.time_limit_duration() {
            Ok(time_limit) => time_limit,
            Err(err) => panic!("{}", err),
        };

        debug!("Making minimax program for {}", player);
        let program = MinimaxProgram::new(game, player);
        debug!(
            "{} program has {} variables and {} constraints",
            player,
            program.lp().num_vars(),
            program.lp().num_constrs()
        );

        SimplexSolver {
            game,
            solver_config,
            program,
            simplex: DenseSimplex::new(Self::simplex_config(solver_config, time_limit)),
            solution: None,
        }
    }

    fn solve(&mut self) -> Status {
        let level = self.report_level();
        let player = self.program.player();

        let start = Instant::now();
        let solution = self.simplex.optimize(self.program.lp());
        let elapsed = start.elapsed();

        let status = solution.status;
        match status {
            Status::Optimal => log!(
                level,
                "{} solved in {:.3}s ({} iterations), game value {:.6}",
                player,
                elapsed.as_secs_f64(),
                solution.iterations,
                solution.objective_value
            ),
            _ => error!(
                "{} not solved after {:.3}s ({} iterations): {:?}",
                player,
                elapsed.as_secs_f64(),
                solution.iterations,
                status
            ),
        }
        self.solution = Some(solution);
        status
    }

    fn get_solution(&self) -> Option<ZeroSumSolution> {
        let solution = match &self.solution {
            Some(solution) => solution,
            None => {
                error!("{} has not been solved yet", self.program.player());
                return None;
            }
        };
        let solved =
            ZeroSumSolution::extract(&self.program, solution, self.solver_config.support_threshold)?;
        log!(
            self.report_level(),
            "{} strategy: {}",
            solved.player,
            solved.strategy
        );
        Some(solved)
    }
}
