use crate::zero_sum_solution::ZeroSumSolution;
use nfg_lite::game::{NormalFormGame, Player};
use nfg_lite::strategy::SUPPORT_THRESHOLD;
use nfg_lite::{GameError, GameResult};
use optimizers::Status;
use std::time::Duration;

pub trait Solver<'a> {
    fn new(game: &'a NormalFormGame, player: Player, solver_config: &'a SolverConfig) -> Self;
    fn solve(&mut self) -> Status;
    fn get_solution(&self) -> Option<ZeroSumSolution>;
}

#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall clock limit in seconds for one player's solve. No limit if `None`.
    pub time_limit: Option<f64>,
    pub max_iterations: usize,
    pub support_threshold: f64,
    /// Report timings, values and strategies at info level instead of debug.
    pub verbose: bool,
    /// Solve the two players concurrently.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            time_limit: None,
            max_iterations: 1_000_000,
            support_threshold: SUPPORT_THRESHOLD,
            verbose: false,
            parallel: true,
        }
    }
}

impl SolverConfig {
    /// The time limit as a `Duration`. Negative, NaN and unrepresentably large limits
    /// are rejected with `InvalidConfiguration`.
    pub fn time_limit_duration(&self) -> GameResult<Option<Duration>> {
        self.time_limit
            .map(|seconds| {
                Duration::try_from_secs_f64(seconds).map_err(|err| {
                    GameError::InvalidConfiguration(format!(
                        "time limit of {} seconds: {}",
                        seconds, err
                    ))
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_time_limit(time_limit: Option<f64>) -> SolverConfig {
        SolverConfig {
            time_limit,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn valid_time_limits() {
        assert_eq!(with_time_limit(None).time_limit_duration().unwrap(), None);
        assert_eq!(
            with_time_limit(Some(0.0)).time_limit_duration().unwrap(),
            Some(Duration::from_secs(0))
        );
        assert_eq!(
            with_time_limit(Some(1.5)).time_limit_duration().unwrap(),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn invalid_time_limits() {
        for &seconds in &[-1.0, std::f64::NAN, std::f64::INFINITY, 1e20] {
            assert!(matches!(
                with_time_limit(Some(seconds)).time_limit_duration(),
                Err(GameError::InvalidConfiguration(_))
            ));
        }
    }
}
