use thiserror::Error;

/// Errors raised while validating games and game descriptions. Anything that
/// reaches the LP layer has already passed these checks.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(
        "payoff matrix has shape ({rows}, {cols}) but the pure strategy counts are \
         ({expected_rows}, {expected_cols})"
    )]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("payoff matrix mixes boolean outcomes with real-valued payoffs")]
    MixedPayoffEncoding,

    #[error("could not read game file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse game file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type GameResult<T> = Result<T, GameError>;
