use crate::error::{GameError, GameResult};

use serde::{Deserialize, Serialize};

/// A single payoff entry as it appears in a game file. Large matrices flattened from
/// multi-step games are usually stored as win/loss outcomes to save space.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayoffEntry {
    Outcome(bool),
    Real(f64),
}

/// Row-major storage of the payoff matrix. The encoding is decided once when the
/// matrix is built, and is never inspected entry by entry afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum PayoffEntries {
    /// Utilities to Player 1.
    Real(Vec<f64>),
    /// `true` is a win for Player 1 (+1), `false` a loss (-1).
    Outcome(Vec<bool>),
}

/// Dense payoff matrix of Player 1's utilities. Rows are indexed by Player 1's pure
/// strategies and columns by Player 2's.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoffMatrix {
    num_rows: usize,
    num_cols: usize,
    entries: PayoffEntries,
}

impl PayoffMatrix {
    /// Fails with `InvalidConfiguration` on NaN or infinite payoffs.
    pub fn from_real_rows(rows: Vec<Vec<f64>>) -> GameResult<PayoffMatrix> {
        let (num_rows, num_cols) = Self::rectangular_shape(&rows)?;
        let non_finite = rows.iter().enumerate().find_map(|(row, payoffs)| {
            payoffs
                .iter()
                .position(|payoff| !payoff.is_finite())
                .map(|col| (row, col, payoffs[col]))
        });
        if let Some((row, col, payoff)) = non_finite {
            return Err(GameError::InvalidConfiguration(format!(
                "payoff {} at row {}, column {} is not finite",
                payoff, row, col
            )));
        }
        Ok(PayoffMatrix {
            num_rows,
            num_cols,
            entries: PayoffEntries::Real(rows.into_iter().flatten().collect()),
        })
    }

    pub fn from_outcome_rows(rows: Vec<Vec<bool>>) -> GameResult<PayoffMatrix> {
        let (num_rows, num_cols) = Self::rectangular_shape(&rows)?;
        Ok(PayoffMatrix {
            num_rows,
            num_cols,
            entries: PayoffEntries::Outcome(rows.into_iter().flatten().collect()),
        })
    }

    /// Builds a matrix from untyped entries, e.g., those read from a game file.
    /// All-boolean matrices use the compressed outcome encoding, all-numeric matrices
    /// the real encoding. Mixing both is rejected.
    pub fn from_entry_rows(rows: Vec<Vec<PayoffEntry>>) -> GameResult<PayoffMatrix> {
        let is_outcome = |entry: &PayoffEntry| match entry {
            PayoffEntry::Outcome(_) => true,
            PayoffEntry::Real(_) => false,
        };
        let num_outcomes = rows.iter().flatten().filter(|x| is_outcome(x)).count();
        let num_entries = rows.iter().map(|row| row.len()).sum::<usize>();

        if num_outcomes > 0 && num_outcomes < num_entries {
            return Err(GameError::MixedPayoffEncoding);
        }

        match num_entries > 0 && num_outcomes == num_entries {
            true => Self::from_outcome_rows(
                rows.into_iter()
                    .map(|row| {
                        row.into_iter()
                            .map(|entry| match entry {
                                PayoffEntry::Outcome(win) => win,
                                PayoffEntry::Real(_) => unreachable!(),
                            })
                            .collect()
                    })
                    .collect(),
            ),
            false => Self::from_real_rows(
                rows.into_iter()
                    .map(|row| {
                        row.into_iter()
                            .map(|entry| match entry {
                                PayoffEntry::Real(payoff) => payoff,
                                PayoffEntry::Outcome(_) => unreachable!(),
                            })
                            .collect()
                    })
                    .collect(),
            ),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    pub fn entries(&self) -> &PayoffEntries {
        &self.entries
    }

    pub fn is_outcome_encoded(&self) -> bool {
        match self.entries {
            PayoffEntries::Outcome(_) => true,
            PayoffEntries::Real(_) => false,
        }
    }

    /// Player 1's utility when Player 1 plays `row` and Player 2 plays `col`.
    pub fn utility(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.num_rows && col < self.num_cols);
        let index = row * self.num_cols + col;
        match &self.entries {
            PayoffEntries::Real(payoffs) => payoffs[index],
            PayoffEntries::Outcome(wins) => match wins[index] {
                true => 1.0,
                false => -1.0,
            },
        }
    }

    /// Rows of the matrix in the untyped form used by game files.
    pub fn to_entry_rows(&self) -> Vec<Vec<PayoffEntry>> {
        (0..self.num_rows)
            .map(|row| {
                let range = row * self.num_cols..(row + 1) * self.num_cols;
                match &self.entries {
                    PayoffEntries::Real(payoffs) => payoffs[range]
                        .iter()
                        .map(|x| PayoffEntry::Real(*x))
                        .collect(),
                    PayoffEntries::Outcome(wins) => wins[range]
                        .iter()
                        .map(|x| PayoffEntry::Outcome(*x))
                        .collect(),
                }
            })
            .collect()
    }

    /// Returns the shape of `rows`, or a `ShapeMismatch` pointing at the first row
    /// whose length differs from the first one.
    fn rectangular_shape<T>(rows: &[Vec<T>]) -> GameResult<(usize, usize)> {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, |row| row.len());
        match rows.iter().find(|row| row.len() != num_cols) {
            Some(ragged_row) => Err(GameError::ShapeMismatch {
                rows: num_rows,
                cols: ragged_row.len(),
                expected_rows: num_rows,
                expected_cols: num_cols,
            }),
            None => Ok((num_rows, num_cols)),
        }
    }
}
