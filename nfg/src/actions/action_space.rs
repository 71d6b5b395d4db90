use crate::error::{GameError, GameResult};

use itertools::Itertools;
use log::debug;
use std::convert::TryFrom;

/// Per-step action indices of one joint pure strategy, in step order.
pub type ActionSequence = Vec<usize>;

/// The pure strategies of a player in a multi-step game: every sequence of `game_step`
/// actions, each drawn from `num_actions` choices.
///
/// Sequences are numbered in row-major (lexicographic) order with the first step as the
/// most significant digit, which is also the row/column order of the payoff matrix.
/// Decoding is done on demand so that nothing of size `num_actions^game_step` is built
/// unless `materialize` is asked for explicitly.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ActionSpace {
    num_actions: usize,
    game_step: usize,
    num_sequences: usize,
}

/// `num_actions^game_step`, validating both counts.
pub fn checked_num_sequences(num_actions: usize, game_step: usize) -> GameResult<usize> {
    if game_step == 0 {
        return Err(GameError::InvalidConfiguration(
            "game step must be at least 1".to_string(),
        ));
    }
    if num_actions == 0 {
        return Err(GameError::InvalidConfiguration(
            "every player needs at least one action".to_string(),
        ));
    }
    let exponent = u32::try_from(game_step).map_err(|_| {
        GameError::InvalidConfiguration(format!("game step {} is too large", game_step))
    })?;
    num_actions.checked_pow(exponent).ok_or_else(|| {
        GameError::InvalidConfiguration(format!(
            "{}^{} pure strategies do not fit in memory indices",
            num_actions, game_step
        ))
    })
}

impl ActionSpace {
    pub fn new(num_actions: usize, game_step: usize) -> GameResult<ActionSpace> {
        let num_sequences = checked_num_sequences(num_actions, game_step)?;
        Ok(ActionSpace {
            num_actions,
            game_step,
            num_sequences,
        })
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub fn game_step(&self) -> usize {
        self.game_step
    }

    pub fn num_sequences(&self) -> usize {
        self.num_sequences
    }

    /// Mixed-radix decomposition of `index` in base `num_actions`.
    pub fn decode(&self, index: usize) -> Option<ActionSequence> {
        if index >= self.num_sequences {
            return None;
        }
        let mut sequence = vec![0; self.game_step];
        let mut remainder = index;
        for step in (0..self.game_step).rev() {
            sequence[step] = remainder % self.num_actions;
            remainder /= self.num_actions;
        }
        Some(sequence)
    }

    pub fn encode(&self, sequence: &[usize]) -> Option<usize> {
        if sequence.len() != self.game_step {
            return None;
        }
        sequence.iter().try_fold(0usize, |index, &action| {
            match action < self.num_actions {
                true => Some(index * self.num_actions + action),
                false => None,
            }
        })
    }

    /// Lazily walks over all sequences in index order.
    pub fn iter(&self) -> Sequences {
        Sequences {
            action_space: *self,
            next_index: 0,
        }
    }

    /// Builds the whole table of sequences. Refuses to do so when there are more than
    /// `limit` of them, e.g., 8 actions over 4 steps already gives 4096 rows.
    pub fn materialize(&self, limit: usize) -> GameResult<Vec<ActionSequence>> {
        if self.num_sequences > limit {
            return Err(GameError::InvalidConfiguration(format!(
                "refusing to materialize {} action sequences (limit {})",
                self.num_sequences, limit
            )));
        }
        debug!(
            "Materializing {} sequences of {} steps",
            self.num_sequences, self.game_step
        );
        Ok((0..self.game_step)
            .map(|_| 0..self.num_actions)
            .multi_cartesian_product()
            .collect())
    }
}

/// Iterator returned by `ActionSpace::iter`.
#[derive(Debug, Clone)]
pub struct Sequences {
    action_space: ActionSpace,
    next_index: usize,
}

impl Iterator for Sequences {
    type Item = ActionSequence;

    fn next(&mut self) -> Option<ActionSequence> {
        let sequence = self.action_space.decode(self.next_index)?;
        self.next_index += 1;
        Some(sequence)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.action_space.num_sequences - self.next_index;
        (remaining, Some(remaining))
    }
}
