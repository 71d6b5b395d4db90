use crate::game_tree::{Leaf, SimultaneousGameVertex, VertexOrLeaf};
use crate::normal_form::GameAnnotations;

use nfg_lite::actions::checked_num_sequences;
use nfg_lite::game::{NormalFormGame, PayoffEntry, PayoffMatrix, Player};
use nfg_lite::schema::GameDescription;
use nfg_lite::{GameError, GameResult};

use assert_approx_eq::assert_approx_eq;
use itertools::sorted;
use log::debug;

/// Position of a vertex in the flattened game: the number of steps taken so far, and
/// the indices of the action sequences that led to it.
#[derive(Debug, Copy, Clone)]
struct StagePrefix {
    step: usize,
    row_prefix: usize,
    col_prefix: usize,
}

/// Builder for a normal form game out of a stepped simultaneous-move game. The primary
/// purpose of this struct is to traverse the game tree and fill the payoff matrix, with
/// rows and columns numbered as `nfg_lite::actions::ActionSpace` numbers sequences.
///
/// A leaf reached before `game_step` steps ends the game early. Its payoff is shared by
/// every continuation of the sequences leading to it.
pub struct NormalFormGameBuilder<T: SimultaneousGameVertex> {
    game_step: usize,
    actions_pl1: Vec<T::Action>,
    actions_pl2: Vec<T::Action>,

    // Row-major, filled during traversal.
    entries: Vec<Option<PayoffEntry>>,
    num_cols: usize,
}

impl<T> NormalFormGameBuilder<T>
where
    T: SimultaneousGameVertex,
{
    pub fn new(game_step: usize) -> NormalFormGameBuilder<T> {
        NormalFormGameBuilder {
            game_step,
            actions_pl1: Vec::new(),
            actions_pl2: Vec::new(),
            entries: Vec::new(),
            num_cols: 0,
        }
    }

    /// Creates a `NormalFormGame` by starting a traversal from `initial_vertex`. Actions
    /// of each player are ordered as specified by `SimultaneousGameVertex::Action`.
    pub fn make_game_and_annotations(
        &mut self,
        initial_vertex: &T,
        include_annotations: bool,
    ) -> GameResult<(NormalFormGame, Option<GameAnnotations<T>>)> {
        self.actions_pl1 = Self::sorted_actions(initial_vertex, Player::Player1)?;
        self.actions_pl2 = Self::sorted_actions(initial_vertex, Player::Player2)?;

        let num_rows = checked_num_sequences(self.actions_pl1.len(), self.game_step)?;
        let num_cols = checked_num_sequences(self.actions_pl2.len(), self.game_step)?;
        let num_entries = num_rows.checked_mul(num_cols).ok_or_else(|| {
            GameError::InvalidConfiguration(format!(
                "payoff matrix of {} x {} entries is too large",
                num_rows, num_cols
            ))
        })?;
        debug!(
            "Flattening {}-step game into {} x {} matrix",
            self.game_step, num_rows, num_cols
        );

        self.entries = vec![None; num_entries];
        self.num_cols = num_cols;
        self.traverse_tree(initial_vertex)?;

        let rows = self
            .entries
            .chunks(num_cols)
            .map(|row| {
                row.iter()
                    .map(|&entry| entry.ok_or_else(Self::unfilled))
                    .collect::<GameResult<Vec<PayoffEntry>>>()
            })
            .collect::<GameResult<Vec<Vec<PayoffEntry>>>>()?;
        let payoff_matrix = PayoffMatrix::from_entry_rows(rows)?;
        let game = NormalFormGame::new(
            self.game_step,
            self.actions_pl1.len(),
            self.actions_pl2.len(),
            payoff_matrix,
        )?;

        let annotations = match include_annotations {
            true => Some(GameAnnotations::new(
                self.actions_pl1.clone(),
                self.actions_pl2.clone(),
            )),
            false => None,
        };
        Ok((game, annotations))
    }

    /// Flattens the game and describes it for persistence, naming actions after their
    /// `Debug` form.
    pub fn make_description(&mut self, initial_vertex: &T) -> GameResult<GameDescription> {
        let (game, _) = self.make_game_and_annotations(initial_vertex, false)?;
        let annotations =
            GameAnnotations::<T>::new(self.actions_pl1.clone(), self.actions_pl2.clone());
        annotations.to_description(&game)
    }

    fn unfilled() -> GameError {
        GameError::InvalidConfiguration("game tree left payoff entries unfilled".to_string())
    }

    fn sorted_actions(vertex: &T, player: Player) -> GameResult<Vec<T::Action>> {
        let actions =
            sorted(vertex.available_actions(player).iter().cloned()).collect::<Vec<T::Action>>();
        if actions.is_empty() {
            return Err(GameError::InvalidConfiguration(format!(
                "{} has no actions",
                player
            )));
        }
        if actions.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(GameError::InvalidConfiguration(format!(
                "{} has duplicate actions",
                player
            )));
        }
        Ok(actions)
    }

    /// Walks over the game tree depth-first using a stack.
    fn traverse_tree(&mut self, initial_vertex: &T) -> GameResult<()> {
        let initial_prefix = StagePrefix {
            step: 0,
            row_prefix: 0,
            col_prefix: 0,
        };

        let mut vertex_stack = Vec::<(T, StagePrefix)>::new();
        vertex_stack.push((initial_vertex.clone(), initial_prefix));

        while let Some((vertex, prefix)) = vertex_stack.pop() {
            vertex.validate();
            if prefix.step == self.game_step {
                return Err(GameError::InvalidConfiguration(format!(
                    "game does not end after {} steps",
                    self.game_step
                )));
            }
            for &player in &[Player::Player1, Player::Player2] {
                if Self::sorted_actions(&vertex, player)?.as_slice() != self.actions(player) {
                    return Err(GameError::InvalidConfiguration(format!(
                        "actions of {} change at step {}",
                        player, prefix.step
                    )));
                }
            }

            let num_actions_pl1 = self.actions_pl1.len();
            let num_actions_pl2 = self.actions_pl2.len();
            for (index_pl1, action_pl1) in self.actions_pl1.iter().enumerate() {
                for (index_pl2, action_pl2) in self.actions_pl2.iter().enumerate() {
                    let next_prefix = StagePrefix {
                        step: prefix.step + 1,
                        row_prefix: prefix.row_prefix * num_actions_pl1 + index_pl1,
                        col_prefix: prefix.col_prefix * num_actions_pl2 + index_pl2,
                    };
                    match vertex.next_state(action_pl1, action_pl2) {
                        VertexOrLeaf::Vertex(child) => vertex_stack.push((child, next_prefix)),
                        VertexOrLeaf::Leaf(leaf) => Self::record_leaf(
                            &mut self.entries,
                            self.num_cols,
                            (num_actions_pl1, num_actions_pl2),
                            self.game_step,
                            &leaf,
                            next_prefix,
                        ),
                    }
                }
            }
        }
        Ok(())
    }

    fn actions(&self, player: Player) -> &[T::Action] {
        match player {
            Player::Player1 => &self.actions_pl1,
            Player::Player2 => &self.actions_pl2,
        }
    }

    /// Writes the payoff of `leaf` into the block of all continuations of the action
    /// sequences in `prefix`.
    fn record_leaf(
        entries: &mut [Option<PayoffEntry>],
        num_cols: usize,
        (num_actions_pl1, num_actions_pl2): (usize, usize),
        game_step: usize,
        leaf: &Leaf,
        prefix: StagePrefix,
    ) {
        let entry = match *leaf {
            Leaf::Payoffs {
                payoff_pl1,
                payoff_pl2,
            } => {
                assert_approx_eq!(payoff_pl1 + payoff_pl2, 0.0);
                PayoffEntry::Real(payoff_pl1)
            }
            Leaf::Outcome(pl1_wins) => PayoffEntry::Outcome(pl1_wins),
        };

        // Both fit in usize, since they divide the matrix dimensions.
        let remaining = (game_step - prefix.step) as u32;
        let block_rows = num_actions_pl1.pow(remaining);
        let block_cols = num_actions_pl2.pow(remaining);

        let first_row = prefix.row_prefix * block_rows;
        let first_col = prefix.col_prefix * block_cols;
        for row in first_row..first_row + block_rows {
            let start = row * num_cols + first_col;
            for slot in entries[start..start + block_cols].iter_mut() {
                *slot = Some(entry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// Both players pick a coin side at each step. Player 1 scores a point for every
    /// matching step and the game stops as soon as a step does not match.
    #[derive(Debug, Clone)]
    struct RepeatedPennies {
        step: usize,
        game_step: usize,
        matches: usize,
        outcomes: bool,
    }

    impl SimultaneousGameVertex for RepeatedPennies {
        type Action = char;

        fn available_actions(&self, _player: Player) -> Box<[char]> {
            vec!['T', 'H'].into_boxed_slice()
        }

        fn next_state(&self, action_pl1: &char, action_pl2: &char) -> VertexOrLeaf<Self> {
            let matches = self.matches + (action_pl1 == action_pl2) as usize;
            if action_pl1 != action_pl2 || self.step + 1 == self.game_step {
                let leaf = match self.outcomes {
                    true => Leaf::Outcome(matches == self.game_step),
                    false => Leaf::zero_sum(matches as f64),
                };
                return VertexOrLeaf::Leaf(leaf);
            }
            VertexOrLeaf::Vertex(RepeatedPennies {
                step: self.step + 1,
                matches,
                ..self.clone()
            })
        }
    }

    fn initial(game_step: usize, outcomes: bool) -> RepeatedPennies {
        RepeatedPennies {
            step: 0,
            game_step,
            matches: 0,
            outcomes,
        }
    }

    #[test]
    fn single_step() {
        let mut builder = NormalFormGameBuilder::new(1);
        let (game, annotations) = builder
            .make_game_and_annotations(&initial(1, false), true)
            .unwrap();
        let annotations = annotations.unwrap();
        assert_eq!(annotations.actions_pl1, vec!['H', 'T']);
        assert_eq!(annotations.action_names(Player::Player2), vec!["'H'", "'T'"]);
        assert_eq!(game.payoff_matrix().shape(), (2, 2));
        assert_approx_eq!(game.utility(0, 0), 1.0);
        assert_approx_eq!(game.utility(0, 1), 0.0);
    }

    #[test]
    fn early_leaves_fill_their_block() {
        let mut builder = NormalFormGameBuilder::new(3);
        let (game, annotations) = builder
            .make_game_and_annotations(&initial(3, false), false)
            .unwrap();
        assert!(annotations.is_none());
        assert_eq!(game.payoff_matrix().shape(), (8, 8));
        assert!(!game.payoff_matrix().is_outcome_encoded());

        let space = game.action_space(Player::Player1);
        for row in 0..8 {
            for col in 0..8 {
                let seq_pl1 = space.decode(row).unwrap();
                let seq_pl2 = space.decode(col).unwrap();
                let expected = seq_pl1
                    .iter()
                    .zip(seq_pl2.iter())
                    .take_while(|(a, b)| a == b)
                    .count();
                assert_approx_eq!(game.utility(row, col), expected as f64);
            }
        }
    }

    #[test]
    fn outcome_leaves() {
        let mut builder = NormalFormGameBuilder::new(2);
        let (game, annotations) = builder
            .make_game_and_annotations(&initial(2, true), true)
            .unwrap();
        assert!(game.payoff_matrix().is_outcome_encoded());
        for row in 0..4 {
            for col in 0..4 {
                let expected = if row == col { 1.0 } else { -1.0 };
                assert_approx_eq!(game.utility(row, col), expected);
            }
        }

        let annotations = annotations.unwrap();
        assert_eq!(
            annotations.pure_strategy_actions(&game, Player::Player1, 1),
            Some(vec!['H', 'T'])
        );
        let description = annotations.to_description(&game).unwrap();
        assert_eq!(description.game_step, 2);
        assert_eq!(description.to_game().unwrap().payoff_matrix(), game.payoff_matrix());
    }

    #[test]
    fn description_of_flattened_game() {
        let mut builder = NormalFormGameBuilder::new(2);
        let description = builder.make_description(&initial(2, false)).unwrap();
        assert_eq!(description.action_names(Player::Player1).unwrap(), vec!["'H'", "'T'"]);
        assert_eq!(description.payoff_matrix.len(), 4);
        assert_eq!(description.payoff_matrix[3][3], PayoffEntry::Real(2.0));
        assert_eq!(description.payoff_matrix[0][3], PayoffEntry::Real(0.0));
    }

    #[test]
    fn game_longer_than_step_count() {
        let mut builder = NormalFormGameBuilder::new(2);
        let result = builder.make_game_and_annotations(&initial(3, false), false);
        assert!(matches!(result, Err(GameError::InvalidConfiguration(_))));
    }

    #[test]
    #[should_panic]
    fn non_zero_sum_leaf() {
        #[derive(Debug, Clone)]
        struct GeneralSum;
        impl SimultaneousGameVertex for GeneralSum {
            type Action = usize;
            fn available_actions(&self, _player: Player) -> Box<[usize]> {
                vec![0].into_boxed_slice()
            }
            fn next_state(&self, _: &usize, _: &usize) -> VertexOrLeaf<Self> {
                VertexOrLeaf::Leaf(Leaf::Payoffs {
                    payoff_pl1: 1.0,
                    payoff_pl2: 1.0,
                })
            }
        }
        let mut builder = NormalFormGameBuilder::new(1);
        let _ = builder.make_game_and_annotations(&GeneralSum, false);
    }
}
