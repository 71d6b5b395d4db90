// Rock-paper-scissors, optionally repeated over several steps.

extern crate env_logger;
extern crate nfg_lite;
extern crate structopt;

use libgt::{Leaf, NormalFormGameBuilder, SimultaneousGameVertex, VertexOrLeaf};
use nfg_lite::game::Player;
use nfg_lite::GameResult;
use log::{error, info};
use structopt::StructOpt;

use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub struct State {
    step: usize,
    game_step: usize,
    score_pl1: i64,
}

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub enum Action {
    Rock,
    Paper,
    Scissors,
}

impl State {
    pub fn initial_state(game_step: usize) -> State {
        State {
            step: 0,
            game_step,
            score_pl1: 0,
        }
    }
}

fn round_payoff(action_pl1: &Action, action_pl2: &Action) -> i64 {
    match action_pl1 {
        Action::Rock => match action_pl2 {
            Action::Scissors => 1,
            Action::Rock => 0,
            Action::Paper => -1,
        },
        Action::Paper => match action_pl2 {
            Action::Scissors => -1,
            Action::Rock => 1,
            Action::Paper => 0,
        },
        Action::Scissors => match action_pl2 {
            Action::Scissors => 0,
            Action::Rock => -1,
            Action::Paper => 1,
        },
    }
}

impl SimultaneousGameVertex for State {
    type Action = Action;

    fn available_actions(&self, _player: Player) -> Box<[Self::Action]> {
        vec![Action::Rock, Action::Scissors, Action::Paper].into_boxed_slice()
    }

    fn next_state(
        &self,
        action_pl1: &Self::Action,
        action_pl2: &Self::Action,
    ) -> VertexOrLeaf<Self> {
        let score_pl1 = self.score_pl1 + round_payoff(action_pl1, action_pl2);
        match self.step + 1 == self.game_step {
            true => VertexOrLeaf::Leaf(Leaf::zero_sum(score_pl1 as f64)),
            false => VertexOrLeaf::Vertex(State {
                step: self.step + 1,
                game_step: self.game_step,
                score_pl1,
            }),
        }
    }

    fn validate(&self) {
        assert!(self.step < self.game_step);
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "rps")]
struct Opt {
    #[structopt(short = "o", long = "output_file")]
    output_file: PathBuf,

    // Number of rounds played
    #[structopt(short = "s", long = "game_step", default_value = "1")]
    game_step: usize,
}

fn run(opt: &Opt) -> GameResult<()> {
    let mut builder = NormalFormGameBuilder::<State>::new(opt.game_step);
    let description = builder.make_description(&State::initial_state(opt.game_step))?;
    info!(
        "Rock-paper-scissors with {} rounds, {} pure strategies per player",
        opt.game_step,
        description.payoff_matrix.len()
    );

    let mut file_writer = File::create(&opt.output_file)?;
    description.persist(&mut file_writer)
}

fn main() {
    env_logger::init();

    let opt = Opt::from_args();
    if let Err(err) = run(&opt) {
        error!("Could not generate game: {}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn single_round() {
        let mut builder = NormalFormGameBuilder::<State>::new(1);
        let (game, annotations) = builder
            .make_game_and_annotations(&State::initial_state(1), true)
            .unwrap();
        assert_eq!(
            annotations.unwrap().actions_pl1,
            vec![Action::Rock, Action::Paper, Action::Scissors]
        );
        assert_approx_eq!(game.utility(0, 2), 1.0);
        assert_approx_eq!(game.utility(2, 0), -1.0);
        assert_approx_eq!(game.utility(1, 1), 0.0);
    }

    #[test]
    fn repeated_rounds_add_up() {
        let mut builder = NormalFormGameBuilder::<State>::new(2);
        let (game, _) = builder
            .make_game_and_annotations(&State::initial_state(2), false)
            .unwrap();
        assert_eq!(game.payoff_matrix().shape(), (9, 9));
        // (Rock, Rock) against (Scissors, Scissors).
        assert_approx_eq!(game.utility(0, 8), 2.0);
        // (Rock, Paper) against (Scissors, Scissors).
        assert_approx_eq!(game.utility(1, 8), 0.0);
    }
}
