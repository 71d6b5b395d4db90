// Matching pennies. Player 1 wins a round when both coins show the same side.

extern crate env_logger;
extern crate nfg_lite;
extern crate structopt;

use libgt::{Leaf, NormalFormGameBuilder, SimultaneousGameVertex, VertexOrLeaf};
use log::{error, info};
use nfg_lite::game::Player;
use nfg_lite::GameResult;
use structopt::StructOpt;

use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub enum Coin {
    Heads,
    Tails,
}

#[derive(Debug, Clone)]
pub struct State {
    step: usize,
    game_step: usize,
    rounds_won_pl1: usize,
    // Write win/loss outcomes instead of the round difference.
    outcomes: bool,
}

impl State {
    pub fn initial_state(game_step: usize, outcomes: bool) -> State {
        State {
            step: 0,
            game_step,
            rounds_won_pl1: 0,
            outcomes,
        }
    }

    /// Player 1 wins the match with a strict majority of rounds.
    fn leaf(&self, rounds_won_pl1: usize) -> Leaf {
        let rounds_lost_pl1 = self.game_step - rounds_won_pl1;
        match self.outcomes {
            true => Leaf::Outcome(rounds_won_pl1 > rounds_lost_pl1),
            false => Leaf::zero_sum(rounds_won_pl1 as f64 - rounds_lost_pl1 as f64),
        }
    }
}

impl SimultaneousGameVertex for State {
    type Action = Coin;

    fn available_actions(&self, _player: Player) -> Box<[Self::Action]> {
        vec![Coin::Heads, Coin::Tails].into_boxed_slice()
    }

    fn next_state(
        &self,
        action_pl1: &Self::Action,
        action_pl2: &Self::Action,
    ) -> VertexOrLeaf<Self> {
        let rounds_won_pl1 = self.rounds_won_pl1 + (action_pl1 == action_pl2) as usize;
        match self.step + 1 == self.game_step {
            true => VertexOrLeaf::Leaf(self.leaf(rounds_won_pl1)),
            false => VertexOrLeaf::Vertex(State {
                step: self.step + 1,
                rounds_won_pl1,
                ..self.clone()
            }),
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "matching_pennies")]
struct Opt {
    #[structopt(short = "o", long = "output_file")]
    output_file: PathBuf,

    // Number of rounds played
    #[structopt(short = "s", long = "game_step", default_value = "1")]
    game_step: usize,

    // Store who wins the match instead of the round difference
    #[structopt(long = "outcomes")]
    outcomes: bool,
}

fn run(opt: &Opt) -> GameResult<()> {
    let mut builder = NormalFormGameBuilder::<State>::new(opt.game_step);
    let initial_state = State::initial_state(opt.game_step, opt.outcomes);
    let description = builder.make_description(&initial_state)?;
    info!(
        "Matching pennies with {} rounds, {} pure strategies per player",
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
