// Synthetic stepped game with random stage payoffs.

extern crate env_logger;
extern crate libgt;
extern crate nfg_lite;
extern crate structopt;

use libgt::{Leaf, NormalFormGameBuilder, SimultaneousGameVertex, VertexOrLeaf};
use log::{debug, error, info};
use nfg_lite::game::Player;
use nfg_lite::{GameError, GameResult};
use std::fs::File;
use std::path::PathBuf;
use structopt::StructOpt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

#[derive(Debug, Clone, PartialOrd, PartialEq)]
pub struct Config {
    pub num_actions: (usize, usize),
    pub game_step: usize,
    pub payoff_range: (f64, f64),
    // Store whether Player 1's total payoff is positive instead of the payoff itself.
    pub outcomes: bool,
}

/// Payoffs of every stage game. The total payoff is the sum over all stages, and the
/// stage game played at each step depends on the step only.
#[derive(Debug, Clone, PartialOrd, PartialEq)]
pub struct Synth {
    pub config: Config,
    // stage_payoffs_pl1[step][action pl1][action pl2]
    pub stage_payoffs_pl1: Vec<Vec<Vec<f64>>>,
}

impl Synth {
    pub fn new(config: &Config, random_seed: u64) -> Synth {
        let mut rng = ChaChaRng::seed_from_u64(random_seed);
        let (low, high) = config.payoff_range;

        let stage_payoffs_pl1 = (0..config.game_step)
            .map(|_| {
                (0..config.num_actions.0)
                    .map(|_| {
                        (0..config.num_actions.1)
                            .map(|_| rng.gen_range(low, high))
                            .collect()
                    })
                    .collect()
            })
            .collect();

        Synth {
            config: config.clone(),
            stage_payoffs_pl1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct State<'a> {
    synth: &'a Synth,
    step: usize,
    payoff_pl1: f64,
}

impl<'a> State<'a> {
    pub fn initial_state(synth: &'a Synth) -> State<'a> {
        State {
            synth,
            step: 0,
            payoff_pl1: 0.0,
        }
    }

    fn leaf(&self, payoff_pl1: f64) -> Leaf {
        match self.synth.config.outcomes {
            true => Leaf::Outcome(payoff_pl1 > 0.0),
            false => Leaf::zero_sum(payoff_pl1),
        }
    }
}

impl<'a> SimultaneousGameVertex for State<'a> {
    type Action = usize;

    fn available_actions(&self, player: Player) -> Box<[Self::Action]> {
        let n = match player {
            Player::Player1 => self.synth.config.num_actions.0,
            Player::Player2 => self.synth.config.num_actions.1,
        };
        (0..n).collect::<Vec<usize>>().into_boxed_slice()
    }

    fn next_state(
        &self,
        action_pl1: &Self::Action,
        action_pl2: &Self::Action,
    ) -> VertexOrLeaf<Self> {
        let payoff_pl1 =
            self.payoff_pl1 + self.synth.stage_payoffs_pl1[self.step][*action_pl1][*action_pl2];
        match self.step + 1 == self.synth.config.game_step {
            true => VertexOrLeaf::Leaf(self.leaf(payoff_pl1)),
            false => VertexOrLeaf::Vertex(State {
                synth: self.synth,
                step: self.step + 1,
                payoff_pl1,
            }),
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "synthetic")]
struct Opt {
    #[structopt(short = "o", long = "output_file")]
    output_file: PathBuf,

    #[structopt(long = "num_actions_pl1", default_value = "3")]
    num_actions_pl1: usize,

    #[structopt(long = "num_actions_pl2", default_value = "3")]
    num_actions_pl2: usize,

    #[structopt(short = "s", long = "game_step", default_value = "1")]
    game_step: usize,

    #[structopt(long = "min_payoff", default_value = "-1.0")]
    min_payoff: f64,

    #[structopt(long = "max_payoff", default_value = "1.0")]
    max_payoff: f64,

    #[structopt(long = "seed", default_value = "0")]
    seed: u64,

    // Store win/loss outcomes instead of payoffs
    #[structopt(long = "outcomes")]
    outcomes: bool,
}

fn run(opt: &Opt) -> GameResult<()> {
    if !(opt.min_payoff < opt.max_payoff) {
        return Err(GameError::InvalidConfiguration(format!(
            "empty payoff range [{}, {})",
            opt.min_payoff, opt.max_payoff
        )));
    }
    let config = Config {
        num_actions: (opt.num_actions_pl1, opt.num_actions_pl2),
        game_step: opt.game_step,
        payoff_range: (opt.min_payoff, opt.max_payoff),
        outcomes: opt.outcomes,
    };
    let synth = Synth::new(&config, opt.seed);
    debug!("Stage payoffs: {:?}", synth.stage_payoffs_pl1);

    let mut builder = NormalFormGameBuilder::<State>::new(config.game_step);
    let description = builder.make_description(&State::initial_state(&synth))?;
    info!(
        "Synthetic game with seed {}: {} x {} pure strategies",
        opt.seed,
        description.payoff_matrix.len(),
        description.payoff_matrix.first().map_or(0, |row| row.len())
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
