// Pursuit-evasion on a square grid. Player 1 (the pursuer) and Player 2 (the evader) move
// simultaneously, one king move per step, without observing each other. The pursuer wins
// if it ever gets within the capture radius of the evader.

extern crate env_logger;
extern crate nfg_lite;
extern crate structopt;

use libgt::{Leaf, NormalFormGameBuilder, SimultaneousGameVertex, VertexOrLeaf};
use log::{error, info};
use nfg_lite::game::Player;
use nfg_lite::{GameError, GameResult};
use structopt::StructOpt;

use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    fn offset(self) -> (i64, i64) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Position {
    x: i64,
    y: i64,
}

impl Position {
    /// Moves one cell towards `direction`, staying put along an axis at the border.
    fn step(self, direction: Direction, grid_size: i64) -> Position {
        let (dx, dy) = direction.offset();
        Position {
            x: (self.x + dx).max(0).min(grid_size - 1),
            y: (self.y + dy).max(0).min(grid_size - 1),
        }
    }

    fn distance(self, other: Position) -> i64 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub grid_size: i64,
    pub game_step: usize,
    pub capture_radius: i64,
}

#[derive(Debug, Clone)]
pub struct State<'a> {
    config: &'a Config,
    step: usize,
    pursuer: Position,
    evader: Position,
}

impl<'a> State<'a> {
    /// The pursuer starts in the south-west corner, the evader in the north-east one.
    pub fn initial_state(config: &'a Config) -> State<'a> {
        State {
            config,
            step: 0,
            pursuer: Position { x: 0, y: 0 },
            evader: Position {
                x: config.grid_size - 1,
                y: config.grid_size - 1,
            },
        }
    }

    fn captured(&self) -> bool {
        self.pursuer.distance(self.evader) <= self.config.capture_radius
    }
}

impl<'a> SimultaneousGameVertex for State<'a> {
    type Action = Direction;

    fn available_actions(&self, _player: Player) -> Box<[Self::Action]> {
        vec![
            Direction::North,
            Direction::NorthEast,
            Direction::East,
            Direction::SouthEast,
            Direction::South,
            Direction::SouthWest,
            Direction::West,
            Direction::NorthWest,
        ]
        .into_boxed_slice()
    }

    fn next_state(
        &self,
        action_pl1: &Self::Action,
        action_pl2: &Self::Action,
    ) -> VertexOrLeaf<Self> {
        let next = State {
            config: self.config,
            step: self.step + 1,
            pursuer: self.pursuer.step(*action_pl1, self.config.grid_size),
            evader: self.evader.step(*action_pl2, self.config.grid_size),
        };
        if next.captured() {
            return VertexOrLeaf::Leaf(Leaf::Outcome(true));
        }
        match next.step == self.config.game_step {
            true => VertexOrLeaf::Leaf(Leaf::Outcome(false)),
            false => VertexOrLeaf::Vertex(next),
        }
    }

    fn validate(&self) {
        assert!(!self.captured());
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "pursuit")]
struct Opt {
    #[structopt(short = "o", long = "output_file")]
    output_file: PathBuf,

    #[structopt(short = "n", long = "grid_size", default_value = "5")]
    grid_size: i64,

    #[structopt(short = "s", long = "game_step", default_value = "2")]
    game_step: usize,

    // Chebyshev distance at which the evader is caught
    #[structopt(short = "r", long = "capture_radius", default_value = "1")]
    capture_radius: i64,
}

fn run(opt: &Opt) -> GameResult<()> {
    let config = Config {
        grid_size: opt.grid_size,
        game_step: opt.game_step,
        capture_radius: opt.capture_radius,
    };
    if config.grid_size < 1 || config.capture_radius < 0 {
        return Err(GameError::InvalidConfiguration(format!(
            "invalid grid size {} or capture radius {}",
            config.grid_size, config.capture_radius
        )));
    }
    let initial_state = State::initial_state(&config);
    if initial_state.captured() {
        return Err(GameError::InvalidConfiguration(
            "evader starts within the capture radius".to_string(),
        ));
    }

    let mut builder = NormalFormGameBuilder::<State>::new(config.game_step);
    let description = builder.make_description(&initial_state)?;
    info!(
        "Pursuit on a {}x{} grid over {} steps, {} pure strategies per player",
        config.grid_size,
        config.grid_size,
        config.game_step,
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
    fn moves_are_clamped() {
        let corner = Position { x: 0, y: 0 };
        assert_eq!(corner.step(Direction::SouthWest, 3), corner);
        assert_eq!(corner.step(Direction::NorthWest, 3), Position { x: 0, y: 1 });
        assert_eq!(corner.distance(Position { x: 2, y: 1 }), 2);
    }

    #[test]
    fn single_step_capture() {
        let config = Config {
            grid_size: 3,
            game_step: 1,
            capture_radius: 1,
        };
        let mut builder = NormalFormGameBuilder::<State>::new(1);
        let (game, annotations) = builder
            .make_game_and_annotations(&State::initial_state(&config), true)
            .unwrap();
        assert!(game.payoff_matrix().is_outcome_encoded());
        assert_eq!(game.payoff_matrix().shape(), (8, 8));

        let actions = annotations.unwrap().actions_pl1;
        let north_east = actions.iter().position(|&d| d == Direction::NorthEast).unwrap();
        let south_west = actions.iter().position(|&d| d == Direction::SouthWest).unwrap();
        // Pursuer moves to (1, 1), next to the evader wherever it goes.
        for col in 0..8 {
            assert_approx_eq!(game.utility(north_east, col), 1.0);
        }
        // Pursuer stays in its corner while the evader stays in its own.
        assert_approx_eq!(game.utility(south_west, north_east), -1.0);
    }

    #[test]
    fn pursuer_closes_in_over_two_steps() {
        let config = Config {
            grid_size: 4,
            game_step: 2,
            capture_radius: 1,
        };
        let mut builder = NormalFormGameBuilder::<State>::new(2);
        let (game, _) = builder
            .make_game_and_annotations(&State::initial_state(&config), false)
            .unwrap();
        assert_eq!(game.payoff_matrix().shape(), (64, 64));
        // (NorthEast, NorthEast) puts the pursuer at (2, 2), within reach of every cell
        // the evader can reach from (3, 3) in two moves.
        let row = game.action_space(Player::Player1).encode(&[1, 1]).unwrap();
        for col in 0..64 {
            assert_approx_eq!(game.utility(row, col), 1.0);
        }
    }

    #[test]
    fn three_step_game_is_solved() {
        use zero_sum_solving::{solve_game, SolverConfig};

        let config = Config {
            grid_size: 5,
            game_step: 3,
            capture_radius: 1,
        };
        let mut builder = NormalFormGameBuilder::<State>::new(3);
        let (game, _) = builder
            .make_game_and_annotations(&State::initial_state(&config), false)
            .unwrap();
        assert_eq!(game.payoff_matrix().shape(), (512, 512));

        let equilibrium = solve_game(&game, &SolverConfig::default());
        let pl1 = equilibrium.pl1.unwrap();
        let pl2 = equilibrium.pl2.unwrap();
        pl1.strategy.validate();
        pl2.strategy.validate();
        assert_approx_eq!(pl1.game_value, pl2.game_value, 1e-6);
        assert!(game.exploitability(&pl1.strategy, &pl2.strategy) < 1e-6);
    }
}
