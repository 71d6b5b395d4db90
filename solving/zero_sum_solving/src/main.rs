use std::path::PathBuf;
use structopt::StructOpt;

use nfg_lite::game::{NormalFormGame, Player};
use nfg_lite::schema::GameDescription;
use nfg_lite::GameResult;

use log::{error, info};

use zero_sum_solving::{solve_game, SolverConfig, ZeroSumSolution};

#[derive(StructOpt, Debug)]
#[structopt(name = "ZeroSumSolver")]
struct Opt {
    // Input game file
    #[structopt(short = "g", long = "input_game_file")]
    input_file: PathBuf,

    // Time limit in seconds, per player
    #[structopt(short = "t", long = "time_limit")]
    time_limit: Option<f64>,

    // Report solve times, values and strategies
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,

    // Solve the two players one after the other
    #[structopt(long = "sequential")]
    sequential: bool,
}

fn load_game(opt: &Opt) -> GameResult<(GameDescription, NormalFormGame)> {
    let description = GameDescription::load(&opt.input_file)?;
    let game = description.to_game()?;
    Ok((description, game))
}

fn print_strategy(
    description: &GameDescription,
    player: Player,
    solution: Option<&ZeroSumSolution>,
) {
    println!("-------------{} strategy-------------", player);
    match solution {
        Some(solution) => {
            for (index, prob) in solution.strategy.iter() {
                let label = description
                    .describe_pure_strategy(player, index)
                    .unwrap_or_else(|| index.to_string());
                println!("{} {}", label, prob);
            }
        }
        None => println!(),
    }
}

fn main() {
    env_logger::init();

    let opt = Opt::from_args();

    let solver_config = SolverConfig {
        time_limit: opt.time_limit,
        verbose: opt.verbose,
        parallel: !opt.sequential,
        ..SolverConfig::default()
    };
    if let Err(err) = solver_config.time_limit_duration() {
        eprintln!("{}", err);
        std::process::exit(2);
    }

    let (description, game) = match load_game(&opt) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!("Could not load {:?}: {}", opt.input_file, err);
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    info!(
        "Loaded {}-step game with {} and {} actions per step",
        game.game_step(),
        game.num_actions(Player::Player1),
        game.num_actions(Player::Player2)
    );

    let equilibrium = solve_game(&game, &solver_config);

    print_strategy(&description, Player::Player2, equilibrium.get(Player::Player2));
    print_strategy(&description, Player::Player1, equilibrium.get(Player::Player1));

    if let Some(game_value) = equilibrium.game_value() {
        info!("Game value for Player 1: {}", game_value);
    }
}
