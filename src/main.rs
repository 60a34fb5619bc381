use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use rand::Rng;

use slide_2048::engine::{self as GameEngine, GameState, Move, Rules, Status};
use slide_2048::Config;

#[derive(Parser, Debug)]
#[command(name = "slide-2048", version, about = "Play 2048 in the terminal")]
struct Cli {
    /// TOML file with an optional `seed` and `[rules]` table
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Seed for the tile spawner (overrides the config file)
    #[arg(short, long, value_name = "N", global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive game: type w/a/s/d, h/j/k/l or a direction name, `n` for a new game, `q` to quit
    Play,
    /// Play random directions until the game ends
    Auto {
        /// Stop after this many accepted moves
        #[arg(long, value_name = "N")]
        max_moves: Option<u64>,
        /// Only print the final summary
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut config = match &cli.config {
        Some(path) => Config::from_toml(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    info!(
        "rules: win tile {}, four probability {}, seed {:?}",
        config.rules.win_tile(),
        config.rules.four_probability(),
        config.seed
    );

    GameEngine::new();
    let mut rng = config.rng();
    match cli.cmd {
        Command::Play => play(&config.rules, &mut rng),
        Command::Auto { max_moves, quiet } => auto(&config.rules, &mut rng, max_moves, quiet),
    }
}

fn print_state(out: &mut impl Write, state: &GameState) -> io::Result<()> {
    writeln!(out, "\n{}", state.board)?;
    writeln!(out, "Score: {}", state.score)?;
    match state.status {
        Status::Won => writeln!(out, "Congratulations! You won!"),
        Status::Lost => writeln!(out, "Game Over!"),
        Status::InProgress => Ok(()),
    }
}

fn play<R: Rng>(rules: &Rules, rng: &mut R) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut state = rules.new_game(rng);
    print_state(&mut stdout, &state)?;

    for line in stdin.lock().lines() {
        let line = line.context("reading input")?;
        match line.trim() {
            "" => continue,
            "q" | "quit" => break,
            "n" | "new" => state = rules.new_game(rng),
            input => match input.parse::<Move>() {
                Ok(dir) => state = rules.apply_move(state, dir, rng).state,
                Err(e) => {
                    writeln!(stdout, "{e}; use w/a/s/d, h/j/k/l, n or q")?;
                    continue;
                }
            },
        }
        print_state(&mut stdout, &state)?;
        stdout.flush()?;
    }
    Ok(())
}

fn auto<R: Rng>(rules: &Rules, rng: &mut R, max_moves: Option<u64>, quiet: bool) -> Result<()> {
    let mut state = rules.new_game(rng);
    let mut moves: u64 = 0;
    while !state.status.is_terminal() && max_moves.map_or(true, |limit| moves < limit) {
        let dir = Move::ALL[rng.gen_range(0..Move::ALL.len())];
        let out = rules.apply_move(state, dir, rng);
        state = out.state;
        if out.moved {
            moves += 1;
            if !quiet {
                println!("{dir}:{}", state.board);
            }
        }
    }
    info!("finished after {} moves", moves);
    println!(
        "Moves: {} | score: {} | highest tile: {} | status: {:?}",
        moves,
        state.score,
        state.board.highest_tile(),
        state.status
    );
    Ok(())
}
