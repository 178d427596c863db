use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
#[cfg(feature = "perft")]
use relay_chess::game::perft::PerftConfig;
use relay_chess::{
    game::{board::Board, playout::PlayoutConfig},
    protocols::relay::{
        relay_client, server::RelayConfig, DEFAULT_CACHE_CAPACITY, DEFAULT_LOG_FILE, DEFAULT_PORT,
    },
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs the relay server
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value_t = format!("0.0.0.0:{DEFAULT_PORT}"))]
        address: String,
        /// File finished games are appended to
        #[arg(short, long, default_value = DEFAULT_LOG_FILE)]
        log_file: PathBuf,
        /// Milliseconds after which a peer not accepting a frame is dropped
        #[arg(long, default_value_t = 5000)]
        send_timeout_ms: u64,
        /// Number of clicks kept in the relay cache
        #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
        cache_capacity: usize,
    },
    /// Plays a game from the terminal through a relay
    Connect {
        /// Address of the relay
        #[arg(short, long, default_value_t = format!("127.0.0.1:{DEFAULT_PORT}"))]
        address: String,
    },
    /// Runs perft (generating all moves up to a certain depth)
    Perft {
        /// Maximum depth to reach
        depth: u8,
        /// Starting position as a FEN string.
        #[arg(short, long)]
        position: Option<String>,
        /// Shows move count for each move from the starting position
        #[arg(short)]
        divide: bool,
        /// Generates moves for each depth up to the maximum
        #[arg(short)]
        iterative: bool,
        /// Show timing information
        #[arg(long)]
        bench: bool,
        /// Counts legal moves at horizon nodes instead of playing each of them
        #[arg(short)]
        bulk: bool,

        /// Does not show the board and other decorations
        #[arg(long)]
        no_board: bool,
    },
    /// Plays random games, checking that the rules hold along the way
    Playout {
        /// Number of games to play
        #[arg(short, long, default_value_t = 1)]
        games: usize,
        /// Plies after which a game is abandoned
        #[arg(short, long, default_value_t = 200)]
        plies: usize,
        /// Seed of the random generator
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Starting position as a FEN string.
        #[arg(long)]
        position: Option<String>,
    },
}

fn parse_board(fen: Option<String>) -> Board {
    match fen.map(|fen| Board::from_fen(&fen)) {
        Some(Ok(board)) => board,
        Some(Err(e)) => {
            eprintln!("Invalid position: {e}");
            std::process::exit(2)
        }
        None => Board::initial(),
    }
}

pub fn main() {
    let args = Arguments::parse();
    env_logger::init();

    match args.command {
        Command::Serve {
            address,
            log_file,
            send_timeout_ms,
            cache_capacity,
        } => {
            let server = RelayConfig::new()
                .with_address(address)
                .with_log_file(log_file)
                .with_send_timeout(Duration::from_millis(send_timeout_ms))
                .with_cache_capacity(cache_capacity)
                .bind()
                .and_then(|server| server.run());
            if let Err(e) = server {
                log::error!("relay stopped: {e}");
                std::process::exit(1)
            }
        }
        Command::Connect { address } => {
            if let Err(e) = relay_client(address) {
                eprintln!("{e}");
                std::process::exit(1)
            }
        }
        #[cfg(feature = "perft")]
        Command::Perft {
            position,
            depth,
            divide,
            iterative,
            bench,
            bulk,
            no_board,
        } => {
            let board = parse_board(position);

            PerftConfig {
                depth,
                divide,
                iterative,
                bench,
                bulk_counting: bulk,
                show_board: !no_board,
            }
            .go(&board);
        }
        #[cfg(not(feature = "perft"))]
        Command::Perft { .. } => {
            eprintln!("relay-chess has not been compiled with feature `perft`");
        }
        Command::Playout {
            games,
            plies,
            seed,
            position,
        } => {
            let board = parse_board(position);
            let reports = PlayoutConfig::default()
                .with_games(games)
                .with_max_plies(plies)
                .with_seed(seed)
                .go(&board);
            for (i, report) in reports.iter().enumerate() {
                match report.termination {
                    Some(termination) => println!("game {i}: {termination:?} after {} plies", report.plies),
                    None => println!("game {i}: unfinished after {} plies", report.plies),
                }
            }
        }
    }
}
