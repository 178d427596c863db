//! # Perft testing/benchmarking
//!
//! Counts the leaves of the legal move tree, which pins down move generation
//! against well known reference counts.

use std::time::Instant;

use super::board::Board;

/// Builder pattern to configure a Perft test.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerftConfig {
    pub depth: u8,
    pub iterative: bool,
    pub bulk_counting: bool,
    pub divide: bool,

    pub bench: bool,

    pub show_board: bool,
}
impl PerftConfig {
    /// Whether to show the board at the start of the run.
    ///
    /// Should be disabled when trying to parse the output.
    pub fn show_board(mut self, value: bool) -> Self {
        self.show_board = value;
        self
    }

    /// Sets the maximum depth of the perft run.
    pub fn with_depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    /// If set to true, the run will start from all depth between 1 and the maximum.
    pub fn iterative_deepening(mut self, value: bool) -> Self {
        self.iterative = value;
        self
    }

    /// If set to true, simply returns the number of the legal moves at horizon nodes.
    pub fn bulk_counting(mut self, value: bool) -> Self {
        self.bulk_counting = value;
        self
    }

    /// Shows perft results per legal move at the starting position.
    pub fn divide_moves(mut self, value: bool) -> Self {
        self.divide = value;
        self
    }

    /// Measures the time it takes to complete one depth.
    pub fn benchmark(mut self, value: bool) -> Self {
        self.bench = value;
        self
    }

    /// Runs a Perft test on the given board, returning the node count of the
    /// deepest run.
    pub fn go(&self, board: &Board) -> u64 {
        if self.show_board {
            println!("{board}\n");
        }

        let mut nodes = 0;
        for depth in (if self.iterative { 1 } else { self.depth })..=self.depth {
            if self.iterative && self.divide {
                println!("====== DEPTH {depth} ======")
            }
            let start = Instant::now();
            nodes = board
                .legal_move_list()
                .into_iter()
                .map(|(origin, target)| {
                    let mut child = board.clone();
                    if let Err(e) = child.make(origin, target) {
                        log::error!("legal move {origin}{target} rejected: {e}");
                        return 0;
                    }
                    let mv_nodes = perft_rec(&child, depth.saturating_sub(1), self.bulk_counting);
                    if self.divide {
                        println!("{origin}{target}: {mv_nodes} nodes");
                    }
                    mv_nodes
                })
                .sum();
            let elapsed = start.elapsed().as_secs_f64();
            println!("depth {depth}: {nodes} nodes");
            if self.bench {
                println!(
                    "\ttook {} ({})",
                    human_readable_time(elapsed),
                    human_readable_nps(nodes as f64 / elapsed)
                );
            }
        }
        nodes
    }
}

/// Traverses all nodes accessible from a given board, returning the number of
/// leaves reached.
pub fn perft_rec(board: &Board, depth_left: u8, bulk_counting: bool) -> u64 {
    if depth_left == 0 {
        1
    } else if depth_left == 1 && bulk_counting {
        board.count_legal_moves() as u64
    } else {
        board
            .legal_move_list()
            .into_iter()
            .map(|(origin, target)| {
                let mut child = board.clone();
                match child.make(origin, target) {
                    Ok(_) => perft_rec(&child, depth_left - 1, bulk_counting),
                    Err(_) => 0,
                }
            })
            .sum()
    }
}

fn human_readable_time(secs: f64) -> String {
    if secs < 0.001 {
        format!("{:.3}μs", secs * 1_000_000.)
    } else if secs < 1. {
        format!("{:.3}ms", secs * 1_000.)
    } else {
        format!("{secs:.3}s")
    }
}

fn human_readable_nps(nps: f64) -> String {
    if nps > 1_000_000. {
        format!("{:.3}Mnps", nps / 1_000_000.)
    } else if nps > 1_000. {
        format!("{:.3}Knps", nps / 1_000.)
    } else {
        format!("{nps:.3}nps")
    }
}
