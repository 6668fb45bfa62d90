//! C10: `ConfigureRCPSP` — the opaque knob bag forwarded to the external
//! metaheuristic. THE CORE never interprets these values; it only carries
//! them across the C8 boundary (spec section 6).

use clap::Parser;

#[derive(Parser, Clone, Debug)]
#[command(name = "rcpsp", about = "Resource-constrained project scheduling solver")]
pub struct Config {
    /// Maximum number of entries kept in the tabu list.
    #[arg(long, default_value_t = 8)]
    pub tabu_list_size: u32,

    /// Maximum distance (in permutation positions) considered for a swap move.
    #[arg(long, default_value_t = 20)]
    pub swap_range: u32,

    /// Number of non-improving reads tolerated before a tabu entry expires.
    #[arg(long, default_value_t = 2000)]
    pub maximal_value_of_read_counter: u32,

    /// Random precedence-safe swaps applied per diversification round (C7 fallback).
    #[arg(long, default_value_t = 50)]
    pub diversification_swaps: u32,

    /// Target number of seed permutations produced by the branching generator.
    #[arg(long, default_value_t = 8)]
    pub number_of_set_solutions: u32,

    /// Device occupancy hint for the external kernel's block scheduling.
    #[arg(long, default_value_t = 4)]
    pub number_of_blocks_per_multiprocessor: u32,

    /// Hard cap on the total number of metaheuristic iterations.
    #[arg(long, default_value_t = 100_000)]
    pub max_iter: u64,

    /// Stop early after this many iterations without improving the incumbent.
    #[arg(long, default_value_t = 10_000)]
    pub max_iter_since_best: u64,

    /// Seed for every randomised operation in the solver (diversification
    /// swaps, branching candidate shuffles). Kept explicit rather than
    /// drawn from process time, so runs are reproducible.
    #[arg(long, default_value_t = 0)]
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tabu_list_size: 8,
            swap_range: 20,
            maximal_value_of_read_counter: 2000,
            diversification_swaps: 50,
            number_of_set_solutions: 8,
            number_of_blocks_per_multiprocessor: 4,
            max_iter: 100_000,
            max_iter_since_best: 10_000,
            rng_seed: 0,
        }
    }
}
