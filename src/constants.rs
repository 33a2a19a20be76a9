// src/constants.rs

// Transposition table
pub const TT_CAPACITY: usize = 100_000;
pub const TT_EVICTION_RATE: f64 = 0.25;

// Move ordering
pub const CORNER_WEIGHT: f64 = -10.0;
pub const CORNER_NEIGHBOR_WEIGHT: f64 = 10.0;
pub const CAPTURE_TIEBREAK_DIVISOR: f64 = 100.0;
pub const KILLER_SEED_SCALE: f64 = 1.0;

// Evaluation
pub const MOBILITY_WEIGHT: f64 = 1.0;
pub const PARITY_WEIGHT: f64 = 0.05;
pub const CORNER_VALUE: f64 = 25.0;

// Search
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 60;
