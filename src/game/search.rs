// src/game/search.rs

pub mod ordering;
pub mod tt;

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::constants::DEFAULT_TIME_LIMIT_SECS;
use crate::game::board::{Board, Point};
use crate::game::evaluation;
use ordering::{KillerTable, OrderingTable};
use tt::TranspositionTable;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Wall-clock budget for an exhaustive solve, in whole seconds.
    pub time_limit_secs: u64,
    pub use_transposition: bool,
    pub use_ordering: bool,
    pub use_killer: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            use_transposition: true,
            use_ordering: true,
            use_killer: false,
        }
    }
}

/// Outcome of a (sub)search, from the perspective of the player to move at
/// the node in question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchResult {
    Win,
    Loss,
    /// Representable but unreachable: the komi tie-break precludes ties, and
    /// observing one is treated as a broken invariant, not a result.
    Draw,
    Aborted,
    MaxDepthReached,
}

impl SearchResult {
    /// The negamax step: a child's win is the parent's loss. Everything that
    /// is not a settled win/loss passes through unchanged, so an aborted
    /// subtree can never masquerade as a proven result in its ancestors.
    pub fn negate(self) -> Self {
        match self {
            SearchResult::Win => SearchResult::Loss,
            SearchResult::Loss => SearchResult::Win,
            other => other,
        }
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SearchResult::Win => "win",
            SearchResult::Loss => "loss",
            SearchResult::Draw => "draw",
            SearchResult::Aborted => "aborted",
            SearchResult::MaxDepthReached => "max depth reached",
        };
        f.write_str(text)
    }
}

/// Per-run search counters. Reset at the start of every solve or best-move
/// run, read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub searches: u64,
    pub terminals: u64,
    pub beta_cuts: u64,
    pub tt_hits: u64,
    pub tt_misses: u64,
    pub tt_evictions: u64,
}

impl Stats {
    pub fn searches_per_second(&self, elapsed_secs: f64) -> f64 {
        self.searches as f64 / elapsed_secs.max(1e-9)
    }
}

/// One scored first move out of a depth-limited best-move run.
#[derive(Clone, Debug)]
pub struct MoveValue {
    pub point: Point,
    pub value: f64,
    pub result: SearchResult,
}

#[derive(Clone, Debug)]
pub struct BestMoveReport {
    pub hit_depth_limit: bool,
    pub chosen: Option<Point>,
    pub candidates: Vec<MoveValue>,
    pub elapsed_secs: f64,
}

/// Depth budget for the best-move fallback, keyed on board size. Small
/// boards can afford to look further ahead.
fn max_search_depth(size: usize) -> u32 {
    match size {
        0..=5 => 7,
        6 => 6,
        7 => 5,
        _ => 4,
    }
}

/// Boolean negamax solver with a transposition table, corner-bias and killer
/// move ordering, and cooperative wall-clock abort.
pub struct Solver {
    pub config: SearchConfig,
    tt: TranspositionTable,
    ordering: OrderingTable,
    killer: KillerTable,
    stats: Stats,
    built_for: usize,
    start: Instant,
    hit_depth_limit: bool,
}

impl Solver {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            tt: TranspositionTable::new(),
            ordering: OrderingTable::default(),
            killer: KillerTable::default(),
            stats: Stats::default(),
            built_for: 0,
            start: Instant::now(),
            hit_depth_limit: false,
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Decide whether the side to move can force a win, within the
    /// configured time budget. Returns `Win`, `Loss` or `Aborted` (from the
    /// mover's perspective at call time) together with the elapsed seconds.
    /// The board comes back exactly as it went in.
    pub fn solve(&mut self, board: &mut Board) -> (SearchResult, f64) {
        self.prepare(board);
        debug!(size = board.size(), "starting exhaustive solve");

        let result = self.negamax(board);

        let elapsed = self.start.elapsed().as_secs_f64();
        info!(
            %result,
            elapsed_secs = elapsed,
            searches = self.stats.searches,
            tt_entries = self.tt.len(),
            "solve finished"
        );
        (result, elapsed)
    }

    /// Recommend a move via a depth-limited search, for positions too large
    /// to solve outright. Every candidate first move accumulates the static
    /// evaluation of each move considered anywhere in its subtree; the
    /// candidate with the largest accumulated value wins.
    pub fn best_move(&mut self, board: &mut Board) -> BestMoveReport {
        self.prepare(board);
        self.hit_depth_limit = false;
        let depth = max_search_depth(board.size());
        debug!(size = board.size(), depth, "starting depth-limited best-move search");

        let moves = self.ordered_moves(board);
        let mut candidates = Vec::with_capacity(moves.len());
        for m in moves {
            let mut value = evaluation::evaluate_move(board, m);
            let Some(mut played) = board.play_scoped(m) else {
                panic!("search generated an illegal candidate move at index {m}");
            };
            let result = self.negamax_limited(&mut played, depth - 1, &mut value).negate();
            drop(played);
            candidates.push(MoveValue {
                point: m,
                value,
                result,
            });
            if result == SearchResult::Aborted {
                // Out of budget: every remaining candidate would abort on
                // entry, so stop here and pick from what we have.
                break;
            }
        }

        let chosen = candidates
            .iter()
            .max_by(|a, b| a.value.total_cmp(&b.value))
            .map(|c| c.point);
        let elapsed = self.start.elapsed().as_secs_f64();
        info!(
            hit_depth_limit = self.hit_depth_limit,
            candidates = candidates.len(),
            elapsed_secs = elapsed,
            "best-move search finished"
        );
        BestMoveReport {
            hit_depth_limit: self.hit_depth_limit,
            chosen,
            candidates,
            elapsed_secs: elapsed,
        }
    }

    fn prepare(&mut self, board: &Board) {
        self.stats = Stats::default();
        self.start = Instant::now();
        self.tt.set_enabled(self.config.use_transposition);
        if self.built_for != board.size() {
            self.ordering = OrderingTable::new(board);
            self.killer = KillerTable::seeded(&self.ordering);
            self.built_for = board.size();
        }
        if self.config.use_ordering && self.config.use_killer {
            warn!("static ordering and killer heuristic both enabled; killer takes precedence");
        }
    }

    fn out_of_time(&self) -> bool {
        self.start.elapsed().as_secs_f64() > self.config.time_limit_secs as f64
    }

    fn ordered_moves(&self, board: &Board) -> Vec<Point> {
        let mut moves = board.legal_moves();
        if self.config.use_killer {
            self.killer.order_moves(&mut moves);
        } else if self.config.use_ordering {
            self.ordering.order_moves(board, &mut moves);
        }
        moves
    }

    fn tt_read(&mut self, board: &Board) -> Option<SearchResult> {
        if !self.tt.enabled() {
            return None;
        }
        match self.tt.read(board.hash()) {
            Some(result) => {
                self.stats.tt_hits += 1;
                Some(result)
            }
            None => {
                self.stats.tt_misses += 1;
                None
            }
        }
    }

    fn tt_write(&mut self, board: &Board, result: SearchResult) {
        if !self.tt.enabled() {
            return;
        }
        if self.tt.write(board.hash(), result) {
            self.stats.tt_evictions += 1;
        }
    }

    /// Settle a terminal position: the side to move wins iff it owns the
    /// final disc majority. A drawn terminal position cannot exist under
    /// komi; `Board::winner` aborts the run if it ever does.
    fn settle_terminal(&mut self, board: &Board) -> SearchResult {
        self.stats.terminals += 1;
        let (winner, _margin) = board.winner();
        if winner == board.current_player() {
            SearchResult::Win
        } else {
            SearchResult::Loss
        }
    }

    /// The exhaustive boolean negamax. The first winning move is a cutoff:
    /// nothing past it is explored, which is the entire pruning mechanism.
    /// `Aborted` propagates unchanged through every frame; it is never
    /// negated into a verdict and never written to the transposition table.
    fn negamax(&mut self, board: &mut Board) -> SearchResult {
        self.stats.searches += 1;
        let cells = board.size() * board.size();
        assert!(
            board.history_len() <= cells - 4,
            "undo stack outgrew the playable cell count"
        );

        if self.out_of_time() {
            return SearchResult::Aborted;
        }

        if let Some(cached) = self.tt_read(board) {
            return cached;
        }

        if board.terminal() {
            let result = self.settle_terminal(board);
            self.tt_write(board, result);
            return result;
        }

        trace!(node = self.stats.searches, "visiting\n{board}");

        for m in self.ordered_moves(board) {
            let Some(mut played) = board.play_scoped(m) else {
                panic!("search generated an illegal move at index {m}");
            };
            let result = self.negamax(&mut played).negate();
            drop(played);

            match result {
                SearchResult::Aborted => return SearchResult::Aborted,
                SearchResult::Win => {
                    self.stats.beta_cuts += 1;
                    if self.config.use_killer {
                        self.killer.record_cutoff(m);
                    }
                    self.tt_write(board, SearchResult::Win);
                    return SearchResult::Win;
                }
                _ => {}
            }
        }

        self.tt_write(board, SearchResult::Loss);
        SearchResult::Loss
    }

    /// Depth-limited variant used by `best_move`. Returns `MaxDepthReached`
    /// when the horizon cuts a branch short, which makes any enclosing
    /// `Loss` inexact; this search therefore never touches the transposition
    /// table. `acc` collects the static evaluation of every candidate move
    /// considered along the way.
    fn negamax_limited(&mut self, board: &mut Board, depth: u32, acc: &mut f64) -> SearchResult {
        self.stats.searches += 1;

        if self.out_of_time() {
            return SearchResult::Aborted;
        }

        if board.terminal() {
            return self.settle_terminal(board);
        }

        if depth == 0 {
            self.hit_depth_limit = true;
            return SearchResult::MaxDepthReached;
        }

        let moves = self.ordered_moves(board);
        for &m in &moves {
            *acc += evaluation::evaluate_move(board, m);
        }

        for m in moves {
            let Some(mut played) = board.play_scoped(m) else {
                panic!("search generated an illegal move at index {m}");
            };
            let result = self.negamax_limited(&mut played, depth - 1, acc).negate();
            drop(played);

            match result {
                SearchResult::Aborted => return SearchResult::Aborted,
                SearchResult::Win => {
                    self.stats.beta_cuts += 1;
                    if self.config.use_killer {
                        self.killer.record_cutoff(m);
                    }
                    return SearchResult::Win;
                }
                _ => {}
            }
        }

        SearchResult::Loss
    }
}
