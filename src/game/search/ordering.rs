// src/game/search/ordering.rs

use crate::constants::{
    CAPTURE_TIEBREAK_DIVISOR, CORNER_NEIGHBOR_WEIGHT, CORNER_WEIGHT, KILLER_SEED_SCALE,
};
use crate::game::board::{Board, Point};

/// Static corner-bias move weights, built once per board size.
///
/// Corners get a strongly negative (preferred) weight; every cell adjacent to
/// a corner, diagonals included, gets a strongly positive one, cumulative
/// when a cell touches more than one corner. Everything else stays at zero.
/// Lower weight means tried first.
#[derive(Default)]
pub struct OrderingTable {
    weights: Vec<f64>,
}

impl OrderingTable {
    pub fn new(board: &Board) -> Self {
        let size = board.size();
        let mut weights = vec![0.0; size * size];
        let limit = size - 1;
        let corners = [
            board.point(0, 0),
            board.point(0, limit),
            board.point(limit, 0),
            board.point(limit, limit),
        ];
        for &corner in &corners {
            weights[corner] = CORNER_WEIGHT;
        }
        for &corner in &corners {
            for neighbor in board.points_beside(corner) {
                weights[neighbor] += CORNER_NEIGHBOR_WEIGHT;
            }
        }
        Self { weights }
    }

    pub fn weight(&self, p: Point) -> f64 {
        self.weights[p]
    }

    pub(super) fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sort `moves` ascending by static weight, ties broken by the number of
    /// discs the move would flip right now, fewer flips first: giving away
    /// fewer discs early preserves flexibility. Stable, so repeated calls on
    /// the same inputs agree.
    pub fn order_moves(&self, board: &Board, moves: &mut [Point]) {
        let mut keyed: Vec<(f64, Point)> = moves
            .iter()
            .map(|&m| {
                let key =
                    self.weight(m) + board.num_captured(m) as f64 / CAPTURE_TIEBREAK_DIVISOR;
                (key, m)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (slot, (_, m)) in moves.iter_mut().zip(keyed) {
            *slot = m;
        }
    }
}

/// Cutoff counts per move, seeded from the static weights so statically good
/// moves start with a head start. Counts only ever grow within a run; the
/// table is rebuilt when the board size changes.
#[derive(Default)]
pub struct KillerTable {
    counts: Vec<f64>,
}

impl KillerTable {
    pub fn seeded(ordering: &OrderingTable) -> Self {
        let counts = ordering
            .weights()
            .iter()
            .map(|w| -w * KILLER_SEED_SCALE)
            .collect();
        Self { counts }
    }

    pub fn record_cutoff(&mut self, p: Point) {
        self.counts[p] += 1.0;
    }

    pub fn cutoffs(&self, p: Point) -> f64 {
        self.counts[p]
    }

    /// Sort `moves` so the highest historical cutoff counts come first.
    pub fn order_moves(&self, moves: &mut [Point]) {
        let mut keyed: Vec<(f64, Point)> =
            moves.iter().map(|&m| (-self.counts[m], m)).collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (slot, (_, m)) in moves.iter_mut().zip(keyed) {
            *slot = m;
        }
    }
}
