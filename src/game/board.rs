// src/game/board.rs

use std::fmt;
use std::ops::{Deref, DerefMut};

use thiserror::Error;

pub const MIN_SIZE: usize = 2;
pub const MAX_SIZE: usize = 8;

/// Asymmetric tie-break added to Black's disc margin so a finished game can
/// never score exactly zero.
pub const KOMI: f64 = 0.5;

/// The eight capture directions, horizontal, vertical and diagonal.
pub(crate) const DIRS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Canonical move identity: a packed cell index, `x * size + y`, where `x` is
/// the column and `y` the row. Textual notation ("A1") exists only at the
/// CLI boundary.
pub type Point = usize;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board size must be even and between {MIN_SIZE} and {MAX_SIZE}, got {0}")]
    InvalidSize(usize),
    #[error("invalid move notation: {0:?}")]
    InvalidNotation(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Black,
    White,
}

impl Cell {
    pub fn opponent(self) -> Cell {
        match self {
            Cell::Black => Cell::White,
            Cell::White => Cell::Black,
            Cell::Empty => unreachable!("the empty cell has no opponent"),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Black => 'X',
            Cell::White => 'O',
        }
    }
}

/// Per-cell random keys for position fingerprinting. Generated from a
/// fixed-seed splitmix64 sequence so fingerprints are stable across runs and
/// across board instances of the same size.
#[derive(Clone)]
struct Zobrist {
    black: Vec<u64>,
    white: Vec<u64>,
    white_to_move: u64,
}

impl Zobrist {
    fn new(cells: usize) -> Self {
        // splitmix64 with a fixed seed: deterministic, well-mixed keys.
        let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
        let mut next = || {
            seed = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = seed;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^ (z >> 31)
        };
        let black = (0..cells).map(|_| next()).collect();
        let white = (0..cells).map(|_| next()).collect();
        Self {
            black,
            white,
            white_to_move: next(),
        }
    }
}

/// An Othello position: square grid, side to move, and the undo stack of
/// every move played since the last reset (each with the cells it flipped).
#[derive(Clone)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
    current: Cell,
    history: Vec<(Point, Vec<Point>)>,
    zobrist: Zobrist,
}

impl Board {
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if size < MIN_SIZE || size > MAX_SIZE || size % 2 != 0 {
            return Err(BoardError::InvalidSize(size));
        }
        let mut board = Self {
            size,
            cells: vec![Cell::Empty; size * size],
            current: Cell::Black,
            history: Vec::new(),
            zobrist: Zobrist::new(size * size),
        };
        board.reset();
        Ok(board)
    }

    /// Reset to the standard opening layout: the four central cells hold two
    /// discs of each color, Black to move.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::Empty);
        self.history.clear();
        self.current = Cell::Black;

        let m2 = self.size / 2;
        let m1 = m2 - 1;
        self.place(self.point(m1, m1), Cell::White);
        self.place(self.point(m2, m2), Cell::White);
        self.place(self.point(m1, m2), Cell::Black);
        self.place(self.point(m2, m1), Cell::Black);
    }

    /// Change the board size and reset.
    pub fn change_size(&mut self, size: usize) -> Result<(), BoardError> {
        if size < MIN_SIZE || size > MAX_SIZE || size % 2 != 0 {
            return Err(BoardError::InvalidSize(size));
        }
        self.size = size;
        self.cells = vec![Cell::Empty; size * size];
        self.zobrist = Zobrist::new(size * size);
        self.reset();
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn current_player(&self) -> Cell {
        self.current
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn point(&self, x: usize, y: usize) -> Point {
        x * self.size + y
    }

    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cells[x * self.size + y]
    }

    pub fn is_corner(&self, p: Point) -> bool {
        let (x, y) = (p / self.size, p % self.size);
        let limit = self.size - 1;
        (x == 0 || x == limit) && (y == 0 || y == limit)
    }

    /// Place a disc without legality checking, replacing whatever is there.
    /// Bypasses the undo stack; meant for board setup, not for play.
    pub fn place(&mut self, p: Point, color: Cell) {
        self.cells[p] = color;
    }

    /// "A1" for the top-left cell: column letter, then 1-based row.
    pub fn point_to_str(&self, p: Point) -> String {
        let (x, y) = (p / self.size, p % self.size);
        format!("{}{}", (b'A' + x as u8) as char, y + 1)
    }

    pub fn str_to_point(&self, s: &str) -> Result<Point, BoardError> {
        let invalid = || BoardError::InvalidNotation(s.to_string());
        let mut chars = s.chars();
        let col = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        if !col.is_ascii_uppercase() {
            return Err(invalid());
        }
        let x = (col as u8 - b'A') as usize;
        let row: usize = chars.as_str().parse().map_err(|_| invalid())?;
        if row == 0 || row > self.size || x >= self.size {
            return Err(invalid());
        }
        Ok(self.point(x, row - 1))
    }

    fn in_bounds(&self, n: i32) -> bool {
        n >= 0 && (n as usize) < self.size
    }

    /// Every cell adjacent (including diagonally) to `p`.
    pub fn points_beside(&self, p: Point) -> Vec<Point> {
        let (x, y) = ((p / self.size) as i32, (p % self.size) as i32);
        DIRS.iter()
            .filter(|(dx, dy)| self.in_bounds(x + dx) && self.in_bounds(y + dy))
            .map(|(dx, dy)| self.point((x + dx) as usize, (y + dy) as usize))
            .collect()
    }

    /// All cells a move at `p` by `color` would flip. Empty when the move is
    /// illegal. Scans each of the eight directions for a run of opponent
    /// discs closed off by one of `color`'s own.
    fn captures_for(&self, p: Point, color: Cell) -> Vec<Point> {
        if self.cells[p] != Cell::Empty {
            return Vec::new();
        }
        let opponent = color.opponent();
        let (x, y) = ((p / self.size) as i32, (p % self.size) as i32);
        let mut all = Vec::new();

        for (dx, dy) in DIRS {
            let (mut cx, mut cy) = (x + dx, y + dy);
            let mut seen_opponent = false;
            let mut run = Vec::new();

            while self.in_bounds(cx) && self.in_bounds(cy) {
                let here = self.point(cx as usize, cy as usize);
                if self.cells[here] == opponent {
                    run.push(here);
                    seen_opponent = true;
                } else if self.cells[here] == Cell::Empty {
                    run.clear();
                    break;
                } else if seen_opponent {
                    // Closed line of captures.
                    all.append(&mut run);
                    break;
                }
                cx += dx;
                cy += dy;
            }
        }
        all
    }

    pub fn captures(&self, p: Point) -> Vec<Point> {
        self.captures_for(p, self.current)
    }

    /// How many opponent discs a hypothetical move at `p` would flip.
    pub fn num_captured(&self, p: Point) -> usize {
        self.captures(p).len()
    }

    pub fn is_legal(&self, p: Point) -> bool {
        !self.captures(p).is_empty()
    }

    /// Legal moves for the side to move, in ascending cell-index order.
    pub fn legal_moves(&self) -> Vec<Point> {
        (0..self.cells.len())
            .filter(|&p| self.is_legal(p))
            .collect()
    }

    pub(crate) fn mobility(&self, color: Cell) -> usize {
        (0..self.cells.len())
            .filter(|&p| !self.captures_for(p, color).is_empty())
            .count()
    }

    fn has_legal_move(&self, color: Cell) -> bool {
        (0..self.cells.len()).any(|p| !self.captures_for(p, color).is_empty())
    }

    /// Play at `p` for the side to move. Returns false (leaving the state
    /// untouched) when the move captures nothing.
    pub fn play(&mut self, p: Point) -> bool {
        let captures = self.captures(p);
        if captures.is_empty() {
            return false;
        }
        self.cells[p] = self.current;
        for &c in &captures {
            self.cells[c] = self.current;
        }
        self.current = self.current.opponent();
        self.history.push((p, captures));
        true
    }

    /// Reverse the most recent `play`. Calling this with no unmatched play is
    /// an internal-consistency violation and aborts the run.
    pub fn undo(&mut self) {
        let (p, captures) = self
            .history
            .pop()
            .unwrap_or_else(|| panic!("undo called with no move to undo"));
        self.cells[p] = Cell::Empty;
        // The side to move right now is the one whose discs were flipped.
        for c in captures {
            self.cells[c] = self.current;
        }
        self.current = self.current.opponent();
    }

    /// Play at `p` and return a guard that undoes the move when dropped, so
    /// the mutation is reverted on every exit path.
    pub fn play_scoped(&mut self, p: Point) -> Option<PlayGuard<'_>> {
        if self.play(p) {
            Some(PlayGuard { board: self })
        } else {
            None
        }
    }

    /// True when neither the side to move nor its opponent has a legal move.
    pub fn terminal(&self) -> bool {
        !self.has_legal_move(self.current) && !self.has_legal_move(self.current.opponent())
    }

    pub fn counts(&self) -> (usize, usize) {
        let black = self.cells.iter().filter(|&&c| c == Cell::Black).count();
        let white = self.cells.iter().filter(|&&c| c == Cell::White).count();
        (black, white)
    }

    /// Winner and signed margin (Black's perspective), meaningful only on a
    /// terminal position. The komi tie-break guarantees a strict winner; an
    /// exact zero margin means the tie-break itself is broken, which is fatal.
    pub fn winner(&self) -> (Cell, f64) {
        let (black, white) = self.counts();
        let score = black as f64 - white as f64 + KOMI;
        if score > 0.0 {
            (Cell::Black, score)
        } else if score < 0.0 {
            (Cell::White, score)
        } else {
            panic!("terminal position scored an exact tie despite komi");
        }
    }

    /// Position fingerprint: a function of board contents and side to move
    /// only, never of move history.
    pub fn hash(&self) -> u64 {
        let mut h = 0u64;
        for (i, &c) in self.cells.iter().enumerate() {
            match c {
                Cell::Black => h ^= self.zobrist.black[i],
                Cell::White => h ^= self.zobrist.white[i],
                Cell::Empty => {}
            }
        }
        if self.current == Cell::White {
            h ^= self.zobrist.white_to_move;
        }
        h
    }
}

impl fmt::Display for Board {
    /// ```text
    ///   A B C D
    /// 1 . . . .
    /// 2 . O X .
    /// 3 . X O .
    /// 4 . . . .
    /// to play: X
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = (0..self.size)
            .map(|x| ((b'A' + x as u8) as char).to_string())
            .collect();
        writeln!(f, "  {}", header.join(" "))?;
        for y in 0..self.size {
            let row: Vec<String> = (0..self.size)
                .map(|x| self.cell(x, y).symbol().to_string())
                .collect();
            writeln!(f, "{} {}", y + 1, row.join(" "))?;
        }
        write!(f, "to play: {}", self.current.symbol())
    }
}

/// RAII wrapper pairing a successful `play` with its `undo`.
pub struct PlayGuard<'a> {
    board: &'a mut Board,
}

impl Deref for PlayGuard<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for PlayGuard<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for PlayGuard<'_> {
    fn drop(&mut self) {
        self.board.undo();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(board: &Board) -> (Vec<Cell>, Cell, usize) {
        (board.cells.clone(), board.current, board.history.len())
    }

    #[test]
    fn initial_layout() {
        let board = Board::new(4).unwrap();
        assert_eq!(board.cell(1, 1), Cell::White);
        assert_eq!(board.cell(2, 2), Cell::White);
        assert_eq!(board.cell(1, 2), Cell::Black);
        assert_eq!(board.cell(2, 1), Cell::Black);
        assert_eq!(board.current_player(), Cell::Black);
        assert_eq!(board.history_len(), 0);
        assert_eq!(board.counts(), (2, 2));
    }

    #[test]
    fn rejects_invalid_sizes() {
        for size in [0, 1, 3, 5, 7, 9, 10] {
            let err = Board::new(size).err();
            assert_eq!(err, Some(BoardError::InvalidSize(size)));
        }
        for size in [2, 4, 6, 8] {
            assert!(Board::new(size).is_ok());
        }
    }

    #[test]
    fn opening_moves_four_by_four() {
        let board = Board::new(4).unwrap();
        let moves: Vec<String> = board
            .legal_moves()
            .iter()
            .map(|&m| board.point_to_str(m))
            .collect();
        assert_eq!(moves, ["A2", "B1", "C4", "D3"]);
        for m in board.legal_moves() {
            assert_eq!(board.num_captured(m), 1);
        }
    }

    #[test]
    fn notation_round_trip() {
        let board = Board::new(6).unwrap();
        for p in 0..36 {
            let s = board.point_to_str(p);
            assert_eq!(board.str_to_point(&s).unwrap(), p);
        }
        assert_eq!(board.str_to_point("a1").unwrap(), 0);
        for bad in ["", "1A", "Z3", "A0", "A7", "G1", "pass", "A"] {
            assert!(board.str_to_point(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn illegal_play_leaves_state_unchanged() {
        let mut board = Board::new(4).unwrap();
        let before = snapshot(&board);
        // Occupied cell and a captureless empty cell.
        assert!(!board.play(board.point(1, 1)));
        assert!(!board.play(board.point(0, 0)));
        assert_eq!(snapshot(&board), before);
    }

    #[test]
    fn play_then_undo_restores_board() {
        let mut board = Board::new(4).unwrap();
        let before = snapshot(&board);
        for _ in 0..3 {
            let m = board.legal_moves()[0];
            assert!(board.play(m));
        }
        assert_eq!(board.history_len(), 3);
        for _ in 0..3 {
            board.undo();
        }
        assert_eq!(snapshot(&board), before);
    }

    #[test]
    fn scoped_play_undoes_on_drop() {
        let mut board = Board::new(4).unwrap();
        let before = snapshot(&board);
        let m = board.legal_moves()[0];
        {
            let guard = board.play_scoped(m).unwrap();
            assert_eq!(guard.history_len(), 1);
        }
        assert_eq!(snapshot(&board), before);
        assert!(board.play_scoped(board.point(0, 0)).is_none());
    }

    #[test]
    fn two_by_two_is_terminal_with_komi_winner() {
        let board = Board::new(2).unwrap();
        assert!(board.terminal());
        let (winner, margin) = board.winner();
        assert_eq!(winner, Cell::Black);
        assert_eq!(margin, KOMI);
    }

    #[test]
    fn four_by_four_is_not_terminal() {
        let board = Board::new(4).unwrap();
        assert!(!board.terminal());
    }

    #[test]
    fn hash_depends_on_position_not_history() {
        let mut a = Board::new(4).unwrap();
        let b = Board::new(4).unwrap();
        assert_eq!(a.hash(), b.hash());

        let initial = a.hash();
        let m = a.legal_moves()[0];
        assert!(a.play(m));
        assert_ne!(a.hash(), initial);
        a.undo();
        assert_eq!(a.hash(), initial);
    }

    #[test]
    fn display_matches_notation_grid() {
        let board = Board::new(4).unwrap();
        let expected = "  A B C D\n\
                        1 . . . .\n\
                        2 . O X .\n\
                        3 . X O .\n\
                        4 . . . .\n\
                        to play: X";
        assert_eq!(board.to_string(), expected);
    }

    #[test]
    fn change_size_resets() {
        let mut board = Board::new(4).unwrap();
        let m = board.legal_moves()[0];
        assert!(board.play(m));
        board.change_size(6).unwrap();
        assert_eq!(board.size(), 6);
        assert_eq!(board.history_len(), 0);
        assert_eq!(board.counts(), (2, 2));
        assert!(board.change_size(5).is_err());
    }

    #[test]
    fn corners_and_neighbors() {
        let board = Board::new(4).unwrap();
        assert!(board.is_corner(board.point(0, 0)));
        assert!(board.is_corner(board.point(3, 3)));
        assert!(!board.is_corner(board.point(0, 1)));
        let beside = board.points_beside(board.point(0, 0));
        assert_eq!(beside.len(), 3);
    }
}
