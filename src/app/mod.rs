// src/app/mod.rs

use std::io::{self, BufRead, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{prelude::Backend, Terminal};
use tracing::debug;

use crate::config;
use crate::game::board::Board;
use crate::game::evaluation;
use crate::game::search::{SearchConfig, Solver, Stats};
use crate::ui;

const COMMANDS: &str = "commands showboard moves play undo reset size timelimit set solve \
                        bestmove eval stats profiles saveprofile loadprofile quit";

/// Holds the board and solver, and drives them either from a line-oriented
/// command interpreter (the default) or from the TUI event loop.
pub struct App {
    pub board: Board,
    pub solver: Solver,
    pub user_input: String,
    pub message: Option<String>,
    should_quit: bool,
    last_elapsed: f64,
}

impl App {
    pub fn new(board: Board, config: SearchConfig) -> Self {
        Self {
            board,
            solver: Solver::new(config),
            user_input: String::new(),
            message: None,
            should_quit: false,
            last_elapsed: 0.0,
        }
    }

    /// The command interpreter: one command per line on stdin, replies on
    /// stdout prefixed `=` on success and `?` on error.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for line in stdin.lock().lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match self.execute(trimmed) {
                Ok(reply) if reply.is_empty() => writeln!(out, "=")?,
                Ok(reply) => writeln!(out, "= {reply}")?,
                Err(reply) => writeln!(out, "? {reply}")?,
            }
            out.flush()?;
            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    pub fn execute(&mut self, line: &str) -> Result<String, String> {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            return Ok(String::new());
        };
        let args: Vec<&str> = parts.collect();
        debug!(cmd, ?args, "executing command");

        match cmd {
            "commands" => Ok(COMMANDS.to_string()),
            "showboard" => Ok(format!("\n{}", self.board)),
            "moves" => Ok(self
                .board
                .legal_moves()
                .iter()
                .map(|&m| self.board.point_to_str(m))
                .collect::<Vec<_>>()
                .join(" ")),
            "play" => {
                let arg = args
                    .first()
                    .ok_or_else(|| String::from("usage: play <move>"))?;
                let point = self.board.str_to_point(arg).map_err(|e| e.to_string())?;
                if self.board.play(point) {
                    Ok(String::new())
                } else {
                    Err(format!("illegal move: {arg}"))
                }
            }
            "undo" => {
                if self.board.history_len() == 0 {
                    Err(String::from("nothing to undo"))
                } else {
                    self.board.undo();
                    Ok(String::new())
                }
            }
            "reset" => {
                self.board.reset();
                Ok(String::new())
            }
            "size" => {
                let arg = args
                    .first()
                    .ok_or_else(|| String::from("usage: size <n>"))?;
                let size: usize = arg
                    .parse()
                    .map_err(|_| format!("not a board size: {arg}"))?;
                self.board.change_size(size).map_err(|e| e.to_string())?;
                Ok(String::new())
            }
            "timelimit" => {
                let arg = args
                    .first()
                    .ok_or_else(|| String::from("usage: timelimit <seconds>"))?;
                let secs: u64 = arg
                    .parse()
                    .map_err(|_| format!("not a number of seconds: {arg}"))?;
                self.solver.config.time_limit_secs = secs;
                Ok(String::new())
            }
            "set" => self.execute_set(&args),
            "solve" => {
                let (result, elapsed) = self.solver.solve(&mut self.board);
                self.last_elapsed = elapsed;
                Ok(format!(
                    "result: {result} ({elapsed:.3}s)\n{}",
                    format_stats(self.solver.stats(), elapsed)
                ))
            }
            "bestmove" => {
                let report = self.solver.best_move(&mut self.board);
                self.last_elapsed = report.elapsed_secs;
                let mut lines = vec![
                    match report.chosen {
                        Some(m) => format!("move: {}", self.board.point_to_str(m)),
                        None => String::from("move: none"),
                    },
                    format!("hit_depth_limit: {}", report.hit_depth_limit),
                ];
                for c in &report.candidates {
                    lines.push(format!(
                        "  {} value {:.3} ({})",
                        self.board.point_to_str(c.point),
                        c.value,
                        c.result
                    ));
                }
                lines.push(format_stats(self.solver.stats(), report.elapsed_secs));
                Ok(lines.join("\n"))
            }
            "eval" => Ok(format!("{:.3}", evaluation::evaluate_state(&self.board))),
            "stats" => Ok(format_stats(self.solver.stats(), self.last_elapsed)),
            "profiles" => config::get_profiles()
                .map(|p| p.join(" "))
                .map_err(|e| e.to_string()),
            "saveprofile" => {
                let name = args
                    .first()
                    .ok_or_else(|| String::from("usage: saveprofile <name>"))?;
                config::save_profile(name, &self.solver.config).map_err(|e| e.to_string())?;
                Ok(String::new())
            }
            "loadprofile" => {
                let name = args
                    .first()
                    .ok_or_else(|| String::from("usage: loadprofile <name>"))?;
                self.solver.config = config::load_profile(name).map_err(|e| e.to_string())?;
                Ok(String::new())
            }
            "quit" => {
                self.should_quit = true;
                Ok(String::new())
            }
            _ => Err(format!("unknown command: {cmd}")),
        }
    }

    fn execute_set(&mut self, args: &[&str]) -> Result<String, String> {
        let usage = || String::from("usage: set <tt|ordering|killer> <on|off>");
        let flag = args.first().ok_or_else(usage)?;
        let state = match args.get(1).copied() {
            Some("on") => true,
            Some("off") => false,
            _ => return Err(usage()),
        };
        match *flag {
            "tt" => self.solver.config.use_transposition = state,
            "ordering" => self.solver.config.use_ordering = state,
            "killer" => self.solver.config.use_killer = state,
            other => return Err(format!("unknown flag: {other}")),
        }
        Ok(String::new())
    }

    pub fn run_tui<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|f| ui::draw(f, self))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc => self.should_quit = true,
                        KeyCode::Char(c) => {
                            self.user_input.push(c);
                        }
                        KeyCode::Backspace => {
                            self.user_input.pop();
                        }
                        KeyCode::Enter => self.handle_move_input(),
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// Play the typed move for the human, then answer with the engine's
    /// best move.
    fn handle_move_input(&mut self) {
        let input = self.user_input.trim().to_string();
        self.user_input.clear();
        if input.is_empty() {
            return;
        }
        let point = match self.board.str_to_point(&input) {
            Ok(p) => p,
            Err(e) => {
                self.message = Some(e.to_string());
                return;
            }
        };
        if !self.board.play(point) {
            self.message = Some(format!("illegal move: {input}"));
            return;
        }
        if self.board.terminal() {
            self.message = Some(game_over_message(&self.board));
            return;
        }

        let report = self.solver.best_move(&mut self.board);
        match report.chosen {
            Some(reply) => {
                let notation = self.board.point_to_str(reply);
                if !self.board.play(reply) {
                    panic!("engine reply {notation} rejected by the board");
                }
                self.message = Some(if self.board.terminal() {
                    format!("engine plays {notation}; {}", game_over_message(&self.board))
                } else {
                    format!("engine plays {notation}")
                });
            }
            None => {
                self.message = Some(String::from("engine has no legal reply"));
            }
        }
    }
}

fn game_over_message(board: &Board) -> String {
    let (winner, margin) = board.winner();
    format!("game over: {} wins by {:.1}", winner.symbol(), margin.abs())
}

fn format_stats(stats: &Stats, elapsed_secs: f64) -> String {
    format!(
        "searches: {}\n\
         searches_per_second: {:.1}\n\
         terminals: {}\n\
         beta_cuts: {}\n\
         tt_hits: {}\n\
         tt_misses: {}\n\
         tt_evictions: {}",
        stats.searches,
        stats.searches_per_second(elapsed_secs),
        stats.terminals,
        stats.beta_cuts,
        stats.tt_hits,
        stats.tt_misses,
        stats.tt_evictions
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Board::new(4).unwrap(), SearchConfig::default())
    }

    #[test]
    fn moves_play_undo_flow() {
        let mut app = app();
        assert_eq!(app.execute("moves").unwrap(), "A2 B1 C4 D3");
        assert_eq!(app.execute("play A2").unwrap(), "");
        assert_eq!(app.execute("undo").unwrap(), "");
        assert_eq!(app.execute("moves").unwrap(), "A2 B1 C4 D3");
    }

    #[test]
    fn play_rejects_bad_input() {
        let mut app = app();
        assert!(app.execute("play").is_err());
        assert!(app.execute("play Z9").is_err());
        assert!(app.execute("play A1").is_err());
        assert_eq!(app.board.history_len(), 0);
    }

    #[test]
    fn undo_on_fresh_board_is_a_usage_error() {
        let mut app = app();
        assert!(app.execute("undo").is_err());
    }

    #[test]
    fn unknown_commands_are_reported() {
        let mut app = app();
        let err = app.execute("frobnicate").unwrap_err();
        assert!(err.contains("unknown command"));
    }

    #[test]
    fn toggles_update_the_search_config() {
        let mut app = app();
        app.execute("set tt off").unwrap();
        app.execute("set ordering off").unwrap();
        app.execute("set killer on").unwrap();
        assert!(!app.solver.config.use_transposition);
        assert!(!app.solver.config.use_ordering);
        assert!(app.solver.config.use_killer);
        assert!(app.execute("set tt maybe").is_err());
        assert!(app.execute("set gravity on").is_err());
    }

    #[test]
    fn timelimit_updates_the_config() {
        let mut app = app();
        app.execute("timelimit 5").unwrap();
        assert_eq!(app.solver.config.time_limit_secs, 5);
        assert!(app.execute("timelimit soon").is_err());
    }

    #[test]
    fn size_command_validates() {
        let mut app = app();
        assert!(app.execute("size 5").is_err());
        app.execute("size 6").unwrap();
        assert_eq!(app.board.size(), 6);
    }

    #[test]
    fn showboard_prints_the_grid() {
        let mut app = app();
        let reply = app.execute("showboard").unwrap();
        assert!(reply.contains("A B C D"));
        assert!(reply.contains("to play: X"));
    }

    #[test]
    fn solve_reports_result_and_stats() {
        let mut app = app();
        app.execute("set tt on").unwrap();
        let reply = app.execute("solve").unwrap();
        assert!(reply.contains("result: loss"));
        assert!(reply.contains("searches:"));
        assert!(reply.contains("tt_evictions:"));
    }

    #[test]
    fn zero_timelimit_solve_aborts() {
        let mut app = App::new(Board::new(6).unwrap(), SearchConfig::default());
        app.execute("timelimit 0").unwrap();
        let reply = app.execute("solve").unwrap();
        assert!(reply.contains("result: aborted"));
    }

    #[test]
    fn bestmove_reports_a_candidate() {
        let mut app = app();
        let reply = app.execute("bestmove").unwrap();
        assert!(reply.contains("move: "));
        assert!(reply.contains("hit_depth_limit:"));
    }

    #[test]
    fn eval_reports_a_number() {
        let mut app = app();
        let reply = app.execute("eval").unwrap();
        assert!(reply.parse::<f64>().is_ok());
    }
}
