// src/main.rs

mod app;
mod config;
mod constants;
mod game;
mod ui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::game::board::Board;
use crate::game::search::SearchConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Board size (even, between 2 and 8)
    #[arg(long, default_value_t = 6)]
    size: usize,

    /// Time limit for exhaustive solving, in seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Search-config profile to load at startup
    #[arg(long)]
    profile: Option<String>,

    /// Play against the engine in a TUI instead of the command interpreter
    #[arg(long)]
    tui: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    use crossterm::{
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use ratatui::{prelude::CrosstermBackend, Terminal};

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut search_config = match &args.profile {
        Some(name) => config::load_profile(name)?,
        None => SearchConfig::default(),
    };
    if let Some(secs) = args.time_limit {
        search_config.time_limit_secs = secs;
    }

    let board = Board::new(args.size)?;
    let mut app = App::new(board, search_config);

    if args.tui {
        enable_raw_mode()?;
        execute!(std::io::stdout(), EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;
        let res = app.run_tui(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        res?;
    } else {
        app.run()?;
    }

    Ok(())
}
