// src/ui/mod.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;
use crate::game::board::Cell;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(app.board.size() as u16 + 3),
            Constraint::Length(7),
            Constraint::Length(3),
        ])
        .split(frame.size());

    draw_board(frame, chunks[0], app);
    draw_status(frame, chunks[1], app);
    draw_input(frame, chunks[2], app);
}

fn draw_board(frame: &mut Frame, area: Rect, app: &App) {
    let board = &app.board;
    let size = board.size();
    let mut text = Text::default();

    let mut header = Line::default();
    header.spans.push(Span::raw("  "));
    for x in 0..size {
        header.spans.push(Span::styled(
            format!(" {} ", (b'A' + x as u8) as char),
            Style::default().fg(Color::Gray),
        ));
    }
    text.lines.push(header);

    for y in 0..size {
        let mut line = Line::default();
        line.spans.push(Span::styled(
            format!("{} ", y + 1),
            Style::default().fg(Color::Gray),
        ));
        for x in 0..size {
            let bg = if (x + y) % 2 == 0 {
                Color::Rgb(0, 110, 60)
            } else {
                Color::Rgb(0, 92, 50)
            };
            let (symbol, fg) = match board.cell(x, y) {
                Cell::Black => ("●", Color::Black),
                Cell::White => ("●", Color::White),
                Cell::Empty => ("·", Color::Rgb(0, 140, 80)),
            };
            line.spans.push(Span::styled(
                format!(" {symbol} "),
                Style::default().bg(bg).fg(fg),
            ));
        }
        text.lines.push(line);
    }

    let widget = Paragraph::new(text).block(
        Block::default()
            .title(format!("Othello {size}x{size}"))
            .borders(Borders::ALL),
    );
    frame.render_widget(widget, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let (black, white) = app.board.counts();
    let config = &app.solver.config;
    let mut lines = vec![
        Line::from(format!(
            "to play: {}   discs: X {black} - O {white}",
            app.board.current_player().symbol()
        )),
        Line::from(format!(
            "time limit: {}s   tt: {}   ordering: {}   killer: {}",
            config.time_limit_secs,
            on_off(config.use_transposition),
            on_off(config.use_ordering),
            on_off(config.use_killer)
        )),
        Line::from("type a move like C3 and press Enter; Esc quits"),
    ];
    if let Some(message) = &app.message {
        lines.push(Line::from(message.as_str()));
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().title("Status").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
    let widget = Paragraph::new(app.user_input.as_str())
        .block(Block::default().title("Move").borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
