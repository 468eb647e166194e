use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Flex;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use roster_terminal::calendar::{format_display_date, today};
use roster_terminal::config::AppConfig;
use roster_terminal::feed::spawn_sheet_provider;
use roster_terminal::model::SlotKey;
use roster_terminal::names::{identity_key, normalize_name};
use roster_terminal::sheets::DataSource;
use roster_terminal::state::{AppState, Delta, ProviderCommand, Screen, apply_delta};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const CONSOLE_LINES: usize = 3;

/// Raw mode plus alternate screen, undone on drop so a panic or early return
/// still leaves a usable shell.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn start() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

struct App {
    state: AppState,
    commands: Sender<ProviderCommand>,
    next_refresh: Instant,
    quit: bool,
}

impl App {
    fn handle_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay && matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            self.state.help_overlay = false;
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Suggestion,
            KeyCode::Char('2') => self.state.screen = Screen::Roster,
            KeyCode::Char('3') => self.state.screen = Screen::Stats,
            KeyCode::Char('r' | 'R') => self.refresh(true),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    /// Starts a new cycle; whatever an older one delivers later is dropped.
    fn refresh(&mut self, manual: bool) {
        let cycle = self.state.begin_cycle();
        self.next_refresh = Instant::now() + self.state.config.refresh_interval;
        if self.commands.send(ProviderCommand::Refresh { cycle }).is_err() {
            self.state.loading = false;
            self.state.push_log("[WARN] Sheet provider is gone; refresh skipped");
        } else if manual {
            self.state
                .push_log(format!("[INFO] Refresh requested (cycle {cycle})"));
        }
    }

    fn drain(&mut self, deltas: &Receiver<Delta>) {
        for delta in deltas.try_iter() {
            apply_delta(&mut self.state, delta);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = AppConfig::from_env();

    let (delta_tx, delta_rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_sheet_provider(config.clone(), delta_tx, cmd_rx);

    let mut app = App {
        state: AppState::new(config),
        commands: cmd_tx,
        next_refresh: Instant::now(),
        quit: false,
    };
    app.refresh(false);

    let mut session = TerminalSession::start()?;
    while !app.quit {
        app.drain(&delta_rx);
        if Instant::now() >= app.next_refresh {
            app.refresh(false);
        }
        session.terminal.draw(|frame| draw(frame, &app.state))?;

        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState) {
    let [header, body, console, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(CONSOLE_LINES as u16 + 1),
        Constraint::Length(1),
    ])
    .areas(frame.size());

    frame.render_widget(
        Paragraph::new(header_lines(state)).block(Block::default().borders(Borders::BOTTOM)),
        header,
    );

    if state.committed_cycle.is_none() && state.loading {
        frame.render_widget(Paragraph::new("Loading sheets...").fg(Color::DarkGray), body);
    } else {
        match state.screen {
            Screen::Suggestion => draw_suggestion(frame, body, state),
            Screen::Roster => draw_roster(frame, body, state),
            Screen::Stats => draw_stats(frame, body, state),
        }
    }

    let recent: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(CONSOLE_LINES)
        .rev()
        .map(|line| Line::raw(line.as_str()))
        .collect();
    frame.render_widget(
        Paragraph::new(recent)
            .fg(Color::DarkGray)
            .block(Block::default().title("Console").borders(Borders::TOP)),
        console,
    );

    frame.render_widget(
        Paragraph::new("1 Suggestion  2 Roster  3 Stats  r Refresh  j/k Scroll  ? Help  q Quit")
            .fg(Color::Gray),
        footer,
    );

    if state.help_overlay {
        draw_help(frame);
    }
}

fn header_lines(state: &AppState) -> Vec<Line<'static>> {
    let source = match state.source {
        Some(DataSource::Csv) => "sheets",
        Some(DataSource::Demo) => "demo data",
        None => "no data",
    };
    let updated = match state.updated_at {
        Some(at) => at
            .with_timezone(&state.config.time_zone)
            .format("%d/%m %H:%M")
            .to_string(),
        None => "never".to_string(),
    };
    let mut status = format!(
        "League {} ({}) | {source} | updated {updated}",
        state.config.league, state.config.view
    );
    if state.loading {
        status.push_str(" | refreshing");
    }
    vec![
        Line::styled(
            format!("[{}] {}", state.config.logo, state.config.title),
            Style::new().bold(),
        ),
        Line::raw(status),
    ]
}

fn opponent_label(opponent: &str) -> &str {
    if opponent.is_empty() { "TBD" } else { opponent }
}

fn draw_suggestion(frame: &mut Frame, area: Rect, state: &AppState) {
    // Nothing to suggest: leave the body blank.
    let Some(card) = &state.card else {
        return;
    };

    let rows = card.rows.iter().map(|row| {
        let color = if row.suggestion.generated {
            Color::Green
        } else {
            Color::DarkGray
        };
        Row::new(vec![
            Cell::from(row.display_name.clone()),
            Cell::from(row.hdcp_label.clone()),
            Cell::from(row.suggestion.slot.label()),
            Cell::from(row.suggestion.strategy.label()),
            Cell::from(row.suggestion.note.label()),
        ])
        .fg(color)
    });
    let [title, table] = Layout::vertical([Constraint::Length(4), Constraint::Min(1)])
        .areas(Block::default().borders(Borders::ALL).inner(area));

    frame.render_widget(Block::default().borders(Borders::ALL), area);
    frame.render_widget(
        Paragraph::new(vec![
            Line::styled("💡 Suggestion", Style::new().fg(Color::Yellow)),
            Line::raw(format!("Date: {}", format_display_date(card.target.parsed_date))),
            Line::styled(
                format!("Team: {}", opponent_label(&card.target.opponent)),
                Style::new().bold(),
            ),
        ]),
        title,
    );
    frame.render_widget(
        Table::new(
            rows,
            [
                Constraint::Min(18),
                Constraint::Length(5),
                Constraint::Length(9),
                Constraint::Length(12),
                Constraint::Min(16),
            ],
        )
        .header(Row::new(["Bowler", "Hdcp", "Slot", "Mode", "Note"]).bold()),
        table,
    );
}

fn draw_roster(frame: &mut Frame, area: Rect, state: &AppState) {
    let upcoming = state.upcoming_roster(today(state.config.time_zone));
    if upcoming.is_empty() {
        frame.render_widget(
            Paragraph::new("No upcoming matches for this league").fg(Color::DarkGray),
            area,
        );
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for m in upcoming {
        lines.push(Line::styled(
            format!(
                "{}  vs {}",
                format_display_date(m.parsed_date),
                opponent_label(&m.opponent)
            ),
            Style::new().bold(),
        ));
        let assigned = m.assigned_slots();
        if assigned.is_empty() {
            lines.push(Line::styled("  nobody yet", Style::new().fg(Color::DarkGray)));
        }
        for (slot, entry) in assigned {
            let name = normalize_name(&entry.name);
            let hdcp = state
                .pool
                .stats_index
                .get(&identity_key(&name))
                .map_or_else(|| "-".to_string(), |s| s.hdcp.to_string());
            let shown = match slot {
                SlotKey::Reserved => format!("{name} (Reserve)"),
                _ => name,
            };
            let (mark, color) = if entry.is_confirmed() {
                ("✔ confirmed", Color::Green)
            } else {
                ("? awaiting reply", Color::Yellow)
            };
            lines.push(Line::styled(
                format!("  {:<3} {shown:<24} H {hdcp:<4} {mark}", slot.label()),
                Style::new().fg(color),
            ));
        }
        lines.push(Line::default());
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((state.roster_scroll, 0)),
        area,
    );
}

fn draw_stats(frame: &mut Frame, area: Rect, state: &AppState) {
    let bowlers = state.stats_sorted();
    if bowlers.is_empty() {
        frame.render_widget(Paragraph::new("No bowler stats").fg(Color::DarkGray), area);
        return;
    }

    let rows = bowlers
        .into_iter()
        .skip(state.stats_scroll as usize)
        .map(|b| {
            let row = Row::new(vec![
                normalize_name(&b.name),
                b.gender.clone().unwrap_or_else(|| "-".to_string()),
                b.hdcp.to_string(),
                b.total_games.to_string(),
                format!("{:.1}", b.average),
                b.total_score.map_or_else(|| "-".to_string(), |s| s.to_string()),
            ]);
            if b.active { row } else { row.fg(Color::DarkGray) }
        });

    frame.render_widget(
        Table::new(
            rows,
            [
                Constraint::Min(18),
                Constraint::Length(6),
                Constraint::Length(5),
                Constraint::Length(6),
                Constraint::Length(8),
                Constraint::Length(8),
            ],
        )
        .header(Row::new(["Bowler", "Gender", "Hdcp", "Games", "Average", "Pinfall"]).bold()),
        area,
    );
}

fn draw_help(frame: &mut Frame) {
    let [row] = Layout::vertical([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(frame.size());
    let [popup] = Layout::horizontal([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(row);

    let text = vec![
        Line::styled("Keys", Style::new().bold()),
        Line::default(),
        Line::raw("1      suggestion for the next open match"),
        Line::raw("2      upcoming roster"),
        Line::raw("3      bowler stats"),
        Line::raw("r      refresh sheets now"),
        Line::raw("j / k  scroll (also arrow keys)"),
        Line::raw("?      close this help (or Esc)"),
        Line::raw("q      quit"),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text).block(Block::default().title("Help").borders(Borders::ALL)),
        popup,
    );
}
