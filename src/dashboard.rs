use std::io;
use std::ops::Range;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap};

use crate::locate::matching_indices;
use crate::per90::Per90Block;
use crate::percentile::{PROFILE_STATS, ReferenceScope};
use crate::population::{PlayerRecord, Population};
use crate::profile::{PlayerProfile, build_profile};

pub struct DashboardState {
    population: Population,
    query: String,
    filtered: Vec<usize>,
    selected: usize,
    profile: Option<PlayerProfile>,
    pub help_overlay: bool,
    pub should_quit: bool,
}

impl DashboardState {
    pub fn new(population: Population) -> Self {
        let mut state = Self {
            population,
            query: String::new(),
            filtered: Vec::new(),
            selected: 0,
            profile: None,
            help_overlay: false,
            should_quit: false,
        };
        state.refilter();
        state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Population indices currently shown, in table order.
    pub fn filtered(&self) -> &[usize] {
        &self.filtered
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_record(&self) -> Option<&PlayerRecord> {
        let idx = *self.filtered.get(self.selected)?;
        self.population.records().get(idx)
    }

    pub fn selected_profile(&self) -> Option<&PlayerProfile> {
        self.profile.as_ref()
    }

    /// Slice of `filtered()` to draw in a list `rows` tall. The list scrolls
    /// only once the selection would fall off the bottom edge.
    pub fn list_window(&self, rows: usize) -> Range<usize> {
        let total = self.filtered.len();
        if rows == 0 || total == 0 {
            return 0..0;
        }
        let start = (self.selected + 1).saturating_sub(rows);
        start..(start + rows).min(total)
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.refilter();
    }

    pub fn backspace(&mut self) {
        if self.query.pop().is_some() {
            self.refilter();
        }
    }

    pub fn clear_query(&mut self) {
        if !self.query.is_empty() {
            self.query.clear();
            self.refilter();
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.filtered.len() {
            self.selected += 1;
            self.refresh_profile();
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.refresh_profile();
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('c') {
                self.should_quit = true;
            }
            return;
        }
        match key.code {
            KeyCode::Char('q') if self.query.is_empty() => self.should_quit = true,
            KeyCode::Char(c) => self.push_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Esc => {
                if self.help_overlay {
                    self.help_overlay = false;
                } else {
                    self.clear_query();
                }
            }
            KeyCode::Down => self.select_next(),
            KeyCode::Up => self.select_prev(),
            KeyCode::F(1) => self.help_overlay = !self.help_overlay,
            _ => {}
        }
    }

    fn refilter(&mut self) {
        self.filtered = matching_indices(&self.population, &self.query, None);
        if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len().saturating_sub(1);
        }
        self.refresh_profile();
    }

    fn refresh_profile(&mut self) {
        self.profile = self
            .selected_record()
            .map(|record| build_profile(&self.population, record));
    }
}

pub fn run(population: Population) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut state = DashboardState::new(population);
    let res = run_app(&mut terminal, &mut state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, state: &mut DashboardState) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            state.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if state.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let search = Paragraph::new(format!("Search: {}_", state.query()))
        .block(Block::default().title("SCOUT").borders(Borders::ALL));
    frame.render_widget(search, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);
    render_player_list(frame, body[0], state);
    match state.selected_profile() {
        Some(profile) => render_profile(frame, body[1], profile),
        None => {
            let empty = Paragraph::new("No player matches the search")
                .block(Block::default().title("Profile").borders(Borders::ALL));
            frame.render_widget(empty, body[1]);
        }
    }

    let footer = Paragraph::new(format!(
        "{} / {} players | type to search  ↑/↓ move  Esc clear  F1 help  q quit",
        state.filtered().len(),
        state.population().len()
    ))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn render_player_list(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let block = Block::default().title("Players").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let records = state.population().records();
    let window = state.list_window(inner.height as usize);
    let start = window.start;
    let lines: Vec<Line> = state.filtered()[window]
        .iter()
        .enumerate()
        .filter_map(|(offset, &idx)| {
            let record = records.get(idx)?;
            let text = format!(
                "{:<24} {:<4} {}",
                truncate(&record.name, 24),
                record.position.as_str(),
                record.team
            );
            let style = if start + offset == state.selected() {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Some(Line::styled(text, style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_profile(frame: &mut Frame, area: Rect, profile: &PlayerProfile) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(8),
            Constraint::Length(7),
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(summary_text(profile))
            .block(Block::default().title("Profile").borders(Borders::ALL)),
        rows[0],
    );
    frame.render_widget(percentile_chart(profile), rows[1]);
    frame.render_widget(
        Paragraph::new(detail_text(profile))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Scouting").borders(Borders::ALL)),
        rows[2],
    );
}

fn summary_text(profile: &PlayerProfile) -> String {
    let info = &profile.personal_info;
    let reference = match profile.reference.scope {
        ReferenceScope::SamePosition => "same position",
        ReferenceScope::FullPopulation => "all players",
    };
    let per90 = match &profile.per_90 {
        Per90Block::Rates(r) => format!(
            "G/90 {:.2}  A/90 {:.2}  xG/90 {:.2}  xA/90 {:.2}",
            r.goals_per_90, r.assists_per_90, r.xg_per_90, r.xa_per_90
        ),
        Per90Block::Insufficient(marker) => marker.message.clone(),
    };
    [
        format!(
            "{}  ({}, {})  {}",
            info.name,
            info.team,
            info.position,
            info.age.map(|a| format!("age {a}")).unwrap_or_default()
        ),
        format!(
            "Rating {:.1}  Style: {}  vs {} ({})",
            profile.composite_rating, profile.style, reference, profile.reference.size
        ),
        format!(
            "MP {}  Starts {}  Min {}  Gls {}  Ast {}",
            profile.base_stats.matches,
            profile.base_stats.starts,
            profile.base_stats.minutes,
            profile.base_stats.goals,
            profile.base_stats.assists
        ),
        per90,
    ]
    .join("\n")
}

fn percentile_chart(profile: &PlayerProfile) -> BarChart<'_> {
    let bars: Vec<Bar> = PROFILE_STATS
        .iter()
        .map(|&stat| {
            let value = profile.percentiles.get(stat);
            let color = match value {
                Some(v) if v >= 80.0 => Color::Green,
                Some(v) if v <= 20.0 => Color::Red,
                Some(_) => Color::Yellow,
                None => Color::DarkGray,
            };
            Bar::default()
                .value(value.unwrap_or(0.0).round() as u64)
                .label(stat.column().into())
                .style(Style::default().fg(color))
        })
        .collect();

    BarChart::default()
        .block(Block::default().title("Percentiles").borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(1)
        .max(100)
}

fn detail_text(profile: &PlayerProfile) -> String {
    let zones = &profile.activity_zones;
    [
        format!("Strengths: {}", profile.strengths.join(", ")),
        format!("Weaknesses: {}", profile.weaknesses.join(", ")),
        format!(
            "Zones  DEF {}  DM {}  CM {}  AM {}  ATT {}",
            zones.defence,
            zones.defensive_midfield,
            zones.central_midfield,
            zones.attacking_midfield,
            zones.attack
        ),
        format!(
            "Efficiency {:.1}  Defensive {}  Consistency {:.1}",
            profile.performance.offensive_efficiency,
            profile.performance.defensive_contribution,
            profile.performance.consistency
        ),
    ]
    .join("\n")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

const HELP_LINES: [&str; 9] = [
    "Scout Terminal - Help",
    "",
    "  type         Filter players by name",
    "  Backspace    Delete last character",
    "  ↑/↓          Move selection",
    "  Esc          Clear search / close help",
    "  F1           Toggle help",
    "  q            Quit (empty search)",
    "  Ctrl-C       Quit",
];

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = HELP_LINES
        .iter()
        .map(|line| line.chars().count() as u16)
        .max()
        .unwrap_or(0)
        + 4;
    let popup_area = popup_rect(width, HELP_LINES.len() as u16 + 2, area);
    frame.render_widget(Clear, popup_area);

    let help = Paragraph::new(HELP_LINES.join("\n"))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

/// A `width` x `height` box centred in `area`, shrunk to fit when the
/// terminal is smaller.
fn popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
