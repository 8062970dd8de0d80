//! Ratatui-based code explorer.
//!
//! Type to search the reference table, Tab cycles the scope, ←/→ change the
//! row limit, ↑/↓ move the selection and Enter picks a diagnosis.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Terminal,
};

use crate::domain::{CodeRecord, Scope};
use crate::error::AppError;
use crate::lookup::{CodeIndex, ReferenceTable};

const LIMIT_STEP: usize = 10;
const LIMIT_MIN: usize = 10;
const LIMIT_MAX: usize = 200;

/// Start the TUI.
pub fn run(table: &ReferenceTable, scope: Scope, limit: usize) -> Result<(), AppError> {
    // Load before touching the terminal so load errors print normally.
    let index = table.load()?;
    let mut explorer = Explorer::new(index, scope, limit);

    let guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    explorer.event_loop(&mut terminal)?;

    drop(guard);
    if let Some(record) = explorer.picked() {
        println!("Selected diagnosis: {}", record.display_label());
    }
    Ok(())
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Explorer state, independent of the terminal.
struct Explorer {
    index: Arc<CodeIndex>,
    query: String,
    scope: Scope,
    limit: usize,
    /// Positions into `index.records()` matching the current query.
    matches: Vec<usize>,
    selected: usize,
    picked: Option<usize>,
    status: String,
}

impl Explorer {
    fn new(index: Arc<CodeIndex>, scope: Scope, limit: usize) -> Self {
        let status = if index.has_exclusion_column() {
            format!("{} codes loaded.", index.len())
        } else {
            format!("{} codes loaded (no exclusion column; scope ignored).", index.len())
        };
        let mut explorer = Self {
            index,
            query: String::new(),
            scope,
            limit: limit.clamp(LIMIT_MIN, LIMIT_MAX),
            matches: Vec::new(),
            selected: 0,
            picked: None,
            status,
        };
        explorer.refresh();
        explorer
    }

    fn refresh(&mut self) {
        self.matches = self.index.query_positions(&self.query, self.scope);
        self.selected = 0;
    }

    fn visible(&self) -> impl Iterator<Item = &CodeRecord> {
        let records = self.index.records();
        self.matches.iter().take(self.limit).map(move |&i| &records[i])
    }

    fn visible_len(&self) -> usize {
        self.matches.len().min(self.limit)
    }

    fn selected_record(&self) -> Option<&CodeRecord> {
        let i = *self.matches.get(self.selected)?;
        self.index.records().get(i)
    }

    fn picked(&self) -> Option<&CodeRecord> {
        self.index.records().get(self.picked?)
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            let ready = event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?;
            if !ready {
                continue;
            }

            let event =
                event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))?;
            match event {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the explorer should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            // Raw mode swallows SIGINT, so Ctrl+C has to be handled here.
            return matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'));
        }

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Enter => {
                if let Some(&i) = self.matches.get(self.selected) {
                    self.picked = Some(i);
                    return true;
                }
                self.status = "Nothing to select.".to_string();
            }
            KeyCode::Tab => {
                self.scope = self.scope.next();
                self.refresh();
                self.status = format!("scope: {}", self.scope.display_name());
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected + 1 < self.visible_len() {
                    self.selected += 1;
                }
            }
            KeyCode::Left => {
                self.limit = self.limit.saturating_sub(LIMIT_STEP).max(LIMIT_MIN);
                self.selected = self.selected.min(self.visible_len().saturating_sub(1));
                self.status = format!("max rows: {}", self.limit);
            }
            KeyCode::Right => {
                self.limit = (self.limit + LIMIT_STEP).min(LIMIT_MAX);
                self.status = format!("max rows: {}", self.limit);
            }
            KeyCode::Backspace => {
                if self.query.pop().is_some() {
                    self.refresh();
                }
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                self.refresh();
            }
            _ => {}
        }
        false
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(5),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_results(frame, chunks[1]);
        self.draw_detail(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("Search: ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("{}▏", self.query),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!(
                    "scope: {} | max rows: {} | {}",
                    self.scope.display_name(),
                    self.limit,
                    crate::report::format_caption(self.visible_len(), self.matches.len()),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("ICD-10 Code Explorer").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let header = Row::new(vec!["CODE", "EXCL", "SHORT DESCRIPTION"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = self
            .visible()
            .map(|r| {
                Row::new(vec![
                    Cell::from(r.code.clone()),
                    Cell::from(if r.excluded { "Y" } else { "" }),
                    Cell::from(r.short_label.clone()),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [Constraint::Length(9), Constraint::Length(5), Constraint::Min(10)],
        )
        .header(header)
        .block(Block::default().title("Results").borders(Borders::ALL))
        .row_highlight_style(Style::default().fg(Color::Black).bg(Color::White))
        .highlight_symbol("» ");

        let mut state = TableState::default();
        if self.visible_len() > 0 {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_detail(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let text = match self.selected_record() {
            Some(r) => {
                let scope = if r.excluded { "excluded" } else { "included" };
                format!("{} ({scope})\n{}", r.display_label(), r.long_label)
            }
            None => "No matching codes.".to_string(),
        };
        let p = Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Selected").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "type to search  Tab scope  ←/→ rows  ↑/↓ select  Enter pick  Esc quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
