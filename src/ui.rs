use anyhow::Result;
use std::io;
use std::time::Duration;
use crate::{
    utils,
    picker::{Focus, Picker, PickerEvent, PickerSignal},
};
use crossterm::{
    cursor,
    execute,
    terminal,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
};
use ratatui::{
    Frame,
    Terminal,
    backend::Backend,
    backend::CrosstermBackend,
    style::{Color, Modifier, Style},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

const NAME_COL: usize = 48;

pub struct InteractiveUI {
    picker: Picker,
}

impl InteractiveUI {
    pub fn new(picker: Picker) -> Self {
        Self { picker }
    }

    /// run the picker session until it commits or cancels; everything is
    /// rendered on stderr, stdout is reserved for the emitted command
    pub fn run(mut self) -> Result<PickerSignal> {
        terminal::enable_raw_mode()?;
        execute!(io::stderr(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let backend = CrosstermBackend::new(io::stderr());
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_event_loop(&mut terminal);

        execute!(terminal.backend_mut(), terminal::LeaveAlternateScreen, cursor::Show)?;
        terminal::disable_raw_mode()?;

        result
    }

    fn run_event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<PickerSignal> {
        loop {
            terminal.draw(|f| self.draw_ui(f))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key_event) = event::read()? {
                    if key_event.kind != KeyEventKind::Press {
                        continue;
                    }
                    if let Some(picker_event) = map_key(key_event) {
                        if let Some(signal) = self.picker.handle_event(picker_event) {
                            return Ok(signal);
                        }
                    }
                }
            }
        }
    }

    fn draw_ui<B: Backend>(&self, f: &mut Frame<B>) {
        let size = f.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(4),
            ])
            .split(size);

        self.draw_header(f, chunks[0]);
        self.draw_search(f, chunks[1]);
        self.draw_list(f, chunks[2]);
        self.draw_footer(f, chunks[3]);
    }

    fn draw_header<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let header = Paragraph::new("DIRHOP - PROJECT SEARCH")
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn draw_search<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let focused = self.picker.focus == Focus::Search;
        let cursor = if focused { "_" } else { "" };

        let line = Spans::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::DarkGray)),
            Span::raw(self.picker.query.clone()),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ]);
        f.render_widget(Paragraph::new(line), area);
    }

    fn draw_list<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let view = self.picker.view();
        let mut items: Vec<ListItem> = Vec::new();

        if view.has_more_above {
            items.push(dim_row("    ↑ more above"));
        }

        if view.empty_results {
            items.push(dim_row("  no directories found"));
        }

        for row in &view.rows {
            let time_ago = row
                .entry
                .last_modified
                .map(utils::format_time_ago)
                .unwrap_or_else(|| "unknown".to_string());
            let display = utils::truncate_string(&row.entry.display_name(), NAME_COL);

            let content = format!(" {:<width$} {:<18}", display, time_ago, width = NAME_COL + 2);
            let style = if row.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else if row.entry.is_subdirectory {
                Style::default().fg(Color::Gray)
            } else {
                Style::default()
            };

            items.push(ListItem::new(content).style(style));
        }

        if view.has_more_below {
            items.push(dim_row("    ↓ more below"));
        }

        if !view.empty_results {
            let create_style = if view.create_selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Green)
            };
            items.push(ListItem::new(" + create new").style(create_style));
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Directories"));
        f.render_widget(list, area);
    }

    fn draw_footer<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let hint = match self.picker.focus {
            Focus::Search => "type to search | ↓/tab: list | enter: select | esc: cancel",
            Focus::List => "↑↓: navigate | enter: select | esc: back to search",
        };

        let text = vec![
            format!("{} directories", self.picker.result_count()),
            hint.to_string(),
        ];

        let paragraph = Paragraph::new(text.join("\n"))
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }
}

fn dim_row(text: &str) -> ListItem<'_> {
    ListItem::new(text).style(Style::default().fg(Color::DarkGray))
}

fn map_key(key_event: KeyEvent) -> Option<PickerEvent> {
    match key_event.code {
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(PickerEvent::CtrlC)
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(PickerEvent::Char(c))
        }
        KeyCode::Backspace => Some(PickerEvent::Backspace),
        KeyCode::Up => Some(PickerEvent::Up),
        KeyCode::Down => Some(PickerEvent::Down),
        KeyCode::Tab => Some(PickerEvent::Tab),
        KeyCode::Enter => Some(PickerEvent::Enter),
        KeyCode::Esc => Some(PickerEvent::Esc),
        _ => None,
    }
}
