use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::PathBuf;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::config::RecentDirectory;
use crate::project::ProjectDir;

/// rows of the result list visible at once
pub const VISIBLE_ROWS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    List,
}

/// key events the engine consumes, already stripped of terminal detail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerEvent {
    Char(char),
    Backspace,
    Up,
    Down,
    Tab,
    Enter,
    Esc,
    CtrlC,
}

/// terminal outcome of a picker session
#[derive(Debug, Clone, PartialEq)]
pub enum PickerSignal {
    Selected(ProjectDir),
    CreateNew,
    Cancelled,
}

/// Search-and-select state machine over the scanned entries. Holds no
/// terminal handles, the UI layer feeds events in and renders `view`.
pub struct Picker {
    entries: Vec<ProjectDir>,
    /// indices into `entries`, recomputed on every query change
    filtered: Vec<usize>,
    matcher: SkimMatcherV2,
    pub query: String,
    pub focus: Focus,
    pub selected: usize,
    pub scroll: usize,
}

/// one visible row of the derived view
#[derive(Debug)]
pub struct PickerRow<'a> {
    pub entry: &'a ProjectDir,
    pub selected: bool,
}

/// snapshot of everything the renderer needs for a frame
#[derive(Debug)]
pub struct PickerView<'a> {
    pub rows: Vec<PickerRow<'a>>,
    pub has_more_above: bool,
    pub has_more_below: bool,
    pub create_selected: bool,
    pub empty_results: bool,
}

impl Picker {
    pub fn new(projects: Vec<ProjectDir>, recents: &[RecentDirectory]) -> Self {
        let entries = order_entries(projects, recents);
        let filtered = (0..entries.len()).collect();

        Self {
            entries,
            filtered,
            matcher: SkimMatcherV2::default(),
            query: String::new(),
            focus: Focus::Search,
            selected: 0,
            scroll: 0,
        }
    }

    /// number of entries surviving the current query
    pub fn result_count(&self) -> usize {
        self.filtered.len()
    }

    /// index of the synthetic create-new option, one past the results
    pub fn max_index(&self) -> usize {
        self.filtered.len()
    }

    /// advance the state machine by one key event; `Some` ends the session
    pub fn handle_event(&mut self, event: PickerEvent) -> Option<PickerSignal> {
        if event == PickerEvent::CtrlC {
            return Some(PickerSignal::Cancelled);
        }

        match self.focus {
            Focus::Search => self.handle_search_event(event),
            Focus::List => self.handle_list_event(event),
        }
    }

    fn handle_search_event(&mut self, event: PickerEvent) -> Option<PickerSignal> {
        match event {
            PickerEvent::Esc => {
                if self.query.is_empty() {
                    return Some(PickerSignal::Cancelled);
                }
                self.query.clear();
                self.refilter();
            }
            PickerEvent::Down | PickerEvent::Tab => {
                // navigation stays disabled while a query has no matches
                if !self.filtered.is_empty() {
                    self.focus = Focus::List;
                    self.selected = 0;
                    self.ensure_selected_visible();
                }
            }
            PickerEvent::Enter => match self.filtered.len() {
                0 => {}
                1 => {
                    return Some(PickerSignal::Selected(
                        self.entries[self.filtered[0]].clone(),
                    ))
                }
                _ => {
                    self.focus = Focus::List;
                    self.selected = 0;
                    self.ensure_selected_visible();
                }
            },
            PickerEvent::Char(c) => {
                self.query.push(c);
                self.refilter();
            }
            PickerEvent::Backspace => {
                if self.query.pop().is_some() {
                    self.refilter();
                }
            }
            _ => {}
        }
        None
    }

    fn handle_list_event(&mut self, event: PickerEvent) -> Option<PickerSignal> {
        match event {
            PickerEvent::Esc => self.focus = Focus::Search,
            PickerEvent::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                    self.ensure_selected_visible();
                } else {
                    self.focus = Focus::Search;
                }
            }
            PickerEvent::Down => {
                if self.selected < self.max_index() {
                    self.selected += 1;
                    self.ensure_selected_visible();
                }
            }
            PickerEvent::Enter => {
                if self.selected == self.max_index() {
                    return Some(PickerSignal::CreateNew);
                }
                return Some(PickerSignal::Selected(
                    self.entries[self.filtered[self.selected]].clone(),
                ));
            }
            PickerEvent::Char(c) => {
                // typing drops back into the search field
                self.focus = Focus::Search;
                self.query.push(c);
                self.refilter();
            }
            _ => {}
        }
        None
    }

    /// derive the visible window for rendering
    pub fn view(&self) -> PickerView<'_> {
        let end = (self.scroll + VISIBLE_ROWS).min(self.filtered.len());
        let rows = self.filtered[self.scroll..end]
            .iter()
            .enumerate()
            .map(|(offset, &index)| PickerRow {
                entry: &self.entries[index],
                selected: self.focus == Focus::List && self.scroll + offset == self.selected,
            })
            .collect();

        PickerView {
            rows,
            has_more_above: self.scroll > 0,
            has_more_below: self.scroll + VISIBLE_ROWS < self.filtered.len(),
            create_selected: self.focus == Focus::List && self.selected == self.max_index(),
            empty_results: self.filtered.is_empty() && !self.query.is_empty(),
        }
    }

    fn refilter(&mut self) {
        if self.query.is_empty() {
            self.filtered = (0..self.entries.len()).collect();
        } else {
            let mut scored: Vec<(usize, i64)> = self
                .entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| self.score(entry).map(|score| (index, score)))
                .collect();

            // stable sort, ties keep the recents-first ordering
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            self.filtered = scored.into_iter().map(|(index, _)| index).collect();
        }

        self.scroll = 0;
        self.selected = self.selected.min(self.max_index());
        self.ensure_selected_visible();
    }

    /// best fuzzy score of the query against label, name and full path
    fn score(&self, entry: &ProjectDir) -> Option<i64> {
        let keys = [
            entry.display_name(),
            entry.name.clone(),
            entry.path.to_string_lossy().into_owned(),
        ];

        keys.iter()
            .filter_map(|key| self.matcher.fuzzy_match(key, &self.query))
            .max()
    }

    fn ensure_selected_visible(&mut self) {
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + VISIBLE_ROWS {
            self.scroll = self.selected - VISIBLE_ROWS + 1;
        }
    }
}

/// recent paths first, most recently visited on top, then scanner order
fn order_entries(projects: Vec<ProjectDir>, recents: &[RecentDirectory]) -> Vec<ProjectDir> {
    let visited: HashMap<&PathBuf, i64> = recents
        .iter()
        .map(|recent| (&recent.path, recent.accessed_at))
        .collect();

    let (mut recent, other): (Vec<ProjectDir>, Vec<ProjectDir>) = projects
        .into_iter()
        .partition(|project| visited.contains_key(&project.path));

    recent.sort_by_key(|project| Reverse(visited[&project.path]));

    recent.into_iter().chain(other).collect()
}
