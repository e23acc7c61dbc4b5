//! TUI application state
//!
//! Everything the screen shows, plus the key handling that mutates it.
//! Work that needs the network is returned as a `Command` for the runner.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crossterm::event::KeyCode;

use crate::api::CompanyLite;
use crate::indicators::{DetailState, NormalizedReport};
use crate::report::{build_view, ResultFilter, ResultsView};
use crate::render::DetailRegistry;
use crate::reveal::{RevealEvent, RevealState};

pub const LOADING_DETAIL: &str = "กำลังดึงรายละเอียด…";
const MAX_LOGS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Typing a company name or registration number
    Lookup,
    Picking {
        candidates: Vec<CompanyLite>,
        selected: usize,
    },
    Loading(String),
    /// The backend had nothing for this registration ID
    NoData(String),
    Results,
}

/// Work the runner performs on behalf of a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    None,
    Quit,
    Search(String),
    Analyze(String),
    LoadDetail(String),
}

pub struct App {
    pub mode: Mode,
    pub input: String,
    pub report: Option<Arc<NormalizedReport>>,
    pub reveal: RevealState,
    pub filter: ResultFilter,
    pub expanded: HashSet<String>,
    /// Index into the visible rows
    pub selected: usize,
    /// Detail states keyed by uppercased code
    pub details: HashMap<String, DetailState>,
    /// One-line status message
    pub toast: Option<String>,
    pub logs: Vec<String>,
    pub registry: DetailRegistry,
    /// Bumped on every analysis request; stale results are ignored.
    pub generation: u64,
}

impl Default for App {
    fn default() -> Self {
        Self::new(DetailRegistry::default())
    }
}

impl App {
    pub fn new(registry: DetailRegistry) -> Self {
        Self {
            mode: Mode::Lookup,
            input: String::new(),
            report: None,
            reveal: RevealState::default(),
            filter: ResultFilter::All,
            expanded: HashSet::new(),
            selected: 0,
            details: HashMap::new(),
            toast: None,
            logs: Vec::new(),
            registry,
            generation: 0,
        }
    }

    pub fn view(&self) -> Option<ResultsView> {
        let report = self.report.as_ref()?;
        Some(build_view(report, &self.reveal, self.filter, &self.expanded, &self.registry))
    }

    pub fn push_log(&mut self, msg: String) {
        self.logs.push(msg);
        if self.logs.len() > MAX_LOGS {
            self.logs.remove(0);
        }
    }

    /// A new report replaces the old one; per-view state starts over.
    pub fn load_report(&mut self, report: Arc<NormalizedReport>) {
        self.push_log(format!(
            "Loaded {} ({} indicators)",
            report.registration_id(),
            report.len()
        ));
        self.report = Some(report);
        self.reveal = RevealState::default();
        self.expanded.clear();
        self.details.clear();
        self.selected = 0;
        self.toast = None;
        self.mode = Mode::Results;
    }

    pub fn begin_analysis(&mut self, registration_id: &str) -> u64 {
        self.generation += 1;
        self.mode = Mode::Loading(registration_id.to_string());
        self.generation
    }

    /// Show an error in the status line; a pending analysis is abandoned.
    pub fn show_error(&mut self, message: String) {
        self.push_log(format!("Error: {}", message));
        self.toast = Some(message);
        if matches!(self.mode, Mode::Loading(_)) {
            self.mode = Mode::Lookup;
        }
    }

    /// Failure of analysis request `generation`. Returns `false`, changing
    /// nothing, when a newer request has superseded it.
    pub fn analysis_failed(&mut self, generation: u64, message: String) -> bool {
        if generation != self.generation {
            return false;
        }
        self.show_error(message);
        true
    }

    /// Move the selection to where the reveal just scrolled.
    pub fn on_reveal(&mut self, event: &RevealEvent) {
        let Some(view) = self.view() else {
            return;
        };
        let target = match event {
            RevealEvent::ScrollToIndicator { code } => view.position_of(code),
            RevealEvent::ScrollToCategory { category } => view.position_of_category(*category),
            RevealEvent::ScrollToTop | RevealEvent::Reset => Some(0),
            RevealEvent::Completed { fail, pass } => {
                self.push_log(format!("Analysis complete: {} found, {} not found", fail, pass));
                None
            }
            _ => None,
        };
        if let Some(target) = target {
            self.selected = target.min(view.row_count().saturating_sub(1));
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.view().map(|v| v.row_count()).unwrap_or(0);
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Command {
        match &mut self.mode {
            Mode::Lookup => match key {
                KeyCode::Char(c) => {
                    self.input.push(c);
                    Command::None
                }
                KeyCode::Backspace => {
                    self.input.pop();
                    Command::None
                }
                KeyCode::Enter => {
                    let query = self.input.trim().to_string();
                    if query.is_empty() {
                        return Command::None;
                    }
                    self.toast = Some(format!("กำลังค้นหา \"{}\"…", query));
                    Command::Search(query)
                }
                KeyCode::Esc if self.report.is_some() => {
                    self.mode = Mode::Results;
                    Command::None
                }
                KeyCode::Esc => Command::Quit,
                _ => Command::None,
            },
            Mode::Picking { candidates, selected } => match key {
                KeyCode::Up => {
                    *selected = selected.saturating_sub(1);
                    Command::None
                }
                KeyCode::Down => {
                    *selected = (*selected + 1).min(candidates.len().saturating_sub(1));
                    Command::None
                }
                KeyCode::Enter => {
                    match candidates.get(*selected).and_then(|c| c.registration_id.clone()) {
                        Some(id) => Command::Analyze(id),
                        None => Command::None,
                    }
                }
                KeyCode::Esc => {
                    self.mode = Mode::Lookup;
                    Command::None
                }
                _ => Command::None,
            },
            Mode::Loading(_) | Mode::NoData(_) => match key {
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.mode = Mode::Lookup;
                    Command::None
                }
                KeyCode::Char('q') => Command::Quit,
                _ => Command::None,
            },
            Mode::Results => self.handle_results_key(key),
        }
    }

    fn handle_results_key(&mut self, key: KeyCode) -> Command {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
            KeyCode::Char('f') => {
                self.filter = self.filter.next();
                self.clamp_selection();
                Command::None
            }
            KeyCode::Char('n') => {
                self.input.clear();
                self.mode = Mode::Lookup;
                Command::None
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                Command::None
            }
            KeyCode::Down => {
                self.selected += 1;
                self.clamp_selection();
                Command::None
            }
            KeyCode::Enter => {
                let row = self.view().and_then(|v| v.rows().nth(self.selected).cloned());
                let Some(row) = row else {
                    return Command::None;
                };
                if !row.has_details {
                    return Command::None;
                }
                if self.expanded.remove(&row.code) {
                    Command::None
                } else {
                    self.expanded.insert(row.code.clone());
                    Command::LoadDetail(row.code)
                }
            }
            _ => Command::None,
        }
    }

    pub fn candidates_found(&mut self, candidates: Vec<CompanyLite>) -> Command {
        match candidates.len() {
            0 => {
                self.toast = Some("ไม่พบบริษัทที่ค้นหา".to_string());
                Command::None
            }
            1 => match candidates[0].registration_id.clone() {
                Some(id) => Command::Analyze(id),
                None => Command::None,
            },
            _ => {
                self.toast = None;
                self.mode = Mode::Picking {
                    candidates,
                    selected: 0,
                };
                Command::None
            }
        }
    }

    pub fn detail_state(&self, code: &str) -> DetailState {
        self.details
            .get(&code.trim().to_uppercase())
            .cloned()
            .unwrap_or(DetailState::Idle)
    }
}
