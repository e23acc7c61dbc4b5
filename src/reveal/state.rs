//! Reveal state machine
//!
//! `RevealMachine` is the pure half of the reveal: each `step` advances the
//! phase by one transition and reports how long the driver should wait
//! before the next step, plus any side effects (scroll, highlight) that must
//! fire after their own delays. No timers live here, so every transition is
//! testable without a runtime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::indicators::{Category, NormalizedReport, Status};

/// Delays that shape the reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTimings {
    /// Wait before an indicator is inserted
    pub reveal_delay: Duration,
    /// Delay of the scroll that follows a category or indicator appearing
    pub scroll_delay: Duration,
    /// One frame for a new category header before its first child
    pub header_frame: Duration,
    /// Delay from a fail insertion to its highlight
    pub highlight_on: Duration,
    /// How long a highlight stays on
    pub highlight_duration: Duration,
    pub fail_linger: Duration,
    pub pass_linger: Duration,
    /// Pause after the last indicator of a category
    pub category_pause: Duration,
    /// Delay from completion to the scroll back to the top
    pub scroll_to_top: Duration,
}

impl Default for RevealTimings {
    fn default() -> Self {
        Self {
            reveal_delay: Duration::from_millis(100),
            scroll_delay: Duration::from_millis(100),
            header_frame: Duration::from_millis(16),
            highlight_on: Duration::from_millis(500),
            highlight_duration: Duration::from_millis(800),
            fail_linger: Duration::from_millis(1800),
            pass_linger: Duration::from_millis(1200),
            category_pause: Duration::from_millis(500),
            scroll_to_top: Duration::from_millis(1000),
        }
    }
}

impl RevealTimings {
    pub fn linger(&self, status: Status) -> Duration {
        match status {
            Status::Fail => self.fail_linger,
            Status::Pass => self.pass_linger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealPhase {
    #[default]
    Idle,
    RevealingCategory(usize),
    RevealingIndicator(usize, usize),
    Complete,
}

/// Everything published while a reveal runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum RevealEvent {
    /// A category header became visible
    CategoryShown { category: Category },
    /// An indicator was inserted at `position` in its category's list
    IndicatorRevealed {
        category: Category,
        code: String,
        status: Status,
        position: usize,
    },
    ScrollToCategory { category: Category },
    ScrollToIndicator { code: String },
    Highlight { code: String },
    HighlightCleared { code: String },
    /// Every category has been walked
    Completed { fail: usize, pass: usize },
    ScrollToTop,
    /// State went back to idle (restart or stop)
    Reset,
}

/// A side effect the driver runs after its own delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ScrollToCategory(Category),
    ScrollToIndicator(String),
    Highlight(String),
    ClearHighlight(String),
    ScrollToTop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEffect {
    pub after: Duration,
    pub effect: Effect,
}

/// Result of one `step`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    /// Published immediately
    pub events: Vec<RevealEvent>,
    pub effects: Vec<ScheduledEffect>,
    /// Wait before the next step; `None` when the run is over
    pub next: Option<Duration>,
}

/// Visible reveal state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevealState {
    pub phase: RevealPhase,
    pub displayed_categories: Vec<Category>,
    pub displayed_by_category: HashMap<Category, Vec<String>>,
    pub highlighted_code: Option<String>,
}

impl RevealState {
    pub fn current_category_index(&self) -> usize {
        match self.phase {
            RevealPhase::Idle => 0,
            RevealPhase::RevealingCategory(i) | RevealPhase::RevealingIndicator(i, _) => i,
            RevealPhase::Complete => Category::ALL.len(),
        }
    }

    pub fn current_indicator_in_category(&self) -> usize {
        match self.phase {
            RevealPhase::RevealingIndicator(_, j) => j,
            _ => 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == RevealPhase::Complete
    }

    pub fn is_category_displayed(&self, category: Category) -> bool {
        self.displayed_categories.contains(&category)
    }

    pub fn displayed(&self, category: Category) -> &[String] {
        self.displayed_by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn displayed_total(&self) -> usize {
        self.displayed_by_category.values().map(Vec::len).sum()
    }

    /// (fail, pass) over the codes currently displayed, looked up in `report`.
    pub fn counts(&self, report: &NormalizedReport) -> (usize, usize) {
        let mut fail = 0;
        let mut pass = 0;
        for code in self.displayed_by_category.values().flatten() {
            match report.status_of(code) {
                Some(Status::Fail) => fail += 1,
                Some(Status::Pass) => pass += 1,
                None => {}
            }
        }
        (fail, pass)
    }
}

pub struct RevealMachine {
    report: Arc<NormalizedReport>,
    /// Codes per category, indexed like `Category::ALL`
    groups: Vec<Vec<String>>,
    timings: RevealTimings,
    state: RevealState,
}

impl RevealMachine {
    pub fn new(timings: RevealTimings) -> Self {
        Self {
            report: Arc::new(NormalizedReport::default()),
            groups: vec![Vec::new(); Category::ALL.len()],
            timings,
            state: RevealState::default(),
        }
    }

    pub fn state(&self) -> &RevealState {
        &self.state
    }

    pub fn report(&self) -> &Arc<NormalizedReport> {
        &self.report
    }

    pub fn timings(&self) -> &RevealTimings {
        &self.timings
    }

    pub fn counts(&self) -> (usize, usize) {
        self.state.counts(&self.report)
    }

    /// Back to `Idle` with nothing displayed.
    pub fn reset(&mut self) -> RevealEvent {
        self.state = RevealState::default();
        RevealEvent::Reset
    }

    /// Reset and arm the machine for `report`. The first step is due
    /// immediately.
    pub fn load(&mut self, report: Arc<NormalizedReport>) -> RevealEvent {
        let event = self.reset();
        self.groups = Category::ALL
            .iter()
            .map(|c| report.in_category(*c).into_iter().map(|i| i.code.clone()).collect())
            .collect();
        self.report = report;
        self.state.phase = RevealPhase::RevealingCategory(0);
        event
    }

    fn group_len(&self, i: usize) -> usize {
        self.groups.get(i).map(Vec::len).unwrap_or(0)
    }

    /// Wait before `RevealingIndicator(i, j)` acts: the reveal delay when
    /// it will insert, nothing when it only closes the category.
    fn delay_into_indicator(&self, i: usize, j: usize) -> Duration {
        if j < self.group_len(i) {
            self.timings.reveal_delay
        } else {
            Duration::ZERO
        }
    }

    /// Advance by one transition.
    pub fn step(&mut self) -> StepOutcome {
        let mut out = StepOutcome::default();

        match self.state.phase {
            RevealPhase::Idle | RevealPhase::Complete => {}

            RevealPhase::RevealingCategory(i) if i >= Category::ALL.len() => {
                self.state.phase = RevealPhase::Complete;
                let (fail, pass) = self.counts();
                out.events.push(RevealEvent::Completed { fail, pass });
                out.effects.push(ScheduledEffect {
                    after: self.timings.scroll_to_top,
                    effect: Effect::ScrollToTop,
                });
            }

            RevealPhase::RevealingCategory(i) => {
                let category = Category::ALL[i];
                if !self.state.is_category_displayed(category) {
                    self.state.displayed_categories.push(category);
                    self.state.displayed_by_category.entry(category).or_default();
                    out.events.push(RevealEvent::CategoryShown { category });
                    out.effects.push(ScheduledEffect {
                        after: self.timings.scroll_delay,
                        effect: Effect::ScrollToCategory(category),
                    });
                    out.next = Some(self.timings.header_frame);
                } else {
                    self.state.phase = RevealPhase::RevealingIndicator(i, 0);
                    out.next = Some(self.delay_into_indicator(i, 0));
                }
            }

            RevealPhase::RevealingIndicator(i, j) if j >= self.group_len(i) => {
                self.state.phase = RevealPhase::RevealingCategory(i + 1);
                out.next = Some(self.timings.category_pause);
            }

            RevealPhase::RevealingIndicator(i, j) => {
                let category = Category::ALL[i];
                let code = self.groups[i][j].clone();
                let status = self.report.status_of(&code).unwrap_or(Status::Pass);

                if let Some(position) = self.insert(category, &code, status) {
                    out.events.push(RevealEvent::IndicatorRevealed {
                        category,
                        code: code.clone(),
                        status,
                        position,
                    });
                    out.effects.push(ScheduledEffect {
                        after: self.timings.scroll_delay,
                        effect: Effect::ScrollToIndicator(code.clone()),
                    });
                    if status.is_fail() {
                        out.effects.push(ScheduledEffect {
                            after: self.timings.highlight_on,
                            effect: Effect::Highlight(code.clone()),
                        });
                        out.effects.push(ScheduledEffect {
                            after: self.timings.highlight_on + self.timings.highlight_duration,
                            effect: Effect::ClearHighlight(code),
                        });
                    }
                }

                self.state.phase = RevealPhase::RevealingIndicator(i, j + 1);
                out.next = Some(self.timings.linger(status) + self.delay_into_indicator(i, j + 1));
            }
        }

        out
    }

    /// Insert `code` into its category's displayed list. Fails go right
    /// after the last displayed fail, passes at the end. Returns the
    /// insertion position, or `None` if the code was already displayed.
    fn insert(&mut self, category: Category, code: &str, status: Status) -> Option<usize> {
        let report = Arc::clone(&self.report);
        let list = self.state.displayed_by_category.entry(category).or_default();
        if list.iter().any(|c| c == code) {
            return None;
        }

        let position = match status {
            Status::Fail => list
                .iter()
                .rposition(|c| report.status_of(c) == Some(Status::Fail))
                .map(|idx| idx + 1)
                .unwrap_or(0),
            Status::Pass => list.len(),
        };
        list.insert(position, code.to_string());
        Some(position)
    }

    /// Apply a delayed effect. Returns the event to publish, if any.
    pub fn apply(&mut self, effect: &Effect) -> Option<RevealEvent> {
        match effect {
            Effect::ScrollToCategory(category) => Some(RevealEvent::ScrollToCategory {
                category: *category,
            }),
            Effect::ScrollToIndicator(code) => {
                Some(RevealEvent::ScrollToIndicator { code: code.clone() })
            }
            Effect::Highlight(code) => {
                self.state.highlighted_code = Some(code.clone());
                Some(RevealEvent::Highlight { code: code.clone() })
            }
            Effect::ClearHighlight(code) => {
                // A later highlight owns the slot now.
                if self.state.highlighted_code.as_deref() != Some(code.as_str()) {
                    return None;
                }
                self.state.highlighted_code = None;
                Some(RevealEvent::HighlightCleared { code: code.clone() })
            }
            Effect::ScrollToTop => Some(RevealEvent::ScrollToTop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{NormalizedIndicator, Normalizer};
    use crate::api::RawIndicatorRow;
    use std::collections::HashSet;

    fn report(rows: &[(&str, bool)]) -> Arc<NormalizedReport> {
        let rows: Vec<RawIndicatorRow> = rows
            .iter()
            .map(|(code, flag)| RawIndicatorRow {
                code: Some(code.to_string()),
                flag: *flag,
                ..Default::default()
            })
            .collect();
        let indicators = Normalizer::default().normalize(&rows, &HashSet::new());
        Arc::new(NormalizedReport::new("0105", "ACME", indicators))
    }

    fn run_to_end(machine: &mut RevealMachine) -> Vec<StepOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..1000 {
            let outcome = machine.step();
            let done = outcome.next.is_none();
            outcomes.push(outcome);
            if done {
                break;
            }
        }
        outcomes
    }

    #[test]
    fn test_idle_does_nothing() {
        let mut machine = RevealMachine::new(RevealTimings::default());
        assert_eq!(machine.step(), StepOutcome::default());
        assert_eq!(machine.state().phase, RevealPhase::Idle);
    }

    #[test]
    fn test_category_header_before_children() {
        let mut machine = RevealMachine::new(RevealTimings::default());
        machine.load(report(&[("ad10000", true)]));

        let first = machine.step();
        assert_eq!(
            first.events,
            vec![RevealEvent::CategoryShown {
                category: Category::SharedResources
            }]
        );
        assert_eq!(machine.state().displayed_total(), 0);
        assert_eq!(first.next, Some(Duration::from_millis(16)));

        let second = machine.step();
        assert!(second.events.is_empty());
        assert_eq!(machine.state().phase, RevealPhase::RevealingIndicator(0, 0));
        assert_eq!(second.next, Some(Duration::from_millis(100)));

        let third = machine.step();
        assert!(matches!(third.events[0], RevealEvent::IndicatorRevealed { position: 0, .. }));
        assert_eq!(third.effects.len(), 3);
        assert_eq!(third.next, Some(Duration::from_millis(1800)));
    }

    #[test]
    fn test_full_run_displays_everything() {
        let report = report(&[
            ("ad10000", true),
            ("ad20000", false),
            ("h20000", false),
            ("i10000", true),
        ]);
        let mut machine = RevealMachine::new(RevealTimings::default());
        machine.load(Arc::clone(&report));
        let outcomes = run_to_end(&mut machine);

        assert!(machine.state().is_complete());
        assert_eq!(machine.state().displayed_categories, Category::ALL.to_vec());
        assert_eq!(machine.counts(), (2, 2));
        let last = outcomes.last().unwrap();
        assert_eq!(last.events, vec![RevealEvent::Completed { fail: 2, pass: 2 }]);
        assert_eq!(last.effects[0].effect, Effect::ScrollToTop);
    }

    #[test]
    fn test_counts_track_displayed_at_every_step() {
        let report = report(&[
            ("d10000", true),
            ("d60000", false),
            ("d70000", true),
            ("f10000", false),
        ]);
        let mut machine = RevealMachine::new(RevealTimings::default());
        machine.load(Arc::clone(&report));
        loop {
            let (fail, pass) = machine.counts();
            assert_eq!(fail + pass, machine.state().displayed_total());
            assert!(fail + pass <= report.len());
            if machine.step().next.is_none() {
                break;
            }
        }
    }

    #[test]
    fn test_fail_inserted_after_last_fail() {
        let report = report(&[("d10000", true), ("d60000", false), ("d70000", true)]);
        let mut machine = RevealMachine::new(RevealTimings::default());
        machine.load(Arc::clone(&report));
        machine
            .state
            .displayed_by_category
            .insert(Category::DirectorshipPattern, vec!["d10000".into(), "d60000".into()]);

        let pos = machine.insert(Category::DirectorshipPattern, "d70000", Status::Fail);
        assert_eq!(pos, Some(1));
        assert_eq!(
            machine.state().displayed(Category::DirectorshipPattern),
            ["d10000", "d70000", "d60000"]
        );
        assert_eq!(machine.insert(Category::DirectorshipPattern, "d70000", Status::Fail), None);
    }

    #[test]
    fn test_clear_highlight_only_for_current_code() {
        let mut machine = RevealMachine::new(RevealTimings::default());
        machine.apply(&Effect::Highlight("a".into()));
        machine.apply(&Effect::Highlight("b".into()));
        assert_eq!(machine.apply(&Effect::ClearHighlight("a".into())), None);
        assert_eq!(machine.state().highlighted_code.as_deref(), Some("b"));
        assert!(machine.apply(&Effect::ClearHighlight("b".into())).is_some());
        assert_eq!(machine.state().highlighted_code, None);
    }

    #[test]
    fn test_empty_report_walks_headers_only() {
        let mut machine = RevealMachine::new(RevealTimings::default());
        machine.load(Arc::new(NormalizedReport::new("1", "x", Vec::<NormalizedIndicator>::new())));
        run_to_end(&mut machine);
        assert!(machine.state().is_complete());
        assert_eq!(machine.state().displayed_categories.len(), 6);
        assert_eq!(machine.counts(), (0, 0));
    }
}
