//! Terminal UI
//!
//! Company lookup, the animated results screen and the detail drill-down,
//! drawn with ratatui. Network work runs on background tasks that report
//! back over an mpsc channel, the same way the reveal bus is forwarded.

mod app;
mod ui;

pub use app::{App, Command, Mode, LOADING_DETAIL};
pub use ui::draw;

use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::analysis::{Analysis, AnalysisOutcome};
use crate::api::{ApiClient, ApiError, CompanyLite, IndicatorApi};
use crate::indicators::{DetailLoader, Normalizer};
use crate::render::DetailRegistry;
use crate::reveal::{RevealEvent, RevealSequencer, RevealTimings};
use crate::search::find_companies;

const SEARCH_TAKE: u64 = 20;

/// Events sent from background tasks to the TUI
enum AppEvent {
    Reveal(RevealEvent),
    Candidates(Vec<CompanyLite>),
    Analysis(u64, AnalysisOutcome),
    AnalysisFailed(u64, String),
    Error(String),
    Unauthorized,
}

/// Why the TUI returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiExit {
    Quit,
    /// The backend rejected the token; log in again.
    SessionExpired,
}

fn error_event(e: ApiError) -> AppEvent {
    match e {
        ApiError::Unauthorized => AppEvent::Unauthorized,
        other => AppEvent::Error(other.to_string()),
    }
}

pub struct ClariFindTui {
    api: Arc<ApiClient>,
    normalizer: Normalizer,
    timings: RevealTimings,
}

impl ClariFindTui {
    pub fn new(api: Arc<ApiClient>, normalizer: Normalizer) -> Self {
        Self {
            api,
            normalizer,
            timings: RevealTimings::default(),
        }
    }

    pub fn with_timings(mut self, timings: RevealTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Run until the user quits. `initial` is looked up straight away.
    pub async fn run(self, initial: Option<String>) -> Result<TuiExit> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

        let result = self.event_loop(&mut terminal, initial).await;

        disable_raw_mode()?;
        stdout().execute(LeaveAlternateScreen)?;
        result
    }

    async fn event_loop(
        &self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
        initial: Option<String>,
    ) -> Result<TuiExit> {
        let (tx, mut rx) = mpsc::channel(256);
        let sequencer = RevealSequencer::new(self.timings);

        // Forward the reveal bus into the UI channel
        let forward_tx = tx.clone();
        let mut reveal_rx = sequencer.subscribe();
        let forwarder = tokio::spawn(async move {
            loop {
                match reveal_rx.recv().await {
                    Ok(event) => {
                        if forward_tx.send(AppEvent::Reveal(event)).await.is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!("UI lagged behind the reveal by {} events", n);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let mut app = App::new(DetailRegistry::default());
        let mut loader: Option<Arc<DetailLoader>> = None;
        if let Some(query) = initial.filter(|q| !q.trim().is_empty()) {
            app.input = query.clone();
            self.execute(&mut app, Command::Search(query), &tx, &loader);
        }

        let tick_rate = Duration::from_millis(50);
        let mut last_tick = Instant::now();

        let exit = loop {
            app.reveal = sequencer.snapshot().await;
            if let Some(loader) = &loader {
                app.details = loader.snapshot().await;
            }

            // Handle background events
            let mut expired = false;
            while let Ok(event) = rx.try_recv() {
                match event {
                    AppEvent::Reveal(event) => app.on_reveal(&event),
                    AppEvent::Candidates(candidates) => {
                        let command = app.candidates_found(candidates);
                        self.execute(&mut app, command, &tx, &loader);
                    }
                    AppEvent::Analysis(generation, outcome) if generation == app.generation => {
                        match outcome {
                            AnalysisOutcome::Ready(report) => {
                                let api: Arc<dyn IndicatorApi> = self.api.clone();
                                let registration_id = report.registration_id().to_string();
                                loader = Some(Arc::new(DetailLoader::new(api, registration_id)));
                                app.load_report(Arc::clone(&report));
                                sequencer.start(report).await;
                            }
                            AnalysisOutcome::NoData { registration_id } => {
                                sequencer.stop().await;
                                app.mode = Mode::NoData(registration_id);
                            }
                        }
                    }
                    AppEvent::Analysis(generation, _) => {
                        info!("Dropping stale analysis result #{}", generation);
                    }
                    AppEvent::AnalysisFailed(generation, e) => {
                        if !app.analysis_failed(generation, e) {
                            info!("Dropping stale analysis error #{}", generation);
                        }
                    }
                    AppEvent::Error(e) => app.show_error(e),
                    AppEvent::Unauthorized => expired = true,
                }
            }
            if expired {
                break TuiExit::SessionExpired;
            }

            terminal.draw(|f| draw(f, &app))?;

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let command = app.handle_key(key.code);
                        if command == Command::Quit {
                            break TuiExit::Quit;
                        }
                        self.execute(&mut app, command, &tx, &loader);
                    }
                }
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
            }
        };

        sequencer.stop().await;
        forwarder.abort();
        Ok(exit)
    }

    fn execute(
        &self,
        app: &mut App,
        command: Command,
        tx: &mpsc::Sender<AppEvent>,
        loader: &Option<Arc<DetailLoader>>,
    ) {
        match command {
            Command::None | Command::Quit => {}
            Command::Search(query) => {
                let api = Arc::clone(&self.api);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let event = match find_companies(&api, &query, SEARCH_TAKE).await {
                        Ok(candidates) => AppEvent::Candidates(candidates),
                        Err(e) => error_event(e),
                    };
                    let _ = tx.send(event).await;
                });
            }
            Command::Analyze(registration_id) => {
                let generation = app.begin_analysis(&registration_id);
                let api = Arc::clone(&self.api);
                let normalizer = self.normalizer.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = Analysis::run(api.as_ref(), &registration_id, &normalizer).await;
                    let event = match result {
                        Ok(outcome) => AppEvent::Analysis(generation, outcome),
                        Err(ApiError::Unauthorized) => AppEvent::Unauthorized,
                        Err(e) => AppEvent::AnalysisFailed(generation, e.to_string()),
                    };
                    let _ = tx.send(event).await;
                });
            }
            Command::LoadDetail(code) => {
                if let Some(loader) = loader {
                    loader.spawn_ensure(&code);
                }
            }
        }
    }
}
