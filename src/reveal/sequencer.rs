//! Reveal Sequencer
//!
//! Drives a `RevealMachine` on tokio timers. Each `start` begins a new run
//! with its own cancellation token; the previous run is cancelled and the
//! state reset before the new one is loaded, and every delayed effect checks
//! its token while holding the machine lock. A timer left over from an
//! earlier company can therefore never touch the current state.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, info};

use super::scheduler::{CancellationToken, Scheduler};
use super::state::{RevealEvent, RevealMachine, RevealState, RevealTimings};
use crate::indicators::NormalizedReport;

struct Run {
    scheduler: Scheduler,
    driver: AbortHandle,
}

impl Run {
    fn cancel(&self) {
        self.scheduler.cancel();
        self.driver.abort();
    }
}

pub struct RevealSequencer {
    machine: Arc<Mutex<RevealMachine>>,
    tx: broadcast::Sender<RevealEvent>,
    run: StdMutex<Option<Run>>,
}

impl RevealSequencer {
    pub fn new(timings: RevealTimings) -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            machine: Arc::new(Mutex::new(RevealMachine::new(timings))),
            tx,
            run: StdMutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RevealEvent> {
        self.tx.subscribe()
    }

    pub async fn snapshot(&self) -> RevealState {
        self.machine.lock().await.state().clone()
    }

    /// Displayed (fail, pass) right now.
    pub async fn counts(&self) -> (usize, usize) {
        self.machine.lock().await.counts()
    }

    /// Timers of the current run still waiting to fire.
    pub fn pending_effects(&self) -> usize {
        self.lock_run().as_ref().map(|r| r.scheduler.pending()).unwrap_or(0)
    }

    fn lock_run(&self) -> std::sync::MutexGuard<'_, Option<Run>> {
        self.run.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cancel_current(&self) {
        if let Some(run) = self.lock_run().take() {
            run.cancel();
        }
    }

    /// Begin revealing `report`, abandoning any run in progress.
    pub async fn start(&self, report: Arc<NormalizedReport>) {
        self.cancel_current();

        let token = Arc::new(CancellationToken::new());
        let scheduler = Scheduler::new(Arc::clone(&token));
        {
            let mut machine = self.machine.lock().await;
            let _ = self.tx.send(machine.load(Arc::clone(&report)));
        }
        info!(
            "Starting reveal for {} ({} indicators)",
            report.registration_id(),
            report.len()
        );

        let driver = tokio::spawn(drive(
            Arc::clone(&self.machine),
            scheduler.clone(),
            self.tx.clone(),
        ));
        *self.lock_run() = Some(Run {
            scheduler,
            driver: driver.abort_handle(),
        });
    }

    /// Cancel the run and return to `Idle`.
    pub async fn stop(&self) {
        self.cancel_current();
        let mut machine = self.machine.lock().await;
        let _ = self.tx.send(machine.reset());
    }
}

impl Drop for RevealSequencer {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

async fn drive(
    machine: Arc<Mutex<RevealMachine>>,
    scheduler: Scheduler,
    tx: broadcast::Sender<RevealEvent>,
) {
    let token = Arc::clone(scheduler.token());
    let mut delay = Duration::ZERO;

    loop {
        if !delay.is_zero() {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let outcome = {
            let mut machine = machine.lock().await;
            if token.is_cancelled() {
                return;
            }
            let outcome = machine.step();
            for event in &outcome.events {
                let _ = tx.send(event.clone());
            }
            outcome
        };

        for scheduled in outcome.effects {
            let machine = Arc::clone(&machine);
            let token = Arc::clone(&token);
            let tx = tx.clone();
            scheduler.schedule(scheduled.after, async move {
                let mut machine = machine.lock().await;
                if token.is_cancelled() {
                    return;
                }
                if let Some(event) = machine.apply(&scheduled.effect) {
                    let _ = tx.send(event);
                }
            });
        }

        match outcome.next {
            Some(next) => delay = next,
            None => {
                debug!("Reveal driver finished");
                return;
            }
        }
    }
}
