//! Reveal Module
//!
//! Staged disclosure of a normalized report: categories one by one, then
//! their indicators, with scroll and highlight cues and derived counters.

pub mod scheduler;
pub mod sequencer;
pub mod state;

pub use scheduler::{CancellationToken, Scheduler};
pub use sequencer::RevealSequencer;
pub use state::{
    Effect, RevealEvent, RevealMachine, RevealPhase, RevealState, RevealTimings, ScheduledEffect,
    StepOutcome,
};
