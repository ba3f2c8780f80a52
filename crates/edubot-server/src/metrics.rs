//! Prometheus metrics collection and formatting.
//!
//! This module provides metrics in Prometheus text exposition format.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::state::AppState;

/// How a chat turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Failed,
    Cancelled,
}

/// Process-lifetime counters.
#[derive(Debug, Default)]
pub struct Metrics {
    turns_completed: AtomicU64,
    turns_failed: AtomicU64,
    turns_cancelled: AtomicU64,
    lexical_triggers: AtomicU64,
    behavioral_triggers: AtomicU64,
    sessions_evicted: AtomicU64,
}

impl Metrics {
    pub fn record_turn(&self, outcome: TurnOutcome) {
        let counter = match outcome {
            TurnOutcome::Completed => &self.turns_completed,
            TurnOutcome::Failed => &self.turns_failed,
            TurnOutcome::Cancelled => &self.turns_cancelled,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_affect(&self, lexical: bool, behavioral: bool) {
        if lexical {
            self.lexical_triggers.fetch_add(1, Ordering::Relaxed);
        }
        if behavioral {
            self.behavioral_triggers.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_evictions(&self, count: usize) {
        self.sessions_evicted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn turns(&self, outcome: TurnOutcome) -> u64 {
        match outcome {
            TurnOutcome::Completed => self.turns_completed.load(Ordering::Relaxed),
            TurnOutcome::Failed => self.turns_failed.load(Ordering::Relaxed),
            TurnOutcome::Cancelled => self.turns_cancelled.load(Ordering::Relaxed),
        }
    }
}

/// Collect all metrics from AppState and format as Prometheus text.
pub async fn collect_metrics(state: &Arc<AppState>) -> String {
    let mut output = String::new();
    let m = &state.metrics;

    let sessions = state.sessions.len().await;
    writeln!(output, "# HELP edubot_sessions_active Number of live chat sessions").ok();
    writeln!(output, "# TYPE edubot_sessions_active gauge").ok();
    writeln!(output, "edubot_sessions_active {sessions}").ok();

    writeln!(output).ok();
    writeln!(output, "# HELP edubot_turns_total Chat turns by outcome").ok();
    writeln!(output, "# TYPE edubot_turns_total counter").ok();
    for (label, outcome) in [
        ("completed", TurnOutcome::Completed),
        ("failed", TurnOutcome::Failed),
        ("cancelled", TurnOutcome::Cancelled),
    ] {
        writeln!(
            output,
            "edubot_turns_total{{outcome=\"{label}\"}} {}",
            m.turns(outcome)
        )
        .ok();
    }

    writeln!(output).ok();
    writeln!(
        output,
        "# HELP edubot_affect_triggers_total Turns that received an emotional-support note, by signal"
    )
    .ok();
    writeln!(output, "# TYPE edubot_affect_triggers_total counter").ok();
    writeln!(
        output,
        "edubot_affect_triggers_total{{kind=\"lexical\"}} {}",
        m.lexical_triggers.load(Ordering::Relaxed)
    )
    .ok();
    writeln!(
        output,
        "edubot_affect_triggers_total{{kind=\"behavioral\"}} {}",
        m.behavioral_triggers.load(Ordering::Relaxed)
    )
    .ok();

    writeln!(output).ok();
    writeln!(output, "# HELP edubot_sessions_evicted_total Sessions removed by the idle sweeper").ok();
    writeln!(output, "# TYPE edubot_sessions_evicted_total counter").ok();
    writeln!(
        output,
        "edubot_sessions_evicted_total {}",
        m.sessions_evicted.load(Ordering::Relaxed)
    )
    .ok();

    output
}
