//! One-directional escalation state machine.

use std::fmt;

/// Stage of a pipeline run. Ordering follows the escalation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EscalationState {
    Initial,
    TableTried,
    TextTried,
    PsmRetry,
    Split2,
    Split3,
    Done,
}

impl fmt::Display for EscalationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EscalationState::Initial => "initial",
            EscalationState::TableTried => "table-tried",
            EscalationState::TextTried => "text-tried",
            EscalationState::PsmRetry => "psm-retry",
            EscalationState::Split2 => "split2",
            EscalationState::Split3 => "split3",
            EscalationState::Done => "done",
        })
    }
}

/// Tracks the current stage and refuses to move backwards.
#[derive(Debug, Clone)]
pub struct EscalationController {
    state: EscalationState,
    visited: Vec<EscalationState>,
}

impl Default for EscalationController {
    fn default() -> Self {
        Self::new()
    }
}

impl EscalationController {
    pub fn new() -> Self {
        Self {
            state: EscalationState::Initial,
            visited: vec![EscalationState::Initial],
        }
    }

    pub fn state(&self) -> EscalationState {
        self.state
    }

    /// States entered so far, in order.
    pub fn visited(&self) -> &[EscalationState] {
        &self.visited
    }

    pub fn is_done(&self) -> bool {
        self.state == EscalationState::Done
    }

    /// Move forward to `next`. Returns `false` (and stays put) for a backwards
    /// or repeated transition, or once the run is done.
    pub fn advance(&mut self, next: EscalationState) -> bool {
        if next <= self.state {
            tracing::warn!(from = %self.state, to = %next, "Ignoring backwards escalation transition");
            return false;
        }
        tracing::debug!(from = %self.state, to = %next, "Escalation transition");
        self.state = next;
        self.visited.push(next);
        true
    }

    pub fn finish(&mut self) {
        if !self.is_done() {
            self.advance(EscalationState::Done);
        }
    }
}
