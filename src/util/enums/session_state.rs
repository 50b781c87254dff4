use std::fmt::{Display, Formatter};

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ModeKind {
    AutomaticTracking,
    ManualOverride,
    DaySimulation,
    RetrogradeSimulation,
}

impl Display for ModeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ModeKind::AutomaticTracking => "automatic tracking",
            ModeKind::ManualOverride => "manual override",
            ModeKind::DaySimulation => "day simulation",
            ModeKind::RetrogradeSimulation => "retrograde simulation",
        })
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SessionState {
    Idle,
    Running(ModeKind),
    Cancelled,
    Completed,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// Idle -> Running -> {Cancelled, Completed} -> Idle.
    /// Running -> Idle is the error exit.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Running(_))
                | (Running(_), Cancelled)
                | (Running(_), Completed)
                | (Running(_), Idle)
                | (Cancelled, Idle)
                | (Completed, Idle)
        )
    }
}

/// How a run that did not fail came to an end
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum RunOutcome {
    /// A simulated clock passed its end instant
    Completed { frames_sent: u64 },
    /// The cancel signal fired, or operator input closed
    Cancelled { frames_sent: u64 },
}

impl RunOutcome {
    pub fn frames_sent(&self) -> u64 {
        match self {
            RunOutcome::Completed { frames_sent } | RunOutcome::Cancelled { frames_sent } => {
                *frames_sent
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled { .. })
    }
}
