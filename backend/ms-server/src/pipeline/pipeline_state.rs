use std::fmt;

/// Why a request was turned away instead of getting its handler's response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    TooManyRequests,
    Unauthenticated,
    ScopeBindingFailed,
    PoolExhausted,
}

impl RejectionReason {
    /// Stable label used for metrics and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TooManyRequests => "too_many_requests",
            Self::Unauthenticated => "unauthenticated",
            Self::ScopeBindingFailed => "scope_binding_failed",
            Self::PoolExhausted => "pool_exhausted",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage a request has reached in the gatekeeper.
///
/// Stages only ever move forward, one at a time. `Rejected` is reachable from
/// every non-terminal stage; `Released` only from `Dispatched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Received,
    RateChecked,
    CredentialChecked,
    ContextBound,
    ScopeAcquired,
    Dispatched,
    Released,
    Rejected(RejectionReason),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Released | Self::Rejected(_))
    }

    pub fn can_transition_to(&self, next: &PipelineState) -> bool {
        use PipelineState::*;

        if self.is_terminal() {
            return false;
        }

        matches!(
            (self, next),
            (_, Rejected(_))
                | (Received, RateChecked)
                | (RateChecked, CredentialChecked)
                | (CredentialChecked, ContextBound)
                | (ContextBound, ScopeAcquired)
                | (ScopeAcquired, Dispatched)
                | (Dispatched, Released)
        )
    }
}

/// Ordered record of the stages one request went through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTrail {
    states: Vec<PipelineState>,
}

impl StateTrail {
    pub fn new() -> Self {
        Self {
            states: vec![PipelineState::Received],
        }
    }

    pub fn current(&self) -> PipelineState {
        self.states
            .last()
            .copied()
            .unwrap_or(PipelineState::Received)
    }

    /// Move to `next`; an illegal move is refused and leaves the trail unchanged
    pub fn advance(&mut self, next: PipelineState) -> bool {
        let current = self.current();
        if !current.can_transition_to(&next) {
            log::error!("Illegal pipeline transition {:?} -> {:?}", current, next);
            return false;
        }
        self.states.push(next);
        true
    }

    pub fn states(&self) -> &[PipelineState] {
        &self.states
    }

    /// The rejection reason, if the request was turned away
    pub fn rejection(&self) -> Option<RejectionReason> {
        match self.current() {
            PipelineState::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

impl Default for StateTrail {
    fn default() -> Self {
        Self::new()
    }
}
