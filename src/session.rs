// Debug session state
//
// Pure state holder for the enabled/paused/pending-pause/last-step bookkeeping
// the agent consults while deciding how to react to runtime events. No method
// here has side effects beyond these fields; all runtime commands are issued
// by the agent.

use crate::messages::PauseReason;
use crate::runtime::StepKind;

#[derive(Debug)]
pub struct SessionState {
    enabled: bool,
    /// Whether installed breakpoints take effect. When false, breakpoint hits
    /// are auto-resumed without surfacing.
    breakpoints_active: bool,
    /// Whether the debugger considers itself paused. Stays false during pure
    /// load/parse events even though the runtime is momentarily inspected.
    paused: bool,
    explicit_pause_pending: bool,
    /// Last step kind the user requested. Never reset: the protocol cannot
    /// tell when a step silently resolved to a resume, so this is only
    /// meaningful in contexts where a step is known to be in flight.
    last_step_kind: Option<StepKind>,
    last_pause_reason: Option<PauseReason>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            enabled: false,
            breakpoints_active: true,
            paused: false,
            explicit_pause_pending: false,
            last_step_kind: None,
            last_pause_reason: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_breakpoints_active(&mut self, active: bool) {
        self.breakpoints_active = active;
    }

    /// Execution stopped and the stop surfaces to the client. A pending
    /// explicit pause is implicitly satisfied by whichever event stops
    /// execution.
    pub fn mark_paused(&mut self, reason: PauseReason) {
        self.paused = true;
        self.explicit_pause_pending = false;
        self.last_pause_reason = Some(reason);
    }

    pub fn mark_resumed(&mut self) {
        self.paused = false;
    }

    /// Record a user step. Last request wins: issuing a new step while the
    /// previous one has not yet finished overwrites the kind.
    pub fn record_step(&mut self, kind: StepKind) {
        self.last_step_kind = Some(kind);
    }

    pub fn request_explicit_pause(&mut self) {
        self.explicit_pause_pending = true;
    }

    pub fn clear_explicit_pause(&mut self) {
        self.explicit_pause_pending = false;
    }

    /// Back to the post-construction state. Used on domain teardown.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn breakpoints_active(&self) -> bool {
        self.breakpoints_active
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn explicit_pause_pending(&self) -> bool {
        self.explicit_pause_pending
    }

    pub fn last_step_kind(&self) -> Option<StepKind> {
        self.last_step_kind
    }

    pub fn last_pause_reason(&self) -> Option<PauseReason> {
        self.last_pause_reason
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
