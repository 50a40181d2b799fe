// Debugger domain error taxonomy
//
// Every request-level failure maps to a stable numeric code carried in the
// structured error response. None of these abort the host process; evaluation
// exceptions are payload, not errors.

use thiserror::Error;

use crate::breakpoints::BreakpointId;
use crate::runtime::ScriptId;

pub type DebuggerResult<T> = Result<T, DebuggerError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DebuggerError {
    #[error("Debugger domain is not enabled")]
    DomainNotEnabled,

    #[error("Debugger is not paused")]
    NotPaused,

    #[error("Unknown breakpoint id: {0}")]
    UnknownBreakpoint(BreakpointId),

    #[error("No valid statement at the requested location")]
    InvalidLocation,

    #[error("Invalid blackbox pattern: {0}")]
    InvalidPattern(String),

    #[error("Blackboxed range positions must be non-decreasing (script {0})")]
    InvalidRanges(ScriptId),
}

// CDP server errors share the -32000 range; each taxonomy entry gets its own
// slot so clients can branch without parsing messages.

impl DebuggerError {
    pub fn code(&self) -> i32 {
        match self {
            DebuggerError::DomainNotEnabled => -32000,
            DebuggerError::NotPaused => -32001,
            DebuggerError::UnknownBreakpoint(_) => -32002,
            DebuggerError::InvalidLocation => -32003,
            DebuggerError::InvalidPattern(_) => -32004,
            DebuggerError::InvalidRanges(_) => -32005,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DebuggerError::DomainNotEnabled => "DOMAIN_NOT_ENABLED",
            DebuggerError::NotPaused => "NOT_PAUSED",
            DebuggerError::UnknownBreakpoint(_) => "UNKNOWN_BREAKPOINT",
            DebuggerError::InvalidLocation => "INVALID_LOCATION",
            DebuggerError::InvalidPattern(_) => "INVALID_PATTERN",
            DebuggerError::InvalidRanges(_) => "INVALID_RANGES",
        }
    }
}
