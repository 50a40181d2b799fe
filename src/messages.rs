// Typed Debugger-domain protocol messages
//
// Wire-facing request/response/notification shapes. JSON framing and method
// routing belong to the embedding dispatcher; this crate only consumes and
// produces these typed values.

use serde::{Deserialize, Serialize};

use crate::breakpoints::BreakpointId;
use crate::runtime::{PauseOnExceptionsMode, ScriptId, SourceLocation};

/// Protocol-level source location (0-based line/column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub script_id: ScriptId,
    pub line_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
}

impl From<SourceLocation> for Location {
    fn from(loc: SourceLocation) -> Self {
        Self {
            script_id: loc.script_id,
            line_number: loc.line,
            column_number: loc.column,
        }
    }
}

/// One activation record of the paused call stack, as shown to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    pub call_frame_id: u32,
    pub function_name: String,
    pub location: Location,
    pub url: String,
}

/// Why execution stopped, as reported in `Debugger.paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PauseReason {
    Breakpoint,
    Step,
    Exception,
    /// `debugger` statements and anything without a more specific reason.
    Other,
    ExplicitPause,
    /// The runtime was already stopped when the domain was enabled.
    AlreadyPaused,
}

/// Value handle produced by the evaluation collaborator. Passed through
/// verbatim; this crate never materializes remote objects itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

/// Details of an exception thrown while evaluating on a call frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    pub text: String,
    pub line_number: u32,
    pub column_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<RemoteObject>,
}

// Requests

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointRequest {
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointByUrlRequest {
    pub url: String,
    pub line_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBreakpointRequest {
    pub breakpoint_id: BreakpointId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointsActiveRequest {
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBlackboxedRangesRequest {
    pub script_id: ScriptId,
    /// Boundary positions as character offsets in the originating source,
    /// non-decreasing. Segments alternate starting "not blackboxed".
    pub positions: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBlackboxPatternsRequest {
    pub patterns: Vec<String>,
    pub blackbox_anonymous_scripts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPauseOnExceptionsRequest {
    pub state: PauseOnExceptionsMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateOnCallFrameRequest {
    pub call_frame_id: u32,
    pub expression: String,
}

// Responses

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointResponse {
    pub breakpoint_id: BreakpointId,
    pub actual_location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointByUrlResponse {
    pub breakpoint_id: BreakpointId,
    /// Locations resolved against currently loaded scripts. Empty when no
    /// script matches yet; attachment happens lazily on future loads.
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateOnCallFrameResponse {
    pub result: RemoteObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_details: Option<ExceptionDetails>,
}

// Notifications

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PausedParams {
    pub reason: PauseReason,
    pub call_frames: Vec<CallFrame>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptParsedParams {
    pub script_id: ScriptId,
    /// Empty string for anonymous scripts, following CDP convention.
    pub url: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// Outbound notifications, tagged the way the dispatcher frames them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum DebuggerNotification {
    #[serde(rename = "Debugger.paused")]
    Paused(PausedParams),
    #[serde(rename = "Debugger.scriptParsed")]
    ScriptParsed(ScriptParsedParams),
}
