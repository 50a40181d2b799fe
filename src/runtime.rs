// Runtime debugging capabilities consumed by the Debugger domain
//
// The agent never talks to an engine directly; everything it needs from the
// host runtime arrives through the `RuntimeDebugger` trait. Every call
// assumes the caller holds the runtime's exclusivity lock: the engine is
// either paused or between statements, and never executes concurrently with
// the agent's own state mutation.

use serde::{Deserialize, Serialize};

use crate::messages::{ExceptionDetails, RemoteObject};

/// Identifies one loaded script instance. Ephemeral: a reload of the same URL
/// produces a new id.
pub type ScriptId = u32;

/// Identifies a breakpoint installed in the runtime, bound to one script
/// instance and exact source position.
pub type NativeBreakpointId = u32;

/// Identifies an event subscription held by the agent.
pub type SubscriptionId = u32;

/// Kind of step command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Into,
    Over,
    Out,
}

/// Exception pause mode forwarded to the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseOnExceptionsMode {
    None,
    Uncaught,
    All,
}

/// Runtime-level source location (0-based line/column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub script_id: ScriptId,
    pub line: u32,
    pub column: Option<u32>,
}

/// A breakpoint the runtime accepted, with the statement boundary it actually
/// landed on.
#[derive(Debug, Clone)]
pub struct ResolvedBreakpoint {
    pub native_id: NativeBreakpointId,
    pub location: SourceLocation,
}

/// One loaded script as the runtime reports it. `url` is `None` for
/// anonymous scripts (eval, injected fragments).
#[derive(Debug, Clone)]
pub struct ScriptInfo {
    pub script_id: ScriptId,
    pub url: Option<String>,
    pub line_count: u32,
}

/// One activation record of the paused call stack.
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub script_id: ScriptId,
    pub url: Option<String>,
    pub function_name: String,
    pub line: u32,
    pub column: u32,
    /// Character offset of this location from the start of the script source.
    /// Blackboxed-range boundaries are expressed in the same unit.
    pub source_offset: u64,
}

/// Events the runtime reports to its subscriber, delivered strictly in
/// occurrence order.
#[derive(Debug, Clone)]
pub enum DebuggerEvent {
    /// A native breakpoint was hit and execution stopped on it.
    BreakpointHit,
    /// A previously issued step command completed.
    StepFinished,
    /// Execution stopped on a thrown exception (per the configured
    /// pause-on-exceptions mode).
    ExceptionThrown,
    /// Execution stopped on a `debugger` statement.
    DebuggerStatement,
    /// The interrupt requested by an explicit pause took effect.
    ExplicitPause,
    /// A new script finished loading/parsing. Does not stop execution.
    ScriptLoaded(ScriptInfo),
    /// The runtime resumed on its own (e.g. an internal evaluation ended).
    Resumed,
}

/// Result of evaluating an expression on a paused call frame: a value handle,
/// or a description of the exception the expression threw. A thrown exception
/// is a successful evaluation, not an error.
#[derive(Debug, Clone)]
pub struct EvalOutcome {
    pub result: RemoteObject,
    pub exception_details: Option<ExceptionDetails>,
}

/// Native debugging API of the host runtime.
///
/// The expression evaluator rides on the same trait because it needs the
/// same exclusive runtime access as every other capability here.
pub trait RuntimeDebugger {
    /// Register interest in debugger events. The returned id revokes the
    /// subscription; after `unsubscribe` the runtime delivers nothing.
    fn subscribe(&mut self) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Whether the runtime is currently stopped.
    fn is_paused(&self) -> bool;

    fn resume(&mut self);
    fn step(&mut self, kind: StepKind);

    /// Ask the runtime to interrupt execution. Returns immediately; the
    /// actual stop is reported later as [`DebuggerEvent::ExplicitPause`].
    fn request_pause(&mut self);

    /// Install a native breakpoint, resolving the requested line/column to
    /// the script's nearest valid statement boundary. `None` when the
    /// location resolves to no statement at all.
    fn set_breakpoint(
        &mut self,
        location: &SourceLocation,
        condition: Option<&str>,
    ) -> Option<ResolvedBreakpoint>;

    /// Remove a native breakpoint. Unknown ids are a silent no-op; the
    /// script may already have been unloaded.
    fn remove_breakpoint(&mut self, id: NativeBreakpointId);

    fn set_pause_on_exceptions(&mut self, mode: PauseOnExceptionsMode);

    fn loaded_scripts(&self) -> Vec<ScriptInfo>;

    /// Call stack of the stopped execution, top frame first. Only valid
    /// while the runtime is stopped.
    fn call_stack(&self) -> Vec<StackFrame>;

    /// Evaluate an expression in the scope of one paused call frame
    /// (0 = top frame).
    fn evaluate_on_frame(&mut self, frame_index: usize, expression: &str) -> EvalOutcome;
}
