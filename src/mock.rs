// Scripted runtime for tests and demos
//
// Implements the RuntimeDebugger capabilities over an in-memory script table
// so the agent can be exercised without a live engine. Cloning the handle
// shares the underlying state, letting a test drive the runtime while the
// agent owns its own handle.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::messages::RemoteObject;
use crate::runtime::{
    DebuggerEvent, EvalOutcome, NativeBreakpointId, PauseOnExceptionsMode, ResolvedBreakpoint,
    RuntimeDebugger, ScriptId, ScriptInfo, SourceLocation, StackFrame, StepKind, SubscriptionId,
};

/// Commands the agent issued against the runtime, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCommand {
    Resume,
    Step(StepKind),
    RequestPause,
    SetBreakpoint(SourceLocation),
    RemoveBreakpoint(NativeBreakpointId),
    SetPauseOnExceptions(PauseOnExceptionsMode),
}

#[derive(Debug, Default)]
struct MockState {
    scripts: Vec<ScriptInfo>,
    stack: Vec<StackFrame>,
    paused: bool,
    commands: Vec<RuntimeCommand>,
    installed: HashMap<NativeBreakpointId, SourceLocation>,
    last_condition: Option<String>,
    eval_results: HashMap<String, EvalOutcome>,
    next_native_id: NativeBreakpointId,
    next_subscription_id: SubscriptionId,
    subscriber: Option<SubscriptionId>,
    subscribe_calls: u32,
}

/// Shared-handle scripted runtime.
#[derive(Debug, Clone, Default)]
pub struct MockRuntime {
    inner: Rc<RefCell<MockState>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loaded script. Lines `0..line_count` resolve to valid
    /// statements; anything past the end does not.
    pub fn add_script(&self, script_id: ScriptId, url: Option<&str>, line_count: u32) {
        self.inner.borrow_mut().scripts.push(ScriptInfo {
            script_id,
            url: url.map(str::to_string),
            line_count,
        });
    }

    /// Replace the call stack reported while stopped, top frame first.
    pub fn set_stack(&self, frames: Vec<StackFrame>) {
        self.inner.borrow_mut().stack = frames;
    }

    pub fn set_paused(&self, paused: bool) {
        self.inner.borrow_mut().paused = paused;
    }

    /// Canned evaluation outcome for one expression. Unknown expressions
    /// echo back as a string handle.
    pub fn stub_eval(&self, expression: &str, outcome: EvalOutcome) {
        self.inner
            .borrow_mut()
            .eval_results
            .insert(expression.to_string(), outcome);
    }

    pub fn commands(&self) -> Vec<RuntimeCommand> {
        self.inner.borrow().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.inner.borrow_mut().commands.clear();
    }

    /// Number of native breakpoints currently installed.
    pub fn installed_breakpoints(&self) -> usize {
        self.inner.borrow().installed.len()
    }

    pub fn last_condition(&self) -> Option<String> {
        self.inner.borrow().last_condition.clone()
    }

    pub fn subscribe_calls(&self) -> u32 {
        self.inner.borrow().subscribe_calls
    }

    pub fn is_subscribed(&self) -> bool {
        self.inner.borrow().subscriber.is_some()
    }
}

/// Build a stack frame for tests/demos without spelling every field.
pub fn frame(
    script_id: ScriptId,
    url: Option<&str>,
    function_name: &str,
    line: u32,
    source_offset: u64,
) -> StackFrame {
    StackFrame {
        script_id,
        url: url.map(str::to_string),
        function_name: function_name.to_string(),
        line,
        column: 0,
        source_offset,
    }
}

/// An event with no payload, for driving the agent directly in tests/demos.
pub fn script_loaded(script_id: ScriptId, url: Option<&str>, line_count: u32) -> DebuggerEvent {
    DebuggerEvent::ScriptLoaded(ScriptInfo {
        script_id,
        url: url.map(str::to_string),
        line_count,
    })
}

impl RuntimeDebugger for MockRuntime {
    fn subscribe(&mut self) -> SubscriptionId {
        let mut state = self.inner.borrow_mut();
        state.subscribe_calls += 1;
        let id = state.next_subscription_id;
        state.next_subscription_id += 1;
        state.subscriber = Some(id);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        let mut state = self.inner.borrow_mut();
        if state.subscriber == Some(id) {
            state.subscriber = None;
        }
    }

    fn is_paused(&self) -> bool {
        self.inner.borrow().paused
    }

    fn resume(&mut self) {
        let mut state = self.inner.borrow_mut();
        state.paused = false;
        state.commands.push(RuntimeCommand::Resume);
    }

    fn step(&mut self, kind: StepKind) {
        let mut state = self.inner.borrow_mut();
        state.paused = false;
        state.commands.push(RuntimeCommand::Step(kind));
    }

    fn request_pause(&mut self) {
        // The stop itself arrives later as an ExplicitPause event.
        self.inner
            .borrow_mut()
            .commands
            .push(RuntimeCommand::RequestPause);
    }

    fn set_breakpoint(
        &mut self,
        location: &SourceLocation,
        condition: Option<&str>,
    ) -> Option<ResolvedBreakpoint> {
        let mut state = self.inner.borrow_mut();
        state
            .commands
            .push(RuntimeCommand::SetBreakpoint(location.clone()));
        state.last_condition = condition.map(str::to_string);

        let script = state
            .scripts
            .iter()
            .find(|s| s.script_id == location.script_id)?;
        if location.line >= script.line_count {
            return None;
        }

        let resolved = SourceLocation {
            script_id: location.script_id,
            line: location.line,
            column: Some(location.column.unwrap_or(0)),
        };
        state.next_native_id += 1;
        let native_id = state.next_native_id;
        state.installed.insert(native_id, resolved.clone());

        Some(ResolvedBreakpoint {
            native_id,
            location: resolved,
        })
    }

    fn remove_breakpoint(&mut self, id: NativeBreakpointId) {
        let mut state = self.inner.borrow_mut();
        state.commands.push(RuntimeCommand::RemoveBreakpoint(id));
        state.installed.remove(&id);
    }

    fn set_pause_on_exceptions(&mut self, mode: PauseOnExceptionsMode) {
        self.inner
            .borrow_mut()
            .commands
            .push(RuntimeCommand::SetPauseOnExceptions(mode));
    }

    fn loaded_scripts(&self) -> Vec<ScriptInfo> {
        self.inner.borrow().scripts.clone()
    }

    fn call_stack(&self) -> Vec<StackFrame> {
        self.inner.borrow().stack.clone()
    }

    fn evaluate_on_frame(&mut self, _frame_index: usize, expression: &str) -> EvalOutcome {
        let state = self.inner.borrow();
        if let Some(outcome) = state.eval_results.get(expression) {
            return outcome.clone();
        }
        EvalOutcome {
            result: RemoteObject {
                object_type: "string".to_string(),
                value: Some(serde_json::Value::String(expression.to_string())),
                description: Some(expression.to_string()),
                object_id: None,
            },
            exception_details: None,
        }
    }
}
