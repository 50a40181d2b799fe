// Walk through a full breakpoint session against the scripted runtime

use anyhow::Result;
use cdp_debugger::messages::{
    DebuggerNotification, EvaluateOnCallFrameRequest, RemoveBreakpointRequest,
    SetBreakpointByUrlRequest,
};
use cdp_debugger::mock::{frame, script_loaded, MockRuntime};
use cdp_debugger::{DebuggerDomainAgent, DebuggerEvent, MemoryStore};
use tokio::sync::mpsc;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("cdp_debugger=debug")
        .init();

    let runtime = MockRuntime::new();
    runtime.add_script(1, Some("app.js"), 120);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut agent = DebuggerDomainAgent::new(runtime.clone(), MemoryStore::new(), tx);

    agent.enable()?;
    println!("✓ Debugger domain enabled");

    // A URL breakpoint attaches to the already-loaded app.js and to every
    // future script with the same URL.
    let response = agent.set_breakpoint_by_url(SetBreakpointByUrlRequest {
        url: "app.js".to_string(),
        line_number: 42,
        column_number: None,
        condition: None,
    })?;
    println!(
        "✓ Breakpoint {} set, resolved at {} location(s)",
        response.breakpoint_id,
        response.locations.len()
    );

    // A reload produces a fresh script instance; the breakpoint re-applies.
    runtime.add_script(2, Some("app.js"), 120);
    agent.on_event(script_loaded(2, Some("app.js"), 120));
    println!("✓ app.js reloaded as script 2");

    // The runtime stops on the breakpoint.
    runtime.set_stack(vec![
        frame(2, Some("app.js"), "handleClick", 42, 1085),
        frame(2, Some("app.js"), "main", 7, 160),
    ]);
    agent.on_event(DebuggerEvent::BreakpointHit);

    let evaluation = agent.evaluate_on_call_frame(EvaluateOnCallFrameRequest {
        call_frame_id: 0,
        expression: "count + 1".to_string(),
    })?;
    println!(
        "✓ Evaluated on top frame: {}",
        evaluation.result.description.unwrap_or_default()
    );

    agent.resume()?;
    agent.remove_breakpoint(RemoveBreakpointRequest {
        breakpoint_id: response.breakpoint_id,
    })?;
    agent.disable()?;

    println!("\nNotifications sent to the client:");
    while let Ok(notification) = rx.try_recv() {
        match &notification {
            DebuggerNotification::Paused(params) => {
                println!(
                    "  Debugger.paused reason={:?} frames={}",
                    params.reason,
                    params.call_frames.len()
                );
            }
            DebuggerNotification::ScriptParsed(params) => {
                println!(
                    "  Debugger.scriptParsed script={} url={}",
                    params.script_id, params.url
                );
            }
        }
    }

    Ok(())
}
