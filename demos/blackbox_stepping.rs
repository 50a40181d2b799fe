// Show blackboxed ranges steering step commands past ignored code

use anyhow::Result;
use cdp_debugger::messages::{DebuggerNotification, SetBlackboxedRangesRequest};
use cdp_debugger::mock::{frame, MockRuntime};
use cdp_debugger::{DebuggerDomainAgent, DebuggerEvent, MemoryStore};
use tokio::sync::mpsc;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("cdp_debugger=debug")
        .init();

    let runtime = MockRuntime::new();
    runtime.add_script(1, Some("bundle.js"), 4000);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut agent = DebuggerDomainAgent::new(runtime.clone(), MemoryStore::new(), tx);

    agent.enable()?;

    // Offsets 1000..2000 of the bundle hold an ignore-listed library.
    agent.set_blackboxed_ranges(SetBlackboxedRangesRequest {
        script_id: 1,
        positions: vec![1000, 2000],
    })?;
    println!("✓ Offsets 1000..2000 of bundle.js blackboxed");

    // Stop in user code, then step over a call into the library.
    runtime.set_stack(vec![frame(1, Some("bundle.js"), "main", 10, 250)]);
    agent.on_event(DebuggerEvent::DebuggerStatement);
    agent.step_over()?;

    // The step lands inside the library: the agent steps again on its own.
    runtime.set_stack(vec![frame(1, Some("bundle.js"), "libHelper", 60, 1500)]);
    agent.on_event(DebuggerEvent::StepFinished);
    println!("✓ Landed at offset 1500 (blackboxed) — auto-stepped");

    // The follow-up step exits the library and surfaces normally.
    runtime.set_stack(vec![frame(1, Some("bundle.js"), "main", 11, 270)]);
    agent.on_event(DebuggerEvent::StepFinished);
    println!("✓ Landed at offset 270 (user code) — pause surfaces");

    println!("\nRuntime commands issued: {:?}", runtime.commands());
    println!("Notifications sent to the client:");
    while let Ok(notification) = rx.try_recv() {
        if let DebuggerNotification::Paused(params) = &notification {
            println!("  Debugger.paused reason={:?}", params.reason);
        }
    }

    Ok(())
}
