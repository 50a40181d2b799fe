// Protocol breakpoint registry
//
// Owns client-visible breakpoint identity and its mapping to native
// breakpoints. One protocol breakpoint owns zero or more native breakpoints,
// one per currently loaded script matching its description.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::protocol::{DebuggerError, DebuggerResult};
use crate::runtime::{NativeBreakpointId, RuntimeDebugger, ScriptId, SourceLocation};

/// Client-visible breakpoint id, assigned by the registry.
pub type BreakpointId = u32;

/// Protocol ids start above the runtime's native breakpoint id space so the
/// two never collide when logged or compared.
const FIRST_BREAKPOINT_ID: BreakpointId = 100;

/// Where a breakpoint should be created. Immutable once built; cloned when
/// persisted across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointDescription {
    pub url: Option<String>,
    pub line: u32,
    pub column: Option<u32>,
    pub condition: Option<String>,
}

impl BreakpointDescription {
    /// Only URL-addressed breakpoints can apply to future scripts, so only
    /// those survive across sessions. Exact-script breakpoints die with
    /// their script instance.
    pub fn persistable(&self) -> bool {
        self.url.is_some()
    }
}

/// One native breakpoint implied by a protocol breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeBreakpointRef {
    pub native_id: NativeBreakpointId,
    pub script_id: ScriptId,
}

/// A protocol breakpoint and the native breakpoints currently backing it.
#[derive(Debug)]
pub struct ProtocolBreakpoint {
    pub description: BreakpointDescription,
    pub native_refs: Vec<NativeBreakpointRef>,
}

#[derive(Debug)]
pub struct BreakpointRegistry {
    breakpoints: HashMap<BreakpointId, ProtocolBreakpoint>,
    next_id: BreakpointId,
}

impl BreakpointRegistry {
    pub fn new() -> Self {
        Self {
            breakpoints: HashMap::new(),
            next_id: FIRST_BREAKPOINT_ID,
        }
    }

    /// Allocate the next protocol breakpoint, optionally seeded with a
    /// native breakpoint that was already resolved by the caller.
    pub fn create(
        &mut self,
        description: BreakpointDescription,
        seed: Option<NativeBreakpointRef>,
    ) -> BreakpointId {
        let id = self.next_id;
        self.next_id += 1;

        let native_refs = seed.into_iter().collect();
        self.breakpoints
            .insert(id, ProtocolBreakpoint { description, native_refs });

        debug!(breakpoint_id = id, "protocol breakpoint created");
        id
    }

    pub fn get(&self, id: BreakpointId) -> Option<&ProtocolBreakpoint> {
        self.breakpoints.get(&id)
    }

    /// Resolve the breakpoint's description against one script and install a
    /// native breakpoint there. Returns the resolved location, or `None`
    /// when the script has no valid statement at that position; nothing is
    /// attached in that case, and it is not an error.
    pub fn resolve_and_attach<R: RuntimeDebugger>(
        &mut self,
        runtime: &mut R,
        id: BreakpointId,
        script_id: ScriptId,
    ) -> Option<SourceLocation> {
        let breakpoint = self.breakpoints.get_mut(&id)?;
        let target = SourceLocation {
            script_id,
            line: breakpoint.description.line,
            column: breakpoint.description.column,
        };

        let resolved = runtime.set_breakpoint(&target, breakpoint.description.condition.as_deref())?;
        breakpoint.native_refs.push(NativeBreakpointRef {
            native_id: resolved.native_id,
            script_id,
        });

        debug!(
            breakpoint_id = id,
            native_id = resolved.native_id,
            script_id,
            "breakpoint attached"
        );
        Some(resolved.location)
    }

    /// Debugger.setBreakpoint: a non-persistable breakpoint scoped to exactly
    /// one script, resolved immediately or rejected.
    pub fn set_breakpoint<R: RuntimeDebugger>(
        &mut self,
        runtime: &mut R,
        location: &SourceLocation,
        condition: Option<String>,
    ) -> DebuggerResult<(BreakpointId, SourceLocation)> {
        let description = BreakpointDescription {
            url: None,
            line: location.line,
            column: location.column,
            condition,
        };

        // Resolve first so a bad location never leaves an empty breakpoint
        // behind; the resolved native breakpoint seeds the new entry.
        let resolved = runtime
            .set_breakpoint(location, description.condition.as_deref())
            .ok_or(DebuggerError::InvalidLocation)?;

        let id = self.create(
            description,
            Some(NativeBreakpointRef {
                native_id: resolved.native_id,
                script_id: location.script_id,
            }),
        );
        Ok((id, resolved.location))
    }

    /// Debugger.setBreakpointByUrl: a persistable breakpoint attached to
    /// every currently loaded script with that exact URL. Matching no script
    /// is fine; attachment then happens lazily on future loads.
    pub fn set_breakpoint_by_url<R: RuntimeDebugger>(
        &mut self,
        runtime: &mut R,
        url: String,
        line: u32,
        column: Option<u32>,
        condition: Option<String>,
    ) -> (BreakpointId, Vec<SourceLocation>) {
        let description = BreakpointDescription {
            url: Some(url.clone()),
            line,
            column,
            condition,
        };
        let id = self.create(description, None);

        let matching: Vec<ScriptId> = runtime
            .loaded_scripts()
            .into_iter()
            .filter(|script| script.url.as_deref() == Some(url.as_str()))
            .map(|script| script.script_id)
            .collect();

        let mut locations = Vec::new();
        for script_id in matching {
            if let Some(location) = self.resolve_and_attach(runtime, id, script_id) {
                locations.push(location);
            }
        }
        (id, locations)
    }

    /// Re-apply persistable breakpoints to a newly loaded script. Returns
    /// the locations that resolved.
    pub fn on_script_loaded<R: RuntimeDebugger>(
        &mut self,
        runtime: &mut R,
        script_id: ScriptId,
        url: Option<&str>,
    ) -> Vec<(BreakpointId, SourceLocation)> {
        let Some(url) = url else {
            return Vec::new();
        };

        let matching: Vec<BreakpointId> = self
            .breakpoints
            .iter()
            .filter(|(_, bp)| bp.description.url.as_deref() == Some(url))
            .map(|(id, _)| *id)
            .collect();

        matching
            .into_iter()
            .filter_map(|id| {
                self.resolve_and_attach(runtime, id, script_id)
                    .map(|location| (id, location))
            })
            .collect()
    }

    /// Debugger.removeBreakpoint: detach every native breakpoint and drop
    /// the description.
    pub fn remove<R: RuntimeDebugger>(
        &mut self,
        runtime: &mut R,
        id: BreakpointId,
    ) -> DebuggerResult<()> {
        let breakpoint = self
            .breakpoints
            .remove(&id)
            .ok_or(DebuggerError::UnknownBreakpoint(id))?;

        for native in breakpoint.native_refs {
            runtime.remove_breakpoint(native.native_id);
        }
        debug!(breakpoint_id = id, "protocol breakpoint removed");
        Ok(())
    }

    /// Detach every native breakpoint and drop all entries. Used on domain
    /// teardown; persisted descriptions live in the state store, not here.
    pub fn detach_all<R: RuntimeDebugger>(&mut self, runtime: &mut R) {
        for (_, breakpoint) in self.breakpoints.drain() {
            for native in breakpoint.native_refs {
                runtime.remove_breakpoint(native.native_id);
            }
        }
    }
}

impl Default for BreakpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}
