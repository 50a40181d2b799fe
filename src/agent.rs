// Debugger domain agent
//
// Root of the domain: accepts typed Debugger requests from the dispatcher,
// watches runtime events, and decides which pauses surface to the client and
// which are resolved silently by auto-stepping or auto-resuming. All methods
// expect to be invoked with exclusive access to the runtime.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::blackbox::BlackboxFilter;
use crate::breakpoints::BreakpointRegistry;
use crate::messages::{
    CallFrame, DebuggerNotification, EvaluateOnCallFrameRequest, EvaluateOnCallFrameResponse,
    Location, PauseReason, PausedParams, RemoveBreakpointRequest, ScriptParsedParams,
    SetBlackboxPatternsRequest, SetBlackboxedRangesRequest, SetBreakpointByUrlRequest,
    SetBreakpointByUrlResponse, SetBreakpointRequest, SetBreakpointResponse,
    SetBreakpointsActiveRequest, SetPauseOnExceptionsRequest,
};
use crate::protocol::{DebuggerError, DebuggerResult};
use crate::runtime::{
    DebuggerEvent, RuntimeDebugger, ScriptInfo, SourceLocation, StepKind, SubscriptionId,
};
use crate::session::SessionState;
use crate::store::{breakpoint_key, StateStore, StateValue};

/// Handler for the "Debugger" domain. Translates protocol-level breakpoint
/// and stepping concepts onto the runtime's native debugging API, enforcing
/// blackbox rules on which pause events the client gets to see.
pub struct DebuggerDomainAgent<R: RuntimeDebugger, S: StateStore> {
    runtime: R,
    store: S,
    outbound: mpsc::UnboundedSender<DebuggerNotification>,
    subscription: Option<SubscriptionId>,
    session: SessionState,
    breakpoints: BreakpointRegistry,
    blackbox: BlackboxFilter,
}

impl<R: RuntimeDebugger, S: StateStore> DebuggerDomainAgent<R, S> {
    pub fn new(runtime: R, store: S, outbound: mpsc::UnboundedSender<DebuggerNotification>) -> Self {
        Self {
            runtime,
            store,
            outbound,
            subscription: None,
            session: SessionState::new(),
            breakpoints: BreakpointRegistry::new(),
            blackbox: BlackboxFilter::new(),
        }
    }

    /// Debugger.enable. Idempotent: a second call succeeds without a second
    /// event subscription.
    pub fn enable(&mut self) -> DebuggerResult<()> {
        if self.session.enabled() {
            return Ok(());
        }

        info!("debugger domain enabled");
        self.session.set_enabled(true);
        self.subscription = Some(self.runtime.subscribe());

        // Announce scripts that were loaded before the domain came up.
        for script in self.runtime.loaded_scripts() {
            self.send_script_parsed(&script);
        }

        self.restore_persisted_breakpoints();

        // The runtime may already be stopped; surface exactly one pause
        // before any event is processed.
        if self.runtime.is_paused() {
            self.set_paused(PauseReason::AlreadyPaused);
        }
        Ok(())
    }

    /// Debugger.disable. Idempotent. Removes every native breakpoint this
    /// session installed and clears transient state; persistable breakpoint
    /// descriptions stay in the state store for a future enable. A paused
    /// runtime is resumed, since no observer remains to un-pause it.
    pub fn disable(&mut self) -> DebuggerResult<()> {
        if !self.session.enabled() {
            return Ok(());
        }

        info!("debugger domain disabled");
        if let Some(subscription) = self.subscription.take() {
            self.runtime.unsubscribe(subscription);
        }
        if self.session.paused() {
            self.runtime.resume();
        }
        self.breakpoints.detach_all(&mut self.runtime);
        self.blackbox = BlackboxFilter::new();
        self.session.reset();
        Ok(())
    }

    /// Debugger.pause. Returns before the stop occurs; the stop is delivered
    /// later as an ExplicitPause event. Idempotent success when already
    /// paused.
    pub fn pause(&mut self) -> DebuggerResult<()> {
        self.require_enabled()?;
        if self.session.paused() {
            debug!(
                reason = ?self.session.last_pause_reason(),
                "pause requested while already paused"
            );
            return Ok(());
        }
        self.session.request_explicit_pause();
        self.runtime.request_pause();
        Ok(())
    }

    /// Debugger.resume.
    pub fn resume(&mut self) -> DebuggerResult<()> {
        self.require_enabled()?;
        self.require_paused()?;
        self.session.clear_explicit_pause();
        self.runtime.resume();
        self.session.mark_resumed();
        Ok(())
    }

    pub fn step_into(&mut self) -> DebuggerResult<()> {
        self.step(StepKind::Into)
    }

    pub fn step_over(&mut self) -> DebuggerResult<()> {
        self.step(StepKind::Over)
    }

    pub fn step_out(&mut self) -> DebuggerResult<()> {
        self.step(StepKind::Out)
    }

    fn step(&mut self, kind: StepKind) -> DebuggerResult<()> {
        self.require_enabled()?;
        self.require_paused()?;
        self.session.record_step(kind);
        self.runtime.step(kind);
        self.session.mark_resumed();
        Ok(())
    }

    /// Debugger.setBreakpoint: exact-script, non-persistable.
    pub fn set_breakpoint(
        &mut self,
        req: SetBreakpointRequest,
    ) -> DebuggerResult<SetBreakpointResponse> {
        self.require_enabled()?;
        let target = SourceLocation {
            script_id: req.location.script_id,
            line: req.location.line_number,
            column: req.location.column_number,
        };
        let (id, location) =
            self.breakpoints
                .set_breakpoint(&mut self.runtime, &target, req.condition)?;
        Ok(SetBreakpointResponse {
            breakpoint_id: id,
            actual_location: location.into(),
        })
    }

    /// Debugger.setBreakpointByUrl: persistable, may match zero scripts now.
    pub fn set_breakpoint_by_url(
        &mut self,
        req: SetBreakpointByUrlRequest,
    ) -> DebuggerResult<SetBreakpointByUrlResponse> {
        self.require_enabled()?;
        let (id, locations) = self.breakpoints.set_breakpoint_by_url(
            &mut self.runtime,
            req.url,
            req.line_number,
            req.column_number,
            req.condition,
        );

        if let Some(breakpoint) = self.breakpoints.get(id) {
            self.store.put(
                breakpoint_key(id),
                StateValue::Breakpoint(breakpoint.description.clone()),
            );
        }

        Ok(SetBreakpointByUrlResponse {
            breakpoint_id: id,
            locations: locations.into_iter().map(Into::into).collect(),
        })
    }

    /// Debugger.removeBreakpoint.
    pub fn remove_breakpoint(&mut self, req: RemoveBreakpointRequest) -> DebuggerResult<()> {
        self.require_enabled()?;
        self.breakpoints.remove(&mut self.runtime, req.breakpoint_id)?;
        self.store.remove(&breakpoint_key(req.breakpoint_id));
        Ok(())
    }

    /// Debugger.setBreakpointsActive. Gates only whether a hit surfaces;
    /// native breakpoints stay installed either way.
    pub fn set_breakpoints_active(
        &mut self,
        req: SetBreakpointsActiveRequest,
    ) -> DebuggerResult<()> {
        self.require_enabled()?;
        self.session.set_breakpoints_active(req.active);
        Ok(())
    }

    /// Debugger.setBlackboxedRanges.
    pub fn set_blackboxed_ranges(&mut self, req: SetBlackboxedRangesRequest) -> DebuggerResult<()> {
        self.require_enabled()?;
        self.blackbox.set_ranges(req.script_id, req.positions)
    }

    /// Debugger.setBlackboxPatterns.
    pub fn set_blackbox_patterns(&mut self, req: SetBlackboxPatternsRequest) -> DebuggerResult<()> {
        self.require_enabled()?;
        self.blackbox
            .set_patterns(&req.patterns, req.blackbox_anonymous_scripts)
    }

    /// Debugger.setPauseOnExceptions.
    pub fn set_pause_on_exceptions(
        &mut self,
        req: SetPauseOnExceptionsRequest,
    ) -> DebuggerResult<()> {
        self.require_enabled()?;
        self.runtime.set_pause_on_exceptions(req.state);
        Ok(())
    }

    /// Debugger.evaluateOnCallFrame. A thrown exception comes back as
    /// exception details inside a successful response.
    pub fn evaluate_on_call_frame(
        &mut self,
        req: EvaluateOnCallFrameRequest,
    ) -> DebuggerResult<EvaluateOnCallFrameResponse> {
        self.require_enabled()?;
        self.require_paused()?;
        let outcome = self
            .runtime
            .evaluate_on_frame(req.call_frame_id as usize, &req.expression);
        Ok(EvaluateOnCallFrameResponse {
            result: outcome.result,
            exception_details: outcome.exception_details,
        })
    }

    /// Feed one runtime event. The host calls this under the same
    /// exclusivity guarantee as every request, strictly in occurrence order.
    pub fn on_event(&mut self, event: DebuggerEvent) {
        // Nothing is delivered after teardown.
        if !self.session.enabled() || self.subscription.is_none() {
            return;
        }
        debug!(?event, "runtime event");

        match event {
            DebuggerEvent::ScriptLoaded(script) => self.handle_script_loaded(script),

            DebuggerEvent::BreakpointHit => {
                if !self.session.breakpoints_active() {
                    debug!("breakpoints inactive; auto-resuming past hit");
                    self.runtime.resume();
                } else {
                    // Manual breakpoints are authoritative: they surface even
                    // inside blackboxed code.
                    self.set_paused(PauseReason::Breakpoint);
                }
            }

            DebuggerEvent::StepFinished => {
                if self.top_frame_blackboxed() {
                    // Landed in ignored code: keep going. A step-into keeps
                    // probing forward; over/out leave the blackboxed function
                    // entirely, since blackboxing is per file and therefore
                    // per function.
                    let kind = match self.session.last_step_kind() {
                        Some(StepKind::Into) => StepKind::Into,
                        _ => StepKind::Out,
                    };
                    debug!(?kind, "step landed in blackboxed range; stepping again");
                    self.runtime.step(kind);
                } else {
                    self.set_paused(PauseReason::Step);
                }
            }

            DebuggerEvent::ExceptionThrown => {
                if self.top_frame_blackboxed() {
                    self.runtime.resume();
                } else {
                    self.set_paused(PauseReason::Exception);
                }
            }

            DebuggerEvent::DebuggerStatement => {
                if self.top_frame_blackboxed() {
                    self.runtime.resume();
                } else {
                    self.set_paused(PauseReason::Other);
                }
            }

            DebuggerEvent::ExplicitPause => {
                if self.top_frame_blackboxed() {
                    // Advance out of ignored code; the pending pause stays
                    // set and is satisfied by whichever stop finally
                    // surfaces.
                    self.runtime.step(StepKind::Into);
                } else {
                    self.set_paused(PauseReason::ExplicitPause);
                }
            }

            DebuggerEvent::Resumed => self.session.mark_resumed(),
        }
    }

    fn handle_script_loaded(&mut self, script: ScriptInfo) {
        let resolved = self.breakpoints.on_script_loaded(
            &mut self.runtime,
            script.script_id,
            script.url.as_deref(),
        );
        if !resolved.is_empty() {
            debug!(
                script_id = script.script_id,
                count = resolved.len(),
                "breakpoints re-applied to loaded script"
            );
        }
        self.send_script_parsed(&script);
    }

    /// Re-create protocol breakpoints from descriptions persisted by an
    /// earlier session, attaching to whatever matching scripts are loaded.
    /// Entries are re-keyed under the ids this session assigned. Every old
    /// key is removed before any re-keyed entry is written: a fresh session
    /// assigns ids from the same range the old keys came from, so an
    /// interleaved removal could delete an entry that was just rewritten.
    fn restore_persisted_breakpoints(&mut self) {
        let mut descriptions = Vec::new();
        for (key, value) in self.store.entries() {
            self.store.remove(&key);
            let StateValue::Breakpoint(description) = value;
            if description.persistable() {
                descriptions.push(description);
            }
        }

        for description in descriptions {
            let url = description.url.clone();
            let id = self.breakpoints.create(description.clone(), None);
            for script in self.runtime.loaded_scripts() {
                if script.url == url {
                    self.breakpoints
                        .resolve_and_attach(&mut self.runtime, id, script.script_id);
                }
            }
            self.store
                .put(breakpoint_key(id), StateValue::Breakpoint(description));
            debug!(breakpoint_id = id, "persisted breakpoint restored");
        }
    }

    fn top_frame_blackboxed(&self) -> bool {
        match self.runtime.call_stack().first() {
            Some(top) => {
                self.blackbox
                    .is_blackboxed(top.script_id, top.url.as_deref(), top.source_offset)
            }
            None => false,
        }
    }

    fn set_paused(&mut self, reason: PauseReason) {
        self.session.mark_paused(reason);
        self.send_paused(reason);
    }

    fn send_paused(&mut self, reason: PauseReason) {
        let call_frames = self
            .runtime
            .call_stack()
            .into_iter()
            .enumerate()
            .map(|(index, frame)| CallFrame {
                call_frame_id: index as u32,
                function_name: frame.function_name,
                location: Location {
                    script_id: frame.script_id,
                    line_number: frame.line,
                    column_number: Some(frame.column),
                },
                url: frame.url.unwrap_or_default(),
            })
            .collect();

        self.notify(DebuggerNotification::Paused(PausedParams {
            reason,
            call_frames,
        }));
    }

    fn send_script_parsed(&mut self, script: &ScriptInfo) {
        self.notify(DebuggerNotification::ScriptParsed(ScriptParsedParams {
            script_id: script.script_id,
            url: script.url.clone().unwrap_or_default(),
            start_line: 0,
            end_line: script.line_count,
        }));
    }

    fn notify(&self, notification: DebuggerNotification) {
        if self.outbound.send(notification).is_err() {
            warn!("outbound notification channel closed; dropping");
        }
    }

    fn require_enabled(&self) -> DebuggerResult<()> {
        if self.session.enabled() {
            Ok(())
        } else {
            Err(DebuggerError::DomainNotEnabled)
        }
    }

    fn require_paused(&self) -> DebuggerResult<()> {
        if self.session.paused() {
            Ok(())
        } else {
            Err(DebuggerError::NotPaused)
        }
    }
}
