// CDP Debugger domain core
//
// Translation layer between protocol-level debugging concepts and a managed
// runtime's native debugging API:
// - Protocol breakpoint identity mapped onto native breakpoints
// - Blackbox (ignore-list) filtering of pause events
// - Step/pause session state machine
// - Typed Debugger-domain messages

pub mod agent;
pub mod blackbox;
pub mod breakpoints;
pub mod messages;
pub mod mock;
pub mod protocol;
pub mod runtime;
pub mod session;
pub mod store;

pub use agent::DebuggerDomainAgent;
pub use protocol::{DebuggerError, DebuggerResult};
pub use runtime::{DebuggerEvent, RuntimeDebugger, StepKind};
pub use store::{MemoryStore, StateStore};
