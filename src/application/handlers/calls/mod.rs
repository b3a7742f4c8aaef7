//! Call lifecycle command and query handlers.

mod end_call;
mod escalate_call;
mod get_call;
mod list_active_calls;
mod start_call;

pub use end_call::{EndCallCommand, EndCallHandler, EndCallResult};
pub use escalate_call::{EscalateCallCommand, EscalateCallHandler, EscalateCallResult};
pub use get_call::{GetCallHandler, TranscriptView};
pub use list_active_calls::{ActiveCallView, ActiveCallsView, ListActiveCallsHandler};
pub use start_call::{StartCallCommand, StartCallHandler};
