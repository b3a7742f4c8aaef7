//! HTTP adapter for call lifecycle endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{EscalateRequest, StartCallRequest, TurnRequest, TurnResponse};
pub use routes::call_routes;
