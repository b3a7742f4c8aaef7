//! Telephony adapters.

mod simulated;

pub use simulated::{SimulatedTelephonyGateway, TelephonyEvent, TelephonyEventKind};
