//! CareCall - Healthcare billing voice assistant
//!
//! An AI call agent for billing, insurance, and scheduling calls. Each
//! caller utterance runs through the turn orchestrator, which classifies
//! intent, decides whether to continue, escalate to a human, or end the
//! call, and generates the spoken reply.

pub mod adapters;
pub mod application;
pub mod audit;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
