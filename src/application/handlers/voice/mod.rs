//! Voice pipeline handlers.

mod process_audio;
mod simulate_conversation;
mod text_to_speech;

pub use process_audio::{ProcessAudioCommand, ProcessAudioHandler, ProcessAudioResult, VoicePipeline};
pub use simulate_conversation::{
    SimulateConversationCommand, SimulateConversationHandler, SimulatedTurn, SimulationFailure,
    SimulationResult,
};
pub use text_to_speech::{TextToSpeechCommand, TextToSpeechHandler};
