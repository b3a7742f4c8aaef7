//! Speech adapters - simulated STT and TTS.

mod simulated_stt;
mod simulated_tts;

pub use simulated_stt::SimulatedSpeechToText;
pub use simulated_tts::SimulatedTextToSpeech;
