//! HTTP Handlers

mod cache;
mod health;
mod prefetch;
mod transcribe;
mod tts;
mod voices;

pub use cache::*;
pub use health::*;
pub use prefetch::*;
pub use transcribe::*;
pub use tts::*;
pub use voices::*;
