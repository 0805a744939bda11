//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod audio_pipeline;
mod cache_handlers;
mod prefetch_handler;
mod synthesize_handler;
mod transcribe_handler;
mod voice_gate;

pub use audio_pipeline::{apply_radio_to_wav, render_segments, RadioSettings, RenderPlan};
pub use cache_handlers::*;
pub use prefetch_handler::*;
pub use synthesize_handler::*;
pub use transcribe_handler::*;
