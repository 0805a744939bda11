//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：合成、预取、缓存清理、识别

mod cache_commands;
mod prefetch_commands;
mod synthesize_commands;
mod transcribe_commands;

pub mod handlers;

pub use cache_commands::*;
pub use prefetch_commands::*;
pub use synthesize_commands::*;
pub use transcribe_commands::*;
