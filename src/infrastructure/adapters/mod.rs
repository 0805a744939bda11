//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod codec;
pub mod storage;
pub mod transcriber;
pub mod tts;
pub mod voices;

pub use codec::*;
pub use storage::*;
pub use transcriber::*;
pub use tts::*;
pub use voices::*;
