//! 语音识别适配器

mod http_transcriber;

pub use http_transcriber::{HttpTranscriber, HttpTranscriberConfig};
