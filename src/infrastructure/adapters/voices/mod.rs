//! 音色目录适配器

mod file_voice_catalog;

pub use file_voice_catalog::FileVoiceCatalog;
