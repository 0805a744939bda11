//! 缓存 Key
//!
//! 缓存 key 覆盖所有影响输出音频字节的参数：
//! 模型版本、音色、角色、无线电效果、语速、语言、规范化文本。

use serde::{Deserialize, Serialize};

use super::text_segmenter::normalize_whitespace;

/// 缓存 key 的组成字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheKeyFields {
    pub model_version: String,
    pub voice_id: String,
    pub role: Option<String>,
    pub radio_profile: Option<String>,
    pub speed: f64,
    pub language: String,
    /// 已规范化的文本（空白合并、去除首尾空白）
    pub text_norm: String,
}

impl CacheKeyFields {
    /// 创建 key 字段，文本在此处规范化
    pub fn new(
        model_version: impl Into<String>,
        voice_id: impl Into<String>,
        language: impl Into<String>,
        speed: f64,
        text: &str,
    ) -> Self {
        Self {
            model_version: model_version.into(),
            voice_id: voice_id.into(),
            role: None,
            radio_profile: None,
            speed,
            language: language.into(),
            text_norm: normalize_whitespace(text),
        }
    }

    pub fn with_role(mut self, role: Option<String>) -> Self {
        self.role = role.filter(|r| !r.is_empty());
        self
    }

    pub fn with_radio_profile(mut self, profile: Option<String>) -> Self {
        self.radio_profile = profile.filter(|p| !p.is_empty());
        self
    }

    pub fn with_model_version(mut self, model_version: impl Into<String>) -> Self {
        self.model_version = model_version.into();
        self
    }

    /// 语速按三位小数参与 key 计算
    pub fn speed_repr(&self) -> String {
        format!("{:.3}", self.speed)
    }

    /// 计算缓存 key
    ///
    /// md5(字段依次拼接，每个字段后跟一个 NUL 分隔符)，输出 32 位十六进制。
    pub fn cache_key(&self) -> String {
        let speed = self.speed_repr();
        let fields: [&str; 7] = [
            &self.model_version,
            &self.voice_id,
            self.role.as_deref().unwrap_or(""),
            self.radio_profile.as_deref().unwrap_or(""),
            &speed,
            &self.language,
            &self.text_norm,
        ];

        let mut ctx = md5::Context::new();
        for field in fields {
            ctx.consume(field.as_bytes());
            ctx.consume([0u8]);
        }
        format!("{:x}", ctx.compute())
    }
}
