//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 神经音色参考音频的最小字节数
pub const MIN_REFERENCE_BYTES: u64 = 64 * 1024;

/// 默认管制席位
pub const DEFAULT_ROLES: &[&str] = &["delivery", "ground", "tower", "approach"];

/// 合成引擎类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceEngine {
    /// 需要参考音频的克隆模型（xtts）
    Neural,
    /// 无需参考音频的参数模型（coqui_vits）
    Parametric,
}

impl VoiceEngine {
    /// 未知引擎名返回 None
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "" | "xtts" | "neural" => Some(Self::Neural),
            "coqui_vits" | "vits" | "parametric" => Some(Self::Parametric),
            _ => None,
        }
    }

    /// meta.json 中的引擎名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neural => "xtts",
            Self::Parametric => "coqui_vits",
        }
    }

    pub fn requires_reference(&self) -> bool {
        matches!(self, Self::Neural)
    }
}

impl std::fmt::Display for VoiceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单值或列表
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

/// meta.json 原始结构
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceMeta {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub roles: Option<OneOrMany>,
    #[serde(default)]
    pub role: Option<OneOrMany>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub region_codes: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
}

fn display_name(id: &str) -> String {
    id.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// 音色描述
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceDescriptor {
    pub id: String,
    pub name: String,
    pub engine: VoiceEngine,
    pub roles: Vec<String>,
    pub tags: Vec<String>,
    pub region_codes: Vec<String>,
    pub language: Option<String>,
    #[serde(skip)]
    pub reference: Option<PathBuf>,
    #[serde(skip)]
    pub reference_bytes: u64,
}

impl VoiceDescriptor {
    /// 由目录名、meta.json 与参考音频信息构造
    ///
    /// id 缺省为目录名，name 缺省为 id 的标题化形式，engine 缺省为 xtts。
    pub fn from_meta(
        dir_name: &str,
        meta: VoiceMeta,
        reference: Option<PathBuf>,
        reference_bytes: u64,
    ) -> Result<Self, super::VoiceError> {
        let id = meta
            .id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| dir_name.to_string());
        let name = meta
            .name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| display_name(&id));
        let engine_name = meta.engine.unwrap_or_default();
        let engine = VoiceEngine::parse(&engine_name).ok_or_else(|| {
            super::VoiceError::InvalidMeta(format!("{}: 未知引擎 {}", id, engine_name))
        })?;
        let roles = meta
            .roles
            .or(meta.role)
            .map(OneOrMany::into_vec)
            .unwrap_or_default();

        Ok(Self {
            id,
            name,
            engine,
            roles: clean_list(roles).into_iter().map(|r| r.to_lowercase()).collect(),
            tags: clean_list(meta.tags),
            region_codes: clean_list(meta.region_codes),
            language: meta.language.filter(|l| !l.trim().is_empty()),
            reference,
            reference_bytes,
        })
    }

    /// 参考音频是否可用于克隆
    pub fn has_usable_reference(&self) -> bool {
        let Some(path) = &self.reference else {
            return false;
        };
        let placeholder = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.to_lowercase().contains("placeholder"));
        !placeholder && self.reference_bytes >= MIN_REFERENCE_BYTES
    }

    /// 是否可用于合成
    pub fn is_eligible(&self) -> bool {
        !self.engine.requires_reference() || self.has_usable_reference()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    /// 是否匹配地区标记（标签、地区码、id/名称子串、语言后缀）
    pub fn matches_region(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        if token.is_empty() {
            return false;
        }
        if self.tags.iter().any(|t| t.to_lowercase() == token)
            || self.region_codes.iter().any(|c| c.to_lowercase() == token)
        {
            return true;
        }
        let haystack = format!("{} {}", self.id, self.name).to_lowercase();
        if haystack.contains(&token) {
            return true;
        }
        self.language
            .as_deref()
            .map_or(false, |l| l.to_lowercase().ends_with(&format!("-{}", token)))
    }
}
