//! auto 音色解析
//!
//! 过滤顺序：可用 → 角色 → 地区，任一步无结果时回退到上一步的列表。
//! 最终按 id 排序后以 md5(种子) 取模挑选，同一机场/角色总是得到同一音色。

use super::VoiceDescriptor;

/// 请求自动挑选音色时使用的 voice_id
pub const AUTO_VOICE_ID: &str = "auto";

/// auto 解析的输入
#[derive(Debug, Clone, Default)]
pub struct VoiceSelector<'a> {
    pub role: Option<&'a str>,
    pub airport_icao: Option<&'a str>,
    pub region_prefix: Option<&'a str>,
    pub iso_country: Option<&'a str>,
    pub iso_region: Option<&'a str>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}

impl VoiceSelector<'_> {
    fn role(&self) -> String {
        self.role.map(|r| r.trim().to_lowercase()).unwrap_or_default()
    }

    fn region_tokens(&self) -> Vec<String> {
        let icao_prefix = non_empty(self.airport_icao)
            .map(|icao| icao.chars().take(2).collect::<String>());
        [
            non_empty(self.iso_country),
            non_empty(self.iso_region),
            non_empty(self.region_prefix),
            icao_prefix,
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn seed(&self) -> String {
        let role = self.role();
        if let Some(icao) = non_empty(self.airport_icao) {
            return format!("{}|{}", icao, role);
        }
        if let Some(prefix) = non_empty(self.region_prefix) {
            return format!("{}|{}", prefix, role);
        }
        String::new()
    }
}

fn stable_index(seed: &str, len: usize) -> usize {
    if seed.is_empty() || len == 0 {
        return 0;
    }
    let digest = md5::compute(seed.as_bytes());
    (u128::from_be_bytes(digest.0) % len as u128) as usize
}

/// 解析 auto 音色；没有可用音色时返回 None
pub fn resolve_voice<'a>(
    voices: &'a [VoiceDescriptor],
    selector: &VoiceSelector<'_>,
) -> Option<&'a VoiceDescriptor> {
    let eligible: Vec<&VoiceDescriptor> = voices.iter().filter(|v| v.is_eligible()).collect();
    if eligible.is_empty() {
        return None;
    }

    let role = selector.role();
    let mut candidates = eligible.clone();
    if !role.is_empty() {
        let by_role: Vec<_> = eligible.iter().copied().filter(|v| v.has_role(&role)).collect();
        if !by_role.is_empty() {
            candidates = by_role;
        }
    }

    let tokens = selector.region_tokens();
    if !tokens.is_empty() {
        let by_region: Vec<_> = candidates
            .iter()
            .copied()
            .filter(|v| tokens.iter().any(|t| v.matches_region(t)))
            .collect();
        if !by_region.is_empty() {
            candidates = by_region;
        }
    }

    candidates.sort_by(|a, b| a.id.cmp(&b.id));
    let idx = stable_index(&selector.seed(), candidates.len());
    candidates.get(idx).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voice::{VoiceMeta, MIN_REFERENCE_BYTES};
    use std::path::PathBuf;

    fn voice(id: &str, json: &str) -> VoiceDescriptor {
        let meta: VoiceMeta = serde_json::from_str(json).unwrap();
        VoiceDescriptor::from_meta(
            id,
            meta,
            Some(PathBuf::from(format!("{}/reference.wav", id))),
            MIN_REFERENCE_BYTES,
        )
        .unwrap()
    }

    fn catalog() -> Vec<VoiceDescriptor> {
        vec![
            voice("us_tower", r#"{"roles": ["tower"], "region_codes": ["K"]}"#),
            voice("uk_ground", r#"{"roles": ["ground"], "language": "en-GB", "region_codes": ["EG"]}"#),
            voice("de_tower", r#"{"roles": ["tower"], "region_codes": ["ED"]}"#),
            voice("uk_tower", r#"{"roles": ["tower"], "region_codes": ["EG"]}"#),
            VoiceDescriptor::from_meta("broken", VoiceMeta::default(), None, 0).unwrap(),
        ]
    }

    #[test]
    fn test_no_eligible_voice() {
        let voices = vec![VoiceDescriptor::from_meta("x", VoiceMeta::default(), None, 0).unwrap()];
        assert!(resolve_voice(&voices, &VoiceSelector::default()).is_none());
    }

    #[test]
    fn test_role_and_region_filter() {
        let voices = catalog();
        let selector = VoiceSelector {
            role: Some("tower"),
            airport_icao: Some("EGLL"),
            ..Default::default()
        };
        assert_eq!(resolve_voice(&voices, &selector).unwrap().id, "uk_tower");
    }

    #[test]
    fn test_role_fallback_when_no_match() {
        let voices = catalog();
        let selector = VoiceSelector {
            role: Some("approach"),
            iso_country: Some("de"),
            ..Default::default()
        };
        assert_eq!(resolve_voice(&voices, &selector).unwrap().id, "de_tower");
    }

    #[test]
    fn test_empty_seed_takes_first_sorted() {
        let voices = catalog();
        let picked = resolve_voice(&voices, &VoiceSelector::default()).unwrap();
        assert_eq!(picked.id, "de_tower");
    }

    #[test]
    fn test_pick_is_stable() {
        let voices = catalog();
        let selector = VoiceSelector {
            role: Some("tower"),
            airport_icao: Some("LFPG"),
            ..Default::default()
        };
        let first = resolve_voice(&voices, &selector).unwrap().id.clone();
        let mut reversed = voices.clone();
        reversed.reverse();
        for _ in 0..5 {
            assert_eq!(resolve_voice(&reversed, &selector).unwrap().id, first);
        }
        assert_eq!(selector.seed(), "LFPG|tower");
    }
}
