//! 无线电效果预设

use serde::Serialize;

/// DSP 链版本号，参与派生缓存条目的模型版本字段
///
/// 修改任何预设参数或处理链时必须递增，使旧的派生条目失效。
pub const RADIO_DSP_VERSION: &str = "2";

/// 不做任何处理的预设名
pub const CLEAN_PROFILE: &str = "clean";

/// 无线电信道参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadioParams {
    /// 高通截止频率（Hz）
    pub hp: f64,
    /// 低通截止频率（Hz）
    pub lp: f64,
    /// 底噪电平（满幅比例）
    pub hiss: f64,
    pub bursts_per_s: f64,
    pub burst_level: f64,
    pub burst_len_s: f64,
    /// 丢弃的低位比特数
    pub crush: u32,
    /// 软削波驱动
    pub drive: f64,
    /// 尾部淡出时长（秒）
    pub tail: f64,
    /// 湿信号混合比例
    pub wet: f64,
    pub gain: f64,
    /// 每个样本触发丢包的概率
    pub drop_prob: f64,
    pub drop_len_s: f64,
    pub wobble_hz: f64,
    pub wobble_depth: f64,
}

/// 无线电效果预设
#[derive(Debug, Clone, Copy)]
pub struct RadioProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// clean 预设没有参数
    pub params: Option<RadioParams>,
}

/// 预设列表（对外展示用）
#[derive(Debug, Clone, Serialize)]
pub struct RadioProfileInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const VHF: RadioParams = RadioParams {
    hp: 320.0,
    lp: 2800.0,
    hiss: 0.004,
    bursts_per_s: 6.0,
    burst_level: 0.02,
    burst_len_s: 0.012,
    crush: 2,
    drive: 1.25,
    tail: 0.14,
    wet: 0.85,
    gain: 1.25,
    drop_prob: 0.0,
    drop_len_s: 0.0,
    wobble_hz: 0.0,
    wobble_depth: 0.0,
};

const COCKPIT: RadioParams = RadioParams {
    hp: 200.0,
    lp: 2400.0,
    hiss: 0.0025,
    bursts_per_s: 2.0,
    burst_level: 0.012,
    burst_len_s: 0.01,
    crush: 1,
    drive: 1.12,
    tail: 0.1,
    wet: 0.65,
    gain: 1.15,
    drop_prob: 0.0,
    drop_len_s: 0.0,
    wobble_hz: 0.0,
    wobble_depth: 0.0,
};

const TINNY: RadioParams = RadioParams {
    hp: 520.0,
    lp: 3200.0,
    hiss: 0.0035,
    bursts_per_s: 5.0,
    burst_level: 0.018,
    burst_len_s: 0.01,
    crush: 2,
    drive: 1.18,
    tail: 0.12,
    wet: 0.75,
    gain: 1.2,
    drop_prob: 0.0,
    drop_len_s: 0.0,
    wobble_hz: 0.0,
    wobble_depth: 0.0,
};

const VATSIM: RadioParams = RadioParams {
    hp: 320.0,
    lp: 3000.0,
    hiss: 0.0045,
    bursts_per_s: 4.0,
    burst_level: 0.022,
    burst_len_s: 0.014,
    crush: 1,
    drive: 1.15,
    tail: 0.1,
    wet: 0.9,
    gain: 1.12,
    drop_prob: 0.0010,
    drop_len_s: 0.018,
    wobble_hz: 0.5,
    wobble_depth: 0.1,
};

const CONGESTED: RadioParams = RadioParams {
    hp: 360.0,
    lp: 2800.0,
    hiss: 0.0055,
    bursts_per_s: 7.0,
    burst_level: 0.03,
    burst_len_s: 0.014,
    crush: 2,
    drive: 1.25,
    tail: 0.08,
    wet: 0.95,
    gain: 1.18,
    drop_prob: 0.0025,
    drop_len_s: 0.02,
    wobble_hz: 0.65,
    wobble_depth: 0.12,
};

/// 所有预设（顺序即展示顺序）
pub const RADIO_PROFILES: &[RadioProfile] = &[
    RadioProfile {
        id: CLEAN_PROFILE,
        name: "Clean",
        description: "Neutral, full-band voice.",
        params: None,
    },
    RadioProfile {
        id: "vhf",
        name: "VHF",
        description: "Narrow-band VHF radio with hiss and light grit.",
        params: Some(VHF),
    },
    RadioProfile {
        id: "cockpit",
        name: "Cockpit",
        description: "Closed cockpit intercom flavor with low-mid focus.",
        params: Some(COCKPIT),
    },
    RadioProfile {
        id: "tinny",
        name: "Tinny",
        description: "High-passed intercom flavor with light static.",
        params: Some(TINNY),
    },
    RadioProfile {
        id: "vatsim",
        name: "VATSIM-ish",
        description: "Narrow, hissy net audio with light dropouts and squelch.",
        params: Some(VATSIM),
    },
    RadioProfile {
        id: "congested",
        name: "Congested Net",
        description: "Heavier grit, packet-loss style dropouts, fast squelch tail.",
        params: Some(CONGESTED),
    },
];

/// 按名称查找预设
pub fn find_profile(name: &str) -> Option<&'static RadioProfile> {
    RADIO_PROFILES.iter().find(|p| p.id == name)
}

/// 预设名称是否有效（clean 视为有效）
pub fn is_known_profile(name: &str) -> bool {
    find_profile(name).is_some()
}

/// 是否需要实际处理（None、空串、clean 均不处理）
pub fn is_effect_profile(name: Option<&str>) -> bool {
    match name {
        Some(n) => find_profile(n).map_or(false, |p| p.params.is_some()),
        None => false,
    }
}

pub fn list_profiles() -> Vec<RadioProfileInfo> {
    RADIO_PROFILES
        .iter()
        .map(|p| RadioProfileInfo {
            id: p.id,
            name: p.name,
            description: p.description,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_lookup() {
        assert!(is_known_profile("clean"));
        assert!(is_known_profile("congested"));
        assert!(!is_known_profile("hf"));
        assert_eq!(find_profile("vhf").unwrap().params.unwrap().crush, 2);
    }

    #[test]
    fn test_effect_profile() {
        assert!(!is_effect_profile(None));
        assert!(!is_effect_profile(Some("clean")));
        assert!(!is_effect_profile(Some("")));
        assert!(!is_effect_profile(Some("unknown")));
        assert!(is_effect_profile(Some("tinny")));
    }

    #[test]
    fn test_list_profiles() {
        let ids: Vec<&str> = list_profiles().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["clean", "vhf", "cockpit", "tinny", "vatsim", "congested"]);
    }
}
