//! Radio Context - 无线电信道模拟
//!
//! 职责:
//! - 预设参数表（clean / vhf / cockpit / tinny / vatsim / congested）
//! - 确定性的 DSP 处理链

mod chain;
mod profiles;

pub use chain::{apply_profile, clamp_intensity, DEFAULT_INTENSITY};
pub use profiles::{
    find_profile, is_effect_profile, is_known_profile, list_profiles, RadioParams, RadioProfile,
    RadioProfileInfo, CLEAN_PROFILE, RADIO_DSP_VERSION, RADIO_PROFILES,
};
