//! 内置短语包，用于预取和演示

use serde::Serialize;

/// 短语包
#[derive(Debug, Clone, Copy)]
pub struct PhrasePack {
    pub id: &'static str,
    pub description: &'static str,
    pub phrases: &'static [&'static str],
}

/// 短语包摘要
#[derive(Debug, Clone, Serialize)]
pub struct PhrasePackInfo {
    pub id: &'static str,
    pub description: &'static str,
    pub count: usize,
}

pub const PHRASE_PACKS: &[PhrasePack] = &[
    PhrasePack {
        id: "atc_checkin",
        description: "Generic ATC check-in and acknowledgement phrases.",
        phrases: &[
            "Tower, this is Ghost Rider requesting a flyby.",
            "Approach, N12345 level at seven thousand, information alpha.",
            "Ground, ready to taxi from the north apron.",
            "Cleared for takeoff, runway two seven right.",
            "Contact departure on one two four point five.",
            "Roger, holding short of runway three six.",
            "Negative contact, still looking for traffic.",
            "Ready for the ILS approach runway one eight.",
            "Request vectors to final, fuel state four thousand.",
            "We are established on the localizer.",
        ],
    },
    PhrasePack {
        id: "callouts",
        description: "Cabin and cockpit callouts for quick demos.",
        phrases: &[
            "Passing through ten thousand feet.",
            "Minimums, continue.",
            "Rotate.",
            "Positive rate, gear up.",
            "Flaps one, flaps two.",
            "Speed checked.",
            "Climb power set.",
            "Landing checklist complete.",
            "Cleared to land.",
            "APU is available.",
        ],
    },
    PhrasePack {
        id: "greetings",
        description: "Friendly samples for casual demo playback.",
        phrases: &[
            "Welcome to the voice lab demo.",
            "Here is a sample line in British English.",
            "We cache audio so repeat lines play instantly.",
            "Try switching the voice profile for a different flavor.",
            "Prefetch a phrase pack to warm the cache.",
            "Thanks for testing, have a great day.",
        ],
    },
];

pub fn list_sets() -> Vec<PhrasePackInfo> {
    PHRASE_PACKS
        .iter()
        .map(|p| PhrasePackInfo {
            id: p.id,
            description: p.description,
            count: p.phrases.len(),
        })
        .collect()
}

/// 取短语包内容
///
/// 未知短语包返回空列表；limit 为 0 或缺省时返回全部。
pub fn get_phrases(pack_id: &str, limit: Option<usize>) -> Vec<&'static str> {
    let Some(pack) = PHRASE_PACKS.iter().find(|p| p.id == pack_id) else {
        return Vec::new();
    };
    match limit {
        Some(limit) if limit > 0 => pack.phrases.iter().take(limit).copied().collect(),
        _ => pack.phrases.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_sets() {
        let sets = list_sets();
        assert_eq!(sets.len(), 3);
        assert_eq!(sets[0].id, "atc_checkin");
        assert_eq!(sets[0].count, 10);
        assert_eq!(sets[2].count, 6);
    }

    #[test]
    fn test_get_phrases_limit() {
        assert_eq!(get_phrases("callouts", Some(2)), vec!["Passing through ten thousand feet.", "Minimums, continue."]);
        assert_eq!(get_phrases("callouts", None).len(), 10);
        assert_eq!(get_phrases("callouts", Some(0)).len(), 10);
        assert_eq!(get_phrases("callouts", Some(99)).len(), 10);
    }

    #[test]
    fn test_unknown_pack() {
        assert!(get_phrases("nope", Some(3)).is_empty());
    }
}
