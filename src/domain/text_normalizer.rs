//! ATC 文本规范化
//!
//! 合成前将无线电用语改写为可朗读的形式：
//! - 变音符号折叠（ä → ae）与可选的发音替换表
//! - 跑道、高度层、航向、应答机、QNH/QFE、频率逐位读出
//! - 常见缩写逐字母读出
//!
//! `|` 与换行分隔符原样保留，分段器依赖它们确定硬边界。

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

const ACRONYMS: &[&str] = &[
    "qnh", "qfe", "atis", "ils", "vor", "ndb", "rnav", "sid", "star", "ifr", "vfr", "ctaf",
    "unicom",
];

/// 规范化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    /// ATC 规则是否改变了文本
    pub changed: bool,
    /// 发音替换（含变音符号折叠）是否改变了文本
    pub pronunciation_applied: bool,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid regex pattern")
}

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| compile($pattern))
        }
    };
}

static_regex!(delimiter_regex, r"\||\r?\n");
static_regex!(runway_regex, r"(?i)\b(runway|rwy)\s*(\d{1,2})([lrc]?)\b");
static_regex!(flight_level_regex, r"(?i)\b(?:FL|flight level)\s*(\d{2,3})\b");
static_regex!(heading_regex, r"(?i)\b(heading|hdg|turn)\s*(\d{1,3})\b");
static_regex!(squawk_regex, r"(?i)\b(squawk)\s*(\d{1,4})\b");
static_regex!(qnh_regex, r"(?i)\b(qnh|qfe)\s*(\d{3,4})\b");
static_regex!(frequency_regex, r"\b(\d{3})\.(\d{1,3})\b");

fn acronym_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(&format!(r"(?i)\b({})\b", ACRONYMS.join("|"))))
}

fn digit_word(d: char) -> Option<&'static str> {
    Some(match d {
        '0' => "zero",
        '1' => "one",
        '2' => "two",
        '3' => "three",
        '4' => "four",
        '5' => "five",
        '6' => "six",
        '7' => "seven",
        '8' => "eight",
        '9' => "nine",
        _ => return None,
    })
}

/// 数字逐位读出（左侧补零到 width 位）
fn digits_to_words(digits: &str, width: usize) -> String {
    let padded = format!("{:0>width$}", digits, width = width);
    padded
        .chars()
        .map(|d| digit_word(d).map(str::to_string).unwrap_or_else(|| d.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn spell_letters(word: &str) -> String {
    word.to_uppercase()
        .chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_segment(segment: &str) -> String {
    if segment.is_empty() {
        return String::new();
    }
    let s = segment.split_whitespace().collect::<Vec<_>>().join(" ");

    let s = qnh_regex().replace_all(&s, |c: &Captures| {
        format!("{} {}", spell_letters(&c[1]), digits_to_words(&c[2], 4))
    });
    let s = flight_level_regex().replace_all(&s, |c: &Captures| {
        format!("flight level {}", digits_to_words(&c[1], 3))
    });
    let s = runway_regex().replace_all(&s, |c: &Captures| {
        let side = match c[3].to_lowercase().as_str() {
            "l" => " left",
            "r" => " right",
            "c" => " center",
            _ => "",
        };
        format!("{} {}{}", c[1].to_lowercase(), digits_to_words(&c[2], 2), side)
    });
    let s = heading_regex().replace_all(&s, |c: &Captures| {
        format!("{} {}", c[1].to_lowercase(), digits_to_words(&c[2], 3))
    });
    let s = squawk_regex().replace_all(&s, |c: &Captures| {
        format!("{} {}", c[1].to_lowercase(), digits_to_words(&c[2], 4))
    });
    let s = frequency_regex().replace_all(&s, |c: &Captures| {
        let frac = c[2].trim_end_matches('0');
        let frac = if frac.is_empty() { "0" } else { frac };
        format!(
            "{} decimal {}",
            digits_to_words(&c[1], 0),
            digits_to_words(frac, 0)
        )
    });
    let s = acronym_regex().replace_all(&s, |c: &Captures| spell_letters(&c[0]));

    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 对 ATC 用语做规范化，保留 `|` 与换行分隔符
///
/// 返回 (规范化文本, 是否改变)。
pub fn normalize_atc(text: &str) -> (String, bool) {
    if text.is_empty() {
        return (String::new(), false);
    }

    let mut out = String::with_capacity(text.len());
    let mut changed = false;
    let mut last = 0;

    let mut push_segment = |segment: &str, out: &mut String| {
        let normalized = normalize_segment(segment);
        if normalized != segment {
            changed = true;
        }
        out.push_str(&normalized);
    };

    for m in delimiter_regex().find_iter(text) {
        push_segment(&text[last..m.start()], &mut out);
        out.push_str(m.as_str());
        last = m.end();
    }
    push_segment(&text[last..], &mut out);

    (out, changed)
}

/// 变音符号折叠
pub fn fold_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let replacement = match c {
            'ä' => "ae",
            'ö' => "oe",
            'ü' => "ue",
            'Ä' => "Ae",
            'Ö' => "Oe",
            'Ü' => "Ue",
            'ß' => "ss",
            'á' | 'à' | 'â' | 'ã' | 'å' => "a",
            'Á' | 'À' | 'Â' | 'Ã' | 'Å' => "A",
            'é' | 'è' | 'ê' | 'ë' => "e",
            'É' | 'È' | 'Ê' | 'Ë' => "E",
            'í' | 'ì' | 'î' | 'ï' => "i",
            'Í' | 'Ì' | 'Î' | 'Ï' => "I",
            'ó' | 'ò' | 'ô' | 'õ' => "o",
            'Ó' | 'Ò' | 'Ô' | 'Õ' => "O",
            'ú' | 'ù' | 'û' => "u",
            'Ú' | 'Ù' | 'Û' => "U",
            'ñ' => "n",
            'Ñ' => "N",
            'ç' => "c",
            'Ç' => "C",
            _ => {
                out.push(c);
                continue;
            }
        };
        out.push_str(replacement);
    }
    out
}

fn has_cased(s: &str) -> bool {
    s.chars().any(|c| c.is_lowercase() || c.is_uppercase())
}

fn to_title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

/// 按源词的大小写形式调整替换词
fn match_case(source: &str, replacement: &str) -> String {
    if has_cased(source) && !source.chars().any(char::is_lowercase) {
        return replacement.to_uppercase();
    }
    if has_cased(source) && !source.chars().any(char::is_uppercase) {
        return replacement.to_lowercase();
    }
    if has_cased(source) && to_title(source) == source {
        return to_title(replacement);
    }
    replacement.to_string()
}

/// ATC 文本规范化器
///
/// 持有已编译的发音替换表；规则部分是无状态的。
#[derive(Debug, Clone, Default)]
pub struct AtcNormalizer {
    pronunciation: Option<PronunciationMap>,
}

#[derive(Debug, Clone)]
struct PronunciationMap {
    pattern: Regex,
    lookup: HashMap<String, String>,
}

impl AtcNormalizer {
    /// 不带发音替换表
    pub fn new() -> Self {
        Self::default()
    }

    /// 带发音替换表（整词匹配、大小写不敏感，长词优先）
    pub fn with_pronunciations(map: HashMap<String, String>) -> Result<Self, regex::Error> {
        let mut keys: Vec<(String, String)> = map
            .into_iter()
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        if keys.is_empty() {
            return Ok(Self::default());
        }
        keys.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()).then(a.0.cmp(&b.0)));

        let alternatives = keys
            .iter()
            .map(|(k, _)| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b({})\b", alternatives))?;
        let lookup = keys
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();

        Ok(Self {
            pronunciation: Some(PronunciationMap { pattern, lookup }),
        })
    }

    pub fn pronunciation_entries(&self) -> usize {
        self.pronunciation.as_ref().map_or(0, |p| p.lookup.len())
    }

    /// 变音符号折叠 + 发音替换
    pub fn apply_pronunciation(&self, text: &str) -> String {
        let folded = fold_diacritics(text);
        match &self.pronunciation {
            Some(map) => map
                .pattern
                .replace_all(&folded, |c: &Captures| {
                    let source = &c[0];
                    match map.lookup.get(&source.to_lowercase()) {
                        Some(replacement) => match_case(source, replacement),
                        None => source.to_string(),
                    }
                })
                .into_owned(),
            None => folded,
        }
    }

    /// 完整规范化：发音替换 → ATC 规则
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let pronounced = self.apply_pronunciation(text);
        let pronunciation_applied = pronounced != text;
        let (text, changed) = normalize_atc(&pronounced);
        NormalizedText {
            text,
            changed,
            pronunciation_applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acronyms_and_delimiters() {
        let (text, changed) = normalize_atc("QNH|ATIS\nvfr");
        assert_eq!(text, "Q N H|A T I S\nV F R");
        assert!(changed);
    }

    #[test]
    fn test_runway_and_heading() {
        let (text, changed) = normalize_atc("Runway 5, heading 50");
        assert_eq!(text, "runway zero five, heading zero five zero");
        assert!(changed);
    }

    #[test]
    fn test_runway_side_and_squawk() {
        let (text, _) = normalize_atc("RWY 27L squawk 462");
        assert_eq!(text, "rwy two seven left squawk zero four six two");
    }

    #[test]
    fn test_heading_zeros() {
        assert_eq!(normalize_atc("hdg 005").0, "hdg zero zero five");
    }

    #[test]
    fn test_flight_level() {
        assert_eq!(normalize_atc("FL350").0, "flight level three five zero");
    }

    #[test]
    fn test_qnh_digits() {
        let (text, changed) = normalize_atc("QNH 1016");
        assert!(text.contains("Q N H one zero one six"));
        assert!(changed);
    }

    #[test]
    fn test_frequency_and_delimiters() {
        let (text, _) = normalize_atc("121.800|118.10\nQFE 999");
        assert!(text.contains("one two one decimal eight"));
        assert!(text.contains("one one eight decimal one"));
        assert!(text.contains('|') && text.contains('\n'));
        assert!(text.contains("Q F E zero nine nine nine"));
    }

    #[test]
    fn test_unchanged_text() {
        let (text, changed) = normalize_atc("cleared to land");
        assert_eq!(text, "cleared to land");
        assert!(!changed);
        assert_eq!(normalize_atc(""), (String::new(), false));
    }

    #[test]
    fn test_fold_diacritics() {
        assert_eq!(fold_diacritics("Düsseldorf"), "Duesseldorf");
        assert_eq!(fold_diacritics("Zürich Ñandú"), "Zuerich Nandu");
    }

    #[test]
    fn test_pronunciation_word_boundary() {
        let mut map = HashMap::new();
        map.insert("Dusseldorf".to_string(), "Duesseldorf".to_string());
        let normalizer = AtcNormalizer::with_pronunciations(map).unwrap();
        assert_eq!(normalizer.apply_pronunciation("Dusseldorfian"), "Dusseldorfian");
    }

    #[test]
    fn test_pronunciation_matches_case_and_keeps_pipes() {
        let mut map = HashMap::new();
        map.insert("Duesseldorf".to_string(), "doo-sel-dorf".to_string());
        let normalizer = AtcNormalizer::with_pronunciations(map).unwrap();

        let out = normalizer.apply_pronunciation("Taxi to Düsseldorf | ready");
        assert_eq!(out, "Taxi to Doo-Sel-Dorf | ready");
        assert_eq!(out.matches('|').count(), 1);

        assert_eq!(normalizer.apply_pronunciation("DUESSELDORF"), "DOO-SEL-DORF");
        assert_eq!(normalizer.apply_pronunciation("duesseldorf"), "doo-sel-dorf");
    }

    #[test]
    fn test_normalize_flags() {
        let normalizer = AtcNormalizer::new();
        let res = normalizer.normalize("Zürich tower, runway 16");
        assert!(res.pronunciation_applied);
        assert!(res.changed);
        assert_eq!(res.text, "Zuerich tower, runway one six");
    }
}
