//! 文本分割器
//!
//! 面向 ATC 语流节奏的分段：优先使用显式分隔符（`|`、换行），
//! 否则按句末标点分割；过长片段再按单词边界二次切分。

use serde::Serialize;

/// 单个片段的最大字符数
pub const MAX_SEGMENT_CHARS: usize = 220;

/// 二次切分时尾片段的最小字符数（低于此值尝试并入前一片段）
pub const MIN_SEGMENT_CHARS: usize = 160;

/// 硬停顿默认值（毫秒）
pub const DEFAULT_HARD_PAUSE_MS: u32 = 70;

/// 软停顿默认值（毫秒）
pub const DEFAULT_SOFT_PAUSE_MS: u32 = 35;

/// 停顿上限（毫秒）
pub const MAX_PAUSE_MS: i64 = 1000;

/// 分隔模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterMode {
    Pipe,
    Newline,
    Punct,
    None,
}

impl DelimiterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelimiterMode::Pipe => "pipe",
            DelimiterMode::Newline => "newline",
            DelimiterMode::Punct => "punct",
            DelimiterMode::None => "none",
        }
    }

    /// 显式分隔符产生硬边界
    fn is_explicit(&self) -> bool {
        matches!(self, DelimiterMode::Pipe | DelimiterMode::Newline)
    }
}

impl std::fmt::Display for DelimiterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 片段边界类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryType {
    Hard,
    Soft,
}

/// 分段结果
///
/// `pauses_ms` 与 `boundary_types` 的长度均为 `segments.len() - 1`（空输入时为 0），
/// 第 i 项描述 segments[i] 与 segments[i + 1] 之间的边界。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationResult {
    pub segments: Vec<String>,
    pub delimiter: DelimiterMode,
    pub pauses_ms: Vec<u32>,
    pub boundary_types: Vec<BoundaryType>,
}

impl SegmentationResult {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// 检查是否为句末断点
#[inline]
fn is_punct_break(ch: char) -> bool {
    matches!(ch, '.' | '?' | '!' | ';')
}

/// 合并所有空白为单个空格并去除首尾空白
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 按标点分割，标点保留在前一片段末尾
fn split_punct(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut buf = String::new();

    for ch in text.chars() {
        buf.push(ch);
        if is_punct_break(ch) {
            let seg = normalize_whitespace(&buf);
            if !seg.is_empty() {
                segments.push(seg);
            }
            buf.clear();
        }
    }

    let tail = normalize_whitespace(&buf);
    if !tail.is_empty() {
        segments.push(tail);
    }

    segments
}

/// 按换行分割（连续换行视为一个分隔）
fn split_newlines(text: &str) -> Vec<String> {
    text.split(|c| c == '\n' || c == '\r')
        .map(normalize_whitespace)
        .filter(|s| !s.is_empty())
        .collect()
}

#[inline]
fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// 将超长片段按单词边界切分为约 160-220 字符的子片段
///
/// 单个超长单词按字符硬切，避免丢失文本。
fn split_long_segment(segment: &str, max_len: usize, min_len: usize) -> Vec<String> {
    let segment = normalize_whitespace(segment);
    if segment.is_empty() {
        return Vec::new();
    }
    if char_len(&segment) <= max_len {
        return vec![segment];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in segment.split(' ') {
        if current.is_empty() {
            if char_len(word) <= max_len {
                current.push_str(word);
                continue;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_len) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if char_len(&current) + 1 + char_len(word) <= max_len {
            current.push(' ');
            current.push_str(word);
            continue;
        }

        chunks.push(std::mem::take(&mut current));
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    // 尾片段过短时尝试并入前一片段
    if chunks.len() >= 2 {
        let last_len = char_len(&chunks[chunks.len() - 1]);
        let prev_len = char_len(&chunks[chunks.len() - 2]);
        if last_len < min_len && prev_len + 1 + last_len <= max_len {
            if let Some(last) = chunks.pop() {
                if let Some(prev) = chunks.last_mut() {
                    prev.push(' ');
                    prev.push_str(&last);
                }
            }
        }
    }

    chunks.retain(|c| !c.is_empty());
    chunks
}

fn clamp_pause(value: Option<i64>, default: u32) -> u32 {
    match value {
        Some(v) => v.clamp(0, MAX_PAUSE_MS) as u32,
        None => default,
    }
}

/// 对文本进行分段
///
/// 分隔符优先级：
/// 1. `|`（硬边界）
/// 2. 换行（硬边界）
/// 3. 句末标点 `. ? ! ;`（软边界，标点保留）
///
/// 超过 220 字符的片段在单词边界二次切分，二次切分产生的边界总是软边界。
/// 停顿参数为 None 时使用默认值，否则钳制到 [0, 1000]。
pub fn segment_text(
    text: &str,
    hard_pause_ms: Option<i64>,
    soft_pause_ms: Option<i64>,
) -> SegmentationResult {
    let (delimiter, base) = if text.contains('|') {
        let parts = text
            .split('|')
            .map(normalize_whitespace)
            .filter(|s| !s.is_empty())
            .collect();
        (DelimiterMode::Pipe, parts)
    } else if text.contains('\n') || text.contains('\r') {
        (DelimiterMode::Newline, split_newlines(text))
    } else {
        let mode = if text.chars().any(is_punct_break) {
            DelimiterMode::Punct
        } else {
            DelimiterMode::None
        };
        (mode, split_punct(text))
    };

    let hard_pause = clamp_pause(hard_pause_ms, DEFAULT_HARD_PAUSE_MS);
    let soft_pause = clamp_pause(soft_pause_ms, DEFAULT_SOFT_PAUSE_MS);

    let mut segments = Vec::new();
    let mut pauses_ms = Vec::new();
    let mut boundary_types = Vec::new();

    for base_seg in &base {
        let subs = split_long_segment(base_seg, MAX_SEGMENT_CHARS, MIN_SEGMENT_CHARS);
        for (sub_idx, sub) in subs.into_iter().enumerate() {
            if !segments.is_empty() {
                let boundary = if sub_idx == 0 && delimiter.is_explicit() {
                    BoundaryType::Hard
                } else {
                    BoundaryType::Soft
                };
                pauses_ms.push(match boundary {
                    BoundaryType::Hard => hard_pause,
                    BoundaryType::Soft => soft_pause,
                });
                boundary_types.push(boundary);
            }
            segments.push(sub);
        }
    }

    SegmentationResult {
        segments,
        delimiter,
        pauses_ms,
        boundary_types,
    }
}
